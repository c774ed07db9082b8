//! Per-state total breakdown.
//!
//! Pairs every state-level aggregate with that state's county records.
//! A state that only reported counties gets an aggregate summed from them.

use crate::model::{
    CoronaDataPoint, CountiesKeyed, StateBreakdown, StatesKeyed, TotalBreakdown, TotalCases,
    NATION_FIPS,
};
use crate::analysis::anomalies::sum_cases;
use crate::states::state_fips;

/// Combine state aggregates and county records into one entry per state.
///
/// Every state name found in either input appears exactly once in the
/// output. County order is preserved.
pub fn total_breakdowns(mut states: StatesKeyed, counties: CountiesKeyed) -> TotalBreakdown {
    let mut breakdown = TotalBreakdown::new();

    for (name, county_points) in counties {
        let state = states
            .remove(&name)
            .unwrap_or_else(|| synthesize_state_aggregate(&name, &county_points));
        breakdown.insert(name, StateBreakdown { state, counties: county_points });
    }

    for (name, state) in states {
        breakdown.insert(name, StateBreakdown { state, counties: Vec::new() });
    }

    breakdown
}

/// Build a state-level record by summing county records.
///
/// Optional counts are summed over the counties that report them and stay
/// absent if none do. Sums saturate at `i64::MAX`.
pub fn synthesize_state_aggregate(state: &str, counties: &[CoronaDataPoint]) -> CoronaDataPoint {
    let sum_optional = |field: fn(&CoronaDataPoint) -> Option<i64>| -> Option<i64> {
        counties
            .iter()
            .filter_map(field)
            .fold(None, |acc, n| Some(acc.unwrap_or(0).saturating_add(n)))
    };

    CoronaDataPoint {
        total_cases: TotalCases::Count(sum_cases(counties)),
        deaths: sum_optional(|c| c.deaths),
        recovered: sum_optional(|c| c.recovered),
        active_cases: sum_optional(|c| c.active_cases),
        county: None,
        state: Some(state.to_string()),
        fips_code: state_fips(state).unwrap_or(NATION_FIPS).to_string(),
        last_updated: None,
    }
}

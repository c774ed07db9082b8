//! Feed anomaly detection.
//!
//! Runs after classification and before the breakdown is assembled. It
//! only reads the buckets; every finding is logged at warning severity and
//! returned so callers and tests can inspect it.

use crate::logging::{DataSource, LogSink};
use crate::model::{CoronaDataPoint, CountiesKeyed, StatesKeyed};
use std::fmt;

/// Something about the feed that looks wrong but is still served as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Anomaly {
    /// The feed should carry exactly one nation-level record.
    NationRecordCount(usize),
    /// A state has county records but no state-level aggregate.
    MissingStateAggregate { state: String, counties: usize },
    /// A state's county totals add up to more than its own aggregate.
    CountiesExceedState {
        state: String,
        county_total: i64,
        state_total: i64,
    },
}

impl Anomaly {
    /// State the anomaly concerns, if any; used as log context.
    pub fn state(&self) -> Option<&str> {
        match self {
            Anomaly::NationRecordCount(_) => None,
            Anomaly::MissingStateAggregate { state, .. }
            | Anomaly::CountiesExceedState { state, .. } => Some(state.as_str()),
        }
    }
}

impl fmt::Display for Anomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Anomaly::NationRecordCount(n) => {
                write!(f, "expected exactly one nation-level record, found {}", n)
            }
            Anomaly::MissingStateAggregate { state, counties } => write!(
                f,
                "{} county records for {} but no state-level record",
                counties, state
            ),
            Anomaly::CountiesExceedState {
                state,
                county_total,
                state_total,
            } => write!(
                f,
                "county cases for {} sum to {}, more than the state total of {}",
                state, county_total, state_total
            ),
        }
    }
}

/// Sum of the counted cases in `points`, ignoring placeholders.
/// Saturates at `i64::MAX`.
pub fn sum_cases(points: &[CoronaDataPoint]) -> i64 {
    points
        .iter()
        .filter_map(|p| p.total_cases.count())
        .fold(0, i64::saturating_add)
}

/// Inspect the three buckets and log every anomaly found.
pub fn log_anomalies(
    nation: &[CoronaDataPoint],
    states: &StatesKeyed,
    counties: &CountiesKeyed,
    logger: &dyn LogSink,
) -> Vec<Anomaly> {
    let anomalies = find_anomalies(nation, states, counties);

    for anomaly in &anomalies {
        logger.warn(DataSource::Feed, anomaly.state(), &anomaly.to_string());
    }

    anomalies
}

/// Same checks as `log_anomalies`, without logging.
pub fn find_anomalies(
    nation: &[CoronaDataPoint],
    states: &StatesKeyed,
    counties: &CountiesKeyed,
) -> Vec<Anomaly> {
    let mut anomalies = Vec::new();

    if nation.len() != 1 {
        anomalies.push(Anomaly::NationRecordCount(nation.len()));
    }

    for (state, county_points) in counties {
        match states.get(state) {
            None => anomalies.push(Anomaly::MissingStateAggregate {
                state: state.clone(),
                counties: county_points.len(),
            }),
            Some(aggregate) => {
                let county_total = sum_cases(county_points);
                if let Some(state_total) = aggregate.total_cases.count() {
                    if county_total > state_total {
                        anomalies.push(Anomaly::CountiesExceedState {
                            state: state.clone(),
                            county_total,
                            state_total,
                        });
                    }
                }
            }
        }
    }

    anomalies
}

/// Corona Data Scraper ingestion and reshaping.
///
/// Turns the flat `data.json` feed into the nation / state / county
/// breakdown served by the API:
///
/// 1. decode each record (malformed records are skipped and counted)
/// 2. keep only United States records
/// 3. normalize the county and derive the FIPS code
/// 4. drop blacklisted FIPS codes
/// 5. file the record under counties, state aggregates, or nation
/// 6. log anomalies, then combine states with their counties
///
/// `get_corona_data` never fails: any fetch or parse error is logged once
/// at error severity and converted into `CoronaBreakdown::unavailable()`.

use crate::analysis::anomalies::log_anomalies;
use crate::analysis::breakdown::total_breakdowns;
use crate::fips::{accepted_county, FipsDirectory};
use crate::ingest::FeedSource;
use crate::logging::{log_feed_failure, log_ingest_summary, LogSink};
use crate::model::{
    CoronaBreakdown, CoronaDataPoint, CountiesKeyed, RawRecord, StatesKeyed, TotalCases,
    NATION_FIPS, UNITED_STATES,
};

/// FIPS codes whose records are always discarded.
///
/// 36061 (New York County) duplicates the New York City total the feed
/// already reports.
pub const BLACKLISTED_FIPS: &[&str] = &["36061"];

// ---------------------------------------------------------------------------
// Ordering policies
// ---------------------------------------------------------------------------

/// How to resolve several records competing for one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicatePolicy {
    FirstWins,
    LastWins,
}

impl DuplicatePolicy {
    /// Store `point` under `key` according to the policy.
    pub fn insert(self, map: &mut StatesKeyed, key: String, point: CoronaDataPoint) {
        match self {
            DuplicatePolicy::FirstWins => {
                map.entry(key).or_insert(point);
            }
            DuplicatePolicy::LastWins => {
                map.insert(key, point);
            }
        }
    }

    /// Pick one record out of a sequence in feed order.
    pub fn select<T>(self, mut items: Vec<T>) -> Option<T> {
        match self {
            DuplicatePolicy::FirstWins => items.into_iter().next(),
            DuplicatePolicy::LastWins => items.pop(),
        }
    }
}

/// A later state aggregate for the same state replaces the earlier one.
pub const STATE_AGGREGATE_POLICY: DuplicatePolicy = DuplicatePolicy::LastWins;

/// Only the first nation-level record surfaces in the result.
pub const NATION_SELECTION: DuplicatePolicy = DuplicatePolicy::FirstWins;

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Where a normalized record is filed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Bucket {
    /// County record, keyed by state name. Appended in feed order.
    County(String),
    /// State-level aggregate, keyed by state name.
    State(String),
    /// Nation-level aggregate. Appended in feed order.
    Nation,
}

/// The three collections produced from one feed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Buckets {
    pub nation: Vec<CoronaDataPoint>,
    pub states: StatesKeyed,
    pub counties: CountiesKeyed,
}

impl Buckets {
    pub fn file(&mut self, bucket: Bucket, point: CoronaDataPoint) {
        match bucket {
            Bucket::County(state) => self.counties.entry(state).or_default().push(point),
            Bucket::State(state) => STATE_AGGREGATE_POLICY.insert(&mut self.states, state, point),
            Bucket::Nation => self.nation.push(point),
        }
    }

    /// Total number of filed records across all three buckets.
    pub fn len(&self) -> usize {
        self.nation.len()
            + self.states.len()
            + self.counties.values().map(Vec::len).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Build the output-shaped data point for a raw record.
///
/// The county keeps its original spelling when it survives cleaning;
/// cleaning only decides whether a county is present at all.
pub fn normalize_record(record: &RawRecord, directory: &FipsDirectory) -> CoronaDataPoint {
    let county = accepted_county(record.county.as_deref()).map(String::from);
    let fips_code = directory.lookup(
        record.state.as_deref(),
        county.as_deref(),
        record.city_name(),
    );

    CoronaDataPoint {
        total_cases: TotalCases::Count(record.cases),
        deaths: record.deaths,
        recovered: record.recovered,
        active_cases: record.active,
        county,
        state: record.state.clone(),
        fips_code,
        last_updated: None,
    }
}

/// Decide which bucket a normalized record belongs to, or `None` to drop it.
pub fn classify(record: &RawRecord, point: &CoronaDataPoint) -> Option<Bucket> {
    let state = point.state.as_deref().filter(|s| !s.is_empty());

    match state {
        Some(state) if point.county.is_some() => Some(Bucket::County(state.to_string())),
        Some(state) if !record.has_city_field() => Some(Bucket::State(state.to_string())),
        _ if point.fips_code == NATION_FIPS => Some(Bucket::Nation),
        _ => None,
    }
}

/// Split decoded records into nation, state, and county buckets.
pub fn separate_into_buckets(records: &[RawRecord], directory: &FipsDirectory) -> Buckets {
    let mut buckets = Buckets::default();

    for record in records {
        if record.country != UNITED_STATES {
            continue;
        }

        let point = normalize_record(record, directory);

        if BLACKLISTED_FIPS.contains(&point.fips_code.as_str()) {
            continue;
        }

        if let Some(bucket) = classify(record, &point) {
            buckets.file(bucket, point);
        }
    }

    buckets
}

/// Decode raw JSON values, skipping entries that are not valid records.
/// Returns the records and the number skipped.
pub fn decode_records(values: Vec<serde_json::Value>) -> (Vec<RawRecord>, usize) {
    let total = values.len();
    let records: Vec<RawRecord> = values
        .into_iter()
        .filter_map(|value| serde_json::from_value(value).ok())
        .collect();
    let skipped = total - records.len();
    (records, skipped)
}

/// Reshape an already-fetched feed into the breakdown.
pub fn build_breakdown(
    values: Vec<serde_json::Value>,
    directory: &FipsDirectory,
    logger: &dyn LogSink,
) -> CoronaBreakdown {
    let total = values.len();
    let (records, skipped) = decode_records(values);
    log_ingest_summary(logger, total, records.len(), skipped);

    let Buckets { nation, states, counties } = separate_into_buckets(&records, directory);

    log_anomalies(&nation, &states, &counties, logger);

    CoronaBreakdown {
        nation: NATION_SELECTION.select(nation),
        states: total_breakdowns(states, counties),
    }
}

/// Fetch the feed and reshape it. Never fails; see the module docs.
pub async fn get_corona_data<S: FeedSource>(
    source: &S,
    directory: &FipsDirectory,
    logger: &dyn LogSink,
) -> CoronaBreakdown {
    match source.fetch().await {
        Ok(values) => build_breakdown(values, directory, logger),
        Err(e) => {
            log_feed_failure(logger, source.location(), "Corona Data Scraper fetch", &e);
            CoronaBreakdown::unavailable()
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

/// Integration tests for the Corona Data Scraper ingestion pipeline
///
/// These tests drive the public API end to end with an in-memory feed:
/// 1. Filtering (country, blacklist) across the whole pipeline
/// 2. Classification into nation / state / county
/// 3. Placeholder behavior when the feed fails
/// 4. Idempotence across repeated calls
///
/// The live-feed test is marked #[ignore] because it depends on an external
/// host being up. Run it manually with:
///   cargo test --test coronadatascraper_integration -- --ignored

use covid_stats_service::fips::FipsDirectory;
use covid_stats_service::ingest::coronadatascraper::{
    get_corona_data, separate_into_buckets, BLACKLISTED_FIPS,
};
use covid_stats_service::ingest::{FeedError, FeedSource, HttpFeedSource, CORONA_DATA_SCRAPER_URL};
use covid_stats_service::logging::{LogLevel, MemoryLogger};
use covid_stats_service::model::{CoronaBreakdown, RawRecord, TotalCases};

use serde_json::{json, Value};
use std::time::Duration;

// ---------------------------------------------------------------------------
// Test Helpers
// ---------------------------------------------------------------------------

/// Feed that serves a fixed list of records, or fails like a dead network.
struct InMemoryFeed {
    records: Option<Vec<Value>>,
}

impl InMemoryFeed {
    fn serving(records: Vec<Value>) -> Self {
        InMemoryFeed { records: Some(records) }
    }

    fn unreachable() -> Self {
        InMemoryFeed { records: None }
    }
}

impl FeedSource for InMemoryFeed {
    fn location(&self) -> &str {
        "memory://feed"
    }

    async fn fetch(&self) -> Result<Vec<Value>, FeedError> {
        self.records
            .clone()
            .ok_or_else(|| FeedError::Parse("simulated network failure".to_string()))
    }
}

fn directory() -> FipsDirectory {
    FipsDirectory::bundled().expect("bundled county table should load")
}

fn us(fields: Value) -> Value {
    let mut record = json!({ "country": "United States" });
    if let (Some(target), Some(extra)) = (record.as_object_mut(), fields.as_object()) {
        for (k, v) in extra {
            target.insert(k.clone(), v.clone());
        }
    }
    record
}

fn mixed_feed() -> Vec<Value> {
    vec![
        us(json!({ "cases": 1000, "deaths": 30 })),
        us(json!({ "state": "California", "cases": 200 })),
        us(json!({ "state": "California", "county": "Los Angeles", "cases": 10 })),
        us(json!({ "state": "Texas", "cases": 400 })),
        us(json!({ "state": "Texas", "cases": 500 })),
        us(json!({ "state": "New York", "county": "New York County", "cases": 77 })),
        json!({ "country": "Mexico", "state": "Jalisco", "cases": 55 }),
        us(json!({ "cases": 2000 })),
    ]
}

// ---------------------------------------------------------------------------
// Pipeline Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_mixed_feed_produces_expected_breakdown() {
    let logger = MemoryLogger::new();
    let breakdown = get_corona_data(&InMemoryFeed::serving(mixed_feed()), &directory(), &logger).await;

    let nation = breakdown.nation.as_ref().expect("feed has nation records");
    assert_eq!(nation.total_cases, TotalCases::Count(1000), "only the first nation record surfaces");
    assert_eq!(nation.deaths, Some(30));

    let california = &breakdown.states["California"];
    assert_eq!(california.state.total_cases, TotalCases::Count(200));
    assert_eq!(california.counties.len(), 1);
    assert_eq!(california.counties[0].total_cases, TotalCases::Count(10));
    assert_eq!(california.counties[0].county.as_deref(), Some("Los Angeles"));

    let texas = &breakdown.states["Texas"];
    assert_eq!(texas.state.total_cases, TotalCases::Count(500), "later Texas aggregate wins");
    assert!(texas.counties.is_empty());

    assert!(
        !breakdown.states.contains_key("Jalisco"),
        "non-US records must never appear"
    );
    assert!(
        !breakdown.states.contains_key("New York"),
        "the only New York record is blacklisted"
    );

    assert_eq!(logger.count_at(LogLevel::Error), 0);
}

#[test]
fn test_blacklisted_and_foreign_records_reach_no_bucket() {
    let records: Vec<RawRecord> = mixed_feed()
        .into_iter()
        .map(|v| serde_json::from_value(v).expect("fixture record should decode"))
        .collect();

    let buckets = separate_into_buckets(&records, &directory());

    let every_point = buckets
        .nation
        .iter()
        .chain(buckets.states.values())
        .chain(buckets.counties.values().flatten());

    for point in every_point {
        assert!(
            !BLACKLISTED_FIPS.contains(&point.fips_code.as_str()),
            "blacklisted FIPS {} leaked into a bucket",
            point.fips_code
        );
        assert_ne!(point.state.as_deref(), Some("Jalisco"));
    }

    // 2 nation + California + Texas aggregates + 1 county
    assert_eq!(buckets.len(), 5);
}

#[tokio::test]
async fn test_unreachable_feed_yields_exact_placeholder() {
    let logger = MemoryLogger::new();
    let breakdown = get_corona_data(&InMemoryFeed::unreachable(), &directory(), &logger).await;

    assert_eq!(breakdown, CoronaBreakdown::unavailable());
    assert_eq!(
        serde_json::to_value(&breakdown).unwrap(),
        json!({ "nation": { "fipsCode": "999", "totalCases": "N/A" }, "states": {} })
    );

    let errors: Vec<_> = logger
        .entries()
        .into_iter()
        .filter(|e| e.level == LogLevel::Error)
        .collect();
    assert_eq!(errors.len(), 1, "exactly one error entry expected: {:?}", logger.entries());
    assert!(errors[0].message.contains("simulated network failure"));
}

#[tokio::test]
async fn test_same_feed_twice_gives_same_result() {
    let feed = InMemoryFeed::serving(mixed_feed());
    let logger = MemoryLogger::new();

    let first = get_corona_data(&feed, &directory(), &logger).await;
    let second = get_corona_data(&feed, &directory(), &logger).await;

    assert_eq!(first, second, "no state may accumulate between calls");
}

#[tokio::test]
async fn test_empty_feed_has_no_nation_and_no_states() {
    let logger = MemoryLogger::new();
    let breakdown = get_corona_data(&InMemoryFeed::serving(Vec::new()), &directory(), &logger).await;

    assert_eq!(breakdown.nation, None);
    assert!(breakdown.states.is_empty());
    assert_eq!(
        serde_json::to_value(&breakdown).unwrap(),
        json!({ "states": {} }),
        "a missing nation record is omitted, not replaced by the placeholder"
    );
}

// ---------------------------------------------------------------------------
// Live Feed
// ---------------------------------------------------------------------------

#[tokio::test]
#[ignore] // Don't run in CI - depends on external host
async fn live_feed_returns_breakdown_or_placeholder() {
    let source = HttpFeedSource::new(CORONA_DATA_SCRAPER_URL, Some(Duration::from_secs(60)))
        .expect("Failed to create HTTP client");
    let logger = MemoryLogger::new();

    let breakdown = get_corona_data(&source, &directory(), &logger).await;

    if breakdown == CoronaBreakdown::unavailable() {
        eprintln!("\n⚠ WARNING: live feed unavailable, placeholder served");
        for entry in logger.entries() {
            eprintln!("  {} {}: {}", entry.level, entry.source, entry.message);
        }
        return;
    }

    println!("✓ Live feed returned {} states", breakdown.states.len());
    assert!(!breakdown.states.is_empty(), "a healthy feed should list states");
}

/// Representative Corona Data Scraper payloads for unit tests.
///
/// Shapes follow the published `data.json`: one flat object per location,
/// with the nation, state, county, and city levels mixed together.

/// A small but complete feed: one nation record, state aggregates,
/// counties (including an unassigned bucket and the blacklisted
/// New York County), a city-only record, and a foreign record.
pub const SAMPLE_FEED: &str = r#"[
  {
    "country": "United States",
    "cases": 1000,
    "deaths": 40,
    "recovered": 100,
    "active": 860,
    "population": 328239523,
    "url": "https://example.test/us",
    "aggregate": "state"
  },
  {
    "state": "California",
    "country": "United States",
    "cases": 300,
    "deaths": 10,
    "aggregate": "county"
  },
  {
    "county": "Los Angeles County",
    "state": "California",
    "country": "United States",
    "cases": 120,
    "deaths": 4,
    "lat": 34.05,
    "long": -118.24
  },
  {
    "county": "San Francisco County",
    "state": "California",
    "country": "United States",
    "cases": 80
  },
  {
    "county": "Unassigned",
    "state": "California",
    "country": "United States",
    "cases": 7
  },
  {
    "state": "New York",
    "country": "United States",
    "cases": 500,
    "tested": 2000
  },
  {
    "county": "New York County",
    "state": "New York",
    "country": "United States",
    "cases": 250
  },
  {
    "county": "Kings County",
    "state": "New York",
    "country": "United States",
    "cases": 150
  },
  {
    "city": "Austin",
    "state": "Texas",
    "country": "United States",
    "cases": 30
  },
  {
    "county": "Travis County",
    "state": "Texas",
    "country": "United States",
    "cases": 25,
    "active": 20
  },
  {
    "state": "Ontario",
    "country": "Canada",
    "cases": 90
  },
  {
    "country": "United States",
    "cases": 999999
  }
]"#;

/// Feed where one record is malformed (no `cases`) and the rest are fine.
pub const FEED_WITH_MALFORMED_RECORD: &str = r#"[
  { "state": "Ohio", "country": "United States", "cases": 12 },
  { "state": "Ohio", "country": "United States" },
  { "country": "United States", "cases": 40 }
]"#;

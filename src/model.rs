/// Core data types for the COVID-19 statistics service.
///
/// This module defines the shared domain model imported by all other modules:
/// the raw feed record as published by Corona Data Scraper, the normalized
/// data point we serve, and the nation/state/county breakdown.
/// It contains no I/O, only types and their (de)serialization rules.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Well-known codes
// ---------------------------------------------------------------------------

/// FIPS code used for nation-level records and for anything that cannot be
/// attributed to a known state.
pub const NATION_FIPS: &str = "999";

/// Country value that marks a record as belonging to the United States.
pub const UNITED_STATES: &str = "United States";

// ---------------------------------------------------------------------------
// Raw feed record
// ---------------------------------------------------------------------------

/// A single entry of the Corona Data Scraper `data.json` array.
///
/// Numeric fields are parsed permissively: a missing, null, or non-numeric
/// value becomes `None` instead of failing the whole feed. Only `country`
/// and `cases` are required.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawRecord {
    /// `None` when the key is absent, `Some(None)` when it is present but null.
    #[serde(default, deserialize_with = "present_field")]
    pub city: Option<Option<String>>,
    #[serde(default)]
    pub county: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    pub country: String,
    #[serde(deserialize_with = "required_count")]
    pub cases: i64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub deaths: Option<i64>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub recovered: Option<i64>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub tested: Option<i64>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub active: Option<i64>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub population: Option<i64>,
    #[serde(default, deserialize_with = "lenient_float")]
    pub lat: Option<f64>,
    #[serde(default, deserialize_with = "lenient_float")]
    pub long: Option<f64>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub aggregate: Option<String>,
}

impl RawRecord {
    /// City name, if the record carries a non-null one.
    pub fn city_name(&self) -> Option<&str> {
        self.city.as_ref().and_then(|c| c.as_deref())
    }

    /// Whether the record has a `city` key at all, even a null one.
    pub fn has_city_field(&self) -> bool {
        self.city.is_some()
    }
}

fn present_field<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn value_as_count(value: &serde_json::Value) -> Option<i64> {
    match value {
        serde_json::Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.round() as i64)),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok()
            .filter(|f| f.is_finite())
            .map(|f| f.round() as i64),
        _ => None,
    }
}

fn lenient_count<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value_as_count(&value))
}

fn required_count<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    value_as_count(&value)
        .ok_or_else(|| serde::de::Error::custom(format!("cases is not a number: {}", value)))
}

fn lenient_float<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

// ---------------------------------------------------------------------------
// Normalized data point
// ---------------------------------------------------------------------------

/// Total case count of a data point.
///
/// `NotAvailable` only appears in the placeholder returned when the feed
/// could not be fetched; it serializes as the string `"N/A"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TotalCases {
    Count(i64),
    NotAvailable,
}

impl TotalCases {
    pub fn count(&self) -> Option<i64> {
        match self {
            TotalCases::Count(n) => Some(*n),
            TotalCases::NotAvailable => None,
        }
    }
}

impl Serialize for TotalCases {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            TotalCases::Count(n) => serializer.serialize_i64(*n),
            TotalCases::NotAvailable => serializer.serialize_str("N/A"),
        }
    }
}

/// The cleaned, output-shaped record served to clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoronaDataPoint {
    pub total_cases: TotalCases,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deaths: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recovered: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_cases: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub county: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    pub fips_code: String,
    /// Corona Data Scraper publishes no per-record timestamp, so this is always `None`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
}

impl CoronaDataPoint {
    /// The sentinel nation value used when the feed is unavailable:
    /// `{ "fipsCode": "999", "totalCases": "N/A" }`.
    pub fn unavailable() -> Self {
        CoronaDataPoint {
            total_cases: TotalCases::NotAvailable,
            deaths: None,
            recovered: None,
            active_cases: None,
            county: None,
            state: None,
            fips_code: NATION_FIPS.to_string(),
            last_updated: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Breakdown types
// ---------------------------------------------------------------------------

/// A state's aggregate record together with its county records, in feed order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateBreakdown {
    pub state: CoronaDataPoint,
    pub counties: Vec<CoronaDataPoint>,
}

/// State-level aggregate records keyed by state name.
pub type StatesKeyed = BTreeMap<String, CoronaDataPoint>;

/// County records keyed by state name, in feed order.
pub type CountiesKeyed = BTreeMap<String, Vec<CoronaDataPoint>>;

/// Per-state breakdowns keyed by state name.
pub type TotalBreakdown = BTreeMap<String, StateBreakdown>;

/// The nation/state partitioned view of one feed fetch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoronaBreakdown {
    /// First nation-level record of the feed, or `None` when the feed had none.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nation: Option<CoronaDataPoint>,
    pub states: TotalBreakdown,
}

impl CoronaBreakdown {
    /// Placeholder returned whenever the feed cannot be fetched or parsed.
    pub fn unavailable() -> Self {
        CoronaBreakdown {
            nation: Some(CoronaDataPoint::unavailable()),
            states: BTreeMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unavailable_breakdown_serializes_to_placeholder() {
        let value = serde_json::to_value(CoronaBreakdown::unavailable()).unwrap();
        assert_eq!(
            value,
            json!({ "nation": { "fipsCode": "999", "totalCases": "N/A" }, "states": {} })
        );
    }

    #[test]
    fn test_raw_record_tolerates_bad_optional_fields() {
        let record: RawRecord = serde_json::from_value(json!({
            "country": "United States",
            "state": "Ohio",
            "cases": 12,
            "deaths": "unknown",
            "recovered": null,
            "active": 3.6,
            "lat": "40.1",
        }))
        .expect("optional fields should never fail the record");

        assert_eq!(record.cases, 12);
        assert_eq!(record.deaths, None);
        assert_eq!(record.recovered, None);
        assert_eq!(record.active, Some(4));
        assert_eq!(record.lat, Some(40.1));
        assert_eq!(record.city, None);
        assert!(!record.has_city_field());
    }

    #[test]
    fn test_raw_record_distinguishes_null_city_from_absent() {
        let record: RawRecord = serde_json::from_value(json!({
            "country": "United States",
            "state": "Texas",
            "city": null,
            "cases": 5,
        }))
        .expect("null city should decode");
        assert!(record.has_city_field());
        assert_eq!(record.city_name(), None);

        let record: RawRecord = serde_json::from_value(json!({
            "country": "United States",
            "city": "Austin",
            "cases": 5,
        }))
        .expect("named city should decode");
        assert_eq!(record.city_name(), Some("Austin"));
    }

    #[test]
    fn test_raw_record_requires_cases() {
        let result = serde_json::from_value::<RawRecord>(json!({
            "country": "United States",
            "state": "Ohio",
        }));
        assert!(result.is_err(), "a record without cases should be rejected");

        let result = serde_json::from_value::<RawRecord>(json!({
            "country": "United States",
            "cases": "many",
        }));
        assert!(result.is_err(), "a record with non-numeric cases should be rejected");
    }

    #[test]
    fn test_data_point_omits_absent_fields() {
        let point = CoronaDataPoint {
            total_cases: TotalCases::Count(10),
            deaths: Some(1),
            recovered: None,
            active_cases: None,
            county: Some("Los Angeles County".to_string()),
            state: Some("California".to_string()),
            fips_code: "06037".to_string(),
            last_updated: None,
        };
        assert_eq!(
            serde_json::to_value(&point).unwrap(),
            json!({
                "totalCases": 10,
                "deaths": 1,
                "county": "Los Angeles County",
                "state": "California",
                "fipsCode": "06037",
            })
        );
    }
}

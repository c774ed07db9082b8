/// Post-ingest analysis for the COVID-19 statistics service.
///
/// Submodules:
/// - `anomalies` — read-only diagnostics over the nation/state/county buckets.
/// - `breakdown` — combines state aggregates with their county records.

pub mod anomalies;
pub mod breakdown;

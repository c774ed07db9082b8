/// covid_stats_service: U.S. COVID-19 case statistics backend.
///
/// # Module structure
///
/// ```text
/// covid_stats_service
/// ├── model       — raw feed records, normalized data points, breakdown types
/// ├── states      — U.S. state registry with FIPS codes; state-code validation
/// ├── fips        — county-name normalization and FIPS lookup
/// ├── ingest
/// │   ├── coronadatascraper — feed reshaping into nation/state/county
/// │   └── fixtures (test only) — representative feed payloads
/// ├── analysis
/// │   ├── anomalies — read-only feed diagnostics
/// │   └── breakdown — state aggregates combined with county records
/// ├── logging     — injected structured logger
/// ├── config      — TOML + environment configuration
/// └── server      — axum routes and static frontend
/// ```

pub mod analysis;
pub mod config;
pub mod fips;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod server;
pub mod states;

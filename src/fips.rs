//! County-name normalization and FIPS code lookup.
//!
//! The feed identifies places by name only. This module turns a
//! (state, county, city) triple into a FIPS code so records can be
//! blacklisted and classified. County codes come from a bundled table
//! (`data/county_fips.csv`), optionally extended by an external CSV
//! configured at startup.

use crate::model::NATION_FIPS;
use crate::states::state_fips;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

const BUNDLED_COUNTY_TABLE: &str = include_str!("../data/county_fips.csv");

/// Suffix appended to a state code when the county cannot be resolved.
const UNALLOCATED_COUNTY: &str = "999";

/// Trailing designators removed from county names, longest first so that
/// "city and borough" wins over "borough".
const COUNTY_DESIGNATORS: &[&str] = &[
    " city and borough",
    " census area",
    " municipality",
    " county",
    " parish",
    " borough",
];

/// Cities the feed reports without a county, mapped to the county they cover.
const CITY_ALIASES: &[(&str, &str, &str)] = &[
    ("New York", "new york city", "36061"),
    ("New York", "new york", "36061"),
];

#[derive(Debug, Error)]
pub enum FipsError {
    #[error("failed to read county FIPS table {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed county FIPS table at line {line}: '{content}'")]
    MalformedLine { line: usize, content: String },
}

// ---------------------------------------------------------------------------
// County-name normalization
// ---------------------------------------------------------------------------

/// Normalizes a county name for comparison.
///
/// Trims, lowercases, drops periods, collapses whitespace, and strips one
/// trailing designator ("County", "Parish", ...). `None` stays `None`; a
/// blank name becomes `Some("")`.
pub fn clean_county_name(county: Option<&str>) -> Option<String> {
    let county = county?;
    let lowered = county.to_lowercase().replace('.', "");
    let mut name = lowered.split_whitespace().collect::<Vec<_>>().join(" ");

    for designator in COUNTY_DESIGNATORS {
        if let Some(stripped) = name.strip_suffix(designator) {
            name = stripped.trim_end().to_string();
            break;
        }
    }

    Some(name)
}

/// Returns the original county string if it names a real county.
///
/// A county whose cleaned name is empty or contains "unassigned" is
/// treated as absent. The original, uncleaned value is what callers keep.
pub fn accepted_county(county: Option<&str>) -> Option<&str> {
    let cleaned = clean_county_name(county)?;
    if cleaned.is_empty() || cleaned.contains("unassigned") {
        return None;
    }
    county
}

// ---------------------------------------------------------------------------
// FIPS directory
// ---------------------------------------------------------------------------

/// County FIPS codes keyed by (state FIPS, cleaned county name).
#[derive(Debug, Clone, Default)]
pub struct FipsDirectory {
    counties: HashMap<(String, String), String>,
}

impl FipsDirectory {
    /// Directory built from the bundled county table only.
    pub fn bundled() -> Result<Self, FipsError> {
        let mut directory = FipsDirectory::default();
        directory.extend_from_csv(BUNDLED_COUNTY_TABLE)?;
        Ok(directory)
    }

    /// Bundled table extended (and overridden) by the CSV file at `path`.
    pub fn load(path: &Path) -> Result<Self, FipsError> {
        let contents = std::fs::read_to_string(path).map_err(|source| FipsError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let mut directory = Self::bundled()?;
        directory.extend_from_csv(&contents)?;
        Ok(directory)
    }

    /// Parses `fips,state,county` rows. The first line is a header; blank
    /// lines are skipped.
    pub fn extend_from_csv(&mut self, csv: &str) -> Result<usize, FipsError> {
        let mut added = 0;

        for (i, line) in csv.lines().enumerate() {
            if i == 0 || line.trim().is_empty() {
                continue;
            }

            let malformed = || FipsError::MalformedLine {
                line: i + 1,
                content: line.to_string(),
            };

            let fields: Vec<&str> = line.split(',').map(str::trim).collect();
            if fields.len() != 3 {
                return Err(malformed());
            }

            let (code, state, county) = (fields[0], fields[1], fields[2]);
            if code.len() != 5 || !code.chars().all(|c| c.is_ascii_digit()) {
                return Err(malformed());
            }
            let state_code = state_fips(state).ok_or_else(malformed)?;
            let county_name = clean_county_name(Some(county))
                .filter(|c| !c.is_empty())
                .ok_or_else(malformed)?;

            self.counties
                .insert((state_code.to_string(), county_name), code.to_string());
            added += 1;
        }

        Ok(added)
    }

    pub fn len(&self) -> usize {
        self.counties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counties.is_empty()
    }

    /// 5-digit county code, if the county is known.
    pub fn county_code(&self, state: &str, county: &str) -> Option<&str> {
        let state_code = state_fips(state)?;
        let cleaned = clean_county_name(Some(county))?;
        self.counties
            .get(&(state_code.to_string(), cleaned))
            .map(String::as_str)
    }

    /// Derives the FIPS code for a feed record.
    ///
    /// - no state, or a state outside the registry → `"999"`
    /// - county given → county code, or `<state>999` if unknown
    /// - city given without county → aliased county code, or `<state>999`
    /// - otherwise → the 2-digit state code
    pub fn lookup(&self, state: Option<&str>, county: Option<&str>, city: Option<&str>) -> String {
        let Some(state) = state.filter(|s| !s.trim().is_empty()) else {
            return NATION_FIPS.to_string();
        };
        let Some(state_code) = state_fips(state) else {
            return NATION_FIPS.to_string();
        };

        if let Some(county) = county {
            return self
                .county_code(state, county)
                .map(String::from)
                .unwrap_or_else(|| format!("{}{}", state_code, UNALLOCATED_COUNTY));
        }

        if let Some(city) = city {
            let city = city.trim().to_lowercase();
            return CITY_ALIASES
                .iter()
                .find(|(alias_state, alias_city, _)| {
                    alias_state.eq_ignore_ascii_case(state.trim()) && *alias_city == city
                })
                .map(|(_, _, code)| code.to_string())
                .unwrap_or_else(|| format!("{}{}", state_code, UNALLOCATED_COUNTY));
        }

        state_code.to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

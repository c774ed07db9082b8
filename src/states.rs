/// U.S. state registry for the COVID-19 statistics service.
///
/// Defines the canonical list of states, the District of Columbia, and the
/// inhabited territories, with their postal abbreviations and 2-digit FIPS
/// codes. This is the single source of truth for state identifiers; the
/// FIPS lookup and the state-code route validation both read from here.

// ---------------------------------------------------------------------------
// State metadata
// ---------------------------------------------------------------------------

/// Metadata for a single state or territory.
#[derive(Debug)]
pub struct UsState {
    /// Name as it appears in the Corona Data Scraper feed.
    pub name: &'static str,
    /// Two-letter USPS abbreviation.
    pub abbreviation: &'static str,
    /// 2-digit FIPS state code.
    pub fips: &'static str,
}

const fn state(name: &'static str, abbreviation: &'static str, fips: &'static str) -> UsState {
    UsState { name, abbreviation, fips }
}

/// All states and territories, ordered by FIPS code.
pub static STATE_REGISTRY: &[UsState] = &[
    state("Alabama", "AL", "01"),
    state("Alaska", "AK", "02"),
    state("Arizona", "AZ", "04"),
    state("Arkansas", "AR", "05"),
    state("California", "CA", "06"),
    state("Colorado", "CO", "08"),
    state("Connecticut", "CT", "09"),
    state("Delaware", "DE", "10"),
    state("District of Columbia", "DC", "11"),
    state("Florida", "FL", "12"),
    state("Georgia", "GA", "13"),
    state("Hawaii", "HI", "15"),
    state("Idaho", "ID", "16"),
    state("Illinois", "IL", "17"),
    state("Indiana", "IN", "18"),
    state("Iowa", "IA", "19"),
    state("Kansas", "KS", "20"),
    state("Kentucky", "KY", "21"),
    state("Louisiana", "LA", "22"),
    state("Maine", "ME", "23"),
    state("Maryland", "MD", "24"),
    state("Massachusetts", "MA", "25"),
    state("Michigan", "MI", "26"),
    state("Minnesota", "MN", "27"),
    state("Mississippi", "MS", "28"),
    state("Missouri", "MO", "29"),
    state("Montana", "MT", "30"),
    state("Nebraska", "NE", "31"),
    state("Nevada", "NV", "32"),
    state("New Hampshire", "NH", "33"),
    state("New Jersey", "NJ", "34"),
    state("New Mexico", "NM", "35"),
    state("New York", "NY", "36"),
    state("North Carolina", "NC", "37"),
    state("North Dakota", "ND", "38"),
    state("Ohio", "OH", "39"),
    state("Oklahoma", "OK", "40"),
    state("Oregon", "OR", "41"),
    state("Pennsylvania", "PA", "42"),
    state("Rhode Island", "RI", "44"),
    state("South Carolina", "SC", "45"),
    state("South Dakota", "SD", "46"),
    state("Tennessee", "TN", "47"),
    state("Texas", "TX", "48"),
    state("Utah", "UT", "49"),
    state("Vermont", "VT", "50"),
    state("Virginia", "VA", "51"),
    state("Washington", "WA", "53"),
    state("West Virginia", "WV", "54"),
    state("Wisconsin", "WI", "55"),
    state("Wyoming", "WY", "56"),
    state("American Samoa", "AS", "60"),
    state("Guam", "GU", "66"),
    state("Northern Mariana Islands", "MP", "69"),
    state("Puerto Rico", "PR", "72"),
    state("United States Virgin Islands", "VI", "78"),
];

/// Looks up a state by postal abbreviation or full name, ignoring case and
/// surrounding whitespace. Returns `None` if not found.
pub fn find_state(value: &str) -> Option<&'static UsState> {
    let value = value.trim();
    STATE_REGISTRY.iter().find(|s| {
        s.abbreviation.eq_ignore_ascii_case(value) || s.name.eq_ignore_ascii_case(value)
    })
}

/// Returns the 2-digit FIPS code for a state name or abbreviation.
pub fn state_fips(value: &str) -> Option<&'static str> {
    find_state(value).map(|s| s.fips)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

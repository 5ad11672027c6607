//! Fixed codes, thresholds and strings used by the loader and the quiz.
//!
//! Tunable numbers (scores, delays, padding, zoom limits) live in
//! `QuizConfig`; the values here describe the data and are not meant to be
//! adjusted per deployment.

// Country codes ------------------------------------------------------------
pub const UNCLAIMED_ID: &str = "-99";
pub const SOMALIA_ID: &str = "706";
pub const KOSOVO_ID: &str = "383";
pub const FRANCE_ID: &str = "250";
pub const RUSSIA_ID: &str = "643";
pub const FIJI_ID: &str = "242";
pub const VANUATU_ID: &str = "548";

// Loader -------------------------------------------------------------------
pub const TOPOLOGY_OBJECT: &str = "countries";
pub const CITY_CANDIDATES: usize = 7;
pub const MAX_CITIES: usize = 6;
pub const MIN_CITIES: usize = 3;
pub const FACT_LANGUAGES: usize = 3;
pub const FACT_CURRENCIES: usize = 2;
pub const UNKNOWN_FACT: &str = "Unknown";

// Quiz ---------------------------------------------------------------------
pub const CITY_CHOICES: usize = 3;
pub const FALLBACK_CITY_FACT: &str = "Major city.";
pub const PROMPT_FIND_COUNTRY: &str = "Find Country";
pub const PROMPT_FIND_CITY: &str = "Find City";
pub const PROMPT_CAPITAL: &str = "Capital";
pub const PROMPT_IDENTIFY_CITY: &str = "Identify City";
pub const ACTION_NEXT_COUNTRY: &str = "Next Country";
pub const ACTION_TRY_AGAIN: &str = "Try Again";

// Synthetic Kosovo entry ---------------------------------------------------
pub const KOSOVO_NAME: &str = "Kosovo";
pub const KOSOVO_CAPITAL: &str = "Pristina";
pub const KOSOVO_REGION: &str = "Europe";
pub const KOSOVO_SUBREGION: &str = "Southeast Europe";
/// `(name, lat, lon, fact)`
pub const KOSOVO_CITIES: [(&str, f64, f64, &str); 4] = [
    (
        "Pristina",
        42.6629,
        21.1655,
        "Pristina is the capital and largest city.",
    ),
    (
        "Prizren",
        42.2141,
        20.7365,
        "Prizren is a historic city known for its fortress.",
    ),
    (
        "Peja",
        42.6594,
        20.2887,
        "Peja is located near the Rugova Canyon.",
    ),
    (
        "Gjakova",
        42.3804,
        20.4309,
        "Gjakova has a well-preserved Old Bazaar.",
    ),
];

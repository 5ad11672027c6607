use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::constants::{
    FACT_CURRENCIES, FACT_LANGUAGES, KOSOVO_CAPITAL, KOSOVO_CITIES, KOSOVO_ID, KOSOVO_NAME,
    KOSOVO_REGION, KOSOVO_SUBREGION, MIN_CITIES, UNCLAIMED_ID, UNKNOWN_FACT,
};
use crate::continent::{Continent, resolve_continent};
use crate::geo::LonLat;

/// Left-pad a numeric country code to three characters.
///
/// Codes already three characters or longer are returned unchanged.
#[must_use]
pub fn pad3(code: impl fmt::Display) -> String {
    format!("{code:0>3}")
}

/// Three-digit numeric country code (ISO 3166-1 numeric).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CountryId(String);

impl CountryId {
    #[must_use]
    pub fn new(code: impl fmt::Display) -> Self {
        Self(pad3(code))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the id is the topology's "no sovereign state" marker.
    #[must_use]
    pub fn is_unclaimed(&self) -> bool {
        self.0 == UNCLAIMED_ID
    }
}

impl fmt::Display for CountryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CountryId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// A code that upstream data sometimes encodes as a string and sometimes as
/// a number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CodeValue {
    Text(String),
    Number(i64),
}

impl fmt::Display for CodeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Number(number) => write!(f, "{number}"),
        }
    }
}

impl CodeValue {
    #[must_use]
    pub fn to_country_id(&self) -> Option<CountryId> {
        match self {
            Self::Text(text) if text.trim().is_empty() => None,
            Self::Text(text) => Some(CountryId::new(text.trim())),
            Self::Number(number) => Some(CountryId::new(number)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CountryName {
    #[serde(default)]
    pub common: Option<String>,
    #[serde(default)]
    pub official: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NameField {
    Structured(CountryName),
    Plain(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CapitalField {
    One(String),
    Many(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CapitalInfo {
    #[serde(default)]
    pub latlng: Option<Vec<f64>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Currency {
    #[serde(default)]
    pub name: Option<String>,
}

/// One entry of the country metadata resource. Unknown fields are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CountryMeta {
    #[serde(default)]
    pub name: Option<NameField>,
    #[serde(default)]
    pub cca2: Option<String>,
    #[serde(default)]
    pub cca3: Option<String>,
    #[serde(default)]
    pub ccn3: Option<CodeValue>,
    #[serde(default)]
    pub cioc: Option<String>,
    #[serde(default)]
    pub capital: Option<CapitalField>,
    #[serde(default, rename = "capitalInfo")]
    pub capital_info: Option<CapitalInfo>,
    #[serde(default)]
    pub latlng: Option<Vec<f64>>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub subregion: Option<String>,
    #[serde(default)]
    pub area: Option<f64>,
    #[serde(default)]
    pub languages: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub currencies: Option<BTreeMap<String, Currency>>,
}

impl CountryMeta {
    /// Metadata for Kosovo when the upstream resource omits it.
    #[must_use]
    pub fn synthetic_kosovo() -> Self {
        Self {
            name: Some(NameField::Structured(CountryName {
                common: Some(KOSOVO_NAME.to_string()),
                official: None,
            })),
            ccn3: Some(CodeValue::Text(KOSOVO_ID.to_string())),
            capital: Some(CapitalField::Many(vec![KOSOVO_CAPITAL.to_string()])),
            region: Some(KOSOVO_REGION.to_string()),
            subregion: Some(KOSOVO_SUBREGION.to_string()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn country_id(&self) -> Option<CountryId> {
        self.ccn3.as_ref().and_then(CodeValue::to_country_id)
    }

    #[must_use]
    pub fn display_name(&self) -> Option<String> {
        match self.name.as_ref()? {
            NameField::Plain(name) => Some(name.clone()),
            NameField::Structured(name) => name.common.clone().or_else(|| name.official.clone()),
        }
    }

    /// Short label shown next to the country prompt.
    #[must_use]
    pub fn iso_label(&self) -> String {
        self.cca3
            .clone()
            .or_else(|| self.cioc.clone())
            .or_else(|| self.cca2.clone())
            .or_else(|| self.ccn3.as_ref().map(ToString::to_string))
            .unwrap_or_default()
    }

    #[must_use]
    pub fn capital_name(&self) -> Option<String> {
        let name = match self.capital.as_ref()? {
            CapitalField::One(name) => name.clone(),
            CapitalField::Many(names) => names.first()?.clone(),
        };
        (!name.trim().is_empty()).then_some(name)
    }

    /// Capital coordinate, falling back to the country's own coordinate.
    #[must_use]
    pub fn capital_coord(&self) -> Option<LonLat> {
        self.capital_info
            .as_ref()
            .and_then(|info| lat_lng_pair(info.latlng.as_deref()))
            .or_else(|| lat_lng_pair(self.latlng.as_deref()))
    }

    #[must_use]
    pub fn continent(&self) -> Option<Continent> {
        resolve_continent(
            self.region.as_deref().unwrap_or_default(),
            self.subregion.as_deref().unwrap_or_default(),
        )
    }

    /// Descriptive facts shown alongside the country.
    #[must_use]
    pub fn facts(&self) -> Vec<String> {
        let region = non_empty(self.region.as_deref());
        let subregion = non_empty(self.subregion.as_deref());
        let area = self
            .area
            .map_or_else(|| UNKNOWN_FACT.to_string(), |a| format!("{} km²", group_thousands(a)));
        let languages = self
            .languages
            .as_ref()
            .filter(|map| !map.is_empty())
            .map_or_else(
                || UNKNOWN_FACT.to_string(),
                |map| {
                    map.values()
                        .take(FACT_LANGUAGES)
                        .cloned()
                        .collect::<Vec<_>>()
                        .join(", ")
                },
            );
        let currencies = self
            .currencies
            .as_ref()
            .filter(|map| !map.is_empty())
            .map_or_else(
                || UNKNOWN_FACT.to_string(),
                |map| {
                    map.values()
                        .filter_map(|currency| currency.name.clone())
                        .take(FACT_CURRENCIES)
                        .collect::<Vec<_>>()
                        .join(", ")
                },
            );
        vec![
            format!("Region: {region}"),
            format!("Subregion: {subregion}"),
            format!("Area: {area}"),
            format!("Languages: {languages}"),
            format!("Currencies: {currencies}"),
        ]
    }
}

fn non_empty(value: Option<&str>) -> &str {
    value.filter(|v| !v.is_empty()).unwrap_or(UNKNOWN_FACT)
}

/// `[lat, lng]` pair as stored upstream.
fn lat_lng_pair(pair: Option<&[f64]>) -> Option<LonLat> {
    match pair? {
        [lat, lng] => Some(LonLat::new(*lng, *lat)),
        _ => None,
    }
}

/// Format a number with comma thousands separators, keeping up to three
/// fractional digits.
#[must_use]
pub fn group_thousands(value: f64) -> String {
    let rendered = format!("{:.3}", value.abs());
    let (int_part, frac_part) = rendered.split_once('.').unwrap_or((&rendered, ""));
    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (index, digit) in int_part.chars().enumerate() {
        if index > 0 && (int_part.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    let frac = frac_part.trim_end_matches('0');
    let sign = if value < 0.0 { "-" } else { "" };
    if frac.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped}.{frac}")
    }
}

/// A city record in the city resource. `latlng` is `[lat, lon]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityRecord {
    pub name: String,
    #[serde(default)]
    pub latlng: Vec<f64>,
    #[serde(default)]
    pub fact: Option<String>,
}

impl CityRecord {
    #[must_use]
    pub fn location(&self) -> Option<LonLat> {
        lat_lng_pair(Some(&self.latlng))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CityEntry {
    #[serde(default)]
    pub cities: Vec<CityRecord>,
}

/// City resource keyed by three-digit country code.
pub type CityResource = BTreeMap<String, CityEntry>;

/// Fill in Kosovo's cities when the resource has fewer than the playable
/// minimum. Returns whether anything was injected.
pub fn inject_kosovo_cities(cities: &mut CityResource) -> bool {
    let present = cities
        .get(KOSOVO_ID)
        .is_some_and(|entry| entry.cities.len() >= MIN_CITIES);
    if present {
        return false;
    }
    let records = KOSOVO_CITIES
        .iter()
        .map(|(name, lat, lon, fact)| CityRecord {
            name: (*name).to_string(),
            latlng: vec![*lat, *lon],
            fact: Some((*fact).to_string()),
        })
        .collect();
    cities.insert(KOSOVO_ID.to_string(), CityEntry { cities: records });
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub name: String,
    pub location: LonLat,
    pub fact: String,
}

/// A playable country.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Country {
    pub id: CountryId,
    pub name: String,
    pub iso: String,
    pub capital: String,
    pub continent: Continent,
    pub cities: Vec<City>,
    pub facts: Vec<String>,
}

impl Country {
    /// The capital's entry in the city list (matched case-insensitively).
    #[must_use]
    pub fn capital_city(&self) -> Option<&City> {
        self.cities
            .iter()
            .find(|city| city.name.to_lowercase() == self.capital.to_lowercase())
    }

    pub fn capital_city_mut(&mut self) -> Option<&mut City> {
        let capital = self.capital.to_lowercase();
        self.cities
            .iter_mut()
            .find(|city| city.name.to_lowercase() == capital)
    }

    #[must_use]
    pub fn city(&self, name: &str) -> Option<&City> {
        self.cities.iter().find(|city| city.name == name)
    }
}

/// The playable dataset for one quiz session, ordered by country id.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GameData {
    countries: BTreeMap<CountryId, Country>,
}

impl GameData {
    #[must_use]
    pub fn from_countries(countries: impl IntoIterator<Item = Country>) -> Self {
        Self {
            countries: countries
                .into_iter()
                .map(|country| (country.id.clone(), country))
                .collect(),
        }
    }

    #[must_use]
    pub fn get(&self, id: &CountryId) -> Option<&Country> {
        self.countries.get(id)
    }

    pub fn get_mut(&mut self, id: &CountryId) -> Option<&mut Country> {
        self.countries.get_mut(id)
    }

    #[must_use]
    pub fn contains(&self, id: &CountryId) -> bool {
        self.countries.contains_key(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.countries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &CountryId> {
        self.countries.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Country> {
        self.countries.values()
    }

    /// Insert unless the id is already present; the first entry wins.
    pub(crate) fn insert_first(&mut self, country: Country) {
        self.countries.entry(country.id.clone()).or_insert(country);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pad3_pads_short_codes_only() {
        assert_eq!(pad3(7), "007");
        assert_eq!(pad3(42), "042");
        assert_eq!(pad3(383), "383");
        assert_eq!(pad3("4"), "004");
        assert_eq!(pad3("-99"), "-99");
        assert_eq!(pad3("1234"), "1234");
    }

    #[test]
    fn meta_parses_world_countries_shape() {
        let json = r#"{
            "name": { "common": "France", "official": "French Republic" },
            "cca2": "FR", "cca3": "FRA", "ccn3": "250", "cioc": "FRA",
            "capital": ["Paris"],
            "capitalInfo": { "latlng": [48.87, 2.33] },
            "latlng": [46.0, 2.0],
            "region": "Europe", "subregion": "Western Europe",
            "area": 551695,
            "languages": { "fra": "French" },
            "currencies": { "EUR": { "name": "Euro", "symbol": "€" } },
            "flag": "🇫🇷"
        }"#;
        let meta: CountryMeta = serde_json::from_str(json).unwrap();
        assert_eq!(meta.country_id(), Some(CountryId::new("250")));
        assert_eq!(meta.display_name().as_deref(), Some("France"));
        assert_eq!(meta.iso_label(), "FRA");
        assert_eq!(meta.capital_name().as_deref(), Some("Paris"));
        assert_eq!(meta.capital_coord(), Some(LonLat::new(2.33, 48.87)));
        assert_eq!(meta.continent(), Some(Continent::Europe));
        let facts = meta.facts();
        assert_eq!(facts[2], "Area: 551,695 km²");
        assert_eq!(facts[3], "Languages: French");
        assert_eq!(facts[4], "Currencies: Euro");
    }

    #[test]
    fn meta_tolerates_numeric_codes_and_missing_parts() {
        let meta: CountryMeta =
            serde_json::from_str(r#"{ "name": "Nowhere", "ccn3": 4, "capital": [] }"#).unwrap();
        assert_eq!(meta.country_id(), Some(CountryId::new("004")));
        assert_eq!(meta.display_name().as_deref(), Some("Nowhere"));
        assert_eq!(meta.capital_name(), None);
        assert_eq!(meta.iso_label(), "4");
        assert_eq!(meta.facts()[0], "Region: Unknown");
    }

    #[test]
    fn group_thousands_formats_like_locale_strings() {
        assert_eq!(group_thousands(1_234_567.0), "1,234,567");
        assert_eq!(group_thousands(999.0), "999");
        assert_eq!(group_thousands(0.44), "0.44");
        assert_eq!(group_thousands(12_190.5), "12,190.5");
    }

    #[test]
    fn kosovo_cities_fill_sparse_entries() {
        let mut cities = CityResource::new();
        cities.insert(
            KOSOVO_ID.to_string(),
            CityEntry {
                cities: vec![CityRecord {
                    name: "Pristina".into(),
                    latlng: vec![42.6, 21.1],
                    fact: None,
                }],
            },
        );
        assert!(inject_kosovo_cities(&mut cities));
        assert_eq!(cities[KOSOVO_ID].cities.len(), 4);
        assert!(!inject_kosovo_cities(&mut cities));
    }

    #[test]
    fn capital_lookup_is_case_insensitive() {
        let country = Country {
            id: CountryId::new("999"),
            name: "Test".into(),
            iso: "TST".into(),
            capital: "Capital City".into(),
            continent: Continent::Asia,
            cities: vec![City {
                name: "capital city".into(),
                location: LonLat::new(0.0, 0.0),
                fact: String::new(),
            }],
            facts: Vec::new(),
        };
        assert!(country.capital_city().is_some());
        assert!(country.city("Capital City").is_none());
    }
}

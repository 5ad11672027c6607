//! Startup pipeline: fetch the three resources with mirror fallback, then
//! turn them into the playable dataset and its map features.

use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use thiserror::Error;

use crate::ResourceFetcher;
use crate::config::SourceConfig;
use crate::constants::{CITY_CANDIDATES, KOSOVO_ID, MAX_CITIES, MIN_CITIES};
use crate::continent::ContinentFilter;
use crate::data::{
    City, CityEntry, CityResource, Country, CountryId, CountryMeta, GameData,
    inject_kosovo_cities,
};
use crate::patcher::{apply_render_corrections, resolve_disputed};
use crate::topology::{Feature, Topology, TopologyError};
use crate::world::QuizWorld;

pub const TOPOLOGY_LABEL: &str = "World Atlas";
pub const COUNTRIES_LABEL: &str = "World Countries";
pub const CITIES_LABEL: &str = "Cities";

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("{label} failed on all sources. {last_error}")]
    FetchExhausted { label: String, last_error: String },
    #[error("No countries matched {} with valid city data.", .filter.label())]
    NoPlayableCountries { filter: ContinentFilter },
    #[error(transparent)]
    Topology(#[from] TopologyError),
}

/// Try each mirror in order and return the first body that parses as `T`.
///
/// # Errors
///
/// Returns [`LoadError::FetchExhausted`] with the last failure when every
/// mirror fails to answer or answers with something that does not parse.
pub async fn fetch_first_ok<T, F>(fetcher: &F, urls: &[String], label: &str) -> Result<T, LoadError>
where
    T: DeserializeOwned,
    F: ResourceFetcher + ?Sized,
{
    let mut last_error = String::new();
    for url in urls {
        log::debug!("fetching {label} from {url}");
        match fetcher.fetch_text(url).await {
            Ok(body) => match serde_json::from_str::<T>(&body) {
                Ok(value) => return Ok(value),
                Err(err) => {
                    log::warn!("{label} from {url} did not parse: {err}");
                    last_error = format!("{label} parse failed ({err})");
                }
            },
            Err(err) => {
                log::warn!("{label} from {url} failed: {err}");
                last_error = format!("{label} fetch failed ({err})");
            }
        }
    }
    Err(LoadError::FetchExhausted {
        label: label.to_string(),
        last_error,
    })
}

/// The three startup resources, parsed but not yet interpreted.
#[derive(Debug, Clone, Default)]
pub struct RawResources {
    pub topology: Topology,
    pub countries: Vec<CountryMeta>,
    pub cities: CityResource,
}

/// Fetch topology, metadata and cities, one after the other.
///
/// # Errors
///
/// Fails on the first resource whose mirrors are all exhausted.
pub async fn fetch_resources<F>(fetcher: &F, sources: &SourceConfig) -> Result<RawResources, LoadError>
where
    F: ResourceFetcher + ?Sized,
{
    let topology = fetch_first_ok(fetcher, &sources.topology, TOPOLOGY_LABEL).await?;
    let countries = fetch_first_ok(fetcher, &sources.countries, COUNTRIES_LABEL).await?;
    let cities = fetch_first_ok(fetcher, &sources.cities, CITIES_LABEL).await?;
    Ok(RawResources {
        topology,
        countries,
        cities,
    })
}

/// Metadata keyed by padded numeric code. Entries without a numeric code are
/// skipped; Kosovo is added when missing.
#[must_use]
pub fn index_metadata(countries: Vec<CountryMeta>) -> BTreeMap<CountryId, CountryMeta> {
    let mut index = BTreeMap::new();
    for meta in countries {
        if let Some(id) = meta.country_id() {
            index.insert(id, meta);
        }
    }
    index
        .entry(CountryId::new(KOSOVO_ID))
        .or_insert_with(CountryMeta::synthetic_kosovo);
    index
}

/// Interpret the raw resources for `filter`.
///
/// # Errors
///
/// Returns [`LoadError::Topology`] for an undecodable topology and
/// [`LoadError::NoPlayableCountries`] when nothing qualifies.
pub fn build_world(raw: RawResources, filter: &ContinentFilter) -> Result<QuizWorld, LoadError> {
    let RawResources {
        topology,
        countries,
        mut cities,
    } = raw;
    let index = index_metadata(countries);
    if inject_kosovo_cities(&mut cities) {
        log::debug!("using built-in cities for {KOSOVO_ID}");
    }

    let mut features = topology.countries()?;
    let reassigned = resolve_disputed(&mut features);
    log::debug!("decoded {} features, {reassigned} disputed", features.len());

    let mut data = build_game_data(&features, &index, &cities, filter);
    if data.is_empty() {
        return Err(LoadError::NoPlayableCountries {
            filter: filter.clone(),
        });
    }

    features.retain(|feature| feature.id.as_ref().is_some_and(|id| data.contains(id)));
    apply_render_corrections(filter, &mut data, &mut features);
    log::info!(
        "{} playable countries for {filter} across {} features",
        data.len(),
        features.len()
    );
    Ok(QuizWorld::new(filter.clone(), data, features))
}

/// Playable countries for `filter`. When several features share an id the
/// first one decides.
#[must_use]
pub fn build_game_data(
    features: &[Feature],
    index: &BTreeMap<CountryId, CountryMeta>,
    cities: &CityResource,
    filter: &ContinentFilter,
) -> GameData {
    let mut data = GameData::default();
    for feature in features {
        let Some(id) = feature.id.as_ref() else {
            continue;
        };
        if data.contains(id) {
            continue;
        }
        let Some(meta) = index.get(id) else {
            continue;
        };
        let Some(continent) = meta.continent() else {
            continue;
        };
        if !filter.admits(continent) {
            continue;
        }
        let Some(capital) = meta.capital_name() else {
            continue;
        };
        let country_cities = candidate_cities(&capital, meta, feature, cities.get(id.as_str()));
        if country_cities.len() < MIN_CITIES {
            log::debug!("{id} has only {} cities, skipping", country_cities.len());
            continue;
        }
        data.insert_first(Country {
            id: id.clone(),
            name: meta
                .display_name()
                .or_else(|| feature.name.clone())
                .unwrap_or_else(|| id.to_string()),
            iso: meta.iso_label(),
            capital,
            continent,
            cities: country_cities,
            facts: meta.facts(),
        });
    }
    data
}

/// The city list for one country: the first candidates from the resource
/// with the capital guaranteed at the front when it is missing.
#[must_use]
pub fn candidate_cities(
    capital: &str,
    meta: &CountryMeta,
    feature: &Feature,
    entry: Option<&CityEntry>,
) -> Vec<City> {
    let Some(entry) = entry else {
        return Vec::new();
    };
    let mut cities: Vec<City> = entry
        .cities
        .iter()
        .take(CITY_CANDIDATES)
        .filter_map(|record| {
            let location = record.location()?;
            let fact = record
                .fact
                .clone()
                .filter(|fact| !fact.trim().is_empty())
                .unwrap_or_else(|| format!("{} is one of the country's major cities.", record.name));
            Some(City {
                name: record.name.clone(),
                location,
                fact,
            })
        })
        .collect();
    if cities.is_empty() {
        return cities;
    }

    let capital_lower = capital.to_lowercase();
    match cities
        .iter()
        .position(|city| city.name.to_lowercase() == capital_lower)
    {
        Some(position) if position >= MAX_CITIES => {
            let city = cities.remove(position);
            cities.insert(0, city);
        }
        Some(_) => {}
        None => {
            let location = meta
                .capital_coord()
                .or_else(|| feature.geometry.centroid());
            if let Some(location) = location {
                cities.insert(
                    0,
                    City {
                        name: capital.to_string(),
                        location,
                        fact: format!("{capital} is the national capital and political center."),
                    },
                );
            }
        }
    }
    cities.truncate(MAX_CITIES);
    cities
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::continent::Continent;
    use crate::data::CityRecord;
    use crate::geo::{Geometry, LonLat, rect_ring};
    use std::cell::RefCell;
    use std::collections::HashMap;

    #[derive(Default)]
    struct MemoryFetcher {
        bodies: HashMap<String, Result<String, String>>,
        calls: RefCell<Vec<String>>,
    }

    impl MemoryFetcher {
        fn with(mut self, url: &str, body: Result<&str, &str>) -> Self {
            self.bodies.insert(
                url.to_string(),
                body.map(str::to_string).map_err(str::to_string),
            );
            self
        }
    }

    impl ResourceFetcher for MemoryFetcher {
        type Error = String;

        async fn fetch_text(&self, url: &str) -> Result<String, Self::Error> {
            self.calls.borrow_mut().push(url.to_string());
            self.bodies
                .get(url)
                .cloned()
                .unwrap_or_else(|| Err(format!("HTTP 404 for {url}")))
        }
    }

    fn urls(list: &[&str]) -> Vec<String> {
        list.iter().map(|url| (*url).to_string()).collect()
    }

    #[test]
    fn first_mirror_that_parses_wins() {
        let fetcher = MemoryFetcher::default()
            .with("a", Err("HTTP 503"))
            .with("b", Ok("not json"))
            .with("c", Ok("[1, 2, 3]"))
            .with("d", Ok("[4]"));
        let value: Vec<u32> =
            futures::executor::block_on(fetch_first_ok(&fetcher, &urls(&["a", "b", "c", "d"]), "Numbers"))
                .unwrap();
        assert_eq!(value, vec![1, 2, 3]);
        assert_eq!(fetcher.calls.borrow().as_slice(), ["a", "b", "c"]);
    }

    #[test]
    fn exhausted_mirrors_report_label_and_last_error() {
        let fetcher = MemoryFetcher::default().with("a", Err("HTTP 500"));
        let err = futures::executor::block_on(fetch_first_ok::<Vec<u32>, _>(
            &fetcher,
            &urls(&["a", "b"]),
            "Cities",
        ))
        .unwrap_err();
        let LoadError::FetchExhausted { label, last_error } = &err else {
            panic!("unexpected error {err:?}");
        };
        assert_eq!(label, "Cities");
        assert!(last_error.contains("HTTP 404 for b"));
        assert!(err.to_string().starts_with("Cities failed on all sources."));
    }

    fn meta(json: &str) -> CountryMeta {
        serde_json::from_str(json).unwrap()
    }

    fn square_feature(id: &str, lon: f64, lat: f64) -> Feature {
        Feature {
            id: Some(CountryId::new(id)),
            name: None,
            geometry: Geometry::Polygon(vec![rect_ring(lon - 1.0, lat - 1.0, lon + 1.0, lat + 1.0)]),
        }
    }

    fn entry(names: &[&str]) -> CityEntry {
        CityEntry {
            cities: names
                .iter()
                .enumerate()
                .map(|(i, name)| CityRecord {
                    name: (*name).to_string(),
                    latlng: vec![10.0, i as f64],
                    fact: None,
                })
                .collect(),
        }
    }

    #[test]
    fn capital_is_injected_with_metadata_coordinate() {
        let meta = meta(r#"{ "capital": ["Rome"], "capitalInfo": { "latlng": [41.9, 12.5] } }"#);
        let feature = square_feature("380", 12.0, 42.0);
        let cities = candidate_cities("Rome", &meta, &feature, Some(&entry(&["Milan", "Naples"])));
        assert_eq!(cities.len(), 3);
        assert_eq!(cities[0].name, "Rome");
        assert_eq!(cities[0].location, LonLat::new(12.5, 41.9));
        assert_eq!(cities[0].fact, "Rome is the national capital and political center.");
        assert_eq!(cities[1].fact, "Milan is one of the country's major cities.");
    }

    #[test]
    fn capital_falls_back_to_feature_centroid() {
        let feature = square_feature("999", 30.0, -5.0);
        let cities = candidate_cities("Town", &CountryMeta::default(), &feature, Some(&entry(&["A"])));
        assert_eq!(cities[0].name, "Town");
        assert!((cities[0].location.lon - 30.0).abs() < 1e-9);
        assert!(candidate_cities("Town", &CountryMeta::default(), &feature, None).is_empty());
        assert!(
            candidate_cities("Town", &CountryMeta::default(), &feature, Some(&entry(&[]))).is_empty()
        );
    }

    #[test]
    fn city_list_is_capped_and_keeps_capital() {
        let feature = square_feature("999", 0.0, 0.0);
        let names = ["A", "B", "C", "D", "E", "F", "capital", "H"];
        let cities = candidate_cities("Capital", &CountryMeta::default(), &feature, Some(&entry(&names)));
        assert_eq!(cities.len(), MAX_CITIES);
        assert_eq!(cities[0].name, "capital");

        let cities = candidate_cities("C", &CountryMeta::default(), &feature, Some(&entry(&names)));
        assert_eq!(cities.len(), MAX_CITIES);
        assert_eq!(cities[2].name, "C");
    }

    #[test]
    fn game_data_applies_every_inclusion_rule() {
        let features = vec![
            square_feature("380", 12.0, 42.0),
            square_feature("392", 138.0, 36.0),
            square_feature("010", 0.0, -80.0),
            square_feature("250", 2.0, 46.0),
            square_feature("380", 50.0, 50.0),
        ];
        let index = index_metadata(vec![
            meta(r#"{ "name": { "common": "Italy" }, "ccn3": "380", "cca3": "ITA", "capital": ["Rome"], "region": "Europe" }"#),
            meta(r#"{ "name": { "common": "Japan" }, "ccn3": "392", "capital": ["Tokyo"], "region": "Asia" }"#),
            meta(r#"{ "name": { "common": "Antarctica" }, "ccn3": "010", "region": "Antarctic" }"#),
            meta(r#"{ "name": { "common": "France" }, "ccn3": "250", "capital": ["Paris"], "region": "Europe" }"#),
            meta(r#"{ "name": { "common": "Nowhere" } }"#),
        ]);
        assert!(index.contains_key(&CountryId::new(KOSOVO_ID)));

        let mut cities = CityResource::new();
        cities.insert("380".into(), entry(&["Milan", "Naples"]));
        cities.insert("392".into(), entry(&["Tokyo", "Osaka"]));
        cities.insert("010".into(), entry(&["A", "B", "C"]));

        let data = build_game_data(&features, &index, &cities, &ContinentFilter::World);
        assert_eq!(data.len(), 1);
        let italy = data.get(&CountryId::new("380")).unwrap();
        assert_eq!(italy.iso, "ITA");
        assert_eq!(italy.continent, Continent::Europe);
        // The first feature's centroid would have been used; metadata has no coordinate.
        assert!((italy.cities[0].location.lon - 12.0).abs() < 1e-9);

        let asia = build_game_data(&features, &index, &cities, &ContinentFilter::Only(Continent::Asia));
        assert!(asia.is_empty());
    }

    #[test]
    fn unmatched_filter_yields_no_playable_countries() {
        let raw = RawResources {
            topology: serde_json::from_str(
                r#"{ "arcs": [[[20, 42], [21.5, 42], [21.5, 43], [20, 43], [20, 42]]],
                     "objects": { "countries": { "type": "GeometryCollection",
                       "geometries": [{ "type": "Polygon", "id": "-99", "arcs": [[0]] }] } } }"#,
            )
            .unwrap(),
            countries: Vec::new(),
            cities: CityResource::new(),
        };
        let world = build_world(raw.clone(), &ContinentFilter::World).unwrap();
        let kosovo = world.countries().get(&CountryId::new(KOSOVO_ID)).unwrap();
        assert_eq!(kosovo.capital, "Pristina");
        assert_eq!(kosovo.cities[0].name, "Pristina");

        let err = build_world(raw, &ContinentFilter::parse(Some("atlantis"))).unwrap_err();
        assert!(matches!(err, LoadError::NoPlayableCountries { .. }));
    }
}

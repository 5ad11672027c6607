//! GeoQuiz Engine
//!
//! Platform-agnostic core of the GeoQuiz map game: resource loading with
//! mirror fallback, topology decoding, geometry repairs, viewport fitting and
//! the quiz state machine. Nothing here touches a browser.

use std::fmt::Display;
use std::future::Future;

pub mod config;
pub mod constants;
pub mod continent;
pub mod data;
pub mod geo;
pub mod loader;
pub mod patcher;
pub mod projection;
pub mod quiz;
pub mod topology;
pub mod viewport;
pub mod world;

// Re-export commonly used types
pub use config::{LayoutCfg, MarkerCfg, Padding, QuizConfig, ScoringCfg, SourceConfig, TimingCfg};
pub use continent::{Continent, ContinentFilter, resolve_continent};
pub use data::{City, CityResource, Country, CountryId, CountryMeta, GameData, pad3};
pub use crate::geo::{Geometry, LonLat, ScreenBounds, ScreenPoint, wrap_longitude};
pub use loader::{LoadError, RawResources, build_world, fetch_first_ok, fetch_resources};
pub use patcher::{
    CORRECTIONS, CorrectionRule, DISPUTED_REGIONS, FIT_ADJUSTMENTS, fit_geometries,
    resolve_disputed_id,
};
pub use projection::{MapProjection, Mercator};
pub use quiz::{
    CityMarker, FactAction, FactPanel, FactStatus, FeedbackTicket, Flash, MarkerStatus, QuizEvent,
    QuizInput, QuizMode, QuizPhase, QuizSession, QuizView, RoundState,
};
pub use topology::{Feature, Topology, TopologyError};
pub use viewport::{MapViewport, MarkerStyle, ZoomKind, ZoomTarget, ZoomTransform, marker_style};
pub use world::{MapLayout, QuizWorld};

/// Trait for abstracting resource fetching.
/// Platform-specific implementations should provide this.
pub trait ResourceFetcher {
    type Error: Display;

    /// Fetch the body of `url` as text.
    ///
    /// # Errors
    ///
    /// Returns an error when the resource cannot be fetched or the server
    /// answers with a non-success status.
    fn fetch_text(&self, url: &str) -> impl Future<Output = Result<String, Self::Error>>;
}

/// Main quiz engine tying a fetcher to the mirror configuration.
pub struct QuizEngine<F>
where
    F: ResourceFetcher,
{
    fetcher: F,
    sources: SourceConfig,
    config: QuizConfig,
}

impl<F> QuizEngine<F>
where
    F: ResourceFetcher,
{
    /// Create an engine using the bundled quiz configuration.
    pub fn new(fetcher: F, sources: SourceConfig) -> Self {
        Self::with_config(fetcher, sources, QuizConfig::default_config())
    }

    pub const fn with_config(fetcher: F, sources: SourceConfig, config: QuizConfig) -> Self {
        Self {
            fetcher,
            sources,
            config,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &QuizConfig {
        &self.config
    }

    #[must_use]
    pub const fn sources(&self) -> &SourceConfig {
        &self.sources
    }

    /// Fetch every resource and build the world for `filter`.
    ///
    /// # Errors
    ///
    /// Returns an error if a resource is unavailable on every mirror, the
    /// topology cannot be decoded, or nothing is playable for `filter`.
    pub async fn load_world(&self, filter: &ContinentFilter) -> Result<QuizWorld, LoadError> {
        let raw = fetch_resources(&self.fetcher, &self.sources).await?;
        build_world(raw, filter)
    }

    /// Start a session over `world` with a seeded random source.
    #[must_use]
    pub fn new_session(&self, world: &QuizWorld, seed: u64) -> QuizSession {
        QuizSession::new(world.countries().clone(), self.config.clone(), seed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct StaticFetcher(HashMap<&'static str, String>);

    impl ResourceFetcher for StaticFetcher {
        type Error = String;

        async fn fetch_text(&self, url: &str) -> Result<String, Self::Error> {
            self.0.get(url).cloned().ok_or_else(|| format!("no body for {url}"))
        }
    }

    fn sources() -> SourceConfig {
        SourceConfig {
            topology: vec!["topo".into()],
            countries: vec!["countries".into()],
            cities: vec!["cities".into()],
        }
    }

    fn fetcher() -> StaticFetcher {
        let topology = r#"{ "type": "Topology",
            "arcs": [[[12, 41], [13, 41], [13, 43], [12, 43], [12, 41]]],
            "objects": { "countries": { "type": "GeometryCollection",
              "geometries": [{ "type": "Polygon", "id": "380", "arcs": [[0]] }] } } }"#;
        let countries = r#"[{ "name": { "common": "Italy" }, "ccn3": "380", "cca3": "ITA",
            "capital": ["Rome"], "region": "Europe", "subregion": "Southern Europe" }]"#;
        let cities = r#"{ "380": { "cities": [
            { "name": "Rome", "latlng": [41.9, 12.5] },
            { "name": "Milan", "latlng": [45.5, 9.2] },
            { "name": "Naples", "latlng": [40.9, 14.3] } ] } }"#;
        StaticFetcher(HashMap::from([
            ("topo", topology.to_string()),
            ("countries", countries.to_string()),
            ("cities", cities.to_string()),
        ]))
    }

    #[test]
    fn engine_loads_world_and_starts_session() {
        let engine = QuizEngine::new(fetcher(), sources());
        let world = futures::executor::block_on(engine.load_world(&ContinentFilter::World)).unwrap();
        assert_eq!(world.countries().len(), 1);
        assert_eq!(world.features().len(), 1);

        let mut session = engine.new_session(&world, 9);
        session.handle(QuizInput::StartRound);
        assert_eq!(session.target().map(|c| c.name.as_str()), Some("Italy"));
    }

    #[test]
    fn engine_reports_missing_resource() {
        let mut fetcher = fetcher();
        fetcher.0.remove("cities");
        let engine = QuizEngine::new(fetcher, sources());
        let err = futures::executor::block_on(engine.load_world(&ContinentFilter::World)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Cities failed on all sources. Cities fetch failed (no body for cities)"
        );
    }
}

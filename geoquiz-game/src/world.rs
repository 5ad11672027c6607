//! The loaded quiz world and the projection fitted to it.

use crate::config::LayoutCfg;
use crate::continent::ContinentFilter;
use crate::data::{CountryId, GameData};
use crate::geo::{Geometry, LonLat, ScreenBounds, ScreenPoint};
use crate::patcher::{fit_geometries, fit_translate_offset};
use crate::projection::{MapProjection, Mercator};
use crate::topology::Feature;
use crate::viewport::{MapViewport, ZoomTarget, zoom_to_bounds};

/// Playable countries plus the features drawn for them.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizWorld {
    filter: ContinentFilter,
    countries: GameData,
    features: Vec<Feature>,
}

impl QuizWorld {
    #[must_use]
    pub fn new(filter: ContinentFilter, countries: GameData, features: Vec<Feature>) -> Self {
        Self {
            filter,
            countries,
            features,
        }
    }

    #[must_use]
    pub fn filter(&self) -> &ContinentFilter {
        &self.filter
    }

    #[must_use]
    pub fn countries(&self) -> &GameData {
        &self.countries
    }

    #[must_use]
    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    /// Every rendered geometry belonging to `id`.
    pub fn geometries_for<'a>(&'a self, id: &'a CountryId) -> impl Iterator<Item = &'a Geometry> {
        self.features
            .iter()
            .filter(move |feature| feature.id.as_ref() == Some(id))
            .map(|feature| &feature.geometry)
    }

    /// Fill colour of the country's continent.
    #[must_use]
    pub fn fill_color(&self, id: &CountryId) -> Option<&'static str> {
        self.countries
            .get(id)
            .map(|country| country.continent.color())
    }
}

/// A projection fitted to a world inside a viewport.
#[derive(Debug, Clone, PartialEq)]
pub struct MapLayout<P = Mercator> {
    pub projection: P,
    pub viewport: MapViewport,
}

impl MapLayout<Mercator> {
    /// Fit a Mercator projection to `world` on a `width` x `height` screen.
    #[must_use]
    pub fn fit(
        world: &QuizWorld,
        width: f64,
        height: f64,
        hud_bottom: Option<f64>,
        cfg: &LayoutCfg,
    ) -> Self {
        let viewport = MapViewport::from_screen(width, height, &cfg.padding, hud_bottom, cfg.hud_gap);
        Self::fit_with(Mercator::default(), world, viewport)
    }
}

impl<P: MapProjection> MapLayout<P> {
    /// Fit `projection` to the world's fit geometries, then apply the
    /// continent's horizontal nudge.
    pub fn fit_with(mut projection: P, world: &QuizWorld, viewport: MapViewport) -> Self {
        let fit = fit_geometries(world.filter(), world.features());
        let geometries: Vec<&Geometry> = fit.iter().map(AsRef::as_ref).collect();
        if !projection.fit_extent(viewport.extent, &geometries) {
            log::warn!("nothing to fit for {}", world.filter());
        }
        let offset = fit_translate_offset(world.filter(), viewport.width);
        if offset.abs() > f64::EPSILON {
            let translate = projection.translate();
            projection.set_translate(ScreenPoint::new(translate.x + offset, translate.y));
        }
        Self {
            projection,
            viewport,
        }
    }

    #[must_use]
    pub fn project(&self, point: LonLat) -> Option<ScreenPoint> {
        self.projection.project(point)
    }

    /// Union of the screen bounds of every feature of `id`.
    #[must_use]
    pub fn country_bounds(&self, world: &QuizWorld, id: &CountryId) -> ScreenBounds {
        world
            .geometries_for(id)
            .map(|geometry| self.projection.path_bounds(geometry))
            .fold(ScreenBounds::empty(), ScreenBounds::union)
    }

    /// Transform framing country `id`, if it can be framed at all.
    #[must_use]
    pub fn zoom_to_country(
        &self,
        world: &QuizWorld,
        id: &CountryId,
        cfg: &LayoutCfg,
    ) -> Option<ZoomTarget> {
        let bounds = self.country_bounds(world, id);
        let centroid = world
            .geometries_for(id)
            .next()
            .and_then(|geometry| self.projection.geo_centroid(geometry))
            .and_then(|centroid| self.projection.project(centroid));
        zoom_to_bounds(&bounds, centroid, &self.viewport, cfg)
    }
}

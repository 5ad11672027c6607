//! Map projection used for rendering and viewport fitting.

use std::f64::consts::{FRAC_PI_4, TAU};

use crate::geo::{Geometry, LonLat, ScreenBounds, ScreenPoint, wrap_longitude};

/// Latitude beyond which Mercator is clipped.
pub const MERCATOR_MAX_LAT: f64 = 85.051_128_78;

/// The operations the viewport fitter needs from a projection.
pub trait MapProjection {
    /// Project a geographic coordinate to screen space.
    fn project(&self, point: LonLat) -> Option<ScreenPoint>;

    fn translate(&self) -> ScreenPoint;

    fn set_translate(&mut self, translate: ScreenPoint);

    /// Fit `geometries` into `extent`. Returns `false` and leaves the
    /// projection untouched when there is nothing with area to fit.
    fn fit_extent(&mut self, extent: ScreenBounds, geometries: &[&Geometry]) -> bool;

    /// Screen-space bounding box of every projectable vertex.
    fn path_bounds(&self, geometry: &Geometry) -> ScreenBounds {
        let mut bounds = ScreenBounds::empty();
        for point in geometry.points() {
            if let Some(projected) = self.project(*point) {
                bounds.include(projected);
            }
        }
        bounds
    }

    fn geo_centroid(&self, geometry: &Geometry) -> Option<LonLat> {
        geometry.centroid()
    }
}

/// Spherical Mercator with a uniform scale and a screen translation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mercator {
    pub scale: f64,
    pub translate: ScreenPoint,
}

impl Default for Mercator {
    fn default() -> Self {
        Self {
            scale: 961.0 / TAU,
            translate: ScreenPoint::new(480.0, 250.0),
        }
    }
}

impl Mercator {
    #[must_use]
    pub fn new(scale: f64, translate: ScreenPoint) -> Self {
        Self { scale, translate }
    }

    /// Unit-scale projection with y pointing down the screen.
    fn raw(point: LonLat) -> Option<ScreenPoint> {
        if !point.is_finite() {
            return None;
        }
        let phi = point.lat.clamp(-MERCATOR_MAX_LAT, MERCATOR_MAX_LAT).to_radians();
        let y = -(FRAC_PI_4 + phi / 2.0).tan().ln();
        Some(ScreenPoint::new(wrap_longitude(point.lon).to_radians(), y))
    }
}

impl MapProjection for Mercator {
    fn project(&self, point: LonLat) -> Option<ScreenPoint> {
        let raw = Self::raw(point)?;
        Some(ScreenPoint::new(
            self.scale.mul_add(raw.x, self.translate.x),
            self.scale.mul_add(raw.y, self.translate.y),
        ))
    }

    fn translate(&self) -> ScreenPoint {
        self.translate
    }

    fn set_translate(&mut self, translate: ScreenPoint) {
        self.translate = translate;
    }

    fn fit_extent(&mut self, extent: ScreenBounds, geometries: &[&Geometry]) -> bool {
        let mut raw = ScreenBounds::empty();
        for point in geometries.iter().flat_map(|geometry| geometry.points()) {
            if let Some(projected) = Self::raw(*point) {
                raw.include(projected);
            }
        }
        let (dx, dy) = (raw.width(), raw.height());
        if raw.is_empty() || !(dx > 0.0 || dy > 0.0) {
            return false;
        }
        let k = (extent.width() / dx).min(extent.height() / dy);
        if !k.is_finite() || k <= 0.0 {
            return false;
        }
        self.scale = k;
        self.translate = ScreenPoint::new(
            extent.min.x + k.mul_add(-(raw.min.x + raw.max.x), extent.width()) / 2.0,
            extent.min.y + k.mul_add(-(raw.min.y + raw.max.y), extent.height()) / 2.0,
        );
        true
    }
}

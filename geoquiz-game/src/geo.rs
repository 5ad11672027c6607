//! Geographic primitives shared by the topology decoder, the geometry patcher
//! and the projection.

use ::geo::{BoundingRect, Centroid, Contains, Coord, LineString, MultiPolygon, Point};
use serde::{Deserialize, Serialize};

/// A geographic coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LonLat {
    pub lon: f64,
    pub lat: f64,
}

impl LonLat {
    #[must_use]
    pub const fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    #[must_use]
    pub fn is_finite(self) -> bool {
        self.lon.is_finite() && self.lat.is_finite()
    }
}

/// A projected point in screen space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned screen-space box, `[[x0, y0], [x1, y1]]` in path-bounds terms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenBounds {
    pub min: ScreenPoint,
    pub max: ScreenPoint,
}

impl Default for ScreenBounds {
    fn default() -> Self {
        Self::empty()
    }
}

impl ScreenBounds {
    #[must_use]
    pub const fn new(min: ScreenPoint, max: ScreenPoint) -> Self {
        Self { min, max }
    }

    /// A box containing nothing; any included point replaces it.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            min: ScreenPoint::new(f64::INFINITY, f64::INFINITY),
            max: ScreenPoint::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y
    }

    pub fn include(&mut self, point: ScreenPoint) {
        self.min.x = self.min.x.min(point.x);
        self.min.y = self.min.y.min(point.y);
        self.max.x = self.max.x.max(point.x);
        self.max.y = self.max.y.max(point.y);
    }

    #[must_use]
    pub fn union(mut self, other: Self) -> Self {
        if !other.is_empty() {
            self.include(other.min);
            self.include(other.max);
        }
        self
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    #[must_use]
    pub fn center(&self) -> ScreenPoint {
        ScreenPoint::new(
            (self.min.x + self.max.x) / 2.0,
            (self.min.y + self.max.y) / 2.0,
        )
    }
}

pub type Ring = Vec<LonLat>;
pub type Polygon = Vec<Ring>;

/// Country geometry: a polygon (exterior ring first, then holes) or a set of
/// polygons.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum Geometry {
    Polygon(Polygon),
    MultiPolygon(Vec<Polygon>),
}

impl Geometry {
    #[must_use]
    pub fn polygons(&self) -> &[Polygon] {
        match self {
            Self::Polygon(polygon) => std::slice::from_ref(polygon),
            Self::MultiPolygon(polygons) => polygons,
        }
    }

    pub fn points(&self) -> impl Iterator<Item = &LonLat> {
        self.polygons().iter().flatten().flatten()
    }

    /// Apply `update` to every vertex of every ring.
    pub fn map_points(&mut self, mut update: impl FnMut(&mut LonLat)) {
        let polygons: &mut [Polygon] = match self {
            Self::Polygon(polygon) => std::slice::from_mut(polygon),
            Self::MultiPolygon(polygons) => polygons,
        };
        polygons
            .iter_mut()
            .flatten()
            .flatten()
            .for_each(&mut update);
    }

    /// Keep only the member polygons accepted by `keep`. Single polygons are
    /// left untouched. Returns the number of polygons removed.
    pub fn retain_polygons(&mut self, keep: impl FnMut(&Polygon) -> bool) -> usize {
        match self {
            Self::Polygon(_) => 0,
            Self::MultiPolygon(polygons) => {
                let before = polygons.len();
                polygons.retain(keep);
                before - polygons.len()
            }
        }
    }

    /// Area-weighted planar centroid in lon/lat degrees. Degenerate rings
    /// fall back to their outline, then to their vertices.
    #[must_use]
    pub fn centroid(&self) -> Option<LonLat> {
        self.to_multi_polygon().centroid().map(LonLat::from)
    }

    /// Whether `point` lies inside any member polygon (holes excluded).
    #[must_use]
    pub fn contains(&self, point: LonLat) -> bool {
        self.to_multi_polygon().contains(&Point::from(point))
    }

    /// Lon/lat bounding box as `(south-west, north-east)`.
    #[must_use]
    pub fn lon_lat_bounds(&self) -> Option<(LonLat, LonLat)> {
        self.to_multi_polygon()
            .bounding_rect()
            .map(|rect| (LonLat::from(rect.min()), LonLat::from(rect.max())))
    }

    #[must_use]
    pub fn to_multi_polygon(&self) -> MultiPolygon<f64> {
        self.polygons().iter().map(polygon_to_geo).collect()
    }
}

fn ring_to_line(ring: &[LonLat]) -> LineString<f64> {
    ring.iter().copied().map(Coord::from).collect()
}

fn polygon_to_geo(polygon: &Polygon) -> ::geo::Polygon<f64> {
    let mut rings = polygon.iter();
    let exterior = rings.next().map_or_else(|| LineString::new(Vec::new()), |r| ring_to_line(r));
    ::geo::Polygon::new(exterior, rings.map(|r| ring_to_line(r)).collect())
}

/// Westernmost longitude of `ring`.
#[must_use]
pub fn ring_west(ring: &[LonLat]) -> Option<f64> {
    ring_to_line(ring).bounding_rect().map(|rect| rect.min().x)
}

/// Bring `lon` back into `[-180, 180]`.
#[must_use]
pub fn wrap_longitude(lon: f64) -> f64 {
    if (-180.0..=180.0).contains(&lon) || !lon.is_finite() {
        lon
    } else {
        (lon + 180.0).rem_euclid(360.0) - 180.0
    }
}

impl From<LonLat> for Coord<f64> {
    fn from(point: LonLat) -> Self {
        Self {
            x: point.lon,
            y: point.lat,
        }
    }
}

impl From<LonLat> for Point<f64> {
    fn from(point: LonLat) -> Self {
        Self::new(point.lon, point.lat)
    }
}

impl From<Coord<f64>> for LonLat {
    fn from(coord: Coord<f64>) -> Self {
        Self::new(coord.x, coord.y)
    }
}

impl From<Point<f64>> for LonLat {
    fn from(point: Point<f64>) -> Self {
        Self::new(point.x(), point.y())
    }
}

/// Closed axis-aligned rectangle ring, handy for fixtures and tests.
#[must_use]
pub fn rect_ring(lon0: f64, lat0: f64, lon1: f64, lat1: f64) -> Ring {
    vec![
        LonLat::new(lon0, lat0),
        LonLat::new(lon1, lat0),
        LonLat::new(lon1, lat1),
        LonLat::new(lon0, lat1),
        LonLat::new(lon0, lat0),
    ]
}

//! SVG strings for the quiz map.

use std::fmt::Write;

use crate::game::{Flash, Geometry, MapProjection, MarkerStatus, ZoomTransform};

/// SVG path data for `geometry`. Vertices the projection rejects are skipped;
/// rings left with fewer than three vertices are dropped.
#[must_use]
pub fn geometry_path<P: MapProjection>(projection: &P, geometry: &Geometry) -> String {
    let mut out = String::new();
    for ring in geometry.polygons().iter().flatten() {
        let points: Vec<_> = ring.iter().filter_map(|p| projection.project(*p)).collect();
        if points.len() < 3 {
            continue;
        }
        for (i, point) in points.iter().enumerate() {
            let cmd = if i == 0 { 'M' } else { 'L' };
            let _ = write!(out, "{cmd}{:.2},{:.2}", point.x, point.y);
        }
        out.push('Z');
    }
    out
}

/// CSS transform for the map layer, so zoom changes can be animated.
#[must_use]
pub fn css_transform(transform: &ZoomTransform) -> String {
    format!(
        "transform: translate({:.2}px, {:.2}px) scale({:.4}); transform-origin: 0 0;",
        transform.x, transform.y, transform.k
    )
}

#[must_use]
pub fn country_class(flash: Option<Flash>, highlighted: bool) -> String {
    let mut class = String::from("state");
    if let Some(flash) = flash {
        class.push(' ');
        class.push_str(flash.css_class());
    }
    if highlighted {
        class.push_str(" highlighted");
    }
    class
}

#[must_use]
pub const fn marker_class(status: MarkerStatus) -> &'static str {
    match status {
        MarkerStatus::Pending => "city-node",
        MarkerStatus::Correct => "city-node correct",
        MarkerStatus::Wrong => "city-node wrong",
    }
}

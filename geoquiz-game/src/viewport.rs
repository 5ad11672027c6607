//! Screen-space viewport math: padded map extent, zoom-to-country transforms
//! and zoom-dependent marker sizing.

use serde::{Deserialize, Serialize};

use crate::config::{LayoutCfg, MarkerCfg, Padding};
use crate::geo::{ScreenBounds, ScreenPoint};

/// The drawable screen and the padded extent the map is fitted into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapViewport {
    pub width: f64,
    pub height: f64,
    pub extent: ScreenBounds,
}

impl MapViewport {
    /// Build the viewport for a `width` x `height` screen. The top padding
    /// grows to clear the HUD when its bottom edge is known.
    #[must_use]
    pub fn from_screen(
        width: f64,
        height: f64,
        padding: &Padding,
        hud_bottom: Option<f64>,
        hud_gap: f64,
    ) -> Self {
        let top = hud_bottom.map_or(padding.top, |bottom| padding.top.max(bottom + hud_gap));
        Self {
            width,
            height,
            extent: ScreenBounds::new(
                ScreenPoint::new(padding.left, top),
                ScreenPoint::new(width - padding.right, height - padding.bottom),
            ),
        }
    }

    #[must_use]
    pub fn center(&self) -> ScreenPoint {
        self.extent.center()
    }
}

/// Uniform zoom `k` followed by a translation, as applied to the map group.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomTransform {
    pub k: f64,
    pub x: f64,
    pub y: f64,
}

impl Default for ZoomTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl ZoomTransform {
    #[must_use]
    pub const fn identity() -> Self {
        Self {
            k: 1.0,
            x: 0.0,
            y: 0.0,
        }
    }

    /// Scale by `k` and move `focus` to `target`.
    #[must_use]
    pub fn centered(k: f64, focus: ScreenPoint, target: ScreenPoint) -> Self {
        Self {
            k,
            x: k.mul_add(-focus.x, target.x),
            y: k.mul_add(-focus.y, target.y),
        }
    }

    #[must_use]
    pub fn apply(&self, point: ScreenPoint) -> ScreenPoint {
        ScreenPoint::new(self.k.mul_add(point.x, self.x), self.k.mul_add(point.y, self.y))
    }

    /// Multiply the zoom by `factor` keeping `anchor` fixed on screen, with
    /// the resulting `k` clamped to `extent`.
    #[must_use]
    pub fn zoom_about(&self, anchor: ScreenPoint, factor: f64, extent: [f64; 2]) -> Self {
        let k = (self.k * factor).clamp(extent[0], extent[1]);
        let focus = ScreenPoint::new((anchor.x - self.x) / self.k, (anchor.y - self.y) / self.k);
        Self::centered(k, focus, anchor)
    }

    /// Shift by a screen-space delta.
    #[must_use]
    pub fn pan(&self, dx: f64, dy: f64) -> Self {
        Self {
            k: self.k,
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZoomKind {
    FitBounds,
    CentroidFallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomTarget {
    pub transform: ZoomTransform,
    pub kind: ZoomKind,
}

/// Whether a country's screen box is usable for a zoom-to-fit.
#[must_use]
pub fn bounds_are_valid(bounds: &ScreenBounds, viewport: &MapViewport, ratio: f64) -> bool {
    let (dx, dy) = (bounds.width(), bounds.height());
    dx.is_finite()
        && dy.is_finite()
        && dx > 0.0
        && dy > 0.0
        && dx < viewport.width * ratio
        && dy < viewport.height * ratio
}

/// Transform framing `bounds` in the middle of the viewport.
///
/// Degenerate boxes fall back to a fixed zoom on `centroid`; with no
/// projectable centroid there is nothing to zoom to.
#[must_use]
pub fn zoom_to_bounds(
    bounds: &ScreenBounds,
    centroid: Option<ScreenPoint>,
    viewport: &MapViewport,
    cfg: &LayoutCfg,
) -> Option<ZoomTarget> {
    let target = viewport.center();
    if bounds_are_valid(bounds, viewport, cfg.degenerate_ratio) {
        let fill = (bounds.width() / viewport.extent.width())
            .max(bounds.height() / viewport.extent.height());
        let k = (cfg.fill_ratio / fill).clamp(cfg.min_zoom, cfg.max_zoom);
        return Some(ZoomTarget {
            transform: ZoomTransform::centered(k, bounds.center(), target),
            kind: ZoomKind::FitBounds,
        });
    }
    let centroid = centroid.filter(|point| point.x.is_finite() && point.y.is_finite())?;
    Some(ZoomTarget {
        transform: ZoomTransform::centered(cfg.fallback_zoom, centroid, target),
        kind: ZoomKind::CentroidFallback,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarkerStyle {
    /// Target on-screen radius in pixels.
    pub screen_radius: f64,
    /// Radius in map units under zoom `k`.
    pub radius: f64,
    pub stroke_width: f64,
}

#[must_use]
pub fn marker_style(k: f64, cfg: &MarkerCfg) -> MarkerStyle {
    let k = if k.is_finite() && k > 0.0 { k } else { 1.0 };
    let screen_radius = (cfg.base / k.powf(cfg.exponent)).clamp(cfg.min, cfg.max);
    MarkerStyle {
        screen_radius,
        radius: 2.0 * screen_radius / k,
        stroke_width: cfg.border_width / k,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{a} != {b}");
    }

    fn viewport() -> MapViewport {
        MapViewport::from_screen(1000.0, 800.0, &Padding::default(), None, 12.0)
    }

    fn bounds(x0: f64, y0: f64, x1: f64, y1: f64) -> ScreenBounds {
        ScreenBounds::new(ScreenPoint::new(x0, y0), ScreenPoint::new(x1, y1))
    }

    #[test]
    fn hud_pushes_top_padding_down() {
        let padding = Padding::default();
        let low_hud = MapViewport::from_screen(1000.0, 800.0, &padding, Some(50.0), 12.0);
        assert_close(low_hud.extent.min.y, 90.0);
        let tall_hud = MapViewport::from_screen(1000.0, 800.0, &padding, Some(120.0), 12.0);
        assert_close(tall_hud.extent.min.y, 132.0);
        assert_close(tall_hud.extent.max.x, 960.0);
        assert_close(tall_hud.extent.max.y, 760.0);
    }

    #[test]
    fn zoom_fills_share_of_viewport_and_centers() {
        let vp = viewport();
        let cfg = LayoutCfg::default();
        let b = bounds(100.0, 100.0, 192.0, 150.0);
        let zoom = zoom_to_bounds(&b, None, &vp, &cfg).unwrap();
        assert_eq!(zoom.kind, ZoomKind::FitBounds);
        // 92 / 920 = 0.1 dominates 50 / 670.
        assert_close(zoom.transform.k, 7.8);
        let center = zoom.transform.apply(b.center());
        assert_close(center.x, vp.center().x);
        assert_close(center.y, vp.center().y);
    }

    #[test]
    fn zoom_is_clamped() {
        let vp = viewport();
        let cfg = LayoutCfg::default();
        let tiny = zoom_to_bounds(&bounds(0.0, 0.0, 1.0, 1.0), None, &vp, &cfg).unwrap();
        assert_close(tiny.transform.k, 10.0);
        let huge = zoom_to_bounds(&bounds(0.0, 0.0, 2000.0, 1500.0), None, &vp, &cfg).unwrap();
        assert_close(huge.transform.k, 1.0);
    }

    #[test]
    fn degenerate_bounds_fall_back_to_centroid() {
        let vp = viewport();
        let cfg = LayoutCfg::default();
        let flat = bounds(10.0, 10.0, 10.0, 40.0);
        let centroid = ScreenPoint::new(10.0, 25.0);
        let zoom = zoom_to_bounds(&flat, Some(centroid), &vp, &cfg).unwrap();
        assert_eq!(zoom.kind, ZoomKind::CentroidFallback);
        assert_close(zoom.transform.k, 4.0);
        let moved = zoom.transform.apply(centroid);
        assert_close(moved.x, vp.center().x);

        let wide = bounds(-2000.0, 0.0, 1500.0, 10.0);
        assert!(!bounds_are_valid(&wide, &vp, cfg.degenerate_ratio));
        assert!(zoom_to_bounds(&ScreenBounds::empty(), None, &vp, &cfg).is_none());
    }

    #[test]
    fn zoom_about_keeps_anchor_fixed() {
        let start = ZoomTransform::centered(2.0, ScreenPoint::new(100.0, 100.0), ScreenPoint::new(500.0, 400.0));
        let anchor = ScreenPoint::new(300.0, 200.0);
        let zoomed = start.zoom_about(anchor, 1.5, [1.0, 50.0]);
        assert_close(zoomed.k, 3.0);
        let focus = ScreenPoint::new((anchor.x - start.x) / start.k, (anchor.y - start.y) / start.k);
        let after = zoomed.apply(focus);
        assert_close(after.x, anchor.x);
        assert_close(after.y, anchor.y);
        assert_close(start.zoom_about(anchor, 100.0, [1.0, 50.0]).k, 50.0);
    }

    #[test]
    fn marker_sizing_follows_zoom() {
        let cfg = MarkerCfg::default();
        let at_one = marker_style(1.0, &cfg);
        assert_close(at_one.screen_radius, 12.0);
        assert_close(at_one.radius, 24.0);
        assert_close(at_one.stroke_width, 0.5);
        let deep = marker_style(50.0, &cfg);
        assert_close(deep.screen_radius, (12.0 / 50_f64.powf(0.35)).max(4.0));
        assert_close(deep.stroke_width, 0.01);
        assert!(deep.radius < at_one.radius);
    }
}

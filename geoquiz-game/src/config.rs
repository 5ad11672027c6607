//! Quiz tuning and resource mirror configuration.
use serde::{Deserialize, Serialize};

const DEFAULT_QUIZ_DATA: &str = include_str!("../../geoquiz-web/static/assets/data/quiz.json");
const DEFAULT_SOURCES_DATA: &str =
    include_str!("../../geoquiz-web/static/assets/data/sources.json");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct QuizConfig {
    #[serde(default)]
    pub scoring: ScoringCfg,
    #[serde(default)]
    pub timing: TimingCfg,
    #[serde(default)]
    pub layout: LayoutCfg,
    #[serde(default)]
    pub markers: MarkerCfg,
}

impl QuizConfig {
    #[must_use]
    pub fn load_from_static() -> Self {
        serde_json::from_str(DEFAULT_QUIZ_DATA).unwrap_or_default()
    }

    #[must_use]
    pub fn default_config() -> Self {
        Self::load_from_static()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringCfg {
    #[serde(default = "default_country_correct")]
    pub country_correct: i32,
    #[serde(default = "default_wrong")]
    pub country_wrong: i32,
    #[serde(default = "default_city_correct")]
    pub city_correct: i32,
    #[serde(default = "default_wrong")]
    pub city_wrong: i32,
}

impl Default for ScoringCfg {
    fn default() -> Self {
        Self {
            country_correct: default_country_correct(),
            country_wrong: default_wrong(),
            city_correct: default_city_correct(),
            city_wrong: default_wrong(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimingCfg {
    #[serde(default = "default_feedback_ms")]
    pub feedback_ms: u32,
    #[serde(default = "default_flash_ms")]
    pub flash_ms: u32,
    #[serde(default = "default_zoom_ms")]
    pub zoom_ms: u32,
    #[serde(default = "default_reset_zoom_ms")]
    pub reset_zoom_ms: u32,
}

impl Default for TimingCfg {
    fn default() -> Self {
        Self {
            feedback_ms: default_feedback_ms(),
            flash_ms: default_flash_ms(),
            zoom_ms: default_zoom_ms(),
            reset_zoom_ms: default_reset_zoom_ms(),
        }
    }
}

/// Screen padding around the fitted map, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Padding {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Default for Padding {
    fn default() -> Self {
        Self {
            top: 90.0,
            right: 40.0,
            bottom: 40.0,
            left: 40.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutCfg {
    #[serde(default)]
    pub padding: Padding,
    /// Gap kept between the measured HUD bottom and the map.
    #[serde(default = "default_hud_gap")]
    pub hud_gap: f64,
    /// Share of the viewport a zoomed country should fill.
    #[serde(default = "default_fill_ratio")]
    pub fill_ratio: f64,
    #[serde(default = "default_min_zoom")]
    pub min_zoom: f64,
    #[serde(default = "default_max_zoom")]
    pub max_zoom: f64,
    #[serde(default = "default_fallback_zoom")]
    pub fallback_zoom: f64,
    /// Boxes this many screens wide or tall are treated as degenerate.
    #[serde(default = "default_degenerate_ratio")]
    pub degenerate_ratio: f64,
    /// Extent for user-driven zoom.
    #[serde(default = "default_zoom_extent")]
    pub zoom_extent: [f64; 2],
}

impl Default for LayoutCfg {
    fn default() -> Self {
        Self {
            padding: Padding::default(),
            hud_gap: default_hud_gap(),
            fill_ratio: default_fill_ratio(),
            min_zoom: default_min_zoom(),
            max_zoom: default_max_zoom(),
            fallback_zoom: default_fallback_zoom(),
            degenerate_ratio: default_degenerate_ratio(),
            zoom_extent: default_zoom_extent(),
        }
    }
}

/// Screen-space sizing for city markers and borders.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarkerCfg {
    #[serde(default = "default_marker_base")]
    pub base: f64,
    #[serde(default = "default_marker_exponent")]
    pub exponent: f64,
    #[serde(default = "default_marker_min")]
    pub min: f64,
    #[serde(default = "default_marker_max")]
    pub max: f64,
    #[serde(default = "default_border_width")]
    pub border_width: f64,
}

impl Default for MarkerCfg {
    fn default() -> Self {
        Self {
            base: default_marker_base(),
            exponent: default_marker_exponent(),
            min: default_marker_min(),
            max: default_marker_max(),
            border_width: default_border_width(),
        }
    }
}

/// Ordered mirror lists for the three startup resources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SourceConfig {
    #[serde(default)]
    pub topology: Vec<String>,
    #[serde(default)]
    pub countries: Vec<String>,
    #[serde(default)]
    pub cities: Vec<String>,
}

impl SourceConfig {
    #[must_use]
    pub fn load_from_static() -> Self {
        serde_json::from_str(DEFAULT_SOURCES_DATA).unwrap_or_default()
    }

    #[must_use]
    pub fn default_config() -> Self {
        Self::load_from_static()
    }

    /// Rewrite relative mirror entries through `resolve` (absolute URLs are
    /// kept as they are).
    #[must_use]
    pub fn resolved_with(mut self, resolve: impl Fn(&str) -> String) -> Self {
        for url in self
            .topology
            .iter_mut()
            .chain(self.countries.iter_mut())
            .chain(self.cities.iter_mut())
        {
            if !url.contains("://") {
                *url = resolve(url);
            }
        }
        self
    }
}

const fn default_country_correct() -> i32 {
    10
}

const fn default_city_correct() -> i32 {
    20
}

const fn default_wrong() -> i32 {
    -10
}

const fn default_feedback_ms() -> u32 {
    3_000
}

const fn default_flash_ms() -> u32 {
    500
}

const fn default_zoom_ms() -> u32 {
    900
}

const fn default_reset_zoom_ms() -> u32 {
    1_000
}

const fn default_hud_gap() -> f64 {
    12.0
}

const fn default_fill_ratio() -> f64 {
    0.78
}

const fn default_min_zoom() -> f64 {
    1.0
}

const fn default_max_zoom() -> f64 {
    10.0
}

const fn default_fallback_zoom() -> f64 {
    4.0
}

const fn default_degenerate_ratio() -> f64 {
    3.0
}

const fn default_zoom_extent() -> [f64; 2] {
    [1.0, 50.0]
}

const fn default_marker_base() -> f64 {
    12.0
}

const fn default_marker_exponent() -> f64 {
    0.35
}

const fn default_marker_min() -> f64 {
    4.0
}

const fn default_marker_max() -> f64 {
    14.0
}

const fn default_border_width() -> f64 {
    0.5
}

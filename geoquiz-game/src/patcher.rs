//! Load-time repairs to the base topology: disputed ids, continent-specific
//! trims and coordinate shifts, and the post-fit translation nudge.
//!
//! Every magic number lives in one of the three tables below so each entry
//! can be tested on its own.

use std::borrow::Cow;

use crate::constants::{FIJI_ID, FRANCE_ID, KOSOVO_ID, RUSSIA_ID, SOMALIA_ID, VANUATU_ID};
use crate::continent::{Continent, ContinentFilter};
use crate::data::{CountryId, GameData};
use crate::geo::{Geometry, LonLat, Polygon, ring_west, wrap_longitude};
use crate::topology::Feature;

/// Centroid box that reassigns an unclaimed feature. Bounds are exclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisputedRegion {
    pub label: &'static str,
    pub lat: (f64, f64),
    pub lon: (f64, f64),
    pub assign_to: &'static str,
}

impl DisputedRegion {
    #[must_use]
    pub fn contains(&self, point: LonLat) -> bool {
        point.lat > self.lat.0
            && point.lat < self.lat.1
            && point.lon > self.lon.0
            && point.lon < self.lon.1
    }
}

pub const DISPUTED_REGIONS: [DisputedRegion; 2] = [
    DisputedRegion {
        label: "Somaliland",
        lat: (5.0, 15.0),
        lon: (40.0, 55.0),
        assign_to: SOMALIA_ID,
    },
    DisputedRegion {
        label: "Kosovo",
        lat: (40.0, 45.0),
        lon: (19.0, 23.0),
        assign_to: KOSOVO_ID,
    },
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CorrectionRule {
    /// Remove member polygons whose first exterior vertex lies at or west of
    /// `lon`.
    TrimWestOf { lon: f64 },
    /// For fitting only, ignore member polygons with any exterior vertex
    /// strictly west of `lon`.
    FitExcludeWestOf { lon: f64 },
    /// Move the geometry and the country's cities by `degrees` of longitude.
    ShiftLongitude { degrees: f64 },
    /// Move the capital to the feature centroid when it lies outside the
    /// feature.
    SnapCapitalToCentroid,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Correction {
    pub continent: Continent,
    pub country: &'static str,
    pub rule: CorrectionRule,
}

pub const CORRECTIONS: [Correction; 4] = [
    Correction {
        continent: Continent::Europe,
        country: FRANCE_ID,
        rule: CorrectionRule::TrimWestOf { lon: -20.0 },
    },
    Correction {
        continent: Continent::Europe,
        country: RUSSIA_ID,
        rule: CorrectionRule::FitExcludeWestOf { lon: -40.0 },
    },
    Correction {
        continent: Continent::Oceania,
        country: FIJI_ID,
        rule: CorrectionRule::ShiftLongitude { degrees: -15.0 },
    },
    Correction {
        continent: Continent::Oceania,
        country: VANUATU_ID,
        rule: CorrectionRule::SnapCapitalToCentroid,
    },
];

/// Horizontal translation applied after the whole-map fit, as a share of
/// the screen width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitAdjustment {
    pub continent: Continent,
    pub translate_x_ratio: f64,
}

pub const FIT_ADJUSTMENTS: [FitAdjustment; 1] = [FitAdjustment {
    continent: Continent::Europe,
    translate_x_ratio: -0.06,
}];

fn corrections_for(filter: &ContinentFilter) -> impl Iterator<Item = &'static Correction> + '_ {
    CORRECTIONS
        .iter()
        .filter(move |correction| filter.continent() == Some(correction.continent))
}

/// Id an unclaimed feature should take given its centroid, if any.
#[must_use]
pub fn resolve_disputed_id(centroid: LonLat) -> Option<&'static str> {
    DISPUTED_REGIONS
        .iter()
        .find(|region| region.contains(centroid))
        .map(|region| region.assign_to)
}

/// Reassign unclaimed features by centroid. Returns how many changed.
pub fn resolve_disputed(features: &mut [Feature]) -> usize {
    let mut reassigned = 0;
    for feature in features.iter_mut().filter(|f| f.is_unclaimed()) {
        let Some(centroid) = feature.geometry.centroid() else {
            continue;
        };
        if let Some(id) = resolve_disputed_id(centroid) {
            log::debug!(
                "reassigning unclaimed feature {:?} at ({:.2}, {:.2}) to {id}",
                feature.name,
                centroid.lon,
                centroid.lat
            );
            feature.id = Some(CountryId::new(id));
            reassigned += 1;
        }
    }
    reassigned
}

fn exterior(polygon: &Polygon) -> &[LonLat] {
    polygon.first().map_or(&[], Vec::as_slice)
}

fn features_with_id<'a>(
    features: &'a mut [Feature],
    id: &'a CountryId,
) -> impl Iterator<Item = &'a mut Feature> + 'a {
    features
        .iter_mut()
        .filter(move |feature| feature.id.as_ref() == Some(id))
}

/// Apply the render-time corrections for the filter's continent to the
/// playable features and their game data. Returns the number of rules that
/// changed something.
pub fn apply_render_corrections(
    filter: &ContinentFilter,
    data: &mut GameData,
    features: &mut [Feature],
) -> usize {
    let mut applied = 0;
    for correction in corrections_for(filter) {
        let id = CountryId::new(correction.country);
        let changed = match correction.rule {
            CorrectionRule::TrimWestOf { lon } => {
                let removed: usize = features_with_id(features, &id)
                    .map(|feature| {
                        feature.geometry.retain_polygons(|polygon| {
                            exterior(polygon).first().is_none_or(|p| p.lon > lon)
                        })
                    })
                    .sum();
                removed > 0
            }
            CorrectionRule::FitExcludeWestOf { .. } => false,
            CorrectionRule::ShiftLongitude { degrees } => {
                let mut touched = false;
                for feature in features_with_id(features, &id) {
                    feature.geometry
                        .map_points(|point| point.lon = wrap_longitude(point.lon + degrees));
                    touched = true;
                }
                if let Some(country) = data.get_mut(&id) {
                    for city in &mut country.cities {
                        city.location.lon = wrap_longitude(city.location.lon + degrees);
                    }
                    touched = true;
                }
                touched
            }
            CorrectionRule::SnapCapitalToCentroid => {
                snap_capital(data, features, &id)
            }
        };
        if changed {
            log::debug!("applied {:?} to {id}", correction.rule);
            applied += 1;
        }
    }
    applied
}

fn snap_capital(data: &mut GameData, features: &[Feature], id: &CountryId) -> bool {
    let Some(feature) = features.iter().find(|f| f.id.as_ref() == Some(id)) else {
        return false;
    };
    let Some(centroid) = feature.geometry.centroid() else {
        return false;
    };
    let Some(capital) = data.get_mut(id).and_then(|country| country.capital_city_mut()) else {
        return false;
    };
    if feature.geometry.contains(capital.location) {
        return false;
    }
    capital.location = centroid;
    true
}

/// Geometries to fit the whole-map projection to. Features with a fit-only
/// exclusion are cloned and trimmed; everything else is borrowed.
#[must_use]
pub fn fit_geometries<'a>(filter: &ContinentFilter, features: &'a [Feature]) -> Vec<Cow<'a, Geometry>> {
    let exclusions: Vec<(CountryId, f64)> = corrections_for(filter)
        .filter_map(|correction| match correction.rule {
            CorrectionRule::FitExcludeWestOf { lon } => {
                Some((CountryId::new(correction.country), lon))
            }
            _ => None,
        })
        .collect();

    features
        .iter()
        .map(|feature| {
            let exclusion = exclusions
                .iter()
                .find(|(id, _)| feature.id.as_ref() == Some(id));
            match exclusion {
                Some((_, lon)) => {
                    let mut clone = feature.geometry.clone();
                    clone.retain_polygons(|polygon| {
                        ring_west(exterior(polygon)).is_none_or(|west| west >= *lon)
                    });
                    Cow::Owned(clone)
                }
                None => Cow::Borrowed(&feature.geometry),
            }
        })
        .collect()
}

/// Horizontal translate offset to add after the whole-map fit.
#[must_use]
pub fn fit_translate_offset(filter: &ContinentFilter, screen_width: f64) -> f64 {
    FIT_ADJUSTMENTS
        .iter()
        .filter(|adjustment| filter.continent() == Some(adjustment.continent))
        .map(|adjustment| adjustment.translate_x_ratio * screen_width)
        .sum()
}

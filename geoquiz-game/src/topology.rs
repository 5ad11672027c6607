//! Minimal TopoJSON decoder: turns the polygonal members of one named object
//! into GeoJSON-style features.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::constants::TOPOLOGY_OBJECT;
use crate::data::{CodeValue, CountryId};
use crate::geo::{Geometry, LonLat, Polygon, Ring};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TopologyError {
    #[error("topology has no `{0}` object")]
    MissingObject(String),
    #[error("geometry references arc {index} but the topology has {len} arcs")]
    MissingArc { index: i64, len: usize },
    #[error("geometry of type {kind} has malformed arcs")]
    MalformedGeometry { kind: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub scale: [f64; 2],
    pub translate: [f64; 2],
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TopoProperties {
    #[serde(default)]
    pub name: Option<String>,
}

/// Arc references; the nesting depth depends on the geometry type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TopoArcs {
    Line(Vec<i64>),
    Rings(Vec<Vec<i64>>),
    Polygons(Vec<Vec<Vec<i64>>>),
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TopoGeometry {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub id: Option<CodeValue>,
    #[serde(default)]
    pub arcs: Option<TopoArcs>,
    #[serde(default)]
    pub properties: Option<TopoProperties>,
    #[serde(default)]
    pub geometries: Vec<TopoGeometry>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Topology {
    #[serde(default)]
    pub transform: Option<Transform>,
    #[serde(default)]
    pub arcs: Vec<Vec<Vec<f64>>>,
    #[serde(default)]
    pub objects: BTreeMap<String, TopoGeometry>,
}

/// A decoded map feature. `id` is `None` when the topology carries no id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub id: Option<CountryId>,
    pub name: Option<String>,
    pub geometry: Geometry,
}

impl Feature {
    /// Whether the feature belongs to no sovereign state in the topology.
    #[must_use]
    pub fn is_unclaimed(&self) -> bool {
        self.id.as_ref().is_none_or(CountryId::is_unclaimed)
    }
}

impl Topology {
    /// Decode the `countries` object.
    pub fn countries(&self) -> Result<Vec<Feature>, TopologyError> {
        self.features(TOPOLOGY_OBJECT)
    }

    /// Decode every polygonal geometry of object `name`. Null, point and
    /// line geometries are skipped.
    pub fn features(&self, name: &str) -> Result<Vec<Feature>, TopologyError> {
        let object = self
            .objects
            .get(name)
            .ok_or_else(|| TopologyError::MissingObject(name.to_string()))?;
        let members: &[TopoGeometry] = if object.kind.as_deref() == Some("GeometryCollection") {
            &object.geometries
        } else {
            std::slice::from_ref(object)
        };

        let mut features = Vec::with_capacity(members.len());
        for member in members {
            if let Some(geometry) = self.decode_geometry(member)? {
                features.push(Feature {
                    id: member.id.as_ref().and_then(CodeValue::to_country_id),
                    name: member.properties.as_ref().and_then(|p| p.name.clone()),
                    geometry,
                });
            } else {
                log::debug!("skipping non-polygonal member {:?}", member.id);
            }
        }
        Ok(features)
    }

    fn decode_geometry(&self, geometry: &TopoGeometry) -> Result<Option<Geometry>, TopologyError> {
        let kind = geometry.kind.as_deref().unwrap_or_default();
        let malformed = || TopologyError::MalformedGeometry {
            kind: kind.to_string(),
        };
        match (kind, &geometry.arcs) {
            ("Polygon", Some(TopoArcs::Rings(rings))) => Ok(Some(Geometry::Polygon(
                self.decode_polygon(rings)?,
            ))),
            ("MultiPolygon", Some(TopoArcs::Polygons(polygons))) => {
                let polygons = polygons
                    .iter()
                    .map(|rings| self.decode_polygon(rings))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Some(Geometry::MultiPolygon(polygons)))
            }
            // An empty arc list parses as the shallowest variant.
            ("Polygon" | "MultiPolygon", Some(TopoArcs::Line(line))) if line.is_empty() => {
                Ok(Some(Geometry::MultiPolygon(Vec::new())))
            }
            ("Polygon" | "MultiPolygon", _) => Err(malformed()),
            _ => Ok(None),
        }
    }

    fn decode_polygon(&self, rings: &[Vec<i64>]) -> Result<Polygon, TopologyError> {
        rings.iter().map(|ring| self.decode_ring(ring)).collect()
    }

    fn decode_ring(&self, arcs: &[i64]) -> Result<Ring, TopologyError> {
        let mut points: Ring = Vec::new();
        for &index in arcs {
            // Consecutive arcs share their joining vertex.
            points.pop();
            let start = points.len();
            let arc = self.arc(index)?;
            let mut x = 0.0;
            let mut y = 0.0;
            for (position, raw) in arc.iter().enumerate() {
                let [rx, ry] = match raw.as_slice() {
                    [rx, ry, ..] => [*rx, *ry],
                    _ => continue,
                };
                let point = match self.transform {
                    Some(transform) => {
                        if position == 0 {
                            x = rx;
                            y = ry;
                        } else {
                            x += rx;
                            y += ry;
                        }
                        LonLat::new(
                            x.mul_add(transform.scale[0], transform.translate[0]),
                            y.mul_add(transform.scale[1], transform.translate[1]),
                        )
                    }
                    None => LonLat::new(rx, ry),
                };
                points.push(point);
            }
            if index < 0 {
                points[start..].reverse();
            }
        }
        if points.len() < 4 {
            if let Some(first) = points.first().copied() {
                points.push(first);
            }
        }
        Ok(points)
    }

    fn arc(&self, index: i64) -> Result<&[Vec<f64>], TopologyError> {
        let resolved = if index < 0 { !index } else { index };
        usize::try_from(resolved)
            .ok()
            .and_then(|i| self.arcs.get(i))
            .map(Vec::as_slice)
            .ok_or(TopologyError::MissingArc {
                index,
                len: self.arcs.len(),
            })
    }
}

//! TopoJSON document model and arc decoding
//!
//! Only what the boundary layer needs is modelled: the optional quantisation
//! transform, the shared arc table and `Polygon`/`MultiPolygon` geometries
//! (possibly nested in collections). Every other geometry type is skipped.
use std::collections::HashMap;

use glam::DVec2;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{FlowError, FlowResult};

/// A polygon is an outer ring followed by its holes, in lon/lat degrees.
pub type Ring = Vec<DVec2>;
pub type Polygon = Vec<Ring>;

const CODE_KEYS: &[&str] = &["regionCode", "SIG_CD"];
const NAME_KEYS: &[&str] = &["regionName", "SIG_KOR_NM"];
const PROVINCE_KEYS: &[&str] = &["provinceName", "CTP_KOR_NM"];

#[derive(Debug, Clone, Deserialize)]
pub struct Topology {
    #[serde(default)]
    pub transform: Option<TopoTransform>,
    pub arcs: Vec<Vec<Vec<f64>>>,
    pub objects: HashMap<String, TopoGeometry>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct TopoTransform {
    pub scale: [f64; 2],
    pub translate: [f64; 2],
}

#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "RawGeometry")]
pub enum TopoGeometry {
    GeometryCollection {
        geometries: Vec<TopoGeometry>,
    },
    Polygon {
        arcs: Vec<Vec<i64>>,
        properties: Option<Map<String, Value>>,
    },
    MultiPolygon {
        arcs: Vec<Vec<Vec<i64>>>,
        properties: Option<Map<String, Value>>,
    },
    /// Points, lines and null geometries; they carry no area.
    Unsupported,
}

/// Geometry object as written, before dispatching on its `type`, which
/// may be null.
#[derive(Debug, Deserialize)]
struct RawGeometry {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    geometries: Vec<TopoGeometry>,
    #[serde(default)]
    arcs: Value,
    #[serde(default)]
    properties: Option<Map<String, Value>>,
}

impl TryFrom<RawGeometry> for TopoGeometry {
    type Error = serde_json::Error;

    fn try_from(raw: RawGeometry) -> Result<Self, Self::Error> {
        Ok(match raw.kind.as_deref() {
            Some("GeometryCollection") => TopoGeometry::GeometryCollection {
                geometries: raw.geometries,
            },
            Some("Polygon") => TopoGeometry::Polygon {
                arcs: serde_json::from_value(raw.arcs)?,
                properties: raw.properties,
            },
            Some("MultiPolygon") => TopoGeometry::MultiPolygon {
                arcs: serde_json::from_value(raw.arcs)?,
                properties: raw.properties,
            },
            _ => TopoGeometry::Unsupported,
        })
    }
}

/// One boundary feature with its identifying properties.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionFeature {
    pub code: Option<String>,
    pub name: Option<String>,
    pub province: Option<String>,
    pub polygons: Vec<Polygon>,
}

/// Union of every feature sharing a province name, used for its label.
#[derive(Debug, Clone, PartialEq)]
pub struct ProvinceShape {
    pub name: String,
    pub polygons: Vec<Polygon>,
}

impl Topology {
    pub fn from_json_str(json: &str) -> FlowResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Absolute lon/lat coordinates of every arc.
    ///
    /// Quantised topologies store each arc as deltas from its previous point;
    /// those are accumulated before the transform is applied.
    pub fn decode_arcs(&self) -> Vec<Vec<DVec2>> {
        self.arcs
            .iter()
            .map(|arc| match self.transform {
                Some(transform) => {
                    let (mut x, mut y) = (0.0, 0.0);
                    arc.iter()
                        .filter(|position| position.len() >= 2)
                        .map(|position| {
                            x += position[0];
                            y += position[1];
                            DVec2::new(
                                x * transform.scale[0] + transform.translate[0],
                                y * transform.scale[1] + transform.translate[1],
                            )
                        })
                        .collect()
                }
                None => arc
                    .iter()
                    .filter(|position| position.len() >= 2)
                    .map(|position| DVec2::new(position[0], position[1]))
                    .collect(),
            })
            .collect()
    }

    /// Converts the named object into features, in document order.
    pub fn features(&self, object: &str) -> FlowResult<Vec<RegionFeature>> {
        let root = self
            .objects
            .get(object)
            .ok_or_else(|| FlowError::MissingObject(object.to_string()))?;
        let arcs = self.decode_arcs();
        let mut features = Vec::new();
        collect_features(root, &arcs, &mut features)?;
        Ok(features)
    }
}

fn collect_features(
    geometry: &TopoGeometry,
    arcs: &[Vec<DVec2>],
    out: &mut Vec<RegionFeature>,
) -> FlowResult<()> {
    match geometry {
        TopoGeometry::GeometryCollection { geometries } => {
            for child in geometries {
                collect_features(child, arcs, out)?;
            }
        }
        TopoGeometry::Polygon { arcs: rings, properties } => {
            let polygon = stitch_polygon(arcs, rings)?;
            out.push(feature_with_properties(properties.as_ref(), vec![polygon]));
        }
        TopoGeometry::MultiPolygon { arcs: polygons, properties } => {
            let polygons = polygons
                .iter()
                .map(|rings| stitch_polygon(arcs, rings))
                .collect::<FlowResult<Vec<_>>>()?;
            out.push(feature_with_properties(properties.as_ref(), polygons));
        }
        TopoGeometry::Unsupported => {}
    }
    Ok(())
}

fn stitch_polygon(arcs: &[Vec<DVec2>], rings: &[Vec<i64>]) -> FlowResult<Polygon> {
    rings.iter().map(|ring| stitch_ring(arcs, ring)).collect()
}

/// Joins arcs end to start; a negative index `!i` walks arc `i` backwards.
/// Consecutive arcs share their joint point, so it is kept only once.
fn stitch_ring(arcs: &[Vec<DVec2>], indices: &[i64]) -> FlowResult<Ring> {
    let mut ring: Ring = Vec::new();
    for &index in indices {
        let (arc_index, reversed) = if index < 0 { (!index, true) } else { (index, false) };
        let arc = usize::try_from(arc_index)
            .ok()
            .and_then(|i| arcs.get(i))
            .ok_or(FlowError::InvalidArc(index))?;
        if !ring.is_empty() {
            ring.pop();
        }
        if reversed {
            ring.extend(arc.iter().rev());
        } else {
            ring.extend(arc.iter());
        }
    }
    Ok(ring)
}

fn feature_with_properties(
    properties: Option<&Map<String, Value>>,
    polygons: Vec<Polygon>,
) -> RegionFeature {
    RegionFeature {
        code: properties.and_then(|p| lookup_text(p, CODE_KEYS)),
        name: properties.and_then(|p| lookup_text(p, NAME_KEYS)),
        province: properties.and_then(|p| lookup_text(p, PROVINCE_KEYS)),
        polygons,
    }
}

/// First non-empty string or number stored under any of `keys`.
fn lookup_text(properties: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match properties.get(*key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// Groups features by province name, keeping first-seen order.
/// Features without a province are left out.
pub fn group_provinces(features: &[RegionFeature]) -> Vec<ProvinceShape> {
    let mut provinces: Vec<ProvinceShape> = Vec::new();
    let mut index_by_name: HashMap<&str, usize> = HashMap::new();
    for feature in features {
        let Some(name) = feature.province.as_deref() else {
            continue;
        };
        let slot = *index_by_name.entry(name).or_insert_with(|| {
            provinces.push(ProvinceShape {
                name: name.to_string(),
                polygons: Vec::new(),
            });
            provinces.len() - 1
        });
        provinces[slot].polygons.extend(feature.polygons.iter().cloned());
    }
    provinces
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const QUANTISED: &str = r#"{
        "type": "Topology",
        "transform": {"scale": [0.5, 0.25], "translate": [126.0, 37.0]},
        "arcs": [
            [[0, 0], [2, 0], [0, 4]],
            [[2, 4], [-2, 0], [0, -4]]
        ],
        "objects": {
            "regions": {
                "type": "GeometryCollection",
                "geometries": [
                    {"type": "Polygon", "arcs": [[0, 1]],
                     "properties": {"SIG_CD": " 11110 ", "SIG_KOR_NM": "종로구", "CTP_KOR_NM": "서울특별시"}},
                    {"type": "MultiPolygon", "arcs": [[[0, 1]], [[-2, -1]]],
                     "properties": {"regionCode": 26110, "regionName": "중구"}},
                    {"type": "Point", "coordinates": [0, 0]},
                    {"type": "Polygon", "arcs": [[0, 1]]}
                ]
            }
        }
    }"#;

    #[test]
    fn decodes_quantised_deltas() {
        let topology = Topology::from_json_str(QUANTISED).unwrap();
        let arcs = topology.decode_arcs();
        assert_eq!(arcs[0].len(), 3);
        assert_abs_diff_eq!(arcs[0][1].x, 127.0, epsilon = 1e-12);
        assert_abs_diff_eq!(arcs[0][2].y, 38.0, epsilon = 1e-12);
        assert_abs_diff_eq!(arcs[1][2].x, 126.0, epsilon = 1e-12);
        assert_abs_diff_eq!(arcs[1][2].y, 37.0, epsilon = 1e-12);
    }

    #[test]
    fn stitches_rings_without_duplicate_joints() {
        let topology = Topology::from_json_str(QUANTISED).unwrap();
        let features = topology.features("regions").unwrap();
        assert_eq!(features.len(), 3);
        let ring = &features[0].polygons[0][0];
        assert_eq!(ring.len(), 5);
        assert_eq!(ring.first(), ring.last());
    }

    #[test]
    fn reversed_arcs_walk_backwards() {
        let topology = Topology::from_json_str(QUANTISED).unwrap();
        let features = topology.features("regions").unwrap();
        let forward = &features[1].polygons[0][0];
        let backward = &features[1].polygons[1][0];
        let mut reversed = forward.clone();
        reversed.reverse();
        assert_eq!(backward, &reversed);
    }

    #[test]
    fn reads_both_property_conventions() {
        let topology = Topology::from_json_str(QUANTISED).unwrap();
        let features = topology.features("regions").unwrap();
        assert_eq!(features[0].code.as_deref(), Some("11110"));
        assert_eq!(features[0].province.as_deref(), Some("서울특별시"));
        assert_eq!(features[1].code.as_deref(), Some("26110"));
        assert_eq!(features[1].name.as_deref(), Some("중구"));
        assert_eq!(features[2].code, None);
    }

    #[test]
    fn null_and_line_geometries_are_skipped() {
        let json = r#"{
            "type": "Topology",
            "arcs": [[[0, 0], [1, 0], [1, 1], [0, 0]]],
            "objects": {
                "regions": {
                    "type": "GeometryCollection",
                    "geometries": [
                        {"type": null, "properties": {"SIG_CD": "11", "SIG_KOR_NM": "서울"}},
                        {"type": "LineString", "arcs": [0]},
                        {"properties": {"SIG_CD": "27"}},
                        {"type": "Polygon", "arcs": [[0]], "properties": {"SIG_CD": "26"}}
                    ]
                }
            }
        }"#;
        let topology = Topology::from_json_str(json).unwrap();
        let features = topology.features("regions").unwrap();
        assert_eq!(features.len(), 1);
        assert_eq!(features[0].code.as_deref(), Some("26"));
    }

    #[test]
    fn malformed_polygon_arcs_are_json_errors() {
        let json = r#"{
            "type": "Topology",
            "arcs": [],
            "objects": {"regions": {"type": "Polygon", "arcs": "oops"}}
        }"#;
        assert!(matches!(Topology::from_json_str(json), Err(FlowError::Json(_))));
    }

    #[test]
    fn unknown_object_and_arc_are_errors() {
        let topology = Topology::from_json_str(QUANTISED).unwrap();
        assert!(matches!(
            topology.features("missing"),
            Err(FlowError::MissingObject(name)) if name == "missing"
        ));

        let mut broken = topology.clone();
        broken.objects.insert(
            "regions".to_string(),
            TopoGeometry::Polygon {
                arcs: vec![vec![0, 7]],
                properties: None,
            },
        );
        assert!(matches!(broken.features("regions"), Err(FlowError::InvalidArc(7))));
    }

    #[test]
    fn groups_provinces_in_first_seen_order() {
        let square = vec![vec![
            DVec2::new(0.0, 0.0),
            DVec2::new(1.0, 0.0),
            DVec2::new(1.0, 1.0),
            DVec2::new(0.0, 0.0),
        ]];
        let feature = |province: Option<&str>| RegionFeature {
            code: None,
            name: None,
            province: province.map(str::to_string),
            polygons: vec![square.clone()],
        };
        let provinces = group_provinces(&[
            feature(Some("B")),
            feature(Some("A")),
            feature(None),
            feature(Some("B")),
        ]);
        assert_eq!(provinces.len(), 2);
        assert_eq!(provinces[0].name, "B");
        assert_eq!(provinces[0].polygons.len(), 2);
        assert_eq!(provinces[1].name, "A");
    }
}

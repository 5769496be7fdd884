use std::collections::HashMap;
use std::fmt::Write;

use glam::DVec2;
use tracing::info;

use crate::error::FlowResult;
use crate::geo::projection::Mercator;
use crate::geo::topology::{group_provinces, Polygon, ProvinceShape, RegionFeature, Topology};

/// Pixel size of the map container.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContainerSize {
    pub width: f64,
    pub height: f64,
    pub device_pixel_ratio: f64,
}

impl ContainerSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            device_pixel_ratio: 1.0,
        }
    }

    pub fn with_device_pixel_ratio(mut self, ratio: f64) -> Self {
        self.device_pixel_ratio = if ratio > 0.0 { ratio } else { 1.0 };
        self
    }

    pub fn as_vec(&self) -> DVec2 {
        DVec2::new(self.width, self.height)
    }

    /// Backing-store size of a raster surface, in device pixels.
    pub fn device_pixels(&self) -> (u32, u32) {
        let scale = |v: f64| (v * self.device_pixel_ratio).round().max(1.0) as u32;
        (scale(self.width), scale(self.height))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub code: String,
    pub name: String,
    pub centroid: DVec2,
}

pub type RegionMap = HashMap<String, Region>;

/// Projected boundary of one feature, ready for the vector surface.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionShape {
    pub code: Option<String>,
    pub name: Option<String>,
    pub path_data: String,
    pub label_anchor: Option<DVec2>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProvinceLabel {
    pub name: String,
    pub anchor: DVec2,
}

/// Everything derived from one fit of the projection to the container.
/// Replaced wholesale on every layout.
#[derive(Debug, Clone)]
pub struct MapLayout {
    pub size: ContainerSize,
    pub projection: Mercator,
    pub regions: RegionMap,
    pub shapes: Vec<RegionShape>,
    pub province_labels: Vec<ProvinceLabel>,
}

impl MapLayout {
    pub fn region(&self, code: &str) -> Option<&Region> {
        self.regions.get(code)
    }
}

/// Holds the decoded boundary features and projects them on demand.
#[derive(Debug, Clone)]
pub struct GeometryProvider {
    features: Vec<RegionFeature>,
    provinces: Vec<ProvinceShape>,
}

impl GeometryProvider {
    pub fn new(features: Vec<RegionFeature>) -> Self {
        let provinces = group_provinces(&features);
        Self {
            features,
            provinces,
        }
    }

    pub fn from_topology(topology: &Topology, object: &str) -> FlowResult<Self> {
        Ok(Self::new(topology.features(object)?))
    }

    pub fn features(&self) -> &[RegionFeature] {
        &self.features
    }

    pub fn provinces(&self) -> &[ProvinceShape] {
        &self.provinces
    }

    /// Fits the projection to `size` and recomputes every screen-space
    /// position. Features lacking a code or name are drawn but left out of
    /// the region map.
    pub fn layout(&self, size: ContainerSize) -> MapLayout {
        let all_points = self
            .features
            .iter()
            .flat_map(|f| f.polygons.iter())
            .flat_map(|polygon| polygon.iter())
            .flat_map(|ring| ring.iter());
        let projection = Mercator::fit_size(size.as_vec(), all_points);

        let mut regions = RegionMap::with_capacity(self.features.len());
        let mut shapes = Vec::with_capacity(self.features.len());
        for feature in &self.features {
            let projected = project_polygons(&projection, &feature.polygons);
            let centroid = planar_centroid(&projected);

            if let (Some(code), Some(name), Some(centroid)) =
                (&feature.code, &feature.name, centroid)
            {
                regions.insert(
                    code.clone(),
                    Region {
                        code: code.clone(),
                        name: name.clone(),
                        centroid,
                    },
                );
            }

            shapes.push(RegionShape {
                code: feature.code.clone(),
                name: feature.name.clone(),
                path_data: path_data(&projected),
                label_anchor: centroid,
            });
        }

        let province_labels = self
            .provinces
            .iter()
            .filter_map(|province| {
                let projected = project_polygons(&projection, &province.polygons);
                planar_centroid(&projected).map(|anchor| ProvinceLabel {
                    name: province.name.clone(),
                    anchor,
                })
            })
            .collect();

        info!(
            regions = regions.len(),
            width = size.width,
            height = size.height,
            "map layout recomputed"
        );

        MapLayout {
            size,
            projection,
            regions,
            shapes,
            province_labels,
        }
    }
}

fn project_polygons(projection: &Mercator, polygons: &[Polygon]) -> Vec<Polygon> {
    polygons
        .iter()
        .map(|polygon| {
            polygon
                .iter()
                .map(|ring| ring.iter().map(|p| projection.project(*p)).collect())
                .collect()
        })
        .collect()
}

/// Area-weighted centroid of all rings; hole rings wind the other way and
/// subtract. Degenerate (zero-area) shapes fall back to the vertex mean.
pub fn planar_centroid(polygons: &[Polygon]) -> Option<DVec2> {
    let mut twice_area = 0.0;
    let mut weighted = DVec2::ZERO;
    let mut vertex_sum = DVec2::ZERO;
    let mut vertex_count = 0usize;

    for ring in polygons.iter().flat_map(|polygon| polygon.iter()) {
        for (i, a) in ring.iter().enumerate() {
            let b = ring[(i + 1) % ring.len()];
            let cross = a.x * b.y - b.x * a.y;
            twice_area += cross;
            weighted += (*a + b) * cross;
            vertex_sum += *a;
            vertex_count += 1;
        }
    }

    if twice_area.abs() > 1e-12 {
        Some(weighted / (3.0 * twice_area))
    } else if vertex_count > 0 {
        Some(vertex_sum / vertex_count as f64)
    } else {
        None
    }
}

/// SVG path commands for the projected rings.
fn path_data(polygons: &[Polygon]) -> String {
    let mut d = String::new();
    for ring in polygons.iter().flat_map(|polygon| polygon.iter()) {
        for (i, p) in ring.iter().enumerate() {
            let command = if i == 0 { 'M' } else { 'L' };
            let _ = write!(d, "{command}{:.2},{:.2}", p.x, p.y);
        }
        if !ring.is_empty() {
            d.push('Z');
        }
    }
    d
}

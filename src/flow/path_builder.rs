use std::collections::HashMap;

use glam::DVec2;
use tracing::{debug, trace};

use crate::config::FlowConfig;
use crate::flow::filter::FilterSnapshot;
use crate::flow::record::FlowRecord;
use crate::flow::FlowCategory;
use crate::geo::{Region, RegionMap};
use crate::math_utils::{curve_control_point, quadratic_point};

/// Aggregated, curved route between two regions for the active filters.
#[derive(Debug, Clone, PartialEq)]
pub struct MigrationPath {
    pub origin: Region,
    pub destination: Region,
    pub control: DVec2,
    pub total_volume: f64,
    pub category: FlowCategory,
}

impl MigrationPath {
    pub fn start(&self) -> DVec2 {
        self.origin.centroid
    }

    pub fn end(&self) -> DVec2 {
        self.destination.centroid
    }

    pub fn chord_length(&self) -> f64 {
        self.start().distance(self.end())
    }

    pub fn point_at(&self, t: f64) -> DVec2 {
        quadratic_point(self.start(), self.control, self.end(), t)
    }
}

/// Paths in first-seen order plus their summed volume.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathSet {
    pub paths: Vec<MigrationPath>,
    pub total_volume: f64,
}

impl PathSet {
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MigrationPath> {
        self.paths.iter()
    }
}

/// Derives one path per origin/destination pair that survives `filter`.
///
/// Pairs whose endpoints are missing from `regions`, or closer together
/// than `config.min_path_distance`, are dropped along with their volume.
/// An empty set is returned when nothing positive is left to animate, or
/// when the summed volume overflows.
pub fn build_paths(
    records: &[FlowRecord],
    filter: &FilterSnapshot,
    regions: &RegionMap,
    config: &FlowConfig,
) -> PathSet {
    let mut paths: Vec<MigrationPath> = Vec::new();
    let mut index_by_pair: HashMap<(&str, &str), usize> = HashMap::new();
    let mut unresolved = 0usize;
    let mut degenerate = 0usize;

    for (record, category) in filter.tagged_records(records, config.min_migration_count) {
        let pair = (record.origin.as_str(), record.destination.as_str());
        if let Some(&index) = index_by_pair.get(&pair) {
            paths[index].total_volume += record.volume;
            continue;
        }

        let (Some(origin), Some(destination)) = (regions.get(pair.0), regions.get(pair.1)) else {
            unresolved += 1;
            continue;
        };
        if origin.centroid.distance(destination.centroid) < config.min_path_distance {
            degenerate += 1;
            continue;
        }
        let Some(control) =
            curve_control_point(origin.centroid, destination.centroid, config.curve_offset_ratio)
        else {
            degenerate += 1;
            continue;
        };

        index_by_pair.insert(pair, paths.len());
        paths.push(MigrationPath {
            origin: origin.clone(),
            destination: destination.clone(),
            control,
            total_volume: record.volume,
            category,
        });
    }

    trace!(unresolved, degenerate, "dropped flow records");

    let total_volume: f64 = paths.iter().map(|p| p.total_volume).sum();
    if !(total_volume > 0.0 && total_volume.is_finite()) {
        debug!(year = %filter.year, total_volume, "no usable volume left after filtering");
        return PathSet::default();
    }

    debug!(
        year = %filter.year,
        paths = paths.len(),
        total_volume,
        "migration paths rebuilt"
    );
    PathSet {
        paths,
        total_volume,
    }
}

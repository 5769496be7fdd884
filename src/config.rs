use std::fs;
use std::ops::Range;
use std::path::Path;

use serde::Deserialize;

use crate::constants::*;
use crate::error::{FlowError, FlowResult};

/// Tunables for filtering, allocation, animation and zoom.
///
/// Every field falls back to its value in [`crate::constants`], so a config
/// file only needs to name what it overrides.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FlowConfig {
    pub max_particles: usize,
    pub min_migration_count: f64,
    pub particle_duration_ms: Range<f64>,
    pub particle_size: Range<f64>,
    pub curve_offset_ratio: f64,
    pub min_path_distance: f64,
    pub label_zoom_threshold: f64,
    pub scale_extent: [f64; 2],
    pub topology_object: String,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            max_particles: MAX_PARTICLES,
            min_migration_count: MIN_MIGRATION_COUNT,
            particle_duration_ms: PARTICLE_DURATION_MIN_MS..PARTICLE_DURATION_MAX_MS,
            particle_size: PARTICLE_SIZE_MIN..PARTICLE_SIZE_MAX,
            curve_offset_ratio: CURVE_OFFSET_RATIO,
            min_path_distance: MIN_PATH_DISTANCE,
            label_zoom_threshold: LABEL_ZOOM_THRESHOLD,
            scale_extent: [ZOOM_SCALE_MIN, ZOOM_SCALE_MAX],
            topology_object: DEFAULT_TOPOLOGY_OBJECT.to_string(),
        }
    }
}

impl FlowConfig {
    /// Parses and validates a JSON config.
    pub fn from_json_str(json: &str) -> FlowResult<Self> {
        let config: FlowConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> FlowResult<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| FlowError::io(path, e))?;
        Self::from_json_str(&json)
    }

    /// Rejects values the zoom, path and particle stages cannot work with.
    pub fn validate(&self) -> FlowResult<()> {
        let invalid = |message: String| Err(FlowError::InvalidConfig(message));

        let [min_scale, max_scale] = self.scale_extent;
        if !(min_scale.is_finite() && max_scale.is_finite() && 0.0 < min_scale && min_scale <= max_scale) {
            return invalid(format!("scale_extent {:?} must be finite with 0 < min <= max", self.scale_extent));
        }
        check_range("particle_duration_ms", &self.particle_duration_ms, f64::MIN_POSITIVE)?;
        check_range("particle_size", &self.particle_size, 0.0)?;
        if !(self.min_path_distance.is_finite() && self.min_path_distance >= 0.0) {
            return invalid(format!("min_path_distance {} must be finite and >= 0", self.min_path_distance));
        }
        if !self.curve_offset_ratio.is_finite() {
            return invalid(format!("curve_offset_ratio {} must be finite", self.curve_offset_ratio));
        }
        if self.min_migration_count.is_nan() {
            return invalid("min_migration_count must be a number".to_string());
        }
        if self.label_zoom_threshold.is_nan() {
            return invalid("label_zoom_threshold must be a number".to_string());
        }
        Ok(())
    }
}

fn check_range(name: &str, range: &Range<f64>, floor: f64) -> FlowResult<()> {
    if range.start.is_finite() && range.end.is_finite() && range.start >= floor && range.start <= range.end {
        Ok(())
    } else {
        Err(FlowError::InvalidConfig(format!(
            "{name} {range:?} must be finite with {floor} <= start <= end"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_yields_defaults() {
        let config = FlowConfig::from_json_str("{}").unwrap();
        assert_eq!(config, FlowConfig::default());
        assert_eq!(config.max_particles, 5000);
        assert_eq!(config.min_migration_count, 100.0);
    }

    #[test]
    fn partial_override() {
        let config =
            FlowConfig::from_json_str(r#"{"max_particles": 200, "scale_extent": [1.0, 8.0]}"#)
                .unwrap();
        assert_eq!(config.max_particles, 200);
        assert_eq!(config.scale_extent, [1.0, 8.0]);
        assert_eq!(config.label_zoom_threshold, LABEL_ZOOM_THRESHOLD);
    }

    #[test]
    fn ranges_deserialize_from_start_end() {
        let config = FlowConfig::from_json_str(
            r#"{"particle_duration_ms": {"start": 1000.0, "end": 2000.0}}"#,
        )
        .unwrap();
        assert_eq!(config.particle_duration_ms, 1000.0..2000.0);
    }

    #[test]
    fn defaults_are_valid() {
        assert!(FlowConfig::default().validate().is_ok());
    }

    #[test]
    fn inverted_or_degenerate_values_are_rejected() {
        for json in [
            r#"{"scale_extent": [10.0, 1.0]}"#,
            r#"{"scale_extent": [0.0, 5.0]}"#,
            r#"{"particle_duration_ms": {"start": 9000.0, "end": 1000.0}}"#,
            r#"{"particle_duration_ms": {"start": 0.0, "end": 1000.0}}"#,
            r#"{"particle_size": {"start": -1.0, "end": 1.0}}"#,
            r#"{"min_path_distance": -2.0}"#,
        ] {
            let result = FlowConfig::from_json_str(json);
            assert!(matches!(result, Err(FlowError::InvalidConfig(_))), "{json}");
        }
    }

    #[test]
    fn equal_bounds_are_accepted() {
        let config = FlowConfig::from_json_str(
            r#"{"scale_extent": [2.0, 2.0], "particle_size": {"start": 1.0, "end": 1.0}}"#,
        )
        .unwrap();
        assert_eq!(config.scale_extent, [2.0, 2.0]);
    }

    #[test]
    fn missing_file_is_io_error() {
        let result = FlowConfig::from_json_file("/path/that/does/not/exist.json");
        assert!(matches!(result, Err(FlowError::Io { .. })));
    }
}

// Dataset filtering
pub const MIN_MIGRATION_COUNT: f64 = 100.0; // net movers per record, inclusive
pub const MAX_PARTICLES: usize = 5000; // target density, ceiling rounding may overshoot

// Path geometry (screen units)
pub const MIN_PATH_DISTANCE: f64 = 1.0;
pub const CURVE_OFFSET_RATIO: f64 = 0.1; // perpendicular bend as a fraction of the chord

// Particle timing and size
pub const PARTICLE_DURATION_MIN_MS: f64 = 7000.0;
pub const PARTICLE_DURATION_MAX_MS: f64 = 10000.0;
pub const PARTICLE_SIZE_MIN: f64 = 0.9;
pub const PARTICLE_SIZE_MAX: f64 = 1.9;
pub const PARTICLE_RADIUS_FACTOR: f64 = 0.5;

// Rendering
pub const PATH_STROKE_WIDTH: f64 = 0.5;
pub const LOG_ZOOM_FACTOR: f64 = 3.0; // widths divide by ln(k * LOG_ZOOM_FACTOR)
pub const CURVE_SEGMENT_PX: f64 = 6.0;

// Zoom
pub const ZOOM_SCALE_MIN: f64 = 0.5;
pub const ZOOM_SCALE_MAX: f64 = 50.0;
pub const LABEL_ZOOM_THRESHOLD: f64 = 3.5;

// RGBA, alpha is 0.07 for strokes and 0.7 for particles
pub const PATH_STROKE_COLOR: [u8; 4] = [255, 234, 0, 18];
pub const NORMAL_PARTICLE_COLOR: [u8; 4] = [255, 255, 150, 179];
pub const INFLOW_PARTICLE_COLOR: [u8; 4] = [102, 255, 102, 179];
pub const OUTFLOW_PARTICLE_COLOR: [u8; 4] = [255, 102, 102, 179];

// Topology object holding the municipal boundaries
pub const DEFAULT_TOPOLOGY_OBJECT: &str = "법정구역_시군구_simplified";

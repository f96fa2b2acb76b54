pub const GRID_WIDTH: usize = 256;
pub const GRID_HEIGHT: usize = 256;
pub const CELL_SIZE: f32 = 1.0;
pub const WORLD_WIDTH: f32 = GRID_WIDTH as f32 * CELL_SIZE;
pub const WORLD_HEIGHT: f32 = GRID_HEIGHT as f32 * CELL_SIZE;

/// Number of straight subdivisions used when flattening a curved path span.
pub const CURVE_SEGMENTS: usize = 20;

/// Two clicks closer together than this count as a double click.
pub const DOUBLE_CLICK_WINDOW_MS: f64 = 350.0;

/// Curving the last span displaces the control point by this fraction of the
/// span length along the span's perpendicular.
pub const CURVE_BULGE_FACTOR: f32 = 0.3;

/// Determinants smaller than this reject a segment pair as parallel.
pub const SEGMENT_PARALLEL_EPS: f64 = 1e-10;

/// Crossings closer together than this merge into one junction cluster.
pub const JUNCTION_CLUSTER_TOLERANCE: f32 = 0.5;

/// Junction radius = max connected half-width scaled by this factor.
pub const JUNCTION_RADIUS_FACTOR: f32 = 1.5;

/// Endpoints within `junction radius * this factor` snap onto the center.
pub const ENDPOINT_SNAP_FACTOR: f32 = 0.5;

/// Grid extent along X, in cells.
pub const GRID_WIDTH: usize = 128;
/// Grid extent along Z, in cells.
pub const GRID_HEIGHT: usize = 128;
/// World-space size of one grid cell.
pub const CELL_SIZE: f32 = 1.0;
/// Fixed Y level of the track plane. Segments only exist at this height.
pub const TRACK_PLANE_Y: i32 = 0;
/// Simulation tick length in seconds (10 Hz fixed step).
pub const TICK_SECONDS: f32 = 0.1;
/// Default fleet speed in grid cells per second.
pub const DEFAULT_FLEET_SPEED: f32 = 1.5;
/// Speed added to the fleet each time a checkpoint is cleared.
pub const CHECKPOINT_SPEED_BONUS: f32 = 0.25;

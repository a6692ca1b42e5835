//! Global configuration constants for the Voxel Springs simulator.

/// Default gravity vector applied to every free node (Z-up).
pub const DEFAULT_GRAVITY: [f32; 3] = [0.0, 0.0, -9.81];

/// Default spring constant shared by every edge.
pub const DEFAULT_STIFFNESS: f32 = 1000.0;

/// Default per-node mass.
pub const DEFAULT_MASS: f32 = 1.0;

/// Default viscous damping coefficient.
pub const DEFAULT_DAMPING: f32 = 0.01;

/// Default frame timestep (in seconds) used by interactive callers.
pub const DEFAULT_TIME_STEP: f32 = 0.02;

/// Frame budget in milliseconds; steps slower than this are reported.
pub const DEFAULT_FRAME_BUDGET_MS: f32 = 1000.0 / 60.0;

/// The three positive axis offsets looked up when connecting voxels.
pub const NEIGHBOR_OFFSETS: [[i32; 3]; 3] = [[1, 0, 0], [0, 1, 0], [0, 0, 1]];

use bevy::prelude::*;

// Camera projection and home pose.
pub const CAMERA_FOV_DEGREES: f32 = 60.0;
pub const CAMERA_NEAR: f32 = 0.1;
pub const CAMERA_FAR: f32 = 1000.0;
pub const CAMERA_HOME_POSITION: Vec3 = Vec3::new(10.0, 10.0, 10.0);

/// Framing places the camera at `FRAMING_DISTANCE_FACTOR * max_dimension`
/// along each axis; degenerate (empty or flat) bounds are clamped so the
/// camera never lands on the target itself.
pub const FRAMING_DISTANCE_FACTOR: f32 = 2.0;
pub const MIN_FRAMING_DISTANCE: f32 = 1.0;

// Orbit controller feel.
pub const ORBIT_YAW_SENSITIVITY: f32 = 0.005;
pub const ORBIT_PITCH_SENSITIVITY: f32 = 0.005;
pub const ORBIT_PITCH_LIMIT: f32 = 1.54;
pub const ORBIT_MIN_DISTANCE: f32 = 0.2;
pub const ORBIT_MAX_DISTANCE: f32 = 900.0;
pub const ORBIT_SMOOTHING: f32 = 12.0;

// Scene fixtures.
pub const CLEAR_COLOUR: Color = Color::srgb(0.94, 0.94, 0.94);
pub const GRID_EXTENT: f32 = 50.0;
pub const GRID_LINE_COUNT: u32 = 50;
pub const GRID_LINE_COLOUR: [f32; 4] = [0.27, 0.27, 0.27, 1.0];
pub const GRID_CENTRE_LINE_COLOUR: [f32; 4] = [0.53, 0.53, 0.53, 1.0];
pub const AXES_LENGTH: f32 = 5.0;

// Lighting.
pub const AMBIENT_BRIGHTNESS: f32 = 300.0;
pub const DIRECTIONAL_ILLUMINANCE: f32 = 6_000.0;
pub const DIRECTIONAL_LIGHT_POSITION: Vec3 = Vec3::new(10.0, 20.0, 10.0);
pub const SHADOW_MAP_SIZE: usize = 2048;

/// Cross sections cut along a fixed plane through the origin; the offset and
/// orientation are not part of the public contract.
pub const SECTION_PLANE_NORMAL: Vec3 = Vec3::X;
pub const SECTION_PLANE_OFFSET: f32 = 0.0;

/// Seconds between frame-stats notifications to the host page.
pub const STATS_NOTIFY_INTERVAL: f32 = 0.5;

pub const SAMPLE_CATALOG_PATH: &str = "sample_models.json";

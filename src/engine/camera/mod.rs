//! Orbit camera for model inspection.
//!
//! Provides yaw/pitch/distance orbiting around a focus point with smooth
//! interpolation, plus automatic framing of newly attached models.

/// Orbit camera resource, framing system, and mouse controller.
pub mod orbit_camera;

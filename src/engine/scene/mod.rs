//! Static scene furniture for spatial reference.
//!
//! Provides the ground grid and coordinate axes drawn beneath and around
//! loaded models.

/// RGB coordinate axis lines marking the world origin.
pub mod axes;

/// Ground plane grid mesh generation with highlighted centre lines.
pub mod grid;

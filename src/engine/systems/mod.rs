//! Runtime systems for display control and diagnostics.
//!
//! Provides wireframe and cross-section toggling, frame statistics
//! tracking, and keyboard shortcuts for development and user interaction.

/// Display mode state and toggle application over the attached model.
///
/// Applies wireframe and section clipping per mesh entity and reapplies modes after reloads.
pub mod display_modes;

/// Frame statistics tracking and notification systems.
///
/// Counts model triangles and draw calls, and sends periodic stats to the host page via RPC.
pub mod frame_stats;

/// Keyboard shortcut handling for native viewer builds.
///
/// Maps sample cycling, display toggles, recentring, and exit onto single keys.
pub mod keyboard_shortcuts;

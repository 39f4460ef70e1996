//! Rendering extensions layered over the standard PBR pipeline.
//!
//! Provides the cross-section clipping material that discards fragments
//! on one side of a world-space plane.

/// Section plane state and the clipping material extension.
///
/// Extends `StandardMaterial` with a plane uniform consumed by the clip shader.
pub mod section_material;

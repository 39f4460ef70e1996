//! Model lifecycle management from load request to attached scene.
//!
//! Handles format classification, staged GLTF loading with progress
//! notifications, bounds measurement, and single-slot model replacement.

/// Axis-aligned bounds measurement over spawned model subtrees.
///
/// Composes mesh bounding boxes through the transform hierarchy in model-local space.
pub mod bounds;

/// Model format classification from URL or file extension.
pub mod format;

/// Staged loading pipeline from asset request to scene attachment.
///
/// Polls asset load states, spawns scene roots, and reports progress or failure over RPC.
pub mod loading;

/// Single-slot model state with generation-guarded replacement.
///
/// Tracks the pending load and attached model, superseding stale loads on new requests.
pub mod slot;

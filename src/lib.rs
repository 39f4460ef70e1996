//! Browser-embeddable 3D model viewer built on Bevy.
//!
//! Loads GLTF/GLB models over HTTP, frames them for inspection, and exposes
//! display toggles and frame diagnostics to a host page over JSON-RPC.

pub mod constants;
pub mod engine;
pub mod error;
pub mod rpc;

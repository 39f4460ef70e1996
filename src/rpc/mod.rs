//! JSON-RPC 2.0 communication layer for host page integration.
//!
//! Implements bidirectional messaging between the Bevy viewer and the
//! embedding page via iframe postMessage, supporting both request-response
//! and notification patterns.
//!
//! ## Architecture
//!
//! The RPC system uses standard JSON-RPC 2.0 protocol with:
//! - **Requests**: Expect responses with matching IDs
//! - **Notifications**: One-way messages without responses
//! - **Responses**: Reply to requests with results or errors
//!
//! ## Message Flow
//!
//! ```text
//! Host Page (Parent Window)  <──postMessage──>  Viewer (iframe)
//!        │                                           │
//!        ├─ Request (with ID) ─────────────────────> │
//!        │                                           ├─ Process request
//!        │ <──────────────────── Response (with ID) ─┤
//!        │                                           │
//!        │ <───────────── Notification (no ID) ─────┤
//! ```
//!
//! ## Adding New RPC Methods
//!
//! Add a method case in `handle_rpc_request()`, implement a handler that
//! deserialises its params with serde and returns `Result<Value, RpcError>`,
//! and call it from the host page with a unique request ID.
//!
//! ## Sending Notifications from the Viewer
//!
//! Use `WebRpcInterface::send_notification()` to push updates to the host:
//!
//! ```rust,ignore
//! fn your_system(mut rpc: ResMut<WebRpcInterface>) {
//!     rpc.send_notification("event_name", json!({
//!         "data": "value"
//!     }));
//! }
//! ```
//!
//! ## Error Handling
//!
//! Standard JSON-RPC 2.0 error codes:
//! - `-32600`: Invalid request
//! - `-32601`: Method not found
//! - `-32602`: Invalid params
//! - `-32603`: Internal error
//!
//! ## Existing Methods
//!
//! ### Model Operations
//! - `load_model`: Fetch and attach a GLTF/GLB model by URL
//! - `center_model`: Recentre the model and reframe the camera
//! - `list_sample_models`: List bundled sample models from the catalogue
//!
//! ### Display Control
//! - `toggle_wireframe`: Switch wireframe overlay on or off
//! - `toggle_section`: Switch cross-section clipping on or off
//!
//! ### Diagnostics
//! - `get_frame_stats`: Retrieve FPS, triangle count, and draw calls
//!
//! ## Outgoing Notifications
//!
//! - `load_progress`: Staged loading progress in [0, 1]
//! - `model_loaded`: Attachment complete, with measured bounds
//! - `load_error`: Fetch, parse, or dependency failure for a load
//! - `viewer_notice`: Non-fatal notices such as unsupported formats
//! - `display_mode_changed`: Wireframe or section state flipped
//! - `frame_stats`: Periodic FPS and mesh statistics
//! - `debug_message`: Parse errors and other diagnostics

/// JSON-RPC 2.0 bidirectional communication system for host page integration.
///
/// Handles request-response patterns, notifications, and WASM message listeners.
pub mod web_rpc;

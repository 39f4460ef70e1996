use bevy::diagnostic::{DiagnosticsStore, FrameTimeDiagnosticsPlugin};
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::engine::assets::sample_catalog::SampleCatalogLoader;
use crate::engine::model::slot::{CenterModelEvent, LoadModelEvent, ModelSlot, RequestSource};
use crate::engine::systems::display_modes::{ToggleSectionEvent, ToggleWireframeEvent};
use crate::engine::systems::frame_stats::FrameStats;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::JsValue;

#[cfg(target_arch = "wasm32")]
use web_sys::{MessageEvent, window};

/// JSON-RPC 2.0 request structure.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcRequest {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
    pub id: Option<serde_json::Value>,
}

/// JSON-RPC 2.0 response structure.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcResponse {
    pub jsonrpc: String,
    pub result: Option<serde_json::Value>,
    pub error: Option<RpcError>,
    pub id: Option<serde_json::Value>,
}

/// JSON-RPC 2.0 notification structure for one-way communication.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcNotification {
    pub jsonrpc: String,
    pub method: String,
    pub params: serde_json::Value,
}

/// JSON-RPC error structure following specification.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
    pub data: Option<serde_json::Value>,
}

/// Resource managing bidirectional RPC communication between the host page
/// and the viewer. Handles both request-response patterns and notification
/// broadcasting.
#[derive(Resource, Default)]
pub struct WebRpcInterface {
    outgoing_notifications: Vec<RpcNotification>,
    outgoing_responses: Vec<RpcResponse>,
}

impl WebRpcInterface {
    /// Send notification to the host page without expecting a response.
    pub fn send_notification(&mut self, method: &str, params: serde_json::Value) {
        self.outgoing_notifications.push(RpcNotification {
            jsonrpc: "2.0".to_string(),
            method: method.to_string(),
            params,
        });
    }

    /// Queue response for transmission to the host page.
    fn queue_response(&mut self, response: RpcResponse) {
        self.outgoing_responses.push(response);
    }

    /// Notifications queued but not yet flushed to the transport.
    pub fn queued_notifications(&self) -> &[RpcNotification] {
        &self.outgoing_notifications
    }

    /// Responses queued but not yet flushed to the transport.
    pub fn queued_responses(&self) -> &[RpcResponse] {
        &self.outgoing_responses
    }
}

/// Plugin establishing the RPC layer for iframe-based deployment.
pub struct WebRpcPlugin;

impl Plugin for WebRpcPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<WebRpcInterface>()
            .add_event::<IncomingRpcMessage>()
            .add_systems(
                Update,
                (
                    process_incoming_messages,
                    handle_rpc_messages,
                    send_outgoing_messages,
                )
                    .chain(),
            );

        #[cfg(target_arch = "wasm32")]
        app.add_systems(Startup, setup_message_listener);
    }
}

#[cfg(target_arch = "wasm32")]
fn setup_message_listener(mut commands: Commands) {
    use std::sync::Arc;
    use std::sync::Mutex;

    // Thread-safe message queue for cross-thread communication.
    let message_queue: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let queue_clone = message_queue.clone();

    let closure = Closure::wrap(Box::new(move |event: MessageEvent| {
        // Filter messages to ensure they contain string data.
        if let Ok(data) = event.data().dyn_into::<js_sys::JsString>() {
            let message_str: String = data.into();

            // Attempt JSON parsing to validate RPC format before queuing.
            if message_str.contains("jsonrpc") {
                if let Ok(mut queue) = queue_clone.lock() {
                    queue.push(message_str);
                }
            }
        }
    }) as Box<dyn FnMut(MessageEvent)>);

    if let Some(window) = window() {
        window
            .add_event_listener_with_callback("message", closure.as_ref().unchecked_ref())
            .expect("Failed to register message listener");
    }

    // Prevent closure from being dropped by transferring ownership to JS.
    closure.forget();
    commands.insert_resource(MessageQueue(message_queue));
}

/// Resource wrapping thread-safe message queue for WASM event handling.
#[derive(Resource)]
struct MessageQueue(std::sync::Arc<std::sync::Mutex<Vec<String>>>);

/// Event representing incoming RPC message from the host page.
#[derive(Event)]
struct IncomingRpcMessage {
    content: String,
}

fn process_incoming_messages(
    message_queue: Option<Res<MessageQueue>>,
    mut message_events: EventWriter<IncomingRpcMessage>,
) {
    let Some(queue_res) = message_queue else {
        return;
    };

    let messages = if let Ok(mut queue) = queue_res.0.lock() {
        std::mem::take(&mut *queue)
    } else {
        Vec::new()
    };

    for message_str in messages {
        message_events.write(IncomingRpcMessage {
            content: message_str,
        });
    }
}

/// Viewer command writers the request handlers dispatch into.
struct ViewerCommandWriters<'a, 'w1, 'w2, 'w3, 'w4> {
    load: &'a mut EventWriter<'w1, LoadModelEvent>,
    wireframe: &'a mut EventWriter<'w2, ToggleWireframeEvent>,
    section: &'a mut EventWriter<'w3, ToggleSectionEvent>,
    center: &'a mut EventWriter<'w4, CenterModelEvent>,
}

fn handle_rpc_messages(
    mut events: EventReader<IncomingRpcMessage>,
    mut rpc_interface: ResMut<WebRpcInterface>,
    diagnostics: Res<DiagnosticsStore>,
    stats: Res<FrameStats>,
    slot: Res<ModelSlot>,
    catalog: Res<SampleCatalogLoader>,
    mut load_events: EventWriter<LoadModelEvent>,
    mut wireframe_events: EventWriter<ToggleWireframeEvent>,
    mut section_events: EventWriter<ToggleSectionEvent>,
    mut center_events: EventWriter<CenterModelEvent>,
) {
    for event in events.read() {
        match serde_json::from_str::<RpcRequest>(&event.content) {
            Ok(request) => {
                let mut writers = ViewerCommandWriters {
                    load: &mut load_events,
                    wireframe: &mut wireframe_events,
                    section: &mut section_events,
                    center: &mut center_events,
                };
                if let Some(response) = handle_rpc_request(
                    &request,
                    &diagnostics,
                    &stats,
                    &slot,
                    &catalog,
                    &mut writers,
                ) {
                    rpc_interface.queue_response(response);
                }
            }
            Err(parse_error) => {
                rpc_interface.send_notification(
                    "debug_message",
                    serde_json::json!({
                        "message": format!("Parse error: {}", parse_error)
                    }),
                );
            }
        }
    }
}

/// Handle individual RPC request and generate response based on method.
fn handle_rpc_request(
    request: &RpcRequest,
    diagnostics: &DiagnosticsStore,
    stats: &FrameStats,
    slot: &ModelSlot,
    catalog: &SampleCatalogLoader,
    writers: &mut ViewerCommandWriters,
) -> Option<RpcResponse> {
    // Only generate responses for requests with IDs (notifications have no ID).
    let id = request.id.clone()?;

    let result = match request.method.as_str() {
        "load_model" => handle_load_model(&request.params, writers.load),
        "toggle_wireframe" => {
            writers.wireframe.write(ToggleWireframeEvent {
                source: RequestSource::Rpc,
            });
            Ok(serde_json::json!({ "success": true }))
        }
        "toggle_section" => {
            writers.section.write(ToggleSectionEvent {
                source: RequestSource::Rpc,
            });
            Ok(serde_json::json!({ "success": true }))
        }
        "center_model" => {
            writers.center.write(CenterModelEvent);
            Ok(serde_json::json!({ "success": true }))
        }
        "get_frame_stats" => handle_get_frame_stats(diagnostics, stats, slot),
        "list_sample_models" => handle_list_sample_models(catalog),
        _ => {
            warn!("Unknown RPC method: {}", request.method);
            return Some(create_error_response(
                id,
                -32601,
                "Method not found",
                Some(serde_json::json!({"method": request.method})),
            ));
        }
    };

    match result {
        Ok(result_value) => Some(RpcResponse {
            jsonrpc: "2.0".to_string(),
            result: Some(result_value),
            error: None,
            id: Some(id),
        }),
        Err(error) => Some(RpcResponse {
            jsonrpc: "2.0".to_string(),
            result: None,
            error: Some(error),
            id: Some(id),
        }),
    }
}

/// Handle model load RPC method with parameter validation and event dispatch.
fn handle_load_model(
    params: &serde_json::Value,
    load_events: &mut EventWriter<LoadModelEvent>,
) -> Result<serde_json::Value, RpcError> {
    #[derive(serde::Deserialize)]
    struct LoadModelParams {
        url: String,
    }

    let load_params = serde_json::from_value::<LoadModelParams>(params.clone())
        .map_err(|_| RpcError::invalid_params("Expected 'url' parameter"))?;

    load_events.write(LoadModelEvent {
        url: load_params.url.clone(),
        source: RequestSource::Rpc,
    });

    info!("Model load dispatched over RPC: {}", load_params.url);

    Ok(serde_json::json!({
        "success": true,
        "url": load_params.url
    }))
}

/// Frame statistics snapshot: smoothed FPS plus model mesh counts.
fn handle_get_frame_stats(
    diagnostics: &DiagnosticsStore,
    stats: &FrameStats,
    slot: &ModelSlot,
) -> Result<serde_json::Value, RpcError> {
    let fps = diagnostics
        .get(&FrameTimeDiagnosticsPlugin::FPS)
        .and_then(|fps_diagnostic| fps_diagnostic.smoothed())
        .unwrap_or(0.0) as f32;

    Ok(serde_json::json!({
        "fps": fps,
        "triangles": stats.triangles,
        "draw_calls": stats.draw_calls,
        "model": slot.attached.as_ref().map(|attached| attached.url.clone()),
    }))
}

fn handle_list_sample_models(
    catalog: &SampleCatalogLoader,
) -> Result<serde_json::Value, RpcError> {
    let models = serde_json::to_value(catalog.models())
        .map_err(|error| RpcError::internal_error(&error.to_string()))?;
    Ok(serde_json::json!({ "models": models }))
}

/// Create standardized error response with optional data payload.
fn create_error_response(
    id: serde_json::Value,
    code: i32,
    message: &str,
    data: Option<serde_json::Value>,
) -> RpcResponse {
    RpcResponse {
        jsonrpc: "2.0".to_string(),
        result: None,
        error: Some(RpcError {
            code,
            message: message.to_string(),
            data,
        }),
        id: Some(id),
    }
}

/// Send queued notifications and responses to the host page.
fn send_outgoing_messages(mut rpc_interface: ResMut<WebRpcInterface>) {
    // Send notifications first.
    for notification in rpc_interface.outgoing_notifications.drain(..) {
        send_message_to_parent(&notification);
    }

    // Send responses second to maintain order.
    for response in rpc_interface.outgoing_responses.drain(..) {
        send_message_to_parent(&response);
    }
}

/// Send serialized message to the parent window (host page).
fn send_message_to_parent<T: Serialize>(message: &T) {
    #[cfg(target_arch = "wasm32")]
    {
        match serde_json::to_string(message) {
            Ok(json) => {
                if let Some(window) = window() {
                    if let Some(parent) = window.parent().ok().flatten() {
                        if let Err(e) = parent.post_message(&JsValue::from_str(&json), "*") {
                            error!("Failed to send message to parent: {:?}", e);
                        }
                    } else {
                        warn!("No parent window available for message transmission");
                    }
                } else {
                    error!("Window object not available");
                }
            }
            Err(e) => {
                error!("Failed to serialize message: {}", e);
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        // No-op for non-WASM targets.
        let _ = message;
    }
}

/// Standard RPC error codes and constructors.
impl RpcError {
    pub fn invalid_params(message: &str) -> Self {
        Self {
            code: -32602,
            message: message.to_string(),
            data: None,
        }
    }

    pub fn internal_error(message: &str) -> Self {
        Self {
            code: -32603,
            message: message.to_string(),
            data: None,
        }
    }
}

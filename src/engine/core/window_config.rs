use bevy::prelude::*;
use bevy::window::PresentMode;

/// Create platform-appropriate window configuration.
///
/// WASM builds bind to the host page canvas and track its size so the
/// viewer fills whatever element the embedding page provides.
pub fn create_window_config() -> Window {
    #[cfg(target_arch = "wasm32")]
    {
        Window {
            canvas: Some("#viewer-canvas".into()),
            fit_canvas_to_parent: true,
            prevent_default_event_handling: false,
            present_mode: PresentMode::AutoVsync,
            ..default()
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        Window {
            title: "Model Viewer".into(),
            present_mode: PresentMode::AutoVsync,
            ..default()
        }
    }
}

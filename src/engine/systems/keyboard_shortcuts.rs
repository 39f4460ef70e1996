#[cfg(not(target_arch = "wasm32"))]
use bevy::prelude::*;

#[cfg(not(target_arch = "wasm32"))]
use crate::engine::assets::sample_catalog::SampleCatalogLoader;
#[cfg(not(target_arch = "wasm32"))]
use crate::engine::model::slot::{CenterModelEvent, LoadModelEvent, RequestSource};
#[cfg(not(target_arch = "wasm32"))]
use crate::engine::systems::display_modes::{ToggleSectionEvent, ToggleWireframeEvent};

/// Keyboard shortcuts for viewer commands (native builds only):
/// `L` next sample model, `F` wireframe, `C` cross-section, `R` re-centre,
/// `Escape` quit.
#[cfg(not(target_arch = "wasm32"))]
pub fn handle_viewer_keyboard_shortcuts(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut catalog: ResMut<SampleCatalogLoader>,
    mut load_events: EventWriter<LoadModelEvent>,
    mut wireframe_events: EventWriter<ToggleWireframeEvent>,
    mut section_events: EventWriter<ToggleSectionEvent>,
    mut center_events: EventWriter<CenterModelEvent>,
    mut exit_events: EventWriter<AppExit>,
) {
    if keyboard.just_pressed(KeyCode::KeyL) {
        match catalog.advance() {
            Some(sample) => {
                info!("Loading sample model: {}", sample.name);
                load_events.write(LoadModelEvent {
                    url: sample.url,
                    source: RequestSource::Keyboard,
                });
            }
            None => warn!("Sample model catalog not loaded yet"),
        }
    }

    if keyboard.just_pressed(KeyCode::KeyF) {
        wireframe_events.write(ToggleWireframeEvent {
            source: RequestSource::Keyboard,
        });
    }

    if keyboard.just_pressed(KeyCode::KeyC) {
        section_events.write(ToggleSectionEvent {
            source: RequestSource::Keyboard,
        });
    }

    if keyboard.just_pressed(KeyCode::KeyR) {
        center_events.write(CenterModelEvent);
    }

    if keyboard.just_pressed(KeyCode::Escape) {
        info!("Escape pressed, shutting the viewer down");
        exit_events.write(AppExit::Success);
    }
}

/// Placeholder for WASM builds where the host page drives the viewer over
/// RPC instead of the keyboard.
#[cfg(target_arch = "wasm32")]
pub fn handle_viewer_keyboard_shortcuts() {}

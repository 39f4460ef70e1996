use bevy::asset::AssetMetaCheck;
use bevy::diagnostic::FrameTimeDiagnosticsPlugin;
use bevy::pbr::DirectionalLightShadowMap;
use bevy::pbr::wireframe::{WireframeConfig, WireframePlugin};
use bevy::prelude::*;
use bevy_common_assets::json::JsonAssetPlugin;
// Crate engine modules
use crate::engine::assets::sample_catalog::{
    SampleCatalog, SampleCatalogLoader, poll_sample_catalog, start_catalog_loading,
};
use crate::engine::camera::orbit_camera::{OrbitCamera, apply_framing, camera_controller};
use crate::engine::core::window_config::create_window_config;
use crate::engine::model::loading::{
    finalise_spawned_model, handle_load_requests, poll_pending_load,
};
use crate::engine::model::slot::{CenterModelEvent, LoadModelEvent, ModelAttachedEvent, ModelSlot};
use crate::engine::render::section_material::SectionMaterial;
use crate::engine::scene::axes::create_coordinate_axes;
use crate::engine::scene::grid::create_ground_grid;
use crate::engine::systems::display_modes::{
    DisplayModes, ToggleSectionEvent, ToggleWireframeEvent, handle_section_toggles,
    handle_wireframe_toggles, reapply_display_modes_on_attach,
};
use crate::engine::systems::frame_stats::{
    FrameStats, StatsText, stats_notification_system, update_frame_stats,
};
use crate::engine::systems::keyboard_shortcuts::handle_viewer_keyboard_shortcuts;
use crate::rpc::web_rpc::WebRpcPlugin;
// Render settings
use crate::constants::render_settings::{
    AMBIENT_BRIGHTNESS, CAMERA_FAR, CAMERA_FOV_DEGREES, CAMERA_HOME_POSITION, CAMERA_NEAR,
    CLEAR_COLOUR, DIRECTIONAL_ILLUMINANCE, DIRECTIONAL_LIGHT_POSITION, SHADOW_MAP_SIZE,
};

#[cfg(not(target_arch = "wasm32"))]
use crate::engine::model::slot::RequestSource;
#[cfg(not(target_arch = "wasm32"))]
use crate::engine::systems::frame_stats::stats_text_update_system;

pub fn create_app() -> App {
    let mut app = App::new();

    app.add_plugins(create_default_plugins())
        .add_plugins(FrameTimeDiagnosticsPlugin::default())
        // Registers SampleCatalog as a loadable asset type from JSON files.
        .add_plugins(JsonAssetPlugin::<SampleCatalog>::new(&["json"]))
        // Registers the clipping material so section-enabled meshes render.
        .add_plugins(MaterialPlugin::<SectionMaterial>::default())
        .add_plugins(WebRpcPlugin)
        .add_plugins(WireframePlugin::default())
        .insert_resource(WireframeConfig {
            global: false,
            default_color: Color::WHITE,
        });

    // Initialise resources early
    app.insert_resource(ClearColor(CLEAR_COLOUR))
        .insert_resource(AmbientLight {
            brightness: AMBIENT_BRIGHTNESS,
            ..default()
        })
        .insert_resource(DirectionalLightShadowMap {
            size: SHADOW_MAP_SIZE,
        })
        .init_resource::<ModelSlot>()
        .init_resource::<DisplayModes>()
        .init_resource::<FrameStats>()
        .init_resource::<SampleCatalogLoader>()
        .init_resource::<OrbitCamera>()
        .add_event::<LoadModelEvent>()
        .add_event::<CenterModelEvent>()
        .add_event::<ModelAttachedEvent>()
        .add_event::<ToggleWireframeEvent>()
        .add_event::<ToggleSectionEvent>();

    app.add_systems(Startup, (setup, start_catalog_loading).chain())
        .add_systems(
            Update,
            (
                // Model pipeline systems, ordered request to attachment
                poll_sample_catalog,
                handle_load_requests,
                poll_pending_load,
                finalise_spawned_model,
                reapply_display_modes_on_attach,
                handle_wireframe_toggles,
                handle_section_toggles,
                apply_framing,
            )
                .chain(),
        );

    // Base runtime systems that run on all platforms.
    let runtime_systems = (
        camera_controller,
        update_frame_stats,
        stats_notification_system,
        handle_viewer_keyboard_shortcuts, // Native shortcuts or no-op for WASM
    );

    app.add_systems(Update, runtime_systems);

    // Add stats_text_update_system only for native builds.
    #[cfg(not(target_arch = "wasm32"))]
    {
        app.add_systems(Startup, load_initial_model)
            .add_systems(Update, stats_text_update_system);
    }

    app
}

fn spawn_lighting(commands: &mut Commands) {
    commands.spawn((
        DirectionalLight {
            illuminance: DIRECTIONAL_ILLUMINANCE,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_translation(DIRECTIONAL_LIGHT_POSITION).looking_at(Vec3::ZERO, Vec3::Y),
    ));
}

fn spawn_viewer_camera(commands: &mut Commands) {
    commands.spawn((
        Camera3d::default(),
        Projection::from(PerspectiveProjection {
            fov: CAMERA_FOV_DEGREES.to_radians(),
            near: CAMERA_NEAR,
            far: CAMERA_FAR,
            ..default()
        }),
        Transform::from_translation(CAMERA_HOME_POSITION).looking_at(Vec3::ZERO, Vec3::Y),
    ));
}

// Startup system that handles static scene initialisation
fn setup(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    spawn_lighting(&mut commands);
    spawn_viewer_camera(&mut commands);
    create_ground_grid(&mut commands, &mut meshes, &mut materials);
    create_coordinate_axes(&mut commands, &mut meshes, &mut materials);

    #[cfg(not(target_arch = "wasm32"))]
    {
        create_native_overlays(&mut commands);
    }
}

/// Queue a model load for a path given on the command line, if any.
#[cfg(not(target_arch = "wasm32"))]
fn load_initial_model(mut load_events: EventWriter<LoadModelEvent>) {
    if let Some(url) = std::env::args().nth(1) {
        info!("Loading model from command line: {}", url);
        load_events.write(LoadModelEvent {
            url,
            source: RequestSource::Startup,
        });
    }
}

fn create_native_overlays(commands: &mut Commands) {
    commands
        .spawn(Node {
            width: Val::Percent(100.0),
            height: Val::Percent(100.0),
            ..default()
        })
        .with_children(|parent| {
            parent.spawn((
                Text::new("FPS: "),
                TextFont {
                    font_size: 16.0,
                    ..default()
                },
                TextColor(Color::srgb(1., 0., 0.)),
                Node {
                    position_type: PositionType::Absolute,
                    bottom: Val::Px(12.0),
                    right: Val::Px(12.0),
                    ..default()
                },
                StatsText,
            ));
        });
}

fn create_default_plugins() -> impl PluginGroup {
    let window_config = WindowPlugin {
        primary_window: Some(create_window_config()),
        ..default()
    };

    let asset_config = AssetPlugin {
        meta_check: AssetMetaCheck::Never,
        ..default()
    };

    DefaultPlugins.set(window_config).set(asset_config)
}

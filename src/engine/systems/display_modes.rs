use bevy::pbr::wireframe::Wireframe;
use bevy::prelude::*;

use crate::engine::model::slot::{ModelAttachedEvent, ModelSlot, RequestSource};
use crate::engine::render::section_material::{
    SectionClipExtension, SectionMaterial, SectionPlane,
};
use crate::rpc::web_rpc::WebRpcInterface;

/// Viewer-level display flags. They survive model replacement: when a new
/// model attaches while a flag is set, the flag is applied to the fresh
/// subtree. The section plane exists exactly while section mode is on.
#[derive(Resource, Default)]
pub struct DisplayModes {
    pub wireframe: bool,
    pub section: Option<SectionPlane>,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct ToggleWireframeEvent {
    pub source: RequestSource,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct ToggleSectionEvent {
    pub source: RequestSource,
}

/// The standard material an entity carried before section mode replaced it,
/// parked for restoration when the mode is switched off.
#[derive(Component)]
pub struct PreSectionMaterial(pub Handle<StandardMaterial>);

pub fn handle_wireframe_toggles(
    mut events: EventReader<ToggleWireframeEvent>,
    slot: Res<ModelSlot>,
    mut modes: ResMut<DisplayModes>,
    children_query: Query<&Children>,
    mesh_query: Query<(), With<Mesh3d>>,
    mut commands: Commands,
    mut rpc: ResMut<WebRpcInterface>,
) {
    for event in events.read() {
        let Some(attached) = slot.attached.as_ref() else {
            info!("Wireframe toggle ignored: no model attached");
            continue;
        };

        modes.wireframe = !modes.wireframe;
        apply_wireframe(
            attached.root,
            modes.wireframe,
            &children_query,
            &mesh_query,
            &mut commands,
        );
        info!(
            "Wireframe {} via {:?}",
            if modes.wireframe { "on" } else { "off" },
            event.source
        );
        rpc.send_notification(
            "display_mode_changed",
            serde_json::json!({
                "mode": "wireframe",
                "enabled": modes.wireframe,
            }),
        );
    }
}

pub fn handle_section_toggles(
    mut events: EventReader<ToggleSectionEvent>,
    slot: Res<ModelSlot>,
    mut modes: ResMut<DisplayModes>,
    children_query: Query<&Children>,
    standard_handles: Query<&MeshMaterial3d<StandardMaterial>>,
    parked_handles: Query<&PreSectionMaterial>,
    mut standard_materials: ResMut<Assets<StandardMaterial>>,
    mut section_materials: ResMut<Assets<SectionMaterial>>,
    mut commands: Commands,
    mut rpc: ResMut<WebRpcInterface>,
) {
    for event in events.read() {
        let Some(attached) = slot.attached.as_ref() else {
            info!("Section toggle ignored: no model attached");
            continue;
        };

        match modes.section.take() {
            None => {
                let plane = SectionPlane::default();
                apply_section_clip(
                    attached.root,
                    &plane,
                    &children_query,
                    &standard_handles,
                    standard_materials.as_mut(),
                    section_materials.as_mut(),
                    &mut commands,
                );
                modes.section = Some(plane);
            }
            Some(_) => {
                remove_section_clip(
                    attached.root,
                    &children_query,
                    &parked_handles,
                    &mut commands,
                );
            }
        }

        let enabled = modes.section.is_some();
        info!(
            "Cross-section {} via {:?}",
            if enabled { "on" } else { "off" },
            event.source
        );
        rpc.send_notification(
            "display_mode_changed",
            serde_json::json!({
                "mode": "section",
                "enabled": enabled,
            }),
        );
    }
}

/// When a model attaches while flags are set, bring its subtree in line so
/// flag state and subtree state never diverge across replacement.
pub fn reapply_display_modes_on_attach(
    mut events: EventReader<ModelAttachedEvent>,
    modes: Res<DisplayModes>,
    children_query: Query<&Children>,
    mesh_query: Query<(), With<Mesh3d>>,
    standard_handles: Query<&MeshMaterial3d<StandardMaterial>>,
    mut standard_materials: ResMut<Assets<StandardMaterial>>,
    mut section_materials: ResMut<Assets<SectionMaterial>>,
    mut commands: Commands,
) {
    for event in events.read() {
        if modes.wireframe {
            apply_wireframe(event.root, true, &children_query, &mesh_query, &mut commands);
            info!("Wireframe re-applied to replacement model");
        }
        if let Some(plane) = modes.section.as_ref() {
            apply_section_clip(
                event.root,
                plane,
                &children_query,
                &standard_handles,
                standard_materials.as_mut(),
                section_materials.as_mut(),
                &mut commands,
            );
            info!("Cross-section re-applied to replacement model");
        }
    }
}

/// Mesh entities of a model subtree, root included. Scene fixtures (grid,
/// axes, lights) live outside the subtree and are never visited.
fn collect_mesh_entities(
    root: Entity,
    children_query: &Query<&Children>,
    is_mesh: impl Fn(Entity) -> bool,
) -> Vec<Entity> {
    let mut targets = Vec::new();
    if is_mesh(root) {
        targets.push(root);
    }
    for entity in children_query.iter_descendants(root) {
        if is_mesh(entity) {
            targets.push(entity);
        }
    }
    targets
}

fn apply_wireframe(
    root: Entity,
    enable: bool,
    children_query: &Query<&Children>,
    mesh_query: &Query<(), With<Mesh3d>>,
    commands: &mut Commands,
) {
    let targets = collect_mesh_entities(root, children_query, |entity| mesh_query.contains(entity));
    for entity in targets {
        if enable {
            commands.entity(entity).insert(Wireframe);
        } else {
            commands.entity(entity).remove::<Wireframe>();
        }
    }
}

fn apply_section_clip(
    root: Entity,
    plane: &SectionPlane,
    children_query: &Query<&Children>,
    standard_handles: &Query<&MeshMaterial3d<StandardMaterial>>,
    standard_materials: &mut Assets<StandardMaterial>,
    section_materials: &mut Assets<SectionMaterial>,
    commands: &mut Commands,
) {
    let targets = collect_mesh_entities(root, children_query, |entity| {
        standard_handles.contains(entity)
    });
    for entity in targets {
        let Ok(handle) = standard_handles.get(entity) else {
            continue;
        };
        let base = standard_materials
            .get(&handle.0)
            .cloned()
            .unwrap_or_default();
        let clipped = section_materials.add(SectionMaterial {
            base,
            extension: SectionClipExtension::from_plane(plane),
        });
        commands
            .entity(entity)
            .insert(PreSectionMaterial(handle.0.clone()))
            .remove::<MeshMaterial3d<StandardMaterial>>()
            .insert(MeshMaterial3d(clipped));
    }
}

fn remove_section_clip(
    root: Entity,
    children_query: &Query<&Children>,
    parked_handles: &Query<&PreSectionMaterial>,
    commands: &mut Commands,
) {
    let targets = collect_mesh_entities(root, children_query, |entity| {
        parked_handles.contains(entity)
    });
    for entity in targets {
        let Ok(parked) = parked_handles.get(entity) else {
            continue;
        };
        commands
            .entity(entity)
            .remove::<MeshMaterial3d<SectionMaterial>>()
            .remove::<PreSectionMaterial>()
            .insert(MeshMaterial3d(parked.0.clone()));
    }
}

use bevy::asset::{LoadState, RecursiveDependencyLoadState};
use bevy::gltf::Gltf;
use bevy::prelude::*;

use crate::engine::model::bounds::{BoundsNodeQuery, ModelBounds, compute_subtree_bounds};
use crate::engine::model::format::ModelFormat;
use crate::engine::model::slot::{
    AttachedModel, LoadModelEvent, LoadStage, ModelAttachedEvent, ModelSlot,
};
use crate::rpc::web_rpc::WebRpcInterface;

/// Marker on the root entity of a spawned model subtree, carrying the
/// generation of the request that spawned it.
#[derive(Component, Debug, Clone, Copy)]
pub struct ModelRoot {
    pub generation: u64,
}

/// Classify incoming load requests and hand the accepted ones to the asset
/// server. The previous model and any in-flight load are dropped before the
/// new request is issued, so at most one load is ever pending.
pub fn handle_load_requests(
    mut events: EventReader<LoadModelEvent>,
    mut slot: ResMut<ModelSlot>,
    asset_server: Res<AssetServer>,
    mut commands: Commands,
    mut rpc: ResMut<WebRpcInterface>,
) {
    for event in events.read() {
        let format = match ModelFormat::classify(&event.url) {
            Ok(format) => format,
            Err(error) if error.is_notice() => {
                warn!("{}", error);
                rpc.send_notification(
                    "viewer_notice",
                    serde_json::json!({ "message": error.to_string() }),
                );
                continue;
            }
            Err(error) => {
                error!("{}", error);
                rpc.send_notification(
                    "load_error",
                    serde_json::json!({
                        "url": event.url,
                        "reason": error.to_string(),
                    }),
                );
                continue;
            }
        };

        if let Some(stale) = slot.clear_pending() {
            commands.entity(stale).despawn();
        }
        if let Some(previous) = slot.detach() {
            commands.entity(previous.root).despawn();
        }

        let handle: Handle<Gltf> = asset_server.load(event.url.clone());
        let generation = slot.begin_load(event.url.clone(), format, handle);
        info!(
            "Loading model request {} ({:?}, {:?}): {}",
            generation, format, event.source, event.url
        );
        rpc.send_notification(
            "load_progress",
            serde_json::json!({ "url": event.url, "progress": 0.0 }),
        );
    }
}

/// Poll the pending load each frame: report failures, advance the staged
/// progress, and spawn the scene once every dependency is resident.
pub fn poll_pending_load(
    mut slot: ResMut<ModelSlot>,
    asset_server: Res<AssetServer>,
    gltf_assets: Res<Assets<Gltf>>,
    mut commands: Commands,
    mut rpc: ResMut<WebRpcInterface>,
) {
    let Some(pending) = slot.pending.as_ref() else {
        return;
    };

    let base_state = asset_server.get_load_state(&pending.gltf);
    let deps_state = asset_server.get_recursive_dependency_load_state(&pending.gltf);

    let failure = match (&base_state, &deps_state) {
        (Some(LoadState::Failed(error)), _) => Some(error.to_string()),
        (_, Some(RecursiveDependencyLoadState::Failed(error))) => Some(error.to_string()),
        _ => None,
    };
    if let Some(reason) = failure {
        let url = pending.url.clone();
        report_load_failure(&mut slot, &mut commands, &mut rpc, &url, &reason);
        return;
    }

    let mut empty_document: Option<String> = None;
    if let Some(pending) = slot.pending.as_mut() {
        match pending.stage {
            LoadStage::Requested => {
                if matches!(base_state, Some(LoadState::Loaded)) {
                    pending.stage = LoadStage::DocumentParsed;
                    info!("Model document parsed: {}", pending.url);
                    rpc.send_notification(
                        "load_progress",
                        serde_json::json!({
                            "url": pending.url,
                            "progress": pending.stage.progress(),
                        }),
                    );
                }
            }
            LoadStage::DocumentParsed => {
                if matches!(deps_state, Some(RecursiveDependencyLoadState::Loaded)) {
                    let Some(gltf) = gltf_assets.get(&pending.gltf) else {
                        return;
                    };
                    let scene = gltf
                        .default_scene
                        .clone()
                        .or_else(|| gltf.scenes.first().cloned());
                    match scene {
                        Some(scene) => {
                            let root = commands
                                .spawn((
                                    SceneRoot(scene),
                                    Transform::default(),
                                    Visibility::default(),
                                    ModelRoot {
                                        generation: pending.generation,
                                    },
                                ))
                                .id();
                            pending.stage = LoadStage::DependenciesReady;
                            pending.spawned_root = Some(root);
                            rpc.send_notification(
                                "load_progress",
                                serde_json::json!({
                                    "url": pending.url,
                                    "progress": pending.stage.progress(),
                                }),
                            );
                        }
                        None => empty_document = Some(pending.url.clone()),
                    }
                }
            }
            // Spawned; waiting for the scene instance to appear.
            LoadStage::DependenciesReady => {}
        }
    }

    if let Some(url) = empty_document {
        report_load_failure(
            &mut slot,
            &mut commands,
            &mut rpc,
            &url,
            "document contains no scenes",
        );
    }
}

/// Attach the spawned subtree once its hierarchy exists: sweep roots from
/// superseded requests, measure bounds, record the attachment and announce
/// it. A completion whose generation is no longer current is despawned
/// instead of attached.
pub fn finalise_spawned_model(
    mut slot: ResMut<ModelSlot>,
    roots: Query<(Entity, &ModelRoot)>,
    children: Query<&Children>,
    nodes: BoundsNodeQuery,
    meshes: Res<Assets<Mesh>>,
    mut commands: Commands,
    mut rpc: ResMut<WebRpcInterface>,
    mut attached_events: EventWriter<ModelAttachedEvent>,
) {
    for (entity, root) in roots.iter() {
        if !slot.is_current(root.generation) {
            info!("Despawning stale model root (request {})", root.generation);
            commands.entity(entity).despawn();
        }
    }

    let ready = match slot.pending.as_ref() {
        Some(pending) => match pending.spawned_root {
            Some(root) => children.get(root).is_ok(),
            None => false,
        },
        None => false,
    };
    if !ready {
        return;
    }

    let Some(pending) = slot.pending.take() else {
        return;
    };
    let Some(root) = pending.spawned_root else {
        return;
    };
    if !slot.is_current(pending.generation) {
        commands.entity(root).despawn();
        return;
    }

    let bounds = compute_subtree_bounds(root, &nodes, &meshes)
        .unwrap_or_else(|| ModelBounds::at_point(Vec3::ZERO));

    // A replaced attachment is by definition stale and was despawned by the
    // sweep above; the slot can be overwritten outright.
    slot.attached = Some(AttachedModel {
        generation: pending.generation,
        url: pending.url.clone(),
        root,
        bounds,
        gltf: pending.gltf.clone(),
    });

    info!(
        "✓ Model attached: {} (max dimension {:.3})",
        pending.url,
        bounds.max_dimension()
    );
    rpc.send_notification(
        "model_loaded",
        serde_json::json!({
            "url": pending.url,
            "progress": 1.0,
            "bounds": bounds_json(&bounds),
        }),
    );
    attached_events.write(ModelAttachedEvent {
        root,
        url: pending.url,
    });
}

fn report_load_failure(
    slot: &mut ModelSlot,
    commands: &mut Commands,
    rpc: &mut WebRpcInterface,
    url: &str,
    reason: &str,
) {
    let error = crate::error::ViewerError::LoadFailed {
        url: url.to_owned(),
        reason: reason.to_owned(),
    };
    error!("{}", error);
    rpc.send_notification(
        "load_error",
        serde_json::json!({ "url": url, "reason": reason }),
    );
    if let Some(root) = slot.clear_pending() {
        commands.entity(root).despawn();
    }
}

fn bounds_json(bounds: &ModelBounds) -> serde_json::Value {
    serde_json::json!({
        "min": [bounds.min.x, bounds.min.y, bounds.min.z],
        "max": [bounds.max.x, bounds.max.y, bounds.max.z],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::ecs::system::RunSystemOnce;

    use crate::engine::model::format::ModelFormat;
    use crate::engine::model::slot::{AttachedModel, PendingLoad, RequestSource};

    fn test_world() -> World {
        let mut world = World::new();
        world.init_resource::<ModelSlot>();
        world.init_resource::<WebRpcInterface>();
        world.init_resource::<Events<ModelAttachedEvent>>();
        world.insert_resource(Assets::<Mesh>::default());
        world
    }

    /// Request handling needs a live asset server, which in turn needs the
    /// task pool and asset plugins.
    fn request_app() -> App {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, AssetPlugin::default()));
        app.init_asset::<Gltf>();
        app.init_resource::<ModelSlot>();
        app.init_resource::<WebRpcInterface>();
        app.add_event::<LoadModelEvent>();
        app
    }

    fn request_load(app: &mut App, url: &str) {
        app.world_mut().send_event(LoadModelEvent {
            url: url.to_owned(),
            source: RequestSource::Rpc,
        });
        app.world_mut()
            .run_system_once(handle_load_requests)
            .unwrap();
    }

    fn notification_count(app: &App, method: &str) -> usize {
        app.world()
            .resource::<WebRpcInterface>()
            .queued_notifications()
            .iter()
            .filter(|notification| notification.method == method)
            .count()
    }

    #[test]
    fn an_accepted_request_issues_a_pending_load() {
        let mut app = request_app();
        request_load(&mut app, "models/duck.glb");

        let slot = app.world().resource::<ModelSlot>();
        let pending = slot.pending.as_ref().expect("load pending");
        assert_eq!(pending.url, "models/duck.glb");
        assert_eq!(pending.format, ModelFormat::Glb);
        assert_eq!(pending.stage, LoadStage::Requested);
        assert_eq!(notification_count(&app, "load_progress"), 1);
    }

    #[test]
    fn ifc_requests_emit_one_notice_and_never_start_a_load() {
        let mut app = request_app();
        request_load(&mut app, "plant.ifc");

        let slot = app.world().resource::<ModelSlot>();
        assert!(slot.pending.is_none());
        assert!(slot.attached.is_none());
        assert_eq!(notification_count(&app, "viewer_notice"), 1);
        assert_eq!(notification_count(&app, "load_error"), 0);
    }

    #[test]
    fn unknown_extensions_are_rejected_without_touching_the_attached_model() {
        let mut app = request_app();
        let root = app.world_mut().spawn(Transform::default()).id();
        app.world_mut()
            .resource_mut::<ModelSlot>()
            .attach(AttachedModel {
                generation: 1,
                url: "duck.glb".to_owned(),
                root,
                bounds: ModelBounds::at_point(Vec3::ZERO),
                gltf: Handle::default(),
            });

        request_load(&mut app, "mesh.obj");

        let slot = app.world().resource::<ModelSlot>();
        assert!(slot.pending.is_none());
        assert_eq!(slot.attached.as_ref().unwrap().url, "duck.glb");
        assert!(app.world().get_entity(root).is_ok());
        assert_eq!(notification_count(&app, "load_error"), 1);
    }

    fn cube_mesh(assets: &mut Assets<Mesh>) -> Handle<Mesh> {
        assets.add(Mesh::from(Cuboid::new(1.0, 1.0, 1.0)))
    }

    fn spawn_model_subtree(world: &mut World, generation: u64) -> Entity {
        let mesh = {
            let mut meshes = world.resource_mut::<Assets<Mesh>>();
            cube_mesh(&mut meshes)
        };
        let root = world
            .spawn((Transform::default(), ModelRoot { generation }))
            .id();
        let child = world
            .spawn((
                Transform::from_translation(Vec3::new(4.0, 0.0, 0.0)),
                Mesh3d(mesh),
            ))
            .id();
        world.entity_mut(root).add_child(child);
        root
    }

    #[test]
    fn finalise_attaches_the_current_generation_and_measures_bounds() {
        let mut world = test_world();
        let root = spawn_model_subtree(&mut world, 1);
        {
            let mut slot = world.resource_mut::<ModelSlot>();
            let generation =
                slot.begin_load("duck.glb".to_owned(), ModelFormat::Glb, Handle::default());
            assert_eq!(generation, 1);
            let pending = slot.pending.as_mut().unwrap();
            pending.stage = LoadStage::DependenciesReady;
            pending.spawned_root = Some(root);
        }

        world.run_system_once(finalise_spawned_model).unwrap();

        let slot = world.resource::<ModelSlot>();
        let attached = slot.attached.as_ref().expect("model attached");
        assert_eq!(attached.root, root);
        assert_eq!(attached.url, "duck.glb");
        assert_eq!(attached.bounds.min, Vec3::new(3.5, -0.5, -0.5));
        assert_eq!(attached.bounds.max, Vec3::new(4.5, 0.5, 0.5));
        assert!(slot.pending.is_none());

        let rpc = world.resource::<WebRpcInterface>();
        let methods: Vec<&str> = rpc
            .queued_notifications()
            .iter()
            .map(|notification| notification.method.as_str())
            .collect();
        assert!(methods.contains(&"model_loaded"));
    }

    #[test]
    fn finalise_despawns_roots_from_superseded_requests() {
        let mut world = test_world();
        let stale = spawn_model_subtree(&mut world, 1);
        let current = spawn_model_subtree(&mut world, 2);
        {
            let mut slot = world.resource_mut::<ModelSlot>();
            slot.begin_load("a.glb".to_owned(), ModelFormat::Glb, Handle::default());
            slot.begin_load("b.glb".to_owned(), ModelFormat::Glb, Handle::default());
            let pending = slot.pending.as_mut().unwrap();
            pending.stage = LoadStage::DependenciesReady;
            pending.spawned_root = Some(current);
        }

        world.run_system_once(finalise_spawned_model).unwrap();

        assert!(world.get_entity(stale).is_err());
        let slot = world.resource::<ModelSlot>();
        assert_eq!(slot.attached.as_ref().unwrap().root, current);
    }

    #[test]
    fn finalise_never_attaches_a_stale_completion() {
        let mut world = test_world();
        let root = spawn_model_subtree(&mut world, 1);
        {
            let mut slot = world.resource_mut::<ModelSlot>();
            let first = slot.begin_load("a.glb".to_owned(), ModelFormat::Glb, Handle::default());
            slot.begin_load("b.glb".to_owned(), ModelFormat::Glb, Handle::default());
            // Hand-build the race: a completion for the first request arrives
            // after the second request was issued.
            slot.pending = Some(PendingLoad {
                generation: first,
                url: "a.glb".to_owned(),
                format: ModelFormat::Glb,
                gltf: Handle::default(),
                stage: LoadStage::DependenciesReady,
                spawned_root: Some(root),
            });
        }

        world.run_system_once(finalise_spawned_model).unwrap();

        let slot = world.resource::<ModelSlot>();
        assert!(slot.attached.is_none());
        assert!(slot.pending.is_none());
        assert!(world.get_entity(root).is_err());
    }

    #[test]
    fn finalise_waits_until_the_scene_instance_exists() {
        let mut world = test_world();
        // Root spawned but the scene spawner has not attached children yet.
        let root = world
            .spawn((Transform::default(), ModelRoot { generation: 1 }))
            .id();
        {
            let mut slot = world.resource_mut::<ModelSlot>();
            slot.begin_load("a.glb".to_owned(), ModelFormat::Glb, Handle::default());
            let pending = slot.pending.as_mut().unwrap();
            pending.stage = LoadStage::DependenciesReady;
            pending.spawned_root = Some(root);
        }

        world.run_system_once(finalise_spawned_model).unwrap();

        let slot = world.resource::<ModelSlot>();
        assert!(slot.attached.is_none());
        assert!(slot.pending.is_some());
    }

    #[test]
    fn replacement_despawns_the_previous_attachment() {
        let mut world = test_world();
        let first = spawn_model_subtree(&mut world, 1);
        let second = spawn_model_subtree(&mut world, 2);
        {
            let mut slot = world.resource_mut::<ModelSlot>();
            slot.begin_load("a.glb".to_owned(), ModelFormat::Glb, Handle::default());
            slot.attach(AttachedModel {
                generation: 1,
                url: "a.glb".to_owned(),
                root: first,
                bounds: ModelBounds::at_point(Vec3::ZERO),
                gltf: Handle::default(),
            });
            slot.begin_load("b.glb".to_owned(), ModelFormat::Glb, Handle::default());
            let pending = slot.pending.as_mut().unwrap();
            pending.stage = LoadStage::DependenciesReady;
            pending.spawned_root = Some(second);
        }

        world.run_system_once(finalise_spawned_model).unwrap();

        let slot = world.resource::<ModelSlot>();
        assert_eq!(slot.attached.as_ref().unwrap().root, second);
        assert!(world.get_entity(first).is_err());
    }
}

use bevy::diagnostic::{DiagnosticsStore, FrameTimeDiagnosticsPlugin};
use bevy::prelude::*;
use bevy::render::mesh::PrimitiveTopology;

use crate::constants::render_settings::STATS_NOTIFY_INTERVAL;
use crate::engine::model::slot::ModelSlot;
use crate::rpc::web_rpc::WebRpcInterface;

/// Per-frame rendering statistics for the attached model: one draw call per
/// mesh entity, triangles summed from mesh topology. Both zero while no
/// model is attached.
#[derive(Resource, Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameStats {
    pub triangles: u64,
    pub draw_calls: u32,
}

/// Marker for the overlay text element.
#[derive(Component)]
pub struct StatsText;

/// Triangles a mesh contributes to the frame, from its topology and index
/// or vertex count.
pub fn mesh_triangle_count(mesh: &Mesh) -> u64 {
    let vertex_count = mesh
        .attribute(Mesh::ATTRIBUTE_POSITION)
        .map(|values| values.len() as u64)
        .unwrap_or(0);
    let element_count = mesh
        .indices()
        .map(|indices| indices.len() as u64)
        .unwrap_or(vertex_count);

    match mesh.primitive_topology() {
        PrimitiveTopology::TriangleList => element_count / 3,
        PrimitiveTopology::TriangleStrip => element_count.saturating_sub(2),
        _ => 0,
    }
}

/// Recompute stats from the attached model's mesh descendants each frame.
pub fn update_frame_stats(
    mut stats: ResMut<FrameStats>,
    slot: Res<ModelSlot>,
    children_query: Query<&Children>,
    mesh_handles: Query<&Mesh3d>,
    meshes: Res<Assets<Mesh>>,
) {
    let Some(attached) = slot.attached.as_ref() else {
        *stats = FrameStats::default();
        return;
    };

    let mut fresh = FrameStats::default();
    let subtree = std::iter::once(attached.root)
        .chain(children_query.iter_descendants(attached.root));
    for entity in subtree {
        let Ok(handle) = mesh_handles.get(entity) else {
            continue;
        };
        let Some(mesh) = meshes.get(&handle.0) else {
            continue;
        };
        fresh.draw_calls += 1;
        fresh.triangles += mesh_triangle_count(mesh);
    }

    *stats = fresh;
}

/// Push stats to the host page on a fixed cadence rather than every frame.
pub fn stats_notification_system(
    mut rpc_interface: ResMut<WebRpcInterface>,
    diagnostics: Res<DiagnosticsStore>,
    stats: Res<FrameStats>,
    slot: Res<ModelSlot>,
    mut last_send_time: Local<f32>,
    time: Res<Time>,
) {
    let current_time = time.elapsed_secs();
    if current_time - *last_send_time < STATS_NOTIFY_INTERVAL {
        return;
    }
    if slot.attached.is_none() {
        return;
    }

    let fps = diagnostics
        .get(&FrameTimeDiagnosticsPlugin::FPS)
        .and_then(|fps| fps.smoothed())
        .unwrap_or(0.0) as f32;

    rpc_interface.send_notification(
        "frame_stats",
        serde_json::json!({
            "fps": fps,
            "triangles": stats.triangles,
            "draw_calls": stats.draw_calls,
        }),
    );
    *last_send_time = current_time;
}

/// Native overlay line: FPS plus model statistics when one is attached.
pub fn stats_text_update_system(
    diagnostics: Res<DiagnosticsStore>,
    stats: Res<FrameStats>,
    slot: Res<ModelSlot>,
    mut query: Query<&mut Text, With<StatsText>>,
) {
    for mut text in &mut query {
        let Some(fps) = diagnostics
            .get(&FrameTimeDiagnosticsPlugin::FPS)
            .and_then(|fps| fps.smoothed())
        else {
            continue;
        };

        text.0 = if slot.attached.is_some() {
            format!(
                "FPS: {fps:.1} | Triangles: {} | Draw calls: {}",
                stats.triangles, stats.draw_calls
            )
        } else {
            format!("FPS: {fps:.1}")
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::asset::RenderAssetUsages;
    use bevy::ecs::system::RunSystemOnce;
    use bevy::render::mesh::Indices;

    use crate::engine::model::bounds::ModelBounds;
    use crate::engine::model::slot::AttachedModel;

    fn triangle_list_mesh(triangles: u32) -> Mesh {
        let mut mesh = Mesh::new(
            PrimitiveTopology::TriangleList,
            RenderAssetUsages::default(),
        );
        let positions: Vec<[f32; 3]> = (0..triangles * 3)
            .map(|i| [i as f32, 0.0, 0.0])
            .collect();
        mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
        mesh
    }

    #[test]
    fn triangle_counts_follow_topology() {
        let unindexed = triangle_list_mesh(4);
        assert_eq!(mesh_triangle_count(&unindexed), 4);

        let mut indexed = triangle_list_mesh(1);
        indexed.insert_indices(Indices::U32(vec![0, 1, 2, 0, 2, 1]));
        assert_eq!(mesh_triangle_count(&indexed), 2);

        let mut strip = Mesh::new(
            PrimitiveTopology::TriangleStrip,
            RenderAssetUsages::default(),
        );
        strip.insert_attribute(
            Mesh::ATTRIBUTE_POSITION,
            vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 1.0, 0.0]],
        );
        assert_eq!(mesh_triangle_count(&strip), 2);

        let mut lines = Mesh::new(PrimitiveTopology::LineList, RenderAssetUsages::default());
        lines.insert_attribute(
            Mesh::ATTRIBUTE_POSITION,
            vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]],
        );
        assert_eq!(mesh_triangle_count(&lines), 0);
    }

    #[test]
    fn stats_sum_the_attached_subtree_and_reset_on_detach() {
        let mut world = World::new();
        world.init_resource::<ModelSlot>();
        world.init_resource::<FrameStats>();
        let (small, large) = {
            let mut meshes = Assets::<Mesh>::default();
            let pair = (
                meshes.add(triangle_list_mesh(2)),
                meshes.add(triangle_list_mesh(5)),
            );
            world.insert_resource(meshes);
            pair
        };

        let root = world.spawn(Transform::default()).id();
        let first = world.spawn((Transform::default(), Mesh3d(small))).id();
        let second = world.spawn((Transform::default(), Mesh3d(large))).id();
        world.entity_mut(root).add_child(first);
        world.entity_mut(root).add_child(second);
        // A fixture mesh outside the subtree is not counted.
        let fixture_mesh = world
            .resource_mut::<Assets<Mesh>>()
            .add(triangle_list_mesh(100));
        world.spawn((Transform::default(), Mesh3d(fixture_mesh)));

        world.resource_mut::<ModelSlot>().attach(AttachedModel {
            generation: 1,
            url: "duck.glb".to_owned(),
            root,
            bounds: ModelBounds::at_point(Vec3::ZERO),
            gltf: Handle::default(),
        });

        world.run_system_once(update_frame_stats).unwrap();
        assert_eq!(
            *world.resource::<FrameStats>(),
            FrameStats {
                triangles: 7,
                draw_calls: 2,
            }
        );

        world.resource_mut::<ModelSlot>().detach();
        world.run_system_once(update_frame_stats).unwrap();
        assert_eq!(*world.resource::<FrameStats>(), FrameStats::default());
    }
}

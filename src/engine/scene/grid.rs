/// Flat reference grid: evenly spaced lines on the ground plane with the
/// two centre lines picked out in a lighter shade.
use bevy::asset::RenderAssetUsages;
use bevy::prelude::*;
use bevy::render::mesh::PrimitiveTopology;
use bevy::render::view::NoFrustumCulling;

use crate::constants::render_settings::{
    GRID_CENTRE_LINE_COLOUR, GRID_EXTENT, GRID_LINE_COLOUR, GRID_LINE_COUNT,
};

#[derive(Component)]
pub struct GroundGrid;

pub fn create_ground_grid(
    commands: &mut Commands,
    meshes: &mut ResMut<Assets<Mesh>>,
    materials: &mut ResMut<Assets<StandardMaterial>>,
) {
    let (regular, centre) = build_grid_line_meshes(GRID_EXTENT, GRID_LINE_COUNT);
    spawn_grid_line_entity(commands, meshes, materials, regular, GRID_LINE_COLOUR);
    spawn_grid_line_entity(commands, meshes, materials, centre, GRID_CENTRE_LINE_COLOUR);
}

/// Line geometry for the grid, split into the regular lines and the two
/// centre lines so each set can take its own colour.
pub fn build_grid_line_meshes(extent: f32, line_count: u32) -> (Mesh, Mesh) {
    let half = extent * 0.5;
    let spacing = extent / line_count as f32;

    let mut regular: Vec<[f32; 3]> = Vec::new();
    let mut centre: Vec<[f32; 3]> = Vec::new();

    for i in 0..=line_count {
        let k = -half + i as f32 * spacing;
        let is_centre = 2 * i == line_count;
        let vertices = if is_centre { &mut centre } else { &mut regular };

        // One line parallel to X and one parallel to Z at this offset.
        vertices.push([-half, 0.0, k]);
        vertices.push([half, 0.0, k]);
        vertices.push([k, 0.0, -half]);
        vertices.push([k, 0.0, half]);
    }

    (line_list_mesh(regular), line_list_mesh(centre))
}

/// Line-list mesh from consecutive vertex pairs.
pub fn line_list_mesh(vertices: Vec<[f32; 3]>) -> Mesh {
    let indices: Vec<u32> = (0..vertices.len() as u32).collect();
    let mut mesh = Mesh::new(PrimitiveTopology::LineList, RenderAssetUsages::RENDER_WORLD);
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, vertices);
    mesh.insert_indices(bevy::render::mesh::Indices::U32(indices));
    mesh
}

fn spawn_grid_line_entity(
    commands: &mut Commands,
    meshes: &mut ResMut<Assets<Mesh>>,
    materials: &mut ResMut<Assets<StandardMaterial>>,
    line_mesh: Mesh,
    colour: [f32; 4],
) {
    let grid_material = materials.add(StandardMaterial {
        base_color: Color::srgba(colour[0], colour[1], colour[2], colour[3]),
        unlit: true,
        ..default()
    });

    commands.spawn((
        Mesh3d(meshes.add(line_mesh)),
        MeshMaterial3d(grid_material),
        Visibility::Visible,
        NoFrustumCulling,
        Transform::IDENTITY,
        GroundGrid,
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::render::mesh::VertexAttributeValues;

    fn positions(mesh: &Mesh) -> Vec<[f32; 3]> {
        match mesh.attribute(Mesh::ATTRIBUTE_POSITION) {
            Some(VertexAttributeValues::Float32x3(values)) => values.clone(),
            _ => panic!("grid mesh missing positions"),
        }
    }

    #[test]
    fn grid_splits_centre_lines_from_regular_lines() {
        let (regular, centre) = build_grid_line_meshes(50.0, 50);

        // 51 offsets, one of which is the centre; 4 vertices per offset.
        assert_eq!(positions(&regular).len(), 200);
        assert_eq!(positions(&centre).len(), 4);

        for vertex in positions(&centre) {
            // Centre lines pass through the origin along each axis.
            assert!(vertex[0] == 0.0 || vertex[2] == 0.0);
        }
    }

    #[test]
    fn grid_lines_span_the_extent_on_the_ground_plane() {
        let (regular, _) = build_grid_line_meshes(50.0, 50);
        let vertices = positions(&regular);

        let max_x = vertices.iter().map(|v| v[0]).fold(f32::MIN, f32::max);
        let min_z = vertices.iter().map(|v| v[2]).fold(f32::MAX, f32::min);
        assert_eq!(max_x, 25.0);
        assert_eq!(min_z, -25.0);
        assert!(vertices.iter().all(|v| v[1] == 0.0));
    }

    #[test]
    fn odd_line_counts_have_no_centre_line() {
        let (_, centre) = build_grid_line_meshes(9.0, 9);
        assert!(positions(&centre).is_empty());
    }
}

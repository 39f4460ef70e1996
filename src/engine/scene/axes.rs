/// Coordinate axes rendered from the origin: X red, Y green, Z blue.
use bevy::prelude::*;
use bevy::render::view::NoFrustumCulling;

use crate::constants::render_settings::AXES_LENGTH;
use crate::engine::scene::grid::line_list_mesh;

#[derive(Component)]
pub struct CoordinateAxes;

pub fn create_coordinate_axes(
    commands: &mut Commands,
    meshes: &mut ResMut<Assets<Mesh>>,
    materials: &mut ResMut<Assets<StandardMaterial>>,
) {
    spawn_axis(commands, meshes, materials, Vec3::X, Color::srgb(1.0, 0.0, 0.0));
    spawn_axis(commands, meshes, materials, Vec3::Y, Color::srgb(0.0, 1.0, 0.0));
    spawn_axis(commands, meshes, materials, Vec3::Z, Color::srgb(0.0, 0.0, 1.0));
}

fn spawn_axis(
    commands: &mut Commands,
    meshes: &mut ResMut<Assets<Mesh>>,
    materials: &mut ResMut<Assets<StandardMaterial>>,
    direction: Vec3,
    colour: Color,
) {
    let tip = direction * AXES_LENGTH;
    let mesh = line_list_mesh(vec![[0.0, 0.0, 0.0], tip.to_array()]);
    let material = materials.add(StandardMaterial {
        base_color: colour,
        unlit: true,
        ..default()
    });

    commands.spawn((
        Mesh3d(meshes.add(mesh)),
        MeshMaterial3d(material),
        Visibility::Visible,
        NoFrustumCulling,
        Transform::IDENTITY,
        CoordinateAxes,
    ));
}

use bevy::input::mouse::MouseScrollUnit;
use bevy::input::mouse::{MouseMotion, MouseWheel};
use bevy::math::EulerRot;
use bevy::prelude::*;

use crate::constants::render_settings::{
    CAMERA_HOME_POSITION, FRAMING_DISTANCE_FACTOR, MIN_FRAMING_DISTANCE, ORBIT_MAX_DISTANCE,
    ORBIT_MIN_DISTANCE, ORBIT_PITCH_LIMIT, ORBIT_PITCH_SENSITIVITY, ORBIT_SMOOTHING,
    ORBIT_YAW_SENSITIVITY,
};
use crate::engine::model::bounds::ModelBounds;
use crate::engine::model::slot::{CenterModelEvent, ModelAttachedEvent, ModelSlot};

/// Orbit state around a focus point. The controller eases the camera
/// transform toward the pose this resource describes every frame, so
/// framing changes glide instead of snapping.
#[derive(Resource, Debug, Clone, Copy)]
pub struct OrbitCamera {
    pub target: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub distance: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::looking_from(CAMERA_HOME_POSITION)
    }
}

impl OrbitCamera {
    /// Orbit pose matching a camera at `position` looking at the origin.
    pub fn looking_from(position: Vec3) -> Self {
        let distance = position.length().max(MIN_FRAMING_DISTANCE);
        let direction = position / distance;
        Self {
            target: Vec3::ZERO,
            yaw: direction.x.atan2(direction.z),
            pitch: -direction.y.clamp(-1.0, 1.0).asin(),
            distance,
        }
    }

    /// Frame a model whose bounds centre has been moved to the origin: the
    /// camera sits on the (1,1,1) diagonal at twice the largest extent,
    /// never closer than the minimum framing distance.
    pub fn frame_bounds(&mut self, bounds: &ModelBounds) {
        *self = Self::looking_from(Vec3::splat(framing_distance(bounds)));
    }

    /// Camera position implied by the current orbit state.
    pub fn eye_position(&self) -> Vec3 {
        let rotation = Quat::from_euler(EulerRot::YXZ, self.yaw, self.pitch, 0.0);
        self.target + rotation * Vec3::new(0.0, 0.0, self.distance)
    }
}

/// Per-axis framing distance: twice the largest bounds extent, clamped so a
/// degenerate (zero-size) box still yields a usable camera position.
pub fn framing_distance(bounds: &ModelBounds) -> f32 {
    (bounds.max_dimension() * FRAMING_DISTANCE_FACTOR).max(MIN_FRAMING_DISTANCE)
}

/// Re-centre the attached model and point the orbit at it. Runs for fresh
/// attachments and for explicit re-centre requests; without an attached
/// model the request is a no-op.
pub fn apply_framing(
    mut attached_events: EventReader<ModelAttachedEvent>,
    mut center_events: EventReader<CenterModelEvent>,
    slot: Res<ModelSlot>,
    mut orbit: ResMut<OrbitCamera>,
    mut transforms: Query<&mut Transform>,
) {
    let requested = attached_events.read().count() > 0 || center_events.read().count() > 0;
    if !requested {
        return;
    }
    let Some(attached) = slot.attached.as_ref() else {
        info!("Re-centre ignored: no model attached");
        return;
    };

    // Shift the root so the bounds centre lands on the world origin. Bounds
    // are measured in the root's frame, so this is stable across repeats.
    if let Ok(mut transform) = transforms.get_mut(attached.root) {
        transform.translation = -attached.bounds.center();
    }
    orbit.frame_bounds(&attached.bounds);
    info!(
        "Framed model at distance {:.2} (max dimension {:.2})",
        orbit.distance,
        attached.bounds.max_dimension()
    );
}

/// Mouse orbit controls: left-drag rotates, wheel zooms. The camera eases
/// toward the orbit pose with damped interpolation each frame.
pub fn camera_controller(
    mut camera_query: Query<&mut Transform, With<Camera3d>>,
    mut orbit: ResMut<OrbitCamera>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    mut mouse_motion: EventReader<MouseMotion>,
    mut scroll_events: EventReader<MouseWheel>,
    time: Res<Time>,
) {
    let Ok(mut camera_transform) = camera_query.single_mut() else {
        return;
    };

    let mouse_delta: Vec2 = mouse_motion.read().map(|motion| motion.delta).sum();
    if mouse_button.pressed(MouseButton::Left) && mouse_delta != Vec2::ZERO {
        orbit.yaw -= mouse_delta.x * ORBIT_YAW_SENSITIVITY;
        orbit.pitch -= mouse_delta.y * ORBIT_PITCH_SENSITIVITY;
        orbit.pitch = orbit.pitch.clamp(-ORBIT_PITCH_LIMIT, ORBIT_PITCH_LIMIT);
    }

    let mut scroll_accum = 0.0;
    for event in scroll_events.read() {
        scroll_accum += match event.unit {
            MouseScrollUnit::Line => event.y * 1.0,
            MouseScrollUnit::Pixel => event.y * 0.05,
        };
    }
    if scroll_accum.abs() > f32::EPSILON {
        let zoom_speed = (orbit.distance * 0.2).clamp(0.05, 50.0);
        orbit.distance = (orbit.distance - scroll_accum * zoom_speed)
            .clamp(ORBIT_MIN_DISTANCE, ORBIT_MAX_DISTANCE);
    }

    let target_pos = orbit.eye_position();
    let target_rot = Transform::from_translation(target_pos)
        .looking_at(orbit.target, Vec3::Y)
        .rotation;

    let lerp_speed = (ORBIT_SMOOTHING * time.delta_secs()).min(1.0);
    camera_transform.translation = camera_transform.translation.lerp(target_pos, lerp_speed);
    camera_transform.rotation = camera_transform.rotation.slerp(target_rot, lerp_speed);
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::ecs::system::RunSystemOnce;

    use crate::engine::model::slot::AttachedModel;

    #[test]
    fn looking_from_round_trips_through_eye_position() {
        let orbit = OrbitCamera::looking_from(Vec3::new(10.0, 10.0, 10.0));
        let eye = orbit.eye_position();
        assert!((eye - Vec3::new(10.0, 10.0, 10.0)).length() < 1e-3);
    }

    #[test]
    fn framing_distance_doubles_the_largest_extent() {
        let bounds = ModelBounds {
            min: Vec3::new(-1.0, 0.0, 0.0),
            max: Vec3::new(2.0, 1.0, 1.0),
        };
        assert_eq!(framing_distance(&bounds), 6.0);
    }

    #[test]
    fn degenerate_bounds_clamp_to_the_minimum_distance() {
        let bounds = ModelBounds::at_point(Vec3::splat(9.0));
        assert_eq!(framing_distance(&bounds), MIN_FRAMING_DISTANCE);
        let mut orbit = OrbitCamera::default();
        orbit.frame_bounds(&bounds);
        assert!(orbit.distance.is_finite());
        assert!(orbit.eye_position().is_finite());
    }

    #[test]
    fn framing_recentres_the_root_and_retargets_the_orbit() {
        let mut world = World::new();
        world.init_resource::<ModelSlot>();
        world.init_resource::<OrbitCamera>();
        world.init_resource::<Events<ModelAttachedEvent>>();
        world.init_resource::<Events<CenterModelEvent>>();

        let root = world
            .spawn(Transform::from_translation(Vec3::splat(50.0)))
            .id();
        let bounds = ModelBounds {
            min: Vec3::new(2.0, 2.0, 2.0),
            max: Vec3::new(4.0, 4.0, 4.0),
        };
        world.resource_mut::<ModelSlot>().attach(AttachedModel {
            generation: 1,
            url: "duck.glb".to_owned(),
            root,
            bounds,
            gltf: Handle::default(),
        });

        world.send_event(CenterModelEvent);
        world.run_system_once(apply_framing).unwrap();

        let transform = world.entity(root).get::<Transform>().unwrap();
        assert_eq!(transform.translation, Vec3::splat(-3.0));

        let orbit = world.resource::<OrbitCamera>();
        assert_eq!(orbit.target, Vec3::ZERO);
        // max dimension 2 -> framing distance 4 -> diagonal reach 4*sqrt(3)
        assert!((orbit.distance - 4.0 * 3.0_f32.sqrt()).abs() < 1e-4);
        let eye = orbit.eye_position();
        assert!((eye - Vec3::splat(4.0)).length() < 1e-3);
    }

    #[test]
    fn recentre_without_a_model_changes_nothing() {
        let mut world = World::new();
        world.init_resource::<ModelSlot>();
        world.init_resource::<OrbitCamera>();
        world.init_resource::<Events<ModelAttachedEvent>>();
        world.init_resource::<Events<CenterModelEvent>>();

        let before = *world.resource::<OrbitCamera>();
        world.send_event(CenterModelEvent);
        world.run_system_once(apply_framing).unwrap();

        let after = world.resource::<OrbitCamera>();
        assert_eq!(before.distance, after.distance);
        assert_eq!(before.target, after.target);
    }
}

use std::collections::HashMap;

use bevy::math::Affine3A;
use bevy::prelude::*;
use bevy::render::mesh::VertexAttributeValues;

/// Axis-aligned spatial bounds of a model subtree in the frame of its root.
/// Drives auto-framing and is echoed to the host page when a model attaches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelBounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl ModelBounds {
    /// Bounds of a single point, for seeding a fold.
    pub fn at_point(point: Vec3) -> Self {
        Self {
            min: point,
            max: point,
        }
    }

    /// Accumulate points into an optional running bound.
    pub fn merge_point(acc: Option<Self>, point: Vec3) -> Option<Self> {
        Some(match acc {
            None => Self::at_point(point),
            Some(bounds) => Self {
                min: bounds.min.min(point),
                max: bounds.max.max(point),
            },
        })
    }

    pub fn union(self, other: Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Centre point for camera positioning and re-centring.
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Extent along each axis.
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Largest extent; zero for a single-point (degenerate) box.
    pub fn max_dimension(&self) -> f32 {
        self.size().max_element()
    }

    /// Bounds of this box under an affine map: the eight corners are
    /// transformed and re-boxed, which is conservative under rotation but
    /// never under-covers the contents.
    pub fn transformed_by(&self, transform: &Affine3A) -> Self {
        let corners = [
            Vec3::new(self.min.x, self.min.y, self.min.z),
            Vec3::new(self.min.x, self.min.y, self.max.z),
            Vec3::new(self.min.x, self.max.y, self.min.z),
            Vec3::new(self.min.x, self.max.y, self.max.z),
            Vec3::new(self.max.x, self.min.y, self.min.z),
            Vec3::new(self.max.x, self.min.y, self.max.z),
            Vec3::new(self.max.x, self.max.y, self.min.z),
            Vec3::new(self.max.x, self.max.y, self.max.z),
        ];
        let mut bounds = Self::at_point(transform.transform_point3(corners[0]));
        for corner in &corners[1..] {
            bounds = bounds.union(Self::at_point(transform.transform_point3(*corner)));
        }
        bounds
    }
}

/// Query shape every scene node answers during a bounds traversal.
pub type BoundsNodeQuery<'w, 's> = Query<
    'w,
    's,
    (
        Entity,
        Option<&'static ChildOf>,
        &'static Transform,
        Option<&'static Mesh3d>,
    ),
>;

/// Depth-first visit of a spawned subtree, composing each node's local
/// transform down the hierarchy and folding mesh vertex extents into one
/// box expressed in the root's frame. Returns `None` when the subtree holds
/// no readable mesh geometry.
///
/// The root's own transform is deliberately excluded: centring shifts the
/// root, so bounds must not move with it.
pub fn compute_subtree_bounds(
    root: Entity,
    nodes: &BoundsNodeQuery,
    meshes: &Assets<Mesh>,
) -> Option<ModelBounds> {
    let mut children_of: HashMap<Entity, Vec<Entity>> = HashMap::new();
    for (entity, child_of, _, _) in nodes.iter() {
        if let Some(child_of) = child_of {
            children_of.entry(child_of.parent()).or_default().push(entity);
        }
    }

    let mut acc: Option<ModelBounds> = None;
    let mut stack: Vec<(Entity, Affine3A)> = vec![(root, Affine3A::IDENTITY)];

    while let Some((entity, parent_affine)) = stack.pop() {
        let Ok((_, _, transform, mesh_handle)) = nodes.get(entity) else {
            continue;
        };

        let affine = if entity == root {
            Affine3A::IDENTITY
        } else {
            parent_affine * transform.compute_affine()
        };

        if let Some(local) = mesh_handle
            .and_then(|handle| meshes.get(&handle.0))
            .and_then(mesh_local_bounds)
        {
            let world = local.transformed_by(&affine);
            acc = Some(match acc {
                None => world,
                Some(bounds) => bounds.union(world),
            });
        }

        if let Some(children) = children_of.get(&entity) {
            stack.extend(children.iter().map(|&child| (child, affine)));
        }
    }

    acc
}

/// Min/max over a mesh's position attribute, in mesh-local coordinates.
fn mesh_local_bounds(mesh: &Mesh) -> Option<ModelBounds> {
    let VertexAttributeValues::Float32x3(positions) =
        mesh.attribute(Mesh::ATTRIBUTE_POSITION)?
    else {
        return None;
    };

    let mut acc = None;
    for position in positions {
        acc = ModelBounds::merge_point(acc, Vec3::from_array(*position));
    }
    acc
}

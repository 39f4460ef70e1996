//! Cross-section clipping material for the attached model.

use bevy::pbr::{ExtendedMaterial, MaterialExtension};
use bevy::prelude::*;
use bevy::render::render_resource::{AsBindGroup, ShaderRef};

use crate::constants::render_settings::{SECTION_PLANE_NORMAL, SECTION_PLANE_OFFSET};

/// Infinite clipping plane in world space. Fragments with a negative signed
/// distance to the plane are discarded, which exposes the model interior on
/// the kept side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SectionPlane {
    pub normal: Vec3,
    pub offset: f32,
}

impl Default for SectionPlane {
    fn default() -> Self {
        Self {
            normal: SECTION_PLANE_NORMAL,
            offset: SECTION_PLANE_OFFSET,
        }
    }
}

impl SectionPlane {
    pub fn signed_distance(&self, point: Vec3) -> f32 {
        self.normal.dot(point) + self.offset
    }

    /// Whether a point falls on the discarded side.
    pub fn clips(&self, point: Vec3) -> bool {
        self.signed_distance(point) < 0.0
    }

    /// Pack for the shader uniform: xyz = normal, w = offset.
    pub fn clip_uniform(&self) -> Vec4 {
        self.normal.extend(self.offset)
    }
}

/// Extension over `StandardMaterial` adding the clip-plane uniform. Bindings
/// start at 100 to stay clear of the standard material's own slots.
#[derive(Asset, TypePath, AsBindGroup, Debug, Clone)]
pub struct SectionClipExtension {
    #[uniform(100)]
    pub clip_plane: Vec4,
}

impl SectionClipExtension {
    pub fn from_plane(plane: &SectionPlane) -> Self {
        Self {
            clip_plane: plane.clip_uniform(),
        }
    }
}

impl MaterialExtension for SectionClipExtension {
    fn fragment_shader() -> ShaderRef {
        "./shaders/section_clip.wgsl".into()
    }
}

/// The standard PBR surface with clipping layered on top. Shadow passes use
/// the unextended prepass pipeline, so cast shadows stay unclipped.
pub type SectionMaterial = ExtendedMaterial<StandardMaterial, SectionClipExtension>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_plane_splits_along_x_through_the_origin() {
        let plane = SectionPlane::default();
        assert!(plane.clips(Vec3::new(-1.0, 5.0, 5.0)));
        assert!(!plane.clips(Vec3::new(1.0, -5.0, -5.0)));
        assert!(!plane.clips(Vec3::ZERO));
    }

    #[test]
    fn offset_shifts_the_cut() {
        let plane = SectionPlane {
            normal: Vec3::X,
            offset: -2.0,
        };
        assert!(plane.clips(Vec3::new(1.0, 0.0, 0.0)));
        assert!(!plane.clips(Vec3::new(3.0, 0.0, 0.0)));
    }

    #[test]
    fn uniform_packs_normal_and_offset() {
        let plane = SectionPlane {
            normal: Vec3::new(0.0, 1.0, 0.0),
            offset: 0.5,
        };
        assert_eq!(plane.clip_uniform(), Vec4::new(0.0, 1.0, 0.0, 0.5));
    }
}

//! Optional compatibility hooks around blueprint drawing.
//!
//! Some hosts replace the vertex formats or shading of the renderer. A
//! [`CompatHook`] lets them step into the draw bracket and the upload without
//! the tessellator knowing about them. [`NoCompat`] is the pass-through
//! default; [`FaceNormals`] derives per-quad face orientation before upload.

use cgmath::{InnerSpace, Vector3};

use crate::{backend::RenderBackend, data_structures::staging::BufferBuilder};

/// Result of [`CompatHook::setup_array_pointers`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PointerSetup {
    /// The hook configured the attribute pointers itself.
    Handled,
    /// The tessellator should configure the default pointers.
    Default,
}

pub trait CompatHook<B: RenderBackend> {
    /// Called after the default pre-draw state changes, before any array is enabled.
    fn pre_draw(&mut self, _backend: &mut B) {}

    fn setup_array_pointers(&mut self, _backend: &mut B) -> PointerSetup {
        PointerSetup::Default
    }

    /// Called last, after all arrays have been disabled again.
    fn post_draw(&mut self, _backend: &mut B) {}

    /// Called once with the sealed staging buffer right before it is uploaded.
    fn before_upload(&mut self, _staged: &BufferBuilder) {}
}

#[derive(Debug, Default, Copy, Clone)]
pub struct NoCompat;

impl<B: RenderBackend> CompatHook<B> for NoCompat {}

/// Computes one unit normal per staged quad when the geometry is uploaded.
///
/// Knowing which way each face points is what lets shader replacements tell
/// the outside of a blueprint from its inside.
#[derive(Debug, Default, Clone)]
pub struct FaceNormals {
    normals: Vec<Vector3<f32>>,
}

impl FaceNormals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn normals(&self) -> &[Vector3<f32>] {
        &self.normals
    }

    /// Normal of a quad given in counter-clockwise order. Degenerate quads yield zero.
    pub fn quad_normal(positions: [[f32; 3]; 4]) -> Vector3<f32> {
        let p0: Vector3<f32> = positions[0].into();
        let p1: Vector3<f32> = positions[1].into();
        let p2: Vector3<f32> = positions[2].into();
        let p3: Vector3<f32> = positions[3].into();
        // Diagonals are robust against one collapsed edge.
        let normal = (p2 - p0).cross(p3 - p1);
        if normal.magnitude2() <= f32::EPSILON {
            return Vector3::new(0.0, 0.0, 0.0);
        }
        normal.normalize()
    }
}

impl<B: RenderBackend> CompatHook<B> for FaceNormals {
    fn before_upload(&mut self, staged: &BufferBuilder) {
        self.normals = staged
            .quads()
            .iter()
            .map(|q| Self::quad_normal([q[0].position, q[1].position, q[2].position, q[3].position]))
            .collect();
        log::debug!("Derived {} face normals before upload", self.normals.len());
    }
}

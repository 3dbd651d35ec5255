//! Scoped render state for blueprint draws.
//!
//! Attribute arrays enabled for a draw must be disabled again before any
//! unrelated rendering runs. [`DrawScope`] performs the setup when it is
//! acquired and the teardown when it is dropped, so the two halves stay
//! paired on every exit path, unwinding included. The same holds for the
//! geometry binding made through [`DrawScope::bind_geometry`].

use crate::{
    backend::{Capability, ClientArray, RenderBackend, TextureUnit},
    compat::CompatHook,
    data_structures::vertex::{ElementUsage, VertexFormat},
};

pub struct DrawScope<'a, B: RenderBackend, H: CompatHook<B>> {
    backend: &'a mut B,
    hook: &'a mut H,
    format: VertexFormat,
    geometry_bound: bool,
}

impl<'a, B: RenderBackend, H: CompatHook<B>> DrawScope<'a, B, H> {
    /// Prepares the backend for drawing geometry in `format`.
    pub fn begin(backend: &'a mut B, hook: &'a mut H, format: VertexFormat) -> Self {
        backend.set_capability(Capability::StandardLighting, false);
        backend.set_capability(Capability::Lightmap, false);
        backend.set_capability(Capability::CullFace, true);

        hook.pre_draw(backend);

        backend.enable_client_state(ClientArray::Vertex);
        backend.client_active_texture(TextureUnit::Primary);
        backend.enable_client_state(ClientArray::TexCoord);
        backend.client_active_texture(TextureUnit::Lightmap);
        backend.enable_client_state(ClientArray::TexCoord);
        backend.client_active_texture(TextureUnit::Primary);
        backend.enable_client_state(ClientArray::Color);

        backend.bind_atlas();

        Self {
            backend,
            hook,
            format,
            geometry_bound: false,
        }
    }

    /// Pushes a matrix and binds `buffer`. Both are undone when the scope drops.
    pub fn bind_geometry(&mut self, buffer: &B::Buffer) {
        self.backend.push_matrix();
        self.geometry_bound = true;
        self.backend.bind_buffer(buffer);
    }

    pub fn backend(&mut self) -> &mut B {
        &mut *self.backend
    }

    /// Backend and hook together, for steps that hand the backend to the hook.
    pub fn parts(&mut self) -> (&mut B, &mut H) {
        (&mut *self.backend, &mut *self.hook)
    }
}

impl<B: RenderBackend, H: CompatHook<B>> Drop for DrawScope<'_, B, H> {
    fn drop(&mut self) {
        if self.geometry_bound {
            self.backend.pop_matrix();
            self.backend.unbind_buffer();
            self.backend.clear_current_color();
        }

        for element in self.format.elements() {
            match element.usage {
                ElementUsage::Position => self.backend.disable_client_state(ClientArray::Vertex),
                ElementUsage::Uv(index) => match TextureUnit::from_index(index) {
                    Some(unit) => {
                        self.backend.client_active_texture(unit);
                        self.backend.disable_client_state(ClientArray::TexCoord);
                        self.backend.client_active_texture(TextureUnit::Primary);
                    }
                    None => log::warn!("No texture unit {} to disable coordinates on", index),
                },
                ElementUsage::Color => {
                    self.backend.disable_client_state(ClientArray::Color);
                    self.backend.clear_current_color();
                }
            }
        }

        self.hook.post_draw(&mut *self.backend);
    }
}

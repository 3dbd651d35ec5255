//! Structure tessellator: build once, upload once, draw many times.
//!
//! A [`StructureTessellator`] moves through a strictly linear lifecycle:
//!
//! ```text
//! New --start_building--> Building --finish_building--> Ready --ensure_uploaded--> Built
//! ```
//!
//! Geometry is written into the staging buffer only while building. Once
//! finished it is uploaded into the backend buffer exactly once, after which
//! the tessellator can only be drawn.

use std::fmt;

use thiserror::Error;

use crate::{
    backend::{AttributePointer, ClientArray, RenderBackend, TextureUnit},
    compat::{CompatHook, NoCompat, PointerSetup},
    data_structures::{
        staging::{BufferBuilder, DEFAULT_BUFFER_SIZE, QUAD_VERTICES},
        vertex::{ElementUsage, VERTEX_SIZE, VertexFormat},
    },
    render_state::DrawScope,
};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum State {
    New,
    Building,
    Ready,
    Built,
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            State::New => "new",
            State::Building => "building",
            State::Ready => "ready",
            State::Built => "built",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TessellatorError {
    #[error("cannot {operation} while the tessellator is {state}")]
    InvalidState { operation: &'static str, state: State },
}

pub type TessellatorResult<T> = Result<T, TessellatorError>;

/// Construction-time settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TessellatorConfig {
    /// Debug label of the backend buffer.
    pub label: String,
    /// Initial staging capacity in bytes. The staging buffer grows past it when needed.
    pub initial_capacity: usize,
}

impl TessellatorConfig {
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_initial_capacity(mut self, bytes: usize) -> Self {
        self.initial_capacity = bytes;
        self
    }
}

impl Default for TessellatorConfig {
    fn default() -> Self {
        Self {
            label: "Blueprint Vertex Buffer".to_string(),
            initial_capacity: DEFAULT_BUFFER_SIZE,
        }
    }
}

pub struct StructureTessellator<B: RenderBackend, H: CompatHook<B> = NoCompat> {
    builder: BufferBuilder,
    buffer: B::Buffer,
    hook: H,
    state: State,
    uploaded_vertices: u32,
}

impl<B: RenderBackend> StructureTessellator<B, NoCompat> {
    pub fn new(backend: &mut B, config: TessellatorConfig) -> Self {
        Self::with_hook(backend, config, NoCompat)
    }
}

impl<B: RenderBackend, H: CompatHook<B>> StructureTessellator<B, H> {
    /// Creates the backend buffer up front; it is reused for the single upload.
    pub fn with_hook(backend: &mut B, config: TessellatorConfig, hook: H) -> Self {
        let buffer = backend.create_buffer(&config.label);
        Self {
            builder: BufferBuilder::new(config.initial_capacity),
            buffer,
            hook,
            state: State::New,
            uploaded_vertices: 0,
        }
    }

    /// Starts the one and only building session of this tessellator.
    pub fn start_building(&mut self) -> TessellatorResult<()> {
        self.expect_state(State::New, "start building")?;
        self.state = State::Building;
        self.builder.begin();
        Ok(())
    }

    /// Staging buffer handle, only available while building.
    pub fn builder(&mut self) -> TessellatorResult<&mut BufferBuilder> {
        self.expect_state(State::Building, "retrieve the buffer builder")?;
        Ok(&mut self.builder)
    }

    pub fn finish_building(&mut self) -> TessellatorResult<()> {
        self.expect_state(State::Building, "finish building")?;
        self.builder.finish();
        self.state = State::Ready;
        Ok(())
    }

    /// Uploads the finished geometry if it has not been uploaded yet.
    ///
    /// Safe to call every frame: outside of `Ready` this does nothing.
    pub fn ensure_uploaded(&mut self, backend: &mut B) {
        if self.state != State::Ready {
            return;
        }
        self.hook.before_upload(&self.builder);
        let vertex_count = self.builder.vertex_count();
        backend.upload(&mut self.buffer, self.builder.bytes(), vertex_count);
        self.uploaded_vertices = vertex_count;
        self.state = State::Built;
        log::info!(
            "Uploaded blueprint geometry: {} quads, {} bytes",
            self.builder.quad_count(),
            self.builder.bytes().len()
        );
    }

    /// True once geometry has been finished, whether or not it has been uploaded.
    pub fn is_built(&self) -> bool {
        matches!(self.state, State::Ready | State::Built)
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn vertex_count(&self) -> u32 {
        self.builder.vertex_count()
    }

    pub fn quad_count(&self) -> u32 {
        self.builder.quad_count()
    }

    pub fn hook(&self) -> &H {
        &self.hook
    }

    pub fn hook_mut(&mut self) -> &mut H {
        &mut self.hook
    }

    /// Draws the uploaded geometry.
    ///
    /// Fails without touching the backend unless the geometry has been
    /// uploaded. The buffer binding, the pushed matrix and all render state
    /// enabled for the draw are released again before this returns or unwinds.
    pub fn draw(&mut self, backend: &mut B) -> TessellatorResult<()> {
        self.expect_state(State::Built, "draw")?;

        let vertex_count = self.uploaded_vertices;
        let mut scope = DrawScope::begin(backend, &mut self.hook, VertexFormat::BLOCK);

        scope.bind_geometry(&self.buffer);

        let (backend, hook) = scope.parts();
        if hook.setup_array_pointers(backend) == PointerSetup::Default {
            setup_array_pointers(backend, VertexFormat::BLOCK);
        }

        if vertex_count >= QUAD_VERTICES {
            scope.backend().draw_quads(0, vertex_count);
        } else {
            log::debug!("Skipping draw of an empty blueprint");
        }
        Ok(())
    }

    /// Releases the backend buffer. The tessellator cannot be used afterwards.
    pub fn destroy(self, backend: &mut B) {
        log::debug!("Destroying blueprint buffer in state {}", self.state);
        backend.destroy_buffer(self.buffer);
    }

    fn expect_state(&self, required: State, operation: &'static str) -> TessellatorResult<()> {
        if self.state != required {
            return Err(TessellatorError::InvalidState {
                operation,
                state: self.state,
            });
        }
        Ok(())
    }
}

/// Points every array at its field of the bound buffer using the fixed stride.
fn setup_array_pointers<B: RenderBackend>(backend: &mut B, format: VertexFormat) {
    for element in format.elements() {
        let pointer = AttributePointer {
            components: element.components,
            component_type: element.component_type,
            stride: VERTEX_SIZE,
            offset: element.offset,
        };
        match element.usage {
            ElementUsage::Position => backend.attribute_pointer(ClientArray::Vertex, pointer),
            ElementUsage::Color => backend.attribute_pointer(ClientArray::Color, pointer),
            ElementUsage::Uv(index) => {
                let Some(unit) = TextureUnit::from_index(index) else {
                    log::warn!("No texture unit {} to point coordinates at", index);
                    continue;
                };
                if unit != TextureUnit::Primary {
                    backend.client_active_texture(unit);
                }
                backend.attribute_pointer(ClientArray::TexCoord, pointer);
                if unit != TextureUnit::Primary {
                    backend.client_active_texture(TextureUnit::Primary);
                }
            }
        }
    }
}

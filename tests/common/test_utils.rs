#![allow(dead_code)]

use blueprint_render::{
    BlockVertex, BufferBuilder, CompatHook, PointerSetup,
    backend::{AttributePointer, Capability, ClientArray, RenderBackend, TextureUnit},
};

pub(crate) fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Every backend call, in the order it was made.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    CreateBuffer(String),
    DestroyBuffer(u32),
    Upload { buffer: u32, bytes: usize, vertices: u32 },
    BindBuffer(u32),
    UnbindBuffer,
    Capability(Capability, bool),
    PushMatrix,
    PopMatrix,
    ActiveTexture(TextureUnit),
    Enable(ClientArray),
    Disable(ClientArray),
    Pointer(ClientArray, AttributePointer),
    BindAtlas,
    DrawQuads { first: u32, count: u32 },
    ClearColor,
    Hook(&'static str),
}

/// Test double standing in for a platform backend. Buffers are plain ids.
#[derive(Debug, Default)]
pub(crate) struct RecordingBackend {
    pub calls: Vec<Call>,
    next_buffer: u32,
    /// Panics inside `draw_quads` when set.
    pub fail_on_draw: bool,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn uploads(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, Call::Upload { .. }))
            .count()
    }

    pub fn draws(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, Call::DrawQuads { .. }))
            .count()
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }

    /// Replays the array enable/disable calls and returns what is still enabled.
    pub fn arrays_left_enabled(&self) -> Vec<(ClientArray, TextureUnit)> {
        let mut unit = TextureUnit::Primary;
        let mut enabled: Vec<(ClientArray, TextureUnit)> = Vec::new();
        for call in &self.calls {
            match call {
                Call::ActiveTexture(u) => unit = *u,
                Call::Enable(array) => {
                    let key = key(*array, unit);
                    if !enabled.contains(&key) {
                        enabled.push(key);
                    }
                }
                Call::Disable(array) => {
                    let key = key(*array, unit);
                    enabled.retain(|k| *k != key);
                }
                _ => (),
            }
        }
        enabled
    }
}

fn key(array: ClientArray, unit: TextureUnit) -> (ClientArray, TextureUnit) {
    match array {
        ClientArray::TexCoord => (array, unit),
        _ => (array, TextureUnit::Primary),
    }
}

impl RenderBackend for RecordingBackend {
    type Buffer = u32;

    fn create_buffer(&mut self, label: &str) -> u32 {
        self.calls.push(Call::CreateBuffer(label.to_string()));
        self.next_buffer += 1;
        self.next_buffer
    }

    fn destroy_buffer(&mut self, buffer: u32) {
        self.calls.push(Call::DestroyBuffer(buffer));
    }

    fn upload(&mut self, buffer: &mut u32, data: &[u8], vertex_count: u32) {
        self.calls.push(Call::Upload {
            buffer: *buffer,
            bytes: data.len(),
            vertices: vertex_count,
        });
    }

    fn bind_buffer(&mut self, buffer: &u32) {
        self.calls.push(Call::BindBuffer(*buffer));
    }

    fn unbind_buffer(&mut self) {
        self.calls.push(Call::UnbindBuffer);
    }

    fn set_capability(&mut self, capability: Capability, enabled: bool) {
        self.calls.push(Call::Capability(capability, enabled));
    }

    fn push_matrix(&mut self) {
        self.calls.push(Call::PushMatrix);
    }

    fn pop_matrix(&mut self) {
        self.calls.push(Call::PopMatrix);
    }

    fn client_active_texture(&mut self, unit: TextureUnit) {
        self.calls.push(Call::ActiveTexture(unit));
    }

    fn enable_client_state(&mut self, array: ClientArray) {
        self.calls.push(Call::Enable(array));
    }

    fn disable_client_state(&mut self, array: ClientArray) {
        self.calls.push(Call::Disable(array));
    }

    fn attribute_pointer(&mut self, array: ClientArray, pointer: AttributePointer) {
        self.calls.push(Call::Pointer(array, pointer));
    }

    fn bind_atlas(&mut self) {
        self.calls.push(Call::BindAtlas);
    }

    fn draw_quads(&mut self, first: u32, count: u32) {
        self.calls.push(Call::DrawQuads { first, count });
        if self.fail_on_draw {
            panic!("backend lost the device");
        }
    }

    fn clear_current_color(&mut self) {
        self.calls.push(Call::ClearColor);
    }
}

/// Hook that logs its invocations into the backend and can take over pointer setup.
#[derive(Debug, Default)]
pub(crate) struct RecordingHook {
    pub handles_pointers: bool,
    pub uploads_seen: Vec<u32>,
}

impl CompatHook<RecordingBackend> for RecordingHook {
    fn pre_draw(&mut self, backend: &mut RecordingBackend) {
        backend.calls.push(Call::Hook("pre_draw"));
    }

    fn setup_array_pointers(&mut self, backend: &mut RecordingBackend) -> PointerSetup {
        backend.calls.push(Call::Hook("setup_array_pointers"));
        if self.handles_pointers {
            PointerSetup::Handled
        } else {
            PointerSetup::Default
        }
    }

    fn post_draw(&mut self, backend: &mut RecordingBackend) {
        backend.calls.push(Call::Hook("post_draw"));
    }

    fn before_upload(&mut self, staged: &BufferBuilder) {
        assert!(staged.is_finished());
        self.uploads_seen.push(staged.vertex_count());
    }
}

/// Unit square at height `y`, counter-clockwise seen from above.
pub(crate) fn top_quad(y: f32) -> [BlockVertex; 4] {
    let color = [255, 255, 255, 128];
    let light = [240, 240];
    [
        BlockVertex::new([0.0, y, 0.0], color, [0.0, 0.0], light),
        BlockVertex::new([0.0, y, 1.0], color, [0.0, 1.0], light),
        BlockVertex::new([1.0, y, 1.0], color, [1.0, 1.0], light),
        BlockVertex::new([1.0, y, 0.0], color, [1.0, 0.0], light),
    ]
}

use std::panic::{AssertUnwindSafe, catch_unwind};

use blueprint_render::{
    FaceNormals, Frame, StructurePreview, StructureTessellator, TessellatorConfig,
    backend::{AttributePointer, Capability, ClientArray, TextureUnit},
    data_structures::vertex::ComponentType,
};
use cgmath::Vector3;

use crate::common::test_utils::{Call, RecordingBackend, RecordingHook, init_logging, top_quad};

mod common;

fn built_with_hook(backend: &mut RecordingBackend, hook: RecordingHook) -> StructureTessellator<RecordingBackend, RecordingHook> {
    init_logging();
    let mut tess = StructureTessellator::with_hook(backend, TessellatorConfig::default(), hook);
    tess.start_building().unwrap();
    tess.builder().unwrap().quad(top_quad(0.0)).quad(top_quad(1.0));
    tess.finish_building().unwrap();
    tess.ensure_uploaded(backend);
    backend.clear();
    tess
}

fn pointer(components: u32, component_type: ComponentType, offset: u32) -> AttributePointer {
    AttributePointer {
        components,
        component_type,
        stride: 28,
        offset,
    }
}

#[test]
fn draw_follows_the_bracket_order() {
    let mut backend = RecordingBackend::new();
    let mut tess = built_with_hook(&mut backend, RecordingHook::default());
    tess.draw(&mut backend).unwrap();

    let expected = vec![
        Call::Capability(Capability::StandardLighting, false),
        Call::Capability(Capability::Lightmap, false),
        Call::Capability(Capability::CullFace, true),
        Call::Hook("pre_draw"),
        Call::Enable(ClientArray::Vertex),
        Call::ActiveTexture(TextureUnit::Primary),
        Call::Enable(ClientArray::TexCoord),
        Call::ActiveTexture(TextureUnit::Lightmap),
        Call::Enable(ClientArray::TexCoord),
        Call::ActiveTexture(TextureUnit::Primary),
        Call::Enable(ClientArray::Color),
        Call::BindAtlas,
        Call::PushMatrix,
        Call::BindBuffer(1),
        Call::Hook("setup_array_pointers"),
        Call::Pointer(ClientArray::Vertex, pointer(3, ComponentType::Float, 0)),
        Call::Pointer(ClientArray::Color, pointer(4, ComponentType::UnsignedByte, 12)),
        Call::Pointer(ClientArray::TexCoord, pointer(2, ComponentType::Float, 16)),
        Call::ActiveTexture(TextureUnit::Lightmap),
        Call::Pointer(ClientArray::TexCoord, pointer(2, ComponentType::Short, 24)),
        Call::ActiveTexture(TextureUnit::Primary),
        Call::DrawQuads { first: 0, count: 8 },
        Call::PopMatrix,
        Call::UnbindBuffer,
        Call::ClearColor,
        Call::Disable(ClientArray::Vertex),
        Call::Disable(ClientArray::Color),
        Call::ClearColor,
        Call::ActiveTexture(TextureUnit::Primary),
        Call::Disable(ClientArray::TexCoord),
        Call::ActiveTexture(TextureUnit::Primary),
        Call::ActiveTexture(TextureUnit::Lightmap),
        Call::Disable(ClientArray::TexCoord),
        Call::ActiveTexture(TextureUnit::Primary),
        Call::Hook("post_draw"),
    ];
    assert_eq!(backend.calls, expected);
}

#[test]
fn every_enabled_array_is_disabled_after_draw() {
    let mut backend = RecordingBackend::new();
    let mut tess = built_with_hook(&mut backend, RecordingHook::default());
    for _ in 0..3 {
        tess.draw(&mut backend).unwrap();
        assert!(backend.arrays_left_enabled().is_empty());
    }
    assert_eq!(backend.draws(), 3);
}

#[test]
fn handled_pointer_setup_skips_default_pointers() {
    let mut backend = RecordingBackend::new();
    let hook = RecordingHook {
        handles_pointers: true,
        ..Default::default()
    };
    let mut tess = built_with_hook(&mut backend, hook);
    tess.draw(&mut backend).unwrap();

    assert!(!backend.calls.iter().any(|c| matches!(c, Call::Pointer(..))));
    assert!(backend.calls.contains(&Call::Hook("setup_array_pointers")));
    assert_eq!(backend.draws(), 1);
}

#[test]
fn hook_sees_sealed_geometry_once_before_upload() {
    let mut backend = RecordingBackend::new();
    let mut tess = built_with_hook(&mut backend, RecordingHook::default());
    tess.ensure_uploaded(&mut backend);
    assert_eq!(tess.hook().uploads_seen, vec![8]);
}

#[test]
fn teardown_runs_when_the_backend_panics_mid_draw() {
    let mut backend = RecordingBackend::new();
    let mut tess = built_with_hook(&mut backend, RecordingHook::default());
    backend.fail_on_draw = true;

    let result = catch_unwind(AssertUnwindSafe(|| tess.draw(&mut backend)));
    assert!(result.is_err());
    assert!(backend.arrays_left_enabled().is_empty());
    assert_eq!(backend.calls.last(), Some(&Call::Hook("post_draw")));

    let count = |call: &Call| backend.calls.iter().filter(|c| *c == call).count();
    assert_eq!(count(&Call::PushMatrix), count(&Call::PopMatrix));
    assert_eq!(count(&Call::BindBuffer(1)), count(&Call::UnbindBuffer));
    assert_eq!(count(&Call::PopMatrix), 1);
}

#[test]
fn unwinding_restores_the_binding_before_the_arrays() {
    let mut backend = RecordingBackend::new();
    let mut tess = built_with_hook(&mut backend, RecordingHook::default());
    backend.fail_on_draw = true;
    let _ = catch_unwind(AssertUnwindSafe(|| tess.draw(&mut backend)));

    let position = |call: &Call| backend.calls.iter().position(|c| c == call).unwrap();
    assert!(position(&Call::PopMatrix) < position(&Call::UnbindBuffer));
    assert!(position(&Call::UnbindBuffer) < position(&Call::Disable(ClientArray::Vertex)));

    backend.fail_on_draw = false;
    backend.clear();
    tess.draw(&mut backend).unwrap();
    assert_eq!(backend.draws(), 1);
}

#[test]
fn face_normals_are_derived_on_upload() {
    init_logging();
    let mut backend = RecordingBackend::new();
    let mut tess = StructureTessellator::with_hook(&mut backend, TessellatorConfig::default(), FaceNormals::new());
    tess.start_building().unwrap();
    tess.builder().unwrap().quad(top_quad(2.0));
    tess.finish_building().unwrap();
    assert!(tess.hook().normals().is_empty());

    tess.ensure_uploaded(&mut backend);
    let normals = tess.hook().normals();
    assert_eq!(normals.len(), 1);
    assert!((normals[0].y - 1.0).abs() < 1e-6);
    assert_eq!(Vector3::new(normals[0].x, 0.0, normals[0].z), Vector3::new(0.0, 0.0, 0.0));
}

#[test]
fn preview_follows_the_render_loop_contract() {
    init_logging();
    let mut backend = RecordingBackend::new();
    let mut preview = StructurePreview::new(&mut backend, TessellatorConfig::default());
    assert_eq!(preview.render_frame(&mut backend).unwrap(), Frame::Pending);

    preview.build(|builder| {
        builder.extend_quads((0..4).map(|i| top_quad(i as f32)));
    })
    .unwrap();
    assert!(preview.build(|_| ()).is_err());

    assert_eq!(preview.render_frame(&mut backend).unwrap(), Frame::Drawn);
    assert_eq!(preview.render_frame(&mut backend).unwrap(), Frame::Drawn);
    preview.set_visible(false);
    assert_eq!(preview.render_frame(&mut backend).unwrap(), Frame::Hidden);

    assert_eq!(backend.uploads(), 1);
    assert_eq!(backend.draws(), 2);
    assert!(backend.calls.contains(&Call::DrawQuads { first: 0, count: 16 }));

    preview.discard(&mut backend);
    assert_eq!(backend.calls.last(), Some(&Call::DestroyBuffer(1)));
}

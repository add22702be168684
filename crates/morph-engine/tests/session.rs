mod common;

use morph_engine::input::{InputEvent, MouseWheelDelta};
use morph_engine::mesh::CUBE_POSITIONS;
use morph_engine::MorphSession;

use common::{assert_close, device};

const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

fn session() -> Option<MorphSession> {
    let ctx = device()?;
    Some(MorphSession::new(ctx, FORMAT).unwrap())
}

fn target(session: &MorphSession, width: u32, height: u32) -> wgpu::TextureView {
    session
        .device()
        .device()
        .create_texture(&wgpu::TextureDescriptor {
            label: Some("offscreen color"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        })
        .create_view(&wgpu::TextureViewDescriptor::default())
}

#[test]
fn deformations_accumulate_until_reset() {
    let Some(mut s) = session() else { return };
    assert_eq!(s.vertex_count(), 8);

    pollster::block_on(s.process("scale", 2.0)).unwrap();
    pollster::block_on(s.process("scale", 2.0)).unwrap();
    let quadrupled: Vec<f32> = CUBE_POSITIONS.iter().map(|c| c * 4.0).collect();
    assert_close(s.positions(), &quadrupled, 1e-5);

    s.reset().unwrap();
    assert_eq!(s.positions(), &CUBE_POSITIONS[..]);
    assert_eq!(s.vertex_count(), 8);
}

#[test]
fn unknown_operation_falls_back_to_scale() {
    let Some(mut s) = session() else { return };

    let elapsed = pollster::block_on(s.process("twist", 0.5)).unwrap();
    assert!(elapsed >= 0.0);
    let halved: Vec<f32> = CUBE_POSITIONS.iter().map(|c| c * 0.5).collect();
    assert_close(s.positions(), &halved, 1e-6);
}

#[test]
fn translate_moves_only_y() {
    let Some(mut s) = session() else { return };

    pollster::block_on(s.process("translate", 3.0)).unwrap();
    for (o, i) in s.positions().chunks_exact(3).zip(CUBE_POSITIONS.chunks_exact(3)) {
        assert_eq!((o[0], o[2]), (i[0], i[2]));
        assert!((o[1] - i[1] - 1.0).abs() <= 1e-6);
    }
}

#[test]
fn render_before_resize_is_a_no_op() {
    let Some(s) = session() else { return };
    let view = target(&s, 64, 64);
    assert!(!s.render_to(&view).unwrap());
}

#[test]
fn zero_area_resize_keeps_render_safe() {
    let Some(mut s) = session() else { return };
    let view = target(&s, 64, 64);

    s.resize(64, 64);
    assert!(s.render_to(&view).unwrap());

    s.resize(0, 0);
    assert_eq!((s.viewport().size().width, s.viewport().size().height), (0, 0));
    assert!(!s.render_to(&view).unwrap());
    s.resize(64, 0);
    assert!(!s.render_to(&view).unwrap());

    s.resize(64, 64);
    assert!(s.render_to(&view).unwrap());
}

#[test]
fn render_survives_reset_and_deformation() {
    let Some(mut s) = session() else { return };
    let view = target(&s, 32, 32);
    s.resize(32, 32);

    pollster::block_on(s.process("inflate", 0.0)).unwrap();
    assert!(s.render_to(&view).unwrap());
    s.reset().unwrap();
    assert!(s.render_to(&view).unwrap());
    assert!(s.viewport().is_drawable());
}

#[test]
fn wheel_input_reaches_the_camera() {
    let Some(mut s) = session() else { return };
    let before = s.viewport().camera().zoom;

    let scroll_down = InputEvent::MouseWheel {
        delta: MouseWheelDelta::Line { x: 0.0, y: -1.0 },
    };
    assert!(s.handle_input(&scroll_down));
    assert!((s.viewport().camera().zoom - before * 1.08).abs() < 1e-5);

    // Deformation and reset leave the camera alone.
    pollster::block_on(s.process("scale", 1.5)).unwrap();
    s.reset().unwrap();
    assert!((s.viewport().camera().zoom - before * 1.08).abs() < 1e-5);
}

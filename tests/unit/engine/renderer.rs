use super::*;

use crate::foundation::core::{Rgba, Transform, Vec3};
use crate::gpu::context::FramebufferStatus;
use crate::gpu::recording::{GpuCommand, RecordingGpu, ResourceCounts};
use crate::render::blend::BlendMode;
use crate::scene::layer::LayerKind;

const RED: [u8; 16] = [255, 0, 0, 255, 255, 0, 0, 255, 255, 0, 0, 255, 255, 0, 0, 255];

fn renderer() -> FrameRenderer<RecordingGpu> {
    FrameRenderer::new(RecordingGpu::new(), RenderSettings::new(64, 36)).unwrap()
}

fn source() -> PixelSource<'static> {
    PixelSource::new(2, 2, &RED).unwrap()
}

fn add(r: &mut FrameRenderer<RecordingGpu>, id: &str, start: f64, end: f64) -> LayerId {
    let layer = Layer::new(id, LayerKind::Image, start, end);
    r.add_layer(layer, Some(source())).unwrap();
    LayerId::new(id)
}

fn rendered(outcome: RenderOutcome) -> RenderStats {
    match outcome {
        RenderOutcome::Rendered(s) => s,
        RenderOutcome::Skipped => panic!("frame was skipped"),
    }
}

fn last_uniform(gpu: &RecordingGpu, name: &str) -> Option<UniformValue> {
    gpu.commands().iter().rev().find_map(|c| match c {
        GpuCommand::SetUniform { name: n, value, .. } if n == name => Some(value.clone()),
        _ => None,
    })
}

#[test]
fn construction_allocates_primary_backdrop_and_quad() {
    let r = renderer();
    let live = r.gpu().live_resources();
    assert_eq!(live.framebuffers, 2);
    assert_eq!(live.textures, 2);
    assert_eq!(live.depth_buffers, 1);
    assert_eq!(live.buffers, 1);
    assert_eq!(r.state(), RenderState::Idle);
}

#[test]
fn incomplete_framebuffer_is_fatal() {
    let mut gpu = RecordingGpu::new();
    gpu.set_framebuffers_incomplete(true);
    let err = FrameRenderer::new(gpu, RenderSettings::new(64, 36)).unwrap_err();
    assert!(matches!(
        err,
        ReelfxError::IncompleteFramebuffer {
            status: FramebufferStatus::IncompleteAttachment
        }
    ));
}

#[test]
fn lost_context_is_fatal() {
    let mut gpu = RecordingGpu::new();
    gpu.set_context_lost(true);
    assert!(matches!(
        FrameRenderer::new(gpu, RenderSettings::new(64, 36)),
        Err(ReelfxError::Gpu(_))
    ));
}

#[test]
fn request_during_render_is_dropped() {
    let mut r = renderer();
    add(&mut r, "a", 0.0, 10.0);
    r.gpu_mut().clear_commands();
    r.state = RenderState::Rendering;

    assert_eq!(r.render_at_time(1.0).unwrap(), RenderOutcome::Skipped);
    assert!(r.gpu().commands().is_empty());
    assert_eq!(r.state(), RenderState::Rendering);

    r.state = RenderState::Idle;
    assert!(matches!(
        r.render_at_time(1.0).unwrap(),
        RenderOutcome::Rendered(_)
    ));
}

#[test]
fn layers_render_only_inside_their_window() {
    let mut r = renderer();
    add(&mut r, "a", 5.0, 10.0);

    let s = rendered(r.render_at_time(3.0).unwrap());
    assert_eq!((s.layers_considered, s.layers_drawn), (0, 0));
    let s = rendered(r.render_at_time(7.0).unwrap());
    assert_eq!((s.layers_considered, s.layers_drawn), (1, 1));
    let s = rendered(r.render_at_time(12.0).unwrap());
    assert_eq!((s.layers_considered, s.layers_drawn), (0, 0));
}

#[test]
fn render_clears_and_returns_to_idle() {
    let mut r = renderer();
    add(&mut r, "a", 0.0, 10.0);
    r.gpu_mut().clear_commands();
    rendered(r.render_at_time(1.0).unwrap());

    let primary = r.output_target().unwrap().framebuffer;
    assert!(r.gpu().commands().iter().any(|c| matches!(
        c,
        GpuCommand::Clear { framebuffer: Some(fb), color, depth: true }
            if *fb == primary && *color == Rgba::BLACK
    )));
    assert_eq!(r.gpu().bound_framebuffer(), None);
    assert_eq!(r.state(), RenderState::Idle);
    assert_eq!(r.stack.depth(), 0);
    assert_eq!(r.gpu().draw_count(), 1);
}

#[test]
fn layers_draw_back_to_front_by_z() {
    let mut r = renderer();
    let front = add(&mut r, "front", 0.0, 10.0);
    let back = add(&mut r, "back", 0.0, 10.0);
    r.update_layer(
        &front,
        &LayerUpdate {
            transform: Some(Transform {
                position: Vec3::new(0.0, 0.0, 5.0),
                ..Transform::default()
            }),
            ..LayerUpdate::default()
        },
    )
    .unwrap();
    let front_tex = r.layer(&front).unwrap().texture().unwrap();
    let back_tex = r.layer(&back).unwrap().texture().unwrap();

    r.gpu_mut().clear_commands();
    rendered(r.render_at_time(1.0).unwrap());
    let order: Vec<TextureId> = r
        .gpu()
        .commands()
        .iter()
        .filter_map(|c| match c {
            GpuCommand::BindTexture { unit: 0, texture: Some(t) } => Some(*t),
            _ => None,
        })
        .collect();
    assert_eq!(order, vec![back_tex, front_tex]);
}

#[test]
fn equal_z_keeps_insertion_order() {
    let mut r = renderer();
    let a = add(&mut r, "a", 0.0, 10.0);
    let b = add(&mut r, "b", 0.0, 10.0);
    let (ta, tb) = (
        r.layer(&a).unwrap().texture().unwrap(),
        r.layer(&b).unwrap().texture().unwrap(),
    );
    r.gpu_mut().clear_commands();
    rendered(r.render_at_time(0.0).unwrap());
    let first = r.gpu().commands().iter().find_map(|c| match c {
        GpuCommand::BindTexture { unit: 0, texture: Some(t) } if *t == ta || *t == tb => Some(*t),
        _ => None,
    });
    assert_eq!(first, Some(ta));
}

#[test]
fn animated_opacity_reaches_the_blend_program() {
    let mut r = renderer();
    let id = add(&mut r, "a", 0.0, 10.0);
    r.add_keyframe(&id, Keyframe::new(0.0, "opacity", 0.0)).unwrap();
    r.add_keyframe(&id, Keyframe::new(2.0, "opacity", 1.0)).unwrap();
    rendered(r.render_at_time(1.0).unwrap());
    assert_eq!(
        last_uniform(r.gpu(), "u_opacity"),
        Some(UniformValue::Float(0.5))
    );
    assert!(matches!(
        last_uniform(r.gpu(), "u_backdrop"),
        Some(UniformValue::Sampler(1))
    ));
}

#[test]
fn layer_matrix_places_the_unit_square_in_clip_space() {
    let mut r = renderer();
    let id = add(&mut r, "a", 0.0, 10.0);
    rendered(r.render_at_time(0.0).unwrap());
    let Some(UniformValue::Mat4(m)) = last_uniform(r.gpu(), "u_matrix") else {
        panic!("u_matrix not set");
    };
    // Unit origin lands on the top-left corner of the canvas.
    let m = Mat4::from_rows(m.map(f64::from));
    let p = m.transform_point([0.0, 0.0, 0.0, 1.0]);
    assert!((p[0] + 1.0).abs() < 1e-6 && (p[1] - 1.0).abs() < 1e-6);
    // Unit (1, 1) lands 2x2 pixels in.
    let q = m.transform_point([1.0, 1.0, 0.0, 1.0]);
    assert!((q[0] - (-1.0 + 2.0 * 2.0 / 64.0)).abs() < 1e-6);
    assert!((q[1] - (1.0 - 2.0 * 2.0 / 36.0)).abs() < 1e-6);
    assert!(r.layer(&id).is_some());
}

#[test]
fn layers_without_texture_are_skipped() {
    let mut r = renderer();
    r.add_layer(Layer::new("empty", LayerKind::Shape, 0.0, 1.0), None)
        .unwrap();
    let s = rendered(r.render_at_time(0.5).unwrap());
    assert_eq!((s.layers_considered, s.layers_skipped), (1, 1));
    assert_eq!(r.gpu().draw_count(), 0);
}

#[test]
fn unavailable_blend_mode_skips_the_layer() {
    let mut gpu = RecordingGpu::new();
    gpu.fail_compile_containing("return b * s;");
    let mut r = FrameRenderer::new(gpu, RenderSettings::new(64, 36)).unwrap();
    let id = add(&mut r, "a", 0.0, 10.0);
    r.update_layer(
        &id,
        &LayerUpdate {
            blend_mode: Some(BlendMode::Multiply),
            ..LayerUpdate::default()
        },
    )
    .unwrap();
    let s = rendered(r.render_at_time(1.0).unwrap());
    assert_eq!((s.layers_drawn, s.layers_skipped), (0, 1));
}

#[test]
fn effects_run_through_a_temporary_target() {
    let mut r = renderer();
    let id = add(&mut r, "a", 0.0, 10.0);
    r.add_effect(&id, Effect::new("g", "grayscale")).unwrap();
    r.add_effect(&id, Effect::new("s", "sepia")).unwrap();

    let s = rendered(r.render_at_time(1.0).unwrap());
    assert_eq!(s.passes_run, 2);
    assert_eq!(r.targets.outstanding(), 2);
    // Layer draw plus two effect passes.
    assert_eq!(r.gpu().draw_count(), 3);

    assert!(!r.toggle_effect(&id, "g").unwrap());
    r.set_effect_enabled(&id, "s", false).unwrap();
    let s = rendered(r.render_at_time(1.0).unwrap());
    assert_eq!(s.passes_run, 0);
}

#[test]
fn draft_quality_halves_effect_targets() {
    let mut r = renderer();
    r.update_settings(&RenderSettingsPatch {
        quality: Some(crate::scene::settings::Quality::Draft),
        bit_depth: Some(crate::scene::settings::BitDepth::Sixteen),
        ..RenderSettingsPatch::default()
    })
    .unwrap();
    let pixels = [0u8; 8 * 4 * 4];
    let layer = Layer::new("a", LayerKind::Image, 0.0, 1.0);
    r.add_layer(layer, Some(PixelSource::new(8, 4, &pixels).unwrap()))
        .unwrap();
    r.add_effect(&LayerId::new("a"), Effect::new("i", "invert"))
        .unwrap();
    r.gpu_mut().clear_commands();
    rendered(r.render_at_time(0.0).unwrap());
    assert!(r.gpu().commands().iter().any(|c| matches!(
        c,
        GpuCommand::Viewport { width: 4, height: 2 }
    )));
}

#[test]
fn effect_keyframes_animate_uniforms() {
    let mut r = renderer();
    let id = add(&mut r, "a", 0.0, 10.0);
    r.add_effect(&id, Effect::new("g", "grayscale")).unwrap();
    r.add_effect_keyframe(&id, "g", Keyframe::new(0.0, "amount", 0.0))
        .unwrap();
    r.add_effect_keyframe(&id, "g", Keyframe::new(4.0, "amount", 1.0))
        .unwrap();
    rendered(r.render_at_time(1.0).unwrap());
    assert_eq!(
        last_uniform(r.gpu(), "u_amount"),
        Some(UniformValue::Float(0.25))
    );
}

#[test]
fn unknown_effects_and_presets_are_rejected() {
    let mut r = renderer();
    let id = add(&mut r, "a", 0.0, 10.0);
    assert!(r.add_effect(&id, Effect::new("x", "no-such-effect")).is_err());
    r.add_effect(&id, Effect::new("v", "vignette")).unwrap();
    assert!(r.apply_preset(&id, "v", Some("nope")).is_err());
    r.apply_preset(&id, "v", Some("cinematic")).unwrap();
    assert_eq!(
        r.layer(&id).unwrap().effect("v").unwrap().preset.as_deref(),
        Some("cinematic")
    );
    r.set_effect_param(&id, "v", "intensity", Value::Number(0.3))
        .unwrap();
    assert!(r.remove_effect(&id, "v").is_ok());
    assert!(r.remove_effect(&id, "v").is_err());
}

#[test]
fn replace_source_releases_the_old_texture_once() {
    let mut r = renderer();
    let id = add(&mut r, "a", 0.0, 10.0);
    let old = r.layer(&id).unwrap().texture().unwrap();
    r.replace_source(&id, source()).unwrap();
    let new = r.layer(&id).unwrap().texture().unwrap();
    assert_ne!(old, new);
    assert!(!r.gpu().texture_alive(old));
    assert!(r.gpu().texture_alive(new));
    assert_eq!(r.gpu().invalid_deletes(), 0);
}

#[test]
fn remove_layer_releases_its_texture() {
    let mut r = renderer();
    let id = add(&mut r, "a", 0.0, 10.0);
    let tex = r.layer(&id).unwrap().texture().unwrap();
    r.remove_layer(&id).unwrap();
    assert!(!r.gpu().texture_alive(tex));
    assert!(r.remove_layer(&id).is_err());
}

#[test]
fn duplicate_layer_ids_are_rejected() {
    let mut r = renderer();
    add(&mut r, "a", 0.0, 10.0);
    let dup = Layer::new("a", LayerKind::Image, 0.0, 1.0);
    assert!(r.add_layer(dup, None).is_err());
    assert_eq!(r.layers().len(), 1);
}

#[test]
fn resolution_change_resizes_targets_in_place() {
    let mut r = renderer();
    let tex = r.output_target().unwrap().texture;
    let change = r
        .update_settings(&RenderSettingsPatch {
            width: Some(128),
            height: Some(72),
            ..RenderSettingsPatch::default()
        })
        .unwrap();
    assert!(change.resolution);
    let desc = r.gpu().texture_desc(tex).unwrap();
    assert_eq!((desc.width, desc.height), (128, 72));
    assert_eq!(r.read_pixels().unwrap().width, 128);
    assert!(r
        .update_settings(&RenderSettingsPatch {
            width: Some(0),
            ..RenderSettingsPatch::default()
        })
        .is_err());
    assert_eq!(r.settings().width, 128);
}

#[test]
fn readback_returns_the_background() {
    let mut r = renderer();
    r.update_settings(&RenderSettingsPatch {
        background: Some(Rgba::new(0.0, 0.0, 1.0, 1.0)),
        ..RenderSettingsPatch::default()
    })
    .unwrap();
    rendered(r.render_at_time(0.0).unwrap());
    let frame = r.read_pixels().unwrap();
    assert_eq!((frame.width, frame.height), (64, 36));
    assert_eq!(frame.pixel(0, 0), Some([0, 0, 255, 255]));
    assert_eq!(frame.pixel(63, 35), Some([0, 0, 255, 255]));
    assert!(!frame.premultiplied);
}

#[test]
fn render_range_includes_both_ends() {
    let mut r = renderer();
    let frames = r.render_range(0.0, 1.0, 4.0).unwrap();
    let times: Vec<f64> = frames.iter().map(|(t, _)| *t).collect();
    assert_eq!(times, vec![0.0, 0.25, 0.5, 0.75, 1.0]);
    assert!(r.render_range(1.0, 0.0, 4.0).is_err());
    assert!(r.render_range(0.0, 1.0, 0.0).is_err());
}

#[test]
fn wide_ranges_stream_frames_until_the_callback_stops() {
    let mut r = renderer();
    add(&mut r, "a", 0.0, 10.0);
    let mut seen = Vec::new();
    let err = r
        .for_each_frame(0.0, 1e12, 60.0, |r, t, stats| {
            assert_eq!(stats.time, t);
            r.gpu_mut().clear_commands();
            seen.push(t);
            if seen.len() == 3 {
                return Err(ReelfxError::validation("stop"));
            }
            Ok(())
        })
        .unwrap_err();
    assert!(err.to_string().contains("stop"));
    assert_eq!(seen, vec![0.0, 1.0 / 60.0, 2.0 / 60.0]);
    assert_eq!(r.state(), RenderState::Idle);

    let mut n = 0;
    let count = r
        .for_each_frame(0.0, 0.5, 4.0, |_, _, _| {
            n += 1;
            Ok(())
        })
        .unwrap();
    assert_eq!((count, n), (3, 3));
}

#[test]
fn replacing_a_compiled_effect_deletes_its_program() {
    let mut r = renderer();
    let id = add(&mut r, "a", 0.0, 10.0);
    r.add_effect(&id, Effect::new("g", "grayscale")).unwrap();
    rendered(r.render_at_time(0.0).unwrap());
    let before = r.gpu().live_resources().programs;

    let replacement = r.registry().get("grayscale").unwrap().clone();
    r.register_effect(replacement);
    assert_eq!(r.gpu().live_resources().programs, before - 1);

    rendered(r.render_at_time(0.0).unwrap());
    assert_eq!(r.gpu().live_resources().programs, before);
}

#[test]
fn dispose_releases_everything() {
    let mut r = renderer();
    let id = add(&mut r, "a", 0.0, 10.0);
    add(&mut r, "b", 0.0, 10.0);
    r.add_effect(&id, Effect::new("b", "gaussian-blur")).unwrap();
    r.add_effect(&id, Effect::new("v", "vignette")).unwrap();
    r.add_effect(&id, Effect::new("g", "film-grain")).unwrap();
    for t in [0.0, 0.5, 1.0] {
        rendered(r.render_at_time(t).unwrap());
    }

    r.dispose();
    r.dispose();
    assert!(r.render_at_time(0.0).is_err());
    assert!(r.read_pixels().is_err());

    let gpu = r.into_gpu();
    assert_eq!(gpu.live_resources(), ResourceCounts::default());
    assert_eq!(gpu.invalid_deletes(), 0);
}

#[test]
fn load_scene_replaces_layers_and_settings() {
    let mut r = renderer();
    let old = add(&mut r, "old", 0.0, 1.0);
    let old_tex = r.layer(&old).unwrap().texture().unwrap();
    let scene = SceneDesc::from_json(
        r#"{
            "settings": {"width": 32, "height": 16},
            "layers": [
                {"id": "x", "start_time": 0.0, "end_time": 2.0},
                {"id": "y", "start_time": 1.0, "end_time": 2.0,
                 "effects": [{"id": "p", "type": "pixelate", "preset": "retro"}]}
            ]
        }"#,
    )
    .unwrap();
    r.load_scene(&scene).unwrap();
    assert_eq!(r.settings().width, 32);
    assert_eq!(r.layers().len(), 2);
    assert!(!r.gpu().texture_alive(old_tex));
    assert!(r.layer(&old).is_none());
}

#[test]
fn failed_load_scene_leaves_the_previous_scene_untouched() {
    let mut r = renderer();
    let old = add(&mut r, "old", 0.0, 1.0);
    let old_tex = r.layer(&old).unwrap().texture().unwrap();
    let live_before = r.gpu().live_resources();
    let scene = SceneDesc::from_json(
        r#"{
            "settings": {"width": 32, "height": 16},
            "layers": [
                {"id": "ok", "start_time": 0.0, "end_time": 2.0},
                {"id": "bad", "start_time": 0.0, "end_time": 2.0,
                 "effects": [{"id": "e", "type": "no-such-effect"}]}
            ]
        }"#,
    )
    .unwrap();

    let err = r.load_scene(&scene).unwrap_err();
    assert!(err.to_string().contains("no-such-effect"));
    assert_eq!(r.settings().width, 64);
    let ids: Vec<&str> = r.layers().iter().map(|l| l.id.as_str()).collect();
    assert_eq!(ids, vec!["old"]);
    assert!(r.gpu().texture_alive(old_tex));
    assert_eq!(r.gpu().live_resources(), live_before);
}

#[test]
fn load_scene_accepts_effects_it_defines() {
    let mut r = renderer();
    let scene = SceneDesc::from_json(
        r#"{
            "effects": [{
                "id": "tint", "name": "Tint", "category": "color",
                "vertex_source": "", "fragment_source": "uniform float u_amount;",
                "uniforms": []
            }],
            "layers": [
                {"id": "a", "start_time": 0.0, "end_time": 2.0,
                 "effects": [{"id": "t", "type": "tint"}]}
            ]
        }"#,
    )
    .unwrap();
    r.load_scene(&scene).unwrap();
    assert!(r.registry().contains("tint"));
    assert_eq!(r.layers().len(), 1);
}

#[test]
fn additive_effect_blends_over_a_cleared_effect_target() {
    let mut r = renderer();
    let id = add(&mut r, "a", 0.0, 10.0);
    let mut invert = Effect::new("i", "invert");
    invert.blend_mode = BlendMode::Add;
    r.add_effect(&id, invert).unwrap();
    r.gpu_mut().clear_commands();
    let s = rendered(r.render_at_time(1.0).unwrap());
    assert_eq!(s.passes_run, 1);

    let cmds = r.gpu().commands();
    let blend_at = cmds
        .iter()
        .position(|c| matches!(c, GpuCommand::SetBlend(Some(_))))
        .unwrap();
    let bound = cmds[..blend_at].iter().rev().find_map(|c| match c {
        GpuCommand::BindFramebuffer(fb) => Some(*fb),
        _ => None,
    });
    let effect_fb = bound.flatten().unwrap();
    assert_ne!(Some(effect_fb), r.output_target().map(|t| t.framebuffer));
    assert!(cmds[..blend_at].iter().any(|c| matches!(
        c,
        GpuCommand::Clear { framebuffer: Some(fb), color, .. }
            if *fb == effect_fb && *color == Rgba::TRANSPARENT
    )));
}

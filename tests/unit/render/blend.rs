use super::*;
use crate::gpu::recording::RecordingGpu;

fn close(a: Rgba, b: Rgba) -> bool {
    (a.r - b.r).abs() < 1e-6
        && (a.g - b.g).abs() < 1e-6
        && (a.b - b.b).abs() < 1e-6
        && (a.a - b.a).abs() < 1e-6
}

#[test]
fn multiply_of_disjoint_primaries_is_black() {
    let out = BlendMode::Multiply.composite(
        Rgba::new(1.0, 0.0, 0.0, 1.0),
        Rgba::new(0.0, 1.0, 0.0, 1.0),
        1.0,
    );
    assert!(close(out, Rgba::new(0.0, 0.0, 0.0, 1.0)));
}

#[test]
fn add_clamps_at_one() {
    let grey = Rgba::new(0.6, 0.6, 0.6, 1.0);
    let out = BlendMode::Add.composite(grey, grey, 1.0);
    assert!(close(out, Rgba::new(1.0, 1.0, 1.0, 1.0)));
}

#[test]
fn normal_yields_the_layer() {
    let base = Rgba::new(0.2, 0.4, 0.6, 1.0);
    let layer = Rgba::new(0.9, 0.1, 0.3, 1.0);
    assert!(close(BlendMode::Normal.composite(base, layer, 1.0), layer));
}

#[test]
fn opacity_and_layer_alpha_scale_the_mix() {
    let base = Rgba::new(0.0, 0.0, 0.0, 1.0);
    let layer = Rgba::new(1.0, 1.0, 1.0, 0.5);
    let out = BlendMode::Normal.composite(base, layer, 0.5);
    assert!(close(out, Rgba::new(0.25, 0.25, 0.25, 0.875)));
    assert!(close(BlendMode::Screen.composite(base, layer, 0.0), base));
}

#[test]
fn channel_formulas() {
    let (b, s) = (0.25_f32, 0.75_f32);
    assert!((BlendMode::Screen.channel(b, s) - 0.8125).abs() < 1e-6);
    assert!((BlendMode::Overlay.channel(b, s) - 0.375).abs() < 1e-6);
    assert!((BlendMode::HardLight.channel(b, s) - 0.625).abs() < 1e-6);
    assert_eq!(BlendMode::Darken.channel(b, s), 0.25);
    assert_eq!(BlendMode::Lighten.channel(b, s), 0.75);
    assert_eq!(BlendMode::Difference.channel(b, s), 0.5);
    assert!((BlendMode::Exclusion.channel(b, s) - 0.625).abs() < 1e-6);
    assert_eq!(BlendMode::Subtract.channel(b, s), 0.0);
    assert_eq!(BlendMode::ColorDodge.channel(0.0, 1.0), 1.0);
    assert_eq!(BlendMode::ColorDodge.channel(0.25, 0.5), 0.5);
    assert_eq!(BlendMode::ColorDodge.channel(0.75, 0.5), 1.0);
    assert_eq!(BlendMode::ColorBurn.channel(1.0, 0.0), 0.0);
    assert_eq!(BlendMode::ColorBurn.channel(0.5, 1.0), 0.5);
    assert_eq!(BlendMode::ColorBurn.channel(0.25, 0.5), 0.0);
    assert!((BlendMode::SoftLight.channel(0.5, 0.5) - 0.5).abs() < 1e-6);
}

#[test]
fn modes_serialize_kebab_case() {
    assert_eq!(
        serde_json::to_string(&BlendMode::ColorDodge).unwrap(),
        "\"color-dodge\""
    );
    for mode in BlendMode::ALL {
        let json = format!("\"{}\"", mode.name());
        let back: BlendMode = serde_json::from_str(&json).unwrap();
        assert_eq!(back, mode);
    }
}

#[test]
fn hardware_funcs_cover_the_separable_modes() {
    assert_eq!(BlendMode::Normal.hardware_func(), None);
    assert_eq!(
        BlendMode::Add.hardware_func(),
        Some(BlendFunc {
            src: BlendFactor::One,
            dst: BlendFactor::One
        })
    );
    assert!(BlendMode::Multiply.hardware_func().is_some());
    assert!(BlendMode::Overlay.hardware_func().is_none());
}

#[test]
fn programs_are_cached_per_mode() {
    let mut gpu = RecordingGpu::new();
    let mut programs = ShaderProgramManager::new();
    let mut blends = BlendCompositor::new();

    let a = blends.program_for(BlendMode::Multiply, &mut gpu, &mut programs);
    let b = blends.program_for(BlendMode::Multiply, &mut gpu, &mut programs);
    assert!(a.is_some());
    assert_eq!(a, b);
    assert_eq!(gpu.created_resources().programs, 1);

    for mode in BlendMode::ALL {
        assert!(blends.program_for(mode, &mut gpu, &mut programs).is_some());
    }
    assert_eq!(blends.cached(), 14);

    blends.dispose(&mut gpu, &mut programs);
    assert_eq!(gpu.live_resources().programs, 0);
    assert_eq!(blends.cached(), 0);
}

#[test]
fn failed_mode_is_cached_as_absent() {
    let mut gpu = RecordingGpu::new();
    gpu.fail_compile_containing("abs(b - s)");
    let mut programs = ShaderProgramManager::new();
    let mut blends = BlendCompositor::new();

    assert!(
        blends
            .program_for(BlendMode::Difference, &mut gpu, &mut programs)
            .is_none()
    );
    assert!(
        blends
            .program_for(BlendMode::Difference, &mut gpu, &mut programs)
            .is_none()
    );
    assert_eq!(gpu.created_resources().shaders, 2);
    assert!(
        blends
            .program_for(BlendMode::Normal, &mut gpu, &mut programs)
            .is_some()
    );
}

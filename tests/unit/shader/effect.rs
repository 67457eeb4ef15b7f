use super::*;
use crate::foundation::core::Rgba;
use crate::gpu::recording::RecordingGpu;

#[test]
fn builtins_are_registered() {
    let reg = EffectRegistry::with_builtins();
    for id in [
        "brightness-contrast",
        "saturation",
        "grayscale",
        "sepia",
        "invert",
        "gaussian-blur",
        "vignette",
        "chromatic-aberration",
        "pixelate",
        "film-grain",
    ] {
        assert!(reg.contains(id), "missing {id}");
    }
    assert_eq!(reg.ids().len(), 10);
    assert!(reg.get("film-grain").unwrap().uniform("u_time").is_some());
}

#[test]
fn every_builtin_compiles_on_a_recording_context() {
    let mut gpu = RecordingGpu::new();
    let mut programs = ShaderProgramManager::new();
    let mut reg = EffectRegistry::with_builtins();
    let ids: Vec<String> = reg.ids().into_iter().map(str::to_string).collect();
    for id in &ids {
        let p = reg.program_for(id, &mut gpu, &mut programs).unwrap();
        let prog = programs.get(p).unwrap();
        assert!(prog.uniform("u_texture").is_some());
        for desc in &reg.get(id).unwrap().uniforms {
            assert!(prog.uniform(&desc.name).is_some(), "{id}: {}", desc.name);
        }
    }
    assert_eq!(programs.len(), ids.len());
}

#[test]
fn program_is_compiled_once() {
    let mut gpu = RecordingGpu::new();
    let mut programs = ShaderProgramManager::new();
    let mut reg = EffectRegistry::with_builtins();
    let a = reg.program_for("invert", &mut gpu, &mut programs);
    let b = reg.program_for("invert", &mut gpu, &mut programs);
    assert_eq!(a, b);
    assert_eq!(gpu.created_resources().programs, 1);
    assert!(reg.program_for("missing", &mut gpu, &mut programs).is_none());
}

#[test]
fn failed_effect_stays_unavailable() {
    let mut gpu = RecordingGpu::new();
    gpu.fail_compile_containing("u_saturation");
    let mut programs = ShaderProgramManager::new();
    let mut reg = EffectRegistry::with_builtins();

    assert!(reg.program_for("saturation", &mut gpu, &mut programs).is_none());
    assert_eq!(
        reg.get("saturation").unwrap().program,
        ProgramState::Unavailable
    );
    assert!(reg.program_for("saturation", &mut gpu, &mut programs).is_none());
    assert_eq!(gpu.created_resources().shaders, 2);
}

#[test]
fn register_resets_program_state_and_returns_replaced() {
    let mut reg = EffectRegistry::with_builtins();
    let mut custom = reg.get("invert").unwrap().clone();
    custom.name = "Negative".into();
    custom.program = ProgramState::Ready(ProgramId(42));

    let old = reg.register(custom).unwrap();
    assert_eq!(old.name, "Invert");
    let now = reg.get("invert").unwrap();
    assert_eq!(now.name, "Negative");
    assert_eq!(now.program, ProgramState::Pending);
}

#[test]
fn uniforms_layer_defaults_preset_and_params() {
    let reg = EffectRegistry::with_builtins();
    let blur = reg.get("gaussian-blur").unwrap();

    let defaults = blur.resolve_uniforms(None, &BTreeMap::new());
    assert_eq!(
        defaults,
        vec![
            ("u_radius".to_string(), UniformValue::Float(4.0)),
            ("u_direction".to_string(), UniformValue::Vec2([1.0, 0.0])),
        ]
    );

    let preset = blur.resolve_uniforms(Some("heavy"), &BTreeMap::new());
    assert_eq!(preset[0].1, UniformValue::Float(12.0));

    let mut params = BTreeMap::new();
    params.insert("radius".to_string(), Value::Number(6.0));
    let overridden = blur.resolve_uniforms(Some("heavy"), &params);
    assert_eq!(overridden[0].1, UniformValue::Float(6.0));

    let unknown = blur.resolve_uniforms(Some("nope"), &BTreeMap::new());
    assert_eq!(unknown, defaults);
}

#[test]
fn mismatched_params_keep_the_default() {
    let reg = EffectRegistry::with_builtins();
    let invert = reg.get("invert").unwrap();
    let mut params = BTreeMap::new();
    params.insert(
        "u_amount".to_string(),
        Value::Color(Rgba::new(1.0, 0.0, 0.0, 1.0)),
    );
    let resolved = invert.resolve_uniforms(None, &params);
    assert_eq!(resolved[0].1, UniformValue::Float(1.0));
}

#[test]
fn custom_effects_round_trip_through_json() {
    let fx = ShaderEffect::new(
        "tint",
        "Tint",
        EffectCategory::Color,
        "vs",
        "fs",
    )
    .with_uniform(UniformDescriptor::vec4("u_tint", [1.0, 0.5, 0.0, 1.0]))
    .with_preset("warm", [("u_tint", UniformValue::Vec4([1.0, 0.8, 0.6, 1.0]))]);
    let json = serde_json::to_string(&fx).unwrap();
    let back: ShaderEffect = serde_json::from_str(&json).unwrap();
    assert_eq!(back, fx);
}

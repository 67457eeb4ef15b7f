//! Stock effects available in every registry.

use crate::shader::{
    effect::{EffectCategory, ShaderEffect},
    sources::{FULLSCREEN_VERTEX, effect_fragment},
    uniform::{UniformDescriptor, UniformValue},
};

const LUMA: &str = "const vec3 LUMA = vec3(0.2126, 0.7152, 0.0722);";

fn effect(
    id: &str,
    name: &str,
    category: EffectCategory,
    declarations: &str,
    body: &str,
) -> ShaderEffect {
    ShaderEffect::new(
        id,
        name,
        category,
        FULLSCREEN_VERTEX,
        effect_fragment(declarations, body),
    )
}

fn brightness_contrast() -> ShaderEffect {
    effect(
        "brightness-contrast",
        "Brightness / Contrast",
        EffectCategory::Color,
        "uniform float u_brightness;\nuniform float u_contrast;",
        "vec4 effect(vec4 src, vec2 uv) {
    vec3 rgb = (src.rgb + u_brightness - 0.5) * (1.0 + u_contrast) + 0.5;
    return vec4(clamp(rgb, 0.0, 1.0), src.a);
}",
    )
    .with_uniform(UniformDescriptor::float("u_brightness", 0.0))
    .with_uniform(UniformDescriptor::float("u_contrast", 0.0))
    .with_preset(
        "punchy",
        [
            ("u_brightness", UniformValue::Float(0.05)),
            ("u_contrast", UniformValue::Float(0.25)),
        ],
    )
    .with_preset(
        "faded",
        [
            ("u_brightness", UniformValue::Float(0.08)),
            ("u_contrast", UniformValue::Float(-0.3)),
        ],
    )
}

fn saturation() -> ShaderEffect {
    effect(
        "saturation",
        "Saturation",
        EffectCategory::Color,
        &format!("uniform float u_saturation;\n{LUMA}"),
        "vec4 effect(vec4 src, vec2 uv) {
    float l = dot(src.rgb, LUMA);
    return vec4(clamp(mix(vec3(l), src.rgb, u_saturation), 0.0, 1.0), src.a);
}",
    )
    .with_uniform(UniformDescriptor::float("u_saturation", 1.0))
    .with_preset("muted", [("u_saturation", UniformValue::Float(0.5))])
    .with_preset("vivid", [("u_saturation", UniformValue::Float(1.6))])
}

fn grayscale() -> ShaderEffect {
    effect(
        "grayscale",
        "Grayscale",
        EffectCategory::Color,
        &format!("uniform float u_amount;\n{LUMA}"),
        "vec4 effect(vec4 src, vec2 uv) {
    return vec4(mix(src.rgb, vec3(dot(src.rgb, LUMA)), u_amount), src.a);
}",
    )
    .with_uniform(UniformDescriptor::float("u_amount", 1.0))
}

fn sepia() -> ShaderEffect {
    effect(
        "sepia",
        "Sepia",
        EffectCategory::Color,
        "uniform float u_amount;",
        "vec4 effect(vec4 src, vec2 uv) {
    vec3 s = vec3(
        dot(src.rgb, vec3(0.393, 0.769, 0.189)),
        dot(src.rgb, vec3(0.349, 0.686, 0.168)),
        dot(src.rgb, vec3(0.272, 0.534, 0.131)));
    return vec4(mix(src.rgb, min(s, vec3(1.0)), u_amount), src.a);
}",
    )
    .with_uniform(UniformDescriptor::float("u_amount", 1.0))
    .with_preset("subtle", [("u_amount", UniformValue::Float(0.4))])
}

fn invert() -> ShaderEffect {
    effect(
        "invert",
        "Invert",
        EffectCategory::Color,
        "uniform float u_amount;",
        "vec4 effect(vec4 src, vec2 uv) {
    return vec4(mix(src.rgb, 1.0 - src.rgb, u_amount), src.a);
}",
    )
    .with_uniform(UniformDescriptor::float("u_amount", 1.0))
}

fn gaussian_blur() -> ShaderEffect {
    effect(
        "gaussian-blur",
        "Gaussian Blur",
        EffectCategory::Blur,
        "uniform float u_radius;\nuniform vec2 u_direction;",
        "vec4 effect(vec4 src, vec2 uv) {
    vec2 stepv = u_direction * (u_radius / 4.0) / u_resolution;
    float w[5] = float[](0.227027, 0.1945946, 0.1216216, 0.054054, 0.016216);
    vec4 acc = texture(u_texture, uv) * w[0];
    for (int i = 1; i < 5; i++) {
        vec2 o = stepv * float(i);
        acc += texture(u_texture, uv + o) * w[i];
        acc += texture(u_texture, uv - o) * w[i];
    }
    return acc;
}",
    )
    .with_uniform(UniformDescriptor::float("u_radius", 4.0))
    .with_uniform(UniformDescriptor::vec2("u_direction", [1.0, 0.0]))
    .with_preset("soft", [("u_radius", UniformValue::Float(2.0))])
    .with_preset("heavy", [("u_radius", UniformValue::Float(12.0))])
    .with_preset("vertical", [("u_direction", UniformValue::Vec2([0.0, 1.0]))])
}

fn vignette() -> ShaderEffect {
    effect(
        "vignette",
        "Vignette",
        EffectCategory::Stylize,
        "uniform float u_intensity;\nuniform float u_radius;\nuniform float u_softness;",
        "vec4 effect(vec4 src, vec2 uv) {
    float d = distance(uv, vec2(0.5));
    float v = smoothstep(u_radius, u_radius - u_softness, d);
    return vec4(src.rgb * mix(1.0, v, u_intensity), src.a);
}",
    )
    .with_uniform(UniformDescriptor::float("u_intensity", 0.5))
    .with_uniform(UniformDescriptor::float("u_radius", 0.75))
    .with_uniform(UniformDescriptor::float("u_softness", 0.45))
    .with_preset(
        "cinematic",
        [
            ("u_intensity", UniformValue::Float(0.8)),
            ("u_radius", UniformValue::Float(0.65)),
        ],
    )
}

fn chromatic_aberration() -> ShaderEffect {
    effect(
        "chromatic-aberration",
        "Chromatic Aberration",
        EffectCategory::Distortion,
        "uniform float u_offset;\nuniform vec2 u_direction;",
        "vec4 effect(vec4 src, vec2 uv) {
    vec2 o = u_direction * u_offset / u_resolution;
    float r = texture(u_texture, uv + o).r;
    float b = texture(u_texture, uv - o).b;
    return vec4(r, src.g, b, src.a);
}",
    )
    .with_uniform(UniformDescriptor::float("u_offset", 2.0))
    .with_uniform(UniformDescriptor::vec2("u_direction", [1.0, 0.0]))
    .with_preset("glitch", [("u_offset", UniformValue::Float(8.0))])
}

fn pixelate() -> ShaderEffect {
    effect(
        "pixelate",
        "Pixelate",
        EffectCategory::Stylize,
        "uniform float u_size;",
        "vec4 effect(vec4 src, vec2 uv) {
    vec2 cell = max(u_size, 1.0) / u_resolution;
    return texture(u_texture, (floor(uv / cell) + 0.5) * cell);
}",
    )
    .with_uniform(UniformDescriptor::float("u_size", 8.0))
    .with_preset("retro", [("u_size", UniformValue::Float(16.0))])
}

fn film_grain() -> ShaderEffect {
    effect(
        "film-grain",
        "Film Grain",
        EffectCategory::Stylize,
        "uniform float u_amount;\nuniform float u_time;",
        "float grain_hash(vec2 p) {
    return fract(sin(dot(p, vec2(12.9898, 78.233))) * 43758.5453);
}
vec4 effect(vec4 src, vec2 uv) {
    float n = grain_hash(uv * u_resolution + fract(u_time) * 1000.0) - 0.5;
    return vec4(clamp(src.rgb + n * u_amount, 0.0, 1.0), src.a);
}",
    )
    .with_uniform(UniformDescriptor::float("u_amount", 0.08))
    .with_uniform(UniformDescriptor::float("u_time", 0.0))
    .with_preset("heavy", [("u_amount", UniformValue::Float(0.2))])
}

/// Every stock effect, unregistered.
pub fn all() -> Vec<ShaderEffect> {
    vec![
        brightness_contrast(),
        saturation(),
        grayscale(),
        sepia(),
        invert(),
        gaussian_blur(),
        vignette(),
        chromatic_aberration(),
        pixelate(),
        film_grain(),
    ]
}

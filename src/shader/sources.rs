//! GLSL ES 3.00 sources shared by effects and blend programs.
//!
//! Every program draws the same 4-vertex strip in `[-1, 1]²`. Texture row 0 is always the top of
//! the image, so effect chains keep orientation and only readback flips rows.

/// Vertex stage for full-screen effect passes.
pub const FULLSCREEN_VERTEX: &str = "#version 300 es
in vec2 a_position;
out vec2 v_uv;
void main() {
    v_uv = a_position * 0.5 + 0.5;
    gl_Position = vec4(a_position, 0.0, 1.0);
}
";

/// Vertex stage for layer draws. `u_matrix` maps the unit square to clip space.
pub const LAYER_VERTEX: &str = "#version 300 es
in vec2 a_position;
uniform mat4 u_matrix;
out vec2 v_uv;
void main() {
    vec2 unit = a_position * 0.5 + 0.5;
    v_uv = unit;
    gl_Position = u_matrix * vec4(unit, 0.0, 1.0);
}
";

const EFFECT_HEADER: &str = "#version 300 es
precision highp float;
uniform sampler2D u_texture;
uniform float u_opacity;
uniform vec2 u_resolution;
in vec2 v_uv;
out vec4 outColor;
";

const EFFECT_MAIN: &str = "
void main() {
    vec4 src = texture(u_texture, v_uv);
    vec4 res = effect(src, v_uv);
    outColor = mix(src, res, u_opacity);
}
";

/// Assemble an effect fragment stage.
///
/// `declarations` holds the effect's own `uniform` lines; `body` must define
/// `vec4 effect(vec4 src, vec2 uv)`. The pass opacity mixes the result over the source.
pub fn effect_fragment(declarations: &str, body: &str) -> String {
    let mut out = String::with_capacity(
        EFFECT_HEADER.len() + declarations.len() + body.len() + EFFECT_MAIN.len() + 2,
    );
    out.push_str(EFFECT_HEADER);
    out.push_str(declarations);
    out.push('\n');
    out.push_str(body);
    out.push('\n');
    out.push_str(EFFECT_MAIN);
    out
}

const BLEND_HEADER: &str = "#version 300 es
precision highp float;
uniform sampler2D u_texture;
uniform sampler2D u_backdrop;
uniform vec2 u_resolution;
uniform float u_opacity;
in vec2 v_uv;
out vec4 outColor;
";

const BLEND_MAIN: &str = "
void main() {
    vec4 blend = texture(u_texture, v_uv);
    vec4 base = texture(u_backdrop, gl_FragCoord.xy / u_resolution);
    vec3 rgb = vec3(
        blend_channel(base.r, blend.r),
        blend_channel(base.g, blend.g),
        blend_channel(base.b, blend.b));
    vec4 result = vec4(rgb, blend.a);
    outColor = mix(base, result, u_opacity * blend.a);
}
";

/// Assemble a blend fragment stage around `float blend_channel(float base, float blend)`.
pub fn blend_fragment(channel_fn: &str) -> String {
    let mut out =
        String::with_capacity(BLEND_HEADER.len() + channel_fn.len() + BLEND_MAIN.len() + 1);
    out.push_str(BLEND_HEADER);
    out.push_str(channel_fn);
    out.push('\n');
    out.push_str(BLEND_MAIN);
    out
}

#[cfg(test)]
#[path = "../../tests/unit/shader/sources.rs"]
mod tests;

use std::collections::HashMap;

use crate::{
    foundation::core::Rgba,
    gpu::context::{BlendFactor, BlendFunc, GpuContext, ProgramId},
    shader::program::ShaderProgramManager,
    shader::sources::{LAYER_VERTEX, blend_fragment},
};

/// How a layer combines with what is already in the output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlendMode {
    /// Layer replaces the backdrop.
    #[default]
    Normal,
    /// `base · blend`.
    Multiply,
    /// `1 − (1 − base)(1 − blend)`.
    Screen,
    /// Multiply or screen depending on the base channel.
    Overlay,
    /// W3C soft light.
    SoftLight,
    /// Multiply or screen depending on the blend channel.
    HardLight,
    /// Brighten the base toward the blend.
    ColorDodge,
    /// Darken the base toward the blend.
    ColorBurn,
    /// Per-channel minimum.
    Darken,
    /// Per-channel maximum.
    Lighten,
    /// `|base − blend|`.
    Difference,
    /// `base + blend − 2 · base · blend`.
    Exclusion,
    /// `min(base + blend, 1)`.
    Add,
    /// `max(base − blend, 0)`.
    Subtract,
}

impl BlendMode {
    /// Every mode, in declaration order.
    pub const ALL: [BlendMode; 14] = [
        Self::Normal,
        Self::Multiply,
        Self::Screen,
        Self::Overlay,
        Self::SoftLight,
        Self::HardLight,
        Self::ColorDodge,
        Self::ColorBurn,
        Self::Darken,
        Self::Lighten,
        Self::Difference,
        Self::Exclusion,
        Self::Add,
        Self::Subtract,
    ];

    /// Kebab-case name used in scene files and program labels.
    pub fn name(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Multiply => "multiply",
            Self::Screen => "screen",
            Self::Overlay => "overlay",
            Self::SoftLight => "soft-light",
            Self::HardLight => "hard-light",
            Self::ColorDodge => "color-dodge",
            Self::ColorBurn => "color-burn",
            Self::Darken => "darken",
            Self::Lighten => "lighten",
            Self::Difference => "difference",
            Self::Exclusion => "exclusion",
            Self::Add => "add",
            Self::Subtract => "subtract",
        }
    }

    /// Per-channel formula, `base` being the backdrop and `blend` the layer.
    pub fn channel(self, base: f32, blend: f32) -> f32 {
        let (b, s) = (base, blend);
        match self {
            Self::Normal => s,
            Self::Multiply => b * s,
            Self::Screen => 1.0 - (1.0 - b) * (1.0 - s),
            Self::Overlay => {
                if b < 0.5 {
                    2.0 * b * s
                } else {
                    1.0 - 2.0 * (1.0 - b) * (1.0 - s)
                }
            }
            Self::SoftLight => {
                if s <= 0.5 {
                    b - (1.0 - 2.0 * s) * b * (1.0 - b)
                } else {
                    let d = if b <= 0.25 {
                        ((16.0 * b - 12.0) * b + 4.0) * b
                    } else {
                        b.sqrt()
                    };
                    b + (2.0 * s - 1.0) * (d - b)
                }
            }
            Self::HardLight => {
                if s <= 0.5 {
                    2.0 * b * s
                } else {
                    1.0 - 2.0 * (1.0 - b) * (1.0 - s)
                }
            }
            Self::ColorDodge => {
                if s >= 1.0 {
                    1.0
                } else {
                    (b / (1.0 - s)).min(1.0)
                }
            }
            Self::ColorBurn => {
                if s <= 0.0 {
                    0.0
                } else {
                    (1.0 - (1.0 - b) / s).max(0.0)
                }
            }
            Self::Darken => b.min(s),
            Self::Lighten => b.max(s),
            Self::Difference => (b - s).abs(),
            Self::Exclusion => b + s - 2.0 * b * s,
            Self::Add => (b + s).min(1.0),
            Self::Subtract => (b - s).max(0.0),
        }
    }

    /// CPU reference of one composited pixel.
    ///
    /// Colour channels come from [`BlendMode::channel`], alpha from `blend`, and the result is
    /// mixed over `base` by `opacity · blend.a`.
    pub fn composite(self, base: Rgba, blend: Rgba, opacity: f32) -> Rgba {
        let result = Rgba::new(
            self.channel(base.r, blend.r),
            self.channel(base.g, blend.g),
            self.channel(base.b, blend.b),
            blend.a,
        );
        let k = opacity * blend.a;
        let mix = |a: f32, b: f32| a + (b - a) * k;
        Rgba::new(
            mix(base.r, result.r),
            mix(base.g, result.g),
            mix(base.b, result.b),
            mix(base.a, result.a),
        )
    }

    /// Fixed-function approximation used when an effect pass writes over its target.
    ///
    /// Modes with no fixed-function equivalent draw with blending disabled.
    pub fn hardware_func(self) -> Option<BlendFunc> {
        let func = |src, dst| Some(BlendFunc { src, dst });
        match self {
            Self::Add => func(BlendFactor::One, BlendFactor::One),
            Self::Multiply => func(BlendFactor::DstColor, BlendFactor::Zero),
            Self::Screen => func(BlendFactor::One, BlendFactor::OneMinusSrcColor),
            _ => None,
        }
    }

    /// GLSL `blend_channel` definition mirroring [`BlendMode::channel`].
    pub fn glsl_channel_fn(self) -> &'static str {
        match self {
            Self::Normal => "float blend_channel(float b, float s) { return s; }",
            Self::Multiply => "float blend_channel(float b, float s) { return b * s; }",
            Self::Screen => {
                "float blend_channel(float b, float s) { return 1.0 - (1.0 - b) * (1.0 - s); }"
            }
            Self::Overlay => {
                "float blend_channel(float b, float s) {
    return b < 0.5 ? 2.0 * b * s : 1.0 - 2.0 * (1.0 - b) * (1.0 - s);
}"
            }
            Self::SoftLight => {
                "float blend_channel(float b, float s) {
    if (s <= 0.5) return b - (1.0 - 2.0 * s) * b * (1.0 - b);
    float d = b <= 0.25 ? ((16.0 * b - 12.0) * b + 4.0) * b : sqrt(b);
    return b + (2.0 * s - 1.0) * (d - b);
}"
            }
            Self::HardLight => {
                "float blend_channel(float b, float s) {
    return s <= 0.5 ? 2.0 * b * s : 1.0 - 2.0 * (1.0 - b) * (1.0 - s);
}"
            }
            Self::ColorDodge => {
                "float blend_channel(float b, float s) {
    return s >= 1.0 ? 1.0 : min(b / (1.0 - s), 1.0);
}"
            }
            Self::ColorBurn => {
                "float blend_channel(float b, float s) {
    return s <= 0.0 ? 0.0 : max(1.0 - (1.0 - b) / s, 0.0);
}"
            }
            Self::Darken => "float blend_channel(float b, float s) { return min(b, s); }",
            Self::Lighten => "float blend_channel(float b, float s) { return max(b, s); }",
            Self::Difference => "float blend_channel(float b, float s) { return abs(b - s); }",
            Self::Exclusion => {
                "float blend_channel(float b, float s) { return b + s - 2.0 * b * s; }"
            }
            Self::Add => "float blend_channel(float b, float s) { return min(b + s, 1.0); }",
            Self::Subtract => "float blend_channel(float b, float s) { return max(b - s, 0.0); }",
        }
    }

    /// Complete fragment stage for this mode.
    pub fn fragment_source(self) -> String {
        blend_fragment(self.glsl_channel_fn())
    }
}

impl std::fmt::Display for BlendMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Lazily built blend programs, one per mode.
///
/// A failed build is cached as `None` so the mode is reported once and skipped afterwards.
#[derive(Debug, Default)]
pub struct BlendCompositor {
    programs: HashMap<BlendMode, Option<ProgramId>>,
}

impl BlendCompositor {
    /// Empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Program for `mode`, building it on first use.
    pub fn program_for(
        &mut self,
        mode: BlendMode,
        gpu: &mut dyn GpuContext,
        programs: &mut ShaderProgramManager,
    ) -> Option<ProgramId> {
        if let Some(cached) = self.programs.get(&mode) {
            return *cached;
        }
        let built = match programs.compile(gpu, mode.name(), LAYER_VERTEX, &mode.fragment_source())
        {
            Ok(p) => Some(p),
            Err(err) => {
                tracing::warn!(%mode, %err, "blend mode unavailable");
                None
            }
        };
        self.programs.insert(mode, built);
        built
    }

    /// Number of modes attempted so far, successful or not.
    pub fn cached(&self) -> usize {
        self.programs.len()
    }

    /// Delete every built program and forget failures.
    pub fn dispose(&mut self, gpu: &mut dyn GpuContext, programs: &mut ShaderProgramManager) {
        for program in std::mem::take(&mut self.programs).into_values().flatten() {
            programs.delete(gpu, program);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/blend.rs"]
mod tests;

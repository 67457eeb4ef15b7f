use std::collections::BTreeMap;

use crate::{
    animation::value::Value,
    foundation::core::Rgba,
    foundation::error::ReelfxResult,
    gpu::context::{GpuContext, ProgramId, TextureFormat, TextureId},
    render::blend::BlendMode,
    render::quad::FullscreenQuad,
    render::target::{RenderTarget, RenderTargetManager},
    shader::effect::EffectRegistry,
    shader::program::{ShaderProgram, ShaderProgramManager},
    shader::uniform::UniformValue,
};

/// One full-screen effect draw.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderPass {
    /// Registry key of the effect.
    pub effect_id: String,
    /// Extra textures bound to sampler units 1.. as `u_input0`, `u_input1`, ...
    pub inputs: Vec<TextureId>,
    /// Preset applied over the effect defaults.
    pub preset: Option<String>,
    /// Parameter overrides, applied over the preset.
    pub params: BTreeMap<String, Value>,
    /// Fixed-function blend while writing the pass output.
    pub blend_mode: BlendMode,
    /// Mix of the effect result over its input.
    pub opacity: f32,
    /// Disabled passes are skipped entirely.
    pub enabled: bool,
}

impl RenderPass {
    /// Enabled, fully opaque pass with no overrides.
    pub fn new(effect_id: impl Into<String>) -> Self {
        Self {
            effect_id: effect_id.into(),
            inputs: Vec::new(),
            preset: None,
            params: BTreeMap::new(),
            blend_mode: BlendMode::Normal,
            opacity: 1.0,
            enabled: true,
        }
    }
}

/// Everything a pipeline run borrows from its owner, plus the live frame values.
pub struct PassContext<'a> {
    /// Command sink.
    pub gpu: &'a mut dyn GpuContext,
    /// Effect lookup and lazy compilation.
    pub registry: &'a mut EffectRegistry,
    /// Program storage.
    pub programs: &'a mut ShaderProgramManager,
    /// Temporary target allocation.
    pub targets: &'a mut RenderTargetManager,
    /// Shared quad.
    pub quad: &'a FullscreenQuad,
    /// Seconds, fed to `u_time`.
    pub time: f64,
    /// Frame number, fed to `u_frame`.
    pub frame: u64,
    /// Size of temporary targets.
    pub size: (u32, u32),
    /// Format of temporary targets.
    pub format: TextureFormat,
}

/// Ordered list of effect passes run with ping-pong intermediate targets.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EffectPipeline {
    passes: Vec<RenderPass>,
}

impl EffectPipeline {
    /// Empty pipeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a pass.
    pub fn push(&mut self, pass: RenderPass) {
        self.passes.push(pass);
    }

    /// All passes in order, disabled ones included.
    pub fn passes(&self) -> &[RenderPass] {
        &self.passes
    }

    /// Number of enabled passes.
    pub fn enabled_count(&self) -> usize {
        self.passes.iter().filter(|p| p.enabled).count()
    }

    /// Temporary targets needed for `runnable` passes.
    pub fn ping_pong_targets(runnable: usize) -> usize {
        match runnable {
            0 | 1 => 0,
            2 => 1,
            _ => 2,
        }
    }

    /// Run every enabled pass whose program is available, reading `input` first.
    ///
    /// The last pass writes `final_target`, or the default framebuffer when `None`. Returns the
    /// number of passes drawn; `0` means nothing was written.
    ///
    /// Every owned output is cleared before its pass. A pass with a fixed-function blend mode is
    /// drawn over a copy of its input, so the blend combines the effect with what it read. On the
    /// default framebuffer the pass blends over whatever the caller left there.
    pub fn render(
        &self,
        ctx: &mut PassContext<'_>,
        input: TextureId,
        final_target: Option<&RenderTarget>,
    ) -> ReelfxResult<usize> {
        let mut runnable: Vec<(&RenderPass, ProgramId)> = Vec::new();
        for pass in self.passes.iter().filter(|p| p.enabled) {
            match ctx
                .registry
                .program_for(&pass.effect_id, ctx.gpu, ctx.programs)
            {
                Some(p) => runnable.push((pass, p)),
                None => tracing::debug!(effect = %pass.effect_id, "pass skipped"),
            }
        }
        runnable.retain(|(_, p)| ctx.programs.get(*p).is_some());
        if runnable.is_empty() {
            return Ok(0);
        }

        let mut temps = Vec::with_capacity(Self::ping_pong_targets(runnable.len()));
        for _ in 0..Self::ping_pong_targets(runnable.len()) {
            let made = ctx
                .targets
                .create(ctx.gpu, ctx.size.0, ctx.size.1, ctx.format, false);
            match made {
                Ok(t) => temps.push(t),
                Err(e) => {
                    for t in temps {
                        ctx.targets.dispose(ctx.gpu, t);
                    }
                    return Err(e);
                }
            }
        }

        let last = runnable.len() - 1;
        let mut source = input;
        for (i, (pass, program)) in runnable.iter().enumerate() {
            let output = if i == last {
                final_target
            } else {
                temps.get(i % temps.len().max(1))
            };
            let size = output.map_or(ctx.size, |t| (t.width, t.height));
            let Some(prog) = ctx.programs.get(*program) else {
                continue;
            };

            ctx.gpu.bind_framebuffer(output.map(|t| t.framebuffer));
            ctx.gpu.viewport(size.0, size.1);
            if output.is_some() {
                ctx.gpu.clear(Rgba::TRANSPARENT, false);
            }
            ctx.gpu.use_program(Some(*program));
            ctx.gpu.bind_texture(0, Some(source));
            prog.set(ctx.gpu, "u_texture", &UniformValue::Sampler(0));
            for (k, tex) in pass.inputs.iter().enumerate() {
                let unit = k as u32 + 1;
                ctx.gpu.bind_texture(unit, Some(*tex));
                prog.set(ctx.gpu, &format!("u_input{k}"), &UniformValue::Sampler(unit));
            }

            if let Some(effect) = ctx.registry.get(&pass.effect_id) {
                let values = effect.resolve_uniforms(pass.preset.as_deref(), &pass.params);
                set_all(ctx.gpu, prog, &values);
            }
            let blend = pass.blend_mode.hardware_func();
            if blend.is_some() && output.is_some() {
                // Zero opacity passes the input through unchanged.
                set_live(ctx.gpu, prog, ctx.time, ctx.frame, size, 0.0);
                ctx.gpu.set_blend(None);
                ctx.quad.draw(ctx.gpu, prog);
            }
            set_live(ctx.gpu, prog, ctx.time, ctx.frame, size, pass.opacity);

            ctx.gpu.set_blend(blend);
            ctx.quad.draw(ctx.gpu, prog);
            tracing::trace!(effect = %pass.effect_id, pass = i, "effect pass drawn");

            if let Some(t) = output {
                source = t.texture;
            }
        }

        ctx.gpu.set_blend(None);
        for unit in 0..=runnable.iter().map(|(p, _)| p.inputs.len()).max().unwrap_or(0) {
            ctx.gpu.bind_texture(unit as u32, None);
        }
        for t in temps {
            ctx.targets.dispose(ctx.gpu, t);
        }
        Ok(runnable.len())
    }
}

fn set_all(gpu: &mut dyn GpuContext, prog: &ShaderProgram, values: &[(String, UniformValue)]) {
    for (name, value) in values {
        prog.set(gpu, name, value);
    }
}

/// Per-draw uniforms every program may declare.
pub(crate) fn set_live(
    gpu: &mut dyn GpuContext,
    prog: &ShaderProgram,
    time: f64,
    frame: u64,
    size: (u32, u32),
    opacity: f32,
) {
    prog.set(gpu, "u_time", &UniformValue::Float(time as f32));
    prog.set(
        gpu,
        "u_frame",
        &UniformValue::Int(i32::try_from(frame).unwrap_or(i32::MAX)),
    );
    prog.set(
        gpu,
        "u_resolution",
        &UniformValue::Vec2([size.0 as f32, size.1 as f32]),
    );
    prog.set(gpu, "u_opacity", &UniformValue::Float(opacity));
}

#[cfg(test)]
#[path = "../../tests/unit/render/pipeline.rs"]
mod tests;

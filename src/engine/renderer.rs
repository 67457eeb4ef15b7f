use crate::{
    animation::keyframe::Keyframe,
    animation::value::Value,
    foundation::error::{ReelfxError, ReelfxResult},
    gpu::context::{GpuContext, PixelSource, TextureDesc, TextureFormat, TextureId},
    render::blend::BlendCompositor,
    render::pipeline::{EffectPipeline, PassContext, set_live},
    render::quad::FullscreenQuad,
    render::readback::FrameRGBA,
    render::target::{RenderTarget, RenderTargetManager},
    scene::desc::SceneDesc,
    scene::layer::{Effect, Layer, LayerId, LayerUpdate, ResolvedLayer},
    scene::settings::{RenderSettings, RenderSettingsPatch, SettingsChange},
    shader::effect::{EffectRegistry, ProgramState, ShaderEffect},
    shader::program::ShaderProgramManager,
    shader::uniform::UniformValue,
    transform::matrix::Mat4,
    transform::stack::MatrixStack,
};

/// Whether a frame is in flight.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RenderState {
    /// Ready to accept a render request.
    #[default]
    Idle,
    /// A frame is being drawn; further requests are dropped.
    Rendering,
}

/// Counters for one rendered frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize)]
pub struct RenderStats {
    /// Requested time in seconds.
    pub time: f64,
    /// `floor(time · fps)`.
    pub frame: u64,
    /// Layers active at `time`.
    pub layers_considered: usize,
    /// Layers composited.
    pub layers_drawn: usize,
    /// Active layers skipped for lack of a texture or blend program.
    pub layers_skipped: usize,
    /// Effect passes drawn across all layers.
    pub passes_run: usize,
}

/// Result of a render request.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RenderOutcome {
    /// The frame was drawn into the primary target.
    Rendered(RenderStats),
    /// A frame was already in flight; nothing was drawn.
    Skipped,
}

impl RenderOutcome {
    /// Stats when the frame was drawn.
    pub fn stats(&self) -> Option<&RenderStats> {
        match self {
            Self::Rendered(s) => Some(s),
            Self::Skipped => None,
        }
    }
}

/// Composites layers with effect chains into an off-screen primary target.
///
/// The renderer owns every GPU resource it creates. Call [`FrameRenderer::dispose`] (or
/// [`FrameRenderer::into_gpu`]) before dropping the context.
pub struct FrameRenderer<G: GpuContext> {
    gpu: G,
    settings: RenderSettings,
    state: RenderState,
    layers: Vec<Layer>,
    stack: MatrixStack,
    registry: EffectRegistry,
    programs: ShaderProgramManager,
    blends: BlendCompositor,
    targets: RenderTargetManager,
    primary: Option<RenderTarget>,
    backdrop: Option<RenderTarget>,
    quad: Option<FullscreenQuad>,
    last_stats: Option<RenderStats>,
}

impl<G: GpuContext> std::fmt::Debug for FrameRenderer<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameRenderer")
            .field("settings", &self.settings)
            .field("state", &self.state)
            .field("layers", &self.layers.len())
            .field("programs", &self.programs.len())
            .field("targets", &self.targets.outstanding())
            .finish_non_exhaustive()
    }
}

impl<G: GpuContext> FrameRenderer<G> {
    /// Allocate the primary and backdrop targets and the shared quad.
    ///
    /// Fails when the context refuses an allocation or a framebuffer is incomplete; anything
    /// created before the failure is released.
    pub fn new(mut gpu: G, settings: RenderSettings) -> ReelfxResult<Self> {
        settings.validate()?;
        let mut targets = RenderTargetManager::new();
        let (w, h) = (settings.width, settings.height);

        let primary = targets.create(&mut gpu, w, h, TextureFormat::Rgba8, true)?;
        let backdrop = match targets.create(&mut gpu, w, h, TextureFormat::Rgba8, false) {
            Ok(t) => t,
            Err(e) => {
                targets.dispose_all(&mut gpu);
                return Err(e);
            }
        };
        let quad = match FullscreenQuad::new(&mut gpu) {
            Ok(q) => q,
            Err(e) => {
                targets.dispose_all(&mut gpu);
                return Err(e);
            }
        };

        tracing::debug!(width = w, height = h, "frame renderer ready");
        Ok(Self {
            gpu,
            settings,
            state: RenderState::Idle,
            layers: Vec::new(),
            stack: MatrixStack::new(),
            registry: EffectRegistry::with_builtins(),
            programs: ShaderProgramManager::new(),
            blends: BlendCompositor::new(),
            targets,
            primary: Some(primary),
            backdrop: Some(backdrop),
            quad: Some(quad),
            last_stats: None,
        })
    }

    /// Current settings.
    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    /// Idle or rendering.
    pub fn state(&self) -> RenderState {
        self.state
    }

    /// Stats of the last drawn frame.
    pub fn stats(&self) -> Option<&RenderStats> {
        self.last_stats.as_ref()
    }

    /// The GPU context.
    pub fn gpu(&self) -> &G {
        &self.gpu
    }

    /// Mutable GPU context, e.g. for host-side uploads.
    pub fn gpu_mut(&mut self) -> &mut G {
        &mut self.gpu
    }

    /// Effect registry.
    pub fn registry(&self) -> &EffectRegistry {
        &self.registry
    }

    /// Layers in insertion order.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Layer by id.
    pub fn layer(&self, id: &LayerId) -> Option<&Layer> {
        self.layers.iter().find(|l| &l.id == id)
    }

    /// Primary output target, `None` after [`FrameRenderer::dispose`].
    pub fn output_target(&self) -> Option<&RenderTarget> {
        self.primary.as_ref()
    }

    fn layer_mut(&mut self, id: &LayerId) -> ReelfxResult<&mut Layer> {
        self.layers
            .iter_mut()
            .find(|l| &l.id == id)
            .ok_or_else(|| ReelfxError::validation(format!("unknown layer '{id}'")))
    }

    fn ensure_live(&self) -> ReelfxResult<()> {
        if self.primary.is_none() {
            return Err(ReelfxError::gpu("renderer has been disposed"));
        }
        Ok(())
    }

    fn upload(&mut self, source: &PixelSource<'_>) -> ReelfxResult<TextureId> {
        let texture = self.gpu.create_texture(&TextureDesc {
            width: source.width,
            height: source.height,
            format: TextureFormat::Rgba8,
        })?;
        self.gpu.upload_texture(texture, source);
        Ok(texture)
    }

    /// Add a layer, optionally uploading its pixels.
    pub fn add_layer(
        &mut self,
        mut layer: Layer,
        source: Option<PixelSource<'_>>,
    ) -> ReelfxResult<()> {
        self.ensure_live()?;
        layer.validate()?;
        if self.layer(&layer.id).is_some() {
            return Err(ReelfxError::validation(format!(
                "layer '{}' already exists",
                layer.id
            )));
        }
        for e in &layer.effects {
            self.check_effect_type(&e.effect_type)?;
        }
        layer.texture = None;
        layer.size = None;
        if let Some(source) = source {
            layer.texture = Some(self.upload(&source)?);
            layer.size = Some((source.width, source.height));
        }
        tracing::debug!(layer = %layer.id, has_source = layer.texture.is_some(), "layer added");
        self.layers.push(layer);
        Ok(())
    }

    /// Remove a layer and release its texture.
    pub fn remove_layer(&mut self, id: &LayerId) -> ReelfxResult<Layer> {
        let idx = self
            .layers
            .iter()
            .position(|l| &l.id == id)
            .ok_or_else(|| ReelfxError::validation(format!("unknown layer '{id}'")))?;
        let mut layer = self.layers.remove(idx);
        if let Some(t) = layer.texture.take() {
            self.gpu.delete_texture(t);
        }
        layer.size = None;
        tracing::debug!(layer = %id, "layer removed");
        Ok(layer)
    }

    /// Upload new pixels for a layer. The previous texture is released once the new one exists.
    pub fn replace_source(&mut self, id: &LayerId, source: PixelSource<'_>) -> ReelfxResult<()> {
        self.ensure_live()?;
        self.layer_mut(id)?;
        let texture = self.upload(&source)?;
        let layer = self.layer_mut(id)?;
        let old = layer.texture.replace(texture);
        layer.size = Some((source.width, source.height));
        if let Some(old) = old {
            self.gpu.delete_texture(old);
        }
        Ok(())
    }

    /// Apply a partial property update to a layer.
    pub fn update_layer(&mut self, id: &LayerId, update: &LayerUpdate) -> ReelfxResult<()> {
        self.layer_mut(id)?.apply_update(update)
    }

    /// Add a layer keyframe.
    pub fn add_keyframe(&mut self, id: &LayerId, keyframe: Keyframe) -> ReelfxResult<()> {
        self.layer_mut(id)?.add_keyframe(keyframe)
    }

    /// Remove layer keyframes of `property` at `time`; returns how many were removed.
    pub fn remove_keyframes(
        &mut self,
        id: &LayerId,
        property: &str,
        time: f64,
    ) -> ReelfxResult<usize> {
        Ok(self.layer_mut(id)?.remove_keyframes(property, time))
    }

    fn check_effect_type(&self, effect_type: &str) -> ReelfxResult<()> {
        if self.registry.contains(effect_type) {
            Ok(())
        } else {
            Err(ReelfxError::validation(format!(
                "unknown effect type '{effect_type}'"
            )))
        }
    }

    /// Append an effect to a layer's chain.
    pub fn add_effect(&mut self, id: &LayerId, effect: Effect) -> ReelfxResult<()> {
        self.check_effect_type(&effect.effect_type)?;
        self.layer_mut(id)?.add_effect(effect)
    }

    /// Remove an effect from a layer's chain.
    pub fn remove_effect(&mut self, id: &LayerId, effect_id: &str) -> ReelfxResult<Effect> {
        let layer = self.layer_mut(id)?;
        layer.remove_effect(effect_id).ok_or_else(|| {
            ReelfxError::validation(format!("layer '{id}' has no effect '{effect_id}'"))
        })
    }

    /// Enable or disable an effect.
    pub fn set_effect_enabled(
        &mut self,
        id: &LayerId,
        effect_id: &str,
        enabled: bool,
    ) -> ReelfxResult<()> {
        self.layer_mut(id)?.effect_mut(effect_id)?.enabled = enabled;
        Ok(())
    }

    /// Flip an effect's enabled flag; returns the new value.
    pub fn toggle_effect(&mut self, id: &LayerId, effect_id: &str) -> ReelfxResult<bool> {
        let effect = self.layer_mut(id)?.effect_mut(effect_id)?;
        effect.enabled = !effect.enabled;
        Ok(effect.enabled)
    }

    /// Set one effect parameter.
    pub fn set_effect_param(
        &mut self,
        id: &LayerId,
        effect_id: &str,
        name: &str,
        value: Value,
    ) -> ReelfxResult<()> {
        self.layer_mut(id)?
            .effect_mut(effect_id)?
            .params
            .insert(name.to_string(), value);
        Ok(())
    }

    /// Add a keyframe on an effect parameter.
    pub fn add_effect_keyframe(
        &mut self,
        id: &LayerId,
        effect_id: &str,
        keyframe: Keyframe,
    ) -> ReelfxResult<()> {
        self.layer_mut(id)?.effect_mut(effect_id)?.add_keyframe(keyframe)
    }

    /// Select a registered preset for an effect; `None` clears it.
    pub fn apply_preset(
        &mut self,
        id: &LayerId,
        effect_id: &str,
        preset: Option<&str>,
    ) -> ReelfxResult<()> {
        let effect_type = self
            .layer(id)
            .and_then(|l| l.effect(effect_id))
            .map(|e| e.effect_type.clone())
            .ok_or_else(|| {
                ReelfxError::validation(format!("layer '{id}' has no effect '{effect_id}'"))
            })?;
        if let Some(name) = preset {
            let known = self
                .registry
                .get(&effect_type)
                .is_some_and(|e| e.presets.contains_key(name));
            if !known {
                return Err(ReelfxError::validation(format!(
                    "effect '{effect_type}' has no preset '{name}'"
                )));
            }
        }
        self.layer_mut(id)?.effect_mut(effect_id)?.preset = preset.map(str::to_string);
        Ok(())
    }

    /// Register or replace a shader effect. A replaced effect's program is deleted.
    pub fn register_effect(&mut self, effect: ShaderEffect) {
        let id = effect.id.clone();
        if let Some(old) = self.registry.register(effect) {
            if let ProgramState::Ready(p) = old.program {
                self.programs.delete(&mut self.gpu, p);
            }
            tracing::debug!(effect = %id, "effect replaced");
        }
    }

    /// Merge settings; a resolution change resizes the primary and backdrop targets.
    pub fn update_settings(&mut self, patch: &RenderSettingsPatch) -> ReelfxResult<SettingsChange> {
        let change = self.settings.merge(patch)?;
        if change.resolution {
            let (w, h) = (self.settings.width, self.settings.height);
            for target in [self.primary.as_mut(), self.backdrop.as_mut()].into_iter().flatten() {
                self.targets.resize(&mut self.gpu, target, w, h);
            }
        }
        Ok(change)
    }

    /// Replace settings, custom effects, and every layer with a scene description.
    ///
    /// Everything that can fail runs before the renderer changes: settings, layers, effect
    /// types, source decoding, and texture uploads. On error the previous scene is untouched.
    pub fn load_scene(&mut self, scene: &SceneDesc) -> ReelfxResult<()> {
        self.ensure_live()?;
        let mut checked = scene.clone();
        checked.validate()?;

        let s = scene.settings;
        let patch = RenderSettingsPatch {
            width: Some(s.width),
            height: Some(s.height),
            fps: Some(s.fps),
            background: Some(s.background),
            color_space: Some(s.color_space),
            bit_depth: Some(s.bit_depth),
            quality: Some(s.quality),
            antialias: Some(s.antialias),
        };
        let mut next = self.settings;
        next.merge(&patch)?;

        let mut layers = Vec::with_capacity(checked.layers.len());
        for entry in checked.layers {
            let mut layer = entry.layer;
            for e in &layer.effects {
                if !scene.effects.iter().any(|d| d.id == e.effect_type) {
                    self.check_effect_type(&e.effect_type)?;
                }
            }
            layer.texture = None;
            layer.size = None;
            layers.push(layer);
        }
        let mut images = Vec::with_capacity(scene.layers.len());
        for entry in &scene.layers {
            images.push(entry.load_source(scene.base_dir())?);
        }

        for (layer, image) in layers.iter_mut().zip(&images) {
            let Some(image) = image else {
                continue;
            };
            let source = PixelSource::from(image);
            match self.upload(&source) {
                Ok(t) => {
                    layer.texture = Some(t);
                    layer.size = Some((source.width, source.height));
                }
                Err(e) => {
                    for t in layers.iter_mut().filter_map(|l| l.texture.take()) {
                        self.gpu.delete_texture(t);
                    }
                    return Err(e);
                }
            }
        }

        self.update_settings(&patch)?;
        for effect in &scene.effects {
            self.register_effect(effect.clone());
        }
        let ids: Vec<LayerId> = self.layers.iter().map(|l| l.id.clone()).collect();
        for id in &ids {
            self.remove_layer(id)?;
        }
        self.layers = layers;
        tracing::debug!(layers = self.layers.len(), "scene loaded");
        Ok(())
    }

    /// Draw the frame at `t` seconds into the primary target.
    ///
    /// A request made while a frame is in flight returns [`RenderOutcome::Skipped`]. Whatever the
    /// result, the framebuffer is unbound and the renderer returns to idle.
    #[tracing::instrument(skip(self), fields(layers = self.layers.len()))]
    pub fn render_at_time(&mut self, t: f64) -> ReelfxResult<RenderOutcome> {
        if self.state == RenderState::Rendering {
            tracing::debug!("render in flight, request dropped");
            return Ok(RenderOutcome::Skipped);
        }
        self.ensure_live()?;
        if !t.is_finite() {
            return Err(ReelfxError::validation("render time must be finite"));
        }

        self.state = RenderState::Rendering;
        let result = self.draw_frame(t);
        self.gpu.set_blend(None);
        self.gpu.use_program(None);
        self.gpu.bind_framebuffer(None);
        self.stack.reset();
        self.state = RenderState::Idle;

        let stats = result?;
        self.last_stats = Some(stats);
        Ok(RenderOutcome::Rendered(stats))
    }

    fn draw_frame(&mut self, t: f64) -> ReelfxResult<RenderStats> {
        let (w, h) = (self.settings.width, self.settings.height);
        let mut stats = RenderStats {
            time: t,
            frame: self.settings.frame_at(t),
            ..RenderStats::default()
        };

        let Some(primary) = self.primary.as_ref() else {
            return Err(ReelfxError::gpu("renderer has been disposed"));
        };
        self.gpu.bind_framebuffer(Some(primary.framebuffer));
        self.gpu.viewport(w, h);
        self.gpu.clear(self.settings.background, true);
        self.stack.load(Mat4::IDENTITY);

        let mut active: Vec<(usize, f64)> = self
            .layers
            .iter()
            .enumerate()
            .filter(|(_, l)| l.is_active_at(t))
            .map(|(i, l)| (i, l.transform.position.z))
            .collect();
        active.sort_by(|a, b| a.1.total_cmp(&b.1));
        stats.layers_considered = active.len();

        for (idx, _) in active {
            let resolved = self.layers[idx].resolve(t)?;
            self.stack.push_matrix();
            let drawn = self.draw_layer(idx, &resolved, &mut stats);
            self.stack.pop_matrix();
            if drawn? {
                stats.layers_drawn += 1;
            } else {
                stats.layers_skipped += 1;
            }
        }
        tracing::debug!(
            drawn = stats.layers_drawn,
            skipped = stats.layers_skipped,
            passes = stats.passes_run,
            "frame rendered"
        );
        Ok(stats)
    }

    // Run the layer's effects, then composite it over the primary target.
    fn draw_layer(
        &mut self,
        idx: usize,
        resolved: &ResolvedLayer,
        stats: &mut RenderStats,
    ) -> ReelfxResult<bool> {
        let layer = &self.layers[idx];
        let (Some(texture), Some((lw, lh))) = (layer.texture, layer.size) else {
            tracing::debug!(layer = %layer.id, "layer has no texture");
            return Ok(false);
        };
        let blend_mode = layer.blend_mode;
        let (Some(primary), Some(backdrop), Some(quad)) =
            (self.primary.as_ref(), self.backdrop.as_ref(), self.quad.as_ref())
        else {
            return Err(ReelfxError::gpu("renderer has been disposed"));
        };

        let Some(blend) = self
            .blends
            .program_for(blend_mode, &mut self.gpu, &mut self.programs)
        else {
            return Ok(false);
        };

        let mut effect_out: Option<RenderTarget> = None;
        if resolved.has_enabled_effects() {
            let mut pipeline = EffectPipeline::new();
            for pass in &resolved.passes {
                pipeline.push(pass.clone());
            }
            let scale = self.settings.quality.effect_scale();
            let size = (
                ((f64::from(lw) * scale).round() as u32).max(1),
                ((f64::from(lh) * scale).round() as u32).max(1),
            );
            let format = self.settings.bit_depth.target_format();
            let out = self
                .targets
                .create(&mut self.gpu, size.0, size.1, format, false)?;
            let mut ctx = PassContext {
                gpu: &mut self.gpu,
                registry: &mut self.registry,
                programs: &mut self.programs,
                targets: &mut self.targets,
                quad,
                time: stats.time,
                frame: stats.frame,
                size,
                format,
            };
            match pipeline.render(&mut ctx, texture, Some(&out)) {
                Ok(0) => self.targets.dispose(&mut self.gpu, out),
                Ok(n) => {
                    stats.passes_run += n;
                    effect_out = Some(out);
                }
                Err(e) => {
                    self.targets.dispose(&mut self.gpu, out);
                    self.gpu.bind_framebuffer(Some(primary.framebuffer));
                    return Err(e);
                }
            }
        }
        let source = effect_out.as_ref().map_or(texture, |t| t.texture);

        let (w, h) = (self.settings.width, self.settings.height);
        self.gpu
            .blit_framebuffer(primary.framebuffer, backdrop.framebuffer, w, h);
        self.gpu.bind_framebuffer(Some(primary.framebuffer));
        self.gpu.viewport(w, h);

        self.stack.apply_transform(&resolved.transform);
        let a = resolved.transform.anchor;
        let matrix = Mat4::translation(-a.x, -a.y, 0.0)
            .multiply(&Mat4::scaling(f64::from(lw), f64::from(lh), 1.0))
            .multiply(self.stack.current())
            .multiply(&Mat4::pixel_to_clip(f64::from(w), f64::from(h)));

        if let Some(prog) = self.programs.get(blend) {
            self.gpu.use_program(Some(blend));
            self.gpu.set_blend(None);
            self.gpu.bind_texture(0, Some(source));
            self.gpu.bind_texture(1, Some(backdrop.texture));
            prog.set(&mut self.gpu, "u_texture", &UniformValue::Sampler(0));
            prog.set(&mut self.gpu, "u_backdrop", &UniformValue::Sampler(1));
            prog.set(
                &mut self.gpu,
                "u_matrix",
                &UniformValue::Mat4(matrix.to_f32_array()),
            );
            set_live(&mut self.gpu, prog, stats.time, stats.frame, (w, h), resolved.opacity);
            quad.draw(&mut self.gpu, prog);
            self.gpu.bind_texture(1, None);
            self.gpu.bind_texture(0, None);
            tracing::trace!(layer = %self.layers[idx].id, mode = %blend_mode, "layer composited");
        }

        if let Some(out) = effect_out {
            self.targets.dispose(&mut self.gpu, out);
        }
        Ok(true)
    }

    /// Copy the primary target out as top-down RGBA8 rows.
    pub fn read_pixels(&mut self) -> ReelfxResult<FrameRGBA> {
        let Some(primary) = self.primary.as_ref() else {
            return Err(ReelfxError::gpu("renderer has been disposed"));
        };
        let (w, h) = (primary.width, primary.height);
        self.gpu.bind_framebuffer(Some(primary.framebuffer));
        let data = self.gpu.read_pixels(w, h);
        self.gpu.bind_framebuffer(None);
        FrameRGBA::from_gpu_rows(w, h, data?, self.settings.color_space)
    }

    /// Render and read back every frame time `start + i / fps` up to and including `end`.
    pub fn render_range(
        &mut self,
        start: f64,
        end: f64,
        fps: f64,
    ) -> ReelfxResult<Vec<(f64, FrameRGBA)>> {
        let mut frames = Vec::new();
        self.for_each_frame(start, end, fps, |r, t, _| {
            frames.push((t, r.read_pixels()?));
            Ok(())
        })?;
        Ok(frames)
    }

    /// Render every frame time of `[start, end]` at `fps`, handing each rendered frame to `f`.
    ///
    /// Frames are produced one at a time; `f` gets the renderer back to read pixels or drain
    /// backend state before the next frame. Returns the number of frames rendered.
    pub fn for_each_frame<F>(
        &mut self,
        start: f64,
        end: f64,
        fps: f64,
        mut f: F,
    ) -> ReelfxResult<u64>
    where
        F: FnMut(&mut Self, f64, RenderStats) -> ReelfxResult<()>,
    {
        if !fps.is_finite() || fps <= 0.0 {
            return Err(ReelfxError::validation("range fps must be finite and > 0"));
        }
        if !start.is_finite() || !end.is_finite() || start > end {
            return Err(ReelfxError::validation(format!(
                "invalid range [{start}, {end}]"
            )));
        }
        let count = ((end - start) * fps + 1e-9).floor() as u64 + 1;
        let mut rendered = 0;
        for i in 0..count {
            let t = start + i as f64 / fps;
            if let RenderOutcome::Rendered(stats) = self.render_at_time(t)? {
                f(self, t, stats)?;
                rendered += 1;
            }
        }
        Ok(rendered)
    }

    /// Release every GPU resource the renderer owns. Safe to call more than once.
    pub fn dispose(&mut self) {
        for layer in &mut self.layers {
            if let Some(t) = layer.texture.take() {
                self.gpu.delete_texture(t);
            }
            layer.size = None;
        }
        self.blends.dispose(&mut self.gpu, &mut self.programs);
        self.registry.reset_programs();
        self.programs.dispose(&mut self.gpu);
        if let Some(q) = self.quad.take() {
            q.dispose(&mut self.gpu);
        }
        self.primary = None;
        self.backdrop = None;
        self.targets.dispose_all(&mut self.gpu);
        self.stack.reset();
        self.state = RenderState::Idle;
        tracing::debug!("frame renderer disposed");
    }

    /// Dispose and hand back the context.
    pub fn into_gpu(mut self) -> G {
        self.dispose();
        self.gpu
    }
}

#[cfg(test)]
#[path = "../../tests/unit/engine/renderer.rs"]
mod tests;

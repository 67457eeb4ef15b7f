use std::collections::BTreeMap;

use crate::{
    animation::keyframe::{Keyframe, apply_keyframes, sort_keyframes},
    animation::value::Value,
    foundation::core::{Transform, Vec3},
    foundation::error::{ReelfxError, ReelfxResult},
    gpu::context::TextureId,
    render::blend::BlendMode,
    render::pipeline::RenderPass,
};

fn default_true() -> bool {
    true
}

fn default_opacity() -> f64 {
    1.0
}

/// Stable host-assigned layer identity.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct LayerId(pub String);

impl LayerId {
    /// Wrap an id string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for LayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LayerId {
    fn from(v: &str) -> Self {
        Self(v.to_string())
    }
}

/// What a layer's pixels come from. Informational; every kind renders its texture.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerKind {
    /// Decoded video frames.
    Video,
    /// Still image.
    #[default]
    Image,
    /// Rasterised text.
    Text,
    /// Rasterised vector shape.
    Shape,
    /// Generated effect content.
    Effect,
    /// Adjustment layer.
    Adjustment,
}

/// An effect applied to one layer.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Effect {
    /// Id unique within the layer.
    pub id: String,
    /// Registry key of the shader effect.
    #[serde(rename = "type")]
    pub effect_type: String,
    /// Disabled effects produce no pass.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Preset applied under `params`.
    #[serde(default)]
    pub preset: Option<String>,
    /// Uniform overrides by name (with or without the `u_` prefix).
    #[serde(default)]
    pub params: BTreeMap<String, Value>,
    /// Animated parameters; paths are relative to `params`.
    #[serde(default)]
    pub keyframes: Vec<Keyframe>,
    /// Fixed-function blend of the pass output.
    #[serde(default)]
    pub blend_mode: BlendMode,
    /// Mix of the effect result over its input.
    #[serde(default = "default_opacity")]
    pub opacity: f64,
}

impl Effect {
    /// Enabled effect with no overrides.
    pub fn new(id: impl Into<String>, effect_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            effect_type: effect_type.into(),
            enabled: true,
            preset: None,
            params: BTreeMap::new(),
            keyframes: Vec::new(),
            blend_mode: BlendMode::Normal,
            opacity: 1.0,
        }
    }

    /// Builder-style parameter.
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// Builder-style preset.
    pub fn with_preset(mut self, preset: impl Into<String>) -> Self {
        self.preset = Some(preset.into());
        self
    }

    /// Add a parameter keyframe, keeping the list time-sorted.
    pub fn add_keyframe(&mut self, keyframe: Keyframe) -> ReelfxResult<()> {
        keyframe.validate()?;
        self.keyframes.push(keyframe);
        sort_keyframes(&mut self.keyframes);
        Ok(())
    }

    /// Parameters with keyframes applied at `t`.
    pub fn params_at(&self, t: f64) -> ReelfxResult<BTreeMap<String, Value>> {
        if self.keyframes.is_empty() {
            return Ok(self.params.clone());
        }
        let mut root = Value::Map(self.params.clone());
        apply_keyframes(&mut root, &self.keyframes, t)?;
        match root {
            Value::Map(m) => Ok(m),
            _ => Err(ReelfxError::animation("effect parameters must stay a map")),
        }
    }

    /// The pass this effect contributes at `t`.
    pub fn pass_at(&self, t: f64) -> ReelfxResult<RenderPass> {
        Ok(RenderPass {
            effect_id: self.effect_type.clone(),
            inputs: Vec::new(),
            preset: self.preset.clone(),
            params: self.params_at(t)?,
            blend_mode: self.blend_mode,
            opacity: self.opacity.clamp(0.0, 1.0) as f32,
            enabled: self.enabled,
        })
    }

    fn validate(&self) -> ReelfxResult<()> {
        if self.id.is_empty() || self.effect_type.is_empty() {
            return Err(ReelfxError::validation("effect id and type must be non-empty"));
        }
        if !self.opacity.is_finite() {
            return Err(ReelfxError::validation(format!(
                "effect '{}' opacity must be finite",
                self.id
            )));
        }
        for k in &self.keyframes {
            k.validate()?;
        }
        Ok(())
    }
}

/// Partial update of a layer's static properties.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct LayerUpdate {
    /// New transform.
    pub transform: Option<Transform>,
    /// New opacity.
    pub opacity: Option<f64>,
    /// New blend mode.
    pub blend_mode: Option<BlendMode>,
    /// New visibility.
    pub visible: Option<bool>,
    /// New window start.
    pub start_time: Option<f64>,
    /// New window end.
    pub end_time: Option<f64>,
}

/// Per-frame values of a layer after keyframes.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedLayer {
    /// Animated transform.
    pub transform: Transform,
    /// Animated opacity in `[0, 1]`.
    pub opacity: f32,
    /// Effect passes, disabled ones included.
    pub passes: Vec<RenderPass>,
}

impl ResolvedLayer {
    /// `true` when at least one pass is enabled.
    pub fn has_enabled_effects(&self) -> bool {
        self.passes.iter().any(|p| p.enabled)
    }
}

/// One compositable element of the scene.
///
/// The texture is owned by the renderer holding the layer and released when the layer is
/// removed or its source replaced.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Layer {
    /// Identity.
    pub id: LayerId,
    /// Source kind.
    #[serde(default)]
    pub kind: LayerKind,
    /// Static placement; keyframes on `transform.*` override it.
    #[serde(default)]
    pub transform: Transform,
    /// Static opacity; keyframes on `opacity` override it.
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    /// Composite mode.
    #[serde(default)]
    pub blend_mode: BlendMode,
    /// Effect chain in order.
    #[serde(default)]
    pub effects: Vec<Effect>,
    /// Hidden layers are never drawn.
    #[serde(default = "default_true")]
    pub visible: bool,
    /// Window start in seconds (inclusive).
    #[serde(default)]
    pub start_time: f64,
    /// Window end in seconds (inclusive).
    #[serde(default = "default_end")]
    pub end_time: f64,
    /// Time-sorted keyframes.
    #[serde(default)]
    pub keyframes: Vec<Keyframe>,
    #[serde(skip)]
    pub(crate) texture: Option<TextureId>,
    #[serde(skip)]
    pub(crate) size: Option<(u32, u32)>,
}

fn default_end() -> f64 {
    f64::MAX
}

impl Layer {
    /// Visible layer over `[start_time, end_time]` with default properties.
    pub fn new(id: impl Into<LayerId>, kind: LayerKind, start_time: f64, end_time: f64) -> Self {
        Self {
            id: id.into(),
            kind,
            transform: Transform::default(),
            opacity: 1.0,
            blend_mode: BlendMode::Normal,
            effects: Vec::new(),
            visible: true,
            start_time,
            end_time,
            keyframes: Vec::new(),
            texture: None,
            size: None,
        }
    }

    /// Texture currently owned by the layer.
    pub fn texture(&self) -> Option<TextureId> {
        self.texture
    }

    /// Source size in pixels, once a source has been uploaded.
    pub fn size(&self) -> Option<(u32, u32)> {
        self.size
    }

    /// Check times, opacity, effects, and keyframes; sorts keyframe lists.
    pub fn validate(&mut self) -> ReelfxResult<()> {
        if self.id.0.is_empty() {
            return Err(ReelfxError::validation("layer id must be non-empty"));
        }
        if !self.start_time.is_finite() || self.end_time.is_nan() {
            return Err(ReelfxError::validation(format!(
                "layer '{}' has a non-finite time window",
                self.id
            )));
        }
        if self.start_time > self.end_time {
            return Err(ReelfxError::validation(format!(
                "layer '{}' starts after it ends ({} > {})",
                self.id, self.start_time, self.end_time
            )));
        }
        if !self.opacity.is_finite() {
            return Err(ReelfxError::validation(format!(
                "layer '{}' opacity must be finite",
                self.id
            )));
        }
        let mut seen = Vec::with_capacity(self.effects.len());
        for e in &mut self.effects {
            e.validate()?;
            if seen.contains(&e.id) {
                return Err(ReelfxError::validation(format!(
                    "layer '{}' has duplicate effect id '{}'",
                    self.id, e.id
                )));
            }
            seen.push(e.id.clone());
            sort_keyframes(&mut e.keyframes);
        }
        for k in &self.keyframes {
            k.validate()?;
        }
        sort_keyframes(&mut self.keyframes);
        Ok(())
    }

    /// Whether the layer is drawn at `t`: visible and `start_time <= t <= end_time`.
    pub fn is_active_at(&self, t: f64) -> bool {
        self.visible && self.start_time <= t && t <= self.end_time
    }

    /// Apply a partial update. The window invariant is checked before anything changes.
    pub fn apply_update(&mut self, update: &LayerUpdate) -> ReelfxResult<()> {
        let start = update.start_time.unwrap_or(self.start_time);
        let end = update.end_time.unwrap_or(self.end_time);
        if start > end || !start.is_finite() || end.is_nan() {
            return Err(ReelfxError::validation(format!(
                "layer '{}' window [{start}, {end}] is invalid",
                self.id
            )));
        }
        if let Some(o) = update.opacity
            && !o.is_finite()
        {
            return Err(ReelfxError::validation("layer opacity must be finite"));
        }

        if let Some(t) = update.transform {
            self.transform = t;
        }
        if let Some(o) = update.opacity {
            self.opacity = o;
        }
        if let Some(m) = update.blend_mode {
            self.blend_mode = m;
        }
        if let Some(v) = update.visible {
            self.visible = v;
        }
        self.start_time = start;
        self.end_time = end;
        Ok(())
    }

    /// Add a keyframe, keeping the list time-sorted.
    pub fn add_keyframe(&mut self, keyframe: Keyframe) -> ReelfxResult<()> {
        keyframe.validate()?;
        self.keyframes.push(keyframe);
        sort_keyframes(&mut self.keyframes);
        Ok(())
    }

    /// Remove keyframes of `property` at exactly `time`. Returns how many were removed.
    pub fn remove_keyframes(&mut self, property: &str, time: f64) -> usize {
        let before = self.keyframes.len();
        self.keyframes
            .retain(|k| !(k.property == property && k.time == time));
        before - self.keyframes.len()
    }

    /// Effect by id.
    pub fn effect(&self, id: &str) -> Option<&Effect> {
        self.effects.iter().find(|e| e.id == id)
    }

    /// Mutable effect by id.
    pub fn effect_mut(&mut self, id: &str) -> ReelfxResult<&mut Effect> {
        let layer = self.id.clone();
        self.effects
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| ReelfxError::validation(format!("layer '{layer}' has no effect '{id}'")))
    }

    /// Append an effect; ids must be unique within the layer.
    pub fn add_effect(&mut self, mut effect: Effect) -> ReelfxResult<()> {
        effect.validate()?;
        if self.effect(&effect.id).is_some() {
            return Err(ReelfxError::validation(format!(
                "layer '{}' already has effect '{}'",
                self.id, effect.id
            )));
        }
        sort_keyframes(&mut effect.keyframes);
        self.effects.push(effect);
        Ok(())
    }

    /// Remove an effect by id.
    pub fn remove_effect(&mut self, id: &str) -> Option<Effect> {
        let idx = self.effects.iter().position(|e| e.id == id)?;
        Some(self.effects.remove(idx))
    }

    fn animated_root(&self) -> Value {
        let mut transform = BTreeMap::new();
        transform.insert("position".to_string(), Value::Vec3(self.transform.position));
        transform.insert("rotation".to_string(), Value::Vec3(self.transform.rotation));
        transform.insert("scale".to_string(), Value::Vec3(self.transform.scale));
        transform.insert("anchor".to_string(), Value::Vec2(self.transform.anchor));

        let mut root = BTreeMap::new();
        root.insert("transform".to_string(), Value::Map(transform));
        root.insert("opacity".to_string(), Value::Number(self.opacity));
        Value::Map(root)
    }

    /// Transform, opacity, and effect passes at `t`.
    pub fn resolve(&self, t: f64) -> ReelfxResult<ResolvedLayer> {
        let mut transform = self.transform;
        let mut opacity = self.opacity;

        if !self.keyframes.is_empty() {
            let mut root = self.animated_root();
            apply_keyframes(&mut root, &self.keyframes, t)?;

            let vec3 = |path: &str, fallback: Vec3| {
                root.get_path(path)
                    .and_then(|v| v.as_vec3())
                    .unwrap_or(fallback)
            };
            transform.position = vec3("transform.position", transform.position);
            transform.rotation = vec3("transform.rotation", transform.rotation);
            transform.scale = vec3("transform.scale", transform.scale);
            transform.anchor = root
                .get_path("transform.anchor")
                .and_then(|v| v.as_vec2())
                .unwrap_or(transform.anchor);
            opacity = root
                .get_path("opacity")
                .and_then(|v| v.as_f64())
                .unwrap_or(opacity);
        }

        let passes = self
            .effects
            .iter()
            .map(|e| e.pass_at(t))
            .collect::<ReelfxResult<Vec<_>>>()?;

        Ok(ResolvedLayer {
            transform,
            opacity: opacity.clamp(0.0, 1.0) as f32,
            passes,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/layer.rs"]
mod tests;

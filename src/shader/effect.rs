use std::collections::{BTreeMap, HashMap};

use crate::{
    animation::value::Value,
    gpu::context::{GpuContext, ProgramId},
    shader::builtin,
    shader::program::ShaderProgramManager,
    shader::uniform::{UniformDescriptor, UniformValue},
};

/// Coarse grouping used by hosts to organise effect pickers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EffectCategory {
    /// Per-pixel colour adjustments.
    Color,
    /// Neighbourhood filters.
    Blur,
    /// Look and texture treatments.
    Stylize,
    /// Sample-position distortions.
    Distortion,
}

/// Lazy compilation state of an effect's program.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ProgramState {
    /// Not compiled yet.
    #[default]
    Pending,
    /// Compiled and owned by the program manager.
    Ready(ProgramId),
    /// Compilation failed; the effect is skipped until re-registered.
    Unavailable,
}

/// Named partial set of uniform overrides.
pub type Preset = BTreeMap<String, UniformValue>;

/// A full-screen post-process shader and the uniforms it exposes.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ShaderEffect {
    /// Registry key, e.g. `gaussian-blur`.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Picker grouping.
    pub category: EffectCategory,
    /// Vertex stage source.
    pub vertex_source: String,
    /// Fragment stage source.
    pub fragment_source: String,
    /// Declared uniforms with defaults.
    pub uniforms: Vec<UniformDescriptor>,
    /// Named override sets.
    #[serde(default)]
    pub presets: BTreeMap<String, Preset>,
    /// Compilation state.
    #[serde(skip)]
    pub program: ProgramState,
}

impl ShaderEffect {
    /// Effect with no declared uniforms or presets.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        category: EffectCategory,
        vertex_source: impl Into<String>,
        fragment_source: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category,
            vertex_source: vertex_source.into(),
            fragment_source: fragment_source.into(),
            uniforms: Vec::new(),
            presets: BTreeMap::new(),
            program: ProgramState::Pending,
        }
    }

    /// Builder-style uniform declaration.
    pub fn with_uniform(mut self, descriptor: UniformDescriptor) -> Self {
        self.uniforms.push(descriptor);
        self
    }

    /// Builder-style preset.
    pub fn with_preset<I, S>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = (S, UniformValue)>,
        S: Into<String>,
    {
        let preset = values.into_iter().map(|(k, v)| (k.into(), v)).collect();
        self.presets.insert(name.into(), preset);
        self
    }

    /// Declared uniform by GLSL name.
    pub fn uniform(&self, name: &str) -> Option<&UniformDescriptor> {
        self.uniforms.iter().find(|u| u.name == name)
    }

    /// Uniform values for one draw: defaults, then the preset, then `params`.
    ///
    /// Parameters match a uniform by its full name (`u_amount`) or without the `u_` prefix
    /// (`amount`). Parameters that cannot be coerced to the declared type are ignored.
    pub fn resolve_uniforms(
        &self,
        preset: Option<&str>,
        params: &BTreeMap<String, Value>,
    ) -> Vec<(String, UniformValue)> {
        let preset = preset.and_then(|name| {
            let found = self.presets.get(name);
            if found.is_none() {
                tracing::warn!(effect = %self.id, preset = name, "unknown preset ignored");
            }
            found
        });

        self.uniforms
            .iter()
            .map(|desc| {
                let mut value = desc.default.clone();
                if let Some(v) = preset.and_then(|p| p.get(&desc.name))
                    && v.uniform_type() == desc.ty
                {
                    value = v.clone();
                }
                let short = desc.name.strip_prefix("u_").unwrap_or(&desc.name);
                if let Some(param) = params.get(&desc.name).or_else(|| params.get(short)) {
                    match UniformValue::coerce(param, desc.ty) {
                        Some(v) => value = v,
                        None => tracing::warn!(
                            effect = %self.id,
                            uniform = %desc.name,
                            kind = param.kind(),
                            "parameter does not fit uniform type"
                        ),
                    }
                }
                (desc.name.clone(), value)
            })
            .collect()
    }
}

/// Effects by id, with lazily compiled programs.
#[derive(Debug, Default)]
pub struct EffectRegistry {
    effects: HashMap<String, ShaderEffect>,
}

impl EffectRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with the built-in effects.
    pub fn with_builtins() -> Self {
        let mut reg = Self::new();
        for effect in builtin::all() {
            reg.effects.insert(effect.id.clone(), effect);
        }
        reg
    }

    /// Add or replace an effect. A replaced effect is returned so its program can be released.
    pub fn register(&mut self, mut effect: ShaderEffect) -> Option<ShaderEffect> {
        effect.program = ProgramState::Pending;
        self.effects.insert(effect.id.clone(), effect)
    }

    /// Look up an effect.
    pub fn get(&self, id: &str) -> Option<&ShaderEffect> {
        self.effects.get(id)
    }

    /// `true` when `id` is registered.
    pub fn contains(&self, id: &str) -> bool {
        self.effects.contains_key(id)
    }

    /// Registered ids, sorted.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.effects.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Program for `id`, compiling it on first use.
    ///
    /// Returns `None` for unknown effects and for effects whose program failed to build; the
    /// failure is remembered so it is reported once.
    pub fn program_for(
        &mut self,
        id: &str,
        gpu: &mut dyn GpuContext,
        programs: &mut ShaderProgramManager,
    ) -> Option<ProgramId> {
        let effect = self.effects.get_mut(id)?;
        match effect.program {
            ProgramState::Ready(p) => Some(p),
            ProgramState::Unavailable => None,
            ProgramState::Pending => {
                match programs.compile(
                    gpu,
                    &effect.id,
                    &effect.vertex_source,
                    &effect.fragment_source,
                ) {
                    Ok(p) => {
                        effect.program = ProgramState::Ready(p);
                        Some(p)
                    }
                    Err(err) => {
                        tracing::warn!(effect = id, %err, "effect unavailable");
                        effect.program = ProgramState::Unavailable;
                        None
                    }
                }
            }
        }
    }

    /// Forget every compiled program; the manager that owns them deletes the handles.
    pub fn reset_programs(&mut self) {
        for effect in self.effects.values_mut() {
            effect.program = ProgramState::Pending;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/shader/effect.rs"]
mod tests;

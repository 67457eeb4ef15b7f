use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use crate::{
    foundation::error::{ReelfxError, ReelfxResult},
    scene::layer::Layer,
    scene::settings::RenderSettings,
    shader::effect::ShaderEffect,
};

/// One layer entry of a scene file, with an optional image to upload as its source.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SceneLayer {
    /// Layer properties.
    #[serde(flatten)]
    pub layer: Layer,
    /// PNG path; relative paths resolve against the scene file's directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<PathBuf>,
}

impl SceneLayer {
    /// Decode the source image, if any.
    pub fn load_source(&self, base_dir: Option<&Path>) -> ReelfxResult<Option<image::RgbaImage>> {
        let Some(source) = &self.source else {
            return Ok(None);
        };
        let path = match base_dir {
            Some(dir) if source.is_relative() => dir.join(source),
            _ => source.clone(),
        };
        let img = image::open(&path).map_err(|e| {
            ReelfxError::validation(format!(
                "decode source of layer '{}' ('{}'): {e}",
                self.layer.id,
                path.display()
            ))
        })?;
        Ok(Some(img.to_rgba8()))
    }
}

/// JSON scene: output settings, custom effects, and layers in insertion order.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SceneDesc {
    /// Output configuration.
    #[serde(default)]
    pub settings: RenderSettings,
    /// Effects registered before layers are added.
    #[serde(default)]
    pub effects: Vec<ShaderEffect>,
    /// Layers in insertion order.
    #[serde(default)]
    pub layers: Vec<SceneLayer>,
    #[serde(skip)]
    base_dir: Option<PathBuf>,
}

impl SceneDesc {
    /// Parse from a JSON reader and validate.
    pub fn from_reader<R: std::io::Read>(r: R) -> ReelfxResult<Self> {
        let mut desc: Self = serde_json::from_reader(r)
            .map_err(|e| ReelfxError::serde(format!("parse scene JSON: {e}")))?;
        desc.validate()?;
        Ok(desc)
    }

    /// Parse from a JSON string and validate.
    pub fn from_json(json: &str) -> ReelfxResult<Self> {
        Self::from_reader(json.as_bytes())
    }

    /// Parse from a JSON file; relative layer sources resolve next to it.
    pub fn from_path(path: impl AsRef<Path>) -> ReelfxResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            ReelfxError::validation(format!("open scene JSON '{}': {e}", path.display()))
        })?;
        let mut desc = Self::from_reader(BufReader::new(f))?;
        desc.base_dir = path.parent().map(Path::to_path_buf);
        Ok(desc)
    }

    /// Directory relative sources resolve against.
    pub fn base_dir(&self) -> Option<&Path> {
        self.base_dir.as_deref()
    }

    /// Check settings, every layer, and layer id uniqueness. Sorts keyframe lists.
    pub fn validate(&mut self) -> ReelfxResult<()> {
        self.settings.validate()?;
        for e in &self.effects {
            if e.id.is_empty() {
                return Err(ReelfxError::validation("custom effect id must be non-empty"));
            }
        }
        let mut ids = Vec::with_capacity(self.layers.len());
        for entry in &mut self.layers {
            entry.layer.validate()?;
            if ids.contains(&entry.layer.id) {
                return Err(ReelfxError::validation(format!(
                    "duplicate layer id '{}'",
                    entry.layer.id
                )));
            }
            ids.push(entry.layer.id.clone());
        }
        Ok(())
    }

    /// Serialize as pretty JSON.
    pub fn to_json(&self) -> ReelfxResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/desc.rs"]
mod tests;

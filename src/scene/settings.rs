use std::{fs::File, io::BufReader, path::Path};

use crate::{
    foundation::core::{Canvas, Rgba},
    foundation::error::{ReelfxError, ReelfxResult},
    gpu::context::TextureFormat,
};

/// Colour space the output is tagged with. Pixels are never converted between spaces.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColorSpace {
    /// sRGB.
    #[default]
    Srgb,
    /// Linear-light sRGB primaries.
    LinearSrgb,
    /// Display P3.
    DisplayP3,
    /// ITU-R BT.709.
    Rec709,
}

/// Requested bits per channel of intermediate targets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum BitDepth {
    /// 8-bit.
    #[default]
    Eight,
    /// 10-bit.
    Ten,
    /// 16-bit.
    Sixteen,
}

impl TryFrom<u8> for BitDepth {
    type Error = String;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        match v {
            8 => Ok(Self::Eight),
            10 => Ok(Self::Ten),
            16 => Ok(Self::Sixteen),
            other => Err(format!("unsupported bit depth {other}, expected 8, 10, or 16")),
        }
    }
}

impl From<BitDepth> for u8 {
    fn from(v: BitDepth) -> Self {
        match v {
            BitDepth::Eight => 8,
            BitDepth::Ten => 10,
            BitDepth::Sixteen => 16,
        }
    }
}

impl BitDepth {
    /// Storage format for intermediate targets.
    pub fn target_format(self) -> TextureFormat {
        match self {
            Self::Eight => TextureFormat::Rgba8,
            Self::Ten | Self::Sixteen => TextureFormat::Rgba16F,
        }
    }
}

/// Speed/fidelity trade-off for effect passes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    /// Effects at half resolution.
    Draft,
    /// Effects at three-quarter resolution.
    Preview,
    /// Effects at full resolution.
    #[default]
    Final,
}

impl Quality {
    /// Edge scale factor applied to effect targets.
    pub fn effect_scale(self) -> f64 {
        match self {
            Self::Draft => 0.5,
            Self::Preview => 0.75,
            Self::Final => 1.0,
        }
    }
}

/// Output configuration of a [`FrameRenderer`](crate::FrameRenderer).
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Frames per second; only used to derive `u_frame`.
    pub fps: f64,
    /// Clear colour of the output.
    pub background: Rgba,
    /// Tag carried on read-back frames.
    pub color_space: ColorSpace,
    /// Intermediate target precision.
    pub bit_depth: BitDepth,
    /// Effect resolution.
    pub quality: Quality,
    /// Host hint for context creation; not interpreted by the engine.
    pub antialias: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
            fps: 30.0,
            background: Rgba::BLACK,
            color_space: ColorSpace::Srgb,
            bit_depth: BitDepth::Eight,
            quality: Quality::Final,
            antialias: true,
        }
    }
}

impl RenderSettings {
    /// Settings with the given resolution and defaults elsewhere.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    /// Parse from JSON and validate.
    pub fn from_json(json: &str) -> ReelfxResult<Self> {
        let settings: Self = serde_json::from_str(json)
            .map_err(|e| ReelfxError::serde(format!("parse render settings JSON: {e}")))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Parse from a JSON file and validate.
    pub fn from_path(path: impl AsRef<Path>) -> ReelfxResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            ReelfxError::validation(format!("open settings JSON '{}': {e}", path.display()))
        })?;
        let settings: Self = serde_json::from_reader(BufReader::new(f))
            .map_err(|e| ReelfxError::serde(format!("parse render settings JSON: {e}")))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check resolution, frame rate, and background.
    pub fn validate(&self) -> ReelfxResult<()> {
        Canvas::new(self.width, self.height)?;
        if !self.fps.is_finite() || self.fps <= 0.0 {
            return Err(ReelfxError::validation("fps must be finite and > 0"));
        }
        let bg = self.background;
        if ![bg.r, bg.g, bg.b, bg.a].iter().all(|c| c.is_finite()) {
            return Err(ReelfxError::validation("background colour must be finite"));
        }
        Ok(())
    }

    /// Output canvas.
    pub fn canvas(&self) -> ReelfxResult<Canvas> {
        Canvas::new(self.width, self.height)
    }

    /// Size of effect ping-pong targets after the quality scale.
    pub fn effect_canvas(&self) -> ReelfxResult<Canvas> {
        Ok(self.canvas()?.scaled(self.quality.effect_scale()))
    }

    /// Frame number at `t` seconds.
    pub fn frame_at(&self, t: f64) -> u64 {
        let f = (t * self.fps).floor();
        if f.is_finite() && f > 0.0 { f as u64 } else { 0 }
    }

    /// Apply every field set in `patch`, validating the result first.
    ///
    /// On error `self` is unchanged.
    pub fn merge(&mut self, patch: &RenderSettingsPatch) -> ReelfxResult<SettingsChange> {
        let mut next = *self;
        if let Some(v) = patch.width {
            next.width = v;
        }
        if let Some(v) = patch.height {
            next.height = v;
        }
        if let Some(v) = patch.fps {
            next.fps = v;
        }
        if let Some(v) = patch.background {
            next.background = v;
        }
        if let Some(v) = patch.color_space {
            next.color_space = v;
        }
        if let Some(v) = patch.bit_depth {
            next.bit_depth = v;
        }
        if let Some(v) = patch.quality {
            next.quality = v;
        }
        if let Some(v) = patch.antialias {
            next.antialias = v;
        }
        next.validate()?;

        let change = SettingsChange {
            resolution: (next.width, next.height) != (self.width, self.height),
            format: next.bit_depth.target_format() != self.bit_depth.target_format(),
            quality: next.quality != self.quality,
        };
        *self = next;
        Ok(change)
    }
}

/// Partial settings update; `None` fields are left as they are.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RenderSettingsPatch {
    /// New width.
    pub width: Option<u32>,
    /// New height.
    pub height: Option<u32>,
    /// New frame rate.
    pub fps: Option<f64>,
    /// New background.
    pub background: Option<Rgba>,
    /// New colour space tag.
    pub color_space: Option<ColorSpace>,
    /// New bit depth.
    pub bit_depth: Option<BitDepth>,
    /// New quality.
    pub quality: Option<Quality>,
    /// New antialias hint.
    pub antialias: Option<bool>,
}

/// Which GPU-relevant aspects a merge changed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SettingsChange {
    /// Output size changed.
    pub resolution: bool,
    /// Intermediate target format changed.
    pub format: bool,
    /// Effect resolution scale changed.
    pub quality: bool,
}

#[cfg(test)]
#[path = "../../tests/unit/scene/settings.rs"]
mod tests;

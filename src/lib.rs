//! Reelfx is a real-time layer compositor with multi-pass shader effects for video editing.
//!
//! A [`FrameRenderer`] owns a [`GpuContext`], a list of [`Layer`]s, and an [`EffectRegistry`].
//! Each call to [`FrameRenderer::render_at_time`] resolves keyframed layer properties at the
//! requested time, runs every layer's effect chain through ping-pong render targets, and
//! composites the layers back to front with one of fourteen [`BlendMode`]s.
//!
//! - [`RecordingGpu`] is a headless backend for tests and dry runs.
//! - `GlowGpu` (feature `gl`) drives OpenGL ES 3 / WebGL2 through `glow`.
//! - Scenes can be described in JSON and loaded with [`SceneDesc`].
#![deny(unsafe_code)]
#![deny(missing_docs)]

mod animation;
mod engine;
mod foundation;
mod gpu;
mod render;
mod scene;
mod shader;
mod transform;

pub use crate::foundation::core::{Canvas, Rgba, Transform, Vec2, Vec3};
pub use crate::foundation::error::{ReelfxError, ReelfxResult, ShaderStage};

pub use crate::animation::ease::{CubicBezier, Easing};
pub use crate::animation::keyframe::{
    InterpolationMode, Keyframe, apply_keyframes, evaluate, sort_keyframes,
};
pub use crate::animation::value::{Value, interpolate};

pub use crate::transform::matrix::Mat4;
pub use crate::transform::stack::MatrixStack;

#[cfg(feature = "gl")]
pub use crate::gpu::GlowGpu;
pub use crate::gpu::{
    BlendFactor, BlendFunc, BufferId, FramebufferId, FramebufferStatus, GpuCommand, GpuContext,
    PixelSource, ProgramId, RecordingGpu, RenderbufferId, ResourceCounts, ShaderId, TextureDesc,
    TextureFormat, TextureId, UniformLocation,
};

pub use crate::shader::effect::{
    EffectCategory, EffectRegistry, Preset, ProgramState, ShaderEffect,
};
pub use crate::shader::program::{ShaderProgram, ShaderProgramManager};
pub use crate::shader::sources::{FULLSCREEN_VERTEX, LAYER_VERTEX, blend_fragment, effect_fragment};
pub use crate::shader::uniform::{UniformDescriptor, UniformType, UniformValue};

pub use crate::render::blend::{BlendCompositor, BlendMode};
pub use crate::render::pipeline::{EffectPipeline, PassContext, RenderPass};
pub use crate::render::quad::{FullscreenQuad, QUAD_VERTICES};
pub use crate::render::readback::{FrameRGBA, flip_rows};
pub use crate::render::target::{RenderTarget, RenderTargetManager};

pub use crate::scene::desc::{SceneDesc, SceneLayer};
pub use crate::scene::layer::{Effect, Layer, LayerId, LayerKind, LayerUpdate, ResolvedLayer};
pub use crate::scene::settings::{
    BitDepth, ColorSpace, Quality, RenderSettings, RenderSettingsPatch, SettingsChange,
};

pub use crate::engine::renderer::{FrameRenderer, RenderOutcome, RenderState, RenderStats};

pub(crate) mod context;
#[cfg(feature = "gl")]
pub(crate) mod gl;
pub(crate) mod recording;

pub use context::{
    BlendFactor, BlendFunc, BufferId, FramebufferId, FramebufferStatus, GpuContext, PixelSource,
    ProgramId, RenderbufferId, ShaderId, TextureDesc, TextureFormat, TextureId, UniformLocation,
};
#[cfg(feature = "gl")]
pub use gl::GlowGpu;
pub use recording::{GpuCommand, RecordingGpu, ResourceCounts};

//! The GPU command surface the compositor drives.
//!
//! [`GpuContext`] is a deliberately small, GL-shaped interface over opaque handles. The engine
//! issues every command from one thread in submission order; implementations never reorder.

use crate::{
    foundation::core::Rgba,
    foundation::error::{ReelfxError, ReelfxResult, ShaderStage},
    shader::uniform::UniformValue,
};

macro_rules! handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub u32);
    };
}

handle!(
    /// Compiled shader stage.
    ShaderId
);
handle!(
    /// Linked shader program.
    ProgramId
);
handle!(
    /// 2D RGBA texture.
    TextureId
);
handle!(
    /// Framebuffer object.
    FramebufferId
);
handle!(
    /// Depth renderbuffer.
    RenderbufferId
);
handle!(
    /// Vertex buffer.
    BufferId
);
handle!(
    /// Uniform location inside one program.
    UniformLocation
);

/// Storage format of colour textures.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum TextureFormat {
    /// 8 bits per channel, unsigned normalized.
    #[default]
    Rgba8,
    /// 16-bit float per channel.
    Rgba16F,
}

impl TextureFormat {
    /// Bytes per pixel.
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Rgba8 => 4,
            Self::Rgba16F => 8,
        }
    }
}

/// Colour texture allocation request. Filtering is always linear and wrapping clamp-to-edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextureDesc {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Storage format.
    pub format: TextureFormat,
}

/// Result of a framebuffer completeness check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FramebufferStatus {
    /// Ready for rendering.
    Complete,
    /// An attachment is missing or malformed.
    IncompleteAttachment,
    /// No attachments at all.
    MissingAttachment,
    /// Attachments disagree in size.
    IncompleteDimensions,
    /// Format combination unsupported by the driver.
    Unsupported,
    /// Any other driver status code.
    Other(u32),
}

/// Fixed-function blend factor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BlendFactor {
    /// `0`.
    Zero,
    /// `1`.
    One,
    /// Source alpha.
    SrcAlpha,
    /// `1 − source alpha`.
    OneMinusSrcAlpha,
    /// Source colour.
    SrcColor,
    /// `1 − source colour`.
    OneMinusSrcColor,
    /// Destination colour.
    DstColor,
}

/// Fixed-function blend equation `src · S + dst · D`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BlendFunc {
    /// Source factor.
    pub src: BlendFactor,
    /// Destination factor.
    pub dst: BlendFactor,
}

/// Borrowed, tightly packed, top-down RGBA8 pixels from a decoded frame or image.
#[derive(Clone, Copy, Debug)]
pub struct PixelSource<'a> {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// `width * height * 4` bytes.
    pub rgba: &'a [u8],
}

impl<'a> PixelSource<'a> {
    /// Wrap a buffer, checking its length against the dimensions.
    pub fn new(width: u32, height: u32, rgba: &'a [u8]) -> ReelfxResult<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|v| v.checked_mul(4))
            .ok_or_else(|| ReelfxError::validation("pixel source size overflow"))?;
        if width == 0 || height == 0 {
            return Err(ReelfxError::validation("pixel source must not be empty"));
        }
        if rgba.len() != expected {
            return Err(ReelfxError::validation(format!(
                "pixel source expects {expected} bytes for {width}x{height}, got {}",
                rgba.len()
            )));
        }
        Ok(Self {
            width,
            height,
            rgba,
        })
    }
}

impl<'a> From<&'a image::RgbaImage> for PixelSource<'a> {
    fn from(img: &'a image::RgbaImage) -> Self {
        Self {
            width: img.width(),
            height: img.height(),
            rgba: img.as_raw(),
        }
    }
}

/// GL-style command interface.
///
/// Creation calls fail with [`ReelfxError::Gpu`] when the context is lost or out of resources.
/// Every other call is infallible at this level; diagnostics come back through the status and
/// info-log queries.
pub trait GpuContext {
    /// Allocate an empty shader object for `stage`.
    fn create_shader(&mut self, stage: ShaderStage) -> ReelfxResult<ShaderId>;
    /// Replace the shader's source text.
    fn shader_source(&mut self, shader: ShaderId, source: &str);
    /// Compile; returns the compile status.
    fn compile_shader(&mut self, shader: ShaderId) -> bool;
    /// Compiler diagnostics for the last compile.
    fn shader_info_log(&self, shader: ShaderId) -> String;
    /// Release a shader object.
    fn delete_shader(&mut self, shader: ShaderId);

    /// Allocate an empty program object.
    fn create_program(&mut self) -> ReelfxResult<ProgramId>;
    /// Attach a compiled stage.
    fn attach_shader(&mut self, program: ProgramId, shader: ShaderId);
    /// Detach a stage after linking.
    fn detach_shader(&mut self, program: ProgramId, shader: ShaderId);
    /// Link; returns the link status.
    fn link_program(&mut self, program: ProgramId) -> bool;
    /// Linker diagnostics for the last link.
    fn program_info_log(&self, program: ProgramId) -> String;
    /// Names of the uniforms the linker kept.
    fn active_uniforms(&self, program: ProgramId) -> Vec<String>;
    /// Names of the vertex attributes the linker kept.
    fn active_attributes(&self, program: ProgramId) -> Vec<String>;
    /// Location of an active uniform.
    fn uniform_location(&mut self, program: ProgramId, name: &str) -> Option<UniformLocation>;
    /// Location of an active vertex attribute.
    fn attribute_location(&mut self, program: ProgramId, name: &str) -> Option<u32>;
    /// Make `program` current (`None` unbinds).
    fn use_program(&mut self, program: Option<ProgramId>);
    /// Set a uniform of the current program.
    fn set_uniform(&mut self, location: UniformLocation, value: &UniformValue);
    /// Release a program object.
    fn delete_program(&mut self, program: ProgramId);

    /// Allocate colour texture storage (linear filtering, clamp-to-edge).
    fn create_texture(&mut self, desc: &TextureDesc) -> ReelfxResult<TextureId>;
    /// Respecify `texture` as 8-bit RGBA with the source's size and pixels.
    fn upload_texture(&mut self, texture: TextureId, source: &PixelSource<'_>);
    /// Reallocate storage in place; contents become undefined.
    fn resize_texture(&mut self, texture: TextureId, width: u32, height: u32);
    /// Bind `texture` to sampler unit `unit`.
    fn bind_texture(&mut self, unit: u32, texture: Option<TextureId>);
    /// Release a texture.
    fn delete_texture(&mut self, texture: TextureId);

    /// Allocate a framebuffer object.
    fn create_framebuffer(&mut self) -> ReelfxResult<FramebufferId>;
    /// Attach `texture` as colour attachment 0.
    fn attach_color_texture(&mut self, framebuffer: FramebufferId, texture: TextureId);
    /// Allocate a depth renderbuffer.
    fn create_depth_buffer(&mut self, width: u32, height: u32) -> ReelfxResult<RenderbufferId>;
    /// Reallocate depth storage in place.
    fn resize_depth_buffer(&mut self, depth: RenderbufferId, width: u32, height: u32);
    /// Attach `depth` as the depth attachment.
    fn attach_depth_buffer(&mut self, framebuffer: FramebufferId, depth: RenderbufferId);
    /// Completeness of `framebuffer`.
    fn framebuffer_status(&mut self, framebuffer: FramebufferId) -> FramebufferStatus;
    /// Bind a framebuffer for drawing and reading (`None` is the default/screen target).
    fn bind_framebuffer(&mut self, framebuffer: Option<FramebufferId>);
    /// Copy the colour contents of `src` into `dst`.
    fn blit_framebuffer(
        &mut self,
        src: FramebufferId,
        dst: FramebufferId,
        width: u32,
        height: u32,
    );
    /// Release a framebuffer object; attachments are not released.
    fn delete_framebuffer(&mut self, framebuffer: FramebufferId);
    /// Release a depth renderbuffer.
    fn delete_depth_buffer(&mut self, depth: RenderbufferId);

    /// Set the viewport to `(0, 0, width, height)`.
    fn viewport(&mut self, width: u32, height: u32);
    /// Clear the bound framebuffer's colour (and optionally depth).
    fn clear(&mut self, color: Rgba, depth: bool);
    /// Enable fixed-function blending with `func`, or disable it.
    fn set_blend(&mut self, func: Option<BlendFunc>);

    /// Upload a static vertex buffer of `f32`s.
    fn create_vertex_buffer(&mut self, data: &[f32]) -> ReelfxResult<BufferId>;
    /// Point attribute `location` at `buffer` with `components` floats per vertex.
    fn bind_vertex_attribute(&mut self, buffer: BufferId, location: u32, components: u32);
    /// Release a vertex buffer.
    fn delete_buffer(&mut self, buffer: BufferId);
    /// Draw `count` vertices as a triangle strip.
    fn draw_triangle_strip(&mut self, first: u32, count: u32);

    /// Read RGBA8 pixels from the bound framebuffer, bottom row first.
    fn read_pixels(&mut self, width: u32, height: u32) -> ReelfxResult<Vec<u8>>;
}

#[cfg(test)]
#[path = "../../tests/unit/gpu/context.rs"]
mod tests;

//! OpenGL / WebGL2 backend over `glow`.
//!
//! Handles are crate-side `u32`s mapped to the driver objects, so the engine never sees backend
//! types. The caller owns the GL context and must keep it current on this thread.
#![allow(unsafe_code)]

use std::collections::HashMap;

use glow::HasContext;

use crate::{
    foundation::core::Rgba,
    foundation::error::{ReelfxError, ReelfxResult, ShaderStage},
    gpu::context::{
        BlendFactor, BlendFunc, BufferId, FramebufferId, FramebufferStatus, GpuContext,
        PixelSource, ProgramId, RenderbufferId, ShaderId, TextureDesc, TextureFormat, TextureId,
        UniformLocation,
    },
    shader::uniform::UniformValue,
};

/// [`GpuContext`] implementation driving a `glow::Context`.
pub struct GlowGpu {
    gl: glow::Context,
    vao: Option<glow::VertexArray>,
    next_handle: u32,
    shaders: HashMap<ShaderId, glow::Shader>,
    programs: HashMap<ProgramId, glow::Program>,
    textures: HashMap<TextureId, (glow::Texture, TextureFormat)>,
    framebuffers: HashMap<FramebufferId, glow::Framebuffer>,
    depth_buffers: HashMap<RenderbufferId, glow::Renderbuffer>,
    buffers: HashMap<BufferId, glow::Buffer>,
    locations: HashMap<UniformLocation, (ProgramId, glow::UniformLocation)>,
}

impl std::fmt::Debug for GlowGpu {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlowGpu")
            .field("programs", &self.programs.len())
            .field("textures", &self.textures.len())
            .field("framebuffers", &self.framebuffers.len())
            .finish_non_exhaustive()
    }
}

fn gl_err(what: &str, err: String) -> ReelfxError {
    ReelfxError::gpu(format!("{what} failed: {err}"))
}

fn factor(f: BlendFactor) -> u32 {
    match f {
        BlendFactor::Zero => glow::ZERO,
        BlendFactor::One => glow::ONE,
        BlendFactor::SrcAlpha => glow::SRC_ALPHA,
        BlendFactor::OneMinusSrcAlpha => glow::ONE_MINUS_SRC_ALPHA,
        BlendFactor::SrcColor => glow::SRC_COLOR,
        BlendFactor::OneMinusSrcColor => glow::ONE_MINUS_SRC_COLOR,
        BlendFactor::DstColor => glow::DST_COLOR,
    }
}

fn storage(format: TextureFormat) -> (i32, u32) {
    match format {
        TextureFormat::Rgba8 => (glow::RGBA8 as i32, glow::UNSIGNED_BYTE),
        TextureFormat::Rgba16F => (glow::RGBA16F as i32, glow::HALF_FLOAT),
    }
}

fn dim(v: u32) -> i32 {
    i32::try_from(v).unwrap_or(i32::MAX)
}

impl GlowGpu {
    /// Wrap a current context. Creates the vertex array object GL ES 3 requires for drawing.
    pub fn new(gl: glow::Context) -> ReelfxResult<Self> {
        let vao = unsafe {
            let vao = gl
                .create_vertex_array()
                .map_err(|e| gl_err("create_vertex_array", e))?;
            gl.bind_vertex_array(Some(vao));
            vao
        };
        Ok(Self {
            gl,
            vao: Some(vao),
            next_handle: 0,
            shaders: HashMap::new(),
            programs: HashMap::new(),
            textures: HashMap::new(),
            framebuffers: HashMap::new(),
            depth_buffers: HashMap::new(),
            buffers: HashMap::new(),
            locations: HashMap::new(),
        })
    }

    /// Release the vertex array object and hand the context back.
    pub fn into_inner(mut self) -> glow::Context {
        if let Some(vao) = self.vao.take() {
            unsafe {
                self.gl.bind_vertex_array(None);
                self.gl.delete_vertex_array(vao);
            }
        }
        self.gl
    }

    fn next(&mut self) -> u32 {
        self.next_handle += 1;
        self.next_handle
    }

    fn texture_params(&self) {
        unsafe {
            let gl = &self.gl;
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MIN_FILTER, glow::LINEAR as i32);
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MAG_FILTER, glow::LINEAR as i32);
            gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_WRAP_S,
                glow::CLAMP_TO_EDGE as i32,
            );
            gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_WRAP_T,
                glow::CLAMP_TO_EDGE as i32,
            );
        }
    }
}

impl GpuContext for GlowGpu {
    fn create_shader(&mut self, stage: ShaderStage) -> ReelfxResult<ShaderId> {
        let kind = match stage {
            ShaderStage::Vertex => glow::VERTEX_SHADER,
            ShaderStage::Fragment => glow::FRAGMENT_SHADER,
        };
        let raw = unsafe { self.gl.create_shader(kind) }.map_err(|e| gl_err("create_shader", e))?;
        let id = ShaderId(self.next());
        self.shaders.insert(id, raw);
        Ok(id)
    }

    fn shader_source(&mut self, shader: ShaderId, source: &str) {
        if let Some(raw) = self.shaders.get(&shader) {
            unsafe { self.gl.shader_source(*raw, source) };
        }
    }

    fn compile_shader(&mut self, shader: ShaderId) -> bool {
        let Some(raw) = self.shaders.get(&shader) else {
            return false;
        };
        unsafe {
            self.gl.compile_shader(*raw);
            self.gl.get_shader_compile_status(*raw)
        }
    }

    fn shader_info_log(&self, shader: ShaderId) -> String {
        self.shaders
            .get(&shader)
            .map(|raw| unsafe { self.gl.get_shader_info_log(*raw) })
            .unwrap_or_default()
    }

    fn delete_shader(&mut self, shader: ShaderId) {
        if let Some(raw) = self.shaders.remove(&shader) {
            unsafe { self.gl.delete_shader(raw) };
        }
    }

    fn create_program(&mut self) -> ReelfxResult<ProgramId> {
        let raw = unsafe { self.gl.create_program() }.map_err(|e| gl_err("create_program", e))?;
        let id = ProgramId(self.next());
        self.programs.insert(id, raw);
        Ok(id)
    }

    fn attach_shader(&mut self, program: ProgramId, shader: ShaderId) {
        if let (Some(p), Some(s)) = (self.programs.get(&program), self.shaders.get(&shader)) {
            unsafe { self.gl.attach_shader(*p, *s) };
        }
    }

    fn detach_shader(&mut self, program: ProgramId, shader: ShaderId) {
        if let (Some(p), Some(s)) = (self.programs.get(&program), self.shaders.get(&shader)) {
            unsafe { self.gl.detach_shader(*p, *s) };
        }
    }

    fn link_program(&mut self, program: ProgramId) -> bool {
        let Some(raw) = self.programs.get(&program) else {
            return false;
        };
        unsafe {
            self.gl.link_program(*raw);
            self.gl.get_program_link_status(*raw)
        }
    }

    fn program_info_log(&self, program: ProgramId) -> String {
        self.programs
            .get(&program)
            .map(|raw| unsafe { self.gl.get_program_info_log(*raw) })
            .unwrap_or_default()
    }

    fn active_uniforms(&self, program: ProgramId) -> Vec<String> {
        let Some(raw) = self.programs.get(&program) else {
            return Vec::new();
        };
        unsafe {
            let count = self.gl.get_active_uniforms(*raw);
            (0..count)
                .filter_map(|i| self.gl.get_active_uniform(*raw, i))
                .map(|u| u.name)
                .collect()
        }
    }

    fn active_attributes(&self, program: ProgramId) -> Vec<String> {
        let Some(raw) = self.programs.get(&program) else {
            return Vec::new();
        };
        unsafe {
            let count = self.gl.get_active_attributes(*raw);
            (0..count)
                .filter_map(|i| self.gl.get_active_attribute(*raw, i))
                .map(|a| a.name)
                .collect()
        }
    }

    fn uniform_location(&mut self, program: ProgramId, name: &str) -> Option<UniformLocation> {
        let raw = *self.programs.get(&program)?;
        let loc = unsafe { self.gl.get_uniform_location(raw, name) }?;
        let id = UniformLocation(self.next());
        self.locations.insert(id, (program, loc));
        Some(id)
    }

    fn attribute_location(&mut self, program: ProgramId, name: &str) -> Option<u32> {
        let raw = self.programs.get(&program)?;
        unsafe { self.gl.get_attrib_location(*raw, name) }
    }

    fn use_program(&mut self, program: Option<ProgramId>) {
        let raw = program.and_then(|p| self.programs.get(&p).copied());
        unsafe { self.gl.use_program(raw) };
    }

    fn set_uniform(&mut self, location: UniformLocation, value: &UniformValue) {
        let Some((_, loc)) = self.locations.get(&location) else {
            return;
        };
        let loc = Some(loc);
        unsafe {
            let gl = &self.gl;
            match value {
                UniformValue::Float(v) => gl.uniform_1_f32(loc, *v),
                UniformValue::Vec2(v) => gl.uniform_2_f32(loc, v[0], v[1]),
                UniformValue::Vec3(v) => gl.uniform_3_f32(loc, v[0], v[1], v[2]),
                UniformValue::Vec4(v) => gl.uniform_4_f32(loc, v[0], v[1], v[2], v[3]),
                UniformValue::Int(v) => gl.uniform_1_i32(loc, *v),
                UniformValue::Bool(v) => gl.uniform_1_i32(loc, i32::from(*v)),
                UniformValue::Mat4(m) => gl.uniform_matrix_4_f32_slice(loc, false, m),
                UniformValue::Sampler(unit) => gl.uniform_1_i32(loc, dim(*unit)),
            }
        }
    }

    fn delete_program(&mut self, program: ProgramId) {
        if let Some(raw) = self.programs.remove(&program) {
            unsafe { self.gl.delete_program(raw) };
        }
        self.locations.retain(|_, (p, _)| *p != program);
    }

    fn create_texture(&mut self, desc: &TextureDesc) -> ReelfxResult<TextureId> {
        let raw = unsafe { self.gl.create_texture() }.map_err(|e| gl_err("create_texture", e))?;
        let (internal, ty) = storage(desc.format);
        unsafe {
            self.gl.bind_texture(glow::TEXTURE_2D, Some(raw));
            self.texture_params();
            self.gl.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                internal,
                dim(desc.width),
                dim(desc.height),
                0,
                glow::RGBA,
                ty,
                None,
            );
            self.gl.bind_texture(glow::TEXTURE_2D, None);
        }
        let id = TextureId(self.next());
        self.textures.insert(id, (raw, desc.format));
        Ok(id)
    }

    fn upload_texture(&mut self, texture: TextureId, source: &PixelSource<'_>) {
        let Some((raw, format)) = self.textures.get_mut(&texture) else {
            return;
        };
        *format = TextureFormat::Rgba8;
        let raw = *raw;
        unsafe {
            self.gl.bind_texture(glow::TEXTURE_2D, Some(raw));
            self.gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, 1);
            self.gl.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                glow::RGBA8 as i32,
                dim(source.width),
                dim(source.height),
                0,
                glow::RGBA,
                glow::UNSIGNED_BYTE,
                Some(source.rgba),
            );
            self.texture_params();
            self.gl.bind_texture(glow::TEXTURE_2D, None);
        }
    }

    fn resize_texture(&mut self, texture: TextureId, width: u32, height: u32) {
        let Some((raw, format)) = self.textures.get(&texture).copied() else {
            return;
        };
        let (internal, ty) = storage(format);
        unsafe {
            self.gl.bind_texture(glow::TEXTURE_2D, Some(raw));
            self.gl.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                internal,
                dim(width),
                dim(height),
                0,
                glow::RGBA,
                ty,
                None,
            );
            self.gl.bind_texture(glow::TEXTURE_2D, None);
        }
    }

    fn bind_texture(&mut self, unit: u32, texture: Option<TextureId>) {
        let raw = texture.and_then(|t| self.textures.get(&t).map(|(raw, _)| *raw));
        unsafe {
            self.gl.active_texture(glow::TEXTURE0 + unit);
            self.gl.bind_texture(glow::TEXTURE_2D, raw);
        }
    }

    fn delete_texture(&mut self, texture: TextureId) {
        if let Some((raw, _)) = self.textures.remove(&texture) {
            unsafe { self.gl.delete_texture(raw) };
        }
    }

    fn create_framebuffer(&mut self) -> ReelfxResult<FramebufferId> {
        let raw =
            unsafe { self.gl.create_framebuffer() }.map_err(|e| gl_err("create_framebuffer", e))?;
        let id = FramebufferId(self.next());
        self.framebuffers.insert(id, raw);
        Ok(id)
    }

    fn attach_color_texture(&mut self, framebuffer: FramebufferId, texture: TextureId) {
        let (Some(fb), Some(tex)) = (
            self.framebuffers.get(&framebuffer).copied(),
            self.textures.get(&texture).map(|(raw, _)| *raw),
        ) else {
            return;
        };
        unsafe {
            self.gl.bind_framebuffer(glow::FRAMEBUFFER, Some(fb));
            self.gl.framebuffer_texture_2d(
                glow::FRAMEBUFFER,
                glow::COLOR_ATTACHMENT0,
                glow::TEXTURE_2D,
                Some(tex),
                0,
            );
            self.gl.bind_framebuffer(glow::FRAMEBUFFER, None);
        }
    }

    fn create_depth_buffer(&mut self, width: u32, height: u32) -> ReelfxResult<RenderbufferId> {
        let raw = unsafe { self.gl.create_renderbuffer() }
            .map_err(|e| gl_err("create_renderbuffer", e))?;
        unsafe {
            self.gl.bind_renderbuffer(glow::RENDERBUFFER, Some(raw));
            self.gl.renderbuffer_storage(
                glow::RENDERBUFFER,
                glow::DEPTH_COMPONENT16,
                dim(width),
                dim(height),
            );
            self.gl.bind_renderbuffer(glow::RENDERBUFFER, None);
        }
        let id = RenderbufferId(self.next());
        self.depth_buffers.insert(id, raw);
        Ok(id)
    }

    fn resize_depth_buffer(&mut self, depth: RenderbufferId, width: u32, height: u32) {
        let Some(raw) = self.depth_buffers.get(&depth).copied() else {
            return;
        };
        unsafe {
            self.gl.bind_renderbuffer(glow::RENDERBUFFER, Some(raw));
            self.gl.renderbuffer_storage(
                glow::RENDERBUFFER,
                glow::DEPTH_COMPONENT16,
                dim(width),
                dim(height),
            );
            self.gl.bind_renderbuffer(glow::RENDERBUFFER, None);
        }
    }

    fn attach_depth_buffer(&mut self, framebuffer: FramebufferId, depth: RenderbufferId) {
        let (Some(fb), Some(rb)) = (
            self.framebuffers.get(&framebuffer).copied(),
            self.depth_buffers.get(&depth).copied(),
        ) else {
            return;
        };
        unsafe {
            self.gl.bind_framebuffer(glow::FRAMEBUFFER, Some(fb));
            self.gl.framebuffer_renderbuffer(
                glow::FRAMEBUFFER,
                glow::DEPTH_ATTACHMENT,
                glow::RENDERBUFFER,
                Some(rb),
            );
            self.gl.bind_framebuffer(glow::FRAMEBUFFER, None);
        }
    }

    fn framebuffer_status(&mut self, framebuffer: FramebufferId) -> FramebufferStatus {
        let Some(fb) = self.framebuffers.get(&framebuffer).copied() else {
            return FramebufferStatus::Other(0);
        };
        let status = unsafe {
            self.gl.bind_framebuffer(glow::FRAMEBUFFER, Some(fb));
            let s = self.gl.check_framebuffer_status(glow::FRAMEBUFFER);
            self.gl.bind_framebuffer(glow::FRAMEBUFFER, None);
            s
        };
        match status {
            glow::FRAMEBUFFER_COMPLETE => FramebufferStatus::Complete,
            glow::FRAMEBUFFER_INCOMPLETE_ATTACHMENT => FramebufferStatus::IncompleteAttachment,
            glow::FRAMEBUFFER_INCOMPLETE_MISSING_ATTACHMENT => {
                FramebufferStatus::MissingAttachment
            }
            glow::FRAMEBUFFER_INCOMPLETE_DIMENSIONS => FramebufferStatus::IncompleteDimensions,
            glow::FRAMEBUFFER_UNSUPPORTED => FramebufferStatus::Unsupported,
            other => FramebufferStatus::Other(other),
        }
    }

    fn bind_framebuffer(&mut self, framebuffer: Option<FramebufferId>) {
        let raw = framebuffer.and_then(|f| self.framebuffers.get(&f).copied());
        unsafe { self.gl.bind_framebuffer(glow::FRAMEBUFFER, raw) };
    }

    fn blit_framebuffer(
        &mut self,
        src: FramebufferId,
        dst: FramebufferId,
        width: u32,
        height: u32,
    ) {
        let (Some(s), Some(d)) = (
            self.framebuffers.get(&src).copied(),
            self.framebuffers.get(&dst).copied(),
        ) else {
            return;
        };
        let (w, h) = (dim(width), dim(height));
        unsafe {
            self.gl.bind_framebuffer(glow::READ_FRAMEBUFFER, Some(s));
            self.gl.bind_framebuffer(glow::DRAW_FRAMEBUFFER, Some(d));
            self.gl.blit_framebuffer(
                0,
                0,
                w,
                h,
                0,
                0,
                w,
                h,
                glow::COLOR_BUFFER_BIT,
                glow::NEAREST,
            );
            self.gl.bind_framebuffer(glow::READ_FRAMEBUFFER, None);
            self.gl.bind_framebuffer(glow::DRAW_FRAMEBUFFER, None);
        }
    }

    fn delete_framebuffer(&mut self, framebuffer: FramebufferId) {
        if let Some(raw) = self.framebuffers.remove(&framebuffer) {
            unsafe { self.gl.delete_framebuffer(raw) };
        }
    }

    fn delete_depth_buffer(&mut self, depth: RenderbufferId) {
        if let Some(raw) = self.depth_buffers.remove(&depth) {
            unsafe { self.gl.delete_renderbuffer(raw) };
        }
    }

    fn viewport(&mut self, width: u32, height: u32) {
        unsafe { self.gl.viewport(0, 0, dim(width), dim(height)) };
    }

    fn clear(&mut self, color: Rgba, depth: bool) {
        let mut mask = glow::COLOR_BUFFER_BIT;
        if depth {
            mask |= glow::DEPTH_BUFFER_BIT;
        }
        unsafe {
            self.gl.clear_color(color.r, color.g, color.b, color.a);
            self.gl.clear(mask);
        }
    }

    fn set_blend(&mut self, func: Option<BlendFunc>) {
        unsafe {
            match func {
                Some(f) => {
                    self.gl.enable(glow::BLEND);
                    self.gl.blend_func(factor(f.src), factor(f.dst));
                }
                None => self.gl.disable(glow::BLEND),
            }
        }
    }

    fn create_vertex_buffer(&mut self, data: &[f32]) -> ReelfxResult<BufferId> {
        let raw = unsafe { self.gl.create_buffer() }.map_err(|e| gl_err("create_buffer", e))?;
        let bytes: Vec<u8> = data.iter().flat_map(|v| v.to_ne_bytes()).collect();
        unsafe {
            self.gl.bind_buffer(glow::ARRAY_BUFFER, Some(raw));
            self.gl
                .buffer_data_u8_slice(glow::ARRAY_BUFFER, &bytes, glow::STATIC_DRAW);
            self.gl.bind_buffer(glow::ARRAY_BUFFER, None);
        }
        let id = BufferId(self.next());
        self.buffers.insert(id, raw);
        Ok(id)
    }

    fn bind_vertex_attribute(&mut self, buffer: BufferId, location: u32, components: u32) {
        let Some(raw) = self.buffers.get(&buffer).copied() else {
            return;
        };
        unsafe {
            self.gl.bind_buffer(glow::ARRAY_BUFFER, Some(raw));
            self.gl.enable_vertex_attrib_array(location);
            self.gl
                .vertex_attrib_pointer_f32(location, dim(components), glow::FLOAT, false, 0, 0);
        }
    }

    fn delete_buffer(&mut self, buffer: BufferId) {
        if let Some(raw) = self.buffers.remove(&buffer) {
            unsafe { self.gl.delete_buffer(raw) };
        }
    }

    fn draw_triangle_strip(&mut self, first: u32, count: u32) {
        unsafe {
            self.gl
                .draw_arrays(glow::TRIANGLE_STRIP, dim(first), dim(count));
        }
    }

    fn read_pixels(&mut self, width: u32, height: u32) -> ReelfxResult<Vec<u8>> {
        let len = (width as usize)
            .checked_mul(height as usize)
            .and_then(|v| v.checked_mul(4))
            .ok_or_else(|| ReelfxError::gpu("readback size overflow"))?;
        let mut out = vec![0u8; len];
        unsafe {
            self.gl.pixel_store_i32(glow::PACK_ALIGNMENT, 1);
            self.gl.read_pixels(
                0,
                0,
                dim(width),
                dim(height),
                glow::RGBA,
                glow::UNSIGNED_BYTE,
                glow::PixelPackData::Slice(&mut out),
            );
        }
        Ok(out)
    }
}

//! Headless [`GpuContext`] that records commands and counts live resources.
//!
//! Shader "compilation" parses the GLSL declarations (`uniform`, `in`/`attribute`) so programs
//! report realistic active uniform and attribute sets. Failures can be injected to exercise the
//! compile, link, framebuffer, and context-loss paths. Readback returns each framebuffer's last
//! clear colour.

use std::collections::{BTreeSet, HashMap};

use crate::{
    foundation::core::Rgba,
    foundation::error::{ReelfxError, ReelfxResult, ShaderStage},
    gpu::context::{
        BlendFunc, BufferId, FramebufferId, FramebufferStatus, GpuContext, PixelSource, ProgramId,
        RenderbufferId, ShaderId, TextureDesc, TextureFormat, TextureId, UniformLocation,
    },
    shader::uniform::UniformValue,
};

/// One recorded command.
#[derive(Clone, Debug, PartialEq)]
pub enum GpuCommand {
    /// A shader stage was compiled.
    CompileShader {
        /// Stage handle.
        shader: ShaderId,
        /// Compile status.
        ok: bool,
    },
    /// A program was linked.
    LinkProgram {
        /// Program handle.
        program: ProgramId,
        /// Link status.
        ok: bool,
    },
    /// Current program changed.
    UseProgram(Option<ProgramId>),
    /// A uniform was set on the current program.
    SetUniform {
        /// Program the location belongs to.
        program: ProgramId,
        /// Uniform name.
        name: String,
        /// Value written.
        value: UniformValue,
    },
    /// A texture was bound to a sampler unit.
    BindTexture {
        /// Sampler unit.
        unit: u32,
        /// Bound texture.
        texture: Option<TextureId>,
    },
    /// Pixels were uploaded into a texture.
    UploadTexture {
        /// Destination texture.
        texture: TextureId,
        /// Source width.
        width: u32,
        /// Source height.
        height: u32,
    },
    /// Texture storage was reallocated.
    ResizeTexture {
        /// Resized texture.
        texture: TextureId,
        /// New width.
        width: u32,
        /// New height.
        height: u32,
    },
    /// Framebuffer binding changed.
    BindFramebuffer(Option<FramebufferId>),
    /// Colour contents copied between framebuffers.
    Blit {
        /// Source framebuffer.
        src: FramebufferId,
        /// Destination framebuffer.
        dst: FramebufferId,
    },
    /// Viewport changed.
    Viewport {
        /// Width.
        width: u32,
        /// Height.
        height: u32,
    },
    /// Bound framebuffer cleared.
    Clear {
        /// Framebuffer that was bound.
        framebuffer: Option<FramebufferId>,
        /// Clear colour.
        color: Rgba,
        /// Whether depth was cleared.
        depth: bool,
    },
    /// Blend state changed.
    SetBlend(Option<BlendFunc>),
    /// A triangle strip was drawn.
    Draw {
        /// Framebuffer that was bound.
        framebuffer: Option<FramebufferId>,
        /// Program that was current.
        program: Option<ProgramId>,
        /// First vertex.
        first: u32,
        /// Vertex count.
        count: u32,
    },
    /// Pixels were read back.
    ReadPixels {
        /// Framebuffer that was bound.
        framebuffer: Option<FramebufferId>,
        /// Width.
        width: u32,
        /// Height.
        height: u32,
    },
}

/// Live resource counts per kind.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ResourceCounts {
    /// Shader stages.
    pub shaders: usize,
    /// Programs.
    pub programs: usize,
    /// Textures.
    pub textures: usize,
    /// Framebuffers.
    pub framebuffers: usize,
    /// Depth renderbuffers.
    pub depth_buffers: usize,
    /// Vertex buffers.
    pub buffers: usize,
}

impl ResourceCounts {
    /// Sum over every kind.
    pub fn total(&self) -> usize {
        self.shaders
            + self.programs
            + self.textures
            + self.framebuffers
            + self.depth_buffers
            + self.buffers
    }
}

#[derive(Debug, Default)]
struct ShaderState {
    stage: Option<ShaderStage>,
    source: String,
    log: String,
}

#[derive(Debug, Default)]
struct ProgramState {
    attached: Vec<ShaderId>,
    linked: bool,
    log: String,
    uniforms: BTreeSet<String>,
    attributes: Vec<String>,
}

#[derive(Debug, Default)]
struct Live {
    shaders: HashMap<ShaderId, ShaderState>,
    programs: HashMap<ProgramId, ProgramState>,
    textures: HashMap<TextureId, TextureDesc>,
    framebuffers: HashMap<FramebufferId, Option<TextureId>>,
    depth_buffers: HashMap<RenderbufferId, (u32, u32)>,
    buffers: HashMap<BufferId, usize>,
}

/// Recording, resource-counting GPU context.
#[derive(Debug, Default)]
pub struct RecordingGpu {
    next_handle: u32,
    live: Live,
    created: ResourceCounts,
    invalid_deletes: usize,

    locations: HashMap<(ProgramId, String), UniformLocation>,
    location_names: HashMap<UniformLocation, (ProgramId, String)>,
    uniform_values: HashMap<(ProgramId, String), UniformValue>,

    current_program: Option<ProgramId>,
    bound_framebuffer: Option<FramebufferId>,
    bound_textures: HashMap<u32, TextureId>,
    clear_colors: HashMap<Option<FramebufferId>, Rgba>,

    compile_failure_marker: Option<String>,
    link_failure_marker: Option<String>,
    incomplete_framebuffers: bool,
    context_lost: bool,

    commands: Vec<GpuCommand>,
}

impl RecordingGpu {
    /// Fresh context with nothing allocated.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every shader whose source contains `marker` fail to compile.
    pub fn fail_compile_containing(&mut self, marker: impl Into<String>) {
        self.compile_failure_marker = Some(marker.into());
    }

    /// Make every program with an attached stage containing `marker` fail to link.
    pub fn fail_link_containing(&mut self, marker: impl Into<String>) {
        self.link_failure_marker = Some(marker.into());
    }

    /// Report every framebuffer as incomplete.
    pub fn set_framebuffers_incomplete(&mut self, incomplete: bool) {
        self.incomplete_framebuffers = incomplete;
    }

    /// Simulate a lost context: every creation call fails.
    pub fn set_context_lost(&mut self, lost: bool) {
        self.context_lost = lost;
    }

    /// Recorded commands in submission order.
    pub fn commands(&self) -> &[GpuCommand] {
        &self.commands
    }

    /// Drop the command log, keeping resource state.
    pub fn clear_commands(&mut self) {
        self.commands.clear();
    }

    /// Resources currently alive.
    pub fn live_resources(&self) -> ResourceCounts {
        ResourceCounts {
            shaders: self.live.shaders.len(),
            programs: self.live.programs.len(),
            textures: self.live.textures.len(),
            framebuffers: self.live.framebuffers.len(),
            depth_buffers: self.live.depth_buffers.len(),
            buffers: self.live.buffers.len(),
        }
    }

    /// Resources created since construction.
    pub fn created_resources(&self) -> ResourceCounts {
        self.created
    }

    /// Deletes of handles that were never created or already deleted.
    pub fn invalid_deletes(&self) -> usize {
        self.invalid_deletes
    }

    /// Whether `texture` is currently allocated.
    pub fn texture_alive(&self, texture: TextureId) -> bool {
        self.live.textures.contains_key(&texture)
    }

    /// Allocation size and format of a live texture.
    pub fn texture_desc(&self, texture: TextureId) -> Option<TextureDesc> {
        self.live.textures.get(&texture).copied()
    }

    /// Currently bound framebuffer.
    pub fn bound_framebuffer(&self) -> Option<FramebufferId> {
        self.bound_framebuffer
    }

    /// Last value written to `name` on `program`.
    pub fn uniform_value(&self, program: ProgramId, name: &str) -> Option<&UniformValue> {
        self.uniform_values.get(&(program, name.to_string()))
    }

    /// Number of recorded draw calls.
    pub fn draw_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, GpuCommand::Draw { .. }))
            .count()
    }

    /// Whether `texture` was bound to any unit in the recorded log.
    pub fn texture_was_bound(&self, texture: TextureId) -> bool {
        self.commands.iter().any(|c| {
            matches!(c, GpuCommand::BindTexture { texture: Some(t), .. } if *t == texture)
        })
    }

    fn next(&mut self) -> u32 {
        self.next_handle += 1;
        self.next_handle
    }

    fn check_alive(&self) -> ReelfxResult<()> {
        if self.context_lost {
            return Err(ReelfxError::gpu("context lost"));
        }
        Ok(())
    }

    fn note_invalid_delete(&mut self, what: &str, id: u32) {
        tracing::warn!(kind = what, id, "delete of unknown handle");
        self.invalid_deletes += 1;
    }
}

// Pull `uniform`/`in`/`attribute` declaration names out of GLSL source.
fn declared_names(source: &str, keywords: &[&str]) -> Vec<String> {
    let mut out = Vec::new();
    for line in source.lines() {
        let line = line.trim();
        let Some(first) = line.split_whitespace().next() else {
            continue;
        };
        if !keywords.contains(&first) || !line.ends_with(';') {
            continue;
        }
        let decl = line.trim_end_matches(';');
        if let Some(name) = decl.split_whitespace().last() {
            let name = name.split('[').next().unwrap_or(name);
            out.push(name.to_string());
        }
    }
    out
}

impl GpuContext for RecordingGpu {
    fn create_shader(&mut self, stage: ShaderStage) -> ReelfxResult<ShaderId> {
        self.check_alive()?;
        let id = ShaderId(self.next());
        self.live.shaders.insert(
            id,
            ShaderState {
                stage: Some(stage),
                ..ShaderState::default()
            },
        );
        self.created.shaders += 1;
        Ok(id)
    }

    fn shader_source(&mut self, shader: ShaderId, source: &str) {
        if let Some(s) = self.live.shaders.get_mut(&shader) {
            s.source = source.to_string();
        }
    }

    fn compile_shader(&mut self, shader: ShaderId) -> bool {
        let marker = self.compile_failure_marker.clone();
        let ok = match self.live.shaders.get_mut(&shader) {
            Some(s) => {
                let failed = marker.as_deref().is_some_and(|m| s.source.contains(m));
                s.log = if failed {
                    "ERROR: 0:1: injected compile failure".to_string()
                } else {
                    String::new()
                };
                !failed
            }
            None => false,
        };
        self.commands.push(GpuCommand::CompileShader { shader, ok });
        ok
    }

    fn shader_info_log(&self, shader: ShaderId) -> String {
        self.live
            .shaders
            .get(&shader)
            .map(|s| s.log.clone())
            .unwrap_or_default()
    }

    fn delete_shader(&mut self, shader: ShaderId) {
        if self.live.shaders.remove(&shader).is_none() {
            self.note_invalid_delete("shader", shader.0);
        }
    }

    fn create_program(&mut self) -> ReelfxResult<ProgramId> {
        self.check_alive()?;
        let id = ProgramId(self.next());
        self.live.programs.insert(id, ProgramState::default());
        self.created.programs += 1;
        Ok(id)
    }

    fn attach_shader(&mut self, program: ProgramId, shader: ShaderId) {
        if let Some(p) = self.live.programs.get_mut(&program) {
            p.attached.push(shader);
        }
    }

    fn detach_shader(&mut self, program: ProgramId, shader: ShaderId) {
        if let Some(p) = self.live.programs.get_mut(&program) {
            p.attached.retain(|s| *s != shader);
        }
    }

    fn link_program(&mut self, program: ProgramId) -> bool {
        let Some(p) = self.live.programs.get(&program) else {
            self.commands
                .push(GpuCommand::LinkProgram { program, ok: false });
            return false;
        };

        let mut uniforms = BTreeSet::new();
        let mut attributes = Vec::new();
        let mut failed = false;
        for sid in &p.attached {
            let Some(s) = self.live.shaders.get(sid) else {
                continue;
            };
            if let Some(marker) = &self.link_failure_marker
                && s.source.contains(marker.as_str())
            {
                failed = true;
            }
            uniforms.extend(declared_names(&s.source, &["uniform"]));
            if s.stage == Some(ShaderStage::Vertex) {
                attributes.extend(declared_names(&s.source, &["in", "attribute"]));
            }
        }

        let ok = !failed;
        if let Some(p) = self.live.programs.get_mut(&program) {
            p.linked = ok;
            if ok {
                p.uniforms = uniforms;
                p.attributes = attributes;
                p.log.clear();
            } else {
                p.log = "ERROR: injected link failure".to_string();
            }
        }
        self.commands.push(GpuCommand::LinkProgram { program, ok });
        ok
    }

    fn program_info_log(&self, program: ProgramId) -> String {
        self.live
            .programs
            .get(&program)
            .map(|p| p.log.clone())
            .unwrap_or_default()
    }

    fn active_uniforms(&self, program: ProgramId) -> Vec<String> {
        self.live
            .programs
            .get(&program)
            .map(|p| p.uniforms.iter().cloned().collect())
            .unwrap_or_default()
    }

    fn active_attributes(&self, program: ProgramId) -> Vec<String> {
        self.live
            .programs
            .get(&program)
            .map(|p| p.attributes.clone())
            .unwrap_or_default()
    }

    fn uniform_location(&mut self, program: ProgramId, name: &str) -> Option<UniformLocation> {
        let known = self
            .live
            .programs
            .get(&program)
            .is_some_and(|p| p.linked && p.uniforms.contains(name));
        if !known {
            return None;
        }
        let key = (program, name.to_string());
        if let Some(loc) = self.locations.get(&key) {
            return Some(*loc);
        }
        let loc = UniformLocation(self.next());
        self.locations.insert(key.clone(), loc);
        self.location_names.insert(loc, key);
        Some(loc)
    }

    fn attribute_location(&mut self, program: ProgramId, name: &str) -> Option<u32> {
        let p = self.live.programs.get(&program)?;
        if !p.linked {
            return None;
        }
        p.attributes
            .iter()
            .position(|a| a == name)
            .and_then(|i| u32::try_from(i).ok())
    }

    fn use_program(&mut self, program: Option<ProgramId>) {
        self.current_program = program;
        self.commands.push(GpuCommand::UseProgram(program));
    }

    fn set_uniform(&mut self, location: UniformLocation, value: &UniformValue) {
        let Some((program, name)) = self.location_names.get(&location).cloned() else {
            return;
        };
        if self.current_program != Some(program) {
            tracing::warn!(%name, "uniform set while its program is not current");
            return;
        }
        self.uniform_values
            .insert((program, name.clone()), value.clone());
        self.commands.push(GpuCommand::SetUniform {
            program,
            name,
            value: value.clone(),
        });
    }

    fn delete_program(&mut self, program: ProgramId) {
        if self.live.programs.remove(&program).is_none() {
            self.note_invalid_delete("program", program.0);
            return;
        }
        if self.current_program == Some(program) {
            self.current_program = None;
        }
        self.locations.retain(|(p, _), _| *p != program);
        self.location_names.retain(|_, (p, _)| *p != program);
        self.uniform_values.retain(|(p, _), _| *p != program);
    }

    fn create_texture(&mut self, desc: &TextureDesc) -> ReelfxResult<TextureId> {
        self.check_alive()?;
        let id = TextureId(self.next());
        self.live.textures.insert(id, *desc);
        self.created.textures += 1;
        Ok(id)
    }

    fn upload_texture(&mut self, texture: TextureId, source: &PixelSource<'_>) {
        if let Some(desc) = self.live.textures.get_mut(&texture) {
            desc.width = source.width;
            desc.height = source.height;
            desc.format = TextureFormat::Rgba8;
        }
        self.commands.push(GpuCommand::UploadTexture {
            texture,
            width: source.width,
            height: source.height,
        });
    }

    fn resize_texture(&mut self, texture: TextureId, width: u32, height: u32) {
        if let Some(desc) = self.live.textures.get_mut(&texture) {
            desc.width = width;
            desc.height = height;
        }
        self.commands.push(GpuCommand::ResizeTexture {
            texture,
            width,
            height,
        });
    }

    fn bind_texture(&mut self, unit: u32, texture: Option<TextureId>) {
        match texture {
            Some(t) => {
                self.bound_textures.insert(unit, t);
            }
            None => {
                self.bound_textures.remove(&unit);
            }
        }
        self.commands.push(GpuCommand::BindTexture { unit, texture });
    }

    fn delete_texture(&mut self, texture: TextureId) {
        if self.live.textures.remove(&texture).is_none() {
            self.note_invalid_delete("texture", texture.0);
        }
        self.bound_textures.retain(|_, t| *t != texture);
    }

    fn create_framebuffer(&mut self) -> ReelfxResult<FramebufferId> {
        self.check_alive()?;
        let id = FramebufferId(self.next());
        self.live.framebuffers.insert(id, None);
        self.created.framebuffers += 1;
        Ok(id)
    }

    fn attach_color_texture(&mut self, framebuffer: FramebufferId, texture: TextureId) {
        if let Some(slot) = self.live.framebuffers.get_mut(&framebuffer) {
            *slot = Some(texture);
        }
    }

    fn create_depth_buffer(&mut self, width: u32, height: u32) -> ReelfxResult<RenderbufferId> {
        self.check_alive()?;
        let id = RenderbufferId(self.next());
        self.live.depth_buffers.insert(id, (width, height));
        self.created.depth_buffers += 1;
        Ok(id)
    }

    fn resize_depth_buffer(&mut self, depth: RenderbufferId, width: u32, height: u32) {
        if let Some(size) = self.live.depth_buffers.get_mut(&depth) {
            *size = (width, height);
        }
    }

    fn attach_depth_buffer(&mut self, _framebuffer: FramebufferId, _depth: RenderbufferId) {}

    fn framebuffer_status(&mut self, framebuffer: FramebufferId) -> FramebufferStatus {
        if self.incomplete_framebuffers {
            return FramebufferStatus::IncompleteAttachment;
        }
        match self.live.framebuffers.get(&framebuffer) {
            Some(Some(tex)) if self.live.textures.contains_key(tex) => FramebufferStatus::Complete,
            Some(_) => FramebufferStatus::MissingAttachment,
            None => FramebufferStatus::Other(0),
        }
    }

    fn bind_framebuffer(&mut self, framebuffer: Option<FramebufferId>) {
        self.bound_framebuffer = framebuffer;
        self.commands.push(GpuCommand::BindFramebuffer(framebuffer));
    }

    fn blit_framebuffer(
        &mut self,
        src: FramebufferId,
        dst: FramebufferId,
        _width: u32,
        _height: u32,
    ) {
        if let Some(c) = self.clear_colors.get(&Some(src)).copied() {
            self.clear_colors.insert(Some(dst), c);
        }
        self.commands.push(GpuCommand::Blit { src, dst });
    }

    fn delete_framebuffer(&mut self, framebuffer: FramebufferId) {
        if self.live.framebuffers.remove(&framebuffer).is_none() {
            self.note_invalid_delete("framebuffer", framebuffer.0);
        }
        if self.bound_framebuffer == Some(framebuffer) {
            self.bound_framebuffer = None;
        }
        self.clear_colors.remove(&Some(framebuffer));
    }

    fn delete_depth_buffer(&mut self, depth: RenderbufferId) {
        if self.live.depth_buffers.remove(&depth).is_none() {
            self.note_invalid_delete("depth buffer", depth.0);
        }
    }

    fn viewport(&mut self, width: u32, height: u32) {
        self.commands.push(GpuCommand::Viewport { width, height });
    }

    fn clear(&mut self, color: Rgba, depth: bool) {
        self.clear_colors.insert(self.bound_framebuffer, color);
        self.commands.push(GpuCommand::Clear {
            framebuffer: self.bound_framebuffer,
            color,
            depth,
        });
    }

    fn set_blend(&mut self, func: Option<BlendFunc>) {
        self.commands.push(GpuCommand::SetBlend(func));
    }

    fn create_vertex_buffer(&mut self, data: &[f32]) -> ReelfxResult<BufferId> {
        self.check_alive()?;
        let id = BufferId(self.next());
        self.live.buffers.insert(id, data.len());
        self.created.buffers += 1;
        Ok(id)
    }

    fn bind_vertex_attribute(&mut self, _buffer: BufferId, _location: u32, _components: u32) {}

    fn delete_buffer(&mut self, buffer: BufferId) {
        if self.live.buffers.remove(&buffer).is_none() {
            self.note_invalid_delete("buffer", buffer.0);
        }
    }

    fn draw_triangle_strip(&mut self, first: u32, count: u32) {
        self.commands.push(GpuCommand::Draw {
            framebuffer: self.bound_framebuffer,
            program: self.current_program,
            first,
            count,
        });
    }

    fn read_pixels(&mut self, width: u32, height: u32) -> ReelfxResult<Vec<u8>> {
        self.check_alive()?;
        let px = self
            .clear_colors
            .get(&self.bound_framebuffer)
            .copied()
            .unwrap_or(Rgba::TRANSPARENT)
            .to_rgba8();
        self.commands.push(GpuCommand::ReadPixels {
            framebuffer: self.bound_framebuffer,
            width,
            height,
        });
        Ok(px.repeat((width as usize) * (height as usize)))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/gpu/recording.rs"]
mod tests;

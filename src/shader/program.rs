use std::collections::HashMap;

use crate::{
    foundation::error::{ReelfxError, ReelfxResult, ShaderStage},
    gpu::context::{GpuContext, ProgramId, ShaderId, UniformLocation},
    shader::uniform::UniformValue,
};

/// A linked program plus its cached uniform and attribute locations.
#[derive(Clone, Debug)]
pub struct ShaderProgram {
    /// Diagnostic label (effect id or blend mode name).
    pub label: String,
    /// Vertex stage source.
    pub vertex_source: String,
    /// Fragment stage source.
    pub fragment_source: String,
    /// Program handle.
    pub handle: ProgramId,
    /// Active uniform name → location.
    pub uniforms: HashMap<String, UniformLocation>,
    /// Active attribute name → location.
    pub attributes: HashMap<String, u32>,
    /// Always `true` for programs held by a manager.
    pub compiled: bool,
}

impl ShaderProgram {
    /// Cached location of an active uniform.
    pub fn uniform(&self, name: &str) -> Option<UniformLocation> {
        self.uniforms.get(name).copied()
    }

    /// Cached location of an active vertex attribute.
    pub fn attribute(&self, name: &str) -> Option<u32> {
        self.attributes.get(name).copied()
    }

    /// Set `name` if the linker kept it. Returns whether the uniform exists.
    ///
    /// The program must be current.
    pub fn set(&self, gpu: &mut dyn GpuContext, name: &str, value: &UniformValue) -> bool {
        match self.uniform(name) {
            Some(loc) => {
                gpu.set_uniform(loc, value);
                true
            }
            None => false,
        }
    }
}

/// Owns every program compiled through it and deletes them on [`ShaderProgramManager::dispose`].
#[derive(Debug, Default)]
pub struct ShaderProgramManager {
    programs: HashMap<ProgramId, ShaderProgram>,
}

impl ShaderProgramManager {
    /// Empty manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live programs.
    pub fn len(&self) -> usize {
        self.programs.len()
    }

    /// `true` when no program is live.
    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }

    /// Compile both stages, link, and cache active locations.
    ///
    /// Stage objects are always released. A failed stage or link releases everything created so
    /// far and returns [`ReelfxError::ShaderCompile`] / [`ReelfxError::ShaderLink`] carrying the
    /// driver log.
    #[tracing::instrument(skip(self, gpu, vertex_source, fragment_source))]
    pub fn compile(
        &mut self,
        gpu: &mut dyn GpuContext,
        label: &str,
        vertex_source: &str,
        fragment_source: &str,
    ) -> ReelfxResult<ProgramId> {
        let vs = compile_stage(gpu, label, ShaderStage::Vertex, vertex_source)?;
        let fs = match compile_stage(gpu, label, ShaderStage::Fragment, fragment_source) {
            Ok(fs) => fs,
            Err(e) => {
                gpu.delete_shader(vs);
                return Err(e);
            }
        };

        let program = match gpu.create_program() {
            Ok(p) => p,
            Err(e) => {
                gpu.delete_shader(vs);
                gpu.delete_shader(fs);
                return Err(e);
            }
        };
        gpu.attach_shader(program, vs);
        gpu.attach_shader(program, fs);
        let linked = gpu.link_program(program);

        gpu.detach_shader(program, vs);
        gpu.detach_shader(program, fs);
        gpu.delete_shader(vs);
        gpu.delete_shader(fs);

        if !linked {
            let log = gpu.program_info_log(program);
            gpu.delete_program(program);
            tracing::warn!(label, %log, "shader program failed to link");
            return Err(ReelfxError::ShaderLink {
                label: label.to_string(),
                log,
            });
        }

        let mut uniforms = HashMap::new();
        for raw in gpu.active_uniforms(program) {
            let name = raw.strip_suffix("[0]").unwrap_or(&raw).to_string();
            if let Some(loc) = gpu.uniform_location(program, &name) {
                uniforms.insert(name, loc);
            }
        }
        let mut attributes = HashMap::new();
        for name in gpu.active_attributes(program) {
            if let Some(loc) = gpu.attribute_location(program, &name) {
                attributes.insert(name, loc);
            }
        }

        tracing::debug!(
            label,
            program = program.0,
            uniforms = uniforms.len(),
            attributes = attributes.len(),
            "compiled shader program"
        );
        self.programs.insert(
            program,
            ShaderProgram {
                label: label.to_string(),
                vertex_source: vertex_source.to_string(),
                fragment_source: fragment_source.to_string(),
                handle: program,
                uniforms,
                attributes,
                compiled: true,
            },
        );
        Ok(program)
    }

    /// Look up a live program.
    pub fn get(&self, program: ProgramId) -> Option<&ShaderProgram> {
        self.programs.get(&program)
    }

    /// Delete one program. Unknown handles are ignored.
    pub fn delete(&mut self, gpu: &mut dyn GpuContext, program: ProgramId) {
        if self.programs.remove(&program).is_some() {
            gpu.delete_program(program);
        }
    }

    /// Delete every live program.
    pub fn dispose(&mut self, gpu: &mut dyn GpuContext) {
        let mut handles: Vec<ProgramId> = self.programs.keys().copied().collect();
        handles.sort();
        for program in handles {
            gpu.delete_program(program);
        }
        self.programs.clear();
    }
}

fn compile_stage(
    gpu: &mut dyn GpuContext,
    label: &str,
    stage: ShaderStage,
    source: &str,
) -> ReelfxResult<ShaderId> {
    let shader = gpu.create_shader(stage)?;
    gpu.shader_source(shader, source);
    if gpu.compile_shader(shader) {
        return Ok(shader);
    }
    let log = gpu.shader_info_log(shader);
    gpu.delete_shader(shader);
    tracing::warn!(label, %stage, %log, "shader stage failed to compile");
    Err(ReelfxError::ShaderCompile {
        stage,
        label: label.to_string(),
        log,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/shader/program.rs"]
mod tests;

use crate::{
    foundation::error::ReelfxResult,
    gpu::context::{BufferId, GpuContext},
    shader::program::ShaderProgram,
};

/// Triangle-strip corners of the `[-1, 1]²` square.
pub const QUAD_VERTICES: [f32; 8] = [-1.0, -1.0, 1.0, -1.0, -1.0, 1.0, 1.0, 1.0];

/// The shared 4-vertex strip every effect and blend program draws.
#[derive(Debug)]
pub struct FullscreenQuad {
    buffer: BufferId,
}

impl FullscreenQuad {
    /// Upload the vertex buffer.
    pub fn new(gpu: &mut dyn GpuContext) -> ReelfxResult<Self> {
        let buffer = gpu.create_vertex_buffer(&QUAD_VERTICES)?;
        Ok(Self { buffer })
    }

    /// Vertex buffer handle.
    pub fn buffer(&self) -> BufferId {
        self.buffer
    }

    /// Bind `a_position` of the current program and draw the strip.
    pub fn draw(&self, gpu: &mut dyn GpuContext, program: &ShaderProgram) {
        if let Some(loc) = program.attribute("a_position") {
            gpu.bind_vertex_attribute(self.buffer, loc, 2);
        }
        gpu.draw_triangle_strip(0, 4);
    }

    /// Release the vertex buffer.
    pub fn dispose(self, gpu: &mut dyn GpuContext) {
        gpu.delete_buffer(self.buffer);
    }
}

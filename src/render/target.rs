use std::collections::BTreeMap;

use crate::{
    foundation::error::{ReelfxError, ReelfxResult},
    gpu::context::{
        FramebufferId, FramebufferStatus, GpuContext, RenderbufferId, TextureDesc, TextureFormat,
        TextureId,
    },
};

/// Off-screen framebuffer with a colour texture and, for the primary target, depth storage.
///
/// Targets are not `Clone`: [`RenderTargetManager::dispose`] consumes the value so it cannot be
/// released twice.
#[derive(Debug, PartialEq, Eq)]
pub struct RenderTarget {
    /// Framebuffer handle.
    pub framebuffer: FramebufferId,
    /// Colour attachment.
    pub texture: TextureId,
    /// Depth attachment, if any.
    pub depth: Option<RenderbufferId>,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Colour storage format.
    pub format: TextureFormat,
}

#[derive(Debug, Clone, Copy)]
struct Outstanding {
    texture: TextureId,
    depth: Option<RenderbufferId>,
}

/// Allocates render targets and tracks every one not yet disposed.
#[derive(Debug, Default)]
pub struct RenderTargetManager {
    outstanding: BTreeMap<FramebufferId, Outstanding>,
}

impl RenderTargetManager {
    /// Manager with nothing outstanding.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of targets created and not yet disposed.
    pub fn outstanding(&self) -> usize {
        self.outstanding.len()
    }

    /// Allocate a complete target.
    ///
    /// An incomplete framebuffer is fatal: everything created for it is released before
    /// returning [`ReelfxError::IncompleteFramebuffer`].
    pub fn create(
        &mut self,
        gpu: &mut dyn GpuContext,
        width: u32,
        height: u32,
        format: TextureFormat,
        with_depth: bool,
    ) -> ReelfxResult<RenderTarget> {
        if width == 0 || height == 0 {
            return Err(ReelfxError::validation(format!(
                "render target must be non-empty, got {width}x{height}"
            )));
        }

        let framebuffer = gpu.create_framebuffer()?;
        let texture = match gpu.create_texture(&TextureDesc {
            width,
            height,
            format,
        }) {
            Ok(t) => t,
            Err(e) => {
                gpu.delete_framebuffer(framebuffer);
                return Err(e);
            }
        };
        gpu.attach_color_texture(framebuffer, texture);

        let depth = if with_depth {
            match gpu.create_depth_buffer(width, height) {
                Ok(d) => {
                    gpu.attach_depth_buffer(framebuffer, d);
                    Some(d)
                }
                Err(e) => {
                    gpu.delete_framebuffer(framebuffer);
                    gpu.delete_texture(texture);
                    return Err(e);
                }
            }
        } else {
            None
        };

        let status = gpu.framebuffer_status(framebuffer);
        if status != FramebufferStatus::Complete {
            gpu.delete_framebuffer(framebuffer);
            gpu.delete_texture(texture);
            if let Some(d) = depth {
                gpu.delete_depth_buffer(d);
            }
            tracing::error!(?status, width, height, "render target incomplete");
            return Err(ReelfxError::IncompleteFramebuffer { status });
        }

        self.outstanding
            .insert(framebuffer, Outstanding { texture, depth });
        tracing::debug!(
            framebuffer = framebuffer.0,
            width,
            height,
            ?format,
            with_depth,
            "created render target"
        );
        Ok(RenderTarget {
            framebuffer,
            texture,
            depth,
            width,
            height,
            format,
        })
    }

    /// Reallocate storage in place. Handles stay the same; contents become undefined.
    pub fn resize(
        &mut self,
        gpu: &mut dyn GpuContext,
        target: &mut RenderTarget,
        width: u32,
        height: u32,
    ) {
        let (width, height) = (width.max(1), height.max(1));
        if (target.width, target.height) == (width, height) {
            return;
        }
        gpu.resize_texture(target.texture, width, height);
        if let Some(d) = target.depth {
            gpu.resize_depth_buffer(d, width, height);
        }
        target.width = width;
        target.height = height;
        tracing::debug!(
            framebuffer = target.framebuffer.0,
            width,
            height,
            "resized render target"
        );
    }

    /// Release one target. Targets already released by [`RenderTargetManager::dispose_all`] are
    /// ignored.
    pub fn dispose(&mut self, gpu: &mut dyn GpuContext, target: RenderTarget) {
        if self.outstanding.remove(&target.framebuffer).is_none() {
            return;
        }
        release(gpu, target.framebuffer, target.texture, target.depth);
        tracing::debug!(framebuffer = target.framebuffer.0, "disposed render target");
    }

    /// Release every outstanding target.
    pub fn dispose_all(&mut self, gpu: &mut dyn GpuContext) {
        let count = self.outstanding.len();
        for (framebuffer, o) in std::mem::take(&mut self.outstanding) {
            release(gpu, framebuffer, o.texture, o.depth);
        }
        if count > 0 {
            tracing::debug!(count, "disposed outstanding render targets");
        }
    }
}

fn release(
    gpu: &mut dyn GpuContext,
    framebuffer: FramebufferId,
    texture: TextureId,
    depth: Option<RenderbufferId>,
) {
    gpu.delete_framebuffer(framebuffer);
    gpu.delete_texture(texture);
    if let Some(d) = depth {
        gpu.delete_depth_buffer(d);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/target.rs"]
mod tests;

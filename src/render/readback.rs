use crate::{
    foundation::error::{ReelfxError, ReelfxResult},
    scene::settings::ColorSpace,
};

/// CPU-side frame copied out of the output target.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, top row first.
    pub data: Vec<u8>,
    /// Whether the `data` is premultiplied alpha.
    pub premultiplied: bool,
    /// Colour space the pixels are encoded in.
    pub color_space: ColorSpace,
}

impl FrameRGBA {
    /// Build a frame from a bottom-up GPU readback.
    pub fn from_gpu_rows(
        width: u32,
        height: u32,
        mut data: Vec<u8>,
        color_space: ColorSpace,
    ) -> ReelfxResult<Self> {
        let expected = (width as usize) * (height as usize) * 4;
        if data.len() != expected {
            return Err(ReelfxError::evaluation(format!(
                "readback returned {} bytes, expected {expected}",
                data.len()
            )));
        }
        flip_rows(&mut data, width as usize * 4);
        Ok(Self {
            width,
            height,
            data,
            premultiplied: false,
            color_space,
        })
    }

    /// RGBA at `(x, y)`, `y` counted from the top.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + x as usize) * 4;
        let px = self.data.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Copy into an `image` buffer.
    pub fn to_image(&self) -> ReelfxResult<image::RgbaImage> {
        image::RgbaImage::from_raw(self.width, self.height, self.data.clone()).ok_or_else(|| {
            ReelfxError::evaluation(format!(
                "frame buffer does not match {}x{}",
                self.width, self.height
            ))
        })
    }
}

/// Reverse row order in place. `stride` is the byte length of one row.
pub fn flip_rows(data: &mut [u8], stride: usize) {
    if stride == 0 {
        return;
    }
    let rows = data.len() / stride;
    for top in 0..rows / 2 {
        let bottom = rows - 1 - top;
        let (head, tail) = data.split_at_mut(bottom * stride);
        head[top * stride..(top + 1) * stride].swap_with_slice(&mut tail[..stride]);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/readback.rs"]
mod tests;

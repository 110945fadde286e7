use std::ptr::NonNull;

use rayon::iter::{IndexedParallelIterator, ParallelIterator};
use rayon::slice::{ParallelSlice, ParallelSliceMut};

use super::RawLock;
use crate::core::{Pixel, PIXEL_BYTES};
use crate::error::{HostError, Result};

/// Row alignment used by the window backend, in bytes.
pub const DEFAULT_ROW_ALIGN: usize = 64;

/// CPU-writable pixel storage, rows padded to a byte alignment like a GPU
/// streaming texture.
pub struct StreamingTexture {
    width: usize,
    height: usize,
    pitch: usize,
    data: Vec<Pixel>,
    locked: bool,
}

impl StreamingTexture {
    /// `row_align` is in bytes and must be a multiple of the pixel size.
    pub fn new(width: usize, height: usize, row_align: usize) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(HostError::Texture(format!("zero sized texture {width}x{height}")));
        }
        if row_align == 0 || row_align % PIXEL_BYTES != 0 {
            return Err(HostError::Texture(format!(
                "row alignment {row_align} is not a multiple of {PIXEL_BYTES} bytes"
            )));
        }
        let row_bytes = width * PIXEL_BYTES;
        let pitch = row_bytes.div_ceil(row_align) * row_align / PIXEL_BYTES;
        Ok(Self {
            width,
            height,
            pitch,
            data: vec![Pixel::BLACK; pitch * height],
            locked: false,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Row stride in pixels.
    pub fn pitch(&self) -> usize {
        self.pitch
    }

    pub fn lock(&mut self) -> Result<RawLock> {
        if self.locked {
            return Err(HostError::Lock("texture is already locked".into()));
        }
        self.locked = true;
        let data = NonNull::new(self.data.as_mut_ptr().cast::<u8>())
            .ok_or_else(|| HostError::Lock("texture storage is null".into()))?;
        Ok(RawLock {
            data,
            byte_len: self.data.len() * PIXEL_BYTES,
            byte_pitch: self.pitch * PIXEL_BYTES,
        })
    }

    pub fn unlock(&mut self) {
        self.locked = false;
    }

    /// Pack the visible part of every row into `surface`.
    pub fn copy_to(&self, surface: &mut Surface) -> Result<()> {
        if self.locked {
            return Err(HostError::Copy("texture is still locked".into()));
        }
        if surface.width != self.width || surface.height != self.height {
            return Err(HostError::Copy(format!(
                "texture {}x{} does not match surface {}x{}",
                self.width, self.height, surface.width, surface.height
            )));
        }
        let width = self.width;
        surface
            .frame
            .par_chunks_mut(width)
            .zip(self.data.par_chunks(self.pitch))
            .for_each(|(dst, src)| {
                for (d, s) in dst.iter_mut().zip(&src[..width]) {
                    *d = s.to_u32();
                }
            });
        Ok(())
    }
}

/// The presentable frame, tightly packed `width * height`.
pub struct Surface {
    width: usize,
    height: usize,
    frame: Vec<u32>,
}

impl Surface {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            frame: vec![0; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn clear(&mut self) {
        self.frame.par_chunks_mut(1024).for_each(|chunk| chunk.fill(0));
    }

    pub fn frame(&self) -> &[u32] {
        &self.frame
    }
}

use std::ptr::NonNull;

use log::trace;

use crate::backend::{Backend, RawLock};
use crate::core::{PixMap, Pixel, PIXEL_BYTES};
use crate::error::{HostError, Result};

/// The locked region as a pixel pointer, if it is aligned for one.
fn pixel_base(data: NonNull<u8>) -> Result<NonNull<Pixel>> {
    if data.as_ptr().align_offset(std::mem::align_of::<Pixel>()) != 0 {
        return Err(HostError::Lock(format!(
            "locked region at {:p} is not {}-byte aligned",
            data.as_ptr(),
            std::mem::align_of::<Pixel>()
        )));
    }
    Ok(data.cast())
}

/// View `len` pixels starting at `data` as a slice, without copying.
///
/// # Safety
/// `data` must point at `len` pixels that are writable, not accessed through
/// any other path, and stay valid for `'a`.
unsafe fn pixels_from_raw<'a>(data: NonNull<Pixel>, len: usize) -> &'a mut [Pixel] {
    // SAFETY: the caller's contract.
    unsafe { std::slice::from_raw_parts_mut(data.as_ptr(), len) }
}

/// Byte pitch to pixel pitch, checked against the locked length.
fn pixel_layout(lock: &RawLock, width: i32, height: i32) -> Result<(i32, usize)> {
    if lock.byte_pitch % PIXEL_BYTES != 0 {
        return Err(HostError::Lock(format!(
            "byte pitch {} is not a whole number of pixels",
            lock.byte_pitch
        )));
    }
    let pitch = lock.byte_pitch / PIXEL_BYTES;
    if pitch < width as usize {
        return Err(HostError::Lock(format!(
            "pitch {pitch} pixels is narrower than the surface width {width}"
        )));
    }
    let len = pitch * height as usize;
    if lock.byte_len < len * PIXEL_BYTES {
        return Err(HostError::Lock(format!(
            "locked {} bytes, need {} for {height} rows",
            lock.byte_len,
            len * PIXEL_BYTES
        )));
    }
    let pitch = i32::try_from(pitch)
        .map_err(|_| HostError::Lock(format!("pitch {pitch} does not fit in i32")))?;
    Ok((pitch, len))
}

/// The backbuffer, locked for one frame. Unlocks on drop.
///
/// Each [`FrameLock::pixmap`] borrows the guard, so no view outlives the unlock:
///
/// ```compile_fail
/// use nimble::backend::HeadlessBackend;
/// use nimble::pipeline::FrameLock;
///
/// let mut backend = HeadlessBackend::new(4, 4).unwrap();
/// let escaped = {
///     let mut lock = FrameLock::acquire(&mut backend, 4, 4).unwrap();
///     lock.pixmap()
/// };
/// escaped.get(0, 0);
/// ```
pub struct FrameLock<'b, B: Backend + ?Sized> {
    backend: &'b mut B,
    data: NonNull<Pixel>,
    len: usize,
    width: i32,
    height: i32,
    pitch: i32,
}

impl<'b, B: Backend + ?Sized> FrameLock<'b, B> {
    pub fn acquire(backend: &'b mut B, width: i32, height: i32) -> Result<Self> {
        let raw = backend.lock_texture()?;
        let layout = pixel_layout(&raw, width, height)
            .and_then(|(pitch, len)| pixel_base(raw.data).map(|data| (data, pitch, len)));
        let (data, pitch, len) = match layout {
            Ok(layout) => layout,
            Err(e) => {
                backend.unlock_texture();
                return Err(e);
            }
        };
        trace!("Locked backbuffer {width}x{height} pitch {pitch}");
        Ok(Self {
            backend,
            data,
            len,
            width,
            height,
            pitch,
        })
    }

    /// View of the locked pixels, valid while the guard is borrowed.
    pub fn pixmap(&mut self) -> PixMap<'_> {
        // SAFETY: `Backend` keeps the region valid and exclusive until
        // `unlock_texture`, which only runs in `drop`. The view holds `self`
        // mutably borrowed, so it is gone by then and never has a twin.
        let pixels = unsafe { pixels_from_raw(self.data, self.len) };
        PixMap::new(self.width, self.height, pixels, self.pitch)
    }
}

impl<B: Backend + ?Sized> Drop for FrameLock<'_, B> {
    fn drop(&mut self) {
        self.backend.unlock_texture();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::headless::Op;
    use crate::backend::HeadlessBackend;

    fn raw(buf: &mut [u32], byte_pitch: usize) -> RawLock {
        RawLock {
            data: NonNull::new(buf.as_mut_ptr().cast::<u8>()).unwrap(),
            byte_len: buf.len() * 4,
            byte_pitch,
        }
    }

    #[test]
    fn byte_pitch_becomes_pixel_pitch() {
        let mut buf = vec![0u32; 16 * 3];
        let (pitch, len) = pixel_layout(&raw(&mut buf, 64), 10, 3).unwrap();
        assert_eq!(pitch, 16);
        assert_eq!(len, 48);
    }

    #[test]
    fn bad_layouts_are_lock_errors() {
        let mut buf = vec![0u32; 16 * 3];
        assert!(matches!(pixel_layout(&raw(&mut buf, 62), 10, 3), Err(HostError::Lock(_))));
        assert!(matches!(pixel_layout(&raw(&mut buf, 32), 10, 3), Err(HostError::Lock(_))));
        assert!(matches!(pixel_layout(&raw(&mut buf, 64), 10, 4), Err(HostError::Lock(_))));
    }

    #[test]
    fn misaligned_region_is_rejected() {
        let mut buf = vec![0u32; 4];
        let base = NonNull::new(buf.as_mut_ptr().cast::<u8>()).unwrap();
        // SAFETY: one byte into a live allocation, never dereferenced.
        let off = unsafe { NonNull::new_unchecked(base.as_ptr().add(1)) };
        assert!(matches!(pixel_base(off), Err(HostError::Lock(_))));
        assert!(pixel_base(base).is_ok());
    }

    #[test]
    fn view_aliases_the_locked_memory() {
        let mut buf = vec![0u32; 4];
        let base = pixel_base(NonNull::new(buf.as_mut_ptr().cast::<u8>()).unwrap()).unwrap();
        {
            let pixels = unsafe { pixels_from_raw(base, 4) };
            pixels[2] = Pixel(0xDEAD_BEEF);
        }
        assert_eq!(buf[2], 0xDEAD_BEEF);
    }

    #[test]
    fn each_view_sees_the_same_locked_pixels() {
        let mut backend = HeadlessBackend::new(4, 2).unwrap();
        let mut lock = FrameLock::acquire(&mut backend, 4, 2).unwrap();
        let first = lock.pixmap().as_ptr();
        lock.pixmap().set(3, 1, Pixel::RED);
        let again = lock.pixmap();
        assert_eq!(again.as_ptr(), first);
        assert_eq!(again.get(3, 1), Some(Pixel::RED));
        assert_eq!(again.pixels().len(), 16 * 2);
    }

    #[test]
    fn guard_unlocks_on_drop() {
        let mut backend = HeadlessBackend::new(10, 2).unwrap();
        let recorder = backend.recorder();
        {
            let mut lock = FrameLock::acquire(&mut backend, 10, 2).unwrap();
            assert_eq!(lock.pixmap().pitch(), 16);
            lock.pixmap().set(0, 0, Pixel::RED);
        }
        // a second lock only succeeds if the first was released
        assert!(FrameLock::acquire(&mut backend, 10, 2).is_ok());
        assert_eq!(
            recorder.lock().ops,
            vec![Op::Lock, Op::Unlock, Op::Lock, Op::Unlock]
        );
    }

    #[test]
    fn failed_layout_still_unlocks() {
        let mut backend = HeadlessBackend::new(4, 2).unwrap();
        // ask for more rows than the texture has
        assert!(FrameLock::acquire(&mut backend, 4, 3).is_err());
        assert!(FrameLock::acquire(&mut backend, 4, 2).is_ok());
    }
}

//! Platform side of the host: window, presentable surface and streaming texture.
//!
//! The frame loop only talks to a [`Backend`]. [`window::WindowBackend`] is the
//! real one (minifb), [`headless::HeadlessBackend`] keeps everything in memory.

use std::ptr::NonNull;

use crate::error::Result;

pub mod headless;
pub mod surface;
pub mod window;

pub use headless::HeadlessBackend;
pub use window::WindowBackend;

/// Input events the host reacts to. Anything else comes through as `Other`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    Quit,
    PointerMotion { x: i32, y: i32 },
    /// Any key, the key code is not reported.
    KeyReleased,
    Other,
}

/// Result of locking the streaming texture.
///
/// `data` points at `byte_len` writable bytes laid out in rows of `byte_pitch`
/// bytes. It stays valid until the matching [`Backend::unlock_texture`].
#[derive(Clone, Copy, Debug)]
pub struct RawLock {
    pub data: NonNull<u8>,
    pub byte_len: usize,
    pub byte_pitch: usize,
}

/// Everything the frame loop needs from a platform.
///
/// Dropping a backend releases texture, surface, window and runtime, in that order.
///
/// # Safety
///
/// The frame loop turns the region returned by [`Backend::lock_texture`] into a
/// `&mut [Pixel]` without copying, so implementors promise that
/// every successful `lock_texture` returns a [`RawLock`] where:
///
/// - `data` points at `byte_len` bytes inside one live allocation, writable and
///   aligned for `u32`;
/// - `byte_pitch` times the number of rows in the surface fits in `byte_len`;
/// - nothing else reads or writes those bytes, and they are neither moved nor
///   freed, until the matching `unlock_texture` call.
///
/// ```compile_fail
/// use nimble::backend::{Backend, Event, RawLock};
///
/// struct Unchecked(Vec<u32>);
///
/// // Must be `unsafe impl`.
/// impl Backend for Unchecked {
///     fn surface_size(&self) -> (i32, i32) { (1, 1) }
///     fn poll_event(&mut self) -> Option<Event> { None }
///     fn lock_texture(&mut self) -> nimble::Result<RawLock> {
///         Ok(RawLock {
///             data: std::ptr::NonNull::new(self.0.as_mut_ptr().cast()).unwrap(),
///             byte_len: 1 << 30,
///             byte_pitch: 16,
///         })
///     }
///     fn unlock_texture(&mut self) {}
///     fn clear(&mut self) -> nimble::Result<()> { Ok(()) }
///     fn copy_texture(&mut self) -> nimble::Result<()> { Ok(()) }
///     fn present(&mut self) -> nimble::Result<()> { Ok(()) }
/// }
/// ```
pub unsafe trait Backend {
    /// Actual pixel size of the surface, which can differ from the requested
    /// window size (DPI scaling, window manager constraints).
    fn surface_size(&self) -> (i32, i32);

    /// Next pending event, never blocks.
    fn poll_event(&mut self) -> Option<Event>;

    /// Exclusive write access to the texture. Must be paired with `unlock_texture`.
    /// The returned region must satisfy the trait's safety contract.
    fn lock_texture(&mut self) -> Result<RawLock>;

    fn unlock_texture(&mut self);

    fn clear(&mut self) -> Result<()>;

    /// Copy the whole texture onto the surface.
    fn copy_texture(&mut self) -> Result<()>;

    /// Show the surface. May wait for the display.
    fn present(&mut self) -> Result<()>;

    fn set_title(&mut self, _title: &str) {}
}

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use log::{debug, info, warn};

use super::surface::{StreamingTexture, Surface, DEFAULT_ROW_ALIGN};
use super::{Backend, Event, RawLock};
use crate::error::{HostError, Result};
use crate::pipeline::HostConfig;

/// Backend operations, in the order the host issued them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Op {
    Lock,
    Unlock,
    Clear,
    Copy,
    Present,
}

/// What a headless run did. Shared with the caller so it survives the backend.
#[derive(Debug, Default)]
pub struct Recording {
    pub ops: Vec<Op>,
    /// Presented surfaces, when capture is on.
    pub frames: Vec<Vec<u32>>,
    pub presented: u64,
    pub titles: Vec<String>,
    /// Resources in the order they were released.
    pub released: Vec<&'static str>,
    /// Injected unlock failures. Unlocking cannot report an error to the host.
    pub unlock_errors: Vec<String>,
}

#[derive(Clone, Debug, Default)]
pub struct Recorder(Arc<Mutex<Recording>>);

impl Recorder {
    pub fn lock(&self) -> MutexGuard<'_, Recording> {
        // A client panic can poison the lock, the recording is still readable.
        self.0.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// In-memory window: no display, scripted input, optional frame capture.
pub struct HeadlessBackend {
    texture: StreamingTexture,
    surface: Surface,
    row_align: usize,
    script: BTreeMap<u64, VecDeque<Event>>,
    capture: bool,
    fail: Option<(Op, u64)>,
    recorder: Recorder,
}

impl HeadlessBackend {
    pub fn new(width: usize, height: usize) -> Result<Self> {
        Ok(Self {
            texture: StreamingTexture::new(width, height, DEFAULT_ROW_ALIGN)?,
            surface: Surface::new(width, height),
            row_align: DEFAULT_ROW_ALIGN,
            script: BTreeMap::new(),
            capture: false,
            fail: None,
            recorder: Recorder::default(),
        })
    }

    /// Surface sized like the configured window. `Host::run_with` has already
    /// validated the config.
    pub fn open(config: &HostConfig) -> Result<Self> {
        info!(
            "Opening headless surface \"{}\" {}x{}",
            config.title, config.width, config.height
        );
        Self::new(config.width as usize, config.height as usize)
    }

    /// Pretend the platform handed back a different surface size than requested.
    pub fn with_surface_size(mut self, width: usize, height: usize) -> Result<Self> {
        self.texture = StreamingTexture::new(width, height, self.row_align)?;
        self.surface = Surface::new(width, height);
        Ok(self)
    }

    /// Row alignment of the texture in bytes.
    pub fn with_row_align(mut self, row_align: usize) -> Result<Self> {
        self.texture =
            StreamingTexture::new(self.texture.width(), self.texture.height(), row_align)?;
        self.row_align = row_align;
        Ok(self)
    }

    pub fn with_capture(mut self) -> Self {
        self.capture = true;
        self
    }

    /// Queue events to be polled before frame `frame` (0 based) is rendered.
    pub fn with_events(mut self, frame: u64, events: impl IntoIterator<Item = Event>) -> Self {
        self.script.entry(frame).or_default().extend(events);
        self
    }

    /// Make `op` fail while frame `frame` is being produced.
    pub fn failing(mut self, op: Op, frame: u64) -> Self {
        self.fail = Some((op, frame));
        self
    }

    pub fn recorder(&self) -> Recorder {
        self.recorder.clone()
    }

    fn record(&mut self, op: Op) -> Result<()> {
        let mut rec = self.recorder.lock();
        rec.ops.push(op);
        if self.fail == Some((op, rec.presented)) {
            let msg = format!("injected {op:?} failure at frame {}", rec.presented);
            return Err(match op {
                Op::Lock | Op::Unlock => HostError::Lock(msg),
                Op::Clear => HostError::Clear(msg),
                Op::Copy => HostError::Copy(msg),
                Op::Present => HostError::Present(msg),
            });
        }
        Ok(())
    }
}

// SAFETY: `lock_texture` hands out the texture's own `Vec<Pixel>` storage,
// `byte_len` and `byte_pitch` come from the texture layout, and the texture
// refuses a second lock and any copy until `unlock_texture`.
unsafe impl Backend for HeadlessBackend {
    fn surface_size(&self) -> (i32, i32) {
        (self.surface.width() as i32, self.surface.height() as i32)
    }

    fn poll_event(&mut self) -> Option<Event> {
        let frame = self.recorder.lock().presented;
        self.script.get_mut(&frame)?.pop_front()
    }

    fn lock_texture(&mut self) -> Result<RawLock> {
        self.record(Op::Lock)?;
        self.texture.lock()
    }

    fn unlock_texture(&mut self) {
        if let Err(e) = self.record(Op::Unlock) {
            warn!("{e}");
            self.recorder.lock().unlock_errors.push(e.to_string());
        }
        self.texture.unlock();
    }

    fn clear(&mut self) -> Result<()> {
        self.record(Op::Clear)?;
        self.surface.clear();
        Ok(())
    }

    fn copy_texture(&mut self) -> Result<()> {
        self.record(Op::Copy)?;
        self.texture.copy_to(&mut self.surface)
    }

    fn present(&mut self) -> Result<()> {
        self.record(Op::Present)?;
        let mut rec = self.recorder.lock();
        if self.capture {
            rec.frames.push(self.surface.frame().to_vec());
        }
        rec.presented += 1;
        Ok(())
    }

    fn set_title(&mut self, title: &str) {
        self.recorder.lock().titles.push(title.to_owned());
    }
}

impl Drop for HeadlessBackend {
    fn drop(&mut self) {
        let mut rec = self.recorder.lock();
        rec.released.extend(["texture", "surface", "window"]);
        debug!("Released headless surface after {} frames", rec.presented);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_delivered_for_their_frame_only() {
        let mut backend = HeadlessBackend::new(4, 4)
            .unwrap()
            .with_events(0, [Event::PointerMotion { x: 1, y: 2 }])
            .with_events(1, [Event::Quit]);
        assert_eq!(backend.poll_event(), Some(Event::PointerMotion { x: 1, y: 2 }));
        assert_eq!(backend.poll_event(), None);
        backend.present().unwrap();
        assert_eq!(backend.poll_event(), Some(Event::Quit));
    }

    #[test]
    fn injected_failure_fires_on_its_frame() {
        let mut backend = HeadlessBackend::new(2, 2).unwrap().failing(Op::Clear, 1);
        backend.clear().unwrap();
        backend.present().unwrap();
        assert!(matches!(backend.clear(), Err(HostError::Clear(_))));
    }

    #[test]
    fn drop_records_release_order() {
        let backend = HeadlessBackend::new(2, 2).unwrap();
        let recorder = backend.recorder();
        drop(backend);
        assert_eq!(recorder.lock().released, vec!["texture", "surface", "window"]);
    }

    #[test]
    fn surface_size_override_resizes_texture() {
        let backend = HeadlessBackend::new(800, 600)
            .unwrap()
            .with_surface_size(1600, 1200)
            .unwrap();
        assert_eq!(backend.surface_size(), (1600, 1200));
        assert_eq!(backend.texture.pitch(), 1600);
    }

    #[test]
    fn injected_unlock_failure_is_recorded() {
        let mut backend = HeadlessBackend::new(2, 2).unwrap().failing(Op::Unlock, 0);
        let recorder = backend.recorder();
        backend.lock_texture().unwrap();
        backend.unlock_texture();
        // the texture is still released
        assert!(backend.lock_texture().is_ok());
        let rec = recorder.lock();
        assert_eq!(rec.unlock_errors.len(), 1);
        assert!(rec.unlock_errors[0].contains("Unlock"), "{:?}", rec.unlock_errors);
    }
}

use log::{debug, info};
use minifb::{MouseMode, Scale, Window, WindowOptions};

use super::surface::{StreamingTexture, Surface, DEFAULT_ROW_ALIGN};
use super::{Backend, Event, RawLock};
use crate::error::{HostError, Result};
use crate::pipeline::HostConfig;

/// A minifb window with a streaming texture behind it.
///
/// Field order is drop order: texture, surface, then the window (which also
/// tears down minifb's platform state).
pub struct WindowBackend {
    texture: StreamingTexture,
    surface: Surface,
    window: Window,
    last_pointer: Option<(i32, i32)>,
    pending: Vec<Event>,
    gathered: bool,
}

impl WindowBackend {
    /// Expects a config `Host::run_with` has validated.
    pub fn open(config: &HostConfig) -> Result<Self> {
        let opts = WindowOptions {
            resize: false,
            scale: Scale::X1,
            title: true,
            borderless: false,
            ..WindowOptions::default()
        };
        let mut window = Window::new(
            &config.title,
            config.width as usize,
            config.height as usize,
            opts,
        )
        .map_err(|e| HostError::Window(e.to_string()))?;
        if let Some(fps) = config.target_fps {
            window.set_target_fps(fps);
        }

        // The platform may not give us the size we asked for.
        let (width, height) = window.get_size();
        info!(
            "Opened window \"{}\" requested {}x{}, got {}x{}",
            config.title, config.width, config.height, width, height
        );

        let texture = StreamingTexture::new(width, height, DEFAULT_ROW_ALIGN)?;
        debug!(
            "Streaming texture {}x{} pitch {} pixels",
            width,
            height,
            texture.pitch()
        );

        Ok(Self {
            texture,
            surface: Surface::new(width, height),
            window,
            last_pointer: None,
            pending: Vec::new(),
            gathered: false,
        })
    }

    /// minifb has no event queue, so the window state is turned into events
    /// once per frame and handed out one at a time.
    fn gather_events(&mut self) {
        if !self.window.is_open() {
            self.pending.push(Event::Quit);
            return;
        }
        if !self.window.get_keys_released().is_empty() {
            self.pending.push(Event::KeyReleased);
        }
        if let Some((x, y)) = self.window.get_mouse_pos(MouseMode::Pass) {
            let pos = (x as i32, y as i32);
            if self.last_pointer != Some(pos) {
                self.last_pointer = Some(pos);
                self.pending.push(Event::PointerMotion { x: pos.0, y: pos.1 });
            }
        }
        // popped from the back
        self.pending.reverse();
    }
}

// SAFETY: `lock_texture` hands out the texture's own `Vec<Pixel>` storage,
// `byte_len` and `byte_pitch` come from the texture layout, and the texture
// refuses a second lock and any copy until `unlock_texture`.
unsafe impl Backend for WindowBackend {
    fn surface_size(&self) -> (i32, i32) {
        (self.surface.width() as i32, self.surface.height() as i32)
    }

    fn poll_event(&mut self) -> Option<Event> {
        if !self.gathered {
            self.gather_events();
            self.gathered = true;
        }
        self.pending.pop()
    }

    fn lock_texture(&mut self) -> Result<RawLock> {
        self.texture.lock()
    }

    fn unlock_texture(&mut self) {
        self.texture.unlock();
    }

    fn clear(&mut self) -> Result<()> {
        self.surface.clear();
        Ok(())
    }

    fn copy_texture(&mut self) -> Result<()> {
        self.texture.copy_to(&mut self.surface)
    }

    fn present(&mut self) -> Result<()> {
        self.gathered = false;
        // Also pumps the platform's message queue and sleeps to the target fps.
        self.window
            .update_with_buffer(
                self.surface.frame(),
                self.surface.width(),
                self.surface.height(),
            )
            .map_err(|e| HostError::Present(e.to_string()))
    }

    fn set_title(&mut self, title: &str) {
        self.window.set_title(title);
    }
}

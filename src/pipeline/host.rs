use std::marker::PhantomData;
use std::time::Instant;

use log::{debug, error, info, trace, warn};

use super::clients::{ClientRegistry, RenderClient};
use super::lock::FrameLock;
use super::metrics::FrameMetrics;
use crate::backend::{Backend, Event, WindowBackend};
use crate::error::{HostError, Result};
use crate::input::Input;

/// Window settings, read once when the host starts running.
#[derive(Clone, Debug, PartialEq)]
pub struct HostConfig {
    pub title: String,
    pub width: i32,
    pub height: i32,
    /// Frame rate the window backend throttles to. `None` presents as fast as it can.
    pub target_fps: Option<usize>,
    /// Stop with status 0 after this many presented frames.
    pub frame_limit: Option<u64>,
    /// Put the frame metrics in the window title.
    pub show_fps: bool,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            title: "nimble".to_owned(),
            width: 800,
            height: 600,
            target_fps: Some(60),
            frame_limit: None,
            show_fps: false,
        }
    }
}

impl HostConfig {
    pub fn validate(&self) -> Result<()> {
        if self.width <= 0 || self.height <= 0 {
            return Err(HostError::InvalidConfig(format!(
                "window size must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        if self.target_fps == Some(0) {
            return Err(HostError::InvalidConfig("target fps must be positive".into()));
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HostState {
    Uninitialized,
    Running,
    Terminated,
}

/// Owns one window for its whole life and feeds the backbuffer to the
/// registered clients once per frame.
///
/// A host runs once. It is neither `Send` nor `Sync`: every backend call
/// happens on the thread that created it.
pub struct Host<'c> {
    config: HostConfig,
    clients: ClientRegistry<'c>,
    input: Input,
    state: HostState,
    metrics: FrameMetrics,
    _thread_bound: PhantomData<*const ()>,
}

impl<'c> Host<'c> {
    pub fn new(config: HostConfig) -> Self {
        Self::with_input(config, Input::new())
    }

    /// Use an input handle that clients were already given.
    pub fn with_input(config: HostConfig, input: Input) -> Self {
        Self {
            config,
            clients: ClientRegistry::new(),
            input,
            state: HostState::Uninitialized,
            metrics: FrameMetrics::new(),
            _thread_bound: PhantomData,
        }
    }

    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    /// Pointer position and clock, shared with whoever holds a clone.
    pub fn input(&self) -> Input {
        self.input.clone()
    }

    pub fn state(&self) -> HostState {
        self.state
    }

    pub fn metrics(&self) -> &FrameMetrics {
        &self.metrics
    }

    pub fn client_count(&self) -> usize {
        self.clients.len()
    }

    /// Clients must be registered before `run`, later ones never draw.
    pub fn register(&mut self, client: &'c mut dyn RenderClient) {
        if self.state != HostState::Uninitialized {
            warn!("Render client registered after the host started, it will not run");
        }
        self.clients.register(client);
    }

    /// Open a minifb window and run until quit. Returns the exit status.
    pub fn run(&mut self) -> Result<i32> {
        self.run_with(WindowBackend::open)
    }

    /// Run against the backend `open` creates.
    ///
    /// Errors from setup or from any frame end the run; the backend is
    /// released before the error is returned.
    pub fn run_with<B, F>(&mut self, open: F) -> Result<i32>
    where
        B: Backend,
        F: FnOnce(&HostConfig) -> Result<B>,
    {
        if self.state != HostState::Uninitialized {
            return Err(HostError::AlreadyRun);
        }
        let result = self.config.validate().and_then(|()| self.drive(open));
        self.state = HostState::Terminated;
        match &result {
            Ok(code) => info!(
                "Host terminated with status {code} after {} frames",
                self.metrics.frames
            ),
            Err(e) => error!("Host failed after {} frames: {e}", self.metrics.frames),
        }
        result
    }

    fn drive<B, F>(&mut self, open: F) -> Result<i32>
    where
        B: Backend,
        F: FnOnce(&HostConfig) -> Result<B>,
    {
        let mut backend = open(&self.config)?;
        let (width, height) = backend.surface_size();
        if width <= 0 || height <= 0 {
            return Err(HostError::Texture(format!(
                "backend reported an empty surface {width}x{height}"
            )));
        }

        self.input.start_clock();
        self.state = HostState::Running;
        info!(
            "Running \"{}\" at {}x{} with {} render clients",
            self.config.title,
            width,
            height,
            self.clients.len()
        );
        self.clients.init_all(width, height);

        self.frame_loop(&mut backend, width, height)
        // `backend` drops here: texture, surface, window
    }

    fn frame_loop<B: Backend>(&mut self, backend: &mut B, width: i32, height: i32) -> Result<i32> {
        let mut last_frame = Instant::now();
        loop {
            if let Some(limit) = self.config.frame_limit {
                if self.metrics.frames >= limit {
                    info!("Frame limit of {limit} reached");
                    return Ok(0);
                }
            }

            while let Some(event) = backend.poll_event() {
                match event {
                    Event::Quit => {
                        info!("Quit requested");
                        return Ok(0);
                    }
                    Event::KeyReleased => {
                        info!("Key released, quitting");
                        return Ok(0);
                    }
                    Event::PointerMotion { x, y } => {
                        trace!("Pointer moved to ({x}, {y})");
                        self.input.set_pointer(x, y);
                    }
                    Event::Other => {}
                }
            }

            {
                let mut lock = FrameLock::acquire(&mut *backend, width, height)?;
                self.clients.render_all(&mut lock.pixmap());
            }

            backend.clear()?;
            backend.copy_texture()?;
            backend.present()?;

            let now = Instant::now();
            if self.metrics.update(now - last_frame) {
                debug!("{}", self.metrics);
                if self.config.show_fps {
                    backend.set_title(&format!("{} | {}", self.config.title, self.metrics));
                }
            }
            last_frame = now;
        }
    }
}

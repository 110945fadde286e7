use std::collections::VecDeque;
use std::fmt::Display;
use std::time::{Duration, Instant};

const FRAME_WINDOW: usize = 120;

/// Frame timing, the FPS figure is refreshed once a second.
pub struct FrameMetrics {
    pub frames: u64,
    pub current_fps: f32,
    frame_times: VecDeque<f32>,
    fps_counter: u32,
    fps_update_timer: Instant,
}

impl Default for FrameMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameMetrics {
    pub fn new() -> Self {
        Self {
            frames: 0,
            current_fps: 0.0,
            frame_times: VecDeque::with_capacity(FRAME_WINDOW),
            fps_counter: 0,
            fps_update_timer: Instant::now(),
        }
    }

    /// Record one presented frame. Returns true when the FPS figure was refreshed.
    pub fn update(&mut self, frame_delta: Duration) -> bool {
        self.frames += 1;
        self.fps_counter += 1;
        if self.frame_times.len() == FRAME_WINDOW {
            self.frame_times.pop_front();
        }
        self.frame_times.push_back(frame_delta.as_secs_f32() * 1000.0);

        let elapsed = self.fps_update_timer.elapsed();
        if elapsed >= Duration::from_secs(1) {
            self.current_fps = self.fps_counter as f32 / elapsed.as_secs_f32();
            self.fps_counter = 0;
            self.fps_update_timer = Instant::now();
            return true;
        }
        false
    }

    pub fn average_ms(&self) -> f32 {
        if self.frame_times.is_empty() {
            return 0.0;
        }
        self.frame_times.iter().sum::<f32>() / self.frame_times.len() as f32
    }
}

impl Display for FrameMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "FPS: {:.2} | Avg: {:.2}ms | Min: {:.2}ms | Max: {:.2}ms",
            self.current_fps,
            self.average_ms(),
            self.frame_times
                .iter()
                .copied()
                .reduce(f32::min)
                .unwrap_or(0.0),
            self.frame_times
                .iter()
                .copied()
                .reduce(f32::max)
                .unwrap_or(0.0)
        )
    }
}

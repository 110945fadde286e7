// Render clients the binary shows off with. Registered back to front.
use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use nimble::{Input, PixMap, Pixel, RenderClient};

/// Vertical gradient that slowly breathes over time.
pub struct Backdrop {
    input: Input,
    top: Pixel,
    bottom: Pixel,
}

impl Backdrop {
    pub fn new(input: Input) -> Self {
        Self {
            input,
            top: Pixel::NAVY,
            bottom: Pixel::BLACK,
        }
    }
}

impl RenderClient for Backdrop {
    fn init(&mut self, width: i32, height: i32) {
        log::debug!("Backdrop sized to {width}x{height}");
    }

    fn render(&mut self, pixmap: &mut PixMap<'_>) {
        let pulse = ((self.input.now() * 0.5).sin() * 0.5 + 0.5) as f32;
        let top = self.top.lerp(Pixel::from_rgb(0x30, 0x00, 0x60), pulse);
        let height = pixmap.height().max(1) as f32;
        for y in 0..pixmap.height() {
            let color = top.lerp(self.bottom, y as f32 / height);
            pixmap.row_mut(y).fill(color);
        }
    }
}

struct Star {
    pos: Vec2,
    speed: f32,
    color: Pixel,
}

/// Stars drifting right to left, faster ones brighter.
pub struct Starfield {
    input: Input,
    count: usize,
    stars: Vec<Star>,
    size: Vec2,
    last_time: f64,
    rng: StdRng,
}

impl Starfield {
    pub fn new(input: Input, count: usize) -> Self {
        Self {
            input,
            count,
            stars: Vec::with_capacity(count),
            size: Vec2::ZERO,
            last_time: 0.0,
            rng: StdRng::seed_from_u64(0x5eed),
        }
    }
}

impl RenderClient for Starfield {
    fn init(&mut self, width: i32, height: i32) {
        self.size = Vec2::new(width as f32, height as f32);
        self.stars.clear();
        for _ in 0..self.count {
            let speed = self.rng.gen_range(10.0..120.0);
            let brightness = (speed / 120.0 * 255.0) as u8;
            self.stars.push(Star {
                pos: Vec2::new(
                    self.rng.gen_range(0.0..self.size.x),
                    self.rng.gen_range(0.0..self.size.y),
                ),
                speed,
                color: Pixel::from_rgb(brightness, brightness, brightness),
            });
        }
    }

    fn render(&mut self, pixmap: &mut PixMap<'_>) {
        let now = self.input.now();
        let dt = (now - self.last_time).clamp(0.0, 0.1) as f32;
        self.last_time = now;
        for star in self.stars.iter_mut() {
            star.pos.x -= star.speed * dt;
            if star.pos.x < 0.0 {
                star.pos.x += self.size.x;
                star.pos.y = self.rng.gen_range(0.0..self.size.y);
            }
            pixmap.set(star.pos.x as i32, star.pos.y as i32, star.color);
        }
    }
}

/// Crosshair and ring under the pointer.
pub struct Cursor {
    input: Input,
    radius: f32,
    color: Pixel,
}

impl Cursor {
    pub fn new(input: Input) -> Self {
        Self {
            input,
            radius: 12.0,
            color: Pixel::ORANGE,
        }
    }
}

impl RenderClient for Cursor {
    fn init(&mut self, _width: i32, _height: i32) {}

    fn render(&mut self, pixmap: &mut PixMap<'_>) {
        let (x, y) = self.input.pointer_position();
        let r = self.radius as i32;
        pixmap.fill_rect(x - r - 4, y, 2 * (r + 4) + 1, 1, self.color);
        pixmap.fill_rect(x, y - r - 4, 1, 2 * (r + 4) + 1, self.color);

        let center = Vec2::new(x as f32, y as f32);
        let steps = (self.radius * std::f32::consts::TAU) as i32;
        for i in 0..steps {
            let angle = i as f32 / steps as f32 * std::f32::consts::TAU;
            let p = center + Vec2::from_angle(angle) * self.radius;
            pixmap.set(p.x.round() as i32, p.y.round() as i32, self.color);
        }
    }
}

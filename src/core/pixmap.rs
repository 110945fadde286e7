use super::pixel::Pixel;

/// Per-frame view of the locked backbuffer.
///
/// Rows are `pitch` pixels apart; only the first `width` pixels of each row are
/// visible. The `'a` lifetime is the lock, so a client handed `&mut PixMap`
/// cannot keep the pixels past its `render` call.
#[derive(Debug)]
pub struct PixMap<'a> {
    width: i32,
    height: i32,
    pitch: i32,
    pixels: &'a mut [Pixel],
}

impl<'a> PixMap<'a> {
    /// Panics if `pitch < width` or the slice is shorter than `height * pitch`.
    pub fn new(width: i32, height: i32, pixels: &'a mut [Pixel], pitch: i32) -> Self {
        assert!(width >= 0 && height >= 0, "negative pixmap size {width}x{height}");
        assert!(pitch >= width, "pitch {pitch} smaller than width {width}");
        assert!(
            pixels.len() >= height as usize * pitch as usize,
            "pixel view of {} elements cannot hold {height} rows of pitch {pitch}",
            pixels.len()
        );
        Self {
            width,
            height,
            pitch,
            pixels,
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// Distance between rows, in pixels.
    pub fn pitch(&self) -> i32 {
        self.pitch
    }

    pub fn pixels(&self) -> &[Pixel] {
        &self.pixels[..]
    }

    pub fn pixels_mut(&mut self) -> &mut [Pixel] {
        &mut self.pixels[..]
    }

    /// Base address of the view, stable for the whole frame.
    pub fn as_ptr(&self) -> *const Pixel {
        self.pixels.as_ptr()
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return None;
        }
        Some(y as usize * self.pitch as usize + x as usize)
    }

    /// The visible part of row `y`.
    pub fn row(&self, y: i32) -> &[Pixel] {
        assert!(y >= 0 && y < self.height, "row {y} out of range");
        let start = y as usize * self.pitch as usize;
        &self.pixels[start..start + self.width as usize]
    }

    pub fn row_mut(&mut self, y: i32) -> &mut [Pixel] {
        assert!(y >= 0 && y < self.height, "row {y} out of range");
        let start = y as usize * self.pitch as usize;
        &mut self.pixels[start..start + self.width as usize]
    }

    pub fn get(&self, x: i32, y: i32) -> Option<Pixel> {
        self.index(x, y).map(|i| self.pixels[i])
    }

    /// Writes outside the visible area are dropped.
    #[inline]
    pub fn set(&mut self, x: i32, y: i32, pixel: Pixel) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i] = pixel;
        }
    }

    /// Fill the visible area, row padding is left alone.
    pub fn fill(&mut self, pixel: Pixel) {
        for y in 0..self.height {
            self.row_mut(y).fill(pixel);
        }
    }

    /// Fill a rectangle clipped to the visible area.
    pub fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, pixel: Pixel) {
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = x.saturating_add(w).min(self.width);
        let y1 = y.saturating_add(h).min(self.height);
        if x0 >= x1 || y0 >= y1 {
            return;
        }
        for row in y0..y1 {
            self.row_mut(row)[x0 as usize..x1 as usize].fill(pixel);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_get_respect_pitch() {
        let mut data = vec![Pixel::BLACK; 8 * 3];
        let mut pm = PixMap::new(5, 3, &mut data, 8);
        pm.set(4, 2, Pixel::RED);
        assert_eq!(pm.get(4, 2), Some(Pixel::RED));
        assert_eq!(pm.pixels()[2 * 8 + 4], Pixel::RED);
        assert_eq!(pm.row(2).len(), 5);
    }

    #[test]
    fn out_of_bounds_writes_are_dropped() {
        let mut data = vec![Pixel::BLACK; 4 * 2];
        let mut pm = PixMap::new(3, 2, &mut data, 4);
        pm.set(3, 0, Pixel::RED); // padding column
        pm.set(-1, 0, Pixel::RED);
        pm.set(0, 2, Pixel::RED);
        assert!(pm.pixels().iter().all(|p| *p == Pixel::BLACK));
        assert_eq!(pm.get(3, 0), None);
    }

    #[test]
    fn fill_leaves_padding_untouched() {
        let mut data = vec![Pixel::BLACK; 4 * 2];
        let mut pm = PixMap::new(3, 2, &mut data, 4);
        pm.fill(Pixel::WHITE);
        assert_eq!(pm.pixels()[3], Pixel::BLACK);
        assert_eq!(pm.pixels()[7], Pixel::BLACK);
        assert_eq!(pm.row(1), &[Pixel::WHITE; 3]);
    }

    #[test]
    fn fill_rect_clips() {
        let mut data = vec![Pixel::BLACK; 4 * 4];
        let mut pm = PixMap::new(4, 4, &mut data, 4);
        pm.fill_rect(-2, 2, 4, 10, Pixel::BLUE);
        let blue: usize = pm.pixels().iter().filter(|p| **p == Pixel::BLUE).count();
        assert_eq!(blue, 4);
        assert_eq!(pm.get(1, 3), Some(Pixel::BLUE));
        assert_eq!(pm.get(2, 3), Some(Pixel::BLACK));
        pm.fill_rect(10, 10, 2, 2, Pixel::RED);
    }

    #[test]
    #[should_panic]
    fn short_view_is_rejected() {
        let mut data = vec![Pixel::BLACK; 10];
        let _ = PixMap::new(4, 3, &mut data, 4);
    }

    #[test]
    #[should_panic]
    fn pitch_below_width_is_rejected() {
        let mut data = vec![Pixel::BLACK; 64];
        let _ = PixMap::new(8, 2, &mut data, 4);
    }
}

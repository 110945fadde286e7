/// Size of one packed pixel in bytes.
pub const PIXEL_BYTES: usize = 4;

/// A packed ARGB8888 color, alpha in the most significant byte.
///
/// This is the layout of the streaming texture on every backend, so a `Pixel`
/// written by a client lands on screen unchanged.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Pixel(pub u32);

impl Pixel {
    pub const fn from_argb(a: u8, r: u8, g: u8, b: u8) -> Self {
        Self(((a as u32) << 24) | ((r as u32) << 16) | ((g as u32) << 8) | b as u32)
    }

    /// Opaque color.
    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self::from_argb(0xFF, r, g, b)
    }

    pub const fn to_u32(self) -> u32 {
        self.0
    }

    pub const fn a(self) -> u8 {
        (self.0 >> 24) as u8
    }

    pub const fn r(self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub const fn g(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub const fn b(self) -> u8 {
        self.0 as u8
    }

    /// Linear blend of every channel, `t` clamped to 0.0 - 1.0.
    pub fn lerp(self, other: Pixel, t: f32) -> Pixel {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Pixel::from_argb(
            mix(self.a(), other.a()),
            mix(self.r(), other.r()),
            mix(self.g(), other.g()),
            mix(self.b(), other.b()),
        )
    }

    const fn hex_char_to_u8(c: u8) -> u8 {
        match c {
            b'0'..=b'9' => c - b'0',
            b'a'..=b'f' => c - b'a' + 10,
            b'A'..=b'F' => c - b'A' + 10,
            _ => 0,
        }
    }

    const fn hex_pair_to_u8(high: u8, low: u8) -> u8 {
        (Self::hex_char_to_u8(high) << 4) | Self::hex_char_to_u8(low)
    }

    /// Only for the constants below, "#RRGGBB" or "RRGGBB".
    const fn hex(hex: &str) -> Self {
        let bytes = hex.as_bytes();
        let offset = if bytes[0] == b'#' { 1 } else { 0 };
        Self::from_rgb(
            Self::hex_pair_to_u8(bytes[offset], bytes[offset + 1]),
            Self::hex_pair_to_u8(bytes[offset + 2], bytes[offset + 3]),
            Self::hex_pair_to_u8(bytes[offset + 4], bytes[offset + 5]),
        )
    }
}

impl Pixel {
    pub const BLACK: Pixel = Pixel::hex("000000");
    pub const WHITE: Pixel = Pixel::hex("FFFFFF");
    pub const RED: Pixel = Pixel::hex("FF0000");
    pub const BLUE: Pixel = Pixel::hex("0000FF");
    pub const ORANGE: Pixel = Pixel::hex("FFA500");
    pub const NAVY: Pixel = Pixel::hex("#000080");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channels_are_argb_most_significant_first() {
        let p = Pixel::from_argb(0x11, 0x22, 0x33, 0x44);
        assert_eq!(p.to_u32(), 0x1122_3344);
        assert_eq!((p.a(), p.r(), p.g(), p.b()), (0x11, 0x22, 0x33, 0x44));
    }

    #[test]
    fn const_hex_colors() {
        assert_eq!(Pixel::ORANGE, Pixel::from_rgb(0xFF, 0xA5, 0x00));
        assert_eq!(Pixel::NAVY.to_u32(), 0xFF00_0080);
        assert_eq!(Pixel::RED.to_u32(), 0xFFFF_0000);
    }

    #[test]
    fn lerp_endpoints_and_midpoint() {
        assert_eq!(Pixel::BLACK.lerp(Pixel::WHITE, 0.0), Pixel::BLACK);
        assert_eq!(Pixel::BLACK.lerp(Pixel::WHITE, 2.0), Pixel::WHITE);
        let mid = Pixel::BLACK.lerp(Pixel::WHITE, 0.5);
        assert_eq!(mid.r(), 128);
        assert_eq!(mid.a(), 0xFF);
    }

    #[test]
    fn pixel_is_four_bytes() {
        assert_eq!(std::mem::size_of::<Pixel>(), PIXEL_BYTES);
        assert_eq!(std::mem::align_of::<Pixel>(), std::mem::align_of::<u32>());
    }
}

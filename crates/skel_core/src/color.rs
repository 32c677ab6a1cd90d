use glam::Vec4;

/// RGBA color with channels in `[0, 1]`.
///
/// `set` and `add` clamp; direct field writes and `set_from_*` do not.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0, 1.0);
    pub const RED: Color = Color::new(1.0, 0.0, 0.0, 1.0);
    pub const GREEN: Color = Color::new(0.0, 1.0, 0.0, 1.0);
    pub const BLUE: Color = Color::new(0.0, 0.0, 1.0, 1.0);
    pub const MAGENTA: Color = Color::new(1.0, 0.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn set(&mut self, r: f32, g: f32, b: f32, a: f32) -> &mut Self {
        self.r = r;
        self.g = g;
        self.b = b;
        self.a = a;
        self.clamp()
    }

    pub fn set_from_color(&mut self, other: &Color) -> &mut Self {
        *self = *other;
        self
    }

    /// Parses `rrggbb` or `rrggbbaa`, with or without a leading `#`. Alpha
    /// defaults to 1 when the string has no alpha pair. Malformed pairs read
    /// as 0.
    pub fn set_from_hex(&mut self, hex: &str) -> &mut Self {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        self.r = hex_channel(hex, 0);
        self.g = hex_channel(hex, 2);
        self.b = hex_channel(hex, 4);
        self.a = if hex.len() != 8 {
            1.0
        } else {
            hex_channel(hex, 6)
        };
        self
    }

    pub fn from_hex(hex: &str) -> Self {
        let mut color = Self::default();
        color.set_from_hex(hex);
        color
    }

    pub fn add(&mut self, r: f32, g: f32, b: f32, a: f32) -> &mut Self {
        self.r += r;
        self.g += g;
        self.b += b;
        self.a += a;
        self.clamp()
    }

    pub fn clamp(&mut self) -> &mut Self {
        self.r = self.r.clamp(0.0, 1.0);
        self.g = self.g.clamp(0.0, 1.0);
        self.b = self.b.clamp(0.0, 1.0);
        self.a = self.a.clamp(0.0, 1.0);
        self
    }

    /// Unpacks `0xRRGGBBAA`.
    pub fn set_from_rgba8888(&mut self, value: u32) -> &mut Self {
        self.r = ((value & 0xff00_0000) >> 24) as f32 / 255.0;
        self.g = ((value & 0x00ff_0000) >> 16) as f32 / 255.0;
        self.b = ((value & 0x0000_ff00) >> 8) as f32 / 255.0;
        self.a = (value & 0x0000_00ff) as f32 / 255.0;
        self
    }

    /// Unpacks `0xRRGGBB`, leaving alpha untouched.
    pub fn set_from_rgb888(&mut self, value: u32) -> &mut Self {
        self.r = ((value & 0x00ff_0000) >> 16) as f32 / 255.0;
        self.g = ((value & 0x0000_ff00) >> 8) as f32 / 255.0;
        self.b = (value & 0x0000_00ff) as f32 / 255.0;
        self
    }

    pub fn to_vec4(self) -> Vec4 {
        Vec4::new(self.r, self.g, self.b, self.a)
    }
}

impl From<Vec4> for Color {
    fn from(v: Vec4) -> Self {
        Self::new(v.x, v.y, v.z, v.w)
    }
}

impl From<Color> for Vec4 {
    fn from(c: Color) -> Self {
        c.to_vec4()
    }
}

fn hex_channel(hex: &str, start: usize) -> f32 {
    hex.get(start..start + 2)
        .and_then(|pair| u8::from_str_radix(pair, 16).ok())
        .map_or(0.0, |byte| byte as f32 / 255.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_clamps_channels() {
        let mut color = Color::default();
        color.set(1.5, -0.5, 0.25, 2.0);
        assert_eq!(color, Color::new(1.0, 0.0, 0.25, 1.0));
    }

    #[test]
    fn add_clamps_channels() {
        let mut color = Color::new(0.5, 0.5, 0.5, 0.5);
        color.add(0.75, -0.75, 0.25, 0.0);
        assert_eq!(color, Color::new(1.0, 0.0, 0.75, 0.5));
    }

    #[test]
    fn hex_without_alpha_is_opaque() {
        let color = Color::from_hex("#ff0080");
        assert_eq!(color.r, 1.0);
        assert_eq!(color.g, 0.0);
        assert!((color.b - 128.0 / 255.0).abs() < 1e-6);
        assert_eq!(color.a, 1.0);
    }

    #[test]
    fn hex_with_alpha() {
        let color = Color::from_hex("00ff0000");
        assert_eq!(color, Color::new(0.0, 1.0, 0.0, 0.0));
    }

    #[test]
    fn packed_integers_unpack() {
        let mut color = Color::new(0.0, 0.0, 0.0, 0.5);
        color.set_from_rgb888(0x00ff00);
        assert_eq!(color, Color::new(0.0, 1.0, 0.0, 0.5));

        color.set_from_rgba8888(0xff0000ff);
        assert_eq!(color, Color::RED);
    }

    #[test]
    fn converts_to_and_from_vec4() {
        let v: Vec4 = Color::MAGENTA.into();
        assert_eq!(v, Vec4::new(1.0, 0.0, 1.0, 1.0));
        assert_eq!(Color::from(v), Color::MAGENTA);
    }
}

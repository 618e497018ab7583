use crossterm::style::Color;

/// Straight (non-premultiplied) color with alpha, channels in 0..=255
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

/// Helper to create RGBA colors
pub const fn rgba(r: u8, g: u8, b: u8, a: f32) -> Rgba {
    Rgba { r, g, b, a }
}

/// Opaque color from a 0xRRGGBB literal
pub const fn hex(rgb: u32) -> Rgba {
    rgba((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8, 1.0)
}

impl Rgba {
    /// Interpolate between two stops the way canvas gradients do (premultiplied).
    pub fn lerp(self, to: Rgba, t: f32) -> Rgba {
        let t = t.clamp(0.0, 1.0);
        let a = self.a + (to.a - self.a) * t;
        if a <= f32::EPSILON {
            return rgba(0, 0, 0, 0.0);
        }
        let channel = |from: u8, to_c: u8| -> u8 {
            let pre = from as f32 * self.a + (to_c as f32 * to.a - from as f32 * self.a) * t;
            (pre / a).round().clamp(0.0, 255.0) as u8
        };
        rgba(channel(self.r, to.r), channel(self.g, to.g), channel(self.b, to.b), a)
    }
}

/// A device pixel on the surface, channels in 0.0..=1.0
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb { r: 0.0, g: 0.0, b: 0.0 };

    /// Source-over blend of `src` onto this pixel
    pub fn blend(self, src: Rgba) -> Rgb {
        let a = src.a.clamp(0.0, 1.0);
        let mix = |dst: f32, s: u8| dst * (1.0 - a) + (s as f32 / 255.0) * a;
        Rgb {
            r: mix(self.r, src.r),
            g: mix(self.g, src.g),
            b: mix(self.b, src.b),
        }
    }

    /// Relative luminance (Rec. 709 weights)
    pub fn luminance(self) -> f32 {
        0.2126 * self.r + 0.7152 * self.g + 0.0722 * self.b
    }

    pub fn to_color(self) -> Color {
        let q = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        Color::Rgb { r: q(self.r), g: q(self.g), b: q(self.b) }
    }
}

/// Average of a set of pixels, `None` when empty
pub fn mean(pixels: &[Rgb]) -> Option<Rgb> {
    if pixels.is_empty() {
        return None;
    }
    let n = pixels.len() as f32;
    let (r, g, b) = pixels
        .iter()
        .fold((0.0, 0.0, 0.0), |(r, g, b), p| (r + p.r, g + p.g, b + p.b));
    Some(Rgb { r: r / n, g: g / n, b: b / n })
}

/// Globe palette
pub mod palette {
    use super::{hex, rgba, Rgba};

    pub const BACKGROUND: Rgba = hex(0x050a14);
    pub const STAR: Rgba = rgba(255, 255, 255, 0.6);

    pub const SPHERE_CORE: Rgba = rgba(10, 22, 40, 1.0);
    pub const SPHERE_EDGE: Rgba = rgba(0, 255, 255, 0.1);
    pub const GRID: Rgba = rgba(0, 255, 255, 0.2);
    pub const ATMOSPHERE_INNER: Rgba = rgba(0, 255, 255, 0.3);
    pub const ATMOSPHERE_OUTER: Rgba = rgba(0, 255, 255, 0.0);

    pub const NEED: Rgba = hex(0xff0055);
    pub const HELP: Rgba = hex(0x00ff88);
    pub const TRANSPARENT: Rgba = rgba(0, 0, 0, 0.0);
}

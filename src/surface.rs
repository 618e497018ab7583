//! Raster drawing surface
//!
//! Holds a backing buffer in device pixels plus a uniform scale transform.
//! Callers draw in logical (unscaled) coordinates; the transform maps them
//! onto the backing buffer. Reallocating the buffer resets the transform,
//! so whoever resizes must re-apply the scale afterwards.

use crate::colors::{Rgb, Rgba};

/// Samples per logical pixel when walking an ellipse outline
const OUTLINE_OVERSAMPLE: f32 = 2.0;

pub struct Surface {
    width: usize,
    height: usize,
    display_w: f32,
    display_h: f32,
    density: f32,
    scale: f32,
    pixels: Vec<Rgb>,
}

impl Default for Surface {
    fn default() -> Self {
        Self::new()
    }
}

impl Surface {
    pub fn new() -> Self {
        Self {
            width: 0,
            height: 0,
            display_w: 0.0,
            display_h: 0.0,
            density: 1.0,
            scale: 1.0,
            pixels: Vec::new(),
        }
    }

    /// Reallocate the backing buffer for a displayed size and pixel density.
    /// The transform is reset to identity.
    pub fn resize(&mut self, display_w: f32, display_h: f32, density: f32) {
        self.display_w = display_w.max(0.0);
        self.display_h = display_h.max(0.0);
        self.density = if density > 0.0 { density } else { 1.0 };
        self.width = (self.display_w * self.density).round() as usize;
        self.height = (self.display_h * self.density).round() as usize;
        self.pixels = vec![Rgb::BLACK; self.width * self.height];
        self.scale = 1.0;
    }

    /// Multiply the current transform by a uniform scale
    pub fn scale(&mut self, factor: f32) {
        self.scale *= factor;
    }

    #[cfg(test)]
    pub fn transform_scale(&self) -> f32 {
        self.scale
    }

    pub fn density(&self) -> f32 {
        self.density
    }

    /// Displayed size in logical pixels
    pub fn logical_size(&self) -> (f32, f32) {
        (self.display_w, self.display_h)
    }

    /// Backing buffer size in device pixels
    #[cfg(test)]
    pub fn backing_size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<Rgb> {
        if x < self.width && y < self.height {
            Some(self.pixels[y * self.width + x])
        } else {
            None
        }
    }

    fn blend_at(&mut self, x: usize, y: usize, color: Rgba) {
        let idx = y * self.width + x;
        self.pixels[idx] = self.pixels[idx].blend(color);
    }

    /// Device-pixel bounding box of a logical rectangle, clipped to the buffer
    fn device_bounds(&self, x0: f32, y0: f32, x1: f32, y1: f32) -> Option<(usize, usize, usize, usize)> {
        if self.is_empty() {
            return None;
        }
        let s = self.scale;
        let left = (x0 * s).floor().max(0.0);
        let top = (y0 * s).floor().max(0.0);
        let right = (x1 * s).ceil().min(self.width as f32);
        let bottom = (y1 * s).ceil().min(self.height as f32);
        if left >= right || top >= bottom {
            return None;
        }
        Some((left as usize, top as usize, right as usize, bottom as usize))
    }

    /// Visit every device pixel whose center falls in the bounds, passing its logical center
    fn for_each_in<F: FnMut(&mut Self, usize, usize, f32, f32)>(
        &mut self,
        bounds: (f32, f32, f32, f32),
        mut f: F,
    ) {
        let Some((left, top, right, bottom)) = self.device_bounds(bounds.0, bounds.1, bounds.2, bounds.3) else {
            return;
        };
        let s = self.scale;
        for py in top..bottom {
            for px in left..right {
                let lx = (px as f32 + 0.5) / s;
                let ly = (py as f32 + 0.5) / s;
                f(self, px, py, lx, ly);
            }
        }
    }

    /// Fill the whole buffer, ignoring the transform
    #[cfg(test)]
    pub fn fill(&mut self, color: Rgba) {
        for px in &mut self.pixels {
            *px = px.blend(color);
        }
    }

    pub fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgba) {
        self.for_each_in((x, y, x + w, y + h), |s, px, py, lx, ly| {
            if lx >= x && lx < x + w && ly >= y && ly < y + h {
                s.blend_at(px, py, color);
            }
        });
    }

    pub fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, color: Rgba) {
        if radius <= 0.0 {
            return;
        }
        let r2 = radius * radius;
        self.for_each_in((cx - radius, cy - radius, cx + radius, cy + radius), |s, px, py, lx, ly| {
            let (dx, dy) = (lx - cx, ly - cy);
            if dx * dx + dy * dy <= r2 {
                s.blend_at(px, py, color);
            }
        });
    }

    /// Fill a disc of radius `outer` with a concentric radial gradient.
    /// Inside `inner` the first stop is padded, like a canvas radial gradient.
    pub fn fill_radial(&mut self, cx: f32, cy: f32, inner: f32, outer: f32, from: Rgba, to: Rgba) {
        if outer <= 0.0 {
            return;
        }
        let span = (outer - inner).max(f32::EPSILON);
        let r2 = outer * outer;
        self.for_each_in((cx - outer, cy - outer, cx + outer, cy + outer), |s, px, py, lx, ly| {
            let (dx, dy) = (lx - cx, ly - cy);
            let d2 = dx * dx + dy * dy;
            if d2 <= r2 {
                let t = (d2.sqrt() - inner) / span;
                s.blend_at(px, py, from.lerp(to, t));
            }
        });
    }

    /// Stroke a one-pixel ellipse outline rotated by `rotation` radians
    pub fn stroke_ellipse(&mut self, cx: f32, cy: f32, rx: f32, ry: f32, rotation: f32, color: Rgba) {
        if self.is_empty() {
            return;
        }
        let (rx, ry) = (rx.abs(), ry.abs());
        let s = self.scale;
        let circumference = std::f32::consts::TAU * rx.max(ry) * s;
        let steps = ((circumference * OUTLINE_OVERSAMPLE).ceil() as usize).max(8);
        let (cos_r, sin_r) = (rotation.cos(), rotation.sin());

        let mut hits: Vec<usize> = Vec::with_capacity(steps);
        for i in 0..steps {
            let t = i as f32 / steps as f32 * std::f32::consts::TAU;
            let (ex, ey) = (rx * t.cos(), ry * t.sin());
            let x = (cx + ex * cos_r - ey * sin_r) * s;
            let y = (cy + ex * sin_r + ey * cos_r) * s;
            if x < 0.0 || y < 0.0 {
                continue;
            }
            let (px, py) = (x as usize, y as usize);
            if px < self.width && py < self.height {
                hits.push(py * self.width + px);
            }
        }

        // Blend each covered pixel once so overlapping samples don't stack alpha
        hits.sort_unstable();
        hits.dedup();
        for idx in hits {
            self.pixels[idx] = self.pixels[idx].blend(color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colors::{hex, rgba};

    #[test]
    fn resize_scales_backing_by_density() {
        let mut s = Surface::new();
        s.resize(40.0, 20.0, 2.0);
        assert_eq!(s.backing_size(), (80, 40));
        assert_eq!(s.logical_size(), (40.0, 20.0));
        assert_eq!(s.transform_scale(), 1.0);
    }

    #[test]
    fn scale_maps_logical_onto_backing() {
        let mut s = Surface::new();
        s.resize(10.0, 10.0, 2.0);
        s.scale(2.0);
        s.fill_rect(9.0, 9.0, 1.0, 1.0, hex(0xffffff));
        assert_eq!(s.pixel(19, 19), Some(Rgb { r: 1.0, g: 1.0, b: 1.0 }));
        assert_eq!(s.pixel(17, 17), Some(Rgb::BLACK));
    }

    #[test]
    fn resize_resets_transform() {
        let mut s = Surface::new();
        s.resize(10.0, 10.0, 2.0);
        s.scale(2.0);
        s.resize(12.0, 12.0, 2.0);
        assert_eq!(s.transform_scale(), 1.0);
    }

    #[test]
    fn zero_size_surface_ignores_drawing() {
        let mut s = Surface::new();
        s.resize(0.0, 0.0, 1.0);
        assert!(s.is_empty());
        s.fill_circle(0.0, 0.0, 5.0, hex(0xffffff));
        s.stroke_ellipse(0.0, 0.0, 5.0, 5.0, 0.0, hex(0xffffff));
        assert_eq!(s.pixel(0, 0), None);
    }

    #[test]
    fn radial_pads_inner_stop() {
        let mut s = Surface::new();
        s.resize(20.0, 20.0, 1.0);
        s.fill_radial(10.0, 10.0, 5.0, 10.0, hex(0xff0000), rgba(0, 0, 255, 1.0));
        let center = s.pixel(10, 10).unwrap();
        assert!((center.r - 1.0).abs() < 1e-6 && center.b == 0.0);
        // Corners are outside the disc
        assert_eq!(s.pixel(0, 0), Some(Rgb::BLACK));
    }

    #[test]
    fn ellipse_outline_leaves_center_untouched() {
        let mut s = Surface::new();
        s.resize(30.0, 30.0, 1.0);
        s.stroke_ellipse(15.0, 15.0, 10.0, 5.0, 0.0, rgba(0, 255, 255, 0.2));
        assert_eq!(s.pixel(15, 15), Some(Rgb::BLACK));
        let edge = s.pixel(25, 15).or(s.pixel(24, 15)).unwrap();
        assert!(edge.g > 0.0);
    }
}

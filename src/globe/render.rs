//! Per-frame drawing of the globe layers
//!
//! Layers are painted back to front: background, stars, sphere body,
//! latitude rings, longitude rings, atmosphere, then markers.

use super::hit::{ProjectedPosition, ProjectionCache};
use super::projector::project;
use crate::colors::palette;
use crate::node::Node;
use crate::surface::Surface;
use rand::prelude::*;
use std::f32::consts::{FRAC_PI_4, TAU};

/// Sphere radius as a fraction of the smaller surface dimension
const SPHERE_SCALE: f32 = 0.35;
/// Gradient on the sphere body starts at this fraction of the radius
const SPHERE_CORE: f32 = 0.5;
const ATMOSPHERE_SCALE: f32 = 1.15;

const LATITUDE_RINGS: i32 = 2;
const LATITUDE_SPACING: f32 = 2.5;
const LATITUDE_FLATTEN: f32 = 0.3;
const LONGITUDE_RINGS: usize = 8;

const STAR_MAX_SIZE: f32 = 1.5;

pub const MARKER_BASE_RADIUS: f32 = 4.0;
const MARKER_GLOW_FACTOR: f32 = 3.0;
const MARKER_HOVER_FACTOR: f32 = 1.5;
const PULSE_AMPLITUDE: f32 = 0.3;
const PULSE_RATE: f64 = 0.002;

/// Sphere placement derived from the surface's logical size
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameGeometry {
    pub width: f32,
    pub height: f32,
    pub center_x: f32,
    pub center_y: f32,
    pub radius: f32,
}

impl FrameGeometry {
    /// None for a zero-sized surface
    pub fn new(width: f32, height: f32) -> Option<Self> {
        if width <= 0.0 || height <= 0.0 {
            return None;
        }
        Some(Self {
            width,
            height,
            center_x: width / 2.0,
            center_y: height / 2.0,
            radius: width.min(height) * SPHERE_SCALE,
        })
    }
}

/// Marker scale factor for a wall-clock time in milliseconds
pub fn pulse_scale(now_ms: f64) -> f32 {
    1.0 + PULSE_AMPLITUDE * (now_ms * PULSE_RATE).sin() as f32
}

/// Solid background plus freshly scattered stars. Stars are not kept between frames.
pub fn draw_backdrop<R: Rng>(surface: &mut Surface, geo: &FrameGeometry, star_count: usize, rng: &mut R) {
    surface.fill_rect(0.0, 0.0, geo.width, geo.height, palette::BACKGROUND);
    for _ in 0..star_count {
        let x = rng.gen::<f32>() * geo.width;
        let y = rng.gen::<f32>() * geo.height;
        let size = rng.gen::<f32>() * STAR_MAX_SIZE;
        surface.fill_circle(x, y, size, palette::STAR);
    }
}

pub fn draw_sphere(surface: &mut Surface, geo: &FrameGeometry) {
    surface.fill_radial(
        geo.center_x,
        geo.center_y,
        geo.radius * SPHERE_CORE,
        geo.radius,
        palette::SPHERE_CORE,
        palette::SPHERE_EDGE,
    );
}

/// Flat approximation of parallels and meridians
pub fn draw_grid(surface: &mut Surface, geo: &FrameGeometry, rotation: f32) {
    let r = geo.radius;

    for i in -LATITUDE_RINGS..=LATITUDE_RINGS {
        let f = i as f32 / LATITUDE_SPACING;
        let y = geo.center_y + f * r;
        let rx = (1.0 - f * f).sqrt() * r;
        surface.stroke_ellipse(geo.center_x, y, rx, rx * LATITUDE_FLATTEN, 0.0, palette::GRID);
    }

    for i in 0..LONGITUDE_RINGS {
        let angle = i as f32 * FRAC_PI_4 + rotation;
        surface.stroke_ellipse(geo.center_x, geo.center_y, r * angle.cos().abs(), r, angle, palette::GRID);
    }
}

pub fn draw_atmosphere(surface: &mut Surface, geo: &FrameGeometry) {
    surface.fill_radial(
        geo.center_x,
        geo.center_y,
        geo.radius,
        geo.radius * ATMOSPHERE_SCALE,
        palette::ATMOSPHERE_INNER,
        palette::ATMOSPHERE_OUTER,
    );
}

/// Draw every front-facing node and record where it landed.
///
/// Back-facing nodes lose their cache entry so they can't be hit from behind.
/// Returns the number of markers drawn.
pub fn draw_markers(
    surface: &mut Surface,
    geo: &FrameGeometry,
    nodes: &[Node],
    rotation: f32,
    now_ms: f64,
    hovered: Option<&str>,
    cache: &mut ProjectionCache,
) -> usize {
    let marker_radius = MARKER_BASE_RADIUS * pulse_scale(now_ms);
    let mut drawn = 0;

    for node in nodes {
        let p = project(node.lat, node.lng, rotation, geo.center_x, geo.center_y, geo.radius);
        if !p.visible {
            cache.remove(&node.id);
            continue;
        }

        let color = node.kind.color();
        surface.fill_radial(p.x, p.y, 0.0, marker_radius * MARKER_GLOW_FACTOR, color, palette::TRANSPARENT);

        let dot = if hovered == Some(node.id.as_str()) {
            marker_radius * MARKER_HOVER_FACTOR
        } else {
            marker_radius
        };
        surface.fill_circle(p.x, p.y, dot, color);

        cache.insert(
            &node.id,
            ProjectedPosition { x: p.x, y: p.y, marker_radius },
        );
        drawn += 1;
    }

    drawn
}

/// Advance an angle by one frame step, wrapped into [0, 2pi)
pub fn advance_rotation(rotation: f32, step: f32) -> f32 {
    (rotation + step).rem_euclid(TAU)
}

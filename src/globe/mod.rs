//! Rotating globe with clickable report markers
//!
//! `GlobeEngine` owns the drawing surface, the rotation, the pending frame
//! request and the marker position cache. The host feeds it node lists,
//! pointer positions and resizes, and calls `render` whenever a frame is due.

pub mod hit;
pub mod projector;
pub mod render;

use crate::node::Node;
use crate::surface::Surface;
use crate::terminal::Cursor;
use hit::{hit_test, ProjectionCache};
use rand::Rng;
use render::FrameGeometry;

pub const DEFAULT_ROTATION_STEP: f32 = 0.001;
pub const DEFAULT_STAR_COUNT: usize = 200;

/// Spin of the globe in radians, advanced once per drawn frame
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RotationState {
    angle: f32,
    step: f32,
}

impl RotationState {
    pub fn new(step: f32) -> Self {
        Self { angle: 0.0, step }
    }

    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn advance(&mut self) {
        self.angle = render::advance_rotation(self.angle, self.step);
    }
}

/// Pending next-frame request, the equivalent of an animation frame handle
#[derive(Debug, Default)]
pub struct AnimationFrame {
    pending: Option<u64>,
    next_id: u64,
}

impl AnimationFrame {
    pub fn request(&mut self) -> u64 {
        self.next_id += 1;
        self.pending = Some(self.next_id);
        self.next_id
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn pending(&self) -> Option<u64> {
        self.pending
    }
}

/// Tunables read once at mount
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EngineOptions {
    pub rotation_step: f32,
    pub star_count: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            rotation_step: DEFAULT_ROTATION_STEP,
            star_count: DEFAULT_STAR_COUNT,
        }
    }
}

pub struct GlobeEngine {
    surface: Surface,
    rotation: RotationState,
    frame: AnimationFrame,
    cache: ProjectionCache,
    nodes: Vec<Node>,
    hovered: Option<String>,
    cursor: Cursor,
    star_count: usize,
    listening: bool,
    frames_drawn: u64,
}

impl GlobeEngine {
    /// Attach to a surface of the given displayed size.
    ///
    /// `None` means the host has no drawing surface yet; nothing starts.
    pub fn mount(display: Option<(f32, f32)>, density: f32, options: EngineOptions) -> Option<Self> {
        let Some((width, height)) = display else {
            tracing::debug!("no drawing surface, globe not started");
            return None;
        };

        let mut engine = Self {
            surface: Surface::new(),
            rotation: RotationState::new(options.rotation_step),
            frame: AnimationFrame::default(),
            cache: ProjectionCache::new(),
            nodes: Vec::new(),
            hovered: None,
            cursor: Cursor::Default,
            star_count: options.star_count,
            listening: true,
            frames_drawn: 0,
        };
        engine.resize(width, height, density);
        engine.frame.request();
        tracing::info!(width, height, density, "globe mounted");
        Some(engine)
    }

    /// Cancel the pending frame and stop reacting to input
    pub fn unmount(&mut self) {
        if !self.listening {
            return;
        }
        self.frame.cancel();
        self.listening = false;
        self.hovered = None;
        self.cursor = Cursor::Default;
        tracing::info!(frames = self.frames_drawn, "globe unmounted");
    }

    pub fn is_running(&self) -> bool {
        self.listening && self.frame.pending().is_some()
    }

    /// Replace the node list wholesale. Cache entries for vanished ids are dropped.
    pub fn set_nodes(&mut self, nodes: Vec<Node>) {
        self.nodes = nodes;
        self.cache.retain_nodes(&self.nodes);
        if let Some(id) = &self.hovered {
            if !self.nodes.iter().any(|n| &n.id == id) {
                self.hovered = None;
                self.cursor = Cursor::Default;
            }
        }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Match the backing buffer to the displayed size and re-apply the density scale
    pub fn resize(&mut self, width: f32, height: f32, density: f32) {
        self.surface.resize(width, height, density);
        self.surface.scale(self.surface.density());
        tracing::debug!(width, height, density, "globe resized");
    }

    /// Draw one frame if one is pending, then request the next.
    ///
    /// Returns true if anything was drawn. A zero-sized surface skips drawing
    /// (and rotation) but keeps the loop alive.
    pub fn render<R: Rng>(&mut self, now_ms: f64, rng: &mut R) -> bool {
        if self.frame.pending().is_none() {
            return false;
        }
        self.cache.retain_nodes(&self.nodes);

        let (width, height) = self.surface.logical_size();
        let drawn = match FrameGeometry::new(width, height) {
            Some(geo) if !self.surface.is_empty() => {
                let rotation = self.rotation.angle();
                render::draw_backdrop(&mut self.surface, &geo, self.star_count, rng);
                render::draw_sphere(&mut self.surface, &geo);
                render::draw_grid(&mut self.surface, &geo, rotation);
                render::draw_atmosphere(&mut self.surface, &geo);
                if !self.nodes.is_empty() {
                    render::draw_markers(
                        &mut self.surface,
                        &geo,
                        &self.nodes,
                        rotation,
                        now_ms,
                        self.hovered.as_deref(),
                        &mut self.cache,
                    );
                }
                self.rotation.advance();
                self.frames_drawn += 1;
                true
            }
            _ => false,
        };

        self.frame.request();
        drawn
    }

    /// Track hover under the pointer, returns the cursor the host should show
    pub fn pointer_move(&mut self, px: f32, py: f32) -> Cursor {
        if !self.listening {
            return self.cursor;
        }
        match hit_test(&self.nodes, &self.cache, px, py) {
            Some(node) => {
                self.hovered = Some(node.id.clone());
                self.cursor = Cursor::Pointer;
            }
            None => {
                self.hovered = None;
                self.cursor = Cursor::Default;
            }
        }
        self.cursor
    }

    /// Resolve a click and hand the node to `on_click`. Returns true on a hit.
    pub fn click<F: FnOnce(&Node)>(&self, px: f32, py: f32, on_click: F) -> bool {
        if !self.listening {
            return false;
        }
        match hit_test(&self.nodes, &self.cache, px, py) {
            Some(node) => {
                on_click(node);
                true
            }
            None => false,
        }
    }

    /// Stop the loop after the host lost its surface
    pub fn surface_lost(&mut self) {
        tracing::warn!("drawing surface unavailable, stopping globe");
        self.unmount();
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    /// Cursor for the current hover state
    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    #[cfg(test)]
    pub fn rotation(&self) -> f32 {
        self.rotation.angle()
    }

    #[cfg(test)]
    pub fn frames_drawn(&self) -> u64 {
        self.frames_drawn
    }

    #[cfg(test)]
    pub fn cache(&self) -> &ProjectionCache {
        &self.cache
    }

    #[cfg(test)]
    fn hovered(&self) -> Option<&str> {
        self.hovered.as_deref()
    }
}

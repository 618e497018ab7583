//! Non-interactive commands: render to stdout, dump projections

use crate::braille;
use crate::config::GlobeConfig;
use crate::globe::projector::project;
use crate::globe::render::FrameGeometry;
use crate::globe::GlobeEngine;
use crate::node::{Node, NodeSource};
use crate::terminal::Terminal;
use rand::rngs::StdRng;
use std::io;

/// Nominal wall-clock spacing between off-screen frames
const FRAME_MS: f64 = 16.0;

/// Render `frames` frames off-screen and print the last one
pub fn snapshot(config: &GlobeConfig, cols: u16, rows: u16, frames: u32, start_ms: f64, rng: &mut StdRng) -> io::Result<()> {
    let source = NodeSource::open(config.nodes.clone())?;
    let mut term = Terminal::offscreen(cols, rows);

    let display = braille::display_size(cols, rows, config.density);
    let Some(mut engine) = GlobeEngine::mount(Some(display), config.density, config.engine_options()) else {
        return Ok(());
    };
    engine.set_nodes(config.filter.apply(source.nodes()));

    for i in 0..frames.max(1) {
        engine.render(start_ms + i as f64 * FRAME_MS, rng);
    }
    engine.unmount();

    braille::compose(engine.surface(), &mut term);
    term.print_to_stdout()
}

/// One line per node: id, lat, lng, x, y, z, visible
pub fn projection_table(nodes: &[Node], cols: u16, rows: u16, density: f32, rotation: f32) -> Vec<String> {
    let (w, h) = braille::display_size(cols, rows, density);
    let Some(geo) = FrameGeometry::new(w, h) else {
        tracing::warn!(cols, rows, "surface has no area, nothing to project");
        return Vec::new();
    };

    nodes
        .iter()
        .map(|n| {
            let p = project(n.lat, n.lng, rotation, geo.center_x, geo.center_y, geo.radius);
            format!(
                "{}\t{:.4}\t{:.4}\t{:.2}\t{:.2}\t{:.2}\t{}",
                n.id, n.lat, n.lng, p.x, p.y, p.z, p.visible
            )
        })
        .collect()
}

pub fn project_nodes(config: &GlobeConfig, cols: u16, rows: u16, rotation: f32) -> io::Result<()> {
    let source = NodeSource::open(config.nodes.clone())?;
    let nodes = config.filter.apply(source.nodes());
    println!("id\tlat\tlng\tx\ty\tz\tvisible");
    for line in projection_table(&nodes, cols, rows, config.density, rotation) {
        println!("{}", line);
    }
    Ok(())
}

//! Braille compositor: turns a surface into terminal cells
//!
//! Every terminal cell covers a 2x4 block of device pixels. Pixels bright
//! enough to read as ink become braille dots colored with their mean color;
//! the rest are averaged into the cell background.

use crate::colors::{mean, Rgb};
use crate::surface::Surface;
use crate::terminal::{Cell, Terminal};

/// Device pixels per terminal cell
pub const DOTS_X: usize = 2;
pub const DOTS_Y: usize = 4;

/// Luminance above which a pixel lights its dot
const INK_THRESHOLD: f32 = 0.2;

/// (row offset, column offset) for each braille bit, in bit order
const DOT_POSITIONS: [(usize, usize); 8] = [
    (0, 0), (1, 0), (2, 0),
    (0, 1), (1, 1), (2, 1),
    (3, 0), (3, 1),
];
const DOT_BITS: [u8; 8] = [0x01, 0x02, 0x04, 0x08, 0x10, 0x20, 0x40, 0x80];

/// Displayed size, in logical pixels, of a terminal of `cols` x `rows`
pub fn display_size(cols: u16, rows: u16, density: f32) -> (f32, f32) {
    (
        cols as f32 * DOTS_X as f32 / density,
        rows as f32 * DOTS_Y as f32 / density,
    )
}

/// Surface-local logical coordinates of the center of a terminal cell
pub fn cell_to_surface(col: u16, row: u16, density: f32) -> (f32, f32) {
    (
        (col as f32 + 0.5) * DOTS_X as f32 / density,
        (row as f32 + 0.5) * DOTS_Y as f32 / density,
    )
}

/// Compose a single cell from up to eight device pixels
fn compose_cell(surface: &Surface, cx: usize, cy: usize) -> Cell {
    let (bx, by) = (cx * DOTS_X, cy * DOTS_Y);
    let mut dots: u8 = 0;
    let mut ink: Vec<Rgb> = Vec::with_capacity(8);
    let mut paper: Vec<Rgb> = Vec::with_capacity(8);

    for (i, &(dy, dx)) in DOT_POSITIONS.iter().enumerate() {
        let Some(px) = surface.pixel(bx + dx, by + dy) else {
            continue;
        };
        if px.luminance() > INK_THRESHOLD {
            dots |= DOT_BITS[i];
            ink.push(px);
        } else {
            paper.push(px);
        }
    }

    let ch = if dots > 0 {
        char::from_u32(0x2800 + dots as u32).unwrap_or(' ')
    } else {
        ' '
    };
    Cell {
        ch,
        fg: mean(&ink).map(Rgb::to_color),
        bg: mean(&paper).or_else(|| mean(&ink)).map(Rgb::to_color),
        bold: false,
    }
}

/// Write the whole surface into the terminal back buffer
pub fn compose(surface: &Surface, term: &mut Terminal) {
    let (width, height) = term.size();
    for cy in 0..height as usize {
        for cx in 0..width as usize {
            term.put(cx as i32, cy as i32, compose_cell(surface, cx, cy));
        }
    }
}

use crate::terminal::Terminal;
use crossterm::style::Color;

const PANEL_BG: Color = Color::Rgb { r: 8, g: 16, b: 30 };

/// A line of overlay text with its color
pub struct Line {
    pub text: String,
    pub color: Color,
    pub bold: bool,
}

impl Line {
    pub fn plain(text: impl Into<String>) -> Self {
        Self { text: text.into(), color: Color::Grey, bold: false }
    }

    pub fn colored(text: impl Into<String>, color: Color, bold: bool) -> Self {
        Self { text: text.into(), color, bold }
    }
}

/// Draw a bordered box with its top-left corner at (x, y)
pub fn render_box(term: &mut Terminal, x: usize, y: usize, lines: &[Line], border_color: Color) {
    let max_width = lines.iter().map(|l| l.text.chars().count()).max().unwrap_or(0);
    let box_width = max_width + 4; // 2 chars padding each side
    let box_height = lines.len() + 2;

    for row in 0..box_height {
        term.fill_bg(x as i32, (y + row) as i32, box_width, PANEL_BG);
    }

    // ┌─────┐
    term.set(x as i32, y as i32, '┌', Some(border_color), false);
    for i in 1..box_width - 1 {
        term.set((x + i) as i32, y as i32, '─', Some(border_color), false);
    }
    term.set((x + box_width - 1) as i32, y as i32, '┐', Some(border_color), false);

    for (i, line) in lines.iter().enumerate() {
        let row = (y + 1 + i) as i32;
        term.set(x as i32, row, '│', Some(border_color), false);

        let padding = max_width.saturating_sub(line.text.chars().count());
        let padded = format!(" {}{} ", line.text, " ".repeat(padding));
        for (j, ch) in padded.chars().enumerate() {
            term.set((x + 1 + j) as i32, row, ch, Some(line.color), line.bold);
        }

        term.set((x + box_width - 1) as i32, row, '│', Some(border_color), false);
    }

    // └─────┘
    let bottom = (y + box_height - 1) as i32;
    term.set(x as i32, bottom, '└', Some(border_color), false);
    for i in 1..box_width - 1 {
        term.set((x + i) as i32, bottom, '─', Some(border_color), false);
    }
    term.set((x + box_width - 1) as i32, bottom, '┘', Some(border_color), false);
}

/// Render a centered help overlay box with the provided text.
pub fn render_help_overlay(term: &mut Terminal, help_text: &str) {
    if help_text.is_empty() {
        return;
    }
    let (width, height) = term.size();
    let lines: Vec<Line> = help_text.lines().map(Line::plain).collect();
    let max_width = lines.iter().map(|l| l.text.chars().count()).max().unwrap_or(0);

    let start_x = (width as usize).saturating_sub(max_width + 4) / 2;
    let start_y = (height as usize).saturating_sub(lines.len() + 2) / 2;
    render_box(term, start_x, start_y, &lines, Color::White);
}

/// Wrap text to `width` columns on word boundaries
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;
    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        if current_len > 0 && current_len + 1 + word_len > width {
            out.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current.push_str(word);
        current_len += word_len;
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

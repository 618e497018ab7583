//! Interactive globe session: terminal events in, frames out

use crate::braille;
use crate::config::GlobeConfig;
use crate::globe::GlobeEngine;
use crate::help::{render_box, render_help_overlay, wrap, Line};
use crate::node::{Node, NodeFilter, NodeKind, NodeSource, NodeStatus};
use crate::terminal::{Cursor, TermEvent, Terminal};
use chrono::Utc;
use crossterm::event::KeyCode;
use crossterm::style::Color;
use rand::rngs::StdRng;
use std::io;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// Help text for the globe
const HELP: &str = "\
CIVIGLOBE
─────────────────
click  Show report
f      Cycle need/help filter
r      Reload reports
space  Pause
1-9    Frame pacing
?      Toggle help
Esc    Close panel
q      Quit";

const PANEL_TEXT_WIDTH: usize = 34;
const URGENCY_BAR_WIDTH: usize = 10;

/// What a keypress asks the session to do
#[derive(Debug, PartialEq)]
enum Action {
    None,
    Quit,
    Reload,
    Refilter,
}

/// Runtime state for interactive controls
struct SessionState {
    frame_interval: Duration,
    paused: bool,
    show_help: bool,
    selected: Option<Node>,
    filter: NodeFilter,
}

impl SessionState {
    fn new(time_step: f32, filter: NodeFilter) -> Self {
        Self {
            frame_interval: Duration::from_secs_f32(time_step),
            paused: false,
            show_help: false,
            selected: None,
            filter,
        }
    }

    fn handle_key(&mut self, code: KeyCode) -> Action {
        match code {
            KeyCode::Char('q') => return Action::Quit,
            KeyCode::Esc => {
                if self.show_help {
                    self.show_help = false;
                } else if self.selected.take().is_none() {
                    return Action::Quit;
                }
            }
            KeyCode::Char(' ') => self.paused = !self.paused,
            KeyCode::Char('?') | KeyCode::Char('h') => self.show_help = !self.show_help,
            KeyCode::Char('r') => return Action::Reload,
            KeyCode::Char('f') => {
                self.filter.cycle_kind();
                return Action::Refilter;
            }
            // Number keys: frame pacing (1=fastest, 9=slowest)
            KeyCode::Char(c) if c.is_ascii_digit() && c != '0' => {
                let secs = match c {
                    '1' => 0.008,
                    '2' => 0.016,
                    '3' => 0.033,
                    '4' => 0.05,
                    '5' => 0.07,
                    '6' => 0.1,
                    '7' => 0.15,
                    '8' => 0.2,
                    _ => 0.3,
                };
                self.frame_interval = Duration::from_secs_f32(secs);
            }
            _ => {}
        }
        Action::None
    }

    /// Keep the open panel in sync with a fresh node list
    fn refresh_selection(&mut self, nodes: &[Node]) {
        if let Some(selected) = &self.selected {
            self.selected = nodes.iter().find(|n| n.id == selected.id).cloned();
        }
    }
}

pub(crate) fn now_ms() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
        * 1000.0
}

fn kind_color(kind: NodeKind) -> Color {
    let c = kind.color();
    Color::Rgb { r: c.r, g: c.g, b: c.b }
}

fn urgency_bar(urgency: u8) -> String {
    let filled = (urgency.min(100) as usize * URGENCY_BAR_WIDTH + 50) / 100;
    format!(
        "{}{} {}",
        "█".repeat(filled),
        "░".repeat(URGENCY_BAR_WIDTH - filled),
        urgency
    )
}

/// Details of the clicked report, docked to the right edge
fn render_info_panel(term: &mut Terminal, node: &Node) {
    let status = match node.status {
        NodeStatus::Active => "active",
        NodeStatus::Matched => "matched",
        NodeStatus::Resolved => "resolved",
    };
    let mut lines = vec![
        Line::colored(format!("● {}", node.kind.label()), kind_color(node.kind), true),
        Line::plain(""),
        Line::plain(format!("Category  {}", node.category)),
        Line::plain(format!("Location  {}", node.location)),
        Line::plain(format!("Urgency   {}", urgency_bar(node.urgency))),
        Line::plain(format!("Trust     {}%", node.trust_level)),
        Line::plain(format!("Status    {}", status)),
    ];
    if let Some(age) = node.age(Utc::now()) {
        lines.push(Line::plain(format!("Reported  {}", age)));
    }
    if !node.verified_by.is_empty() {
        lines.push(Line::plain(format!("Verified  {} users", node.verified_by.len())));
    }
    if !node.description.is_empty() {
        lines.push(Line::plain(""));
        lines.extend(
            wrap(&node.description, PANEL_TEXT_WIDTH)
                .into_iter()
                .map(|l| Line::colored(l, Color::White, false)),
        );
    }

    let (width, _) = term.size();
    let x = (width as usize).saturating_sub(PANEL_TEXT_WIDTH + 6);
    render_box(term, x, 1, &lines, kind_color(node.kind));
}

/// Counters along the bottom row
fn render_status(term: &mut Terminal, nodes: &[Node], filter: &NodeFilter, paused: bool) {
    let (width, height) = term.size();
    if height == 0 {
        return;
    }
    let needs = nodes.iter().filter(|n| n.kind == NodeKind::Need).count();
    let helps = nodes.len() - needs;
    let scope = match filter.kind {
        None => "all",
        Some(NodeKind::Need) => "needs",
        Some(NodeKind::Help) => "help",
    };
    let y = height as i32 - 1;
    let mut x = 1;
    let mut put = |term: &mut Terminal, text: String, color: Color| {
        term.set_str(x, y, &text, Some(color), false);
        x += text.chars().count() as i32 + 2;
    };
    put(term, format!("{} active", nodes.len()), Color::Cyan);
    put(term, format!("{} needs", needs), kind_color(NodeKind::Need));
    put(term, format!("{} help", helps), kind_color(NodeKind::Help));
    put(term, format!("[{}]", scope), Color::DarkGrey);
    if paused {
        put(term, "PAUSED".to_string(), Color::Yellow);
    }
    let hint = "? help";
    term.set_str(width as i32 - hint.len() as i32 - 1, y, hint, Some(Color::DarkGrey), false);
}

/// Hand the filtered node list to the engine and resync everything that
/// depends on it. A vanished hovered node resets the pointer shape here,
/// not on the next mouse move.
fn apply_nodes(term: &mut Terminal, engine: &mut GlobeEngine, state: &mut SessionState, nodes: &[Node]) -> io::Result<()> {
    engine.set_nodes(state.filter.apply(nodes));
    state.refresh_selection(engine.nodes());
    term.set_pointer_shape(engine.cursor())
}

/// Compose the last globe frame with the status line and overlays
fn draw_frame(term: &mut Terminal, engine: &GlobeEngine, state: &SessionState) {
    braille::compose(engine.surface(), term);
    render_status(term, engine.nodes(), &state.filter, state.paused);
    if let Some(node) = &state.selected {
        render_info_panel(term, node);
    }
    if state.show_help {
        render_help_overlay(term, HELP);
    }
}

/// Run the interactive globe until quit or until the terminal goes away
pub fn run(term: &mut Terminal, config: &GlobeConfig, rng: &mut StdRng) -> io::Result<()> {
    let mut source = NodeSource::open(config.nodes.clone())?;
    let mut state = SessionState::new(config.time_step, config.filter.clone());
    let density = config.density;

    let (cols, rows) = term.size();
    let display = (cols > 0 && rows > 0).then(|| braille::display_size(cols, rows, density));
    let Some(mut engine) = GlobeEngine::mount(display, density, config.engine_options()) else {
        return Ok(());
    };
    term.set_mouse_capture(true)?;
    apply_nodes(term, &mut engine, &mut state, source.nodes())?;

    let mut next_frame = Instant::now();

    while engine.is_running() {
        let (width, height) = term.query_size();
        if (width, height) != term.size() {
            term.resize(width, height);
            term.clear_screen()?;
            let (w, h) = braille::display_size(width, height, density);
            engine.resize(w, h, density);
        }

        let timeout = next_frame.saturating_duration_since(Instant::now());
        match term.poll_event(timeout)? {
            Some(TermEvent::Key(code, _)) => match state.handle_key(code) {
                Action::Quit => engine.unmount(),
                Action::Reload => {
                    source.reload();
                    apply_nodes(term, &mut engine, &mut state, source.nodes())?;
                }
                Action::Refilter => apply_nodes(term, &mut engine, &mut state, source.nodes())?,
                Action::None => {}
            },
            Some(TermEvent::PointerMove(col, row)) => {
                let (px, py) = braille::cell_to_surface(col, row, density);
                let cursor = engine.pointer_move(px, py);
                term.set_pointer_shape(cursor)?;
            }
            Some(TermEvent::Click(col, row)) => {
                let (px, py) = braille::cell_to_surface(col, row, density);
                let mut clicked = None;
                engine.click(px, py, |node| clicked = Some(node.clone()));
                if let Some(node) = &clicked {
                    tracing::debug!(id = %node.id, "node clicked");
                }
                state.selected = clicked;
            }
            Some(TermEvent::Resize(w, h)) => {
                term.resize(w, h);
                let (dw, dh) = braille::display_size(w, h, density);
                engine.resize(dw, dh, density);
            }
            None => {}
        }

        let now = Instant::now();
        if now < next_frame || !engine.is_running() {
            continue;
        }
        next_frame = now + state.frame_interval;

        if source.poll_reload(now) {
            apply_nodes(term, &mut engine, &mut state, source.nodes())?;
        }

        // Paused holds the spin, the overlays keep updating
        if !state.paused {
            engine.render(now_ms(), rng);
        }
        draw_frame(term, &engine, &state);

        if let Err(e) = term.present() {
            tracing::warn!(error = %e, "present failed");
            engine.surface_lost();
        }
    }

    term.set_pointer_shape(Cursor::Default)?;
    term.set_mouse_capture(false)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::globe::EngineOptions;
    use rand::SeedableRng;

    fn state() -> SessionState {
        SessionState::new(0.016, NodeFilter::default())
    }

    #[test]
    fn escape_closes_panel_before_quitting() {
        let mut s = state();
        s.selected = Some(Node::new("a", NodeKind::Need, 0.0, 0.0));
        assert_eq!(s.handle_key(KeyCode::Esc), Action::None);
        assert!(s.selected.is_none());
        assert_eq!(s.handle_key(KeyCode::Esc), Action::Quit);
    }

    #[test]
    fn filter_key_cycles_kind() {
        let mut s = state();
        assert_eq!(s.handle_key(KeyCode::Char('f')), Action::Refilter);
        assert_eq!(s.filter.kind, Some(NodeKind::Need));
    }

    #[test]
    fn digits_set_pacing() {
        let mut s = state();
        s.handle_key(KeyCode::Char('9'));
        assert_eq!(s.frame_interval, Duration::from_secs_f32(0.3));
        s.handle_key(KeyCode::Char('1'));
        assert_eq!(s.frame_interval, Duration::from_secs_f32(0.008));
    }

    #[test]
    fn selection_follows_reload() {
        let mut s = state();
        s.selected = Some(Node::new("a", NodeKind::Need, 0.0, 0.0));
        let mut updated = Node::new("a", NodeKind::Need, 0.0, 0.0);
        updated.urgency = 70;
        s.refresh_selection(&[updated]);
        assert_eq!(s.selected.as_ref().map(|n| n.urgency), Some(70));
        s.refresh_selection(&[]);
        assert!(s.selected.is_none());
    }

    #[test]
    fn urgency_bar_scales() {
        assert_eq!(urgency_bar(0), format!("{} 0", "░".repeat(10)));
        assert_eq!(urgency_bar(100), format!("{} 100", "█".repeat(10)));
        assert!(urgency_bar(95).starts_with("██████████"));
    }

    #[test]
    fn info_panel_shows_details() {
        let mut term = Terminal::offscreen(60, 20);
        let mut node = Node::new("7", NodeKind::Need, -23.5, -46.6);
        node.category = "Water".into();
        node.location = "Sao Paulo".into();
        node.description = "Clean water urgently needed".into();
        render_info_panel(&mut term, &node);

        let row = |y: u16| -> String { (0..60).filter_map(|x| term.cell(x, y).map(|c| c.ch)).collect() };
        let text: Vec<String> = (0..20).map(row).collect();
        assert!(text.iter().any(|l| l.contains("Need")));
        assert!(text.iter().any(|l| l.contains("Water")));
        assert!(text.iter().any(|l| l.contains("Clean water urgently needed")));
    }

    #[test]
    fn status_line_counts_kinds() {
        let mut term = Terminal::offscreen(60, 3);
        let nodes = vec![
            Node::new("a", NodeKind::Need, 0.0, 0.0),
            Node::new("b", NodeKind::Help, 0.0, 0.0),
            Node::new("c", NodeKind::Help, 0.0, 0.0),
        ];
        render_status(&mut term, &nodes, &NodeFilter::default(), false);
        let line: String = (0..60).filter_map(|x| term.cell(x, 2).map(|c| c.ch)).collect();
        assert!(line.contains("3 active"));
        assert!(line.contains("1 needs"));
        assert!(line.contains("2 help"));
    }

    fn row_text(term: &Terminal, y: u16) -> String {
        let (width, _) = term.size();
        (0..width).filter_map(|x| term.cell(x, y).map(|c| c.ch)).collect()
    }

    #[test]
    fn paused_frame_still_draws_status_and_panel() {
        let mut term = Terminal::offscreen(60, 12);
        let display = braille::display_size(60, 12, 1.0);
        let engine = GlobeEngine::mount(Some(display), 1.0, EngineOptions::default()).unwrap();
        let mut s = state();
        s.handle_key(KeyCode::Char(' '));
        assert!(s.paused);
        let mut node = Node::new("4", NodeKind::Help, 0.0, 0.0);
        node.category = "Water".into();
        s.selected = Some(node);

        draw_frame(&mut term, &engine, &s);

        assert!(row_text(&term, 11).contains("PAUSED"));
        assert!((0..11).any(|y| row_text(&term, y).contains("Water")));
    }

    #[test]
    fn filtering_out_hovered_node_restores_pointer() {
        let mut term = Terminal::offscreen(60, 12);
        let mut engine = GlobeEngine::mount(Some((200.0, 200.0)), 1.0, EngineOptions::default()).unwrap();
        let mut s = state();
        let nodes = vec![Node::new("a", NodeKind::Need, 0.0, 0.0)];
        apply_nodes(&mut term, &mut engine, &mut s, &nodes).unwrap();
        engine.render(0.0, &mut StdRng::seed_from_u64(1));

        let cursor = engine.pointer_move(30.0, 100.0);
        term.set_pointer_shape(cursor).unwrap();
        assert_eq!(term.pointer_shape(), Cursor::Pointer);

        s.filter.kind = Some(NodeKind::Help);
        apply_nodes(&mut term, &mut engine, &mut s, &nodes).unwrap();
        assert!(engine.nodes().is_empty());
        assert_eq!(term.pointer_shape(), Cursor::Default);
    }
}

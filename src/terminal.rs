use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{
        poll, read, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind,
        KeyModifiers, MouseButton, MouseEventKind,
    },
    execute, queue,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor},
    terminal::{
        disable_raw_mode, enable_raw_mode, size, Clear, ClearType, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use std::io::{self, stdout, Write};
use std::time::Duration;

/// Mouse pointer shape requested from the terminal
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Cursor {
    #[default]
    Default,
    Pointer,
}

impl Cursor {
    fn shape_name(self) -> &'static str {
        match self {
            Cursor::Default => "default",
            Cursor::Pointer => "pointer",
        }
    }
}

/// Input delivered by the terminal, in cell coordinates
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TermEvent {
    Key(KeyCode, KeyModifiers),
    PointerMove(u16, u16),
    Click(u16, u16),
    Resize(u16, u16),
}

/// Terminal abstraction for rendering
pub struct Terminal {
    width: u16,
    height: u16,
    buffer: Vec<Vec<Cell>>,
    alternate_screen: bool,
    mouse_capture: bool,
    cursor: Cursor,
}

/// A single cell in the terminal buffer
#[derive(Clone, Debug, PartialEq)]
pub struct Cell {
    pub ch: char,
    pub fg: Option<Color>,
    pub bg: Option<Color>,
    pub bold: bool,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            fg: None,
            bg: None,
            bold: false,
        }
    }
}

impl Terminal {
    /// Initialize the terminal for drawing
    pub fn new(alternate_screen: bool) -> io::Result<Self> {
        let (width, height) = size()?;

        if alternate_screen {
            enable_raw_mode()?;
            execute!(stdout(), EnterAlternateScreen, Hide)?;
        }

        let mut term = Self::offscreen(width, height);
        term.alternate_screen = alternate_screen;
        Ok(term)
    }

    /// A buffer-only terminal of a fixed size (no tty needed)
    pub fn offscreen(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            buffer: vec![vec![Cell::default(); width as usize]; height as usize],
            alternate_screen: false,
            mouse_capture: false,
            cursor: Cursor::Default,
        }
    }

    /// Get terminal dimensions
    pub fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    /// Current size reported by the tty, falling back to the buffer size
    pub fn query_size(&self) -> (u16, u16) {
        if self.alternate_screen {
            size().unwrap_or(self.size())
        } else {
            self.size()
        }
    }

    /// Resize the back buffer
    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.buffer = vec![vec![Cell::default(); width as usize]; height as usize];
    }

    /// Clear the actual terminal
    pub fn clear_screen(&self) -> io::Result<()> {
        execute!(stdout(), Clear(ClearType::All))?;
        Ok(())
    }

    #[cfg(test)]
    pub fn pointer_shape(&self) -> Cursor {
        self.cursor
    }

    #[cfg(test)]
    pub fn cell(&self, x: u16, y: u16) -> Option<&Cell> {
        self.buffer.get(y as usize).and_then(|row| row.get(x as usize))
    }

    /// Set a character at position with optional color
    pub fn set(&mut self, x: i32, y: i32, ch: char, fg: Option<Color>, bold: bool) {
        if x >= 0 && x < self.width as i32 && y >= 0 && y < self.height as i32 {
            let cell = &mut self.buffer[y as usize][x as usize];
            cell.ch = ch;
            cell.fg = fg;
            cell.bold = bold;
        }
    }

    /// Replace a whole cell including its background
    pub fn put(&mut self, x: i32, y: i32, cell: Cell) {
        if x >= 0 && x < self.width as i32 && y >= 0 && y < self.height as i32 {
            self.buffer[y as usize][x as usize] = cell;
        }
    }

    /// Set a string starting at position
    pub fn set_str(&mut self, x: i32, y: i32, s: &str, fg: Option<Color>, bold: bool) {
        for (i, ch) in s.chars().enumerate() {
            self.set(x + i as i32, y, ch, fg, bold);
        }
    }

    /// Set the background of a horizontal run of cells
    pub fn fill_bg(&mut self, x: i32, y: i32, len: usize, bg: Color) {
        for i in 0..len as i32 {
            if x + i >= 0 && x + i < self.width as i32 && y >= 0 && y < self.height as i32 {
                self.buffer[y as usize][(x + i) as usize].bg = Some(bg);
            }
        }
    }

    /// Render the entire buffer to screen
    pub fn present(&self) -> io::Result<()> {
        let mut stdout = stdout();

        for (y, row) in self.buffer.iter().enumerate() {
            queue!(stdout, MoveTo(0, y as u16))?;

            for cell in row {
                if cell.bold {
                    queue!(stdout, SetAttribute(Attribute::Bold))?;
                }
                if let Some(bg) = cell.bg {
                    queue!(stdout, SetBackgroundColor(bg))?;
                }
                if let Some(color) = cell.fg {
                    queue!(stdout, SetForegroundColor(color))?;
                }
                queue!(stdout, Print(cell.ch))?;
                if cell.bg.is_some() || cell.fg.is_some() {
                    queue!(stdout, ResetColor)?;
                }
                if cell.bold {
                    queue!(stdout, SetAttribute(Attribute::Reset))?;
                }
            }
        }

        stdout.flush()?;
        Ok(())
    }

    /// Start or stop receiving mouse events
    pub fn set_mouse_capture(&mut self, enabled: bool) -> io::Result<()> {
        if enabled == self.mouse_capture || !self.alternate_screen {
            self.mouse_capture = enabled && self.alternate_screen;
            return Ok(());
        }
        if enabled {
            execute!(stdout(), EnableMouseCapture)?;
        } else {
            execute!(stdout(), DisableMouseCapture)?;
        }
        self.mouse_capture = enabled;
        Ok(())
    }

    /// Ask the terminal for a pointer shape (OSC 22). Unsupported terminals ignore it.
    pub fn set_pointer_shape(&mut self, cursor: Cursor) -> io::Result<()> {
        if cursor == self.cursor {
            return Ok(());
        }
        self.cursor = cursor;
        if self.alternate_screen {
            let mut out = stdout();
            write!(out, "\x1b]22;{}\x07", cursor.shape_name())?;
            out.flush()?;
        }
        Ok(())
    }

    /// Wait up to `timeout` for input, returns None on timeout or ignored events
    pub fn poll_event(&self, timeout: Duration) -> io::Result<Option<TermEvent>> {
        if !poll(timeout)? {
            return Ok(None);
        }
        let event = match read()? {
            Event::Key(key) if key.kind != KeyEventKind::Release => {
                Some(TermEvent::Key(key.code, key.modifiers))
            }
            Event::Mouse(mouse) => match mouse.kind {
                MouseEventKind::Moved | MouseEventKind::Drag(_) => {
                    Some(TermEvent::PointerMove(mouse.column, mouse.row))
                }
                MouseEventKind::Down(MouseButton::Left) => Some(TermEvent::Click(mouse.column, mouse.row)),
                _ => None,
            },
            Event::Resize(w, h) => Some(TermEvent::Resize(w, h)),
            _ => None,
        };
        Ok(event)
    }

    /// Print buffer to stdout with ANSI colors (for snapshot mode)
    pub fn print_to_stdout(&self) -> io::Result<()> {
        let mut out = stdout().lock();
        for row in &self.buffer {
            for cell in row {
                if cell.bold {
                    write!(out, "\x1b[1m")?;
                }
                if let Some(Color::Rgb { r, g, b }) = cell.bg {
                    write!(out, "\x1b[48;2;{};{};{}m", r, g, b)?;
                }
                if let Some(Color::Rgb { r, g, b }) = cell.fg {
                    write!(out, "\x1b[38;2;{};{};{}m", r, g, b)?;
                }
                write!(out, "{}\x1b[0m", cell.ch)?;
            }
            writeln!(out)?;
        }
        out.flush()
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        if self.alternate_screen {
            let _ = self.set_pointer_shape(Cursor::Default);
            let _ = self.set_mouse_capture(false);
            let _ = execute!(stdout(), Show, LeaveAlternateScreen);
            let _ = disable_raw_mode();
        }
    }
}

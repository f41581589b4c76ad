use std::io::{self, Stdout, Write};

use chip::{
    definitions::display,
    devices::{DisplayCommands, ToneCommands},
    display::DisplayBuffer,
};
use crossterm::{
    cursor::{Hide, Show},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use tui::{
    backend::CrosstermBackend,
    layout::Rect,
    style::{Color, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, Paragraph},
    Terminal,
};

/// Two pixel rows share one terminal cell.
fn half_block(top: bool, bottom: bool) -> char {
    match (top, bottom) {
        (true, true) => '█',
        (true, false) => '▀',
        (false, true) => '▄',
        (false, false) => ' ',
    }
}

/// Renders the display buffer into text lines, one line per two pixel rows.
pub fn render_lines(buffer: &DisplayBuffer) -> Vec<String> {
    (0..display::ROWS)
        .step_by(2)
        .map(|y| {
            (0..display::COLUMNS)
                .map(|x| {
                    let bottom = y + 1 < display::ROWS && buffer.get_pixel(x, y + 1);
                    half_block(buffer.get_pixel(x, y), bottom)
                })
                .collect()
        })
        .collect()
}

/// The information shown below the screen.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Status {
    pub name: String,
    pub tone: bool,
    pub waiting: bool,
}

impl Status {
    fn line(&self) -> String {
        let mut line = format!(" {} ", self.name);
        if self.tone {
            line.push_str("| ♪ ");
        }
        if self.waiting {
            line.push_str("| waiting for a key ");
        }
        line.push_str("| esc quits ");
        line
    }
}

/// Puts the terminal into raw mode on the alternate screen, restored again on drop.
pub struct TerminalDisplay {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    status: Status,
    error: Option<io::Error>,
}

impl TerminalDisplay {
    pub fn new() -> anyhow::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, Hide)?;
        let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        terminal.clear()?;
        Ok(Self {
            terminal,
            status: Status::default(),
            error: None,
        })
    }

    pub fn status_mut(&mut self) -> &mut Status {
        &mut self.status
    }

    /// Will return the last failed draw, if there was one.
    pub fn take_error(&mut self) -> Option<io::Error> {
        self.error.take()
    }

    fn draw(&mut self, buffer: &DisplayBuffer) -> io::Result<()> {
        let lines: Vec<Spans> = render_lines(buffer)
            .into_iter()
            .map(|line| Spans::from(Span::raw(line)))
            .collect();
        let status = self.status.line();

        self.terminal.draw(|f| {
            let area = f.size();
            let screen = Rect::new(
                0,
                0,
                (display::COLUMNS as u16 + 2).min(area.width),
                (display::ROWS as u16 / 2 + 2).min(area.height),
            );
            let block = Block::default()
                .title(Span::styled(status, Style::default().fg(Color::Yellow)))
                .borders(Borders::ALL);
            let paragraph = Paragraph::new(lines)
                .block(block)
                .style(Style::default().fg(Color::White).bg(Color::Black));
            f.render_widget(paragraph, screen);
        })?;
        Ok(())
    }
}

impl DisplayCommands for TerminalDisplay {
    fn display(&mut self, buffer: &DisplayBuffer) {
        if let Err(err) = self.draw(buffer) {
            self.error = Some(err);
        }
    }
}

impl Drop for TerminalDisplay {
    fn drop(&mut self) {
        if let Err(err) = disable_raw_mode() {
            log::error!("unable to leave the raw mode: {}", err);
        }
        if let Err(err) = execute!(self.terminal.backend_mut(), LeaveAlternateScreen, Show) {
            log::error!("unable to restore the screen: {}", err);
        }
    }
}

/// Rings the terminal bell whenever the tone starts.
pub struct TerminalTone<W: Write> {
    out: W,
    audible: bool,
}

impl<W: Write> TerminalTone<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            audible: false,
        }
    }

    pub fn is_audible(&self) -> bool {
        self.audible
    }
}

impl<W: Write> ToneCommands for TerminalTone<W> {
    fn set_tone(&mut self, audible: bool) {
        if audible && !self.audible {
            let res = self.out.write_all(b"\x07").and_then(|_| self.out.flush());
            if let Err(err) = res {
                log::warn!("unable to ring the bell: {}", err);
            }
        }
        self.audible = audible;
    }
}

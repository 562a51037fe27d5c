//! Text rendering of the report

use std::io;

use termion::{color, style};

pub mod format;
pub mod layout;
pub mod section;

/// Width assumed when the output is not a terminal
pub const DEFAULT_WIDTH: usize = 120;

/// Returns the width of the terminal on which the report is displayed
pub fn terminal_width() -> usize {
    if !termion::is_tty(&io::stdout()) {
        return DEFAULT_WIDTH;
    }

    termion::terminal_size()
        .map(|(width, _)| width as usize)
        .unwrap_or(DEFAULT_WIDTH)
}

/// Indicates if the report is written to a terminal, which can display colors
pub fn stdout_is_tty() -> bool {
    termion::is_tty(&io::stdout())
}

/// Role of a line within the report
#[derive(Eq, PartialEq, Debug, Copy, Clone)]
pub enum Style {
    Title,
    Header,
    Node,
    Process,
    Unavailable,
}

/// Decorates lines with ANSI colors, if enabled
#[derive(Debug, Copy, Clone)]
pub struct Palette {
    enabled: bool,
}

impl Palette {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn paint(&self, line_style: Style, text: &str) -> String {
        if !self.enabled {
            return text.to_string();
        }

        match line_style {
            Style::Title => format!("{}{}{}{}", style::Bold, color::Fg(color::Blue), text, style::Reset),
            Style::Header => format!("{}{}{}", style::Underline, text, style::Reset),
            Style::Node => text.to_string(),
            Style::Process => format!("{}{}{}", color::Fg(color::LightBlack), text, style::Reset),
            Style::Unavailable => format!("{}{}{}", color::Fg(color::Red), text, style::Reset),
        }
    }
}

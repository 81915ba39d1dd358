//! Row-addressable output sink.
//!
//! The renderer only needs two operations from a display surface: replace
//! the text of row N and make the result visible. `TermScreen` implements
//! that on the terminal via crossterm; `CaptureScreen` records rows for
//! tests.

use std::io::{self, Write};

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::execute;
use crossterm::style::Print;
use crossterm::terminal::{Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};

/// Minimal display surface contract: write a row, then refresh.
pub trait Screen {
    fn put_row(&mut self, row: u16, text: &str) -> io::Result<()>;
    fn refresh(&mut self) -> io::Result<()>;
}

/// Terminal-backed screen using the alternate screen buffer.
///
/// Dropping it restores the primary screen and cursor, so an orderly
/// shutdown needs no extra teardown call.
pub struct TermScreen {
    out: io::Stdout,
}

impl TermScreen {
    pub fn new() -> io::Result<Self> {
        let mut out = io::stdout();
        execute!(out, EnterAlternateScreen, Hide)?;
        Ok(Self { out })
    }
}

impl Screen for TermScreen {
    fn put_row(&mut self, row: u16, text: &str) -> io::Result<()> {
        execute!(
            self.out,
            MoveTo(0, row),
            Clear(ClearType::CurrentLine),
            Print(text)
        )
    }

    fn refresh(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

impl Drop for TermScreen {
    fn drop(&mut self) {
        let _ = execute!(self.out, LeaveAlternateScreen, Show);
    }
}

/// Screen that records rows in memory, for tests.
#[derive(Debug, Default)]
pub struct CaptureScreen {
    rows: Vec<String>,
    refreshes: usize,
}

impl CaptureScreen {
    pub fn new() -> Self {
        Self::default()
    }

    /// Text of `row`, empty if never written.
    pub fn row(&self, row: usize) -> &str {
        self.rows.get(row).map(String::as_str).unwrap_or("")
    }

    pub fn refreshes(&self) -> usize {
        self.refreshes
    }
}

impl Screen for CaptureScreen {
    fn put_row(&mut self, row: u16, text: &str) -> io::Result<()> {
        let row = row as usize;
        if self.rows.len() <= row {
            self.rows.resize(row + 1, String::new());
        }
        self.rows[row] = text.to_string();
        Ok(())
    }

    fn refresh(&mut self) -> io::Result<()> {
        self.refreshes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_screen_records_rows() {
        let mut screen = CaptureScreen::new();
        screen.put_row(1, "values").unwrap();
        screen.put_row(0, "header").unwrap();
        screen.refresh().unwrap();

        assert_eq!(screen.row(0), "header");
        assert_eq!(screen.row(1), "values");
        assert_eq!(screen.refreshes(), 1);
    }
}

//! Frame output for the top-level loop.

use std::io::{self, Write};

/// ANSI "cursor home, clear screen".
pub const CLEAR_SCREEN: &str = "\x1b[H\x1b[2J";

/// Receives rendered frames and terminal notices from the runner.
pub trait FrameSink {
    /// Called with each rendered grid.
    fn frame(&mut self, frame: &str) -> io::Result<()>;

    /// Called with one-line status messages.
    fn notice(&mut self, message: &str) -> io::Result<()>;
}

/// Writes frames to a terminal (or any writer).
pub struct TerminalSink<W: Write> {
    out: W,
    clear: bool,
}

impl TerminalSink<io::Stdout> {
    /// Sink on stdout.
    pub fn stdout(clear: bool) -> Self {
        Self::new(io::stdout(), clear)
    }
}

impl<W: Write> TerminalSink<W> {
    pub fn new(out: W, clear: bool) -> Self {
        Self { out, clear }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> FrameSink for TerminalSink<W> {
    fn frame(&mut self, frame: &str) -> io::Result<()> {
        if self.clear {
            self.out.write_all(CLEAR_SCREEN.as_bytes())?;
        }
        self.out.write_all(frame.as_bytes())?;
        self.out.flush()
    }

    fn notice(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.out, "{}", message)?;
        self.out.flush()
    }
}

/// Discards everything. Used for `--json` runs.
#[derive(Debug, Default)]
pub struct NullSink;

impl FrameSink for NullSink {
    fn frame(&mut self, _frame: &str) -> io::Result<()> {
        Ok(())
    }

    fn notice(&mut self, _message: &str) -> io::Result<()> {
        Ok(())
    }
}

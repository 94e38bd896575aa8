//! Per-chunk progress rows drawn on a shared terminal region
//!
//! Every chunk worker owns one [`ProgressRenderer`], a byte sink that redraws a
//! fixed terminal row each time data passes through it. All renderers and the
//! coordinator's status line share one [`Terminal`], whose lock is held for a
//! single row redraw.
use crossterm::cursor::{self, MoveTo};
use crossterm::queue;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{Clear, ClearType};
use indicatif::FormattedDuration;
use std::fmt;
use std::io::{self, IsTerminal, Write};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tracing::debug;

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
const MESSAGE: &str = "downloading...";
const SYMBOL: &str = "█";
const BAR_WIDTH: usize = 50;

type Surface = Box<dyn Write + Send>;

/// Shared handle to the output surface, cloning it shares the lock
#[derive(Clone)]
pub struct Terminal {
    out: Arc<Mutex<Surface>>,
    interactive: bool,
}

impl fmt::Debug for Terminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Terminal")
            .field("interactive", &self.interactive)
            .finish()
    }
}

impl Terminal {
    /// Terminal backed by the process' stdout
    pub fn stdout() -> Self {
        Self {
            interactive: io::stdout().is_terminal(),
            out: Arc::new(Mutex::new(Box::new(io::stdout()))),
        }
    }
    /// Terminal backed by any writer, rows are then counted from 0
    pub fn new<W: Write + Send + 'static>(out: W) -> Self {
        Self {
            out: Arc::new(Mutex::new(Box::new(out))),
            interactive: false,
        }
    }
    /// Whether the surface is a real terminal that can report the cursor position
    pub fn is_interactive(&self) -> bool {
        self.interactive
    }
    fn lock(&self) -> io::Result<MutexGuard<'_, Surface>> {
        self.out
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "terminal lock poisoned"))
    }
    /// Print `count` blank lines so the region exists even at the bottom of the
    /// screen, and return the first row of that region
    pub fn reserve_rows(&self, count: u16) -> io::Result<u16> {
        {
            let mut out = self.lock()?;
            for _ in 0..count {
                out.write_all(b"\n")?;
            }
            out.flush()?;
        }
        if !self.interactive {
            return Ok(0);
        }
        let (_, row) = cursor::position()?;
        debug!("Cursor at row {} after reserving {} rows", row, count);
        Ok(row.saturating_sub(count))
    }
    /// Replace the contents of `row` with `line`
    pub fn draw_row(&self, row: u16, line: &str) -> io::Result<()> {
        let mut out = self.lock()?;
        queue!(
            out,
            MoveTo(0, row),
            Clear(ClearType::CurrentLine),
            SetForegroundColor(Color::Cyan),
            Print(line),
            ResetColor
        )?;
        out.flush()
    }
    /// Leave the cursor at the start of an empty `row`
    pub fn park(&self, row: u16) -> io::Result<()> {
        let mut out = self.lock()?;
        queue!(out, MoveTo(0, row), Clear(ClearType::CurrentLine), ResetColor)?;
        out.flush()
    }
}

/// Progress row of one chunk, accepts every byte it is given
#[derive(Debug)]
pub struct ProgressRenderer {
    terminal: Terminal,
    row: u16,
    expected: Option<u64>,
    written: u64,
    spinner: usize,
    started: Instant,
}

impl ProgressRenderer {
    pub fn new(terminal: Terminal, row: u16, expected: Option<u64>) -> Self {
        Self {
            terminal,
            row,
            expected: expected.filter(|len| *len > 0),
            written: 0,
            spinner: 0,
            started: Instant::now(),
        }
    }
    pub fn row(&self) -> u16 {
        self.row
    }
    pub fn written(&self) -> u64 {
        self.written
    }
    /// `None` while the expected length is unknown
    pub fn percent(&self) -> Option<u8> {
        self.expected.map(|expected| percent_of(self.written, expected))
    }
    fn next_line(&mut self) -> String {
        let elapsed = elapsed_stamp(self.started.elapsed());
        match self.percent() {
            Some(percent) => format!("{} {}", bar(percent), elapsed),
            None => {
                let glyph = SPINNER[self.spinner];
                self.spinner = (self.spinner + 1) % SPINNER.len();
                format!("{} {} {}", glyph, MESSAGE, elapsed)
            }
        }
    }
}

impl Write for ProgressRenderer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.written += buf.len() as u64;
        let line = self.next_line();
        if let Err(e) = self.terminal.draw_row(self.row, &line) {
            debug!("Failed to draw row {}: {}", self.row, e);
        }
        Ok(buf.len())
    }
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Rows of one transfer: one per chunk followed by a status row
#[derive(Debug)]
pub(crate) struct Rows {
    terminal: Terminal,
    base: u16,
    chunks: u16,
}

impl Rows {
    pub(crate) fn reserve(terminal: Terminal, chunks: usize) -> io::Result<Self> {
        let chunks = u16::try_from(chunks)
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "too many progress rows"))?;
        let base = terminal.reserve_rows(chunks + 1)?;
        Ok(Self {
            terminal,
            base,
            chunks,
        })
    }
    pub(crate) fn renderer(&self, index: usize, expected: Option<u64>) -> ProgressRenderer {
        ProgressRenderer::new(self.terminal.clone(), self.base + index as u16, expected)
    }
    pub(crate) fn status(&self, line: &str) -> io::Result<()> {
        self.terminal.draw_row(self.base + self.chunks, line)
    }
    pub(crate) fn finish(&self) -> io::Result<()> {
        self.terminal.park(self.base + self.chunks + 1)
    }
}

fn percent_of(written: u64, expected: u64) -> u8 {
    let percent = (written as f64 / expected as f64 * 100.0).round();
    percent.clamp(0.0, 100.0) as u8
}

fn bar(percent: u8) -> String {
    let filled = percent as usize / 2;
    format!(
        "{}|{}{}|{:>3}%",
        MESSAGE,
        SYMBOL.repeat(filled),
        " ".repeat(BAR_WIDTH - filled),
        percent
    )
}

fn elapsed_stamp(elapsed: Duration) -> String {
    format!("[{}]", FormattedDuration(elapsed))
}

//! Serialized cursor-addressed progress rendering.
//!
//! The terminal only offers "move cursor" and "write" as two separate
//! operations. Concurrent workers interleaving those two steps would scatter
//! output across each other's rows, so every screen update goes through
//! [`Console::write_at`], which performs the move and the write as a single
//! critical section under one lock. This exclusion is a correctness
//! requirement, not an optimization.
//!
//! Row layout: each download owns a fixed pair of rows assigned at dispatch
//! time by [`RowAllocator`]. Completion order never moves a download's rows.

use std::io::{Stdout, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Block character used to fill progress bars.
const BAR_CHAR: &str = "\u{2588}";

/// Thread-safe writer for a cursor-addressed output surface.
///
/// Generic over the underlying writer so tests can render into a buffer and
/// assert on the emitted escape sequences.
#[derive(Debug)]
pub struct Console<W> {
    writer: Mutex<W>,
}

impl Console<Stdout> {
    /// Console over the process stdout.
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> Console<W> {
    /// Wraps a writer in a lock-serialized console.
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Moves the cursor to `(row, col)` (zero-based) and writes `text`,
    /// atomically with respect to all other console calls.
    ///
    /// Write failures are ignored: a broken terminal must not take the
    /// batch down with it.
    pub fn write_at(&self, row: usize, col: usize, text: &str) {
        let Ok(mut writer) = self.writer.lock() else {
            return;
        };
        // ANSI cursor addressing is one-based.
        let _ = write!(writer, "\x1b[{};{}H{}", row + 1, col + 1, text);
        let _ = writer.flush();
    }

    /// Parks the cursor at column zero of `row`.
    ///
    /// Called once after a batch so the shell prompt lands below the last
    /// progress row instead of inside the bar area.
    pub fn park_at(&self, row: usize) {
        let Ok(mut writer) = self.writer.lock() else {
            return;
        };
        let _ = write!(writer, "\x1b[{};1H", row + 1);
        let _ = writer.flush();
    }

    /// Consumes the console and returns the underlying writer.
    ///
    /// # Errors
    ///
    /// Returns the writer wrapped in the poison error if a previous holder
    /// of the lock panicked.
    pub fn into_inner(self) -> Result<W, std::sync::PoisonError<W>> {
        self.writer.into_inner()
    }
}

/// A task's reserved output rows: one header line, one progress line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskRows {
    /// Row for the file name and overwrite flag.
    pub header: usize,
    /// Row for the progress bar and timing.
    pub body: usize,
}

/// Hands out visual row pairs to workers.
///
/// One allocator exists per batch run. Slots increase monotonically and are
/// never reused; the single atomic counter makes assignment race-free no
/// matter how many workers dispatch at once.
#[derive(Debug)]
pub struct RowAllocator {
    base: usize,
    next: AtomicUsize,
}

impl RowAllocator {
    /// Creates an allocator whose first slot starts at `base`.
    #[must_use]
    pub fn new(base: usize) -> Self {
        Self {
            base,
            next: AtomicUsize::new(0),
        }
    }

    /// Reserves the next row pair.
    pub fn allocate(&self) -> TaskRows {
        let slot = self.next.fetch_add(1, Ordering::SeqCst);
        let header = self.base + slot * 2;
        TaskRows {
            header,
            body: header + 1,
        }
    }

    /// First row below every allocated pair.
    pub fn end_row(&self) -> usize {
        self.base + self.next.load(Ordering::SeqCst) * 2
    }
}

/// Renders one task's progress bar.
///
/// Owned exclusively by that task's worker. Tracks the rightmost filled
/// column so a percent jump paints every skipped column, filling the bar
/// instead of leaving gaps when one chunk crosses several percent points.
#[derive(Debug)]
pub struct ProgressBarRow<W> {
    console: Arc<Console<W>>,
    row: usize,
    filled: u16,
}

impl<W: Write> ProgressBarRow<W> {
    /// A bar on `row` with no columns filled yet.
    pub fn new(console: Arc<Console<W>>, row: usize) -> Self {
        Self {
            console,
            row,
            filled: 0,
        }
    }

    /// Extends the bar up to and including column `percent`.
    ///
    /// Percent values arrive in non-decreasing order within a task, so the
    /// bar only ever grows.
    pub fn advance(&mut self, percent: u8) {
        while self.filled <= u16::from(percent) {
            self.console
                .write_at(self.row, usize::from(self.filled), BAR_CHAR);
            self.filled += 1;
        }
    }
}

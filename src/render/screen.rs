// src/render/screen.rs

//! In-place terminal redraw.
//!
//! The screen is split into two stacked regions:
//!
//! ```text
//! +---------------------------+
//! | full: header + job table  |  repaint_full
//! +---------------------------+
//! | tail: notices + last N    |  repaint_tail / push_notice
//! |       output lines        |
//! +---------------------------+  <- cursor
//! ```
//!
//! Each region remembers how many lines it printed last time and erases
//! exactly that many before printing again. Every line a region emits is
//! counted, including blank separators, so the counts never drift.

use std::io::Write;

use crossterm::cursor::MoveUp;
use crossterm::queue;
use crossterm::terminal::{Clear, ClearType};

use crate::errors::Result;
use crate::render::status::{StatusView, Tone, tone};
use crate::render::tail::truncate;

/// A block of terminal lines that can be erased and redrawn.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ScreenRegion {
    painted: usize,
}

impl ScreenRegion {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of lines printed by the last paint.
    pub fn painted(&self) -> usize {
        self.painted
    }

    /// Erase everything this region printed. The cursor must still sit just
    /// below the region.
    pub fn clear<W: Write>(&mut self, out: &mut W) -> Result<()> {
        for _ in 0..self.painted {
            queue!(out, MoveUp(1), Clear(ClearType::CurrentLine))?;
        }
        self.painted = 0;
        Ok(())
    }

    /// Print `lines`, first erasing the previous paint when `erase` is set.
    ///
    /// Embedded newlines are split so the recorded count matches what the
    /// terminal actually shows.
    pub fn paint<W: Write>(&mut self, out: &mut W, lines: &[String], erase: bool) -> Result<()> {
        if erase {
            self.clear(out)?;
        }
        let mut count = 0;
        for line in lines {
            for part in line.split('\n') {
                writeln!(out, "{part}")?;
                count += 1;
            }
        }
        self.painted = count;
        out.flush()?;
        Ok(())
    }

    /// Drop the line count without erasing; the printed lines stay.
    pub fn forget(&mut self) {
        self.painted = 0;
    }
}

/// How the renderer treats the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// Cursor movement allowed; regions are redrawn in place.
    Live,
    /// Output is appended only. Status blocks and notices are printed as
    /// they come, tail lines are dropped.
    Plain,
}

/// Line width used until [`TerminalRenderer::with_width`] says otherwise.
pub const DEFAULT_WIDTH: usize = 80;

const MIN_WIDTH: usize = 8;

/// Indentation of every tail-region line.
const TAIL_INDENT: &str = "  ";

/// Owns the output stream and both screen regions.
pub struct TerminalRenderer<W: Write> {
    out: W,
    mode: RenderMode,
    color: bool,
    width: usize,
    full: ScreenRegion,
    tail: ScreenRegion,
    notices: Vec<String>,
    tail_lines: Vec<String>,
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W, mode: RenderMode) -> Self {
        Self {
            out,
            mode,
            color: mode == RenderMode::Live,
            width: DEFAULT_WIDTH,
            full: ScreenRegion::new(),
            tail: ScreenRegion::new(),
            notices: Vec::new(),
            tail_lines: Vec::new(),
        }
    }

    /// Override the default (colors only in live mode).
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Maximum characters per painted line. A counted line must never wrap,
    /// or the next erase leaves rows behind.
    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width.max(MIN_WIDTH);
        self
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn mode(&self) -> RenderMode {
        self.mode
    }

    pub fn color(&self) -> bool {
        self.color
    }

    /// Replace the status block.
    ///
    /// The tail region sits below the block, so it is erased first and
    /// redrawn afterwards from its cached content.
    pub fn repaint_full(&mut self, view: &StatusView<'_>) -> Result<()> {
        let lines = view.lines(self.color, self.width);
        match self.mode {
            RenderMode::Live => {
                self.tail.clear(&mut self.out)?;
                self.full.paint(&mut self.out, &lines, true)?;
                self.paint_tail_region()?;
            }
            RenderMode::Plain => {
                self.full.paint(&mut self.out, &lines, false)?;
            }
        }
        Ok(())
    }

    /// Replace the tail lines. `lines` should already be cut to width.
    pub fn repaint_tail(&mut self, lines: &[String]) -> Result<()> {
        if self.mode == RenderMode::Plain {
            return Ok(());
        }
        self.tail_lines.clear();
        self.tail_lines.extend_from_slice(lines);
        self.paint_tail_region()
    }

    /// Show a one-line notice (e.g. the command about to run) above the
    /// tail. Notices belong to the tail section and vanish with it.
    pub fn push_notice(&mut self, notice: &str) -> Result<()> {
        match self.mode {
            RenderMode::Live => {
                self.notices.push(notice.to_string());
                self.paint_tail_region()
            }
            RenderMode::Plain => {
                let line = format!("{TAIL_INDENT}{}", tone(notice, Tone::Dim, self.color));
                writeln!(self.out, "{line}")?;
                self.out.flush()?;
                Ok(())
            }
        }
    }

    /// Erase notices and tail lines and reset the tail section.
    pub fn end_tail_section(&mut self) -> Result<()> {
        if self.mode == RenderMode::Live {
            self.tail.clear(&mut self.out)?;
            self.out.flush()?;
        }
        self.tail.forget();
        self.notices.clear();
        self.tail_lines.clear();
        Ok(())
    }

    /// Print a line that stays on screen. Everything printed so far becomes
    /// permanent: neither region will erase it.
    pub fn println(&mut self, line: &str) -> Result<()> {
        writeln!(self.out, "{line}")?;
        self.out.flush()?;
        self.full.forget();
        self.tail.forget();
        self.notices.clear();
        self.tail_lines.clear();
        Ok(())
    }

    pub fn full_region(&self) -> &ScreenRegion {
        &self.full
    }

    pub fn tail_region(&self) -> &ScreenRegion {
        &self.tail
    }

    pub fn writer(&mut self) -> &mut W {
        &mut self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn paint_tail_region(&mut self) -> Result<()> {
        let color = self.color;
        let width = self.width.saturating_sub(TAIL_INDENT.len());
        let lines: Vec<String> = self
            .notices
            .iter()
            .chain(self.tail_lines.iter())
            .map(|l| format!("{TAIL_INDENT}{}", tone(&truncate(l, width), Tone::Dim, color)))
            .collect();
        self.tail.paint(&mut self.out, &lines, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ERASE: &str = "\x1b[1A\x1b[2K";

    #[test]
    fn region_erases_what_it_painted() {
        let mut out = Vec::new();
        let mut region = ScreenRegion::new();
        region
            .paint(&mut out, &["a".to_string(), "b\nc".to_string()], true)
            .unwrap();
        assert_eq!(region.painted(), 3);

        out.clear();
        region.clear(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), ERASE.repeat(3));
        assert_eq!(region.painted(), 0);
    }

    #[test]
    fn notices_share_the_tail_region() {
        let mut renderer = TerminalRenderer::new(Vec::new(), RenderMode::Live).with_color(false);
        renderer.push_notice("$ mvn verify").unwrap();
        renderer
            .repaint_tail(&["one".to_string(), "two".to_string()])
            .unwrap();
        assert_eq!(renderer.tail_region().painted(), 3);

        renderer.end_tail_section().unwrap();
        assert_eq!(renderer.tail_region().painted(), 0);
    }

    #[test]
    fn plain_mode_never_moves_the_cursor() {
        let mut renderer = TerminalRenderer::new(Vec::new(), RenderMode::Plain);
        renderer.push_notice("📥 Cloning repo...").unwrap();
        renderer.repaint_tail(&["hidden".to_string()]).unwrap();
        renderer.end_tail_section().unwrap();

        let text = String::from_utf8(renderer.into_inner()).unwrap();
        assert!(!text.contains("\x1b["));
        assert!(text.contains("📥 Cloning repo..."));
        assert!(!text.contains("hidden"));
    }

    #[test]
    fn long_notices_are_cut_to_the_width() {
        let mut renderer = TerminalRenderer::new(Vec::new(), RenderMode::Live)
            .with_color(false)
            .with_width(80);
        let notice = format!("$ mvn {}", "-DgenerateBackupPoms=false ".repeat(5));
        renderer.push_notice(&notice).unwrap();
        renderer.repaint_tail(&["x".repeat(120)]).unwrap();
        assert_eq!(renderer.tail_region().painted(), 2);

        let text = String::from_utf8(renderer.into_inner())
            .unwrap()
            .replace(ERASE, "");
        let widest = text.lines().map(|l| l.chars().count()).max().unwrap_or(0);
        assert!(widest <= 80, "widest painted line has {widest} chars");
        assert!(text.contains("  $ mvn -DgenerateBackupPoms=false"));
    }
}

// src/render/tail.rs

use std::collections::VecDeque;

/// Most recent output lines of the running build, oldest first.
///
/// Lines are stored untouched; truncation to the display width happens in
/// [`TailBuffer::display_lines`].
#[derive(Debug, Clone)]
pub struct TailBuffer {
    lines: VecDeque<String>,
    capacity: usize,
}

impl TailBuffer {
    /// A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            lines: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, line: impl Into<String>) {
        if self.lines.len() == self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(line.into());
    }

    pub fn snapshot(&self) -> Vec<String> {
        self.lines.iter().cloned().collect()
    }

    /// Current lines, each cut to at most `width` characters. Cut lines end
    /// in `...`.
    pub fn display_lines(&self, width: usize) -> Vec<String> {
        self.lines.iter().map(|l| truncate(l, width)).collect()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Truncate by characters, not bytes, so multi-byte output never splits.
pub fn truncate(line: &str, width: usize) -> String {
    if line.chars().count() <= width {
        return line.to_string();
    }
    let keep = width.saturating_sub(3);
    let mut out: String = line.chars().take(keep).collect();
    out.push_str("...");
    out
}

// src/render/mod.rs

//! Live terminal view.
//!
//! - [`tail`] keeps the last N output lines of the running build.
//! - [`status`] turns the run state into the header + job table lines.
//! - [`screen`] redraws both in place with exact erase counts.

pub mod screen;
pub mod status;
pub mod tail;

pub use screen::{DEFAULT_WIDTH, RenderMode, ScreenRegion, TerminalRenderer};
pub use status::{Header, StatusView};
pub use tail::TailBuffer;

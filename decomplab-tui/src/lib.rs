//! DecompLab TUI - terminal backend for decomposition figures
//!
//! Draws finished [`decomplab_core::Figure`]s with ratatui:
//! - Stacked panels, one chart per axes
//! - Alpha-blended mark colors over a theme canvas
//! - Off-screen buffers and plain-text dumps for tests and pipes
//! - Inline drawing into the current terminal (no event loop)

pub mod panels;
pub mod render;
pub mod theme;

pub use panels::{AxesWidget, FigureWidget};
pub use render::{buffer_to_text, draw_inline, render_to_buffer, stdout_is_terminal};
pub use theme::Theme;

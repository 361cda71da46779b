//! Entry points: off-screen buffers, plain-text dumps, inline drawing.

use std::io;

use anyhow::{Context, Result};
use crossterm::tty::IsTty;
use decomplab_core::Figure;
use ratatui::{
    backend::CrosstermBackend, buffer::Buffer, layout::Rect, Terminal, TerminalOptions, Viewport,
};
use tracing::debug;

use crate::panels::FigureWidget;
use crate::theme::Theme;

/// Draw a figure into a fresh `width` × `height` buffer.
pub fn render_to_buffer(figure: &Figure, width: u16, height: u16, theme: &Theme) -> Buffer {
    let area = Rect::new(0, 0, width, height);
    let mut buf = Buffer::empty(area);
    ratatui::widgets::Widget::render(FigureWidget::new(figure, theme), area, &mut buf);
    buf
}

/// Buffer symbols row by row, trailing blanks trimmed.
pub fn buffer_to_text(buf: &Buffer) -> String {
    let area = buf.area;
    let mut lines = Vec::with_capacity(area.height as usize);
    for y in area.top()..area.bottom() {
        let line: String = (area.left()..area.right())
            .filter_map(|x| buf.cell((x, y)))
            .map(|cell| cell.symbol())
            .collect();
        lines.push(line.trim_end().to_string());
    }
    lines.join("\n")
}

/// Whether stdout is an interactive terminal (inline drawing makes sense).
pub fn stdout_is_terminal() -> bool {
    io::stdout().is_tty()
}

/// Draw a figure below the cursor of the current terminal, using `height`
/// rows. No raw mode and no input handling; the drawing stays in the
/// scrollback.
pub fn draw_inline(figure: &Figure, height: u16, theme: &Theme) -> Result<()> {
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::with_options(
        backend,
        TerminalOptions {
            viewport: Viewport::Inline(height),
        },
    )
    .context("failed to open inline terminal viewport")?;

    terminal
        .draw(|frame| frame.render_widget(FigureWidget::new(figure, theme), frame.area()))
        .context("failed to draw figure")?;
    debug!(panels = figure.panel_count(), height, "figure drawn inline");
    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use decomplab_core::figure::{FigureSize, Mark};

    #[test]
    fn test_text_dump_has_one_line_per_row() {
        let mut figure = Figure::single(FigureSize::default());
        if let Some(axes) = figure.panel_mut(0) {
            axes.add_mark(Mark::line(vec![0.0, 1.0, 2.0], vec![1.0, 3.0, 2.0]));
            axes.set_ylabel("yhat");
        }
        figure.tight_layout();

        let buf = render_to_buffer(&figure, 40, 12, &Theme::default());
        let text = buffer_to_text(&buf);
        assert_eq!(text.lines().count(), 12);
        assert!(text.lines().all(|l| l.chars().count() <= 40));
        assert!(text.contains("yhat"));
        assert!(text.lines().all(|l| !l.ends_with(' ')));
    }
}

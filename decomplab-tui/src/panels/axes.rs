//! One figure panel drawn as a ratatui [`Chart`].
//!
//! Mark mapping:
//! - lines → braille line datasets, split at NaN so gaps stay gaps
//! - dot points → scatter of `•`
//! - cross points → scatter of half blocks (no cross glyph in ratatui)
//! - bars → bar datasets (vertical strokes from zero)
//!
//! Axis labels come from the figure's ticks, spread evenly along the axis.

use decomplab_core::figure::{Axes, Mark, MarkKind, PointMarker, Tick};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    symbols,
    text::Span,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph, Widget},
};

use crate::theme::Theme;

/// At most this many tick labels per axis; ratatui cannot place them at
/// exact positions, so more would only crowd.
const MAX_LABELS: usize = 6;

pub struct AxesWidget<'a> {
    axes: &'a Axes,
    theme: &'a Theme,
}

/// Points of one dataset plus how to draw them.
struct Series {
    points: Vec<(f64, f64)>,
    graph: GraphType,
    marker: symbols::Marker,
    style: Style,
}

impl<'a> AxesWidget<'a> {
    pub fn new(axes: &'a Axes, theme: &'a Theme) -> Self {
        Self { axes, theme }
    }

    fn series(&self) -> Vec<Series> {
        let mut out = Vec::new();
        for mark in self.axes.marks() {
            let style = Style::default().fg(self.theme.mark_color(mark.color, mark.alpha));
            match mark.kind {
                MarkKind::Line => {
                    for points in line_segments(mark) {
                        let graph = if points.len() > 1 {
                            GraphType::Line
                        } else {
                            GraphType::Scatter
                        };
                        out.push(Series {
                            points,
                            graph,
                            marker: symbols::Marker::Braille,
                            style,
                        });
                    }
                }
                MarkKind::Points(marker) => out.push(Series {
                    points: mark.finite_points().collect(),
                    graph: GraphType::Scatter,
                    marker: match marker {
                        PointMarker::Dot => symbols::Marker::Dot,
                        PointMarker::Cross => symbols::Marker::HalfBlock,
                    },
                    style,
                }),
                MarkKind::Bars { .. } => out.push(Series {
                    points: mark.finite_points().collect(),
                    graph: GraphType::Bar,
                    marker: symbols::Marker::Braille,
                    style,
                }),
            }
        }
        out
    }
}

/// Runs of finite points; NaN in either coordinate ends a run.
fn line_segments(mark: &Mark) -> Vec<Vec<(f64, f64)>> {
    let mut segments = Vec::new();
    let mut current = Vec::new();
    for (&x, &y) in mark.xs.iter().zip(&mark.ys) {
        if x.is_finite() && y.is_finite() {
            current.push((x, y));
        } else if !current.is_empty() {
            segments.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        segments.push(current);
    }
    segments
}

/// Evenly thinned tick labels, always keeping the first and last.
fn tick_labels(ticks: &[Tick]) -> Vec<String> {
    if ticks.len() <= MAX_LABELS {
        return ticks.iter().map(|t| t.label.clone()).collect();
    }
    let last = ticks.len() - 1;
    (0..MAX_LABELS)
        .map(|i| ticks[i * last / (MAX_LABELS - 1)].label.clone())
        .collect()
}

impl Widget for AxesWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let theme = self.theme;
        let title = if self.axes.y_label.is_empty() {
            String::new()
        } else {
            format!(" {} ", self.axes.y_label)
        };
        let block = Block::default()
            .title(Span::styled(
                title,
                Style::default()
                    .fg(theme.text_primary)
                    .add_modifier(Modifier::BOLD),
            ))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.axis))
            .style(Style::default().bg(theme.background()));

        let series = self.series();
        if series.iter().all(|s| s.points.is_empty()) {
            Paragraph::new("no data")
                .alignment(Alignment::Center)
                .style(Style::default().fg(theme.muted))
                .block(block)
                .render(area, buf);
            return;
        }

        let datasets: Vec<Dataset> = series
            .iter()
            .map(|s| {
                Dataset::default()
                    .marker(s.marker)
                    .graph_type(s.graph)
                    .style(s.style)
                    .data(&s.points)
            })
            .collect();

        let (x_lo, x_hi) = self.axes.x_limits.unwrap_or((0.0, 1.0));
        let (y_lo, y_hi) = self.axes.y_limits.unwrap_or((0.0, 1.0));
        let label_style = Style::default().fg(theme.text_secondary);

        let chart = Chart::new(datasets)
            .block(block)
            .x_axis(
                Axis::default()
                    .title(Span::styled(self.axes.x_label.clone(), label_style))
                    .style(Style::default().fg(theme.axis))
                    .bounds([x_lo, x_hi])
                    .labels(tick_labels(&self.axes.x_ticks)),
            )
            .y_axis(
                Axis::default()
                    .style(Style::default().fg(theme.axis))
                    .bounds([y_lo, y_hi])
                    .labels(tick_labels(&self.axes.y_ticks)),
            );
        chart.render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use decomplab_core::figure::Rgb;

    fn text(buf: &Buffer) -> String {
        let area = buf.area;
        let mut content = String::new();
        for y in 0..area.height {
            for x in 0..area.width {
                content.push_str(buf.cell((x, y)).map(|c| c.symbol()).unwrap_or(" "));
            }
            content.push('\n');
        }
        content
    }

    #[test]
    fn test_line_segments_split_at_nan() {
        let mark = Mark::line(vec![0.0, 1.0, 2.0, 3.0, 4.0], vec![1.0, f64::NAN, 2.0, 3.0, f64::NAN]);
        let segments = line_segments(&mark);
        assert_eq!(segments, vec![vec![(0.0, 1.0)], vec![(2.0, 2.0), (3.0, 3.0)]]);
    }

    #[test]
    fn test_tick_labels_thinned_keep_ends() {
        let ticks: Vec<Tick> = (0..11)
            .map(|i| Tick {
                value: i as f64,
                label: i.to_string(),
            })
            .collect();
        let labels = tick_labels(&ticks);
        assert_eq!(labels.len(), MAX_LABELS);
        assert_eq!(labels.first().map(String::as_str), Some("0"));
        assert_eq!(labels.last().map(String::as_str), Some("10"));
    }

    #[test]
    fn test_empty_axes_shows_notice() {
        let mut axes = Axes::new();
        axes.layout();
        let theme = Theme::default();
        let area = Rect::new(0, 0, 40, 8);
        let mut buf = Buffer::empty(area);
        AxesWidget::new(&axes, &theme).render(area, &mut buf);
        assert!(text(&buf).contains("no data"));
    }

    #[test]
    fn test_renders_title_and_mark_color() {
        let mut axes = Axes::new();
        axes.add_mark(Mark::bars(vec![1.0, 2.0, 3.0], vec![0.5, -0.2, 0.3], 1.0).color(Rgb::FORECAST));
        axes.set_ylabel("Trend Change");
        axes.set_xlabel("Trend Segment");
        axes.layout();

        let theme = Theme::default();
        let area = Rect::new(0, 0, 60, 14);
        let mut buf = Buffer::empty(area);
        AxesWidget::new(&axes, &theme).render(area, &mut buf);

        assert!(text(&buf).contains("Trend Change"));
        let blue = theme.mark_color(Rgb::FORECAST, 1.0);
        let painted = (0..area.height)
            .flat_map(|y| (0..area.width).map(move |x| (x, y)))
            .filter_map(|pos| buf.cell(pos))
            .any(|cell| cell.fg == blue);
        assert!(painted, "bars should be drawn in the forecast color");
    }
}

//! Whole figure: its axes stacked top to bottom with equal heights.

use decomplab_core::Figure;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    widgets::Widget,
};

use super::axes::AxesWidget;
use crate::theme::Theme;

pub struct FigureWidget<'a> {
    figure: &'a Figure,
    theme: &'a Theme,
}

impl<'a> FigureWidget<'a> {
    pub fn new(figure: &'a Figure, theme: &'a Theme) -> Self {
        Self { figure, theme }
    }
}

impl Widget for FigureWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let panels = self.figure.axes();
        if panels.is_empty() {
            return;
        }
        let n = panels.len() as u32;
        let areas = Layout::vertical(panels.iter().map(|_| Constraint::Ratio(1, n))).split(area);
        for (axes, panel_area) in panels.iter().zip(areas.iter()) {
            AxesWidget::new(axes, self.theme).render(*panel_area, buf);
        }
    }
}

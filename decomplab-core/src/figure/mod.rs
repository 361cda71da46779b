//! Figure scene graph: backend-independent drawable canvases.
//!
//! A [`Figure`] owns an ordered stack of [`Axes`] panels. Renderers draw
//! [`Mark`]s into an `&mut Axes` and hand back the [`MarkId`]s they created.
//! Nothing here knows about terminals or pixels; the `decomplab-tui` crate
//! turns a finished figure into a drawing.
//!
//! Finishing a figure is a two-phase affair (see [`pipeline`]): layout first,
//! tick relabeling second.

pub mod dates;
pub mod pipeline;
pub mod ticks;

use serde::{Deserialize, Serialize};

pub use dates::{date2num, num2date, DateLocator, DateUnit};
pub use pipeline::{PostProcess, RenderPipeline};

/// Plain RGB color. Alpha lives on the mark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// `#0072B2`, the blue every component series is drawn in.
    pub const FORECAST: Rgb = Rgb(0x00, 0x72, 0xB2);
    /// Pure blue, used for highlighted / focused series.
    pub const BLUE: Rgb = Rgb(0x00, 0x00, 0xFF);
    pub const BLACK: Rgb = Rgb(0x00, 0x00, 0x00);
    pub const GRAY: Rgb = Rgb(0x80, 0x80, 0x80);
    pub const WHITE: Rgb = Rgb(0xFF, 0xFF, 0xFF);

    pub fn hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }
}

/// Point marker shape for scatter-style marks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointMarker {
    Dot,
    Cross,
}

/// What kind of drawable a mark is.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MarkKind {
    /// Connected line; NaN values break the line.
    Line,
    /// Unconnected points.
    Points(PointMarker),
    /// Vertical bars from zero, `width` in x units.
    Bars { width: f64 },
}

/// Handle to a mark inside one [`Axes`] (index into draw order).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MarkId(pub usize);

/// One drawable series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mark {
    pub kind: MarkKind,
    pub xs: Vec<f64>,
    pub ys: Vec<f64>,
    pub color: Rgb,
    pub alpha: f64,
    pub label: Option<String>,
}

impl Mark {
    fn new(kind: MarkKind, xs: Vec<f64>, ys: Vec<f64>) -> Self {
        debug_assert_eq!(xs.len(), ys.len(), "mark x/y length mismatch");
        Self {
            kind,
            xs,
            ys,
            color: Rgb::FORECAST,
            alpha: 1.0,
            label: None,
        }
    }

    pub fn line(xs: Vec<f64>, ys: Vec<f64>) -> Self {
        Self::new(MarkKind::Line, xs, ys)
    }

    pub fn points(xs: Vec<f64>, ys: Vec<f64>, marker: PointMarker) -> Self {
        Self::new(MarkKind::Points(marker), xs, ys)
    }

    pub fn bars(xs: Vec<f64>, ys: Vec<f64>, width: f64) -> Self {
        Self::new(MarkKind::Bars { width }, xs, ys)
    }

    pub fn color(mut self, color: Rgb) -> Self {
        self.color = color;
        self
    }

    pub fn alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha.clamp(0.0, 1.0);
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn len(&self) -> usize {
        self.xs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }

    /// Points with both coordinates finite.
    pub fn finite_points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.xs
            .iter()
            .zip(self.ys.iter())
            .filter(|(x, y)| x.is_finite() && y.is_finite())
            .map(|(&x, &y)| (x, y))
    }

    /// Data extent `(x_min, x_max, y_min, y_max)`; bars include their
    /// width and the zero baseline.
    pub fn bounds(&self) -> Option<(f64, f64, f64, f64)> {
        let mut bounds: Option<(f64, f64, f64, f64)> = None;
        for (x, y) in self.finite_points() {
            let (x_lo, x_hi, y_lo, y_hi) = match self.kind {
                MarkKind::Bars { width } => {
                    (x - width / 2.0, x + width / 2.0, y.min(0.0), y.max(0.0))
                }
                _ => (x, x, y, y),
            };
            bounds = Some(match bounds {
                None => (x_lo, x_hi, y_lo, y_hi),
                Some((a, b, c, d)) => (a.min(x_lo), b.max(x_hi), c.min(y_lo), d.max(y_hi)),
            });
        }
        bounds
    }
}

/// How the x axis places and labels its ticks.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum XAxis {
    /// Plain numbers, nice-number ticks.
    #[default]
    Numeric,
    /// Date numbers (days since 1970-01-01), ticks from a date locator.
    Date(DateLocator),
    /// Integer positions `0..n`, one label each.
    Categorical(Vec<String>),
}

/// A tick position and its label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    pub value: f64,
    pub label: String,
}

/// Major grid styling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    pub color: Rgb,
    pub alpha: f64,
    pub line_width: f64,
}

impl Default for Grid {
    fn default() -> Self {
        Self {
            color: Rgb::GRAY,
            alpha: 0.2,
            line_width: 1.0,
        }
    }
}

/// One sub-plot.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Axes {
    marks: Vec<Mark>,
    pub x_label: String,
    pub y_label: String,
    pub x_axis: XAxis,
    pub grid: Option<Grid>,
    pub x_limits: Option<(f64, f64)>,
    pub y_limits: Option<(f64, f64)>,
    pub x_ticks: Vec<Tick>,
    pub y_ticks: Vec<Tick>,
}

/// Fraction of the data span added on each side when autoscaling.
const MARGIN: f64 = 0.05;
/// Upper bound on y tick intervals.
const Y_BINS: usize = 6;

impl Axes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a mark; later marks draw on top of earlier ones.
    pub fn add_mark(&mut self, mark: Mark) -> MarkId {
        self.marks.push(mark);
        MarkId(self.marks.len() - 1)
    }

    pub fn marks(&self) -> &[Mark] {
        &self.marks
    }

    pub fn mark(&self, id: MarkId) -> Option<&Mark> {
        self.marks.get(id.0)
    }

    pub fn mark_mut(&mut self, id: MarkId) -> Option<&mut Mark> {
        self.marks.get_mut(id.0)
    }

    pub fn set_xlabel(&mut self, label: impl Into<String>) {
        self.x_label = label.into();
    }

    pub fn set_ylabel(&mut self, label: impl Into<String>) {
        self.y_label = label.into();
    }

    /// Switch the x axis to an automatic date locator + formatter.
    pub fn set_date_axis(&mut self) {
        self.x_axis = XAxis::Date(DateLocator::Auto);
    }

    pub fn grid_major(&mut self) {
        self.grid = Some(Grid::default());
    }

    /// Current y tick labels, in tick order.
    pub fn y_tick_labels(&self) -> Vec<&str> {
        self.y_ticks.iter().map(|t| t.label.as_str()).collect()
    }

    pub fn x_tick_labels(&self) -> Vec<&str> {
        self.x_ticks.iter().map(|t| t.label.as_str()).collect()
    }

    /// Union of all mark bounds.
    pub fn data_bounds(&self) -> Option<(f64, f64, f64, f64)> {
        self.marks
            .iter()
            .filter_map(Mark::bounds)
            .reduce(|(a, b, c, d), (e, f, g, h)| (a.min(e), b.max(f), c.min(g), d.max(h)))
    }

    /// Fit limits to the data with a small margin.
    pub fn autoscale(&mut self) {
        match self.data_bounds() {
            Some((x_lo, x_hi, y_lo, y_hi)) => {
                self.x_limits = Some(pad(x_lo, x_hi));
                self.y_limits = Some(pad(y_lo, y_hi));
            }
            None => {
                self.x_limits = Some((0.0, 1.0));
                self.y_limits = Some((0.0, 1.0));
            }
        }
    }

    /// Layout pass: autoscale, then recompute tick positions and reset every
    /// tick label to its default form. Any earlier relabeling is discarded.
    pub fn layout(&mut self) {
        self.autoscale();
        self.layout_x_ticks();
        self.layout_y_ticks();
    }

    fn layout_x_ticks(&mut self) {
        let (lo, hi) = self.x_limits.unwrap_or((0.0, 1.0));
        self.x_ticks = match &self.x_axis {
            XAxis::Numeric => ticks::nice_ticks(lo, hi, Y_BINS)
                .into_iter()
                .map(|v| Tick {
                    value: v,
                    label: ticks::format_general(v, 6),
                })
                .collect(),
            XAxis::Date(locator) => locator.ticks(lo, hi),
            XAxis::Categorical(labels) => labels
                .iter()
                .enumerate()
                .map(|(i, label)| Tick {
                    value: i as f64,
                    label: label.clone(),
                })
                .collect(),
        };
    }

    pub(crate) fn layout_y_ticks(&mut self) {
        let (lo, hi) = self.y_limits.unwrap_or((0.0, 1.0));
        self.y_ticks = ticks::nice_ticks(lo, hi, Y_BINS)
            .into_iter()
            .map(|v| Tick {
                value: v,
                label: ticks::format_general(v, 6),
            })
            .collect();
    }

    /// Relabel the y ticks as percentages (`0.123` → `12.3%`). Computes tick
    /// positions first when no layout has happened yet.
    pub fn set_y_as_percent(&mut self) {
        if self.y_ticks.is_empty() {
            if self.y_limits.is_none() {
                self.autoscale();
            }
            self.layout_y_ticks();
        }
        for tick in &mut self.y_ticks {
            tick.label = ticks::percent_label(tick.value);
        }
    }
}

fn pad(lo: f64, hi: f64) -> (f64, f64) {
    let span = hi - lo;
    if span > 0.0 {
        (lo - span * MARGIN, hi + span * MARGIN)
    } else if lo == 0.0 {
        (-1.0, 1.0)
    } else {
        let delta = lo.abs() * MARGIN;
        (lo - delta, hi + delta)
    }
}

/// Figure size in inches (only ratios matter to terminal backends).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FigureSize {
    pub width: f64,
    pub height: f64,
}

impl FigureSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Default size for a vertical stack: 9 wide, 3 per panel.
    pub fn stacked(panels: usize) -> Self {
        Self::new(9.0, 3.0 * panels.max(1) as f64)
    }
}

impl Default for FigureSize {
    fn default() -> Self {
        Self::new(10.0, 6.0)
    }
}

/// A canvas holding one or more vertically stacked axes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Figure {
    pub size: FigureSize,
    axes: Vec<Axes>,
}

impl Figure {
    pub fn new(size: FigureSize) -> Self {
        Self {
            size,
            axes: Vec::new(),
        }
    }

    /// Figure with a single empty axes.
    pub fn single(size: FigureSize) -> Self {
        Self::with_panels(1, size)
    }

    /// Figure with `n` empty, vertically stacked axes.
    pub fn with_panels(n: usize, size: FigureSize) -> Self {
        Self {
            size,
            axes: (0..n).map(|_| Axes::new()).collect(),
        }
    }

    pub fn add_axes(&mut self) -> &mut Axes {
        self.axes.push(Axes::new());
        let last = self.axes.len() - 1;
        &mut self.axes[last]
    }

    pub fn axes(&self) -> &[Axes] {
        &self.axes
    }

    pub fn axes_mut(&mut self) -> &mut [Axes] {
        &mut self.axes
    }

    pub fn panel(&self, index: usize) -> Option<&Axes> {
        self.axes.get(index)
    }

    pub fn panel_mut(&mut self, index: usize) -> Option<&mut Axes> {
        self.axes.get_mut(index)
    }

    pub fn panel_count(&self) -> usize {
        self.axes.len()
    }

    /// Layout every axes (see [`Axes::layout`]).
    pub fn tight_layout(&mut self) {
        for axes in &mut self.axes {
            axes.layout();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_mark_returns_draw_order() {
        let mut axes = Axes::new();
        let a = axes.add_mark(Mark::line(vec![0.0, 1.0], vec![1.0, 2.0]));
        let b = axes.add_mark(Mark::points(vec![0.0], vec![1.0], PointMarker::Dot));
        assert_eq!(a, MarkId(0));
        assert_eq!(b, MarkId(1));
        assert_eq!(axes.marks().len(), 2);
    }

    #[test]
    fn test_bar_bounds_include_zero_and_width() {
        let mark = Mark::bars(vec![1.0, 2.0], vec![3.0, 4.0], 1.0);
        let (x_lo, x_hi, y_lo, y_hi) = mark.bounds().unwrap();
        assert_eq!(x_lo, 0.5);
        assert_eq!(x_hi, 2.5);
        assert_eq!(y_lo, 0.0);
        assert_eq!(y_hi, 4.0);
    }

    #[test]
    fn test_bounds_skip_nan() {
        let mark = Mark::line(vec![0.0, 1.0, 2.0], vec![f64::NAN, 5.0, 7.0]);
        let (x_lo, _, y_lo, y_hi) = mark.bounds().unwrap();
        assert_eq!(x_lo, 1.0);
        assert_eq!(y_lo, 5.0);
        assert_eq!(y_hi, 7.0);
    }

    #[test]
    fn test_layout_resets_percent_labels() {
        let mut axes = Axes::new();
        axes.add_mark(Mark::line(vec![0.0, 1.0], vec![0.0, 0.5]));
        axes.set_y_as_percent();
        assert!(axes.y_tick_labels().iter().all(|l| l.ends_with('%')));

        axes.layout();
        assert!(axes.y_tick_labels().iter().all(|l| !l.ends_with('%')));
    }

    #[test]
    fn test_categorical_ticks() {
        let mut axes = Axes::new();
        axes.x_axis = XAxis::Categorical(vec!["a".into(), "b".into(), "c".into()]);
        axes.add_mark(Mark::line(vec![0.0, 1.0, 2.0], vec![1.0, 2.0, 3.0]));
        axes.layout();
        assert_eq!(axes.x_tick_labels(), vec!["a", "b", "c"]);
        assert_eq!(axes.x_ticks[2].value, 2.0);
    }

    #[test]
    fn test_empty_axes_layout_does_not_panic() {
        let mut axes = Axes::new();
        axes.layout();
        assert_eq!(axes.x_limits, Some((0.0, 1.0)));
        assert!(!axes.y_ticks.is_empty());
    }

    #[test]
    fn test_stacked_size() {
        let size = FigureSize::stacked(4);
        assert_eq!(size.width, 9.0);
        assert_eq!(size.height, 12.0);
    }

    #[test]
    fn test_rgb_hex() {
        assert_eq!(Rgb::FORECAST.hex(), "#0072B2");
    }
}

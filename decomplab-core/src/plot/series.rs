//! Single-series and multi-horizon component panels.

use tracing::debug;

use super::{overplot_alpha, rolling_mean, PlotError};
use crate::figure::{Axes, Mark, MarkId, Rgb};
use crate::table::ForecastTable;

/// Bar width of daily component bars, in date-number units.
const DAY: f64 = 1.0;

/// One column drawn as a line or bars.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ComponentSpec {
    pub column: String,
    /// Y label; defaults to the column name.
    pub title: Option<String>,
    /// Draw a centered rolling mean of this window underneath.
    pub rolling: Option<usize>,
    pub bar: bool,
    /// Label the y axis as percentages.
    pub multiplicative: bool,
}

impl ComponentSpec {
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            ..Self::default()
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn rolling(mut self, window: usize) -> Self {
        self.rolling = Some(window);
        self
    }

    pub fn bar(mut self, bar: bool) -> Self {
        self.bar = bar;
        self
    }

    pub fn multiplicative(mut self, multiplicative: bool) -> Self {
        self.multiplicative = multiplicative;
        self
    }
}

fn series_mark(xs: Vec<f64>, ys: Vec<f64>, bar: bool) -> Mark {
    if bar {
        Mark::bars(xs, ys, DAY)
    } else {
        Mark::line(xs, ys)
    }
}

fn finish_date_panel(axes: &mut Axes, y_label: &str, multiplicative: bool) {
    axes.set_date_axis();
    axes.grid_major();
    axes.set_xlabel("ds");
    axes.set_ylabel(y_label);
    if multiplicative {
        axes.set_y_as_percent();
    }
}

/// Draw one component column over time.
pub fn plot_forecast_component(
    axes: &mut Axes,
    table: &ForecastTable,
    spec: &ComponentSpec,
) -> Result<Vec<MarkId>, PlotError> {
    let values = table.column(&spec.column)?;
    let xs = table.ds_nums();
    let mut ids = Vec::with_capacity(2);

    if let Some(window) = spec.rolling {
        let smoothed = rolling_mean(values, window)
            .into_iter()
            .map(|v| v.unwrap_or(f64::NAN))
            .collect();
        let mark = series_mark(xs.clone(), smoothed, spec.bar)
            .color(Rgb::FORECAST)
            .alpha(0.5);
        ids.push(axes.add_mark(mark));
    }

    let raw = values.iter().map(|v| v.unwrap_or(f64::NAN)).collect();
    ids.push(axes.add_mark(series_mark(xs, raw, spec.bar).color(Rgb::FORECAST)));

    let title = spec.title.as_deref().unwrap_or(&spec.column);
    finish_date_panel(axes, title, spec.multiplicative);
    Ok(ids)
}

/// A family of `<prefix><k>` columns, one per forecast horizon.
#[derive(Debug, Clone, PartialEq)]
pub struct MultiForecastSpec {
    pub prefix: String,
    /// Number of horizons to overlay, starting at 1.
    pub num_overplot: Option<usize>,
    /// Horizon drawn in solid blue, 1-based.
    pub focus: usize,
    pub bar: bool,
    pub multiplicative: bool,
    /// Y label; defaults to the prefix.
    pub title: Option<String>,
}

impl MultiForecastSpec {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            num_overplot: None,
            focus: 1,
            bar: false,
            multiplicative: false,
            title: None,
        }
    }
}

fn non_null_mark(
    table: &ForecastTable,
    column: &str,
    bar: bool,
) -> Result<Mark, PlotError> {
    let (xs, ys) = table.non_null_series(column)?;
    Ok(series_mark(xs, ys, bar))
}

/// Overlay several horizons of one component, nearest horizon on top.
pub fn plot_multiforecast_component(
    axes: &mut Axes,
    table: &ForecastTable,
    spec: &MultiForecastSpec,
) -> Result<Vec<MarkId>, PlotError> {
    if let Some(n) = spec.num_overplot {
        let available = table.columns_with_prefix(&spec.prefix).len();
        if n > available {
            return Err(PlotError::OverplotExceedsColumns {
                prefix: spec.prefix.clone(),
                requested: n,
                available,
            });
        }
    }

    let mut ids = Vec::new();
    if let Some(n) = spec.num_overplot {
        debug!(prefix = %spec.prefix, horizons = n, "overplotting horizons");
        for i in (0..n).rev() {
            let column = format!("{}{}", spec.prefix, i + 1);
            let mark = non_null_mark(table, &column, spec.bar)?
                .color(Rgb::FORECAST)
                .alpha(overplot_alpha(i));
            ids.push(axes.add_mark(mark));
        }
    }

    if spec.num_overplot.is_none() || spec.focus > 1 {
        let column = format!("{}{}", spec.prefix, spec.focus);
        let mark = non_null_mark(table, &column, spec.bar)?.color(Rgb::BLUE);
        ids.push(axes.add_mark(mark));
    }

    let title = spec.title.as_deref().unwrap_or(&spec.prefix);
    finish_date_panel(axes, title, spec.multiplicative);
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::figure::{MarkKind, XAxis};
    use chrono::{Duration, NaiveDate};

    fn ar_table() -> ForecastTable {
        let start = NaiveDate::from_ymd_opt(2020, 6, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let ds = (0..6).map(|i| start + Duration::days(i)).collect();
        ForecastTable::new(ds)
            .with_column("ar1", vec![None, Some(0.1), Some(0.2), Some(0.3), Some(0.4), Some(0.5)])
            .unwrap()
            .with_column("ar2", vec![None, None, Some(0.2), Some(0.3), Some(0.4), Some(0.5)])
            .unwrap()
            .with_column("ar3", vec![None, None, None, Some(0.3), Some(0.4), Some(0.5)])
            .unwrap()
    }

    #[test]
    fn test_component_with_rolling_draws_two_marks() {
        let mut axes = Axes::new();
        let spec = ComponentSpec::new("ar1").title("Residuals").rolling(3).bar(true);
        let ids = plot_forecast_component(&mut axes, &ar_table(), &spec).unwrap();
        assert_eq!(ids.len(), 2);
        assert_eq!(axes.marks()[0].alpha, 0.5);
        assert_eq!(axes.marks()[1].kind, MarkKind::Bars { width: 1.0 });
        assert_eq!(axes.y_label, "Residuals");
        assert_eq!(axes.x_label, "ds");
        assert!(matches!(axes.x_axis, XAxis::Date(_)));
    }

    #[test]
    fn test_component_title_defaults_to_column() {
        let mut axes = Axes::new();
        plot_forecast_component(&mut axes, &ar_table(), &ComponentSpec::new("ar2")).unwrap();
        assert_eq!(axes.y_label, "ar2");
        assert_eq!(axes.marks()[0].kind, MarkKind::Line);
    }

    #[test]
    fn test_component_percent_applied_immediately() {
        let mut axes = Axes::new();
        let spec = ComponentSpec::new("ar1").multiplicative(true);
        plot_forecast_component(&mut axes, &ar_table(), &spec).unwrap();
        assert!(axes.y_tick_labels().iter().all(|l| l.ends_with('%')));
    }

    #[test]
    fn test_overplot_draws_far_horizons_first() {
        let mut axes = Axes::new();
        let spec = MultiForecastSpec {
            num_overplot: Some(3),
            bar: true,
            ..MultiForecastSpec::new("ar")
        };
        let ids = plot_multiforecast_component(&mut axes, &ar_table(), &spec).unwrap();
        assert_eq!(ids.len(), 3);
        let marks = axes.marks();
        // ar3, ar2, ar1 with nulls dropped
        assert_eq!(marks[0].len(), 3);
        assert_eq!(marks[1].len(), 4);
        assert_eq!(marks[2].len(), 5);
        assert!(marks[0].alpha < marks[1].alpha && marks[1].alpha < marks[2].alpha);
    }

    #[test]
    fn test_focus_beyond_one_is_drawn_last() {
        let mut axes = Axes::new();
        let spec = MultiForecastSpec {
            num_overplot: Some(2),
            focus: 3,
            ..MultiForecastSpec::new("ar")
        };
        plot_multiforecast_component(&mut axes, &ar_table(), &spec).unwrap();
        let last = axes.marks().last().unwrap();
        assert_eq!(axes.marks().len(), 3);
        assert_eq!(last.color, Rgb::BLUE);
        assert_eq!(last.len(), 3);
    }

    #[test]
    fn test_overplot_precondition_checked_before_drawing() {
        let mut axes = Axes::new();
        let spec = MultiForecastSpec {
            num_overplot: Some(5),
            ..MultiForecastSpec::new("ar")
        };
        let result = plot_multiforecast_component(&mut axes, &ar_table(), &spec);
        assert!(matches!(
            result,
            Err(PlotError::OverplotExceedsColumns { requested: 5, available: 3, .. })
        ));
        assert!(axes.marks().is_empty());
    }
}

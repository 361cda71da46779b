//! Composite forecast: every `yhat<k>` overlaid, actuals on top.

use tracing::debug;

use super::{forecast_alpha, PlotError};
use crate::figure::{Axes, Figure, FigureSize, Mark, MarkId, PointMarker, Rgb};
use crate::table::{ForecastTable, ACTUAL};

/// Options for [`plot_forecast`].
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastPlotOptions {
    /// Horizon to draw again in solid blue, 1-based.
    pub highlight: Option<usize>,
    pub x_label: String,
    pub y_label: String,
    pub size: FigureSize,
    /// Print the trailing rows of the table to stdout.
    pub echo_tail: bool,
    pub tail_rows: usize,
}

impl Default for ForecastPlotOptions {
    fn default() -> Self {
        Self {
            highlight: None,
            x_label: "ds".to_string(),
            y_label: "y".to_string(),
            size: FigureSize::default(),
            echo_tail: true,
            tail_rows: 5,
        }
    }
}

/// Plot the composite forecast into a fresh single-panel figure.
pub fn plot_forecast(
    table: &ForecastTable,
    options: &ForecastPlotOptions,
) -> Result<Figure, PlotError> {
    if options.echo_tail {
        println!("{}", table.tail(options.tail_rows));
    }
    let mut figure = Figure::single(options.size);
    if let Some(axes) = figure.panel_mut(0) {
        plot_forecast_on(axes, table, options)?;
    }
    figure.tight_layout();
    Ok(figure)
}

/// Draw the composite forecast into existing axes.
///
/// Marks, in order: one faded line per `yhat` column, the highlighted
/// horizon as a line plus cross markers (when requested), then the actuals
/// as black dots.
pub fn plot_forecast_on(
    axes: &mut Axes,
    table: &ForecastTable,
    options: &ForecastPlotOptions,
) -> Result<Vec<MarkId>, PlotError> {
    let xs = table.ds_nums();
    let count = table.yhat_columns().len();
    debug!(overlays = count, highlight = ?options.highlight, "plotting forecast");

    let mut ids = Vec::with_capacity(count + 3);
    for i in 0..count {
        let ys = table.column_f64(&format!("yhat{}", i + 1))?;
        let mark = Mark::line(xs.clone(), ys)
            .color(Rgb::FORECAST)
            .alpha(forecast_alpha(i));
        ids.push(axes.add_mark(mark));
    }

    if let Some(h) = options.highlight {
        let name = format!("yhat{h}");
        let ys = table.column_f64(&name)?;
        ids.push(axes.add_mark(
            Mark::line(xs.clone(), ys.clone())
                .color(Rgb::BLUE)
                .label(name.clone()),
        ));
        ids.push(axes.add_mark(
            Mark::points(xs.clone(), ys, PointMarker::Cross)
                .color(Rgb::BLUE)
                .label(name),
        ));
    }

    let actual = table.column_f64(ACTUAL)?;
    ids.push(axes.add_mark(
        Mark::points(xs, actual, PointMarker::Dot)
            .color(Rgb::BLACK)
            .label(ACTUAL),
    ));

    axes.set_date_axis();
    axes.grid_major();
    axes.set_xlabel(options.x_label.clone());
    axes.set_ylabel(options.y_label.clone());
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::figure::MarkKind;
    use crate::table::TableError;
    use chrono::{Duration, NaiveDate};

    fn table(horizons: usize) -> ForecastTable {
        let start = NaiveDate::from_ymd_opt(2020, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let ds = (0..5).map(|i| start + Duration::days(i)).collect();
        let y: Vec<f64> = (1..=5).map(f64::from).collect();
        let mut table = ForecastTable::new(ds).with_values("y", &y).unwrap();
        for h in 1..=horizons {
            let yhat: Vec<f64> = y.iter().map(|v| v + 0.1 * h as f64).collect();
            table = table.with_values(format!("yhat{h}"), &yhat).unwrap();
        }
        table
    }

    fn quiet() -> ForecastPlotOptions {
        ForecastPlotOptions {
            echo_tail: false,
            ..ForecastPlotOptions::default()
        }
    }

    #[test]
    fn test_single_horizon_marks() {
        let figure = plot_forecast(&table(1), &quiet()).unwrap();
        let axes = figure.panel(0).unwrap();
        assert_eq!(axes.marks().len(), 2);
        assert_eq!(axes.marks()[0].kind, MarkKind::Line);
        assert_eq!(axes.marks()[0].color, Rgb::FORECAST);
        assert_eq!(axes.marks()[1].kind, MarkKind::Points(PointMarker::Dot));
        assert_eq!(axes.marks()[1].color, Rgb::BLACK);
        assert_eq!(axes.x_label, "ds");
        assert_eq!(axes.y_label, "y");
        assert!(axes.grid.is_some());
    }

    #[test]
    fn test_highlight_after_overlays() {
        let mut axes = Axes::new();
        let options = ForecastPlotOptions {
            highlight: Some(2),
            ..quiet()
        };
        let ids = plot_forecast_on(&mut axes, &table(3), &options).unwrap();
        assert_eq!(ids.len(), 6);
        let marks = axes.marks();
        assert!(marks[..3].iter().all(|m| m.color == Rgb::FORECAST));
        assert_eq!(marks[3].kind, MarkKind::Line);
        assert_eq!(marks[3].color, Rgb::BLUE);
        assert_eq!(marks[4].kind, MarkKind::Points(PointMarker::Cross));
        assert!(marks[0].alpha > marks[1].alpha && marks[1].alpha > marks[2].alpha);
    }

    #[test]
    fn test_missing_highlight_column() {
        let mut axes = Axes::new();
        let options = ForecastPlotOptions {
            highlight: Some(4),
            ..quiet()
        };
        let result = plot_forecast_on(&mut axes, &table(1), &options);
        assert!(matches!(
            result,
            Err(PlotError::Table(TableError::MissingColumn(_)))
        ));
    }

    #[test]
    fn test_nulls_become_gaps() {
        let table = table(0).with_column("yhat1", vec![Some(1.0), None, Some(3.0), None, Some(5.0)]);
        let figure = plot_forecast(&table.unwrap(), &quiet()).unwrap();
        let line = &figure.panel(0).unwrap().marks()[0];
        assert_eq!(line.len(), 5);
        assert!(line.ys[1].is_nan());
    }
}

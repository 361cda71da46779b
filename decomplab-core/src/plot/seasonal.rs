//! Seasonal shape panels, evaluated on a reference year (2017 starts on a
//! Sunday).

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};

use super::PlotError;
use crate::figure::{date2num, Axes, DateLocator, Mark, MarkId, Rgb, XAxis};
use crate::model::ForecastModel;

fn shift(base: NaiveDateTime, days: i64) -> Option<NaiveDateTime> {
    TimeDelta::try_days(days).and_then(|delta| base.checked_add_signed(delta))
}

/// `count` consecutive midnights starting `offset_days` after 2017-01-01.
fn reference_days(count: i64, offset_days: i64) -> Result<Vec<NaiveDateTime>, PlotError> {
    let out_of_range = || PlotError::StartOffsetOutOfRange(offset_days);
    let base = NaiveDate::from_ymd_opt(2017, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default();
    let start = shift(base, offset_days).ok_or_else(out_of_range)?;
    (0..count)
        .map(|i| shift(start, i).ok_or_else(out_of_range))
        .collect()
}

fn evaluate(
    model: &dyn ForecastModel,
    name: &str,
    days: &[NaiveDateTime],
) -> Result<Vec<f64>, PlotError> {
    let mut components = model.predict_seasonal_components(days)?;
    components
        .remove(name)
        .ok_or_else(|| PlotError::MissingSeasonality(name.to_string()))
}

fn is_multiplicative(model: &dyn ForecastModel, name: &str) -> bool {
    model
        .config()
        .season_config
        .as_ref()
        .is_some_and(|c| c.is_multiplicative(name))
}

fn finish(axes: &mut Axes, model: &dyn ForecastModel, name: &str, x_label: &str) {
    axes.grid_major();
    axes.set_xlabel(x_label);
    axes.set_ylabel(format!("Seasonality: {name}"));
    if is_multiplicative(model, name) {
        axes.set_y_as_percent();
    }
}

/// One week of the seasonality, labelled by day name.
pub fn plot_weekly(
    axes: &mut Axes,
    model: &dyn ForecastModel,
    name: &str,
    weekly_start: i64,
) -> Result<Vec<MarkId>, PlotError> {
    let days = reference_days(7, weekly_start)?;
    let values = evaluate(model, name, &days)?;
    let xs = (0..days.len()).map(|i| i as f64).collect();
    let id = axes.add_mark(Mark::line(xs, values).color(Rgb::FORECAST));

    axes.x_axis = XAxis::Categorical(days.iter().map(|d| d.format("%A").to_string()).collect());
    finish(axes, model, name, "Day of week");
    Ok(vec![id])
}

/// One year of the seasonality, ticks on the first of every other month.
pub fn plot_yearly(
    axes: &mut Axes,
    model: &dyn ForecastModel,
    name: &str,
    yearly_start: i64,
) -> Result<Vec<MarkId>, PlotError> {
    let days = reference_days(365, yearly_start)?;
    let values = evaluate(model, name, &days)?;
    let xs = days.iter().map(|&d| date2num(d)).collect();
    let id = axes.add_mark(Mark::line(xs, values).color(Rgb::FORECAST));

    axes.x_axis = XAxis::Date(DateLocator::Months { every: 2 });
    finish(axes, model, name, "Day of year");
    Ok(vec![id])
}

/// Seasonalities with arbitrary periods have no renderer.
pub fn plot_custom_season(
    _axes: &mut Axes,
    _model: &dyn ForecastModel,
    name: &str,
) -> Result<Vec<MarkId>, PlotError> {
    Err(PlotError::CustomSeasonality(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        ModelConfig, ModelSnapshot, ModelWeights, SeasonConfig, SeasonPeriod, SeasonalityMode,
    };

    fn model(mode: SeasonalityMode) -> ModelSnapshot {
        let period = |p: f64| SeasonPeriod {
            period: p,
            fourier_order: 1,
            mode: None,
        };
        ModelSnapshot {
            config: ModelConfig {
                season_config: Some(SeasonConfig {
                    mode,
                    periods: vec![
                        ("weekly".into(), period(7.0)),
                        ("yearly".into(), period(365.25)),
                    ],
                }),
                ..ModelConfig::default()
            },
            weights: Some(ModelWeights {
                season_params: vec![
                    ("weekly".into(), vec![0.1, 0.05]),
                    ("yearly".into(), vec![0.12, -0.03]),
                ],
                ..ModelWeights::default()
            }),
            time_normalization: None,
        }
    }

    #[test]
    fn test_weekly_day_names() {
        let mut axes = Axes::new();
        plot_weekly(&mut axes, &model(SeasonalityMode::Additive), "weekly", 0).unwrap();
        axes.layout();
        assert_eq!(axes.x_tick_labels()[0], "Sunday");
        assert_eq!(axes.x_tick_labels()[6], "Saturday");
        assert_eq!(axes.x_label, "Day of week");
        assert_eq!(axes.y_label, "Seasonality: weekly");
        assert_eq!(axes.marks()[0].len(), 7);
    }

    #[test]
    fn test_weekly_start_shifts_days() {
        let mut axes = Axes::new();
        plot_weekly(&mut axes, &model(SeasonalityMode::Additive), "weekly", 1).unwrap();
        axes.layout();
        assert_eq!(axes.x_tick_labels()[0], "Monday");
    }

    #[test]
    fn test_yearly_multiplicative_is_percent() {
        let mut axes = Axes::new();
        plot_yearly(&mut axes, &model(SeasonalityMode::Multiplicative), "yearly", 0).unwrap();
        assert_eq!(axes.marks()[0].len(), 365);
        assert_eq!(axes.x_label, "Day of year");
        let labels = axes.y_tick_labels();
        assert!(!labels.is_empty());
        assert!(labels.iter().all(|l| l.ends_with('%')));
        let raw: Vec<String> = axes.y_ticks.iter().map(|t| t.value.to_string()).collect();
        assert!(labels.iter().zip(&raw).any(|(l, r)| l != r));
    }

    #[test]
    fn test_start_offset_out_of_calendar() {
        let additive = model(SeasonalityMode::Additive);
        let mut axes = Axes::new();
        let result = plot_yearly(&mut axes, &additive, "yearly", 200_000_000);
        assert!(matches!(result, Err(PlotError::StartOffsetOutOfRange(200_000_000))));
        assert!(axes.marks().is_empty());

        let result = plot_weekly(&mut axes, &additive, "weekly", i64::MIN);
        assert!(matches!(result, Err(PlotError::StartOffsetOutOfRange(i64::MIN))));

        // the last representable days still fail cleanly once the week runs off the end
        let max_offset = (NaiveDateTime::MAX.date() - NaiveDate::from_ymd_opt(2017, 1, 1).unwrap())
            .num_days();
        let result = plot_weekly(&mut axes, &additive, "weekly", max_offset - 2);
        assert!(matches!(result, Err(PlotError::StartOffsetOutOfRange(_))));
    }

    #[test]
    fn test_missing_seasonality() {
        let mut axes = Axes::new();
        let result = plot_weekly(&mut axes, &model(SeasonalityMode::Additive), "daily", 0);
        assert!(matches!(result, Err(PlotError::MissingSeasonality(_))));
    }

    #[test]
    fn test_custom_season_unimplemented() {
        let mut axes = Axes::new();
        let result = plot_custom_season(&mut axes, &model(SeasonalityMode::Additive), "monthly");
        assert!(matches!(result, Err(PlotError::CustomSeasonality(ref n)) if n == "monthly"));
    }
}

//! Trend parameter panels.

use super::PlotError;
use crate::figure::{date2num, Axes, Mark, MarkId, Rgb};
use crate::model::{ForecastModel, ModelError};

/// Per-segment trend rate changes as bars, one per segment.
pub fn plot_trend_change(
    axes: &mut Axes,
    model: &dyn ForecastModel,
    title: Option<&str>,
) -> Result<Vec<MarkId>, PlotError> {
    let weights = model.fitted_weights()?;
    let segments = model.config().n_changepoints + 1;
    let deltas = &weights.trend_deltas;
    if deltas.len() != segments {
        return Err(PlotError::WeightShape {
            expected: segments,
            actual: deltas.len(),
        });
    }

    let xs = (0..segments).map(|i| i as f64).collect();
    let id = axes.add_mark(Mark::bars(xs, deltas.clone(), 1.0).color(Rgb::FORECAST));

    axes.grid_major();
    axes.set_xlabel("Trend Segment");
    axes.set_ylabel(title.unwrap_or("Trend Change"));
    Ok(vec![id])
}

/// Trend without changepoints: a straight line over the training period.
pub fn plot_trend_baseline(
    axes: &mut Axes,
    model: &dyn ForecastModel,
    title: Option<&str>,
) -> Result<Vec<MarkId>, PlotError> {
    let weights = model.fitted_weights()?;
    let norm = model
        .time_normalization()
        .ok_or(ModelError::NotFitted("time normalization"))?;

    let xs = vec![date2num(norm.shift), date2num(norm.end())];
    let ys = vec![weights.trend_m0, weights.trend_m0 + weights.trend_k0];
    let id = axes.add_mark(Mark::line(xs, ys).color(Rgb::FORECAST));

    axes.set_date_axis();
    axes.grid_major();
    axes.set_xlabel("ds");
    axes.set_ylabel(title.unwrap_or("Trend"));
    Ok(vec![id])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::figure::MarkKind;
    use crate::model::{ModelConfig, ModelSnapshot, ModelWeights, TimeNormalization};
    use chrono::{Duration, NaiveDate};

    fn fitted(n_changepoints: usize, deltas: Vec<f64>) -> ModelSnapshot {
        let shift = NaiveDate::from_ymd_opt(2018, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        ModelSnapshot {
            config: ModelConfig {
                n_changepoints,
                ..ModelConfig::default()
            },
            weights: Some(ModelWeights {
                trend_deltas: deltas,
                trend_m0: 0.5,
                trend_k0: 0.25,
                ..ModelWeights::default()
            }),
            time_normalization: Some(TimeNormalization::new(shift, Duration::days(100))),
        }
    }

    #[test]
    fn test_trend_change_bars() {
        let mut axes = Axes::new();
        let model = fitted(3, vec![0.1, -0.2, 0.05, 0.0]);
        plot_trend_change(&mut axes, &model, None).unwrap();
        let mark = &axes.marks()[0];
        assert_eq!(mark.kind, MarkKind::Bars { width: 1.0 });
        assert_eq!(mark.xs, vec![0.0, 1.0, 2.0, 3.0]);
        assert_eq!(axes.x_label, "Trend Segment");
        assert_eq!(axes.y_label, "Trend Change");
    }

    #[test]
    fn test_trend_change_shape_mismatch() {
        let mut axes = Axes::new();
        let model = fitted(3, vec![0.1]);
        assert!(matches!(
            plot_trend_change(&mut axes, &model, None),
            Err(PlotError::WeightShape { expected: 4, actual: 1 })
        ));
    }

    #[test]
    fn test_trend_baseline_spans_training_period() {
        let mut axes = Axes::new();
        let model = fitted(0, vec![0.0]);
        plot_trend_baseline(&mut axes, &model, Some("Trend")).unwrap();
        let mark = &axes.marks()[0];
        assert_eq!(mark.xs[1] - mark.xs[0], 100.0);
        assert_eq!(mark.ys, vec![0.5, 0.75]);
    }

    #[test]
    fn test_unfitted_model() {
        let mut axes = Axes::new();
        let model = ModelSnapshot::default();
        assert!(matches!(
            plot_trend_baseline(&mut axes, &model, None),
            Err(PlotError::Model(ModelError::NotFitted(_)))
        ));
    }
}

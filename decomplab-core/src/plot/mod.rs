//! Renderers and dispatchers.
//!
//! Each renderer draws into an `&mut Axes` and returns the [`MarkId`]s it
//! created. The two dispatchers ([`plot_components`] and
//! [`plot_parameters`]) build a list of typed descriptors, allocate one
//! stacked panel per descriptor and route each through an exhaustive match.
//!
//! [`MarkId`]: crate::figure::MarkId

pub mod components;
pub mod forecast;
pub mod lagged;
pub mod parameters;
pub mod seasonal;
pub mod series;
pub mod trend;

use thiserror::Error;

use crate::model::weights::ImportanceError;
use crate::model::ModelError;
use crate::table::TableError;

pub use components::{
    component_descriptors, plot_components, ComponentDescriptor, ComponentKind,
    ComponentPlotOptions,
};
pub use forecast::{plot_forecast, plot_forecast_on, ForecastPlotOptions};
pub use lagged::{plot_lagged_weights, LaggedWeightsSpec};
pub use parameters::{
    parameter_descriptors, plot_parameters, LagSource, ParameterDescriptor, ParameterKind,
    ParameterPlotOptions, SeasonShape,
};
pub use seasonal::{plot_custom_season, plot_weekly, plot_yearly};
pub use series::{
    plot_forecast_component, plot_multiforecast_component, ComponentSpec, MultiForecastSpec,
};
pub use trend::{plot_trend_baseline, plot_trend_change};

/// Errors raised by renderers and dispatchers.
#[derive(Debug, Error)]
pub enum PlotError {
    #[error(transparent)]
    Table(#[from] TableError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("cannot overplot {requested} '{prefix}' series, only {available} columns exist")]
    OverplotExceedsColumns {
        prefix: String,
        requested: usize,
        available: usize,
    },

    #[error("custom seasonality '{0}' cannot be plotted yet")]
    CustomSeasonality(String),

    #[error("focus horizon {focus} outside 1..={horizons}")]
    FocusOutOfRange { focus: usize, horizons: usize },

    #[error("all '{0}' weights are zero, relevance is undefined")]
    DegenerateWeights(String),

    #[error("expected {expected} weights, got {actual}")]
    WeightShape { expected: usize, actual: usize },

    #[error("model returned no values for seasonality '{0}'")]
    MissingSeasonality(String),

    #[error("start offset of {0} days leaves the calendar range")]
    StartOffsetOutOfRange(i64),
}

impl PlotError {
    pub(crate) fn from_importance(err: ImportanceError, name: &str) -> Self {
        match err {
            ImportanceError::FocusOutOfRange { focus, horizons } => {
                PlotError::FocusOutOfRange { focus, horizons }
            }
            ImportanceError::AllZero => PlotError::DegenerateWeights(name.to_string()),
        }
    }
}

/// Alpha of the composite-forecast overlay for horizon index `i`.
pub fn forecast_alpha(i: usize) -> f64 {
    0.2 + 2.0 / (i as f64 + 2.5)
}

/// Alpha of the multi-horizon component overlay for horizon index `i`.
pub fn overplot_alpha(i: usize) -> f64 {
    0.2 + 1.2 * 0.8 / (i as f64 + 1.2)
}

/// Centered rolling mean, minimum one observation, nulls skipped.
///
/// Row `r` averages rows `r - (w - 1 - (w - 1) / 2) ..= r + (w - 1) / 2`
/// clipped to the series; a window with no values yields `None`.
pub fn rolling_mean(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    let window = window.max(1);
    let ahead = (window - 1) / 2;
    let behind = window - 1 - ahead;
    (0..values.len())
        .map(|row| {
            let lo = row.saturating_sub(behind);
            let hi = (row + ahead).min(values.len().saturating_sub(1));
            let (sum, count) = values[lo..=hi]
                .iter()
                .flatten()
                .fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
            (count > 0).then(|| sum / count as f64)
        })
        .collect()
}

//! Lagged-weight relevance bars (AR and lagged covariates).

use tracing::debug;

use super::PlotError;
use crate::figure::{Axes, Mark, MarkId, Rgb};
use crate::model::{lagged_importance, WeightMatrix};

/// What to show for one `[horizon, lag]` weight matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaggedWeightsSpec {
    /// Component name used in axis labels, e.g. `AR`.
    pub name: String,
    /// Show a single horizon's raw weights instead of overall relevance.
    pub focus: Option<usize>,
}

impl LaggedWeightsSpec {
    pub fn new(name: impl Into<String>, focus: Option<usize>) -> Self {
        Self {
            name: name.into(),
            focus,
        }
    }
}

/// Draw lag weights as bars at x = n..1, oldest lag on the left.
pub fn plot_lagged_weights(
    axes: &mut Axes,
    weights: &WeightMatrix,
    spec: &LaggedWeightsSpec,
) -> Result<Vec<MarkId>, PlotError> {
    let values = lagged_importance(weights, spec.focus)
        .map_err(|e| PlotError::from_importance(e, &spec.name))?;
    let n = values.len();
    let xs = (0..n).map(|i| (n - i) as f64).collect();
    let width = if spec.focus.is_some() { 0.8 } else { 1.0 };
    debug!(name = %spec.name, lags = n, focus = ?spec.focus, "plotting lagged weights");

    let id = axes.add_mark(Mark::bars(xs, values, width).color(Rgb::FORECAST));
    axes.grid_major();
    axes.set_xlabel(format!("{} lag number", spec.name));
    match spec.focus {
        None => {
            axes.set_ylabel(format!("{} relevance", spec.name));
            axes.set_y_as_percent();
        }
        Some(f) => axes.set_ylabel(format!("{} weight ({f})-ahead", spec.name)),
    }
    Ok(vec![id])
}

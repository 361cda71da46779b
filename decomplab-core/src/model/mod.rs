//! Read-only handle to a fitted forecasting model.
//!
//! The renderers never fit anything. They read configuration, learned
//! weights, time normalization, and ask the model to evaluate its
//! seasonalities on synthetic date ranges. [`ForecastModel`] is that seam;
//! [`ModelSnapshot`] is the serializable implementation the CLI loads.

pub mod snapshot;
pub mod weights;

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use snapshot::ModelSnapshot;
pub use weights::{lagged_importance, ModelWeights, WeightMatrix};

/// Errors raised by model handles.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model is not fitted: {0} unavailable")]
    NotFitted(&'static str),

    #[error("unknown seasonality '{0}'")]
    UnknownSeasonality(String),

    #[error("weight matrix must be rectangular: row {row} has {actual} values, expected {expected}")]
    RaggedWeights {
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("seasonality '{name}' expects {expected} coefficients, got {actual}")]
    CoefficientCount {
        name: String,
        expected: usize,
        actual: usize,
    },

    #[error("snapshot parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Whether seasonal effects add to or scale the trend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeasonalityMode {
    #[default]
    Additive,
    Multiplicative,
}

/// One registered seasonality.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonPeriod {
    /// Period length in days.
    pub period: f64,
    /// Number of Fourier terms (sin/cos pairs).
    pub fourier_order: usize,
    /// Per-seasonality override of the registry mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<SeasonalityMode>,
}

/// Seasonality registry. Names keep registration order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SeasonConfig {
    #[serde(default)]
    pub mode: SeasonalityMode,
    #[serde(default)]
    pub periods: Vec<(String, SeasonPeriod)>,
}

impl SeasonConfig {
    pub fn get(&self, name: &str) -> Option<&SeasonPeriod> {
        self.periods.iter().find(|(n, _)| n == name).map(|(_, p)| p)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.periods.iter().map(|(n, _)| n.as_str())
    }

    /// Mode for `name`: its override, else the registry mode.
    pub fn mode_of(&self, name: &str) -> SeasonalityMode {
        self.get(name).and_then(|p| p.mode).unwrap_or(self.mode)
    }

    pub fn is_multiplicative(&self, name: &str) -> bool {
        self.mode_of(name) == SeasonalityMode::Multiplicative
    }
}

/// One lagged covariate definition.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CovariateConfig {
    #[serde(default)]
    pub regularization: Option<f64>,
    #[serde(default = "default_true")]
    pub normalize: bool,
}

fn default_true() -> bool {
    true
}

/// Model structure, fixed before fitting.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Autoregression window length (0 disables AR).
    #[serde(default)]
    pub n_lags: usize,
    #[serde(default)]
    pub n_changepoints: usize,
    /// Forecast horizon: number of `yhat<k>` columns.
    #[serde(default = "default_horizon")]
    pub n_forecasts: usize,
    #[serde(default)]
    pub season_config: Option<SeasonConfig>,
    /// Covariates by name, registration order.
    #[serde(default)]
    pub covar_config: Option<Vec<(String, CovariateConfig)>>,
}

fn default_horizon() -> usize {
    1
}

impl ModelConfig {
    pub fn covariate_names(&self) -> impl Iterator<Item = &str> {
        self.covar_config
            .iter()
            .flat_map(|c| c.iter().map(|(n, _)| n.as_str()))
    }

    pub fn seasonality_names(&self) -> impl Iterator<Item = &str> {
        self.season_config.iter().flat_map(|c| c.names())
    }
}

/// Time normalization of the training data: `t = (ds - shift) / scale`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeNormalization {
    pub shift: NaiveDateTime,
    /// Scale in seconds.
    pub scale_secs: i64,
}

impl TimeNormalization {
    pub fn new(shift: NaiveDateTime, scale: Duration) -> Self {
        Self {
            shift,
            scale_secs: scale.num_seconds(),
        }
    }

    pub fn scale(&self) -> Duration {
        Duration::seconds(self.scale_secs)
    }

    /// End of the training period (`shift + scale`).
    pub fn end(&self) -> NaiveDateTime {
        self.shift + self.scale()
    }
}

/// Per-seasonality values over a requested date range.
pub type SeasonalComponents = BTreeMap<String, Vec<f64>>;

/// A fitted model, as seen by the renderers.
pub trait ForecastModel {
    fn config(&self) -> &ModelConfig;

    /// Learned weights; `None` until fitted.
    fn weights(&self) -> Option<&ModelWeights>;

    /// Time normalization of `ds`; `None` until fitted.
    fn time_normalization(&self) -> Option<&TimeNormalization>;

    /// Evaluate every seasonality at the given timestamps.
    fn predict_seasonal_components(
        &self,
        ds: &[NaiveDateTime],
    ) -> Result<SeasonalComponents, ModelError>;

    /// Weights, or [`ModelError::NotFitted`].
    fn fitted_weights(&self) -> Result<&ModelWeights, ModelError> {
        self.weights().ok_or(ModelError::NotFitted("weights"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn season(period: f64, mode: Option<SeasonalityMode>) -> SeasonPeriod {
        SeasonPeriod {
            period,
            fourier_order: 3,
            mode,
        }
    }

    #[test]
    fn test_mode_override() {
        let config = SeasonConfig {
            mode: SeasonalityMode::Additive,
            periods: vec![
                ("weekly".into(), season(7.0, None)),
                ("yearly".into(), season(365.25, Some(SeasonalityMode::Multiplicative))),
            ],
        };
        assert!(!config.is_multiplicative("weekly"));
        assert!(config.is_multiplicative("yearly"));
        assert_eq!(config.names().collect::<Vec<_>>(), vec!["weekly", "yearly"]);
    }

    #[test]
    fn test_config_defaults_from_json() {
        let config: ModelConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.n_lags, 0);
        assert_eq!(config.n_forecasts, 1);
        assert!(config.season_config.is_none());
        assert_eq!(config.covariate_names().count(), 0);
    }

    #[test]
    fn test_time_normalization_end() {
        let shift = chrono::NaiveDate::from_ymd_opt(2020, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let norm = TimeNormalization::new(shift, Duration::days(10));
        assert_eq!(norm.end(), shift + Duration::days(10));
    }
}

//! Serializable fitted-model snapshot.
//!
//! Seasonalities are evaluated as Fourier series over days since
//! 1970-01-01: `sum_k a_k sin(2πkt/p) + b_k cos(2πkt/p)`, with coefficients
//! stored as `[a_1..a_n, b_1..b_n]`.

use std::f64::consts::PI;
use std::fs;
use std::path::Path;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::{
    ForecastModel, ModelConfig, ModelError, ModelWeights, SeasonPeriod, SeasonalComponents,
    TimeNormalization,
};
use crate::figure::date2num;

/// A fitted model exported to JSON.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ModelSnapshot {
    pub config: ModelConfig,
    #[serde(default)]
    pub weights: Option<ModelWeights>,
    #[serde(default)]
    pub time_normalization: Option<TimeNormalization>,
}

impl ModelSnapshot {
    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn to_json(&self) -> Result<String, ModelError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Evaluate one Fourier seasonality at date number `t`.
pub fn fourier_value(season: &SeasonPeriod, coefficients: &[f64], t: f64) -> f64 {
    let n = season.fourier_order;
    (1..=n)
        .map(|k| {
            let angle = 2.0 * PI * k as f64 * t / season.period;
            coefficients[k - 1] * angle.sin() + coefficients[n + k - 1] * angle.cos()
        })
        .sum()
}

impl ForecastModel for ModelSnapshot {
    fn config(&self) -> &ModelConfig {
        &self.config
    }

    fn weights(&self) -> Option<&ModelWeights> {
        self.weights.as_ref()
    }

    fn time_normalization(&self) -> Option<&TimeNormalization> {
        self.time_normalization.as_ref()
    }

    fn predict_seasonal_components(
        &self,
        ds: &[NaiveDateTime],
    ) -> Result<SeasonalComponents, ModelError> {
        let mut out = SeasonalComponents::new();
        let Some(seasons) = &self.config.season_config else {
            return Ok(out);
        };
        let weights = self.fitted_weights()?;
        let ts: Vec<f64> = ds.iter().map(|&d| date2num(d)).collect();

        for (name, season) in &seasons.periods {
            let coefficients = weights
                .season_params(name)
                .ok_or_else(|| ModelError::UnknownSeasonality(name.clone()))?;
            if coefficients.len() != 2 * season.fourier_order {
                return Err(ModelError::CoefficientCount {
                    name: name.clone(),
                    expected: 2 * season.fourier_order,
                    actual: coefficients.len(),
                });
            }
            let values = ts
                .iter()
                .map(|&t| fourier_value(season, coefficients, t))
                .collect();
            out.insert(name.clone(), values);
        }
        Ok(out)
    }
}

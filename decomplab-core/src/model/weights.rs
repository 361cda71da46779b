//! Learned weight tensors.

use serde::{Deserialize, Serialize};

use super::ModelError;

/// Row-major `[horizon, lag]` weight matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<f64>>", into = "Vec<Vec<f64>>")]
pub struct WeightMatrix {
    horizons: usize,
    lags: usize,
    data: Vec<f64>,
}

impl WeightMatrix {
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, ModelError> {
        let horizons = rows.len();
        let lags = rows.first().map(Vec::len).unwrap_or(0);
        let mut data = Vec::with_capacity(horizons * lags);
        for (row, values) in rows.into_iter().enumerate() {
            if values.len() != lags {
                return Err(ModelError::RaggedWeights {
                    row,
                    expected: lags,
                    actual: values.len(),
                });
            }
            data.extend(values);
        }
        Ok(Self {
            horizons,
            lags,
            data,
        })
    }

    pub fn horizons(&self) -> usize {
        self.horizons
    }

    pub fn lags(&self) -> usize {
        self.lags
    }

    pub fn row(&self, horizon: usize) -> Option<&[f64]> {
        (horizon < self.horizons).then(|| &self.data[horizon * self.lags..(horizon + 1) * self.lags])
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.data.chunks(self.lags.max(1)).take(self.horizons)
    }
}

impl TryFrom<Vec<Vec<f64>>> for WeightMatrix {
    type Error = ModelError;

    fn try_from(rows: Vec<Vec<f64>>) -> Result<Self, Self::Error> {
        Self::from_rows(rows)
    }
}

impl From<WeightMatrix> for Vec<Vec<f64>> {
    fn from(m: WeightMatrix) -> Self {
        m.rows().map(<[f64]>::to_vec).collect()
    }
}

/// Why a lagged-importance vector could not be computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportanceError {
    /// Focus horizon outside `1..=horizons`.
    FocusOutOfRange { focus: usize, horizons: usize },
    /// Every weight is zero, nothing to normalize.
    AllZero,
}

/// Per-lag importance of a weight matrix, in lag-column order.
///
/// Without a focus horizon: per-lag sum of absolute weights over all
/// horizons, normalized to sum to one. With focus `f` (1-based): row `f-1`,
/// signed and unnormalized.
pub fn lagged_importance(
    weights: &WeightMatrix,
    focus: Option<usize>,
) -> Result<Vec<f64>, ImportanceError> {
    match focus {
        Some(f) => f
            .checked_sub(1)
            .and_then(|h| weights.row(h))
            .map(<[f64]>::to_vec)
            .ok_or(ImportanceError::FocusOutOfRange {
                focus: f,
                horizons: weights.horizons(),
            }),
        None => {
            let mut totals = vec![0.0; weights.lags()];
            for row in weights.rows() {
                for (total, w) in totals.iter_mut().zip(row) {
                    *total += w.abs();
                }
            }
            let sum: f64 = totals.iter().sum();
            if sum <= 0.0 || !sum.is_finite() {
                return Err(ImportanceError::AllZero);
            }
            Ok(totals.into_iter().map(|t| t / sum).collect())
        }
    }
}

/// Everything the model learned that the parameter plots show.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ModelWeights {
    /// Slope change per trend segment, `n_changepoints + 1` long.
    #[serde(default)]
    pub trend_deltas: Vec<f64>,
    /// Trend intercept (normalized time 0).
    #[serde(default)]
    pub trend_m0: f64,
    /// Base trend slope.
    #[serde(default)]
    pub trend_k0: f64,
    #[serde(default)]
    pub ar_weights: Option<WeightMatrix>,
    /// Per covariate, registration order.
    #[serde(default)]
    pub covar_weights: Vec<(String, WeightMatrix)>,
    /// Fourier coefficients per seasonality: `[sin_1..sin_k, cos_1..cos_k]`.
    #[serde(default)]
    pub season_params: Vec<(String, Vec<f64>)>,
}

impl ModelWeights {
    pub fn covar_weights(&self, name: &str) -> Option<&WeightMatrix> {
        self.covar_weights
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, w)| w)
    }

    pub fn season_params(&self, name: &str) -> Option<&[f64]> {
        self.season_params
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, p)| p.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix_3x4() -> WeightMatrix {
        WeightMatrix::from_rows(vec![
            vec![0.5, -0.2, 0.1, 0.0],
            vec![-0.3, 0.4, -0.1, 0.2],
            vec![0.1, 0.1, 0.3, -0.6],
        ])
        .unwrap()
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let result = WeightMatrix::from_rows(vec![vec![1.0, 2.0], vec![3.0]]);
        assert!(matches!(result, Err(ModelError::RaggedWeights { row: 1, .. })));
    }

    #[test]
    fn test_importance_without_focus_normalizes() {
        let values = lagged_importance(&matrix_3x4(), None).unwrap();
        assert_eq!(values.len(), 4);
        assert!(values.iter().all(|v| *v >= 0.0));
        assert!((values.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        // lag column 0: |0.5| + |-0.3| + |0.1| = 0.9 out of 2.9
        assert!((values[0] - 0.9 / 2.9).abs() < 1e-12);
    }

    #[test]
    fn test_importance_with_focus_is_raw_row() {
        let values = lagged_importance(&matrix_3x4(), Some(2)).unwrap();
        assert_eq!(values, vec![-0.3, 0.4, -0.1, 0.2]);
    }

    #[test]
    fn test_importance_focus_out_of_range() {
        assert_eq!(
            lagged_importance(&matrix_3x4(), Some(0)),
            Err(ImportanceError::FocusOutOfRange { focus: 0, horizons: 3 })
        );
        assert_eq!(
            lagged_importance(&matrix_3x4(), Some(4)),
            Err(ImportanceError::FocusOutOfRange { focus: 4, horizons: 3 })
        );
    }

    #[test]
    fn test_importance_all_zero() {
        let zeros = WeightMatrix::from_rows(vec![vec![0.0; 3]; 2]).unwrap();
        assert_eq!(lagged_importance(&zeros, None), Err(ImportanceError::AllZero));
    }

    #[test]
    fn test_matrix_serde_as_nested_rows() {
        let json = serde_json::to_string(&matrix_3x4()).unwrap();
        assert!(json.starts_with("[[0.5,"));
        let back: WeightMatrix = serde_json::from_str(&json).unwrap();
        assert_eq!(back, matrix_3x4());
    }
}

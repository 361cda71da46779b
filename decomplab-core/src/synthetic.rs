//! Deterministic demo data: a small fitted model and a forecast table
//! consistent with it.
//!
//! The table is built the way the model would decompose it: piecewise
//! linear trend, additive weekly and multiplicative yearly seasonality,
//! AR and one lagged covariate per horizon. The last `n_forecasts` rows have
//! no actuals.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::model::{
    CovariateConfig, ForecastModel, ModelConfig, ModelSnapshot, ModelWeights, SeasonConfig,
    SeasonPeriod, SeasonalityMode, TimeNormalization, WeightMatrix,
};
use crate::plot::PlotError;
use crate::table::{ForecastTable, ACTUAL, RESIDUALS, TREND};

const N_LAGS: usize = 4;
const N_FORECASTS: usize = 3;
const N_CHANGEPOINTS: usize = 5;
const COVARIATE: &str = "temp";

/// A model and a table it could have produced.
#[derive(Debug, Clone)]
pub struct SyntheticDemo {
    pub model: ModelSnapshot,
    pub table: ForecastTable,
}

fn random_matrix(rng: &mut StdRng, scale: f64) -> Result<WeightMatrix, PlotError> {
    let rows = (0..N_FORECASTS)
        .map(|h| {
            (0..N_LAGS)
                // recent lags weigh more, far horizons less
                .map(|l| rng.gen_range(-scale..scale) * (l + 1) as f64 / (N_LAGS * (h + 1)) as f64)
                .collect()
        })
        .collect();
    Ok(WeightMatrix::from_rows(rows)?)
}

/// Roughly normal noise from the sum of uniforms.
fn noise(rng: &mut StdRng, scale: f64) -> f64 {
    let sum: f64 = (0..6).map(|_| rng.gen_range(-1.0..1.0)).sum();
    sum / 6.0_f64.sqrt() * scale
}

fn model(rng: &mut StdRng, start: NaiveDateTime, days: usize) -> Result<ModelSnapshot, PlotError> {
    let period = |period: f64, fourier_order: usize, mode: Option<SeasonalityMode>| SeasonPeriod {
        period,
        fourier_order,
        mode,
    };
    let mut params = |order: usize, scale: f64| -> Vec<f64> {
        (0..2 * order).map(|_| rng.gen_range(-scale..scale)).collect()
    };
    let season_params = vec![
        ("weekly".to_string(), params(3, 1.5)),
        ("yearly".to_string(), params(2, 0.15)),
    ];

    let trend_deltas = (0..=N_CHANGEPOINTS).map(|_| rng.gen_range(-8.0..8.0)).collect();
    let weights = ModelWeights {
        trend_deltas,
        trend_m0: 50.0,
        trend_k0: 10.0,
        ar_weights: Some(random_matrix(rng, 1.0)?),
        covar_weights: vec![(COVARIATE.to_string(), random_matrix(rng, 0.8)?)],
        season_params,
    };

    Ok(ModelSnapshot {
        config: ModelConfig {
            n_lags: N_LAGS,
            n_changepoints: N_CHANGEPOINTS,
            n_forecasts: N_FORECASTS,
            season_config: Some(SeasonConfig {
                mode: SeasonalityMode::Additive,
                periods: vec![
                    ("weekly".to_string(), period(7.0, 3, None)),
                    (
                        "yearly".to_string(),
                        period(365.25, 2, Some(SeasonalityMode::Multiplicative)),
                    ),
                ],
            }),
            covar_config: Some(vec![(COVARIATE.to_string(), CovariateConfig::default())]),
        },
        weights: Some(weights),
        time_normalization: Some(TimeNormalization::new(
            start,
            Duration::days(days.saturating_sub(1).max(1) as i64),
        )),
    })
}

/// Piecewise-linear trend over normalized time `t` in `[0, 1]`.
fn trend_at(weights: &ModelWeights, t: f64) -> f64 {
    let segments = weights.trend_deltas.len() as f64;
    let bends: f64 = weights
        .trend_deltas
        .iter()
        .enumerate()
        .map(|(j, delta)| delta * (t - j as f64 / segments).max(0.0))
        .sum();
    weights.trend_m0 + weights.trend_k0 * t + bends
}

/// Lagged contribution of `series` at `row` for horizon `h` (1-based).
fn lagged(matrix: &WeightMatrix, series: &[f64], row: usize, h: usize) -> Option<f64> {
    let weights = matrix.row(h - 1)?;
    let newest = row.checked_sub(h)?;
    let oldest = newest.checked_sub(weights.len().checked_sub(1)?)?;
    // weights run oldest lag first
    Some(
        weights
            .iter()
            .zip(&series[oldest..=newest])
            .map(|(w, v)| w * v)
            .sum(),
    )
}

impl SyntheticDemo {
    /// `days` daily rows starting 2020-01-01.
    pub fn generate(seed: u64, days: usize) -> Result<Self, PlotError> {
        let mut rng = StdRng::seed_from_u64(seed);
        let start = NaiveDate::from_ymd_opt(2020, 1, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .unwrap_or_default();
        let model = model(&mut rng, start, days)?;
        let weights = model.fitted_weights()?;
        let ds: Vec<NaiveDateTime> = (0..days).map(|i| start + Duration::days(i as i64)).collect();

        let span = days.saturating_sub(1).max(1) as f64;
        let trend: Vec<f64> = (0..days).map(|i| trend_at(weights, i as f64 / span)).collect();
        let mut seasons = model.predict_seasonal_components(&ds)?;
        let mut take = |name: &str| {
            seasons
                .remove(name)
                .ok_or_else(|| PlotError::MissingSeasonality(name.to_string()))
        };
        let weekly = take("weekly")?;
        let yearly = take("yearly")?;
        let base: Vec<f64> = (0..days)
            .map(|i| trend[i] * (1.0 + yearly[i]) + weekly[i])
            .collect();

        let temp: Vec<f64> = (0..days)
            .map(|i| (i as f64 / 9.0).sin() * 3.0 + noise(&mut rng, 0.5))
            .collect();
        let truth: Vec<f64> = base.iter().map(|b| b + noise(&mut rng, 1.5)).collect();
        let deviation: Vec<f64> = truth.iter().zip(&base).map(|(y, b)| y - b).collect();

        let ar_matrix = weights.ar_weights.as_ref();
        let covar_matrix = weights.covar_weights(COVARIATE);
        let observed = days.saturating_sub(N_FORECASTS);

        let mut table = ForecastTable::new(ds)
            .with_column(ACTUAL, (0..days).map(|i| (i < observed).then(|| truth[i])).collect())?;

        let mut yhat1 = vec![None; days];
        let mut ar_columns = Vec::with_capacity(N_FORECASTS);
        let mut covar_columns = Vec::with_capacity(N_FORECASTS);
        for h in 1..=N_FORECASTS {
            let ar: Vec<Option<f64>> = (0..days)
                .map(|r| ar_matrix.and_then(|m| lagged(m, &deviation, r, h)))
                .collect();
            let covar: Vec<Option<f64>> = (0..days)
                .map(|r| covar_matrix.and_then(|m| lagged(m, &temp, r, h)))
                .collect();
            let yhat: Vec<Option<f64>> = (0..days)
                .map(|r| Some(base[r] + ar[r]? + covar[r]?))
                .collect();
            if h == 1 {
                yhat1.clone_from(&yhat);
            }
            table.insert_column(format!("yhat{h}"), yhat)?;
            ar_columns.push(ar);
            covar_columns.push(covar);
        }

        table.insert_column(TREND, trend.into_iter().map(Some).collect())?;
        table.insert_column("season_weekly", weekly.into_iter().map(Some).collect())?;
        table.insert_column("season_yearly", yearly.into_iter().map(Some).collect())?;
        for (h, ar) in ar_columns.into_iter().enumerate() {
            table.insert_column(format!("ar{}", h + 1), ar)?;
        }
        for (h, covar) in covar_columns.into_iter().enumerate() {
            table.insert_column(format!("covar_{COVARIATE}{}", h + 1), covar)?;
        }
        let residuals = (0..days)
            .map(|i| Some(yhat1[i]? - (i < observed).then(|| truth[i])?))
            .collect();
        table.insert_column(RESIDUALS, residuals)?;

        Ok(Self { model, table })
    }
}

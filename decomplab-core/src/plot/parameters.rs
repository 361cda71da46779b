//! Learned-parameter panels: trend, seasonal shapes and lag relevance.

use tracing::debug;

use super::lagged::{plot_lagged_weights, LaggedWeightsSpec};
use super::seasonal::{plot_custom_season, plot_weekly, plot_yearly};
use super::trend::{plot_trend_baseline, plot_trend_change};
use super::PlotError;
use crate::figure::{Axes, Figure, FigureSize, PostProcess, RenderPipeline};
use crate::model::{ForecastModel, ModelConfig, ModelError, SeasonPeriod};

const WEEK_DAYS: f64 = 7.0;
const YEAR_DAYS: f64 = 365.25;

/// How a seasonality is laid out on the x axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeasonShape {
    Weekly,
    Yearly,
    Custom,
}

impl SeasonShape {
    pub fn classify(name: &str, season: &SeasonPeriod) -> Self {
        if name.eq_ignore_ascii_case("weekly") || season.period == WEEK_DAYS {
            SeasonShape::Weekly
        } else if name.eq_ignore_ascii_case("yearly") || season.period == YEAR_DAYS {
            SeasonShape::Yearly
        } else {
            SeasonShape::Custom
        }
    }
}

/// Where a lagged-weight matrix comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LagSource {
    Ar,
    Covariate(String),
}

impl LagSource {
    /// Label used on the panel axes.
    pub fn label(&self) -> String {
        match self {
            LagSource::Ar => "AR".to_string(),
            LagSource::Covariate(name) => format!("COV \"{name}\""),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterKind {
    TrendChangepoints,
    /// Used only when nothing else is plottable.
    TrendBaseline,
    Seasonality { name: String, shape: SeasonShape },
    LaggedWeights { source: LagSource, focus: Option<usize> },
}

/// One panel of [`plot_parameters`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterDescriptor {
    pub display_name: String,
    pub kind: ParameterKind,
}

/// Options for [`plot_parameters`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParameterPlotOptions {
    /// Adds a raw-weights panel for this horizon per lagged component.
    pub focus: Option<usize>,
    /// Days to shift the weekly plot; 0 starts on Sunday.
    pub weekly_start: i64,
    /// Days to shift the yearly plot; 0 starts on January 1.
    pub yearly_start: i64,
    /// Defaults to 9 × 3 per panel.
    pub size: Option<FigureSize>,
}

fn lagged(source: LagSource, focus: Option<usize>) -> ParameterDescriptor {
    ParameterDescriptor {
        display_name: source.label(),
        kind: ParameterKind::LaggedWeights { source, focus },
    }
}

/// Parameter panels for this model configuration, top to bottom.
pub fn parameter_descriptors(config: &ModelConfig, focus: Option<usize>) -> Vec<ParameterDescriptor> {
    let mut out = Vec::new();
    if config.n_changepoints > 0 {
        out.push(ParameterDescriptor {
            display_name: "Trend changepoints".to_string(),
            kind: ParameterKind::TrendChangepoints,
        });
    }

    if let Some(seasons) = &config.season_config {
        for (name, season) in &seasons.periods {
            out.push(ParameterDescriptor {
                display_name: format!("{name} seasonality"),
                kind: ParameterKind::Seasonality {
                    name: name.clone(),
                    shape: SeasonShape::classify(name, season),
                },
            });
        }
    }

    let mut sources = Vec::new();
    if config.n_lags > 0 {
        sources.push(LagSource::Ar);
    }
    sources.extend(config.covariate_names().map(|n| LagSource::Covariate(n.to_string())));
    for source in sources {
        out.push(lagged(source.clone(), None));
        if focus.is_some() {
            out.push(lagged(source, focus));
        }
    }

    if out.is_empty() {
        out.push(ParameterDescriptor {
            display_name: "Trend".to_string(),
            kind: ParameterKind::TrendBaseline,
        });
    }
    debug!(
        panels = ?out.iter().map(|d| d.display_name.as_str()).collect::<Vec<_>>(),
        "parameter descriptors"
    );
    out
}

fn draw_parameter(
    axes: &mut Axes,
    model: &dyn ForecastModel,
    desc: &ParameterDescriptor,
    options: &ParameterPlotOptions,
) -> Result<(), PlotError> {
    match &desc.kind {
        ParameterKind::TrendChangepoints => {
            plot_trend_change(axes, model, Some(desc.display_name.as_str()))?;
        }
        ParameterKind::TrendBaseline => {
            plot_trend_baseline(axes, model, Some(desc.display_name.as_str()))?;
        }
        ParameterKind::Seasonality { name, shape } => {
            match shape {
                SeasonShape::Weekly => plot_weekly(axes, model, name, options.weekly_start)?,
                SeasonShape::Yearly => plot_yearly(axes, model, name, options.yearly_start)?,
                SeasonShape::Custom => plot_custom_season(axes, model, name)?,
            };
        }
        ParameterKind::LaggedWeights { source, focus } => {
            let weights = model.fitted_weights()?;
            let matrix = match source {
                LagSource::Ar => weights.ar_weights.as_ref(),
                LagSource::Covariate(name) => weights.covar_weights(name),
            }
            .ok_or(ModelError::NotFitted("lagged weights"))?;
            plot_lagged_weights(axes, matrix, &LaggedWeightsSpec::new(source.label(), *focus))?;
        }
    }
    Ok(())
}

fn needs_percent(model: &dyn ForecastModel, kind: &ParameterKind) -> bool {
    match kind {
        ParameterKind::Seasonality { name, .. } => model
            .config()
            .season_config
            .as_ref()
            .is_some_and(|c| c.is_multiplicative(name)),
        ParameterKind::LaggedWeights { focus, .. } => focus.is_none(),
        ParameterKind::TrendChangepoints | ParameterKind::TrendBaseline => false,
    }
}

/// Plot the model's learned parameters into vertically stacked panels.
pub fn plot_parameters(
    model: &dyn ForecastModel,
    options: &ParameterPlotOptions,
) -> Result<Figure, PlotError> {
    model.fitted_weights()?;
    let descriptors = parameter_descriptors(model.config(), options.focus);
    let size = options
        .size
        .unwrap_or_else(|| FigureSize::stacked(descriptors.len()));
    let mut pipeline = RenderPipeline::new(descriptors.len(), size);

    for (panel, desc) in descriptors.iter().enumerate() {
        if let Some(axes) = pipeline.panel_mut(panel) {
            draw_parameter(axes, model, desc, options)?;
        }
        if needs_percent(model, &desc.kind) {
            pipeline.defer(PostProcess::PercentYAxis { panel });
        }
    }
    Ok(pipeline.finish())
}

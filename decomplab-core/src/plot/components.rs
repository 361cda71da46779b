//! Component decomposition: one stacked panel per forecast component.

use tracing::debug;

use super::series::{
    plot_forecast_component, plot_multiforecast_component, ComponentSpec, MultiForecastSpec,
};
use super::PlotError;
use crate::figure::{Axes, Figure, FigureSize, PostProcess, RenderPipeline};
use crate::model::ForecastModel;
use crate::table::{ForecastTable, RESIDUALS, TREND};

/// What a component panel shows and how it is drawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComponentKind {
    Trend,
    Seasonal { multiplicative: bool },
    /// All AR horizons overlaid as bars.
    AutoRegression { overplot: usize },
    AutoRegressionFocus { horizon: usize },
    /// All horizons of one covariate overlaid as bars.
    Covariate { overplot: usize },
    CovariateFocus { horizon: usize },
    Residuals { rolling: usize },
}

/// One panel of [`plot_components`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentDescriptor {
    pub display_name: String,
    /// Column name, or column prefix for the overlaid kinds.
    pub column_key: String,
    pub kind: ComponentKind,
}

impl ComponentDescriptor {
    fn new(display_name: impl Into<String>, column_key: impl Into<String>, kind: ComponentKind) -> Self {
        Self {
            display_name: display_name.into(),
            column_key: column_key.into(),
            kind,
        }
    }
}

/// Options for [`plot_components`].
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentPlotOptions {
    /// Adds a single-horizon panel per lagged component.
    pub focus: Option<usize>,
    pub residual_rolling: usize,
    /// Defaults to 9 × 3 per panel.
    pub size: Option<FigureSize>,
}

impl Default for ComponentPlotOptions {
    fn default() -> Self {
        Self {
            focus: None,
            residual_rolling: 7,
            size: None,
        }
    }
}

/// Panels to draw for this model and table, top to bottom.
pub fn component_descriptors(
    model: &dyn ForecastModel,
    table: &ForecastTable,
    options: &ComponentPlotOptions,
) -> Vec<ComponentDescriptor> {
    let config = model.config();
    let mut out = vec![ComponentDescriptor::new("Trend", TREND, ComponentKind::Trend)];

    if let Some(seasons) = &config.season_config {
        for name in seasons.names() {
            out.push(ComponentDescriptor::new(
                format!("{name} seasonality"),
                format!("season_{name}"),
                ComponentKind::Seasonal {
                    multiplicative: seasons.is_multiplicative(name),
                },
            ));
        }
    }

    if config.n_lags > 0 {
        out.push(ComponentDescriptor::new(
            "Auto-Regression",
            "ar",
            ComponentKind::AutoRegression {
                overplot: config.n_forecasts,
            },
        ));
        if let Some(f) = options.focus {
            out.push(ComponentDescriptor::new(
                format!("AR Forecast {f}"),
                format!("ar{f}"),
                ComponentKind::AutoRegressionFocus { horizon: f },
            ));
        }
    }

    for name in config.covariate_names() {
        out.push(ComponentDescriptor::new(
            format!("Covariate \"{name}\""),
            format!("covar_{name}"),
            ComponentKind::Covariate {
                overplot: config.n_forecasts,
            },
        ));
        if let Some(f) = options.focus {
            out.push(ComponentDescriptor::new(
                format!("COV \"{name}\" Forecast {f}"),
                format!("covar_{name}{f}"),
                ComponentKind::CovariateFocus { horizon: f },
            ));
        }
    }

    if table.has_column(RESIDUALS) {
        out.push(ComponentDescriptor::new(
            "Residuals",
            RESIDUALS,
            ComponentKind::Residuals {
                rolling: options.residual_rolling,
            },
        ));
    } else {
        debug!("no residuals column, skipping residuals panel");
    }

    debug!(
        panels = ?out.iter().map(|d| d.display_name.as_str()).collect::<Vec<_>>(),
        "component descriptors"
    );
    out
}

fn draw_component(
    axes: &mut Axes,
    table: &ForecastTable,
    desc: &ComponentDescriptor,
) -> Result<(), PlotError> {
    let single = ComponentSpec::new(&desc.column_key).title(&desc.display_name);
    match desc.kind {
        ComponentKind::Trend
        | ComponentKind::Seasonal { .. }
        | ComponentKind::AutoRegressionFocus { .. }
        | ComponentKind::CovariateFocus { .. } => {
            plot_forecast_component(axes, table, &single)?;
        }
        ComponentKind::Residuals { rolling } => {
            plot_forecast_component(axes, table, &single.rolling(rolling).bar(true))?;
        }
        ComponentKind::AutoRegression { overplot } | ComponentKind::Covariate { overplot } => {
            let spec = MultiForecastSpec {
                num_overplot: Some(overplot),
                bar: true,
                title: Some(desc.display_name.clone()),
                ..MultiForecastSpec::new(&desc.column_key)
            };
            plot_multiforecast_component(axes, table, &spec)?;
        }
    }
    Ok(())
}

/// Plot every forecast component into vertically stacked panels.
///
/// Multiplicative seasonal panels get percentage y labels once layout has
/// run.
pub fn plot_components(
    model: &dyn ForecastModel,
    table: &ForecastTable,
    options: &ComponentPlotOptions,
) -> Result<Figure, PlotError> {
    let descriptors = component_descriptors(model, table, options);
    let size = options
        .size
        .unwrap_or_else(|| FigureSize::stacked(descriptors.len()));
    let mut pipeline = RenderPipeline::new(descriptors.len(), size);

    for (panel, desc) in descriptors.iter().enumerate() {
        if let Some(axes) = pipeline.panel_mut(panel) {
            draw_component(axes, table, desc)?;
        }
        if matches!(desc.kind, ComponentKind::Seasonal { multiplicative: true }) {
            pipeline.defer(PostProcess::PercentYAxis { panel });
        }
    }
    Ok(pipeline.finish())
}

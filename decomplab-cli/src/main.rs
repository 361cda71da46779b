//! DecompLab CLI: draw forecast decompositions in the terminal.
//!
//! Commands:
//! - `forecast`: fitted values of every horizon against the actuals
//! - `components`: one panel per forecast component
//! - `parameters`: one panel per learned model parameter
//! - `demo`: all three figures for a synthetic model and forecast

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use decomplab_core::plot::{
    plot_components, plot_forecast, plot_parameters, ComponentPlotOptions, ForecastPlotOptions,
    ParameterPlotOptions,
};
use decomplab_core::table::load::load_table;
use decomplab_core::{Figure, ForecastTable, ModelSnapshot, PlotConfig, SyntheticDemo};
use decomplab_tui::{buffer_to_text, draw_inline, render_to_buffer, stdout_is_terminal, Theme};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "decomplab",
    about = "DecompLab CLI, forecast decomposition figures in the terminal"
)]
struct Cli {
    #[command(flatten)]
    output: OutputArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct OutputArgs {
    /// Path to a TOML config file. Defaults to <config dir>/decomplab/config.toml.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print the figure as plain text instead of drawing it inline.
    #[arg(long, global = true, default_value_t = false)]
    text: bool,

    /// Columns of the drawing.
    #[arg(long, global = true)]
    width: Option<u16>,

    /// Terminal rows per panel.
    #[arg(long, global = true)]
    panel_height: Option<u16>,

    /// Dark canvas instead of the white paper one.
    #[arg(long, global = true, default_value_t = false)]
    dark: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Fitted values of every forecast horizon against the actuals.
    Forecast {
        /// Forecast table (CSV or Parquet).
        #[arg(long)]
        table: PathBuf,

        /// Horizon to draw again in solid blue (1-based).
        #[arg(long)]
        highlight: Option<usize>,

        #[arg(long, default_value = "ds")]
        xlabel: String,

        #[arg(long, default_value = "y")]
        ylabel: String,
    },
    /// One panel per forecast component.
    Components {
        /// Forecast table (CSV or Parquet).
        #[arg(long)]
        table: PathBuf,

        /// Model snapshot (JSON).
        #[arg(long)]
        model: PathBuf,

        /// Add single-horizon panels for this horizon (1-based).
        #[arg(long)]
        focus: Option<usize>,
    },
    /// One panel per learned model parameter.
    Parameters {
        /// Model snapshot (JSON).
        #[arg(long)]
        model: PathBuf,

        /// Add raw-weight panels for this horizon (1-based).
        #[arg(long)]
        focus: Option<usize>,

        /// Days to shift the weekly plot; 0 starts on Sunday.
        #[arg(long)]
        weekly_start: Option<i64>,

        /// Days to shift the yearly plot; 0 starts on January 1.
        #[arg(long)]
        yearly_start: Option<i64>,
    },
    /// Render all three figures for a synthetic model and forecast.
    Demo {
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Days of synthetic history.
        #[arg(long, default_value_t = 120)]
        days: usize,

        #[arg(long)]
        focus: Option<usize>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = PlotConfig::resolve(cli.output.config.as_deref())
        .context("failed to load configuration")?;
    if let Some(width) = cli.output.width {
        config.render.width = width;
    }
    if let Some(height) = cli.output.panel_height {
        config.render.panel_height = height;
    }
    let out = Output::new(&config, &cli.output);

    match cli.command {
        Commands::Forecast {
            table,
            highlight,
            xlabel,
            ylabel,
        } => {
            let table = read_table(&table)?;
            let options = ForecastPlotOptions {
                highlight,
                x_label: xlabel,
                y_label: ylabel,
                echo_tail: config.echo_tail,
                tail_rows: config.tail_rows,
                ..ForecastPlotOptions::default()
            };
            out.show(&plot_forecast(&table, &options)?)
        }
        Commands::Components {
            table,
            model,
            focus,
        } => {
            let table = read_table(&table)?;
            let model = read_model(&model)?;
            let options = component_options(&config, focus);
            out.show(&plot_components(&model, &table, &options)?)
        }
        Commands::Parameters {
            model,
            focus,
            weekly_start,
            yearly_start,
        } => {
            if let Some(days) = weekly_start {
                config.weekly_start = days;
            }
            if let Some(days) = yearly_start {
                config.yearly_start = days;
            }
            let model = read_model(&model)?;
            out.show(&plot_parameters(&model, &parameter_options(&config, focus))?)
        }
        Commands::Demo { seed, days, focus } => run_demo(&config, &out, seed, days, focus),
    }
}

fn run_demo(
    config: &PlotConfig,
    out: &Output,
    seed: u64,
    days: usize,
    focus: Option<usize>,
) -> Result<()> {
    let demo = SyntheticDemo::generate(seed, days).context("failed to build synthetic demo")?;
    info!(seed, days, rows = demo.table.len(), "synthetic demo generated");

    let options = ForecastPlotOptions {
        highlight: focus,
        echo_tail: config.echo_tail,
        tail_rows: config.tail_rows,
        ..ForecastPlotOptions::default()
    };
    out.show(&plot_forecast(&demo.table, &options)?)?;
    out.show(&plot_components(
        &demo.model,
        &demo.table,
        &component_options(config, focus),
    )?)?;
    out.show(&plot_parameters(
        &demo.model,
        &parameter_options(config, focus),
    )?)
}

fn component_options(config: &PlotConfig, focus: Option<usize>) -> ComponentPlotOptions {
    ComponentPlotOptions {
        focus,
        residual_rolling: config.residual_rolling,
        ..ComponentPlotOptions::default()
    }
}

fn parameter_options(config: &PlotConfig, focus: Option<usize>) -> ParameterPlotOptions {
    ParameterPlotOptions {
        focus,
        weekly_start: config.weekly_start,
        yearly_start: config.yearly_start,
        ..ParameterPlotOptions::default()
    }
}

fn read_table(path: &Path) -> Result<ForecastTable> {
    load_table(path).with_context(|| format!("failed to read forecast table {}", path.display()))
}

fn read_model(path: &Path) -> Result<ModelSnapshot> {
    ModelSnapshot::load(path)
        .with_context(|| format!("failed to read model snapshot {}", path.display()))
}

/// Where and how figures are drawn.
struct Output {
    width: u16,
    panel_height: u16,
    text: bool,
    theme: Theme,
}

impl Output {
    fn new(config: &PlotConfig, args: &OutputArgs) -> Self {
        Self {
            width: config.render.width.max(20),
            panel_height: config.render.panel_height.max(4),
            // piping into a file gets the text dump
            text: args.text || !stdout_is_terminal(),
            theme: if args.dark {
                Theme::dark()
            } else {
                Theme::paper()
            },
        }
    }

    fn height(&self, figure: &Figure) -> u16 {
        let panels = u16::try_from(figure.panel_count()).unwrap_or(u16::MAX);
        self.panel_height.saturating_mul(panels.max(1))
    }

    fn show(&self, figure: &Figure) -> Result<()> {
        let height = self.height(figure);
        if self.text {
            let buf = render_to_buffer(figure, self.width, height, &self.theme);
            println!("{}", buffer_to_text(&buf));
            println!();
            Ok(())
        } else {
            draw_inline(figure, height, &self.theme)
        }
    }
}

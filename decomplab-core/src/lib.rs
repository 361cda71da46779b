//! DecompLab Core: forecast decomposition figures, independent of any
//! drawing backend.
//!
//! This crate contains:
//! - Forecast tables (`ds` + nullable value columns) with CSV/Parquet loading
//! - The read-only model handle trait and a JSON model snapshot
//! - A figure scene graph (figure → axes → marks) with a two-phase
//!   layout/relabel pipeline and date-aware tick placement
//! - Composite, component and parameter renderers plus their dispatchers
//! - Plot configuration and deterministic demo data

pub mod config;
pub mod figure;
pub mod model;
pub mod plot;
pub mod synthetic;
pub mod table;

pub use config::{ConfigError, PlotConfig, RenderConfig};
pub use figure::{Axes, Figure, FigureSize, Mark, MarkId, MarkKind, PointMarker, Rgb, XAxis};
pub use model::{ForecastModel, ModelError, ModelSnapshot};
pub use plot::PlotError;
pub use synthetic::SyntheticDemo;
pub use table::{ForecastTable, TableError};

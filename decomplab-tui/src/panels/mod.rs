//! Figure widgets.

pub mod axes;
pub mod figure;

pub use axes::AxesWidget;
pub use figure::FigureWidget;

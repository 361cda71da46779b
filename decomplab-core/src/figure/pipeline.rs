//! Two-phase figure finishing.
//!
//! 1. Build: renderers draw into the panels.
//! 2. Layout: every axes is autoscaled and its ticks recomputed. Layout
//!    resets tick labels, so any relabeling done before it is lost.
//! 3. Post-process: registered tick relabels run against the final ticks.
//!
//! Dispatchers register relabels with [`RenderPipeline::defer`] instead of
//! applying them inline, which keeps the ordering explicit.

use tracing::debug;

use super::{Axes, Figure, FigureSize};

/// A tick-label rewrite applied after layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostProcess {
    /// Relabel the y axis of panel `panel` as percentages.
    PercentYAxis { panel: usize },
}

/// Owns a figure while its panels are being built.
#[derive(Debug)]
pub struct RenderPipeline {
    figure: Figure,
    post: Vec<PostProcess>,
}

impl RenderPipeline {
    /// Start a pipeline over `panels` empty, vertically stacked axes.
    pub fn new(panels: usize, size: FigureSize) -> Self {
        Self {
            figure: Figure::with_panels(panels, size),
            post: Vec::new(),
        }
    }

    pub fn panel_count(&self) -> usize {
        self.figure.panel_count()
    }

    /// Mutable access to one panel during the build phase.
    pub fn panel_mut(&mut self, index: usize) -> Option<&mut Axes> {
        self.figure.panel_mut(index)
    }

    /// Register a post-layout step.
    pub fn defer(&mut self, step: PostProcess) {
        if !self.post.contains(&step) {
            self.post.push(step);
        }
    }

    pub fn deferred(&self) -> &[PostProcess] {
        &self.post
    }

    /// Run layout, then every deferred step in registration order.
    pub fn finish(mut self) -> Figure {
        self.figure.tight_layout();
        for step in &self.post {
            match *step {
                PostProcess::PercentYAxis { panel } => {
                    if let Some(axes) = self.figure.panel_mut(panel) {
                        axes.set_y_as_percent();
                    }
                }
            }
        }
        debug!(
            panels = self.figure.panel_count(),
            post_steps = self.post.len(),
            "figure finished"
        );
        self.figure
    }
}

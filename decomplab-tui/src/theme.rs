//! Color tokens for terminal figures.
//!
//! Figures carry plain RGB colors plus an alpha per mark. Terminals have no
//! transparency, so a mark's color is blended over the canvas color once,
//! up front.
//!
//! # Palettes
//! - **Paper** (default): white canvas, the colors a printed figure would
//!   use
//! - **Dark**: charcoal canvas; black ink (actual values) is drawn white

use decomplab_core::Rgb;
use ratatui::style::Color;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Theme {
    /// Canvas every mark color is blended over.
    pub canvas: Rgb,
    /// Axis lines and panel borders.
    pub axis: Color,
    /// Panel titles.
    pub text_primary: Color,
    /// Axis titles and tick labels.
    pub text_secondary: Color,
    /// Empty-panel notice.
    pub muted: Color,
    /// Draw black marks in white.
    pub invert_ink: bool,
}

impl Default for Theme {
    fn default() -> Self {
        Self::paper()
    }
}

impl Theme {
    pub fn paper() -> Self {
        Self {
            canvas: Rgb::WHITE,
            axis: Color::Rgb(96, 96, 96),
            text_primary: Color::Black,
            text_secondary: Color::Rgb(64, 64, 64),
            muted: Color::Rgb(150, 150, 150),
            invert_ink: false,
        }
    }

    pub fn dark() -> Self {
        Self {
            // deep charcoal
            canvas: Rgb(18, 18, 20),
            axis: Color::Rgb(100, 149, 237),
            text_primary: Color::White,
            text_secondary: Color::Rgb(170, 170, 170),
            muted: Color::Rgb(100, 100, 110),
            invert_ink: true,
        }
    }

    pub fn background(&self) -> Color {
        let Rgb(r, g, b) = self.canvas;
        Color::Rgb(r, g, b)
    }

    /// Terminal color of a mark drawn with `alpha` over the canvas.
    pub fn mark_color(&self, color: Rgb, alpha: f64) -> Color {
        let color = if self.invert_ink && color == Rgb::BLACK {
            Rgb::WHITE
        } else {
            color
        };
        let alpha = alpha.clamp(0.0, 1.0);
        let mix = |fg: u8, bg: u8| -> u8 {
            (fg as f64 * alpha + bg as f64 * (1.0 - alpha)).round() as u8
        };
        let Rgb(r, g, b) = color;
        let Rgb(br, bg, bb) = self.canvas;
        Color::Rgb(mix(r, br), mix(g, bg), mix(b, bb))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_paper() {
        let theme = Theme::default();
        assert_eq!(theme.canvas, Rgb::WHITE);
        assert_eq!(theme.background(), Color::Rgb(255, 255, 255));
    }

    #[test]
    fn test_opaque_mark_keeps_color() {
        let theme = Theme::paper();
        assert_eq!(theme.mark_color(Rgb::FORECAST, 1.0), Color::Rgb(0x00, 0x72, 0xB2));
    }

    #[test]
    fn test_transparent_mark_fades_to_canvas() {
        let theme = Theme::paper();
        assert_eq!(theme.mark_color(Rgb::BLACK, 0.0), Color::Rgb(255, 255, 255));
        assert_eq!(theme.mark_color(Rgb::BLACK, 0.5), Color::Rgb(128, 128, 128));
    }

    #[test]
    fn test_dark_theme_inverts_black_ink() {
        let theme = Theme::dark();
        assert_eq!(theme.mark_color(Rgb::BLACK, 1.0), Color::Rgb(255, 255, 255));
        assert_eq!(theme.mark_color(Rgb::BLUE, 1.0), Color::Rgb(0, 0, 255));
    }
}

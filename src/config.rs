use crate::color::Color;
use crate::resources::{FontStyle, FontWeight};
use std::time::Duration;

/// Host-wide tunables.
///
/// Use `UiConfig::default()` and override individual fields as needed.
#[derive(Debug, Clone)]
pub struct UiConfig {
    /// The DPI that corresponds to a scale factor of 1.
    pub reference_dpi: f64,

    /// Width of the attached vertical scrollbar, before DPI scaling.
    pub scrollbar_width: f64,

    /// Font used by controls that don’t set their own.
    pub default_font: String,
    pub default_font_size: f64,
    pub default_font_weight: FontWeight,
    pub default_font_style: FontStyle,

    /// How long a dock region must be hovered before it counts as hovering.
    pub hover_threshold: Duration,

    /// Interval of the dock hover ticker.
    pub hover_tick: Duration,

    /// Fill color of the dock preview overlay.
    pub dock_preview_color: Color,
}

impl Default for UiConfig {
    fn default() -> Self {
        UiConfig {
            reference_dpi: 96.,
            scrollbar_width: 15.,
            default_font: "Segoe UI".into(),
            default_font_size: 16.,
            default_font_weight: FontWeight::Normal,
            default_font_style: FontStyle::Normal,
            hover_threshold: Duration::from_millis(150),
            hover_tick: Duration::from_millis(100),
            dock_preview_color: Color::rgba(0., 1., 0., 0.5),
        }
    }
}

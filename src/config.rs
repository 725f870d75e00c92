use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::theme::Theme;

/// Fixed canvas height; the scale-band calibration in `layout::scale`
/// assumes this value.
pub const CANVAS_HEIGHT: f32 = 2160.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Horizontal pixels between consecutive year gridlines.
    pub distance_between_years: f32,
    /// The canvas never shrinks below this, however few years the corpus spans.
    pub min_canvas_width: f32,
    /// Extra empty years appended after the last document.
    pub trailing_years: u32,
    /// Overrides the corpus-derived first year when set.
    pub first_year: Option<i32>,
    /// Reserved node id whose click clears the selection.
    pub backdrop_node_id: String,
    /// Opacity applied to unselected nodes.
    pub dimmed_opacity: f32,
    /// Two documents closer than this (in canvas units, per axis) collapse
    /// into one group node.
    pub cluster_tolerance: f32,
    pub node_width: f32,
    pub node_height: f32,
    /// Radius of the badge ring fanned around a group node.
    pub group_badge_radius: f32,
    pub max_label_width_chars: usize,
    pub label_line_height: f32,
    /// Skip font queries and size labels from an average glyph width.
    pub fast_text_metrics: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            distance_between_years: 400.0,
            min_canvas_width: 1600.0,
            trailing_years: 1,
            first_year: None,
            backdrop_node_id: "backdrop".to_string(),
            dimmed_opacity: 0.4,
            cluster_tolerance: 0.5,
            node_width: 120.0,
            node_height: 56.0,
            group_badge_radius: 46.0,
            max_label_width_chars: 18,
            label_line_height: 1.25,
            fast_text_metrics: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    pub width: f32,
    pub height: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1600.0,
            height: 900.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub render: RenderConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: Theme::default_light(),
            layout: LayoutConfig::default(),
            render: RenderConfig::default(),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    layout: Option<LayoutOverrides>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    font_size: Option<f32>,
    background: Option<String>,
    node_fill: Option<String>,
    node_border: Option<String>,
    neutral_edge_color: Option<String>,
    direct_consequence_color: Option<String>,
    collateral_consequence_color: Option<String>,
    projection_color: Option<String>,
    update_color: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct LayoutOverrides {
    distance_between_years: Option<f32>,
    min_canvas_width: Option<f32>,
    first_year: Option<i32>,
    dimmed_opacity: Option<f32>,
    fast_text_metrics: Option<bool>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let Some(path) = path else {
        return Ok(config);
    };

    let contents = std::fs::read_to_string(path)?;
    let parsed: ConfigFile = serde_json::from_str(&contents)
        .or_else(|_| json5::from_str(&contents))?;

    if let Some(theme_name) = parsed.theme.as_deref() {
        if theme_name == "slate" || theme_name == "dark" {
            config.theme = Theme::slate();
        } else if theme_name == "light" || theme_name == "default" {
            config.theme = Theme::default_light();
        }
    }

    if let Some(vars) = parsed.theme_variables {
        if let Some(v) = vars.font_family {
            config.theme.font_family = v;
        }
        if let Some(v) = vars.font_size {
            config.theme.font_size = v;
        }
        if let Some(v) = vars.background {
            config.theme.background = v;
        }
        if let Some(v) = vars.node_fill {
            config.theme.node_fill = v;
        }
        if let Some(v) = vars.node_border {
            config.theme.node_border = v;
        }
        if let Some(v) = vars.neutral_edge_color {
            config.theme.neutral_edge_color = v;
        }
        if let Some(v) = vars.direct_consequence_color {
            config.theme.direct_consequence_color = v;
        }
        if let Some(v) = vars.collateral_consequence_color {
            config.theme.collateral_consequence_color = v;
        }
        if let Some(v) = vars.projection_color {
            config.theme.projection_color = v;
        }
        if let Some(v) = vars.update_color {
            config.theme.update_color = v;
        }
    }

    if let Some(layout) = parsed.layout {
        if let Some(v) = layout.distance_between_years {
            config.layout.distance_between_years = v;
        }
        if let Some(v) = layout.min_canvas_width {
            config.layout.min_canvas_width = v;
        }
        if let Some(v) = layout.first_year {
            config.layout.first_year = Some(v);
        }
        if let Some(v) = layout.dimmed_opacity {
            config.layout.dimmed_opacity = v;
        }
        if let Some(v) = layout.fast_text_metrics {
            config.layout.fast_text_metrics = v;
        }
    }

    Ok(config)
}

use serde::{Deserialize, Serialize};

use crate::ir::ConnectionType;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f32,
    pub background: String,
    pub node_fill: String,
    pub node_border: String,
    pub node_text_color: String,
    pub band_label_color: String,
    pub grid_color: String,
    pub line_color: String,
    /// Stroke used for every edge while its endpoints are unselected.
    pub neutral_edge_color: String,
    pub direct_consequence_color: String,
    pub collateral_consequence_color: String,
    pub projection_color: String,
    pub update_color: String,
    pub group_badge_fill: String,
}

impl Theme {
    pub fn default_light() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 13.0,
            background: "#FFFFFF".to_string(),
            node_fill: "#F8FAFF".to_string(),
            node_border: "#C7D2E5".to_string(),
            node_text_color: "#1C2430".to_string(),
            band_label_color: "#7A8AA6".to_string(),
            grid_color: "#EEF2F8".to_string(),
            line_color: "#333333".to_string(),
            neutral_edge_color: "#B0B7C3".to_string(),
            direct_consequence_color: "#e15759".to_string(),
            collateral_consequence_color: "#59a14f".to_string(),
            projection_color: "#4e79a7".to_string(),
            update_color: "#f28e2c".to_string(),
            group_badge_fill: "#ECECFF".to_string(),
        }
    }

    pub fn slate() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 13.0,
            background: "#1C2430".to_string(),
            node_fill: "#2A3444".to_string(),
            node_border: "#46546B".to_string(),
            node_text_color: "#E8EDF5".to_string(),
            band_label_color: "#8E9DB8".to_string(),
            grid_color: "#27303E".to_string(),
            line_color: "#D5DCE8".to_string(),
            neutral_edge_color: "#5A677D".to_string(),
            direct_consequence_color: "#ff7b7d".to_string(),
            collateral_consequence_color: "#7cc96f".to_string(),
            projection_color: "#76a3d4".to_string(),
            update_color: "#ffab57".to_string(),
            group_badge_fill: "#3A4660".to_string(),
        }
    }

    /// Color assigned to one connection type when its edge is selected.
    pub fn connection_color(&self, kind: ConnectionType) -> &str {
        match kind {
            ConnectionType::DirectConsequence => &self.direct_consequence_color,
            ConnectionType::CollateralConsequence => &self.collateral_consequence_color,
            ConnectionType::Projection => &self.projection_color,
            ConnectionType::Update => &self.update_color,
        }
    }
}

use std::f32::consts::TAU;

use crate::ir::ConnectionType;
use crate::theme::Theme;

use super::GraphEdge;

/// Dash unit used when an edge carries several connection types: each type
/// gets one 15-unit dash, offset so the strokes interleave.
const DASH_UNIT: f32 = 15.0;

/// One drawable stroke of an edge. An edge with several connection types is
/// rendered as overlapping dashed strokes; the arrowhead rides only on the
/// last stroke so it is never painted over.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeStroke {
    pub color: String,
    pub dasharray: Option<String>,
    pub dashoffset: f32,
    pub arrow: bool,
}

/// Filters the edge set down to what the current selection makes visible:
/// exactly the edges touching the clicked node or the hovered node. With
/// neither present, nothing is drawn.
pub fn visible_edges<'a>(
    edges: &'a [GraphEdge],
    clicked: Option<&str>,
    hovered: Option<&str>,
) -> Vec<&'a GraphEdge> {
    if clicked.is_none() && hovered.is_none() {
        return Vec::new();
    }
    edges
        .iter()
        .filter(|edge| {
            touches(edge, clicked) || touches(edge, hovered)
        })
        .collect()
}

fn touches(edge: &GraphEdge, node: Option<&str>) -> bool {
    match node {
        Some(id) => edge.source == id || edge.target == id,
        None => false,
    }
}

/// Opacity for a node given the selection. The clicked node is drawn at
/// full strength, as is a node while the pointer rests on it; everything
/// else is dimmed.
pub fn node_opacity(
    node_id: &str,
    clicked: Option<&str>,
    hovered: Option<&str>,
    dimmed_opacity: f32,
) -> f32 {
    if clicked == Some(node_id) || hovered == Some(node_id) {
        1.0
    } else {
        dimmed_opacity
    }
}

/// Style descriptors for one edge. Unselected edges collapse to a single
/// neutral stroke regardless of their connection types; a selected edge is
/// drawn per type: one solid stroke, or N interleaved dashed strokes.
pub fn edge_strokes(
    connection_types: &[ConnectionType],
    selected: bool,
    theme: &Theme,
) -> Vec<EdgeStroke> {
    if !selected {
        return vec![EdgeStroke {
            color: theme.neutral_edge_color.clone(),
            dasharray: None,
            dashoffset: 0.0,
            arrow: true,
        }];
    }
    match connection_types {
        [] => vec![EdgeStroke {
            color: theme.line_color.clone(),
            dasharray: None,
            dashoffset: 0.0,
            arrow: true,
        }],
        [only] => vec![EdgeStroke {
            color: theme.connection_color(*only).to_string(),
            dasharray: None,
            dashoffset: 0.0,
            arrow: true,
        }],
        many => {
            let n = many.len();
            let gap = DASH_UNIT * (n - 1) as f32;
            many.iter()
                .enumerate()
                .map(|(i, kind)| EdgeStroke {
                    color: theme.connection_color(*kind).to_string(),
                    dasharray: Some(format!("{DASH_UNIT} {gap}")),
                    dashoffset: i as f32 * DASH_UNIT,
                    arrow: i == n - 1,
                })
                .collect()
        }
    }
}

/// `n` points evenly spaced on the circle of radius `r` around `(cx, cy)`,
/// starting at angle 0 and winding counter-clockwise. Used to fan out the
/// member badges of a group node.
pub fn equidistant_points(cx: f32, cy: f32, r: f32, n: usize) -> Vec<(f32, f32)> {
    (0..n)
        .map(|i| {
            let angle = TAU * i as f32 / n as f32;
            (cx + r * angle.cos(), cy + r * angle.sin())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::ConnectionType;

    fn edge(source: &str, target: &str) -> GraphEdge {
        GraphEdge {
            source: source.to_string(),
            target: target.to_string(),
            connection_types: vec![ConnectionType::DirectConsequence],
        }
    }

    #[test]
    fn no_selection_hides_everything() {
        let edges = vec![edge("a", "b"), edge("b", "c")];
        assert!(visible_edges(&edges, None, None).is_empty());
    }

    #[test]
    fn clicked_node_shows_its_edges_only() {
        let edges = vec![edge("a", "b"), edge("b", "c"), edge("c", "d")];
        let visible = visible_edges(&edges, Some("b"), None);
        assert_eq!(visible.len(), 2);
        assert!(visible.iter().all(|e| e.source == "b" || e.target == "b"));
    }

    #[test]
    fn hover_adds_to_clicked() {
        let edges = vec![edge("a", "b"), edge("c", "d"), edge("e", "f")];
        let visible = visible_edges(&edges, Some("a"), Some("d"));
        assert_eq!(visible.len(), 2);
    }

    #[test]
    fn hover_alone_shows_edges() {
        let edges = vec![edge("a", "b"), edge("c", "d")];
        let visible = visible_edges(&edges, None, Some("c"));
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].source, "c");
    }

    #[test]
    fn opacity_follows_selection() {
        assert_eq!(node_opacity("n1", Some("n1"), None, 0.4), 1.0);
        assert_eq!(node_opacity("n1", Some("n2"), None, 0.4), 0.4);
        assert_eq!(node_opacity("n1", None, None, 0.4), 0.4);
    }

    #[test]
    fn hover_lifts_opacity_while_pointer_rests() {
        assert_eq!(node_opacity("n1", None, Some("n1"), 0.4), 1.0);
        // Hovering one node leaves the others dimmed.
        assert_eq!(node_opacity("n2", None, Some("n1"), 0.4), 0.4);
        // Leaving the node falls back to the selected/unselected opacity.
        assert_eq!(node_opacity("n1", None, None, 0.4), 0.4);
        assert_eq!(node_opacity("n1", Some("n1"), None, 0.4), 1.0);
    }

    #[test]
    fn unselected_edge_is_single_neutral_stroke() {
        let theme = Theme::default_light();
        let strokes = edge_strokes(
            &[
                ConnectionType::DirectConsequence,
                ConnectionType::Update,
            ],
            false,
            &theme,
        );
        assert_eq!(strokes.len(), 1);
        assert_eq!(strokes[0].color, theme.neutral_edge_color);
        assert!(strokes[0].dasharray.is_none());
    }

    #[test]
    fn single_type_is_solid_and_colored() {
        let theme = Theme::default_light();
        let strokes = edge_strokes(&[ConnectionType::Projection], true, &theme);
        assert_eq!(strokes.len(), 1);
        assert_eq!(strokes[0].color, theme.projection_color);
        assert!(strokes[0].dasharray.is_none());
        assert!(strokes[0].arrow);
    }

    #[test]
    fn multi_type_interleaves_dashes() {
        let theme = Theme::default_light();
        let kinds = [
            ConnectionType::DirectConsequence,
            ConnectionType::CollateralConsequence,
            ConnectionType::Update,
        ];
        let strokes = edge_strokes(&kinds, true, &theme);
        assert_eq!(strokes.len(), 3);
        for (i, stroke) in strokes.iter().enumerate() {
            assert_eq!(stroke.dasharray.as_deref(), Some("15 30"));
            assert_eq!(stroke.dashoffset, i as f32 * 15.0);
            assert_eq!(stroke.arrow, i == 2);
        }
        assert_eq!(strokes[0].color, theme.direct_consequence_color);
        assert_eq!(strokes[1].color, theme.collateral_consequence_color);
        assert_eq!(strokes[2].color, theme.update_color);
    }

    #[test]
    fn equidistant_points_lie_on_circle() {
        let points = equidistant_points(0.0, 0.0, 10.0, 4);
        assert_eq!(points.len(), 4);
        for (x, y) in &points {
            let dist = (x * x + y * y).sqrt();
            assert!((dist - 10.0).abs() < 1e-4);
        }
        // Consecutive points are a quarter turn apart, order preserving.
        let angles: Vec<f32> = points.iter().map(|(x, y)| y.atan2(*x)).collect();
        let quarter = TAU / 4.0;
        for pair in angles.windows(2) {
            let mut delta = pair[1] - pair[0];
            if delta < 0.0 {
                delta += TAU;
            }
            assert!((delta - quarter).abs() < 1e-4);
        }
    }

    #[test]
    fn equidistant_single_point_sits_right_of_center() {
        let points = equidistant_points(5.0, 7.0, 3.0, 1);
        assert_eq!(points, vec![(8.0, 7.0)]);
    }

    #[test]
    fn equidistant_zero_is_empty() {
        assert!(equidistant_points(0.0, 0.0, 1.0, 0).is_empty());
    }
}

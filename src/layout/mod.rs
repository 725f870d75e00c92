use std::collections::BTreeMap;

use crate::config::{CANVAS_HEIGHT, LayoutConfig};
use crate::ir::{ConnectionType, Corpus, InteractionState, PlacementError};
use crate::theme::Theme;

mod scale;
mod text;
mod time;
mod visibility;

pub use scale::{
    BLUEPRINTS_Y, CONCEPT_Y, PLAN_BAND_MAX, PLAN_BAND_MIN, TEXT_Y, scale_to_y,
};
pub use time::{canvas_width, date_to_x};
pub use visibility::{EdgeStroke, edge_strokes, equidistant_points, node_opacity, visible_edges};

use text::measure_label;

/// A measured, possibly wrapped label.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    pub lines: Vec<String>,
    pub width: f32,
    pub height: f32,
}

/// A node-to-node connection carrying every connection type linking the
/// two underlying document sets.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
    pub connection_types: Vec<ConnectionType>,
}

/// One placed diagram node. `members` holds the ids of every document
/// sharing this position; `shown_member` indexes the one currently labeled.
#[derive(Debug, Clone)]
pub struct NodeLayout {
    /// A singleton node reuses its document id; a group node joins its
    /// member ids with `+`, escaping any `+` or `\` inside them so distinct
    /// member sets never produce the same id.
    pub id: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub members: Vec<String>,
    pub shown_member: usize,
    pub is_group: bool,
    pub opacity: f32,
    pub label: TextBlock,
    pub doc_type: String,
    /// Badge ring anchors for the group sub-selector; empty on singletons.
    pub badges: Vec<(f32, f32)>,
}

/// A drawable edge: endpoint centers plus its stroke descriptors.
#[derive(Debug, Clone)]
pub struct EdgeLayout {
    pub source: String,
    pub target: String,
    pub points: Vec<(f32, f32)>,
    pub strokes: Vec<EdgeStroke>,
}

#[derive(Debug, Clone)]
pub struct Layout {
    pub nodes: BTreeMap<String, NodeLayout>,
    /// Every node-to-node connection, before visibility filtering.
    pub graph_edges: Vec<GraphEdge>,
    /// The subset made visible by the interaction state, styled.
    pub edges: Vec<EdgeLayout>,
    pub first_year: i32,
    pub year_count: u32,
    pub width: f32,
    pub height: f32,
}

struct Cluster {
    x: f32,
    y: f32,
    // Indices into the sorted document list.
    members: Vec<usize>,
}

/// Places every document, clusters shared positions into group nodes,
/// resolves links to node edges, and applies the interaction state.
pub fn compute_layout(
    corpus: &Corpus,
    interaction: &InteractionState,
    theme: &Theme,
    config: &LayoutConfig,
) -> Result<Layout, PlacementError> {
    let first_year = config
        .first_year
        .or_else(|| corpus.first_year())
        .unwrap_or(2000);
    let last_year = corpus.last_year().unwrap_or(first_year);
    let year_count = (last_year - first_year).max(0) as u32 + 1 + config.trailing_years;

    // Deterministic placement order regardless of input order.
    let mut documents: Vec<_> = corpus.documents.iter().collect();
    documents.sort_by(|a, b| a.id.cmp(&b.id));

    let mut clusters: Vec<Cluster> = Vec::new();
    for (idx, doc) in documents.iter().enumerate() {
        doc.validate()?;
        let (x, y) = match corpus.overrides.get(&doc.id) {
            Some(&saved) => saved,
            None => {
                let x = date_to_x(
                    first_year,
                    doc.date.year,
                    doc.date.month,
                    config.distance_between_years,
                );
                let y = scale_to_y(doc.scale, doc.plan_number)?;
                (x, y)
            }
        };
        match clusters.iter_mut().find(|c| {
            (c.x - x).abs() <= config.cluster_tolerance
                && (c.y - y).abs() <= config.cluster_tolerance
        }) {
            Some(cluster) => cluster.members.push(idx),
            None => clusters.push(Cluster {
                x,
                y,
                members: vec![idx],
            }),
        }
    }

    let mut nodes = BTreeMap::new();
    let mut doc_to_node: BTreeMap<&str, String> = BTreeMap::new();
    let clicked = interaction.clicked.as_deref();
    let hovered = interaction.hovered.as_deref();

    for cluster in &clusters {
        let member_ids: Vec<String> = cluster
            .members
            .iter()
            .map(|&i| documents[i].id.clone())
            .collect();
        let is_group = member_ids.len() > 1;
        let node_id = if is_group {
            group_node_id(&member_ids)
        } else {
            member_ids[0].clone()
        };
        for &i in &cluster.members {
            doc_to_node.insert(documents[i].id.as_str(), node_id.clone());
        }

        let shown_member = interaction
            .selected_member
            .get(&node_id)
            .copied()
            .unwrap_or(0)
            .min(member_ids.len() - 1);
        let shown_doc = documents[cluster.members[shown_member]];

        let badges = if is_group {
            equidistant_points(cluster.x, cluster.y, config.group_badge_radius, member_ids.len())
        } else {
            Vec::new()
        };

        nodes.insert(
            node_id.clone(),
            NodeLayout {
                id: node_id.clone(),
                x: cluster.x,
                y: cluster.y,
                width: config.node_width,
                height: config.node_height,
                members: member_ids,
                shown_member,
                is_group,
                opacity: node_opacity(&node_id, clicked, hovered, config.dimmed_opacity),
                label: measure_label(&shown_doc.title, theme, config),
                doc_type: shown_doc.doc_type.clone(),
                badges,
            },
        );
    }

    let graph_edges = resolve_edges(corpus, &doc_to_node);

    let edges = visible_edges(&graph_edges, clicked, hovered)
        .into_iter()
        .map(|edge| {
            let selected =
                clicked.is_some_and(|id| edge.source == id || edge.target == id);
            let from = &nodes[&edge.source];
            let to = &nodes[&edge.target];
            EdgeLayout {
                source: edge.source.clone(),
                target: edge.target.clone(),
                points: vec![(from.x, from.y), (to.x, to.y)],
                strokes: edge_strokes(&edge.connection_types, selected, theme),
            }
        })
        .collect();

    Ok(Layout {
        nodes,
        graph_edges,
        edges,
        first_year,
        year_count,
        width: canvas_width(year_count, config.distance_between_years, config.min_canvas_width),
        height: CANVAS_HEIGHT,
    })
}

/// Stable id for a cluster. Document ids are opaque and may themselves
/// contain `+`, so each member is escaped before joining; ids without
/// either special character pass through unchanged.
fn group_node_id(member_ids: &[String]) -> String {
    member_ids
        .iter()
        .map(|id| id.replace('\\', "\\\\").replace('+', "\\+"))
        .collect::<Vec<_>>()
        .join("+")
}

/// Collapses document links into one edge per ordered node pair, merging
/// connection types. Links inside a single cluster have no on-canvas
/// representation and are dropped.
fn resolve_edges(corpus: &Corpus, doc_to_node: &BTreeMap<&str, String>) -> Vec<GraphEdge> {
    let mut merged: BTreeMap<(String, String), Vec<ConnectionType>> = BTreeMap::new();
    for link in &corpus.links {
        let (Some(source), Some(target)) = (
            doc_to_node.get(link.from.as_str()),
            doc_to_node.get(link.to.as_str()),
        ) else {
            continue;
        };
        if source == target {
            continue;
        }
        merged
            .entry((source.clone(), target.clone()))
            .or_default()
            .push(link.connection_type);
    }
    merged
        .into_iter()
        .map(|((source, target), mut types)| {
            types.sort();
            types.dedup();
            GraphEdge {
                source,
                target,
                connection_types: types,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{DocumentRef, Link, PartialDate, ScaleBand};

    fn doc(id: &str, scale: ScaleBand, plan_number: Option<u32>, year: i32) -> DocumentRef {
        DocumentRef {
            id: id.to_string(),
            title: format!("Document {id}"),
            doc_type: "prescriptive".to_string(),
            scale,
            plan_number,
            date: PartialDate::year_only(year),
        }
    }

    fn fast_config() -> LayoutConfig {
        LayoutConfig {
            fast_text_metrics: true,
            ..LayoutConfig::default()
        }
    }

    #[test]
    fn three_scales_stack_in_order() {
        let corpus = Corpus {
            documents: vec![
                doc("a", ScaleBand::Text, None, 2005),
                doc("b", ScaleBand::Plan, Some(5000), 2005),
                doc("c", ScaleBand::Blueprints, None, 2005),
            ],
            ..Corpus::default()
        };
        let layout = compute_layout(
            &corpus,
            &InteractionState::new(),
            &Theme::default_light(),
            &fast_config(),
        )
        .unwrap();
        let ya = layout.nodes["a"].y;
        let yb = layout.nodes["b"].y;
        let yc = layout.nodes["c"].y;
        assert_eq!((ya, yb, yc), (165.0, 1280.0, 1870.0));
    }

    #[test]
    fn same_position_documents_form_a_group() {
        let corpus = Corpus {
            documents: vec![
                doc("a", ScaleBand::Concept, None, 2007),
                doc("b", ScaleBand::Concept, None, 2007),
            ],
            ..Corpus::default()
        };
        let layout = compute_layout(
            &corpus,
            &InteractionState::new(),
            &Theme::default_light(),
            &fast_config(),
        )
        .unwrap();
        assert_eq!(layout.nodes.len(), 1);
        let node = &layout.nodes["a+b"];
        assert!(node.is_group);
        assert_eq!(node.members, vec!["a", "b"]);
        assert_eq!(node.badges.len(), 2);
    }

    #[test]
    fn group_ids_do_not_collide_with_plus_in_document_ids() {
        // A document literally named "a+b" next to "c" must not produce the
        // same node id as the three documents "a", "b", "c".
        let corpus_pair = Corpus {
            documents: vec![
                doc("a+b", ScaleBand::Concept, None, 2007),
                doc("c", ScaleBand::Concept, None, 2007),
            ],
            ..Corpus::default()
        };
        let corpus_trio = Corpus {
            documents: vec![
                doc("a", ScaleBand::Concept, None, 2007),
                doc("b", ScaleBand::Concept, None, 2007),
                doc("c", ScaleBand::Concept, None, 2007),
            ],
            ..Corpus::default()
        };
        let theme = Theme::default_light();
        let config = fast_config();
        let pair = compute_layout(&corpus_pair, &InteractionState::new(), &theme, &config).unwrap();
        let trio = compute_layout(&corpus_trio, &InteractionState::new(), &theme, &config).unwrap();
        let pair_id = pair.nodes.keys().next().unwrap();
        let trio_id = trio.nodes.keys().next().unwrap();
        assert_eq!(pair_id, "a\\+b+c");
        assert_eq!(trio_id, "a+b+c");
        assert_ne!(pair_id, trio_id);
    }

    #[test]
    fn selected_member_picks_label() {
        let corpus = Corpus {
            documents: vec![
                doc("a", ScaleBand::Concept, None, 2007),
                doc("b", ScaleBand::Concept, None, 2007),
            ],
            ..Corpus::default()
        };
        let mut interaction = InteractionState::new();
        interaction.select_member("a+b", 1);
        let layout = compute_layout(
            &corpus,
            &interaction,
            &Theme::default_light(),
            &fast_config(),
        )
        .unwrap();
        let node = &layout.nodes["a+b"];
        assert_eq!(node.shown_member, 1);
        assert_eq!(node.label.lines.join(" "), "Document b");
    }

    #[test]
    fn out_of_range_member_index_clamps() {
        let corpus = Corpus {
            documents: vec![
                doc("a", ScaleBand::Concept, None, 2007),
                doc("b", ScaleBand::Concept, None, 2007),
            ],
            ..Corpus::default()
        };
        let mut interaction = InteractionState::new();
        interaction.select_member("a+b", 9);
        let layout = compute_layout(
            &corpus,
            &interaction,
            &Theme::default_light(),
            &fast_config(),
        )
        .unwrap();
        assert_eq!(layout.nodes["a+b"].shown_member, 1);
    }

    #[test]
    fn override_position_supersedes_computed() {
        let mut corpus = Corpus {
            documents: vec![doc("a", ScaleBand::Text, None, 2005)],
            ..Corpus::default()
        };
        corpus.overrides.insert("a".to_string(), (1234.0, 777.0));
        let layout = compute_layout(
            &corpus,
            &InteractionState::new(),
            &Theme::default_light(),
            &fast_config(),
        )
        .unwrap();
        let node = &layout.nodes["a"];
        assert_eq!((node.x, node.y), (1234.0, 777.0));
    }

    #[test]
    fn edges_hidden_without_selection_but_kept_in_graph() {
        let corpus = Corpus {
            documents: vec![
                doc("a", ScaleBand::Text, None, 2005),
                doc("b", ScaleBand::Concept, None, 2008),
            ],
            links: vec![Link {
                from: "a".to_string(),
                to: "b".to_string(),
                connection_type: ConnectionType::Update,
            }],
            ..Corpus::default()
        };
        let layout = compute_layout(
            &corpus,
            &InteractionState::new(),
            &Theme::default_light(),
            &fast_config(),
        )
        .unwrap();
        assert_eq!(layout.graph_edges.len(), 1);
        assert!(layout.edges.is_empty());
    }

    #[test]
    fn clicking_a_node_reveals_and_colors_its_edges() {
        let corpus = Corpus {
            documents: vec![
                doc("a", ScaleBand::Text, None, 2005),
                doc("b", ScaleBand::Concept, None, 2008),
                doc("c", ScaleBand::Blueprints, None, 2010),
            ],
            links: vec![
                Link {
                    from: "a".to_string(),
                    to: "b".to_string(),
                    connection_type: ConnectionType::DirectConsequence,
                },
                Link {
                    from: "b".to_string(),
                    to: "c".to_string(),
                    connection_type: ConnectionType::Projection,
                },
            ],
            ..Corpus::default()
        };
        let mut interaction = InteractionState::new();
        interaction.click("a", "backdrop");
        let theme = Theme::default_light();
        let layout = compute_layout(&corpus, &interaction, &theme, &fast_config()).unwrap();
        assert_eq!(layout.edges.len(), 1);
        assert_eq!(layout.edges[0].strokes[0].color, theme.direct_consequence_color);
        assert_eq!(layout.nodes["a"].opacity, 1.0);
        assert_eq!(layout.nodes["b"].opacity, 0.4);
    }

    #[test]
    fn duplicate_links_merge_connection_types() {
        let corpus = Corpus {
            documents: vec![
                doc("a", ScaleBand::Text, None, 2005),
                doc("b", ScaleBand::Concept, None, 2008),
            ],
            links: vec![
                Link {
                    from: "a".to_string(),
                    to: "b".to_string(),
                    connection_type: ConnectionType::Update,
                },
                Link {
                    from: "a".to_string(),
                    to: "b".to_string(),
                    connection_type: ConnectionType::DirectConsequence,
                },
                Link {
                    from: "a".to_string(),
                    to: "b".to_string(),
                    connection_type: ConnectionType::Update,
                },
            ],
            ..Corpus::default()
        };
        let layout = compute_layout(
            &corpus,
            &InteractionState::new(),
            &Theme::default_light(),
            &fast_config(),
        )
        .unwrap();
        assert_eq!(layout.graph_edges.len(), 1);
        assert_eq!(
            layout.graph_edges[0].connection_types,
            vec![ConnectionType::DirectConsequence, ConnectionType::Update]
        );
    }

    #[test]
    fn intra_group_link_is_dropped() {
        let corpus = Corpus {
            documents: vec![
                doc("a", ScaleBand::Concept, None, 2007),
                doc("b", ScaleBand::Concept, None, 2007),
            ],
            links: vec![Link {
                from: "a".to_string(),
                to: "b".to_string(),
                connection_type: ConnectionType::Update,
            }],
            ..Corpus::default()
        };
        let layout = compute_layout(
            &corpus,
            &InteractionState::new(),
            &Theme::default_light(),
            &fast_config(),
        )
        .unwrap();
        assert!(layout.graph_edges.is_empty());
    }

    #[test]
    fn canvas_spans_the_year_range() {
        let config = fast_config();
        let corpus = Corpus {
            documents: vec![
                doc("a", ScaleBand::Text, None, 2001),
                doc("b", ScaleBand::Text, None, 2019),
            ],
            ..Corpus::default()
        };
        let layout = compute_layout(
            &corpus,
            &InteractionState::new(),
            &Theme::default_light(),
            &config,
        )
        .unwrap();
        assert_eq!(layout.first_year, 2001);
        assert_eq!(layout.year_count, 20);
        assert_eq!(layout.width, 20.0 * config.distance_between_years);
        assert_eq!(layout.height, 2160.0);
    }

    #[test]
    fn empty_corpus_still_yields_a_canvas() {
        let layout = compute_layout(
            &Corpus::new(),
            &InteractionState::new(),
            &Theme::default_light(),
            &fast_config(),
        )
        .unwrap();
        assert!(layout.nodes.is_empty());
        assert_eq!(layout.width, 1600.0);
    }

    #[test]
    fn invalid_document_fails_fast() {
        let corpus = Corpus {
            documents: vec![doc("a", ScaleBand::Plan, None, 2005)],
            ..Corpus::default()
        };
        let err = compute_layout(
            &corpus,
            &InteractionState::new(),
            &Theme::default_light(),
            &fast_config(),
        )
        .unwrap_err();
        assert!(matches!(err, PlacementError::InvalidPlanNumber { .. }));
    }
}

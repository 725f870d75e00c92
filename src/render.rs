use std::collections::BTreeSet;
use std::path::Path;

use anyhow::Result;

use crate::config::LayoutConfig;
#[cfg(feature = "png")]
use crate::config::RenderConfig;
use crate::layout::{self, Layout, NodeLayout, TextBlock};
use crate::theme::Theme;

pub fn render_svg(layout: &Layout, theme: &Theme, config: &LayoutConfig) -> String {
    let mut svg = String::new();
    let width = layout.width.max(200.0);
    let height = layout.height.max(200.0);

    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">",
    ));
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        theme.background
    ));

    // One arrow marker per stroke color in use.
    let mut colors: BTreeSet<&str> = BTreeSet::new();
    for edge in &layout.edges {
        for stroke in &edge.strokes {
            if stroke.arrow {
                colors.insert(stroke.color.as_str());
            }
        }
    }
    svg.push_str("<defs>");
    for color in &colors {
        svg.push_str(&format!(
            "<marker id=\"arrow-{}\" viewBox=\"0 0 10 10\" refX=\"10\" refY=\"5\" markerWidth=\"6\" markerHeight=\"6\" orient=\"auto-start-reverse\"><path d=\"M 0 0 L 10 5 L 0 10 z\" fill=\"{color}\"/></marker>",
            marker_id(color),
        ));
    }
    svg.push_str("</defs>");

    render_year_grid(&mut svg, layout, theme, config);
    render_band_guides(&mut svg, layout, theme);

    for edge in &layout.edges {
        let d = points_to_path(&edge.points);
        for stroke in &edge.strokes {
            let dash = stroke
                .dasharray
                .as_deref()
                .map(|v| {
                    format!(
                        " stroke-dasharray=\"{v}\" stroke-dashoffset=\"{}\"",
                        stroke.dashoffset
                    )
                })
                .unwrap_or_default();
            let marker = if stroke.arrow {
                format!(" marker-end=\"url(#arrow-{})\"", marker_id(&stroke.color))
            } else {
                String::new()
            };
            svg.push_str(&format!(
                "<path d=\"{d}\" fill=\"none\" stroke=\"{}\" stroke-width=\"1.8\"{dash}{marker}/>",
                stroke.color,
            ));
        }
    }

    for node in layout.nodes.values() {
        render_node(&mut svg, node, theme, config);
    }

    svg.push_str("</svg>");
    svg
}

fn render_year_grid(svg: &mut String, layout: &Layout, theme: &Theme, config: &LayoutConfig) {
    for i in 0..layout.year_count {
        let x = i as f32 * config.distance_between_years;
        let year = layout.first_year + i as i32;
        svg.push_str(&format!(
            "<line x1=\"{x:.2}\" y1=\"0\" x2=\"{x:.2}\" y2=\"{:.2}\" stroke=\"{}\" stroke-width=\"1\"/>",
            layout.height, theme.grid_color
        ));
        svg.push_str(&format!(
            "<text x=\"{:.2}\" y=\"{:.2}\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">{year}</text>",
            x + 6.0,
            theme.font_size + 6.0,
            theme.font_family,
            theme.font_size,
            theme.band_label_color
        ));
    }
}

fn render_band_guides(svg: &mut String, layout: &Layout, theme: &Theme) {
    let bands = [
        ("Text", layout::TEXT_Y),
        ("Concept", layout::CONCEPT_Y),
        ("Plan", (layout::PLAN_BAND_MIN + layout::PLAN_BAND_MAX) / 2.0),
        ("Blueprints", layout::BLUEPRINTS_Y),
    ];
    for (name, y) in bands {
        svg.push_str(&format!(
            "<line x1=\"0\" y1=\"{y:.2}\" x2=\"{:.2}\" y2=\"{y:.2}\" stroke=\"{}\" stroke-width=\"1\" stroke-dasharray=\"2 6\"/>",
            layout.width, theme.grid_color
        ));
        svg.push_str(&format!(
            "<text x=\"8\" y=\"{:.2}\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">{name}</text>",
            y - 8.0,
            theme.font_family,
            theme.font_size,
            theme.band_label_color
        ));
    }
}

fn render_node(svg: &mut String, node: &NodeLayout, theme: &Theme, config: &LayoutConfig) {
    svg.push_str(&format!("<g opacity=\"{:.2}\">", node.opacity));
    let rect_x = node.x - node.width / 2.0;
    let rect_y = node.y - node.height / 2.0;
    svg.push_str(&format!(
        "<rect x=\"{rect_x:.2}\" y=\"{rect_y:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"10\" ry=\"10\" fill=\"{}\" stroke=\"{}\" stroke-width=\"1.4\"/>",
        node.width, node.height, theme.node_fill, theme.node_border
    ));
    text_block_svg(svg, node.x, node.y, &node.label, theme, config);

    // Group sub-selector: one badge per member, fanned around the node.
    for (index, (bx, by)) in node.badges.iter().enumerate() {
        svg.push_str(&format!(
            "<circle cx=\"{bx:.2}\" cy=\"{by:.2}\" r=\"10\" fill=\"{}\" stroke=\"{}\" stroke-width=\"1\"/>",
            theme.group_badge_fill, theme.node_border
        ));
        svg.push_str(&format!(
            "<text x=\"{bx:.2}\" y=\"{:.2}\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">{}</text>",
            by + theme.font_size * 0.35,
            theme.font_family,
            theme.font_size * 0.8,
            theme.node_text_color,
            index + 1
        ));
    }
    svg.push_str("</g>");
}

fn points_to_path(points: &[(f32, f32)]) -> String {
    if points.is_empty() {
        return String::new();
    }
    let mut d = format!("M {:.2} {:.2}", points[0].0, points[0].1);
    for point in points.iter().skip(1) {
        d.push_str(&format!(" L {:.2} {:.2}", point.0, point.1));
    }
    d
}

fn text_block_svg(
    svg: &mut String,
    x: f32,
    y: f32,
    label: &TextBlock,
    theme: &Theme,
    config: &LayoutConfig,
) {
    let total_height = label.lines.len() as f32 * theme.font_size * config.label_line_height;
    let start_y = y - total_height / 2.0 + theme.font_size;
    svg.push_str(&format!(
        "<text x=\"{x:.2}\" y=\"{start_y:.2}\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">",
        theme.font_family, theme.font_size, theme.node_text_color
    ));
    for (idx, line) in label.lines.iter().enumerate() {
        let dy = if idx == 0 {
            0.0
        } else {
            theme.font_size * config.label_line_height
        };
        svg.push_str(&format!(
            "<tspan x=\"{x:.2}\" dy=\"{dy:.2}\">{}</tspan>",
            escape_xml(line)
        ));
    }
    svg.push_str("</text>");
}

fn marker_id(color: &str) -> String {
    color
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect()
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{svg}");
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, render_cfg: &RenderConfig) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.default_size = usvg::Size::from_wh(render_cfg.width, render_cfg.height)
        .unwrap_or(usvg::Size::from_wh(800.0, 600.0).unwrap());

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

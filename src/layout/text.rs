use crate::config::LayoutConfig;
use crate::text_metrics;
use crate::theme::Theme;

use super::TextBlock;

const AVERAGE_CHAR_FACTOR: f32 = 0.56;

/// Wraps and measures a node label (a document title) into a sized block.
pub(super) fn measure_label(text: &str, theme: &Theme, config: &LayoutConfig) -> TextBlock {
    let font_size = theme.font_size;
    let avg_char = font_size * AVERAGE_CHAR_FACTOR;
    let max_width_px = config.max_label_width_chars.max(1) as f32 * avg_char;

    let mut lines = Vec::new();
    for raw in text.split('\n') {
        lines.extend(wrap_line(
            raw.trim(),
            max_width_px,
            font_size,
            &theme.font_family,
            config.fast_text_metrics,
        ));
    }
    if lines.is_empty() {
        lines.push(String::new());
    }

    let max_width = lines
        .iter()
        .map(|line| text_width(line, font_size, &theme.font_family, config.fast_text_metrics))
        .fold(0.0, f32::max);
    let height = lines.len() as f32 * font_size * config.label_line_height;

    TextBlock {
        lines,
        width: max_width,
        height,
    }
}

pub(super) fn wrap_line(
    line: &str,
    max_width: f32,
    font_size: f32,
    font_family: &str,
    fast_metrics: bool,
) -> Vec<String> {
    if text_width(line, font_size, font_family, fast_metrics) <= max_width {
        return vec![line.to_string()];
    }

    let mut lines = Vec::new();
    let mut current = String::new();
    for word in line.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };
        if text_width(&candidate, font_size, font_family, fast_metrics) > max_width {
            if !current.is_empty() {
                lines.push(current.clone());
                current.clear();
            }
            current.push_str(word);
        } else {
            current = candidate;
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

fn text_width(text: &str, font_size: f32, font_family: &str, fast_metrics: bool) -> f32 {
    let estimate = text.chars().count() as f32 * font_size * AVERAGE_CHAR_FACTOR;
    if fast_metrics {
        return estimate;
    }
    text_metrics::measure_text_width(text, font_size, font_family).unwrap_or(estimate)
}

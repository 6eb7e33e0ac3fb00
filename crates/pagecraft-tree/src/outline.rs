//! Block tree visualization as ASCII tree.

use crate::Block;

/// Settings keys tried, in order, for the one-line summary.
const SUMMARY_KEYS: [&str; 6] = ["text", "title", "label", "heading", "alt", "src"];

/// Format a block tree as ASCII tree lines.
///
/// Root-level blocks start at depth 0. Blocks deeper than `max_depth` are
/// left out.
pub fn format_outline(blocks: &[Block], max_depth: Option<usize>) -> Vec<String> {
    let mut lines = Vec::new();
    for (idx, block) in blocks.iter().enumerate() {
        let is_last = idx == blocks.len() - 1;
        format_node(block, 0, "", is_last, max_depth, &mut lines);
    }
    lines
}

fn format_node(
    block: &Block,
    depth: usize,
    prefix: &str,
    is_last: bool,
    max_depth: Option<usize>,
    lines: &mut Vec<String>,
) {
    if max_depth.is_some_and(|max| depth > max) {
        return;
    }

    let connector = if depth == 0 {
        ""
    } else if is_last {
        "└─ "
    } else {
        "├─ "
    };

    let mut line = format!("{}{}{} [{}/{}]", prefix, connector, block.id.short(), block.kind, block.variant);
    let summary = settings_summary(&block.settings, 40);
    if !summary.is_empty() {
        line.push_str(&format!(" \"{}\"", summary));
    }
    if !block.visible {
        line.push_str(" (hidden)");
    }
    lines.push(line);

    let children = block.children();
    let child_prefix = if depth == 0 {
        String::new()
    } else if is_last {
        format!("{}   ", prefix)
    } else {
        format!("{}│  ", prefix)
    };

    for (i, child) in children.iter().enumerate() {
        let is_last_child = i == children.len() - 1;
        format_node(child, depth + 1, &child_prefix, is_last_child, max_depth, lines);
    }
}

/// First usable string setting, first line only, truncated.
fn settings_summary(settings: &serde_json::Value, max_chars: usize) -> String {
    let Some(text) = SUMMARY_KEYS
        .iter()
        .find_map(|key| settings.get(*key).and_then(|v| v.as_str()))
    else {
        return String::new();
    };

    let trimmed = text.lines().next().unwrap_or("").trim();
    if trimmed.chars().count() <= max_chars {
        trimmed.to_string()
    } else {
        let truncated: String = trimmed.chars().take(max_chars - 3).collect();
        format!("{}...", truncated)
    }
}

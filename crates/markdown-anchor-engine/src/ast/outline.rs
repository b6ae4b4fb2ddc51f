use std::fmt::Write;

use super::{Node, NodeKind};

/// Formats a tree as one node per line, children indented by two spaces.
///
/// ```text
/// root@0..9
///   paragraph@0..9
///     anchor "id"@0..4
///     text " after"@4..9
/// ```
pub fn format_tree(node: &Node) -> String {
    let mut out = String::new();
    write_node(&mut out, node, 0);
    out
}

fn write_node(out: &mut String, node: &Node, indent: usize) {
    let prefix = "  ".repeat(indent);
    let _ = write!(out, "{prefix}{}", node.node_type());

    match &node.kind {
        NodeKind::Heading { depth } => {
            let _ = write!(out, " depth={depth}");
        }
        NodeKind::List {
            ordered, spread, ..
        } => {
            let _ = write!(out, " ordered={ordered} spread={spread}");
        }
        NodeKind::ListItem {
            checked: Some(checked),
            ..
        } => {
            let _ = write!(out, " checked={checked}");
        }
        NodeKind::Text { value }
        | NodeKind::InlineCode { value }
        | NodeKind::Html { value }
        | NodeKind::Code { value, .. } => {
            let _ = write!(out, " {value:?}");
        }
        NodeKind::Link { url, title } | NodeKind::Image { url, title, .. } => {
            let _ = write!(out, " url={url:?}");
            if let Some(title) = title {
                let _ = write!(out, " title={title:?}");
            }
        }
        NodeKind::Anchor(anchor) => {
            let _ = write!(out, " {:?}", anchor.id());
        }
        _ => {}
    }

    if let Some(id) = &node.hints.id {
        let _ = write!(out, " {{#{id}}}");
    }
    if let Some(span) = node.position {
        let _ = write!(out, "@{}..{}", span.start, span.end);
    }
    out.push('\n');

    for child in &node.children {
        write_node(out, child, indent + 1);
    }
}

//! # Attribute Blocks
//!
//! Resolves trailing `{...}` attribute blocks into rendering hints and
//! removes the block text from the tree.
//!
//! ## Attachment
//!
//! - A block at the start of a text node belongs to the inline element
//!   right before it: `[](){#id}`, `*em*{.c}`, `![a](b){: #img}`.
//! - A block at the end of the last text of a paragraph, heading or table
//!   cell belongs to that block: `# Title{: #top}`.
//!
//! Only the id survives as a hint. Classes and key/value pairs are parsed
//! (a block must be well formed to be removed) and then dropped. Unclosed
//! or malformed blocks stay in the text untouched, as do blocks whose `{`
//! was escaped in the source.
//!
//! ## Modules
//!
//! - **`cursor`**: byte cursor used by the block scanner
//! - **`block`**: `AttributeBlock` delimiters and the block grammar

pub mod block;
pub mod cursor;

use crate::{
    ast::{Node, NodeKind, Span},
    pipeline::Plugin,
};

pub use block::{AttributeBlock, Attributes, parse_leading, parse_trailing};

/// Resolves every attribute block in the tree parsed from `source`.
/// Returns how many were removed.
///
/// Text nodes with a position only yield blocks written literally in
/// `source`; braces that came from a backslash escape or a character
/// reference are plain text. Nodes without a position are taken as written.
pub fn resolve(root: &mut Node, source: &str) -> usize {
    let resolved = resolve_node(root, source);
    log::debug!("resolved {resolved} attribute blocks");
    resolved
}

fn resolve_node(node: &mut Node, source: &str) -> usize {
    let mut resolved = resolve_leading(&mut node.children, source);
    node.children.retain(|child| !is_empty_text(child));

    if takes_trailing_block(&node.kind) {
        resolved += resolve_trailing(node, source);
    }

    for child in &mut node.children {
        resolved += resolve_node(child, source);
    }
    resolved
}

/// Moves blocks that open a text node onto the preceding inline element.
fn resolve_leading(children: &mut [Node], source: &str) -> usize {
    let mut resolved = 0;
    for i in 1..children.len() {
        let (before, rest) = children.split_at_mut(i);
        let (target, text) = (&mut before[i - 1], &mut rest[0]);
        if !accepts_attributes(&target.kind) {
            continue;
        }
        let position = text.position;
        let NodeKind::Text { value } = &mut text.kind else {
            continue;
        };
        let Some((attrs, len)) = parse_leading(value) else {
            continue;
        };
        if let Some(sp) = position
            && !is_literal_block(source, sp.start, &value[..len])
        {
            log::trace!("escaped attribute block at {}", sp.start);
            continue;
        }

        log::trace!("attaching {attrs:?} to {}", target.node_type());
        value.drain(..len);
        text.position = position.map(|sp| Span::new((sp.start + len).min(sp.end), sp.end));
        apply(target, &attrs);
        resolved += 1;
    }
    resolved
}

/// Moves a block that closes the last text of `node` onto `node` itself.
fn resolve_trailing(node: &mut Node, source: &str) -> usize {
    let Some(last) = node.children.last_mut() else {
        return 0;
    };
    let position = last.position;
    let NodeKind::Text { value } = &mut last.kind else {
        return 0;
    };
    let Some((attrs, start)) = parse_trailing(value) else {
        return 0;
    };
    let block_len = value.len() - start;
    if let Some(sp) = position {
        let literal = sp
            .end
            .checked_sub(block_len)
            .is_some_and(|at| is_literal_block(source, at, &value[start..]));
        if !literal {
            log::trace!("escaped attribute block ending at {}", sp.end);
            return 0;
        }
    }

    value.truncate(start);
    let kept = value.trim_end().len();
    value.truncate(kept);
    last.position = position.map(|sp| {
        // The block is literal, so only the text before it can differ in
        // length from the source.
        let body_end = sp.end - block_len;
        let raw_kept = source
            .get(sp.start..body_end)
            .map_or(kept, |raw| raw.trim_end().len());
        Span::new(sp.start, sp.start + raw_kept)
    });
    if value.is_empty() {
        node.children.pop();
    }

    log::trace!("attaching {attrs:?} to {}", node.node_type());
    apply(node, &attrs);
    1
}

/// True when `block` is written verbatim at byte `at` of `source` and its
/// opening brace is not backslash-escaped.
fn is_literal_block(source: &str, at: usize, block: &str) -> bool {
    let Some(raw) = source.get(at..at + block.len()) else {
        return false;
    };
    let backslashes = source.as_bytes()[..at]
        .iter()
        .rev()
        .take_while(|&&b| b == b'\\')
        .count();
    raw == block && backslashes % 2 == 0
}

fn apply(target: &mut Node, attrs: &Attributes) {
    if target.hints.id.is_none() {
        target.hints.id = attrs.usable_id().map(str::to_string);
    }
}

fn accepts_attributes(kind: &NodeKind) -> bool {
    matches!(
        kind,
        NodeKind::Link { .. }
            | NodeKind::Image { .. }
            | NodeKind::Emphasis
            | NodeKind::Strong
            | NodeKind::Delete
            | NodeKind::InlineCode { .. }
    )
}

fn takes_trailing_block(kind: &NodeKind) -> bool {
    matches!(
        kind,
        NodeKind::Paragraph | NodeKind::Heading { .. } | NodeKind::TableCell
    )
}

fn is_empty_text(node: &Node) -> bool {
    matches!(&node.kind, NodeKind::Text { value } if value.is_empty())
}

/// Pipeline stage wrapping [`resolve`].
#[derive(Debug, Default, Clone, Copy)]
pub struct AttributesPlugin;

impl Plugin for AttributesPlugin {
    fn name(&self) -> &'static str {
        "attributes"
    }

    fn transform(&self, root: &mut Node, source: &str) {
        resolve(root, source);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ast::{Hints, NodeType, format_tree},
        parsing::{ParseOptions, parse},
    };
    use pretty_assertions::assert_eq;

    fn resolved(source: &str) -> Node {
        let mut root = parse(source, ParseOptions::default());
        resolve(&mut root, source);
        root
    }

    fn hinted_types(root: &Node) -> Vec<(NodeType, String)> {
        root.walk()
            .filter_map(|n| n.hints.id.clone().map(|id| (n.node_type(), id)))
            .collect()
    }

    #[test]
    fn placeholder_link_takes_the_id() {
        let root = resolved("[](){#id}");
        assert_eq!(
            format_tree(&root),
            "root@0..9\n  paragraph@0..9\n    link url=\"\" {#id}@0..4\n"
        );
    }

    #[test]
    fn every_block_form_sets_the_same_hint() {
        for source in ["[](){#id}", "[](){: #id}", "[](){:   #id   }", "[](){id=id}"] {
            let root = resolved(source);
            assert_eq!(
                hinted_types(&root),
                vec![(NodeType::Link, "id".to_string())],
                "{source}"
            );
        }
    }

    #[test]
    fn empty_ids_are_not_attached() {
        for source in ["[](){#}", "[](){#   }", "[](){: #}", "[](){.class #}"] {
            let root = resolved(source);
            assert!(hinted_types(&root).is_empty(), "{source}");
            // The block is still consumed.
            assert_eq!(root.walk().filter(|n| n.node_type() == NodeType::Text).count(), 0);
        }
    }

    #[test]
    fn blocks_in_running_text_attach_to_their_link() {
        let root = resolved("Start [](){#a} middle [](){#b} end");
        let paragraph = &root.children[0];
        let texts: Vec<_> = paragraph
            .children
            .iter()
            .filter_map(|n| match &n.kind {
                NodeKind::Text { value } => Some(value.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(texts, vec!["Start ", " middle ", " end"]);
        assert_eq!(
            hinted_types(&root),
            vec![
                (NodeType::Link, "a".to_string()),
                (NodeType::Link, "b".to_string())
            ]
        );
    }

    #[test]
    fn unclosed_block_is_left_as_text() {
        let root = resolved("[](){#id .class");
        assert!(hinted_types(&root).is_empty());
        assert_eq!(
            root.children[0].children[1].kind,
            NodeKind::Text {
                value: "{#id .class".into()
            }
        );
    }

    #[test]
    fn trailing_blocks_attach_to_paragraphs_and_headings() {
        let root = resolved("# Title{: #heading1}\n\nParagraph text {#para1}");
        assert_eq!(
            hinted_types(&root),
            vec![
                (NodeType::Heading, "heading1".to_string()),
                (NodeType::Paragraph, "para1".to_string())
            ]
        );
        assert_eq!(root.children[0].text_content(), "Title");
        assert_eq!(root.children[1].text_content(), "Paragraph text");
    }

    #[test]
    fn inline_elements_accept_blocks() {
        let root = resolved("*em*{#e} **strong**{#s} ![alt](img.png){: #i} `c`{#c}");
        let types: Vec<_> = hinted_types(&root).into_iter().map(|(t, _)| t).collect();
        assert_eq!(
            types,
            vec![
                NodeType::Emphasis,
                NodeType::Strong,
                NodeType::Image,
                NodeType::InlineCode
            ]
        );
    }

    #[test]
    fn code_is_never_touched() {
        let source = "`{#id}`\n\n```\n[](){#id}\n```\n";
        let root = resolved(source);
        assert!(hinted_types(&root).is_empty());
        assert_eq!(resolve(&mut root.clone(), source), 0);
    }

    #[test]
    fn existing_hints_are_kept() {
        let mut root = Node::root(vec![Node::paragraph(vec![
            Node::link("", None, vec![]).hinted(Hints::with_id("first")),
            Node::text("{#second}"),
        ])]);
        assert_eq!(resolve(&mut root, ""), 1);
        assert_eq!(
            hinted_types(&root),
            vec![(NodeType::Link, "first".to_string())]
        );
    }

    #[test]
    fn nested_containers_are_resolved() {
        let root = resolved("> quote [](){#q}\n\n- item [](){#l}\n\n| a [](){#t} |\n| - |\n");
        let ids: Vec<_> = hinted_types(&root).into_iter().map(|(_, id)| id).collect();
        assert_eq!(ids, vec!["q", "l", "t"]);
    }

    #[test]
    fn escaped_braces_are_plain_text() {
        for source in ["[]()\\{#x}", "[]()&#123;#x}", "*em*\\{.c}"] {
            let root = resolved(source);
            assert!(hinted_types(&root).is_empty(), "{source}");
            assert_eq!(root.children[0].children.len(), 2, "{source}");
        }
    }

    #[test]
    fn escaped_trailing_block_keeps_its_text() {
        for source in ["Title \\{#id}", "Title &#123;#id}", "# Title \\{#id}"] {
            let root = resolved(source);
            assert!(hinted_types(&root).is_empty(), "{source}");
            assert_eq!(root.children[0].text_content(), "Title {#id}", "{source}");
        }
    }

    #[test]
    fn escaped_backslash_before_a_block_does_not_escape_it() {
        let root = resolved("Title \\\\{#id}");
        assert_eq!(
            hinted_types(&root),
            vec![(NodeType::Paragraph, "id".to_string())]
        );
        assert_eq!(root.children[0].text_content(), "Title \\");
    }

    #[test]
    fn spans_follow_the_source_after_references() {
        let source = "a&amp;b {#p}";
        let root = resolved(source);
        let text = &root.children[0].children[0];
        assert_eq!(text.position.and_then(|sp| sp.slice(source)), Some("a&amp;b"));

        let source = "[](){#x}&amp;c";
        let root = resolved(source);
        let text = &root.children[0].children[1];
        assert_eq!(text.position.and_then(|sp| sp.slice(source)), Some("&amp;c"));
    }
}

//! # Anchors
//!
//! Rewrites placeholder links into [`Anchor`](crate::ast::Anchor) nodes and
//! renders them back.
//!
//! A placeholder is the narrowest possible link, `[](){#id}`: no text, no
//! destination, no title, and an id hint left behind by the attribute-block
//! resolver. Any other link is left alone, even when it carries an id, so
//! ordinary links are never destroyed by this pass.
//!
//! ```text
//! [](){#intro}  --parse/resolve-->  link { url: "", title: None, id: "intro" }
//!               --transform------>  anchor { id: "intro", value: "" }
//!               --stringify------>  [](){#intro}
//! ```

use crate::{
    ast::{Node, NodeKind, NodeType},
    pipeline::Plugin,
    stringify::{Context, Handlers, StringifyError},
};

/// Returns true if `node` is a placeholder link that should become an anchor.
pub fn is_candidate(node: &Node) -> bool {
    let NodeKind::Link { url, title } = &node.kind else {
        return false;
    };
    node.children.is_empty()
        && url.is_empty()
        && title.is_none()
        && node.hints.id.as_deref().is_some_and(|id| !id.is_empty())
}

/// Builds the anchor replacing `node`, if it is a candidate.
fn anchor_for(node: &Node) -> Option<Node> {
    if !is_candidate(node) {
        return None;
    }
    let id = node.hints.id.clone()?;
    Some(Node::anchor(id, node.position))
}

/// Replaces every placeholder link below `root` with an anchor node at the
/// same index of the same parent. Returns the number of replacements.
///
/// The root itself is never replaced. Anchors have no children and are not
/// links, so a replacement is never visited twice.
pub fn transform(root: &mut Node) -> usize {
    let replaced = replace_in(root);
    log::debug!("replaced {replaced} placeholder links with anchors");
    replaced
}

fn replace_in(parent: &mut Node) -> usize {
    let mut replaced = 0;
    for child in &mut parent.children {
        if let Some(anchor) = anchor_for(child) {
            log::trace!("anchor {:?} at {:?}", child.hints.id, child.position);
            *child = anchor;
            replaced += 1;
        } else {
            replaced += replace_in(child);
        }
    }
    replaced
}

/// Render handler for [`NodeType::Anchor`].
pub fn render_anchor(node: &Node, _ctx: &Context<'_>) -> Result<String, StringifyError> {
    let NodeKind::Anchor(anchor) = &node.kind else {
        return Err(StringifyError::UnexpectedNode {
            expected: NodeType::Anchor,
            found: node.node_type(),
        });
    };
    if anchor.id().is_empty() {
        log::warn!("anchor without id at {:?} rendered as nothing", node.position);
    }
    Ok(anchor.to_markdown())
}

/// Installs [`render_anchor`] in a stringifier's handler table.
pub fn register(handlers: &mut Handlers) {
    handlers.register(NodeType::Anchor, render_anchor);
}

/// Pipeline stage: registers the anchor renderer and runs [`transform`].
#[derive(Debug, Default, Clone, Copy)]
pub struct AnchorPlugin;

impl Plugin for AnchorPlugin {
    fn name(&self) -> &'static str {
        "anchor"
    }

    fn attach(&self, handlers: &mut Handlers) {
        register(handlers);
    }

    fn transform(&self, root: &mut Node, _source: &str) {
        transform(root);
    }
}

//! # Stringifier
//!
//! Renders a [`Node`] tree back to Markdown.
//!
//! Rendering dispatches on [`NodeType`] through a [`Handlers`] table:
//! handlers registered by plugins take precedence, everything else falls back
//! to the built-in renderer for that type. The fallback is an exhaustive
//! `match`, so adding a node kind without deciding how to render it is a
//! compile error. Kinds that only exist because a plugin introduced them
//! (anchors) have no built-in renderer; rendering one without its plugin
//! is a [`StringifyError::MissingHandler`].
//!
//! ## Modules
//!
//! - **`handlers`**: built-in renderers, one per node kind
//! - **`escape`**: text escaping
//! - **`table`**: GFM table layout

mod escape;
mod handlers;
mod table;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::ast::{Node, NodeType};

/// Renders one node. Handlers recurse through the [`Context`].
pub type Handler = fn(&Node, &Context<'_>) -> Result<String, StringifyError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StringifyError {
    #[error("No renderer registered for `{0}` nodes")]
    MissingHandler(NodeType),
    #[error("Renderer for `{expected}` nodes was given a `{found}` node")]
    UnexpectedNode { expected: NodeType, found: NodeType },
    #[error("Invalid {name} marker {value:?}")]
    InvalidOption { name: &'static str, value: char },
}

/// How far list item content is indented from its marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListItemIndent {
    /// Pad the marker to the next multiple of four columns (`-   item`).
    #[default]
    Tab,
    /// One space after the marker (`- item`).
    One,
    /// `One` for tight items, `Tab` for spread ones.
    Mixed,
}

/// Markdown output style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StringifyOptions {
    /// Unordered list marker: `-`, `*` or `+`.
    pub bullet: char,
    /// Emphasis marker: `*` or `_`.
    pub emphasis: char,
    pub list_item_indent: ListItemIndent,
}

impl Default for StringifyOptions {
    fn default() -> Self {
        Self {
            bullet: '-',
            emphasis: '*',
            list_item_indent: ListItemIndent::Tab,
        }
    }
}

impl StringifyOptions {
    pub fn validate(&self) -> Result<(), StringifyError> {
        if !matches!(self.bullet, '-' | '*' | '+') {
            return Err(StringifyError::InvalidOption {
                name: "bullet",
                value: self.bullet,
            });
        }
        if !matches!(self.emphasis, '*' | '_') {
            return Err(StringifyError::InvalidOption {
                name: "emphasis",
                value: self.emphasis,
            });
        }
        Ok(())
    }
}

/// Per-type render handlers registered on top of the built-ins.
#[derive(Debug, Clone, Default)]
pub struct Handlers {
    table: HashMap<NodeType, Handler>,
}

impl Handlers {
    /// Installs `handler` for `node_type`, replacing any earlier one.
    pub fn register(&mut self, node_type: NodeType, handler: Handler) {
        if self.table.insert(node_type, handler).is_some() {
            log::debug!("replaced renderer for `{node_type}` nodes");
        }
    }

    pub fn get(&self, node_type: NodeType) -> Option<Handler> {
        self.table.get(&node_type).copied()
    }

    pub fn contains(&self, node_type: NodeType) -> bool {
        self.table.contains_key(&node_type)
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

/// What a handler can see while rendering: the handler table and the
/// output options.
pub struct Context<'a> {
    handlers: &'a Handlers,
    options: &'a StringifyOptions,
}

impl<'a> Context<'a> {
    pub fn options(&self) -> &StringifyOptions {
        self.options
    }

    /// Renders `node` with its registered or built-in handler.
    pub fn render(&self, node: &Node) -> Result<String, StringifyError> {
        let node_type = node.node_type();
        let handler = self
            .handlers
            .get(node_type)
            .or_else(|| handlers::builtin(node_type))
            .ok_or(StringifyError::MissingHandler(node_type))?;
        handler(node, self)
    }

    /// Renders each child of `node`.
    pub fn render_children(&self, node: &Node) -> Result<Vec<String>, StringifyError> {
        node.children.iter().map(|child| self.render(child)).collect()
    }

    /// Renders the children of an inline container back to back.
    pub fn render_inline(&self, node: &Node) -> Result<String, StringifyError> {
        Ok(self.render_children(node)?.concat())
    }
}

/// Tree-to-Markdown renderer.
#[derive(Debug, Clone, Default)]
pub struct Stringifier {
    options: StringifyOptions,
    handlers: Handlers,
}

impl Stringifier {
    pub fn new(options: StringifyOptions) -> Self {
        Self {
            options,
            handlers: Handlers::default(),
        }
    }

    pub fn options(&self) -> &StringifyOptions {
        &self.options
    }

    pub fn handlers(&self) -> &Handlers {
        &self.handlers
    }

    pub fn handlers_mut(&mut self) -> &mut Handlers {
        &mut self.handlers
    }

    pub fn context(&self) -> Context<'_> {
        Context {
            handlers: &self.handlers,
            options: &self.options,
        }
    }

    /// Renders a single node without a trailing newline.
    pub fn render(&self, node: &Node) -> Result<String, StringifyError> {
        self.context().render(node)
    }

    /// Renders a document. Non-empty output ends with exactly one newline.
    pub fn stringify(&self, root: &Node) -> Result<String, StringifyError> {
        let mut out = self.render(root)?;
        let trimmed = out.trim_end_matches('\n').len();
        out.truncate(trimmed);
        if !out.is_empty() {
            out.push('\n');
        }
        Ok(out)
    }
}

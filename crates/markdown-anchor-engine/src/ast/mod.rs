//! # Syntax Tree
//!
//! An owned Markdown tree in the shape of mdast: every node has a kind, an
//! ordered list of children, an optional source span and a small bag of
//! rendering hints.
//!
//! ## Modules
//!
//! - **`span`**: `Span` byte ranges into the source
//! - **`anchor`**: the `Anchor` payload produced by the anchor transform
//! - **`outline`**: indented text dump of a tree for tests and debugging
//!
//! ## Ownership
//!
//! A parent owns its children directly (`Vec<Node>`). Passes that rewrite the
//! tree take `&mut Node` and replace entries of `children` in place, so a
//! single exclusive borrow covers the whole traversal.

pub mod anchor;
pub mod outline;
pub mod span;

use std::fmt;

pub use anchor::Anchor;
pub use outline::format_tree;
pub use span::Span;

/// Column alignment of a GFM table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    None,
    Left,
    Center,
    Right,
}

/// Rendering hints attached to a node by the attribute-block resolver.
///
/// Only the identifier is carried; classes and key/value pairs are parsed but
/// nothing downstream consumes them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hints {
    pub id: Option<String>,
}

impl Hints {
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.id.is_none()
    }
}

/// The kind of a node, with the attributes specific to that kind.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Root,
    Paragraph,
    Heading {
        depth: u8,
    },
    ThematicBreak,
    Blockquote,
    List {
        ordered: bool,
        start: Option<u64>,
        spread: bool,
    },
    ListItem {
        spread: bool,
        checked: Option<bool>,
    },
    Code {
        lang: Option<String>,
        value: String,
    },
    Html {
        value: String,
    },
    Table {
        align: Vec<Align>,
    },
    TableRow,
    TableCell,
    Text {
        value: String,
    },
    Emphasis,
    Strong,
    Delete,
    InlineCode {
        value: String,
    },
    Break,
    Link {
        /// Destination; empty when the source had none.
        url: String,
        /// `None` when no title was written. `Some("")` for `""`.
        title: Option<String>,
    },
    Image {
        url: String,
        title: Option<String>,
        alt: String,
    },
    Anchor(Anchor),
}

/// Field-less tag of a [`NodeKind`], used to key render handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeType {
    Root,
    Paragraph,
    Heading,
    ThematicBreak,
    Blockquote,
    List,
    ListItem,
    Code,
    Html,
    Table,
    TableRow,
    TableCell,
    Text,
    Emphasis,
    Strong,
    Delete,
    InlineCode,
    Break,
    Link,
    Image,
    Anchor,
}

impl NodeType {
    /// The mdast type label (`"link"`, `"anchor"`, ...).
    pub fn label(self) -> &'static str {
        match self {
            NodeType::Root => "root",
            NodeType::Paragraph => "paragraph",
            NodeType::Heading => "heading",
            NodeType::ThematicBreak => "thematicBreak",
            NodeType::Blockquote => "blockquote",
            NodeType::List => "list",
            NodeType::ListItem => "listItem",
            NodeType::Code => "code",
            NodeType::Html => "html",
            NodeType::Table => "table",
            NodeType::TableRow => "tableRow",
            NodeType::TableCell => "tableCell",
            NodeType::Text => "text",
            NodeType::Emphasis => "emphasis",
            NodeType::Strong => "strong",
            NodeType::Delete => "delete",
            NodeType::InlineCode => "inlineCode",
            NodeType::Break => "break",
            NodeType::Link => "link",
            NodeType::Image => "image",
            NodeType::Anchor => "anchor",
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl NodeKind {
    pub fn node_type(&self) -> NodeType {
        match self {
            NodeKind::Root => NodeType::Root,
            NodeKind::Paragraph => NodeType::Paragraph,
            NodeKind::Heading { .. } => NodeType::Heading,
            NodeKind::ThematicBreak => NodeType::ThematicBreak,
            NodeKind::Blockquote => NodeType::Blockquote,
            NodeKind::List { .. } => NodeType::List,
            NodeKind::ListItem { .. } => NodeType::ListItem,
            NodeKind::Code { .. } => NodeType::Code,
            NodeKind::Html { .. } => NodeType::Html,
            NodeKind::Table { .. } => NodeType::Table,
            NodeKind::TableRow => NodeType::TableRow,
            NodeKind::TableCell => NodeType::TableCell,
            NodeKind::Text { .. } => NodeType::Text,
            NodeKind::Emphasis => NodeType::Emphasis,
            NodeKind::Strong => NodeType::Strong,
            NodeKind::Delete => NodeType::Delete,
            NodeKind::InlineCode { .. } => NodeType::InlineCode,
            NodeKind::Break => NodeType::Break,
            NodeKind::Link { .. } => NodeType::Link,
            NodeKind::Image { .. } => NodeType::Image,
            NodeKind::Anchor(_) => NodeType::Anchor,
        }
    }
}

/// A node in the document tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub children: Vec<Node>,
    pub position: Option<Span>,
    pub hints: Hints,
}

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            children: Vec::new(),
            position: None,
            hints: Hints::default(),
        }
    }

    pub fn with_children(kind: NodeKind, children: Vec<Node>) -> Self {
        Self {
            children,
            ..Self::new(kind)
        }
    }

    pub fn root(children: Vec<Node>) -> Self {
        Self::with_children(NodeKind::Root, children)
    }

    pub fn paragraph(children: Vec<Node>) -> Self {
        Self::with_children(NodeKind::Paragraph, children)
    }

    pub fn text(value: impl Into<String>) -> Self {
        Self::new(NodeKind::Text {
            value: value.into(),
        })
    }

    pub fn link(url: impl Into<String>, title: Option<String>, children: Vec<Node>) -> Self {
        Self::with_children(
            NodeKind::Link {
                url: url.into(),
                title,
            },
            children,
        )
    }

    /// Builds a childless anchor node at `position`.
    pub fn anchor(id: impl Into<String>, position: Option<Span>) -> Self {
        Self {
            position,
            ..Self::new(NodeKind::Anchor(Anchor::new(id)))
        }
    }

    /// Sets the source span.
    #[must_use]
    pub fn at(mut self, span: Span) -> Self {
        self.position = Some(span);
        self
    }

    /// Sets the rendering hints.
    #[must_use]
    pub fn hinted(mut self, hints: Hints) -> Self {
        self.hints = hints;
        self
    }

    pub fn node_type(&self) -> NodeType {
        self.kind.node_type()
    }

    pub fn as_anchor(&self) -> Option<&Anchor> {
        match &self.kind {
            NodeKind::Anchor(anchor) => Some(anchor),
            _ => None,
        }
    }

    /// Concatenated value of every text-like descendant, in document order.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        for node in self.walk() {
            match &node.kind {
                NodeKind::Text { value } | NodeKind::InlineCode { value } => out.push_str(value),
                NodeKind::Image { alt, .. } => out.push_str(alt),
                _ => {}
            }
        }
        out
    }

    /// Pre-order iterator over this node and all of its descendants.
    pub fn walk(&self) -> Walk<'_> {
        Walk { stack: vec![self] }
    }

    /// Every anchor in the tree, in document order.
    pub fn anchors(&self) -> Vec<&Anchor> {
        self.walk().filter_map(Node::as_anchor).collect()
    }
}

/// Pre-order depth-first iterator returned by [`Node::walk`].
pub struct Walk<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

//! # markdown-anchor-engine
//!
//! Markdown in, Markdown out, with `[](){#id}` placeholders turned into
//! first-class anchor nodes on the way through.
//!
//! ## Modules
//!
//! - **`ast`**: the owned node tree (`Node`, `NodeKind`, `Span`, `Anchor`)
//! - **`parsing`**: pulldown-cmark front end producing the tree
//! - **`attributes`**: `{#id .class key=value}` block resolution into hints
//! - **`anchor`**: the placeholder-to-anchor transform and its renderer
//! - **`stringify`**: handler-table driven Markdown output
//! - **`pipeline`**: `Plugin` trait and the parse/transform/stringify driver

pub mod anchor;
pub mod ast;
pub mod attributes;
pub mod parsing;
pub mod pipeline;
pub mod stringify;

// Re-export key types for easier usage
pub use anchor::{AnchorPlugin, is_candidate};
pub use ast::{Anchor, Hints, Node, NodeKind, NodeType, Span, format_tree};
pub use attributes::AttributesPlugin;
pub use parsing::{ParseOptions, parse};
pub use pipeline::{Pipeline, PipelineError, PipelineOptions, Plugin};
pub use stringify::{Handlers, ListItemIndent, Stringifier, StringifyError, StringifyOptions};

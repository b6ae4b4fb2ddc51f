//! # Markdown Front End
//!
//! Turns Markdown source into an owned [`Node`] tree using pulldown-cmark's
//! offset iterator, so every node remembers the byte range it came from.
//!
//! ## Modules
//!
//! - **`builder`**: `TreeBuilder`, a frame stack that folds events into nodes
//! - **`link`**: source inspection pulldown-cmark cannot answer for us
//!   (empty vs. missing link titles)
//!
//! ## Tree Shape
//!
//! The tree follows mdast conventions:
//! - list items always wrap inline content in a paragraph, even when tight
//! - adjacent text events (including soft breaks) are merged into one text node
//! - link destinations are always strings; a link without a title has
//!   `title: None`, one written with `""` has `title: Some("")`
//!
//! Parsing never fails: any input yields a tree.

pub mod builder;
mod link;

use pulldown_cmark::{Options, Parser};
use serde::{Deserialize, Serialize};

use crate::ast::Node;

pub use builder::TreeBuilder;

/// Markdown extensions enabled in the front end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// GFM pipe tables.
    pub tables: bool,
    /// `~~deleted~~` text.
    pub strikethrough: bool,
    /// `- [x] done` list items.
    pub tasklists: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            tables: true,
            strikethrough: true,
            tasklists: true,
        }
    }
}

impl ParseOptions {
    fn to_cmark(self) -> Options {
        let mut options = Options::empty();
        options.set(Options::ENABLE_TABLES, self.tables);
        options.set(Options::ENABLE_STRIKETHROUGH, self.strikethrough);
        options.set(Options::ENABLE_TASKLISTS, self.tasklists);
        options
    }
}

/// Parses `source` into a root node.
pub fn parse(source: &str, options: ParseOptions) -> Node {
    let mut builder = TreeBuilder::new(source);
    for (event, range) in Parser::new_ext(source, options.to_cmark()).into_offset_iter() {
        builder.push(event, range);
    }
    let root = builder.finish();
    log::debug!(
        "parsed {} bytes into {} nodes",
        source.len(),
        root.walk().count()
    );
    root
}

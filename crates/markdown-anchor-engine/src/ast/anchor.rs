/// A zero-width, identifier-bearing marker for a named location in a document.
///
/// Anchors replace placeholder links of the shape `[](){#id}`. Once built
/// they are never mutated and never have children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    id: String,
    /// Always empty; the anchor carries no text of its own.
    value: String,
}

impl Anchor {
    /// Empty-link marker written before the identifier.
    pub const LINK: &'static str = "[]()";
    pub const ID_OPEN: &'static str = "{#";
    pub const ID_CLOSE: &'static str = "}";

    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            value: String::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Renders the anchor as `[](){#id}`.
    ///
    /// An anchor without an id renders as nothing.
    pub fn to_markdown(&self) -> String {
        if self.id.is_empty() {
            return String::new();
        }
        let mut out = String::with_capacity(
            Self::LINK.len() + Self::ID_OPEN.len() + self.id.len() + Self::ID_CLOSE.len(),
        );
        out.push_str(Self::LINK);
        out.push_str(Self::ID_OPEN);
        out.push_str(&self.id);
        out.push_str(Self::ID_CLOSE);
        out
    }
}

use std::sync::OnceLock;

use regex::Regex;

use super::cursor::Cursor;

/// Attribute block syntax with owned delimiter constants.
///
/// ```text
/// {#id .class key=value key="quoted value"}
/// {: #id}
/// ```
pub struct AttributeBlock;

impl AttributeBlock {
    pub const OPEN: u8 = b'{';
    pub const CLOSE: u8 = b'}';
    /// Optional kramdown-style marker right after `{`.
    pub const SHORTHAND: u8 = b':';
    pub const ID: u8 = b'#';
    pub const CLASS: u8 = b'.';
    pub const ASSIGN: u8 = b'=';
    /// Key whose value is treated as an id declaration.
    pub const ID_KEY: &'static str = "id";
}

/// The parsed contents of one attribute block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    /// First id declaration (`#x` or `id=x`); later ones are ignored.
    /// May be empty when written as a bare `#`.
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub pairs: Vec<(String, String)>,
}

impl Attributes {
    /// The id if it has any non-whitespace content.
    pub fn usable_id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.trim().is_empty())
    }

    fn declare_id(&mut self, id: &str) {
        if self.id.is_none() {
            self.id = Some(id.to_string());
        }
    }
}

fn key_pattern() -> &'static Regex {
    static KEY_REGEX: OnceLock<Regex> = OnceLock::new();
    KEY_REGEX.get_or_init(|| {
        Regex::new(r"^[A-Za-z_:][A-Za-z0-9_:.\-]*$").expect("Invalid attribute key regex")
    })
}

fn ends_token(b: u8) -> bool {
    b.is_ascii_whitespace() || b == AttributeBlock::CLOSE
}

/// Parses an attribute block at the very start of `s`.
///
/// Returns the attributes and the number of bytes the block spans, or `None`
/// if `s` does not start with a well-formed, closed block.
pub fn parse_leading(s: &str) -> Option<(Attributes, usize)> {
    let mut cur = Cursor::new(s, 0);
    if !cur.eat(AttributeBlock::OPEN) {
        return None;
    }
    cur.eat(AttributeBlock::SHORTHAND);

    let mut attrs = Attributes::default();
    loop {
        cur.skip_whitespace();
        match cur.peek()? {
            AttributeBlock::CLOSE => {
                cur.bump();
                return Some((attrs, cur.pos()));
            }
            AttributeBlock::OPEN => return None,
            AttributeBlock::ID => {
                cur.bump();
                let id = token(&mut cur)?;
                attrs.declare_id(id);
            }
            AttributeBlock::CLASS => {
                cur.bump();
                let class = token(&mut cur)?;
                if class.is_empty() {
                    return None;
                }
                attrs.classes.push(class.to_string());
            }
            _ => {
                let key = cur.take_until(|b| ends_token(b) || b == AttributeBlock::ASSIGN);
                if !key_pattern().is_match(key) {
                    return None;
                }
                let value = if cur.eat(AttributeBlock::ASSIGN) {
                    value(&mut cur)?
                } else {
                    String::new()
                };
                if key == AttributeBlock::ID_KEY {
                    attrs.declare_id(id_word(&value)?);
                } else {
                    attrs.pairs.push((key.to_string(), value));
                }
            }
        }
    }
}

/// Finds an attribute block that ends exactly at the end of `s`.
///
/// Returns the attributes and the byte offset where the block starts.
pub fn parse_trailing(s: &str) -> Option<(Attributes, usize)> {
    if !s.ends_with(AttributeBlock::CLOSE as char) {
        return None;
    }
    let start = s.rfind(AttributeBlock::OPEN as char)?;
    let (attrs, len) = parse_leading(&s[start..])?;
    (start + len == s.len()).then_some((attrs, start))
}

/// Reads a `#id` or `.class` body: everything up to whitespace or `}`.
fn token<'a>(cur: &mut Cursor<'a>) -> Option<&'a str> {
    let body = cur.take_until(ends_token);
    if body.as_bytes().contains(&AttributeBlock::OPEN) {
        return None;
    }
    Some(body)
}

/// An `id=` value follows the `#id` token rules: the first
/// whitespace-separated word, with no braces in it.
fn id_word(value: &str) -> Option<&str> {
    let word = value.split_ascii_whitespace().next().unwrap_or_default();
    if word
        .bytes()
        .any(|b| b == AttributeBlock::OPEN || b == AttributeBlock::CLOSE)
    {
        return None;
    }
    Some(word)
}

/// Reads a bare or quoted value after `=`.
fn value(cur: &mut Cursor<'_>) -> Option<String> {
    match cur.peek() {
        Some(quote @ (b'"' | b'\'')) => {
            cur.bump();
            let body = cur.take_until(|b| b == quote);
            if !cur.eat(quote) {
                return None;
            }
            Some(body.to_string())
        }
        _ => token(cur).map(str::to_string),
    }
}

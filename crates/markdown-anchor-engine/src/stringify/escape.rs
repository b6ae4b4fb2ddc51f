use crate::attributes::{parse_leading, parse_trailing};

/// Characters that always need a backslash inside text.
const ALWAYS: [char; 6] = ['\\', '*', '`', '[', ']', '<'];

/// Escapes characters in a text value that would otherwise be read back as
/// inline syntax.
///
/// `_` is only escaped at word boundaries; intraword underscores never
/// start emphasis. `{` is escaped only where it opens a well-formed
/// attribute block at either edge of the text, the two places a block is
/// resolved; other braces and `#` pass through as written.
pub fn escape_text(value: &str) -> String {
    let leading = parse_leading(value).map(|_| 0);
    let trailing = parse_trailing(value).map(|(_, start)| start);

    let chars: Vec<(usize, char)> = value.char_indices().collect();
    let mut out = String::with_capacity(value.len());
    for (i, &(at, c)) in chars.iter().enumerate() {
        let escape = match c {
            '_' => {
                let before = i.checked_sub(1).and_then(|j| chars.get(j));
                let after = chars.get(i + 1);
                !(before.is_some_and(|&(_, b)| b.is_alphanumeric())
                    && after.is_some_and(|&(_, a)| a.is_alphanumeric()))
            }
            '{' => leading == Some(at) || trailing == Some(at),
            _ => ALWAYS.contains(&c),
        };
        if escape {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Escapes the first character of any line that would otherwise open a
/// block construct (heading, block quote, list item).
pub fn escape_line_starts(content: &str) -> String {
    content
        .split('\n')
        .map(escape_line_start)
        .collect::<Vec<_>>()
        .join("\n")
}

fn escape_line_start(line: &str) -> String {
    let bytes = line.as_bytes();
    match bytes.first() {
        Some(b'#' | b'>') => format!("\\{line}"),
        Some(b'-' | b'+') if matches!(bytes.get(1), None | Some(b' ' | b'\t')) => {
            format!("\\{line}")
        }
        Some(b'0'..=b'9') => {
            let digits = bytes.iter().take_while(|b| b.is_ascii_digit()).count();
            let marker = bytes.get(digits);
            let after = bytes.get(digits + 1);
            if matches!(marker, Some(b'.' | b')')) && matches!(after, None | Some(b' ' | b'\t')) {
                format!("{}\\{}", &line[..digits], &line[digits..])
            } else {
                line.to_string()
            }
        }
        _ => line.to_string(),
    }
}

/// Escapes `|` so cell content cannot split a table row.
pub fn escape_pipes(content: &str) -> String {
    content.replace('|', "\\|")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inline_syntax_is_escaped() {
        assert_eq!(escape_text("a*b"), "a\\*b");
        assert_eq!(escape_text("[x]"), "\\[x\\]");
        assert_eq!(escape_text("`c`"), "\\`c\\`");
        assert_eq!(escape_text("<div>"), "\\<div>");
        assert_eq!(escape_text("back\\slash"), "back\\\\slash");
    }

    #[test]
    fn intraword_underscores_are_kept() {
        assert_eq!(escape_text("snake_case"), "snake_case");
        assert_eq!(escape_text("_lead"), "\\_lead");
        assert_eq!(escape_text("trail_"), "trail\\_");
    }

    #[test]
    fn attribute_syntax_passes_through() {
        assert_eq!(escape_text("{#id .class"), "{#id .class");
        assert_eq!(escape_text("a {#x} b"), "a {#x} b");
        assert_eq!(escape_text("{id='x{y'}"), "{id='x{y'}");
    }

    #[test]
    fn blocks_at_text_edges_are_escaped() {
        assert_eq!(escape_text("{#x} after"), "\\{#x} after");
        assert_eq!(escape_text("定理 {: #x}"), "定理 \\{: #x}");
        assert_eq!(escape_text("{#x}"), "\\{#x}");
    }

    #[test]
    fn block_openers_are_escaped_at_line_start() {
        assert_eq!(escape_line_starts("# not a heading"), "\\# not a heading");
        assert_eq!(escape_line_starts("a\n> b"), "a\n\\> b");
        assert_eq!(escape_line_starts("- x"), "\\- x");
        assert_eq!(escape_line_starts("1. x"), "1\\. x");
        assert_eq!(escape_line_starts("12) x"), "12\\) x");
    }

    #[test]
    fn harmless_line_starts_are_kept() {
        assert_eq!(escape_line_starts("-dash"), "-dash");
        assert_eq!(escape_line_starts("1.5 apples"), "1.5 apples");
        assert_eq!(escape_line_starts("[](){#id}"), "[](){#id}");
    }

    #[test]
    fn pipes() {
        assert_eq!(escape_pipes("a|b"), "a\\|b");
    }
}

/// Delimiter pairs that can enclose a link title.
const TITLE_PAIRS: [&str; 3] = ["\"\"", "''", "()"];

/// Returns true if the raw source of an inline link ends with an explicitly
/// empty title, as in `[](<> "")` or `[x](url '')`.
///
/// pulldown-cmark reports both "no title" and "empty title" as an empty
/// string; only the source tells them apart. The title must be separated
/// from the destination by whitespace, otherwise the quotes belong to the
/// destination itself (`[]("")` has destination `""` and no title).
pub(crate) fn has_empty_title(raw: &str) -> bool {
    let Some(body) = raw.trim_end().strip_suffix(')') else {
        return false;
    };
    let Some(open) = body.rfind("](") else {
        return false;
    };
    let inner = body[open + 2..].trim_end();

    TITLE_PAIRS.iter().any(|pair| {
        inner
            .strip_suffix(pair)
            .is_some_and(|rest| rest.ends_with(char::is_whitespace))
    })
}

use crate::ast::{Node, NodeKind, NodeType};

use super::{
    Context, Handler, ListItemIndent, StringifyError,
    escape::{escape_line_starts, escape_pipes, escape_text},
    table,
};

/// The built-in renderer for `node_type`, if it has one.
pub fn builtin(node_type: NodeType) -> Option<Handler> {
    let handler: Handler = match node_type {
        NodeType::Root => root,
        NodeType::Paragraph => paragraph,
        NodeType::Heading => heading,
        NodeType::ThematicBreak => thematic_break,
        NodeType::Blockquote => blockquote,
        NodeType::List => list,
        NodeType::ListItem => list_item,
        NodeType::Code => code,
        NodeType::Html => html,
        NodeType::Table => table,
        NodeType::TableRow => table_row,
        NodeType::TableCell => table_cell,
        NodeType::Text => text,
        NodeType::Emphasis => emphasis,
        NodeType::Strong => strong,
        NodeType::Delete => delete,
        NodeType::InlineCode => inline_code,
        NodeType::Break => hard_break,
        NodeType::Link => link,
        NodeType::Image => image,
        // Only exists when the anchor plugin is installed.
        NodeType::Anchor => return None,
    };
    Some(handler)
}

fn unexpected(expected: NodeType, node: &Node) -> StringifyError {
    StringifyError::UnexpectedNode {
        expected,
        found: node.node_type(),
    }
}

/// Renders block children separated by `separator`, skipping empty output.
fn blocks(node: &Node, ctx: &Context<'_>, separator: &str) -> Result<String, StringifyError> {
    let parts = ctx.render_children(node)?;
    Ok(parts
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(separator))
}

/// Prefixes every line of `content`; empty lines get `empty` instead.
fn indent_lines(content: &str, first: &str, rest: &str, empty: &str) -> String {
    content
        .split('\n')
        .enumerate()
        .map(|(i, line)| {
            let prefix = if i == 0 { first } else { rest };
            if line.is_empty() && i > 0 {
                empty.to_string()
            } else {
                format!("{prefix}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn root(node: &Node, ctx: &Context<'_>) -> Result<String, StringifyError> {
    blocks(node, ctx, "\n\n")
}

fn paragraph(node: &Node, ctx: &Context<'_>) -> Result<String, StringifyError> {
    Ok(escape_line_starts(&ctx.render_inline(node)?))
}

fn heading(node: &Node, ctx: &Context<'_>) -> Result<String, StringifyError> {
    let NodeKind::Heading { depth } = node.kind else {
        return Err(unexpected(NodeType::Heading, node));
    };
    let content = ctx.render_inline(node)?;
    let marker = "#".repeat(usize::from(depth.clamp(1, 6)));
    if content.is_empty() {
        Ok(marker)
    } else {
        Ok(format!("{marker} {}", content.replace('\n', " ")))
    }
}

fn thematic_break(_node: &Node, _ctx: &Context<'_>) -> Result<String, StringifyError> {
    Ok("***".to_string())
}

fn blockquote(node: &Node, ctx: &Context<'_>) -> Result<String, StringifyError> {
    let content = blocks(node, ctx, "\n\n")?;
    Ok(indent_lines(&content, "> ", "> ", ">"))
}

fn list(node: &Node, ctx: &Context<'_>) -> Result<String, StringifyError> {
    let NodeKind::List {
        ordered,
        start,
        spread,
    } = node.kind
    else {
        return Err(unexpected(NodeType::List, node));
    };

    let first = start.unwrap_or(1);
    let items = node
        .children
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let marker = if ordered {
                format!("{}.", first + i as u64)
            } else {
                ctx.options().bullet.to_string()
            };
            render_item(item, ctx, &marker)
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(items.join(if spread { "\n\n" } else { "\n" }))
}

fn list_item(node: &Node, ctx: &Context<'_>) -> Result<String, StringifyError> {
    render_item(node, ctx, &ctx.options().bullet.to_string())
}

fn render_item(node: &Node, ctx: &Context<'_>, marker: &str) -> Result<String, StringifyError> {
    let (spread, checked) = match node.kind {
        NodeKind::ListItem { spread, checked } => (spread, checked),
        _ => (false, None),
    };

    let width = match ctx.options().list_item_indent {
        ListItemIndent::One => marker.len() + 1,
        ListItemIndent::Tab => (marker.len() + 1).div_ceil(4) * 4,
        ListItemIndent::Mixed if spread => (marker.len() + 1).div_ceil(4) * 4,
        ListItemIndent::Mixed => marker.len() + 1,
    };

    let mut content = blocks(node, ctx, if spread { "\n\n" } else { "\n" })?;
    if let Some(checked) = checked {
        let task = if checked { "[x] " } else { "[ ] " };
        content.insert_str(0, task);
    }

    let first = format!("{marker:<width$}");
    let rest = " ".repeat(width);
    Ok(indent_lines(&content, &first, &rest, ""))
}

fn code(node: &Node, _ctx: &Context<'_>) -> Result<String, StringifyError> {
    let NodeKind::Code { lang, value } = &node.kind else {
        return Err(unexpected(NodeType::Code, node));
    };
    let fence = "`".repeat(longest_run(value, '`').max(2) + 1);
    let info = lang.as_deref().unwrap_or("");
    if value.is_empty() {
        Ok(format!("{fence}{info}\n{fence}"))
    } else {
        Ok(format!("{fence}{info}\n{value}\n{fence}"))
    }
}

fn html(node: &Node, _ctx: &Context<'_>) -> Result<String, StringifyError> {
    let NodeKind::Html { value } = &node.kind else {
        return Err(unexpected(NodeType::Html, node));
    };
    Ok(value.trim_end_matches('\n').to_string())
}

fn table(node: &Node, ctx: &Context<'_>) -> Result<String, StringifyError> {
    let NodeKind::Table { align } = &node.kind else {
        return Err(unexpected(NodeType::Table, node));
    };
    let rows = node
        .children
        .iter()
        .map(|row| {
            row.children
                .iter()
                .map(|cell| ctx.render(cell))
                .collect::<Result<Vec<_>, _>>()
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(table::layout(&rows, align))
}

fn table_row(node: &Node, ctx: &Context<'_>) -> Result<String, StringifyError> {
    let cells = ctx.render_children(node)?;
    Ok(format!("| {} |", cells.join(" | ")))
}

fn table_cell(node: &Node, ctx: &Context<'_>) -> Result<String, StringifyError> {
    let content = ctx.render_inline(node)?;
    Ok(escape_pipes(&content.replace('\n', " ")))
}

fn text(node: &Node, _ctx: &Context<'_>) -> Result<String, StringifyError> {
    let NodeKind::Text { value } = &node.kind else {
        return Err(unexpected(NodeType::Text, node));
    };
    Ok(escape_text(value))
}

fn emphasis(node: &Node, ctx: &Context<'_>) -> Result<String, StringifyError> {
    let marker = ctx.options().emphasis;
    Ok(format!("{marker}{}{marker}", ctx.render_inline(node)?))
}

fn strong(node: &Node, ctx: &Context<'_>) -> Result<String, StringifyError> {
    Ok(format!("**{}**", ctx.render_inline(node)?))
}

fn delete(node: &Node, ctx: &Context<'_>) -> Result<String, StringifyError> {
    Ok(format!("~~{}~~", ctx.render_inline(node)?))
}

fn inline_code(node: &Node, _ctx: &Context<'_>) -> Result<String, StringifyError> {
    let NodeKind::InlineCode { value } = &node.kind else {
        return Err(unexpected(NodeType::InlineCode, node));
    };
    let fence = "`".repeat(longest_run(value, '`') + 1);
    let pad = value.starts_with('`') || value.ends_with('`');
    if pad {
        Ok(format!("{fence} {value} {fence}"))
    } else {
        Ok(format!("{fence}{value}{fence}"))
    }
}

fn hard_break(_node: &Node, _ctx: &Context<'_>) -> Result<String, StringifyError> {
    Ok("\\\n".to_string())
}

fn link(node: &Node, ctx: &Context<'_>) -> Result<String, StringifyError> {
    let NodeKind::Link { url, title } = &node.kind else {
        return Err(unexpected(NodeType::Link, node));
    };
    let content = ctx.render_inline(node)?;

    if title.is_none() && is_autolink(node, url) {
        return Ok(format!("<{url}>"));
    }
    Ok(format!(
        "[{content}]({}{})",
        destination(url),
        title_suffix(title.as_deref())
    ))
}

fn image(node: &Node, _ctx: &Context<'_>) -> Result<String, StringifyError> {
    let NodeKind::Image { url, title, alt } = &node.kind else {
        return Err(unexpected(NodeType::Image, node));
    };
    Ok(format!(
        "![{}]({}{})",
        escape_text(alt),
        destination(url),
        title_suffix(title.as_deref())
    ))
}

/// A link whose only text is its own absolute URL or email address.
fn is_autolink(node: &Node, url: &str) -> bool {
    if url.is_empty() || node.children.len() != 1 {
        return false;
    }
    let NodeKind::Text { value } = &node.children[0].kind else {
        return false;
    };
    let bare = url.strip_prefix("mailto:").unwrap_or(url);
    (value == url || value == bare) && (url.contains("://") || url.contains('@'))
}

fn destination(url: &str) -> String {
    let needs_brackets = url.chars().any(|c| c.is_whitespace() || c.is_control())
        || url.matches('(').count() != url.matches(')').count();
    if needs_brackets {
        format!("<{}>", url.replace('<', "\\<").replace('>', "\\>"))
    } else {
        url.to_string()
    }
}

/// ` "title"` for a non-empty title; empty titles are not written.
fn title_suffix(title: Option<&str>) -> String {
    match title {
        Some(title) if !title.is_empty() => {
            format!(" \"{}\"", title.replace('\\', "\\\\").replace('"', "\\\""))
        }
        _ => String::new(),
    }
}

fn longest_run(value: &str, c: char) -> usize {
    let mut longest = 0;
    let mut current = 0;
    for ch in value.chars() {
        if ch == c {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    longest
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ast::{Align, Hints},
        stringify::{StringifyOptions, Stringifier},
    };
    use pretty_assertions::assert_eq;

    fn render(node: &Node) -> String {
        Stringifier::default().render(node).expect("renders")
    }

    fn list_of(ordered: bool, spread: bool, items: Vec<Vec<Node>>) -> Node {
        Node::with_children(
            NodeKind::List {
                ordered,
                start: ordered.then_some(1),
                spread,
            },
            items
                .into_iter()
                .map(|blocks| {
                    Node::with_children(
                        NodeKind::ListItem {
                            spread,
                            checked: None,
                        },
                        blocks,
                    )
                })
                .collect(),
        )
    }

    #[test]
    fn every_builtin_type_but_anchor_has_a_handler() {
        assert!(builtin(NodeType::Anchor).is_none());
        assert!(builtin(NodeType::Link).is_some());
        assert!(builtin(NodeType::Table).is_some());
    }

    #[test]
    fn empty_link_renders_brackets_and_parens() {
        assert_eq!(render(&Node::link("", None, vec![])), "[]()");
    }

    #[test]
    fn link_hints_are_not_rendered() {
        let link = Node::link("", None, vec![Node::text("text")]).hinted(Hints::with_id("id"));
        assert_eq!(render(&link), "[text]()");
    }

    #[test]
    fn link_title_and_destination() {
        let link = Node::link("http://example.com", Some("a \"b\"".into()), vec![]);
        assert_eq!(render(&link), r#"[](http://example.com "a \"b\"")"#);

        let spaced = Node::link("has space", None, vec![Node::text("x")]);
        assert_eq!(render(&spaced), "[x](<has space>)");
    }

    #[test]
    fn empty_title_is_dropped() {
        let link = Node::link("http://example.com", Some(String::new()), vec![]);
        assert_eq!(render(&link), "[](http://example.com)");
    }

    #[test]
    fn autolinks() {
        let link = Node::link("http://a.com", None, vec![Node::text("http://a.com")]);
        assert_eq!(render(&link), "<http://a.com>");
    }

    #[test]
    fn image_with_title() {
        let image = Node::new(NodeKind::Image {
            url: "img.png".into(),
            title: Some("t".into()),
            alt: "alt".into(),
        });
        assert_eq!(render(&image), r#"![alt](img.png "t")"#);
    }

    #[test]
    fn inline_code_fences_grow_with_content() {
        let code = Node::new(NodeKind::InlineCode {
            value: "a`b".into(),
        });
        assert_eq!(render(&code), "``a`b``");

        let edge = Node::new(NodeKind::InlineCode { value: "`".into() });
        assert_eq!(render(&edge), "`` ` ``");
    }

    #[test]
    fn headings() {
        let heading = Node::with_children(NodeKind::Heading { depth: 2 }, vec![Node::text("Title")]);
        assert_eq!(render(&heading), "## Title");
    }

    #[test]
    fn fenced_code() {
        let code = Node::new(NodeKind::Code {
            lang: Some("js".into()),
            value: "console.log('hello');".into(),
        });
        assert_eq!(render(&code), "```js\nconsole.log('hello');\n```");
    }

    #[test]
    fn blockquote_prefixes_every_line() {
        let quote = Node::with_children(
            NodeKind::Blockquote,
            vec![
                Node::paragraph(vec![Node::text("one\ntwo")]),
                Node::paragraph(vec![Node::text("three")]),
            ],
        );
        assert_eq!(render(&quote), "> one\n> two\n>\n> three");
    }

    #[test]
    fn tight_bullet_list_uses_tab_indent() {
        let list = list_of(
            false,
            false,
            vec![
                vec![Node::paragraph(vec![Node::text("Item 1")])],
                vec![Node::paragraph(vec![Node::text("Item 2")])],
            ],
        );
        assert_eq!(render(&list), "-   Item 1\n-   Item 2");
    }

    #[test]
    fn ordered_list_numbers_increment() {
        let list = list_of(
            true,
            false,
            vec![
                vec![Node::paragraph(vec![Node::text("a")])],
                vec![Node::paragraph(vec![Node::text("b")])],
            ],
        );
        assert_eq!(render(&list), "1.  a\n2.  b");
    }

    #[test]
    fn spread_list_items_are_separated_by_blank_lines() {
        let list = list_of(
            false,
            true,
            vec![
                vec![
                    Node::paragraph(vec![Node::text("a")]),
                    Node::paragraph(vec![Node::text("more")]),
                ],
                vec![Node::paragraph(vec![Node::text("b")])],
            ],
        );
        assert_eq!(render(&list), "-   a\n\n    more\n\n-   b");
    }

    #[test]
    fn list_item_indent_one() {
        let stringifier = Stringifier::new(StringifyOptions {
            bullet: '*',
            list_item_indent: ListItemIndent::One,
            ..StringifyOptions::default()
        });
        let list = list_of(false, false, vec![vec![Node::paragraph(vec![Node::text("x")])]]);
        assert_eq!(stringifier.render(&list), Ok("* x".to_string()));
    }

    #[test]
    fn task_items() {
        let item = Node::with_children(
            NodeKind::ListItem {
                spread: false,
                checked: Some(true),
            },
            vec![Node::paragraph(vec![Node::text("done")])],
        );
        assert_eq!(render(&item), "-   [x] done");
    }

    #[test]
    fn table_cells_escape_pipes() {
        let table = Node::with_children(
            NodeKind::Table {
                align: vec![Align::None],
            },
            vec![
                Node::with_children(
                    NodeKind::TableRow,
                    vec![Node::with_children(NodeKind::TableCell, vec![Node::text("a|b")])],
                ),
                Node::with_children(
                    NodeKind::TableRow,
                    vec![Node::with_children(NodeKind::TableCell, vec![Node::text("c")])],
                ),
            ],
        );
        assert_eq!(render(&table), "| a\\|b |\n| ---- |\n| c    |");
    }

    #[test]
    fn emphasis_marker_follows_options() {
        let stringifier = Stringifier::new(StringifyOptions {
            emphasis: '_',
            ..StringifyOptions::default()
        });
        let em = Node::with_children(NodeKind::Emphasis, vec![Node::text("x")]);
        assert_eq!(stringifier.render(&em), Ok("_x_".to_string()));
    }

    #[test]
    fn breaks_and_rules() {
        assert_eq!(render(&Node::new(NodeKind::Break)), "\\\n");
        assert_eq!(render(&Node::new(NodeKind::ThematicBreak)), "***");
    }
}

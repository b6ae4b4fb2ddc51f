use std::ops::Range;

use pulldown_cmark::{Alignment, CodeBlockKind, Event, LinkType, Tag};

use crate::ast::{Align, Node, NodeKind, Span};

use super::link::has_empty_title;

/// An element that has been opened but not yet closed.
#[derive(Debug)]
struct Frame {
    node: Node,
    /// Whether the finished node belongs in inline content.
    inline: bool,
    /// Children are spliced into the parent on close (tags we do not model).
    transparent: bool,
    /// The last child is a paragraph we synthesized for tight list content.
    implicit_paragraph: bool,
}

impl Frame {
    fn block(node: Node) -> Self {
        Self {
            node,
            inline: false,
            transparent: false,
            implicit_paragraph: false,
        }
    }

    fn inline(node: Node) -> Self {
        Self {
            inline: true,
            ..Self::block(node)
        }
    }

    fn transparent() -> Self {
        Self {
            transparent: true,
            ..Self::block(Node::root(vec![]))
        }
    }
}

/// Folds a pulldown-cmark offset event stream into an owned [`Node`] tree.
///
/// Mirrors the event nesting with a stack of open frames: `Start` pushes,
/// `End` pops and attaches the finished node to its parent.
pub struct TreeBuilder<'s> {
    source: &'s str,
    stack: Vec<Frame>,
}

impl<'s> TreeBuilder<'s> {
    pub fn new(source: &'s str) -> Self {
        let root = Node::root(vec![]).at(Span::new(0, source.len()));
        Self {
            source,
            stack: vec![Frame::block(root)],
        }
    }

    pub fn push(&mut self, event: Event<'_>, range: Range<usize>) {
        let span = Span::from(range);
        match event {
            Event::Start(tag) => self.open(tag, span),
            Event::End(_) => self.close(),
            Event::Text(text) => self.text(&text, span),
            Event::Code(code) => self.append(
                Node::new(NodeKind::InlineCode {
                    value: code.to_string(),
                })
                .at(span),
                true,
            ),
            Event::InlineHtml(html) => self.append(
                Node::new(NodeKind::Html {
                    value: html.to_string(),
                })
                .at(span),
                true,
            ),
            Event::Html(html) => self.html(&html, span),
            Event::SoftBreak => self.text("\n", span),
            Event::HardBreak => self.append(Node::new(NodeKind::Break).at(span), true),
            Event::Rule => self.append(Node::new(NodeKind::ThematicBreak).at(span), false),
            Event::TaskListMarker(checked) => self.mark_task(checked),
            other => log::trace!("ignoring unsupported event {other:?} at {span:?}"),
        }
    }

    pub fn finish(mut self) -> Node {
        // Unbalanced streams should not happen, but never drop content.
        while self.stack.len() > 1 {
            self.close();
        }
        self.stack
            .pop()
            .map(|frame| frame.node)
            .unwrap_or_else(|| Node::root(vec![]))
    }

    fn open(&mut self, tag: Tag<'_>, span: Span) {
        let frame = match tag {
            Tag::Paragraph => {
                self.mark_item_spread();
                Frame::block(Node::paragraph(vec![]).at(span))
            }
            Tag::Heading { level, .. } => Frame::block(
                Node::new(NodeKind::Heading {
                    depth: level as u8,
                })
                .at(span),
            ),
            Tag::BlockQuote(_) => Frame::block(Node::new(NodeKind::Blockquote).at(span)),
            Tag::CodeBlock(kind) => {
                let lang = match kind {
                    CodeBlockKind::Fenced(info) => info
                        .split_whitespace()
                        .next()
                        .map(str::to_string),
                    CodeBlockKind::Indented => None,
                };
                Frame::block(
                    Node::new(NodeKind::Code {
                        lang,
                        value: String::new(),
                    })
                    .at(span),
                )
            }
            Tag::HtmlBlock => Frame::block(
                Node::new(NodeKind::Html {
                    value: String::new(),
                })
                .at(span),
            ),
            Tag::List(start) => Frame::block(
                Node::new(NodeKind::List {
                    ordered: start.is_some(),
                    start,
                    spread: false,
                })
                .at(span),
            ),
            Tag::Item => Frame::block(
                Node::new(NodeKind::ListItem {
                    spread: false,
                    checked: None,
                })
                .at(span),
            ),
            Tag::Table(alignments) => Frame::block(
                Node::new(NodeKind::Table {
                    align: alignments.into_iter().map(convert_alignment).collect(),
                })
                .at(span),
            ),
            Tag::TableHead | Tag::TableRow => Frame::block(Node::new(NodeKind::TableRow).at(span)),
            Tag::TableCell => Frame::block(Node::new(NodeKind::TableCell).at(span)),
            Tag::Emphasis => Frame::inline(Node::new(NodeKind::Emphasis).at(span)),
            Tag::Strong => Frame::inline(Node::new(NodeKind::Strong).at(span)),
            Tag::Strikethrough => Frame::inline(Node::new(NodeKind::Delete).at(span)),
            Tag::Link {
                link_type,
                dest_url,
                title,
                ..
            } => {
                let title = self.link_title(link_type, &title, span);
                Frame::inline(Node::link(dest_url.to_string(), title, vec![]).at(span))
            }
            Tag::Image {
                dest_url, title, ..
            } => Frame::inline(
                Node::new(NodeKind::Image {
                    url: dest_url.to_string(),
                    title: (!title.is_empty()).then(|| title.to_string()),
                    alt: String::new(),
                })
                .at(span),
            ),
            other => {
                log::trace!("flattening unsupported tag {other:?} at {span:?}");
                Frame::transparent()
            }
        };
        self.stack.push(frame);
    }

    fn close(&mut self) {
        if self.stack.len() <= 1 {
            return;
        }
        let Some(frame) = self.stack.pop() else {
            return;
        };

        if frame.transparent {
            for child in frame.node.children {
                let inline = is_inline(&child.kind);
                self.append(child, inline);
            }
            return;
        }

        let mut node = frame.node;
        match &mut node.kind {
            NodeKind::Image { alt, .. } => {
                *alt = node.children.iter().map(Node::text_content).collect();
                node.children.clear();
            }
            NodeKind::Code { value, .. } => {
                if value.ends_with('\n') {
                    value.pop();
                }
            }
            NodeKind::List { spread, .. } => {
                *spread = node
                    .children
                    .iter()
                    .any(|item| matches!(item.kind, NodeKind::ListItem { spread: true, .. }));
            }
            _ => {}
        }
        self.append(node, frame.inline);
    }

    fn text(&mut self, text: &str, span: Span) {
        if let Some(frame) = self.stack.last_mut()
            && let NodeKind::Code { value, .. } = &mut frame.node.kind
        {
            value.push_str(text);
            return;
        }
        self.append(Node::text(text).at(span), true);
    }

    fn html(&mut self, html: &str, span: Span) {
        if let Some(frame) = self.stack.last_mut()
            && let NodeKind::Html { value } = &mut frame.node.kind
        {
            value.push_str(html);
            return;
        }
        self.append(
            Node::new(NodeKind::Html {
                value: html.to_string(),
            })
            .at(span),
            true,
        );
    }

    fn append(&mut self, node: Node, inline: bool) {
        let Some(frame) = self.stack.last_mut() else {
            return;
        };

        let in_item = matches!(frame.node.kind, NodeKind::ListItem { .. });
        if inline && in_item {
            // Tight list items carry inline content without a paragraph.
            if !frame.implicit_paragraph {
                let start = node.position;
                let mut paragraph = Node::paragraph(vec![]);
                paragraph.position = start;
                frame.node.children.push(paragraph);
                frame.implicit_paragraph = true;
            }
            if let Some(paragraph) = frame.node.children.last_mut() {
                if let (Some(outer), Some(inner)) = (paragraph.position, node.position) {
                    paragraph.position = Some(outer.cover(inner));
                }
                push_merged(&mut paragraph.children, node);
            }
            return;
        }

        if !inline {
            frame.implicit_paragraph = false;
        }
        push_merged(&mut frame.node.children, node);
    }

    fn link_title(&self, link_type: LinkType, title: &str, span: Span) -> Option<String> {
        if !title.is_empty() {
            return Some(title.to_string());
        }
        let explicit_empty = link_type == LinkType::Inline
            && span.slice(self.source).is_some_and(has_empty_title);
        explicit_empty.then(String::new)
    }

    fn mark_item_spread(&mut self) {
        if let Some(frame) = self.stack.last_mut()
            && let NodeKind::ListItem { spread, .. } = &mut frame.node.kind
        {
            *spread = true;
            frame.implicit_paragraph = false;
        }
    }

    fn mark_task(&mut self, is_checked: bool) {
        for frame in self.stack.iter_mut().rev() {
            if let NodeKind::ListItem { checked, .. } = &mut frame.node.kind {
                *checked = Some(is_checked);
                return;
            }
        }
    }
}

/// Appends `node`, folding it into a directly preceding text node when both
/// are text.
fn push_merged(children: &mut Vec<Node>, node: Node) {
    if let NodeKind::Text { value: incoming } = &node.kind
        && let Some(last) = children.last_mut()
        && let NodeKind::Text { value } = &mut last.kind
    {
        value.push_str(incoming);
        if let (Some(a), Some(b)) = (last.position, node.position) {
            last.position = Some(a.cover(b));
        }
        return;
    }
    children.push(node);
}

fn is_inline(kind: &NodeKind) -> bool {
    matches!(
        kind,
        NodeKind::Text { .. }
            | NodeKind::Emphasis
            | NodeKind::Strong
            | NodeKind::Delete
            | NodeKind::InlineCode { .. }
            | NodeKind::Break
            | NodeKind::Link { .. }
            | NodeKind::Image { .. }
            | NodeKind::Anchor(_)
    )
}

fn convert_alignment(alignment: Alignment) -> Align {
    match alignment {
        Alignment::None => Align::None,
        Alignment::Left => Align::Left,
        Alignment::Center => Align::Center,
        Alignment::Right => Align::Right,
    }
}

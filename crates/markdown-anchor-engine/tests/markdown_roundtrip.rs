//! Documents without anchors come back in the stringifier's house style.

use markdown_anchor_engine::{ListItemIndent, Pipeline, PipelineOptions, StringifyOptions};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn process_with(options: PipelineOptions, source: &str) -> String {
    Pipeline::new(options)
        .expect("valid options")
        .with_default_plugins()
        .process(source)
        .expect("document stringifies")
}

fn process(source: &str) -> String {
    process_with(PipelineOptions::default(), source)
}

#[rstest]
#[case::heading_and_inline("# Title\n\nSome *em* and **strong** text.")]
#[case::blockquote("> quoted\n> lines")]
#[case::fenced_code("```rust\nfn main() {}\n```")]
#[case::ordered_list("1.  one\n2.  two")]
#[case::bullet_list("-   one\n-   two")]
#[case::strikethrough("~~gone~~")]
#[case::inline_code("Use `cargo` here.")]
#[case::autolink("<http://example.com>")]
#[case::intraword_underscores("snake_case_name")]
#[case::escaped_heading("\\# not a heading")]
#[case::link_with_title("[docs](http://example.com \"Docs\")")]
fn canonical_markdown_is_unchanged(#[case] source: &str) {
    assert_eq!(process(source), format!("{source}\n"));
}

#[rstest]
#[case::rule("---", "***\n")]
#[case::one_space_bullets("- a\n- b", "-   a\n-   b\n")]
#[case::star_bullets("* a", "-   a\n")]
#[case::underscore_emphasis("_em_", "*em*\n")]
#[case::hard_break("one  \ntwo", "one\\\ntwo\n")]
#[case::trailing_blank_lines("text\n\n\n", "text\n")]
fn markdown_is_normalised(#[case] source: &str, #[case] expected: &str) {
    assert_eq!(process(source), expected);
}

#[test]
fn empty_document_is_empty() {
    assert_eq!(process(""), "");
}

#[test]
fn style_options_are_honoured() {
    let options = PipelineOptions {
        stringify: StringifyOptions {
            bullet: '*',
            emphasis: '_',
            list_item_indent: ListItemIndent::One,
        },
        ..PipelineOptions::default()
    };
    assert_eq!(
        process_with(options, "- *a* [](){#x}\n- b"),
        "* _a_ [](){#x}\n* b\n"
    );
}

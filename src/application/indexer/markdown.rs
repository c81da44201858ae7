use comrak::{
    Arena, Options,
    nodes::{AstNode, NodeValue},
    parse_document,
};

use super::RawHeading;

fn parse_options() -> Options<'static> {
    let mut options = Options::default();
    options.extension.strikethrough = true;
    options.extension.table = true;
    options.extension.front_matter_delimiter = Some("---".to_string());
    options
}

pub(super) fn collect_headings(source: &str) -> Vec<RawHeading> {
    let arena = Arena::new();
    let options = parse_options();
    let root = parse_document(&arena, source, &options);

    let mut headings = Vec::new();
    visit(root, &mut headings);
    headings
}

fn visit<'a>(node: &'a AstNode<'a>, headings: &mut Vec<RawHeading>) {
    if let Some(level) = heading_level(node) {
        headings.push(RawHeading {
            level,
            text: collect_inline_text(node),
        });
        return;
    }

    let mut child = node.first_child();
    while let Some(next) = child {
        visit(next, headings);
        child = next.next_sibling();
    }
}

fn heading_level(node: &AstNode<'_>) -> Option<u8> {
    let data = node.data.borrow();
    match &data.value {
        NodeValue::Heading(heading) => Some(heading.level),
        _ => None,
    }
}

fn collect_inline_text(node: &AstNode<'_>) -> String {
    fn walk(node: &AstNode<'_>, buffer: &mut String) {
        {
            let data = node.data.borrow();
            match &data.value {
                NodeValue::Text(text) => buffer.push_str(text),
                NodeValue::Code(code) => buffer.push_str(&code.literal),
                NodeValue::LineBreak | NodeValue::SoftBreak => buffer.push(' '),
                _ => {}
            }
        }
        let mut child = node.first_child();
        while let Some(next) = child {
            walk(next, buffer);
            child = next.next_sibling();
        }
    }

    let mut text = String::new();
    let mut child = node.first_child();
    while let Some(next) = child {
        walk(next, &mut text);
        child = next.next_sibling();
    }
    text
}

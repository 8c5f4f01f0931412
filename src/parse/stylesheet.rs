//! CSS rule trees, shaped like postcss output: `root` holding `rule`,
//! `atrule`, `decl` and `comment` nodes.

use super::{describe_first_error, node_text, syntax_tree, FormatParser, ParseError, Representation};
use crate::classify::ContentCategory;
use crate::graph::{ArrayRef, ObjectRef, Value};
use tracing::debug;
use tree_sitter::Node;

pub struct StylesheetParser;

impl FormatParser for StylesheetParser {
    fn category(&self) -> ContentCategory {
        ContentCategory::Stylesheet
    }

    fn parse(&self, content: &str) -> Result<Representation, ParseError> {
        let tree = syntax_tree(tree_sitter_css::LANGUAGE.into(), content, ContentCategory::Stylesheet)?;
        let root = tree.root_node();
        if root.has_error() {
            return Err(ParseError::new(
                ContentCategory::Stylesheet,
                describe_first_error(root, content),
            ));
        }

        let nodes = convert_block(root, content);
        let sheet = ObjectRef::new().with("type", "root").with("nodes", nodes);
        Ok(Representation::RuleTree(Value::Object(sheet)))
    }
}

/// Blocks whose statements still have to be converted, each paired with the
/// `nodes` array that receives them.
type Pending<'a> = Vec<(Node<'a>, ArrayRef)>;

/// Convert the statements inside `container` and every block nested below
/// it. Nested blocks go on a work list, so nesting depth never grows the
/// call stack.
fn convert_block(container: Node<'_>, source: &str) -> ArrayRef {
    let nodes = ArrayRef::new();
    let mut pending: Pending<'_> = vec![(container, nodes.clone())];
    while let Some((block, target)) = pending.pop() {
        let mut cursor = block.walk();
        for child in block.named_children(&mut cursor) {
            if let Some(converted) = convert_statement(child, source, &mut pending) {
                target.push(converted);
            }
        }
    }
    nodes
}

fn convert_statement<'a>(
    node: Node<'a>,
    source: &str,
    pending: &mut Pending<'a>,
) -> Option<ObjectRef> {
    match node.kind() {
        "rule_set" => Some(rule(node, source, pending)),
        "declaration" => Some(declaration(node, source)),
        "comment" => {
            let text = node_text(node, source);
            let inner = text
                .strip_prefix("/*")
                .map(|t| t.strip_suffix("*/").unwrap_or(t))
                .unwrap_or(text);
            Some(ObjectRef::new().with("type", "comment").with("text", inner.trim()))
        }
        "keyframe_block" => Some(keyframe(node, source, pending)),
        "keyframe_block_list" => None,
        kind if kind == "at_rule" || kind.ends_with("_statement") => {
            Some(at_rule(node, source, pending))
        }
        other => {
            debug!(kind = other, "Ignoring stylesheet node");
            None
        }
    }
}

fn rule<'a>(node: Node<'a>, source: &str, pending: &mut Pending<'a>) -> ObjectRef {
    let mut selector = "";
    let nodes = ArrayRef::new();
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        match child.kind() {
            "selectors" => selector = node_text(child, source),
            "block" => pending.push((child, nodes.clone())),
            _ => {}
        }
    }
    ObjectRef::new()
        .with("type", "rule")
        .with("selector", selector.trim())
        .with("nodes", nodes)
}

fn keyframe<'a>(node: Node<'a>, source: &str, pending: &mut Pending<'a>) -> ObjectRef {
    let mut selector = String::new();
    let nodes = ArrayRef::new();
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if child.kind() == "block" {
            pending.push((child, nodes.clone()));
        } else {
            selector.push_str(node_text(child, source));
        }
    }
    ObjectRef::new()
        .with("type", "rule")
        .with("selector", selector.trim())
        .with("nodes", nodes)
}

fn declaration(node: Node<'_>, source: &str) -> ObjectRef {
    let mut prop = "";
    let mut value_start = None;
    let mut value_end = node.end_byte();
    let mut important = false;

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match child.kind() {
            "property_name" => prop = node_text(child, source),
            ":" if value_start.is_none() => value_start = Some(child.end_byte()),
            "important" => {
                important = true;
                value_end = value_end.min(child.start_byte());
            }
            ";" => value_end = value_end.min(child.start_byte()),
            _ => {}
        }
    }

    let value = value_start
        .and_then(|start| source.get(start..value_end))
        .unwrap_or("")
        .trim();
    ObjectRef::new()
        .with("type", "decl")
        .with("prop", prop)
        .with("value", value)
        .with("important", important)
}

fn at_rule<'a>(node: Node<'a>, source: &str, pending: &mut Pending<'a>) -> ObjectRef {
    let mut cursor = node.walk();
    let children: Vec<Node<'_>> = node.children(&mut cursor).collect();

    let keyword = children.first().map(|c| node_text(*c, source)).unwrap_or("");
    let name = keyword.trim_start_matches('@');
    let params_start = children.first().map(|c| c.end_byte()).unwrap_or(node.start_byte());

    let body = children
        .iter()
        .find(|c| matches!(c.kind(), "block" | "keyframe_block_list"));
    let params_end = match body {
        Some(b) => b.start_byte(),
        None => children
            .iter()
            .rev()
            .find(|c| c.kind() == ";")
            .map(|c| c.start_byte())
            .unwrap_or(node.end_byte()),
    };
    let params = source
        .get(params_start..params_end.max(params_start))
        .unwrap_or("")
        .trim();

    let at = ObjectRef::new()
        .with("type", "atrule")
        .with("name", name)
        .with("params", params);
    if let Some(body) = body {
        let nodes = ArrayRef::new();
        pending.push((*body, nodes.clone()));
        at.insert("nodes", nodes);
    }
    at
}

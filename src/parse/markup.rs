//! HTML document trees.
//!
//! Markup parsing is total: tree-sitter recovers from unclosed or stray tags
//! by inserting error nodes, and those are flattened into their parent here,
//! so malformed input still yields a best-effort tree.

use super::{node_text, syntax_tree, FormatParser, ParseError, Representation};
use crate::classify::ContentCategory;
use crate::graph::{ArrayRef, ObjectRef, Value};
use tracing::debug;
use tree_sitter::Node;

pub struct MarkupParser;

impl FormatParser for MarkupParser {
    fn category(&self) -> ContentCategory {
        ContentCategory::Markup
    }

    fn parse(&self, content: &str) -> Result<Representation, ParseError> {
        Ok(Representation::Document(parse_document(content)))
    }
}

/// Build the document tree for `source`. Never fails.
pub fn parse_document(source: &str) -> Value {
    let children = ArrayRef::new();
    let root = ObjectRef::new()
        .with("type", "root")
        .with("children", children.clone());

    let tree = match syntax_tree(tree_sitter_html::LANGUAGE.into(), source, ContentCategory::Markup) {
        Ok(tree) => tree,
        Err(e) => {
            debug!(error = %e, "Markup grammar produced no tree, returning empty document");
            return Value::Object(root);
        }
    };

    // Explicit work list instead of recursion; children are pushed in reverse
    // so each target array is filled in document order.
    let mut work: Vec<(Node<'_>, ArrayRef)> = Vec::new();
    push_children(tree.root_node(), &children, &mut work);

    while let Some((node, target)) = work.pop() {
        match node.kind() {
            "element" | "script_element" | "style_element" => {
                let element = element_node(node, source);
                let element_children = ArrayRef::new();
                element.insert("children", element_children.clone());
                target.push(element);
                push_content(node, &element_children, &mut work);
            }
            "text" | "raw_text" | "entity" => {
                target.push(ObjectRef::new().with("type", "text").with("data", node_text(node, source)));
            }
            "comment" => {
                let text = node_text(node, source);
                let data = text
                    .strip_prefix("<!--")
                    .map(|t| t.strip_suffix("-->").unwrap_or(t))
                    .unwrap_or(text);
                target.push(ObjectRef::new().with("type", "comment").with("data", data));
            }
            "doctype" => {
                let text = node_text(node, source);
                let data = text.trim_start_matches('<').trim_end_matches('>');
                target.push(ObjectRef::new().with("type", "directive").with("data", data));
            }
            "start_tag" | "self_closing_tag" => {
                // Orphaned tag inside an error region: keep it as an empty element.
                let element = tag_element(node, source);
                element.insert("children", ArrayRef::new());
                target.push(element);
            }
            "end_tag" | "erroneous_end_tag" => {}
            _ => push_children(node, &target, &mut work),
        }
    }

    Value::Object(root)
}

fn push_children<'t>(node: Node<'t>, target: &ArrayRef, work: &mut Vec<(Node<'t>, ArrayRef)>) {
    let mut cursor = node.walk();
    let children: Vec<Node<'t>> = node.named_children(&mut cursor).collect();
    for child in children.into_iter().rev() {
        work.push((child, target.clone()));
    }
}

/// Like [`push_children`] but skips the element's own opening and closing tags.
fn push_content<'t>(node: Node<'t>, target: &ArrayRef, work: &mut Vec<(Node<'t>, ArrayRef)>) {
    let mut cursor = node.walk();
    let children: Vec<Node<'t>> = node
        .named_children(&mut cursor)
        .filter(|c| !matches!(c.kind(), "start_tag" | "self_closing_tag" | "end_tag"))
        .collect();
    for child in children.into_iter().rev() {
        work.push((child, target.clone()));
    }
}

fn element_node(node: Node<'_>, source: &str) -> ObjectRef {
    let mut cursor = node.walk();
    let tag = node
        .named_children(&mut cursor)
        .find(|c| matches!(c.kind(), "start_tag" | "self_closing_tag"));
    match tag {
        Some(tag) => tag_element(tag, source),
        None => ObjectRef::new()
            .with("type", "element")
            .with("name", "")
            .with("attribs", ObjectRef::new()),
    }
}

fn tag_element(tag: Node<'_>, source: &str) -> ObjectRef {
    let mut name = String::new();
    let attribs = ObjectRef::new();
    let mut cursor = tag.walk();
    for child in tag.named_children(&mut cursor) {
        match child.kind() {
            "tag_name" => name = node_text(child, source).to_ascii_lowercase(),
            "attribute" => {
                let (key, value) = attribute(child, source);
                if !key.is_empty() {
                    attribs.insert(key, value);
                }
            }
            _ => {}
        }
    }
    ObjectRef::new()
        .with("type", "element")
        .with("name", name)
        .with("attribs", attribs)
}

fn attribute(node: Node<'_>, source: &str) -> (String, String) {
    let mut key = String::new();
    let mut value = String::new();
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        match child.kind() {
            "attribute_name" => key = node_text(child, source).to_ascii_lowercase(),
            "attribute_value" => value = node_text(child, source).to_string(),
            "quoted_attribute_value" => {
                let mut inner = child.walk();
                value = child
                    .named_children(&mut inner)
                    .find(|c| c.kind() == "attribute_value")
                    .map(|c| node_text(c, source).to_string())
                    .unwrap_or_default();
            }
            _ => {}
        }
    }
    (key, value)
}

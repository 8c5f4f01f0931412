//! JavaScript / TypeScript / JSX syntax trees.
//!
//! The TSX grammar accepts plain JavaScript, JSX and TypeScript, so it is the
//! default. Files with a `.ts`-family extension use the TypeScript grammar,
//! which allows `<T>expr` casts that TSX would read as JSX.
//!
//! Output is shaped like a Babel `File`: a `program` tree plus a top-level
//! `comments` list. The entries of `comments` are the very same nodes that
//! appear inside the tree, so they are aliases of each other.

use super::{describe_first_error, node_text, syntax_tree, FormatParser, ParseError, Representation};
use crate::classify::ContentCategory;
use crate::graph::{ArrayRef, ObjectRef, Value};
use tree_sitter::{Node, Tree};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptDialect {
    Tsx,
    TypeScript,
}

impl ScriptDialect {
    pub fn for_path(path: &str) -> Self {
        let lower = path.to_ascii_lowercase();
        if [".ts", ".mts", ".cts"].iter().any(|ext| lower.ends_with(ext)) {
            ScriptDialect::TypeScript
        } else {
            ScriptDialect::Tsx
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScriptDialect::Tsx => "tsx",
            ScriptDialect::TypeScript => "typescript",
        }
    }

    fn language(&self) -> tree_sitter::Language {
        match self {
            ScriptDialect::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
            ScriptDialect::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
        }
    }
}

pub struct ScriptParser {
    dialect: ScriptDialect,
}

impl ScriptParser {
    pub fn new(dialect: ScriptDialect) -> Self {
        Self { dialect }
    }
}

impl FormatParser for ScriptParser {
    fn category(&self) -> ContentCategory {
        ContentCategory::Script
    }

    fn parse(&self, content: &str) -> Result<Representation, ParseError> {
        let tree = syntax_tree(self.dialect.language(), content, ContentCategory::Script)?;
        let root = tree.root_node();
        if root.has_error() {
            return Err(ParseError::new(
                ContentCategory::Script,
                describe_first_error(root, content),
            ));
        }

        let (program, comments) = convert_tree(&tree, content);
        let file = ObjectRef::new()
            .with("type", "File")
            .with("dialect", self.dialect.as_str())
            .with("program", program)
            .with("comments", comments);
        Ok(Representation::SyntaxTree(Value::Object(file)))
    }
}

const RESERVED_KEYS: &[&str] = &["type", "start", "end", "loc", "field", "text", "children"];

fn position(point: tree_sitter::Point) -> ObjectRef {
    ObjectRef::new()
        .with("line", point.row + 1)
        .with("column", point.column)
}

fn make_node(node: Node<'_>, source: &str, field: Option<&str>) -> ObjectRef {
    let obj = ObjectRef::new()
        .with("type", node.kind())
        .with("start", node.start_byte())
        .with("end", node.end_byte())
        .with(
            "loc",
            ObjectRef::new()
                .with("start", position(node.start_position()))
                .with("end", position(node.end_position())),
        );
    if let Some(field) = field {
        obj.insert("field", field);
    }
    if node.named_child_count() == 0 {
        obj.insert("text", node_text(node, source));
    }
    obj
}

/// Convert the tree without recursion: a long operator chain can nest
/// thousands of levels deep.
fn convert_tree(tree: &Tree, source: &str) -> (ObjectRef, ArrayRef) {
    let comments = ArrayRef::new();
    let mut cursor = tree.walk();
    let root = make_node(cursor.node(), source, None);

    // Ancestors whose children are being visited, with their child arrays.
    let mut parents: Vec<(ObjectRef, ArrayRef)> = Vec::new();
    let mut current = root.clone();

    loop {
        let node = cursor.node();
        let descend = node.is_named() && node.named_child_count() > 0;
        if descend && cursor.goto_first_child() {
            let children = ArrayRef::new();
            current.insert("children", children.clone());
            parents.push((current.clone(), children));
        } else {
            loop {
                if cursor.goto_next_sibling() {
                    break;
                }
                if parents.is_empty() || !cursor.goto_parent() {
                    return (root, comments);
                }
                parents.pop();
            }
        }

        let Some((parent, children)) = parents.last() else {
            return (root, comments);
        };
        let node = cursor.node();
        if node.is_named() {
            let obj = make_node(node, source, cursor.field_name());
            if node.kind() == "comment" {
                comments.push(obj.clone());
            }
            children.push(obj.clone());
            current = obj;
        } else if let Some(field) = cursor.field_name() {
            // Anonymous tokens only matter when they carry a role, e.g. an operator.
            if !RESERVED_KEYS.contains(&field) {
                parent.insert(field, node_text(node, source));
            }
        }
    }
}

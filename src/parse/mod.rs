//! Category dispatch onto the per-format structural parsers.
//!
//! Every [`ContentCategory`] maps to exactly one [`FormatParser`], or to none
//! for `Media`/`Unsupported`, in which case [`dispatch`] reports the file as
//! skipped without touching its content.

pub mod markup;
pub mod prose;
pub mod script;
pub mod structured;
pub mod stylesheet;

use crate::classify::ContentCategory;
use crate::graph::Value;
use crate::schema::{SchemaNode, SchemaOptions};
use thiserror::Error;
use tree_sitter::{Language, Node, Parser, Tree};

pub use markup::MarkupParser;
pub use prose::ProseParser;
pub use script::{ScriptDialect, ScriptParser};
pub use structured::StructuredDataParser;
pub use stylesheet::StylesheetParser;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{category} parse error: {message}")]
pub struct ParseError {
    pub category: ContentCategory,
    pub message: String,
}

impl ParseError {
    pub fn new(category: ContentCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
        }
    }
}

/// Parsed shape of a file, one variant per parseable category family.
#[derive(Debug, Clone)]
pub enum Representation {
    /// Script syntax tree.
    SyntaxTree(Value),
    /// Derived schema of a structured-data document.
    Schema(SchemaNode),
    /// Markup document tree (HTML, or prose rendered to HTML).
    Document(Value),
    /// Stylesheet rule tree.
    RuleTree(Value),
}

impl Representation {
    /// Key under which the representation appears in a serialized record.
    pub fn output_key(&self) -> &'static str {
        match self {
            Representation::SyntaxTree(_) | Representation::Schema(_) => "ast",
            Representation::Document(_) => "dom",
            Representation::RuleTree(_) => "cssAst",
        }
    }

    pub fn to_graph(&self) -> Value {
        match self {
            Representation::SyntaxTree(v)
            | Representation::Document(v)
            | Representation::RuleTree(v) => v.clone(),
            Representation::Schema(schema) => schema.to_document_graph(),
        }
    }
}

/// Capability shared by all structural parsers.
pub trait FormatParser: Send + Sync {
    fn category(&self) -> ContentCategory;

    fn parse(&self, content: &str) -> Result<Representation, ParseError>;
}

/// Options that influence parser output.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParseOptions {
    pub schema: SchemaOptions,
}

/// Result of dispatching one file.
#[derive(Debug, Clone)]
pub enum ParseOutcome {
    Parsed(Representation),
    Skipped { reason: String },
}

/// The parser responsible for `category`, or `None` for categories that are
/// never parsed. `path` selects the script dialect.
pub fn parser_for(
    category: ContentCategory,
    path: &str,
    options: &ParseOptions,
) -> Option<Box<dyn FormatParser>> {
    match category {
        ContentCategory::Script => Some(Box::new(ScriptParser::new(ScriptDialect::for_path(path)))),
        ContentCategory::StructuredData => Some(Box::new(StructuredDataParser::new(options.schema))),
        ContentCategory::Markup => Some(Box::new(MarkupParser)),
        ContentCategory::Stylesheet => Some(Box::new(StylesheetParser)),
        ContentCategory::Prose => Some(Box::new(ProseParser)),
        ContentCategory::Media | ContentCategory::Unsupported => None,
    }
}

/// Reason recorded for a category that has no parser.
pub fn skip_reason(category: ContentCategory) -> &'static str {
    match category {
        ContentCategory::Media => "Binary or media file",
        _ => "Unsupported file type",
    }
}

/// Route `content` to the parser for `category`.
pub fn dispatch(
    category: ContentCategory,
    path: &str,
    content: &str,
    options: &ParseOptions,
) -> Result<ParseOutcome, ParseError> {
    match parser_for(category, path, options) {
        Some(parser) => parser.parse(content).map(ParseOutcome::Parsed),
        None => Ok(ParseOutcome::Skipped {
            reason: skip_reason(category).to_string(),
        }),
    }
}

/// Run a tree-sitter grammar over `source`.
pub(crate) fn syntax_tree(
    language: Language,
    source: &str,
    category: ContentCategory,
) -> Result<Tree, ParseError> {
    let mut parser = Parser::new();
    parser
        .set_language(&language)
        .map_err(|e| ParseError::new(category, format!("grammar unavailable: {e}")))?;
    parser
        .parse(source, None)
        .ok_or_else(|| ParseError::new(category, "parser produced no tree"))
}

/// Describe the first syntax error below `root`, in document order.
pub(crate) fn describe_first_error(root: Node<'_>, source: &str) -> String {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.is_error() || node.is_missing() {
            let pos = node.start_position();
            let (line, column) = (pos.row + 1, pos.column + 1);
            return if node.is_missing() {
                format!("missing `{}` at line {line}, column {column}", node.kind())
            } else {
                let snippet: String = node_text(node, source).chars().take(40).collect();
                format!("unexpected `{snippet}` at line {line}, column {column}")
            };
        }
        if node.has_error() {
            let mut cursor = node.walk();
            let children: Vec<Node<'_>> = node.children(&mut cursor).collect();
            stack.extend(children.into_iter().rev());
        }
    }
    "syntax error".to_string()
}

pub(crate) fn node_text<'s>(node: Node<'_>, source: &'s str) -> &'s str {
    source.get(node.byte_range()).unwrap_or("")
}

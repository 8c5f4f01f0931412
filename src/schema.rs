//! Minimal type schema inference for JSON documents.
//!
//! Objects are described key by key, recursively. Arrays and scalars stop the
//! recursion: an array is just `array`, unless
//! [`SchemaOptions::describe_array_items`] asks for the first element's shape.
//!
//! Documents may nest thousands of levels deep. Every recursive walk here runs
//! under [`stacker::maybe_grow`], which moves onto a fresh stack segment
//! before the current one runs out.

use crate::graph::{ObjectRef, Value};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Headroom left on the stack before a walk switches to a new segment.
const STACK_RED_ZONE: usize = 64 * 1024;
/// Size of each new segment.
const STACK_SEGMENT: usize = 1024 * 1024;

fn deep<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(STACK_RED_ZONE, STACK_SEGMENT, f)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaKind {
    Object,
    Array,
    String,
    Number,
    Boolean,
    Null,
    /// Shape of a value that is not there, e.g. the element of an empty array.
    Undefined,
}

impl SchemaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaKind::Object => "object",
            SchemaKind::Array => "array",
            SchemaKind::String => "string",
            SchemaKind::Number => "number",
            SchemaKind::Boolean => "boolean",
            SchemaKind::Null => "null",
            SchemaKind::Undefined => "undefined",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaNode {
    pub kind: SchemaKind,
    /// Present only for `object`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, SchemaNode>>,
    /// Present only for `array` when item description is enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<SchemaNode>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaOptions {
    #[serde(default)]
    pub describe_array_items: bool,
}

impl SchemaNode {
    fn leaf(kind: SchemaKind) -> Self {
        Self {
            kind,
            properties: None,
            items: None,
        }
    }

    pub fn property(&self, key: &str) -> Option<&SchemaNode> {
        self.properties.as_ref().and_then(|p| p.get(key))
    }

    /// A JSON value that has exactly this shape.
    pub fn example_value(&self) -> serde_json::Value {
        deep(|| self.example_value_here())
    }

    fn example_value_here(&self) -> serde_json::Value {
        match self.kind {
            SchemaKind::Object => serde_json::Value::Object(
                self.properties
                    .iter()
                    .flatten()
                    .map(|(k, v)| (k.clone(), v.example_value()))
                    .collect(),
            ),
            SchemaKind::Array => match self.items.as_deref() {
                Some(item) if item.kind != SchemaKind::Undefined => {
                    serde_json::Value::Array(vec![item.example_value()])
                }
                _ => serde_json::Value::Array(Vec::new()),
            },
            SchemaKind::String => serde_json::Value::String(String::new()),
            SchemaKind::Number => serde_json::Value::from(0),
            SchemaKind::Boolean => serde_json::Value::Bool(false),
            SchemaKind::Null | SchemaKind::Undefined => serde_json::Value::Null,
        }
    }

    pub fn to_graph(&self) -> Value {
        deep(|| {
            let node = ObjectRef::new().with("kind", self.kind.as_str());
            if let Some(properties) = &self.properties {
                node.insert("properties", properties_graph(properties));
            }
            if let Some(items) = &self.items {
                node.insert("items", items.to_graph());
            }
            Value::Object(node)
        })
    }

    /// Graph recorded for a whole document. An object root is rendered as its
    /// property map, key to child node, without the enclosing `kind`. Any other
    /// root is rendered as its own node, e.g. `{"kind":"array"}`.
    pub fn to_document_graph(&self) -> Value {
        match (&self.kind, &self.properties) {
            (SchemaKind::Object, Some(properties)) => properties_graph(properties),
            (SchemaKind::Object, None) => Value::Object(ObjectRef::new()),
            _ => self.to_graph(),
        }
    }
}

fn properties_graph(properties: &BTreeMap<String, SchemaNode>) -> Value {
    let props = ObjectRef::new();
    for (key, child) in properties {
        props.insert(key.clone(), child.to_graph());
    }
    Value::Object(props)
}

impl Drop for SchemaNode {
    fn drop(&mut self) {
        let properties = self.properties.take();
        let items = self.items.take();
        if properties.is_some() || items.is_some() {
            deep(move || {
                drop(properties);
                drop(items);
            });
        }
    }
}

/// Derive the schema of `value`.
pub fn derive_schema(value: &serde_json::Value, options: SchemaOptions) -> SchemaNode {
    deep(|| derive_here(value, options))
}

fn derive_here(value: &serde_json::Value, options: SchemaOptions) -> SchemaNode {
    match value {
        serde_json::Value::Object(map) => SchemaNode {
            kind: SchemaKind::Object,
            properties: Some(
                map.iter()
                    .map(|(k, v)| (k.clone(), derive_schema(v, options)))
                    .collect(),
            ),
            items: None,
        },
        serde_json::Value::Array(elements) => SchemaNode {
            kind: SchemaKind::Array,
            properties: None,
            items: options.describe_array_items.then(|| {
                Box::new(match elements.first() {
                    Some(first) => derive_schema(first, options),
                    None => SchemaNode::leaf(SchemaKind::Undefined),
                })
            }),
        },
        serde_json::Value::String(_) => SchemaNode::leaf(SchemaKind::String),
        serde_json::Value::Number(_) => SchemaNode::leaf(SchemaKind::Number),
        serde_json::Value::Bool(_) => SchemaNode::leaf(SchemaKind::Boolean),
        serde_json::Value::Null => SchemaNode::leaf(SchemaKind::Null),
    }
}

/// Drop a parsed document without recursing through its nesting.
pub fn dispose(value: serde_json::Value) {
    let mut work = vec![value];
    while let Some(value) = work.pop() {
        match value {
            serde_json::Value::Array(items) => work.extend(items),
            serde_json::Value::Object(map) => work.extend(map.into_iter().map(|(_, v)| v)),
            _ => {}
        }
    }
}

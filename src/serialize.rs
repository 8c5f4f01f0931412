//! Cycle-safe JSON rendering of a [`Value`] graph.
//!
//! Every array and object is tracked by identity for the duration of one call.
//! The first time a container is reached it is rendered in full; every later
//! occurrence of the same container (a cycle, or plain aliasing) is replaced
//! by [`CIRCULAR_SENTINEL`]. Scalars are never tracked. Each container is
//! expanded at most once, so rendering is linear in the graph size.
//!
//! Traversal keeps its open containers on an explicit stack: a syntax tree
//! tens of thousands of levels deep renders without growing the call stack.

use crate::graph::{NodeId, Value};
use serde_json::ser::{CompactFormatter, Formatter, PrettyFormatter};
use serde_json::Map;
use std::collections::HashSet;
use std::io::{self, Write};

/// Marker emitted in place of an already-rendered container.
pub const CIRCULAR_SENTINEL: &str = "[Circular]";

/// Remaining children of a container that is being rendered.
enum Children {
    Array(std::vec::IntoIter<Value>),
    Object(std::vec::IntoIter<(String, Value)>),
}

impl Children {
    /// Next child, with its key when the container is an object.
    fn next(&mut self) -> Option<(Option<String>, Value)> {
        match self {
            Children::Array(items) => items.next().map(|item| (None, item)),
            Children::Object(entries) => entries.next().map(|(key, item)| (Some(key), item)),
        }
    }
}

enum Visit {
    Scalar,
    Repeat,
    Open(Children),
}

/// Mark `value` as seen and snapshot its children on first visit.
fn visit(seen: &mut HashSet<NodeId>, value: &Value) -> Visit {
    match value {
        Value::Array(array) if seen.insert(array.id()) => Visit::Open(Children::Array(array.items().into_iter())),
        Value::Object(object) if seen.insert(object.id()) => {
            Visit::Open(Children::Object(object.entries().into_iter()))
        }
        Value::Array(_) | Value::Object(_) => Visit::Repeat,
        _ => Visit::Scalar,
    }
}

struct Frame {
    children: Children,
    first: bool,
}

fn write_graph<W: Write, F: Formatter>(
    mut writer: W,
    mut formatter: F,
    root: &Value,
) -> Result<(), serde_json::Error> {
    let mut seen = HashSet::new();
    let mut stack: Vec<Frame> = Vec::new();
    if let Some(frame) = write_value(&mut writer, &mut formatter, &mut seen, root)? {
        stack.push(frame);
    }

    while let Some(frame) = stack.last_mut() {
        let first = std::mem::replace(&mut frame.first, false);
        let Some((key, item)) = frame.children.next() else {
            if let Some(done) = stack.pop() {
                match done.children {
                    Children::Array(_) => formatter.end_array(&mut writer),
                    Children::Object(_) => formatter.end_object(&mut writer),
                }
                .map_err(serde_json::Error::io)?;
            }
            end_value(&mut writer, &mut formatter, stack.last())?;
            continue;
        };

        match key {
            None => formatter
                .begin_array_value(&mut writer, first)
                .map_err(serde_json::Error::io)?,
            Some(key) => {
                formatter
                    .begin_object_key(&mut writer, first)
                    .map_err(serde_json::Error::io)?;
                serde_json::to_writer(&mut writer, &key)?;
                formatter
                    .end_object_key(&mut writer)
                    .map_err(serde_json::Error::io)?;
                formatter
                    .begin_object_value(&mut writer)
                    .map_err(serde_json::Error::io)?;
            }
        }
        match write_value(&mut writer, &mut formatter, &mut seen, &item)? {
            Some(frame) => stack.push(frame),
            None => end_value(&mut writer, &mut formatter, stack.last())?,
        }
    }
    Ok(())
}

/// Write a scalar or sentinel, or open a container and return its frame.
fn write_value<W: Write, F: Formatter>(
    writer: &mut W,
    formatter: &mut F,
    seen: &mut HashSet<NodeId>,
    value: &Value,
) -> Result<Option<Frame>, serde_json::Error> {
    match visit(seen, value) {
        Visit::Open(children) => {
            match children {
                Children::Array(_) => formatter.begin_array(writer),
                Children::Object(_) => formatter.begin_object(writer),
            }
            .map_err(serde_json::Error::io)?;
            return Ok(Some(Frame {
                children,
                first: true,
            }));
        }
        Visit::Repeat => serde_json::to_writer(&mut *writer, CIRCULAR_SENTINEL)?,
        Visit::Scalar => match value {
            Value::Null => formatter.write_null(writer).map_err(serde_json::Error::io)?,
            Value::Bool(b) => formatter.write_bool(writer, *b).map_err(serde_json::Error::io)?,
            Value::Number(n) => serde_json::to_writer(&mut *writer, n)?,
            Value::String(s) => serde_json::to_writer(&mut *writer, s)?,
            Value::Array(_) | Value::Object(_) => {}
        },
    }
    Ok(None)
}

/// Close the element just written inside `parent`, if any.
fn end_value<W: Write, F: Formatter>(
    writer: &mut W,
    formatter: &mut F,
    parent: Option<&Frame>,
) -> Result<(), serde_json::Error> {
    match parent.map(|frame| &frame.children) {
        Some(Children::Array(_)) => formatter.end_array_value(writer),
        Some(Children::Object(_)) => formatter.end_object_value(writer),
        None => Ok(()),
    }
    .map_err(serde_json::Error::io)
}

fn into_string(bytes: Vec<u8>) -> Result<String, serde_json::Error> {
    String::from_utf8(bytes)
        .map_err(|e| serde_json::Error::io(io::Error::new(io::ErrorKind::InvalidData, e)))
}

/// Render `value` as compact JSON.
pub fn to_string(value: &Value) -> Result<String, serde_json::Error> {
    let mut out = Vec::with_capacity(256);
    to_writer(&mut out, value)?;
    into_string(out)
}

/// Render `value` as indented JSON.
pub fn to_string_pretty(value: &Value) -> Result<String, serde_json::Error> {
    let mut out = Vec::with_capacity(256);
    write_graph(&mut out, PrettyFormatter::new(), value)?;
    into_string(out)
}

pub fn to_writer<W: Write>(writer: W, value: &Value) -> Result<(), serde_json::Error> {
    write_graph(writer, CompactFormatter, value)
}

/// A container being rebuilt as a `serde_json::Value`.
struct Partial {
    children: Children,
    /// Key under which the finished container goes into its parent.
    key: Option<String>,
    built: serde_json::Value,
}

impl Partial {
    fn add(&mut self, key: Option<String>, json: serde_json::Value) {
        match &mut self.built {
            serde_json::Value::Array(items) => items.push(json),
            serde_json::Value::Object(map) => {
                map.insert(key.unwrap_or_default(), json);
            }
            _ => {}
        }
    }
}

fn scalar_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Number(n) => serde_json::Value::Number(n.clone()),
        Value::String(s) => serde_json::Value::String(s.clone()),
        _ => serde_json::Value::Null,
    }
}

/// Open a container for rebuilding, or hand back the finished leaf with its key.
fn open_json(
    seen: &mut HashSet<NodeId>,
    value: &Value,
    key: Option<String>,
) -> Result<Partial, (Option<String>, serde_json::Value)> {
    match visit(seen, value) {
        Visit::Open(children) => {
            let built = match children {
                Children::Array(_) => serde_json::Value::Array(Vec::new()),
                Children::Object(_) => serde_json::Value::Object(Map::new()),
            };
            Ok(Partial { children, key, built })
        }
        Visit::Repeat => Err((key, serde_json::Value::String(CIRCULAR_SENTINEL.to_string()))),
        Visit::Scalar => Err((key, scalar_json(value))),
    }
}

/// Convert `value` into an owned, acyclic `serde_json::Value`, with the same
/// sentinel substitution as the text renderers.
pub fn to_json(value: &Value) -> serde_json::Value {
    let mut seen = HashSet::new();
    let mut stack = match open_json(&mut seen, value, None) {
        Ok(partial) => vec![partial],
        Err((_, leaf)) => return leaf,
    };

    while let Some(top) = stack.last_mut() {
        match top.children.next() {
            Some((key, item)) => match open_json(&mut seen, &item, key) {
                Ok(child) => stack.push(child),
                Err((key, leaf)) => top.add(key, leaf),
            },
            None => {
                let Some(done) = stack.pop() else { break };
                match stack.last_mut() {
                    Some(parent) => parent.add(done.key, done.built),
                    None => return done.built,
                }
            }
        }
    }
    serde_json::Value::Null
}

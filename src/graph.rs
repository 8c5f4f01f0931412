//! A JSON-shaped object graph whose arrays and objects are shared references.
//!
//! Parser output and the final aggregate are both rendered into this graph.
//! Unlike `serde_json::Value`, two places in the graph may point at the same
//! array or object, and a container may (directly or indirectly) contain
//! itself. [`crate::serialize`] turns such a graph into text without looping.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    Array(ArrayRef),
    Object(ObjectRef),
}

/// Shared, mutable array node. Cloning clones the reference, not the contents.
#[derive(Clone, Default)]
pub struct ArrayRef(Arc<RwLock<Vec<Value>>>);

/// Shared, mutable object node with insertion-ordered keys.
#[derive(Clone, Default)]
pub struct ObjectRef(Arc<RwLock<Vec<(String, Value)>>>);

/// Identity of a container node, stable for the node's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

impl ArrayRef {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, value: impl Into<Value>) {
        self.write().push(value.into());
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Value> {
        self.read().get(index).cloned()
    }

    /// Snapshot of the current elements (element references are shared).
    pub fn items(&self) -> Vec<Value> {
        self.read().clone()
    }

    pub fn id(&self) -> NodeId {
        NodeId(Arc::as_ptr(&self.0) as *const () as usize)
    }

    pub fn ptr_eq(&self, other: &ArrayRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn read(&self) -> RwLockReadGuard<'_, Vec<Value>> {
        self.0.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Value>> {
        self.0.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ObjectRef {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key`, replacing an existing entry in place or appending a new one.
    pub fn insert(&self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        let mut entries = self.write();
        match entries.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => entries.push((key, value)),
        }
    }

    /// Builder-style [`ObjectRef::insert`].
    pub fn with(self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.read()
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.read().iter().any(|(k, _)| k == key)
    }

    /// Snapshot of the current entries (values are shared).
    pub fn entries(&self) -> Vec<(String, Value)> {
        self.read().clone()
    }

    pub fn keys(&self) -> Vec<String> {
        self.read().iter().map(|(k, _)| k.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    pub fn id(&self) -> NodeId {
        NodeId(Arc::as_ptr(&self.0) as *const () as usize)
    }

    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn read(&self) -> RwLockReadGuard<'_, Vec<(String, Value)>> {
        self.0.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<(String, Value)>> {
        self.0.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&ArrayRef> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::Number(n) => n.as_u64(),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Value::Number((n as u64).into())
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Value::Number(n.into())
    }
}

impl From<ArrayRef> for Value {
    fn from(a: ArrayRef) -> Self {
        Value::Array(a)
    }
}

impl From<ObjectRef> for Value {
    fn from(o: ObjectRef) -> Self {
        Value::Object(o)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

// Debug never recurses into containers so a cyclic graph can still be printed.
impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("Null"),
            Value::Bool(b) => write!(f, "Bool({b})"),
            Value::Number(n) => write!(f, "Number({n})"),
            Value::String(s) => write!(f, "String({s:?})"),
            Value::Array(a) => write!(f, "Array(#{:x}, len={})", a.id().0, a.len()),
            Value::Object(o) => write!(f, "Object(#{:x}, keys={:?})", o.id().0, o.keys()),
        }
    }
}

impl fmt::Debug for ArrayRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&Value::Array(self.clone()), f)
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&Value::Object(self.clone()), f)
    }
}

// Dropping the last reference to a deep chain would otherwise recurse once per
// level. The contents of uniquely owned containers are moved onto a work list
// instead, so every nested drop finds an already emptied container.
impl Drop for ArrayRef {
    fn drop(&mut self) {
        if let Some(items) = take_unique(&mut self.0) {
            release(items);
        }
    }
}

impl Drop for ObjectRef {
    fn drop(&mut self) {
        if let Some(entries) = take_unique(&mut self.0) {
            release(entries.into_iter().map(|(_, v)| v).collect());
        }
    }
}

fn take_unique<T: Default>(node: &mut Arc<RwLock<T>>) -> Option<T> {
    Arc::get_mut(node).map(|lock| std::mem::take(lock.get_mut().unwrap_or_else(PoisonError::into_inner)))
}

fn release(mut work: Vec<Value>) {
    while let Some(value) = work.pop() {
        match value {
            Value::Array(mut array) => {
                if let Some(items) = take_unique(&mut array.0) {
                    work.extend(items);
                }
            }
            Value::Object(mut object) => {
                if let Some(entries) = take_unique(&mut object.0) {
                    work.extend(entries.into_iter().map(|(_, v)| v));
                }
            }
            _ => {}
        }
    }
}

use serde_json::json;
use source_atlas::graph::{ArrayRef, ObjectRef, Value};
use source_atlas::serialize::{to_json, to_string, to_string_pretty, to_writer, CIRCULAR_SENTINEL};

#[test]
fn test_acyclic_graph_matches_plain_json() {
    let tags = ArrayRef::new();
    tags.push("a");
    tags.push(2u64);
    let graph = Value::Object(
        ObjectRef::new()
            .with("name", "x")
            .with("ok", true)
            .with("none", Value::Null)
            .with("tags", tags),
    );
    assert_eq!(
        to_json(&graph),
        json!({"name": "x", "ok": true, "none": null, "tags": ["a", 2]})
    );
    assert_eq!(
        to_string(&graph).unwrap(),
        r#"{"name":"x","ok":true,"none":null,"tags":["a",2]}"#
    );
}

#[test]
fn test_self_reference_becomes_sentinel() {
    let node = ObjectRef::new().with("name", "loop");
    node.insert("self", node.clone());

    let out = to_json(&Value::Object(node));
    assert_eq!(out, json!({"name": "loop", "self": CIRCULAR_SENTINEL}));
}

#[test]
fn test_two_node_cycle() {
    let a = ObjectRef::new().with("id", "a");
    let b = ObjectRef::new().with("id", "b");
    a.insert("next", b.clone());
    b.insert("next", a.clone());

    let out = to_json(&Value::Object(a));
    assert_eq!(
        out,
        json!({"id": "a", "next": {"id": "b", "next": CIRCULAR_SENTINEL}})
    );
}

#[test]
fn test_array_containing_itself() {
    let list = ArrayRef::new();
    list.push(1u64);
    list.push(list.clone());
    assert_eq!(to_string(&Value::Array(list)).unwrap(), r#"[1,"[Circular]"]"#);
}

#[test]
fn test_shared_child_rendered_once() {
    let shared = ObjectRef::new().with("v", 1u64);
    let parent = ObjectRef::new()
        .with("left", shared.clone())
        .with("right", shared.clone());

    let out = to_json(&Value::Object(parent));
    assert_eq!(out, json!({"left": {"v": 1}, "right": CIRCULAR_SENTINEL}));
}

#[test]
fn test_repeated_scalars_are_not_tracked() {
    let list = ArrayRef::new();
    for _ in 0..3 {
        list.push("same");
        list.push(7u64);
    }
    assert_eq!(
        to_json(&Value::Array(list)),
        json!(["same", 7, "same", 7, "same", 7])
    );
}

#[test]
fn test_each_call_tracks_independently() {
    let node = ObjectRef::new().with("k", "v");
    let value = Value::Object(node);
    let first = to_string(&value).unwrap();
    let second = to_string(&value).unwrap();
    assert_eq!(first, second);
    assert_eq!(first, r#"{"k":"v"}"#);
}

#[test]
fn test_pretty_and_writer_outputs_agree() {
    let node = ObjectRef::new().with("k", "v");
    node.insert("me", node.clone());
    let value = Value::Object(node);

    let pretty: serde_json::Value = serde_json::from_str(&to_string_pretty(&value).unwrap()).unwrap();
    let mut buf = Vec::new();
    to_writer(&mut buf, &value).unwrap();
    let written: serde_json::Value = serde_json::from_slice(&buf).unwrap();

    assert_eq!(pretty, written);
    assert_eq!(written["me"], CIRCULAR_SENTINEL);
}

#[test]
fn test_long_cycle_terminates() {
    let first = ObjectRef::new().with("i", 0u64);
    let mut last = first.clone();
    for i in 1..500u64 {
        let next = ObjectRef::new().with("i", i);
        last.insert("next", next.clone());
        last = next;
    }
    last.insert("next", first.clone());

    let text = to_string(&Value::Object(first)).unwrap();
    assert_eq!(text.matches(CIRCULAR_SENTINEL).count(), 1);
}

fn deep_chain(depth: usize) -> ObjectRef {
    let root = ObjectRef::new().with("level", 0u64);
    let mut last = root.clone();
    for level in 1..depth {
        let children = ArrayRef::new();
        let next = ObjectRef::new().with("level", level);
        children.push(next.clone());
        last.insert("children", children);
        last = next;
    }
    root
}

#[test]
fn test_very_deep_graph_renders_and_drops() {
    let depth = 20_000;
    let value = Value::Object(deep_chain(depth));

    let compact = to_string(&value).unwrap();
    assert_eq!(compact.matches("\"level\"").count(), depth);
    assert!(compact.ends_with(&"]}".repeat(depth - 1).to_string()));

    let pretty = to_string_pretty(&value).unwrap();
    assert_eq!(pretty.matches("\"level\"").count(), depth);

    drop(value);
}

#[test]
fn test_pretty_layout() {
    let list = ArrayRef::new();
    list.push(1u64);
    let value = Value::Object(ObjectRef::new().with("a", list).with("b", ObjectRef::new()));
    assert_eq!(
        to_string_pretty(&value).unwrap(),
        "{\n  \"a\": [\n    1\n  ],\n  \"b\": {}\n}"
    );
}

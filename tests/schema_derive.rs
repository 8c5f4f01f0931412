use serde_json::json;
use source_atlas::parse::{FormatParser, Representation, StructuredDataParser};
use source_atlas::schema::{derive_schema, SchemaKind, SchemaOptions};
use source_atlas::serialize::to_string;

#[test]
fn test_nested_objects_recurse_and_arrays_stop() {
    let doc: serde_json::Value = serde_json::from_str(r#"{"a":{"b":1},"c":[1,2]}"#).unwrap();
    let schema = derive_schema(&doc, SchemaOptions::default());

    assert_eq!(schema.kind, SchemaKind::Object);
    let a = schema.property("a").expect("a present");
    assert_eq!(a.kind, SchemaKind::Object);
    assert_eq!(a.property("b").unwrap().kind, SchemaKind::Number);

    let c = schema.property("c").expect("c present");
    assert_eq!(c.kind, SchemaKind::Array);
    assert!(c.properties.is_none());
    assert!(c.items.is_none());

    assert_eq!(
        serde_json::to_value(&schema).unwrap(),
        json!({
            "kind": "object",
            "properties": {
                "a": {"kind": "object", "properties": {"b": {"kind": "number"}}},
                "c": {"kind": "array"}
            }
        })
    );
}

#[test]
fn test_every_scalar_kind() {
    let doc = json!({"s": "x", "n": 1.5, "t": true, "z": null, "o": {}});
    let schema = derive_schema(&doc, SchemaOptions::default());
    let kind = |k: &str| schema.property(k).unwrap().kind;

    assert_eq!(kind("s"), SchemaKind::String);
    assert_eq!(kind("n"), SchemaKind::Number);
    assert_eq!(kind("t"), SchemaKind::Boolean);
    assert_eq!(kind("z"), SchemaKind::Null);
    assert_eq!(kind("o"), SchemaKind::Object);
    assert_eq!(schema.property("o").unwrap().properties.as_ref().unwrap().len(), 0);
    assert_eq!(schema.properties.as_ref().unwrap().len(), 5);
}

#[test]
fn test_top_level_non_objects() {
    let opts = SchemaOptions::default();
    assert_eq!(derive_schema(&json!([1, 2]), opts).kind, SchemaKind::Array);
    assert_eq!(derive_schema(&json!("x"), opts).kind, SchemaKind::String);
    assert_eq!(derive_schema(&json!(null), opts).kind, SchemaKind::Null);
}

#[test]
fn test_rederiving_from_schema_shape_is_stable() {
    let docs = [
        json!({"a": {"b": 1, "c": {"d": [1, {"e": 2}]}}, "f": "x", "g": null, "h": false}),
        json!([{"a": 1}]),
        json!({"list": [], "nested": {"deeper": {"deepest": {}}}}),
    ];
    for options in [
        SchemaOptions::default(),
        SchemaOptions {
            describe_array_items: true,
        },
    ] {
        for doc in &docs {
            let first = derive_schema(doc, options);
            let second = derive_schema(&first.example_value(), options);
            assert_eq!(first, second, "schema of {doc} with {options:?}");
        }
    }
}

#[test]
fn test_deterministic_regardless_of_key_order() {
    let one: serde_json::Value = serde_json::from_str(r#"{"x":1,"y":{"p":"a","q":true}}"#).unwrap();
    let two: serde_json::Value = serde_json::from_str(r#"{"y":{"q":false,"p":"b"},"x":2}"#).unwrap();
    assert_eq!(
        derive_schema(&one, SchemaOptions::default()),
        derive_schema(&two, SchemaOptions::default())
    );
}

#[test]
fn test_describe_array_items_uses_first_element() {
    let opts = SchemaOptions {
        describe_array_items: true,
    };
    let schema = derive_schema(&json!({"users": [{"id": 1}], "empty": []}), opts);

    let users = schema.property("users").unwrap();
    let item = users.items.as_deref().expect("items described");
    assert_eq!(item.kind, SchemaKind::Object);
    assert_eq!(item.property("id").unwrap().kind, SchemaKind::Number);

    let empty = schema.property("empty").unwrap();
    assert_eq!(empty.items.as_deref().unwrap().kind, SchemaKind::Undefined);
}

#[test]
fn test_deeply_nested_document() {
    let depth = 100;
    let text = format!("{}1{}", r#"{"k":"#.repeat(depth), "}".repeat(depth));
    let doc: serde_json::Value = serde_json::from_str(&text).unwrap();
    let mut node = derive_schema(&doc, SchemaOptions::default());
    for _ in 0..depth {
        assert_eq!(node.kind, SchemaKind::Object);
        node = node.property("k").unwrap().clone();
    }
    assert_eq!(node.kind, SchemaKind::Number);
}

#[test]
fn test_document_beyond_default_nesting_limit() {
    let depth = 2_000;
    let text = format!("{}1{}", r#"{"k":"#.repeat(depth), "}".repeat(depth));
    let rep = StructuredDataParser::new(SchemaOptions::default())
        .parse(&text)
        .expect("deep document parses");

    let Representation::Schema(schema) = &rep else {
        panic!("expected schema, got {rep:?}");
    };
    let mut node = schema;
    for _ in 0..depth {
        assert_eq!(node.kind, SchemaKind::Object);
        node = node.property("k").unwrap();
    }
    assert_eq!(node.kind, SchemaKind::Number);

    let rendered = to_string(&rep.to_graph()).unwrap();
    assert_eq!(rendered.matches("\"kind\":\"object\"").count(), depth - 1);
    assert!(rendered.contains("\"kind\":\"number\""));
    drop(rep);
}

#[test]
fn test_deep_arrays_with_item_description() {
    let depth = 1_500;
    let text = format!("{}null{}", "[".repeat(depth), "]".repeat(depth));
    let options = SchemaOptions {
        describe_array_items: true,
    };
    let rep = StructuredDataParser::new(options).parse(&text).unwrap();
    let Representation::Schema(schema) = &rep else {
        panic!("expected schema, got {rep:?}");
    };
    let mut node = schema;
    for _ in 0..depth {
        assert_eq!(node.kind, SchemaKind::Array);
        node = node.items.as_deref().unwrap();
    }
    assert_eq!(node.kind, SchemaKind::Null);

    let rendered = to_string(&rep.to_graph()).unwrap();
    assert_eq!(rendered.matches("\"items\"").count(), depth);
}

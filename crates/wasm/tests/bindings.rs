use mdirective_wasm::{from_markdown, from_markdown_with_diagnostics, to_markdown};
use serde::{Deserialize, Serialize};
use serde_json::json;
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

#[derive(Deserialize, Debug)]
struct ParseResult {
    tree: String,
    warnings: Vec<String>,
}

#[derive(Serialize)]
struct ParseOptions {
    directives: bool,
}

#[derive(Serialize)]
struct WriteOptions {
    quote: &'static str,
}

#[wasm_bindgen_test]
fn from_markdown_returns_mdast_json() {
    let tree = from_markdown("::a[b]{c}", JsValue::UNDEFINED).expect("parse should succeed");
    let tree: serde_json::Value = serde_json::from_str(&tree).expect("valid json");

    assert_eq!(
        tree,
        json!({
            "type": "root",
            "children": [{
                "type": "leafDirective",
                "name": "a",
                "attributes": {"c": ""},
                "children": [{"type": "text", "value": "b"}]
            }]
        })
    );
}

#[wasm_bindgen_test]
fn directives_can_be_turned_off() {
    let options = serde_wasm_bindgen::to_value(&ParseOptions { directives: false }).unwrap();
    let tree = from_markdown("::a", options).expect("parse should succeed");
    let tree: serde_json::Value = serde_json::from_str(&tree).unwrap();

    assert_eq!(tree["children"][0]["type"], "paragraph");
    assert_eq!(tree["children"][0]["children"][0]["value"], "::a");
}

#[wasm_bindgen_test]
fn diagnostics_report_unclosed_containers() {
    let result = from_markdown_with_diagnostics(":::note\ntext", JsValue::NULL).expect("parse should succeed");
    let result: ParseResult = serde_wasm_bindgen::from_value(result).expect("deserialize result");

    assert_eq!(result.warnings.len(), 1);
    assert!(result.warnings[0].contains("note"));
    assert!(result.tree.contains("containerDirective"));
}

#[wasm_bindgen_test]
fn to_markdown_serializes_directives() {
    let tree = json!({
        "type": "containerDirective",
        "name": "a",
        "children": [{
            "type": "containerDirective",
            "name": "b",
            "children": [{"type": "paragraph", "children": [{"type": "text", "value": "c"}]}]
        }]
    });
    let markdown = to_markdown(&tree.to_string(), JsValue::UNDEFINED).expect("serialize should succeed");

    assert_eq!(markdown, "::::a\n:::b\nc\n:::\n::::\n");
}

#[wasm_bindgen_test]
fn to_markdown_accepts_single_quotes() {
    let tree = json!({"type": "leafDirective", "name": "a", "attributes": {"title": "b c"}});
    let options = serde_wasm_bindgen::to_value(&WriteOptions { quote: "'" }).unwrap();
    let markdown = to_markdown(&tree.to_string(), options).expect("serialize should succeed");

    assert_eq!(markdown, "::a{title='b c'}\n");
}

#[wasm_bindgen_test]
fn round_trip_through_the_bindings() {
    let source = ":::a[b]{c}\nd\n:::\n";
    let tree = from_markdown(source, JsValue::UNDEFINED).expect("parse should succeed");
    let markdown = to_markdown(&tree, JsValue::UNDEFINED).expect("serialize should succeed");

    assert_eq!(markdown, source);
}

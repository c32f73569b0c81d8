use mdirective_core::{Node, ParseOptions, parse_mdast, parse_with_diagnostics};
use mdirective_writer::{Options, directive_to_markdown, to_markdown as write_markdown};
use serde::Serialize;
use serde::de::DeserializeOwned;
use wasm_bindgen::JsValue;
use wasm_bindgen::prelude::*;

fn parse_config<T: DeserializeOwned + Default>(config: JsValue) -> Result<T, JsError> {
    if config.is_undefined() || config.is_null() {
        return Ok(T::default());
    }
    serde_wasm_bindgen::from_value(config).map_err(|e| JsError::new(&format!("Invalid options: {}", e)))
}

/// Tree and warnings returned by `fromMarkdownWithDiagnostics`.
#[derive(Debug, Clone, Serialize)]
pub struct ParseResult {
    /// The mdast tree as JSON.
    pub tree: String,
    /// Human-readable warnings (unclosed containers and code fences).
    pub warnings: Vec<String>,
}

/// Parse markdown with directive syntax into an mdast JSON string.
///
/// `options` is `{ directives?: boolean }`; directives are on by default.
#[wasm_bindgen(js_name = fromMarkdown)]
pub fn from_markdown(source: &str, options: JsValue) -> Result<String, JsError> {
    let options: ParseOptions = parse_config(options)?;
    let tree = parse_mdast(source, &options).map_err(|e| JsError::new(&format!("Parse error: {}", e)))?;
    tree.to_json().map_err(|e| JsError::new(&format!("Serialization error: {}", e)))
}

/// Like `fromMarkdown`, also returning tokenizer warnings.
#[wasm_bindgen(js_name = fromMarkdownWithDiagnostics)]
pub fn from_markdown_with_diagnostics(source: &str, options: JsValue) -> Result<JsValue, JsError> {
    let options: ParseOptions = parse_config(options)?;
    let (tree, diagnostics) =
        parse_with_diagnostics(source, &options).map_err(|e| JsError::new(&format!("Parse error: {}", e)))?;
    let result = ParseResult {
        tree: tree
            .to_json()
            .map_err(|e| JsError::new(&format!("Serialization error: {}", e)))?,
        warnings: diagnostics.warnings.iter().map(ToString::to_string).collect(),
    };
    serde_wasm_bindgen::to_value(&result).map_err(|e| JsError::new(&format!("Serialization error: {}", e)))
}

/// Serialize an mdast JSON string, directive nodes included, to markdown.
///
/// `options` is `{ quote?: '"' | "'" }`.
#[wasm_bindgen(js_name = toMarkdown)]
pub fn to_markdown(tree: &str, options: JsValue) -> Result<String, JsError> {
    let options: Options = parse_config(options)?;
    let tree = Node::from_json(tree).map_err(|e| JsError::new(&format!("Invalid tree: {}", e)))?;
    write_markdown(&tree, &options, &[directive_to_markdown()]).map_err(|e| JsError::new(&e.to_string()))
}

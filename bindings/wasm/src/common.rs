use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use wasm_bindgen::JsValue;

pub(crate) fn js_err(e: impl ToString) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Convert a plain JS object (or a JSON string) into a serde_json value.
pub(crate) fn js_to_json(value: &JsValue) -> Result<serde_json::Value> {
    let text = match value.as_string() {
        Some(text) => text,
        None => js_sys::JSON::stringify(value)
            .map_err(|e| anyhow!("value is not JSON-serializable: {e:?}"))?
            .as_string()
            .ok_or_else(|| anyhow!("value is not JSON-serializable"))?,
    };
    serde_json::from_str(&text).context("invalid JSON")
}

/// Serialize to plain JS objects (no Map instances, u64 ids as numbers).
pub(crate) fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    value.serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| e.into())
}

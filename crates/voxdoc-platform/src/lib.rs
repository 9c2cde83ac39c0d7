pub mod api;
pub mod audio;
pub mod speech;
pub mod storage;
pub mod timer;

use wasm_bindgen::JsValue;
use voxdoc_types::VoxError;

/// Stringify a JS exception for the error taxonomy. DOM exceptions
/// carry `name` and `message`; anything else is debug-printed.
pub(crate) fn js_error_text(value: &JsValue) -> String {
    let name = js_sys::Reflect::get(value, &JsValue::from_str("name"))
        .ok()
        .and_then(|v| v.as_string());
    let message = js_sys::Reflect::get(value, &JsValue::from_str("message"))
        .ok()
        .and_then(|v| v.as_string());
    match (name, message) {
        (Some(name), Some(message)) => format!("{}: {}", name, message),
        (Some(name), None) => name,
        _ => format!("{:?}", value),
    }
}

pub(crate) fn js_interop(value: JsValue) -> VoxError {
    VoxError::JsInterop(js_error_text(&value))
}

//! Error types for the browser bridges

use bridge_traits::error::BridgeError;
use thiserror::Error;
use wasm_bindgen::{JsCast, JsValue};

pub type WasmResult<T> = Result<T, WasmError>;

#[derive(Error, Debug)]
pub enum WasmError {
    /// A browser global (`window`, `history`) is missing.
    #[error("Browser API unavailable: {0}")]
    Unavailable(String),

    #[error("JavaScript error: {0}")]
    JavaScript(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<WasmError> for BridgeError {
    fn from(err: WasmError) -> Self {
        match err {
            WasmError::Unavailable(what) => BridgeError::NotAvailable(what),
            other => BridgeError::OperationFailed(other.to_string()),
        }
    }
}

impl From<JsValue> for WasmError {
    fn from(js_value: JsValue) -> Self {
        WasmError::JavaScript(js_message(&js_value))
    }
}

/// Best-effort human readable text for a thrown JavaScript value.
pub fn js_message(value: &JsValue) -> String {
    if let Some(text) = value.as_string() {
        text
    } else if let Some(error) = value.dyn_ref::<js_sys::Error>() {
        error.message().into()
    } else {
        format!("{:?}", value)
    }
}

pub(crate) fn window() -> WasmResult<web_sys::Window> {
    web_sys::window().ok_or_else(|| WasmError::Unavailable("window".to_string()))
}

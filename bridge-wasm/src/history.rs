//! `window.history` and `window.location`.

use bridge_traits::{
    error::Result as BridgeResult,
    location::{NavigationHistory, PageLocation, RouteState},
};
use tracing::debug;
use wasm_bindgen::JsValue;
use web_sys::Window;

use crate::error::{window, WasmError, WasmResult};

#[derive(Debug)]
pub struct BrowserHistory {
    window: Window,
}

impl BrowserHistory {
    pub fn new() -> WasmResult<Self> {
        Ok(Self { window: window()? })
    }

    fn read_location(&self) -> WasmResult<PageLocation> {
        let location = self.window.location();
        Ok(PageLocation::new(
            location.origin()?,
            location.pathname()?,
            location.hash()?,
        ))
    }

    fn write_state(&self, state: Option<&RouteState>, url: &str) -> WasmResult<()> {
        let value = match state {
            Some(state) => js_sys::JSON::parse(&serde_json::to_string(state)?)?,
            None => JsValue::NULL,
        };
        self.window
            .history()?
            .push_state_with_url(&value, "", Some(url))?;
        Ok(())
    }
}

/// Snapshot of the page address, or the local site root outside a browser.
pub fn current_location() -> PageLocation {
    BrowserHistory::new()
        .and_then(|history| history.read_location())
        .unwrap_or_else(|_| PageLocation::local())
}

/// Decode the `state` of a `popstate` event.
pub fn route_state(value: &JsValue) -> Option<RouteState> {
    if value.is_null() || value.is_undefined() {
        return None;
    }
    let text = js_sys::JSON::stringify(value).ok()?.as_string()?;
    serde_json::from_str(&text).ok()
}

impl NavigationHistory for BrowserHistory {
    fn location(&self) -> PageLocation {
        self.read_location().unwrap_or_else(|_| PageLocation::local())
    }

    fn push(&self, state: Option<&RouteState>, hash: &str) -> BridgeResult<()> {
        // An empty hash returns to the bare pathname.
        let url = if hash.is_empty() {
            self.location().pathname
        } else {
            hash.to_string()
        };
        debug!(url = %url, "history.pushState");
        self.write_state(state, &url).map_err(WasmError::into)
    }
}

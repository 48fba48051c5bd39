//! `HttpClient` over the browser's `fetch`.
//!
//! Requests are same-origin reads of the lesson site. Per-request timeouts
//! abort the fetch through an `AbortController`.

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result as BridgeResult},
    http::{HttpClient, HttpRequest, HttpResponse},
};
use bytes::Bytes;
use futures::{
    future::{select, Either},
    pin_mut, FutureExt,
};
use gloo_timers::future::TimeoutFuture;
use js_sys::{try_iter, Array, Uint8Array};
use std::{collections::HashMap, time::Duration};
use tracing::debug;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{AbortController, Request, RequestInit, RequestMode, Response};

use crate::error::{js_message, window};

#[derive(Debug, Default)]
pub struct WasmHttpClient;

impl WasmHttpClient {
    pub fn new() -> Self {
        Self
    }

    fn build_request(
        &self,
        request: &HttpRequest,
        signal: Option<&web_sys::AbortSignal>,
    ) -> BridgeResult<Request> {
        let init = RequestInit::new();
        init.set_method(request.method.as_str());
        init.set_mode(RequestMode::SameOrigin);
        if let Some(signal) = signal {
            init.set_signal(Some(signal));
        }

        let headers = web_sys::Headers::new().map_err(|err| js_error("create headers", err))?;
        for (key, value) in &request.headers {
            headers
                .set(key, value)
                .map_err(|err| js_error("set header", err))?;
        }
        init.set_headers(&headers);

        Request::new_with_str_and_init(&request.url, &init)
            .map_err(|err| js_error("build request", err))
    }

    async fn fetch(
        &self,
        req: &Request,
        controller: Option<AbortController>,
        timeout: Option<Duration>,
    ) -> BridgeResult<Response> {
        let window = window()?;
        let fetch = JsFuture::from(window.fetch_with_request(req));

        let result = match (timeout, controller) {
            (Some(timeout), Some(controller)) => {
                let millis = timeout.as_millis().min(u32::MAX as u128) as u32;
                let timer = TimeoutFuture::new(millis).map(|_| ());
                pin_mut!(timer);
                pin_mut!(fetch);

                match select(fetch, timer).await {
                    Either::Left((response, _)) => response,
                    Either::Right((_, pending)) => {
                        controller.abort();
                        let _ = pending.await;
                        return Err(BridgeError::Network(format!(
                            "request timed out after {} ms",
                            millis
                        )));
                    }
                }
            }
            _ => fetch.await,
        };

        // fetch only rejects on transport failures.
        let value = result.map_err(|err| BridgeError::Network(js_message(&err)))?;
        value
            .dyn_into::<Response>()
            .map_err(|_| BridgeError::OperationFailed("fetch returned non-Response".into()))
    }

    async fn read_body(response: &Response) -> BridgeResult<Bytes> {
        let promise = response
            .array_buffer()
            .map_err(|err| js_error("response.array_buffer", err))?;
        let buffer = JsFuture::from(promise)
            .await
            .map_err(|err| BridgeError::Network(js_message(&err)))?;
        Ok(Bytes::from(Uint8Array::new(&buffer).to_vec()))
    }

    fn collect_headers(response: &Response) -> BridgeResult<HashMap<String, String>> {
        let iterator = try_iter(&JsValue::from(response.headers()))
            .map_err(|err| js_error("iterate headers", err))?
            .ok_or_else(|| BridgeError::OperationFailed("Headers iterator unavailable".into()))?;

        let mut map = HashMap::new();
        for entry in iterator {
            let entry = entry.map_err(|err| js_error("header iteration", err))?;
            let pair = Array::from(&entry);
            if let (Some(key), Some(value)) = (pair.get(0).as_string(), pair.get(1).as_string()) {
                map.insert(key, value);
            }
        }
        Ok(map)
    }
}

#[async_trait(?Send)]
impl HttpClient for WasmHttpClient {
    async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse> {
        let controller = match request.timeout {
            Some(_) => Some(
                AbortController::new().map_err(|err| js_error("create abort controller", err))?,
            ),
            None => None,
        };
        let signal = controller.as_ref().map(|c| c.signal());
        let req = self.build_request(&request, signal.as_ref())?;

        let response = self.fetch(&req, controller, request.timeout).await?;
        let body = Self::read_body(&response).await?;
        let headers = Self::collect_headers(&response)?;

        debug!(url = %request.url, status = response.status(), bytes = body.len(), "Fetched");
        Ok(HttpResponse {
            status: response.status(),
            headers,
            body,
        })
    }
}

fn js_error(context: &str, err: JsValue) -> BridgeError {
    BridgeError::OperationFailed(format!("WasmHttpClient {}: {}", context, js_message(&err)))
}

//! JSON-RPC transports.
//!
//! `HttpTransport` posts JSON-RPC 2.0 requests to the configured endpoint and
//! serves reads before a wallet is connected. The injected wallet implements
//! the same trait in `wallet.rs`.

use std::cell::Cell;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, Response};

use crate::error::ChainError;

#[async_trait(?Send)]
pub trait RpcTransport {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ChainError>;
}

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Debug, Deserialize)]
pub struct RpcErrorObject {
    pub code: i64,
    pub message: String,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

/// Unwraps a JSON-RPC 2.0 response body.
pub fn parse_response(body: &str) -> Result<Value, ChainError> {
    let resp: RpcResponse =
        serde_json::from_str(body).map_err(|e| ChainError::Decode(e.to_string()))?;
    match (resp.error, resp.result) {
        (Some(err), _) => Err(ChainError::from_rpc(err.code, err.message)),
        (None, Some(result)) => Ok(result),
        (None, None) => Ok(Value::Null),
    }
}

/// Best-effort human message out of a thrown JS value.
pub fn js_error_message(err: &JsValue) -> String {
    if let Some(s) = err.as_string() {
        return s;
    }
    js_sys::Reflect::get(err, &JsValue::from_str("message"))
        .ok()
        .and_then(|m| m.as_string())
        .unwrap_or_else(|| format!("{:?}", err))
}

pub struct HttpTransport {
    url: String,
    next_id: Cell<u64>,
}

impl HttpTransport {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            next_id: Cell::new(1),
        }
    }

    async fn post(&self, body: String) -> Result<String, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let opts = RequestInit::new();
        opts.set_method("POST");
        opts.set_body(&JsValue::from_str(&body));
        let request = Request::new_with_str_and_init(&self.url, &opts)?;
        request.headers().set("Content-Type", "application/json")?;
        let resp: Response = JsFuture::from(window.fetch_with_request(&request))
            .await?
            .dyn_into()?;
        if !resp.ok() {
            return Err(JsValue::from_str(&format!("HTTP {}", resp.status())));
        }
        let text = JsFuture::from(resp.text()?).await?;
        Ok(text.as_string().unwrap_or_default())
    }
}

#[async_trait(?Send)]
impl RpcTransport for HttpTransport {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ChainError> {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        let body = serde_json::to_string(&RpcRequest {
            jsonrpc: "2.0",
            id,
            method,
            params,
        })
        .map_err(|e| ChainError::Transport(e.to_string()))?;
        tracing::trace!(method, id, "rpc request");
        let text = self
            .post(body)
            .await
            .map_err(|e| ChainError::Transport(js_error_message(&e)))?;
        parse_response(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn result_is_unwrapped() {
        let v = parse_response(r#"{"jsonrpc":"2.0","id":1,"result":"0x10"}"#).unwrap();
        assert_eq!(v, json!("0x10"));
    }

    #[test]
    fn error_object_becomes_chain_error() {
        let err = parse_response(
            r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32000,"message":"execution reverted"}}"#,
        )
        .unwrap_err();
        assert_eq!(
            err,
            ChainError::Rpc {
                code: -32000,
                message: "execution reverted".into()
            }
        );
        let rejected =
            parse_response(r#"{"id":2,"error":{"code":4001,"message":"User rejected"}}"#);
        assert_eq!(rejected, Err(ChainError::Rejected));
    }

    #[test]
    fn null_result_is_null() {
        assert_eq!(
            parse_response(r#"{"jsonrpc":"2.0","id":3,"result":null}"#).unwrap(),
            Value::Null
        );
    }
}

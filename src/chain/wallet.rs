//! Injected EIP-1193 wallet (`window.ethereum`).
//!
//! The wallet is used for account access, network switching, signing writes,
//! and (once connected) for reads as well.

use std::cell::RefCell;

use alloy_primitives::Address;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Value, json};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

use crate::chain::transport::{RpcTransport, js_error_message};
use crate::config::AppConfig;
use crate::error::{AppError, ChainError};

pub struct InjectedWallet {
    ethereum: JsValue,
    // keeps event callbacks alive for the lifetime of the page
    listeners: RefCell<Vec<Closure<dyn FnMut(JsValue)>>>,
}

/// `wallet_addEthereumChain` parameter object.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddChainParams {
    pub chain_id: String,
    pub chain_name: String,
    pub native_currency: NativeCurrencyParams,
    pub rpc_urls: Vec<String>,
    pub block_explorer_urls: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct NativeCurrencyParams {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

impl AddChainParams {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            chain_id: config.hex_chain_id(),
            chain_name: config.chain_name.clone(),
            native_currency: NativeCurrencyParams {
                name: config.native_currency.name.clone(),
                symbol: config.native_currency.symbol.clone(),
                decimals: config.native_currency.decimals,
            },
            rpc_urls: vec![config.rpc_url.clone()],
            block_explorer_urls: config.block_explorer_urls.clone(),
        }
    }
}

pub fn parse_address(value: &str) -> Result<Address, ChainError> {
    value
        .parse::<Address>()
        .map_err(|e| ChainError::Decode(format!("bad address {}: {}", value, e)))
}

/// First account of an `eth_requestAccounts` / `accountsChanged` payload.
pub fn first_account(accounts: &Value) -> Result<Option<Address>, ChainError> {
    match accounts.as_array().and_then(|a| a.first()) {
        Some(Value::String(s)) => parse_address(s).map(Some),
        Some(other) => Err(ChainError::Decode(format!("bad account entry {}", other))),
        None => Ok(None),
    }
}

fn to_js(value: &Value) -> Result<JsValue, ChainError> {
    js_sys::JSON::parse(&value.to_string()).map_err(|e| ChainError::Wallet(js_error_message(&e)))
}

fn from_js(value: &JsValue) -> Result<Value, ChainError> {
    if value.is_undefined() || value.is_null() {
        return Ok(Value::Null);
    }
    let text: String = js_sys::JSON::stringify(value)
        .map_err(|e| ChainError::Wallet(js_error_message(&e)))?
        .into();
    serde_json::from_str(&text).map_err(|e| ChainError::Decode(e.to_string()))
}

fn wallet_error(err: JsValue) -> ChainError {
    let code = js_sys::Reflect::get(&err, &JsValue::from_str("code"))
        .ok()
        .and_then(|c| c.as_f64());
    match code {
        Some(code) => ChainError::from_rpc(code as i64, js_error_message(&err)),
        None => ChainError::Wallet(js_error_message(&err)),
    }
}

impl InjectedWallet {
    /// Finds `window.ethereum`.
    pub fn detect() -> Result<Self, AppError> {
        let window = web_sys::window().ok_or(AppError::WalletNotInstalled)?;
        let ethereum = js_sys::Reflect::get(&window, &JsValue::from_str("ethereum"))
            .map_err(|_| AppError::WalletNotInstalled)?;
        if ethereum.is_undefined() || ethereum.is_null() {
            return Err(AppError::WalletNotInstalled);
        }
        Ok(Self {
            ethereum,
            listeners: RefCell::new(Vec::new()),
        })
    }

    fn method(&self, name: &str) -> Result<js_sys::Function, ChainError> {
        js_sys::Reflect::get(&self.ethereum, &JsValue::from_str(name))
            .ok()
            .and_then(|f| f.dyn_into::<js_sys::Function>().ok())
            .ok_or_else(|| ChainError::Wallet(format!("provider has no `{}`", name)))
    }

    /// Switches the wallet to the configured chain, adding it if unknown.
    pub async fn ensure_chain(&self, config: &AppConfig) -> Result<(), ChainError> {
        let wanted = config.hex_chain_id();
        let current = match self.request("eth_chainId", json!([])).await {
            Ok(v) => v.as_str().map(str::to_lowercase),
            Err(e) => {
                tracing::warn!(error = %e, "eth_chainId failed");
                None
            }
        };
        if current.as_deref() == Some(wanted.as_str()) {
            return Ok(());
        }
        let switched = self
            .request("wallet_switchEthereumChain", json!([{ "chainId": wanted }]))
            .await;
        if let Err(e) = switched {
            tracing::info!(error = %e, chain = %wanted, "switch failed, adding chain");
            let params = serde_json::to_value(AddChainParams::from_config(config))
                .map_err(|e| ChainError::Wallet(e.to_string()))?;
            self.request("wallet_addEthereumChain", Value::Array(vec![params]))
                .await?;
        }
        Ok(())
    }

    pub async fn request_accounts(&self) -> Result<Address, ChainError> {
        let accounts = self.request("eth_requestAccounts", json!([])).await?;
        first_account(&accounts)?.ok_or_else(|| ChainError::Wallet("no accounts".into()))
    }

    /// Registers `handler` for a provider event (`accountsChanged`, `chainChanged`).
    pub fn on(&self, event: &str, handler: impl FnMut(JsValue) + 'static) -> Result<(), ChainError> {
        let on = self.method("on")?;
        let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(JsValue)>);
        on.call2(
            &self.ethereum,
            &JsValue::from_str(event),
            closure.as_ref(),
        )
        .map_err(wallet_error)?;
        self.listeners.borrow_mut().push(closure);
        Ok(())
    }
}

/// Converts an event payload (e.g. the accounts array) into JSON.
pub fn event_payload(value: &JsValue) -> Value {
    from_js(value).unwrap_or(Value::Null)
}

#[async_trait(?Send)]
impl RpcTransport for InjectedWallet {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ChainError> {
        let request = self.method("request")?;
        let args = to_js(&json!({ "method": method, "params": params }))?;
        let promise = request
            .call1(&self.ethereum, &args)
            .map_err(wallet_error)?
            .dyn_into::<js_sys::Promise>()
            .map_err(|_| ChainError::Wallet("request did not return a promise".into()))?;
        let result = JsFuture::from(promise).await.map_err(wallet_error)?;
        from_js(&result)
    }
}

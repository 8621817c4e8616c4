//! Page configuration.
//!
//! The host page sets `window.MEGA_GRID_CONFIG` before the wasm module loads:
//!
//! ```js
//! window.MEGA_GRID_CONFIG = {
//!   CHAIN_ID: 6342,
//!   RPC_URL: "https://carrot.megaeth.com/rpc",
//!   TILES_ADDRESS: "0x…",
//! };
//! ```
//!
//! Only those three keys are required.

use alloy_primitives::Address;
use serde::Deserialize;
use wasm_bindgen::JsValue;

use crate::chain::transport::js_error_message;
use crate::error::AppError;
use crate::model::DEFAULT_GRID_SIZE;

pub const CONFIG_GLOBAL: &str = "MEGA_GRID_CONFIG";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NativeCurrency {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

impl Default for NativeCurrency {
    fn default() -> Self {
        Self {
            name: "MEGA".to_string(),
            symbol: "MEGA".to_string(),
            decimals: 18,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct AppConfig {
    pub chain_id: u64,
    pub rpc_url: String,
    pub tiles_address: Address,
    #[serde(default = "default_chain_name")]
    pub chain_name: String,
    #[serde(default)]
    pub native_currency: NativeCurrency,
    #[serde(default)]
    pub block_explorer_urls: Vec<String>,
    #[serde(default = "default_grid_size")]
    pub grid_size: u32,
    #[serde(default)]
    pub pixel: PixelBounds,
    #[serde(default = "default_event_poll_ms")]
    pub event_poll_ms: u32,
    #[serde(default = "default_receipt_poll_ms")]
    pub receipt_poll_ms: u32,
}

fn default_chain_name() -> String {
    "MegaETH Testnet".to_string()
}

fn default_grid_size() -> u32 {
    DEFAULT_GRID_SIZE
}

fn default_event_poll_ms() -> u32 {
    4000
}

fn default_receipt_poll_ms() -> u32 {
    1000
}

/// Pixel-per-tile bounds for the scale control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct PixelBounds {
    pub min: u32,
    pub max: u32,
    pub default: u32,
}

impl Default for PixelBounds {
    fn default() -> Self {
        Self {
            min: 1,
            max: 12,
            default: 2,
        }
    }
}

impl PixelBounds {
    /// Parses the scale input. Garbage and zero fall back to the default, then
    /// the value is clamped into `[min, max]`.
    pub fn clamp_input(&self, raw: &str) -> u32 {
        let value = raw
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite() && *v != 0.0)
            .unwrap_or(self.default as f64);
        let lo = self.min.max(1);
        let hi = self.max.max(lo);
        value.floor().clamp(lo as f64, hi as f64) as u32
    }
}

impl AppConfig {
    pub fn from_json(json: &str) -> Result<Self, AppError> {
        serde_json::from_str(json).map_err(|e| AppError::Config(e.to_string()))
    }

    /// Reads `window.MEGA_GRID_CONFIG`.
    pub fn from_window() -> Result<Self, AppError> {
        let window = web_sys::window().ok_or_else(|| AppError::Config("no window".into()))?;
        let raw = js_sys::Reflect::get(&window, &JsValue::from_str(CONFIG_GLOBAL))
            .map_err(|e| AppError::Config(js_error_message(&e)))?;
        if raw.is_undefined() || raw.is_null() {
            return Err(AppError::Config(format!("window.{} is not set", CONFIG_GLOBAL)));
        }
        let json: String = js_sys::JSON::stringify(&raw)
            .map_err(|e| AppError::Config(js_error_message(&e)))?
            .into();
        Self::from_json(&json)
    }

    pub fn hex_chain_id(&self) -> String {
        format!("0x{:x}", self.chain_id)
    }
}

#[cfg(test)]
impl AppConfig {
    pub fn for_tests() -> Self {
        Self::from_json(
            r#"{"CHAIN_ID":6342,"RPC_URL":"http://localhost:8545","TILES_ADDRESS":"0x00000000000000000000000000000000000000f0"}"#,
        )
        .unwrap()
    }
}

//! Client for the tile contract over any `RpcTransport`.

use std::rc::Rc;

use alloy_primitives::{Address, B256, Bytes, U256, hex};
use async_trait::async_trait;
use gloo_timers::future::TimeoutFuture;
use serde::Serialize;
use serde_json::{Value, json};

use crate::chain::abi::{self, tile_arg};
use crate::chain::transport::RpcTransport;
use crate::chain::{ChainReader, ChainWriter, PendingTx};
use crate::error::ChainError;
use crate::model::{Listing, TileId};

/// Receipt polls before a transaction is reported as unconfirmed.
const MAX_RECEIPT_POLLS: u32 = 600;

pub struct TileContract<T> {
    transport: Rc<T>,
    address: Address,
    sender: Option<Address>,
    receipt_poll_ms: u32,
}

#[derive(Debug, Serialize)]
struct CallRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    from: Option<Address>,
    to: Address,
    data: Bytes,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<U256>,
}

pub fn hex_bytes(value: &Value) -> Result<Vec<u8>, ChainError> {
    let s = value
        .as_str()
        .ok_or_else(|| ChainError::Decode(format!("expected hex string, got {}", value)))?;
    hex::decode(s).map_err(|e| ChainError::Decode(e.to_string()))
}

pub fn hex_hash(value: &Value) -> Result<B256, ChainError> {
    let bytes = hex_bytes(value)?;
    if bytes.len() != 32 {
        return Err(ChainError::Decode(format!("hash has {} bytes", bytes.len())));
    }
    Ok(B256::from_slice(&bytes))
}

/// `Some(true)` confirmed, `Some(false)` reverted, `None` still pending.
pub fn receipt_status(receipt: &Value) -> Result<Option<bool>, ChainError> {
    if receipt.is_null() {
        return Ok(None);
    }
    match receipt.get("status").and_then(Value::as_str) {
        Some("0x1") => Ok(Some(true)),
        Some("0x0") => Ok(Some(false)),
        // pre-byzantium receipts carry no status
        None => Ok(Some(true)),
        Some(other) => Err(ChainError::Decode(format!("receipt status {}", other))),
    }
}

impl<T: RpcTransport> TileContract<T> {
    pub fn new(transport: Rc<T>, address: Address) -> Self {
        Self {
            transport,
            address,
            sender: None,
            receipt_poll_ms: 1000,
        }
    }

    /// Write-capable handle sending from `sender`.
    pub fn with_sender(mut self, sender: Address) -> Self {
        self.sender = Some(sender);
        self
    }

    pub fn with_receipt_poll(mut self, ms: u32) -> Self {
        self.receipt_poll_ms = ms.max(1);
        self
    }

    async fn call(&self, signature: &str, args: &[U256]) -> Result<Vec<u8>, ChainError> {
        let req = CallRequest {
            from: None,
            to: self.address,
            data: abi::encode_call(signature, args),
            value: None,
        };
        let out = self
            .transport
            .request("eth_call", json!([req, "latest"]))
            .await?;
        hex_bytes(&out)
    }

    async fn send(
        &self,
        signature: &str,
        args: &[U256],
        value: Option<U256>,
    ) -> Result<PendingTx, ChainError> {
        let from = self.sender.ok_or(ChainError::MissingSender)?;
        let req = CallRequest {
            from: Some(from),
            to: self.address,
            data: abi::encode_call(signature, args),
            value,
        };
        let hash = hex_hash(
            &self
                .transport
                .request("eth_sendTransaction", json!([req]))
                .await?,
        )?;
        tracing::info!(tx = %hash, method = signature, "transaction sent");
        Ok(PendingTx { hash })
    }
}

#[async_trait(?Send)]
impl<T: RpcTransport> ChainReader for TileContract<T> {
    async fn owner_of(&self, tile: TileId) -> Result<Address, ChainError> {
        let out = self.call(abi::OWNER_OF_IF_MINTED, &[tile_arg(tile)]).await?;
        abi::decode_address(&out, 0)
    }

    async fn listing_of(&self, tile: TileId) -> Result<Listing, ChainError> {
        let out = self.call(abi::LISTINGS, &[tile_arg(tile)]).await?;
        abi::decode_listing(&out)
    }

    async fn grid_size(&self) -> Result<U256, ChainError> {
        let out = self.call(abi::GRID_SIZE, &[]).await?;
        abi::decode_uint(&out, 0)
    }
}

#[async_trait(?Send)]
impl<T: RpcTransport> ChainWriter for TileContract<T> {
    async fn claim(&self, tile: TileId) -> Result<PendingTx, ChainError> {
        self.send(abi::CLAIM, &[tile_arg(tile)], None).await
    }

    async fn list_for_sale(&self, tile: TileId, price_wei: U256) -> Result<PendingTx, ChainError> {
        self.send(abi::LIST_FOR_SALE, &[tile_arg(tile), price_wei], None)
            .await
    }

    async fn cancel_listing(&self, tile: TileId) -> Result<PendingTx, ChainError> {
        self.send(abi::CANCEL_LISTING, &[tile_arg(tile)], None).await
    }

    async fn buy(&self, tile: TileId, price_wei: U256) -> Result<PendingTx, ChainError> {
        self.send(abi::BUY, &[tile_arg(tile)], Some(price_wei)).await
    }

    async fn confirm(&self, tx: &PendingTx) -> Result<(), ChainError> {
        for _ in 0..MAX_RECEIPT_POLLS {
            let receipt = self
                .transport
                .request("eth_getTransactionReceipt", json!([tx.hash]))
                .await?;
            match receipt_status(&receipt)? {
                Some(true) => return Ok(()),
                Some(false) => return Err(ChainError::Reverted(tx.hash)),
                None => TimeoutFuture::new(self.receipt_poll_ms).await,
            }
        }
        Err(ChainError::ConfirmationTimeout(tx.hash))
    }
}

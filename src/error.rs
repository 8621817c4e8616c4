//! Error types.
//!
//! `ChainError` covers everything that crosses the JSON-RPC / wallet boundary;
//! `AppError` is what the UI reports back to the user.

use alloy_primitives::B256;

use crate::model::{MAX_BATCH, MAX_SELECTION};

/// Chain access errors (reads, writes, wallet requests).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ChainError {
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Wallet error: {0}")]
    Wallet(String),

    #[error("Request rejected by the user")]
    Rejected,

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Transaction {0} reverted")]
    Reverted(B256),

    #[error("Transaction {0} was not confirmed in time")]
    ConfirmationTimeout(B256),

    #[error("No sender account for write call")]
    MissingSender,
}

impl ChainError {
    /// EIP-1193 code 4001 is a user rejection; everything else is a plain RPC error.
    pub fn from_rpc(code: i64, message: impl Into<String>) -> Self {
        if code == 4001 {
            ChainError::Rejected
        } else {
            ChainError::Rpc {
                code,
                message: message.into(),
            }
        }
    }
}

/// Errors surfaced to the user by the tile controller.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AppError {
    #[error("No wallet found. Install MetaMask or disable Brave Shields for this site.")]
    WalletNotInstalled,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("You can select at most {MAX_SELECTION} tiles at once.")]
    SelectionFull,

    #[error("Batch is full (max {MAX_BATCH}).")]
    BatchFull,

    #[error("Select or hover a tile first.")]
    NoTarget,

    #[error("Bad price: {0}")]
    BadPrice(String),

    #[error("Connect wallet first.")]
    NoWallet,

    #[error("A batch is already running.")]
    BatchBusy,

    #[error(transparent)]
    Chain(#[from] ChainError),
}

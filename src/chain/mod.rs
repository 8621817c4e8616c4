//! Chain access for the tile grid.
//!
//! # Architecture
//!
//! ```text
//! ChainReader / ChainWriter   (what the controller consumes)
//!          │
//!     TileContract<T>         (ABI calls against the tile contract)
//!          │
//!     RpcTransport            (HttpTransport | InjectedWallet)
//! ```

pub mod abi;
pub mod contract;
pub mod events;
pub mod transport;
pub mod wallet;

#[cfg(test)]
pub mod mock;

use alloy_primitives::{Address, B256, U256};
use async_trait::async_trait;

use crate::error::ChainError;
use crate::model::{BatchAction, Listing, TileId};

pub use contract::TileContract;
pub use events::TransferWatcher;
pub use transport::{HttpTransport, RpcTransport};
pub use wallet::InjectedWallet;

/// Handle of a submitted transaction whose confirmation is still outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingTx {
    pub hash: B256,
}

/// Read-only contract views.
#[async_trait(?Send)]
pub trait ChainReader {
    /// Owner of a minted tile, or the zero address.
    async fn owner_of(&self, tile: TileId) -> Result<Address, ChainError>;

    async fn listing_of(&self, tile: TileId) -> Result<Listing, ChainError>;

    async fn grid_size(&self) -> Result<U256, ChainError>;
}

/// Wallet-signed contract calls.
#[async_trait(?Send)]
pub trait ChainWriter {
    async fn claim(&self, tile: TileId) -> Result<PendingTx, ChainError>;

    async fn list_for_sale(&self, tile: TileId, price_wei: U256) -> Result<PendingTx, ChainError>;

    async fn cancel_listing(&self, tile: TileId) -> Result<PendingTx, ChainError>;

    /// Buys a listed tile, attaching `price_wei` as payment.
    async fn buy(&self, tile: TileId, price_wei: U256) -> Result<PendingTx, ChainError>;

    /// Resolves once the transaction has one confirmation.
    async fn confirm(&self, tx: &PendingTx) -> Result<(), ChainError>;
}

/// Submits one queued action and waits for its confirmation.
pub async fn execute(writer: &dyn ChainWriter, action: &BatchAction) -> Result<PendingTx, ChainError> {
    let pending = match *action {
        BatchAction::Claim { tile } => writer.claim(tile).await?,
        BatchAction::List { tile, price_wei } => writer.list_for_sale(tile, price_wei).await?,
        BatchAction::Buy { tile, price_wei } => writer.buy(tile, price_wei).await?,
        BatchAction::Cancel { tile } => writer.cancel_listing(tile).await?,
    };
    writer.confirm(&pending).await?;
    Ok(pending)
}

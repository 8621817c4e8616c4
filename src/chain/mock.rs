//! In-memory chain for tests.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};

use alloy_primitives::{Address, B256, U256};
use async_trait::async_trait;

use crate::chain::{ChainReader, ChainWriter, PendingTx};
use crate::error::ChainError;
use crate::model::{Listing, TileId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    OwnerOf(TileId),
    ListingOf(TileId),
    GridSize,
    Claim(TileId),
    List(TileId, U256),
    Cancel(TileId),
    Buy(TileId, U256),
    Confirm(B256),
}

/// Records every call; reads answer from `owners` / `listings`.
#[derive(Default)]
pub struct MockChain {
    pub calls: RefCell<Vec<Call>>,
    pub owners: RefCell<HashMap<TileId, Address>>,
    pub listings: RefCell<HashMap<TileId, Listing>>,
    pub grid: Cell<u64>,
    /// Tiles whose write call is rejected at submission.
    pub reject: RefCell<HashSet<TileId>>,
    /// Tiles whose transaction reverts at confirmation.
    pub revert: RefCell<HashSet<TileId>>,
    pub fail_reads: Cell<bool>,
    next_tx: Cell<u64>,
    tx_tiles: RefCell<HashMap<B256, TileId>>,
}

impl MockChain {
    pub fn new() -> Self {
        let chain = Self::default();
        chain.grid.set(10);
        chain
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn write_calls(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| !matches!(c, Call::OwnerOf(_) | Call::ListingOf(_) | Call::GridSize | Call::Confirm(_)))
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }

    fn read_guard(&self) -> Result<(), ChainError> {
        if self.fail_reads.get() {
            Err(ChainError::Transport("mock read failure".into()))
        } else {
            Ok(())
        }
    }

    fn submit(&self, tile: TileId, call: Call) -> Result<PendingTx, ChainError> {
        self.record(call);
        if self.reject.borrow().contains(&tile) {
            return Err(ChainError::Rejected);
        }
        let n = self.next_tx.get() + 1;
        self.next_tx.set(n);
        let hash = B256::left_padding_from(&n.to_be_bytes());
        self.tx_tiles.borrow_mut().insert(hash, tile);
        Ok(PendingTx { hash })
    }
}

#[async_trait(?Send)]
impl ChainReader for MockChain {
    async fn owner_of(&self, tile: TileId) -> Result<Address, ChainError> {
        self.record(Call::OwnerOf(tile));
        self.read_guard()?;
        Ok(self.owners.borrow().get(&tile).copied().unwrap_or(Address::ZERO))
    }

    async fn listing_of(&self, tile: TileId) -> Result<Listing, ChainError> {
        self.record(Call::ListingOf(tile));
        self.read_guard()?;
        Ok(self.listings.borrow().get(&tile).copied().unwrap_or_default())
    }

    async fn grid_size(&self) -> Result<U256, ChainError> {
        self.record(Call::GridSize);
        self.read_guard()?;
        Ok(U256::from(self.grid.get()))
    }
}

#[async_trait(?Send)]
impl ChainWriter for MockChain {
    async fn claim(&self, tile: TileId) -> Result<PendingTx, ChainError> {
        self.submit(tile, Call::Claim(tile))
    }

    async fn list_for_sale(&self, tile: TileId, price_wei: U256) -> Result<PendingTx, ChainError> {
        self.submit(tile, Call::List(tile, price_wei))
    }

    async fn cancel_listing(&self, tile: TileId) -> Result<PendingTx, ChainError> {
        self.submit(tile, Call::Cancel(tile))
    }

    async fn buy(&self, tile: TileId, price_wei: U256) -> Result<PendingTx, ChainError> {
        self.submit(tile, Call::Buy(tile, price_wei))
    }

    async fn confirm(&self, tx: &PendingTx) -> Result<(), ChainError> {
        self.record(Call::Confirm(tx.hash));
        let tile = self.tx_tiles.borrow().get(&tx.hash).copied();
        match tile {
            Some(tile) if self.revert.borrow().contains(&tile) => Err(ChainError::Reverted(tx.hash)),
            Some(_) => Ok(()),
            None => Err(ChainError::Decode("unknown tx".into())),
        }
    }
}

//! Core data models for the tile grid.
//! Tile ids, grid geometry, on-chain listing data and the batch action records.

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

use crate::util::format_wei;

/// Hard cap on simultaneously selected tiles.
pub const MAX_SELECTION: usize = 10;
/// Hard cap on queued batch actions, also the per-flush processing limit.
pub const MAX_BATCH: usize = 10;
/// How long a hover highlight lingers after the pointer moves on.
pub const HOVER_RETAIN_MS: u32 = 1000;
/// Quiet period before the hovered tile's metadata is fetched.
pub const META_DEBOUNCE_MS: u32 = 120;
/// Grid size used until the contract reports its own.
pub const DEFAULT_GRID_SIZE: u32 = 316;
/// Larger grids than this are rejected when read from chain.
pub const MAX_GRID_SIZE: u32 = 4096;

pub type TileId = u64;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: u32,
    pub y: u32,
}

impl Position {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// Square N×N grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    pub size: u32,
}

impl Default for Grid {
    fn default() -> Self {
        Self {
            size: DEFAULT_GRID_SIZE,
        }
    }
}

impl Grid {
    pub fn new(size: u32) -> Self {
        Self { size: size.max(1) }
    }

    pub fn tile_count(&self) -> u64 {
        self.size as u64 * self.size as u64
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.x < self.size && pos.y < self.size
    }

    pub fn tile_id(&self, pos: Position) -> TileId {
        pos.y as u64 * self.size as u64 + pos.x as u64
    }

    pub fn position(&self, id: TileId) -> Position {
        let n = self.size as u64;
        Position {
            x: (id % n) as u32,
            y: (id / n) as u32,
        }
    }

    /// Maps a pointer offset (canvas pixels) to the tile under it.
    pub fn tile_at_pixel(&self, offset_x: f64, offset_y: f64, pixel: u32) -> Option<Position> {
        if pixel == 0 || offset_x < 0.0 || offset_y < 0.0 {
            return None;
        }
        let x = (offset_x / pixel as f64).floor();
        let y = (offset_y / pixel as f64).floor();
        if x >= self.size as f64 || y >= self.size as f64 {
            return None;
        }
        Some(Position::new(x as u32, y as u32))
    }

    /// Accepts a grid size reported by the contract.
    pub fn from_chain(value: U256) -> Option<Self> {
        let size: u32 = value.try_into().ok()?;
        (size > 0 && size <= MAX_GRID_SIZE).then(|| Self::new(size))
    }
}

/// Seller/price pair recorded against a tile. A zero seller means "not listed".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    pub seller: Address,
    pub price_wei: U256,
}

impl Listing {
    pub fn is_active(&self) -> bool {
        self.seller != Address::ZERO
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TileStatus {
    Unclaimed,
    Listed,
    Owned,
}

impl TileStatus {
    pub fn label(&self) -> &'static str {
        match self {
            TileStatus::Unclaimed => "Unclaimed",
            TileStatus::Listed => "Listed",
            TileStatus::Owned => "Owned",
        }
    }
}

/// Which action box the sidebar offers for the inspected tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActionPanel {
    Claim,
    List,
    /// Buy at the listing price, or cancel the listing.
    Buy { price_wei: U256 },
}

/// Ephemeral on-chain view of one tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TileMeta {
    pub owner: Option<Address>,
    pub listing: Listing,
}

impl TileMeta {
    pub fn new(owner: Address, listing: Listing) -> Self {
        Self {
            owner: (owner != Address::ZERO).then_some(owner),
            listing,
        }
    }

    pub fn status(&self) -> TileStatus {
        match self.owner {
            None => TileStatus::Unclaimed,
            Some(_) if self.listing.is_active() => TileStatus::Listed,
            Some(_) => TileStatus::Owned,
        }
    }

    pub fn panel(&self) -> ActionPanel {
        match self.status() {
            TileStatus::Unclaimed => ActionPanel::Claim,
            TileStatus::Listed => ActionPanel::Buy {
                price_wei: self.listing.price_wei,
            },
            TileStatus::Owned => ActionPanel::List,
        }
    }

    pub fn price(&self) -> Option<U256> {
        matches!(self.status(), TileStatus::Listed).then_some(self.listing.price_wei)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionKind {
    Claim,
    List,
    Buy,
    Cancel,
}

/// One queued on-chain action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BatchAction {
    Claim { tile: TileId },
    List { tile: TileId, price_wei: U256 },
    Buy { tile: TileId, price_wei: U256 },
    Cancel { tile: TileId },
}

impl BatchAction {
    pub fn kind(&self) -> ActionKind {
        match self {
            BatchAction::Claim { .. } => ActionKind::Claim,
            BatchAction::List { .. } => ActionKind::List,
            BatchAction::Buy { .. } => ActionKind::Buy,
            BatchAction::Cancel { .. } => ActionKind::Cancel,
        }
    }

    pub fn tile(&self) -> TileId {
        match *self {
            BatchAction::Claim { tile }
            | BatchAction::List { tile, .. }
            | BatchAction::Buy { tile, .. }
            | BatchAction::Cancel { tile } => tile,
        }
    }

    pub fn price_wei(&self) -> Option<U256> {
        match *self {
            BatchAction::List { price_wei, .. } | BatchAction::Buy { price_wei, .. } => {
                Some(price_wei)
            }
            _ => None,
        }
    }

    /// Line shown in the batch list, e.g. `LIST tile #12 @ 0.5 ETH`.
    pub fn describe(&self) -> String {
        let verb = match self.kind() {
            ActionKind::Claim => "CLAIM",
            ActionKind::List => "LIST",
            ActionKind::Buy => "BUY",
            ActionKind::Cancel => "CANCEL",
        };
        match self.price_wei() {
            Some(price) => format!("{} tile #{} @ {}", verb, self.tile(), format_wei(price)),
            None => format!("{} tile #{}", verb, self.tile()),
        }
    }
}

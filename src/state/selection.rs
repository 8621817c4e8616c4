// Selected tiles, capped at MAX_SELECTION. Insertion order is kept so batch
// targets come out in the order the user clicked them.

use crate::error::AppError;
use crate::model::{MAX_SELECTION, TileId};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Selection {
    tiles: Vec<TileId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Selected,
    Deselected,
}

impl Selection {
    pub fn contains(&self, tile: TileId) -> bool {
        self.tiles.contains(&tile)
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn tiles(&self) -> &[TileId] {
        &self.tiles
    }

    pub fn toggle(&mut self, tile: TileId) -> Result<Toggle, AppError> {
        if let Some(i) = self.tiles.iter().position(|t| *t == tile) {
            self.tiles.remove(i);
            return Ok(Toggle::Deselected);
        }
        if self.tiles.len() >= MAX_SELECTION {
            return Err(AppError::SelectionFull);
        }
        self.tiles.push(tile);
        Ok(Toggle::Selected)
    }

    /// Empties the set, handing back what was selected so it can be repainted.
    pub fn clear(&mut self) -> Vec<TileId> {
        std::mem::take(&mut self.tiles)
    }
}

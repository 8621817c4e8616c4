// Current hover tile.

use crate::model::{Position, TileId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hovered {
    pub id: TileId,
    pub pos: Position,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct HoverTracker {
    current: Option<Hovered>,
}

impl HoverTracker {
    pub fn current(&self) -> Option<Hovered> {
        self.current
    }

    pub fn is_hovered(&self, tile: TileId) -> bool {
        self.current.is_some_and(|h| h.id == tile)
    }

    /// Moves the hover. Returns the tile that was left behind, or `None` if the
    /// pointer is still on the same tile (in which case nothing changes).
    pub fn enter(&mut self, next: Hovered) -> Option<Option<Hovered>> {
        if self.current == Some(next) {
            return None;
        }
        Some(self.current.replace(next))
    }

    pub fn leave(&mut self) -> Option<Hovered> {
        self.current.take()
    }
}

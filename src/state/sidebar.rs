// What the tile info sidebar currently shows.

use crate::model::{ActionPanel, Position, TileId, TileMeta};

/// Action box of the last tile whose metadata loaded. It outlives the hover so
/// the user can move the pointer off the canvas and click it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelTarget {
    pub panel: ActionPanel,
    pub tile: TileId,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Sidebar {
    /// Tile being inspected; `None` shows the "Hover a tile" placeholder.
    pub tile: Option<(TileId, Position)>,
    /// Metadata loaded for `tile`.
    pub meta: Option<TileMeta>,
    pub action: Option<PanelTarget>,
}

impl Sidebar {
    pub fn title(&self) -> String {
        match self.tile {
            Some((id, _)) => format!("Tile #{}", id),
            None => "Hover a tile".to_string(),
        }
    }

    pub fn inspect(&mut self, id: TileId, pos: Position) {
        if self.tile.map(|(t, _)| t) != Some(id) {
            self.meta = None;
        }
        self.tile = Some((id, pos));
    }

    pub fn show_meta(&mut self, tile: TileId, meta: TileMeta) {
        self.meta = Some(meta);
        self.action = Some(PanelTarget {
            panel: meta.panel(),
            tile,
        });
    }

    /// Back to the placeholder text. The action box stays.
    pub fn reset(&mut self) {
        self.tile = None;
        self.meta = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Listing;
    use alloy_primitives::Address;

    #[test]
    fn reset_keeps_the_action_box() {
        let mut sidebar = Sidebar::default();
        assert_eq!(sidebar.title(), "Hover a tile");
        sidebar.inspect(7, Position::new(7, 0));
        sidebar.show_meta(7, TileMeta::new(Address::ZERO, Listing::default()));
        assert_eq!(sidebar.title(), "Tile #7");
        sidebar.reset();
        assert_eq!(sidebar.title(), "Hover a tile");
        assert_eq!(sidebar.meta, None);
        assert_eq!(
            sidebar.action,
            Some(PanelTarget {
                panel: ActionPanel::Claim,
                tile: 7
            })
        );
    }
}

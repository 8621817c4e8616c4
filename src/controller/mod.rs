//! Tile interaction controller.
//!
//! Owns selection, hover, the action batch and the sidebar view, and drives a
//! [`TileCanvas`] so that every state change repaints exactly the tiles it
//! touched. Chain access goes through the injected reader and the session's
//! writer; the async parts live in [`flows`].

pub mod flows;
pub mod web;

use std::rc::Rc;

use alloy_primitives::{Address, U256};

use crate::chain::{ChainReader, ChainWriter};
use crate::config::PixelBounds;
use crate::error::{AppError, ChainError};
use crate::model::{
    ActionPanel, BatchAction, Grid, HOVER_RETAIN_MS, META_DEBOUNCE_MS, Position, TileId, TileMeta,
};
use crate::render::TileCanvas;
use crate::state::{
    BatchQueue, EnqueueOutcome, HoverTracker, Hovered, KeyedTimers, Scheduler, Selection, Sidebar,
    TimerKey, Toggle,
};
use crate::util::{parse_price, short_address};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warn,
    Error,
}

/// Transient message shown under the controls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

/// Connected account plus its write-capable contract handle.
#[derive(Clone)]
pub struct Session {
    pub account: Address,
    pub writer: Rc<dyn ChainWriter>,
}

pub struct TileController<C, S: Scheduler> {
    grid: Grid,
    pixel: u32,
    bounds: PixelBounds,
    canvas: C,
    scheduler: S,
    timers: KeyedTimers<S::Handle>,
    selection: Selection,
    hover: HoverTracker,
    batch: BatchQueue,
    sidebar: Sidebar,
    reader: Rc<dyn ChainReader>,
    session: Option<Session>,
    // bumped whenever the session is torn down; in-flight flows compare it
    epoch: u64,
    flushing: bool,
    status: String,
    notice: Option<Notice>,
}

impl<C: TileCanvas, S: Scheduler> TileController<C, S> {
    pub fn new(
        grid: Grid,
        bounds: PixelBounds,
        canvas: C,
        scheduler: S,
        reader: Rc<dyn ChainReader>,
    ) -> Self {
        Self {
            grid,
            pixel: bounds.default.clamp(bounds.min.max(1), bounds.max.max(1)),
            bounds,
            canvas,
            scheduler,
            timers: KeyedTimers::default(),
            selection: Selection::default(),
            hover: HoverTracker::default(),
            batch: BatchQueue::default(),
            sidebar: Sidebar::default(),
            reader,
            session: None,
            epoch: 0,
            flushing: false,
            status: "not connected".to_string(),
            notice: None,
        }
    }

    pub fn grid(&self) -> Grid {
        self.grid
    }

    pub fn pixel(&self) -> u32 {
        self.pixel
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn hovered(&self) -> Option<Hovered> {
        self.hover.current()
    }

    pub fn batch(&self) -> &BatchQueue {
        &self.batch
    }

    pub fn sidebar(&self) -> &Sidebar {
        &self.sidebar
    }

    pub fn canvas_mut(&mut self) -> &mut C {
        &mut self.canvas
    }

    #[cfg(test)]
    pub fn canvas(&self) -> &C {
        &self.canvas
    }

    pub fn reader(&self) -> Rc<dyn ChainReader> {
        self.reader.clone()
    }

    pub fn set_reader(&mut self, reader: Rc<dyn ChainReader>) {
        self.reader = reader;
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn notify(&mut self, level: NoticeLevel, text: impl Into<String>) {
        self.notice = Some(Notice {
            level,
            text: text.into(),
        });
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    /// Records a user-facing error as a notice and hands it back.
    pub fn report(&mut self, err: AppError) -> AppError {
        let level = match err {
            AppError::Chain(_) | AppError::WalletNotInstalled | AppError::Config(_) => {
                NoticeLevel::Error
            }
            _ => NoticeLevel::Warn,
        };
        self.notify(level, err.to_string());
        err
    }

    fn repaint(&mut self, id: TileId) {
        let pos = self.grid.position(id);
        self.canvas.redraw_base_tile(pos);
        if self.hover.is_hovered(id) {
            self.canvas.draw_hover_outline(pos);
        }
        if self.selection.contains(id) {
            self.canvas.draw_selection_outline(pos);
        }
    }

    /// Full repaint: checkerboard, then selection and hover outlines.
    pub fn reset_view(&mut self) {
        self.canvas.reset(self.grid, self.pixel);
        for &id in self.selection.tiles() {
            self.canvas.draw_selection_outline(self.grid.position(id));
        }
        if let Some(h) = self.hover.current() {
            self.canvas.draw_hover_outline(h.pos);
        }
    }

    pub fn set_pixel_scale(&mut self, raw: &str) {
        self.pixel = self.bounds.clamp_input(raw);
        self.reset_view();
    }

    /// Adopts the contract's grid size. Selection and hover refer to old ids and are dropped.
    pub fn set_grid(&mut self, grid: Grid) {
        if grid == self.grid {
            return;
        }
        tracing::info!(size = grid.size, "grid size changed");
        self.grid = grid;
        self.selection.clear();
        self.hover.leave();
        self.timers.clear();
        self.sidebar.reset();
        self.sidebar.action = None;
        self.reset_view();
    }

    pub fn toggle_selection(&mut self, id: TileId) -> Result<Toggle, AppError> {
        let toggle = self.selection.toggle(id).map_err(|e| self.report(e))?;
        self.repaint(id);
        Ok(toggle)
    }

    pub fn click_at(&mut self, offset_x: f64, offset_y: f64) -> Result<Option<Toggle>, AppError> {
        let Some(pos) = self.grid.tile_at_pixel(offset_x, offset_y, self.pixel) else {
            return Ok(None);
        };
        self.toggle_selection(self.grid.tile_id(pos)).map(Some)
    }

    pub fn clear_selection(&mut self) {
        for id in self.selection.clear() {
            self.repaint(id);
        }
    }

    pub fn selection_label(&self) -> String {
        if self.selection.is_empty() {
            String::new()
        } else {
            format!("Selected: {}", self.selection.len())
        }
    }

    pub fn pointer_moved(&mut self, offset_x: f64, offset_y: f64) {
        if let Some(pos) = self.grid.tile_at_pixel(offset_x, offset_y, self.pixel) {
            self.hover_tile(pos);
        }
    }

    pub fn hover_tile(&mut self, pos: Position) {
        let next = Hovered {
            id: self.grid.tile_id(pos),
            pos,
        };
        let Some(previous) = self.hover.enter(next) else {
            return;
        };
        if let Some(prev) = previous {
            self.timers
                .arm(&self.scheduler, TimerKey::Release(prev.id), HOVER_RETAIN_MS);
        }
        self.canvas.draw_hover_outline(pos);
        if self.selection.contains(next.id) {
            self.canvas.draw_selection_outline(pos);
        }
        self.timers
            .arm(&self.scheduler, TimerKey::MetaFetch, META_DEBOUNCE_MS);
    }

    pub fn pointer_left(&mut self) {
        if let Some(prev) = self.hover.leave() {
            self.timers
                .arm(&self.scheduler, TimerKey::Release(prev.id), HOVER_RETAIN_MS);
        }
        self.timers.cancel(TimerKey::MetaFetch);
        self.sidebar.reset();
    }

    /// Handles a fired timer. Returns the tile whose metadata should now be loaded.
    pub fn on_timer(&mut self, key: TimerKey) -> Option<TileId> {
        if !self.timers.fired(key) {
            return None;
        }
        match key {
            TimerKey::Release(id) => {
                if !self.selection.contains(id) && !self.hover.is_hovered(id) {
                    self.canvas.redraw_base_tile(self.grid.position(id));
                }
                None
            }
            TimerKey::MetaFetch => {
                let h = self.hover.current()?;
                self.sidebar.inspect(h.id, h.pos);
                Some(h.id)
            }
        }
    }

    /// True when a transfer of `tile` should refresh the sidebar.
    pub fn transfer_observed(&mut self, tile: TileId) -> bool {
        match self.hover.current() {
            Some(h) if h.id == tile => {
                self.sidebar.inspect(h.id, h.pos);
                true
            }
            _ => false,
        }
    }

    /// Applies a finished metadata fetch. Results for a tile no longer hovered are dropped.
    pub fn apply_meta(&mut self, tile: TileId, result: Result<TileMeta, ChainError>) {
        match result {
            Ok(meta) if self.hover.is_hovered(tile) => {
                self.sidebar.show_meta(tile, meta);
            }
            Ok(_) => tracing::debug!(tile, "stale metadata discarded"),
            Err(e) => tracing::warn!(tile, error = %e, "metadata load failed"),
        }
    }

    /// Selected tiles, or the tile behind the action box when nothing is selected.
    pub fn targets(&self) -> Vec<TileId> {
        if !self.selection.is_empty() {
            return self.selection.tiles().to_vec();
        }
        self.sidebar
            .action
            .map(|a| vec![a.tile])
            .or_else(|| self.hover.current().map(|h| vec![h.id]))
            .unwrap_or_default()
    }

    pub fn enqueue(&mut self, actions: Vec<BatchAction>) -> EnqueueOutcome {
        let outcome = self.batch.enqueue(actions);
        if outcome.dropped > 0 {
            tracing::warn!(dropped = outcome.dropped, "batch full");
            self.notify(NoticeLevel::Warn, AppError::BatchFull.to_string());
        }
        outcome
    }

    fn enqueue_for_targets(
        &mut self,
        build: impl Fn(TileId) -> BatchAction,
    ) -> Result<EnqueueOutcome, AppError> {
        let targets = self.targets();
        if targets.is_empty() {
            return Err(self.report(AppError::NoTarget));
        }
        Ok(self.enqueue(targets.into_iter().map(build).collect()))
    }

    pub fn queue_claim(&mut self) -> Result<EnqueueOutcome, AppError> {
        self.enqueue_for_targets(|tile| BatchAction::Claim { tile })
    }

    pub fn queue_list(&mut self, price_input: &str) -> Result<EnqueueOutcome, AppError> {
        let price_wei = parse_price(price_input)
            .ok_or_else(|| self.report(AppError::BadPrice(price_input.trim().to_string())))?;
        self.enqueue_for_targets(|tile| BatchAction::List { tile, price_wei })
    }

    /// Buys at the price of the listing shown in the action box.
    pub fn queue_buy(&mut self) -> Result<EnqueueOutcome, AppError> {
        let price_wei = self.listing_price().ok_or_else(|| self.report(AppError::NoTarget))?;
        self.enqueue_for_targets(|tile| BatchAction::Buy { tile, price_wei })
    }

    pub fn queue_cancel(&mut self) -> Result<EnqueueOutcome, AppError> {
        self.enqueue_for_targets(|tile| BatchAction::Cancel { tile })
    }

    fn listing_price(&self) -> Option<U256> {
        match self.sidebar.action?.panel {
            ActionPanel::Buy { price_wei } => Some(price_wei),
            _ => None,
        }
    }

    pub fn clear_batch(&mut self) {
        self.batch.clear();
    }

    pub fn is_flushing(&self) -> bool {
        self.flushing
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Also used for account switches; a running flush stops after its current entry.
    pub fn connect_session(&mut self, account: Address, writer: Rc<dyn ChainWriter>) {
        tracing::info!(account = %account, "wallet connected");
        self.epoch += 1;
        self.status = format!("connected {}", short_address(&account));
        self.session = Some(Session { account, writer });
    }

    /// Chain change: drop signer, writer and queued actions.
    pub fn reset_session(&mut self, reader: Rc<dyn ChainReader>) {
        tracing::warn!(queued = self.batch.len(), "network changed, session reset");
        self.session = None;
        self.epoch += 1;
        self.batch.clear();
        self.reader = reader;
        self.status = "network changed, reconnect wallet".to_string();
    }

    pub fn end_session(&mut self) {
        self.session = None;
        self.epoch += 1;
        self.status = "not connected".to_string();
    }
}

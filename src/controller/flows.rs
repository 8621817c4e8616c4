// Async flows over a shared controller. No `RefCell` borrow is held across an
// `.await`: each step borrows, copies what it needs out and drops the borrow.

use std::cell::RefCell;

use crate::chain::{self, ChainReader};
use crate::controller::{NoticeLevel, TileController};
use crate::error::{AppError, ChainError};
use crate::model::{Grid, MAX_BATCH, TileId, TileMeta};
use crate::render::TileCanvas;
use crate::state::Scheduler;

/// Outcome of one `run_batch` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushReport {
    pub confirmed: usize,
    pub failed: usize,
    /// The session was reset while the batch was running.
    pub aborted: bool,
}

/// Ownership and listing reads, issued concurrently.
pub async fn fetch_tile_meta(reader: &dyn ChainReader, tile: TileId) -> Result<TileMeta, ChainError> {
    let (owner, listing) = futures::try_join!(reader.owner_of(tile), reader.listing_of(tile))?;
    Ok(TileMeta::new(owner, listing))
}

pub async fn load_tile_meta<C: TileCanvas, S: Scheduler>(
    ctrl: &RefCell<TileController<C, S>>,
    tile: TileId,
) {
    let reader = ctrl.borrow().reader();
    let result = fetch_tile_meta(&*reader, tile).await;
    ctrl.borrow_mut().apply_meta(tile, result);
}

/// Reads `GRID_SIZE()` and resizes the grid. Failures keep the current size.
pub async fn sync_grid_size<C: TileCanvas, S: Scheduler>(ctrl: &RefCell<TileController<C, S>>) {
    let reader = ctrl.borrow().reader();
    match reader.grid_size().await {
        Ok(value) => match Grid::from_chain(value) {
            Some(grid) => ctrl.borrow_mut().set_grid(grid),
            None => tracing::warn!(value = %value, "ignoring out-of-range grid size"),
        },
        Err(e) => tracing::warn!(error = %e, "grid size read failed, keeping default"),
    }
}

/// Submits queued actions one at a time, oldest first, waiting for each
/// confirmation before the next submission. A failed entry is logged and
/// dropped; the rest still run.
pub async fn run_batch<C: TileCanvas, S: Scheduler>(
    ctrl: &RefCell<TileController<C, S>>,
) -> Result<FlushReport, AppError> {
    let (writer, epoch) = {
        let mut c = ctrl.borrow_mut();
        let writer = c.session().map(|s| s.writer.clone());
        let Some(writer) = writer else {
            return Err(c.report(AppError::NoWallet));
        };
        if c.flushing {
            return Err(c.report(AppError::BatchBusy));
        }
        c.flushing = true;
        (writer, c.epoch)
    };

    let mut report = FlushReport::default();
    for _ in 0..MAX_BATCH {
        let Some(action) = ctrl.borrow().batch.front() else {
            break;
        };
        tracing::info!(tile = action.tile(), kind = ?action.kind(), "submitting batch action");
        let result = chain::execute(&*writer, &action).await;

        let mut c = ctrl.borrow_mut();
        match result {
            Ok(tx) => {
                tracing::info!(tile = action.tile(), tx = %tx.hash, "batch action confirmed");
                report.confirmed += 1;
            }
            Err(e) => {
                tracing::error!(tile = action.tile(), error = %e, "batch action failed");
                c.notify(
                    NoticeLevel::Error,
                    format!("{} failed: {}", action.describe(), e),
                );
                report.failed += 1;
            }
        }
        // a session reset may already have emptied the queue
        if c.batch.front() == Some(action) {
            c.batch.pop_front();
        }
        if c.epoch != epoch {
            report.aborted = true;
            break;
        }
    }

    let mut c = ctrl.borrow_mut();
    c.flushing = false;
    if report.failed == 0 && !report.aborted && report.confirmed > 0 {
        c.notify(
            NoticeLevel::Info,
            format!("{} action(s) confirmed", report.confirmed),
        );
    }
    tracing::info!(?report, remaining = c.batch.len(), "batch finished");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use std::rc::{Rc, Weak};

    use alloy_primitives::{Address, U256};
    use async_trait::async_trait;
    use futures::executor::block_on;

    use super::*;
    use crate::chain::mock::{Call, MockChain};
    use crate::chain::{ChainWriter, PendingTx};
    use crate::controller::tests::{TestController, controller, run_timers};
    use crate::model::{BatchAction, Listing, Position};

    /// Writer that changes the session right after a claim is submitted.
    struct InterruptingWriter {
        chain: Rc<MockChain>,
        ctrl: Weak<RefCell<TestController>>,
        on_claim: fn(&mut TestController, &Rc<MockChain>),
    }

    #[async_trait(?Send)]
    impl ChainWriter for InterruptingWriter {
        async fn claim(&self, tile: TileId) -> Result<PendingTx, ChainError> {
            let tx = self.chain.claim(tile).await?;
            if let Some(ctrl) = self.ctrl.upgrade() {
                (self.on_claim)(&mut ctrl.borrow_mut(), &self.chain);
            }
            Ok(tx)
        }

        async fn list_for_sale(&self, tile: TileId, price_wei: U256) -> Result<PendingTx, ChainError> {
            self.chain.list_for_sale(tile, price_wei).await
        }

        async fn cancel_listing(&self, tile: TileId) -> Result<PendingTx, ChainError> {
            self.chain.cancel_listing(tile).await
        }

        async fn buy(&self, tile: TileId, price_wei: U256) -> Result<PendingTx, ChainError> {
            self.chain.buy(tile, price_wei).await
        }

        async fn confirm(&self, tx: &PendingTx) -> Result<(), ChainError> {
            self.chain.confirm(tx).await
        }
    }

    fn interrupted(
        on_claim: fn(&mut TestController, &Rc<MockChain>),
    ) -> (Rc<MockChain>, Rc<RefCell<TestController>>) {
        let chain = Rc::new(MockChain::new());
        let (ctrl, _) = controller(&chain);
        let ctrl = Rc::new(RefCell::new(ctrl));
        let writer = Rc::new(InterruptingWriter {
            chain: chain.clone(),
            ctrl: Rc::downgrade(&ctrl),
            on_claim,
        });
        ctrl.borrow_mut()
            .connect_session(Address::repeat_byte(0xaa), writer);
        ctrl.borrow_mut().enqueue(vec![
            BatchAction::Claim { tile: 5 },
            BatchAction::Claim { tile: 6 },
        ]);
        (chain, ctrl)
    }

    fn queued(ctrl: &RefCell<TestController>) -> Vec<BatchAction> {
        ctrl.borrow().batch().iter().copied().collect()
    }

    fn connected(chain: &Rc<MockChain>) -> RefCell<TestController> {
        let (mut ctrl, _) = controller(chain);
        ctrl.connect_session(Address::repeat_byte(0xaa), chain.clone());
        RefCell::new(ctrl)
    }

    #[test]
    fn flush_without_wallet_issues_nothing() {
        let chain = Rc::new(MockChain::new());
        let (mut ctrl, _) = controller(&chain);
        ctrl.enqueue((0..10).map(|tile| BatchAction::Claim { tile }).collect());
        let ctrl = RefCell::new(ctrl);
        assert_eq!(block_on(run_batch(&ctrl)), Err(AppError::NoWallet));
        assert!(chain.calls().is_empty());
        assert_eq!(ctrl.borrow().batch().len(), 10);
    }

    #[test]
    fn flush_runs_in_order_and_sequentially() {
        let chain = Rc::new(MockChain::new());
        let ctrl = connected(&chain);
        let price = U256::from(9u64);
        ctrl.borrow_mut().enqueue(vec![
            BatchAction::Claim { tile: 1 },
            BatchAction::List { tile: 2, price_wei: price },
            BatchAction::Buy { tile: 3, price_wei: price },
            BatchAction::Cancel { tile: 4 },
        ]);
        let report = block_on(run_batch(&ctrl)).unwrap();
        assert_eq!(
            report,
            FlushReport {
                confirmed: 4,
                failed: 0,
                aborted: false
            }
        );
        let calls = chain.calls();
        // every submission is followed by its confirmation before the next one
        assert_eq!(calls.len(), 8);
        assert_eq!(calls[0], Call::Claim(1));
        assert!(matches!(calls[1], Call::Confirm(_)));
        assert_eq!(calls[2], Call::List(2, price));
        assert!(matches!(calls[3], Call::Confirm(_)));
        assert_eq!(calls[4], Call::Buy(3, price));
        assert!(matches!(calls[5], Call::Confirm(_)));
        assert_eq!(calls[6], Call::Cancel(4));
        assert!(matches!(calls[7], Call::Confirm(_)));
        assert!(ctrl.borrow().batch().is_empty());
        assert!(!ctrl.borrow().is_flushing());
    }

    #[test]
    fn failures_do_not_stop_the_queue() {
        let chain = Rc::new(MockChain::new());
        chain.reject.borrow_mut().insert(2);
        chain.revert.borrow_mut().insert(4);
        let ctrl = connected(&chain);
        ctrl.borrow_mut()
            .enqueue((1..=5).map(|tile| BatchAction::Claim { tile }).collect());
        let report = block_on(run_batch(&ctrl)).unwrap();
        assert_eq!(report.confirmed, 3);
        assert_eq!(report.failed, 2);
        assert_eq!(
            chain.write_calls(),
            (1..=5).map(Call::Claim).collect::<Vec<_>>()
        );
        assert!(ctrl.borrow().batch().is_empty());
        assert_eq!(
            ctrl.borrow().notice().map(|n| n.level),
            Some(NoticeLevel::Error)
        );
    }

    #[test]
    fn flush_while_running_is_rejected() {
        let chain = Rc::new(MockChain::new());
        let ctrl = connected(&chain);
        ctrl.borrow_mut().flushing = true;
        assert_eq!(block_on(run_batch(&ctrl)), Err(AppError::BatchBusy));
        assert!(chain.calls().is_empty());
    }

    #[test]
    fn session_reset_clears_queue_and_blocks_flush() {
        let chain = Rc::new(MockChain::new());
        let ctrl = connected(&chain);
        ctrl.borrow_mut()
            .enqueue((0..3).map(|tile| BatchAction::Claim { tile }).collect());
        ctrl.borrow_mut().reset_session(chain.clone());
        assert!(ctrl.borrow().batch().is_empty());
        assert_eq!(block_on(run_batch(&ctrl)), Err(AppError::NoWallet));
    }

    #[test]
    fn disconnect_mid_flush_drops_the_submitted_entry() {
        let (chain, ctrl) = interrupted(|c, _| c.end_session());
        let report = block_on(run_batch(&ctrl)).unwrap();
        assert!(report.aborted);
        assert_eq!(report.confirmed, 1);
        assert_eq!(chain.write_calls(), vec![Call::Claim(5)]);
        assert_eq!(queued(&ctrl), vec![BatchAction::Claim { tile: 6 }]);
        assert!(!ctrl.borrow().is_flushing());
    }

    #[test]
    fn network_change_mid_flush_empties_the_queue() {
        let (chain, ctrl) = interrupted(|c, chain| c.reset_session(chain.clone()));
        let report = block_on(run_batch(&ctrl)).unwrap();
        assert!(report.aborted);
        assert_eq!(chain.write_calls(), vec![Call::Claim(5)]);
        assert!(queued(&ctrl).is_empty());
        assert_eq!(block_on(run_batch(&ctrl)), Err(AppError::NoWallet));
    }

    #[test]
    fn account_switch_mid_flush_stops_the_old_writer() {
        let (chain, ctrl) =
            interrupted(|c, chain| c.connect_session(Address::repeat_byte(0xbb), chain.clone()));
        let report = block_on(run_batch(&ctrl)).unwrap();
        assert!(report.aborted);
        assert_eq!(chain.write_calls(), vec![Call::Claim(5)]);
        assert_eq!(queued(&ctrl), vec![BatchAction::Claim { tile: 6 }]);

        // the next flush runs with the new account's writer
        let report = block_on(run_batch(&ctrl)).unwrap();
        assert!(!report.aborted);
        assert_eq!(chain.write_calls(), vec![Call::Claim(5), Call::Claim(6)]);
        assert!(queued(&ctrl).is_empty());
    }

    #[test]
    fn metadata_flow_classifies_hovered_tile() {
        let chain = Rc::new(MockChain::new());
        let seller = Address::repeat_byte(5);
        chain.owners.borrow_mut().insert(34, seller);
        chain.listings.borrow_mut().insert(
            34,
            Listing {
                seller,
                price_wei: U256::from(100u64),
            },
        );
        let (mut ctrl, sched) = controller(&chain);
        ctrl.hover_tile(Position::new(4, 3));
        let due = run_timers(&mut ctrl, &sched, 120);
        assert_eq!(due, vec![34]);
        let ctrl = RefCell::new(ctrl);
        block_on(load_tile_meta(&ctrl, 34));
        let meta = ctrl.borrow().sidebar().meta.unwrap();
        assert_eq!(meta.price(), Some(U256::from(100u64)));
        assert_eq!(
            chain.calls(),
            vec![Call::OwnerOf(34), Call::ListingOf(34)]
        );
    }

    #[test]
    fn read_failure_is_swallowed() {
        let chain = Rc::new(MockChain::new());
        chain.fail_reads.set(true);
        let (mut ctrl, _) = controller(&chain);
        ctrl.hover_tile(Position::new(1, 0));
        let ctrl = RefCell::new(ctrl);
        block_on(load_tile_meta(&ctrl, 1));
        assert_eq!(ctrl.borrow().sidebar().meta, None);
        block_on(sync_grid_size(&ctrl));
        assert_eq!(ctrl.borrow().grid(), Grid::new(10));
    }

    #[test]
    fn grid_size_is_adopted_from_chain() {
        let chain = Rc::new(MockChain::new());
        chain.grid.set(64);
        let (ctrl, _) = controller(&chain);
        let ctrl = RefCell::new(ctrl);
        block_on(sync_grid_size(&ctrl));
        assert_eq!(ctrl.borrow().grid(), Grid::new(64));
    }
}

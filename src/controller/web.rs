//! Browser wiring around a shared [`TileController`]: gloo timers, the
//! injected wallet and its provider events, and the transfer watcher.
//!
//! Every async step runs on `spawn_local` and calls `refresh` when it has
//! changed something the components render.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use alloy_primitives::{Address, U256};
use serde_json::Value;
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::spawn_local;
use yew::Callback;

use crate::chain::wallet::{event_payload, first_account};
use crate::chain::{ChainReader, HttpTransport, InjectedWallet, TileContract, TransferWatcher};
use crate::config::AppConfig;
use crate::controller::{TileController, flows};
use crate::error::{AppError, ChainError};
use crate::model::{Grid, TileId};
use crate::render::Canvas2dRenderer;
use crate::state::{GlooScheduler, TimerKey};

pub type WebController = TileController<Canvas2dRenderer, GlooScheduler>;
pub type SharedController = Rc<RefCell<WebController>>;

fn http_reader(http: &Rc<HttpTransport>, config: &AppConfig) -> Rc<dyn ChainReader> {
    Rc::new(TileContract::new(http.clone(), config.tiles_address))
}

/// True when a `chainChanged` payload names the configured chain.
fn is_configured_chain(payload: &Value, config: &AppConfig) -> bool {
    payload.as_str().map(str::to_lowercase) == Some(config.hex_chain_id())
}

fn build_controller(
    config: &AppConfig,
    reader: Rc<dyn ChainReader>,
    refresh: Callback<()>,
) -> SharedController {
    let grid = Grid::from_chain(U256::from(config.grid_size)).unwrap_or_default();
    Rc::new_cyclic(|weak: &Weak<RefCell<WebController>>| {
        let weak = weak.clone();
        let scheduler = GlooScheduler::new(move |key| {
            spawn_local(timer_fired(weak.clone(), key, refresh.clone()));
        });
        RefCell::new(TileController::new(
            grid,
            config.pixel,
            Canvas2dRenderer::default(),
            scheduler,
            reader,
        ))
    })
}

async fn timer_fired(weak: Weak<RefCell<WebController>>, key: TimerKey, refresh: Callback<()>) {
    let Some(ctrl) = weak.upgrade() else {
        return;
    };
    let due = ctrl.borrow_mut().on_timer(key);
    refresh.emit(());
    if let Some(tile) = due {
        flows::load_tile_meta(&ctrl, tile).await;
        refresh.emit(());
    }
}

pub struct WebApp {
    ctrl: SharedController,
    config: AppConfig,
    http: Rc<HttpTransport>,
    refresh: Callback<()>,
    wallet: RefCell<Option<Rc<InjectedWallet>>>,
    watcher: RefCell<Option<TransferWatcher>>,
}

impl WebApp {
    pub fn new(config: AppConfig, refresh: Callback<()>) -> Rc<Self> {
        let http = Rc::new(HttpTransport::new(config.rpc_url.clone()));
        let ctrl = build_controller(&config, http_reader(&http, &config), refresh.clone());
        Rc::new(Self {
            ctrl,
            config,
            http,
            refresh,
            wallet: RefCell::new(None),
            watcher: RefCell::new(None),
        })
    }

    pub fn controller(&self) -> &SharedController {
        &self.ctrl
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Asks the component tree to re-render.
    pub fn refresh(&self) {
        self.refresh.emit(());
    }

    /// Reads the contract's grid size once at startup.
    pub fn sync_grid(self: &Rc<Self>) {
        let app = self.clone();
        spawn_local(async move {
            flows::sync_grid_size(&app.ctrl).await;
            app.refresh.emit(());
        });
    }

    pub fn run_batch(self: &Rc<Self>) {
        let app = self.clone();
        spawn_local(async move {
            match flows::run_batch(&app.ctrl).await {
                Ok(report) => tracing::debug!(?report, "flush done"),
                Err(e) => tracing::debug!(error = %e, "flush refused"),
            }
            app.refresh.emit(());
        });
    }

    pub fn watch_transfers(self: &Rc<Self>) {
        let weak = Rc::downgrade(self);
        let watcher = TransferWatcher::start(
            self.http.clone(),
            self.config.tiles_address,
            self.config.event_poll_ms,
            move |tile| {
                if let Some(app) = weak.upgrade() {
                    app.transfer_observed(tile);
                }
            },
        );
        *self.watcher.borrow_mut() = Some(watcher);
    }

    fn transfer_observed(self: &Rc<Self>, tile: TileId) {
        if !self.ctrl.borrow_mut().transfer_observed(tile) {
            return;
        }
        let app = self.clone();
        spawn_local(async move {
            flows::load_tile_meta(&app.ctrl, tile).await;
            app.refresh.emit(());
        });
    }

    pub fn connect(self: &Rc<Self>) {
        let app = self.clone();
        spawn_local(async move {
            app.ctrl.borrow_mut().set_status("connecting…");
            app.refresh.emit(());
            if let Err(e) = app.try_connect().await {
                tracing::error!(error = %e, "wallet connection failed");
                let mut c = app.ctrl.borrow_mut();
                if c.session().is_none() {
                    c.set_status("not connected");
                }
                c.report(e);
            }
            app.refresh.emit(());
        });
    }

    async fn try_connect(self: &Rc<Self>) -> Result<(), AppError> {
        let wallet = self.wallet()?;
        wallet.ensure_chain(&self.config).await?;
        let account = wallet.request_accounts().await?;
        self.start_session(&wallet, account);
        Ok(())
    }

    /// The injected wallet, detected and subscribed to on first use.
    fn wallet(self: &Rc<Self>) -> Result<Rc<InjectedWallet>, AppError> {
        let existing = self.wallet.borrow().clone();
        if let Some(wallet) = existing {
            return Ok(wallet);
        }
        let wallet = Rc::new(InjectedWallet::detect()?);
        self.listen(&wallet)?;
        *self.wallet.borrow_mut() = Some(wallet.clone());
        Ok(wallet)
    }

    fn listen(self: &Rc<Self>, wallet: &InjectedWallet) -> Result<(), ChainError> {
        let weak = Rc::downgrade(self);
        wallet.on("accountsChanged", move |accounts: JsValue| {
            if let Some(app) = weak.upgrade() {
                app.accounts_changed(&event_payload(&accounts));
            }
        })?;
        let weak = Rc::downgrade(self);
        wallet.on("chainChanged", move |chain: JsValue| {
            if let Some(app) = weak.upgrade() {
                app.chain_changed(&event_payload(&chain));
            }
        })?;
        Ok(())
    }

    fn start_session(&self, wallet: &Rc<InjectedWallet>, account: Address) {
        let contract = Rc::new(
            TileContract::new(wallet.clone(), self.config.tiles_address)
                .with_sender(account)
                .with_receipt_poll(self.config.receipt_poll_ms),
        );
        let mut c = self.ctrl.borrow_mut();
        c.set_reader(contract.clone());
        c.connect_session(account, contract);
    }

    fn accounts_changed(&self, accounts: &Value) {
        match first_account(accounts) {
            Ok(Some(account)) => {
                let wallet = self.wallet.borrow().clone();
                let connected = self.ctrl.borrow().session().is_some();
                if let (Some(wallet), true) = (wallet, connected) {
                    self.start_session(&wallet, account);
                }
            }
            Ok(None) => {
                tracing::info!("wallet disconnected");
                let mut c = self.ctrl.borrow_mut();
                c.end_session();
                c.set_reader(http_reader(&self.http, &self.config));
            }
            Err(e) => tracing::warn!(error = %e, "ignoring malformed accountsChanged payload"),
        }
        self.refresh.emit(());
    }

    fn chain_changed(&self, chain: &Value) {
        // the switch issued while connecting lands here too
        if is_configured_chain(chain, &self.config) {
            tracing::debug!(chain = %chain, "wallet on configured chain");
            return;
        }
        self.ctrl
            .borrow_mut()
            .reset_session(http_reader(&self.http, &self.config));
        self.refresh.emit(());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn chain_payload_comparison_ignores_case() {
        let config = AppConfig::for_tests();
        assert!(is_configured_chain(&json!("0x18C6"), &config));
        assert!(is_configured_chain(&json!("0x18c6"), &config));
        assert!(!is_configured_chain(&json!("0x1"), &config));
        assert!(!is_configured_chain(&Value::Null, &config));
    }
}

//! Polls `Transfer` logs of the tile contract so the hovered tile can be
//! refreshed when it changes hands.

use std::cell::Cell;
use std::rc::Rc;

use alloy_primitives::{Address, B256, U256};
use gloo_timers::callback::Interval;
use serde_json::{Value, json};

use crate::chain::abi;
use crate::chain::contract::hex_bytes;
use crate::chain::transport::RpcTransport;
use crate::error::ChainError;
use crate::model::TileId;

pub fn parse_quantity(value: &Value) -> Result<u64, ChainError> {
    let s = value
        .as_str()
        .ok_or_else(|| ChainError::Decode(format!("expected quantity, got {}", value)))?;
    u64::from_str_radix(s.trim_start_matches("0x"), 16)
        .map_err(|e| ChainError::Decode(format!("bad quantity {}: {}", s, e)))
}

pub fn transfer_filter(address: Address, from_block: u64, to_block: u64) -> Value {
    json!([{
        "address": address,
        "fromBlock": format!("0x{:x}", from_block),
        "toBlock": format!("0x{:x}", to_block),
        "topics": [abi::event_topic(abi::TRANSFER_EVENT)],
    }])
}

/// Token id of a `Transfer(address,address,uint256 indexed)` log.
pub fn parse_transfer_log(log: &Value) -> Option<TileId> {
    let topics = log.get("topics")?.as_array()?;
    let topic0 = hex_bytes(topics.first()?).ok()?;
    if topic0.as_slice() != abi::event_topic(abi::TRANSFER_EVENT).as_slice() {
        return None;
    }
    let raw = hex_bytes(topics.get(3)?).ok()?;
    if raw.len() != 32 {
        return None;
    }
    u64::try_from(U256::from_be_slice(&raw)).ok()
}

/// One polling step. The first call only records the chain head.
pub async fn poll_transfers<T: RpcTransport + ?Sized>(
    transport: &T,
    address: Address,
    last_block: &Cell<Option<u64>>,
) -> Result<Vec<TileId>, ChainError> {
    let head = parse_quantity(&transport.request("eth_blockNumber", json!([])).await?)?;
    let from = match last_block.get() {
        None => {
            last_block.set(Some(head));
            return Ok(Vec::new());
        }
        Some(last) if head <= last => return Ok(Vec::new()),
        Some(last) => last + 1,
    };
    let logs = transport
        .request("eth_getLogs", transfer_filter(address, from, head))
        .await?;
    last_block.set(Some(head));
    Ok(logs
        .as_array()
        .map(|logs| logs.iter().filter_map(parse_transfer_log).collect())
        .unwrap_or_default())
}

pub struct TransferWatcher {
    _interval: Interval,
}

impl TransferWatcher {
    pub fn start<T: RpcTransport + 'static>(
        transport: Rc<T>,
        address: Address,
        poll_ms: u32,
        on_transfer: impl Fn(TileId) + 'static,
    ) -> Self {
        let last_block = Rc::new(Cell::new(None));
        let busy = Rc::new(Cell::new(false));
        let on_transfer = Rc::new(on_transfer);
        let interval = Interval::new(poll_ms, move || {
            if busy.get() {
                return;
            }
            busy.set(true);
            let transport = transport.clone();
            let last_block = last_block.clone();
            let busy = busy.clone();
            let on_transfer = on_transfer.clone();
            wasm_bindgen_futures::spawn_local(async move {
                match poll_transfers(&*transport, address, &last_block).await {
                    Ok(tiles) => {
                        for tile in tiles {
                            tracing::debug!(tile, "transfer observed");
                            on_transfer(tile);
                        }
                    }
                    Err(e) => tracing::warn!(error = %e, "transfer poll failed"),
                }
                busy.set(false);
            });
        });
        Self {
            _interval: interval,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use futures::executor::block_on;
    use std::cell::RefCell;

    struct ScriptedRpc {
        head: Cell<u64>,
        logs: RefCell<Value>,
        seen: RefCell<Vec<(String, Value)>>,
    }

    #[async_trait(?Send)]
    impl RpcTransport for ScriptedRpc {
        async fn request(&self, method: &str, params: Value) -> Result<Value, ChainError> {
            self.seen.borrow_mut().push((method.to_string(), params));
            match method {
                "eth_blockNumber" => Ok(json!(format!("0x{:x}", self.head.get()))),
                "eth_getLogs" => Ok(self.logs.borrow().clone()),
                _ => Err(ChainError::Transport("unexpected".into())),
            }
        }
    }

    fn transfer_log(token: u64) -> Value {
        json!({
            "topics": [
                abi::event_topic(abi::TRANSFER_EVENT),
                B256::ZERO,
                B256::ZERO,
                B256::from(U256::from(token).to_be_bytes::<32>()),
            ]
        })
    }

    #[test]
    fn transfer_log_yields_token_id() {
        assert_eq!(parse_transfer_log(&transfer_log(34)), Some(34));
        let other = json!({ "topics": [B256::ZERO, B256::ZERO, B256::ZERO, B256::ZERO] });
        assert_eq!(parse_transfer_log(&other), None);
        assert_eq!(parse_transfer_log(&json!({})), None);
    }

    #[test]
    fn first_poll_only_records_head() {
        let rpc = ScriptedRpc {
            head: Cell::new(100),
            logs: RefCell::new(json!([transfer_log(1)])),
            seen: RefCell::new(Vec::new()),
        };
        let last = Cell::new(None);
        let addr = Address::repeat_byte(0xf0);
        assert!(block_on(poll_transfers(&rpc, addr, &last)).unwrap().is_empty());
        assert_eq!(last.get(), Some(100));

        // no new blocks
        assert!(block_on(poll_transfers(&rpc, addr, &last)).unwrap().is_empty());

        rpc.head.set(103);
        let tiles = block_on(poll_transfers(&rpc, addr, &last)).unwrap();
        assert_eq!(tiles, vec![1]);
        assert_eq!(last.get(), Some(103));
        let (method, params) = rpc.seen.borrow().last().cloned().unwrap();
        assert_eq!(method, "eth_getLogs");
        assert_eq!(params[0]["fromBlock"], json!("0x65"));
        assert_eq!(params[0]["toBlock"], json!("0x67"));
    }

    #[test]
    fn quantities_are_hex() {
        assert_eq!(parse_quantity(&json!("0x1f")).unwrap(), 31);
        assert!(parse_quantity(&json!(31)).is_err());
    }
}

// Keyed cancellable timers.
//
// A `Scheduler` turns (key, delay) into a handle; dropping the handle cancels
// the pending callback. `KeyedTimers` keeps at most one live handle per key, so
// arming a key again implicitly cancels the previous timer for it.

use std::collections::HashMap;
use std::rc::Rc;

use gloo_timers::callback::Timeout;

use crate::model::TileId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TimerKey {
    /// Deferred clear of a tile's hover highlight.
    Release(TileId),
    /// Debounced metadata fetch for whatever is hovered when it fires.
    MetaFetch,
}

pub trait Scheduler {
    type Handle;

    fn schedule(&self, key: TimerKey, delay_ms: u32) -> Self::Handle;
}

pub struct KeyedTimers<H> {
    handles: HashMap<TimerKey, H>,
}

impl<H> Default for KeyedTimers<H> {
    fn default() -> Self {
        Self {
            handles: HashMap::new(),
        }
    }
}

impl<H> KeyedTimers<H> {
    pub fn arm<S: Scheduler<Handle = H>>(&mut self, scheduler: &S, key: TimerKey, delay_ms: u32) {
        // Replacing the entry drops (and so cancels) the previous handle.
        self.handles.insert(key, scheduler.schedule(key, delay_ms));
    }

    pub fn cancel(&mut self, key: TimerKey) {
        self.handles.remove(&key);
    }

    /// Forgets the handle of a timer that just fired. Returns false for a stale fire.
    pub fn fired(&mut self, key: TimerKey) -> bool {
        self.handles.remove(&key).is_some()
    }

    #[cfg(test)]
    pub fn is_armed(&self, key: TimerKey) -> bool {
        self.handles.contains_key(&key)
    }

    pub fn clear(&mut self) {
        self.handles.clear();
    }
}

/// Browser scheduler: every fire is handed to `sink`.
pub struct GlooScheduler {
    sink: Rc<dyn Fn(TimerKey)>,
}

impl GlooScheduler {
    pub fn new(sink: impl Fn(TimerKey) + 'static) -> Self {
        Self {
            sink: Rc::new(sink),
        }
    }
}

impl Scheduler for GlooScheduler {
    type Handle = Timeout;

    fn schedule(&self, key: TimerKey, delay_ms: u32) -> Timeout {
        let sink = self.sink.clone();
        Timeout::new(delay_ms, move || sink(key))
    }
}

#[cfg(test)]
pub use manual::{ManualHandle, ManualScheduler};


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rearming_a_key_cancels_the_previous_timer() {
        let sched = ManualScheduler::new();
        let mut timers = KeyedTimers::default();
        timers.arm(&sched, TimerKey::MetaFetch, 120);
        assert!(sched.advance(60).is_empty());
        timers.arm(&sched, TimerKey::MetaFetch, 120);
        assert_eq!(sched.live_count(), 1);
        assert!(sched.advance(100).is_empty());
        assert_eq!(sched.advance(20), vec![TimerKey::MetaFetch]);
    }

    #[test]
    fn distinct_keys_fire_independently() {
        let sched = ManualScheduler::new();
        let mut timers = KeyedTimers::default();
        timers.arm(&sched, TimerKey::Release(1), 1000);
        sched.advance(500);
        timers.arm(&sched, TimerKey::Release(2), 1000);
        assert_eq!(sched.advance(500), vec![TimerKey::Release(1)]);
        assert!(timers.fired(TimerKey::Release(1)));
        assert!(timers.is_armed(TimerKey::Release(2)));
        assert_eq!(sched.advance(500), vec![TimerKey::Release(2)]);
    }

    #[test]
    fn cancel_and_clear_drop_pending_timers() {
        let sched = ManualScheduler::new();
        let mut timers = KeyedTimers::default();
        timers.arm(&sched, TimerKey::Release(7), 1000);
        timers.arm(&sched, TimerKey::MetaFetch, 120);
        timers.cancel(TimerKey::MetaFetch);
        assert_eq!(sched.live_count(), 1);
        timers.clear();
        assert!(sched.advance(5000).is_empty());
        assert!(!timers.fired(TimerKey::Release(7)));
    }
}

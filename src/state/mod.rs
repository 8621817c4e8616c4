pub mod batch;
pub mod hover;
pub mod selection;
pub mod sidebar;
pub mod timers;

pub use batch::{BatchQueue, EnqueueOutcome};
pub use hover::{HoverTracker, Hovered};
pub use selection::{Selection, Toggle};
pub use sidebar::{PanelTarget, Sidebar};
pub use timers::{GlooScheduler, KeyedTimers, Scheduler, TimerKey};

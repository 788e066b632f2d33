pub mod config;
pub mod engine;
pub mod inject;
pub mod nav;
pub mod scan;
pub mod scheduler;
pub mod tooltip;
pub mod tracker;

pub use config::{EngineConfig, TooltipConfig};
pub use engine::Engine;
pub use scan::ScanStats;
pub use tooltip::{Clipboard, NoopClipboard, PointerPosition, TooltipController, Viewport};
pub use tracker::{BadgeTracker, TrackedBadge};

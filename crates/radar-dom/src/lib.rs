pub mod document;
pub mod escape;
pub mod history;
pub mod observer;
pub mod selector;
pub mod snapshot;

pub use document::{Document, NodeId};
pub use escape::escape_html;
pub use history::{History, NavEvent, NavKind};
pub use observer::{MutationKind, MutationRecord, ObserveOptions, ObserverId};
pub use selector::Selector;
pub use snapshot::NodeSnapshot;

pub mod memory;
pub mod schema;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use chrono::Utc;
use radar_core::{CompanyDatabase, RadarResult, StoreChange};
use radar_core::{KEY_LAST_UPDATED, KEY_OVERLAY_MODE, KEY_REFERRAL_DATA};
use serde_json::Value;
use std::sync::mpsc::Receiver;

/// Persistent key-value settings collaborator: get/set plus change
/// notifications delivered to every subscriber on each set.
pub trait SettingsStore {
    fn get(&self, key: &str) -> RadarResult<Option<Value>>;
    fn set(&mut self, key: &str, value: Value) -> RadarResult<()>;
    fn subscribe(&mut self) -> Receiver<StoreChange>;

    fn load_database(&self) -> RadarResult<CompanyDatabase> {
        match self.get(KEY_REFERRAL_DATA)? {
            Some(value) => Ok(CompanyDatabase::from_value(value)?),
            None => Ok(CompanyDatabase::default()),
        }
    }

    /// Overlay defaults to enabled when never persisted.
    fn overlay_mode(&self) -> RadarResult<bool> {
        Ok(self
            .get(KEY_OVERLAY_MODE)?
            .and_then(|v| v.as_bool())
            .unwrap_or(true))
    }

    fn set_overlay_mode(&mut self, mode: bool) -> RadarResult<()> {
        self.set(KEY_OVERLAY_MODE, Value::Bool(mode))
    }

    /// Persists the database and stamps the update time.
    fn save_database(&mut self, db: &CompanyDatabase) -> RadarResult<()> {
        self.set(KEY_REFERRAL_DATA, serde_json::to_value(db)?)?;
        self.set(
            KEY_LAST_UPDATED,
            Value::String(Utc::now().to_rfc3339()),
        )
    }
}

use crate::SettingsStore;
use chrono::Utc;
use radar_core::{RadarError, RadarResult, StoreChange};
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Mutex};
use tracing::info;

/// Durable settings store backed by a single SQLite file.
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
    subscribers: Vec<Sender<StoreChange>>,
}

impl SqliteStore {
    pub fn open(path: &str) -> RadarResult<Self> {
        let conn = Connection::open(path).map_err(|e| RadarError::Store(e.to_string()))?;
        conn.execute_batch(
            "PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL; PRAGMA busy_timeout=5000;",
        )
        .map_err(|e| RadarError::Store(e.to_string()))?;
        crate::schema::run_migrations(&conn)?;
        info!(path = path, "settings store opened");
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            subscribers: Vec::new(),
        })
    }

    fn with_conn<F, T>(&self, f: F) -> RadarResult<T>
    where
        F: FnOnce(&Connection) -> Result<T, rusqlite::Error>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|e| RadarError::Store(e.to_string()))?;
        f(&conn).map_err(|e| RadarError::Store(e.to_string()))
    }

    fn notify(&mut self, key: &str, new_value: Option<Value>) {
        let change = StoreChange {
            key: key.to_string(),
            new_value,
        };
        self.subscribers
            .retain(|sub| sub.send(change.clone()).is_ok());
    }
}

impl SettingsStore for SqliteStore {
    fn get(&self, key: &str) -> RadarResult<Option<Value>> {
        let raw: Option<String> = self.with_conn(|conn| {
            conn.query_row(
                "SELECT value FROM settings WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
        })?;
        match raw {
            Some(text) => Ok(Some(serde_json::from_str(&text)?)),
            None => Ok(None),
        }
    }

    fn set(&mut self, key: &str, value: Value) -> RadarResult<()> {
        let text = serde_json::to_string(&value)?;
        self.with_conn(|conn| {
            conn.execute(
                "INSERT OR REPLACE INTO settings (key, value, updated_at) VALUES (?1, ?2, ?3)",
                params![key, text, Utc::now().to_rfc3339()],
            )?;
            Ok(())
        })?;
        self.notify(key, Some(value));
        Ok(())
    }

    fn subscribe(&mut self) -> Receiver<StoreChange> {
        let (tx, rx) = channel();
        self.subscribers.push(tx);
        rx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use radar_core::{CompanyDatabase, KEY_REFERRAL_DATA};
    use serde_json::json;

    #[test]
    fn values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("radar.db");
        let path = path.to_str().unwrap();
        {
            let mut store = SqliteStore::open(path).unwrap();
            let db =
                CompanyDatabase::from_value(json!({"GOOGLE": [{"name": "Asha"}]})).unwrap();
            store.save_database(&db).unwrap();
        }
        let store = SqliteStore::open(path).unwrap();
        let db = store.load_database().unwrap();
        assert_eq!(db.referrers("GOOGLE").len(), 1);
    }

    #[test]
    fn set_notifies_subscribers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("radar.db");
        let mut store = SqliteStore::open(path.to_str().unwrap()).unwrap();
        let rx = store.subscribe();
        store.set(KEY_REFERRAL_DATA, json!({})).unwrap();
        assert_eq!(rx.try_recv().unwrap().key, KEY_REFERRAL_DATA);
    }

    #[test]
    fn missing_key_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("radar.db");
        let store = SqliteStore::open(path.to_str().unwrap()).unwrap();
        assert!(store.get("nope").unwrap().is_none());
        assert!(store.overlay_mode().unwrap());
    }
}

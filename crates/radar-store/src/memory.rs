use crate::SettingsStore;
use radar_core::{RadarResult, StoreChange};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::mpsc::{channel, Receiver, Sender};

/// Volatile store for tests and one-shot runs.
#[derive(Default)]
pub struct MemoryStore {
    entries: HashMap<String, Value>,
    subscribers: Vec<Sender<StoreChange>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
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

impl SettingsStore for MemoryStore {
    fn get(&self, key: &str) -> RadarResult<Option<Value>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: Value) -> RadarResult<()> {
        self.entries.insert(key.to_string(), value.clone());
        self.notify(key, Some(value));
        Ok(())
    }

    fn subscribe(&mut self) -> Receiver<StoreChange> {
        let (tx, rx) = channel();
        self.subscribers.push(tx);
        rx
    }
}

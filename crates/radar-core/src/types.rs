use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const KEY_REFERRAL_DATA: &str = "referralData";
pub const KEY_OVERLAY_MODE: &str = "overlayMode";
pub const KEY_LAST_UPDATED: &str = "lastUpdated";

/// One person willing to refer at a company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Referrer {
    pub name: String,
    #[serde(default)]
    pub note: String,
}

/// Read-only snapshot of the referral database: normalized company key
/// (uppercase, trimmed, corporate suffixes stripped) to its referrers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompanyDatabase {
    entries: BTreeMap<String, Vec<Referrer>>,
}

impl CompanyDatabase {
    pub fn new(entries: BTreeMap<String, Vec<Referrer>>) -> Self {
        Self { entries }
    }

    pub fn referrers(&self, company: &str) -> &[Referrer] {
        self.entries.get(company).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }
}

/// Message from the external UI collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action")]
pub enum ControlMessage {
    #[serde(rename = "UPDATE_MODE")]
    UpdateMode { mode: bool },
}

/// Change notification from the settings store collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreChange {
    pub key: String,
    pub new_value: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn control_message_wire_format() {
        let msg: ControlMessage =
            serde_json::from_str(r#"{"action":"UPDATE_MODE","mode":false}"#).unwrap();
        assert_eq!(msg, ControlMessage::UpdateMode { mode: false });
    }

    #[test]
    fn database_round_trips_as_plain_map() {
        let json = r#"{"GOOGLE":[{"name":"Asha","note":"SWE, Cloud"}]}"#;
        let db = CompanyDatabase::from_value(serde_json::from_str(json).unwrap()).unwrap();
        assert_eq!(db.referrers("GOOGLE").len(), 1);
        assert_eq!(db.referrers("GOOGLE")[0].name, "Asha");
        assert!(db.referrers("META").is_empty());
    }
}

use crate::document::{Document, NodeId};
use serde::Deserialize;
use std::collections::BTreeMap;

/// Serialized page snapshot: a JSON element tree the CLI and tests can load
/// instead of a live page.
#[derive(Debug, Clone, Deserialize)]
pub struct NodeSnapshot {
    #[serde(default = "default_tag")]
    pub tag: String,
    #[serde(default)]
    pub attrs: BTreeMap<String, String>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub children: Vec<NodeSnapshot>,
}

fn default_tag() -> String {
    "div".to_string()
}

impl Document {
    /// Builds the snapshot subtree and appends it under `parent`.
    pub fn append_snapshot(&mut self, parent: NodeId, snapshot: &NodeSnapshot) -> NodeId {
        let id = self.create_element(&snapshot.tag);
        self.set_text(id, &snapshot.text);
        for (name, value) in &snapshot.attrs {
            self.set_attr(id, name, value);
        }
        self.append_child(parent, id)
            .expect("fresh element cannot form a cycle");
        for child in &snapshot.children {
            self.append_snapshot(id, child);
        }
        id
    }

    /// Document whose body holds the snapshot's children. A snapshot with tag
    /// "body" contributes its children directly; anything else becomes a
    /// single child of the body.
    pub fn from_snapshot(snapshot: &NodeSnapshot) -> Self {
        let mut doc = Document::new();
        if snapshot.tag == "body" {
            for (name, value) in &snapshot.attrs {
                doc.set_attr(doc.body(), name, value);
            }
            for child in &snapshot.children {
                doc.append_snapshot(doc.body(), child);
            }
        } else {
            doc.append_snapshot(doc.body(), snapshot);
        }
        doc
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_nested_tree_from_json() {
        let json = r#"{
            "tag": "body",
            "children": [
                {"tag": "div", "attrs": {"class": "entity-result"}, "children": [
                    {"tag": "span", "text": "Google"}
                ]}
            ]
        }"#;
        let snapshot: NodeSnapshot = serde_json::from_str(json).unwrap();
        let doc = Document::from_snapshot(&snapshot);
        let card = doc.children(doc.body())[0];
        assert!(doc.has_class(card, "entity-result"));
        assert_eq!(doc.text_content(card), "Google");
    }

    #[test]
    fn defaults_apply() {
        let snapshot: NodeSnapshot = serde_json::from_str(r#"{"text": "x"}"#).unwrap();
        assert_eq!(snapshot.tag, "div");
        assert!(snapshot.children.is_empty());
    }
}

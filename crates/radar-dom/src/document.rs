use crate::observer::{MutationKind, MutationRecord, ObserveOptions, ObserverId, ObserverSlot};
use crate::selector::Selector;
use radar_core::{RadarError, RadarResult};
use std::collections::BTreeMap;

/// Handle to one element in a [`Document`]. Stays valid for the lifetime of
/// the document even after the element is detached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug)]
struct Node {
    tag: String,
    attrs: BTreeMap<String, String>,
    text: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// In-memory element tree standing in for the host page. The engine only ever
/// sees this surface; the real browser document is owned by the host
/// environment, which mirrors structural changes into mutation records.
#[derive(Debug)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
    observers: Vec<ObserverSlot>,
    next_observer: u32,
}

impl Document {
    pub fn new() -> Self {
        let body = Node {
            tag: "body".to_string(),
            attrs: BTreeMap::new(),
            text: String::new(),
            parent: None,
            children: Vec::new(),
        };
        Self {
            nodes: vec![body],
            root: NodeId(0),
            observers: Vec::new(),
            next_observer: 0,
        }
    }

    pub fn body(&self) -> NodeId {
        self.root
    }

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            tag: tag.to_ascii_lowercase(),
            attrs: BTreeMap::new(),
            text: String::new(),
            parent: None,
            children: Vec::new(),
        });
        id
    }

    pub fn tag(&self, id: NodeId) -> &str {
        &self.nodes[id.0].tag
    }

    pub fn set_text(&mut self, id: NodeId, text: &str) {
        self.nodes[id.0].text = text.to_string();
    }

    pub fn own_text(&self, id: NodeId) -> &str {
        &self.nodes[id.0].text
    }

    /// Concatenated text of the element and all its descendants.
    pub fn text_content(&self, id: NodeId) -> String {
        self.text_content_filtered(id, |_, _| true)
    }

    /// Like [`text_content`](Self::text_content), but subtrees for which the
    /// predicate returns false are skipped entirely.
    pub fn text_content_filtered<F>(&self, id: NodeId, keep: F) -> String
    where
        F: Fn(&Document, NodeId) -> bool,
    {
        let mut out = String::new();
        self.collect_text(id, &keep, &mut out);
        out
    }

    fn collect_text<F>(&self, id: NodeId, keep: &F, out: &mut String)
    where
        F: Fn(&Document, NodeId) -> bool,
    {
        out.push_str(&self.nodes[id.0].text);
        for child in &self.nodes[id.0].children {
            if keep(self, *child) {
                self.collect_text(*child, keep, out);
            }
        }
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.nodes[id.0].attrs.get(name).map(String::as_str)
    }

    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        self.nodes[id.0]
            .attrs
            .insert(name.to_string(), value.to_string());
        self.record_mutation(id, MutationKind::Attributes);
    }

    pub fn remove_attr(&mut self, id: NodeId, name: &str) {
        self.nodes[id.0].attrs.remove(name);
        self.record_mutation(id, MutationKind::Attributes);
    }

    /// Exact whitespace-separated class token match.
    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.attr(id, "class")
            .map(|c| c.split_whitespace().any(|t| t == class))
            .unwrap_or(false)
    }

    /// Substring match against the whole class attribute value.
    pub fn class_contains(&self, id: NodeId, fragment: &str) -> bool {
        self.attr(id, "class")
            .map(|c| c.contains(fragment))
            .unwrap_or(false)
    }

    pub fn add_class(&mut self, id: NodeId, class: &str) {
        if self.has_class(id, class) {
            return;
        }
        let mut value = self.attr(id, "class").unwrap_or("").to_string();
        if !value.is_empty() {
            value.push(' ');
        }
        value.push_str(class);
        self.set_attr(id, "class", &value);
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.nodes[id.0].parent?;
        let siblings = &self.nodes[parent.0].children;
        let pos = siblings.iter().position(|s| *s == id)?;
        siblings.get(pos + 1).copied()
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> RadarResult<()> {
        if child == self.root || self.is_ancestor_of(child, parent) || child == parent {
            return Err(RadarError::Dom("append would create a cycle".to_string()));
        }
        self.detach_internal(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
        self.record_mutation(parent, MutationKind::ChildList);
        Ok(())
    }

    /// Inserts `node` as the immediately following sibling of `reference`.
    pub fn insert_after(&mut self, reference: NodeId, node: NodeId) -> RadarResult<()> {
        let parent = self.nodes[reference.0]
            .parent
            .ok_or_else(|| RadarError::Dom("reference element has no parent".to_string()))?;
        if node == self.root || self.is_ancestor_of(node, reference) || node == reference {
            return Err(RadarError::Dom("insert would create a cycle".to_string()));
        }
        self.detach_internal(node);
        let pos = self.nodes[parent.0]
            .children
            .iter()
            .position(|s| *s == reference)
            .ok_or_else(|| RadarError::Dom("reference element detached mid-insert".to_string()))?;
        self.nodes[node.0].parent = Some(parent);
        self.nodes[parent.0].children.insert(pos + 1, node);
        self.record_mutation(parent, MutationKind::ChildList);
        Ok(())
    }

    /// Detaches the element (and its subtree) from the tree. The arena slot
    /// survives, so stale [`NodeId`]s remain safe to query.
    pub fn remove(&mut self, id: NodeId) {
        if id == self.root {
            return;
        }
        if let Some(parent) = self.nodes[id.0].parent {
            self.detach_internal(id);
            self.record_mutation(parent, MutationKind::ChildList);
        }
    }

    fn detach_internal(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.0].parent.take() {
            self.nodes[parent.0].children.retain(|c| *c != id);
        }
    }

    fn is_ancestor_of(&self, candidate: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == candidate {
                return true;
            }
            current = self.nodes[id.0].parent;
        }
        false
    }

    /// Whether the element is still reachable from the document body.
    pub fn is_attached(&self, id: NodeId) -> bool {
        let mut current = id;
        loop {
            if current == self.root {
                return true;
            }
            match self.nodes[current.0].parent {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    pub fn contains(&self, ancestor: NodeId, id: NodeId) -> bool {
        self.is_ancestor_of(ancestor, id)
    }

    /// All attached elements in document order, body excluded.
    pub fn all_elements(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.walk(self.root, &mut out);
        out
    }

    /// Descendants of `id` in document order, `id` itself excluded.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.walk(id, &mut out);
        out
    }

    fn walk(&self, id: NodeId, out: &mut Vec<NodeId>) {
        for child in &self.nodes[id.0].children {
            out.push(*child);
            self.walk(*child, out);
        }
    }

    pub fn matches(&self, id: NodeId, selector: &Selector) -> bool {
        selector.matches(self, id)
    }

    pub fn matches_any(&self, id: NodeId, selectors: &[Selector]) -> bool {
        selectors.iter().any(|s| s.matches(self, id))
    }

    /// Attached elements matching any selector, in document order.
    pub fn query_all(&self, selectors: &[Selector]) -> Vec<NodeId> {
        self.all_elements()
            .into_iter()
            .filter(|id| self.matches_any(*id, selectors))
            .collect()
    }

    /// Descendants of `root` matching any selector, in document order.
    pub fn query_all_within(&self, root: NodeId, selectors: &[Selector]) -> Vec<NodeId> {
        self.descendants(root)
            .into_iter()
            .filter(|id| self.matches_any(*id, selectors))
            .collect()
    }

    /// Removes every attached element carrying the class token. Returns the
    /// number of elements removed.
    pub fn remove_all_with_class(&mut self, class: &str) -> usize {
        let doomed: Vec<NodeId> = self
            .all_elements()
            .into_iter()
            .filter(|id| self.has_class(*id, class))
            .collect();
        // Children of a removed element detach with it; skip those.
        let mut removed = 0;
        for id in doomed {
            if self.is_attached(id) {
                self.remove(id);
                removed += 1;
            }
        }
        removed
    }

    // --- mutation observation ---

    pub fn observe(&mut self, options: ObserveOptions) -> ObserverId {
        let id = ObserverId(self.next_observer);
        self.next_observer += 1;
        self.observers.push(ObserverSlot {
            id,
            options,
            records: Vec::new(),
        });
        id
    }

    pub fn take_records(&mut self, id: ObserverId) -> Vec<MutationRecord> {
        self.observers
            .iter_mut()
            .find(|slot| slot.id == id)
            .map(|slot| std::mem::take(&mut slot.records))
            .unwrap_or_default()
    }

    pub fn disconnect(&mut self, id: ObserverId) {
        self.observers.retain(|slot| slot.id != id);
    }

    fn record_mutation(&mut self, target: NodeId, kind: MutationKind) {
        for slot in &mut self.observers {
            let wanted = match kind {
                MutationKind::ChildList => slot.options.child_list,
                MutationKind::Attributes => slot.options.attributes,
            };
            if wanted {
                slot.records.push(MutationRecord { target, kind });
            }
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

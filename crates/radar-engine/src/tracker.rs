use radar_dom::NodeId;
use std::collections::HashMap;

/// Live relation between a page element and the badge injected for it.
#[derive(Debug, Clone)]
pub struct TrackedBadge {
    pub badge: NodeId,
    pub company: String,
}

/// Mapping from target elements to their injected badges. At most one
/// relation per target; relations survive until reconciliation drops them or
/// the engine resets.
#[derive(Debug, Default)]
pub struct BadgeTracker {
    map: HashMap<NodeId, TrackedBadge>,
}

impl BadgeTracker {
    pub fn insert(&mut self, target: NodeId, badge: NodeId, company: &str) {
        self.map.insert(
            target,
            TrackedBadge {
                badge,
                company: company.to_string(),
            },
        );
    }

    pub fn get(&self, target: NodeId) -> Option<&TrackedBadge> {
        self.map.get(&target)
    }

    pub fn remove(&mut self, target: NodeId) -> Option<TrackedBadge> {
        self.map.remove(&target)
    }

    pub fn clear(&mut self) {
        self.map.clear();
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Snapshot of the current relations, for iteration while the document
    /// and the tracker itself are being mutated.
    pub fn entries(&self) -> Vec<(NodeId, TrackedBadge)> {
        self.map.iter().map(|(k, v)| (*k, v.clone())).collect()
    }
}

use radar_dom::{Document, NodeId, Selector};

pub const DEFAULT_CONTAINER_SELECTORS: &[&str] = &[
    r#"[data-view-name="search-entity-result-item"]"#,
    ".search-result__wrapper",
    ".entity-result",
    ".job-card-container",
    "[data-chameleon-result-urn]",
    r#"li[class*="result"]"#,
];

/// Maximum ancestor levels walked when resolving a container.
pub const CONTAINER_WALK_DEPTH: usize = 15;

/// Nearest ancestor representing one logical result card, within a bounded
/// walk. `None` disables container-level dedup for this element.
pub fn find_result_container(
    doc: &Document,
    node: NodeId,
    container_selectors: &[Selector],
) -> Option<NodeId> {
    let mut current = doc.parent(node);
    let mut depth = 0;
    while let Some(id) = current {
        if depth >= CONTAINER_WALK_DEPTH {
            break;
        }
        if doc.matches_any(id, container_selectors) {
            return Some(id);
        }
        current = doc.parent(id);
        depth += 1;
    }
    None
}

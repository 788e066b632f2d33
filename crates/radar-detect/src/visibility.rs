use radar_dom::{Document, NodeId};

pub const DEFAULT_HIDDEN_CLASS_PATTERNS: &[&str] =
    &["visually-hidden", "sr-only", "a11y-text", "screen-reader"];

/// Maximum ancestor levels inspected above the element itself.
pub const HIDDEN_ANCESTOR_DEPTH: usize = 5;

/// Whether the element is visually hidden accessibility text: a hidden-class
/// pattern or `aria-hidden="true"` on the element or any ancestor within a
/// bounded walk. Hidden elements typically duplicate visible content and must
/// never receive badges.
pub fn is_hidden_element(doc: &Document, node: NodeId, hidden_patterns: &[String]) -> bool {
    if element_is_hidden(doc, node, hidden_patterns) {
        return true;
    }
    let mut current = doc.parent(node);
    let mut depth = 0;
    while let Some(id) = current {
        if depth >= HIDDEN_ANCESTOR_DEPTH {
            break;
        }
        if element_is_hidden(doc, id, hidden_patterns) {
            return true;
        }
        current = doc.parent(id);
        depth += 1;
    }
    false
}

fn element_is_hidden(doc: &Document, node: NodeId, hidden_patterns: &[String]) -> bool {
    if doc.attr(node, "aria-hidden") == Some("true") {
        return true;
    }
    hidden_patterns.iter().any(|p| doc.class_contains(node, p))
}

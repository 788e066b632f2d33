use crate::normalize::TextNormalizer;
use radar_dom::{Document, NodeId, Selector};

/// Maximum nesting depth between the element and a competing descendant.
pub const SPECIFICITY_MAX_LEVELS: usize = 3;

/// Whether a candidate-eligible descendant (within a bounded nesting depth)
/// already carries the same company in its normalized text. When true, the
/// outer element is skipped so only the innermost, most specific element
/// receives the badge.
pub fn has_more_specific_descendant(
    doc: &Document,
    node: NodeId,
    company: &str,
    candidate_selectors: &[Selector],
    normalizer: &TextNormalizer,
    badge_class: &str,
) -> bool {
    for desc in doc.query_all_within(node, candidate_selectors) {
        if nesting_level(doc, desc, node) >= SPECIFICITY_MAX_LEVELS {
            continue;
        }
        let text = doc.text_content_filtered(desc, |d, n| !d.has_class(n, badge_class));
        let Some(clean) = normalizer.normalize(&text) else {
            continue;
        };
        if clean == company || clean.contains(company) {
            return true;
        }
    }
    false
}

fn nesting_level(doc: &Document, desc: NodeId, node: NodeId) -> usize {
    let mut level = 0;
    let mut current = doc.parent(desc);
    while let Some(id) = current {
        if id == node || level >= SPECIFICITY_MAX_LEVELS {
            break;
        }
        current = doc.parent(id);
        level += 1;
    }
    level
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selectors() -> Vec<Selector> {
        ["a", "span", "strong"]
            .iter()
            .map(|s| Selector::parse(s).unwrap())
            .collect()
    }

    #[test]
    fn inner_span_suppresses_outer_link() {
        let mut doc = Document::new();
        let link = doc.create_element("a");
        doc.append_child(doc.body(), link).unwrap();
        let span = doc.create_element("span");
        doc.set_text(span, "Netflix");
        doc.append_child(link, span).unwrap();

        let n = TextNormalizer::default();
        assert!(has_more_specific_descendant(
            &doc,
            link,
            "NETFLIX",
            &selectors(),
            &n,
            "referral-radar-badge"
        ));
        assert!(!has_more_specific_descendant(
            &doc,
            span,
            "NETFLIX",
            &selectors(),
            &n,
            "referral-radar-badge"
        ));
    }

    #[test]
    fn unrelated_descendant_does_not_suppress() {
        let mut doc = Document::new();
        let link = doc.create_element("a");
        doc.set_text(link, "Netflix");
        doc.append_child(doc.body(), link).unwrap();
        let span = doc.create_element("span");
        doc.set_text(span, "Senior Engineer");
        doc.append_child(link, span).unwrap();

        let n = TextNormalizer::default();
        assert!(!has_more_specific_descendant(
            &doc,
            link,
            "NETFLIX",
            &selectors(),
            &n,
            "referral-radar-badge"
        ));
    }

    #[test]
    fn deeply_nested_descendant_is_ignored() {
        let mut doc = Document::new();
        let link = doc.create_element("a");
        doc.append_child(doc.body(), link).unwrap();
        let mut parent = link;
        for _ in 0..SPECIFICITY_MAX_LEVELS {
            let next = doc.create_element("div");
            doc.append_child(parent, next).unwrap();
            parent = next;
        }
        let span = doc.create_element("span");
        doc.set_text(span, "Netflix");
        doc.append_child(parent, span).unwrap();

        let n = TextNormalizer::default();
        assert!(!has_more_specific_descendant(
            &doc,
            link,
            "NETFLIX",
            &selectors(),
            &n,
            "referral-radar-badge"
        ));
    }
}

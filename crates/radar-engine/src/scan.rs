use crate::engine::Engine;
use radar_detect::{
    find_result_container, has_more_specific_descendant, is_hidden_element, match_company,
};
use radar_dom::{Document, NodeId};
use std::collections::HashSet;
use tracing::{debug, error};

/// Outcome of one scan pass, for logging and tests.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScanStats {
    pub candidates: usize,
    pub injected: usize,
    pub restored: usize,
    pub dropped: usize,
}

impl Engine {
    /// Runs one full pass: reconcile tracked badges, then walk candidates in
    /// document order and inject where the heuristics agree. A pass already
    /// in flight makes this a no-op (dropped, not queued); the reentrancy
    /// flag is released on every exit path.
    pub fn scan_page(&mut self, doc: &mut Document) -> ScanStats {
        if self.scanning || !self.running {
            return ScanStats::default();
        }
        self.scanning = true;
        let outcome = self.scan_inner(doc);
        self.scanning = false;
        match outcome {
            Ok(stats) => {
                debug!(
                    candidates = stats.candidates,
                    injected = stats.injected,
                    restored = stats.restored,
                    dropped = stats.dropped,
                    "scan complete"
                );
                stats
            }
            Err(e) => {
                error!(error = %e, "scan pass failed");
                ScanStats::default()
            }
        }
    }

    fn scan_inner(&mut self, doc: &mut Document) -> radar_core::RadarResult<ScanStats> {
        let mut stats = ScanStats::default();

        // Repair re-render damage before hunting for new candidates.
        let (dropped, restored) = self.reconcile_tracked(doc);
        stats.dropped = dropped;
        stats.restored = restored;

        let candidates = doc.query_all(&self.compiled.candidates);
        stats.candidates = candidates.len();

        // One badge per logical result card within this pass.
        let mut badged_containers: HashSet<NodeId> = HashSet::new();

        for node in candidates {
            if self.has_valid_badge(doc, node) {
                continue;
            }
            if self.compiled.ignore_tags.contains(doc.tag(node)) {
                continue;
            }
            if is_hidden_element(doc, node, &self.config.hidden_class_patterns) {
                continue;
            }

            let raw = self.candidate_text(doc, node);
            let Some(clean) = self.compiled.normalizer.normalize(&raw) else {
                continue;
            };
            let Some(hit) = match_company(&clean, &self.known) else {
                continue;
            };

            if has_more_specific_descendant(
                doc,
                node,
                &hit.company,
                &self.compiled.candidates,
                &self.compiled.normalizer,
                &self.config.badge_class,
            ) {
                continue;
            }

            let container = find_result_container(doc, node, &self.compiled.containers);
            if let Some(c) = container {
                if badged_containers.contains(&c) {
                    continue;
                }
            }

            if self.inject_badge(doc, node, &hit.company) {
                stats.injected += 1;
                if let Some(c) = container {
                    badged_containers.insert(c);
                }
            }
        }

        Ok(stats)
    }

    /// Candidate text with injected badge subtrees filtered out, so a badge
    /// appended as a child never changes its target's match text.
    pub(crate) fn candidate_text(&self, doc: &Document, node: NodeId) -> String {
        let badge_class = self.config.badge_class.as_str();
        doc.text_content_filtered(node, |d, n| !d.has_class(n, badge_class))
    }
}

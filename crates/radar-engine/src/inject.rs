use crate::engine::Engine;
use radar_dom::{Document, NodeId};
use tracing::{debug, warn};

impl Engine {
    /// Whether the element already carries a live tracked badge. A stale
    /// marker whose badge was removed by a re-render is cleared so the
    /// element becomes eligible again.
    pub(crate) fn has_valid_badge(&mut self, doc: &mut Document, target: NodeId) -> bool {
        if doc.attr(target, &self.config.injected_attr) != Some("true") {
            return false;
        }
        if let Some(entry) = self.tracker.get(target) {
            if doc.is_attached(entry.badge) {
                return true;
            }
        }
        doc.remove_attr(target, &self.config.injected_attr);
        doc.remove_attr(target, &self.config.company_attr);
        self.tracker.remove(target);
        false
    }

    /// Repairs tracked relations against the live tree: relations whose
    /// target left the document are dropped; relations whose badge was
    /// removed while the target survived are re-injected for the same
    /// company. Returns (dropped, restored).
    pub(crate) fn reconcile_tracked(&mut self, doc: &mut Document) -> (usize, usize) {
        let mut dropped = 0;
        let mut restored = 0;
        for (target, entry) in self.tracker.entries() {
            if !doc.is_attached(target) {
                self.tracker.remove(target);
                dropped += 1;
                continue;
            }
            if doc.is_attached(entry.badge) {
                continue;
            }
            debug!(company = %entry.company, "badge removed by re-render, re-injecting");
            let company = doc
                .attr(target, &self.config.company_attr)
                .map(str::to_string)
                .unwrap_or(entry.company);
            doc.remove_attr(target, &self.config.injected_attr);
            self.tracker.remove(target);
            if self.inject_badge(doc, target, &company) {
                restored += 1;
            }
        }
        (dropped, restored)
    }

    /// Injects a badge for `company` next to `target`. Returns true only
    /// when a new badge actually entered the document; insertion failures
    /// are logged and skipped, never propagated.
    pub(crate) fn inject_badge(&mut self, doc: &mut Document, target: NodeId, company: &str) -> bool {
        if doc.attr(target, &self.config.injected_attr) == Some("true") {
            if let Some(entry) = self.tracker.get(target) {
                if doc.is_attached(entry.badge) {
                    return false;
                }
            }
        }

        // An orphaned badge can survive a tracking reset in either insertion
        // position; adopt it by re-marking the target instead of doubling up.
        let sibling_badge = doc
            .next_sibling(target)
            .map(|s| doc.has_class(s, &self.config.badge_class))
            .unwrap_or(false);
        let child_badge = doc
            .children(target)
            .iter()
            .any(|c| doc.has_class(*c, &self.config.badge_class));
        if sibling_badge || child_badge {
            doc.set_attr(target, &self.config.injected_attr, "true");
            doc.set_attr(target, &self.config.company_attr, company);
            return false;
        }

        let referrer_count = self.db.referrers(company).len();
        if referrer_count == 0 {
            return false;
        }

        doc.set_attr(target, &self.config.injected_attr, "true");
        doc.set_attr(target, &self.config.company_attr, company);

        let badge = self.build_badge(doc, company, referrer_count);

        // Insert after links and flex-row members so the badge does not break
        // the target's internal layout; append into anything else.
        let after = doc.tag(target) == "a" || parent_is_flex(doc, target);
        let inserted = if after {
            doc.insert_after(target, badge)
        } else {
            doc.append_child(target, badge)
        };

        match inserted {
            Ok(()) => {
                self.tracker.insert(target, badge, company);
                true
            }
            Err(e) => {
                warn!(company = company, error = %e, "badge insertion failed");
                false
            }
        }
    }

    fn build_badge(&self, doc: &mut Document, company: &str, referrer_count: usize) -> NodeId {
        let badge = doc.create_element("span");
        doc.set_attr(badge, "class", &self.config.badge_class);
        doc.set_attr(badge, &self.config.company_attr, company);
        doc.set_attr(
            badge,
            "title",
            &format!("Click to see who looks at {}", company),
        );

        let icon = doc.create_element("span");
        doc.set_attr(icon, "class", "rr-icon");
        doc.set_text(icon, "\u{1f4ac}");

        let label = doc.create_element("span");
        doc.set_attr(label, "class", "rr-text");
        let count_label = if referrer_count == 1 {
            "1 Refer Bro".to_string()
        } else {
            format!("{} Refer Bros", referrer_count)
        };
        doc.set_text(label, &count_label);

        doc.append_child(badge, icon).ok();
        doc.append_child(badge, label).ok();
        badge
    }
}

fn parent_is_flex(doc: &Document, target: NodeId) -> bool {
    let Some(parent) = doc.parent(target) else {
        return false;
    };
    doc.attr(parent, "style")
        .map(|style| {
            let collapsed: String = style.chars().filter(|c| !c.is_whitespace()).collect();
            collapsed.contains("display:flex")
        })
        .unwrap_or(false)
}

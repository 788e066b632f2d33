use crate::config::TooltipConfig;
use radar_core::{RadarResult, Referrer};
use radar_dom::{escape_html, Document, NodeId};
use std::time::Instant;
use tracing::warn;

pub const CLOSE_CLASS: &str = "rr-close-btn";
pub const COPY_CLASS: &str = "referral-radar-copy-btn";
pub const COPY_LABEL: &str = "Copy Name";

/// Host clipboard seam. The production host wires the real clipboard in;
/// tests substitute a recording or failing double.
pub trait Clipboard {
    fn write_text(&mut self, text: &str) -> RadarResult<()>;
}

/// Discards writes. Used when no clipboard has been wired in.
#[derive(Debug, Default)]
pub struct NoopClipboard;

impl Clipboard for NoopClipboard {
    fn write_text(&mut self, _text: &str) -> RadarResult<()> {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PointerPosition {
    pub page_x: f64,
    pub page_y: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub scroll_x: f64,
    pub scroll_y: f64,
}

/// Owns the single active referrer popover: build, position, dismiss, copy
/// feedback. Opening a tooltip always closes the previous one first.
#[derive(Debug)]
pub struct TooltipController {
    config: TooltipConfig,
    tooltip_class: String,
    badge_class: String,
    active: Option<NodeId>,
    armed_at: Option<Instant>,
    reverts: Vec<(NodeId, Instant)>,
}

impl TooltipController {
    pub fn new(config: TooltipConfig, tooltip_class: &str, badge_class: &str) -> Self {
        Self {
            config,
            tooltip_class: tooltip_class.to_string(),
            badge_class: badge_class.to_string(),
            active: None,
            armed_at: None,
            reverts: Vec::new(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.active.is_some()
    }

    pub fn active(&self) -> Option<NodeId> {
        self.active
    }

    pub fn open(
        &mut self,
        doc: &mut Document,
        company: &str,
        referrers: &[Referrer],
        pointer: PointerPosition,
        viewport: Viewport,
        now: Instant,
    ) -> NodeId {
        self.close(doc);

        let tooltip = doc.create_element("div");
        doc.set_attr(tooltip, "class", &self.tooltip_class);

        let header = doc.create_element("div");
        doc.set_attr(header, "class", "rr-tooltip-header");
        let title = doc.create_element("h4");
        doc.set_text(title, company);
        let close = doc.create_element("span");
        doc.set_attr(close, "class", CLOSE_CLASS);
        doc.set_attr(close, "id", "rr-close");
        doc.set_text(close, "\u{00d7}");
        doc.append_child(header, title).ok();
        doc.append_child(header, close).ok();
        doc.append_child(tooltip, header).ok();

        let content = doc.create_element("div");
        doc.set_attr(content, "class", "rr-tooltip-content");
        for referrer in referrers {
            let row = doc.create_element("div");
            doc.set_attr(row, "class", "referral-radar-referrer");

            let name_row = doc.create_element("div");
            doc.set_attr(name_row, "class", "rr-name-row");
            let name = doc.create_element("span");
            doc.set_attr(name, "class", "rr-name");
            doc.set_text(name, &escape_html(&referrer.name));
            doc.append_child(name_row, name).ok();

            let note = doc.create_element("div");
            doc.set_attr(note, "class", "rr-note");
            doc.set_text(note, &escape_html(&referrer.note));

            let copy = doc.create_element("button");
            doc.set_attr(copy, "class", COPY_CLASS);
            doc.set_attr(copy, "data-name", &escape_html(&referrer.name));
            doc.set_text(copy, COPY_LABEL);

            doc.append_child(row, name_row).ok();
            doc.append_child(row, note).ok();
            doc.append_child(row, copy).ok();
            doc.append_child(content, row).ok();
        }
        doc.append_child(tooltip, content).ok();

        let body = doc.body();
        doc.append_child(body, tooltip).ok();

        let (left, top) = self.position(pointer, viewport);
        doc.set_attr(tooltip, "style", &format!("left:{}px; top:{}px", left, top));

        self.active = Some(tooltip);
        self.armed_at = Some(now + self.config.arm_delay);
        tooltip
    }

    /// Anchor near the pointer; flip left of it when the right viewport edge
    /// would clip, and above it when the bottom edge would.
    fn position(&self, pointer: PointerPosition, viewport: Viewport) -> (f64, f64) {
        let offset = self.config.pointer_offset;
        let mut left = pointer.page_x + offset;
        let mut top = pointer.page_y + offset;
        if (left - viewport.scroll_x) + self.config.width > viewport.width {
            left = pointer.page_x - self.config.width - offset;
        }
        if (top - viewport.scroll_y) + self.config.height > viewport.height {
            top = pointer.page_y - self.config.height - offset;
        }
        (left, top)
    }

    pub fn close(&mut self, doc: &mut Document) {
        if let Some(tooltip) = self.active.take() {
            doc.remove(tooltip);
        }
        self.armed_at = None;
        self.reverts.clear();
    }

    /// A click that reached neither a badge nor a tooltip control. Dismisses
    /// the tooltip unless it landed inside it, on a badge, or before the
    /// outside-click listener armed.
    pub fn handle_outside_click(&mut self, doc: &mut Document, target: NodeId, now: Instant) {
        let Some(tooltip) = self.active else {
            return;
        };
        match self.armed_at {
            Some(armed) if now >= armed => {}
            _ => return,
        }
        if doc.contains(tooltip, target) || doc.has_class(target, &self.badge_class) {
            return;
        }
        self.close(doc);
    }

    pub fn handle_copy(
        &mut self,
        doc: &mut Document,
        button: NodeId,
        clipboard: &mut dyn Clipboard,
        now: Instant,
    ) {
        let Some(name) = doc.attr(button, "data-name").map(str::to_string) else {
            return;
        };
        match clipboard.write_text(&name) {
            Ok(()) => {
                doc.set_text(button, "Copied!");
                doc.add_class(button, "copied");
                self.reverts.push((button, now + self.config.copied_revert));
            }
            Err(e) => {
                warn!(error = %e, "copy failed");
                doc.set_text(button, "Failed");
                self.reverts.push((button, now + self.config.failed_revert));
            }
        }
    }

    /// Reverts any copy-feedback labels whose delay has elapsed.
    pub fn tick(&mut self, doc: &mut Document, now: Instant) {
        let due: Vec<NodeId> = self
            .reverts
            .iter()
            .filter(|(_, at)| *at <= now)
            .map(|(button, _)| *button)
            .collect();
        self.reverts.retain(|(_, at)| *at > now);
        for button in due {
            doc.set_text(button, COPY_LABEL);
            if let Some(class) = doc.attr(button, "class").map(str::to_string) {
                let stripped: Vec<&str> =
                    class.split_whitespace().filter(|t| *t != "copied").collect();
                doc.set_attr(button, "class", &stripped.join(" "));
            }
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.reverts.iter().map(|(_, at)| *at).min()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BADGE_CLASS, TOOLTIP_CLASS};
    use radar_core::RadarError;
    use std::time::Duration;

    fn controller() -> TooltipController {
        TooltipController::new(TooltipConfig::default(), TOOLTIP_CLASS, BADGE_CLASS)
    }

    fn viewport() -> Viewport {
        Viewport {
            width: 1200.0,
            height: 800.0,
            scroll_x: 0.0,
            scroll_y: 0.0,
        }
    }

    fn referrers() -> Vec<Referrer> {
        vec![Referrer {
            name: "Asha".to_string(),
            note: "SWE, Cloud".to_string(),
        }]
    }

    struct FailingClipboard;
    impl Clipboard for FailingClipboard {
        fn write_text(&mut self, _text: &str) -> RadarResult<()> {
            Err(RadarError::Clipboard("denied".to_string()))
        }
    }

    #[test]
    fn only_one_tooltip_at_a_time() {
        let mut doc = Document::new();
        let mut t = controller();
        let now = Instant::now();
        let pointer = PointerPosition {
            page_x: 20.0,
            page_y: 20.0,
        };
        let first = t.open(&mut doc, "GOOGLE", &referrers(), pointer, viewport(), now);
        let second = t.open(&mut doc, "META", &referrers(), pointer, viewport(), now);
        assert!(!doc.is_attached(first));
        assert!(doc.is_attached(second));
        let tooltips = doc
            .all_elements()
            .into_iter()
            .filter(|n| doc.has_class(*n, TOOLTIP_CLASS))
            .count();
        assert_eq!(tooltips, 1);
    }

    #[test]
    fn positioning_flips_at_viewport_edges() {
        let t = controller();
        let vp = viewport();
        let near_origin = t.position(
            PointerPosition {
                page_x: 20.0,
                page_y: 20.0,
            },
            vp,
        );
        assert_eq!(near_origin, (30.0, 30.0));
        let near_corner = t.position(
            PointerPosition {
                page_x: 1150.0,
                page_y: 780.0,
            },
            vp,
        );
        assert_eq!(near_corner, (1150.0 - 300.0 - 10.0, 780.0 - 200.0 - 10.0));
    }

    #[test]
    fn positioning_accounts_for_scroll() {
        let t = controller();
        let vp = Viewport {
            width: 1200.0,
            height: 800.0,
            scroll_x: 1000.0,
            scroll_y: 0.0,
        };
        // page_x 1150 is only 150px into the scrolled viewport; no flip.
        let pos = t.position(
            PointerPosition {
                page_x: 1150.0,
                page_y: 20.0,
            },
            vp,
        );
        assert_eq!(pos, (1160.0, 30.0));
    }

    #[test]
    fn outside_click_respects_arm_delay() {
        let mut doc = Document::new();
        let outside = doc.create_element("div");
        doc.append_child(doc.body(), outside).unwrap();
        let mut t = controller();
        let now = Instant::now();
        let pointer = PointerPosition {
            page_x: 20.0,
            page_y: 20.0,
        };
        t.open(&mut doc, "GOOGLE", &referrers(), pointer, viewport(), now);
        t.handle_outside_click(&mut doc, outside, now + Duration::from_millis(10));
        assert!(t.is_open());
        t.handle_outside_click(&mut doc, outside, now + Duration::from_millis(60));
        assert!(!t.is_open());
    }

    #[test]
    fn click_inside_tooltip_does_not_dismiss() {
        let mut doc = Document::new();
        let mut t = controller();
        let now = Instant::now();
        let pointer = PointerPosition {
            page_x: 20.0,
            page_y: 20.0,
        };
        let tooltip = t.open(&mut doc, "GOOGLE", &referrers(), pointer, viewport(), now);
        let inner = doc.descendants(tooltip)[0];
        t.handle_outside_click(&mut doc, inner, now + Duration::from_millis(60));
        assert!(t.is_open());
    }

    #[test]
    fn copy_failure_shows_failed_then_reverts() {
        let mut doc = Document::new();
        let mut t = controller();
        let now = Instant::now();
        let pointer = PointerPosition {
            page_x: 20.0,
            page_y: 20.0,
        };
        let tooltip = t.open(&mut doc, "GOOGLE", &referrers(), pointer, viewport(), now);
        let button = doc
            .descendants(tooltip)
            .into_iter()
            .find(|n| doc.has_class(*n, COPY_CLASS))
            .unwrap();
        t.handle_copy(&mut doc, button, &mut FailingClipboard, now);
        assert_eq!(doc.own_text(button), "Failed");
        t.tick(&mut doc, now + Duration::from_millis(1400));
        assert_eq!(doc.own_text(button), "Failed");
        t.tick(&mut doc, now + Duration::from_millis(1500));
        assert_eq!(doc.own_text(button), COPY_LABEL);
    }

    #[test]
    fn copy_success_gives_transient_feedback() {
        let mut doc = Document::new();
        let mut t = controller();
        let now = Instant::now();
        let pointer = PointerPosition {
            page_x: 20.0,
            page_y: 20.0,
        };
        let tooltip = t.open(&mut doc, "GOOGLE", &referrers(), pointer, viewport(), now);
        let button = doc
            .descendants(tooltip)
            .into_iter()
            .find(|n| doc.has_class(*n, COPY_CLASS))
            .unwrap();
        t.handle_copy(&mut doc, button, &mut NoopClipboard, now);
        assert_eq!(doc.own_text(button), "Copied!");
        assert!(doc.has_class(button, "copied"));
        t.tick(&mut doc, now + Duration::from_millis(2000));
        assert_eq!(doc.own_text(button), COPY_LABEL);
        assert!(!doc.has_class(button, "copied"));
    }
}

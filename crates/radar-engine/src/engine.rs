use crate::config::{Compiled, EngineConfig};
use crate::nav::NavigationWatcher;
use crate::scheduler::ObservationScheduler;
use crate::tooltip::{Clipboard, NoopClipboard, PointerPosition, TooltipController, Viewport};
use crate::tracker::BadgeTracker;
use radar_core::{CompanyDatabase, ControlMessage, RadarResult, StoreChange};
use radar_core::{KEY_OVERLAY_MODE, KEY_REFERRAL_DATA};
use radar_detect::KnownCompanies;
use radar_dom::{Document, History, NodeId};
use std::time::Instant;
use tracing::{debug, info};

/// The whole detection-and-injection engine as one constructible instance:
/// database snapshot, known-company set, badge tracking, scheduling and
/// tooltip state all live here, never in process-wide globals.
pub struct Engine {
    pub(crate) config: EngineConfig,
    pub(crate) compiled: Compiled,
    pub(crate) db: CompanyDatabase,
    pub(crate) known: KnownCompanies,
    pub(crate) tracker: BadgeTracker,
    pub(crate) scheduler: ObservationScheduler,
    pub(crate) watcher: Option<NavigationWatcher>,
    pub(crate) tooltip: TooltipController,
    pub(crate) clipboard: Box<dyn Clipboard>,
    pub(crate) running: bool,
    pub(crate) scanning: bool,
}

impl Engine {
    pub fn new(config: EngineConfig) -> RadarResult<Self> {
        let compiled = Compiled::from_config(&config)?;
        let scheduler = ObservationScheduler::new(config.debounce, config.wave_delays.clone());
        let tooltip = TooltipController::new(
            config.tooltip.clone(),
            &config.tooltip_class,
            &config.badge_class,
        );
        Ok(Self {
            config,
            compiled,
            db: CompanyDatabase::default(),
            known: KnownCompanies::default(),
            tracker: BadgeTracker::default(),
            scheduler,
            watcher: None,
            tooltip,
            clipboard: Box::new(NoopClipboard),
            running: false,
            scanning: false,
        })
    }

    pub fn set_clipboard(&mut self, clipboard: Box<dyn Clipboard>) {
        self.clipboard = clipboard;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn database(&self) -> &CompanyDatabase {
        &self.db
    }

    pub fn tracker(&self) -> &BadgeTracker {
        &self.tracker
    }

    pub fn tooltip(&self) -> &TooltipController {
        &self.tooltip
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Begins observing and scanning: subscribe to subtree changes, run an
    /// immediate pass, then schedule the rescan waves that absorb the host
    /// framework's delayed re-renders.
    pub fn start(&mut self, doc: &mut Document, history: &History, now: Instant) {
        self.running = true;
        self.scheduler.start(doc);
        if self.watcher.is_none() {
            self.watcher = Some(NavigationWatcher::new(
                history.url(),
                self.config.url_poll_interval,
                now,
            ));
        }
        info!(companies = self.db.len(), url = history.url(), "engine started");
        self.scan_page(doc);
        self.scheduler.schedule_waves(now);
    }

    /// Cancels the subscription and every pending deadline, and removes all
    /// injected output, synchronously.
    pub fn stop(&mut self, doc: &mut Document) {
        self.running = false;
        self.scheduler.stop(doc);
        self.remove_injected_output(doc);
        info!("engine stopped");
    }

    /// Installs a fresh database snapshot: rebuild the known-company set,
    /// reset all tracked output, and rescan if running.
    pub fn update_database(&mut self, doc: &mut Document, db: CompanyDatabase) {
        info!(companies = db.len(), "database snapshot updated");
        self.known = KnownCompanies::from_database(&db);
        self.db = db;
        self.remove_injected_output(doc);
        if self.running {
            self.scan_page(doc);
        }
    }

    pub fn handle_store_change(
        &mut self,
        doc: &mut Document,
        history: &History,
        change: &StoreChange,
        now: Instant,
    ) {
        match change.key.as_str() {
            KEY_REFERRAL_DATA => {
                let db = change
                    .new_value
                    .clone()
                    .and_then(|v| CompanyDatabase::from_value(v).ok())
                    .unwrap_or_default();
                self.update_database(doc, db);
            }
            KEY_OVERLAY_MODE => {
                let mode = change
                    .new_value
                    .as_ref()
                    .and_then(|v| v.as_bool())
                    .unwrap_or(true);
                self.set_mode(doc, history, mode, now);
            }
            _ => {}
        }
    }

    pub fn handle_control(
        &mut self,
        doc: &mut Document,
        history: &History,
        message: &ControlMessage,
        now: Instant,
    ) {
        match message {
            ControlMessage::UpdateMode { mode } => self.set_mode(doc, history, *mode, now),
        }
    }

    fn set_mode(&mut self, doc: &mut Document, history: &History, mode: bool, now: Instant) {
        if mode && !self.running {
            self.start(doc, history, now);
        } else if !mode && self.running {
            self.stop(doc);
        }
    }

    /// Drains the mutation subscription; a non-empty batch (re)arms the
    /// trailing-edge debounce.
    pub fn pump_observer(&mut self, doc: &mut Document, now: Instant) {
        let records = self.scheduler.drain_records(doc);
        if !records.is_empty() && self.running {
            self.scheduler.on_mutations(now);
        }
    }

    /// Manual trigger for hosts and tests that deliver mutation batches
    /// themselves.
    pub fn handle_mutations(&mut self, now: Instant) {
        if self.running {
            self.scheduler.on_mutations(now);
        }
    }

    /// Drains navigation events from the history source.
    pub fn handle_navigation_events(
        &mut self,
        doc: &mut Document,
        history: &mut History,
        now: Instant,
    ) {
        for event in history.take_events() {
            let changed = self
                .watcher
                .as_ref()
                .map(|w| w.changed(&event.url))
                .unwrap_or(false);
            if changed {
                self.navigation_changed(doc, &event.url, now);
            }
        }
    }

    /// Fires anything that has come due: the URL polling fallback, pending
    /// debounce/wave scans, and tooltip feedback reverts.
    pub fn tick(&mut self, doc: &mut Document, history: &History, now: Instant) {
        let mut nav_url = None;
        if let Some(watcher) = &mut self.watcher {
            if watcher.poll_due(now) {
                watcher.polled(now);
                if watcher.changed(history.url()) {
                    nav_url = Some(history.url().to_string());
                }
            }
        }
        if let Some(url) = nav_url {
            self.navigation_changed(doc, &url, now);
        }
        if self.scheduler.take_due(now) > 0 {
            self.scan_page(doc);
        }
        self.tooltip.tick(doc, now);
    }

    /// One call covering a full host turn: drain the observer, drain
    /// navigation events, then fire due deadlines.
    pub fn process(&mut self, doc: &mut Document, history: &mut History, now: Instant) {
        self.pump_observer(doc, now);
        self.handle_navigation_events(doc, history, now);
        self.tick(doc, history, now);
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        let mut next = self.scheduler.next_deadline();
        if let Some(watcher) = &self.watcher {
            let poll = watcher.next_deadline();
            next = Some(next.map_or(poll, |d| d.min(poll)));
        }
        if let Some(revert) = self.tooltip.next_deadline() {
            next = Some(next.map_or(revert, |d| d.min(revert)));
        }
        next
    }

    pub(crate) fn navigation_changed(&mut self, doc: &mut Document, url: &str, now: Instant) {
        info!(url = url, "client-side navigation detected");
        if let Some(watcher) = &mut self.watcher {
            watcher.record(url);
        }
        self.remove_injected_output(doc);
        if self.running {
            self.scheduler.schedule_waves(now);
        }
    }

    /// Removes every injected badge and tooltip and forgets all tracking.
    pub(crate) fn remove_injected_output(&mut self, doc: &mut Document) {
        self.tooltip.close(doc);
        let badges = doc.remove_all_with_class(&self.config.badge_class);
        let tooltips = doc.remove_all_with_class(&self.config.tooltip_class);
        if badges + tooltips > 0 {
            debug!(badges, tooltips, "removed injected output");
        }
        self.tracker.clear();
    }

    /// Routes a pointer click: badge opens the tooltip, tooltip controls act,
    /// anything else is a candidate outside-click dismissal.
    pub fn handle_click(
        &mut self,
        doc: &mut Document,
        target: NodeId,
        pointer: PointerPosition,
        viewport: Viewport,
        now: Instant,
    ) {
        if let Some(badge) = self.badge_at(doc, target) {
            let Some(company) = doc.attr(badge, &self.config.company_attr).map(str::to_string)
            else {
                return;
            };
            let referrers = self.db.referrers(&company).to_vec();
            if referrers.is_empty() {
                return;
            }
            self.tooltip
                .open(doc, &company, &referrers, pointer, viewport, now);
            return;
        }
        if let Some(tooltip) = self.tooltip.active() {
            if doc.contains(tooltip, target) {
                if doc.has_class(target, crate::tooltip::CLOSE_CLASS) {
                    self.tooltip.close(doc);
                } else if doc.has_class(target, crate::tooltip::COPY_CLASS) {
                    self.tooltip
                        .handle_copy(doc, target, self.clipboard.as_mut(), now);
                }
                return;
            }
        }
        self.tooltip.handle_outside_click(doc, target, now);
    }

    /// The badge element a click landed on, if any: the target itself or the
    /// nearest badge ancestor (clicks on the icon/text spans bubble up).
    fn badge_at(&self, doc: &Document, target: NodeId) -> Option<NodeId> {
        let mut current = Some(target);
        while let Some(id) = current {
            if doc.has_class(id, &self.config.badge_class) {
                return Some(id);
            }
            current = doc.parent(id);
        }
        None
    }
}

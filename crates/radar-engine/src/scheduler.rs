use radar_dom::{Document, MutationRecord, ObserveOptions, ObserverId};
use std::time::{Duration, Instant};

/// Decides when scans run: a trailing-edge debounce over mutation
/// notifications plus the multi-wave rescan sequence scheduled after
/// navigation. Deadlines are plain data; the host pumps time through the
/// engine's `tick`.
#[derive(Debug)]
pub struct ObservationScheduler {
    observer: Option<ObserverId>,
    debounce_deadline: Option<Instant>,
    wave_deadlines: Vec<Instant>,
    debounce: Duration,
    wave_delays: Vec<Duration>,
}

impl ObservationScheduler {
    pub fn new(debounce: Duration, wave_delays: Vec<Duration>) -> Self {
        Self {
            observer: None,
            debounce_deadline: None,
            wave_deadlines: Vec::new(),
            debounce,
            wave_delays,
        }
    }

    /// Subscribes to child-list changes under the document body. Idempotent.
    pub fn start(&mut self, doc: &mut Document) {
        if self.observer.is_none() {
            self.observer = Some(doc.observe(ObserveOptions::child_list_subtree()));
        }
    }

    /// Cancels the subscription and every pending deadline.
    pub fn stop(&mut self, doc: &mut Document) {
        if let Some(observer) = self.observer.take() {
            doc.disconnect(observer);
        }
        self.debounce_deadline = None;
        self.wave_deadlines.clear();
    }

    pub fn is_observing(&self) -> bool {
        self.observer.is_some()
    }

    pub fn drain_records(&mut self, doc: &mut Document) -> Vec<MutationRecord> {
        match self.observer {
            Some(observer) => doc.take_records(observer),
            None => Vec::new(),
        }
    }

    /// A notification batch arrived: (re)arm the trailing-edge debounce.
    pub fn on_mutations(&mut self, now: Instant) {
        self.debounce_deadline = Some(now + self.debounce);
    }

    /// Replaces any pending wave sequence with a fresh one.
    pub fn schedule_waves(&mut self, now: Instant) {
        self.wave_deadlines = self.wave_delays.iter().map(|d| now + *d).collect();
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.debounce_deadline
            .into_iter()
            .chain(self.wave_deadlines.iter().copied())
            .min()
    }

    /// Removes deadlines that have come due and reports how many fired.
    pub fn take_due(&mut self, now: Instant) -> usize {
        let mut fired = 0;
        if let Some(deadline) = self.debounce_deadline {
            if deadline <= now {
                self.debounce_deadline = None;
                fired += 1;
            }
        }
        let before = self.wave_deadlines.len();
        self.wave_deadlines.retain(|d| *d > now);
        fired + (before - self.wave_deadlines.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scheduler() -> ObservationScheduler {
        ObservationScheduler::new(
            Duration::from_millis(300),
            vec![Duration::from_millis(100), Duration::from_millis(500)],
        )
    }

    #[test]
    fn repeated_notifications_coalesce() {
        let mut s = scheduler();
        let base = Instant::now();
        s.on_mutations(base);
        s.on_mutations(base + Duration::from_millis(200));
        // First deadline has moved; nothing fires at base + 300ms.
        assert_eq!(s.take_due(base + Duration::from_millis(300)), 0);
        assert_eq!(s.take_due(base + Duration::from_millis(500)), 1);
        assert_eq!(s.take_due(base + Duration::from_millis(900)), 0);
    }

    #[test]
    fn waves_fire_in_sequence() {
        let mut s = scheduler();
        let base = Instant::now();
        s.schedule_waves(base);
        assert_eq!(s.next_deadline(), Some(base + Duration::from_millis(100)));
        assert_eq!(s.take_due(base + Duration::from_millis(100)), 1);
        assert_eq!(s.take_due(base + Duration::from_millis(500)), 1);
        assert_eq!(s.next_deadline(), None);
    }

    #[test]
    fn rescheduling_waves_replaces_pending_ones() {
        let mut s = scheduler();
        let base = Instant::now();
        s.schedule_waves(base);
        s.schedule_waves(base + Duration::from_millis(50));
        assert_eq!(s.take_due(base + Duration::from_millis(100)), 0);
        assert_eq!(s.take_due(base + Duration::from_millis(150)), 1);
    }

    #[test]
    fn stop_clears_pending_deadlines() {
        let mut s = scheduler();
        let mut doc = Document::new();
        s.start(&mut doc);
        let base = Instant::now();
        s.on_mutations(base);
        s.schedule_waves(base);
        s.stop(&mut doc);
        assert!(!s.is_observing());
        assert_eq!(s.next_deadline(), None);
    }
}

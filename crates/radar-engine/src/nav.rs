use std::time::{Duration, Instant};

/// Tracks the last observed URL and the low-frequency polling fallback that
/// catches route changes which produced no history event.
#[derive(Debug)]
pub struct NavigationWatcher {
    last_url: String,
    next_poll: Instant,
    poll_interval: Duration,
}

impl NavigationWatcher {
    pub fn new(initial_url: &str, poll_interval: Duration, now: Instant) -> Self {
        Self {
            last_url: initial_url.to_string(),
            next_poll: now + poll_interval,
            poll_interval,
        }
    }

    pub fn last_url(&self) -> &str {
        &self.last_url
    }

    pub fn changed(&self, url: &str) -> bool {
        url != self.last_url
    }

    pub fn record(&mut self, url: &str) {
        self.last_url = url.to_string();
    }

    pub fn poll_due(&self, now: Instant) -> bool {
        self.next_poll <= now
    }

    pub fn polled(&mut self, now: Instant) {
        self.next_poll = now + self.poll_interval;
    }

    pub fn next_deadline(&self) -> Instant {
        self.next_poll
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn polling_cadence() {
        let base = Instant::now();
        let mut w = NavigationWatcher::new("https://example.com/a", Duration::from_secs(1), base);
        assert!(!w.poll_due(base + Duration::from_millis(500)));
        assert!(w.poll_due(base + Duration::from_secs(1)));
        w.polled(base + Duration::from_secs(1));
        assert!(!w.poll_due(base + Duration::from_millis(1500)));
    }

    #[test]
    fn change_detection_is_plain_comparison() {
        let base = Instant::now();
        let mut w = NavigationWatcher::new("https://example.com/a", Duration::from_secs(1), base);
        assert!(w.changed("https://example.com/b"));
        w.record("https://example.com/b");
        assert!(!w.changed("https://example.com/b"));
    }
}

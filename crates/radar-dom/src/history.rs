/// Navigation-event source standing in for the host history API. Client-side
/// route changes land here as events; the current URL stays readable so a
/// polling fallback can catch changes that produced no event.
#[derive(Debug)]
pub struct History {
    url: String,
    pending: Vec<NavEvent>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavKind {
    PushState,
    ReplaceState,
    PopState,
}

#[derive(Debug, Clone)]
pub struct NavEvent {
    pub kind: NavKind,
    pub url: String,
}

impl History {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            pending: Vec::new(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn push_state(&mut self, url: impl Into<String>) {
        self.navigate(NavKind::PushState, url.into());
    }

    pub fn replace_state(&mut self, url: impl Into<String>) {
        self.navigate(NavKind::ReplaceState, url.into());
    }

    pub fn pop_state(&mut self, url: impl Into<String>) {
        self.navigate(NavKind::PopState, url.into());
    }

    /// URL change without an accompanying event. Only the polling fallback
    /// can notice these.
    pub fn set_url_silently(&mut self, url: impl Into<String>) {
        self.url = url.into();
    }

    pub fn take_events(&mut self) -> Vec<NavEvent> {
        std::mem::take(&mut self.pending)
    }

    fn navigate(&mut self, kind: NavKind, url: String) {
        self.url = url.clone();
        self.pending.push(NavEvent { kind, url });
    }
}

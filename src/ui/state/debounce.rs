use std::time::{Duration, Instant};

/// Holds the latest search text until typing has been quiet for `window`.
/// Every keystroke pushes the deadline back, so a burst of input settles
/// into a single value.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchDebouncer {
    window: Duration,
    pending: Option<(String, Instant)>,
}

impl SearchDebouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn input(&mut self, text: impl Into<String>, now: Instant) {
        self.pending = Some((text.into(), now + self.window));
    }

    /// Returns the pending text once its deadline has passed, at most once.
    pub fn poll(&mut self, now: Instant) -> Option<String> {
        match &self.pending {
            Some((_, deadline)) if *deadline <= now => self.pending.take().map(|(text, _)| text),
            _ => None,
        }
    }

    pub fn pending(&self) -> Option<&str> {
        self.pending.as_ref().map(|(text, _)| text.as_str())
    }
}

use lovelens_core::Commentary;
use std::time::Duration;
use tokio::time::Instant;

/// Holds the commentary on display and when it must disappear.
#[derive(Debug)]
pub struct CommentaryBoard {
    ttl: Duration,
    shown: Option<(Commentary, Instant)>,
}

impl CommentaryBoard {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, shown: None }
    }

    /// Displays `commentary`, replacing whatever is shown and restarting the window.
    pub fn show(&mut self, commentary: Commentary) {
        self.shown = Some((commentary, Instant::now() + self.ttl));
    }

    pub fn current(&self) -> Option<&Commentary> {
        self.shown.as_ref().map(|(commentary, _)| commentary)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.shown.as_ref().map(|(_, deadline)| *deadline)
    }

    /// Clears the commentary once its window has passed.
    pub fn expire(&mut self, now: Instant) -> bool {
        match self.deadline() {
            Some(deadline) if deadline <= now => {
                self.shown = None;
                true
            }
            _ => false,
        }
    }

    pub fn clear(&mut self) {
        self.shown = None;
    }
}

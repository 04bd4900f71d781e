use lovelens_core::{Layout, Slot};
use tracing::debug;

/// Host-owned layout. The most recent request wins; there is no arbitration
/// between cameras and nothing is acknowledged.
#[derive(Debug, Default)]
pub struct LayoutDirector {
    layout: Layout,
    last_source: Option<Slot>,
}

impl LayoutDirector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies a request from `source` (`None` for the host operator).
    /// Returns whether the layout changed.
    pub fn apply(&mut self, source: Option<Slot>, layout: Layout) -> bool {
        let changed = self.layout != layout;
        debug!(?source, from = %self.layout, to = %layout, "Layout request");
        self.layout = layout;
        self.last_source = source;
        changed
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn last_source(&self) -> Option<Slot> {
        self.last_source
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

use crate::media::MediaStream;
use crate::signaling::Switchboard;
use lovelens_core::{CallId, LensError, PeerId, Slot, StreamId};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutgoingCall {
    pub call: CallId,
    pub stream: StreamId,
}

/// Camera side of the one-way media call to the host.
///
/// At most one call is alive, and it always carries the current capture
/// stream. Asking for a call that already exists is a no-op.
pub struct MediaBridge {
    switchboard: Switchboard,
    local: PeerId,
    active: Option<OutgoingCall>,
}

impl MediaBridge {
    pub fn new(switchboard: Switchboard, local: PeerId) -> Self {
        Self {
            switchboard,
            local,
            active: None,
        }
    }

    /// Calls `host` with `stream` unless a live call already carries it.
    /// A call carrying an older stream is hung up first. Returns whether a
    /// new call was placed.
    pub fn ensure_call(&mut self, host: &PeerId, stream: &MediaStream) -> Result<bool, LensError> {
        if let Some(active) = self.active {
            if active.stream == stream.id() && self.switchboard.is_calling(active.call) {
                return Ok(false);
            }
            self.hang_up();
        }

        if !stream.is_live() {
            return Ok(false);
        }

        let call = self.switchboard.call(&self.local, host, stream.clone())?;
        info!("Placed call {} to {} with stream {}", call, host, stream.id());
        self.active = Some(OutgoingCall {
            call,
            stream: stream.id(),
        });
        Ok(true)
    }

    /// Forgets `call` if it is the active one.
    pub fn on_call_closed(&mut self, call: CallId) -> bool {
        match self.active {
            Some(active) if active.call == call => {
                self.active = None;
                true
            }
            _ => false,
        }
    }

    pub fn hang_up(&mut self) {
        if let Some(active) = self.active.take() {
            debug!("Hanging up call {}", active.call);
            self.switchboard.hang_up(active.call);
        }
    }

    pub fn active_call(&self) -> Option<OutgoingCall> {
        self.active
    }
}

impl Drop for MediaBridge {
    fn drop(&mut self) {
        self.hang_up();
    }
}

/// Stream received from one camera slot.
#[derive(Debug, Clone)]
pub struct SlotFeed {
    pub call: CallId,
    pub remote: PeerId,
    pub stream: MediaStream,
}

/// Host side: the current feed of each slot. A new call for a slot
/// supersedes the previous one.
#[derive(Debug, Default)]
pub struct SlotFeeds {
    feeds: [Option<SlotFeed>; 2],
}

impl SlotFeeds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `feed` for `slot`, returning the feed it replaced.
    pub fn attach(&mut self, slot: Slot, feed: SlotFeed) -> Option<SlotFeed> {
        self.feeds[slot.index()].replace(feed)
    }

    /// Clears the slot fed by `call`, if that call is still current.
    pub fn detach_call(&mut self, call: CallId) -> Option<Slot> {
        let slot = Slot::ALL
            .into_iter()
            .find(|slot| matches!(&self.feeds[slot.index()], Some(feed) if feed.call == call))?;
        self.feeds[slot.index()] = None;
        Some(slot)
    }

    /// Clears every slot fed by `remote`.
    pub fn detach_remote(&mut self, remote: &PeerId) -> Vec<SlotFeed> {
        self.feeds
            .iter_mut()
            .filter(|feed| matches!(feed, Some(f) if f.remote == *remote))
            .filter_map(Option::take)
            .collect()
    }

    pub fn get(&self, slot: Slot) -> Option<&SlotFeed> {
        self.feeds[slot.index()].as_ref()
    }

    pub fn stream(&self, slot: Slot) -> Option<&MediaStream> {
        self.get(slot).map(|feed| &feed.stream)
    }

    pub fn is_online(&self, slot: Slot) -> bool {
        self.stream(slot).is_some_and(MediaStream::is_live)
    }

    pub fn stream_ids(&self) -> [Option<StreamId>; 2] {
        Slot::ALL.map(|slot| self.stream(slot).map(MediaStream::id))
    }

    /// Empties every slot and returns what was there.
    pub fn clear(&mut self) -> Vec<SlotFeed> {
        self.feeds.iter_mut().filter_map(Option::take).collect()
    }
}

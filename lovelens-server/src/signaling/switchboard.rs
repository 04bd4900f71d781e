use crate::media::MediaStream;
use crate::transport::PeerEvent;
use bytes::Bytes;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use lovelens_core::{CallId, LensError, LinkId, PeerId};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

struct SwitchboardInner {
    peers: DashMap<PeerId, mpsc::UnboundedSender<PeerEvent>>,
    links: DashMap<LinkId, (PeerId, PeerId)>,
    calls: DashMap<CallId, (PeerId, PeerId)>,
}

/// Peer broker: maps identifiers to live peers and routes links, data and
/// calls between them.
#[derive(Clone)]
pub struct Switchboard {
    inner: Arc<SwitchboardInner>,
}

impl Switchboard {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(SwitchboardInner {
                peers: DashMap::new(),
                links: DashMap::new(),
                calls: DashMap::new(),
            }),
        }
    }

    /// Claims `id`. The returned endpoint receives [`PeerEvent::Open`] first.
    pub fn register(&self, id: PeerId) -> Result<PeerEndpoint, LensError> {
        let (tx, rx) = mpsc::unbounded_channel();

        match self.inner.peers.entry(id.clone()) {
            Entry::Occupied(_) => return Err(LensError::IdTaken(id)),
            Entry::Vacant(slot) => {
                let _ = tx.send(PeerEvent::Open(id.clone()));
                slot.insert(tx);
            }
        }

        info!("Peer registered: {}", id);
        Ok(PeerEndpoint {
            id,
            switchboard: self.clone(),
            events: rx,
        })
    }

    pub fn is_registered(&self, id: &PeerId) -> bool {
        self.inner.peers.contains_key(id)
    }

    pub fn peer_count(&self) -> usize {
        self.inner.peers.len()
    }

    /// Releases `id` and closes every link and call it takes part in.
    pub fn unregister(&self, id: &PeerId) {
        if self.inner.peers.remove(id).is_none() {
            return;
        }

        let links: Vec<LinkId> = self
            .inner
            .links
            .iter()
            .filter(|entry| entry.0 == *id || entry.1 == *id)
            .map(|entry| *entry.key())
            .collect();
        for link in links {
            self.disconnect(link);
        }

        let calls: Vec<CallId> = self
            .inner
            .calls
            .iter()
            .filter(|entry| entry.0 == *id || entry.1 == *id)
            .map(|entry| *entry.key())
            .collect();
        for call in calls {
            self.hang_up(call);
        }

        info!("Peer unregistered: {}", id);
    }

    /// Opens a data link from `from` to `to`.
    pub fn connect(&self, from: &PeerId, to: &PeerId) -> Result<LinkId, LensError> {
        let link = LinkId::new();
        self.inner.links.insert(link, (from.clone(), to.clone()));

        let delivered = self.deliver(
            to,
            PeerEvent::Connection {
                link,
                remote: from.clone(),
            },
        ) && self.deliver(to, PeerEvent::ConnectionOpen { link });

        if !delivered {
            self.inner.links.remove(&link);
            return Err(LensError::PeerUnavailable(to.clone()));
        }

        self.deliver(from, PeerEvent::ConnectionOpen { link });
        debug!("Link {} opened: {} -> {}", link, from, to);
        Ok(link)
    }

    /// Delivers `payload` to the other end of `link`.
    pub fn send(&self, from: &PeerId, link: LinkId, payload: Bytes) -> Result<(), LensError> {
        let remote = {
            let Some(ends) = self.inner.links.get(&link) else {
                return Err(LensError::ChannelClosed);
            };
            match &*ends {
                (a, b) if a == from => b.clone(),
                (a, b) if b == from => a.clone(),
                _ => return Err(LensError::ChannelClosed),
            }
        };

        if self.deliver(&remote, PeerEvent::Data { link, payload }) {
            Ok(())
        } else {
            Err(LensError::ChannelClosed)
        }
    }

    /// Closes `link` on both ends. Closing twice is a no-op.
    pub fn disconnect(&self, link: LinkId) {
        let Some((_, (a, b))) = self.inner.links.remove(&link) else {
            return;
        };
        self.deliver(&a, PeerEvent::ConnectionClosed { link });
        self.deliver(&b, PeerEvent::ConnectionClosed { link });
        debug!("Link {} closed", link);
    }

    pub fn is_linked(&self, link: LinkId) -> bool {
        self.inner.links.contains_key(&link)
    }

    /// Offers `stream` to `to` as a media call.
    pub fn call(&self, from: &PeerId, to: &PeerId, stream: MediaStream) -> Result<CallId, LensError> {
        let call = CallId::new();
        self.inner.calls.insert(call, (from.clone(), to.clone()));

        let offered = self.deliver(
            to,
            PeerEvent::Call {
                call,
                remote: from.clone(),
                stream,
            },
        );
        if !offered {
            self.inner.calls.remove(&call);
            return Err(LensError::PeerUnavailable(to.clone()));
        }

        debug!("Call {} placed: {} -> {}", call, from, to);
        Ok(call)
    }

    /// Accepts `call` and tells the caller.
    pub fn answer(&self, call: CallId) -> Result<(), LensError> {
        let caller = match self.inner.calls.get(&call) {
            Some(ends) => ends.0.clone(),
            None => return Err(LensError::ChannelClosed),
        };
        self.deliver(&caller, PeerEvent::CallAnswered { call });
        Ok(())
    }

    /// Ends `call` on both sides. Hanging up twice is a no-op.
    pub fn hang_up(&self, call: CallId) {
        let Some((_, (caller, callee))) = self.inner.calls.remove(&call) else {
            return;
        };
        self.deliver(&caller, PeerEvent::CallClosed { call });
        self.deliver(&callee, PeerEvent::CallClosed { call });
        debug!("Call {} closed", call);
    }

    pub fn is_calling(&self, call: CallId) -> bool {
        self.inner.calls.contains_key(&call)
    }

    fn deliver(&self, to: &PeerId, event: PeerEvent) -> bool {
        let Some(peer) = self.inner.peers.get(to) else {
            return false;
        };
        if peer.send(event).is_err() {
            warn!("Peer {} stopped listening", to);
            return false;
        }
        true
    }
}

impl Default for Switchboard {
    fn default() -> Self {
        Self::new()
    }
}

/// A registered identity. Dropping it releases the identifier.
pub struct PeerEndpoint {
    id: PeerId,
    switchboard: Switchboard,
    events: mpsc::UnboundedReceiver<PeerEvent>,
}

impl PeerEndpoint {
    pub fn id(&self) -> &PeerId {
        &self.id
    }

    pub fn switchboard(&self) -> &Switchboard {
        &self.switchboard
    }

    /// Next broker event. `None` once the identifier was released.
    pub async fn next_event(&mut self) -> Option<PeerEvent> {
        self.events.recv().await
    }

    pub fn connect(&self, to: &PeerId) -> Result<LinkId, LensError> {
        self.switchboard.connect(&self.id, to)
    }

    pub fn call(&self, to: &PeerId, stream: MediaStream) -> Result<CallId, LensError> {
        self.switchboard.call(&self.id, to, stream)
    }
}

impl Drop for PeerEndpoint {
    fn drop(&mut self) {
        self.switchboard.unregister(&self.id);
    }
}

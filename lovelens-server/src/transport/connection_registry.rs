use crate::transport::ControlChannel;
use lovelens_core::{ControlMessage, LinkId, PeerId};
use std::collections::HashMap;
use tracing::warn;

/// Host-side set of control channels, keyed by remote identifier.
#[derive(Default)]
pub struct ConnectionRegistry {
    channels: HashMap<PeerId, ControlChannel>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tracks `channel`. A previous channel from the same remote is closed.
    pub fn insert(&mut self, channel: ControlChannel) {
        if let Some(mut previous) = self.channels.insert(channel.remote().clone(), channel) {
            previous.close();
        }
    }

    /// Marks the channel on `link` open and returns it.
    pub fn open(&mut self, link: LinkId) -> Option<&ControlChannel> {
        let channel = self.find_by_link_mut(link)?;
        channel.mark_open();
        Some(channel)
    }

    pub fn find_by_remote(&self, remote: &PeerId) -> Option<&ControlChannel> {
        self.channels.get(remote)
    }

    pub fn find_by_link(&self, link: LinkId) -> Option<&ControlChannel> {
        self.channels.values().find(|c| c.link() == link)
    }

    pub fn find_by_link_mut(&mut self, link: LinkId) -> Option<&mut ControlChannel> {
        self.channels.values_mut().find(|c| c.link() == link)
    }

    /// Untracks the channel on `link`, if it is still the current one for
    /// its remote.
    pub fn remove_link(&mut self, link: LinkId) -> Option<ControlChannel> {
        let remote = self.find_by_link(link)?.remote().clone();
        let mut channel = self.channels.remove(&remote)?;
        channel.mark_closed();
        Some(channel)
    }

    pub fn remove_remote(&mut self, remote: &PeerId) -> Option<ControlChannel> {
        self.channels.remove(remote)
    }

    /// Sends `message` to every open channel. Returns how many got it.
    pub fn broadcast(&self, message: &ControlMessage) -> usize {
        let mut delivered = 0;
        for channel in self.channels.values().filter(|c| c.is_open()) {
            match channel.send(message) {
                Ok(()) => delivered += 1,
                Err(e) => warn!("Broadcast to {} failed: {}", channel.remote(), e),
            }
        }
        delivered
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    pub fn open_count(&self) -> usize {
        self.channels.values().filter(|c| c.is_open()).count()
    }

    /// Closes and forgets every channel.
    pub fn clear(&mut self) {
        for (_, mut channel) in self.channels.drain() {
            channel.close();
        }
    }
}

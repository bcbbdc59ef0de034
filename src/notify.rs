use dashmap::DashMap;
use tokio::sync::broadcast;

use crate::model::ReservationEvent;

const CHANNEL_CAPACITY: usize = 64;

/// Broadcast hub for reservation changes, one channel per lower-cased email.
pub struct NotifyHub {
    channels: DashMap<String, broadcast::Sender<ReservationEvent>>,
}

impl Default for NotifyHub {
    fn default() -> Self {
        Self::new()
    }
}

impl NotifyHub {
    pub fn new() -> Self {
        Self {
            channels: DashMap::new(),
        }
    }

    /// Subscribe to changes for an email. Creates the channel if needed.
    pub fn subscribe(&self, email: &str) -> broadcast::Receiver<ReservationEvent> {
        let sender = self
            .channels
            .entry(channel_key(email))
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0);
        sender.subscribe()
    }

    /// Send a notification. No-op if nobody is listening.
    pub fn send(&self, event: &ReservationEvent) {
        if let Some(sender) = self.channels.get(&channel_key(event.email())) {
            let _ = sender.send(event.clone());
        }
    }

    pub fn subscriber_count(&self, email: &str) -> usize {
        self.channels
            .get(&channel_key(email))
            .map_or(0, |s| s.receiver_count())
    }
}

fn channel_key(email: &str) -> String {
    email.trim().to_lowercase()
}

//! Live-reload channel registry and broadcast protocol.

use std::collections::HashMap;
use std::convert::Infallible;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use axum::response::sse::Event;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_stream::Stream;
use uuid::Uuid;

use crate::observability::metrics;

type ChannelMap = HashMap<Uuid, mpsc::UnboundedSender<Event>>;

/// Registry of open reload channels, one per connected client.
///
/// Each client lifecycle is subscribing → open → closed. A channel leaves
/// the registry when the client disconnects (the stream's drop guard) or
/// when [`ReloadBroadcaster::close_all`] drains the registry.
///
/// `send`/`close_all` run concurrently with new subscriptions; the registry
/// is snapshot before iteration, so a subscription landing mid-broadcast may
/// miss that broadcast but never corrupts the registry.
#[derive(Clone, Default)]
pub struct ReloadBroadcaster {
    channels: Arc<Mutex<ChannelMap>>,
}

impl ReloadBroadcaster {
    pub fn new() -> Self {
        Self {
            channels: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Open a channel for a new client and register it.
    ///
    /// The returned stream yields broadcast events and deregisters the
    /// channel when the transport drops it.
    pub fn subscribe(&self) -> (Uuid, ClientStream) {
        let id = Uuid::new_v4();
        let (tx, rx) = mpsc::unbounded_channel();

        let count = {
            let mut channels = self.channels.lock().expect("channel registry mutex poisoned");
            channels.insert(id, tx);
            channels.len()
        };
        metrics::record_reload_clients(count);

        let stream = ClientStream {
            inner: UnboundedReceiverStream::new(rx),
            _guard: ChannelGuard {
                id,
                channels: Arc::clone(&self.channels),
            },
        };
        (id, stream)
    }

    /// Dispatch an event to every currently registered channel.
    ///
    /// Channels that already closed are skipped and lazily deregistered;
    /// they are never an error.
    pub fn send(&self, event_type: &str, data: &str) {
        let snapshot: Vec<(Uuid, mpsc::UnboundedSender<Event>)> = {
            let channels = self.channels.lock().expect("channel registry mutex poisoned");
            channels.iter().map(|(id, tx)| (*id, tx.clone())).collect()
        };

        let mut dead = Vec::new();
        for (id, tx) in &snapshot {
            let event = Event::default().event(event_type).data(data);
            if tx.send(event).is_err() {
                dead.push(*id);
            }
        }

        tracing::debug!(
            event = %event_type,
            clients = snapshot.len() - dead.len(),
            "event broadcast"
        );

        if !dead.is_empty() {
            let mut channels = self.channels.lock().expect("channel registry mutex poisoned");
            for id in &dead {
                channels.remove(id);
            }
            metrics::record_reload_clients(channels.len());
        }
    }

    /// Close every registered channel and clear the registry.
    ///
    /// Dropping a sender terminates its client's stream, which ends the
    /// held-open response.
    pub fn close_all(&self) {
        let drained = {
            let mut channels = self.channels.lock().expect("channel registry mutex poisoned");
            let drained = channels.len();
            channels.clear();
            drained
        };
        metrics::record_reload_clients(0);
        tracing::debug!(clients = drained, "all reload channels closed");
    }

    /// Number of currently registered channels.
    pub fn client_count(&self) -> usize {
        self.channels.lock().expect("channel registry mutex poisoned").len()
    }
}

/// Deregisters the channel when the transport drops the stream.
struct ChannelGuard {
    id: Uuid,
    channels: Arc<Mutex<ChannelMap>>,
}

impl Drop for ChannelGuard {
    fn drop(&mut self) {
        let mut channels = self.channels.lock().expect("channel registry mutex poisoned");
        if channels.remove(&self.id).is_some() {
            metrics::record_reload_clients(channels.len());
            tracing::debug!(id = %self.id, "reload channel closed");
        }
    }
}

/// Event stream handed to the SSE response for one client.
pub struct ClientStream {
    inner: UnboundedReceiverStream<Event>,
    _guard: ChannelGuard,
}

impl Stream for ClientStream {
    type Item = Result<Event, Infallible>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx).map(|event| event.map(Ok))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_stream::StreamExt;

    #[tokio::test]
    async fn test_send_reaches_registered_channels() {
        let broadcaster = ReloadBroadcaster::new();
        let (_, mut first) = broadcaster.subscribe();
        let (_, mut second) = broadcaster.subscribe();
        assert_eq!(broadcaster.client_count(), 2);

        broadcaster.send("reload", "{}");

        assert!(first.next().await.is_some());
        assert!(second.next().await.is_some());
    }

    #[tokio::test]
    async fn test_close_all_empties_registry_and_ends_streams() {
        let broadcaster = ReloadBroadcaster::new();
        let (_, mut stream) = broadcaster.subscribe();

        broadcaster.close_all();
        assert_eq!(broadcaster.client_count(), 0);

        // Sender dropped, stream terminates.
        assert!(stream.next().await.is_none());

        // A subsequent send reaches zero channels and must not error.
        broadcaster.send("reload", "{}");
    }

    #[tokio::test]
    async fn test_dropped_stream_deregisters() {
        let broadcaster = ReloadBroadcaster::new();
        let (_, stream) = broadcaster.subscribe();
        assert_eq!(broadcaster.client_count(), 1);

        drop(stream);
        assert_eq!(broadcaster.client_count(), 0);
    }

    #[tokio::test]
    async fn test_send_skips_removed_channels() {
        let broadcaster = ReloadBroadcaster::new();
        let (_, mut kept) = broadcaster.subscribe();
        let (_, removed) = broadcaster.subscribe();
        drop(removed);

        broadcaster.send("reload", "{}");

        let event = kept.next().await;
        assert!(event.is_some());
        assert_eq!(broadcaster.client_count(), 1);
    }
}

// ── Live collection subscriptions ──
//
// Consumers of the alert poller receive each fresh alert list through an
// `EntityStream`. Snapshots are immutable `Arc`s; a newer publish never
// mutates one already handed out.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

pub type SharedList<T> = Arc<Vec<Arc<T>>>;

/// A subscription to a polled collection.
pub struct EntityStream<T: Clone + Send + Sync + 'static> {
    current: SharedList<T>,
    receiver: watch::Receiver<SharedList<T>>,
}

impl<T: Clone + Send + Sync + 'static> EntityStream<T> {
    pub(crate) fn new(receiver: watch::Receiver<SharedList<T>>) -> Self {
        let current = receiver.borrow().clone();
        Self { current, receiver }
    }

    /// The list as of subscription (or the last `changed()`).
    pub fn current(&self) -> &SharedList<T> {
        &self.current
    }

    /// Most recently published list.
    pub fn latest(&self) -> SharedList<T> {
        self.receiver.borrow().clone()
    }

    /// Wait for the next publish. `None` once the poller has stopped.
    pub async fn changed(&mut self) -> Option<SharedList<T>> {
        self.receiver.changed().await.ok()?;
        let snap = self.receiver.borrow_and_update().clone();
        self.current = snap.clone();
        Some(snap)
    }

    pub fn into_stream(self) -> EntityWatchStream<T> {
        EntityWatchStream {
            inner: WatchStream::new(self.receiver),
        }
    }
}

/// `Stream` adapter yielding each published list.
pub struct EntityWatchStream<T: Clone + Send + Sync + 'static> {
    inner: WatchStream<SharedList<T>>,
}

impl<T: Clone + Send + Sync + 'static> Stream for EntityWatchStream<T> {
    type Item = SharedList<T>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn changed_tracks_publishes_and_ends_with_sender() {
        let (tx, rx) = watch::channel(Arc::new(vec![Arc::new(1_u32)]));
        let mut stream = EntityStream::new(rx);
        assert_eq!(stream.current().len(), 1);

        tx.send(Arc::new(vec![Arc::new(2), Arc::new(3)])).unwrap();
        let snap = stream.changed().await.unwrap();
        assert_eq!(snap.len(), 2);
        assert_eq!(stream.current().len(), 2);

        drop(tx);
        assert!(stream.changed().await.is_none());
        assert_eq!(stream.latest().len(), 2);
    }
}

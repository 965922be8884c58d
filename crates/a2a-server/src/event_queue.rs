use std::pin::Pin;
use std::task::{Context, Poll};

use a2a_types::Event;
use async_trait::async_trait;
use futures_core::Stream;
use tokio::sync::{mpsc, RwLock};

use crate::error::ServerError;

/// Type alias for a stream of events.
pub type EventStream = Pin<Box<dyn Stream<Item = Event> + Send>>;

/// Writes events into the queue (used by AgentExecutor).
#[async_trait]
pub trait EventQueueWriter: Send + Sync {
    async fn write(&self, event: Event) -> Result<(), ServerError>;
    async fn close(&self) -> Result<(), ServerError>;
}

/// Create a connected single-producer/single-consumer queue.
pub fn event_queue() -> (InMemoryEventQueue, EventQueueReader) {
    let (sender, receiver) = mpsc::unbounded_channel();
    (
        InMemoryEventQueue {
            sender: RwLock::new(Some(sender)),
        },
        EventQueueReader { receiver },
    )
}

/// Unbounded in-memory queue backed by `tokio::sync::mpsc`.
///
/// The sender is wrapped in a `RwLock<Option<...>>` so that `close()` can
/// drop it, ending the reader once buffered events are drained. Dropping
/// the queue has the same effect.
pub struct InMemoryEventQueue {
    sender: RwLock<Option<mpsc::UnboundedSender<Event>>>,
}

#[async_trait]
impl EventQueueWriter for InMemoryEventQueue {
    async fn write(&self, event: Event) -> Result<(), ServerError> {
        let sender = self.sender.read().await;
        match sender.as_ref() {
            Some(sender) => sender.send(event).map_err(|_| ServerError::QueueClosed),
            None => Err(ServerError::QueueClosed),
        }
    }

    async fn close(&self) -> Result<(), ServerError> {
        self.sender.write().await.take();
        Ok(())
    }
}

/// Consumer side of an event queue.
pub struct EventQueueReader {
    receiver: mpsc::UnboundedReceiver<Event>,
}

impl EventQueueReader {
    /// Wait for the next event; `None` once the writer is closed and drained.
    pub async fn read(&mut self) -> Option<Event> {
        self.receiver.recv().await
    }

    pub fn poll_read(&mut self, cx: &mut Context<'_>) -> Poll<Option<Event>> {
        self.receiver.poll_recv(cx)
    }

    pub fn into_stream(self) -> EventStream {
        Box::pin(tokio_stream::wrappers::UnboundedReceiverStream::new(
            self.receiver,
        ))
    }
}

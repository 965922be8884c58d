use async_trait::async_trait;

use crate::error::ServerError;
use crate::event_queue::EventQueueWriter;
use crate::request_context::RequestContext;

/// Agent business logic entry point.
///
/// Developers implement this trait to define how the agent processes an
/// inbound message and publishes Task, Message, status and artifact events
/// to the queue. The queue is closed once `execute` returns.
#[async_trait]
pub trait AgentExecutor: Send + Sync + 'static {
    async fn execute(
        &self,
        context: &RequestContext,
        queue: &dyn EventQueueWriter,
    ) -> Result<(), ServerError>;

    /// Request cancellation of the task in `context`; must publish a
    /// `canceled` state.
    async fn cancel(
        &self,
        context: &RequestContext,
        queue: &dyn EventQueueWriter,
    ) -> Result<(), ServerError>;
}

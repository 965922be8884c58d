use std::pin::Pin;

use a2a_types::{
    CancelTaskRequest, CancelTaskResponse, GetTaskRequest, GetTaskResponse, SendMessageRequest,
    SendMessageResponse, SendStreamingMessageRequest, SendStreamingMessageResponse,
};
use futures_core::Stream;

use crate::error::ClientError;

/// Lazily decoded responses of a `message/stream` call.
///
/// Each item is one line of the response body. The stream ends when the
/// server closes the connection; dropping it closes the connection early.
pub type EventStream =
    Pin<Box<dyn Stream<Item = Result<SendStreamingMessageResponse, ClientError>> + Send>>;

/// Transport layer abstraction for A2A protocol communication.
///
/// Default implementation: [`crate::JsonRpcTransport`] (reqwest-based HTTP + JSON-RPC).
#[async_trait::async_trait]
pub trait Transport: Send + Sync + 'static {
    async fn send_message(
        &self,
        request: SendMessageRequest,
    ) -> Result<SendMessageResponse, ClientError>;

    async fn send_message_streaming(
        &self,
        request: SendStreamingMessageRequest,
    ) -> Result<EventStream, ClientError>;

    async fn get_task(&self, request: GetTaskRequest) -> Result<GetTaskResponse, ClientError>;

    async fn cancel_task(
        &self,
        request: CancelTaskRequest,
    ) -> Result<CancelTaskResponse, ClientError>;
}

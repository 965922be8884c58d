use a2a_types::{
    AgentCard, CancelTaskRequest, CancelTaskResponse, GetTaskRequest, GetTaskResponse,
    SendMessageRequest, SendMessageResponse, SendStreamingMessageRequest,
};

use crate::agent_card_resolver::AgentCardResolver;
use crate::error::ClientError;
use crate::jsonrpc_transport::{ClientConfig, JsonRpcTransport};
use crate::transport::{EventStream, Transport};

/// High-level A2A client.
///
/// Wraps a [`Transport`] and exposes the protocol operations. Application
/// errors come back inside the returned envelope; `ClientError` is reserved
/// for transport and decoding failures.
pub struct A2AClient {
    transport: Box<dyn Transport>,
}

impl A2AClient {
    /// Create a client for the endpoint advertised in an [`AgentCard`].
    pub fn from_agent_card(card: &AgentCard) -> Result<Self, ClientError> {
        Self::new(&card.url)
    }

    /// Resolve the card at `base_url` and connect to its endpoint.
    pub async fn connect(base_url: &str) -> Result<(Self, AgentCard), ClientError> {
        let card = AgentCardResolver::new().resolve(base_url).await?;
        let client = Self::from_agent_card(&card)?;
        Ok((client, card))
    }

    /// Create a client targeting a JSON-RPC endpoint URL directly.
    pub fn new(url: &str) -> Result<Self, ClientError> {
        Self::with_config(url, &ClientConfig::default())
    }

    pub fn with_config(url: &str, config: &ClientConfig) -> Result<Self, ClientError> {
        let transport = JsonRpcTransport::with_config(url, config)?;
        Ok(Self {
            transport: Box::new(transport),
        })
    }

    /// Create a client with a custom [`Transport`] implementation.
    pub fn with_transport(transport: impl Transport) -> Self {
        Self {
            transport: Box::new(transport),
        }
    }

    /// `message/send`: returns the first event the agent published.
    pub async fn send_message(
        &self,
        request: SendMessageRequest,
    ) -> Result<SendMessageResponse, ClientError> {
        self.transport.send_message(request).await
    }

    /// `message/stream`: one decoded response per published event.
    pub async fn send_message_streaming(
        &self,
        request: impl Into<SendStreamingMessageRequest>,
    ) -> Result<EventStream, ClientError> {
        self.transport.send_message_streaming(request.into()).await
    }

    /// `tasks/get`
    pub async fn get_task(&self, request: GetTaskRequest) -> Result<GetTaskResponse, ClientError> {
        self.transport.get_task(request).await
    }

    /// `tasks/cancel`
    pub async fn cancel_task(
        &self,
        request: CancelTaskRequest,
    ) -> Result<CancelTaskResponse, ClientError> {
        self.transport.cancel_task(request).await
    }

    /// Release the transport and its connection pool.
    pub fn close(self) {
        drop(self.transport);
    }
}

pub mod agent_card_resolver;
pub mod client;
pub mod error;
pub mod jsonrpc_transport;
pub mod ndjson;
pub mod transport;

pub use agent_card_resolver::{resolve_endpoint, AgentCardResolver, AGENT_CARD_PATH};
pub use client::A2AClient;
pub use error::ClientError;
pub use jsonrpc_transport::{ClientConfig, JsonRpcTransport};
pub use transport::{EventStream, Transport};

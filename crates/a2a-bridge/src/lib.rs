//! Bridges between local tools and A2A agents.
//!
//! * [`mcp_to_a2a`]: publish a [`Tool`] as a single-skill agent.
//! * [`a2a_to_mcp`]: turn a remote agent's skills into [`Tool`]s.
//! * [`tool_server`]: list and call a [`ToolRegistry`] over plain HTTP.

pub mod a2a_to_mcp;
pub mod mcp_to_a2a;
pub mod tool;
pub mod tool_server;

pub use a2a_to_mcp::{response_text, AgentToolset};
pub use mcp_to_a2a::{tool_arguments, ToolAgent, ToolExecutor};
pub use tool::{
    echo_tool, join_content, Content, Tool, ToolArgs, ToolError, ToolHandler, ToolRegistry,
};
pub use tool_server::{serve_tools, tool_router, ToolDescriptor};

/// Top-level error for the bridge binary.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error(transparent)]
    Client(#[from] a2a_client::ClientError),

    #[error(transparent)]
    Server(#[from] a2a_server::ServerError),

    #[error(transparent)]
    Tool(#[from] ToolError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

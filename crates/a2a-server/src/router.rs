use std::sync::Arc;

use a2a_types::AgentCard;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::agent_card_serve::{serve_agent_card, AGENT_CARD_PATH};
use crate::agent_executor::AgentExecutor;
use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::handler::{DefaultHandler, RequestHandler};
use crate::jsonrpc_handler::jsonrpc_handler;

/// Shared application state for axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub handler: Arc<dyn RequestHandler>,
    pub agent_card: Arc<AgentCard>,
}

/// Create an axum `Router` with A2A protocol endpoints.
///
/// JSON-RPC is accepted at `/`, and also at the card's `url` when that is
/// a relative path such as `/a2a/tools/echo`. Every route answers
/// cross-origin requests from any origin.
pub fn create_router(handler: Arc<dyn RequestHandler>, agent_card: AgentCard) -> Router {
    let rpc_path = relative_rpc_path(&agent_card.url).map(str::to_string);
    let state = AppState {
        handler,
        agent_card: Arc::new(agent_card),
    };

    let mut router = Router::new()
        .route("/", post(jsonrpc_handler))
        .route(AGENT_CARD_PATH, get(serve_agent_card));
    if let Some(path) = rpc_path {
        router = router.route(&path, post(jsonrpc_handler));
    }
    router.with_state(state).layer(CorsLayer::permissive())
}

fn relative_rpc_path(url: &str) -> Option<&str> {
    let path = url.trim_end_matches('/');
    (url.starts_with('/') && !path.is_empty() && path != AGENT_CARD_PATH).then_some(path)
}

/// Convenience function: create a server from an `AgentExecutor` and start listening.
pub async fn serve(
    executor: impl AgentExecutor,
    agent_card: AgentCard,
    config: ServerConfig,
) -> Result<(), ServerError> {
    let handler = DefaultHandler::builder()
        .executor(Arc::new(executor))
        .config(config.clone())
        .build()?;
    let name = agent_card.name.clone();
    let router = create_router(Arc::new(handler), agent_card);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %listener.local_addr()?, agent = %name, "A2A server listening");
    axum::serve(listener, router).await?;
    Ok(())
}

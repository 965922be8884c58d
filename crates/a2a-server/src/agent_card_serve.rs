use axum::extract::State;
use axum::Json;

use a2a_types::AgentCard;

use crate::router::AppState;

/// Well-known location of the agent card.
pub const AGENT_CARD_PATH: &str = "/.well-known/agent.json";

/// Serve the agent card at `/.well-known/agent.json`.
pub async fn serve_agent_card(State(state): State<AppState>) -> Json<AgentCard> {
    Json(state.agent_card.as_ref().clone())
}

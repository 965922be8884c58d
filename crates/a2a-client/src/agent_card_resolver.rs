use a2a_types::AgentCard;

use crate::error::{check_status, ClientError};

/// Well-known location of the agent card, relative to the agent's base URL.
pub const AGENT_CARD_PATH: &str = ".well-known/agent.json";

/// Resolves an [`AgentCard`] from a server's well-known URI.
///
/// The card is served at `{base_url}/.well-known/agent.json`. A relative
/// `url` in the card is resolved against `base_url`, so agents may publish
/// their RPC endpoint as a path.
pub struct AgentCardResolver {
    client: reqwest::Client,
}

impl AgentCardResolver {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Fetch and deserialize the agent card from `{base_url}/.well-known/agent.json`.
    pub async fn resolve(&self, base_url: &str) -> Result<AgentCard, ClientError> {
        self.resolve_with_path(base_url, AGENT_CARD_PATH).await
    }

    /// Fetch the agent card from `{base_url}/{path}`.
    pub async fn resolve_with_path(
        &self,
        base_url: &str,
        path: &str,
    ) -> Result<AgentCard, ClientError> {
        let url = format!(
            "{}/{}",
            base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ClientError::network(&url, e))?;
        let response = check_status(&url, response).await?;
        let body = response
            .bytes()
            .await
            .map_err(|e| ClientError::network(&url, e))?;

        let mut card: AgentCard =
            serde_json::from_slice(&body).map_err(|e| ClientError::decode(&url, e))?;
        card.url = resolve_endpoint(base_url, &card.url);
        tracing::info!(card_url = %url, endpoint = %card.url, agent = %card.name, "resolved agent card");
        Ok(card)
    }
}

impl Default for AgentCardResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolves a possibly relative endpoint against the agent's base URL.
/// Absolute endpoints and unparsable bases are returned unchanged.
pub fn resolve_endpoint(base_url: &str, endpoint: &str) -> String {
    if reqwest::Url::parse(endpoint).is_ok() {
        return endpoint.to_string();
    }
    reqwest::Url::parse(base_url)
        .and_then(|base| base.join(endpoint))
        .map(String::from)
        .unwrap_or_else(|_| endpoint.to_string())
}

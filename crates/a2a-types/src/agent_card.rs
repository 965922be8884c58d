use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentCapabilities {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub streaming: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub push_notifications: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_transition_history: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentProvider {
    pub organization: String,
    pub url: String,
}

/// One addressable capability; `id` is the stable identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentSkill {
    pub id: String,
    pub name: String,
    pub description: String,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub examples: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_modes: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_modes: Option<Vec<String>>,
}

/// Static capability descriptor served at `/.well-known/agent.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentCard {
    pub name: String,
    pub description: String,
    /// JSON-RPC endpoint; may be relative to the card's origin
    pub url: String,
    pub version: String,
    pub default_input_modes: Vec<String>,
    pub default_output_modes: Vec<String>,
    pub skills: Vec<AgentSkill>,
    pub capabilities: AgentCapabilities,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<AgentProvider>,
    /// Declared only; nothing in this workspace enforces them
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security_schemes: Option<serde_json::Map<String, serde_json::Value>>,
}

impl AgentCard {
    pub fn skill(&self, id: &str) -> Option<&AgentSkill> {
        self.skills.iter().find(|s| s.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_card() -> AgentCard {
        AgentCard {
            name: "Test Agent".into(),
            description: "A test agent".into(),
            url: "http://localhost:3000/".into(),
            version: "1.0.0".into(),
            default_input_modes: vec!["text/plain".into()],
            default_output_modes: vec!["text/plain".into()],
            skills: vec![AgentSkill {
                id: "echo".into(),
                name: "Echo".into(),
                description: "Echoes messages".into(),
                tags: vec!["test".into()],
                examples: Some(vec!["hello".into()]),
                input_modes: None,
                output_modes: None,
            }],
            capabilities: AgentCapabilities {
                streaming: Some(true),
                push_notifications: Some(false),
                state_transition_history: None,
            },
            provider: Some(AgentProvider {
                organization: "Example".into(),
                url: "https://example.com".into(),
            }),
            security_schemes: None,
        }
    }

    #[test]
    fn test_agent_card_roundtrip() {
        let card = sample_card();

        let json = serde_json::to_value(&card).unwrap();
        assert_eq!(json["defaultInputModes"][0], "text/plain");
        assert_eq!(json["capabilities"]["streaming"], true);
        assert!(json["capabilities"].get("stateTransitionHistory").is_none());
        assert!(json.get("securitySchemes").is_none());

        let deserialized: AgentCard = serde_json::from_value(json).unwrap();
        assert_eq!(deserialized, card);
        assert_eq!(deserialized.skill("echo").unwrap().name, "Echo");
        assert!(deserialized.skill("missing").is_none());
    }

    #[test]
    fn test_agent_card_minimal() {
        let json = r#"{
            "name": "Minimal",
            "description": "Bare card",
            "url": "http://localhost:8080/",
            "version": "0.1.0",
            "defaultInputModes": [],
            "defaultOutputModes": [],
            "skills": [],
            "capabilities": {}
        }"#;

        let card: AgentCard = serde_json::from_str(json).unwrap();
        assert_eq!(card.name, "Minimal");
        assert_eq!(card.capabilities, AgentCapabilities::default());
        assert!(card.provider.is_none());
    }

    #[test]
    fn test_agent_card_missing_required_fails() {
        let json = r#"{"name": "No skills", "description": "x", "url": "/", "version": "1"}"#;
        assert!(serde_json::from_str::<AgentCard>(json).is_err());
    }

    #[test]
    fn test_agent_card_security_schemes_preserved() {
        let mut json = serde_json::to_value(sample_card()).unwrap();
        json["securitySchemes"] = serde_json::json!({
            "bearer": {"type": "http", "scheme": "bearer"}
        });

        let card: AgentCard = serde_json::from_value(json).unwrap();
        let schemes = card.security_schemes.unwrap();
        assert_eq!(schemes["bearer"]["scheme"], "bearer");
    }
}

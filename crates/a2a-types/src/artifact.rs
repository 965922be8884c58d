use serde::{Deserialize, Serialize};

use crate::part::Part;

/// Output produced by a task, delivered whole or in chunks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    pub artifact_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub parts: Vec<Part>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Vec<String>>,
}

impl Artifact {
    pub fn new(artifact_id: impl Into<String>, parts: Vec<Part>) -> Self {
        Self {
            artifact_id: artifact_id.into(),
            name: None,
            description: None,
            parts,
            metadata: None,
            extensions: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_serde_roundtrip() {
        let mut artifact = Artifact::new("art-1", vec![Part::text("output data")]);
        artifact.name = Some("Result".into());

        let json = serde_json::to_string(&artifact).unwrap();
        assert!(json.contains("\"artifactId\":\"art-1\""));
        assert!(json.contains("\"kind\":\"text\""));

        let deserialized: Artifact = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, artifact);
    }

    #[test]
    fn test_artifact_optional_fields_omitted() {
        let artifact = Artifact::new("art-1", vec![]);

        let json = serde_json::to_string(&artifact).unwrap();
        assert!(!json.contains("name"));
        assert!(!json.contains("description"));
    }
}

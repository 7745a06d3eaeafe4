use serde::{Deserialize, Serialize};
use std::fmt;

/// Store-assigned document identifier. Stable across updates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DocumentId(String);

impl DocumentId {
    pub fn new(value: impl Into<String>) -> Result<Self, String> {
        let value = value.into();
        Self::validate(&value)?;
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(value: &str) -> Result<(), String> {
        if value.trim().is_empty() {
            return Err("Document ID cannot be empty".to_string());
        }
        Ok(())
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for DocumentId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DocumentId> for String {
    fn from(value: DocumentId) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_blank_ids() {
        assert!(DocumentId::new("  ").is_err());
        assert_eq!(DocumentId::new("a/b").unwrap().as_str(), "a/b");
        assert_eq!(DocumentId::new("42").unwrap().as_str(), "42");
    }

    #[test]
    fn deserialization_validates() {
        assert!(serde_json::from_str::<DocumentId>("\"\"").is_err());
        let id: DocumentId = serde_json::from_str("\"a?b#c\"").unwrap();
        assert_eq!(id.as_str(), "a?b#c");
    }
}

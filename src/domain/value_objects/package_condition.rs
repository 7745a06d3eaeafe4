use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PackageCondition {
    Intact,
    Damaged,
    Missing,
    Unknown(String),
}

impl PackageCondition {
    pub fn as_str(&self) -> &str {
        match self {
            PackageCondition::Intact => "intact",
            PackageCondition::Damaged => "damaged",
            PackageCondition::Missing => "missing",
            PackageCondition::Unknown(value) => value.as_str(),
        }
    }
}

impl Default for PackageCondition {
    fn default() -> Self {
        PackageCondition::Unknown(String::new())
    }
}

impl From<&str> for PackageCondition {
    fn from(value: &str) -> Self {
        match value {
            "intact" => PackageCondition::Intact,
            "damaged" => PackageCondition::Damaged,
            "missing" => PackageCondition::Missing,
            other => PackageCondition::Unknown(other.to_string()),
        }
    }
}

impl From<String> for PackageCondition {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<PackageCondition> for String {
    fn from(value: PackageCondition) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for PackageCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

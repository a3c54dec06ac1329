use serde::{Deserialize, Serialize};
use std::fmt;

/// Display intent for a showdown collection between runs
///
/// Absence from the stored map means the slug has never been shown.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleStatus {
    /// Featured item: visible on library, home and shared hubs
    Spotlight,
    /// Inside the window but not featured: visible on the library only
    Library,
    /// Left the window or vanished from the dataset: scheduled for deletion
    Retire,
}

impl LifecycleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleStatus::Spotlight => "spotlight",
            LifecycleStatus::Library => "library",
            LifecycleStatus::Retire => "retire",
        }
    }

    /// Parse a stored value; anything unrecognised is treated as unknown
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "spotlight" => Some(LifecycleStatus::Spotlight),
            "library" => Some(LifecycleStatus::Library),
            "retire" => Some(LifecycleStatus::Retire),
            _ => None,
        }
    }
}

impl fmt::Display for LifecycleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_values() {
        assert_eq!(LifecycleStatus::parse("spotlight"), Some(LifecycleStatus::Spotlight));
        assert_eq!(LifecycleStatus::parse(" Library "), Some(LifecycleStatus::Library));
        assert_eq!(LifecycleStatus::parse("retire"), Some(LifecycleStatus::Retire));
    }

    #[test]
    fn test_parse_unknown_value() {
        assert_eq!(LifecycleStatus::parse("archived"), None);
        assert_eq!(LifecycleStatus::parse(""), None);
    }

    #[test]
    fn test_serializes_lowercase() {
        let json = serde_json::to_string(&LifecycleStatus::Spotlight).unwrap();
        assert_eq!(json, "\"spotlight\"");
        let parsed: LifecycleStatus = serde_json::from_str("\"retire\"").unwrap();
        assert_eq!(parsed, LifecycleStatus::Retire);
    }
}

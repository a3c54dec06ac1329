use serde::{Deserialize, Serialize};
use std::fmt;

/// Ranking applied to eligible showdowns before window selection
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortMode {
    /// Most complete lists first
    #[default]
    MatchesDesc,
    MatchesAsc,
    /// Keep dataset order
    None,
}

impl SortMode {
    /// Parse a configured mode; unknown strings fall back to `MatchesDesc`
    pub fn from_config(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "matches_asc" => SortMode::MatchesAsc,
            "none" => SortMode::None,
            _ => SortMode::MatchesDesc,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortMode::MatchesDesc => "matches_desc",
            SortMode::MatchesAsc => "matches_asc",
            SortMode::None => "none",
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config() {
        assert_eq!(SortMode::from_config("matches_desc"), SortMode::MatchesDesc);
        assert_eq!(SortMode::from_config("matches_asc"), SortMode::MatchesAsc);
        assert_eq!(SortMode::from_config("none"), SortMode::None);
    }

    #[test]
    fn test_unknown_falls_back_to_desc() {
        assert_eq!(SortMode::from_config("popularity"), SortMode::MatchesDesc);
        assert_eq!(SortMode::from_config(""), SortMode::MatchesDesc);
    }
}

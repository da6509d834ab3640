use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unique identifier for a training module (e.g. `module1`).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModuleId(String);

impl ModuleId {
    /// Creates a new `ModuleId`
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the underlying string value
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Unique identifier for a badge (e.g. `gowning-master`).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BadgeId(String);

impl BadgeId {
    /// Creates a new `BadgeId`
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the underlying string value
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Unique identifier for a learner
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LearnerId(String);

impl LearnerId {
    /// Creates a new `LearnerId`
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the underlying string value
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ModuleId({})", self.0)
    }
}

impl fmt::Debug for BadgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BadgeId({})", self.0)
    }
}

impl fmt::Debug for LearnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LearnerId({})", self.0)
    }
}

// ─── Display Implementations ───────────────────────────────────────────────────

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl fmt::Display for BadgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl fmt::Display for LearnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

// ─── FromStr Implementations ───────────────────────────────────────────────────

/// Error type for parsing an ID from user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    kind: &'static str,
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse {} from string", self.kind)
    }
}

impl std::error::Error for ParseIdError {}

/// Trims the raw value and rejects blanks or embedded whitespace.
fn parse_token(s: &str, kind: &'static str) -> Result<String, ParseIdError> {
    let trimmed = s.trim();
    if trimmed.is_empty() || trimmed.chars().any(char::is_whitespace) {
        return Err(ParseIdError { kind });
    }
    Ok(trimmed.to_owned())
}

impl FromStr for ModuleId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_token(s, "ModuleId").map(ModuleId)
    }
}

impl FromStr for BadgeId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_token(s, "BadgeId").map(BadgeId)
    }
}

impl FromStr for LearnerId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_token(s, "LearnerId").map(LearnerId)
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_id_display() {
        let id = ModuleId::new("module1");
        assert_eq!(id.to_string(), "module1");
    }

    #[test]
    fn test_module_id_from_str_trims() {
        let id: ModuleId = "  module2 ".parse().unwrap();
        assert_eq!(id, ModuleId::new("module2"));
    }

    #[test]
    fn test_module_id_from_str_invalid() {
        assert!("".parse::<ModuleId>().is_err());
        assert!("   ".parse::<ModuleId>().is_err());
        assert!("module 1".parse::<ModuleId>().is_err());
    }

    #[test]
    fn test_badge_id_from_str() {
        let id: BadgeId = "gowning-master".parse().unwrap();
        assert_eq!(id.as_str(), "gowning-master");
    }

    #[test]
    fn test_learner_id_debug() {
        let id = LearnerId::new("2");
        assert_eq!(format!("{id:?}"), "LearnerId(2)");
    }

    #[test]
    fn test_parse_error_names_kind() {
        let err = "".parse::<BadgeId>().unwrap_err();
        assert_eq!(err.to_string(), "failed to parse BadgeId from string");
    }

    #[test]
    fn test_ids_serialize_as_plain_strings() {
        let json = serde_json::to_string(&ModuleId::new("module3")).unwrap();
        assert_eq!(json, "\"module3\"");
    }
}

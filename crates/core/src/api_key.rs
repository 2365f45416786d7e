//! The provider API key.

use crate::error::{AssistantError, Result};

/// Characters of the key that may appear in logs and status output.
const VISIBLE_PREFIX: usize = 4;

/// An opaque bearer secret, validated non-empty at construction.
///
/// `Debug` and `Display` never print the key. Use [`ApiKey::masked`] for
/// anything a human sees and [`ApiKey::expose`] only to build the
/// `Authorization` header.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Trim and validate a key. Empty or blank input is rejected.
    pub fn new(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(AssistantError::invalid("API key cannot be empty"));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Short keys are hidden completely; longer ones keep a 4-char prefix.
    pub fn masked(&self) -> String {
        if self.0.chars().count() < VISIBLE_PREFIX * 2 {
            return "***".into();
        }
        let prefix: String = self.0.chars().take(VISIBLE_PREFIX).collect();
        format!("{prefix}***")
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ApiKey").field(&"[REDACTED]").finish()
    }
}

impl std::fmt::Display for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.masked())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_keys_are_rejected() {
        for raw in ["", "   ", "\t\n"] {
            let err = ApiKey::new(raw).unwrap_err();
            assert!(matches!(err, AssistantError::InvalidArgument(_)), "{raw:?}");
        }
    }

    #[test]
    fn key_is_trimmed() {
        let key = ApiKey::new("  sk-abcdef123456  ").unwrap();
        assert_eq!(key.expose(), "sk-abcdef123456");
    }

    #[test]
    fn debug_and_display_hide_secret() {
        let key = ApiKey::new("sk-abcdef123456").unwrap();
        assert_eq!(format!("{key:?}"), "ApiKey(\"[REDACTED]\")");
        assert_eq!(key.to_string(), "sk-a***");
        assert!(!format!("{key:?}{key}").contains("123456"));
    }

    #[test]
    fn short_keys_are_fully_masked() {
        let key = ApiKey::new("abc").unwrap();
        assert_eq!(key.masked(), "***");
    }
}

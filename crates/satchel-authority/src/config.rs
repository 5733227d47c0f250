//! Authority configuration.

use serde::{Deserialize, Serialize};

/// Limits the authority applies to incoming requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthorityConfig {
    /// Upper bound on the quantity of a single add/remove/move request.
    /// Larger requests are clamped, not rejected.
    pub max_request_quantity: u32,
}

impl Default for AuthorityConfig {
    fn default() -> Self {
        Self {
            max_request_quantity: 100,
        }
    }
}

impl AuthorityConfig {
    /// Clamps a requested quantity. Zero means "nothing to do" and yields
    /// `None`.
    pub fn clamp(&self, requested: u32) -> Option<u32> {
        (requested > 0).then(|| requested.min(self.max_request_quantity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authority_config_default() {
        assert_eq!(AuthorityConfig::default().max_request_quantity, 100);
    }

    #[test]
    fn test_clamp_caps_at_maximum() {
        let config = AuthorityConfig::default();
        assert_eq!(config.clamp(5000), Some(100));
        assert_eq!(config.clamp(100), Some(100));
        assert_eq!(config.clamp(7), Some(7));
    }

    #[test]
    fn test_clamp_zero_is_none() {
        assert_eq!(AuthorityConfig::default().clamp(0), None);
    }

    #[test]
    fn test_authority_config_missing_fields_use_defaults() {
        let config: AuthorityConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, AuthorityConfig::default());
    }
}

//! Process-wide settings read once from the environment.

use std::fmt;

use crate::error::{OrchestratorError, Result};
use crate::runtime::LinkedAccount;

pub const DEFAULT_MODEL: &str = "gpt-4o-2024-08-06";
pub const DEFAULT_ACI_BASE_URL: &str = "https://api.aci.dev/v1";
pub const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:3000";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";

/// Settings shared by the gateway and the CLI. Treated as read-only after startup.
#[derive(Clone)]
pub struct Settings {
    /// Completion service key (env: OPENAI_API_KEY).
    pub openai_api_key: String,
    /// Chat model id (env: OPENAI_MODEL).
    pub openai_model: String,
    /// Optional completion endpoint override (env: OPENAI_BASE_URL).
    pub openai_base_url: Option<String>,
    /// Capability execution key (env: ACI_API_KEY).
    pub aci_api_key: String,
    /// ACI REST root (env: ACI_BASE_URL).
    pub aci_base_url: String,
    /// Credential set used for every execution (env: ACI_LINKED_ACCOUNT_OWNER_ID).
    pub linked_account: LinkedAccount,
    /// Browser origin allowed by CORS (env: PILOT_ALLOWED_ORIGIN).
    pub allowed_origin: String,
    /// Listen address for the gateway (env: PILOT_BIND_ADDR).
    pub bind_addr: String,
}

impl Settings {
    /// Load `.env` if present, then read the process environment.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| OrchestratorError::Config(format!("{key} must be set")))
        };
        let optional = |key: &str, default: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        Ok(Self {
            openai_api_key: required("OPENAI_API_KEY")?,
            openai_model: optional("OPENAI_MODEL", DEFAULT_MODEL),
            openai_base_url: lookup("OPENAI_BASE_URL").filter(|v| !v.trim().is_empty()),
            aci_api_key: required("ACI_API_KEY")?,
            aci_base_url: optional("ACI_BASE_URL", DEFAULT_ACI_BASE_URL),
            linked_account: LinkedAccount::new(required("ACI_LINKED_ACCOUNT_OWNER_ID")?),
            allowed_origin: optional("PILOT_ALLOWED_ORIGIN", DEFAULT_ALLOWED_ORIGIN),
            bind_addr: optional("PILOT_BIND_ADDR", DEFAULT_BIND_ADDR),
        })
    }
}

// Keys never reach logs.
impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("openai_api_key", &"<redacted>")
            .field("openai_model", &self.openai_model)
            .field("openai_base_url", &self.openai_base_url)
            .field("aci_api_key", &"<redacted>")
            .field("aci_base_url", &self.aci_base_url)
            .field("linked_account", &self.linked_account)
            .field("allowed_origin", &self.allowed_origin)
            .field("bind_addr", &self.bind_addr)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults_apply_when_optional_vars_missing() {
        let vars = env(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("ACI_API_KEY", "aci-test"),
            ("ACI_LINKED_ACCOUNT_OWNER_ID", "octocat"),
        ]);
        let settings = Settings::from_lookup(|k| vars.get(k).cloned()).unwrap();

        assert_eq!(settings.openai_model, DEFAULT_MODEL);
        assert_eq!(settings.aci_base_url, DEFAULT_ACI_BASE_URL);
        assert_eq!(settings.allowed_origin, DEFAULT_ALLOWED_ORIGIN);
        assert_eq!(settings.bind_addr, DEFAULT_BIND_ADDR);
        assert_eq!(settings.linked_account.as_str(), "octocat");
        assert!(settings.openai_base_url.is_none());
    }

    #[test]
    fn missing_key_is_config_error() {
        let vars = env(&[("OPENAI_API_KEY", "sk-test"), ("ACI_LINKED_ACCOUNT_OWNER_ID", "x")]);
        let err = Settings::from_lookup(|k| vars.get(k).cloned()).unwrap_err();
        assert!(matches!(err, OrchestratorError::Config(ref m) if m.contains("ACI_API_KEY")));
    }

    #[test]
    fn blank_values_count_as_missing() {
        let vars = env(&[
            ("OPENAI_API_KEY", "  "),
            ("ACI_API_KEY", "aci-test"),
            ("ACI_LINKED_ACCOUNT_OWNER_ID", "octocat"),
        ]);
        assert!(Settings::from_lookup(|k| vars.get(k).cloned()).is_err());
    }

    #[test]
    fn debug_output_redacts_keys() {
        let vars = env(&[
            ("OPENAI_API_KEY", "sk-secret"),
            ("ACI_API_KEY", "aci-secret"),
            ("ACI_LINKED_ACCOUNT_OWNER_ID", "octocat"),
        ]);
        let settings = Settings::from_lookup(|k| vars.get(k).cloned()).unwrap();
        let printed = format!("{settings:?}");
        assert!(!printed.contains("sk-secret"));
        assert!(!printed.contains("aci-secret"));
        assert!(printed.contains("<redacted>"));
    }
}

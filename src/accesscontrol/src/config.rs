//! Access control configuration
//!
//! Environment variables:
//! - `GATEKEEP_ACCESSCONTROL_ENABLED` - `1`, `true`, `yes` or `on` enables the engine (default: disabled)
//! - `GATEKEEP_ACCESSCONTROL_MISSING_PARAM` - `fail` or `empty` (default: fail)

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::scope::MissingParamPolicy;

/// Environment variable holding the enable switch
pub const ENV_ENABLED: &str = "GATEKEEP_ACCESSCONTROL_ENABLED";

/// Environment variable holding the missing-parameter policy
pub const ENV_MISSING_PARAM: &str = "GATEKEEP_ACCESSCONTROL_MISSING_PARAM";

/// Process-wide access control settings
///
/// When `enabled` is false the request gate lets every request through
/// without consulting the engine. This is fail-open.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AccessControlConfig {
    /// Enable evaluation at the request gate
    #[serde(default)]
    pub enabled: bool,

    /// How templates treat placeholders without a bound parameter
    #[serde(default)]
    pub missing_param: MissingParamPolicy,
}

impl AccessControlConfig {
    /// Enabled configuration with default template policy
    pub fn enabled() -> Self {
        Self {
            enabled: true,
            ..Self::default()
        }
    }

    /// Override the missing-parameter policy
    pub fn with_missing_param(mut self, policy: MissingParamPolicy) -> Self {
        self.missing_param = policy;
        self
    }

    /// Load configuration from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_ENABLED) {
            config.enabled = matches!(
                raw.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            );
        }

        if let Some(raw) = lookup(ENV_MISSING_PARAM) {
            match raw.trim().to_ascii_lowercase().as_str() {
                "fail" => config.missing_param = MissingParamPolicy::Fail,
                "empty" => config.missing_param = MissingParamPolicy::Empty,
                other => warn!(
                    "Ignoring unknown {} value '{}', using {:?}",
                    ENV_MISSING_PARAM, other, config.missing_param
                ),
            }
        }

        config
    }
}

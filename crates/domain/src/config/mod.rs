mod notices;
mod promotions;
mod server;
mod storage;

pub use notices::*;
pub use promotions::*;
pub use server::*;
pub use storage::*;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::notice::NoticeType;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Top-level config
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub notices: NoticesConfig,
    #[serde(default)]
    pub promotions: PromotionsConfig,
    #[serde(default)]
    pub admin: AdminConfig,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Admin
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminConfig {
    /// Admin bearer token.  Takes priority over `token_env`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Environment variable holding the admin bearer token.
    /// If neither is set, admin routes are open and every request renders
    /// in admin context only when it asks for it (dev mode).
    #[serde(default = "d_admin_token_env")]
    pub token_env: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            token: None,
            token_env: d_admin_token_env(),
        }
    }
}

fn d_admin_token_env() -> String {
    "NB_ADMIN_TOKEN".into()
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Config validation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Severity level for a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSeverity {
    Error,
    Warning,
}

/// A single configuration validation issue.
#[derive(Debug, Clone)]
pub struct ConfigError {
    pub severity: ConfigSeverity,
    pub field: String,
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            ConfigSeverity::Error => "ERROR",
            ConfigSeverity::Warning => "WARN",
        };
        write!(f, "[{tag}] {}: {}", self.field, self.message)
    }
}

impl Config {
    /// Validate the configuration and return a list of issues.
    ///
    /// Returns an empty vec when everything looks good.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if self.server.port == 0 {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "server.port".into(),
                message: "port must be greater than 0".into(),
            });
        }

        if self.server.host.is_empty() {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "server.host".into(),
                message: "host must not be empty".into(),
            });
        }

        if self.server.session_cookie.is_empty() {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "server.session_cookie".into(),
                message: "session cookie name must not be empty".into(),
            });
        }

        if self.storage.state_path.as_os_str().is_empty() {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "storage.state_path".into(),
                message: "state_path must not be empty".into(),
            });
        }

        // Notice type names end up as CSS classes; anything that would be
        // stripped on render is almost certainly a typo.
        for (i, name) in self.notices.additional_types.iter().enumerate() {
            if name.trim().is_empty() {
                errors.push(ConfigError {
                    severity: ConfigSeverity::Warning,
                    field: format!("notices.additional_types[{i}]"),
                    message: "blank notice type is ignored".into(),
                });
            } else if !is_class_safe(name) {
                errors.push(ConfigError {
                    severity: ConfigSeverity::Warning,
                    field: format!("notices.additional_types[{i}]"),
                    message: format!(
                        "notice type {name:?} contains characters that are stripped from CSS classes"
                    ),
                });
            }
        }

        let known = crate::notice::resolve_types(&self.notices.additional_types);
        let mut keys: Vec<&String> = self.notices.timeout_overrides.keys().collect();
        keys.sort();
        let mut seen: Vec<(NoticeType, &String)> = Vec::new();
        for key in keys {
            let ty = NoticesConfig::override_type(key);
            if !known.contains(&ty) {
                errors.push(ConfigError {
                    severity: ConfigSeverity::Warning,
                    field: format!("notices.timeout_overrides.{key}"),
                    message: format!("override for unregistered notice type {:?}", ty.as_str()),
                });
            }
            let first = seen.iter().find(|(t, _)| *t == ty).map(|(_, k)| *k);
            if let Some(first) = first {
                errors.push(ConfigError {
                    severity: ConfigSeverity::Warning,
                    field: format!("notices.timeout_overrides.{key}"),
                    message: format!(
                        "{first:?} already overrides {:?}; only one of the keys is used",
                        ty.as_str()
                    ),
                });
            } else {
                seen.push((ty, key));
            }
        }

        if self.server.cors.allowed_origins.len() == 1
            && self.server.cors.allowed_origins[0] == "*"
        {
            errors.push(ConfigError {
                severity: ConfigSeverity::Warning,
                field: "server.cors.allowed_origins".into(),
                message: "wildcard \"*\" allows all origins (not recommended for production)".into(),
            });
        }

        errors
    }
}

fn is_class_safe(name: &str) -> bool {
    static CLASS_SAFE: std::sync::OnceLock<regex::Regex> = std::sync::OnceLock::new();
    CLASS_SAFE
        .get_or_init(|| regex::Regex::new(r"^[A-Za-z0-9_-]+$").expect("static regex"))
        .is_match(name.trim())
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(Config::default().validate().is_empty());
    }

    #[test]
    fn zero_port_is_an_error() {
        let mut config = Config::default();
        config.server.port = 0;
        let issues = config.validate();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, ConfigSeverity::Error);
        assert_eq!(issues[0].field, "server.port");
    }

    #[test]
    fn odd_type_names_are_warned() {
        let mut config = Config::default();
        config.notices.additional_types = vec!["warning".into(), "has space".into(), " ".into()];
        let issues = config.validate();
        assert_eq!(issues.len(), 2);
        assert!(issues.iter().all(|e| e.severity == ConfigSeverity::Warning));
        assert_eq!(issues[0].field, "notices.additional_types[1]");
        assert_eq!(issues[1].field, "notices.additional_types[2]");
    }

    #[test]
    fn override_for_unknown_type_is_warned() {
        let mut config = Config::default();
        config.notices.timeout_overrides.insert("error".into(), 1000);
        config.notices.timeout_overrides.insert("timeout_bogus".into(), 1000);
        let issues = config.validate();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].field, "notices.timeout_overrides.timeout_bogus");
    }

    #[test]
    fn duplicate_override_keys_are_warned() {
        let mut config = Config::default();
        config.notices.timeout_overrides.insert("success".into(), 2000);
        config.notices.timeout_overrides.insert("timeout_success".into(), 1000);
        let issues = config.validate();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, ConfigSeverity::Warning);
        assert_eq!(issues[0].field, "notices.timeout_overrides.timeout_success");
    }

    #[test]
    fn display_includes_severity_tag() {
        let e = ConfigError {
            severity: ConfigSeverity::Warning,
            field: "a.b".into(),
            message: "oops".into(),
        };
        assert_eq!(e.to_string(), "[WARN] a.b: oops");
    }
}

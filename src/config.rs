//! Bridge configuration.
//!
//! All settings come from the process environment at startup. The rest of
//! the crate receives already-validated values and never touches env vars.

use thiserror::Error;

// ─── Defaults ────────────────────────────────────────────────────────────────

/// Vault host when `VAULT_HOST` is unset.
const DEFAULT_VAULT_HOST: &str = "127.0.0.1";

/// Vault port when `VAULT_PORT` is unset.
const DEFAULT_VAULT_PORT: u16 = 27124;

/// Inbound listen port when `BRIDGE_PORT` is unset.
const DEFAULT_BRIDGE_PORT: u16 = 3000;

// ─── Errors ──────────────────────────────────────────────────────────────────

/// Configuration loading or validation error.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable is unset or empty.
    #[error("missing required environment variable {name}")]
    MissingVar { name: &'static str },

    /// An environment variable is set to an unusable value.
    #[error("invalid value for {name}: {reason}")]
    InvalidVar { name: &'static str, reason: String },
}

// ─── Public Types ────────────────────────────────────────────────────────────

/// Scheme used to reach the vault service.
///
/// The vault typically serves HTTPS with a self-signed certificate on
/// loopback; plain HTTP is supported for setups that disable TLS entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VaultProtocol {
    Http,
    Https,
}

impl VaultProtocol {
    /// The URL scheme for this protocol.
    pub fn as_str(&self) -> &'static str {
        match self {
            VaultProtocol::Http => "http",
            VaultProtocol::Https => "https",
        }
    }
}

/// Connection settings for the vault service. Immutable after startup.
#[derive(Debug, Clone)]
pub struct VaultConnectionConfig {
    pub host: String,
    pub port: u16,
    pub protocol: VaultProtocol,
    /// Bearer credential sent on every vault request.
    pub api_key: String,
    /// Whether to verify the vault's TLS certificate. Off by default because
    /// the vault usually presents a self-signed certificate on loopback.
    pub verify_tls: bool,
}

impl VaultConnectionConfig {
    /// Base URL of the vault service, without a trailing slash.
    pub fn base_url(&self) -> String {
        format!("{}://{}:{}", self.protocol.as_str(), self.host, self.port)
    }
}

/// Top-level bridge configuration.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    pub vault: VaultConnectionConfig,
    /// Port the bridge's own HTTP server listens on.
    pub listen_port: u16,
}

impl BridgeConfig {
    /// Load configuration from the process environment.
    ///
    /// `VAULT_API_KEY` is required. `VAULT_HOST`, `VAULT_PORT`,
    /// `VAULT_PROTOCOL`, `VAULT_VERIFY_TLS`, and `BRIDGE_PORT` fall back to
    /// defaults suitable for a vault on loopback.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(|name| std::env::var(name).ok())
    }

    fn load<F>(var: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = var("VAULT_API_KEY")
            .filter(|key| !key.is_empty())
            .ok_or(ConfigError::MissingVar {
                name: "VAULT_API_KEY",
            })?;

        let host = var("VAULT_HOST")
            .filter(|host| !host.is_empty())
            .unwrap_or_else(|| DEFAULT_VAULT_HOST.to_string());

        let port = match var("VAULT_PORT") {
            Some(raw) => parse_port("VAULT_PORT", &raw)?,
            None => DEFAULT_VAULT_PORT,
        };

        let protocol = match var("VAULT_PROTOCOL").as_deref() {
            None | Some("https") => VaultProtocol::Https,
            Some("http") => VaultProtocol::Http,
            Some(other) => {
                return Err(ConfigError::InvalidVar {
                    name: "VAULT_PROTOCOL",
                    reason: format!("expected 'http' or 'https', got '{other}'"),
                })
            }
        };

        let verify_tls = match var("VAULT_VERIFY_TLS") {
            Some(raw) => parse_bool("VAULT_VERIFY_TLS", &raw)?,
            None => false,
        };

        let listen_port = match var("BRIDGE_PORT") {
            Some(raw) => parse_port("BRIDGE_PORT", &raw)?,
            None => DEFAULT_BRIDGE_PORT,
        };

        Ok(Self {
            vault: VaultConnectionConfig {
                host,
                port,
                protocol,
                api_key,
                verify_tls,
            },
            listen_port,
        })
    }
}

// ─── Parsing Helpers ─────────────────────────────────────────────────────────

fn parse_port(name: &'static str, raw: &str) -> Result<u16, ConfigError> {
    raw.parse::<u16>().map_err(|_| ConfigError::InvalidVar {
        name,
        reason: format!("expected a port number, got '{raw}'"),
    })
}

fn parse_bool(name: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidVar {
            name,
            reason: format!("expected a boolean, got '{raw}'"),
        }),
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_with(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn load(env: &HashMap<String, String>) -> Result<BridgeConfig, ConfigError> {
        BridgeConfig::load(|name| env.get(name).cloned())
    }

    #[test]
    fn test_defaults_applied() {
        let env = env_with(&[("VAULT_API_KEY", "secret")]);
        let config = load(&env).unwrap();

        assert_eq!(config.vault.host, "127.0.0.1");
        assert_eq!(config.vault.port, 27124);
        assert_eq!(config.vault.protocol, VaultProtocol::Https);
        assert_eq!(config.vault.api_key, "secret");
        assert!(!config.vault.verify_tls);
        assert_eq!(config.listen_port, 3000);
    }

    #[test]
    fn test_missing_api_key() {
        let env = env_with(&[]);
        let err = load(&env).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingVar {
                name: "VAULT_API_KEY"
            }
        ));
    }

    #[test]
    fn test_empty_api_key_is_missing() {
        let env = env_with(&[("VAULT_API_KEY", "")]);
        assert!(load(&env).is_err());
    }

    #[test]
    fn test_explicit_overrides() {
        let env = env_with(&[
            ("VAULT_API_KEY", "secret"),
            ("VAULT_HOST", "vault.local"),
            ("VAULT_PORT", "8443"),
            ("VAULT_PROTOCOL", "http"),
            ("VAULT_VERIFY_TLS", "true"),
            ("BRIDGE_PORT", "9000"),
        ]);
        let config = load(&env).unwrap();

        assert_eq!(config.vault.host, "vault.local");
        assert_eq!(config.vault.port, 8443);
        assert_eq!(config.vault.protocol, VaultProtocol::Http);
        assert!(config.vault.verify_tls);
        assert_eq!(config.listen_port, 9000);
    }

    #[test]
    fn test_invalid_port() {
        let env = env_with(&[("VAULT_API_KEY", "k"), ("VAULT_PORT", "not-a-port")]);
        let err = load(&env).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidVar { name: "VAULT_PORT", .. }));
    }

    #[test]
    fn test_invalid_protocol() {
        let env = env_with(&[("VAULT_API_KEY", "k"), ("VAULT_PROTOCOL", "ftp")]);
        assert!(load(&env).is_err());
    }

    #[test]
    fn test_bool_parsing_variants() {
        for raw in ["1", "true", "YES"] {
            assert!(parse_bool("VAULT_VERIFY_TLS", raw).unwrap());
        }
        for raw in ["0", "false", "No"] {
            assert!(!parse_bool("VAULT_VERIFY_TLS", raw).unwrap());
        }
        assert!(parse_bool("VAULT_VERIFY_TLS", "maybe").is_err());
    }

    #[test]
    fn test_base_url() {
        let env = env_with(&[("VAULT_API_KEY", "k")]);
        let config = load(&env).unwrap();
        assert_eq!(config.vault.base_url(), "https://127.0.0.1:27124");

        let env = env_with(&[
            ("VAULT_API_KEY", "k"),
            ("VAULT_PROTOCOL", "http"),
            ("VAULT_PORT", "80"),
        ]);
        let config = load(&env).unwrap();
        assert_eq!(config.vault.base_url(), "http://127.0.0.1:80");
    }
}

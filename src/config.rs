//! Configuration management for the gRPC bridge.
//!
//! This module provides configuration handling through multiple sources:
//! 1. Default configuration (embedded in binary)
//! 2. System-wide configuration file (`/etc/grpcbridge/config.toml`)
//! 3. User-specified configuration file
//! 4. Environment variables (prefixed with `GRPCBRIDGE_`, `__` between sections)
//! 5. Command-line arguments
//!
//! Configuration options are loaded in order of precedence, with later sources
//! overriding earlier ones.
//!
//! # Environment Variables
//!
//! - `GRPCBRIDGE_AUTH__ALLOW_ANONYMOUS` - Accept calls without an identity
//! - `GRPCBRIDGE_AUTH__VERIFYING_KEY` - Hex-encoded Ed25519 public key for tokens
//! - `GRPCBRIDGE_EXTRACT__RECURSION_LIMIT` - Expansions of a recursive type per path
//! - `GRPCBRIDGE_LOGGING__LEVEL` - Default log level

use crate::auth::token::DEFAULT_LEEWAY_SECS;
use crate::auth::{Authorization, Ed25519TokenVerifier};
use crate::convert::{EnumCase, EnumNaming};
use crate::error::Result;
use crate::schema::{SchemaIndex, DEFAULT_RECURSION_LIMIT};
use clap::Args;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

const SYSTEM_CONFIG: &str = "/etc/grpcbridge/config.toml";
const ENV_PREFIX: &str = "GRPCBRIDGE";

/// Command-line overrides shared by every subcommand.
#[derive(Debug, Clone, Default, Args)]
pub struct ConfigArgs {
    /// Configuration file path
    #[arg(short, long, env = "GRPCBRIDGE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Maximum expansions of a recursive message type on one path
    #[arg(long)]
    pub recursion_limit: Option<usize>,
}

/// Bridge configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BridgeConfig {
    #[serde(default)]
    pub auth: AuthConfig,
    /// Domain casing per enum
    #[serde(default)]
    pub enums: Vec<EnumRule>,
    #[serde(default)]
    pub extract: ExtractConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Authentication and authorization settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Accept calls that carry no valid token
    #[serde(default)]
    pub allow_anonymous: bool,
    /// Hex-encoded Ed25519 public key (None disables token verification)
    #[serde(default)]
    pub verifying_key: Option<String>,
    /// Clock skew tolerance in seconds
    #[serde(default = "default_leeway_secs")]
    pub leeway_secs: i64,
    /// Scopes required per route
    #[serde(default)]
    pub rules: Vec<ScopeRule>,
}

/// Scopes a route requires. Names are carried as values, not table keys,
/// because configuration keys are case-folded while routes are not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeRule {
    /// `/pkg.Service/Method`
    pub method: String,
    /// `action:resource:identifier`
    pub scopes: Vec<String>,
}

/// Domain casing of one enum, by short name (`RunQuality`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumRule {
    pub name: String,
    pub case: EnumCase,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            allow_anonymous: false,
            verifying_key: None,
            leeway_secs: default_leeway_secs(),
            rules: Vec::new(),
        }
    }
}

impl AuthConfig {
    /// Token verifier for the configured key, if any.
    pub fn verifier(&self) -> Result<Option<Ed25519TokenVerifier>> {
        self.verifying_key
            .as_deref()
            .map(|key| -> Result<Ed25519TokenVerifier> {
                Ok(Ed25519TokenVerifier::from_hex(key)?.with_leeway(self.leeway_secs))
            })
            .transpose()
    }

    pub fn authorization(&self) -> Result<Authorization> {
        Authorization::from_config(self)
    }
}

/// Converter extraction settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractConfig {
    #[serde(default = "default_recursion_limit")]
    pub recursion_limit: usize,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            recursion_limit: default_recursion_limit(),
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Extra `EnvFilter` directives, e.g. `grpcbridge::dispatch=debug`
    #[serde(default)]
    pub filter: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            filter: None,
        }
    }
}

/// Settings the schema index applies while extracting converters.
#[derive(Debug, Clone)]
pub struct SchemaSettings {
    pub enum_naming: EnumNaming,
    pub recursion_limit: usize,
}

impl SchemaSettings {
    pub fn apply<'a>(self, index: SchemaIndex<'a>) -> SchemaIndex<'a> {
        index
            .with_enum_naming(self.enum_naming)
            .with_recursion_limit(self.recursion_limit)
    }
}

impl BridgeConfig {
    /// Load configuration from all sources
    pub fn load(args: &ConfigArgs) -> Result<Self> {
        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(
                include_str!("../config/default.toml"),
                config::FileFormat::Toml,
            ))
            .add_source(config::File::with_name(SYSTEM_CONFIG).required(false));

        // Load user config if specified
        if let Some(path) = &args.config {
            builder = builder.add_source(config::File::from(path.as_path()));
        }

        // Add environment variables
        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__"),
        );

        let mut config: BridgeConfig = builder.build()?.try_deserialize()?;

        // Override with command line args
        if let Some(level) = &args.log_level {
            config.logging.level = level.clone();
        }
        if let Some(limit) = args.recursion_limit {
            config.extract.recursion_limit = limit;
        }

        Ok(config)
    }

    pub fn enum_naming(&self) -> EnumNaming {
        self.enums
            .iter()
            .map(|rule| (rule.name.clone(), rule.case))
            .collect::<HashMap<_, _>>()
            .into()
    }

    pub fn schema_settings(&self) -> SchemaSettings {
        SchemaSettings {
            enum_naming: self.enum_naming(),
            recursion_limit: self.extract.recursion_limit,
        }
    }
}

fn default_leeway_secs() -> i64 {
    DEFAULT_LEEWAY_SECS
}

fn default_recursion_limit() -> usize {
    DEFAULT_RECURSION_LIMIT
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = BridgeConfig::load(&ConfigArgs::default()).unwrap();
        assert!(!config.auth.allow_anonymous);
        assert_eq!(config.auth.leeway_secs, 60);
        assert!(config.auth.verifying_key.is_none());
        assert_eq!(config.extract.recursion_limit, DEFAULT_RECURSION_LIMIT);
        assert_eq!(config.logging.level, "info");
        assert!(config.enums.is_empty());
    }

    #[test]
    fn test_cli_overrides() {
        let args = ConfigArgs {
            config: None,
            log_level: Some("debug".into()),
            recursion_limit: Some(5),
        };
        let config = BridgeConfig::load(&args).unwrap();
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.schema_settings().recursion_limit, 5);
    }

    #[test]
    fn test_enum_naming_conversion() {
        let config = BridgeConfig {
            enums: vec![EnumRule {
                name: "RunQuality".to_string(),
                case: EnumCase::Lower,
            }],
            ..Default::default()
        };
        let naming = config.enum_naming();
        assert_eq!(naming.case_for("RunQuality"), EnumCase::Lower);
        assert_eq!(naming.case_for("Other"), EnumCase::Preserve);
    }

    #[test]
    fn test_verifier_from_config() {
        let mut auth = AuthConfig::default();
        assert!(auth.verifier().unwrap().is_none());

        auth.verifying_key = Some("zz".into());
        assert!(auth.verifier().is_err());
    }
}

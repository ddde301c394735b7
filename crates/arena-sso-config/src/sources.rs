// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sources: environment variables and TOML files.

use std::path::PathBuf;

use tracing::{debug, trace};

use crate::error::ConfigError;
use crate::layer::SsoConfigLayer;
use crate::sections::{
	AuditConfigLayer, LogFormat, LoggingConfigLayer, PasswordConfigLayer, ProvisioningConfigLayer,
};

/// Default location of the TOML configuration file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/arena/sso.toml";

/// Source precedence levels (higher = overrides lower).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
	Defaults = 10,
	ConfigFile = 20,
	Environment = 50,
}

/// Trait for configuration sources.
pub trait ConfigSource: Send + Sync {
	fn name(&self) -> &'static str;
	fn precedence(&self) -> Precedence;
	fn load(&self) -> Result<SsoConfigLayer, ConfigError>;
}

/// Built-in defaults source.
pub struct DefaultsSource;

impl ConfigSource for DefaultsSource {
	fn name(&self) -> &'static str {
		"defaults"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Defaults
	}

	fn load(&self) -> Result<SsoConfigLayer, ConfigError> {
		debug!("loading defaults");
		Ok(SsoConfigLayer::default())
	}
}

/// TOML file configuration source.
pub struct TomlSource {
	path: PathBuf,
}

impl TomlSource {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	pub fn system() -> Self {
		Self::new(SYSTEM_CONFIG_PATH)
	}
}

impl ConfigSource for TomlSource {
	fn name(&self) -> &'static str {
		"toml-config"
	}

	fn precedence(&self) -> Precedence {
		Precedence::ConfigFile
	}

	fn load(&self) -> Result<SsoConfigLayer, ConfigError> {
		if !self.path.exists() {
			debug!(path = %self.path.display(), "config file not found, skipping");
			return Ok(SsoConfigLayer::default());
		}

		debug!(path = %self.path.display(), "loading config file");
		let content = std::fs::read_to_string(&self.path).map_err(|e| ConfigError::FileRead {
			path: self.path.clone(),
			source: e,
		})?;

		let layer: SsoConfigLayer = toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
			path: self.path.clone(),
			source: e,
		})?;

		trace!("parsed config layer from TOML");
		Ok(layer)
	}
}

/// Environment variable source.
///
/// Convention: ARENA_SSO_<FIELD>
pub struct EnvSource;

impl ConfigSource for EnvSource {
	fn name(&self) -> &'static str {
		"environment"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self) -> Result<SsoConfigLayer, ConfigError> {
		debug!("loading environment variables");
		Ok(SsoConfigLayer {
			provisioning: Some(load_provisioning_from_env()?),
			password: Some(load_password_from_env()?),
			audit: Some(AuditConfigLayer {
				enabled: env_bool("ARENA_SSO_AUDIT_ENABLED")?,
			}),
			logging: Some(load_logging_from_env()?),
		})
	}
}

fn env_var(name: &str) -> Option<String> {
	std::env::var(name).ok().filter(|s| !s.is_empty())
}

fn env_bool(name: &str) -> Result<Option<bool>, ConfigError> {
	env_var(name).map(|v| parse_bool(name, &v)).transpose()
}

/// Parse `true`/`false`/`1`/`0` (case-insensitive). Anything else is an
/// error rather than `false`.
pub fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
	match value.trim().to_ascii_lowercase().as_str() {
		"true" | "1" => Ok(true),
		"false" | "0" => Ok(false),
		_ => Err(ConfigError::InvalidValue {
			key: key.to_string(),
			message: format!("expected 'true' or 'false', got '{value}'"),
		}),
	}
}

fn env_usize(name: &str) -> Result<Option<usize>, ConfigError> {
	match env_var(name) {
		Some(v) => v.parse().map(Some).map_err(|_| ConfigError::InvalidValue {
			key: name.to_string(),
			message: format!("invalid usize value '{v}'"),
		}),
		None => Ok(None),
	}
}

/// Split a comma-separated role list.
pub fn parse_role_list(value: &str) -> Vec<String> {
	value
		.split(',')
		.map(|s| s.trim().to_string())
		.filter(|s| !s.is_empty())
		.collect()
}

fn load_provisioning_from_env() -> Result<ProvisioningConfigLayer, ConfigError> {
	Ok(ProvisioningConfigLayer {
		default_roles: env_var("ARENA_SSO_DEFAULT_ROLES").map(|v| parse_role_list(&v)),
		signups_disabled: env_bool("ARENA_SSO_SIGNUPS_DISABLED")?,
		account_description: env_var("ARENA_SSO_ACCOUNT_DESCRIPTION"),
		system_principal: env_var("ARENA_SSO_SYSTEM_PRINCIPAL"),
	})
}

fn load_password_from_env() -> Result<PasswordConfigLayer, ConfigError> {
	Ok(PasswordConfigLayer {
		length: env_usize("ARENA_SSO_PASSWORD_LENGTH")?,
		require_lowercase: env_bool("ARENA_SSO_PASSWORD_REQUIRE_LOWERCASE")?,
		require_uppercase: env_bool("ARENA_SSO_PASSWORD_REQUIRE_UPPERCASE")?,
		require_digit: env_bool("ARENA_SSO_PASSWORD_REQUIRE_DIGIT")?,
		require_symbol: env_bool("ARENA_SSO_PASSWORD_REQUIRE_SYMBOL")?,
	})
}

fn load_logging_from_env() -> Result<LoggingConfigLayer, ConfigError> {
	let format = match env_var("ARENA_SSO_LOG_FORMAT") {
		Some(v) => Some(LogFormat::parse(&v).ok_or_else(|| ConfigError::InvalidValue {
			key: "ARENA_SSO_LOG_FORMAT".to_string(),
			message: format!("expected 'text' or 'json', got '{v}'"),
		})?),
		None => None,
	};

	Ok(LoggingConfigLayer {
		level: env_var("ARENA_SSO_LOG_LEVEL"),
		format,
	})
}

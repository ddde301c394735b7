// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration for Arena SSO account provisioning.
//!
//! This crate provides:
//! - Layered configuration from multiple sources (defaults, TOML file, environment)
//! - Normalisation of the default role set (never absent, blanks dropped)
//! - Validation of role names and the generated-password policy
//! - A tracing subscriber bootstrap driven by the logging section
//!
//! # Usage
//!
//! ```ignore
//! use arena_sso_config::load_config;
//!
//! let config = load_config()?;
//! println!("default roles: {:?}", config.provisioning.default_roles);
//! ```

pub mod error;
pub mod layer;
pub mod sections;
pub mod sources;
pub mod telemetry;

pub use error::ConfigError;
pub use layer::SsoConfigLayer;
pub use sections::*;
pub use sources::{
	parse_bool, parse_role_list, ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource,
	SYSTEM_CONFIG_PATH,
};
pub use telemetry::init_logging;

use tracing::{debug, info};

/// Fully resolved configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SsoConfig {
	pub provisioning: ProvisioningConfig,
	pub password: PasswordConfig,
	pub audit: AuditConfig,
	pub logging: LoggingConfig,
}

/// Load configuration from all sources with standard precedence.
///
/// Precedence (highest to lowest):
/// 1. Environment variables (`ARENA_SSO_*`)
/// 2. Config file (`/etc/arena/sso.toml`)
/// 3. Built-in defaults
pub fn load_config() -> Result<SsoConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::system()),
		Box::new(EnvSource),
	])
}

/// Load configuration from environment only (for testing or simple deployments).
pub fn load_config_from_env() -> Result<SsoConfig, ConfigError> {
	load_from_sources(vec![Box::new(DefaultsSource), Box::new(EnvSource)])
}

/// Load configuration with a custom config file path.
pub fn load_config_with_file(
	config_path: impl Into<std::path::PathBuf>,
) -> Result<SsoConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::new(config_path)),
		Box::new(EnvSource),
	])
}

/// Merge the given sources in precedence order and finalize.
pub fn load_from_sources(
	mut sources: Vec<Box<dyn ConfigSource>>,
) -> Result<SsoConfig, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = SsoConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		let layer = source.load()?;
		merged.merge(layer);
	}

	finalize(merged)
}

/// Finalize configuration layer into resolved config.
fn finalize(layer: SsoConfigLayer) -> Result<SsoConfig, ConfigError> {
	let provisioning = layer.provisioning.unwrap_or_default().finalize();
	let password = layer.password.unwrap_or_default().finalize();
	let audit = layer.audit.unwrap_or_default().finalize();
	let logging = layer.logging.unwrap_or_default().finalize();

	provisioning.validate()?;
	password.validate()?;
	logging.validate()?;

	info!(
		default_roles = provisioning.default_roles.len(),
		signups_disabled = provisioning.signups_disabled,
		system_principal = %provisioning.system_principal,
		password_length = password.length,
		audit_enabled = audit.enabled,
		"SSO provisioning configuration loaded"
	);

	Ok(SsoConfig {
		provisioning,
		password,
		audit,
		logging,
	})
}

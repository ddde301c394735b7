// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Just-in-time provisioning configuration.

use std::collections::BTreeSet;

use serde::Deserialize;

use crate::error::ConfigError;

/// Longest role name accepted from configuration.
pub const MAX_ROLE_NAME_LEN: usize = 128;

const DEFAULT_SYSTEM_PRINCIPAL: &str = "system";

/// Provisioning configuration (runtime, fully resolved).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisioningConfig {
	/// Roles granted by `resolve_by_username`. Never absent; empty means none.
	pub default_roles: BTreeSet<String>,
	/// Reject accounts that would have to be created on first login.
	pub signups_disabled: bool,
	/// Description stored on accounts created by the resolver.
	pub account_description: String,
	/// Identity that directory mutations run as.
	pub system_principal: String,
}

impl Default for ProvisioningConfig {
	fn default() -> Self {
		Self {
			default_roles: BTreeSet::new(),
			signups_disabled: false,
			account_description: String::new(),
			system_principal: DEFAULT_SYSTEM_PRINCIPAL.to_string(),
		}
	}
}

impl ProvisioningConfig {
	pub fn validate(&self) -> Result<(), ConfigError> {
		for role in &self.default_roles {
			validate_role_name(role).map_err(|message| ConfigError::InvalidValue {
				key: "provisioning.default_roles".to_string(),
				message,
			})?;
		}
		if self.system_principal.trim().is_empty() {
			return Err(ConfigError::Validation(
				"provisioning.system_principal must not be empty".to_string(),
			));
		}
		Ok(())
	}
}

/// Provisioning configuration layer (partial, for merging).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProvisioningConfigLayer {
	#[serde(default)]
	pub default_roles: Option<Vec<String>>,
	#[serde(default)]
	pub signups_disabled: Option<bool>,
	#[serde(default)]
	pub account_description: Option<String>,
	#[serde(default)]
	pub system_principal: Option<String>,
}

impl ProvisioningConfigLayer {
	pub fn merge(&mut self, other: ProvisioningConfigLayer) {
		if other.default_roles.is_some() {
			self.default_roles = other.default_roles;
		}
		if other.signups_disabled.is_some() {
			self.signups_disabled = other.signups_disabled;
		}
		if other.account_description.is_some() {
			self.account_description = other.account_description;
		}
		if other.system_principal.is_some() {
			self.system_principal = other.system_principal;
		}
	}

	pub fn finalize(self) -> ProvisioningConfig {
		ProvisioningConfig {
			default_roles: normalize_role_names(self.default_roles.unwrap_or_default()),
			signups_disabled: self.signups_disabled.unwrap_or(false),
			account_description: self.account_description.unwrap_or_default(),
			system_principal: self
				.system_principal
				.map(|p| p.trim().to_string())
				.unwrap_or_else(|| DEFAULT_SYSTEM_PRINCIPAL.to_string()),
		}
	}
}

/// Trim role names, drop blanks and collapse duplicates.
pub fn normalize_role_names<I, S>(names: I) -> BTreeSet<String>
where
	I: IntoIterator<Item = S>,
	S: AsRef<str>,
{
	names
		.into_iter()
		.map(|name| name.as_ref().trim().to_string())
		.filter(|name| !name.is_empty())
		.collect()
}

/// Check that a role name can be stored in the directory and round-trips
/// through the comma-separated environment form.
pub fn validate_role_name(name: &str) -> Result<(), String> {
	if name.is_empty() {
		return Err("role name must not be empty".to_string());
	}
	if name.len() > MAX_ROLE_NAME_LEN {
		return Err(format!(
			"role name '{name}' exceeds {MAX_ROLE_NAME_LEN} bytes"
		));
	}
	if name.chars().any(|c| c.is_control() || c == ',') {
		return Err(format!(
			"role name '{}' contains a control character or comma",
			name.escape_default()
		));
	}
	Ok(())
}

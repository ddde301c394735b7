// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core types for identity assertions and directory accounts.
//!
//! - [`TenantId`]: opaque partition key, passed through to the directory untouched
//! - [`RoleSet`]: normalised, ordered set of role names
//! - [`Identity`]: what the identity provider asserted for one login
//! - [`Account`]: what the directory returns for a username

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ProvisioningError;

/// Longest username accepted from an identity assertion.
pub const MAX_USERNAME_LEN: usize = 255;

/// Identifier of a directory partition in multi-tenant deployments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantId(String);

impl TenantId {
	pub fn new(id: impl Into<String>) -> Self {
		Self(id.into())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for TenantId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<&str> for TenantId {
	fn from(id: &str) -> Self {
		Self(id.to_string())
	}
}

impl From<String> for TenantId {
	fn from(id: String) -> Self {
		Self(id)
	}
}

/// Ordered set of role names.
///
/// Construction trims each name and drops blanks, so an empty set is the
/// only representation of "no roles".
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleSet(BTreeSet<String>);

impl RoleSet {
	pub fn new() -> Self {
		Self::default()
	}

	/// Add a role. Returns `false` if the name was blank or already present.
	pub fn insert(&mut self, role: impl AsRef<str>) -> bool {
		let role = role.as_ref().trim();
		if role.is_empty() {
			return false;
		}
		self.0.insert(role.to_string())
	}

	pub fn contains(&self, role: &str) -> bool {
		self.0.contains(role)
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = &str> {
		self.0.iter().map(String::as_str)
	}

	pub fn is_subset(&self, other: &RoleSet) -> bool {
		self.0.is_subset(&other.0)
	}

	pub fn to_vec(&self) -> Vec<String> {
		self.0.iter().cloned().collect()
	}
}

impl<S: AsRef<str>> FromIterator<S> for RoleSet {
	fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
		let mut set = RoleSet::new();
		for role in iter {
			set.insert(role);
		}
		set
	}
}

impl From<BTreeSet<String>> for RoleSet {
	fn from(roles: BTreeSet<String>) -> Self {
		roles.iter().collect()
	}
}

impl<'a> IntoIterator for &'a RoleSet {
	type Item = &'a String;
	type IntoIter = std::collections::btree_set::Iter<'a, String>;

	fn into_iter(self) -> Self::IntoIter {
		self.0.iter()
	}
}

impl fmt::Display for RoleSet {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{{")?;
		for (i, role) in self.0.iter().enumerate() {
			if i > 0 {
				write!(f, ", ")?;
			}
			write!(f, "{role}")?;
		}
		write!(f, "}}")
	}
}

/// An identity asserted by the external identity provider for one login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
	pub tenant: Option<TenantId>,
	pub username: String,
	pub roles: RoleSet,
}

impl Identity {
	/// Create a tenant-less identity.
	pub fn new(username: impl Into<String>, roles: RoleSet) -> Self {
		Self {
			tenant: None,
			username: username.into(),
			roles,
		}
	}

	pub fn with_tenant(mut self, tenant: impl Into<TenantId>) -> Self {
		self.tenant = Some(tenant.into());
		self
	}

	/// Reject usernames the directory cannot key on.
	pub fn validate(&self) -> Result<(), ProvisioningError> {
		if self.username.trim().is_empty() {
			return Err(ProvisioningError::InvalidIdentity(
				"username must not be empty".to_string(),
			));
		}
		if self.username.len() > MAX_USERNAME_LEN {
			return Err(ProvisioningError::InvalidIdentity(format!(
				"username exceeds {MAX_USERNAME_LEN} bytes"
			)));
		}
		if self.username.chars().any(char::is_control) {
			return Err(ProvisioningError::InvalidIdentity(
				"username contains control characters".to_string(),
			));
		}
		Ok(())
	}
}

/// A local account as reported by the account lookup collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
	pub username: String,
	pub tenant: Option<TenantId>,
	pub roles: RoleSet,
	pub enabled: bool,
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use thiserror::Error;

/// Entity name reported for roles in [`DirectoryError`].
pub const ROLE_ENTITY: &str = "role";
/// Entity name reported for users in [`DirectoryError`].
pub const USER_ENTITY: &str = "user";

/// Errors reported by a [`DirectoryService`](crate::DirectoryService).
#[derive(Debug, Error)]
pub enum DirectoryError {
	/// The entity was created concurrently or already existed.
	#[error("{entity} '{name}' already exists")]
	AlreadyExists { entity: &'static str, name: String },

	#[error("{entity} '{name}' not found")]
	NotFound { entity: &'static str, name: String },

	/// The mutation was attempted without a valid elevated context.
	#[error("permission denied: {0}")]
	PermissionDenied(String),

	#[error("directory backend error: {0}")]
	Backend(String),
}

impl DirectoryError {
	pub fn already_exists(entity: &'static str, name: impl Into<String>) -> Self {
		Self::AlreadyExists {
			entity,
			name: name.into(),
		}
	}

	pub fn not_found(entity: &'static str, name: impl Into<String>) -> Self {
		Self::NotFound {
			entity,
			name: name.into(),
		}
	}

	pub fn is_already_exists(&self) -> bool {
		matches!(self, Self::AlreadyExists { .. })
	}

	pub fn is_not_found(&self) -> bool {
		matches!(self, Self::NotFound { .. })
	}

	/// The user the operation targeted does not exist. A missing role is
	/// not covered.
	pub fn is_user_not_found(&self) -> bool {
		matches!(self, Self::NotFound { entity, .. } if *entity == USER_ENTITY)
	}
}

pub type DirectoryResult<T> = Result<T, DirectoryError>;

/// Errors reported by an [`AccountLookup`](crate::AccountLookup).
#[derive(Debug, Error)]
pub enum LookupError {
	#[error("account '{0}' not found")]
	NotFound(String),

	#[error("account lookup backend error: {0}")]
	Backend(String),
}

/// Errors acquiring an elevated context.
#[derive(Debug, Error)]
pub enum ElevationError {
	#[error("elevation to '{principal}' denied: {reason}")]
	Denied { principal: String, reason: String },

	#[error("elevation backend error: {0}")]
	Backend(String),
}

#[derive(Debug, Error)]
pub enum PasswordError {
	#[error("invalid password policy: {0}")]
	InvalidPolicy(String),

	#[error("password generation failed: {0}")]
	Generation(String),
}

/// Errors that abort a provisioning resolution.
#[derive(Debug, Error)]
pub enum ProvisioningError {
	#[error("invalid identity: {0}")]
	InvalidIdentity(String),

	#[error("directory {operation} failed: {source}")]
	Directory {
		operation: &'static str,
		#[source]
		source: DirectoryError,
	},

	#[error("account lookup failed: {0}")]
	Lookup(#[source] LookupError),

	#[error("privilege elevation failed: {0}")]
	Elevation(#[from] ElevationError),

	#[error("password generation failed: {0}")]
	Password(#[from] PasswordError),

	#[error("signups are disabled and account '{0}' does not exist")]
	SignupsDisabled(String),

	#[error("account '{0}' is still missing after it was provisioned")]
	AccountMissing(String),
}

impl ProvisioningError {
	pub(crate) fn directory(operation: &'static str, source: DirectoryError) -> Self {
		Self::Directory { operation, source }
	}
}

/// Lookup-style failure returned by `resolve_by_username`.
#[derive(Debug, Error)]
#[error("account '{username}' not found")]
pub struct AccountNotFound {
	pub username: String,
	#[source]
	pub cause: ProvisioningError,
}

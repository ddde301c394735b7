// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Collaborator interfaces onto the existing user/role store.

use async_trait::async_trait;

use crate::elevation::ElevatedContext;
use crate::error::{DirectoryResult, LookupError};
use crate::password::GeneratedPassword;
use crate::types::{Account, RoleSet, TenantId};

/// User and role directory.
///
/// Mutating methods take the [`ElevatedContext`] they run under. Creating an
/// entity that already exists must either succeed or fail with
/// [`DirectoryError::AlreadyExists`](crate::DirectoryError::AlreadyExists);
/// the resolver treats both as success.
#[async_trait]
pub trait DirectoryService: Send + Sync {
	async fn role_exists(&self, tenant: Option<&TenantId>, role: &str) -> DirectoryResult<bool>;

	async fn create_role(
		&self,
		ctx: &ElevatedContext,
		tenant: Option<&TenantId>,
		role: &str,
		description: &str,
		parent_roles: &[String],
	) -> DirectoryResult<()>;

	/// Replace the roles held by `username`.
	///
	/// Fails with `NotFound` when the user does not exist.
	async fn set_user_roles(
		&self,
		ctx: &ElevatedContext,
		tenant: Option<&TenantId>,
		username: &str,
		roles: &RoleSet,
	) -> DirectoryResult<()>;

	async fn create_user(
		&self,
		ctx: &ElevatedContext,
		tenant: Option<&TenantId>,
		username: &str,
		password: &GeneratedPassword,
		description: &str,
		roles: &RoleSet,
	) -> DirectoryResult<()>;
}

/// Username to account lookup.
#[async_trait]
pub trait AccountLookup: Send + Sync {
	async fn find_by_username(&self, username: &str) -> Result<Account, LookupError>;
}

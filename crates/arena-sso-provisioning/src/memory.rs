// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! In-process directory, for tests and embedders without a real user store.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::directory::{AccountLookup, DirectoryService};
use crate::elevation::{ElevatedContext, SystemElevation};
use crate::error::{DirectoryError, DirectoryResult, LookupError, ROLE_ENTITY, USER_ENTITY};
use crate::password::GeneratedPassword;
use crate::types::{Account, RoleSet, TenantId};

#[derive(Debug, Clone)]
struct RoleRecord {
	description: String,
	parent_roles: Vec<String>,
}

#[derive(Debug, Clone)]
struct UserRecord {
	tenant: Option<TenantId>,
	password: GeneratedPassword,
	description: String,
	roles: RoleSet,
	enabled: bool,
}

#[derive(Debug, Default)]
struct State {
	roles: HashMap<Option<TenantId>, BTreeMap<String, RoleRecord>>,
	users: HashMap<String, UserRecord>,
}

impl State {
	fn role_known(&self, tenant: Option<&TenantId>, role: &str) -> bool {
		self
			.roles
			.get(&tenant.cloned())
			.is_some_and(|roles| roles.contains_key(role))
	}

	fn check_roles(&self, tenant: Option<&TenantId>, roles: &RoleSet) -> DirectoryResult<()> {
		match roles.iter().find(|role| !self.role_known(tenant, role)) {
			Some(missing) => Err(DirectoryError::not_found(ROLE_ENTITY, missing)),
			None => Ok(()),
		}
	}
}

/// Directory and account lookup over in-process maps.
///
/// Roles are partitioned by tenant; users are keyed by username alone, the
/// same key [`AccountLookup::find_by_username`] uses. When built with
/// [`InMemoryDirectory::with_elevation`], mutations made with a context that
/// the given [`SystemElevation`] does not consider active are refused with
/// [`DirectoryError::PermissionDenied`].
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
	state: RwLock<State>,
	elevation: Option<Arc<SystemElevation>>,
}

impl InMemoryDirectory {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_elevation(elevation: Arc<SystemElevation>) -> Self {
		Self {
			state: RwLock::new(State::default()),
			elevation: Some(elevation),
		}
	}

	fn authorize(&self, ctx: &ElevatedContext) -> DirectoryResult<()> {
		match &self.elevation {
			Some(elevation) if !elevation.is_active(ctx) => Err(DirectoryError::PermissionDenied(
				format!("context {} is not an active elevation", ctx.id()),
			)),
			_ => Ok(()),
		}
	}

	/// Seed a role without going through elevation.
	pub async fn seed_role(&self, tenant: Option<&TenantId>, role: impl Into<String>) {
		let mut state = self.state.write().await;
		state.roles.entry(tenant.cloned()).or_default().insert(
			role.into(),
			RoleRecord {
				description: String::new(),
				parent_roles: Vec::new(),
			},
		);
	}

	/// Seed an account (and any of its roles that are missing).
	pub async fn seed_user(
		&self,
		tenant: Option<&TenantId>,
		username: impl Into<String>,
		password: GeneratedPassword,
		roles: RoleSet,
	) {
		let mut state = self.state.write().await;
		let known = state.roles.entry(tenant.cloned()).or_default();
		for role in &roles {
			known.entry(role.clone()).or_insert_with(|| RoleRecord {
				description: String::new(),
				parent_roles: Vec::new(),
			});
		}
		state.users.insert(
			username.into(),
			UserRecord {
				tenant: tenant.cloned(),
				password,
				description: String::new(),
				roles,
				enabled: true,
			},
		);
	}

	/// Mark an account disabled. Returns `false` for unknown users.
	pub async fn disable_user(&self, username: &str) -> bool {
		match self.state.write().await.users.get_mut(username) {
			Some(user) => {
				user.enabled = false;
				true
			}
			None => false,
		}
	}

	pub async fn verify_password(&self, username: &str, candidate: &str) -> bool {
		self
			.state
			.read()
			.await
			.users
			.get(username)
			.is_some_and(|user| user.password.expose() == candidate)
	}

	pub async fn user_roles(&self, username: &str) -> Option<RoleSet> {
		self
			.state
			.read()
			.await
			.users
			.get(username)
			.map(|user| user.roles.clone())
	}

	pub async fn user_description(&self, username: &str) -> Option<String> {
		self
			.state
			.read()
			.await
			.users
			.get(username)
			.map(|user| user.description.clone())
	}

	/// Role names known in a tenant, sorted.
	pub async fn role_names(&self, tenant: Option<&TenantId>) -> Vec<String> {
		self
			.state
			.read()
			.await
			.roles
			.get(&tenant.cloned())
			.map(|roles| roles.keys().cloned().collect())
			.unwrap_or_default()
	}

	/// Description and parents a role was created with.
	pub async fn role_definition(
		&self,
		tenant: Option<&TenantId>,
		role: &str,
	) -> Option<(String, Vec<String>)> {
		self
			.state
			.read()
			.await
			.roles
			.get(&tenant.cloned())
			.and_then(|roles| roles.get(role))
			.map(|record| (record.description.clone(), record.parent_roles.clone()))
	}

	pub async fn user_count(&self) -> usize {
		self.state.read().await.users.len()
	}
}

#[async_trait]
impl DirectoryService for InMemoryDirectory {
	async fn role_exists(&self, tenant: Option<&TenantId>, role: &str) -> DirectoryResult<bool> {
		Ok(self.state.read().await.role_known(tenant, role))
	}

	async fn create_role(
		&self,
		ctx: &ElevatedContext,
		tenant: Option<&TenantId>,
		role: &str,
		description: &str,
		parent_roles: &[String],
	) -> DirectoryResult<()> {
		self.authorize(ctx)?;
		let mut state = self.state.write().await;
		if let Some(parent) = parent_roles
			.iter()
			.find(|parent| !state.role_known(tenant, parent))
		{
			return Err(DirectoryError::not_found(ROLE_ENTITY, parent.as_str()));
		}
		let roles = state.roles.entry(tenant.cloned()).or_default();
		if roles.contains_key(role) {
			return Err(DirectoryError::already_exists(ROLE_ENTITY, role));
		}
		roles.insert(
			role.to_string(),
			RoleRecord {
				description: description.to_string(),
				parent_roles: parent_roles.to_vec(),
			},
		);
		tracing::debug!(role = %role, tenant = ?tenant, principal = %ctx.principal(), "role stored");
		Ok(())
	}

	async fn set_user_roles(
		&self,
		ctx: &ElevatedContext,
		tenant: Option<&TenantId>,
		username: &str,
		roles: &RoleSet,
	) -> DirectoryResult<()> {
		self.authorize(ctx)?;
		let mut state = self.state.write().await;
		if !state.users.contains_key(username) {
			return Err(DirectoryError::not_found(USER_ENTITY, username));
		}
		state.check_roles(tenant, roles)?;
		if let Some(user) = state.users.get_mut(username) {
			user.roles = roles.clone();
		}
		Ok(())
	}

	async fn create_user(
		&self,
		ctx: &ElevatedContext,
		tenant: Option<&TenantId>,
		username: &str,
		password: &GeneratedPassword,
		description: &str,
		roles: &RoleSet,
	) -> DirectoryResult<()> {
		self.authorize(ctx)?;
		let mut state = self.state.write().await;
		if state.users.contains_key(username) {
			return Err(DirectoryError::already_exists(USER_ENTITY, username));
		}
		state.check_roles(tenant, roles)?;
		state.users.insert(
			username.to_string(),
			UserRecord {
				tenant: tenant.cloned(),
				password: password.clone(),
				description: description.to_string(),
				roles: roles.clone(),
				enabled: true,
			},
		);
		tracing::debug!(username = %username, tenant = ?tenant, principal = %ctx.principal(), "user stored");
		Ok(())
	}
}

#[async_trait]
impl AccountLookup for InMemoryDirectory {
	async fn find_by_username(&self, username: &str) -> Result<Account, LookupError> {
		let state = self.state.read().await;
		let user = state
			.users
			.get(username)
			.ok_or_else(|| LookupError::NotFound(username.to_string()))?;
		Ok(Account {
			username: username.to_string(),
			tenant: user.tenant.clone(),
			roles: user.roles.clone(),
			enabled: user.enabled,
		})
	}
}

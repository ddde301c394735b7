// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::sync::Arc;

use arena_sso_config::{ProvisioningConfig, SsoConfig};

use crate::audit::{
	AuditSink, ProvisioningEvent, ProvisioningEventBuilder, ProvisioningEventType, TracingAuditSink,
};
use crate::directory::{AccountLookup, DirectoryService};
use crate::elevation::{run_elevated, PrivilegeElevation, SystemElevation};
use crate::error::{AccountNotFound, LookupError, PasswordError, ProvisioningError};
use crate::password::{PasswordGenerator, PasswordPolicy, PolicyPasswordGenerator};
use crate::types::{Account, Identity, RoleSet, TenantId};

/// Result type for provisioning operations.
pub type Result<T> = std::result::Result<T, ProvisioningError>;

/// Resolves SSO identities to local accounts, creating roles and accounts on
/// first login.
///
/// Every login goes through the same path: make sure each asserted role
/// exists, replace the account's roles with the asserted set, then look the
/// account up, creating it when the lookup misses. Repeating a resolution
/// leaves the directory unchanged, and concurrent resolutions of the same
/// identity are absorbed by treating `AlreadyExists` as success.
#[derive(Clone)]
pub struct ProvisioningResolver {
	directory: Arc<dyn DirectoryService>,
	accounts: Arc<dyn AccountLookup>,
	elevation: Arc<dyn PrivilegeElevation>,
	passwords: Arc<dyn PasswordGenerator>,
	audit: Option<Arc<dyn AuditSink>>,
	default_roles: RoleSet,
	signups_disabled: bool,
	account_description: String,
}

impl ProvisioningResolver {
	pub fn new(
		directory: Arc<dyn DirectoryService>,
		accounts: Arc<dyn AccountLookup>,
		elevation: Arc<dyn PrivilegeElevation>,
		passwords: Arc<dyn PasswordGenerator>,
		config: &ProvisioningConfig,
	) -> Self {
		Self {
			directory,
			accounts,
			elevation,
			passwords,
			audit: None,
			default_roles: RoleSet::from(config.default_roles.clone()),
			signups_disabled: config.signups_disabled,
			account_description: config.account_description.clone(),
		}
	}

	/// Wire a resolver over one store that is both directory and account
	/// lookup, using the built-in elevation, password generator and (when
	/// enabled) tracing audit sink.
	pub fn from_config<D>(config: &SsoConfig, store: Arc<D>) -> std::result::Result<Self, PasswordError>
	where
		D: DirectoryService + AccountLookup + 'static,
	{
		let passwords = PolicyPasswordGenerator::new(PasswordPolicy::from(&config.password))?;
		let elevation = SystemElevation::new(config.provisioning.system_principal.clone());
		let resolver = Self::new(
			store.clone(),
			store,
			Arc::new(elevation),
			Arc::new(passwords),
			&config.provisioning,
		);
		Ok(if config.audit.enabled {
			resolver.with_audit_sink(Arc::new(TracingAuditSink::new()))
		} else {
			resolver
		})
	}

	pub fn with_audit_sink(mut self, sink: Arc<dyn AuditSink>) -> Self {
		self.audit = Some(sink);
		self
	}

	/// Roles granted by [`resolve_by_username`](Self::resolve_by_username).
	pub fn default_roles(&self) -> &RoleSet {
		&self.default_roles
	}

	pub fn signups_disabled(&self) -> bool {
		self.signups_disabled
	}

	/// Resolve an asserted identity to its local account.
	///
	/// - Creates every asserted role that does not exist yet
	/// - Replaces the account's roles with the asserted set
	/// - Creates the account with a generated password if the lookup misses
	///
	/// Returns `SignupsDisabled` if the account would have to be created while
	/// signups are disabled.
	#[tracing::instrument(
		skip(self, identity),
		fields(username = %identity.username, tenant = ?identity.tenant, roles = %identity.roles)
	)]
	pub async fn resolve(&self, identity: &Identity) -> Result<Account> {
		match self.provision(identity).await {
			Ok(account) => Ok(account),
			Err(e) => {
				if !matches!(e, ProvisioningError::SignupsDisabled(_)) {
					tracing::error!(error = %e, username = %identity.username, "provisioning failed");
				}
				self
					.record(
						ProvisioningEvent::builder(
							ProvisioningEventType::ProvisioningFailed,
							identity.username.as_str(),
						)
						.tenant(identity.tenant.as_ref())
						.details(serde_json::json!({
							"error": e.to_string(),
							"roles": identity.roles,
						})),
					)
					.await;
				Err(e)
			}
		}
	}

	/// Resolve a tenant-less identity.
	pub async fn resolve_user(&self, username: &str, roles: RoleSet) -> Result<Account> {
		self.resolve(&Identity::new(username, roles)).await
	}

	/// Resolve a username with the configured default roles.
	///
	/// Any provisioning failure is reported as [`AccountNotFound`] with the
	/// underlying error as its source.
	#[tracing::instrument(skip(self))]
	pub async fn resolve_by_username(
		&self,
		username: &str,
	) -> std::result::Result<Account, AccountNotFound> {
		let identity = Identity::new(username, self.default_roles.clone());
		self
			.resolve(&identity)
			.await
			.map_err(|cause| AccountNotFound {
				username: username.to_string(),
				cause,
			})
	}

	async fn provision(&self, identity: &Identity) -> Result<Account> {
		identity.validate()?;
		let tenant = identity.tenant.as_ref();
		let username = identity.username.as_str();

		for role in &identity.roles {
			self.ensure_role(tenant, username, role).await?;
		}

		let assigned = self.assign_roles(tenant, username, &identity.roles).await?;

		match self.accounts.find_by_username(username).await {
			Ok(account) if assigned => {
				tracing::debug!(username = %username, "account already provisioned");
				Ok(account)
			}
			Ok(_) => {
				tracing::debug!(username = %username, "account appeared after role assignment was skipped");
				self.reassign_roles(identity).await
			}
			Err(LookupError::NotFound(_)) => self.create_account(identity).await,
			Err(e) => Err(ProvisioningError::Lookup(e)),
		}
	}

	/// Create `role` if the directory does not know it yet.
	async fn ensure_role(&self, tenant: Option<&TenantId>, username: &str, role: &str) -> Result<()> {
		let exists = self
			.directory
			.role_exists(tenant, role)
			.await
			.map_err(|e| ProvisioningError::directory("role_exists", e))?;
		if exists {
			tracing::debug!(role = %role, tenant = ?tenant, "role already exists");
			return Ok(());
		}

		let directory = &self.directory;
		let outcome = run_elevated(self.elevation.as_ref(), |ctx| async move {
			let created = directory.create_role(&ctx, tenant, role, "", &[]).await;
			created.map(|()| ctx)
		})
		.await?;

		match outcome {
			Ok(ctx) => {
				tracing::info!(role = %role, tenant = ?tenant, "created role");
				self
					.record(
						ProvisioningEvent::builder(ProvisioningEventType::RoleCreated, username)
							.tenant(tenant)
							.role(role)
							.principal(ctx.principal()),
					)
					.await;
				Ok(())
			}
			Err(e) if e.is_already_exists() => {
				tracing::debug!(role = %role, tenant = ?tenant, "role created concurrently");
				Ok(())
			}
			Err(e) => Err(ProvisioningError::directory("create_role", e)),
		}
	}

	/// Replace the account's roles. Returns `false` when the user does not
	/// exist yet, leaving it for the lookup to provision; any other failure,
	/// including a missing role, aborts.
	async fn assign_roles(&self, tenant: Option<&TenantId>, username: &str, roles: &RoleSet) -> Result<bool> {
		let directory = &self.directory;
		let outcome = run_elevated(self.elevation.as_ref(), |ctx| async move {
			directory.set_user_roles(&ctx, tenant, username, roles).await
		})
		.await?;

		match outcome {
			Ok(()) => {
				tracing::debug!(username = %username, roles = %roles, "assigned roles");
				Ok(true)
			}
			Err(e) if e.is_user_not_found() => {
				tracing::debug!(username = %username, error = %e, "role assignment skipped");
				Ok(false)
			}
			Err(e) => Err(ProvisioningError::directory("set_user_roles", e)),
		}
	}

	/// Assign the asserted roles to an account another caller created, then
	/// return the account as stored.
	async fn reassign_roles(&self, identity: &Identity) -> Result<Account> {
		let username = identity.username.as_str();
		if !self
			.assign_roles(identity.tenant.as_ref(), username, &identity.roles)
			.await?
		{
			return Err(ProvisioningError::AccountMissing(username.to_string()));
		}

		match self.accounts.find_by_username(username).await {
			Ok(account) => Ok(account),
			Err(LookupError::NotFound(_)) => Err(ProvisioningError::AccountMissing(username.to_string())),
			Err(e) => Err(ProvisioningError::Lookup(e)),
		}
	}

	async fn create_account(&self, identity: &Identity) -> Result<Account> {
		let tenant = identity.tenant.as_ref();
		let username = identity.username.as_str();

		if self.signups_disabled {
			tracing::warn!(username = %username, tenant = ?tenant, "Signup rejected: signups are disabled");
			return Err(ProvisioningError::SignupsDisabled(username.to_string()));
		}

		let password = self.passwords.generate()?;
		let directory = &self.directory;
		let description = self.account_description.as_str();
		let roles = &identity.roles;
		let outcome = run_elevated(self.elevation.as_ref(), |ctx| async move {
			let created = directory
				.create_user(&ctx, tenant, username, &password, description, roles)
				.await;
			created.map(|()| ctx)
		})
		.await?;

		match outcome {
			Ok(ctx) => {
				tracing::info!(username = %username, tenant = ?tenant, roles = %roles, "created account");
				self
					.record(
						ProvisioningEvent::builder(ProvisioningEventType::AccountCreated, username)
							.tenant(tenant)
							.principal(ctx.principal())
							.details(serde_json::json!({ "roles": roles })),
					)
					.await;
			}
			Err(e) if e.is_already_exists() => {
				tracing::debug!(username = %username, "account created concurrently");
				return self.reassign_roles(identity).await;
			}
			Err(e) => return Err(ProvisioningError::directory("create_user", e)),
		}

		match self.accounts.find_by_username(username).await {
			Ok(account) => Ok(account),
			Err(LookupError::NotFound(_)) => Err(ProvisioningError::AccountMissing(username.to_string())),
			Err(e) => Err(ProvisioningError::Lookup(e)),
		}
	}

	async fn record(&self, event: ProvisioningEventBuilder) {
		let Some(sink) = &self.audit else {
			return;
		};
		if let Err(e) = sink.publish(Arc::new(event.build())).await {
			tracing::warn!(sink = sink.name(), error = %e, "failed to publish audit event");
		}
	}
}

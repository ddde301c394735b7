// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use arena_sso_config::ProvisioningConfig;
use arena_sso_provisioning::{
	Account, AccountLookup, AuditSink, AuditSinkError, DirectoryError, DirectoryResult,
	DirectoryService, ElevatedContext, GeneratedPassword, InMemoryDirectory, LookupError,
	PasswordPolicy, PolicyPasswordGenerator, ProvisioningEvent, ProvisioningEventType,
	ProvisioningResolver, RoleSet, SystemElevation, TenantId, ROLE_ENTITY, USER_ENTITY,
};
use async_trait::async_trait;

pub fn roles(names: &[&str]) -> RoleSet {
	names.iter().collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
	RoleExists,
	CreateRole,
	SetUserRoles,
	CreateUser,
	FindByUsername,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
	RoleExists(String),
	CreateRole(String),
	SetUserRoles(String, RoleSet),
	CreateUser(String, RoleSet),
	FindByUsername(String),
}

impl Call {
	pub fn is_mutation(&self) -> bool {
		matches!(
			self,
			Call::CreateRole(_) | Call::SetUserRoles(..) | Call::CreateUser(..)
		)
	}
}

/// Error to return instead of delegating an operation.
#[derive(Debug, Clone, Copy)]
pub enum Fault {
	Backend,
	PermissionDenied,
	AlreadyExists,
	/// Another caller creates the entity first: delegate, then report
	/// `AlreadyExists`.
	LostRace,
	UserNotFound,
	RoleNotFound,
}

impl Fault {
	fn directory_error(self, entity: &'static str, name: &str) -> DirectoryError {
		match self {
			Fault::Backend => DirectoryError::Backend("injected failure".to_string()),
			Fault::PermissionDenied => DirectoryError::PermissionDenied("injected".to_string()),
			Fault::AlreadyExists | Fault::LostRace => DirectoryError::already_exists(entity, name),
			Fault::UserNotFound => DirectoryError::not_found(USER_ENTITY, name),
			Fault::RoleNotFound => DirectoryError::not_found(ROLE_ENTITY, name),
		}
	}

	fn lookup_error(self, name: &str) -> LookupError {
		match self {
			Fault::UserNotFound => LookupError::NotFound(name.to_string()),
			_ => LookupError::Backend("injected failure".to_string()),
		}
	}
}

#[derive(Debug, Clone, Copy)]
struct Injected {
	fault: Fault,
	/// Remaining calls to fail; `None` fails every call.
	remaining: Option<usize>,
}

/// In-memory directory that records every call, checks each mutation runs
/// under an active elevated context, and can fail operations on demand.
pub struct RecordingDirectory {
	inner: InMemoryDirectory,
	elevation: Arc<SystemElevation>,
	calls: Mutex<Vec<Call>>,
	faults: Mutex<HashMap<Op, Injected>>,
	unelevated_mutations: AtomicUsize,
	passwords: Mutex<Vec<String>>,
}

impl RecordingDirectory {
	pub fn new(elevation: Arc<SystemElevation>) -> Self {
		Self {
			inner: InMemoryDirectory::with_elevation(Arc::clone(&elevation)),
			elevation,
			calls: Mutex::new(Vec::new()),
			faults: Mutex::new(HashMap::new()),
			unelevated_mutations: AtomicUsize::new(0),
			passwords: Mutex::new(Vec::new()),
		}
	}

	pub fn inner(&self) -> &InMemoryDirectory {
		&self.inner
	}

	/// Fail every call to `op`.
	pub fn inject(&self, op: Op, fault: Fault) {
		self.faults.lock().unwrap().insert(
			op,
			Injected {
				fault,
				remaining: None,
			},
		);
	}

	/// Fail the next `times` calls to `op`, then delegate again.
	pub fn inject_times(&self, op: Op, fault: Fault, times: usize) {
		self.faults.lock().unwrap().insert(
			op,
			Injected {
				fault,
				remaining: Some(times),
			},
		);
	}

	pub fn calls(&self) -> Vec<Call> {
		self.calls.lock().unwrap().clone()
	}

	pub fn clear_calls(&self) {
		self.calls.lock().unwrap().clear();
	}

	pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
		self.calls.lock().unwrap().iter().filter(|c| pred(c)).count()
	}

	pub fn unelevated_mutations(&self) -> usize {
		self.unelevated_mutations.load(Ordering::SeqCst)
	}

	/// Passwords handed to `create_user`, in call order.
	pub fn passwords(&self) -> Vec<String> {
		self.passwords.lock().unwrap().clone()
	}

	fn record(&self, call: Call) {
		self.calls.lock().unwrap().push(call);
	}

	fn check_elevated(&self, ctx: &ElevatedContext) {
		if !self.elevation.is_active(ctx) {
			self.unelevated_mutations.fetch_add(1, Ordering::SeqCst);
		}
	}

	fn fault(&self, op: Op) -> Option<Fault> {
		let mut faults = self.faults.lock().unwrap();
		let injected = faults.get_mut(&op)?;
		match injected.remaining {
			None => Some(injected.fault),
			Some(0) => None,
			Some(n) => {
				injected.remaining = Some(n - 1);
				Some(injected.fault)
			}
		}
	}
}

#[async_trait]
impl DirectoryService for RecordingDirectory {
	async fn role_exists(&self, tenant: Option<&TenantId>, role: &str) -> DirectoryResult<bool> {
		self.record(Call::RoleExists(role.to_string()));
		if let Some(fault) = self.fault(Op::RoleExists) {
			return Err(fault.directory_error(ROLE_ENTITY, role));
		}
		self.inner.role_exists(tenant, role).await
	}

	async fn create_role(
		&self,
		ctx: &ElevatedContext,
		tenant: Option<&TenantId>,
		role: &str,
		description: &str,
		parent_roles: &[String],
	) -> DirectoryResult<()> {
		self.record(Call::CreateRole(role.to_string()));
		self.check_elevated(ctx);
		if let Some(fault) = self.fault(Op::CreateRole) {
			if matches!(fault, Fault::LostRace) {
				let _ = self
					.inner
					.create_role(ctx, tenant, role, description, parent_roles)
					.await;
			}
			return Err(fault.directory_error(ROLE_ENTITY, role));
		}
		self
			.inner
			.create_role(ctx, tenant, role, description, parent_roles)
			.await
	}

	async fn set_user_roles(
		&self,
		ctx: &ElevatedContext,
		tenant: Option<&TenantId>,
		username: &str,
		roles: &RoleSet,
	) -> DirectoryResult<()> {
		self.record(Call::SetUserRoles(username.to_string(), roles.clone()));
		self.check_elevated(ctx);
		if let Some(fault) = self.fault(Op::SetUserRoles) {
			let name = match fault {
				Fault::RoleNotFound => roles.iter().next().unwrap_or_default(),
				_ => username,
			};
			return Err(fault.directory_error(USER_ENTITY, name));
		}
		self.inner.set_user_roles(ctx, tenant, username, roles).await
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
		self.record(Call::CreateUser(username.to_string(), roles.clone()));
		self.check_elevated(ctx);
		self
			.passwords
			.lock()
			.unwrap()
			.push(password.expose().to_string());
		if let Some(fault) = self.fault(Op::CreateUser) {
			if matches!(fault, Fault::LostRace) {
				let _ = self
					.inner
					.create_user(ctx, tenant, username, password, description, roles)
					.await;
			}
			return Err(fault.directory_error(USER_ENTITY, username));
		}
		self
			.inner
			.create_user(ctx, tenant, username, password, description, roles)
			.await
	}
}

#[async_trait]
impl AccountLookup for RecordingDirectory {
	async fn find_by_username(&self, username: &str) -> Result<Account, LookupError> {
		self.record(Call::FindByUsername(username.to_string()));
		if let Some(fault) = self.fault(Op::FindByUsername) {
			return Err(fault.lookup_error(username));
		}
		self.inner.find_by_username(username).await
	}
}

#[derive(Default)]
pub struct RecordingAuditSink {
	events: Mutex<Vec<ProvisioningEvent>>,
}

impl RecordingAuditSink {
	pub fn events(&self) -> Vec<ProvisioningEvent> {
		self.events.lock().unwrap().clone()
	}

	pub fn count(&self, event_type: ProvisioningEventType) -> usize {
		self
			.events
			.lock()
			.unwrap()
			.iter()
			.filter(|e| e.event_type == event_type)
			.count()
	}
}

#[async_trait]
impl AuditSink for RecordingAuditSink {
	fn name(&self) -> &str {
		"recording"
	}

	async fn publish(&self, event: Arc<ProvisioningEvent>) -> Result<(), AuditSinkError> {
		self.events.lock().unwrap().push((*event).clone());
		Ok(())
	}
}

pub struct FailingAuditSink;

#[async_trait]
impl AuditSink for FailingAuditSink {
	fn name(&self) -> &str {
		"failing"
	}

	async fn publish(&self, _event: Arc<ProvisioningEvent>) -> Result<(), AuditSinkError> {
		Err(AuditSinkError {
			sink: "failing".to_string(),
			message: "unavailable".to_string(),
		})
	}
}

/// A resolver wired to a recording directory, system elevation and a
/// recording audit sink.
pub struct Harness {
	pub resolver: ProvisioningResolver,
	pub directory: Arc<RecordingDirectory>,
	pub elevation: Arc<SystemElevation>,
	pub audit: Arc<RecordingAuditSink>,
}

impl Harness {
	pub fn new() -> Self {
		Self::with_config(ProvisioningConfig::default())
	}

	pub fn with_config(config: ProvisioningConfig) -> Self {
		let elevation = Arc::new(SystemElevation::new(config.system_principal.clone()));
		let directory = Arc::new(RecordingDirectory::new(Arc::clone(&elevation)));
		let audit = Arc::new(RecordingAuditSink::default());
		let passwords = PolicyPasswordGenerator::new(PasswordPolicy::default()).unwrap();
		let resolver = ProvisioningResolver::new(
			directory.clone(),
			directory.clone(),
			elevation.clone(),
			Arc::new(passwords),
			&config,
		)
		.with_audit_sink(audit.clone());
		Self {
			resolver,
			directory,
			elevation,
			audit,
		}
	}

	/// Snapshot of the observable directory state for the given users.
	pub async fn snapshot(&self, users: &[&str]) -> (Vec<String>, Vec<Option<RoleSet>>, usize) {
		let inner = self.directory.inner();
		let mut user_roles = Vec::new();
		for user in users {
			user_roles.push(inner.user_roles(user).await);
		}
		(inner.role_names(None).await, user_roles, inner.user_count().await)
	}
}

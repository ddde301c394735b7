// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Just-in-time account and role provisioning for SSO logins.
//!
//! After an external identity provider authenticates a user, the
//! [`ProvisioningResolver`] makes sure the local directory holds every role
//! the provider asserted, replaces the account's roles with that set, and
//! creates the account with a generated password if it does not exist yet.
//!
//! Directory mutations run under a short-lived [`ElevatedContext`], since the
//! user being provisioned has no rights of their own yet.
//!
//! # Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use arena_sso_provisioning::{InMemoryDirectory, ProvisioningResolver, RoleSet};
//!
//! let config = arena_sso_config::load_config()?;
//! let resolver = ProvisioningResolver::from_config(&config, Arc::new(InMemoryDirectory::new()))?;
//! let account = resolver
//! 	.resolve_user("alice", ["analyst"].into_iter().collect::<RoleSet>())
//! 	.await?;
//! ```

pub mod audit;
pub mod directory;
pub mod elevation;
pub mod error;
pub mod memory;
pub mod password;
pub mod resolver;
pub mod types;

pub use audit::{
	AuditSeverity, AuditSink, AuditSinkError, ProvisioningEvent, ProvisioningEventBuilder,
	ProvisioningEventType, TracingAuditSink,
};
pub use directory::{AccountLookup, DirectoryService};
pub use elevation::{run_elevated, ElevatedContext, PrivilegeElevation, SystemElevation};
pub use error::{
	AccountNotFound, DirectoryError, DirectoryResult, ElevationError, LookupError, PasswordError,
	ProvisioningError, ROLE_ENTITY, USER_ENTITY,
};
pub use memory::InMemoryDirectory;
pub use password::{GeneratedPassword, PasswordGenerator, PasswordPolicy, PolicyPasswordGenerator};
pub use resolver::ProvisioningResolver;
pub use types::{Account, Identity, RoleSet, TenantId, MAX_USERNAME_LEN};

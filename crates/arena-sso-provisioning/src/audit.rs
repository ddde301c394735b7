// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Audit records for directory changes made during provisioning.
//!
//! - [`ProvisioningEventType`]: what happened
//! - [`ProvisioningEvent`]: a complete record, built with [`ProvisioningEventBuilder`]
//! - [`AuditSink`]: destination for records; [`TracingAuditSink`] writes them
//!   to the `arena_audit` tracing target

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::TenantId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProvisioningEventType {
	RoleCreated,
	AccountCreated,
	ProvisioningFailed,
}

impl ProvisioningEventType {
	pub fn default_severity(&self) -> AuditSeverity {
		match self {
			Self::RoleCreated | Self::AccountCreated => AuditSeverity::Notice,
			Self::ProvisioningFailed => AuditSeverity::Warning,
		}
	}
}

impl fmt::Display for ProvisioningEventType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let s = match self {
			Self::RoleCreated => "role_created",
			Self::AccountCreated => "account_created",
			Self::ProvisioningFailed => "provisioning_failed",
		};
		write!(f, "{s}")
	}
}

/// RFC 5424 severities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditSeverity {
	Info = 6,
	Notice = 5,
	Warning = 4,
}

impl fmt::Display for AuditSeverity {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let s = match self {
			Self::Info => "info",
			Self::Notice => "notice",
			Self::Warning => "warning",
		};
		write!(f, "{s}")
	}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvisioningEvent {
	pub id: Uuid,
	pub timestamp: DateTime<Utc>,
	pub event_type: ProvisioningEventType,
	pub severity: AuditSeverity,
	pub tenant: Option<TenantId>,
	/// Account the event concerns.
	pub username: String,
	/// Role created, for `RoleCreated`.
	pub role: Option<String>,
	/// Principal the directory change ran as.
	pub principal: Option<String>,
	pub details: serde_json::Value,
}

impl ProvisioningEvent {
	pub fn builder(
		event_type: ProvisioningEventType,
		username: impl Into<String>,
	) -> ProvisioningEventBuilder {
		ProvisioningEventBuilder::new(event_type, username)
	}
}

#[derive(Debug, Clone)]
pub struct ProvisioningEventBuilder {
	event_type: ProvisioningEventType,
	severity: Option<AuditSeverity>,
	tenant: Option<TenantId>,
	username: String,
	role: Option<String>,
	principal: Option<String>,
	details: serde_json::Value,
}

impl ProvisioningEventBuilder {
	pub fn new(event_type: ProvisioningEventType, username: impl Into<String>) -> Self {
		Self {
			event_type,
			severity: None,
			tenant: None,
			username: username.into(),
			role: None,
			principal: None,
			details: serde_json::Value::Null,
		}
	}

	/// Defaults to the event type's severity.
	pub fn severity(mut self, severity: AuditSeverity) -> Self {
		self.severity = Some(severity);
		self
	}

	pub fn tenant(mut self, tenant: Option<&TenantId>) -> Self {
		self.tenant = tenant.cloned();
		self
	}

	pub fn role(mut self, role: impl Into<String>) -> Self {
		self.role = Some(role.into());
		self
	}

	pub fn principal(mut self, principal: impl Into<String>) -> Self {
		self.principal = Some(principal.into());
		self
	}

	pub fn details(mut self, details: serde_json::Value) -> Self {
		self.details = details;
		self
	}

	pub fn build(self) -> ProvisioningEvent {
		ProvisioningEvent {
			id: Uuid::new_v4(),
			timestamp: Utc::now(),
			event_type: self.event_type,
			severity: self
				.severity
				.unwrap_or_else(|| self.event_type.default_severity()),
			tenant: self.tenant,
			username: self.username,
			role: self.role,
			principal: self.principal,
			details: self.details,
		}
	}
}

#[derive(Debug, thiserror::Error)]
#[error("audit sink '{sink}' failed: {message}")]
pub struct AuditSinkError {
	pub sink: String,
	pub message: String,
}

#[async_trait]
pub trait AuditSink: Send + Sync {
	/// Unique name for this sink (used in logs).
	fn name(&self) -> &str;

	async fn publish(&self, event: Arc<ProvisioningEvent>) -> Result<(), AuditSinkError>;
}

/// Writes audit events as structured tracing events on target `arena_audit`.
#[derive(Debug, Default)]
pub struct TracingAuditSink;

impl TracingAuditSink {
	pub fn new() -> Self {
		Self
	}
}

#[async_trait]
impl AuditSink for TracingAuditSink {
	fn name(&self) -> &str {
		"tracing"
	}

	async fn publish(&self, event: Arc<ProvisioningEvent>) -> Result<(), AuditSinkError> {
		let event_type = event.event_type.to_string();
		let severity = event.severity.to_string();
		let id = event.id.to_string();
		let timestamp = event.timestamp.to_rfc3339();
		let tenant = event.tenant.as_ref().map(TenantId::as_str);
		let username = event.username.as_str();
		let role = event.role.as_deref();
		let principal = event.principal.as_deref();
		let details = if event.details.is_null() {
			None
		} else {
			Some(event.details.to_string())
		};

		match event.severity {
			AuditSeverity::Info | AuditSeverity::Notice => tracing::info!(
				target: "arena_audit",
				event_type,
				severity,
				id,
				timestamp,
				tenant,
				username,
				role,
				principal,
				details,
				"audit event"
			),
			AuditSeverity::Warning => tracing::warn!(
				target: "arena_audit",
				event_type,
				severity,
				id,
				timestamp,
				tenant,
				username,
				role,
				principal,
				details,
				"audit event"
			),
		}
		Ok(())
	}
}

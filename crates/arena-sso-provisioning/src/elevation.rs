// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Scoped privilege elevation for directory mutations.
//!
//! A freshly authenticated user cannot provision themselves, so every
//! mutating directory call runs under an [`ElevatedContext`] obtained from a
//! [`PrivilegeElevation`]. [`run_elevated`] acquires one context per call and
//! releases it as soon as the call returns.

use std::collections::HashSet;
use std::future::Future;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{DirectoryResult, ElevationError};

/// Token proving that the holder runs as the system principal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElevatedContext {
	id: Uuid,
	principal: String,
	acquired_at: DateTime<Utc>,
}

impl ElevatedContext {
	pub fn new(principal: impl Into<String>) -> Self {
		Self {
			id: Uuid::new_v4(),
			principal: principal.into(),
			acquired_at: Utc::now(),
		}
	}

	pub fn id(&self) -> Uuid {
		self.id
	}

	pub fn principal(&self) -> &str {
		&self.principal
	}

	pub fn acquired_at(&self) -> DateTime<Utc> {
		self.acquired_at
	}
}

#[async_trait]
pub trait PrivilegeElevation: Send + Sync {
	/// Obtain a context for a single privileged operation.
	async fn acquire(&self) -> Result<ElevatedContext, ElevationError>;

	/// Return a context. Called exactly once per acquired context.
	fn release(&self, ctx: &ElevatedContext);
}

struct ReleaseGuard<'a> {
	elevation: &'a dyn PrivilegeElevation,
	ctx: ElevatedContext,
}

impl Drop for ReleaseGuard<'_> {
	fn drop(&mut self) {
		self.elevation.release(&self.ctx);
	}
}

/// Run one directory operation under a freshly acquired elevated context.
///
/// The context is released when the operation completes, including on early
/// return or unwinding. The outer `Result` reports elevation failures; the
/// inner one is the operation's own outcome.
pub async fn run_elevated<T, F, Fut>(
	elevation: &dyn PrivilegeElevation,
	op: F,
) -> Result<DirectoryResult<T>, ElevationError>
where
	F: FnOnce(ElevatedContext) -> Fut,
	Fut: Future<Output = DirectoryResult<T>>,
{
	let guard = ReleaseGuard {
		elevation,
		ctx: elevation.acquire().await?,
	};
	tracing::trace!(context = %guard.ctx.id, principal = %guard.ctx.principal, "elevated");
	let outcome = op(guard.ctx.clone()).await;
	drop(guard);
	Ok(outcome)
}

/// Elevation to a fixed system principal that tracks live contexts.
///
/// Directories can call [`SystemElevation::is_active`] to refuse mutations
/// made with a context that was never issued or was already released.
#[derive(Debug)]
pub struct SystemElevation {
	principal: String,
	active: Mutex<HashSet<Uuid>>,
}

impl SystemElevation {
	pub fn new(principal: impl Into<String>) -> Self {
		Self {
			principal: principal.into(),
			active: Mutex::new(HashSet::new()),
		}
	}

	pub fn principal(&self) -> &str {
		&self.principal
	}

	pub fn is_active(&self, ctx: &ElevatedContext) -> bool {
		ctx.principal == self.principal
			&& self
				.active
				.lock()
				.map(|active| active.contains(&ctx.id))
				.unwrap_or(false)
	}

	/// Number of contexts acquired and not yet released.
	pub fn active_count(&self) -> usize {
		self.active.lock().map(|active| active.len()).unwrap_or(0)
	}
}

#[async_trait]
impl PrivilegeElevation for SystemElevation {
	async fn acquire(&self) -> Result<ElevatedContext, ElevationError> {
		let ctx = ElevatedContext::new(self.principal.clone());
		self
			.active
			.lock()
			.map_err(|e| ElevationError::Backend(e.to_string()))?
			.insert(ctx.id);
		Ok(ctx)
	}

	fn release(&self, ctx: &ElevatedContext) {
		match self.active.lock() {
			Ok(mut active) => {
				active.remove(&ctx.id);
			}
			Err(e) => tracing::error!(error = %e, context = %ctx.id, "failed to release elevated context"),
		}
	}
}

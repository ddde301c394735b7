// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration layer for merging from multiple sources.

use serde::Deserialize;

use crate::sections::{
	AuditConfigLayer, LoggingConfigLayer, PasswordConfigLayer, ProvisioningConfigLayer,
};

/// Configuration layer - all fields are Option for merging.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SsoConfigLayer {
	#[serde(default)]
	pub provisioning: Option<ProvisioningConfigLayer>,
	#[serde(default)]
	pub password: Option<PasswordConfigLayer>,
	#[serde(default)]
	pub audit: Option<AuditConfigLayer>,
	#[serde(default)]
	pub logging: Option<LoggingConfigLayer>,
}

impl SsoConfigLayer {
	/// Merge another layer into this one. Other layer takes precedence.
	pub fn merge(&mut self, other: SsoConfigLayer) {
		merge_option(
			&mut self.provisioning,
			other.provisioning,
			ProvisioningConfigLayer::merge,
		);
		merge_option(&mut self.password, other.password, PasswordConfigLayer::merge);
		merge_option(&mut self.audit, other.audit, AuditConfigLayer::merge);
		merge_option(&mut self.logging, other.logging, LoggingConfigLayer::merge);
	}
}

fn merge_option<T>(target: &mut Option<T>, other: Option<T>, merge: fn(&mut T, T)) {
	match (target.as_mut(), other) {
		(Some(existing), Some(incoming)) => merge(existing, incoming),
		(None, Some(incoming)) => *target = Some(incoming),
		(_, None) => {}
	}
}

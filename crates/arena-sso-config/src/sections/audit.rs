// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Provisioning audit configuration.

use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditConfig {
	pub enabled: bool,
}

impl Default for AuditConfig {
	fn default() -> Self {
		Self { enabled: true }
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuditConfigLayer {
	#[serde(default)]
	pub enabled: Option<bool>,
}

impl AuditConfigLayer {
	pub fn merge(&mut self, other: AuditConfigLayer) {
		if other.enabled.is_some() {
			self.enabled = other.enabled;
		}
	}

	pub fn finalize(self) -> AuditConfig {
		AuditConfig {
			enabled: self.enabled.unwrap_or(true),
		}
	}
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sections.

pub mod audit;
pub mod logging;
pub mod password;
pub mod provisioning;

pub use audit::{AuditConfig, AuditConfigLayer};
pub use logging::{LogFormat, LoggingConfig, LoggingConfigLayer};
pub use password::{PasswordConfig, PasswordConfigLayer};
pub use provisioning::{
	normalize_role_names, validate_role_name, ProvisioningConfig, ProvisioningConfigLayer,
};

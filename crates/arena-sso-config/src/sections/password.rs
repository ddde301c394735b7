// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Generated-password policy configuration.

use serde::Deserialize;

use crate::error::ConfigError;

pub const DEFAULT_PASSWORD_LENGTH: usize = 24;
pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const MAX_PASSWORD_LENGTH: usize = 256;

/// Password policy configuration (runtime, fully resolved).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordConfig {
	pub length: usize,
	pub require_lowercase: bool,
	pub require_uppercase: bool,
	pub require_digit: bool,
	pub require_symbol: bool,
}

impl Default for PasswordConfig {
	fn default() -> Self {
		Self {
			length: DEFAULT_PASSWORD_LENGTH,
			require_lowercase: true,
			require_uppercase: true,
			require_digit: true,
			require_symbol: true,
		}
	}
}

impl PasswordConfig {
	/// Number of character classes that must appear at least once.
	pub fn required_classes(&self) -> usize {
		[
			self.require_lowercase,
			self.require_uppercase,
			self.require_digit,
			self.require_symbol,
		]
		.into_iter()
		.filter(|required| *required)
		.count()
	}

	pub fn validate(&self) -> Result<(), ConfigError> {
		if !(MIN_PASSWORD_LENGTH..=MAX_PASSWORD_LENGTH).contains(&self.length) {
			return Err(ConfigError::InvalidValue {
				key: "password.length".to_string(),
				message: format!(
					"must be between {MIN_PASSWORD_LENGTH} and {MAX_PASSWORD_LENGTH}, got {}",
					self.length
				),
			});
		}
		if self.length < self.required_classes() {
			return Err(ConfigError::Validation(format!(
				"password.length {} cannot fit {} required character classes",
				self.length,
				self.required_classes()
			)));
		}
		Ok(())
	}
}

/// Password policy configuration layer (partial, for merging).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PasswordConfigLayer {
	#[serde(default)]
	pub length: Option<usize>,
	#[serde(default)]
	pub require_lowercase: Option<bool>,
	#[serde(default)]
	pub require_uppercase: Option<bool>,
	#[serde(default)]
	pub require_digit: Option<bool>,
	#[serde(default)]
	pub require_symbol: Option<bool>,
}

impl PasswordConfigLayer {
	pub fn merge(&mut self, other: PasswordConfigLayer) {
		if other.length.is_some() {
			self.length = other.length;
		}
		if other.require_lowercase.is_some() {
			self.require_lowercase = other.require_lowercase;
		}
		if other.require_uppercase.is_some() {
			self.require_uppercase = other.require_uppercase;
		}
		if other.require_digit.is_some() {
			self.require_digit = other.require_digit;
		}
		if other.require_symbol.is_some() {
			self.require_symbol = other.require_symbol;
		}
	}

	pub fn finalize(self) -> PasswordConfig {
		PasswordConfig {
			length: self.length.unwrap_or(DEFAULT_PASSWORD_LENGTH),
			require_lowercase: self.require_lowercase.unwrap_or(true),
			require_uppercase: self.require_uppercase.unwrap_or(true),
			require_digit: self.require_digit.unwrap_or(true),
			require_symbol: self.require_symbol.unwrap_or(true),
		}
	}
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Random passwords for accounts created on first SSO login.
//!
//! SSO users never type these passwords; they exist because the directory
//! refuses accounts without one. They still have to satisfy the directory's
//! strength rules, so generation is driven by a [`PasswordPolicy`].

use std::fmt;

use arena_sso_config::PasswordConfig;
use rand::seq::SliceRandom;
use zeroize::Zeroize;

use crate::error::PasswordError;

const LOWERCASE: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const UPPERCASE: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIGITS: &[u8] = b"0123456789";
// No quotes, backslashes, `$` or whitespace.
const SYMBOLS: &[u8] = b"!#%+-.:=?@^_~";

/// A generated password. Debug and Display are redacted and the buffer is
/// zeroed on drop; call [`GeneratedPassword::expose`] to read it.
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct GeneratedPassword {
	inner: String,
}

impl GeneratedPassword {
	pub fn new(inner: String) -> Self {
		Self { inner }
	}

	pub fn expose(&self) -> &str {
		&self.inner
	}

	pub fn len(&self) -> usize {
		self.inner.len()
	}

	pub fn is_empty(&self) -> bool {
		self.inner.is_empty()
	}
}

impl Clone for GeneratedPassword {
	fn clone(&self) -> Self {
		Self {
			inner: self.inner.clone(),
		}
	}
}

impl fmt::Debug for GeneratedPassword {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("GeneratedPassword")
			.field(&"[REDACTED]")
			.finish()
	}
}

impl fmt::Display for GeneratedPassword {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("[REDACTED]")
	}
}

pub trait PasswordGenerator: Send + Sync {
	fn generate(&self) -> Result<GeneratedPassword, PasswordError>;
}

/// Character-class requirements for generated passwords.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordPolicy {
	pub length: usize,
	pub require_lowercase: bool,
	pub require_uppercase: bool,
	pub require_digit: bool,
	pub require_symbol: bool,
}

impl Default for PasswordPolicy {
	fn default() -> Self {
		Self::from(&PasswordConfig::default())
	}
}

impl From<&PasswordConfig> for PasswordPolicy {
	fn from(config: &PasswordConfig) -> Self {
		Self {
			length: config.length,
			require_lowercase: config.require_lowercase,
			require_uppercase: config.require_uppercase,
			require_digit: config.require_digit,
			require_symbol: config.require_symbol,
		}
	}
}

impl PasswordPolicy {
	pub fn length(mut self, length: usize) -> Self {
		self.length = length;
		self
	}

	pub fn require_symbol(mut self, required: bool) -> Self {
		self.require_symbol = required;
		self
	}

	fn required_classes(&self) -> Vec<&'static [u8]> {
		[
			(self.require_lowercase, LOWERCASE),
			(self.require_uppercase, UPPERCASE),
			(self.require_digit, DIGITS),
			(self.require_symbol, SYMBOLS),
		]
		.into_iter()
		.filter_map(|(required, class)| required.then_some(class))
		.collect()
	}
}

/// Generates passwords with the thread-local CSPRNG.
#[derive(Debug, Clone)]
pub struct PolicyPasswordGenerator {
	policy: PasswordPolicy,
	required: Vec<&'static [u8]>,
	alphabet: Vec<u8>,
}

impl PolicyPasswordGenerator {
	pub fn new(policy: PasswordPolicy) -> Result<Self, PasswordError> {
		let required = policy.required_classes();
		if policy.length == 0 {
			return Err(PasswordError::InvalidPolicy(
				"length must be positive".to_string(),
			));
		}
		if policy.length < required.len() {
			return Err(PasswordError::InvalidPolicy(format!(
				"length {} cannot fit {} required character classes",
				policy.length,
				required.len()
			)));
		}

		// With no class required, fall back to alphanumerics.
		let alphabet: Vec<u8> = if required.is_empty() {
			[LOWERCASE, UPPERCASE, DIGITS].concat()
		} else {
			required.concat()
		};

		Ok(Self {
			policy,
			required,
			alphabet,
		})
	}

	pub fn policy(&self) -> &PasswordPolicy {
		&self.policy
	}
}

impl PasswordGenerator for PolicyPasswordGenerator {
	fn generate(&self) -> Result<GeneratedPassword, PasswordError> {
		let mut rng = rand::thread_rng();
		let mut chars = Vec::with_capacity(self.policy.length);

		for class in &self.required {
			let c = class
				.choose(&mut rng)
				.ok_or_else(|| PasswordError::Generation("empty character class".to_string()))?;
			chars.push(*c);
		}
		while chars.len() < self.policy.length {
			let c = self
				.alphabet
				.choose(&mut rng)
				.ok_or_else(|| PasswordError::Generation("empty alphabet".to_string()))?;
			chars.push(*c);
		}
		chars.shuffle(&mut rng);

		let password = String::from_utf8(chars)
			.map_err(|e| PasswordError::Generation(e.to_string()))?;
		Ok(GeneratedPassword::new(password))
	}
}

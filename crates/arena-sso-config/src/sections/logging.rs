// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Logging configuration section.

use std::fmt;

use serde::Deserialize;
use tracing_subscriber::EnvFilter;

use crate::error::ConfigError;

fn default_level() -> String {
	"info".to_string()
}

/// Output format of the fmt layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
	#[default]
	Text,
	Json,
}

impl LogFormat {
	pub fn parse(value: &str) -> Option<Self> {
		match value.trim().to_lowercase().as_str() {
			"text" | "pretty" => Some(Self::Text),
			"json" => Some(Self::Json),
			_ => None,
		}
	}
}

impl fmt::Display for LogFormat {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Text => write!(f, "text"),
			Self::Json => write!(f, "json"),
		}
	}
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct LoggingConfigLayer {
	#[serde(default)]
	pub level: Option<String>,
	#[serde(default)]
	pub format: Option<LogFormat>,
}

impl LoggingConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.level.is_some() {
			self.level = other.level;
		}
		if other.format.is_some() {
			self.format = other.format;
		}
	}

	pub fn finalize(self) -> LoggingConfig {
		LoggingConfig {
			level: self.level.unwrap_or_else(default_level),
			format: self.format.unwrap_or_default(),
		}
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoggingConfig {
	pub level: String,
	pub format: LogFormat,
}

impl LoggingConfig {
	/// Reject levels that `init_logging` could not turn into a filter.
	pub fn validate(&self) -> Result<(), ConfigError> {
		EnvFilter::try_new(&self.level)
			.map(|_| ())
			.map_err(|e| ConfigError::InvalidValue {
				key: "logging.level".to_string(),
				message: format!("invalid filter '{}': {e}", self.level),
			})
	}
}

impl Default for LoggingConfig {
	fn default() -> Self {
		Self {
			level: default_level(),
			format: LogFormat::default(),
		}
	}
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Tracing subscriber bootstrap for embedders without their own subscriber.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::ConfigError;
use crate::sections::{LogFormat, LoggingConfig};

/// Install a global subscriber. `RUST_LOG` overrides the configured level.
///
/// Fails if a global subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<(), ConfigError> {
	let filter = EnvFilter::try_from_default_env()
		.or_else(|_| EnvFilter::try_new(&config.level))
		.map_err(|e| ConfigError::InvalidValue {
			key: "logging.level".to_string(),
			message: e.to_string(),
		})?;

	let registry = tracing_subscriber::registry().with(filter);
	let result = match config.format {
		LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).try_init(),
		LogFormat::Json => registry
			.with(tracing_subscriber::fmt::layer().json())
			.try_init(),
	};

	result.map_err(|e| ConfigError::Logging(e.to_string()))
}

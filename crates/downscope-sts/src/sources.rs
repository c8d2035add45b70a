// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sources: defaults, TOML file, environment.

use std::path::PathBuf;

use tracing::{debug, trace};

use crate::config::{ConfigError, StsConfigLayer};

/// Source precedence levels (higher overrides lower).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
	Defaults = 10,
	ConfigFile = 20,
	Environment = 50,
}

pub trait ConfigSource: Send + Sync {
	fn name(&self) -> &'static str;
	fn precedence(&self) -> Precedence;
	fn load(&self) -> Result<StsConfigLayer, ConfigError>;
}

/// Contributes nothing; [`StsConfigLayer::finalize`] fills in defaults.
pub struct DefaultsSource;

impl ConfigSource for DefaultsSource {
	fn name(&self) -> &'static str {
		"defaults"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Defaults
	}

	fn load(&self) -> Result<StsConfigLayer, ConfigError> {
		Ok(StsConfigLayer::default())
	}
}

/// A TOML file. A missing file contributes nothing.
pub struct TomlSource {
	path: PathBuf,
}

impl TomlSource {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}
}

impl ConfigSource for TomlSource {
	fn name(&self) -> &'static str {
		"toml-config"
	}

	fn precedence(&self) -> Precedence {
		Precedence::ConfigFile
	}

	fn load(&self) -> Result<StsConfigLayer, ConfigError> {
		if !self.path.exists() {
			debug!(path = %self.path.display(), "config file not found, skipping");
			return Ok(StsConfigLayer::default());
		}

		debug!(path = %self.path.display(), "loading config file");
		let content = std::fs::read_to_string(&self.path).map_err(|e| ConfigError::FileRead {
			path: self.path.clone(),
			source: e,
		})?;

		let layer = toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
			path: self.path.clone(),
			source: e,
		})?;

		trace!("parsed config layer from TOML");
		Ok(layer)
	}
}

/// Environment variables.
///
/// Convention: `<PREFIX>_ENDPOINT`, `<PREFIX>_TIMEOUT_SECS`,
/// `<PREFIX>_USER_AGENT`, with the prefix defaulting to `DOWNSCOPE_STS`.
/// Empty values are ignored.
pub struct EnvSource {
	prefix: String,
}

impl EnvSource {
	pub fn new(prefix: impl Into<String>) -> Self {
		Self {
			prefix: prefix.into(),
		}
	}

	fn var(&self, field: &str) -> (String, Option<String>) {
		let key = format!("{}_{field}", self.prefix);
		let value = std::env::var(&key).ok().filter(|s| !s.is_empty());
		(key, value)
	}
}

impl Default for EnvSource {
	fn default() -> Self {
		Self::new("DOWNSCOPE_STS")
	}
}

impl ConfigSource for EnvSource {
	fn name(&self) -> &'static str {
		"environment"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self) -> Result<StsConfigLayer, ConfigError> {
		let (_, endpoint) = self.var("ENDPOINT");
		let (_, user_agent) = self.var("USER_AGENT");

		let timeout_secs = match self.var("TIMEOUT_SECS") {
			(_, None) => None,
			(key, Some(value)) => Some(
				value
					.trim()
					.parse::<u64>()
					.map_err(|_| ConfigError::InvalidValue { key, value })?,
			),
		};

		Ok(StsConfigLayer {
			endpoint,
			timeout_secs,
			user_agent,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;

	#[test]
	fn precedence_orders_sources() {
		let mut sources: Vec<Box<dyn ConfigSource>> = vec![
			Box::new(EnvSource::default()),
			Box::new(DefaultsSource),
			Box::new(TomlSource::new("/nonexistent/downscope.toml")),
		];
		sources.sort_by_key(|s| s.precedence());

		let names: Vec<_> = sources.iter().map(|s| s.name()).collect();
		assert_eq!(names, ["defaults", "toml-config", "environment"]);
	}

	#[test]
	fn missing_toml_file_contributes_nothing() {
		let layer = TomlSource::new("/nonexistent/downscope.toml").load().unwrap();
		assert_eq!(layer, StsConfigLayer::default());
	}

	#[test]
	fn toml_file_is_loaded() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(file, "endpoint = \"https://broker.internal/token\"").unwrap();
		writeln!(file, "user_agent = \"exporter/1.0\"").unwrap();

		let layer = TomlSource::new(file.path()).load().unwrap();
		assert_eq!(layer.endpoint.as_deref(), Some("https://broker.internal/token"));
		assert_eq!(layer.user_agent.as_deref(), Some("exporter/1.0"));
	}

	#[test]
	fn malformed_toml_is_a_parse_error() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(file, "timeout_secs = \"soon\"").unwrap();

		assert!(matches!(
			TomlSource::new(file.path()).load(),
			Err(ConfigError::TomlParse { .. })
		));
	}

	#[test]
	fn env_values_are_read_with_prefix() {
		let prefix = "DOWNSCOPE_TEST_ENV_SOURCE";
		std::env::set_var(format!("{prefix}_ENDPOINT"), "https://broker.internal/token");
		std::env::set_var(format!("{prefix}_TIMEOUT_SECS"), " 7 ");
		std::env::set_var(format!("{prefix}_USER_AGENT"), "");

		let layer = EnvSource::new(prefix).load().unwrap();
		assert_eq!(layer.endpoint.as_deref(), Some("https://broker.internal/token"));
		assert_eq!(layer.timeout_secs, Some(7));
		assert!(layer.user_agent.is_none());

		for field in ["ENDPOINT", "TIMEOUT_SECS", "USER_AGENT"] {
			std::env::remove_var(format!("{prefix}_{field}"));
		}
	}

	#[test]
	fn env_timeout_must_be_a_number() {
		let prefix = "DOWNSCOPE_TEST_ENV_BAD_TIMEOUT";
		std::env::set_var(format!("{prefix}_TIMEOUT_SECS"), "thirty");

		match EnvSource::new(prefix).load() {
			Err(ConfigError::InvalidValue { key, value }) => {
				assert_eq!(key, format!("{prefix}_TIMEOUT_SECS"));
				assert_eq!(value, "thirty");
			}
			other => panic!("expected InvalidValue, got {other:?}"),
		}

		std::env::remove_var(format!("{prefix}_TIMEOUT_SECS"));
	}
}

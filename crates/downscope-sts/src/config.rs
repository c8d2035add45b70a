// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Exchange client configuration.
//!
//! Values are layered from built-in defaults, an optional TOML file and
//! `DOWNSCOPE_STS_*` environment variables, in that order of precedence:
//!
//! ```toml
//! endpoint = "https://sts.googleapis.com/v1/token"
//! timeout_secs = 30
//! user_agent = "reports-exporter/2.1"
//! ```

use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use url::{Host, Url};

use crate::sources::{ConfigSource, DefaultsSource, EnvSource, TomlSource};

/// Google's Security Token Service token endpoint.
pub const DEFAULT_STS_ENDPOINT: &str = "https://sts.googleapis.com/v1/token";

/// Upper bound on one exchange round trip, including reading the body.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("failed to read config file at {path}: {source}")]
	FileRead {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("failed to parse config file at {path}: {source}")]
	TomlParse {
		path: PathBuf,
		#[source]
		source: toml::de::Error,
	},

	#[error("invalid token exchange endpoint {value:?}: {reason}")]
	InvalidEndpoint { value: String, reason: String },

	#[error("invalid value for {key}: {value:?}")]
	InvalidValue { key: String, value: String },
}

/// Resolved exchange client settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StsConfig {
	pub endpoint: Url,
	pub timeout: Duration,
	/// Overrides the default `downscope/<version>` User-Agent.
	pub user_agent: Option<String>,
}

impl StsConfig {
	/// Configuration for an arbitrary RFC 8693 issuer.
	pub fn new(endpoint: &str) -> Result<Self, ConfigError> {
		Ok(Self {
			endpoint: parse_endpoint(endpoint)?,
			timeout: DEFAULT_TIMEOUT,
			user_agent: None,
		})
	}

	/// Configuration for Google's STS.
	pub fn google() -> Self {
		Self {
			endpoint: Url::parse(DEFAULT_STS_ENDPOINT).expect("invalid default STS endpoint"),
			timeout: DEFAULT_TIMEOUT,
			user_agent: None,
		}
	}

	pub fn with_timeout(mut self, timeout: Duration) -> Self {
		self.timeout = timeout;
		self
	}

	pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
		self.user_agent = Some(user_agent.into());
		self
	}

	/// Re-checks fields set directly or through the `with_*` builders:
	/// the endpoint scheme and a non-zero timeout.
	pub fn validate(&self) -> Result<(), ConfigError> {
		check_endpoint(&self.endpoint)?;
		if self.timeout.is_zero() {
			return Err(ConfigError::InvalidValue {
				key: "timeout".to_string(),
				value: format!("{:?}", self.timeout),
			});
		}
		Ok(())
	}
}

impl Default for StsConfig {
	fn default() -> Self {
		Self::google()
	}
}

/// A partial configuration contributed by one source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StsConfigLayer {
	#[serde(default)]
	pub endpoint: Option<String>,
	#[serde(default)]
	pub timeout_secs: Option<u64>,
	#[serde(default)]
	pub user_agent: Option<String>,
}

impl StsConfigLayer {
	/// Overwrites fields that `other` sets.
	pub fn merge(&mut self, other: Self) {
		if other.endpoint.is_some() {
			self.endpoint = other.endpoint;
		}
		if other.timeout_secs.is_some() {
			self.timeout_secs = other.timeout_secs;
		}
		if other.user_agent.is_some() {
			self.user_agent = other.user_agent;
		}
	}

	pub fn finalize(self) -> Result<StsConfig, ConfigError> {
		let endpoint = match self.endpoint {
			Some(endpoint) => parse_endpoint(&endpoint)?,
			None => StsConfig::google().endpoint,
		};

		let timeout = match self.timeout_secs {
			Some(0) => {
				return Err(ConfigError::InvalidValue {
					key: "timeout_secs".to_string(),
					value: "0".to_string(),
				})
			}
			Some(secs) => Duration::from_secs(secs),
			None => DEFAULT_TIMEOUT,
		};

		Ok(StsConfig {
			endpoint,
			timeout,
			user_agent: self.user_agent,
		})
	}
}

pub(crate) fn parse_endpoint(raw: &str) -> Result<Url, ConfigError> {
	let url = Url::parse(raw).map_err(|e| ConfigError::InvalidEndpoint {
		value: raw.to_string(),
		reason: e.to_string(),
	})?;
	check_endpoint(&url)?;
	Ok(url)
}

/// Accepts `https` URLs, and `http` only for loopback hosts (local test
/// issuers). Bearer tokens must not cross the network in clear text.
pub(crate) fn check_endpoint(url: &Url) -> Result<(), ConfigError> {
	let invalid = |reason: String| ConfigError::InvalidEndpoint {
		value: url.to_string(),
		reason,
	};

	match url.scheme() {
		"https" => Ok(()),
		"http" if is_loopback(url) => Ok(()),
		"http" => Err(invalid("plain http is only allowed for loopback hosts".to_string())),
		other => Err(invalid(format!("unsupported scheme {other:?}"))),
	}
}

fn is_loopback(url: &Url) -> bool {
	match url.host() {
		Some(Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
		Some(Host::Ipv4(ip)) => IpAddr::V4(ip).is_loopback(),
		Some(Host::Ipv6(ip)) => IpAddr::V6(ip).is_loopback(),
		None => false,
	}
}

fn load_from(mut sources: Vec<Box<dyn ConfigSource>>) -> Result<StsConfig, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = StsConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		merged.merge(source.load()?);
	}

	merged.finalize()
}

/// Defaults overridden by `DOWNSCOPE_STS_*` environment variables.
pub fn load_config_from_env() -> Result<StsConfig, ConfigError> {
	load_from(vec![Box::new(DefaultsSource), Box::new(EnvSource::default())])
}

/// Defaults, then the TOML file at `path` (skipped if absent), then the
/// environment.
pub fn load_config_with_file(path: impl Into<PathBuf>) -> Result<StsConfig, ConfigError> {
	load_from(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::new(path)),
		Box::new(EnvSource::default()),
	])
}

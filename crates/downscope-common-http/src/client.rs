// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Client construction with a consistent User-Agent header.

use reqwest::{Client, ClientBuilder};

/// Returns the standard User-Agent string, `downscope/{version}`.
pub fn user_agent() -> String {
	format!("downscope/{}", env!("CARGO_PKG_VERSION"))
}

/// Creates a client builder with the standard User-Agent.
///
/// Callers finish configuration (timeouts, proxies) and call `build()`
/// themselves so construction failures propagate as their own error type.
pub fn builder() -> ClientBuilder {
	builder_with_user_agent(user_agent())
}

/// Creates a client builder with a caller-chosen User-Agent.
///
/// Some trust brokers allow-list clients by User-Agent; this lets the
/// configured value override the default.
pub fn builder_with_user_agent(user_agent: impl Into<String>) -> ClientBuilder {
	Client::builder().user_agent(user_agent.into())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn user_agent_names_the_crate_version() {
		let ua = user_agent();
		let (name, version) = ua.split_once('/').unwrap();
		assert_eq!(name, "downscope");
		assert_eq!(version, env!("CARGO_PKG_VERSION"));
	}

	#[test]
	fn builders_produce_clients() {
		assert!(builder().build().is_ok());
		assert!(builder_with_user_agent("trust-broker/1.0").build().is_ok());
	}
}

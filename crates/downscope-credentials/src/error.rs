// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::path::PathBuf;

use downscope_common_http::RetryableError;
use thiserror::Error;

/// The root credential could not be obtained.
#[derive(Debug, Error)]
pub enum CredentialError {
	/// No credential is configured for this source.
	#[error("no credential found: {0}")]
	NotFound(String),

	#[error("failed to read credential file at {path}: {source}")]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("credential file path in {var} is empty")]
	EmptyPath { var: String },

	/// The source produced a blank token.
	#[error("credential source {source_name} returned an empty token")]
	EmptyToken { source_name: &'static str },

	/// The ambient provider could not be initialized (no ADC, bad key file).
	///
	/// Treated as permanent: `gcp_auth` reports a missing configuration and
	/// an unreachable metadata server with the same error. A failed
	/// initialization is not cached, so the next call tries again.
	#[error("credential provider unavailable: {0}")]
	ProviderUnavailable(String),

	/// The provider was reachable but failed to mint a token.
	#[error("failed to fetch access token: {0}")]
	TokenFetch(String),
}

impl RetryableError for CredentialError {
	fn is_retryable(&self) -> bool {
		matches!(self, CredentialError::TokenFetch(_))
	}
}

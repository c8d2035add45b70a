// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use downscope_common_http::{is_retryable_status, RetryableError};
use downscope_credentials::CredentialError;
use downscope_policy::PolicyError;
use reqwest::StatusCode;
use thiserror::Error;

use crate::config::ConfigError;

/// Failures of a single token exchange round trip.
///
/// Messages carry status codes and field names, never token values.
#[derive(Debug, Error)]
pub enum ExchangeError {
	/// The issuer answered with a non-2xx status. `body` is a sanitized
	/// summary (OAuth `error`/`error_description` when present).
	#[error("token exchange failed with status {status}: {body}")]
	Status { status: u16, body: String },

	/// A 2xx response that is not a usable token response.
	#[error("invalid token exchange response: {0}")]
	Protocol(String),

	#[error("token exchange request failed: {0}")]
	Transport(#[source] reqwest::Error),

	#[error("token exchange timed out")]
	Timeout,

	#[error("token exchange cancelled")]
	Cancelled,

	#[error("failed to encode access boundary: {0}")]
	Encode(#[source] PolicyError),

	#[error("failed to build HTTP client: {0}")]
	Client(#[source] reqwest::Error),

	/// The client was constructed from an endpoint or timeout that fails
	/// [`StsConfig::validate`](crate::StsConfig::validate).
	#[error("invalid exchange client configuration: {0}")]
	InvalidConfig(#[source] ConfigError),
}

impl ExchangeError {
	pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
		if err.is_timeout() {
			ExchangeError::Timeout
		} else {
			ExchangeError::Transport(err)
		}
	}

	pub fn status(&self) -> Option<u16> {
		match self {
			ExchangeError::Status { status, .. } => Some(*status),
			_ => None,
		}
	}
}

impl RetryableError for ExchangeError {
	fn is_retryable(&self) -> bool {
		match self {
			ExchangeError::Status { status, .. } => StatusCode::from_u16(*status)
				.map(is_retryable_status)
				.unwrap_or(false),
			ExchangeError::Transport(e) => e.is_retryable(),
			ExchangeError::Timeout => true,
			ExchangeError::Protocol(_)
			| ExchangeError::Cancelled
			| ExchangeError::Encode(_)
			| ExchangeError::Client(_)
			| ExchangeError::InvalidConfig(_) => false,
		}
	}
}

/// Coarse classification of a [`DownscopeError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
	/// The rules were rejected locally; nothing was sent.
	Validation,
	Configuration,
	Credential,
	/// The issuer rejected the exchange.
	Exchange,
	/// The issuer's response was unusable.
	Protocol,
	Transport,
	Cancelled,
}

/// Error returned by the end-to-end downscoping flow.
#[derive(Debug, Error)]
pub enum DownscopeError {
	#[error("invalid access boundary: {0}")]
	Validation(#[from] PolicyError),

	#[error("invalid configuration: {0}")]
	Config(#[from] ConfigError),

	#[error("failed to obtain root credential: {0}")]
	Credential(#[from] CredentialError),

	#[error(transparent)]
	Exchange(#[from] ExchangeError),
}

impl DownscopeError {
	pub fn kind(&self) -> ErrorKind {
		match self {
			DownscopeError::Validation(_) => ErrorKind::Validation,
			DownscopeError::Config(_) => ErrorKind::Configuration,
			DownscopeError::Credential(_) => ErrorKind::Credential,
			DownscopeError::Exchange(e) => match e {
				ExchangeError::Status { .. } => ErrorKind::Exchange,
				ExchangeError::Protocol(_) | ExchangeError::Encode(_) => ErrorKind::Protocol,
				ExchangeError::Transport(_) | ExchangeError::Timeout | ExchangeError::Client(_) => {
					ErrorKind::Transport
				}
				ExchangeError::Cancelled => ErrorKind::Cancelled,
				ExchangeError::InvalidConfig(_) => ErrorKind::Configuration,
			},
		}
	}

	pub fn is_cancelled(&self) -> bool {
		self.kind() == ErrorKind::Cancelled
	}
}

impl RetryableError for DownscopeError {
	fn is_retryable(&self) -> bool {
		match self {
			DownscopeError::Credential(e) => e.is_retryable(),
			DownscopeError::Exchange(e) => e.is_retryable(),
			DownscopeError::Validation(_) | DownscopeError::Config(_) => false,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn status(code: u16) -> ExchangeError {
		ExchangeError::Status {
			status: code,
			body: "invalid_request".to_string(),
		}
	}

	#[test]
	fn transient_statuses_are_retryable() {
		for code in [408, 429, 500, 502, 503, 504] {
			assert!(status(code).is_retryable(), "status {code}");
		}
		for code in [400, 401, 403, 404, 409] {
			assert!(!status(code).is_retryable(), "status {code}");
		}
	}

	#[test]
	fn local_failures_are_permanent() {
		assert!(ExchangeError::Timeout.is_retryable());
		assert!(!ExchangeError::Cancelled.is_retryable());
		assert!(!ExchangeError::Protocol("missing access_token".into()).is_retryable());

		let validation: DownscopeError = PolicyError::NoRules.into();
		assert!(!validation.is_retryable());
	}

	#[test]
	fn kinds_follow_the_failing_stage() {
		let cases: Vec<(DownscopeError, ErrorKind)> = vec![
			(PolicyError::EmptyResource { index: 0 }.into(), ErrorKind::Validation),
			(
				CredentialError::NotFound("DOWNSCOPE_ROOT_TOKEN".into()).into(),
				ErrorKind::Credential,
			),
			(status(400).into(), ErrorKind::Exchange),
			(
				ExchangeError::Protocol("missing access_token".into()).into(),
				ErrorKind::Protocol,
			),
			(ExchangeError::Timeout.into(), ErrorKind::Transport),
			(ExchangeError::Cancelled.into(), ErrorKind::Cancelled),
			(
				ExchangeError::InvalidConfig(ConfigError::InvalidValue {
					key: "timeout".into(),
					value: "0ns".into(),
				})
				.into(),
				ErrorKind::Configuration,
			),
			(
				ConfigError::InvalidValue {
					key: "timeout_secs".into(),
					value: "0".into(),
				}
				.into(),
				ErrorKind::Configuration,
			),
		];

		for (err, kind) in cases {
			assert_eq!(err.kind(), kind, "{err}");
		}
	}

	#[test]
	fn status_error_message_names_the_code() {
		let err = status(403);
		assert_eq!(err.status(), Some(403));
		assert_eq!(
			err.to_string(),
			"token exchange failed with status 403: invalid_request"
		);
		assert!(ExchangeError::Cancelled.status().is_none());
	}

	#[test]
	fn credential_retryability_is_preserved() {
		let err: DownscopeError = CredentialError::TokenFetch("metadata timeout".into()).into();
		assert!(err.is_retryable());
		assert!(!err.is_cancelled());
	}
}

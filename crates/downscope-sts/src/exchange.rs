// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! RFC 8693 token exchange client.

use std::time::Duration;

use chrono::{DateTime, Utc};
use downscope_common_secret::{SecretString, REDACTED};
use downscope_policy::Policy;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::config::{check_endpoint, StsConfig};
use crate::error::ExchangeError;
use crate::token::ExchangeResult;

pub const TOKEN_EXCHANGE_GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:token-exchange";
pub const ACCESS_TOKEN_TYPE: &str = "urn:ietf:params:oauth:token-type:access_token";

/// Longest error body summary kept in [`ExchangeError::Status`].
const MAX_ERROR_BODY_CHARS: usize = 256;

#[derive(Debug, Deserialize)]
struct TokenExchangeResponse {
	access_token: Option<String>,
	issued_token_type: Option<String>,
	token_type: Option<String>,
	expires_in: Option<u64>,
	scope: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OAuthErrorResponse {
	error: Option<String>,
	error_description: Option<String>,
}

/// Client for one token exchange endpoint.
///
/// Holds no per-request state, so a single client (or clones of it) can
/// serve any number of concurrent exchanges.
#[derive(Debug, Clone)]
pub struct StsClient {
	endpoint: Url,
	http_client: reqwest::Client,
}

impl StsClient {
	pub fn new(config: &StsConfig) -> Result<Self, ExchangeError> {
		config.validate().map_err(ExchangeError::InvalidConfig)?;

		let builder = match &config.user_agent {
			Some(user_agent) => downscope_common_http::builder_with_user_agent(user_agent),
			None => downscope_common_http::builder(),
		};
		let http_client = builder
			.timeout(config.timeout)
			.build()
			.map_err(ExchangeError::Client)?;

		Ok(Self {
			endpoint: config.endpoint.clone(),
			http_client,
		})
	}

	/// Uses a caller-built HTTP client, e.g. one with proxy settings. The
	/// endpoint gets the same scheme check as configured endpoints; timeouts
	/// are whatever `http_client` was built with.
	pub fn with_http_client(endpoint: Url, http_client: reqwest::Client) -> Result<Self, ExchangeError> {
		check_endpoint(&endpoint).map_err(ExchangeError::InvalidConfig)?;
		Ok(Self {
			endpoint,
			http_client,
		})
	}

	pub fn endpoint(&self) -> &Url {
		&self.endpoint
	}

	/// Exchanges `subject_token` for a token restricted to `policy`.
	///
	/// Exactly one request is sent; there is no internal retry.
	#[instrument(
		skip(self, subject_token, policy),
		fields(endpoint = %self.endpoint, rules = policy.rule_count())
	)]
	pub async fn exchange(
		&self,
		subject_token: &SecretString,
		policy: &Policy,
	) -> Result<ExchangeResult, ExchangeError> {
		let options = policy.to_json().map_err(ExchangeError::Encode)?;
		let form = [
			("grant_type", TOKEN_EXCHANGE_GRANT_TYPE),
			("subject_token_type", ACCESS_TOKEN_TYPE),
			("requested_token_type", ACCESS_TOKEN_TYPE),
			("subject_token", subject_token.expose().as_str()),
			("options", options.as_str()),
		];

		debug!("sending token exchange request");
		let response = self
			.http_client
			.post(self.endpoint.clone())
			.form(&form)
			.send()
			.await
			.map_err(|e| {
				warn!(error = %e, "token exchange request failed");
				ExchangeError::from_reqwest(e)
			})?;
		let received_at = Utc::now();

		let status = response.status();
		if !status.is_success() {
			let body = response.text().await.unwrap_or_default();
			let summary = sanitize_error_body(&body, subject_token);
			warn!(status = status.as_u16(), error = %summary, "token exchange rejected");
			return Err(ExchangeError::Status {
				status: status.as_u16(),
				body: summary,
			});
		}

		let body = response.text().await.map_err(ExchangeError::from_reqwest)?;
		let result = parse_exchange_response(&body, received_at)?;
		info!(
			rules = policy.rule_count(),
			has_expiry = result.expires_in.is_some(),
			"token exchange succeeded"
		);
		Ok(result)
	}

	/// As [`exchange`](Self::exchange), but returns
	/// [`ExchangeError::Cancelled`] as soon as `cancel` fires. The in-flight
	/// request is dropped and no partial result is produced.
	pub async fn exchange_with_cancellation(
		&self,
		subject_token: &SecretString,
		policy: &Policy,
		cancel: &CancellationToken,
	) -> Result<ExchangeResult, ExchangeError> {
		tokio::select! {
			biased;
			_ = cancel.cancelled() => {
				debug!("token exchange cancelled");
				Err(ExchangeError::Cancelled)
			}
			result = self.exchange(subject_token, policy) => result,
		}
	}
}

fn parse_exchange_response(
	body: &str,
	received_at: DateTime<Utc>,
) -> Result<ExchangeResult, ExchangeError> {
	// serde_json errors can quote input, so only the position is reported.
	let response: TokenExchangeResponse = serde_json::from_str(body).map_err(|e| {
		ExchangeError::Protocol(format!(
			"response is not a token exchange response (line {}, column {})",
			e.line(),
			e.column()
		))
	})?;

	let access_token = response
		.access_token
		.filter(|t| !t.trim().is_empty())
		.ok_or_else(|| ExchangeError::Protocol("missing access_token".to_string()))?;

	Ok(ExchangeResult {
		access_token: SecretString::new(access_token),
		issued_token_type: response.issued_token_type,
		token_type: response.token_type,
		expires_in: response.expires_in.map(Duration::from_secs),
		scope: response.scope,
		received_at,
	})
}

/// Summarizes an error body for logs and [`ExchangeError::Status`].
///
/// Prefers the OAuth `error` / `error_description` pair. Otherwise the
/// trimmed body is truncated. Any occurrence of the subject token is
/// replaced with `[REDACTED]` either way.
pub(crate) fn sanitize_error_body(body: &str, subject_token: &SecretString) -> String {
	let summary = match serde_json::from_str::<OAuthErrorResponse>(body) {
		Ok(OAuthErrorResponse {
			error: Some(error),
			error_description: Some(description),
		}) => format!("{error}: {description}"),
		Ok(OAuthErrorResponse {
			error: Some(error),
			error_description: None,
		}) => error,
		_ if body.trim().is_empty() => "<empty body>".to_string(),
		_ => body.trim().to_string(),
	};

	let token = subject_token.expose();
	let summary = if token.is_empty() {
		summary
	} else {
		summary.replace(token.as_str(), REDACTED)
	};

	truncate(summary)
}

fn truncate(s: String) -> String {
	if s.chars().count() <= MAX_ERROR_BODY_CHARS {
		return s;
	}
	let mut truncated: String = s.chars().take(MAX_ERROR_BODY_CHARS).collect();
	truncated.push_str("...");
	truncated
}

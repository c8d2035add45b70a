// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use downscope_credentials::CredentialSource;
use downscope_policy::{build_policy, AccessBoundaryRule, Policy};
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use crate::config::StsConfig;
use crate::error::{DownscopeError, ExchangeError};
use crate::exchange::StsClient;
use crate::token::{assemble, DownscopedToken};

/// Runs the full flow: validate rules, fetch the root token, exchange it,
/// assemble the result.
///
/// Each call is independent. Nothing is cached, so concurrent calls with
/// different rules never share a result.
#[derive(Debug, Clone)]
pub struct Downscoper<C> {
	credentials: C,
	client: StsClient,
}

impl<C: CredentialSource> Downscoper<C> {
	pub fn new(credentials: C, config: &StsConfig) -> Result<Self, DownscopeError> {
		Ok(Self::with_client(credentials, StsClient::new(config)?))
	}

	pub fn with_client(credentials: C, client: StsClient) -> Self {
		Self {
			credentials,
			client,
		}
	}

	pub fn client(&self) -> &StsClient {
		&self.client
	}

	pub fn credentials(&self) -> &C {
		&self.credentials
	}

	/// Validates `rules` locally, then exchanges. Invalid rules fail with
	/// [`DownscopeError::Validation`] before any credential or network call.
	#[instrument(skip_all, fields(rules = rules.len(), source = self.credentials.name()))]
	pub async fn new_downscoped_token(
		&self,
		rules: Vec<AccessBoundaryRule>,
	) -> Result<DownscopedToken, DownscopeError> {
		let policy = build_policy(rules)?;
		self.downscope(&policy).await
	}

	/// As [`new_downscoped_token`](Self::new_downscoped_token), aborting
	/// with [`ErrorKind::Cancelled`](crate::ErrorKind::Cancelled) when
	/// `cancel` fires during the credential fetch or the exchange.
	#[instrument(skip_all, fields(rules = rules.len(), source = self.credentials.name()))]
	pub async fn new_downscoped_token_with_cancellation(
		&self,
		rules: Vec<AccessBoundaryRule>,
		cancel: &CancellationToken,
	) -> Result<DownscopedToken, DownscopeError> {
		let policy = build_policy(rules)?;
		tokio::select! {
			biased;
			_ = cancel.cancelled() => {
				debug!("downscoping cancelled");
				Err(ExchangeError::Cancelled.into())
			}
			result = self.downscope(&policy) => result,
		}
	}

	/// Exchanges for an already-validated policy.
	pub async fn downscope(&self, policy: &Policy) -> Result<DownscopedToken, DownscopeError> {
		let root = self.credentials.current_access_token().await?;
		let result = self.client.exchange(&root, policy).await?;
		Ok(assemble(result))
	}
}

/// One-shot downscoping with Application Default Credentials and the
/// environment-configured endpoint.
#[cfg(feature = "gcp")]
pub async fn new_downscoped_token(
	rules: Vec<AccessBoundaryRule>,
) -> Result<DownscopedToken, DownscopeError> {
	let config = crate::config::load_config_from_env()?;
	let credentials = downscope_credentials::GcpCredentialSource::new();
	Downscoper::new(credentials, &config)?
		.new_downscoped_token(rules)
		.await
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Downscoped access tokens.
//!
//! Trades a broadly-scoped root token for one restricted by a credential
//! access boundary, using an OAuth 2.0 token exchange (RFC 8693) against
//! Google's Security Token Service or any compatible issuer:
//!
//! 1. the rules are validated into a [`Policy`], locally;
//! 2. a [`CredentialSource`] supplies the root token;
//! 3. [`StsClient`] posts the exchange form and parses the response;
//! 4. [`assemble`] produces a [`DownscopedToken`].
//!
//! ```no_run
//! use downscope_sts::{AccessBoundaryRule, Downscoper, StaticCredentialSource, StsConfig};
//!
//! # async fn run() -> Result<(), downscope_sts::DownscopeError> {
//! let downscoper = Downscoper::new(StaticCredentialSource::new("ya29.root"), &StsConfig::google())?;
//! let token = downscoper
//! 	.new_downscoped_token(vec![AccessBoundaryRule::new(
//! 		"//storage.googleapis.com/projects/_/buckets/reports",
//! 		["inRole:roles/storage.objectViewer"],
//! 	)])
//! 	.await?;
//! println!("expires: {:?}", token.expiry());
//! # Ok(())
//! # }
//! ```
//!
//! Nothing is retried internally. Wrap calls in [`retry`] to retry
//! transient failures (408, 429, 5xx, timeouts); each attempt is a fresh
//! request.

mod config;
mod downscoper;
mod error;
mod exchange;
mod sources;
mod token;

pub use config::{
	load_config_from_env, load_config_with_file, ConfigError, StsConfig, StsConfigLayer,
	DEFAULT_STS_ENDPOINT, DEFAULT_TIMEOUT,
};
#[cfg(feature = "gcp")]
pub use downscoper::new_downscoped_token;
pub use downscoper::Downscoper;
pub use error::{DownscopeError, ErrorKind, ExchangeError};
pub use exchange::{StsClient, ACCESS_TOKEN_TYPE, TOKEN_EXCHANGE_GRANT_TYPE};
pub use sources::{ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource};
pub use token::{assemble, DownscopedToken, ExchangeResult, Expiry, DEFAULT_TOKEN_TYPE};

pub use downscope_common_http::{retry, RetryConfig, RetryableError};
pub use downscope_common_secret::SecretString;
#[cfg(feature = "gcp")]
pub use downscope_credentials::GcpCredentialSource;
pub use downscope_credentials::{
	CredentialError, CredentialSource, EnvCredentialSource, FallbackCredentialSource,
	StaticCredentialSource,
};
pub use downscope_policy::{
	build_policy, AccessBoundary, AccessBoundaryRule, AvailabilityCondition, Policy, PolicyError,
};
pub use tokio_util::sync::CancellationToken;

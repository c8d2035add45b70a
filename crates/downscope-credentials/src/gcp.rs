// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Google Application Default Credentials.

use std::sync::Arc;

use async_trait::async_trait;
use downscope_common_secret::SecretString;
use gcp_auth::TokenProvider;
use tokio::sync::RwLock;
use tracing::{debug, error, instrument};

use crate::error::CredentialError;
use crate::source::CredentialSource;

/// Scope requested for the root token. Downscoping narrows it afterwards.
pub const CLOUD_PLATFORM_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";

/// Root token from whatever ADC resolves to: `GOOGLE_APPLICATION_CREDENTIALS`,
/// gcloud user credentials, or the metadata server.
///
/// The provider is resolved lazily on first use. Token caching and refresh
/// are left to `gcp_auth`.
#[derive(Clone)]
pub struct GcpCredentialSource {
	scopes: Vec<String>,
	provider: Arc<RwLock<Option<Arc<dyn TokenProvider>>>>,
}

impl std::fmt::Debug for GcpCredentialSource {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("GcpCredentialSource")
			.field("scopes", &self.scopes)
			.finish_non_exhaustive()
	}
}

impl GcpCredentialSource {
	pub fn new() -> Self {
		Self::with_scopes([CLOUD_PLATFORM_SCOPE])
	}

	pub fn with_scopes<I, S>(scopes: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self {
			scopes: scopes.into_iter().map(Into::into).collect(),
			provider: Arc::new(RwLock::new(None)),
		}
	}

	pub fn scopes(&self) -> &[String] {
		&self.scopes
	}

	async fn provider(&self) -> Result<Arc<dyn TokenProvider>, CredentialError> {
		if let Some(provider) = self.provider.read().await.as_ref() {
			return Ok(Arc::clone(provider));
		}

		let mut guard = self.provider.write().await;
		if let Some(provider) = guard.as_ref() {
			return Ok(Arc::clone(provider));
		}

		debug!("initializing application default credentials");
		let provider = gcp_auth::provider().await.map_err(|e| {
			error!(error = %e, "failed to initialize application default credentials");
			CredentialError::ProviderUnavailable(e.to_string())
		})?;
		*guard = Some(Arc::clone(&provider));
		Ok(provider)
	}
}

impl Default for GcpCredentialSource {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl CredentialSource for GcpCredentialSource {
	fn name(&self) -> &'static str {
		"gcp-adc"
	}

	#[instrument(skip(self), fields(scopes = ?self.scopes))]
	async fn current_access_token(&self) -> Result<SecretString, CredentialError> {
		let provider = self.provider().await?;
		let scopes: Vec<&str> = self.scopes.iter().map(String::as_str).collect();

		let token = provider.token(&scopes).await.map_err(|e| {
			error!(error = %e, "failed to fetch root access token");
			CredentialError::TokenFetch(e.to_string())
		})?;

		let token = SecretString::new(token.as_str().to_string());
		if token.is_empty() {
			return Err(CredentialError::EmptyToken {
				source_name: self.name(),
			});
		}
		Ok(token)
	}
}

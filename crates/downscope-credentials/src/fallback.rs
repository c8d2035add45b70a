// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use async_trait::async_trait;
use downscope_common_secret::SecretString;
use tracing::{debug, warn};

use crate::error::CredentialError;
use crate::source::CredentialSource;

/// Tries `primary`, then `secondary` if the primary fails.
///
/// The secondary's error is returned when both fail.
#[derive(Debug, Clone)]
pub struct FallbackCredentialSource<P, S> {
	primary: P,
	secondary: S,
}

impl<P, S> FallbackCredentialSource<P, S>
where
	P: CredentialSource,
	S: CredentialSource,
{
	pub fn new(primary: P, secondary: S) -> Self {
		Self { primary, secondary }
	}
}

#[async_trait]
impl<P, S> CredentialSource for FallbackCredentialSource<P, S>
where
	P: CredentialSource,
	S: CredentialSource,
{
	fn name(&self) -> &'static str {
		"fallback"
	}

	async fn current_access_token(&self) -> Result<SecretString, CredentialError> {
		match self.primary.current_access_token().await {
			Ok(token) => {
				debug!(source = self.primary.name(), "obtained root token");
				return Ok(token);
			}
			Err(e) => {
				warn!(
					source = self.primary.name(),
					fallback = self.secondary.name(),
					error = %e,
					"root token unavailable, trying fallback source"
				);
			}
		}

		let token = self.secondary.current_access_token().await?;
		debug!(source = self.secondary.name(), "obtained root token");
		Ok(token)
	}
}

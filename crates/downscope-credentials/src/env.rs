// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Root token from an environment variable or a mounted secret file.

use std::path::PathBuf;

use async_trait::async_trait;
use downscope_common_secret::SecretString;
use tracing::debug;

use crate::error::CredentialError;
use crate::source::CredentialSource;

/// Variable read by [`EnvCredentialSource::default`].
pub const DEFAULT_TOKEN_VAR: &str = "DOWNSCOPE_ROOT_TOKEN";

/// Reads the root token using the `VAR` / `VAR_FILE` convention.
///
/// `VAR_FILE` (a path, as used for Docker and Kubernetes secrets) takes
/// precedence over `VAR`. One trailing line ending (`\n` or `\r\n`) is
/// stripped from file contents. The environment is read on every call, so
/// a rotated secret file is picked up without restarting.
#[derive(Debug, Clone)]
pub struct EnvCredentialSource {
	var: String,
}

impl EnvCredentialSource {
	pub fn new(var: impl Into<String>) -> Self {
		Self { var: var.into() }
	}

	pub fn var(&self) -> &str {
		&self.var
	}

	fn file_var(&self) -> String {
		format!("{}_FILE", self.var)
	}

	async fn load(&self) -> Result<SecretString, CredentialError> {
		let file_var = self.file_var();

		if let Ok(path) = std::env::var(&file_var) {
			if path.is_empty() {
				return Err(CredentialError::EmptyPath { var: file_var });
			}

			let path = PathBuf::from(path);
			debug!(var = %file_var, path = %path.display(), "reading root token from file");
			let content = tokio::fs::read_to_string(&path)
				.await
				.map_err(|source| CredentialError::Io {
					path: path.clone(),
					source,
				})?;

			let token = content
				.strip_suffix("\r\n")
				.or_else(|| content.strip_suffix('\n'))
				.unwrap_or(&content)
				.to_string();
			return Ok(SecretString::new(token));
		}

		match std::env::var(&self.var) {
			Ok(value) => {
				debug!(var = %self.var, "reading root token from environment");
				Ok(SecretString::new(value))
			}
			Err(_) => Err(CredentialError::NotFound(format!(
				"set either {} or {}",
				self.var, file_var
			))),
		}
	}
}

impl Default for EnvCredentialSource {
	fn default() -> Self {
		Self::new(DEFAULT_TOKEN_VAR)
	}
}

#[async_trait]
impl CredentialSource for EnvCredentialSource {
	fn name(&self) -> &'static str {
		"env"
	}

	async fn current_access_token(&self) -> Result<SecretString, CredentialError> {
		let token = self.load().await?;
		if token.is_empty() {
			return Err(CredentialError::EmptyToken {
				source_name: self.name(),
			});
		}
		Ok(token)
	}
}

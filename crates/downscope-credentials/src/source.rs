// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::sync::Arc;

use async_trait::async_trait;
use downscope_common_secret::SecretString;

use crate::error::CredentialError;

/// Produces the current bearer token for the ambient identity.
#[async_trait]
pub trait CredentialSource: Send + Sync {
	/// Short, stable name used in logs and errors.
	fn name(&self) -> &'static str;

	async fn current_access_token(&self) -> Result<SecretString, CredentialError>;
}

#[async_trait]
impl<T> CredentialSource for Arc<T>
where
	T: CredentialSource + ?Sized,
{
	fn name(&self) -> &'static str {
		(**self).name()
	}

	async fn current_access_token(&self) -> Result<SecretString, CredentialError> {
		(**self).current_access_token().await
	}
}

#[async_trait]
impl<T> CredentialSource for Box<T>
where
	T: CredentialSource + ?Sized,
{
	fn name(&self) -> &'static str {
		(**self).name()
	}

	async fn current_access_token(&self) -> Result<SecretString, CredentialError> {
		(**self).current_access_token().await
	}
}

/// Always returns the same token.
#[derive(Debug, Clone)]
pub struct StaticCredentialSource {
	token: SecretString,
}

impl StaticCredentialSource {
	pub fn new(token: impl Into<SecretString>) -> Self {
		Self {
			token: token.into(),
		}
	}
}

#[async_trait]
impl CredentialSource for StaticCredentialSource {
	fn name(&self) -> &'static str {
		"static"
	}

	async fn current_access_token(&self) -> Result<SecretString, CredentialError> {
		if self.token.is_empty() {
			return Err(CredentialError::EmptyToken {
				source_name: self.name(),
			});
		}
		Ok(self.token.clone())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn static_source_returns_its_token() {
		let source = StaticCredentialSource::new("ya29.root");
		let token = source.current_access_token().await.unwrap();
		assert_eq!(token.expose(), "ya29.root");
	}

	#[tokio::test]
	async fn static_source_rejects_blank_token() {
		let source = StaticCredentialSource::new("   ");
		let err = source.current_access_token().await.unwrap_err();
		assert!(matches!(
			err,
			CredentialError::EmptyToken {
				source_name: "static"
			}
		));
	}

	#[tokio::test]
	async fn trait_objects_delegate() {
		let source: Arc<dyn CredentialSource> = Arc::new(StaticCredentialSource::new("shared"));
		assert_eq!(source.name(), "static");
		assert_eq!(source.current_access_token().await.unwrap().expose(), "shared");

		let boxed: Box<dyn CredentialSource> = Box::new(StaticCredentialSource::new("boxed"));
		assert_eq!(boxed.current_access_token().await.unwrap().expose(), "boxed");
	}
}

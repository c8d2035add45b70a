// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Turning an exchange response into a usable token.

use std::time::Duration;

use chrono::{DateTime, Utc};
use downscope_common_secret::SecretString;

/// Token type assumed when the issuer does not name one.
pub const DEFAULT_TOKEN_TYPE: &str = "Bearer";

/// Fields of a successful exchange response.
#[derive(Debug, Clone)]
pub struct ExchangeResult {
	pub access_token: SecretString,
	pub issued_token_type: Option<String>,
	pub token_type: Option<String>,
	pub expires_in: Option<Duration>,
	pub scope: Option<String>,
	/// Local clock reading when the response arrived; expiry is relative to it.
	pub received_at: DateTime<Utc>,
}

/// When a downscoped token stops being valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiry {
	At(DateTime<Utc>),
	/// The issuer sent no `expires_in`.
	Unknown,
}

impl Expiry {
	pub fn at(&self) -> Option<DateTime<Utc>> {
		match self {
			Expiry::At(at) => Some(*at),
			Expiry::Unknown => None,
		}
	}

	pub fn is_known(&self) -> bool {
		matches!(self, Expiry::At(_))
	}
}

/// A downscoped bearer token.
///
/// `Debug` redacts the token; use [`access_token`](Self::access_token) and
/// [`SecretString::expose`] to read it.
#[derive(Debug, Clone)]
pub struct DownscopedToken {
	access_token: SecretString,
	token_type: String,
	expiry: Expiry,
	issued_token_type: Option<String>,
	scopes: Vec<String>,
}

impl DownscopedToken {
	pub fn access_token(&self) -> &SecretString {
		&self.access_token
	}

	pub fn token_type(&self) -> &str {
		&self.token_type
	}

	pub fn expiry(&self) -> Expiry {
		self.expiry
	}

	pub fn issued_token_type(&self) -> Option<&str> {
		self.issued_token_type.as_deref()
	}

	pub fn scopes(&self) -> &[String] {
		&self.scopes
	}

	/// True once `now` is within `leeway` of expiry. A token with unknown
	/// expiry is always stale, so callers re-exchange rather than cache it.
	pub fn is_stale(&self, now: DateTime<Utc>, leeway: Duration) -> bool {
		let Expiry::At(at) = self.expiry else {
			return true;
		};
		chrono::Duration::from_std(leeway)
			.ok()
			.and_then(|leeway| now.checked_add_signed(leeway))
			.map_or(true, |deadline| deadline >= at)
	}

	/// `"<token_type> <access_token>"`, ready for an `Authorization` header.
	pub fn authorization_header(&self) -> SecretString {
		SecretString::new(format!("{} {}", self.token_type, self.access_token.expose()))
	}

	pub fn into_access_token(self) -> SecretString {
		self.access_token
	}
}

impl From<ExchangeResult> for DownscopedToken {
	fn from(result: ExchangeResult) -> Self {
		assemble(result)
	}
}

/// Builds the caller-facing token. Expiry is `received_at + expires_in`;
/// a missing or unrepresentable `expires_in` gives [`Expiry::Unknown`].
pub fn assemble(result: ExchangeResult) -> DownscopedToken {
	let token_type = result
		.token_type
		.filter(|t| !t.trim().is_empty())
		.unwrap_or_else(|| DEFAULT_TOKEN_TYPE.to_string());

	let expiry = result
		.expires_in
		.and_then(|d| chrono::Duration::from_std(d).ok())
		.and_then(|d| result.received_at.checked_add_signed(d))
		.map_or(Expiry::Unknown, Expiry::At);

	let scopes = result
		.scope
		.as_deref()
		.map(|s| s.split_whitespace().map(str::to_string).collect())
		.unwrap_or_default();

	DownscopedToken {
		access_token: result.access_token,
		token_type,
		expiry,
		issued_token_type: result.issued_token_type,
		scopes,
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::TimeZone;

	fn received_at() -> DateTime<Utc> {
		Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
	}

	fn result() -> ExchangeResult {
		ExchangeResult {
			access_token: SecretString::new("ya29.downscoped".to_string()),
			issued_token_type: None,
			token_type: None,
			expires_in: None,
			scope: None,
			received_at: received_at(),
		}
	}

	#[test]
	fn bare_response_is_bearer_with_unknown_expiry() {
		let token = assemble(result());

		assert_eq!(token.access_token().expose(), "ya29.downscoped");
		assert_eq!(token.token_type(), DEFAULT_TOKEN_TYPE);
		assert_eq!(token.expiry(), Expiry::Unknown);
		assert!(token.scopes().is_empty());
		assert!(token.issued_token_type().is_none());
	}

	#[test]
	fn expiry_is_relative_to_receipt() {
		let token = assemble(ExchangeResult {
			expires_in: Some(Duration::from_secs(3599)),
			..result()
		});

		let expected = received_at() + chrono::Duration::seconds(3599);
		assert_eq!(token.expiry(), Expiry::At(expected));
		assert_eq!(token.expiry().at(), Some(expected));
	}

	#[test]
	fn issuer_token_type_is_kept() {
		let token = assemble(ExchangeResult {
			token_type: Some("N_A".to_string()),
			issued_token_type: Some("urn:ietf:params:oauth:token-type:access_token".to_string()),
			..result()
		});
		assert_eq!(token.token_type(), "N_A");
		assert!(token.issued_token_type().unwrap().ends_with("access_token"));

		let blank = assemble(ExchangeResult {
			token_type: Some("  ".to_string()),
			..result()
		});
		assert_eq!(blank.token_type(), DEFAULT_TOKEN_TYPE);
	}

	#[test]
	fn scope_is_split_on_whitespace() {
		let token = assemble(ExchangeResult {
			scope: Some("https://www.googleapis.com/auth/cloud-platform  openid".to_string()),
			..result()
		});
		assert_eq!(
			token.scopes(),
			["https://www.googleapis.com/auth/cloud-platform", "openid"]
		);
	}

	#[test]
	fn staleness_honours_leeway() {
		let token = assemble(ExchangeResult {
			expires_in: Some(Duration::from_secs(600)),
			..result()
		});
		let leeway = Duration::from_secs(60);

		assert!(!token.is_stale(received_at(), leeway));
		assert!(!token.is_stale(received_at() + chrono::Duration::seconds(539), leeway));
		assert!(token.is_stale(received_at() + chrono::Duration::seconds(540), leeway));
		assert!(token.is_stale(received_at() + chrono::Duration::seconds(900), Duration::ZERO));
	}

	#[test]
	fn out_of_range_leeway_is_stale_not_a_panic() {
		let token = assemble(ExchangeResult {
			expires_in: Some(Duration::from_secs(3600)),
			..result()
		});

		assert!(token.is_stale(received_at(), Duration::from_secs(1_000_000_000_000_000)));
		assert!(token.is_stale(received_at(), Duration::MAX));
	}

	#[test]
	fn unknown_expiry_is_always_stale() {
		let token = assemble(result());
		assert!(token.is_stale(received_at(), Duration::ZERO));
	}

	#[test]
	fn authorization_header_and_debug() {
		let token = assemble(result());
		assert_eq!(token.authorization_header().expose(), "Bearer ya29.downscoped");

		let debug = format!("{token:?}");
		assert!(!debug.contains("ya29.downscoped"));
		assert!(debug.contains("Bearer"));
	}
}

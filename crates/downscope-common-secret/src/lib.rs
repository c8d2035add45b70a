// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Redacting wrapper for credential material.
//!
//! Root tokens, downscoped tokens and `Authorization` header values all pass
//! through [`Secret`]. The wrapper:
//!
//! - prints `[REDACTED]` for both `Debug` and `Display`, so `tracing` fields
//!   written as `%token` or `?token` never leak the value
//! - serializes as `"[REDACTED]"` (deserialization reads the real value)
//! - zeroes its memory on drop
//! - has no `Deref`; callers must go through [`Secret::expose`]
//!
//! ```
//! use downscope_common_secret::SecretString;
//!
//! let token = SecretString::new("ya29.root-token".to_string());
//! assert_eq!(format!("{token}"), "[REDACTED]");
//! assert_eq!(token.expose(), "ya29.root-token");
//! ```

use std::fmt;
use zeroize::Zeroize;

/// Placeholder emitted wherever a secret would otherwise be printed.
pub const REDACTED: &str = "[REDACTED]";

/// Wrapper that keeps a sensitive value out of logs and serialized output.
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct Secret<T>
where
	T: Zeroize,
{
	inner: T,
}

/// The common case: a secret string such as a bearer token.
pub type SecretString = Secret<String>;

impl<T> Secret<T>
where
	T: Zeroize,
{
	pub fn new(inner: T) -> Self {
		Self { inner }
	}

	/// Access the wrapped value.
	///
	/// Every call site that needs the raw value goes through here, which keeps
	/// secret access greppable.
	pub fn expose(&self) -> &T {
		&self.inner
	}

	/// Copy the wrapped value out, leaving the original to be zeroed on drop.
	pub fn into_inner(self) -> T
	where
		T: Clone,
	{
		self.inner.clone()
	}

	/// Apply `f` to the wrapped value, producing a new secret.
	pub fn map<U, F>(&self, f: F) -> Secret<U>
	where
		U: Zeroize,
		F: FnOnce(&T) -> U,
	{
		Secret::new(f(&self.inner))
	}
}

impl SecretString {
	pub fn is_empty(&self) -> bool {
		self.inner.trim().is_empty()
	}
}

impl From<String> for SecretString {
	fn from(value: String) -> Self {
		Self::new(value)
	}
}

impl From<&str> for SecretString {
	fn from(value: &str) -> Self {
		Self::new(value.to_string())
	}
}

impl<T> Clone for Secret<T>
where
	T: Zeroize + Clone,
{
	fn clone(&self) -> Self {
		Self::new(self.inner.clone())
	}
}

impl<T> fmt::Debug for Secret<T>
where
	T: Zeroize,
{
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("Secret").field(&REDACTED).finish()
	}
}

impl<T> fmt::Display for Secret<T>
where
	T: Zeroize,
{
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(REDACTED)
	}
}

impl<T> PartialEq for Secret<T>
where
	T: Zeroize + PartialEq,
{
	fn eq(&self, other: &Self) -> bool {
		self.inner == other.inner
	}
}

impl<T> Eq for Secret<T> where T: Zeroize + Eq {}

#[cfg(feature = "serde")]
mod serde_impl {
	use super::{Secret, REDACTED};
	use serde::{Deserialize, Deserializer, Serialize, Serializer};
	use zeroize::Zeroize;

	impl<T> Serialize for Secret<T>
	where
		T: Zeroize,
	{
		fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
		where
			S: Serializer,
		{
			serializer.serialize_str(REDACTED)
		}
	}

	impl<'de, T> Deserialize<'de> for Secret<T>
	where
		T: Deserialize<'de> + Zeroize,
	{
		fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
		where
			D: Deserializer<'de>,
		{
			T::deserialize(deserializer).map(Secret::new)
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	#[test]
	fn debug_and_display_hide_the_token() {
		let token = SecretString::new("ya29.a0AfH6SMBx".to_string());

		assert_eq!(format!("{token}"), REDACTED);
		let debug = format!("{token:?}");
		assert!(debug.contains(REDACTED));
		assert!(!debug.contains("ya29"));
	}

	#[test]
	fn expose_and_into_inner_return_the_value() {
		let token = SecretString::from("root-token");
		assert_eq!(token.expose(), "root-token");
		assert_eq!(token.into_inner(), "root-token");
	}

	#[test]
	fn map_keeps_the_result_secret() {
		let token = SecretString::from("abc123");
		let header = token.map(|t| format!("Bearer {t}"));

		assert_eq!(header.expose(), "Bearer abc123");
		assert_eq!(format!("{header}"), REDACTED);
	}

	#[test]
	fn blank_strings_are_empty() {
		assert!(SecretString::from("").is_empty());
		assert!(SecretString::from("  \n").is_empty());
		assert!(!SecretString::from("t").is_empty());
	}

	#[test]
	fn equality_uses_the_wrapped_value() {
		assert_eq!(SecretString::from("a"), SecretString::from("a"));
		assert_ne!(SecretString::from("a"), SecretString::from("b"));
	}

	#[test]
	fn option_of_secret_is_redacted() {
		let token: Option<SecretString> = Some(SecretString::from("ya29.hidden"));
		let debug = format!("{token:?}");
		assert!(!debug.contains("ya29.hidden"));
	}

	#[cfg(feature = "serde")]
	#[test]
	fn serializes_redacted_and_deserializes_real_value() {
		let token = SecretString::from("ya29.serialized");
		let json = serde_json::to_string(&token).unwrap();
		assert_eq!(json, format!("\"{REDACTED}\""));

		let parsed: SecretString = serde_json::from_str("\"ya29.parsed\"").unwrap();
		assert_eq!(parsed.expose(), "ya29.parsed");
	}

	proptest! {
		#[test]
		fn formatting_never_contains_the_value(inner in "[a-zA-Z0-9._-]{4,64}") {
			prop_assume!(!REDACTED.contains(&inner));
			prop_assume!(!"Secret".contains(&inner));

			let secret = SecretString::new(inner.clone());
			let displayed = format!("{}", secret);
			let debugged = format!("{:?}", secret);
			prop_assert!(!displayed.contains(&inner));
			prop_assert!(!debugged.contains(&inner));
		}
	}
}

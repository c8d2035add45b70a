// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Root credential sources.
//!
//! A [`CredentialSource`] produces the bearer token presented as the
//! `subject_token` of a downscoping exchange. Which ambient mechanism backs
//! it (a fixed token, an environment variable or mounted secret file, Google
//! Application Default Credentials) is the caller's choice; the exchange only
//! sees the trait.

mod env;
mod error;
mod fallback;
#[cfg(feature = "gcp")]
mod gcp;
mod source;

pub use env::EnvCredentialSource;
pub use error::CredentialError;
pub use fallback::FallbackCredentialSource;
#[cfg(feature = "gcp")]
pub use gcp::{GcpCredentialSource, CLOUD_PLATFORM_SCOPE};
pub use source::{CredentialSource, StaticCredentialSource};

pub use downscope_common_secret::SecretString;

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Shared HTTP utilities for downscope.
//!
//! This crate provides:
//! - A `reqwest` client builder carrying the downscope User-Agent
//! - An opt-in retry helper with exponential backoff. Nothing in the
//!   exchange path retries on its own; callers wrap calls in [`retry`] when
//!   they want transient failures retried.

mod client;
mod retry;

pub use client::{builder, builder_with_user_agent, user_agent};
pub use retry::{is_retryable_status, retry, RetryConfig, RetryableError};

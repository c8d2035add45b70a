// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Caller-side retry with exponential backoff.

use reqwest::StatusCode;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Backoff policy for [`retry`].
#[derive(Debug, Clone)]
pub struct RetryConfig {
	pub max_attempts: u32,
	pub base_delay: Duration,
	pub max_delay: Duration,
	pub backoff_factor: f64,
	pub jitter: bool,
}

impl Default for RetryConfig {
	fn default() -> Self {
		Self {
			max_attempts: 3,
			base_delay: Duration::from_millis(200),
			max_delay: Duration::from_secs(5),
			backoff_factor: 2.0,
			jitter: true,
		}
	}
}

/// Classifies an error as transient (worth retrying) or permanent.
pub trait RetryableError {
	fn is_retryable(&self) -> bool;
}

/// 408, 429 and 5xx are transient; every other status is permanent.
pub fn is_retryable_status(status: StatusCode) -> bool {
	status == StatusCode::REQUEST_TIMEOUT
		|| status == StatusCode::TOO_MANY_REQUESTS
		|| status.is_server_error()
}

impl RetryableError for reqwest::Error {
	fn is_retryable(&self) -> bool {
		if self.is_timeout() || self.is_connect() {
			return true;
		}
		self.status().map(is_retryable_status).unwrap_or(false)
	}
}

impl RetryConfig {
	/// Delay before retry number `retry` (zero-based).
	///
	/// Grows from `base_delay` by `backoff_factor` and never exceeds
	/// `max_delay`. A factor below 1.0, or one that is not finite, counts as
	/// 1.0. With jitter the delay is drawn from the upper half of that range,
	/// so the cap still holds.
	pub fn delay_for(&self, retry: u32) -> Duration {
		let factor = if self.backoff_factor.is_finite() {
			self.backoff_factor.max(1.0)
		} else {
			1.0
		};
		let cap = self.max_delay.as_secs_f64();
		let grown = self.base_delay.as_secs_f64() * factor.powi(retry.min(i32::MAX as u32) as i32);
		let delay = if grown.is_finite() { grown.min(cap) } else { cap };

		let delay = if self.jitter {
			delay * (0.5 + 0.5 * fastrand::f64())
		} else {
			delay
		};

		Duration::from_secs_f64(delay)
	}
}

/// Calls `f` until it succeeds, fails permanently, or `max_attempts` calls
/// have been made (a budget of zero still makes one call). Every call is a
/// fresh request.
pub async fn retry<F, Fut, T, E>(cfg: &RetryConfig, mut f: F) -> Result<T, E>
where
	F: FnMut() -> Fut,
	Fut: Future<Output = Result<T, E>>,
	E: RetryableError + std::fmt::Display,
{
	let budget = cfg.max_attempts.max(1);
	let mut attempt = 1;

	loop {
		match f().await {
			Ok(value) => return Ok(value),
			Err(err) if !err.is_retryable() => {
				warn!(error = %err, attempt, "permanent error, not retrying");
				return Err(err);
			}
			Err(err) if attempt >= budget => {
				warn!(error = %err, attempt, budget, "retry budget spent");
				return Err(err);
			}
			Err(err) => {
				let delay = cfg.delay_for(attempt - 1);
				warn!(
					error = %err,
					attempt,
					budget,
					delay_ms = delay.as_millis() as u64,
					"transient error, retrying"
				);
				tokio::time::sleep(delay).await;
				attempt += 1;
			}
		}
	}
}

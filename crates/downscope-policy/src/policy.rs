// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use serde::{Deserialize, Serialize};

use crate::error::PolicyError;
use crate::rule::AccessBoundaryRule;

/// Ordered, non-empty list of rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessBoundary {
	access_boundary_rules: Vec<AccessBoundaryRule>,
}

impl AccessBoundary {
	pub fn rules(&self) -> &[AccessBoundaryRule] {
		&self.access_boundary_rules
	}
}

/// A validated access boundary, ready to be sent as the `options` field of a
/// token-exchange request.
///
/// The only ways to obtain a `Policy` are [`Policy::new`], [`build_policy`]
/// and deserialization, all of which validate every rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "UncheckedPolicy")]
pub struct Policy {
	access_boundary: AccessBoundary,
}

impl Policy {
	/// Validates `rules` and wraps them in a policy.
	///
	/// Fails on the first invalid rule, naming its index and field.
	pub fn new(rules: Vec<AccessBoundaryRule>) -> Result<Self, PolicyError> {
		if rules.is_empty() {
			return Err(PolicyError::NoRules);
		}
		for (index, rule) in rules.iter().enumerate() {
			rule.validate(index)?;
		}

		Ok(Self {
			access_boundary: AccessBoundary {
				access_boundary_rules: rules,
			},
		})
	}

	pub fn access_boundary(&self) -> &AccessBoundary {
		&self.access_boundary
	}

	pub fn rules(&self) -> &[AccessBoundaryRule] {
		self.access_boundary.rules()
	}

	pub fn rule_count(&self) -> usize {
		self.access_boundary.access_boundary_rules.len()
	}

	/// Canonical JSON form used as the exchange request's `options` value.
	pub fn to_json(&self) -> Result<String, PolicyError> {
		Ok(serde_json::to_string(self)?)
	}
}

/// Validates `rules` into a [`Policy`]. Equivalent to [`Policy::new`].
pub fn build_policy(rules: Vec<AccessBoundaryRule>) -> Result<Policy, PolicyError> {
	Policy::new(rules)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UncheckedPolicy {
	access_boundary: UncheckedBoundary,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UncheckedBoundary {
	#[serde(default)]
	access_boundary_rules: Vec<AccessBoundaryRule>,
}

impl TryFrom<UncheckedPolicy> for Policy {
	type Error = PolicyError;

	fn try_from(value: UncheckedPolicy) -> Result<Self, Self::Error> {
		Policy::new(value.access_boundary.access_boundary_rules)
	}
}

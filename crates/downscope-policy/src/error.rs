// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use thiserror::Error;

/// Reasons a set of rules cannot become a [`Policy`](crate::Policy).
///
/// Indexes are zero-based positions in the caller's rule list.
#[derive(Debug, Error)]
pub enum PolicyError {
	#[error("access boundary must contain at least one rule")]
	NoRules,

	#[error("rule {index}: availableResource must not be empty")]
	EmptyResource { index: usize },

	#[error("rule {index}: availablePermissions must not be empty")]
	EmptyPermissions { index: usize },

	#[error("rule {index}: availablePermissions[{position}] must not be blank")]
	BlankPermission { index: usize, position: usize },

	#[error("rule {index}: availabilityCondition.expression must not be empty")]
	EmptyConditionExpression { index: usize },

	#[error("failed to encode policy: {0}")]
	Encode(#[from] serde_json::Error),
}

impl PolicyError {
	/// Index of the offending rule, when the error is about a single rule.
	pub fn rule_index(&self) -> Option<usize> {
		match self {
			PolicyError::EmptyResource { index }
			| PolicyError::EmptyPermissions { index }
			| PolicyError::BlankPermission { index, .. }
			| PolicyError::EmptyConditionExpression { index } => Some(*index),
			PolicyError::NoRules | PolicyError::Encode(_) => None,
		}
	}

	/// Wire name of the field that failed validation.
	pub fn field(&self) -> Option<&'static str> {
		match self {
			PolicyError::NoRules => Some("accessBoundaryRules"),
			PolicyError::EmptyResource { .. } => Some("availableResource"),
			PolicyError::EmptyPermissions { .. } | PolicyError::BlankPermission { .. } => {
				Some("availablePermissions")
			}
			PolicyError::EmptyConditionExpression { .. } => Some("availabilityCondition.expression"),
			PolicyError::Encode(_) => None,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn messages_name_rule_and_field() {
		let err = PolicyError::EmptyPermissions { index: 2 };
		assert_eq!(
			err.to_string(),
			"rule 2: availablePermissions must not be empty"
		);
		assert_eq!(err.rule_index(), Some(2));
		assert_eq!(err.field(), Some("availablePermissions"));
	}

	#[test]
	fn no_rules_has_no_index() {
		let err = PolicyError::NoRules;
		assert_eq!(err.rule_index(), None);
		assert_eq!(err.field(), Some("accessBoundaryRules"));
	}
}

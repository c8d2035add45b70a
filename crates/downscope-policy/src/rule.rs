// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use serde::{Deserialize, Serialize};

use crate::error::PolicyError;

/// One restriction unit of an access boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessBoundaryRule {
	/// Fully-qualified resource name, e.g.
	/// `//storage.googleapis.com/projects/_/buckets/reports`.
	pub available_resource: String,
	/// Upper bound on the permissions usable against the resource, in the
	/// issuer's naming convention (`inRole:roles/storage.objectViewer`).
	pub available_permissions: Vec<String>,
	/// Omitted from the wire form when unset.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub availability_condition: Option<AvailabilityCondition>,
}

impl AccessBoundaryRule {
	pub fn new<R, P, S>(available_resource: R, available_permissions: P) -> Self
	where
		R: Into<String>,
		P: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self {
			available_resource: available_resource.into(),
			available_permissions: available_permissions.into_iter().map(Into::into).collect(),
			availability_condition: None,
		}
	}

	pub fn with_condition(mut self, condition: AvailabilityCondition) -> Self {
		self.availability_condition = Some(condition);
		self
	}

	pub(crate) fn validate(&self, index: usize) -> Result<(), PolicyError> {
		if self.available_resource.trim().is_empty() {
			return Err(PolicyError::EmptyResource { index });
		}
		if self.available_permissions.is_empty() {
			return Err(PolicyError::EmptyPermissions { index });
		}
		if let Some(position) = self
			.available_permissions
			.iter()
			.position(|p| p.trim().is_empty())
		{
			return Err(PolicyError::BlankPermission { index, position });
		}
		if let Some(condition) = &self.availability_condition {
			if condition.expression.trim().is_empty() {
				return Err(PolicyError::EmptyConditionExpression { index });
			}
		}
		Ok(())
	}
}

/// A predicate (CEL in Google's STS) the resource service evaluates against
/// the resource being accessed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityCondition {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub title: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
	pub expression: String,
}

impl AvailabilityCondition {
	pub fn new(expression: impl Into<String>) -> Self {
		Self {
			title: None,
			description: None,
			expression: expression.into(),
		}
	}

	pub fn with_title(mut self, title: impl Into<String>) -> Self {
		self.title = Some(title.into());
		self
	}

	pub fn with_description(mut self, description: impl Into<String>) -> Self {
		self.description = Some(description.into());
		self
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn rule_serializes_with_wire_names() {
		let rule = AccessBoundaryRule::new(
			"//storage.googleapis.com/projects/_/buckets/reports",
			["inRole:roles/storage.objectViewer"],
		);

		assert_eq!(
			serde_json::to_value(&rule).unwrap(),
			json!({
				"availableResource": "//storage.googleapis.com/projects/_/buckets/reports",
				"availablePermissions": ["inRole:roles/storage.objectViewer"]
			})
		);
	}

	#[test]
	fn condition_omits_unset_title_and_description() {
		let rule = AccessBoundaryRule::new("//r", ["inRole:roles/viewer"])
			.with_condition(AvailabilityCondition::new("resource.name.startsWith('a')"));

		assert_eq!(
			serde_json::to_value(&rule).unwrap()["availabilityCondition"],
			json!({ "expression": "resource.name.startsWith('a')" })
		);
	}

	#[test]
	fn condition_carries_title_and_description() {
		let condition = AvailabilityCondition::new("true")
			.with_title("always")
			.with_description("grants unconditionally");

		assert_eq!(
			serde_json::to_value(&condition).unwrap(),
			json!({
				"expression": "true",
				"title": "always",
				"description": "grants unconditionally"
			})
		);
	}

	#[test]
	fn validate_rejects_whitespace_resource() {
		let rule = AccessBoundaryRule::new("  ", ["inRole:roles/viewer"]);
		assert!(matches!(
			rule.validate(3),
			Err(PolicyError::EmptyResource { index: 3 })
		));
	}

	#[test]
	fn validate_rejects_blank_permission_entry() {
		let rule = AccessBoundaryRule::new("//r", ["inRole:roles/viewer", ""]);
		assert!(matches!(
			rule.validate(0),
			Err(PolicyError::BlankPermission {
				index: 0,
				position: 1
			})
		));
	}

	#[test]
	fn validate_rejects_empty_condition_expression() {
		let rule = AccessBoundaryRule::new("//r", ["inRole:roles/viewer"])
			.with_condition(AvailabilityCondition::new("").with_title("broken"));
		assert!(matches!(
			rule.validate(1),
			Err(PolicyError::EmptyConditionExpression { index: 1 })
		));
	}
}

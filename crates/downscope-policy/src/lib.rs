// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Credential access boundary policies.
//!
//! An access boundary narrows what a downscoped token may touch: each
//! [`AccessBoundaryRule`] names one resource, the permissions granted on it,
//! and optionally an [`AvailabilityCondition`] the resource service evaluates
//! at request time. A [`Policy`] wraps a non-empty, validated list of rules
//! and serializes to the JSON the token-exchange service expects in its
//! `options` field:
//!
//! ```json
//! {
//!   "accessBoundary": {
//!     "accessBoundaryRules": [
//!       {
//!         "availableResource": "//storage.googleapis.com/projects/_/buckets/reports",
//!         "availablePermissions": ["inRole:roles/storage.objectViewer"],
//!         "availabilityCondition": {
//!           "title": "obj-prefixes",
//!           "expression": "resource.name.startsWith('projects/_/buckets/reports/objects/2025/')"
//!         }
//!       }
//!     ]
//!   }
//! }
//! ```
//!
//! The boundary is enforced remotely; nothing here checks access.
//!
//! # Example
//!
//! ```
//! use downscope_policy::{AccessBoundaryRule, AvailabilityCondition, Policy};
//!
//! let rule = AccessBoundaryRule::new(
//! 	"//storage.googleapis.com/projects/_/buckets/reports",
//! 	["inRole:roles/storage.objectViewer"],
//! )
//! .with_condition(
//! 	AvailabilityCondition::new("resource.name.startsWith('projects/_/buckets/reports/objects/2025/')")
//! 		.with_title("obj-prefixes"),
//! );
//!
//! let policy = Policy::new(vec![rule]).unwrap();
//! assert!(policy.to_json().unwrap().contains("\"availableResource\""));
//! ```

mod error;
mod policy;
mod rule;

pub use error::PolicyError;
pub use policy::{build_policy, AccessBoundary, Policy};
pub use rule::{AccessBoundaryRule, AvailabilityCondition};

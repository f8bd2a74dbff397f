// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Object metadata shared by every resource the controller touches.
//!
//! Metadata is the upstream `ObjectMeta`; this module adds the namespaced
//! identity key and the naming conventions for managed jobs.

pub use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ObjectMeta, OwnerReference, Time};
use serde::{Deserialize, Serialize};
use std::fmt;

/// API version of `JobFlow` and `JobTemplate`.
pub const FLOW_API_VERSION: &str = "flow.volcano.sh/v1alpha1";
/// API version of the managed `Job` resource.
pub const BATCH_API_VERSION: &str = "batch.volcano.sh/v1alpha1";
/// Group family marker used when matching owner references.
pub const API_GROUP_MARKER: &str = "volcano";

pub const JOB_FLOW_KIND: &str = "JobFlow";
pub const JOB_TEMPLATE_KIND: &str = "JobTemplate";
pub const JOB_KIND: &str = "Job";

/// Annotation linking a job to the template it was materialized from.
/// The value is `{namespace}.{templateName}`.
pub const CREATE_BY_JOB_TEMPLATE: &str = "volcano.sh/createByJobTemplate";

/// Number of dot-separated parts in a valid template linkage value.
pub const TEMPLATE_LINK_PARTS: usize = 2;

/// Namespace + name identity of a namespaced object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectKey {
    pub namespace: String,
    pub name: String,
}

impl ObjectKey {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// Borrowing accessors over [`ObjectMeta`], whose fields are all optional.
pub trait MetaExt {
    /// Object name, empty when unset.
    fn name_str(&self) -> &str;

    /// Object namespace, empty when unset.
    fn namespace_str(&self) -> &str;

    fn key(&self) -> ObjectKey {
        ObjectKey::new(self.namespace_str(), self.name_str())
    }

    /// The owner reference flagged as controller, if any.
    fn controller_ref(&self) -> Option<&OwnerReference>;
}

impl MetaExt for ObjectMeta {
    fn name_str(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }

    fn namespace_str(&self) -> &str {
        self.namespace.as_deref().unwrap_or_default()
    }

    fn controller_ref(&self) -> Option<&OwnerReference> {
        self.owner_references
            .iter()
            .flatten()
            .find(|r| r.controller == Some(true))
    }
}

/// Whether `owner` points at a JobFlow of the volcano API family.
pub fn is_job_flow_ref(owner: &OwnerReference) -> bool {
    owner.kind == JOB_FLOW_KIND && owner.api_version.contains(API_GROUP_MARKER)
}

/// Deterministic name of the job created for `step` of flow `flow_name`.
pub fn managed_job_name(flow_name: &str, step: &str) -> String {
    format!("{flow_name}-{step}")
}

/// Value of the [`CREATE_BY_JOB_TEMPLATE`] annotation for a template.
pub fn template_link(namespace: &str, template: &str) -> String {
    format!("{namespace}.{template}")
}

/// Split a template linkage value back into `(namespace, template)`.
///
/// Returns `None` unless the value has exactly [`TEMPLATE_LINK_PARTS`] parts.
pub fn parse_template_link(link: &str) -> Option<(&str, &str)> {
    let parts: Vec<&str> = link.split('.').collect();
    if parts.len() != TEMPLATE_LINK_PARTS {
        return None;
    }
    Some((parts[0], parts[1]))
}

#[cfg(test)]
#[path = "meta_tests.rs"]
mod tests;

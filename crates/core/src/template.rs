// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! JobTemplate resource: an immutable job blueprint.

use crate::meta::{MetaExt, ObjectKey, ObjectMeta};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobTemplateStatus {
    /// Names of the jobs materialized from this template.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub job_depends_on_list: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobTemplate {
    pub metadata: ObjectMeta,
    /// Job spec copied into every job materialized from this template.
    #[serde(default)]
    pub spec: serde_json::Value,
    #[serde(default)]
    pub status: JobTemplateStatus,
}

impl JobTemplate {
    pub fn key(&self) -> ObjectKey {
        self.metadata.key()
    }
}

crate::macros::namespaced_resource!(
    JobTemplate,
    group: "flow.volcano.sh",
    kind: "JobTemplate",
    plural: "jobtemplates"
);

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Resource descriptors and conversions between domain objects and
//! [`DynamicObject`].
//!
//! The domain types already follow the CRD JSON schema, so conversion is a
//! serde round trip. Going back to the cluster adds `apiVersion` and `kind`.

use crate::adapters::StoreError;
use jobflow_core::meta::{
    BATCH_API_VERSION, FLOW_API_VERSION, JOB_FLOW_KIND, JOB_KIND, JOB_TEMPLATE_KIND,
};
use jobflow_core::{Job, JobFlow, JobTemplate};
use kube::api::{ApiResource, DynamicObject};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// A custom resource the controller reads or writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Resource {
    JobFlow,
    JobTemplate,
    Job,
}

impl Resource {
    pub(crate) fn api_version(self) -> &'static str {
        match self {
            Resource::JobFlow | Resource::JobTemplate => FLOW_API_VERSION,
            Resource::Job => BATCH_API_VERSION,
        }
    }

    pub(crate) fn kind(self) -> &'static str {
        match self {
            Resource::JobFlow => JOB_FLOW_KIND,
            Resource::JobTemplate => JOB_TEMPLATE_KIND,
            Resource::Job => JOB_KIND,
        }
    }

    /// Descriptor for dynamic API access, taken from the typed resource.
    pub(crate) fn api_resource(self) -> ApiResource {
        match self {
            Resource::JobFlow => ApiResource::erase::<JobFlow>(&()),
            Resource::JobTemplate => ApiResource::erase::<JobTemplate>(&()),
            Resource::Job => ApiResource::erase::<Job>(&()),
        }
    }
}

fn invalid(err: serde_json::Error) -> StoreError {
    StoreError::Invalid(err.to_string())
}

/// Decode a dynamic object into a domain type.
pub(crate) fn from_dynamic<T: DeserializeOwned>(obj: DynamicObject) -> Result<T, StoreError> {
    let value = serde_json::to_value(obj).map_err(invalid)?;
    serde_json::from_value(value).map_err(invalid)
}

/// Encode a domain object as a dynamic object of `resource`.
pub(crate) fn to_dynamic<T: Serialize>(
    obj: &T,
    resource: Resource,
) -> Result<DynamicObject, StoreError> {
    let mut value = serde_json::to_value(obj).map_err(invalid)?;
    let kind = resource.kind();
    let Some(map) = value.as_object_mut() else {
        return Err(StoreError::Invalid(format!("{kind} is not a JSON object")));
    };
    map.insert("apiVersion".to_string(), resource.api_version().into());
    map.insert("kind".to_string(), kind.into());
    serde_json::from_value(value).map_err(invalid)
}

/// Request body for a status subresource replace.
pub(crate) fn status_body<T: Serialize>(
    obj: &T,
    resource: Resource,
) -> Result<Vec<u8>, StoreError> {
    let dynamic = to_dynamic(obj, resource)?;
    serde_json::to_vec(&dynamic).map_err(invalid)
}

#[cfg(test)]
#[path = "resources_tests.rs"]
mod tests;

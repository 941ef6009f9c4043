//! Declarative configuration model
//!
//! A [`ConfigurationDocument`] is the desired or observed state of one
//! project's remote configuration: a flat list of parameters plus named
//! groups of parameters, and the revision the remote store last reported.
//!
//! # Invariants
//! - Parameter names are unique within their container (case-sensitive).
//! - The revision (version number + etag) only ever comes from a server
//!   response; it is never computed locally.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single named configurable value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    /// Unique key within the enclosing container
    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Type tag (e.g. "STRING", "BOOLEAN", "NUMBER", "JSON"); passed through unvalidated
    #[serde(default)]
    pub value_type: String,

    #[serde(default)]
    pub default_value: String,
}

impl Parameter {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        value_type: impl Into<String>,
        default_value: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            value_type: value_type.into(),
            default_value: default_value.into(),
        }
    }
}

/// A named collection of parameters.
///
/// The group's name is its key in [`ConfigurationDocument::parameter_groups`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterGroup {
    #[serde(default)]
    pub description: String,

    /// Parameters keyed by name
    #[serde(default)]
    pub parameters: BTreeMap<String, Parameter>,
}

impl ParameterGroup {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            parameters: BTreeMap::new(),
        }
    }

    /// Adds a parameter keyed by its own name, replacing any previous entry
    pub fn with_parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.insert(parameter.name.clone(), parameter);
        self
    }

    /// Parameters in canonical (case-insensitive by name) order
    pub fn ordered_parameters(&self) -> Vec<&Parameter> {
        let mut ordered: Vec<&Parameter> = self.parameters.values().collect();
        ordered.sort_by(|a, b| crate::mapper::canonical_cmp(&a.name, &b.name));
        ordered
    }
}

/// Version number and concurrency token reported by the remote store.
///
/// The two are always set together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Revision {
    pub version_number: String,

    /// Opaque ETag value
    pub concurrency_token: String,
}

/// Read-only informational fields attached on read; never written back
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionMetadata {
    #[serde(default)]
    pub update_time: Option<DateTime<Utc>>,

    /// Email of the account that published the version
    #[serde(default)]
    pub update_user: Option<String>,

    #[serde(default)]
    pub update_origin: String,

    #[serde(default)]
    pub update_type: String,
}

/// Full desired or observed state for one project
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigurationDocument {
    /// Key the host tracks the document under; assigned on first write or import
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub project_id: String,

    /// Canonically ordered (case-insensitive by name) top-level parameters
    #[serde(default)]
    pub parameters: Vec<Parameter>,

    #[serde(default)]
    pub parameter_groups: BTreeMap<String, ParameterGroup>,

    /// Present once the document has been written to or read from the store
    #[serde(default)]
    pub revision: Option<Revision>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_metadata: Option<VersionMetadata>,
}

impl ConfigurationDocument {
    /// Creates an empty, not-yet-live document for a project
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            ..Default::default()
        }
    }

    pub fn with_parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn with_group(mut self, name: impl Into<String>, group: ParameterGroup) -> Self {
        self.parameter_groups.insert(name.into(), group);
        self
    }

    /// True once a server response has assigned a revision
    pub fn is_live(&self) -> bool {
        self.revision.is_some()
    }

    pub fn concurrency_token(&self) -> Option<&str> {
        self.revision.as_ref().map(|r| r.concurrency_token.as_str())
    }

    pub fn version_number(&self) -> Option<&str> {
        self.revision.as_ref().map(|r| r.version_number.as_str())
    }

    /// Looks up a top-level parameter by exact name
    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// Same parameters and groups, ignoring identity, revision and metadata
    pub fn same_content(&self, other: &ConfigurationDocument) -> bool {
        self.parameters == other.parameters && self.parameter_groups == other.parameter_groups
    }
}

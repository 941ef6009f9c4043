//! Remote store JSON shapes
//!
//! The read path and the write path nest parameter groups under different
//! keys (`parameterGroups` on read, `parameter_groups` on write), so each
//! direction has its own type.
//!
//! All maps are `BTreeMap` so encoded payloads are byte-stable.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// `{"value": "..."}` wrapper around a default value
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireValue {
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireParameter {
    #[serde(default)]
    pub default_value: WireValue,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub value_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireParameterGroup {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub parameters: BTreeMap<String, WireParameter>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireUpdateUser {
    #[serde(default)]
    pub email: String,
}

/// Version block returned on every successful read and write
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireVersion {
    #[serde(default)]
    pub version_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_user: Option<WireUpdateUser>,
    #[serde(default)]
    pub update_origin: String,
    #[serde(default)]
    pub update_type: String,
}

/// Body of `GET .../remoteConfig` and of a successful `PUT`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteConfigRead {
    #[serde(default)]
    pub parameters: BTreeMap<String, WireParameter>,
    #[serde(default)]
    pub parameter_groups: BTreeMap<String, WireParameterGroup>,
    #[serde(default)]
    pub version: WireVersion,
}

/// Body of `PUT .../remoteConfig`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteConfigUpdate {
    #[serde(default)]
    pub parameters: BTreeMap<String, WireParameter>,
    #[serde(default)]
    pub parameter_groups: BTreeMap<String, WireParameterGroup>,
}

impl From<RemoteConfigUpdate> for RemoteConfigRead {
    /// What a store would serve back after accepting `update`, minus version info
    fn from(update: RemoteConfigUpdate) -> Self {
        Self {
            parameters: update.parameters,
            parameter_groups: update.parameter_groups,
            version: WireVersion::default(),
        }
    }
}

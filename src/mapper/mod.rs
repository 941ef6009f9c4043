//! State mapper
//!
//! Converts between [`ConfigurationDocument`] and the wire shapes.
//!
//! ## Ordering
//! The wire carries parameters as name-keyed objects, so order is lost on the
//! way out. On the way in, parameters are materialized in canonical order:
//! case-insensitive lexicographic by name, ties kept in key order (stable
//! sort). Reading the same remote state twice therefore yields identical
//! documents.
//!
//! ## Duplicates
//! `to_wire` does not reject duplicate names in the top-level list; the last
//! entry wins.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::model::{ConfigurationDocument, Parameter, ParameterGroup, VersionMetadata};
use crate::wire::{
    RemoteConfigRead, RemoteConfigUpdate, WireParameter, WireParameterGroup, WireValue,
    WireVersion,
};

/// Case-insensitive name comparison used for canonical ordering
pub fn canonical_cmp(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
}

/// Sorts parameters into canonical order in place (stable)
pub fn sort_canonical(parameters: &mut [Parameter]) {
    parameters.sort_by(|a, b| canonical_cmp(&a.name, &b.name));
}

/// Flattens a document into the write payload
pub fn to_wire(doc: &ConfigurationDocument) -> RemoteConfigUpdate {
    RemoteConfigUpdate {
        parameters: parameters_to_wire(doc.parameters.iter()),
        parameter_groups: doc
            .parameter_groups
            .iter()
            .map(|(name, group)| (name.clone(), group_to_wire(group)))
            .collect(),
    }
}

/// Rebuilds a document from a read payload.
///
/// The result has no id and no revision; those come from the response
/// headers and the caller, not from the body.
pub fn from_wire(project_id: &str, read: &RemoteConfigRead) -> ConfigurationDocument {
    let mut parameters: Vec<Parameter> = read
        .parameters
        .iter()
        .map(|(name, wire)| parameter_from_wire(name, wire))
        .collect();
    sort_canonical(&mut parameters);

    let parameter_groups = read
        .parameter_groups
        .iter()
        .map(|(name, wire)| (name.clone(), group_from_wire(wire)))
        .collect();

    ConfigurationDocument {
        id: None,
        project_id: project_id.to_string(),
        parameters,
        parameter_groups,
        revision: None,
        version_metadata: Some(metadata_from_wire(&read.version)),
    }
}

/// Returns a copy of `doc` with its top-level parameters canonically ordered
pub fn canonicalize(doc: &ConfigurationDocument) -> ConfigurationDocument {
    let mut out = doc.clone();
    sort_canonical(&mut out.parameters);
    out
}

fn parameters_to_wire<'a>(
    parameters: impl Iterator<Item = &'a Parameter>,
) -> BTreeMap<String, WireParameter> {
    let mut out = BTreeMap::new();
    for parameter in parameters {
        out.insert(parameter.name.clone(), parameter_to_wire(parameter));
    }
    out
}

fn parameter_to_wire(parameter: &Parameter) -> WireParameter {
    WireParameter {
        default_value: WireValue {
            value: parameter.default_value.clone(),
        },
        description: parameter.description.clone(),
        value_type: parameter.value_type.clone(),
    }
}

// Group members are keyed by their map key, not by Parameter::name.
fn group_to_wire(group: &ParameterGroup) -> WireParameterGroup {
    WireParameterGroup {
        description: group.description.clone(),
        parameters: group
            .parameters
            .iter()
            .map(|(key, parameter)| (key.clone(), parameter_to_wire(parameter)))
            .collect(),
    }
}

fn parameter_from_wire(name: &str, wire: &WireParameter) -> Parameter {
    Parameter {
        name: name.to_string(),
        description: wire.description.clone(),
        value_type: wire.value_type.clone(),
        default_value: wire.default_value.value.clone(),
    }
}

fn group_from_wire(wire: &WireParameterGroup) -> ParameterGroup {
    ParameterGroup {
        description: wire.description.clone(),
        parameters: wire
            .parameters
            .iter()
            .map(|(name, p)| (name.clone(), parameter_from_wire(name, p)))
            .collect(),
    }
}

fn metadata_from_wire(version: &WireVersion) -> VersionMetadata {
    VersionMetadata {
        update_time: version.update_time,
        update_user: version.update_user.as_ref().map(|u| u.email.clone()),
        update_origin: version.update_origin.clone(),
        update_type: version.update_type.clone(),
    }
}

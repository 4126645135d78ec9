//! Typed parameter descriptors and the reader that extracts them from
//! labelled UI entries.
//!
//! A documentation page renders each parameter as a label of the form
//! `"<name> (<location>)"` next to an input. [`read_descriptors`] maps those
//! rows back to [`ParameterDescriptor`] values without touching any UI.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AssemblyError;

/// Where a parameter goes in the assembled request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Query,
    Path,
    Body,
    Header,
}

impl ParameterLocation {
    pub fn as_str(self) -> &'static str {
        match self {
            ParameterLocation::Query => "query",
            ParameterLocation::Path => "path",
            ParameterLocation::Body => "body",
            ParameterLocation::Header => "header",
        }
    }
}

impl fmt::Display for ParameterLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParameterLocation {
    type Err = AssemblyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "query" => Ok(ParameterLocation::Query),
            "path" => Ok(ParameterLocation::Path),
            "body" => Ok(ParameterLocation::Body),
            "header" => Ok(ParameterLocation::Header),
            _ => Err(AssemblyError::UnknownLocation(s.to_string())),
        }
    }
}

/// One parameter value as typed by the user, ready for assembly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterDescriptor {
    pub name: String,
    pub location: ParameterLocation,
    pub value: String,
}

impl ParameterDescriptor {
    pub fn new(name: &str, location: ParameterLocation, value: &str) -> Self {
        Self {
            name: name.to_string(),
            location,
            value: value.to_string(),
        }
    }
}

/// A parameter row as the presentation layer sees it. Either half may be
/// missing when the row is only partially rendered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterEntry {
    pub label: Option<String>,
    pub value: Option<String>,
}

impl ParameterEntry {
    pub fn new(label: &str, value: &str) -> Self {
        Self {
            label: Some(label.to_string()),
            value: Some(value.to_string()),
        }
    }
}

/// Split a `"<name> (<location>)"` label into its name and location.
///
/// The name is the first whitespace-delimited token; the location is the
/// text inside the first parenthesized group.
pub fn parse_label(label: &str) -> Result<(String, ParameterLocation), AssemblyError> {
    let malformed = || AssemblyError::MalformedLabel(label.to_string());

    let name = label.split_whitespace().next().ok_or_else(malformed)?;
    let open = label.find('(').ok_or_else(malformed)?;
    let close = label[open + 1..].find(')').ok_or_else(malformed)? + open + 1;
    // "id(path)" would otherwise yield the name "id(path)".
    if name.contains('(') {
        return Err(malformed());
    }

    let location = label[open + 1..close].parse()?;
    Ok((name.to_string(), location))
}

/// Read descriptors from parameter rows, skipping rows without a label or
/// an input value.
pub fn read_descriptors(entries: &[ParameterEntry]) -> Result<Vec<ParameterDescriptor>, AssemblyError> {
    let mut out = Vec::with_capacity(entries.len());
    for entry in entries {
        let (Some(label), Some(value)) = (&entry.label, &entry.value) else {
            continue;
        };
        let (name, location) = parse_label(label)?;
        out.push(ParameterDescriptor {
            name,
            location,
            value: value.clone(),
        });
    }
    Ok(out)
}

//! Documentation catalog of the paste / short-link service.
//!
//! The catalog is static data describing each endpoint and its parameters.
//! It renders parameter labels in the `"<name> (<location>)"` form that
//! [`crate::descriptor::parse_label`] reads back, and produces the
//! [`EndpointSpec`] a [`crate::console::Console`] is built from.

use serde::Serialize;

use crate::assemble::EndpointSpec;
use crate::descriptor::{ParameterEntry, ParameterLocation};
use crate::http::HttpMethod;

#[derive(Debug, Clone, Serialize)]
pub struct ApiDoc {
    pub title: String,
    pub description: String,
    pub base_url: String,
    pub version: String,
    pub sections: Vec<Section>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Section {
    pub name: String,
    pub description: String,
    pub endpoints: Vec<Endpoint>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Endpoint {
    pub id: String,
    pub method: HttpMethod,
    pub path: String,
    pub description: String,
    pub parameters: Vec<ParameterSpec>,
    pub response_example: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ParameterSpec {
    pub name: String,
    /// Informational type name ("time", "int", "bool", "string").
    pub kind: String,
    pub location: ParameterLocation,
    pub required: bool,
    pub description: String,
    pub default: String,
}

/// Service limits quoted in parameter descriptions and defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogLimits {
    pub default_ttl: String,
    pub max_key_length: u8,
    pub default_key_length: u8,
    pub unprivileged_min_key_length: u8,
    pub privileged_min_key_length: u8,
}

impl Default for CatalogLimits {
    fn default() -> Self {
        Self {
            default_ttl: "720h0m0s".to_string(),
            max_key_length: 20,
            default_key_length: 14,
            unprivileged_min_key_length: 8,
            privileged_min_key_length: 3,
        }
    }
}

impl ParameterSpec {
    fn new(name: &str, kind: &str, location: ParameterLocation, required: bool, description: &str, default: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: kind.to_string(),
            location,
            required,
            description: description.to_string(),
            default: default.to_string(),
        }
    }

    pub fn label(&self) -> String {
        format!("{} ({})", self.name, self.location)
    }
}

impl Endpoint {
    pub fn endpoint_spec(&self, base_url: &str) -> EndpointSpec {
        EndpointSpec::new(base_url, self.method, &self.path)
    }

    /// One parameter row per documented parameter, prefilled with defaults.
    pub fn entries(&self) -> Vec<ParameterEntry> {
        self.parameters
            .iter()
            .map(|p| ParameterEntry::new(&p.label(), &p.default))
            .collect()
    }
}

impl ApiDoc {
    pub fn paste_service(base_url: &str, version: &str, limits: &CatalogLimits, healthcheck_enabled: bool) -> Self {
        let mut sections = vec![main_section(base_url, limits)];
        if healthcheck_enabled {
            sections.push(healthcheck_section(version));
        }
        Self {
            title: "Paste.thek4n.ru API".to_string(),
            description: "This API provides access to all the awesome features of our service.".to_string(),
            base_url: base_url.to_string(),
            version: version.to_string(),
            sections,
        }
    }

    pub fn endpoints(&self) -> impl Iterator<Item = &Endpoint> {
        self.sections.iter().flat_map(|s| s.endpoints.iter())
    }

    pub fn endpoint(&self, id: &str) -> Option<&Endpoint> {
        self.endpoints().find(|e| e.id == id)
    }
}

fn main_section(base_url: &str, limits: &CatalogLimits) -> Section {
    Section {
        name: "Main".to_string(),
        description: "Main operations".to_string(),
        endpoints: vec![
            Endpoint {
                id: "create-record".to_string(),
                method: HttpMethod::Post,
                path: "/".to_string(),
                description: "Save body".to_string(),
                parameters: create_record_parameters(limits),
                response_example: format!("{base_url}/eoVbybwLnlc49q/"),
            },
            Endpoint {
                id: "get-record".to_string(),
                method: HttpMethod::Get,
                path: "/{key}".to_string(),
                description: "Get previously saved body with key. If key was saved as url - you will be redirected."
                    .to_string(),
                parameters: key_path_parameter(),
                response_example: "body".to_string(),
            },
            Endpoint {
                id: "get-record-clicks".to_string(),
                method: HttpMethod::Get,
                path: "/{key}/clicks".to_string(),
                description: "Get clicks count for key.".to_string(),
                parameters: key_path_parameter(),
                response_example: "1".to_string(),
            },
        ],
    }
}

fn healthcheck_section(version: &str) -> Section {
    Section {
        name: "Healthcheck".to_string(),
        description: "Healthcheck operations".to_string(),
        endpoints: vec![Endpoint {
            id: "healthcheck".to_string(),
            method: HttpMethod::Get,
            path: "/health".to_string(),
            description: "Healthcheck service".to_string(),
            parameters: Vec::new(),
            response_example: format!(
                "{{\n\t\"version\": \"{version}\",\n\t\"availability\": true,\n\t\"msg\": \"ok\"\n}}"
            ),
        }],
    }
}

fn create_record_parameters(limits: &CatalogLimits) -> Vec<ParameterSpec> {
    use ParameterLocation::{Body, Query};

    vec![
        ParameterSpec::new(
            "ttl",
            "time",
            Query,
            false,
            "TTL - time to live of created key. Examples 3h, 30m, 60s. Authorized apikeys can set persist key by providing ttl parameter as 0",
            &limits.default_ttl,
        ),
        ParameterSpec::new(
            "disposable",
            "int",
            Query,
            false,
            "After number of this getting of this key, key will be removed",
            "0",
        ),
        ParameterSpec::new(
            "len",
            "int",
            Query,
            false,
            &format!(
                "Length of key to generate. max={}, unprivileged min={}, privileged min={}",
                limits.max_key_length, limits.unprivileged_min_key_length, limits.privileged_min_key_length
            ),
            &limits.default_key_length.to_string(),
        ),
        ParameterSpec::new(
            "url",
            "bool",
            Query,
            false,
            "Is body url. If true after getting this key you will be redirected.",
            "false",
        ),
        ParameterSpec::new("key", "string", Query, false, "You can request custom key", ""),
        ParameterSpec::new("apikey", "string", Query, false, "Apikey to use privileged features", ""),
        ParameterSpec::new("body", "string", Body, true, "Body to cache.", ""),
    ]
}

fn key_path_parameter() -> Vec<ParameterSpec> {
    vec![ParameterSpec::new(
        "key",
        "string",
        ParameterLocation::Path,
        true,
        "Key to request.",
        "",
    )]
}

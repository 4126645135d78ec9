//! Request assembly: endpoint metadata plus user-supplied parameters in, a
//! ready-to-send [`HttpRequest`] out.
//!
//! # Design
//! Assembly is pure. Descriptors are grouped by location, path placeholders
//! are checked against path descriptors in both directions before anything
//! is substituted, and the body is encoded as JSON when it parses as JSON
//! and as plain text otherwise. Problems that do not stop the request
//! (duplicate names, extra bodies) come back as [`AssemblyWarning`]s next to
//! the request instead of failing it.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::descriptor::{ParameterDescriptor, ParameterLocation};
use crate::error::AssemblyError;
use crate::http::{HttpMethod, HttpRequest};

pub const CONTENT_TYPE: &str = "Content-Type";
pub const APPLICATION_JSON: &str = "application/json";
pub const TEXT_PLAIN: &str = "text/plain";

/// Static description of one documented operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointSpec {
    pub base_url: String,
    pub method: HttpMethod,
    /// Path relative to `base_url`, possibly containing `{name}` placeholders.
    pub path_template: String,
}

impl EndpointSpec {
    pub fn new(base_url: &str, method: HttpMethod, path_template: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            method,
            path_template: path_template.to_string(),
        }
    }
}

/// Something odd about the parameters that did not prevent assembly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssemblyWarning {
    /// The same name appeared twice in one location; the last value was used.
    DuplicateParameter { name: String, location: ParameterLocation },
    /// More than one body parameter; only the first was sent.
    MultipleBodies { ignored: usize },
    /// A body parameter was supplied for a method that sends no body.
    BodyIgnored { method: HttpMethod },
    /// The body did not parse as JSON and was sent verbatim.
    PlainTextBody,
}

impl fmt::Display for AssemblyWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssemblyWarning::DuplicateParameter { name, location } => {
                write!(f, "duplicate {location} parameter {name}, using the last value")
            }
            AssemblyWarning::MultipleBodies { ignored } => {
                write!(f, "multiple body parameters, ignoring {ignored} after the first")
            }
            AssemblyWarning::BodyIgnored { method } => {
                write!(f, "{method} requests carry no body, body parameter ignored")
            }
            AssemblyWarning::PlainTextBody => write!(f, "body is not valid JSON, sending it as plain text"),
        }
    }
}

/// The outcome of a successful assembly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assembly {
    pub request: HttpRequest,
    pub warnings: Vec<AssemblyWarning>,
}

/// Name/value pairs of one location, unique by name, in first-seen order.
#[derive(Default)]
struct Group(Vec<(String, String)>);

impl Group {
    /// Returns `true` when an existing value was replaced.
    fn upsert(&mut self, name: &str, value: &str) -> bool {
        match self.0.iter_mut().find(|(k, _)| k == name) {
            Some(slot) => {
                slot.1 = value.to_string();
                true
            }
            None => {
                self.0.push((name.to_string(), value.to_string()));
                false
            }
        }
    }

    fn get(&self, name: &str) -> Option<&str> {
        self.0.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
    }

    fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }
}

/// Build the request for `spec` from `params`.
pub fn assemble(spec: &EndpointSpec, params: &[ParameterDescriptor]) -> Result<Assembly, AssemblyError> {
    if let Some(empty) = params
        .iter()
        .find(|p| p.location == ParameterLocation::Path && p.value.is_empty())
    {
        return Err(AssemblyError::EmptyPathParameter(empty.name.clone()));
    }

    let mut warnings = Vec::new();
    let mut query = Group::default();
    let mut path = Group::default();
    let mut headers = Group::default();
    let mut bodies: Vec<&str> = Vec::new();

    for param in params {
        let group = match param.location {
            ParameterLocation::Query => &mut query,
            ParameterLocation::Path => &mut path,
            ParameterLocation::Header => &mut headers,
            ParameterLocation::Body => {
                bodies.push(&param.value);
                continue;
            }
        };
        if group.upsert(&param.name, &param.value) {
            warnings.push(AssemblyWarning::DuplicateParameter {
                name: param.name.clone(),
                location: param.location,
            });
        }
    }

    let resolved_path = resolve_path(&spec.path_template, &path)?;
    let mut url = join_url(&spec.base_url, &resolved_path);

    if !query.0.is_empty() {
        let query_string = query
            .0
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        url.push(if url.contains('?') { '&' } else { '?' });
        url.push_str(&query_string);
    }

    let content_type_overridden = headers.contains(CONTENT_TYPE);
    let mut request_headers = Group::default();
    request_headers.upsert(CONTENT_TYPE, APPLICATION_JSON);
    for (name, value) in &headers.0 {
        request_headers.upsert(name, value);
    }

    let mut body = None;
    match bodies.split_first() {
        Some((_, _)) if !spec.method.carries_body() => {
            warnings.push(AssemblyWarning::BodyIgnored { method: spec.method });
        }
        Some((first, rest)) => {
            if !rest.is_empty() {
                warnings.push(AssemblyWarning::MultipleBodies { ignored: rest.len() });
            }
            match serde_json::from_str::<serde_json::Value>(first) {
                Ok(value) => body = Some(value.to_string()),
                Err(_) => {
                    body = Some(first.to_string());
                    if !content_type_overridden {
                        request_headers.upsert(CONTENT_TYPE, TEXT_PLAIN);
                    }
                    warnings.push(AssemblyWarning::PlainTextBody);
                }
            }
        }
        None => {}
    }

    for warning in &warnings {
        tracing::warn!(method = %spec.method, path = %spec.path_template, "{warning}");
    }

    Ok(Assembly {
        request: HttpRequest {
            method: spec.method,
            url,
            headers: request_headers.0,
            body,
        },
        warnings,
    })
}

/// Placeholder names of a path template, in order, without repeats.
pub fn placeholders(template: &str) -> Result<Vec<String>, AssemblyError> {
    let mut names: Vec<String> = Vec::new();
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        let after = &rest[open + 1..];
        let close = after
            .find('}')
            .ok_or_else(|| AssemblyError::UnresolvedPlaceholder(after.to_string()))?;
        let name = &after[..close];
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
        rest = &after[close + 1..];
    }
    Ok(names)
}

fn resolve_path(template: &str, path: &Group) -> Result<String, AssemblyError> {
    let names = placeholders(template)?;

    if let Some(missing) = names.iter().find(|n| !path.contains(n)) {
        return Err(AssemblyError::UnresolvedPlaceholder(missing.clone()));
    }
    if let Some((unused, _)) = path.0.iter().find(|(k, _)| !names.contains(k)) {
        return Err(AssemblyError::UnusedPathParameter(unused.clone()));
    }

    let mut resolved = template.to_string();
    for (name, value) in &path.0 {
        resolved = resolved.replace(&format!("{{{name}}}"), &urlencoding::encode(value));
    }
    Ok(resolved)
}

/// Append `path` to `base`, keeping any query the base already carries
/// after the path.
fn join_url(base: &str, path: &str) -> String {
    let (base, base_query) = match base.split_once('?') {
        Some((b, q)) => (b, Some(q)),
        None => (base, None),
    };
    let base = if path.starts_with('/') { base.trim_end_matches('/') } else { base };
    match base_query {
        Some(q) => {
            let sep = if path.contains('?') { '&' } else { '?' };
            format!("{base}{path}{sep}{q}")
        }
        None => format!("{base}{path}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ParameterLocation::{Body, Header, Path, Query};

    fn param(name: &str, location: ParameterLocation, value: &str) -> ParameterDescriptor {
        ParameterDescriptor::new(name, location, value)
    }

    fn get(template: &str) -> EndpointSpec {
        EndpointSpec::new("http://api.test", HttpMethod::Get, template)
    }

    fn post(template: &str) -> EndpointSpec {
        EndpointSpec::new("http://api.test", HttpMethod::Post, template)
    }

    #[test]
    fn substitutes_path_parameter() {
        let assembly = assemble(&get("/paste/{id}"), &[param("id", Path, "abc123")]).unwrap();
        assert_eq!(assembly.request.url, "http://api.test/paste/abc123");
        assert_eq!(assembly.request.method, HttpMethod::Get);
        assert!(assembly.request.body.is_none());
        assert!(assembly.warnings.is_empty());
    }

    #[test]
    fn path_values_are_escaped() {
        let assembly = assemble(&get("/paste/{id}"), &[param("id", Path, "a/b c?")]).unwrap();
        assert_eq!(assembly.request.url, "http://api.test/paste/a%2Fb%20c%3F");
        assert!(!assembly.request.url.contains("{id}"));
    }

    #[test]
    fn repeated_placeholder_is_filled_everywhere() {
        let assembly = assemble(&get("/{key}/copy/{key}"), &[param("key", Path, "k")]).unwrap();
        assert_eq!(assembly.request.url, "http://api.test/k/copy/k");
    }

    #[test]
    fn empty_path_parameter_wins_over_other_errors() {
        let params = [
            param("other", Path, "x"),
            param("id", Path, ""),
            param("ttl", Query, "3h"),
        ];
        let err = assemble(&get("/{missing}"), &params).unwrap_err();
        assert_eq!(err, AssemblyError::EmptyPathParameter("id".to_string()));
    }

    #[test]
    fn unresolved_placeholder_is_reported() {
        let err = assemble(&get("/{key}/clicks"), &[]).unwrap_err();
        assert_eq!(err, AssemblyError::UnresolvedPlaceholder("key".to_string()));
    }

    #[test]
    fn unclosed_placeholder_is_unresolved() {
        let err = assemble(&get("/{key"), &[param("key", Path, "a")]).unwrap_err();
        assert_eq!(err, AssemblyError::UnresolvedPlaceholder("key".to_string()));
    }

    #[test]
    fn unused_path_parameter_is_reported() {
        let err = assemble(&get("/health"), &[param("key", Path, "a")]).unwrap_err();
        assert_eq!(err, AssemblyError::UnusedPathParameter("key".to_string()));
    }

    #[test]
    fn query_pairs_are_encoded_once_each() {
        let params = [
            param("ttl", Query, "3h"),
            param("key", Query, "a b&c"),
            param("url", Query, ""),
        ];
        let assembly = assemble(&post("/"), &params).unwrap();
        let (base, query) = assembly.request.url.split_once('?').unwrap();
        assert_eq!(base, "http://api.test/");

        let mut pairs: Vec<&str> = query.split('&').collect();
        pairs.sort_unstable();
        assert_eq!(pairs, vec!["key=a%20b%26c", "ttl=3h", "url="]);
    }

    #[test]
    fn base_url_query_is_kept() {
        let spec = EndpointSpec::new("http://api.test/v1?tenant=a", HttpMethod::Get, "/items");
        let assembly = assemble(&spec, &[param("page", Query, "2")]).unwrap();
        assert_eq!(assembly.request.url, "http://api.test/v1/items?tenant=a&page=2");
    }

    #[test]
    fn template_query_is_kept() {
        let assembly = assemble(&get("/search?q=x"), &[param("page", Query, "2")]).unwrap();
        assert_eq!(assembly.request.url, "http://api.test/search?q=x&page=2");
    }

    #[test]
    fn base_and_template_queries_are_merged() {
        let spec = EndpointSpec::new("http://api.test/v1?tenant=a", HttpMethod::Get, "/search?q=x");
        let assembly = assemble(&spec, &[param("page", Query, "2")]).unwrap();
        assert_eq!(assembly.request.url, "http://api.test/v1/search?q=x&tenant=a&page=2");
        assert_eq!(assembly.request.url.matches('?').count(), 1);
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let spec = EndpointSpec::new("http://api.test/", HttpMethod::Get, "/health");
        let assembly = assemble(&spec, &[]).unwrap();
        assert_eq!(assembly.request.url, "http://api.test/health");
    }

    #[test]
    fn duplicate_query_uses_last_value_and_warns() {
        let params = [param("ttl", Query, "1h"), param("ttl", Query, "2h")];
        let assembly = assemble(&get("/"), &params).unwrap();
        assert_eq!(assembly.request.url, "http://api.test/?ttl=2h");
        assert_eq!(
            assembly.warnings,
            vec![AssemblyWarning::DuplicateParameter {
                name: "ttl".to_string(),
                location: Query,
            }]
        );
    }

    #[test]
    fn headers_default_to_json_and_can_be_overridden() {
        let params = [
            param("X-Api-Key", Header, "secret"),
            param(CONTENT_TYPE, Header, "application/xml"),
        ];
        let assembly = assemble(&get("/"), &params).unwrap();
        assert_eq!(
            assembly.request.headers,
            vec![
                (CONTENT_TYPE.to_string(), "application/xml".to_string()),
                ("X-Api-Key".to_string(), "secret".to_string()),
            ]
        );
    }

    #[test]
    fn header_names_match_case_sensitively() {
        let assembly = assemble(&get("/"), &[param("content-type", Header, "text/csv")]).unwrap();
        assert_eq!(assembly.request.header(CONTENT_TYPE), Some(APPLICATION_JSON));
        assert_eq!(assembly.request.header("content-type"), Some("text/csv"));
    }

    #[test]
    fn json_body_is_reserialized() {
        let assembly = assemble(&post("/"), &[param("body", Body, r#"{ "url" : "http://x.com" }"#)]).unwrap();
        let request = assembly.request;
        assert_eq!(request.body.as_deref(), Some(r#"{"url":"http://x.com"}"#));
        assert_eq!(request.header(CONTENT_TYPE), Some(APPLICATION_JSON));

        let sent: serde_json::Value = serde_json::from_str(request.body.as_deref().unwrap()).unwrap();
        assert_eq!(sent, serde_json::json!({"url": "http://x.com"}));
    }

    #[test]
    fn json_body_keeps_key_order() {
        let assembly = assemble(&post("/"), &[param("body", Body, r#"{"z":1,"a":[true,null]}"#)]).unwrap();
        assert_eq!(assembly.request.body.as_deref(), Some(r#"{"z":1,"a":[true,null]}"#));
    }

    #[test]
    fn plain_body_is_sent_verbatim_as_text() {
        let raw = "https://example.com/some page";
        let assembly = assemble(&post("/"), &[param("body", Body, raw)]).unwrap();
        assert_eq!(assembly.request.body.as_deref(), Some(raw));
        assert_eq!(assembly.request.header(CONTENT_TYPE), Some(TEXT_PLAIN));
        assert_eq!(assembly.warnings, vec![AssemblyWarning::PlainTextBody]);
    }

    #[test]
    fn plain_body_respects_explicit_content_type() {
        let params = [
            param("body", Body, "<a/>"),
            param(CONTENT_TYPE, Header, "application/xml"),
        ];
        let assembly = assemble(&post("/"), &params).unwrap();
        assert_eq!(assembly.request.body.as_deref(), Some("<a/>"));
        assert_eq!(assembly.request.header(CONTENT_TYPE), Some("application/xml"));
    }

    #[test]
    fn body_is_ignored_for_get() {
        let assembly = assemble(&get("/"), &[param("body", Body, "{}")]).unwrap();
        assert!(assembly.request.body.is_none());
        assert_eq!(
            assembly.warnings,
            vec![AssemblyWarning::BodyIgnored { method: HttpMethod::Get }]
        );
    }

    #[test]
    fn first_of_several_bodies_is_used() {
        let spec = EndpointSpec::new("http://api.test", HttpMethod::Patch, "/");
        let params = [param("a", Body, "1"), param("b", Body, "2"), param("c", Body, "3")];
        let assembly = assemble(&spec, &params).unwrap();
        assert_eq!(assembly.request.body.as_deref(), Some("1"));
        assert_eq!(assembly.warnings, vec![AssemblyWarning::MultipleBodies { ignored: 2 }]);
    }

    #[test]
    fn no_body_descriptor_means_no_body() {
        let assembly = assemble(&post("/"), &[param("ttl", Query, "1h")]).unwrap();
        assert!(assembly.request.body.is_none());
        assert_eq!(assembly.request.header(CONTENT_TYPE), Some(APPLICATION_JSON));
    }

    #[test]
    fn placeholders_are_listed_once() {
        assert_eq!(placeholders("/{a}/{b}/{a}").unwrap(), vec!["a", "b"]);
        assert!(placeholders("/plain").unwrap().is_empty());
    }
}

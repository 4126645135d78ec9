//! Executing an assembled request.
//!
//! The console only depends on the [`Transport`] trait; [`UreqTransport`] is
//! the blocking implementation used by the command-line front end and the
//! integration tests. One call is one attempt: no retries and no timeouts
//! beyond the agent's defaults.

use ureq::http::Response;
use ureq::typestate::{WithBody, WithoutBody};
use ureq::{Agent, Body, RequestBuilder};

use crate::error::TransportError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Performs one HTTP round-trip.
///
/// Implementations must return `Ok` for every response that arrived,
/// whatever its status code, and reserve `Err` for requests that never got
/// an answer.
pub trait Transport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Blocking transport backed by a `ureq` agent.
#[derive(Clone)]
pub struct UreqTransport {
    agent: Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        // 4xx/5xx must come back as data so server error bodies can be shown.
        let agent = Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        tracing::debug!(method = %request.method, url = %request.url, "sending request");

        let url = request.url.as_str();
        let result = match request.method {
            HttpMethod::Get => without_body(self.agent.get(url), request),
            HttpMethod::Delete => without_body(self.agent.delete(url), request),
            HttpMethod::Head => without_body(self.agent.head(url), request),
            HttpMethod::Options => without_body(self.agent.options(url), request),
            HttpMethod::Post => with_body(self.agent.post(url), request),
            HttpMethod::Put => with_body(self.agent.put(url), request),
            HttpMethod::Patch => with_body(self.agent.patch(url), request),
        };

        let response = result.map_err(|e| TransportError(e.to_string()))?;
        into_response(response)
    }
}

fn with_headers<B>(mut builder: RequestBuilder<B>, request: &HttpRequest) -> RequestBuilder<B> {
    for (name, value) in &request.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

fn without_body(builder: RequestBuilder<WithoutBody>, request: &HttpRequest) -> Result<Response<Body>, ureq::Error> {
    with_headers(builder, request).call()
}

fn with_body(builder: RequestBuilder<WithBody>, request: &HttpRequest) -> Result<Response<Body>, ureq::Error> {
    let builder = with_headers(builder, request);
    match &request.body {
        Some(body) => builder.send(body.as_bytes()),
        None => builder.send_empty(),
    }
}

fn into_response(mut response: Response<Body>) -> Result<HttpResponse, TransportError> {
    let status = response.status().as_u16();
    let headers = response
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect();
    let bytes = response
        .body_mut()
        .read_to_vec()
        .map_err(|e| TransportError(e.to_string()))?;

    Ok(HttpResponse {
        status,
        headers,
        body: String::from_utf8_lossy(&bytes).into_owned(),
    })
}

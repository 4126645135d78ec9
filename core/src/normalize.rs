//! Turning a raw response into something a person can read.

use crate::error::TransportError;
use crate::http::{ContentKind, HttpResponse};

/// What a console shows for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutcomeView {
    Pending,
    /// The round-trip completed; carries the display text of the body,
    /// whatever the status code was.
    Success(String),
    Failure(String),
}

impl OutcomeView {
    pub fn is_pending(&self) -> bool {
        matches!(self, OutcomeView::Pending)
    }
}

/// Display text for a response. JSON bodies are pretty-printed with
/// two-space indentation; anything that fails to parse is shown verbatim.
/// Top-level JSON scalars are printed as JSON too, so a string keeps its quotes.
pub fn normalize(response: &HttpResponse) -> OutcomeView {
    if response.content_kind() == ContentKind::Json {
        if let Some(pretty) = pretty_json(&response.body) {
            return OutcomeView::Success(pretty);
        }
        tracing::debug!(status = response.status, "JSON response did not parse, showing raw text");
    }
    OutcomeView::Success(response.body.clone())
}

pub fn normalize_result(result: Result<HttpResponse, TransportError>) -> OutcomeView {
    match result {
        Ok(response) => normalize(&response),
        Err(err) => OutcomeView::Failure(err.to_string()),
    }
}

fn pretty_json(text: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(text).ok()?;
    serde_json::to_string_pretty(&value).ok()
}

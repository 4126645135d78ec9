//! Request-construction engine behind an API documentation "try it" console.
//!
//! # Overview
//! Parameter rows labelled `"<name> (<location>)"` are read into typed
//! descriptors, assembled with the endpoint's method and path template into
//! an `HttpRequest`, executed through a `Transport`, and the response is
//! normalized into an `OutcomeView` for display.
//!
//! # Design
//! - Reading, assembly and normalization are pure; the only I/O is the
//!   `Transport` the caller hands in (host-does-IO).
//! - Configuration and network errors end one invocation as a `Failure`
//!   outcome. A 4xx/5xx response is a normal `Success` so server error
//!   bodies stay visible.
//! - Each `Console` owns its view state and applies results
//!   last-invocation-wins.

pub mod assemble;
pub mod console;
pub mod descriptor;
pub mod docs;
pub mod error;
pub mod http;
pub mod normalize;
pub mod transport;

pub use assemble::{assemble, Assembly, AssemblyWarning, EndpointSpec};
pub use console::{Console, ConsoleState, Ticket};
pub use descriptor::{parse_label, read_descriptors, ParameterDescriptor, ParameterEntry, ParameterLocation};
pub use docs::{ApiDoc, CatalogLimits, Endpoint, ParameterSpec, Section};
pub use error::{AssemblyError, TransportError};
pub use http::{ContentKind, HttpMethod, HttpRequest, HttpResponse};
pub use normalize::{normalize, normalize_result, OutcomeView};
pub use transport::{Transport, UreqTransport};

//! Async client core for the Slack Web API.
//!
//! Public API layers:
//! - [`Dispatcher`]: the single choke point every call goes through. It merges
//!   parameters, issues one request per call and settles both the returned
//!   [`PendingCall`] and an optional [`CompletionCallback`] with one outcome.
//! - [`Transport`]/[`HttpTransport`]: the network seam and its `reqwest`
//!   implementation.
//! - [`WebClient`] and [`facets`]: namespaced wrappers over a shared dispatcher.
//! - [`ClientError`]/[`ErrorKind`]: unified error type used by all layers.

mod client;
mod dispatcher;
mod error;
pub mod facets;
mod params;
mod response;
mod transport;

#[cfg(test)]
mod mock_transport;

/// Facet-bearing Web API client.
pub use client::WebClient;
pub use dispatcher::{CompletionCallback, Dispatcher, PendingCall};
/// Error types returned by all client operations.
pub use error::{ClientError, ErrorKind, TransportError};
pub use params::{MethodId, Params, encode, merge, to_params};
pub use response::CallResult;
pub use transport::{HttpTransport, SLACK_API_BASE_URL, Transport};

//! Pipedrive REST API client
//!
//! One `ResourceClient` per resource kind, all sharing the same request
//! building, response normalization, retry and pagination machinery.

pub mod auth;
pub mod client;
pub mod constants;
pub mod pagination;
pub mod pluralization;
pub mod request;
pub mod resilience;
pub mod resource;
pub mod result;
/// In-memory transport used by the test suites
#[doc(hidden)]
pub mod testing;
pub mod transport;

pub use auth::Credentials;
pub use client::ResourceClient;
pub use pagination::{PageSource, Paginator};
pub use request::Params;
pub use resilience::{RequestLogger, RetryConfig, RetryPolicy};
pub use resource::{Capabilities, ResourceKind};
pub use result::ApiResult;
pub use transport::{HttpMethod, HttpRequest, HttpResponse, ReqwestTransport, Transport, TransportError};

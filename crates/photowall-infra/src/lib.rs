//! Photowall Infrastructure Library
//!
//! Shared HTTP middleware (request id, security headers) and tracing setup.

pub mod middleware;
pub mod telemetry;

pub use middleware::{
    request_id_middleware, security_headers_middleware, RequestId, REQUEST_ID_HEADER,
};
pub use telemetry::init_telemetry;

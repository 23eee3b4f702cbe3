//! API constants

/// Where the OpenAPI document is served; the RapiDoc UI at `/docs` loads it from here
pub const OPENAPI_JSON_PATH: &str = "/api/openapi.json";

/// Room for multipart boundaries and text fields on top of `MAX_FILE_SIZE`
pub const BODY_LIMIT_OVERHEAD_BYTES: usize = 1024 * 1024;

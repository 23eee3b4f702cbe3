use std::sync::LazyLock;

use axum::http::header::{self, HeaderName};
use axum::http::HeaderValue;
use axum::{extract::Request, middleware::Next, response::Response};
use photowall_core::is_production_env;

const PERMISSIONS_POLICY: HeaderName = HeaderName::from_static("permissions-policy");

/// RapiDoc on `/docs` loads its script from unpkg.
const CONTENT_SECURITY_POLICY: &str = "default-src 'self'; script-src 'self' https://unpkg.com; \
     style-src 'self' 'unsafe-inline'; img-src 'self' data: https:; font-src 'self' data:; \
     connect-src 'self'";

const BASE_HEADERS: [(HeaderName, &str); 5] = [
    (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
    (header::X_FRAME_OPTIONS, "DENY"),
    (header::REFERRER_POLICY, "strict-origin-when-cross-origin"),
    (header::CONTENT_SECURITY_POLICY, CONTENT_SECURITY_POLICY),
    (PERMISSIONS_POLICY, "geolocation=(), microphone=(), camera=()"),
];

const HSTS: &str = "max-age=31536000; includeSubDomains";

// Production sits behind TLS, so only there is HSTS safe to send.
static SEND_HSTS: LazyLock<bool> = LazyLock::new(is_production_env);

/// Adds the fixed browser hardening headers to every response.
///
/// Headers a handler already set are left alone.
pub async fn security_headers_middleware(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    apply_security_headers(response.headers_mut(), *SEND_HSTS);
    response
}

fn apply_security_headers(headers: &mut axum::http::HeaderMap, hsts: bool) {
    for (name, value) in BASE_HEADERS {
        headers
            .entry(name)
            .or_insert(HeaderValue::from_static(value));
    }
    if hsts {
        headers
            .entry(header::STRICT_TRANSPORT_SECURITY)
            .or_insert(HeaderValue::from_static(HSTS));
    }
}

//! # Request Stamping Middleware
//!
//! Gives every HTTP request an ID for log correlation.
//!
//! An incoming `X-Request-ID` from a proxy is kept; otherwise a uuid v4 is
//! generated. The ID is stored in the request extensions as a
//! [`RequestStamp`] and echoed back in the response header.
//!
//! ```rust,ignore
//! use axum::extract::Extension;
//! use lib_web::middleware::RequestStamp;
//!
//! async fn handler(Extension(stamp): Extension<RequestStamp>) -> String {
//!     format!("Request ID: {}", stamp.id)
//! }
//! ```

use axum::{
    extract::Request,
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest client-supplied request ID we accept.
const MAX_FORWARDED_ID_LEN: usize = 128;

/// Request metadata for tracing and debugging.
#[derive(Clone, Debug)]
pub struct RequestStamp {
    /// Unique request identifier
    pub id: String,
    /// When the request entered the stack
    pub received_at: Instant,
}

impl RequestStamp {
    fn for_request(req: &Request) -> Self {
        let forwarded = req
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|id| !id.is_empty() && id.len() <= MAX_FORWARDED_ID_LEN);

        Self {
            id: forwarded.map_or_else(|| Uuid::new_v4().to_string(), str::to_string),
            received_at: Instant::now(),
        }
    }

    /// ID of a request that went through [`stamp_req`], or `"unknown"`.
    pub fn id_of<B>(req: &axum::http::Request<B>) -> String {
        req.extensions()
            .get::<RequestStamp>()
            .map(|s| s.id.clone())
            .unwrap_or_else(|| "unknown".to_string())
    }
}

/// Request stamping middleware. Must run outside the logging middleware.
pub async fn stamp_req(mut req: Request, next: Next) -> Response {
    let stamp = RequestStamp::for_request(&req);

    req.extensions_mut().insert(stamp.clone());

    let mut res = next.run(req).await;

    if let Ok(header_value) = HeaderValue::from_str(&stamp.id) {
        res.headers_mut().insert(REQUEST_ID_HEADER, header_value);
    }

    res
}

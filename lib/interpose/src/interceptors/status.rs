//! Status rejection interceptors.
//!
//! The network primitive resolves with whatever status the server sent.
//! These interceptors turn selected statuses into [`Error::Http`] failures so
//! that response-error handlers registered before them can react.

use crate::{Error, Interceptor};

/// Interceptor that fails responses whose status matches `predicate`.
///
/// The failure keeps the response body and the request it answered.
pub fn reject_status<P>(predicate: P) -> Interceptor
where
    P: Fn(u16) -> bool + Send + Sync + 'static,
{
    Interceptor::new().map_response(move |response| {
        let status = response.status();
        if !predicate(status) {
            return Ok(response);
        }

        let message = http::StatusCode::from_u16(status)
            .ok()
            .and_then(|code| code.canonical_reason())
            .unwrap_or("unexpected status")
            .to_string();
        let request = response.shared_request().cloned();
        let error = Error::http_with_body(status, message, response.into_body());

        Err(match request {
            Some(request) => error.attach_request(request),
            None => error,
        })
    })
}

/// Interceptor that fails every 4xx and 5xx response.
pub fn reject_errors() -> Interceptor {
    reject_status(|status| status >= 400)
}

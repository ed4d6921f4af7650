//! Interceptors: bundles of optional phase handlers.
//!
//! An [`Interceptor`] has up to four handlers:
//!
//! | Slot | Receives | Returns |
//! |------|----------|---------|
//! | request | [`FetchArgs`] | new [`FetchArgs`] or failure |
//! | request error | [`Error`] | recovered [`FetchArgs`] or failure |
//! | response | [`Response`] | new [`Response`] or failure |
//! | response error | [`Error`] | recovered [`Response`] or failure |
//!
//! A missing slot is transparent: values and failures pass over it unchanged.
//!
//! # Example
//!
//! ```
//! use interpose::{Error, Interceptor};
//!
//! let interceptor = Interceptor::new()
//!     .map_request(|mut args| {
//!         args.set_header("X-Request-Id", "42");
//!         Ok(args)
//!     })
//!     .on_response_error(|error: Error| async move {
//!         tracing::warn!(%error, "fetch failed");
//!         Err(error)
//!     });
//! # let _ = interceptor;
//! ```

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::{Error, FetchArgs, Response, Result};

/// Future returned by an interceptor handler.
pub type HandlerFuture<T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'static>>;

/// Type-erased handler from `I` to a deferred `O`.
pub(crate) type Handler<I, O> = Arc<dyn Fn(I) -> HandlerFuture<O> + Send + Sync>;

fn boxed<I, O, F, Fut>(f: F) -> Handler<I, O>
where
    F: Fn(I) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<O>> + Send + 'static,
{
    Arc::new(move |input| -> HandlerFuture<O> { Box::pin(f(input)) })
}

fn boxed_sync<I, O, F>(f: F) -> Handler<I, O>
where
    I: 'static,
    O: Send + 'static,
    F: Fn(I) -> Result<O> + Send + Sync + 'static,
{
    Arc::new(move |input| -> HandlerFuture<O> { Box::pin(std::future::ready(f(input))) })
}

/// A bundle of optional request/response/error handlers.
///
/// Interceptors have no identity of their own: the [`crate::Registry`] slot
/// holding one is what gets removed on unregistration.
#[derive(Clone, Default)]
pub struct Interceptor {
    request: Option<Handler<FetchArgs, FetchArgs>>,
    request_error: Option<Handler<Error, FetchArgs>>,
    response: Option<Handler<Response, Response>>,
    response_error: Option<Handler<Error, Response>>,
}

impl std::fmt::Debug for Interceptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Interceptor")
            .field("request", &self.request.is_some())
            .field("request_error", &self.request_error.is_some())
            .field("response", &self.response.is_some())
            .field("response_error", &self.response_error.is_some())
            .finish()
    }
}

impl Interceptor {
    /// An interceptor with no handlers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the async request transform.
    #[must_use]
    pub fn on_request<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(FetchArgs) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<FetchArgs>> + Send + 'static,
    {
        self.request = Some(boxed(f));
        self
    }

    /// Set a synchronous request transform.
    #[must_use]
    pub fn map_request<F>(mut self, f: F) -> Self
    where
        F: Fn(FetchArgs) -> Result<FetchArgs> + Send + Sync + 'static,
    {
        self.request = Some(boxed_sync(f));
        self
    }

    /// Set the request-phase error handler.
    ///
    /// Returning `Ok` recovers with new call arguments; returning `Err`
    /// keeps the failure propagating.
    #[must_use]
    pub fn on_request_error<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(Error) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<FetchArgs>> + Send + 'static,
    {
        self.request_error = Some(boxed(f));
        self
    }

    /// Set the async response transform.
    #[must_use]
    pub fn on_response<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(Response) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Response>> + Send + 'static,
    {
        self.response = Some(boxed(f));
        self
    }

    /// Set a synchronous response transform.
    #[must_use]
    pub fn map_response<F>(mut self, f: F) -> Self
    where
        F: Fn(Response) -> Result<Response> + Send + Sync + 'static,
    {
        self.response = Some(boxed_sync(f));
        self
    }

    /// Set the response-phase error handler.
    ///
    /// This also sees failures raised during the request phase by any
    /// interceptor, since those skip the dispatch and enter the response phase
    /// as failures.
    #[must_use]
    pub fn on_response_error<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(Error) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Response>> + Send + 'static,
    {
        self.response_error = Some(boxed(f));
        self
    }

    /// Returns `true` if this interceptor takes part in the request phase.
    #[must_use]
    pub const fn has_request_phase(&self) -> bool {
        self.request.is_some() || self.request_error.is_some()
    }

    /// Returns `true` if this interceptor takes part in the response phase.
    #[must_use]
    pub const fn has_response_phase(&self) -> bool {
        self.response.is_some() || self.response_error.is_some()
    }

    pub(crate) fn request_handlers(
        &self,
    ) -> (
        Option<&Handler<FetchArgs, FetchArgs>>,
        Option<&Handler<Error, FetchArgs>>,
    ) {
        (self.request.as_ref(), self.request_error.as_ref())
    }

    pub(crate) fn response_handlers(
        &self,
    ) -> (
        Option<&Handler<Response, Response>>,
        Option<&Handler<Error, Response>>,
    ) {
        (self.response.as_ref(), self.response_error.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_interceptor_has_no_phase() {
        let interceptor = Interceptor::new();
        assert!(!interceptor.has_request_phase());
        assert!(!interceptor.has_response_phase());
    }

    #[test]
    fn phases_follow_slots() {
        let request_only = Interceptor::new().map_request(Ok);
        assert!(request_only.has_request_phase());
        assert!(!request_only.has_response_phase());

        let error_only =
            Interceptor::new().on_response_error(|error: Error| async move { Err(error) });
        assert!(!error_only.has_request_phase());
        assert!(error_only.has_response_phase());
    }

    #[test]
    fn debug_lists_slots() {
        let interceptor = Interceptor::new().map_response(Ok);
        let debug = format!("{interceptor:?}");
        assert!(debug.contains("response: true"));
        assert!(debug.contains("request: false"));
    }

    #[tokio::test]
    async fn sync_handlers_resolve_immediately() {
        let interceptor = Interceptor::new().map_request(|mut args| {
            args.set_header("X-Seen", "1");
            Ok(args)
        });

        let (handler, _) = interceptor.request_handlers();
        let args = handler.expect("request handler")("https://example.com/".into())
            .await
            .expect("args");

        assert_eq!(args.header("x-seen"), Some("1"));
    }
}

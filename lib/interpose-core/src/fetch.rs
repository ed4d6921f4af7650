//! The network primitive.
//!
//! - [`Fetch`] - a single fetch-style network call
//! - [`fetch_fn`] - adapt an async closure into a [`Fetch`]
//!
//! The interception layer wraps one [`Fetch`] and exposes another with the
//! same signature, so a wrapped primitive can stand in wherever the original
//! was used.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::{FetchArgs, Response, Result};

/// Future returned by [`Fetch::fetch`].
pub type FetchFuture = Pin<Box<dyn Future<Output = Result<Response>> + Send + 'static>>;

/// A fetch-style network call.
///
/// Implementations receive call arguments and resolve to a [`Response`], or
/// fail with an [`crate::Error`]. They are shared behind an `Arc` and may be
/// called concurrently.
pub trait Fetch: Send + Sync {
    /// Perform the call.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be built or the call fails:
    /// - Invalid URL or request
    /// - Network errors
    /// - TLS errors
    /// - Timeouts
    fn fetch(&self, args: FetchArgs) -> FetchFuture;
}

impl<T: Fetch + ?Sized> Fetch for Arc<T> {
    fn fetch(&self, args: FetchArgs) -> FetchFuture {
        (**self).fetch(args)
    }
}

impl<T: Fetch + ?Sized> Fetch for Box<T> {
    fn fetch(&self, args: FetchArgs) -> FetchFuture {
        (**self).fetch(args)
    }
}

/// A [`Fetch`] backed by a closure. Created by [`fetch_fn`].
#[derive(Clone)]
pub struct FetchFn<F> {
    f: F,
}

impl<F> std::fmt::Debug for FetchFn<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchFn").finish_non_exhaustive()
    }
}

/// Adapt an async closure into a [`Fetch`].
///
/// # Example
///
/// ```
/// use std::collections::HashMap;
/// use interpose_core::{Fetch, FetchArgs, Response, fetch_fn};
///
/// let primitive = fetch_fn(|args: FetchArgs| async move {
///     Ok(Response::new(200, HashMap::new(), args.url().to_string()))
/// });
/// # let _ = primitive.fetch("https://example.com/".into());
/// ```
pub fn fetch_fn<F, Fut>(f: F) -> FetchFn<F>
where
    F: Fn(FetchArgs) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Response>> + Send + 'static,
{
    FetchFn { f }
}

impl<F, Fut> Fetch for FetchFn<F>
where
    F: Fn(FetchArgs) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Response>> + Send + 'static,
{
    fn fetch(&self, args: FetchArgs) -> FetchFuture {
        Box::pin((self.f)(args))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[tokio::test]
    async fn fetch_fn_calls_closure() {
        let primitive = fetch_fn(|args: FetchArgs| async move {
            Ok(Response::new(200, HashMap::new(), args.url().to_string()))
        });

        let response = primitive
            .fetch("https://example.com/ping".into())
            .await
            .expect("response");

        assert_eq!(response.text().expect("text"), "https://example.com/ping");
    }

    #[tokio::test]
    async fn arc_dyn_fetch_is_fetch() {
        let primitive: Arc<dyn Fetch> = Arc::new(fetch_fn(|_args: FetchArgs| async {
            Err(crate::Error::connection("offline"))
        }));

        let err = primitive
            .fetch("https://example.com/".into())
            .await
            .expect_err("should fail");

        assert!(err.is_connection());
    }
}

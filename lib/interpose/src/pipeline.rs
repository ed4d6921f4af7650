//! The call pipeline: request phase, dispatch, response phase.
//!
//! For each call the pipeline:
//!
//! 1. snapshots the [`Registry`] into a [`Chain`] (last registered first),
//! 2. folds the call arguments through every request-phase stage,
//! 3. materializes the [`Request`] and invokes the wrapped primitive, unless
//!    the request phase failed,
//! 4. folds the response (or failure) through every response-phase stage.
//!
//! Failures are phase-scoped, not interceptor-scoped: a request handler that
//! fails skips the dispatch, and its failure is offered to every
//! response-error handler of the chain.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::task::{Context, Poll};

use futures_util::FutureExt;
use tower_service::Service;
use tracing::{Instrument, debug, debug_span, trace};

use crate::chain::Chain;
use crate::interceptor::Handler;
use crate::{Error, Fetch, FetchArgs, FetchFuture, Registry, Request, Response, Result};

/// Which half of the call a stage belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
enum Phase {
    #[display("request")]
    Request,
    #[display("response")]
    Response,
}

/// Interceptor pipeline wrapping one network primitive.
///
/// Most users get one through [`crate::attach`]; it can also be built
/// directly around any [`Fetch`].
pub struct Pipeline {
    primitive: Arc<dyn Fetch>,
    registry: Registry,
    bypass: AtomicBool,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("registry", &self.registry)
            .field("bypass", &self.bypass.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    /// Wrap a primitive with an empty registry.
    #[must_use]
    pub fn new(primitive: Arc<dyn Fetch>) -> Self {
        Self::with_registry(primitive, Registry::new())
    }

    /// Wrap a primitive with an existing registry.
    #[must_use]
    pub fn with_registry(primitive: Arc<dyn Fetch>, registry: Registry) -> Self {
        Self {
            primitive,
            registry,
            bypass: AtomicBool::new(false),
        }
    }

    /// The registry consulted at the start of each call.
    #[must_use]
    pub const fn registry(&self) -> &Registry {
        &self.registry
    }

    /// The wrapped primitive.
    #[must_use]
    pub fn primitive(&self) -> &Arc<dyn Fetch> {
        &self.primitive
    }

    /// Stop running interceptors: later calls go straight to the primitive.
    pub(crate) fn bypass(&self) {
        self.bypass.store(true, Ordering::Release);
    }

    /// Returns `true` once the pipeline forwards calls untouched.
    #[must_use]
    pub fn is_bypassed(&self) -> bool {
        self.bypass.load(Ordering::Acquire)
    }

    /// Run one call through the chain.
    ///
    /// The registry is read here, before the returned future is first
    /// polled; registrations made afterwards do not affect this call.
    pub fn call(&self, args: FetchArgs) -> FetchFuture {
        let primitive = Arc::clone(&self.primitive);
        if self.is_bypassed() {
            return primitive.fetch(args);
        }

        let chain = self.registry.chain();
        let span = debug_span!("fetch", url = %args.url(), interceptors = chain.len());
        Box::pin(run(chain, primitive, args).instrument(span))
    }
}

async fn run(chain: Chain, primitive: Arc<dyn Fetch>, args: FetchArgs) -> Result<Response> {
    let prepared = fold(
        Phase::Request,
        chain
            .request_stages()
            .map(crate::Interceptor::request_handlers),
        Ok(args),
    )
    .await;

    let outcome = match prepared {
        Ok(args) => dispatch(primitive, args).await,
        Err(error) => {
            debug!(%error, "request phase failed, skipping dispatch");
            Err(error)
        }
    };

    fold(
        Phase::Response,
        chain
            .response_stages()
            .map(crate::Interceptor::response_handlers),
        outcome,
    )
    .await
}

/// Thread `state` through each stage: the value handler on success, the
/// error handler on failure, pass-through when the slot is empty.
async fn fold<'a, T>(
    phase: Phase,
    stages: impl Iterator<Item = (Option<&'a Handler<T, T>>, Option<&'a Handler<Error, T>>)>,
    mut state: Result<T>,
) -> Result<T>
where
    T: Send + 'static,
{
    for (stage, (on_value, on_error)) in stages.enumerate() {
        state = match state {
            Ok(value) => match on_value {
                Some(handler) => {
                    let result = invoke(phase, handler, value).await;
                    if let Err(error) = &result {
                        debug!(%phase, stage, %error, "handler failed");
                    }
                    result
                }
                None => Ok(value),
            },
            Err(error) => match on_error {
                Some(handler) => {
                    let result = invoke(phase, handler, error).await;
                    if result.is_ok() {
                        debug!(%phase, stage, "failure recovered");
                    }
                    result
                }
                None => Err(error),
            },
        };
    }
    state
}

/// Run a handler, turning a panic into an ordinary failure.
async fn invoke<I, O>(phase: Phase, handler: &Handler<I, O>, input: I) -> Result<O>
where
    I: Send + 'static,
    O: Send + 'static,
{
    let handler = Arc::clone(handler);
    AssertUnwindSafe(async move { handler(input).await })
        .catch_unwind()
        .await
        .unwrap_or_else(|panic| {
            Err(Error::interceptor(format!(
                "{phase} handler panicked: {}",
                panic_message(panic.as_ref())
            )))
        })
}

async fn dispatch(primitive: Arc<dyn Fetch>, args: FetchArgs) -> Result<Response> {
    let request = Request::from_args(args)?;
    let attributed = Arc::new(request.clone());
    let target = format!("{} {}", request.method(), request.url());
    trace!(%target, "dispatching");

    let performed = AssertUnwindSafe(async move { primitive.fetch(request.into()).await })
        .catch_unwind()
        .await
        .unwrap_or_else(|panic| {
            Err(Error::connection(format!(
                "network primitive panicked during {target}: {}",
                panic_message(panic.as_ref())
            )))
        });

    match performed {
        Ok(response) => Ok(response.with_request(attributed)),
        Err(error) => Err(error.attach_request(attributed)),
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    panic
        .downcast_ref::<&str>()
        .map(ToString::to_string)
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

/// A [`Fetch`] that runs every call through a [`Pipeline`].
///
/// This is what [`crate::attach`] installs in place of the original
/// primitive. It is cheap to clone and also usable as a tower [`Service`].
#[derive(Debug, Clone)]
pub struct InterceptedFetch {
    pipeline: Arc<Pipeline>,
}

impl InterceptedFetch {
    /// Wrap a primitive with an empty registry.
    #[must_use]
    pub fn new(primitive: Arc<dyn Fetch>) -> Self {
        Self::from_pipeline(Pipeline::new(primitive))
    }

    /// Use an existing pipeline.
    #[must_use]
    pub fn from_pipeline(pipeline: Pipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }

    /// The pipeline behind this primitive.
    #[must_use]
    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// The registry consulted by this primitive.
    #[must_use]
    pub fn registry(&self) -> &Registry {
        self.pipeline.registry()
    }
}

impl Fetch for InterceptedFetch {
    fn fetch(&self, args: FetchArgs) -> FetchFuture {
        self.pipeline.call(args)
    }
}

impl Service<FetchArgs> for InterceptedFetch {
    type Response = Response;
    type Error = Error;
    type Future = FetchFuture;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, args: FetchArgs) -> Self::Future {
        self.pipeline.call(args)
    }
}

//! Default network primitive backed by hyper-util.
//!
//! [`HyperClient`] is what a host typically puts in its [`crate::FetchSlot`]
//! before attaching interceptors. Tower layers added with
//! [`HyperClientBuilder::layer`] wrap the transport underneath any chain, so
//! they see the materialized [`Request`] rather than call arguments.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use std::task::{Context, Poll};
use std::time::Duration;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::{Client, connect::HttpConnector};
use hyper_util::rt::TokioExecutor;
use tower::Layer;
use tower::util::BoxCloneService;
use tower_service::Service;
use tracing::trace;

use crate::config::{ClientConfig, ClientConfigBuilder};
use crate::connector::https_connector;
use crate::{Error, Fetch, FetchArgs, FetchFuture, Request, Response, Result};

/// Type-erased transport stack, as seen by [`HyperClientBuilder::layer`].
pub type BoxedService = BoxCloneService<Request, Response, Error>;

/// Future returned by the tower [`Service`] implementations.
pub type ServiceFuture = Pin<Box<dyn Future<Output = Result<Response>> + Send + 'static>>;

type Wrap = Box<dyn FnOnce(BoxedService) -> BoxedService + Send + Sync>;

/// [`BoxedService`] is not `Sync`. Each call clones it out of the mutex so the
/// lock is never held across an await.
#[derive(Clone)]
struct SharedService(Arc<Mutex<BoxedService>>);

impl SharedService {
    fn call(&self, request: Request) -> ServiceFuture {
        let mut service = self.0.lock().unwrap_or_else(PoisonError::into_inner).clone();
        Box::pin(async move { service.call(request).await })
    }
}

/// The innermost service: one hyper exchange per request.
#[derive(Clone)]
struct Transport {
    client: Client<HttpsConnector<HttpConnector>, Full<Bytes>>,
    timeout: Duration,
    user_agent: Option<Arc<str>>,
}

impl Transport {
    fn new(config: &ClientConfig) -> Self {
        let client = Client::builder(TokioExecutor::new())
            .pool_max_idle_per_host(config.pool.max_idle_per_host)
            .pool_idle_timeout(config.pool.idle_timeout)
            .build(https_connector(config));

        Self {
            client,
            timeout: config.timeout,
            user_agent: config.user_agent.as_deref().map(Arc::from),
        }
    }

    fn wire_request(&self, request: Request) -> Result<http::Request<Full<Bytes>>> {
        let missing_agent = request.header("User-Agent").is_none();
        let (method, url, headers, body) = request.into_parts();

        let mut wire = http::Request::new(body.map_or_else(Full::default, Full::new));
        *wire.method_mut() = method.into();
        *wire.uri_mut() = url
            .as_str()
            .parse()
            .map_err(|e: http::uri::InvalidUri| Error::invalid_request(e.to_string()))?;

        let map = wire.headers_mut();
        for (name, value) in headers {
            let name = http::HeaderName::try_from(name)
                .map_err(|e| Error::invalid_request(e.to_string()))?;
            let value = http::HeaderValue::try_from(value)
                .map_err(|e| Error::invalid_request(e.to_string()))?;
            map.insert(name, value);
        }
        if let (true, Some(agent)) = (missing_agent, &self.user_agent) {
            let value = http::HeaderValue::from_str(agent)
                .map_err(|e| Error::invalid_request(e.to_string()))?;
            map.insert(http::header::USER_AGENT, value);
        }
        Ok(wire)
    }

    async fn exchange(self, request: Request) -> Result<Response> {
        let wire = self.wire_request(request)?;

        let response = tokio::time::timeout(self.timeout, self.client.request(wire))
            .await
            .map_err(|_elapsed| Error::Timeout)?
            .map_err(classify)?;

        let (parts, body) = response.into_parts();
        let body = body
            .collect()
            .await
            .map_err(|e| Error::connection(e.to_string()))?
            .to_bytes();

        trace!(status = parts.status.as_u16(), bytes = body.len(), "exchange finished");
        Ok(Response::new(parts.status.as_u16(), flatten(&parts.headers), body))
    }
}

impl Service<Request> for Transport {
    type Response = Response;
    type Error = Error;
    type Future = ServiceFuture;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request) -> Self::Future {
        Box::pin(self.clone().exchange(request))
    }
}

/// Headers whose value is not visible ASCII are dropped.
fn flatten(headers: &http::HeaderMap) -> HashMap<String, String> {
    let mut flat = HashMap::with_capacity(headers.keys_len());
    for (name, value) in headers {
        if let Ok(value) = value.to_str() {
            flat.insert(name.as_str().to_owned(), value.to_owned());
        }
    }
    flat
}

/// TLS failures are recognized by a `rustls::Error` anywhere in the source
/// chain; everything else is a connection failure.
#[allow(clippy::needless_pass_by_value)]
fn classify(error: hyper_util::client::legacy::Error) -> Error {
    let message = error.to_string();
    if caused_by_tls(&error) {
        Error::tls(message)
    } else {
        Error::connection(message)
    }
}

fn caused_by_tls(error: &(dyn std::error::Error + 'static)) -> bool {
    let mut cause = Some(error);
    while let Some(current) = cause {
        if current.is::<rustls::Error>() {
            return true;
        }
        // io::Error::source skips the wrapped error itself
        if let Some(io) = current.downcast_ref::<std::io::Error>() {
            if io.get_ref().is_some_and(|inner| inner.is::<rustls::Error>()) {
                return true;
            }
        }
        cause = current.source();
    }
    false
}

/// Network primitive using hyper-util with connection pooling and TLS.
///
/// # Example
///
/// ```ignore
/// use interpose::{Fetch, HyperClient};
///
/// let client = HyperClient::new();
/// let response = client.fetch("https://example.com/".into()).await?;
/// ```
#[derive(Clone)]
pub struct HyperClient {
    service: SharedService,
    config: Arc<ClientConfig>,
}

impl std::fmt::Debug for HyperClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HyperClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl HyperClient {
    /// A client with [`ClientConfig::default`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(ClientConfig::default())
    }

    /// A client with the given settings and no extra layers.
    #[must_use]
    pub fn with_config(config: ClientConfig) -> Self {
        HyperClientBuilder::default().config(config).build()
    }

    /// Configure settings and transport layers.
    #[must_use]
    pub fn builder() -> HyperClientBuilder {
        HyperClientBuilder::default()
    }

    /// Settings in effect.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

impl Default for HyperClient {
    fn default() -> Self {
        Self::new()
    }
}

impl Fetch for HyperClient {
    fn fetch(&self, args: FetchArgs) -> FetchFuture {
        match Request::from_args(args) {
            Ok(request) => self.service.call(request),
            Err(error) => Box::pin(std::future::ready(Err(error))),
        }
    }
}

impl Service<Request> for HyperClient {
    type Response = Response;
    type Error = Error;
    type Future = ServiceFuture;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request) -> Self::Future {
        self.service.call(request)
    }
}

/// Builder for [`HyperClient`].
#[derive(Default)]
pub struct HyperClientBuilder {
    config: ClientConfigBuilder,
    wraps: Vec<Wrap>,
}

impl std::fmt::Debug for HyperClientBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HyperClientBuilder")
            .field("config", &self.config)
            .field("layers", &self.wraps.len())
            .finish()
    }
}

impl HyperClientBuilder {
    /// Replace all settings.
    #[must_use]
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = ClientConfigBuilder::from(config);
        self
    }

    /// See [`ClientConfig::timeout`].
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.timeout(timeout);
        self
    }

    /// See [`ClientConfig::user_agent`].
    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config = self.config.user_agent(user_agent);
        self
    }

    /// Wrap the transport in a tower layer. The first layer added is the
    /// outermost one.
    #[must_use]
    pub fn layer<L>(mut self, layer: L) -> Self
    where
        L: Layer<BoxedService> + Send + Sync + 'static,
        L::Service: Service<Request, Response = Response, Error = Error> + Clone + Send + 'static,
        <L::Service as Service<Request>>::Future: Send,
    {
        self.wraps
            .push(Box::new(move |inner| BoxCloneService::new(layer.layer(inner))));
        self
    }

    /// Build the client.
    #[must_use]
    pub fn build(self) -> HyperClient {
        let config = self.config.build();
        let transport = BoxCloneService::new(Transport::new(&config));
        let service = self.wraps.into_iter().rev().fold(transport, |inner, wrap| wrap(inner));

        HyperClient {
            service: SharedService(Arc::new(Mutex::new(service))),
            config: Arc::new(config),
        }
    }
}

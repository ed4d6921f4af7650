//! Fetch interceptor chain for Rust.
//!
//! Wrap a network primitive so every call runs through an ordered chain of
//! interceptors: request handlers transform the call arguments before
//! dispatch, response handlers transform the outcome after it. Interceptors
//! are registered at runtime and can be removed individually.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use interpose::prelude::*;
//!
//! let slot = Arc::new(FetchSlot::new(HyperClient::new()));
//! let attachment = interpose::attach(&slot);
//!
//! let registration = attachment.register(
//!     Interceptor::new()
//!         .map_request(|mut args| {
//!             args.set_header("Authorization", "Bearer token");
//!             Ok(args)
//!         })
//!         .on_response_error(|error| async move {
//!             tracing::warn!(%error, "call failed");
//!             Err(error)
//!         }),
//! );
//!
//! let response = slot.fetch("https://api.example.com/users").await?;
//!
//! registration.unregister();
//! attachment.detach();
//! ```
//!
//! # Ordering
//!
//! Interceptors run in reverse registration order in both phases: the last
//! one registered sees the call arguments first and the response first.

mod chain;
mod client;
mod config;
mod connector;
mod install;
mod interceptor;
pub mod interceptors;
mod pipeline;
pub mod prelude;
mod registry;

// Chain machinery
pub use chain::Chain;
pub use install::{Attachment, FetchSlot, attach};
pub use interceptor::{HandlerFuture, Interceptor};
pub use pipeline::{InterceptedFetch, Pipeline};
pub use registry::{Registration, Registry};

// Default network primitive
pub use client::{BoxedService, HyperClient, HyperClientBuilder, ServiceFuture};
pub use config::{ClientConfig, ClientConfigBuilder, DEFAULT_USER_AGENT, PoolConfig};

// Re-export tower for transport layer composition
pub use tower;

// Re-export core types
pub use interpose_core::{
    ContentType, Error, Fetch, FetchArgs, FetchFn, FetchFuture, FetchInit, FetchInput, Method,
    Payload, Request, RequestBuilder, Response, Result, decode_json, encode_form, encode_json,
    fetch_fn,
};

// Re-export http types for status codes and headers
pub use interpose_core::{StatusCode, header};

pub use url;

//! Core types for the interpose fetch interceptor chain.
//!
//! This crate provides the values that travel through an interceptor chain
//! and the seam to the network:
//! - [`FetchArgs`], [`FetchInput`] and [`FetchInit`] - call arguments
//! - [`Request`] and [`RequestBuilder`] - materialized HTTP requests
//! - [`Response`] - HTTP response, with a back-reference to its request
//! - [`Fetch`] and [`fetch_fn`] - the network primitive
//! - [`Error`] and [`Result`] - error handling
//! - [`Method`] - HTTP method enum

mod args;
mod body;
mod error;
mod fetch;
mod method;
pub mod prelude;
mod request;
mod response;

pub use args::{FetchArgs, FetchInit, FetchInput};
pub use body::{ContentType, Payload, decode_json, encode_form, encode_json};
pub use error::{Error, Result};
pub use fetch::{Fetch, FetchFn, FetchFuture, fetch_fn};
pub use method::Method;
pub use request::{Request, RequestBuilder};
pub use response::Response;

// Re-export http crate types for status codes and headers
pub use http::{StatusCode, header};

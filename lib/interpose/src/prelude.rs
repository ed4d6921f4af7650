//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types and functions for
//! easy glob importing:
//!
//! ```ignore
//! use interpose::prelude::*;
//! ```

pub use crate::{
    Attachment, ClientConfig, Error, Fetch, FetchArgs, FetchInit, FetchInput, FetchSlot,
    HyperClient, InterceptedFetch, Interceptor, Method, Registration, Registry, Request,
    RequestBuilder, Response, Result, StatusCode, attach, fetch_fn, header,
};
pub use serde::{Deserialize, Serialize};

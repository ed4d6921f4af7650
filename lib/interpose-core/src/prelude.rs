//! Prelude module for convenient imports.
//!
//! ```ignore
//! use interpose_core::prelude::*;
//! ```

pub use crate::{
    Error, Fetch, FetchArgs, FetchInit, FetchInput, Method, Request, RequestBuilder, Response,
    Result, fetch_fn,
};

//! Ready-made interceptors.
//!
//! Each function here returns a plain [`crate::Interceptor`], so they compose
//! with hand-written ones through the same registry. Registration order
//! matters: the last registered interceptor transforms the call arguments
//! first and the response first.
//!
//! # Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `interceptor-basic-auth` | [`basic_auth`] |
//! | `interceptor-metrics` | [`metrics`] |
//!
//! # Available Interceptors
//!
//! - [`bearer_auth`] - Adds `Authorization: Bearer <token>`
//! - [`basic_auth`] - Adds `Authorization: Basic <base64>`
//! - [`default_headers`] - Adds headers the caller did not set
//! - [`logging`] - Logs every phase using `tracing`
//! - [`metrics`] - Records counters with the `metrics` facade
//! - [`reject_status`] / [`reject_errors`] - Turns unwanted statuses into failures
//!
//! # Example
//!
//! ```ignore
//! use interpose::interceptors::{self, LogLevel};
//!
//! let attachment = interpose::attach(&slot);
//! attachment.register(interceptors::reject_errors());
//! attachment.register(interceptors::bearer_auth("my-token"));
//! attachment.register(interceptors::logging(LogLevel::Info));
//! ```

mod auth;
mod headers;
mod logging;
#[cfg(feature = "interceptor-metrics")]
mod metrics;
mod status;

#[cfg(feature = "interceptor-basic-auth")]
pub use auth::basic_auth;
pub use auth::bearer_auth;
pub use headers::default_headers;
pub use logging::{LogLevel, logging};
#[cfg(feature = "interceptor-metrics")]
pub use metrics::metrics;
pub use status::{reject_errors, reject_status};

//! Logging interceptor.
//!
//! Logs every phase of a call using the `tracing` crate. Events land inside
//! the `fetch` span opened by the pipeline, so they carry the call's URL.

use tracing::{debug, info, warn};

use crate::Interceptor;

/// Log level for the logging interceptor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogLevel {
    /// Log at debug level (request/response details).
    Debug,
    /// Log at info level (summary only).
    #[default]
    Info,
}

/// Interceptor that logs outgoing calls, responses and failures.
///
/// It never changes what flows through the chain: failures are logged and
/// passed on untouched.
pub fn logging(level: LogLevel) -> Interceptor {
    Interceptor::new()
        .map_request(move |args| {
            match level {
                LogLevel::Debug => debug!(
                    method = %args.method(),
                    url = args.url(),
                    headers = ?args.init.headers,
                    "sending request"
                ),
                LogLevel::Info => info!(method = %args.method(), url = args.url(), "sending request"),
            }
            Ok(args)
        })
        .on_request_error(|error| async move {
            warn!(%error, "request preparation failed");
            Err(error)
        })
        .map_response(move |response| {
            let status = response.status();
            if response.is_success() {
                match level {
                    LogLevel::Debug => debug!(
                        status,
                        headers = ?response.headers(),
                        bytes = response.body().len(),
                        "request completed"
                    ),
                    LogLevel::Info => info!(status, "request completed"),
                }
            } else {
                warn!(status, "request completed with HTTP error");
            }
            Ok(response)
        })
        .on_response_error(|error| async move {
            warn!(%error, "request failed");
            Err(error)
        })
}

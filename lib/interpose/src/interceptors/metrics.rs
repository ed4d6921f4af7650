//! Metrics interceptor using the metrics crate facade.
//!
//! Records call counters with the `metrics` crate, which allows integration
//! with various backends (Prometheus, `StatsD`, etc.).

use crate::{Error, Interceptor};

const LABEL_METHOD: &str = "method";
const LABEL_STATUS: &str = "status";
const LABEL_KIND: &str = "kind";

const METRIC_REQUESTS_TOTAL: &str = "interpose_requests_total";
const METRIC_RESPONSES_TOTAL: &str = "interpose_responses_total";
const METRIC_FAILURES_TOTAL: &str = "interpose_failures_total";

/// Interceptor that records call metrics.
///
/// Records the following counters:
/// - `interpose_requests_total`: calls entering the chain, labeled by method
/// - `interpose_responses_total`: responses, labeled by status
/// - `interpose_failures_total`: failures reaching this stage, labeled by kind
pub fn metrics() -> Interceptor {
    Interceptor::new()
        .map_request(|args| {
            metrics::counter!(METRIC_REQUESTS_TOTAL, LABEL_METHOD => args.method().as_str())
                .increment(1);
            Ok(args)
        })
        .map_response(|response| {
            metrics::counter!(METRIC_RESPONSES_TOTAL, LABEL_STATUS => response.status().to_string())
                .increment(1);
            Ok(response)
        })
        .on_response_error(|error| async move {
            metrics::counter!(METRIC_FAILURES_TOTAL, LABEL_KIND => failure_kind(&error))
                .increment(1);
            Err(error)
        })
}

fn failure_kind(error: &Error) -> &'static str {
    match error.root() {
        Error::Http { .. } => "http",
        Error::Connection(_) => "connection",
        Error::Tls(_) => "tls",
        Error::Timeout => "timeout",
        Error::InvalidRequest(_) | Error::InvalidUrl(_) => "invalid_request",
        Error::Interceptor(_) => "interceptor",
        _ => "other",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_kinds() {
        assert_eq!(failure_kind(&Error::Timeout), "timeout");
        assert_eq!(failure_kind(&Error::http(503, "unavailable")), "http");
        assert_eq!(failure_kind(&Error::interceptor("nope")), "interceptor");
    }

    #[test]
    fn metrics_takes_part_in_both_phases() {
        let interceptor = metrics();
        assert!(interceptor.has_request_phase());
        assert!(interceptor.has_response_phase());
    }
}

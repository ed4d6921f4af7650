//! Default header interceptor.

use std::sync::Arc;

use crate::Interceptor;

/// Interceptor that adds each header the call arguments do not already carry.
///
/// Names are compared case-insensitively, so a caller-supplied `accept`
/// wins over a default `Accept`.
pub fn default_headers<I, K, V>(headers: I) -> Interceptor
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    let defaults: Arc<[(String, String)]> = headers
        .into_iter()
        .map(|(name, value)| (name.into(), value.into()))
        .collect();

    Interceptor::new().map_request(move |mut args| {
        for (name, value) in defaults.iter() {
            if args.header(name).is_none() {
                args.set_header(name.as_str(), value.as_str());
            }
        }
        Ok(args)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FetchArgs, FetchInit};

    #[tokio::test]
    async fn fills_only_missing_headers() {
        let interceptor = default_headers([("Accept", "application/json"), ("X-Client", "interpose")]);
        let args = FetchArgs::new(
            "https://example.com/",
            FetchInit::new().header("accept", "text/plain"),
        );

        let (handler, _) = interceptor.request_handlers();
        let args = handler.expect("request handler")(args)
            .await
            .expect("args");

        assert_eq!(args.header("Accept"), Some("text/plain"));
        assert_eq!(args.header("x-client"), Some("interpose"));
    }
}

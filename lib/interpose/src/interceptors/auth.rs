//! Authentication interceptors.
//!
//! Both set the `Authorization` header on the call arguments, replacing any
//! value the caller supplied.

use std::sync::Arc;

use crate::Interceptor;

/// Interceptor that adds `Authorization: Bearer <token>` to every call.
pub fn bearer_auth(token: impl Into<String>) -> Interceptor {
    authorization(format!("Bearer {}", token.into()))
}

/// Interceptor that adds `Authorization: Basic <base64(user:pass)>` to every
/// call.
#[cfg(feature = "interceptor-basic-auth")]
pub fn basic_auth(username: impl AsRef<str>, password: impl AsRef<str>) -> Interceptor {
    use base64::Engine;

    let credentials = format!("{}:{}", username.as_ref(), password.as_ref());
    let encoded = base64::engine::general_purpose::STANDARD.encode(credentials);
    authorization(format!("Basic {encoded}"))
}

fn authorization(value: String) -> Interceptor {
    let value: Arc<str> = Arc::from(value);
    Interceptor::new().map_request(move |mut args| {
        args.set_header("Authorization", value.as_ref());
        Ok(args)
    })
}

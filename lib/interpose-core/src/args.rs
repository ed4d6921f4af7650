//! Call arguments for a fetch.
//!
//! A fetch takes a target (a URL or a full [`Request`]) plus optional
//! overrides. Request-phase interceptors receive and return [`FetchArgs`]; the
//! concrete [`Request`] is only materialized once every request transform has
//! run (see [`Request::from_args`]).

use std::collections::HashMap;

use bytes::Bytes;

use crate::request::{find_header, insert_header};
use crate::{Method, Payload, Request, Result};

/// What to fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchInput {
    /// A URL that has not been parsed yet.
    Url(String),
    /// A fully-built request.
    Request(Request),
}

impl FetchInput {
    /// The target URL as a string.
    #[must_use]
    pub fn url(&self) -> &str {
        match self {
            Self::Url(url) => url,
            Self::Request(request) => request.url().as_str(),
        }
    }
}

impl From<&str> for FetchInput {
    fn from(url: &str) -> Self {
        Self::Url(url.to_string())
    }
}

impl From<String> for FetchInput {
    fn from(url: String) -> Self {
        Self::Url(url)
    }
}

impl From<url::Url> for FetchInput {
    fn from(url: url::Url) -> Self {
        Self::Url(url.into())
    }
}

impl From<Request> for FetchInput {
    fn from(request: Request) -> Self {
        Self::Request(request)
    }
}

/// Overrides applied on top of a [`FetchInput`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchInit {
    /// Method override.
    pub method: Option<Method>,
    /// Headers merged over the input's headers.
    pub headers: HashMap<String, String>,
    /// Body override.
    pub body: Option<Bytes>,
}

impl FetchInit {
    /// Empty overrides.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the method.
    #[must_use]
    pub const fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    /// Set a header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        insert_header(&mut self.headers, name.into(), value.into());
        self
    }

    /// Set the body.
    #[must_use]
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Set an encoded body and the matching `Content-Type`, replacing any
    /// `Content-Type` already present in the overrides.
    #[must_use]
    pub fn payload(self, payload: Payload) -> Self {
        self.header("Content-Type", payload.content_type.mime())
            .body(payload.bytes)
    }

    /// Set a JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn json<T: serde::Serialize + ?Sized>(self, value: &T) -> Result<Self> {
        crate::encode_json(value).map(|payload| self.payload(payload))
    }

    /// Set a form-urlencoded body.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn form<T: serde::Serialize + ?Sized>(self, value: &T) -> Result<Self> {
        crate::encode_form(value).map(|payload| self.payload(payload))
    }
}

/// The arguments of one fetch call: target plus overrides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchArgs {
    /// What to fetch.
    pub input: FetchInput,
    /// Overrides.
    pub init: FetchInit,
}

impl FetchArgs {
    /// Build call arguments from a target and overrides.
    #[must_use]
    pub fn new(input: impl Into<FetchInput>, init: FetchInit) -> Self {
        Self {
            input: input.into(),
            init,
        }
    }

    /// The target URL as a string.
    #[must_use]
    pub fn url(&self) -> &str {
        self.input.url()
    }

    /// The effective method: the override if set, else the input's.
    #[must_use]
    pub fn method(&self) -> Method {
        self.init.method.unwrap_or(match &self.input {
            FetchInput::Url(_) => Method::Get,
            FetchInput::Request(request) => request.method(),
        })
    }

    /// The effective value of a header: the override if set, else the input's.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.init.headers, name).or_else(|| match &self.input {
            FetchInput::Url(_) => None,
            FetchInput::Request(request) => request.header(name),
        })
    }

    /// Set a header override.
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        insert_header(&mut self.init.headers, name.into(), value.into());
    }

    /// Consume into (input, init).
    #[must_use]
    pub fn into_parts(self) -> (FetchInput, FetchInit) {
        (self.input, self.init)
    }
}

macro_rules! args_from_input {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for FetchArgs {
                fn from(input: $ty) -> Self {
                    Self::new(input, FetchInit::default())
                }
            }
        )*
    };
}

args_from_input!(&str, String, url::Url, Request, FetchInput);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn args_from_str() {
        let args = FetchArgs::from("https://example.com/");
        assert_eq!(args.url(), "https://example.com/");
        assert_eq!(args.method(), Method::Get);
        assert_eq!(args.init, FetchInit::default());
    }

    #[test]
    fn effective_header_prefers_override() {
        let url = url::Url::parse("https://example.com/").expect("valid URL");
        let request = Request::builder(Method::Put, url)
            .header("Accept", "text/plain")
            .header("X-Trace", "abc")
            .build();
        let mut args = FetchArgs::from(request);
        args.set_header("accept", "application/json");

        assert_eq!(args.method(), Method::Put);
        assert_eq!(args.header("Accept"), Some("application/json"));
        assert_eq!(args.header("x-trace"), Some("abc"));
        assert_eq!(args.header("missing"), None);
    }

    #[test]
    fn json_override_replaces_content_type() {
        let init = FetchInit::new()
            .header("content-type", "text/plain")
            .json(&serde_json::json!({ "id": 7 }))
            .expect("encode");
        let args = FetchArgs::new("https://example.com/items", init.method(Method::Post));

        assert_eq!(args.header("Content-Type"), Some("application/json"));
        assert_eq!(args.init.headers.len(), 1);

        let request = Request::from_args(args).expect("request");
        assert_eq!(request.body().map(AsRef::as_ref), Some(&br#"{"id":7}"#[..]));
    }

    #[test]
    fn form_override_encodes_pairs() {
        let init = FetchInit::new()
            .form(&[("user", "alice"), ("scope", "read write")])
            .expect("encode");

        assert_eq!(
            init.headers.get("Content-Type").map(String::as_str),
            Some("application/x-www-form-urlencoded")
        );
        assert_eq!(
            init.body.as_deref(),
            Some(&b"user=alice&scope=read+write"[..])
        );
    }
}

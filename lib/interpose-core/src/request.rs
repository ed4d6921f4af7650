//! HTTP request building.
//!
//! Use [`Request::builder`] to construct requests with headers, query
//! parameters, and bodies, or [`Request::from_args`] to materialize one from
//! call arguments.
//!
//! # Example
//!
//! ```
//! use interpose_core::{Request, Method};
//!
//! let request = Request::builder(Method::Get, "https://api.example.com".parse().unwrap())
//!     .header("Accept", "application/json")
//!     .query("page", "1")
//!     .build();
//! ```

use std::collections::HashMap;

use bytes::Bytes;

use crate::{FetchArgs, FetchInput, Method, Payload, Result};

/// An HTTP request with method, URL, headers, and optional body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    method: Method,
    url: url::Url,
    headers: HashMap<String, String>,
    body: Option<Bytes>,
}

impl Request {
    /// Creates a new [`RequestBuilder`].
    #[must_use]
    pub fn builder(method: Method, url: url::Url) -> RequestBuilder {
        RequestBuilder::new(method, url)
    }

    /// Materialize a concrete request from call arguments.
    ///
    /// The init overrides are applied on top of the input: its method replaces
    /// the input method, its headers are merged over the input headers, and
    /// its body replaces the input body.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidUrl`] if the input URL does not parse,
    /// or [`crate::Error::InvalidRequest`] if a body is set on a `GET`/`HEAD`
    /// request.
    pub fn from_args(args: FetchArgs) -> Result<Self> {
        let (input, init) = args.into_parts();
        let mut request = match input {
            FetchInput::Url(url) => Self::builder(Method::Get, url::Url::parse(&url)?).build(),
            FetchInput::Request(request) => request,
        };

        if let Some(method) = init.method {
            request.method = method;
        }
        for (name, value) in init.headers {
            insert_header(&mut request.headers, name, value);
        }
        if let Some(body) = init.body {
            request.body = Some(body);
        }

        if request.body.is_some() && !request.method.allows_body() {
            return Err(crate::Error::invalid_request(format!(
                "{} request cannot have a body",
                request.method
            )));
        }

        Ok(request)
    }

    /// HTTP method.
    #[must_use]
    pub const fn method(&self) -> Method {
        self.method
    }

    /// Request URL.
    #[must_use]
    pub fn url(&self) -> &url::Url {
        &self.url
    }

    /// Request headers.
    #[must_use]
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Mutable access to headers.
    #[must_use]
    pub fn headers_mut(&mut self) -> &mut HashMap<String, String> {
        &mut self.headers
    }

    /// Single header value by name, compared case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// Request body.
    #[must_use]
    pub const fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    /// Consume into (method, url, headers, body).
    #[must_use]
    pub fn into_parts(self) -> (Method, url::Url, HashMap<String, String>, Option<Bytes>) {
        (self.method, self.url, self.headers, self.body)
    }
}

/// Builder for constructing [`Request`] instances.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    method: Method,
    url: url::Url,
    headers: HashMap<String, String>,
    body: Option<Bytes>,
}

impl RequestBuilder {
    /// Creates a new builder.
    #[must_use]
    pub fn new(method: Method, url: url::Url) -> Self {
        Self {
            method,
            url,
            headers: HashMap::new(),
            body: None,
        }
    }

    /// Sets a header, replacing any header with the same name.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        insert_header(&mut self.headers, name.into(), value.into());
        self
    }

    /// Sets multiple headers.
    #[must_use]
    pub fn headers(mut self, headers: impl IntoIterator<Item = (String, String)>) -> Self {
        for (name, value) in headers {
            insert_header(&mut self.headers, name, value);
        }
        self
    }

    /// Appends a query parameter to the URL.
    #[must_use]
    pub fn query(mut self, name: &str, value: &str) -> Self {
        self.url.query_pairs_mut().append_pair(name, value);
        self
    }

    /// Sets the request body.
    #[must_use]
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
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

    /// Set an encoded body along with its `Content-Type`.
    #[must_use]
    pub fn payload(self, payload: Payload) -> Self {
        self.header("Content-Type", payload.content_type.mime())
            .body(payload.bytes)
    }

    /// Builds the [`Request`].
    #[must_use]
    pub fn build(self) -> Request {
        Request {
            method: self.method,
            url: self.url,
            headers: self.headers,
            body: self.body,
        }
    }
}

pub(crate) fn find_header<'a>(headers: &'a HashMap<String, String>, name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

/// Header names are case-insensitive: a new value evicts every spelling of
/// the same name.
pub(crate) fn insert_header(headers: &mut HashMap<String, String>, name: String, value: String) {
    headers.retain(|key, _| !key.eq_ignore_ascii_case(&name));
    headers.insert(name, value);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FetchInit;

    #[test]
    fn request_builder_basic() {
        let url = url::Url::parse("https://api.example.com/users").expect("valid URL");
        let request = Request::builder(Method::Get, url)
            .header("Accept", "application/json")
            .build();

        assert_eq!(request.method(), Method::Get);
        assert_eq!(request.url().as_str(), "https://api.example.com/users");
        assert_eq!(request.header("accept"), Some("application/json"));
        assert!(request.body().is_none());
    }

    #[test]
    fn request_builder_with_query() {
        let url = url::Url::parse("https://api.example.com/users").expect("valid URL");
        let request = Request::builder(Method::Get, url)
            .query("page", "1")
            .query("limit", "10")
            .build();

        assert_eq!(
            request.url().as_str(),
            "https://api.example.com/users?page=1&limit=10"
        );
    }

    #[test]
    fn header_replacement_is_case_insensitive() {
        let url = url::Url::parse("https://api.example.com/").expect("valid URL");
        let request = Request::builder(Method::Get, url)
            .header("X-Token", "a")
            .header("x-token", "b")
            .build();

        assert_eq!(request.headers().len(), 1);
        assert_eq!(request.header("X-TOKEN"), Some("b"));
    }

    #[test]
    fn from_args_with_bare_url() {
        let request = Request::from_args(FetchArgs::from("https://example.com/a")).expect("request");

        assert_eq!(request.method(), Method::Get);
        assert_eq!(request.url().as_str(), "https://example.com/a");
    }

    #[test]
    fn from_args_applies_init_over_request() {
        let url = url::Url::parse("https://example.com/items").expect("valid URL");
        let base = Request::builder(Method::Get, url)
            .header("Accept", "text/plain")
            .header("X-Keep", "yes")
            .build();

        let init = FetchInit::new()
            .method(Method::Post)
            .header("accept", "application/json")
            .body("{}");
        let request = Request::from_args(FetchArgs::new(base, init)).expect("request");

        assert_eq!(request.method(), Method::Post);
        assert_eq!(request.header("Accept"), Some("application/json"));
        assert_eq!(request.header("X-Keep"), Some("yes"));
        assert_eq!(request.body().map(Bytes::as_ref), Some(&b"{}"[..]));
    }

    #[test]
    fn from_args_rejects_bad_url() {
        let err = Request::from_args(FetchArgs::from("not a url")).expect_err("should fail");
        assert!(matches!(err, crate::Error::InvalidUrl(_)));
    }

    #[test]
    fn from_args_rejects_body_on_get() {
        let args = FetchArgs::new("https://example.com/", FetchInit::new().body("payload"));
        let err = Request::from_args(args).expect_err("should fail");
        assert!(matches!(err, crate::Error::InvalidRequest(_)));
    }
}

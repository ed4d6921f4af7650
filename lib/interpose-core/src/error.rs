//! Error types for interpose.
//!
//! Every failure that can travel through an interceptor chain is an [`Error`].
//! Failures raised by the network primitive are wrapped in
//! [`Error::Attributed`] so response-phase handlers can see which request
//! they belong to.

use std::sync::Arc;

use derive_more::{Display, Error, From};

use crate::Request;

/// Main error type for interpose operations.
#[derive(Debug, Display, Error, From)]
pub enum Error {
    /// HTTP-level errors, raised by interceptors that reject a status code.
    #[display("HTTP error {status}: {message}")]
    #[from(skip)]
    Http {
        /// HTTP status code.
        status: u16,
        /// Error message.
        message: String,
        /// Response body, if available.
        #[error(not(source))]
        body: Option<bytes::Bytes>,
    },

    /// Network/connection errors.
    #[display("connection error: {_0}")]
    #[from(skip)]
    Connection(#[error(not(source))] String),

    /// TLS/SSL errors.
    #[display("TLS error: {_0}")]
    #[from(skip)]
    Tls(#[error(not(source))] String),

    /// Request timeout, reported by the network primitive.
    #[display("request timeout")]
    #[from(skip)]
    Timeout,

    /// The call arguments could not be turned into a request.
    #[display("invalid request: {_0}")]
    #[from(skip)]
    InvalidRequest(#[error(not(source))] String),

    /// URL parsing error.
    #[display("invalid URL: {_0}")]
    #[from]
    InvalidUrl(url::ParseError),

    /// JSON serialization error.
    #[display("JSON serialization error: {_0}")]
    #[from]
    JsonSerialization(serde_json::Error),

    /// JSON deserialization error with path context.
    #[display("JSON deserialization error at '{path}': {message}")]
    #[from(skip)]
    JsonDeserialization {
        /// JSON path to the error (e.g., "user.address.city").
        path: String,
        /// Error message.
        message: String,
    },

    /// Form URL-encoded serialization error.
    #[display("form serialization error: {_0}")]
    #[from]
    FormSerialization(serde_html_form::ser::Error),

    /// Failure raised by an interceptor handler (or a panic caught at the
    /// handler boundary).
    #[display("interceptor error: {_0}")]
    #[from(skip)]
    Interceptor(#[error(not(source))] String),

    /// A failure of the network primitive, annotated with the request that
    /// was being performed.
    #[display("{source}")]
    #[from(skip)]
    Attributed {
        /// The materialized request handed to the primitive.
        #[error(not(source))]
        request: Arc<Request>,
        /// The underlying failure.
        source: Box<Error>,
    },
}

/// Result type alias using [`crate::Error`].
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create an HTTP error from status code and message.
    #[must_use]
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
            body: None,
        }
    }

    /// Create an HTTP error with body.
    #[must_use]
    pub fn http_with_body(status: u16, message: impl Into<String>, body: bytes::Bytes) -> Self {
        Self::Http {
            status,
            message: message.into(),
            body: Some(body),
        }
    }

    /// Create a connection error.
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection(message.into())
    }

    /// Create a TLS error.
    #[must_use]
    pub fn tls(message: impl Into<String>) -> Self {
        Self::Tls(message.into())
    }

    /// Create an invalid request error.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// Create a JSON deserialization error with path context.
    #[must_use]
    pub fn json_deserialization(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::JsonDeserialization {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an error raised from inside an interceptor handler.
    #[must_use]
    pub fn interceptor(message: impl Into<String>) -> Self {
        Self::Interceptor(message.into())
    }

    /// Annotate this error with the request it belongs to.
    ///
    /// An error that already carries a request is returned unchanged.
    #[must_use]
    pub fn attach_request(self, request: Arc<Request>) -> Self {
        match self {
            Self::Attributed { .. } => self,
            other => Self::Attributed {
                request,
                source: Box::new(other),
            },
        }
    }

    /// The request this error was raised for, if it has been attributed.
    #[must_use]
    pub fn request(&self) -> Option<&Request> {
        match self {
            Self::Attributed { request, .. } => Some(request),
            _ => None,
        }
    }

    /// The innermost error, looking through request attribution.
    #[must_use]
    pub fn root(&self) -> &Self {
        match self {
            Self::Attributed { source, .. } => source.root(),
            other => other,
        }
    }

    /// Strip request attribution, returning the innermost error.
    #[must_use]
    pub fn into_root(self) -> Self {
        match self {
            Self::Attributed { source, .. } => source.into_root(),
            other => other,
        }
    }

    /// Returns `true` if the network primitive itself failed.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(
            self.root(),
            Self::Connection(_) | Self::Tls(_) | Self::Timeout
        )
    }

    /// Returns `true` if this is a timeout error.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self.root(), Self::Timeout)
    }

    /// Returns `true` if this is a connection error.
    #[must_use]
    pub fn is_connection(&self) -> bool {
        matches!(self.root(), Self::Connection(_))
    }

    /// Message of an interceptor-raised error.
    #[must_use]
    pub fn interceptor_message(&self) -> Option<&str> {
        match self.root() {
            Self::Interceptor(message) => Some(message),
            _ => None,
        }
    }

    /// Returns the HTTP status code if this is an HTTP error.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self.root() {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns the response body if this is an HTTP error with a body.
    #[must_use]
    pub fn body(&self) -> Option<&bytes::Bytes> {
        match self.root() {
            Self::Http { body, .. } => body.as_ref(),
            _ => None,
        }
    }

    /// Try to decode the HTTP error body as JSON.
    ///
    /// Returns `None` if there is no body or this is not an HTTP error.
    pub fn decode_body<T: serde::de::DeserializeOwned>(&self) -> Option<Result<T>> {
        self.body().map(|body| crate::decode_json(body))
    }
}

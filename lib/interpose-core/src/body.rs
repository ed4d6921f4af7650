//! Payload codecs.
//!
//! Encoders return a [`Payload`]: the bytes together with the media type they
//! must be sent with. [`FetchInit::json`](crate::FetchInit::json) and
//! [`RequestBuilder::json`](crate::RequestBuilder::json) apply both in one
//! step. Decoding is JSON only and names the field that failed.

use bytes::Bytes;

use crate::Result;

/// Media type of an encoded payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum ContentType {
    /// `application/json`
    #[display("application/json")]
    Json,
    /// `application/x-www-form-urlencoded`
    #[display("application/x-www-form-urlencoded")]
    Form,
}

impl ContentType {
    /// Value for the `Content-Type` header.
    #[must_use]
    pub const fn mime(self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Form => "application/x-www-form-urlencoded",
        }
    }
}

/// Encoded body ready to be attached to call arguments or a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    /// Media type to announce.
    pub content_type: ContentType,
    /// Encoded bytes.
    pub bytes: Bytes,
}

/// Encode a value as a JSON payload.
///
/// # Example
///
/// ```
/// use interpose_core::{ContentType, encode_json};
///
/// let payload = encode_json(&serde_json::json!({ "name": "Alice" })).expect("encode");
/// assert_eq!(payload.content_type, ContentType::Json);
/// assert_eq!(payload.bytes.as_ref(), br#"{"name":"Alice"}"#);
/// ```
pub fn encode_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<Payload> {
    let bytes = serde_json::to_vec(value)?;
    Ok(Payload {
        content_type: ContentType::Json,
        bytes: bytes.into(),
    })
}

/// Encode a value as an `application/x-www-form-urlencoded` payload.
pub fn encode_form<T: serde::Serialize + ?Sized>(value: &T) -> Result<Payload> {
    let encoded = serde_html_form::to_string(value)?;
    Ok(Payload {
        content_type: ContentType::Form,
        bytes: encoded.into(),
    })
}

/// Decode a JSON body.
///
/// A failure is [`crate::Error::JsonDeserialization`] carrying the dotted
/// path of the offending field, for instance `items[2].price`.
pub fn decode_json<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    let mut deserializer = serde_json::Deserializer::from_slice(bytes);
    serde_path_to_error::deserialize(&mut deserializer).map_err(|failure| {
        crate::Error::json_deserialization(failure.path().to_string(), failure.inner().to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mime_matches_display() {
        for content_type in [ContentType::Json, ContentType::Form] {
            assert_eq!(content_type.to_string(), content_type.mime());
        }
    }

    #[test]
    fn form_payload_keeps_field_order() {
        let payload = encode_form(&[("q", "rust lang"), ("page", "2")]).expect("encode");

        assert_eq!(payload.content_type, ContentType::Form);
        assert_eq!(payload.bytes.as_ref(), b"q=rust+lang&page=2");
    }

    #[test]
    fn decode_failure_names_the_nested_field() {
        #[derive(Debug, serde::Deserialize)]
        struct Line {
            #[allow(dead_code)]
            price: u32,
        }

        #[derive(Debug, serde::Deserialize)]
        struct Order {
            #[allow(dead_code)]
            items: Vec<Line>,
        }

        let error = decode_json::<Order>(br#"{"items":[{"price":1},{"price":"free"}]}"#)
            .expect_err("price is not a number");

        match error {
            crate::Error::JsonDeserialization { path, .. } => assert_eq!(path, "items[1].price"),
            other => panic!("unexpected error: {other}"),
        }
    }
}

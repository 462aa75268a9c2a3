use std::fmt;
use std::pin::Pin;
use std::sync::{Mutex, PoisonError};

use bytes::{Bytes, BytesMut};
use futures_util::{Stream, TryStreamExt, stream};

use crate::data::DomNode;
use crate::error::{BoxError, FetchError, Result};

/// A boxed stream type for HTTP response bodies.
pub type BoxStream<'a, T> = Pin<Box<dyn Stream<Item = T> + Send + 'a>>;

/// Raw response body as produced by a transport.
pub type BodyStream = BoxStream<'static, std::result::Result<Bytes, BoxError>>;

/// A raw HTTP response whose body has not been read yet.
///
/// Reading the body ([`text`](Response::text), [`json`](Response::json),
/// [`bytes`](Response::bytes), [`blob`](Response::blob)) consumes the response.
pub struct Response {
    status: u16,
    url: String,
    headers: Vec<(String, String)>,
    // The mutex only exists so that `Response` (and therefore `FetchError`) is `Sync`.
    body: Mutex<BodyStream>,
}

impl Response {
    /// Create a response with an already buffered body.
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        let body: Bytes = body.into();
        Self::from_stream(status, stream::once(async move { Ok::<_, BoxError>(body) }))
    }

    /// Create a response whose body is read lazily from a byte stream.
    pub fn from_stream<S, E>(status: u16, body: S) -> Self
    where
        S: Stream<Item = std::result::Result<Bytes, E>> + Send + 'static,
        E: Into<BoxError> + 'static,
    {
        Self {
            status,
            url: String::new(),
            headers: Vec::new(),
            body: Mutex::new(Box::pin(body.map_err(Into::<BoxError>::into))),
        }
    }

    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn with_headers(mut self, headers: Vec<(String, String)>) -> Self {
        self.headers = headers;
        self
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    /// `true` for any 2xx status.
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Case-insensitive header lookup. Returns the first match.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Read the whole body.
    pub async fn bytes(self) -> Result<Bytes> {
        let body = self.body.into_inner().unwrap_or_else(PoisonError::into_inner);
        let buffer = body
            .try_fold(BytesMut::new(), |mut buffer, chunk| async move {
                buffer.extend_from_slice(&chunk);
                Ok(buffer)
            })
            .await
            .map_err(FetchError::Body)?;
        Ok(buffer.freeze())
    }

    /// Read the body as UTF-8 text. Invalid sequences are replaced.
    pub async fn text(self) -> Result<String> {
        let bytes = self.bytes().await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Read the body and parse it as JSON.
    pub async fn json(self) -> Result<serde_json::Value> {
        let bytes = self.bytes().await?;
        serde_json::from_slice(&bytes).map_err(FetchError::Decode)
    }

    /// Read the body as binary data, keeping its content type.
    pub async fn blob(self) -> Result<Blob> {
        let content_type = self.content_type().map(str::to_owned);
        let bytes = self.bytes().await?;
        Ok(Blob::new(bytes, content_type))
    }
}

impl fmt::Debug for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Response")
            .field("status", &self.status)
            .field("url", &self.url)
            .field("headers", &self.headers)
            .field("body", &"{ ... }")
            .finish()
    }
}

/// Binary response content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Blob {
    bytes: Bytes,
    content_type: Option<String>,
}

impl Blob {
    pub fn new(bytes: impl Into<Bytes>, content_type: Option<String>) -> Self {
        Self {
            bytes: bytes.into(),
            content_type,
        }
    }

    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn into_bytes(self) -> Bytes {
        self.bytes
    }
}

/// A decoded response body, shaped by the configured response type.
///
/// Response filters take one of these and return one of these.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseData {
    Text(String),
    Json(serde_json::Value),
    /// First node of the parsed document, `None` for an empty document.
    Dom(Option<DomNode>),
    Blob(Blob),
}

impl ResponseData {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ResponseData::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            ResponseData::Json(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_dom(&self) -> Option<&DomNode> {
        match self {
            ResponseData::Dom(node) => node.as_ref(),
            _ => None,
        }
    }

    pub fn as_blob(&self) -> Option<&Blob> {
        match self {
            ResponseData::Blob(blob) => Some(blob),
            _ => None,
        }
    }

    pub fn into_json(self) -> Option<serde_json::Value> {
        match self {
            ResponseData::Json(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_text(self) -> Option<String> {
        match self {
            ResponseData::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl From<serde_json::Value> for ResponseData {
    fn from(value: serde_json::Value) -> Self {
        ResponseData::Json(value)
    }
}

impl From<String> for ResponseData {
    fn from(text: String) -> Self {
        ResponseData::Text(text)
    }
}

impl From<&str> for ResponseData {
    fn from(text: &str) -> Self {
        ResponseData::Text(text.to_owned())
    }
}

impl From<Blob> for ResponseData {
    fn from(blob: Blob) -> Self {
        ResponseData::Blob(blob)
    }
}

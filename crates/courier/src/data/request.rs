use std::time::Duration;

use bytes::Bytes;

use crate::data::Blob;

/// Per-call request descriptor.
///
/// Each call starts from a clone of the configured base request, which the
/// builder callbacks may then amend before it is handed to the transport.
///
/// # Examples
///
/// ```
/// use courier::RequestInit;
/// use std::time::Duration;
///
/// let request = RequestInit::default()
///     .with_method("POST")
///     .with_header("Accept", "application/json")
///     .with_timeout(Duration::from_secs(5));
///
/// assert_eq!(request.method, "POST");
/// assert_eq!(request.header("accept"), Some("application/json"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RequestInit {
    /// HTTP method. Default: `GET`
    pub method: String,

    /// Headers in insertion order. Names are matched case-insensitively.
    pub headers: Vec<(String, String)>,

    /// Request body, if any.
    pub body: Option<RequestBody>,

    /// Whole-request timeout, honoured by transports that support one.
    pub timeout: Option<Duration>,
}

impl Default for RequestInit {
    fn default() -> Self {
        Self {
            method: "GET".to_string(),
            headers: Vec::new(),
            body: None,
            timeout: None,
        }
    }
}

impl RequestInit {
    #[must_use]
    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    /// Append a header, keeping any existing value of the same name.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.append_header(name, value);
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<RequestBody>) -> Self {
        self.body = Some(body.into());
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// First value of the named header.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn append_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.push((name.into(), value.into()));
    }

    /// Replace every header of the same name with a single value.
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.headers.retain(|(key, _)| !key.eq_ignore_ascii_case(&name));
        self.headers.push((name, value.into()));
    }

    pub fn remove_header(&mut self, name: &str) {
        self.headers.retain(|(key, _)| !key.eq_ignore_ascii_case(name));
    }
}

/// Body attached to an outgoing request.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Text(String),
    Form(FormData),
}

impl From<String> for RequestBody {
    fn from(text: String) -> Self {
        RequestBody::Text(text)
    }
}

impl From<&str> for RequestBody {
    fn from(text: &str) -> Self {
        RequestBody::Text(text.to_owned())
    }
}

impl From<FormData> for RequestBody {
    fn from(form: FormData) -> Self {
        RequestBody::Form(form)
    }
}

/// An ordered multipart form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormData {
    fields: Vec<FormField>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormField {
    pub name: String,
    pub value: FormValue,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FormValue {
    Text(String),
    File {
        bytes: Bytes,
        file_name: Option<String>,
        content_type: Option<String>,
    },
}

impl FormValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FormValue::Text(text) => Some(text),
            FormValue::File { .. } => None,
        }
    }
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.push(FormField {
            name: name.into(),
            value: FormValue::Text(value.into()),
        });
    }

    pub fn append_blob(&mut self, name: impl Into<String>, blob: Blob, file_name: Option<String>) {
        let content_type = blob.content_type().map(str::to_owned);
        self.fields.push(FormField {
            name: name.into(),
            value: FormValue::File {
                bytes: blob.into_bytes(),
                file_name,
                content_type,
            },
        });
    }

    #[must_use]
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.append(name, value);
        self
    }

    /// First value appended under `name`.
    pub fn get(&self, name: &str) -> Option<&FormValue> {
        self.fields
            .iter()
            .find(|field| field.name == name)
            .map(|field| &field.value)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|field| field.name.as_str())
    }

    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    pub fn into_fields(self) -> Vec<FormField> {
        self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

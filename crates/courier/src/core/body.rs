use serde_json::{Map, Value};

use crate::core::coerce_to_string;
use crate::data::{FormData, RequestBody};

/// Result of a body builder.
#[derive(Debug, Clone, PartialEq)]
pub enum BodyPayload {
    /// Sent as-is, e.g. a pre-serialized document.
    Text(String),
    /// An already assembled multipart form.
    Form(FormData),
    /// Plain fields, each turned into a multipart text field.
    Fields(Map<String, Value>),
    /// Leaves the request body untouched.
    Empty,
}

impl BodyPayload {
    /// Convert into the body that goes on the wire. `Empty` yields `None`.
    pub fn into_request_body(self) -> Option<RequestBody> {
        match self {
            BodyPayload::Text(text) => Some(RequestBody::Text(text)),
            BodyPayload::Form(form) => Some(RequestBody::Form(form)),
            BodyPayload::Fields(fields) => Some(RequestBody::Form(fields_to_form(&fields))),
            BodyPayload::Empty => None,
        }
    }
}

/// Build a multipart form with one text field per key. Values are
/// string-coerced, nested values are not serialized.
pub fn fields_to_form(fields: &Map<String, Value>) -> FormData {
    let mut form = FormData::new();
    for (name, value) in fields {
        form.append(name.as_str(), coerce_to_string(value));
    }
    form
}

impl From<String> for BodyPayload {
    fn from(text: String) -> Self {
        BodyPayload::Text(text)
    }
}

impl From<&str> for BodyPayload {
    fn from(text: &str) -> Self {
        BodyPayload::Text(text.to_owned())
    }
}

impl From<FormData> for BodyPayload {
    fn from(form: FormData) -> Self {
        BodyPayload::Form(form)
    }
}

impl From<Map<String, Value>> for BodyPayload {
    fn from(fields: Map<String, Value>) -> Self {
        BodyPayload::Fields(fields)
    }
}

impl From<Option<BodyPayload>> for BodyPayload {
    fn from(payload: Option<BodyPayload>) -> Self {
        payload.unwrap_or(BodyPayload::Empty)
    }
}

/// Objects become fields and strings become text. Arrays become fields keyed
/// by index and `null` an empty form. Numbers and booleans produce no body.
impl From<Value> for BodyPayload {
    fn from(value: Value) -> Self {
        match value {
            Value::String(text) => BodyPayload::Text(text),
            Value::Object(fields) => BodyPayload::Fields(fields),
            Value::Array(items) => BodyPayload::Fields(
                items
                    .into_iter()
                    .enumerate()
                    .map(|(index, item)| (index.to_string(), item))
                    .collect(),
            ),
            Value::Null => BodyPayload::Fields(Map::new()),
            Value::Bool(_) | Value::Number(_) => BodyPayload::Empty,
        }
    }
}

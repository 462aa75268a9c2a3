use serde_json::{Map, Value};
use url::form_urlencoded;

use crate::core::coerce_to_string;

/// Result of a query builder.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryPayload {
    /// Key/value pairs to be form-urlencoded.
    Params(Map<String, Value>),
    /// A query string used verbatim.
    Raw(String),
}

impl QueryPayload {
    /// Render the payload as the text that follows `?`.
    pub fn into_query_string(self) -> String {
        match self {
            QueryPayload::Params(params) => encode_query(&params),
            QueryPayload::Raw(raw) => raw,
        }
    }
}

/// Encode pairs as `application/x-www-form-urlencoded`.
///
/// Values are string-coerced first; spaces become `+`.
///
/// # Examples
///
/// ```
/// use courier::core::encode_query;
/// use serde_json::json;
///
/// let params = json!({ "q": "rust lang", "page": 2 });
/// assert_eq!(encode_query(params.as_object().unwrap()), "q=rust+lang&page=2");
/// ```
pub fn encode_query(params: &Map<String, Value>) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in params {
        serializer.append_pair(key, &coerce_to_string(value));
    }
    serializer.finish()
}

impl From<String> for QueryPayload {
    fn from(raw: String) -> Self {
        QueryPayload::Raw(raw)
    }
}

impl From<&str> for QueryPayload {
    fn from(raw: &str) -> Self {
        QueryPayload::Raw(raw.to_owned())
    }
}

impl From<Map<String, Value>> for QueryPayload {
    fn from(params: Map<String, Value>) -> Self {
        QueryPayload::Params(params)
    }
}

/// Objects become parameters, strings are raw, `null` is an empty parameter
/// set and any other value is coerced to a raw string.
impl From<Value> for QueryPayload {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(params) => QueryPayload::Params(params),
            Value::Null => QueryPayload::Params(Map::new()),
            Value::String(raw) => QueryPayload::Raw(raw),
            other => QueryPayload::Raw(coerce_to_string(&other)),
        }
    }
}

impl<K, V> FromIterator<(K, V)> for QueryPayload
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        QueryPayload::Params(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_encode_reserved_characters() {
        let encoded = encode_query(&params(json!({ "a&b": "c=d", "e": "ü/?" })));
        assert_eq!(encoded, "a%26b=c%3Dd&e=%C3%BC%2F%3F");
    }

    #[test]
    fn test_encode_coerces_values() {
        let encoded = encode_query(&params(json!({ "flag": true, "ids": [1, 2], "n": 1.0 })));
        assert_eq!(encoded, "flag=true&ids=1%2C2&n=1");
    }

    #[test]
    fn test_encode_keeps_key_order() {
        let encoded = encode_query(&params(json!({ "q": "x", "page": 1, "lang": "en" })));
        assert_eq!(encoded, "q=x&page=1&lang=en");
    }

    #[test]
    fn test_encode_empty() {
        assert_eq!(encode_query(&Map::new()), "");
    }

    #[test]
    fn test_raw_is_verbatim() {
        let payload = QueryPayload::from("a=1&b=two words");
        assert_eq!(payload.into_query_string(), "a=1&b=two words");
    }

    #[test]
    fn test_from_value() {
        assert_eq!(
            QueryPayload::from(json!({ "x": 1 })),
            QueryPayload::Params(params(json!({ "x": 1 })))
        );
        assert_eq!(QueryPayload::from(Value::Null).into_query_string(), "");
        assert_eq!(QueryPayload::from(json!("x=1")), QueryPayload::Raw("x=1".to_string()));
        assert_eq!(QueryPayload::from(json!(5)), QueryPayload::Raw("5".to_string()));
    }

    #[test]
    fn test_collect_pairs() {
        let payload: QueryPayload = [("q", "hello world"), ("lang", "en")].into_iter().collect();
        assert_eq!(payload.into_query_string(), "q=hello+world&lang=en");
    }

    #[test]
    fn test_same_input_same_output() {
        let input = params(json!({ "b": 2, "a": 1, "c": "x y" }));
        assert_eq!(encode_query(&input), encode_query(&input.clone()));
    }
}

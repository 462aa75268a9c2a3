use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// How a raw response body is decoded.
///
/// Names are matched exactly (`"text"`, `"json"`, `"dom"`, `"blob"`). Anything
/// else parses to [`ResponseType::Unsupported`], which fails at decode time
/// with an `invalidResponseType` error instead of being rejected up front.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ResponseType {
    /// UTF-8 text.
    Text,
    /// A JSON document.
    #[default]
    Json,
    /// An HTML fragment, yielding its first node.
    Dom,
    /// Raw bytes with their content type.
    Blob,
    /// An unrecognised name.
    Unsupported(String),
}

impl ResponseType {
    pub fn as_str(&self) -> &str {
        match self {
            ResponseType::Text => "text",
            ResponseType::Json => "json",
            ResponseType::Dom => "dom",
            ResponseType::Blob => "blob",
            ResponseType::Unsupported(name) => name,
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, ResponseType::Unsupported(_))
    }
}

impl fmt::Display for ResponseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for ResponseType {
    fn from(name: &str) -> Self {
        match name {
            "text" => ResponseType::Text,
            "json" => ResponseType::Json,
            "dom" => ResponseType::Dom,
            "blob" => ResponseType::Blob,
            other => ResponseType::Unsupported(other.to_string()),
        }
    }
}

impl From<String> for ResponseType {
    fn from(name: String) -> Self {
        ResponseType::from(name.as_str())
    }
}

impl From<ResponseType> for String {
    fn from(kind: ResponseType) -> Self {
        match kind {
            ResponseType::Unsupported(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl FromStr for ResponseType {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(ResponseType::from(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_json() {
        assert_eq!(ResponseType::default(), ResponseType::Json);
    }

    #[test]
    fn test_known_names() {
        for (name, kind) in [
            ("text", ResponseType::Text),
            ("json", ResponseType::Json),
            ("dom", ResponseType::Dom),
            ("blob", ResponseType::Blob),
        ] {
            assert_eq!(ResponseType::from(name), kind);
            assert_eq!(kind.to_string(), name);
            assert!(kind.is_supported());
        }
    }

    #[test]
    fn test_unknown_name_is_unsupported() {
        let kind: ResponseType = "xml".parse().unwrap();
        assert_eq!(kind, ResponseType::Unsupported("xml".to_string()));
        assert!(!kind.is_supported());
        assert_eq!(kind.as_str(), "xml");

        // Matching is exact and case-sensitive.
        assert!(!ResponseType::from("JSON").is_supported());
    }

    #[test]
    fn test_serde_uses_names() {
        let kind: ResponseType = serde_json::from_str("\"blob\"").unwrap();
        assert_eq!(kind, ResponseType::Blob);

        let encoded = serde_json::to_string(&ResponseType::Dom).unwrap();
        assert_eq!(encoded, "\"dom\"");

        let kind: ResponseType = serde_json::from_str("\"yaml\"").unwrap();
        assert_eq!(kind, ResponseType::Unsupported("yaml".to_string()));
    }
}

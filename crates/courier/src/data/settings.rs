use std::collections::BTreeMap;

use serde::Deserialize;

use crate::data::ResponseType;

/// The static part of a fetcher configuration, loadable from a file.
///
/// Callbacks cannot be expressed in a file, so they are added in code on the
/// [`FetcherConfig`](crate::FetcherConfig) built from these settings.
///
/// ```toml
/// base = "https://api.example.com/v1/"
/// method = "POST"
/// response_type = "text"
/// timeout_secs = 10
///
/// [headers]
/// Accept = "text/plain"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct FetcherSettings {
    pub base: Option<String>,
    pub method: Option<String>,
    pub headers: BTreeMap<String, String>,
    pub response_type: ResponseType,
    pub timeout_secs: Option<u64>,
}

impl FetcherSettings {
    pub fn from_toml_str(source: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(source)
    }
}

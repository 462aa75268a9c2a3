use std::future::Future;

use async_trait::async_trait;

use crate::data::{RequestInit, Response};
use crate::error::BoxError;

/// Asynchronous HTTP transport abstraction.
///
/// A transport performs exactly one request and returns the raw response with
/// its body unread. Status codes are not judged here; any response that made
/// it back counts as `Ok`.
///
/// # Implementations
///
/// - [`ReqwestTransport`]: Production implementation using `reqwest`
/// - Any `Fn(String, RequestInit) -> impl Future<Output = Result<Response, BoxError>>`
/// - Test doubles
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send `request` to `uri`.
    ///
    /// # Errors
    ///
    /// Returns an error when no response could be obtained (DNS failure,
    /// connection error, invalid request, timeout).
    async fn send(&self, uri: &str, request: RequestInit) -> Result<Response, BoxError>;
}

#[async_trait]
impl<F, Fut> Transport for F
where
    F: Fn(String, RequestInit) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Response, BoxError>> + Send + 'static,
{
    async fn send(&self, uri: &str, request: RequestInit) -> Result<Response, BoxError> {
        self(uri.to_owned(), request).await
    }
}

#[cfg(feature = "reqwest")]
mod reqwest_impl {
    use std::sync::Arc;

    use async_trait::async_trait;
    use once_cell::sync::Lazy;
    use reqwest::multipart::{Form, Part};

    use super::Transport;
    use crate::data::{FormData, FormValue, RequestBody, RequestInit, Response};
    use crate::error::BoxError;

    static DEFAULT_TRANSPORT: Lazy<Arc<dyn Transport>> =
        Lazy::new(|| Arc::new(ReqwestTransport::new()));

    /// Production HTTP transport using reqwest.
    #[derive(Debug, Clone, Default)]
    pub struct ReqwestTransport {
        client: reqwest::Client,
    }

    impl ReqwestTransport {
        /// Create a transport with a default `reqwest::Client`.
        pub fn new() -> Self {
            Self::with_client(reqwest::Client::new())
        }

        /// Wrap an existing client, keeping its pool and settings.
        pub fn with_client(client: reqwest::Client) -> Self {
            Self { client }
        }

        pub fn client(&self) -> &reqwest::Client {
            &self.client
        }
    }

    #[async_trait]
    impl Transport for ReqwestTransport {
        async fn send(&self, uri: &str, request: RequestInit) -> Result<Response, BoxError> {
            let method = reqwest::Method::from_bytes(request.method.as_bytes())?;
            let mut builder = self.client.request(method, uri);

            for (name, value) in &request.headers {
                builder = builder.header(name.as_str(), value.as_str());
            }
            if let Some(timeout) = request.timeout {
                builder = builder.timeout(timeout);
            }
            builder = match request.body {
                Some(RequestBody::Text(text)) => builder.body(text),
                Some(RequestBody::Form(form)) => builder.multipart(to_multipart(form)?),
                None => builder,
            };

            let response = builder.send().await?;
            let status = response.status().as_u16();
            let url = response.url().to_string();
            let headers = response
                .headers()
                .iter()
                .filter_map(|(name, value)| {
                    value
                        .to_str()
                        .ok()
                        .map(|value| (name.as_str().to_owned(), value.to_owned()))
                })
                .collect();

            Ok(Response::from_stream(status, response.bytes_stream())
                .with_url(url)
                .with_headers(headers))
        }
    }

    fn to_multipart(form: FormData) -> Result<Form, BoxError> {
        let mut multipart = Form::new();
        for field in form.into_fields() {
            multipart = match field.value {
                FormValue::Text(text) => multipart.text(field.name, text),
                FormValue::File {
                    bytes,
                    file_name,
                    content_type,
                } => {
                    let mut part = Part::bytes(bytes.to_vec());
                    if let Some(file_name) = file_name {
                        part = part.file_name(file_name);
                    }
                    if let Some(content_type) = content_type {
                        part = part.mime_str(&content_type)?;
                    }
                    multipart.part(field.name, part)
                }
            };
        }
        Ok(multipart)
    }

    pub(crate) fn default_transport() -> Option<Arc<dyn Transport>> {
        Some(Arc::clone(&DEFAULT_TRANSPORT))
    }

}

#[cfg(feature = "reqwest")]
pub use reqwest_impl::ReqwestTransport;

#[cfg(feature = "reqwest")]
pub(crate) use reqwest_impl::default_transport;

#[cfg(not(feature = "reqwest"))]
pub(crate) fn default_transport() -> Option<std::sync::Arc<dyn Transport>> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_closure_transport() {
        let transport = |uri: String, request: RequestInit| async move {
            Ok::<_, BoxError>(Response::new(200, format!("{} {uri}", request.method)))
        };

        let response = transport.send("/ping", RequestInit::default()).await.unwrap();
        assert_eq!(response.text().await.unwrap(), "GET /ping");
    }

    #[tokio::test]
    async fn test_closure_transport_error() {
        let transport = |_uri: String, _request: RequestInit| async move {
            Err::<Response, BoxError>("offline".into())
        };

        let error = transport.send("/ping", RequestInit::default()).await.unwrap_err();
        assert_eq!(error.to_string(), "offline");
    }
}

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use serde::Serialize;

use crate::core::{BodyPayload, QueryPayload};
use crate::data::{FetcherSettings, RequestInit, Response, ResponseData, ResponseType};
use crate::effects::{Settle, Transport};
use crate::error::{BoxError, FetchError, Result};

pub type UriBuilder<A> = Arc<dyn Fn(&mut RequestInit, &A) -> String + Send + Sync>;
pub type QueryBuilder<A> = Arc<dyn Fn(&mut RequestInit, &A) -> QueryPayload + Send + Sync>;
pub type BodyBuilder<A> = Arc<dyn Fn(&mut RequestInit, &A) -> Result<BodyPayload> + Send + Sync>;
pub type ValidityPredicate = Arc<dyn Fn(&Response) -> bool + Send + Sync>;
pub type ErrorHandler<A> = Arc<dyn Fn(FetchError, &A, Settle) + Send + Sync>;

/// Post-processing applied to a successfully decoded response.
pub enum ResponseFilter<A> {
    Sync(Arc<dyn Fn(ResponseData, &A) -> std::result::Result<ResponseData, BoxError> + Send + Sync>),
    /// Async filters receive their own copy of the call arguments.
    Async(
        Arc<
            dyn Fn(ResponseData, A) -> BoxFuture<'static, std::result::Result<ResponseData, BoxError>>
                + Send
                + Sync,
        >,
    ),
}

impl<A> Clone for ResponseFilter<A> {
    fn clone(&self) -> Self {
        match self {
            ResponseFilter::Sync(filter) => ResponseFilter::Sync(Arc::clone(filter)),
            ResponseFilter::Async(filter) => ResponseFilter::Async(Arc::clone(filter)),
        }
    }
}

/// What happens when a call fails anywhere between sending and filtering.
pub enum ErrorPolicy<A> {
    /// Swallow the failure and resolve with no value.
    Suppress,
    /// Return the failure to the caller.
    Propagate,
    /// Hand the failure to a handler that settles the call itself.
    ///
    /// The call completes once the handler uses its [`Settle`]. A handler that
    /// holds on to the handle without using it leaves the call pending.
    Delegate(ErrorHandler<A>),
}

impl<A> Default for ErrorPolicy<A> {
    fn default() -> Self {
        ErrorPolicy::Propagate
    }
}

impl<A> Clone for ErrorPolicy<A> {
    fn clone(&self) -> Self {
        match self {
            ErrorPolicy::Suppress => ErrorPolicy::Suppress,
            ErrorPolicy::Propagate => ErrorPolicy::Propagate,
            ErrorPolicy::Delegate(handler) => ErrorPolicy::Delegate(Arc::clone(handler)),
        }
    }
}

impl<A> fmt::Debug for ErrorPolicy<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorPolicy::Suppress => f.write_str("Suppress"),
            ErrorPolicy::Propagate => f.write_str("Propagate"),
            ErrorPolicy::Delegate(_) => f.write_str("Delegate({ ... })"),
        }
    }
}

/// Immutable description of how a fetcher builds requests and treats responses.
///
/// `A` is the type of the arguments passed to each call; every builder
/// callback sees the same value.
///
/// # Examples
///
/// ```
/// use courier::{FetcherConfig, ResponseType};
/// use serde_json::json;
///
/// let config = FetcherConfig::<(String, u64)>::new()
///     .base("https://api.example.com/1.0/")
///     .build_uri(|_request, (resource, id)| format!("{resource}/{id}"))
///     .build_query(|_request, _args| json!({ "expand": "profile" }))
///     .response_type(ResponseType::Json);
/// ```
pub struct FetcherConfig<A> {
    pub(crate) base: Option<String>,
    pub(crate) request: RequestInit,
    pub(crate) build_uri: Option<UriBuilder<A>>,
    pub(crate) build_query: Option<QueryBuilder<A>>,
    pub(crate) build_body: Option<BodyBuilder<A>>,
    pub(crate) response_type: ResponseType,
    pub(crate) filter_response: Option<ResponseFilter<A>>,
    pub(crate) validate_response: Option<ValidityPredicate>,
    pub(crate) error_policy: ErrorPolicy<A>,
    pub(crate) transport: Option<Arc<dyn Transport>>,
}

impl<A> Default for FetcherConfig<A> {
    fn default() -> Self {
        Self {
            base: None,
            request: RequestInit::default(),
            build_uri: None,
            build_query: None,
            build_body: None,
            response_type: ResponseType::default(),
            filter_response: None,
            validate_response: None,
            error_policy: ErrorPolicy::default(),
            transport: None,
        }
    }
}

impl<A> Clone for FetcherConfig<A> {
    fn clone(&self) -> Self {
        Self {
            base: self.base.clone(),
            request: self.request.clone(),
            build_uri: self.build_uri.clone(),
            build_query: self.build_query.clone(),
            build_body: self.build_body.clone(),
            response_type: self.response_type.clone(),
            filter_response: self.filter_response.clone(),
            validate_response: self.validate_response.clone(),
            error_policy: self.error_policy.clone(),
            transport: self.transport.clone(),
        }
    }
}

impl<A> fmt::Debug for FetcherConfig<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn slot<T>(value: &Option<T>) -> &'static str {
            if value.is_some() { "{ ... }" } else { "None" }
        }

        f.debug_struct("FetcherConfig")
            .field("base", &self.base)
            .field("request", &self.request)
            .field("build_uri", &slot(&self.build_uri))
            .field("build_query", &slot(&self.build_query))
            .field("build_body", &slot(&self.build_body))
            .field("response_type", &self.response_type)
            .field("filter_response", &slot(&self.filter_response))
            .field("validate_response", &slot(&self.validate_response))
            .field("error_policy", &self.error_policy)
            .field("transport", &slot(&self.transport))
            .finish()
    }
}

impl<A> FetcherConfig<A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a configuration from file-based settings.
    pub fn from_settings(settings: FetcherSettings) -> Self {
        let mut request = RequestInit::default();
        if let Some(method) = settings.method {
            request.method = method;
        }
        request.headers = settings.headers.into_iter().collect();
        request.timeout = settings.timeout_secs.map(Duration::from_secs);

        Self {
            base: settings.base,
            request,
            response_type: settings.response_type,
            ..Self::default()
        }
    }

    /// Prefix of every request URI.
    #[must_use]
    pub fn base(mut self, base: impl Into<String>) -> Self {
        self.base = Some(base.into());
        self
    }

    /// Request settings every call starts from.
    #[must_use]
    pub fn request(mut self, request: RequestInit) -> Self {
        self.request = request;
        self
    }

    /// Derive a path to append to the base.
    #[must_use]
    pub fn build_uri<F, S>(mut self, build: F) -> Self
    where
        F: Fn(&mut RequestInit, &A) -> S + Send + Sync + 'static,
        S: Into<String>,
    {
        self.build_uri = Some(Arc::new(move |request: &mut RequestInit, args: &A| {
            build(request, args).into()
        }));
        self
    }

    /// Derive the query string. The URI always gains a `?` when this is set,
    /// even if the query comes out empty.
    #[must_use]
    pub fn build_query<F, Q>(mut self, build: F) -> Self
    where
        F: Fn(&mut RequestInit, &A) -> Q + Send + Sync + 'static,
        Q: Into<QueryPayload>,
    {
        self.build_query = Some(Arc::new(move |request: &mut RequestInit, args: &A| {
            build(request, args).into()
        }));
        self
    }

    /// Derive the request body.
    #[must_use]
    pub fn build_body<F, B>(mut self, build: F) -> Self
    where
        F: Fn(&mut RequestInit, &A) -> B + Send + Sync + 'static,
        B: Into<BodyPayload>,
    {
        self.build_body = Some(Arc::new(move |request: &mut RequestInit, args: &A| {
            Ok(build(request, args).into())
        }));
        self
    }

    /// Derive a body that is sent as a JSON document with
    /// `Content-Type: application/json`.
    #[must_use]
    pub fn build_json_body<F, T>(mut self, build: F) -> Self
    where
        F: Fn(&mut RequestInit, &A) -> T + Send + Sync + 'static,
        T: Serialize,
    {
        self.build_body = Some(Arc::new(move |request: &mut RequestInit, args: &A| {
            let value = build(request, args);
            let encoded = serde_json::to_string(&value).map_err(FetchError::Encode)?;
            request.set_header("Content-Type", "application/json");
            Ok(BodyPayload::Text(encoded))
        }));
        self
    }

    #[must_use]
    pub fn response_type(mut self, response_type: impl Into<ResponseType>) -> Self {
        self.response_type = response_type.into();
        self
    }

    /// Transform the decoded response. An `Err` takes the failure path.
    #[must_use]
    pub fn filter_response<F>(mut self, filter: F) -> Self
    where
        F: Fn(ResponseData, &A) -> std::result::Result<ResponseData, BoxError> + Send + Sync + 'static,
    {
        self.filter_response = Some(ResponseFilter::Sync(Arc::new(filter)));
        self
    }

    /// Like [`filter_response`](Self::filter_response) but awaited.
    #[must_use]
    pub fn filter_response_async<F, Fut>(mut self, filter: F) -> Self
    where
        F: Fn(ResponseData, A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = std::result::Result<ResponseData, BoxError>> + Send + 'static,
    {
        self.filter_response = Some(ResponseFilter::Async(Arc::new(move |data: ResponseData, args: A| {
            filter(data, args).boxed()
        })));
        self
    }

    /// Decide whether a raw response counts as success. Default: [`Response::ok`].
    #[must_use]
    pub fn validate_response<F>(mut self, validate: F) -> Self
    where
        F: Fn(&Response) -> bool + Send + Sync + 'static,
    {
        self.validate_response = Some(Arc::new(validate));
        self
    }

    #[must_use]
    pub fn error_policy(mut self, policy: ErrorPolicy<A>) -> Self {
        self.error_policy = policy;
        self
    }

    /// Shorthand for [`ErrorPolicy::Suppress`].
    #[must_use]
    pub fn suppress_errors(self) -> Self {
        self.error_policy(ErrorPolicy::Suppress)
    }

    /// Shorthand for [`ErrorPolicy::Delegate`].
    #[must_use]
    pub fn on_error<F>(self, handler: F) -> Self
    where
        F: Fn(FetchError, &A, Settle) + Send + Sync + 'static,
    {
        self.error_policy(ErrorPolicy::Delegate(Arc::new(handler)))
    }

    /// Replace the default HTTP transport.
    #[must_use]
    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    #[must_use]
    pub fn shared_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub(crate) fn is_valid(&self, response: &Response) -> bool {
        match &self.validate_response {
            Some(validate) => validate(response),
            None => response.ok(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = FetcherConfig::<()>::default();
        assert!(config.base.is_none());
        assert_eq!(config.request, RequestInit::default());
        assert_eq!(config.response_type, ResponseType::Json);
        assert!(matches!(config.error_policy, ErrorPolicy::Propagate));
        assert!(config.transport.is_none());
    }

    #[test]
    fn test_from_settings() {
        let settings = FetcherSettings::from_toml_str(
            r#"
            base = "https://example.com/"
            method = "PUT"
            response_type = "blob"
            timeout_secs = 3

            [headers]
            X-Client = "courier"
            "#,
        )
        .unwrap();

        let config = FetcherConfig::<()>::from_settings(settings);
        assert_eq!(config.base.as_deref(), Some("https://example.com/"));
        assert_eq!(config.request.method, "PUT");
        assert_eq!(config.request.header("x-client"), Some("courier"));
        assert_eq!(config.request.timeout, Some(Duration::from_secs(3)));
        assert_eq!(config.response_type, ResponseType::Blob);
    }

    #[test]
    fn test_default_validity_uses_ok() {
        let config = FetcherConfig::<()>::new();
        assert!(config.is_valid(&Response::new(200, "")));
        assert!(!config.is_valid(&Response::new(500, "")));

        let config = config.validate_response(|response| response.status() < 500);
        assert!(config.is_valid(&Response::new(404, "")));
        assert!(!config.is_valid(&Response::new(503, "")));
    }

    #[test]
    fn test_debug_hides_callbacks() {
        let config = FetcherConfig::<()>::new()
            .base("https://example.com")
            .build_uri(|_, _| "users")
            .suppress_errors();

        let rendered = format!("{config:?}");
        assert!(rendered.contains("https://example.com"));
        assert!(rendered.contains("build_uri: \"{ ... }\""));
        assert!(rendered.contains("build_query: \"None\""));
        assert!(rendered.contains("Suppress"));
    }
}

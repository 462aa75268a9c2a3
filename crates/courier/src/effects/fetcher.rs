use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::core::{parse_fragment, prepare_request};
use crate::data::{ErrorPolicy, FetcherConfig, Response, ResponseData, ResponseFilter, ResponseType};
use crate::effects::settle::Settle;
use crate::effects::transport::{Transport, default_transport};
use crate::error::{FetchError, Result};

/// A reusable request function produced from a [`FetcherConfig`].
///
/// Each call to [`fetch`](Fetcher::fetch) is one independent request: build
/// the URI, query and body, send, validate, decode, filter. Nothing is carried
/// over between calls, and clones share the same configuration.
pub struct Fetcher<A> {
    config: Arc<FetcherConfig<A>>,
    transport: Option<Arc<dyn Transport>>,
}

/// Turn a configuration into a fetcher.
pub fn create_fetcher<A>(config: FetcherConfig<A>) -> Fetcher<A>
where
    A: Clone + Send + Sync + 'static,
{
    Fetcher::new(config)
}

impl<A> FetcherConfig<A>
where
    A: Clone + Send + Sync + 'static,
{
    /// Finish configuration and produce the fetcher.
    pub fn build(self) -> Fetcher<A> {
        Fetcher::new(self)
    }
}

impl<A> Clone for Fetcher<A> {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            transport: self.transport.clone(),
        }
    }
}

impl<A> fmt::Debug for Fetcher<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fetcher")
            .field("config", &self.config)
            .field("has_transport", &self.transport.is_some())
            .finish()
    }
}

impl<A> Fetcher<A>
where
    A: Clone + Send + Sync + 'static,
{
    /// Create a fetcher. Uses the configured transport, or the shared default
    /// one when none is configured.
    pub fn new(config: FetcherConfig<A>) -> Self {
        let transport = config.transport.clone().or_else(default_transport);
        Self {
            config: Arc::new(config),
            transport,
        }
    }

    pub fn config(&self) -> &FetcherConfig<A> {
        &self.config
    }

    /// Perform one request.
    ///
    /// Resolves to `Ok(Some(data))` on success. Failures are routed through
    /// the configured [`ErrorPolicy`]: `Suppress` yields `Ok(None)`,
    /// `Propagate` returns the error and `Delegate` returns whatever the
    /// handler settles on.
    pub async fn fetch(&self, args: A) -> Result<Option<ResponseData>> {
        match self.run(&args).await {
            Ok(data) => Ok(Some(data)),
            Err(error) => self.settle_failure(error, &args).await,
        }
    }

    async fn run(&self, args: &A) -> Result<ResponseData> {
        let transport = self.transport.as_ref().ok_or(FetchError::NoTransport)?;
        let (uri, request) = prepare_request(&self.config, args)?;

        debug!(method = %request.method, %uri, "sending request");
        let response = transport
            .send(&uri, request)
            .await
            .map_err(FetchError::Transport)?;
        debug!(status = response.status(), %uri, "received response");

        if !self.config.is_valid(&response) {
            return Err(FetchError::Rejected {
                response: Box::new(response),
            });
        }

        let data = decode(&self.config.response_type, response).await?;
        self.filter(data, args).await
    }

    async fn filter(&self, data: ResponseData, args: &A) -> Result<ResponseData> {
        match &self.config.filter_response {
            None => Ok(data),
            Some(ResponseFilter::Sync(filter)) => filter(data, args).map_err(FetchError::Filter),
            Some(ResponseFilter::Async(filter)) => {
                filter(data, args.clone()).await.map_err(FetchError::Filter)
            }
        }
    }

    async fn settle_failure(&self, error: FetchError, args: &A) -> Result<Option<ResponseData>> {
        match &self.config.error_policy {
            ErrorPolicy::Suppress => {
                debug!(code = error.code(), %error, "suppressing fetch failure");
                Ok(None)
            }
            ErrorPolicy::Propagate => Err(error),
            ErrorPolicy::Delegate(handler) => {
                debug!(code = error.code(), "delegating fetch failure");
                let (settle, outcome) = Settle::channel();
                handler(error, args, settle);
                match outcome.await {
                    Ok(outcome) => outcome,
                    Err(_) => {
                        warn!("error handler dropped its settle handle");
                        Err(FetchError::Unsettled)
                    }
                }
            }
        }
    }
}

/// Decode a validated response according to its configured type.
///
/// Unsupported types fail before the body is touched, so the response
/// travels back inside the error unread.
pub async fn decode(kind: &ResponseType, response: Response) -> Result<ResponseData> {
    match kind {
        ResponseType::Text => Ok(ResponseData::Text(response.text().await?)),
        ResponseType::Json => Ok(ResponseData::Json(response.json().await?)),
        ResponseType::Dom => {
            let html = response.text().await?;
            Ok(ResponseData::Dom(parse_fragment(&html)?))
        }
        ResponseType::Blob => Ok(ResponseData::Blob(response.blob().await?)),
        ResponseType::Unsupported(name) => Err(FetchError::InvalidResponseType {
            kind: name.clone(),
            response: Box::new(response),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_decode_each_type() {
        let data = decode(&ResponseType::Text, Response::new(200, "hello")).await.unwrap();
        assert_eq!(data, ResponseData::Text("hello".to_string()));

        let data = decode(&ResponseType::Json, Response::new(200, "[1,2]")).await.unwrap();
        assert_eq!(data, ResponseData::Json(json!([1, 2])));

        let data = decode(&ResponseType::Dom, Response::new(200, "<em>x</em>")).await.unwrap();
        assert_eq!(data.as_dom().and_then(|node| node.tag_name()), Some("em"));

        let data = decode(&ResponseType::Blob, Response::new(200, vec![9u8])).await.unwrap();
        assert_eq!(data.as_blob().map(|blob| blob.size()), Some(1));
    }

    #[tokio::test]
    async fn test_decode_unsupported_leaves_body_unread() {
        let kind = ResponseType::from("xml");
        let error = decode(&kind, Response::new(200, "<a/>")).await.unwrap_err();

        assert_eq!(error.code(), "invalidResponseType");
        let response = error.into_response().unwrap();
        assert_eq!(response.text().await.unwrap(), "<a/>");
    }

    #[tokio::test]
    async fn test_decode_malformed_json() {
        let error = decode(&ResponseType::Json, Response::new(200, "{")).await.unwrap_err();
        assert_eq!(error.code(), "decode");
    }

    #[tokio::test]
    async fn test_missing_transport_goes_through_policy() {
        let fetcher = Fetcher {
            config: Arc::new(FetcherConfig::<()>::new().suppress_errors()),
            transport: None,
        };
        assert_eq!(fetcher.fetch(()).await.unwrap(), None);

        let fetcher = Fetcher {
            config: Arc::new(FetcherConfig::<()>::new()),
            transport: None,
        };
        assert_eq!(fetcher.fetch(()).await.unwrap_err().code(), "noTransport");
    }
}

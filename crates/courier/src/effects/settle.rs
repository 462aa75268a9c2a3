use std::fmt;

use tokio::sync::oneshot;

use crate::data::ResponseData;
use crate::error::{FetchError, Result};

pub(crate) type Outcome = Result<Option<ResponseData>>;

/// One-shot handle through which a delegated error handler finishes a call.
///
/// The handle may be used immediately or moved into a spawned task and used
/// later. Dropping it unused ends the call with [`FetchError::Unsettled`].
pub struct Settle {
    tx: oneshot::Sender<Outcome>,
}

impl Settle {
    pub(crate) fn channel() -> (Self, oneshot::Receiver<Outcome>) {
        let (tx, rx) = oneshot::channel();
        (Self { tx }, rx)
    }

    /// Complete the call successfully. Pass `None` for an empty result.
    pub fn resolve(self, value: impl Into<Option<ResponseData>>) {
        // The caller may have stopped waiting; nothing to do then.
        let _ = self.tx.send(Ok(value.into()));
    }

    /// Complete the call with an error.
    pub fn reject(self, error: FetchError) {
        let _ = self.tx.send(Err(error));
    }
}

impl fmt::Debug for Settle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settle")
            .field("closed", &self.tx.is_closed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_resolve() {
        let (settle, rx) = Settle::channel();
        settle.resolve(ResponseData::Json(json!(1)));
        assert_eq!(rx.await.unwrap().unwrap(), Some(ResponseData::Json(json!(1))));
    }

    #[tokio::test]
    async fn test_resolve_empty() {
        let (settle, rx) = Settle::channel();
        settle.resolve(None);
        assert_eq!(rx.await.unwrap().unwrap(), None);
    }

    #[tokio::test]
    async fn test_reject() {
        let (settle, rx) = Settle::channel();
        settle.reject(FetchError::NoTransport);
        assert_eq!(rx.await.unwrap().unwrap_err().code(), "noTransport");
    }

    #[tokio::test]
    async fn test_drop_closes_channel() {
        let (settle, rx) = Settle::channel();
        drop(settle);
        assert!(rx.await.is_err());
    }
}

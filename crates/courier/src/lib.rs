//! Reusable HTTP fetchers built from declarative options.
//!
//! A [`FetcherConfig`] says how to turn call arguments into a URI, a query
//! string and a body, how to decode the response and when to treat it as a
//! failure. [`create_fetcher`] turns it into a [`Fetcher`] that performs one
//! independent request per call.
//!
//! # Architecture
//!
//! This crate follows the three-layer pattern:
//! - [`data`] - Immutable configuration and types
//! - [`core`] - Pure transformations
//! - [`effects`] - I/O operations with trait abstraction
//!
//! # Example
//!
//! ```no_run
//! use courier::{FetcherConfig, ResponseData, create_fetcher};
//! use serde_json::json;
//!
//! # async fn run() -> Result<(), courier::FetchError> {
//! let users = create_fetcher(
//!     FetcherConfig::<u64>::new()
//!         .base("https://api.example.com/1.0/")
//!         .build_uri(|_request, id| format!("users/{id}"))
//!         .build_query(|_request, _id| json!({ "expand": "profile" })),
//! );
//!
//! if let Some(ResponseData::Json(user)) = users.fetch(12).await? {
//!     println!("{}", user["name"]);
//! }
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod data;
pub mod effects;
mod error;

pub use crate::core::{BodyPayload, QueryPayload};
pub use data::{
    Blob, DomNode, ErrorPolicy, FetcherConfig, FetcherSettings, FormData, FormValue, RequestBody,
    RequestInit, Response, ResponseData, ResponseType,
};
pub use effects::{Fetcher, Settle, Transport, create_fetcher};

#[cfg(feature = "reqwest")]
pub use effects::ReqwestTransport;

pub use error::{BoxError, FetchError, Result};

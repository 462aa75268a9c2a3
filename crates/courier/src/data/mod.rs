//! Immutable data types: configuration, request and response values.
//!
//! The configuration is built once and shared by every call; the request
//! descriptor and the decoded response live for a single call only.

pub mod config;
pub mod dom;
pub mod request;
pub mod response;
pub mod response_type;
pub mod settings;

pub use config::{ErrorHandler, ErrorPolicy, FetcherConfig, ResponseFilter};
pub use dom::DomNode;
pub use request::{FormData, FormField, FormValue, RequestBody, RequestInit};
pub use response::{Blob, BodyStream, BoxStream, Response, ResponseData};
pub use response_type::ResponseType;
pub use settings::FetcherSettings;

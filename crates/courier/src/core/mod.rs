//! Pure transformations: everything a call computes before and after I/O.
//!
//! Nothing in here touches the network; builders and parsers are plain
//! functions of their inputs.

mod body;
mod coerce;
mod html;
mod query;
mod uri;

pub use body::{BodyPayload, fields_to_form};
pub use coerce::coerce_to_string;
pub use html::parse_fragment;
pub use query::{QueryPayload, encode_query};
pub use uri::{compose_uri, prepare_request};

//! I/O: sending requests and driving a call to completion.
//!
//! Everything that awaits lives here, behind the [`Transport`] trait so the
//! network can be swapped out.

mod fetcher;
mod settle;
mod transport;

pub use fetcher::{Fetcher, create_fetcher, decode};
pub use settle::Settle;
pub use transport::Transport;

#[cfg(feature = "reqwest")]
pub use transport::ReqwestTransport;

//! Transport implementations.
//!
//! - `ReqwestTransport` - Real HTTP via `reqwest`
//! - `MockTransport` - Scripted replies for testing

mod http;
mod mock;

pub use http::ReqwestTransport;
pub use mock::{MockReply, MockTransport};

// Re-export from traits for convenience
pub use crate::traits::transport::{HttpRequest, HttpResponse, HttpTransport, Method};

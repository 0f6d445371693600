//! HTTP request/response model and the network transport.

mod connectivity;
mod message;
mod transport;

pub use connectivity::Connectivity;
pub use message::{HttpRequest, HttpResponse, ResponseOrigin};
pub use transport::{DEFAULT_TIMEOUT, ReqwestTransport, Transport};

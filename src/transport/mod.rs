//! HTTP transport layer for the Gemini media client.

mod error;
mod http;
mod reqwest;
mod request;
mod response;
pub mod endpoints;

pub use error::TransportError;
pub use http::{HttpMethod, HttpRequest, HttpResponse, HttpTransport};
pub use self::reqwest::ReqwestTransport;
pub use request::RequestBuilder;
pub use response::ResponseParser;

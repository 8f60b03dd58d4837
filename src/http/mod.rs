//! HTTP protocol layer module
//!
//! Hand-rolled HTTP/1.1 subset: one request per connection, fixed-length
//! bodies only, JSON responses. Decoupled from the food-ordering handlers.

pub mod request;
pub mod response;

// Re-export commonly used types
pub use request::{query_param, read_request, Incoming, ParseError, Request};
pub use response::Response;

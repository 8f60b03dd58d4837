//! Routing module
//!
//! Provides declarative route matching:
//! - Segment templates with named captures
//! - Ordered method + pattern table, first match wins

mod matcher;
mod table;

pub use matcher::{PathParams, PathPattern};
pub use table::{Endpoint, Route, RouteTable};

//! Request handler module
//!
//! One async function per endpoint. Each validates its inputs, makes one call
//! into the [`FoodService`](crate::service::FoodService) and renders the JSON
//! envelope. Every failure becomes an error envelope here; nothing escapes to
//! the connection task.

mod couriers;
mod orders;
mod reports;
mod restaurants;
pub mod router;
mod users;

pub use router::handle_request;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::http::Response;
use crate::logger;
use crate::routing::PathParams;
use crate::service::ServiceError;

/// `Err` carries an error envelope that is sent as-is
type HandlerResult = Result<Response, Response>;

/// `{"success": true, ...fields}`, with `success` first
fn success(fields: Value) -> Response {
    let mut body = Map::new();
    body.insert("success".to_string(), Value::Bool(true));
    if let Value::Object(fields) = fields {
        body.extend(fields);
    }
    Response::ok(&Value::Object(body))
}

/// Numeric path capture, or 400 with `message`
fn path_id(params: &PathParams, name: &str, message: &str) -> Result<i32, Response> {
    params
        .int(name)
        .ok_or_else(|| Response::bad_request(message))
}

/// Deserialize a JSON request body; parser errors are reported under `action`
fn parse_body<T: DeserializeOwned>(body: &str, action: &str) -> Result<T, Response> {
    serde_json::from_str(body).map_err(|e| Response::bad_request(format!("Error al {action}: {e}")))
}

/// Downstream failure reported under `action` with the default status
fn failure(action: &str, err: &ServiceError) -> Response {
    if err.is_not_found() {
        logger::log_debug(&format!("{action}: {err}"));
    } else {
        logger::log_error(&format!("{action}: {err}"));
    }
    Response::bad_request(format!("Error al {action}: {err}"))
}

/// Optional `?estado=` filter; an empty value means no filter
fn estado_filter(target: &str) -> Option<&str> {
    crate::http::query_param(target, "estado").filter(|estado| !estado.is_empty())
}

/// Report timestamp in epoch milliseconds
fn report_timestamp() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

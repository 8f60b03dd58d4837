//! HTTP response building module
//!
//! Every answer is a JSON envelope written in one buffer and followed by a
//! connection close. Builders here cover the fixed responses; handlers build
//! their own success bodies with [`Response::json`].

use hyper::StatusCode;
use serde_json::{json, Value};

pub const NOT_FOUND_MESSAGE: &str = "Ruta no encontrada";
pub const BAD_REQUEST_MESSAGE: &str = "Petición inválida";

/// Written when the real response could not be sent
pub const FALLBACK_500: &[u8] = b"HTTP/1.1 500 Internal Server Error\r\nConnection: close\r\n\r\n";

/// A fully buffered response
#[derive(Debug, Clone)]
pub struct Response {
    pub status: StatusCode,
    pub headers: Vec<(&'static str, String)>,
    pub body: Vec<u8>,
}

impl Response {
    /// JSON response with the standard headers
    pub fn json(status: StatusCode, value: &Value) -> Self {
        Self {
            status,
            headers: vec![
                ("Content-Type", "application/json".to_string()),
                ("Access-Control-Allow-Origin", "*".to_string()),
            ],
            body: value.to_string().into_bytes(),
        }
    }

    /// 200 with `value` as the body
    pub fn ok(value: &Value) -> Self {
        Self::json(StatusCode::OK, value)
    }

    /// `{"success": false, "error": message}`
    pub fn error(status: StatusCode, message: impl Into<String>) -> Self {
        Self::json(
            status,
            &json!({
                "success": false,
                "error": message.into(),
            }),
        )
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::error(StatusCode::BAD_REQUEST, message)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::error(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn not_found() -> Self {
        Self::error(StatusCode::NOT_FOUND, NOT_FOUND_MESSAGE)
    }

    pub fn malformed_request() -> Self {
        Self::bad_request(BAD_REQUEST_MESSAGE)
    }

    pub fn payload_too_large(limit: usize) -> Self {
        Self::error(
            StatusCode::PAYLOAD_TOO_LARGE,
            format!("El cuerpo de la petición excede {limit} bytes"),
        )
    }

    pub fn head_too_large(limit: usize) -> Self {
        Self::error(
            StatusCode::REQUEST_HEADER_FIELDS_TOO_LARGE,
            format!("Los encabezados de la petición exceden {limit} bytes"),
        )
    }

    /// CORS preflight answer: 200, no body
    pub fn preflight() -> Self {
        Self {
            status: StatusCode::OK,
            headers: vec![
                ("Access-Control-Allow-Origin", "*".to_string()),
                (
                    "Access-Control-Allow-Methods",
                    "POST, GET, PUT, DELETE, OPTIONS".to_string(),
                ),
                ("Access-Control-Allow-Headers", "Content-Type".to_string()),
            ],
            body: Vec::new(),
        }
    }

    /// Serialize status line, headers and body into one buffer.
    ///
    /// `Connection: close` is always present. `Content-Length` is left out when
    /// `close_delimited` is set, so the peer reads until the socket closes.
    pub fn to_bytes(&self, close_delimited: bool) -> Vec<u8> {
        let mut head = format!(
            "HTTP/1.1 {} {}\r\n",
            self.status.as_u16(),
            self.status.canonical_reason().unwrap_or("")
        );
        for (name, value) in &self.headers {
            head.push_str(name);
            head.push_str(": ");
            head.push_str(value);
            head.push_str("\r\n");
        }
        if !close_delimited {
            head.push_str(&format!("Content-Length: {}\r\n", self.body.len()));
        }
        head.push_str("Connection: close\r\n\r\n");

        let mut out = head.into_bytes();
        out.extend_from_slice(&self.body);
        out
    }
}

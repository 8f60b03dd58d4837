//! HTTP request parsing
//!
//! Reads exactly one request from a connection. Parsing walks
//! `StartLine -> Headers -> Body -> Done`; `OPTIONS` requests stop after the
//! headers so their body is never read.
//!
//! The request line and headers are decoded lossily: a byte that is not valid
//! UTF-8 becomes U+FFFD instead of failing the request.

use hyper::Method;
use std::io;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt};

/// A parsed request
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    /// Raw request target, query string included
    pub target: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

/// What the connection should answer
#[derive(Debug)]
pub enum Incoming {
    /// CORS preflight, answered without reading a body
    Preflight(Request),
    Request(Request),
}

/// Upper bound on the request line plus all header lines
pub const MAX_HEAD_BYTES: usize = 8 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("connection closed before a request line was received")]
    Empty,
    #[error("malformed request line: {0:?}")]
    RequestLine(String),
    #[error("request head exceeds {limit} bytes")]
    HeadTooLarge { limit: usize },
    #[error("declared body of {declared} bytes exceeds limit of {limit} bytes")]
    BodyTooLarge { declared: usize, limit: usize },
    #[error("read failed: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    StartLine,
    Headers,
    Body { remaining: usize },
    Done,
}

impl Request {
    /// Path without the query string
    pub fn path(&self) -> &str {
        self.target
            .split_once('?')
            .map_or(self.target.as_str(), |(path, _)| path)
    }

    /// Case-insensitive header lookup, first occurrence wins
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Declared body length; absent or unparsable means 0
    pub fn content_length(&self) -> usize {
        self.header("Content-Length")
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(0)
    }
}

/// Look up `name` in the query string of `target`.
///
/// The target is split on the first `?`, the query on `&`, and each pair on
/// its first `=`. A pair without `=` carries no value.
pub fn query_param<'a>(target: &'a str, name: &str) -> Option<&'a str> {
    let (_, query) = target.split_once('?')?;
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}

/// Read one request from `reader`.
///
/// A declared `Content-Length` above `max_body_size` is rejected before any
/// body byte is read. A body shorter than declared is accepted as received.
pub async fn read_request<R>(reader: &mut R, max_body_size: usize) -> Result<Incoming, ParseError>
where
    R: AsyncBufRead + Unpin,
{
    let mut state = ParseState::StartLine;
    let mut request = Request {
        method: Method::GET,
        target: String::new(),
        headers: Vec::new(),
        body: String::new(),
    };
    let mut line = Vec::new();
    let mut head_budget = MAX_HEAD_BYTES;

    loop {
        state = match state {
            ParseState::StartLine => {
                if read_head_line(reader, &mut line, &mut head_budget).await? == 0 {
                    return Err(ParseError::Empty);
                }
                let (method, target) = parse_request_line(&String::from_utf8_lossy(&line))?;
                request.method = method;
                request.target = target;
                ParseState::Headers
            }
            ParseState::Headers => {
                let n = read_head_line(reader, &mut line, &mut head_budget).await?;
                let text = String::from_utf8_lossy(&line);
                let header = text.trim_end_matches(['\r', '\n']);
                if n == 0 || header.is_empty() {
                    if request.method == Method::OPTIONS {
                        return Ok(Incoming::Preflight(request));
                    }
                    let declared = request.content_length();
                    if declared > max_body_size {
                        return Err(ParseError::BodyTooLarge {
                            declared,
                            limit: max_body_size,
                        });
                    }
                    ParseState::Body { remaining: declared }
                } else {
                    if let Some((key, value)) = header.split_once(':') {
                        request
                            .headers
                            .push((key.trim().to_string(), value.trim().to_string()));
                    }
                    ParseState::Headers
                }
            }
            ParseState::Body { remaining: 0 } => ParseState::Done,
            ParseState::Body { remaining } => {
                let mut buf = Vec::with_capacity(remaining);
                let limit = u64::try_from(remaining).unwrap_or(u64::MAX);
                (&mut *reader).take(limit).read_to_end(&mut buf).await?;
                request.body = String::from_utf8_lossy(&buf).into_owned();
                ParseState::Done
            }
            ParseState::Done => return Ok(Incoming::Request(request)),
        };
    }
}

/// Read one `\n`-terminated line of the head into `line`, charging it to
/// `budget`. Returns 0 at EOF.
async fn read_head_line<R>(
    reader: &mut R,
    line: &mut Vec<u8>,
    budget: &mut usize,
) -> Result<usize, ParseError>
where
    R: AsyncBufRead + Unpin,
{
    if *budget == 0 {
        return Err(ParseError::HeadTooLarge {
            limit: MAX_HEAD_BYTES,
        });
    }
    line.clear();
    let limit = u64::try_from(*budget).unwrap_or(u64::MAX);
    let n = (&mut *reader).take(limit).read_until(b'\n', line).await?;
    *budget -= n;
    if *budget == 0 && line.last() != Some(&b'\n') {
        return Err(ParseError::HeadTooLarge {
            limit: MAX_HEAD_BYTES,
        });
    }
    Ok(n)
}

/// Split the request line on whitespace; method and target are the first two tokens
fn parse_request_line(line: &str) -> Result<(Method, String), ParseError> {
    let mut parts = line.split_whitespace();
    let (Some(method), Some(target)) = (parts.next(), parts.next()) else {
        return Err(ParseError::RequestLine(line.trim_end().to_string()));
    };
    let method = Method::from_bytes(method.as_bytes())
        .map_err(|_| ParseError::RequestLine(line.trim_end().to_string()))?;
    Ok((method, target.to_string()))
}

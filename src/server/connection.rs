// Connection handling module
// One spawned task per accepted connection: parse, route, respond, close

use std::io;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::io::{AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::config::AppState;
use crate::handler;
use crate::http::{read_request, response::FALLBACK_500, Incoming, ParseError, Response};
use crate::logger::{self, AccessLogEntry};

/// Most of a refused request read and discarded before closing
const DRAIN_LIMIT: u64 = 64 * 1024;
const DRAIN_TIMEOUT: Duration = Duration::from_secs(1);

/// Accept a connection, checking the connection limit, and serve it on its
/// own task.
pub fn accept_connection(
    stream: TcpStream,
    peer_addr: SocketAddr,
    state: &Arc<AppState>,
    conn_counter: &Arc<AtomicUsize>,
) {
    // Increment counter first, then check limit (prevents race condition)
    let prev_count = conn_counter.fetch_add(1, Ordering::SeqCst);

    if let Some(max_conn) = state.config.performance.max_connections {
        if prev_count >= usize::try_from(max_conn).unwrap_or(usize::MAX) {
            // Exceeded limit: rollback counter and reject
            conn_counter.fetch_sub(1, Ordering::SeqCst);
            logger::log_warning(&format!(
                "Max connections reached: {prev_count}/{max_conn}. Connection rejected."
            ));
            drop(stream);
            return;
        }
    }

    if state.access_log_enabled() {
        logger::log_connection_accepted(&peer_addr);
    }

    let state = Arc::clone(state);
    let conn_counter = Arc::clone(conn_counter);
    tokio::spawn(async move {
        handle_connection(stream, peer_addr, &state).await;
        conn_counter.fetch_sub(1, Ordering::SeqCst);
    });
}

/// Serve exactly one request on `stream`; the stream is closed on every path.
async fn handle_connection(mut stream: TcpStream, peer_addr: SocketAddr, state: &AppState) {
    let started = Instant::now();
    let perf = &state.config.performance;
    let read_timeout = Duration::from_secs(perf.read_timeout);
    let write_timeout = Duration::from_secs(perf.write_timeout);
    let max_body_size = usize::try_from(state.config.http.max_body_size).unwrap_or(usize::MAX);

    let mut entry = AccessLogEntry::new(peer_addr.ip().to_string());

    let parsed = {
        let mut reader = BufReader::new(&mut stream);
        match timeout(read_timeout, read_request(&mut reader, max_body_size)).await {
            Ok(parsed) => parsed,
            Err(_) => {
                logger::log_warning(&format!(
                    "Read timeout after {} seconds from {peer_addr}",
                    read_timeout.as_secs()
                ));
                return;
            }
        }
    };

    let mut unread = None;
    let response = match parsed {
        Ok(Incoming::Preflight(req)) => {
            entry.set_target(req.method.as_str(), &req.target);
            Response::preflight()
        }
        Ok(Incoming::Request(req)) => {
            entry.set_target(req.method.as_str(), &req.target);
            entry.user_agent = req.header("User-Agent").map(ToString::to_string);
            handler::handle_request(&req, state).await
        }
        Err(err @ ParseError::Empty) => {
            logger::log_debug(&format!("Connection {peer_addr}: {err}"));
            Response::malformed_request()
        }
        Err(err @ ParseError::RequestLine(_)) => {
            logger::log_connection_error(&peer_addr, &err);
            Response::malformed_request()
        }
        Err(err @ ParseError::HeadTooLarge { limit }) => {
            logger::log_connection_error(&peer_addr, &err);
            unread = Some(DRAIN_LIMIT);
            Response::head_too_large(limit)
        }
        Err(err @ ParseError::BodyTooLarge { declared, limit }) => {
            logger::log_connection_error(&peer_addr, &err);
            unread = Some(u64::try_from(declared).unwrap_or(u64::MAX).min(DRAIN_LIMIT));
            Response::payload_too_large(limit)
        }
        Err(ParseError::Io(e)) if peer_gone(&e) => {
            logger::log_connection_error(&peer_addr, &e);
            return;
        }
        Err(err @ ParseError::Io(_)) => {
            logger::log_connection_error(&peer_addr, &err);
            Response::malformed_request()
        }
    };

    send_response(
        &mut stream,
        &response,
        state.config.http.close_delimited,
        write_timeout,
        &peer_addr,
        &mut entry,
    )
    .await;
    let _ = stream.shutdown().await;

    // Closing with unread input resets the connection, which can discard the
    // answer before the peer reads it
    if let Some(limit) = unread {
        let mut discard = (&mut stream).take(limit);
        let sink = &mut tokio::io::sink();
        let _ = timeout(DRAIN_TIMEOUT, tokio::io::copy(&mut discard, sink)).await;
    }

    if state.access_log_enabled() {
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }
}

/// Write `response` within `write_timeout`. If the write fails a bare 500 is
/// attempted and the access log records 500.
async fn send_response<W>(
    writer: &mut W,
    response: &Response,
    close_delimited: bool,
    write_timeout: Duration,
    peer_addr: &SocketAddr,
    entry: &mut AccessLogEntry,
) where
    W: AsyncWrite + Unpin,
{
    let bytes = response.to_bytes(close_delimited);
    match timeout(write_timeout, writer.write_all(&bytes)).await {
        Ok(Ok(())) => {
            entry.status = response.status.as_u16();
            entry.body_bytes = response.body.len();
        }
        Ok(Err(e)) => {
            logger::log_connection_error(peer_addr, &e);
            // Best effort; the peer may already be gone
            let _ = writer.write_all(FALLBACK_500).await;
            entry.status = 500;
        }
        Err(_) => {
            logger::log_warning(&format!(
                "Write timeout after {} seconds to {peer_addr}",
                write_timeout.as_secs()
            ));
            entry.status = 500;
        }
    }
}

/// Errors after which nothing can be written back
fn peer_gone(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::BrokenPipe
            | io::ErrorKind::NotConnected
    )
}

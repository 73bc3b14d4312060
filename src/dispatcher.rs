//! Outbound gesture tokens over a non-blocking TCP stream.
//!
//! Delivery is at-most-once per stable tick. A full send buffer is `Busy`
//! and the next repeat of a held gesture is the retry. Anything else is
//! `Failed` and ends the session; there is no reconnect.

use std::io::{self, Write};
use std::net::{Shutdown, TcpStream};
use std::time::Duration;

use thiserror::Error;

use crate::gesture::GestureLabel;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    Sent,
    Busy,
    Failed(String),
}

#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("could not connect to {addr}: {source}")]
    Io { addr: String, source: io::Error },
    #[error("timed out connecting to {addr} after {timeout:?}")]
    Timeout { addr: String, timeout: Duration },
}

/// The write half the dispatcher owns. Implementations must never block.
pub trait Connection: Send {
    fn try_write(&mut self, buf: &[u8]) -> io::Result<usize>;
    fn close(&mut self) -> io::Result<()>;
}

impl Connection for TcpStream {
    fn try_write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write(buf)
    }

    fn close(&mut self) -> io::Result<()> {
        self.shutdown(Shutdown::Both)
    }
}

/// Open a TCP connection and hand it back in non-blocking mode.
pub async fn connect(host: &str, port: u16, timeout: Duration) -> Result<TcpStream, ConnectError> {
    let addr = format!("{host}:{port}");
    let stream = match tokio::time::timeout(timeout, tokio::net::TcpStream::connect(&addr)).await {
        Ok(Ok(stream)) => stream,
        Ok(Err(source)) => return Err(ConnectError::Io { addr, source }),
        Err(_) => return Err(ConnectError::Timeout { addr, timeout }),
    };

    let io_err = |source| ConnectError::Io {
        addr: addr.clone(),
        source,
    };
    stream.set_nodelay(true).map_err(io_err)?;
    // tokio leaves the std socket in non-blocking mode; set it anyway so the
    // contract does not depend on that.
    let stream = stream.into_std().map_err(io_err)?;
    stream.set_nonblocking(true).map_err(io_err)?;

    log::info!("Connected to {addr}");
    Ok(stream)
}

pub struct Dispatcher<C: Connection> {
    conn: Option<C>,
}

impl<C: Connection> Dispatcher<C> {
    pub fn new(conn: C) -> Self {
        Self { conn: Some(conn) }
    }

    /// Write the label's token once, without blocking.
    ///
    /// A short write is reported as `Busy`, but the partial bytes are already
    /// on the unframed stream: the receiver sees a broken token that runs
    /// into whatever is sent next.
    pub fn try_send(&mut self, label: GestureLabel) -> SendOutcome {
        let Some(token) = label.token() else {
            return SendOutcome::Failed(format!("label {label:?} has no wire token"));
        };
        let Some(conn) = self.conn.as_mut() else {
            return SendOutcome::Failed("connection already closed".into());
        };

        match conn.try_write(token.as_bytes()) {
            Ok(n) if n == token.len() => SendOutcome::Sent,
            Ok(0) => SendOutcome::Failed("connection closed by peer".into()),
            Ok(n) => {
                // Tokens are unframed, so the receiver sees a truncated token.
                log::warn!("Short write of {token:?}: {n} of {} bytes", token.len());
                SendOutcome::Busy
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => SendOutcome::Busy,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => SendOutcome::Busy,
            Err(e) => SendOutcome::Failed(e.to_string()),
        }
    }

    /// Shut the connection down. Safe to call more than once.
    pub fn close(&mut self) {
        if let Some(mut conn) = self.conn.take() {
            match conn.close() {
                Ok(()) => log::info!("Connection closed"),
                // Already torn down by the peer.
                Err(e) if e.kind() == io::ErrorKind::NotConnected => {}
                Err(e) => log::warn!("Error closing connection: {e}"),
            }
        }
    }
}

impl<C: Connection> Drop for Dispatcher<C> {
    fn drop(&mut self) {
        self.close();
    }
}

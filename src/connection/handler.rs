//! Connection Handler
//!
//! One handler per client, running on its own task.
//!
//! ## Connection Lifecycle
//!
//! ```text
//! 1. Client connects
//!        │
//!        ▼
//! 2. ConnectionHandler created with this connection's codec
//!        │
//!        ▼
//! 3. ┌──────────────────────────────┐
//!    │  decode ──> dispatch ──>     │
//!    │  encode ──> write + flush    │
//!    │         [loop back]          │
//!    └──────────────────────────────┘
//!        │
//!        ▼
//! 4. EOF (graceful) or decode / I/O error (logged)
//! ```
//!
//! Bytes accumulate in a `BytesMut` because a read may end mid-frame or
//! carry several frames at once. Replies go out one per command, in order.
//!
//! A decode error ends the connection without a reply; after a malformed
//! frame there is no way to find where the next one starts.

use crate::commands::CommandHandler;
use crate::protocol::parser::MAX_BULK_SIZE;
use crate::protocol::{Codec, ParseError, Protocol, RespValue};
use bytes::{Buf, BytesMut};
use std::net::SocketAddr;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufWriter};
use tracing::{debug, error, info, trace, warn};

/// Largest amount of unparsed data held for one client: a maximal bulk
/// string plus room for its framing.
const MAX_BUFFER_SIZE: usize = MAX_BULK_SIZE + 64 * 1024;

const INITIAL_BUFFER_SIZE: usize = 4096;

/// Serves a single client connection.
///
/// Generic over the stream so the loop can run against a TCP socket or an
/// in-memory mock.
pub struct ConnectionHandler<S> {
    stream: BufWriter<S>,

    /// Peer address, for logging only
    addr: SocketAddr,

    /// Bytes read but not yet decoded
    buffer: BytesMut,

    command_handler: CommandHandler,

    codec: Box<dyn Codec>,

    /// Reused across replies
    reply: Vec<u8>,
}

impl<S> ConnectionHandler<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Creates a handler speaking `protocol` on `stream`.
    pub fn new(
        stream: S,
        addr: SocketAddr,
        command_handler: CommandHandler,
        protocol: Protocol,
    ) -> Self {
        Self {
            stream: BufWriter::new(stream),
            addr,
            buffer: BytesMut::with_capacity(INITIAL_BUFFER_SIZE),
            command_handler,
            codec: protocol.codec(),
            reply: Vec::with_capacity(64),
        }
    }

    /// Serves commands until the client goes away or the stream breaks.
    ///
    /// A clean close (EOF with nothing buffered) is `Ok(())`.
    pub async fn run(mut self) -> Result<(), ConnectionError> {
        debug!(client = %self.addr, "Client connected");

        let result = match self.main_loop().await {
            Err(ConnectionError::ClientDisconnected) => Ok(()),
            other => other,
        };

        match &result {
            Ok(()) => debug!(client = %self.addr, "Client disconnected"),
            Err(ConnectionError::Io(e)) if e.kind() == std::io::ErrorKind::ConnectionReset => {
                debug!(client = %self.addr, "Connection reset by client")
            }
            Err(e) => warn!(client = %self.addr, error = %e, "Closing connection"),
        }

        result
    }

    async fn main_loop(&mut self) -> Result<(), ConnectionError> {
        loop {
            while let Some(command) = self.next_command()? {
                let response = self.command_handler.execute(&command);
                self.send_response(&response).await?;
            }

            self.read_more_data().await?;
        }
    }

    /// Decodes buffered requests until one yields a command to run.
    ///
    /// Blank lines and null arrays are consumed and skipped.
    fn next_command(&mut self) -> Result<Option<Vec<bytes::Bytes>>, ConnectionError> {
        while !self.buffer.is_empty() {
            let Some((request, consumed)) = self.codec.decode(&self.buffer)? else {
                trace!(
                    client = %self.addr,
                    buffered = self.buffer.len(),
                    "Incomplete frame, need more data"
                );
                return Ok(None);
            };

            self.buffer.advance(consumed);
            trace!(
                client = %self.addr,
                consumed = consumed,
                remaining = self.buffer.len(),
                "Decoded request"
            );

            if let Some(command) = request.into_command() {
                return Ok(Some(command));
            }
        }

        Ok(None)
    }

    async fn read_more_data(&mut self) -> Result<(), ConnectionError> {
        if self.buffer.len() >= MAX_BUFFER_SIZE {
            error!(
                client = %self.addr,
                size = self.buffer.len(),
                "Buffer size limit exceeded"
            );
            return Err(ConnectionError::BufferFull);
        }

        if self.buffer.capacity() - self.buffer.len() < 1024 {
            self.buffer.reserve(INITIAL_BUFFER_SIZE);
        }

        let n = self.stream.get_mut().read_buf(&mut self.buffer).await?;

        if n == 0 {
            return if self.buffer.is_empty() {
                Err(ConnectionError::ClientDisconnected)
            } else {
                Err(ConnectionError::UnexpectedEof {
                    buffered: self.buffer.len(),
                })
            };
        }

        trace!(client = %self.addr, bytes = n, "Read data");
        Ok(())
    }

    async fn send_response(&mut self, response: &RespValue) -> Result<(), ConnectionError> {
        self.reply.clear();
        self.codec.encode(response, &mut self.reply);

        self.stream.write_all(&self.reply).await?;
        self.stream.flush().await?;

        trace!(client = %self.addr, bytes = self.reply.len(), "Sent response");
        Ok(())
    }
}

/// Why a connection ended.
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// The client closed the stream between frames.
    #[error("Client disconnected")]
    ClientDisconnected,

    /// The client closed the stream in the middle of a frame.
    #[error("Unexpected end of stream with {buffered} bytes of a partial frame buffered")]
    UnexpectedEof { buffered: usize },

    #[error("Buffer size limit exceeded")]
    BufferFull,
}

/// Serves one accepted connection to completion.
///
/// Errors are logged by [`ConnectionHandler::run`]; nothing is returned
/// because no connection failure concerns the rest of the server.
pub async fn handle_connection<S>(
    stream: S,
    addr: SocketAddr,
    command_handler: CommandHandler,
    protocol: Protocol,
) where
    S: AsyncRead + AsyncWrite + Unpin,
{
    info!(client = %addr, "Accepted connection");
    let _ = ConnectionHandler::new(stream, addr, command_handler, protocol)
        .run()
        .await;
}

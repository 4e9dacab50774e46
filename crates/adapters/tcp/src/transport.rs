//! TCP transport to the hub command port.

use std::io;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpSocket, TcpStream, lookup_host};

use neohub_domain::error::{HubError, TransportError};

const READ_CHUNK: usize = 4096;

/// One open TCP connection to a hub.
///
/// Requests are written whole; responses are read until a caller-supplied
/// extractor recognises a complete message.
#[derive(Debug)]
pub struct Transport {
    stream: TcpStream,
}

impl Transport {
    /// Open a connection with no-delay and keep-alive enabled.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::ConnectTimeout`] when no connection is
    /// established within `connect_timeout`, or [`TransportError::Connect`]
    /// when resolution or every resolved address fails.
    #[tracing::instrument(skip(connect_timeout))]
    pub async fn connect(
        address: &str,
        port: u16,
        connect_timeout: Duration,
    ) -> Result<Self, TransportError> {
        let stream = tokio::time::timeout(connect_timeout, open_stream(address, port))
            .await
            .map_err(|_| TransportError::ConnectTimeout)??;
        stream.set_nodelay(true).map_err(TransportError::Connect)?;
        tracing::debug!("connected to hub");
        Ok(Self { stream })
    }

    /// Write `bytes` in full.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Send`] on any write failure.
    pub async fn send(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        tracing::trace!(payload = %String::from_utf8_lossy(bytes), "tx");
        self.stream
            .write_all(bytes)
            .await
            .map_err(TransportError::Send)?;
        self.stream.flush().await.map_err(TransportError::Send)
    }

    /// Read until `extract` yields a message, within `recv_timeout`.
    ///
    /// `extract` sees the whole buffer accumulated for this call and returns
    /// `Ok(None)` while the message is incomplete.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::RecvTimeout`], [`TransportError::Recv`],
    /// [`TransportError::Closed`], or whatever `extract` fails with.
    pub async fn recv<T, F>(&mut self, extract: F, recv_timeout: Duration) -> Result<T, HubError>
    where
        F: FnMut(&[u8]) -> Result<Option<T>, HubError>,
    {
        tokio::time::timeout(recv_timeout, self.read_until(extract))
            .await
            .map_err(|_| TransportError::RecvTimeout)?
    }

    async fn read_until<T, F>(&mut self, mut extract: F) -> Result<T, HubError>
    where
        F: FnMut(&[u8]) -> Result<Option<T>, HubError>,
    {
        let mut buffer = Vec::with_capacity(READ_CHUNK);
        let mut chunk = [0u8; READ_CHUNK];
        loop {
            let read = self
                .stream
                .read(&mut chunk)
                .await
                .map_err(TransportError::Recv)?;
            if read == 0 {
                return Err(TransportError::Closed.into());
            }
            tracing::trace!(payload = %String::from_utf8_lossy(&chunk[..read]), "rx");
            buffer.extend_from_slice(&chunk[..read]);
            if let Some(message) = extract(&buffer)? {
                return Ok(message);
            }
        }
    }

    /// Drop bytes that are already buffered by the socket, such as the late
    /// response to a request that timed out.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Recv`] on a read failure and
    /// [`TransportError::Closed`] if the peer has closed the connection.
    pub fn discard_pending(&mut self) -> Result<usize, TransportError> {
        let mut chunk = [0u8; READ_CHUNK];
        let mut discarded = 0;
        loop {
            match self.stream.try_read(&mut chunk) {
                Ok(0) => return Err(TransportError::Closed),
                Ok(read) => discarded += read,
                Err(err) if err.kind() == io::ErrorKind::WouldBlock => break,
                Err(err) => return Err(TransportError::Recv(err)),
            }
        }
        if discarded > 0 {
            tracing::debug!(bytes = discarded, "discarded stale response data");
        }
        Ok(discarded)
    }

    /// Close the write half and release the socket. Errors are logged only.
    pub async fn shutdown(mut self) {
        if let Err(err) = self.stream.shutdown().await {
            tracing::debug!(error = %err, "error while closing hub connection");
        }
    }
}

async fn open_stream(address: &str, port: u16) -> Result<TcpStream, TransportError> {
    let mut last_error = None;
    for addr in lookup_host((address, port))
        .await
        .map_err(TransportError::Connect)?
    {
        let socket = if addr.is_ipv4() {
            TcpSocket::new_v4()
        } else {
            TcpSocket::new_v6()
        }
        .map_err(TransportError::Connect)?;
        socket
            .set_keepalive(true)
            .map_err(TransportError::Connect)?;
        match socket.connect(addr).await {
            Ok(stream) => return Ok(stream),
            Err(err) => {
                tracing::debug!(%addr, error = %err, "connect attempt failed");
                last_error = Some(err);
            }
        }
    }
    Err(TransportError::Connect(last_error.unwrap_or_else(|| {
        io::Error::new(io::ErrorKind::NotFound, "hub address did not resolve")
    })))
}

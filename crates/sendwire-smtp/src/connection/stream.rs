//! Low-level SMTP stream handling.

use crate::error::{Error, Result};
use std::fmt;
use std::io;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::time::timeout;

/// Longest reply line accepted from a server, terminator included.
const MAX_LINE_LENGTH: u64 = 8192;

/// Byte stream an SMTP dialogue can run over (TCP, TLS, or a test double).
pub trait Io: AsyncRead + AsyncWrite + Unpin + Send {}

impl<T> Io for T where T: AsyncRead + AsyncWrite + Unpin + Send {}

/// Type-erased [`Io`] so plaintext and TLS connections share one stream type.
pub type BoxedIo = Box<dyn Io>;

/// Buffered SMTP stream with a per-operation timeout.
pub struct SmtpStream {
    reader: BufReader<BoxedIo>,
    encrypted: bool,
    io_timeout: Duration,
}

impl fmt::Debug for SmtpStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpStream")
            .field("encrypted", &self.encrypted)
            .field("io_timeout", &self.io_timeout)
            .finish_non_exhaustive()
    }
}

impl SmtpStream {
    /// Wraps a connected byte stream.
    #[must_use]
    pub fn new(io: BoxedIo, encrypted: bool, io_timeout: Duration) -> Self {
        Self {
            reader: BufReader::new(io),
            encrypted,
            io_timeout,
        }
    }

    /// Returns true if the stream runs over TLS.
    #[must_use]
    pub const fn is_encrypted(&self) -> bool {
        self.encrypted
    }

    /// Reads one line from the stream, without its CRLF terminator.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails or times out, if the server closed
    /// the connection, or if the line exceeds the length limit.
    pub async fn read_line(&mut self) -> Result<String> {
        let after = self.io_timeout;
        let mut line = String::new();

        let read = timeout(
            after,
            (&mut self.reader).take(MAX_LINE_LENGTH).read_line(&mut line),
        )
        .await
        .map_err(|_| Error::Timeout {
            during: "reading server reply",
            after,
        })??;

        if !line.ends_with('\n') {
            if read as u64 >= MAX_LINE_LENGTH {
                return Err(Error::Protocol("Reply line too long".into()));
            }
            return Err(Error::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "connection closed by server",
            )));
        }

        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    /// Writes data to the stream and flushes it.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails or times out.
    pub async fn write_all(&mut self, data: &[u8]) -> Result<()> {
        let after = self.io_timeout;
        let writer = self.reader.get_mut();

        timeout(after, async {
            writer.write_all(data).await?;
            writer.flush().await
        })
        .await
        .map_err(|_| Error::Timeout {
            during: "writing to server",
            after,
        })??;

        Ok(())
    }

    /// Gives up the stream for a TLS upgrade.
    ///
    /// # Errors
    ///
    /// Returns a protocol error if the server sent anything after its
    /// STARTTLS reply: those bytes arrived in plaintext and must not be
    /// treated as part of the encrypted session.
    pub fn into_io(self) -> Result<BoxedIo> {
        if !self.reader.buffer().is_empty() {
            return Err(Error::Protocol(
                "Server sent unexpected data before TLS negotiation".into(),
            ));
        }
        Ok(self.reader.into_inner())
    }

    /// Closes the write side, ignoring failures.
    pub async fn shutdown(mut self) {
        let _ = timeout(self.io_timeout, self.reader.get_mut().shutdown()).await;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tokio_test::io::Builder;

    fn stream(mock: tokio_test::io::Mock) -> SmtpStream {
        SmtpStream::new(Box::new(mock), false, Duration::from_secs(5))
    }

    #[tokio::test]
    async fn reads_lines_without_terminator() {
        let mock = Builder::new().read(b"220 ready\r\n250 OK\r\n").build();
        let mut s = stream(mock);
        assert_eq!(s.read_line().await.unwrap(), "220 ready");
        assert_eq!(s.read_line().await.unwrap(), "250 OK");
    }

    #[tokio::test]
    async fn keeps_trailing_spaces_of_text() {
        let mock = Builder::new().read(b"250 OK  \r\n").build();
        let mut s = stream(mock);
        assert_eq!(s.read_line().await.unwrap(), "250 OK  ");
    }

    #[tokio::test]
    async fn eof_is_an_error() {
        let mock = Builder::new().read(b"220 half").build();
        let mut s = stream(mock);
        let err = s.read_line().await.unwrap_err();
        assert!(matches!(err, Error::Io(e) if e.kind() == io::ErrorKind::UnexpectedEof));
    }

    #[tokio::test]
    async fn overlong_line_is_refused() {
        let long = vec![b'a'; 8192];
        let mock = Builder::new().read(&long).build();
        let mut s = stream(mock);
        assert!(matches!(s.read_line().await, Err(Error::Protocol(_))));
    }

    #[tokio::test]
    async fn writes_exact_bytes() {
        let mock = Builder::new().write(b"EHLO host\r\n").build();
        let mut s = stream(mock);
        s.write_all(b"EHLO host\r\n").await.unwrap();
    }

    #[tokio::test]
    async fn buffered_plaintext_blocks_upgrade() {
        let mock = Builder::new()
            .read(b"220 go ahead\r\n250 injected\r\n")
            .build();
        let mut s = stream(mock);
        assert_eq!(s.read_line().await.unwrap(), "220 go ahead");
        assert!(matches!(s.into_io(), Err(Error::Protocol(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn silent_server_times_out() {
        let (client, _server) = tokio::io::duplex(64);
        let mut s = SmtpStream::new(Box::new(client), false, Duration::from_secs(2));
        let err = s.read_line().await.unwrap_err();
        assert!(matches!(err, Error::Timeout { during: "reading server reply", .. }));
    }
}

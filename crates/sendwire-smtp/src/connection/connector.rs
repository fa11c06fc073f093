//! Opening sockets and negotiating TLS.

use super::stream::BoxedIo;
use crate::error::{Error, Result};
use rustls::pki_types::ServerName;
use std::fmt;
use std::future::Future;
use std::io;
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio_rustls::{
    TlsConnector,
    rustls::{ClientConfig, RootCertStore},
};

/// Opens connections for the transport.
///
/// [`RustlsConnector`] is the production implementation. Tests substitute an
/// in-memory connector so the dialogue can run against a scripted server.
pub trait Connector: Send + Sync {
    /// Opens a plaintext connection to `host:port`.
    fn connect(&self, host: &str, port: u16) -> impl Future<Output = io::Result<BoxedIo>> + Send;

    /// Runs a TLS client handshake over `io`, verifying the certificate for `host`.
    fn handshake(&self, io: BoxedIo, host: &str) -> impl Future<Output = Result<BoxedIo>> + Send;
}

/// TCP connector with rustls for implicit TLS and STARTTLS.
#[derive(Clone)]
pub struct RustlsConnector {
    tls: TlsConnector,
}

impl RustlsConnector {
    /// Creates a connector trusting the webpki root certificates.
    #[must_use]
    pub fn new() -> Self {
        Self::with_root_store(RootCertStore {
            roots: webpki_roots::TLS_SERVER_ROOTS.to_vec(),
        })
    }

    /// Creates a connector trusting only the given roots.
    #[must_use]
    pub fn with_root_store(roots: RootCertStore) -> Self {
        let config = ClientConfig::builder()
            .with_root_certificates(roots)
            .with_no_client_auth();

        Self {
            tls: TlsConnector::from(Arc::new(config)),
        }
    }
}

impl Default for RustlsConnector {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RustlsConnector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RustlsConnector").finish_non_exhaustive()
    }
}

impl Connector for RustlsConnector {
    async fn connect(&self, host: &str, port: u16) -> io::Result<BoxedIo> {
        let stream = TcpStream::connect((host, port)).await?;
        stream.set_nodelay(true)?;
        Ok(Box::new(stream))
    }

    async fn handshake(&self, io: BoxedIo, host: &str) -> Result<BoxedIo> {
        let server_name = ServerName::try_from(host.to_string())
            .map_err(|_| Error::InvalidServerName(host.to_string()))?;

        let tls_stream = self
            .tls
            .connect(server_name, io)
            .await
            .map_err(Error::handshake)?;
        Ok(Box::new(tls_stream))
    }
}

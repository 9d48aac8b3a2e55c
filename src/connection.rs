//! IMAP connection and TLS helpers
//!
//! Low-level session functions behind [`crate::ImapProtocol`]: open an
//! authenticated session over implicit TLS or STARTTLS, SELECT a
//! folder, search for unseen messages and log out.

use crate::config::{AccountConfig, TlsMode};
use crate::error::{Error, Result};
use crate::folder::Folder;
use async_imap::Session;
use rustls::pki_types::ServerName;
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;
use tokio_rustls::client::TlsStream;
use tokio_util::compat::{Compat, TokioAsyncReadCompatExt};
use tracing::{debug, info};

/// A TLS-wrapped, authenticated IMAP session.
pub type ImapSession = Session<Compat<TlsStream<TcpStream>>>;

/// Build a TLS connector for `config`.
///
/// Certificates are checked against the bundled Mozilla roots unless
/// the account opts out with `accept_invalid_certs`.
fn tls_connector(config: &AccountConfig) -> Result<TlsConnector> {
    let builder = rustls::ClientConfig::builder_with_provider(Arc::new(
        rustls::crypto::ring::default_provider(),
    ))
    .with_safe_default_protocol_versions()
    .map_err(|e| Error::Connection(format!("TLS setup failed: {e}")))?;

    let tls_config = if config.accept_invalid_certs {
        builder
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(DangerousVerifier))
            .with_no_client_auth()
    } else {
        let roots = rustls::RootCertStore {
            roots: webpki_roots::TLS_SERVER_ROOTS.to_vec(),
        };
        builder.with_root_certificates(roots).with_no_client_auth()
    };

    Ok(TlsConnector::from(Arc::new(tls_config)))
}

/// Open a fresh authenticated IMAP session.
///
/// Connects to `config.host:config.port`, secures the stream according
/// to `config.tls`, reads the greeting and logs in. Every failure is an
/// [`Error::Connection`]; nothing is returned until login succeeded.
pub async fn connect(config: &AccountConfig) -> Result<ImapSession> {
    let addr = format!("{}:{}", config.host, config.port);
    debug!("Connecting to IMAP server at {} ({:?})", addr, config.tls);

    let tcp_stream = TcpStream::connect(&addr)
        .await
        .map_err(|e| Error::Connection(format!("TCP connection to {addr} failed: {e}")))?;

    let connector = tls_connector(config)?;
    let server_name = ServerName::try_from(config.host.clone())
        .map_err(|e| Error::Connection(format!("Invalid server name: {e}")))?;

    let tls_client = match config.tls {
        TlsMode::Implicit => {
            let tls_stream = connector
                .connect(server_name, tcp_stream)
                .await
                .map_err(|e| Error::Connection(format!("TLS handshake failed: {e}")))?;
            let mut client = async_imap::Client::new(tls_stream.compat());
            read_greeting(&mut client).await?;
            client
        }
        TlsMode::StartTls => {
            let mut client = async_imap::Client::new(tcp_stream.compat());
            read_greeting(&mut client).await?;
            client
                .run_command_and_check_ok("STARTTLS", None)
                .await
                .map_err(|e| Error::Connection(format!("STARTTLS failed: {e}")))?;

            let inner = client.into_inner().into_inner();
            let tls_stream = connector
                .connect(server_name, inner)
                .await
                .map_err(|e| Error::Connection(format!("TLS handshake failed: {e}")))?;
            async_imap::Client::new(tls_stream.compat())
        }
    };

    let session = tls_client
        .login(&config.username, &config.password)
        .await
        .map_err(|(e, _)| Error::Connection(format!("Login failed: {e}")))?;

    info!("Logged in to {} as {}", addr, config.username);
    Ok(session)
}

async fn read_greeting<T>(client: &mut async_imap::Client<T>) -> Result<()>
where
    T: futures::AsyncRead + futures::AsyncWrite + Unpin + Send + std::fmt::Debug,
{
    client
        .read_response()
        .await
        .map_err(|e| Error::Connection(format!("Failed to read greeting: {e}")))?
        .ok_or_else(|| Error::Connection("Server closed the connection before greeting".into()))?;
    Ok(())
}

/// SELECT a folder on an existing session.
pub async fn select(session: &mut ImapSession, folder: &Folder) -> Result<()> {
    debug!("Selecting {}", folder);
    session
        .select(folder.as_str())
        .await
        .map_err(|e| Error::Query(format!("Failed to select {folder}: {e}")))?;
    Ok(())
}

/// Search the selected folder for messages without the `\Seen` flag.
///
/// Returns message sequence numbers in ascending order.
pub async fn search_unseen(session: &mut ImapSession) -> Result<Vec<u32>> {
    let ids = session
        .search("UNSEEN")
        .await
        .map_err(|e| Error::Query(format!("Search failed: {e}")))?;

    let mut ids: Vec<u32> = ids.into_iter().collect();
    ids.sort_unstable();
    debug!("UNSEEN search matched {} messages", ids.len());
    Ok(ids)
}

/// LOGOUT and drop the session.
pub async fn logout(mut session: ImapSession) -> Result<()> {
    session
        .logout()
        .await
        .map_err(|e| Error::Logout(format!("Logout failed: {e}")))
}

/// Certificate verifier that accepts all certificates
/// (for local bridges with self-signed certs).
#[derive(Debug)]
struct DangerousVerifier;

impl rustls::client::danger::ServerCertVerifier for DangerousVerifier {
    fn verify_server_cert(
        &self,
        _end_entity: &rustls::pki_types::CertificateDer<'_>,
        _intermediates: &[rustls::pki_types::CertificateDer<'_>],
        _server_name: &rustls::pki_types::ServerName<'_>,
        _ocsp_response: &[u8],
        _now: rustls::pki_types::UnixTime,
    ) -> std::result::Result<rustls::client::danger::ServerCertVerified, rustls::Error> {
        Ok(rustls::client::danger::ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        _message: &[u8],
        _cert: &rustls::pki_types::CertificateDer<'_>,
        _dss: &rustls::DigitallySignedStruct,
    ) -> std::result::Result<rustls::client::danger::HandshakeSignatureValid, rustls::Error> {
        Ok(rustls::client::danger::HandshakeSignatureValid::assertion())
    }

    fn verify_tls13_signature(
        &self,
        _message: &[u8],
        _cert: &rustls::pki_types::CertificateDer<'_>,
        _dss: &rustls::DigitallySignedStruct,
    ) -> std::result::Result<rustls::client::danger::HandshakeSignatureValid, rustls::Error> {
        Ok(rustls::client::danger::HandshakeSignatureValid::assertion())
    }

    fn supported_verify_schemes(&self) -> Vec<rustls::SignatureScheme> {
        rustls::crypto::ring::default_provider()
            .signature_verification_algorithms
            .supported_schemes()
    }
}

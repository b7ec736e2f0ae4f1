//! Client-side TLS upgrade.

use std::sync::Arc;

use tokio::net::TcpStream;
use tokio_rustls::client::TlsStream;
use tokio_rustls::rustls::client::danger::{
    HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier,
};
use tokio_rustls::rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use tokio_rustls::rustls::{
    ClientConfig, DigitallySignedStruct, Error as RustlsError, RootCertStore, SignatureScheme,
};
use tokio_rustls::TlsConnector;
use tracing::{info, warn};

use crate::error::{Error, Result};

/// Run a TLS handshake over `stream`, using `host` for SNI and verification.
///
/// With `accept_invalid_certs` the server certificate is not checked at all.
pub async fn wrap_tls(
    stream: TcpStream,
    host: &str,
    accept_invalid_certs: bool,
) -> Result<TlsStream<TcpStream>> {
    let server_name = ServerName::try_from(host.to_string())
        .map_err(|_| Error::InvalidServerName(host.to_string()))?;

    let config = if accept_invalid_certs {
        warn!(%host, "TLS certificate verification disabled");
        insecure_config()
    } else {
        native_roots_config()
    };

    let connector = TlsConnector::from(Arc::new(config));
    let stream = connector
        .connect(server_name, stream)
        .await
        .map_err(|source| Error::TlsHandshake {
            host: host.to_string(),
            source,
        })?;
    info!(%host, "TLS handshake complete");
    Ok(stream)
}

fn native_roots_config() -> ClientConfig {
    let mut roots = RootCertStore::empty();
    let certs = rustls_native_certs::load_native_certs();
    for cert in certs.certs {
        if let Err(e) = roots.add(cert) {
            warn!("Failed to add root cert: {}", e);
        }
    }
    for e in &certs.errors {
        warn!("Error loading native certs: {}", e);
    }

    ClientConfig::builder()
        .with_root_certificates(roots)
        .with_no_client_auth()
}

fn insecure_config() -> ClientConfig {
    let builder = ClientConfig::builder();
    let schemes = builder
        .crypto_provider()
        .signature_verification_algorithms
        .supported_schemes();

    builder
        .dangerous()
        .with_custom_certificate_verifier(Arc::new(AcceptAnyCert { schemes }))
        .with_no_client_auth()
}

/// Verifier that trusts whatever the server presents.
#[derive(Debug)]
struct AcceptAnyCert {
    schemes: Vec<SignatureScheme>,
}

impl ServerCertVerifier for AcceptAnyCert {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, RustlsError> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, RustlsError> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn verify_tls13_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, RustlsError> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.schemes.clone()
    }
}

//! TLS connection handling, using the `rustls` crate with the webpki
//! root certificates.

use rustls::pki_types::ServerName;
use rustls::{self, ClientConfig, ClientConnection, RootCertStore, StreamOwned};
use std::convert::TryFrom;
use std::io::{self, Write};
use std::net::TcpStream;
use std::sync::{Arc, LazyLock};
use webpki_roots::TLS_SERVER_ROOTS;

use crate::Error;

use super::Connection;

pub(crate) type SecuredStream = StreamOwned<ClientConnection, TcpStream>;

static CONFIG: LazyLock<Arc<ClientConfig>> = LazyLock::new(|| {
    let config = ClientConfig::builder()
        .with_root_certificates(RootCertStore {
            roots: TLS_SERVER_ROOTS.to_vec(),
        })
        .with_no_client_auth();
    Arc::new(config)
});

pub(crate) fn create_secured_stream(conn: &Connection) -> Result<SecuredStream, Error> {
    // Rustls setup
    log::trace!("Setting up TLS parameters for {}.", conn.request.url.host);
    let dns_name = match ServerName::try_from(conn.request.url.host.clone()) {
        Ok(result) => result,
        Err(err) => return Err(Error::IoError(io::Error::new(io::ErrorKind::Other, err))),
    };
    let sess =
        ClientConnection::new(CONFIG.clone(), dns_name).map_err(Error::RustlsCreateConnection)?;

    // Connect
    log::trace!("Establishing TCP connection to {}.", conn.request.url.host);
    let tcp = conn.connect()?;

    // Send request. The handshake happens on this first write.
    log::trace!("Writing HTTPS request to {}.", conn.request.url.host);
    let mut tls = StreamOwned::new(sess, tcp);
    let _ = tls.get_ref().set_write_timeout(conn.timeout()?);
    tls.write_all(&conn.request.as_bytes())?;

    Ok(tls)
}

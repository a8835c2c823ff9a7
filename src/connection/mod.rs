use crate::request::ParsedRequest;
use crate::{Error, Response};
use std::io::{self, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::{Duration, Instant};

#[cfg(feature = "https")]
mod rustls_stream;
#[cfg(feature = "https")]
type SecuredStream = rustls_stream::SecuredStream;

pub(crate) enum HttpStream {
    Unsecured(TcpStream, Option<Instant>),
    #[cfg(feature = "https")]
    Secured(Box<SecuredStream>, Option<Instant>),
}

impl HttpStream {
    fn create_unsecured(reader: TcpStream, timeout_at: Option<Instant>) -> HttpStream {
        HttpStream::Unsecured(reader, timeout_at)
    }

    #[cfg(feature = "https")]
    fn create_secured(reader: SecuredStream, timeout_at: Option<Instant>) -> HttpStream {
        HttpStream::Secured(Box::new(reader), timeout_at)
    }
}

fn timeout_err() -> io::Error {
    io::Error::new(
        io::ErrorKind::TimedOut,
        "the timeout of the request was reached",
    )
}

fn timeout_at_to_duration(timeout_at: Option<Instant>) -> Result<Option<Duration>, io::Error> {
    if let Some(timeout_at) = timeout_at {
        if let Some(duration) = timeout_at.checked_duration_since(Instant::now()) {
            if duration.is_zero() {
                // A zero duration means "no timeout" to the socket.
                Err(timeout_err())
            } else {
                Ok(Some(duration))
            }
        } else {
            Err(timeout_err())
        }
    } else {
        Ok(None)
    }
}

impl Read for HttpStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let timeout = |tcp: &TcpStream, timeout_at: Option<Instant>| -> io::Result<()> {
            let _ = tcp.set_read_timeout(timeout_at_to_duration(timeout_at)?);
            Ok(())
        };

        let result = match self {
            HttpStream::Unsecured(inner, timeout_at) => {
                timeout(inner, *timeout_at)?;
                inner.read(buf)
            }
            #[cfg(feature = "https")]
            HttpStream::Secured(inner, timeout_at) => {
                timeout(inner.get_ref(), *timeout_at)?;
                inner.read(buf)
            }
        };
        match result {
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => Err(timeout_err()),
            r => r,
        }
    }
}

/// A connection to the server for sending
/// [`Request`](struct.Request.html)s.
pub(crate) struct Connection {
    request: ParsedRequest,
    timeout_at: Option<Instant>,
}

impl Connection {
    /// Creates a new `Connection`, starting the timeout clock if the
    /// request has one.
    pub(crate) fn new(request: ParsedRequest) -> Connection {
        let timeout_at = request
            .config
            .timeout
            .map(|t| Instant::now() + Duration::from_secs(t));
        Connection {
            request,
            timeout_at,
        }
    }

    /// Returns the timeout duration for operations that should end at
    /// timeout and are starting "now".
    ///
    /// The Result will be Err if the timeout has already passed.
    fn timeout(&self) -> Result<Option<Duration>, io::Error> {
        let timeout = timeout_at_to_duration(self.timeout_at);
        log::trace!("Timeout requested, it is currently: {:?}", timeout);
        timeout
    }

    /// Sends the [`Request`](struct.Request.html), consumes this
    /// connection, and returns a [`Response`](struct.Response.html).
    #[cfg(feature = "https")]
    pub(crate) fn send_https(self) -> Result<Response, Error> {
        let secured_stream = rustls_stream::create_secured_stream(&self)?;
        let stream = HttpStream::create_secured(secured_stream, self.timeout_at);
        self.read_response(stream)
    }

    /// Sends the [`Request`](struct.Request.html), consumes this
    /// connection, and returns a [`Response`](struct.Response.html).
    pub(crate) fn send(self) -> Result<Response, Error> {
        let bytes = self.request.as_bytes();

        log::trace!("Establishing TCP connection to {}.", self.request.url.host);
        let mut tcp = self.connect()?;

        // Send request
        log::trace!("Writing HTTP request to {}.", self.request.url.host);
        let _ = tcp.set_write_timeout(self.timeout()?);
        tcp.write_all(&bytes)?;

        let stream = HttpStream::create_unsecured(tcp, self.timeout_at);
        self.read_response(stream)
    }

    fn read_response(&self, stream: HttpStream) -> Result<Response, Error> {
        log::trace!("Reading HTTP response from {}.", self.request.url.host);
        let response = Response::from_reader(
            stream,
            self.request.config.url().to_string(),
            self.request.config.max_headers_size,
            self.request.config.max_status_line_len,
        )?;
        log::debug!(
            "{} {} -> {} {}",
            self.request.config.method,
            response.url,
            response.status_code,
            response.reason_phrase
        );
        Ok(response)
    }

    /// Resolves the host and connects to the first address that
    /// accepts, returning the last error if none do.
    fn connect(&self) -> Result<TcpStream, Error> {
        let host = self.request.url.host.as_str();
        let port = self.request.url.port.port();
        let addrs = (host, port).to_socket_addrs().map_err(Error::IoError)?;
        let addrs_count = addrs.len();

        // Try all resolved addresses. Return the first one to which we could connect. If all
        // failed return the last error encountered.
        for (i, addr) in addrs.enumerate() {
            log::trace!("Trying {} for {}.", addr, host);
            let stream = if let Some(timeout) = self.timeout()? {
                TcpStream::connect_timeout(&addr, timeout)
            } else {
                TcpStream::connect(addr)
            };
            if stream.is_ok() || i == addrs_count - 1 {
                return stream.map_err(Error::from);
            }
        }

        Err(Error::AddressNotFound)
    }
}

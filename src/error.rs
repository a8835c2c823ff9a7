use std::{error, fmt, io, str};

/// Broad classification of an [`Error`], used by callers to decide
/// how a failed run is reported.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ErrorKind {
    /// The invocation itself was wrong: an unknown method, a malformed
    /// `--data` token, or an unsupported output file extension.
    InvalidArgument,
    /// The request failed: the server answered with a 4xx or 5xx
    /// status, or the transport could not complete the exchange.
    Http,
    /// The response body was not valid JSON while a `.json` output
    /// file was requested.
    Decode,
    /// Writing the output file or the console failed.
    Io,
}

/// Represents an error while building, sending or handling a request.
#[derive(Debug)]
pub enum Error {
    /// An argument could not be turned into a valid request, or the
    /// output path has an unsupported extension.
    InvalidArgument(String),
    /// The server responded with a client (4xx) or server (5xx) error
    /// status.
    HttpStatus {
        /// The status code of the response, eg. 404.
        status_code: i32,
        /// The reason phrase of the response, eg. "Not Found".
        reason_phrase: String,
        /// The URL the request was sent to.
        url: String,
    },
    /// The response body could not be parsed as JSON.
    DecodeError(serde_json::Error),
    /// The request body could not be serialized into JSON.
    SerdeJsonError(serde_json::Error),
    /// The output file could not be written.
    OutputFile {
        /// The path that was being written.
        path: String,
        /// The underlying IO error.
        source: io::Error,
    },
    /// Ran into an IO problem while sending the request or loading
    /// the response.
    IoError(io::Error),
    /// The response body contains invalid UTF-8, so the `as_str()`
    /// conversion failed.
    InvalidUtf8InBody(str::Utf8Error),
    /// The response contained invalid UTF-8 where it should be valid
    /// (eg. headers).
    InvalidUtf8InResponse,
    /// Couldn't parse the incoming chunk's length while receiving a
    /// response with the header `Transfer-Encoding: chunked`.
    MalformedChunkLength,
    /// The chunk did not end after reading the previously read amount
    /// of bytes.
    MalformedChunkEnd,
    /// Couldn't parse the `Content-Length` header's value as an
    /// `usize`.
    MalformedContentLength,
    /// The response's headers exceeded the configured maximum size.
    HeadersOverflow,
    /// The response's status line exceeded the configured maximum
    /// length.
    StatusLineOverflow,
    /// [ToSocketAddrs](std::net::ToSocketAddrs) did not resolve to an
    /// address.
    AddressNotFound,
    /// The URL does not start with `http://` or `https://`.
    InvalidProtocol,
    /// The URL uses `https://`, but the crate was built without the
    /// `https` feature.
    HttpsFeatureNotEnabled,
    /// Ran into a rustls error while creating the connection.
    #[cfg(feature = "https")]
    RustlsCreateConnection(rustls::Error),
}

impl Error {
    /// Returns the broad category this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        use Error::*;
        match self {
            InvalidArgument(_) => ErrorKind::InvalidArgument,
            DecodeError(_) => ErrorKind::Decode,
            OutputFile { .. } => ErrorKind::Io,
            // Request serialization happens right before the call, so it
            // is reported together with the transport failures.
            _ => ErrorKind::Http,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use Error::*;
        match self {
            InvalidArgument(msg) => write!(f, "{}", msg),
            HttpStatus {
                status_code,
                reason_phrase,
                url,
            } => {
                let side = if *status_code < 500 { "Client" } else { "Server" };
                write!(
                    f,
                    "{} {} Error: {} for url: {}",
                    status_code, side, reason_phrase, url
                )
            }
            DecodeError(err) => write!(f, "response body is not valid json: {}", err),
            SerdeJsonError(err) => write!(f, "{}", err),
            OutputFile { path, source } => write!(f, "could not write '{}': {}", path, source),
            IoError(err) => write!(f, "{}", err),
            InvalidUtf8InBody(err) => write!(f, "{}", err),
            InvalidUtf8InResponse => write!(f, "response contained invalid utf-8 where valid utf-8 was expected"),
            MalformedChunkLength => write!(f, "non-usize chunk length with transfer-encoding: chunked"),
            MalformedChunkEnd => write!(f, "chunk did not end after reading the expected amount of bytes"),
            MalformedContentLength => write!(f, "non-usize content length"),
            HeadersOverflow => write!(f, "the headers' total size surpassed max_headers_size"),
            StatusLineOverflow => write!(f, "the status line length surpassed max_status_line_length"),
            AddressNotFound => write!(f, "could not resolve host to a socket address"),
            InvalidProtocol => write!(f, "the url does not start with http:// or https://"),
            HttpsFeatureNotEnabled => write!(f, "request url contains https:// but the https feature is not enabled"),
            #[cfg(feature = "https")]
            RustlsCreateConnection(err) => write!(f, "error creating rustls connection: {}", err),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        use Error::*;
        match self {
            DecodeError(err) | SerdeJsonError(err) => Some(err),
            OutputFile { source, .. } => Some(source),
            IoError(err) => Some(err),
            InvalidUtf8InBody(err) => Some(err),
            #[cfg(feature = "https")]
            RustlsCreateConnection(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(other: io::Error) -> Error {
        Error::IoError(other)
    }
}

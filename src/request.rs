use crate::connection::Connection;
use crate::http_url::HttpUrl;
use crate::{Error, Response};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// A URL type for requests.
pub type URL = String;

/// An HTTP request method. Only the two methods the client knows how
/// to issue are representable.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Method {
    /// The GET method
    Get,
    /// The POST method
    Post,
}

impl fmt::Display for Method {
    /// Formats the Method to the form in the HTTP request,
    /// ie. Method::Get -> "GET", Method::Post -> "POST".
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Method::Get => write!(f, "GET"),
            Method::Post => write!(f, "POST"),
        }
    }
}

impl FromStr for Method {
    type Err = Error;

    /// Parses `get` or `post`, in any casing.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidArgument`](enum.Error.html#variant.InvalidArgument)
    /// for any other method name.
    fn from_str(s: &str) -> Result<Method, Error> {
        if s.eq_ignore_ascii_case("get") {
            Ok(Method::Get)
        } else if s.eq_ignore_ascii_case("post") {
            Ok(Method::Post)
        } else {
            Err(Error::InvalidArgument(format!(
                "Invalid method '{}'. Use 'get' or 'post'.",
                s
            )))
        }
    }
}

/// An HTTP request.
///
/// Generally created by the [`restful::get`](fn.get.html) and
/// [`restful::post`](fn.post.html) functions.
///
/// # Example
///
/// ```
/// let request = restful::post("http://example.com/posts");
/// ```
///
/// After creating the request, you would generally call
/// [`send`](struct.Request.html#method.send) on it, as it doesn't do
/// much on its own.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Request {
    pub(crate) method: Method,
    url: URL,
    headers: HashMap<String, String>,
    body: Option<Vec<u8>>,
    pub(crate) timeout: Option<u64>,
    pub(crate) max_headers_size: Option<usize>,
    pub(crate) max_status_line_len: Option<usize>,
}

impl Request {
    /// Creates a new HTTP `Request`.
    ///
    /// This is only the request's data, it is not sent yet. For
    /// sending the request, see [`send`](struct.Request.html#method.send).
    ///
    /// The URL is used as-is: it is the responsibility of the caller
    /// to ensure there are no illegal characters in it.
    pub fn new<T: Into<URL>>(method: Method, url: T) -> Request {
        Request {
            method,
            url: url.into(),
            headers: HashMap::new(),
            body: None,
            timeout: None,
            max_headers_size: None,
            max_status_line_len: None,
        }
    }

    /// Adds a header to the request this is called on.
    pub fn with_header<T: Into<String>, U: Into<String>>(mut self, key: T, value: U) -> Request {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Sets the request body.
    pub fn with_body<T: Into<Vec<u8>>>(mut self, body: T) -> Request {
        let body = body.into();
        let body_length = body.len();
        self.body = Some(body);
        self.with_header("Content-Length", format!("{}", body_length))
    }

    /// Converts given argument to JSON and sets it as body, along with
    /// the `Content-Type: application/json` header.
    ///
    /// # Errors
    ///
    /// Returns
    /// [`SerdeJsonError`](enum.Error.html#variant.SerdeJsonError) if
    /// Serde runs into a problem when converting `body` into a
    /// string.
    pub fn with_json<T: serde::ser::Serialize>(mut self, body: &T) -> Result<Request, Error> {
        self.headers
            .insert("Content-Type".to_string(), "application/json".to_string());
        match serde_json::to_string(&body) {
            Ok(json) => Ok(self.with_body(json)),
            Err(err) => Err(Error::SerdeJsonError(err)),
        }
    }

    /// Sets the request timeout in seconds. The timeout covers
    /// connecting, writing the request and reading the response.
    pub fn with_timeout(mut self, timeout: u64) -> Request {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the maximum size of all the headers this request will
    /// accept.
    ///
    /// If this limit is passed, the request will close the connection
    /// and return an [Error::HeadersOverflow] error. Both normal and
    /// trailing headers count towards this cap.
    pub fn with_max_headers_size<S: Into<Option<usize>>>(mut self, max_headers_size: S) -> Request {
        self.max_headers_size = max_headers_size.into();
        self
    }

    /// Sets the maximum length of the status line this request will
    /// accept.
    ///
    /// If this limit is passed, the request will close the connection
    /// and return an [Error::StatusLineOverflow] error.
    pub fn with_max_status_line_length<S: Into<Option<usize>>>(
        mut self,
        max_status_line_len: S,
    ) -> Request {
        self.max_status_line_len = max_status_line_len.into();
        self
    }

    /// Returns the URL this request will be sent to.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Sends this request to the host.
    ///
    /// Redirections are not followed: a 3xx response is returned as
    /// is.
    ///
    /// # Errors
    ///
    /// Returns `Err` if we run into an error while sending the
    /// request, or receiving/parsing the response. HTTP error
    /// statuses are not errors at this level, see
    /// [`Response::error_for_status`](struct.Response.html#method.error_for_status).
    pub fn send(self) -> Result<Response, Error> {
        let parsed_request = ParsedRequest::new(self)?;
        if parsed_request.url.https {
            #[cfg(feature = "https")]
            {
                Connection::new(parsed_request).send_https()
            }
            #[cfg(not(feature = "https"))]
            {
                Err(Error::HttpsFeatureNotEnabled)
            }
        } else {
            Connection::new(parsed_request).send()
        }
    }
}

pub(crate) struct ParsedRequest {
    pub(crate) url: HttpUrl,
    pub(crate) config: Request,
}

impl ParsedRequest {
    fn new(config: Request) -> Result<ParsedRequest, Error> {
        let url = HttpUrl::parse(&config.url)?;
        Ok(ParsedRequest { url, config })
    }

    fn get_http_head(&self) -> String {
        let mut http = String::with_capacity(128);

        // Add the request line and the "Host" header
        http += &format!(
            "{} {} HTTP/1.1\r\nHost: {}\r\n",
            self.config.method,
            self.url.path_and_query,
            self.url.host_header()
        );

        // Default headers, which the user supplied ones can override
        let has_header = |name: &str| {
            self.config
                .headers
                .keys()
                .any(|key| key.eq_ignore_ascii_case(name))
        };
        if !has_header("user-agent") {
            http += &format!("User-Agent: restful/{}\r\n", env!("CARGO_PKG_VERSION"));
        }
        if !has_header("accept") {
            http += "Accept: */*\r\n";
        }
        if !has_header("connection") {
            // One request per connection, so the server never has to
            // guess when we're done.
            http += "Connection: close\r\n";
        }

        for (k, v) in &self.config.headers {
            http += &format!("{}: {}\r\n", k, v);
        }

        // A user agent SHOULD send a Content-Length in a request message
        // when no Transfer-Encoding is sent and the request method
        // defines a meaning for an enclosed payload body.
        // refer: https://tools.ietf.org/html/rfc7230#section-3.3.2
        if self.config.method == Method::Post
            && !has_header("content-length")
            && !has_header("transfer-encoding")
        {
            http += "Content-Length: 0\r\n";
        }

        http += "\r\n";
        http
    }

    /// Returns the HTTP request as bytes, ready to be sent to
    /// the server.
    pub(crate) fn as_bytes(&self) -> Vec<u8> {
        let mut bytes = self.get_http_head().into_bytes();
        if let Some(body) = &self.config.body {
            bytes.extend(body);
        }
        bytes
    }
}

/// Alias for [Request::new](struct.Request.html#method.new) with `method` set to
/// [Method::Get](enum.Method.html).
pub fn get<T: Into<URL>>(url: T) -> Request {
    Request::new(Method::Get, url)
}

/// Alias for [Request::new](struct.Request.html#method.new) with `method` set to
/// [Method::Post](enum.Method.html).
pub fn post<T: Into<URL>>(url: T) -> Request {
    Request::new(Method::Post, url)
}

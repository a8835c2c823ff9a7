use crate::Error;
use std::collections::HashMap;
use std::io::{BufRead, BufReader, Read};
use std::str;

/// An HTTP response.
///
/// Returned by [`Request::send`](struct.Request.html#method.send).
///
/// # Example
///
/// ```no_run
/// # fn main() -> Result<(), restful::Error> {
/// let response = restful::get("https://jsonplaceholder.typicode.com/posts/1").send()?;
/// println!("{}", response.as_str()?);
/// # Ok(()) }
/// ```
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Response {
    /// The status code of the response, eg. 404.
    pub status_code: i32,
    /// The reason phrase of the response, eg. "Not Found".
    pub reason_phrase: String,
    /// The headers of the response. The header field names (the
    /// keys) are all lowercase.
    pub headers: HashMap<String, String>,
    /// The URL the request was sent to.
    pub url: String,

    body: Vec<u8>,
}

impl Response {
    /// Reads a whole response (status line, headers and body) from
    /// `reader`.
    pub(crate) fn from_reader<R: Read>(
        reader: R,
        url: String,
        max_headers_size: Option<usize>,
        max_status_line_len: Option<usize>,
    ) -> Result<Response, Error> {
        let mut stream = BufReader::new(reader);
        let ResponseMetadata {
            status_code,
            reason_phrase,
            mut headers,
            state,
            max_trailing_headers_size,
        } = read_metadata(&mut stream, max_headers_size, max_status_line_len)?;

        let mut body = Vec::new();
        if has_body(status_code) {
            match state {
                BodyState::EndOnClose => {
                    stream.read_to_end(&mut body)?;
                }
                BodyState::ContentLength(length) => {
                    // Don't trust the announced length for the allocation.
                    let read = stream.by_ref().take(length as u64).read_to_end(&mut body)?;
                    if read < length {
                        return Err(Error::IoError(std::io::ErrorKind::UnexpectedEof.into()));
                    }
                }
                BodyState::Chunked => {
                    read_chunked(
                        &mut stream,
                        &mut body,
                        &mut headers,
                        max_trailing_headers_size,
                    )?;
                }
            }
        }

        Ok(Response {
            status_code,
            reason_phrase,
            headers,
            url,
            body,
        })
    }

    /// Returns true for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    /// Returns true for 4xx and 5xx statuses.
    pub fn is_error(&self) -> bool {
        (400..600).contains(&self.status_code)
    }

    /// Turns a 4xx or 5xx response into an
    /// [`HttpStatus`](enum.Error.html#variant.HttpStatus) error, and
    /// passes any other response through.
    ///
    /// # Errors
    ///
    /// Returns [`HttpStatus`](enum.Error.html#variant.HttpStatus) if
    /// the server answered with a client or server error.
    pub fn error_for_status(self) -> Result<Response, Error> {
        if self.is_error() {
            Err(Error::HttpStatus {
                status_code: self.status_code,
                reason_phrase: self.reason_phrase,
                url: self.url,
            })
        } else {
            Ok(self)
        }
    }

    /// Returns the body as an `&str`.
    ///
    /// # Errors
    ///
    /// Returns
    /// [`InvalidUtf8InBody`](enum.Error.html#variant.InvalidUtf8InBody)
    /// if the body is not UTF-8, with a description as to why the
    /// provided slice is not UTF-8.
    pub fn as_str(&self) -> Result<&str, Error> {
        str::from_utf8(&self.body).map_err(Error::InvalidUtf8InBody)
    }

    /// Returns a reference to the contained bytes of the body.
    pub fn as_bytes(&self) -> &[u8] {
        &self.body
    }
}

/// Informational, "No Content" and "Not Modified" responses never
/// carry a body, whatever their headers say.
fn has_body(status_code: i32) -> bool {
    !(100..200).contains(&status_code) && status_code != 204 && status_code != 304
}

enum BodyState {
    // No Content-Length, and Transfer-Encoding != chunked, so we just
    // read until the server closes the connection.
    EndOnClose,
    ContentLength(usize),
    Chunked,
}

struct ResponseMetadata {
    status_code: i32,
    reason_phrase: String,
    headers: HashMap<String, String>,
    state: BodyState,
    max_trailing_headers_size: Option<usize>,
}

fn read_metadata<R: BufRead>(
    stream: &mut R,
    mut max_headers_size: Option<usize>,
    max_status_line_len: Option<usize>,
) -> Result<ResponseMetadata, Error> {
    let line = read_line(stream, max_status_line_len, Error::StatusLineOverflow)?;
    let (status_code, reason_phrase) = parse_status_line(&line);

    let mut headers = HashMap::new();
    loop {
        let line = read_line(stream, max_headers_size, Error::HeadersOverflow)?;
        if line.is_empty() {
            // Body starts here
            break;
        }
        if let Some(ref mut max_headers_size) = max_headers_size {
            *max_headers_size = max_headers_size.saturating_sub(line.len() + 2);
        }
        if let Some((header, value)) = parse_header(line) {
            headers.insert(header, value);
        }
    }

    let chunked = headers
        .get("transfer-encoding")
        .map_or(false, |value| value.trim().eq_ignore_ascii_case("chunked"));
    let content_length = match headers.get("content-length") {
        Some(value) => Some(
            value
                .trim()
                .parse::<usize>()
                .map_err(|_| Error::MalformedContentLength)?,
        ),
        None => None,
    };

    let state = if chunked {
        BodyState::Chunked
    } else if let Some(length) = content_length {
        BodyState::ContentLength(length)
    } else {
        BodyState::EndOnClose
    };

    Ok(ResponseMetadata {
        status_code,
        reason_phrase,
        headers,
        state,
        max_trailing_headers_size: max_headers_size,
    })
}

fn read_chunked<R: BufRead>(
    stream: &mut R,
    body: &mut Vec<u8>,
    headers: &mut HashMap<String, String>,
    max_trailing_headers_size: Option<usize>,
) -> Result<(), Error> {
    loop {
        // Max length of the chunk length line is 1KB: not too long to
        // take up much memory, long enough to tolerate some chunk
        // extensions (which are ignored).
        let length_line = read_line(stream, Some(1024), Error::MalformedChunkLength)?;

        // Note: the trim() and check for empty lines shouldn't be
        // needed according to the RFC, but it fixes a few servers.
        let length = match length_line.find(';') {
            Some(i) => length_line[..i].trim(),
            None => length_line.trim(),
        };
        let incoming_length = if length.is_empty() {
            0
        } else {
            usize::from_str_radix(length, 16).map_err(|_| Error::MalformedChunkLength)?
        };

        if incoming_length == 0 {
            return read_trailers(stream, headers, max_trailing_headers_size);
        }

        let read = stream
            .by_ref()
            .take(incoming_length as u64)
            .read_to_end(body)?;
        if read < incoming_length {
            return Err(Error::MalformedChunkEnd);
        }

        // Each chunk ends with a bare \r\n.
        if !read_line(stream, Some(2), Error::MalformedChunkEnd)?.is_empty() {
            return Err(Error::MalformedChunkEnd);
        }
    }
}

fn read_trailers<R: BufRead>(
    stream: &mut R,
    headers: &mut HashMap<String, String>,
    mut max_headers_size: Option<usize>,
) -> Result<(), Error> {
    loop {
        let trailer_line = read_line(stream, max_headers_size, Error::HeadersOverflow)?;
        if let Some(ref mut max_headers_size) = max_headers_size {
            *max_headers_size = max_headers_size.saturating_sub(trailer_line.len() + 2);
        }
        if let Some((header, value)) = parse_header(trailer_line) {
            headers.insert(header, value);
        } else {
            break;
        }
    }
    Ok(())
}

/// Reads one line, without the trailing `\r\n` or `\n`. `max_len`
/// counts the line ending too.
fn read_line<R: BufRead>(
    stream: &mut R,
    max_len: Option<usize>,
    overflow_error: Error,
) -> Result<String, Error> {
    let mut bytes = Vec::with_capacity(32);
    for byte in stream.bytes() {
        let byte = byte?;
        if let Some(max_len) = max_len {
            if bytes.len() >= max_len {
                return Err(overflow_error);
            }
        }
        if byte == b'\n' {
            if let Some(b'\r') = bytes.last() {
                bytes.pop();
            }
            break;
        }
        bytes.push(byte);
    }
    String::from_utf8(bytes).map_err(|_| Error::InvalidUtf8InResponse)
}

fn parse_status_line(line: &str) -> (i32, String) {
    // sample status line format
    // HTTP/1.1 200 OK
    let mut parts = line.splitn(3, ' ');
    let _version = parts.next();
    let status_code = parts.next().and_then(|code| code.parse::<i32>().ok());
    let reason_phrase = parts.next().unwrap_or("");

    match status_code {
        Some(status_code) => (status_code, reason_phrase.to_string()),
        None => (503, "Server did not provide a status line".to_string()),
    }
}

fn parse_header(mut line: String) -> Option<(String, String)> {
    let location = line.find(':')?;
    let value = line[location + 1..].trim().to_string();
    line.truncate(location);
    // Headers should be ascii; the names are case-insensitive, so
    // they're stored lowercase for easier `get()`ing.
    line.make_ascii_lowercase();
    Some((line.trim().to_string(), value))
}

#[cfg(test)]
mod tests {
    use super::{parse_header, parse_status_line, Response};
    use crate::{Error, ErrorKind};

    fn parse(raw: &str) -> Result<Response, Error> {
        Response::from_reader(raw.as_bytes(), "http://localhost/".to_string(), None, None)
    }

    #[test]
    fn test_content_length_body() {
        let response = parse(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 11\r\n\r\n{\"id\": 1}\r\ntrailing garbage",
        )
        .unwrap();
        assert_eq!(response.status_code, 200);
        assert_eq!(response.reason_phrase, "OK");
        assert_eq!(response.headers["content-type"], "application/json");
        assert_eq!(response.as_str().unwrap(), "{\"id\": 1}\r\n");
        assert!(response.is_success());
    }

    #[test]
    fn test_chunked_body_with_trailers() {
        let response = parse(
            "HTTP/1.1 201 Created\r\nTransfer-Encoding: chunked\r\n\r\n4;ext=1\r\n{\"id\r\n6\r\n\": 101\r\n1\r\n}\r\n0\r\nX-Trailer: yes\r\n\r\n",
        )
        .unwrap();
        assert_eq!(response.status_code, 201);
        assert_eq!(response.as_str().unwrap(), "{\"id\": 101}");
        assert_eq!(response.headers["x-trailer"], "yes");
    }

    #[test]
    fn test_body_until_close() {
        let response = parse("HTTP/1.0 200 OK\r\n\r\nplain text").unwrap();
        assert_eq!(response.as_str().unwrap(), "plain text");
    }

    #[test]
    fn test_no_content_has_no_body() {
        let response = parse("HTTP/1.1 204 No Content\r\n\r\nleftovers").unwrap();
        assert!(response.as_bytes().is_empty());
    }

    #[test]
    fn test_short_content_length_body() {
        let err = parse("HTTP/1.1 200 OK\r\nContent-Length: 100\r\n\r\nshort").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Http);
    }

    #[test]
    fn test_malformed_lengths() {
        assert!(matches!(
            parse("HTTP/1.1 200 OK\r\nContent-Length: many\r\n\r\n"),
            Err(Error::MalformedContentLength)
        ));
        assert!(matches!(
            parse("HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\nzz\r\n"),
            Err(Error::MalformedChunkLength)
        ));
        assert!(matches!(
            parse("HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n2\r\nabc\r\n0\r\n\r\n"),
            Err(Error::MalformedChunkEnd)
        ));
    }

    #[test]
    fn test_overflow_caps() {
        let raw = "HTTP/1.1 200 OK\r\nX-Long: aaaaaaaaaaaaaaaaaaaaaaaa\r\n\r\n";
        let result = Response::from_reader(raw.as_bytes(), String::new(), Some(10), None);
        assert!(matches!(result, Err(Error::HeadersOverflow)));
        let result = Response::from_reader(raw.as_bytes(), String::new(), None, Some(5));
        assert!(matches!(result, Err(Error::StatusLineOverflow)));
    }

    #[test]
    fn test_error_for_status() {
        let response = parse("HTTP/1.1 404 Not Found\r\nContent-Length: 2\r\n\r\n{}").unwrap();
        assert!(response.is_error());
        match response.error_for_status() {
            Err(Error::HttpStatus {
                status_code,
                reason_phrase,
                url,
            }) => {
                assert_eq!(status_code, 404);
                assert_eq!(reason_phrase, "Not Found");
                assert_eq!(url, "http://localhost/");
            }
            other => panic!("expected a status error, got {:?}", other),
        }

        let redirect =
            parse("HTTP/1.1 301 Moved Permanently\r\nContent-Length: 0\r\n\r\n").unwrap();
        let redirect = redirect.error_for_status().unwrap();
        assert!(!redirect.is_success());
        assert!(!redirect.is_error());
    }

    #[test]
    fn test_status_line() {
        assert_eq!(
            parse_status_line("HTTP/1.1 500 Internal Server Error"),
            (500, "Internal Server Error".to_string())
        );
        assert_eq!(parse_status_line("HTTP/1.1 200"), (200, String::new()));
        assert_eq!(parse_status_line("garbage").0, 503);
    }

    #[test]
    fn test_header() {
        assert_eq!(
            parse_header("Content-Type:  application/json ".to_string()),
            Some(("content-type".to_string(), "application/json".to_string()))
        );
        assert_eq!(parse_header("no colon here".to_string()), None);
    }
}

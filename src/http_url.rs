use crate::Error;

#[derive(Clone, Copy, PartialEq, Debug)]
pub(crate) enum Port {
    ImplicitHttp,
    ImplicitHttps,
    Explicit(u16),
}

impl Port {
    pub(crate) fn port(self) -> u16 {
        match self {
            Port::ImplicitHttp => 80,
            Port::ImplicitHttps => 443,
            Port::Explicit(port) => port,
        }
    }
}

/// URL split into the parts needed to open a connection and write the
/// request line.
///
/// ```text
/// scheme "://" host [ ":" port ] path [ "?" query ] [ "#" fragment ]
/// ```
///
/// The fragment is never sent to the server, so it is dropped here.
#[derive(Clone, PartialEq, Debug)]
pub(crate) struct HttpUrl {
    /// If scheme is "https", true, if "http", false.
    pub(crate) https: bool,
    pub(crate) host: String,
    pub(crate) port: Port,
    /// `path ["?" query]` including the `?`.
    pub(crate) path_and_query: String,
}

impl HttpUrl {
    pub(crate) fn parse(url: &str) -> Result<HttpUrl, Error> {
        enum UrlParseStatus {
            Host,
            Port,
            PathAndQuery,
        }

        let (url, https) = if let Some(after_protocol) = url.strip_prefix("http://") {
            (after_protocol, false)
        } else if let Some(after_protocol) = url.strip_prefix("https://") {
            (after_protocol, true)
        } else {
            return Err(Error::InvalidProtocol);
        };

        let mut host = String::new();
        let mut port = String::new();
        let mut path_and_query = String::new();
        let mut status = UrlParseStatus::Host;
        for c in url.chars() {
            match status {
                UrlParseStatus::Host => match c {
                    // Tolerate typos like: www.example.com?some=params
                    '/' | '?' => {
                        status = UrlParseStatus::PathAndQuery;
                        path_and_query.push(c);
                    }
                    ':' => status = UrlParseStatus::Port,
                    '#' => break,
                    _ => host.push(c),
                },
                UrlParseStatus::Port => match c {
                    '/' | '?' => {
                        status = UrlParseStatus::PathAndQuery;
                        path_and_query.push(c);
                    }
                    '#' => break,
                    _ => port.push(c),
                },
                UrlParseStatus::PathAndQuery => match c {
                    '#' => break,
                    _ => path_and_query.push(c),
                },
            }
        }

        if !path_and_query.starts_with('/') {
            path_and_query.insert(0, '/');
        }

        let port = port.parse::<u16>().map(Port::Explicit).unwrap_or(if https {
            Port::ImplicitHttps
        } else {
            Port::ImplicitHttp
        });

        Ok(HttpUrl {
            https,
            host,
            port,
            path_and_query,
        })
    }

    /// Returns the value of the `Host` header, `host [ ":" port ]`.
    pub(crate) fn host_header(&self) -> String {
        match self.port {
            Port::Explicit(port) => format!("{}:{}", self.host, port),
            _ => self.host.clone(),
        }
    }
}

#[cfg(test)]
mod parsing_tests {
    use super::{HttpUrl, Port};
    use crate::Error;

    #[test]
    fn test_domain_and_path() {
        let url = HttpUrl::parse("https://jsonplaceholder.typicode.com/posts/1").unwrap();
        assert!(url.https);
        assert_eq!(url.host, "jsonplaceholder.typicode.com");
        assert_eq!(url.port, Port::ImplicitHttps);
        assert_eq!(url.path_and_query, "/posts/1");
    }

    #[test]
    fn test_explicit_port() {
        let url = HttpUrl::parse("http://localhost:35563/comments?postId=1#top").unwrap();
        assert!(!url.https);
        assert_eq!(url.host, "localhost");
        assert_eq!(url.port.port(), 35563);
        assert_eq!(url.path_and_query, "/comments?postId=1");

        assert_eq!(url.host_header(), "localhost:35563");
    }

    #[test]
    fn test_empty_and_query_only_resource() {
        assert_eq!(HttpUrl::parse("http://example.org").unwrap().path_and_query, "/");
        assert_eq!(
            HttpUrl::parse("http://example.org?userId=1").unwrap().path_and_query,
            "/?userId=1"
        );
    }

    #[test]
    fn test_fragment_without_slash_does_not_end_up_in_the_host() {
        let url = HttpUrl::parse("http://example.org:8080#frag").unwrap();
        assert_eq!(url.host, "example.org");
        assert_eq!(url.port.port(), 8080);
        assert_eq!(url.path_and_query, "/");
    }

    #[test]
    fn test_invalid_protocol() {
        assert!(matches!(
            HttpUrl::parse("ftp://example.org/"),
            Err(Error::InvalidProtocol)
        ));
        assert!(matches!(
            HttpUrl::parse("/posts/1"),
            Err(Error::InvalidProtocol)
        ));
    }
}

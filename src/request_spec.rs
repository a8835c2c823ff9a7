use crate::{Error, Method};
use std::collections::BTreeMap;

/// The parsed, validated description of the one call to perform.
///
/// # Example
///
/// ```
/// # fn main() -> Result<(), restful::Error> {
/// use restful::{Method, RequestSpec};
///
/// let spec = RequestSpec::new("post", "/posts", None, ["title=foo", "body=bar"])?;
/// assert_eq!(spec.method, Method::Post);
/// assert_eq!(spec.data.unwrap()["title"], "foo");
/// # Ok(()) }
/// ```
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct RequestSpec {
    /// The HTTP method.
    pub method: Method,
    /// Path appended verbatim to the base URL, eg. `/posts/1`.
    pub endpoint: String,
    /// Where to save the response body. The extension picks the
    /// format, see [`OutputFormat`](enum.OutputFormat.html).
    pub output: Option<String>,
    /// Fields of the JSON object sent as the POST body. Only used for
    /// POST requests.
    pub data: Option<BTreeMap<String, String>>,
}

impl RequestSpec {
    /// Builds a request spec out of raw command line values.
    ///
    /// `data` holds `key=value` tokens. An empty `data` leaves
    /// [`data`](#structfield.data) unset, and an empty `output` path
    /// means the body is printed.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidArgument`](enum.Error.html#variant.InvalidArgument)
    /// if the method is not `get` or `post`, or if a data token is
    /// malformed (see [`parse_data`]).
    pub fn new<I, S>(
        method: &str,
        endpoint: impl Into<String>,
        output: Option<String>,
        data: I,
    ) -> Result<RequestSpec, Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let method = method.parse::<Method>()?;
        let data = parse_data(data)?;
        Ok(RequestSpec {
            method,
            endpoint: endpoint.into(),
            output: output.filter(|path| !path.is_empty()),
            data: if data.is_empty() { None } else { Some(data) },
        })
    }
}

/// Parses `key=value` tokens into a map.
///
/// Each token is split on its first `=`, so the value keeps any later
/// `=` verbatim (`q=a=b` maps `q` to `a=b`). When a key repeats, the
/// last value wins.
///
/// # Errors
///
/// Returns [`InvalidArgument`](enum.Error.html#variant.InvalidArgument)
/// for a token without `=` or with an empty key.
pub fn parse_data<I, S>(items: I) -> Result<BTreeMap<String, String>, Error>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut data = BTreeMap::new();
    for item in items {
        let item = item.as_ref();
        match item.split_once('=') {
            Some((key, value)) if !key.is_empty() => {
                data.insert(key.to_string(), value.to_string());
            }
            _ => {
                return Err(Error::InvalidArgument(format!(
                    "Invalid data '{}'. Use KEY=VALUE.",
                    item
                )))
            }
        }
    }
    Ok(data)
}

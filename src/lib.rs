//! # Restful
//!
//! Simple command-line REST client for
//! [JSONPlaceholder](https://jsonplaceholder.typicode.com). One
//! invocation sends one GET or POST request, prints the status code,
//! and then prints the response body or saves it to a file.
//!
//! ```text
//! restful <METHOD> <ENDPOINT> [-o|--output OUTFILE] [--data KEY=VALUE ...]
//! ```
//!
//! - `METHOD` is `get` or `post`.
//! - `ENDPOINT` is appended verbatim to the base URL, eg. `/posts/1`.
//! - `--output` saves a 2xx response instead of printing it. A path
//!   ending in `.json` gets the body re-indented with 2 spaces; a path
//!   ending in `.csv` is accepted but nothing is written; anything else
//!   is an error.
//! - `--data` adds fields to the JSON object sent as the POST body.
//!
//! A 4xx or 5xx status, or a failed connection, makes the binary
//! print `Error: <message>` to stderr and exit with code 1. Nothing is
//! retried and redirects are not followed.
//!
//! The requests are sent by a small blocking HTTP/1.1 client that is
//! also usable on its own:
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let response = restful::get("https://jsonplaceholder.typicode.com/posts/1").send()?;
//! assert_eq!(200, response.status_code);
//! assert_eq!("OK", response.reason_phrase);
//! println!("{}", response.as_str()?);
//! # Ok(()) }
//! ```
//!
//! # Additional features
//!
//! ## `https`
//!
//! Enabled by default. This feature uses the (very good)
//! [`rustls`](https://crates.io/crates/rustls) crate to secure the
//! connection, with the root certificates of
//! [`webpki-roots`](https://crates.io/crates/webpki-roots). If it is
//! disabled, requests to urls that start with `https://` fail with a
//! [`HttpsFeatureNotEnabled`](enum.Error.html#variant.HttpsFeatureNotEnabled)
//! error.
//!
//! # Configuration
//!
//! The binary reads two environment variables, see [`Config`]:
//!
//! - `RESTFUL_BASE_URL` replaces `https://jsonplaceholder.typicode.com`.
//! - `RESTFUL_TIMEOUT` sets a timeout in seconds for connecting, sending
//!   and receiving. There is no timeout by default.
//!
//! Logging goes through the [`log`](https://crates.io/crates/log)
//! facade; the binary prints it to stderr with `env_logger`, filtered
//! by `RUST_LOG` (`warn` by default).

#![deny(missing_docs)]

pub mod cli;
mod config;
mod connection;
mod error;
mod http_url;
pub mod output;
mod request;
mod request_spec;
mod response;
mod runner;

pub use config::*;
pub use error::*;
pub use output::OutputFormat;
pub use request::*;
pub use request_spec::*;
pub use response::*;
pub use runner::*;

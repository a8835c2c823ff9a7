//! Command line arguments of the `restful` binary.

use crate::{Error, RequestSpec};
use clap::{ArgAction, Parser};

/// Simple command-line REST client for JSONPlaceholder.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "restful", version, about)]
pub struct Args {
    /// HTTP method to use (get or post)
    #[arg(value_name = "METHOD")]
    pub method: String,

    /// URI fragment, e.g., /posts/1
    #[arg(value_name = "ENDPOINT")]
    pub endpoint: String,

    /// Output file (ending with .json or .csv)
    #[arg(short, long, value_name = "OUTFILE")]
    pub output: Option<String>,

    /// Data to send with the request (for post requests)
    #[arg(long, value_name = "KEY=VALUE", num_args = 0.., action = ArgAction::Append)]
    pub data: Vec<String>,
}

impl Args {
    /// Validates the arguments into a [`RequestSpec`].
    ///
    /// # Errors
    ///
    /// See [`RequestSpec::new`].
    pub fn into_request_spec(self) -> Result<RequestSpec, Error> {
        RequestSpec::new(&self.method, self.endpoint, self.output, self.data)
    }
}

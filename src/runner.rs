use crate::output::{self, OutputFormat};
use crate::{Config, Error, Method, Request, RequestSpec, Response};
use std::collections::BTreeMap;
use std::io::{self, Write};

/// What a run that didn't fail did with the response.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Outcome {
    /// 2xx without an output path: the body was printed.
    Printed,
    /// 2xx with a `.json` output path: the body was saved there.
    Saved(String),
    /// 2xx with a `.csv` output path: nothing was written.
    Skipped(String),
    /// Neither success nor error (eg. a redirect): only the status
    /// line was printed.
    NotSuccessful(i32),
}

/// Performs one request described by a [`RequestSpec`] against the
/// configured base URL, and prints or saves the response.
///
/// # Example
///
/// ```no_run
/// # fn main() -> Result<(), restful::Error> {
/// use restful::{Config, RequestSpec, Runner};
///
/// let runner = Runner::new(Config::default());
/// let spec = RequestSpec::new("get", "/posts/1", None, Vec::<String>::new())?;
/// runner.run(&spec, &mut std::io::stdout())?;
/// # Ok(()) }
/// ```
#[derive(Clone, Debug)]
pub struct Runner {
    config: Config,
}

impl Runner {
    /// Creates a runner sending its requests according to `config`.
    pub fn new(config: Config) -> Runner {
        Runner { config }
    }

    /// Returns the config this runner was created with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The base URL and `endpoint` concatenated verbatim.
    pub fn url_for(&self, endpoint: &str) -> String {
        format!("{}{}", self.config.base_url, endpoint)
    }

    /// Builds the [`Request`] for `spec`, without sending it.
    ///
    /// # Errors
    ///
    /// Returns [`SerdeJsonError`](enum.Error.html#variant.SerdeJsonError)
    /// if the POST body can't be serialized.
    pub fn build_request(&self, spec: &RequestSpec) -> Result<Request, Error> {
        let url = self.url_for(&spec.endpoint);
        let request = match spec.method {
            Method::Get => {
                if spec.data.is_some() {
                    log::warn!("Ignoring --data for a GET request.");
                }
                crate::get(url)
            }
            Method::Post => {
                let empty = BTreeMap::new();
                crate::post(url).with_json(spec.data.as_ref().unwrap_or(&empty))?
            }
        };
        Ok(match self.config.timeout {
            Some(timeout) => request.with_timeout(timeout),
            None => request,
        })
    }

    /// Sends the request for `spec`.
    ///
    /// # Errors
    ///
    /// Returns [`HttpStatus`](enum.Error.html#variant.HttpStatus) for a
    /// 4xx or 5xx answer, and the transport's error if the exchange
    /// fails. Nothing is retried.
    pub fn execute(&self, spec: &RequestSpec) -> Result<Response, Error> {
        let request = self.build_request(spec)?;
        log::debug!("Sending {} {}.", spec.method, request.url());
        request.send()?.error_for_status()
    }

    /// Prints the status line of `response` to `out`, then prints or
    /// saves its body if the status is 2xx.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidArgument`](enum.Error.html#variant.InvalidArgument)
    /// if the output path has an unsupported extension,
    /// [`DecodeError`](enum.Error.html#variant.DecodeError) if a `.json`
    /// output was requested for a body that isn't JSON, and IO errors
    /// from writing.
    pub fn process<W: Write>(
        &self,
        spec: &RequestSpec,
        response: &Response,
        out: &mut W,
    ) -> Result<Outcome, Error> {
        writeln!(out, "HTTP Status Code: {}", response.status_code).map_err(console_error)?;

        if !response.is_success() {
            log::debug!("Status {} is not a success.", response.status_code);
            return Ok(Outcome::NotSuccessful(response.status_code));
        }

        match &spec.output {
            None => {
                writeln!(out, "{}", String::from_utf8_lossy(response.as_bytes()))
                    .map_err(console_error)?;
                Ok(Outcome::Printed)
            }
            Some(path) => {
                let format = OutputFormat::from_path(path)?;
                output::save(format, path, response.as_bytes())?;
                Ok(match format {
                    OutputFormat::Json => Outcome::Saved(path.clone()),
                    OutputFormat::Csv => Outcome::Skipped(path.clone()),
                })
            }
        }
    }

    /// Executes and processes `spec`: Idle → Requesting → Succeeded or
    /// Failed.
    ///
    /// # Errors
    ///
    /// See [`execute`](#method.execute) and [`process`](#method.process).
    pub fn run<W: Write>(&self, spec: &RequestSpec, out: &mut W) -> Result<Outcome, Error> {
        let response = self.execute(spec)?;
        self.process(spec, &response, out)
    }
}

fn console_error(source: io::Error) -> Error {
    Error::OutputFile {
        path: "<stdout>".to_string(),
        source,
    }
}

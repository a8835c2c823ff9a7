use std::env;

/// The REST API every request goes to, unless overridden.
pub const DEFAULT_BASE_URL: &str = "https://jsonplaceholder.typicode.com";

/// Environment variable overriding [`DEFAULT_BASE_URL`].
pub const BASE_URL_ENV: &str = "RESTFUL_BASE_URL";

/// Environment variable setting the request timeout, in seconds.
pub const TIMEOUT_ENV: &str = "RESTFUL_TIMEOUT";

/// Settings for a [`Runner`](struct.Runner.html).
///
/// The base URL is injected here rather than compiled into the
/// runner, so the runner can be pointed at a local server in tests.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Config {
    /// Prefix of every request URL. Endpoints are appended to it
    /// verbatim.
    pub base_url: String,
    /// Request timeout in seconds. `None` means no timeout at all.
    pub timeout: Option<u64>,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: None,
        }
    }
}

impl Config {
    /// Creates a config for the given base URL, without a timeout.
    pub fn new<T: Into<String>>(base_url: T) -> Config {
        Config {
            base_url: base_url.into(),
            timeout: None,
        }
    }

    /// Sets the request timeout in seconds.
    pub fn with_timeout(mut self, timeout: u64) -> Config {
        self.timeout = Some(timeout);
        self
    }

    /// Reads `RESTFUL_BASE_URL` and `RESTFUL_TIMEOUT` from the process
    /// environment, falling back to the defaults.
    pub fn from_env() -> Config {
        Config::from_lookup(|key| env::var(key).ok())
    }

    /// Like [`from_env`](#method.from_env), with the variables looked
    /// up through `lookup`.
    ///
    /// Empty values count as unset. A timeout that isn't a whole
    /// number of seconds is ignored with a warning.
    pub fn from_lookup<F>(lookup: F) -> Config
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();
        let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(base_url) = lookup(BASE_URL_ENV) {
            log::debug!("Using base url {} from {}.", base_url, BASE_URL_ENV);
            config.base_url = base_url;
        }

        if let Some(timeout) = lookup(TIMEOUT_ENV) {
            match timeout.trim().parse::<u64>() {
                Ok(timeout) => config.timeout = Some(timeout),
                Err(_) => log::warn!(
                    "Ignoring {}={:?}: not a number of seconds.",
                    TIMEOUT_ENV,
                    timeout
                ),
            }
        }

        config
    }
}

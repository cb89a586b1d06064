use {
    crate::{Error, Result},
    serde::Deserialize,
    std::time::Duration,
};

///
/// Configuration for the HTTP listener used by [`Router::serve`](crate::Router::serve).
///
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// IP address to bind the HTTP server to.
    /// The default `bind_addr` is "127.0.0.1".
    #[serde(default = "HttpConfig::default_bind_addr")]
    pub bind_addr: String,

    /// Port to bind the HTTP server to.
    /// The default `bind_port` is 3000.
    #[serde(default = "HttpConfig::default_bind_port")]
    pub bind_port: u16,

    /// How long in-flight requests may keep draining once a shutdown signal
    /// (SIGINT or SIGTERM) has been received. Past this point the server is
    /// dropped. The default is 30 seconds.
    #[serde(
        default = "HttpConfig::default_shutdown_timeout",
        with = "humantime_serde"
    )]
    pub shutdown_timeout: Duration,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind_addr: Self::default_bind_addr(),
            bind_port: Self::default_bind_port(),
            shutdown_timeout: Self::default_shutdown_timeout(),
        }
    }
}

impl HttpConfig {
    /// Returns `bind_addr:bind_port`, ready for `TcpListener::bind`.
    pub fn full_bind_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.bind_port)
    }

    fn default_bind_addr() -> String {
        "127.0.0.1".into()
    }

    fn default_bind_port() -> u16 {
        3000
    }

    fn default_shutdown_timeout() -> Duration {
        Duration::from_secs(30)
    }

    pub fn validate(&self) -> Result<()> {
        if self.bind_addr.trim().is_empty() {
            return Err(Error::config(
                "HTTP bind_addr is required. Set [http] bind_addr = \"0.0.0.0\" or \"127.0.0.1\" in config.",
            ));
        }

        if self.bind_addr.parse::<std::net::IpAddr>().is_err() {
            return Err(Error::config(format!(
                "HTTP bind_addr must be a valid IP address, got {:?}. Examples: \"127.0.0.1\", \"0.0.0.0\", \"::1\"",
                self.bind_addr
            )));
        }

        if self.bind_port == 0 {
            return Err(Error::config(
                "HTTP bind_port must be greater than 0. Set [http] bind_port = 3000 in config.",
            ));
        }

        Ok(())
    }
}

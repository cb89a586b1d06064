//!
//! Configuration structures for serving a route-group router.
//!
//! A configuration can be created in several ways:
//! - From an environment-specific TOML file via `Config::from_rust_env` or `Config::from_toml_file`
//! - From a TOML string via `Config::from_toml` or `str::parse`
//! - Programmatically via `Config::default()` and the `with_*` builder methods
//!
//! Environment variables can be referenced in the TOML using the `{{ VAR_NAME }}`
//! syntax; they are substituted before parsing by
//! [`replace_handlebars_with_env`](crate::replace_handlebars_with_env).
//!
//! Sections:
//!
//! - `HttpConfig` for the listener (`[http]`)
//! - `RoutingConfig` for dispatch policies (`[routing]`)
//! - `LoggingConfig` for the tracing subscriber (`[logging]`)
//!
mod http;
mod logging;
mod routing;

pub use http::*;
pub use logging::*;
pub use routing::*;

use {
    crate::{Error, Result, utils::replace_handlebars_with_env},
    serde::Deserialize,
    std::{env, fs, str::FromStr, time::Duration},
};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub routing: RoutingConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    ///
    /// Loads the configuration file named by the RUST_ENV environment variable.
    /// Fails with a configuration error when RUST_ENV is not set.
    ///
    pub fn from_rust_env() -> Result<Config> {
        Self::from_toml_file(env::var("RUST_ENV")?)
    }

    ///
    /// Loads "config/{env}.toml", substitutes environment variables and parses it.
    ///
    pub fn from_toml_file(env: impl AsRef<str>) -> Result<Config> {
        let path = format!("config/{}.toml", env.as_ref());
        let text = fs::read_to_string(&path)?;
        tracing::debug!(path = %path, "Loaded configuration file");
        Self::from_toml(&text)
    }

    ///
    /// Parses a configuration string in TOML format into a Config struct.
    ///
    pub fn from_toml(toml_str: &str) -> Result<Config> {
        toml_str.parse()
    }

    /// Sets the HTTP server bind address.
    pub fn with_bind_addr<S: AsRef<str>>(mut self, addr: S) -> Self {
        self.http.bind_addr = addr.as_ref().into();
        self
    }

    /// Sets the HTTP server bind port.
    pub fn with_bind_port(mut self, port: u16) -> Self {
        self.http.bind_port = port;
        self
    }

    /// Sets the graceful shutdown grace period.
    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.http.shutdown_timeout = timeout;
        self
    }

    /// Replaces the dispatch policies.
    pub fn with_routing(mut self, routing: RoutingConfig) -> Self {
        self.routing = routing;
        self
    }

    /// Sets the log output format.
    pub fn with_log_format(mut self, format: LogFormat) -> Self {
        self.logging.format = format;
        self
    }

    /// Ensures that the configuration is valid.
    pub fn validate(&self) -> Result<()> {
        self.http.validate()?;
        self.routing.validate()?;
        self.logging.validate()?;
        Ok(())
    }

    ///
    /// Installs the global tracing subscriber according to the LoggingConfig.
    /// Filtering follows `RUST_LOG`. Calling this twice is harmless; the second
    /// install is ignored.
    ///
    /// NOTE: Call this early during startup so route registration is logged.
    ///
    pub fn setup_tracing(&self) {
        use tracing_subscriber::{EnvFilter, prelude::*};
        let env_filter = EnvFilter::from_default_env();
        let registry = tracing_subscriber::registry().with(env_filter);
        let _ = match self.logging.format {
            LogFormat::Json => registry
                .with(tracing_subscriber::fmt::layer().json())
                .try_init(),
            LogFormat::Default => registry.with(tracing_subscriber::fmt::layer()).try_init(),
            LogFormat::Compact => registry
                .with(tracing_subscriber::fmt::layer().compact())
                .try_init(),
            LogFormat::Pretty => registry
                .with(tracing_subscriber::fmt::layer().pretty())
                .try_init(),
        };
    }
}

///
/// Parses a configuration string, substituting `{{ VAR }}` references to
/// environment variables before handing the text to the TOML parser.
///
impl FromStr for Config {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        let config_file = replace_handlebars_with_env(s);
        let config = toml::from_str::<Config>(&config_file)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn test_config_from_str_valid() {
        unsafe {
            env::set_var("ROUTEGROUP_CFG_PORT", "8080");
        }

        let config_str = r#"
[http]
bind_addr = "0.0.0.0"
bind_port = {{ ROUTEGROUP_CFG_PORT }}
shutdown_timeout = "5s"

[routing]
redirect_trailing_slash = false
trace_requests = true

[logging]
format = "json"
        "#;

        let config = config_str.parse::<Config>().unwrap();
        assert_eq!(config.http.bind_addr, "0.0.0.0");
        assert_eq!(config.http.bind_port, 8080);
        assert_eq!(config.http.shutdown_timeout, Duration::from_secs(5));
        assert!(!config.routing.redirect_trailing_slash);
        assert!(config.routing.handle_method_not_allowed);
        assert!(config.routing.handle_options);
        assert!(config.routing.trace_requests);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert!(config.validate().is_ok());

        unsafe {
            env::remove_var("ROUTEGROUP_CFG_PORT");
        }
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.http.full_bind_addr(), "127.0.0.1:3000");
        assert_eq!(config.http.shutdown_timeout, Duration::from_secs(30));
        assert_eq!(config.routing, RoutingConfig::default());
        assert_eq!(config.logging.format, LogFormat::Default);
    }

    #[test]
    fn test_config_from_str_invalid_toml() {
        let result = "this is not valid toml".parse::<Config>();
        assert_eq!(result.unwrap_err().kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_config_builder_matches_toml_equivalent() {
        let builder_config = Config::default()
            .with_bind_addr("0.0.0.0")
            .with_bind_port(9000)
            .with_shutdown_timeout(Duration::from_secs(10))
            .with_log_format(LogFormat::Compact)
            .with_routing(RoutingConfig {
                handle_options: false,
                ..RoutingConfig::default()
            });

        let toml_config: Config = r#"
[http]
bind_addr = "0.0.0.0"
bind_port = 9000
shutdown_timeout = "10s"

[routing]
handle_options = false

[logging]
format = "compact"
        "#
        .parse()
        .unwrap();

        assert_eq!(builder_config.http.bind_addr, toml_config.http.bind_addr);
        assert_eq!(builder_config.http.bind_port, toml_config.http.bind_port);
        assert_eq!(
            builder_config.http.shutdown_timeout,
            toml_config.http.shutdown_timeout
        );
        assert_eq!(builder_config.routing, toml_config.routing);
        assert_eq!(builder_config.logging.format, toml_config.logging.format);
    }

    #[test]
    fn test_load_from_toml_file() {
        let config = Config::from_toml_file("dev").unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = Config::from_toml_file("does-not-exist").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
    }

    #[test]
    fn test_validate_bind_port_zero() {
        let config = Config::default().with_bind_port(0);
        let err = config.validate().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(err.to_string().contains("bind_port"));
    }

    #[test]
    fn test_validate_empty_bind_addr() {
        let config = Config::default().with_bind_addr("  ");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_invalid_bind_addr_format() {
        let config = Config::default().with_bind_addr("localhost");
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("valid IP address"));
    }

    #[test]
    fn test_unknown_log_format_is_rejected() {
        let result = "[logging]\nformat = \"xml\"".parse::<Config>();
        assert!(result.is_err());
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn valid_ports_validate(port in 1u16..=65535) {
                let config: Config = format!("[http]\nbind_port = {port}").parse().unwrap();
                prop_assert_eq!(config.http.bind_port, port);
                prop_assert!(config.validate().is_ok());
            }

            #[test]
            fn ipv4_bind_addrs_validate(a in 0u8..=255, b in 0u8..=255, c in 0u8..=255, d in 0u8..=255) {
                let config = Config::default().with_bind_addr(format!("{a}.{b}.{c}.{d}"));
                prop_assert!(config.validate().is_ok());
            }

            #[test]
            fn shutdown_timeouts_parse(secs in 1u64..3600) {
                let config: Config = format!("[http]\nshutdown_timeout = \"{secs}s\"").parse().unwrap();
                prop_assert_eq!(config.http.shutdown_timeout, Duration::from_secs(secs));
            }
        }
    }
}

//! # axum-routegroup
//!
//! Route groups for services built on Axum and Tower: a set of routes that
//! share a path prefix, each route with its own middleware chain, mounted on
//! a router that runs global middleware around every request. Path
//! parameters reach handlers through request extensions.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use axum_routegroup::{Config, Handler, PathParams, Result, RouteGroup, Router, Routes};
//! use http::Method;
//!
//! struct Users;
//!
//! impl RouteGroup for Users {
//!     fn add_routes(&self, routes: &mut Routes) {
//!         routes
//!             .route(Method::GET, "/users", Handler::from_handler(list))
//!             .route(Method::GET, "/users/:id", Handler::from_handler(show));
//!     }
//! }
//!
//! async fn list() -> &'static str {
//!     "all users"
//! }
//!
//! async fn show(params: PathParams) -> String {
//!     format!("user {}", params.value("id"))
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = Config::from_rust_env()?;
//!     config.setup_tracing();
//!
//!     let mut router = Router::with_config(config.routing.clone(), []);
//!     router.add_routes(&Users, "/api/v1")?;
//!     router.serve(&config.http).await
//! }
//! ```
//!
//! With `config/dev.toml`:
//! ```toml
//! [http]
//! bind_port = 3000
//! shutdown_timeout = "10s"
//!
//! [routing]
//! trace_requests = true
//! ```
//!
//! Run with `RUST_ENV=dev cargo run`.
//!
//! # Dispatch
//!
//! | Request | Response | Config switch |
//! |---------|----------|---------------|
//! | Method and path registered | The route's handler, inside its middleware | |
//! | `OPTIONS` on a registered path | `200` with `Allow` | `routing.handle_options` |
//! | Other method on a registered path | `405` with `Allow` | `routing.handle_method_not_allowed` |
//! | Path registered with the trailing slash toggled | `301` (GET) or `308` redirect | `routing.redirect_trailing_slash` |
//! | Anything else | `404` | |
//!
//! Global middleware runs for all of them.
//!
//! # Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | `router` | [`Router`], [`RouteGroup`] and [`Routes`] |
//! | `handler` | [`Handler`], [`Middleware`] and [`Chain`] |
//! | `params` | [`PathParams`], [`path_param`] and [`MatchedRoute`] |
//! | `config` | Configuration loading and validation ([`Config`]) |
//! | `error` | Error types ([`Error`], [`ErrorKind`]) |
//!
//! # Configuration
//!
//! ```rust
//! use axum_routegroup::Config;
//! use std::time::Duration;
//!
//! // From string (useful for tests)
//! let config: Config = r#"
//!     [http]
//!     bind_port = 8080
//!
//!     [routing]
//!     redirect_trailing_slash = false
//! "#.parse().unwrap();
//! assert!(!config.routing.redirect_trailing_slash);
//!
//! // With builder methods
//! let config = Config::default()
//!     .with_bind_port(8080)
//!     .with_shutdown_timeout(Duration::from_secs(5));
//! assert_eq!(config.http.bind_port, 8080);
//! ```
//!
//! # Error Handling
//!
//! Registration and startup return the crate's [`Result`]. A route that
//! conflicts with an earlier one fails with [`ErrorKind::RouteConflict`]; a
//! malformed pattern with [`ErrorKind::InvalidRoute`].
mod config;
mod error;
mod handler;
mod params;
mod router;
mod utils;

pub use config::*;
pub use error::*;
pub use handler::{Chain, Handler, Middleware};
pub use params::{MatchedRoute, PathParamExt, PathParams, path_param};
pub use router::{RouteGroup, Router, Routes};
pub use utils::replace_handlebars_with_env;

pub type Result<T> = std::result::Result<T, Error>;

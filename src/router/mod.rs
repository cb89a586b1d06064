//! Router and route groups.
//!
//! - [`Router`] owns the route table and the global middleware chain
//! - [`RouteGroup`] is implemented by anything that contributes routes
//! - [`Routes`] collects the routes of one group during registration
//!
//! Registration happens before serving: [`Router::add_routes`] takes
//! `&mut self`, and [`Router::into_handler`] consumes the router and freezes
//! the table behind an `Arc`.

mod dispatch;
mod serve;
mod syntax;
mod table;

use {
    crate::{Chain, Handler, Middleware, Result, RoutingConfig},
    dispatch::{DispatchState, Dispatcher},
    http::Method,
    std::{fmt, iter},
    table::RouteTable,
};

/// A source of routes registered together under one prefix.
///
/// Implementations call [`Routes::route`] or [`Routes::route_with`] once per
/// route, synchronously, from within `add_routes`.
///
/// ```rust
/// use axum_routegroup::{Handler, RouteGroup, Routes};
/// use http::Method;
///
/// struct Users;
///
/// impl RouteGroup for Users {
///     fn add_routes(&self, routes: &mut Routes) {
///         routes
///             .route(Method::GET, "/users", Handler::from_handler(|| async { "list" }))
///             .route(Method::GET, "/users/:id", Handler::from_handler(|| async { "one" }));
///     }
/// }
/// ```
///
/// Closures taking `&mut Routes` are route groups too.
pub trait RouteGroup {
    fn add_routes(&self, routes: &mut Routes);
}

impl<F> RouteGroup for F
where
    F: Fn(&mut Routes),
{
    fn add_routes(&self, routes: &mut Routes) {
        self(routes)
    }
}

struct PendingRoute {
    method: Method,
    path: String,
    handler: Handler,
    middleware: Vec<Middleware>,
}

/// The routes one [`RouteGroup`] contributes, in the order they were added.
#[derive(Default)]
pub struct Routes {
    routes: Vec<PendingRoute>,
}

impl Routes {
    /// Adds a route without route-level middleware.
    pub fn route(&mut self, method: Method, path: impl Into<String>, handler: Handler) -> &mut Self {
        self.route_with(method, path, handler, iter::empty::<Middleware>())
    }

    /// Adds a route wrapped in `middleware`, outermost first. Route middleware
    /// runs inside the router's global middleware, after dispatch.
    pub fn route_with(
        &mut self,
        method: Method,
        path: impl Into<String>,
        handler: Handler,
        middleware: impl IntoIterator<Item = Middleware>,
    ) -> &mut Self {
        self.routes.push(PendingRoute {
            method,
            path: path.into(),
            handler,
            middleware: middleware.into_iter().collect(),
        });
        self
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl fmt::Debug for Routes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.routes.iter().map(|r| format!("{} {}", r.method, r.path)))
            .finish()
    }
}

/// An HTTP router built from route groups.
///
/// ```rust
/// use axum_routegroup::{Handler, Middleware, PathParams, Router, Routes};
/// use http::Method;
///
/// async fn show(params: PathParams) -> String {
///     format!("user {}", params.value("id"))
/// }
///
/// # fn main() -> axum_routegroup::Result<()> {
/// let mut router = Router::new([Middleware::trace()]);
/// router.add_routes(
///     &|routes: &mut Routes| {
///         routes.route(Method::GET, "/users/:id", Handler::from_handler(show));
///     },
///     "/api",
/// )?;
///
/// // GET /api/users/7 answers "user 7"
/// let handler = router.into_handler();
/// # let _ = handler;
/// # Ok(())
/// # }
/// ```
pub struct Router {
    global: Chain,
    table: RouteTable,
    config: RoutingConfig,
    not_found: Option<Handler>,
    method_not_allowed: Option<Handler>,
}

impl Default for Router {
    fn default() -> Self {
        Self::new(iter::empty::<Middleware>())
    }
}

impl Router {
    /// Creates a router with default dispatch policies. `global` wraps every
    /// request, outermost first, including requests that match no route.
    pub fn new(global: impl IntoIterator<Item = Middleware>) -> Self {
        Self::with_config(RoutingConfig::default(), global)
    }

    /// Creates a router with explicit dispatch policies. With
    /// `trace_requests` set, request tracing becomes the outermost global
    /// middleware.
    pub fn with_config(config: RoutingConfig, global: impl IntoIterator<Item = Middleware>) -> Self {
        let mut global = Chain::new(global);
        if config.trace_requests {
            global.prepend(Middleware::trace());
        }
        Self {
            global,
            table: RouteTable::default(),
            config,
            not_found: None,
            method_not_allowed: None,
        }
    }

    /// Registers every route of `group` under `prefix`.
    ///
    /// Each route's effective pattern is `prefix + path`, its handler wrapped
    /// in the route's middleware. Registration stops at the first conflicting
    /// or malformed route and returns the error; routes registered before it
    /// stay in place. Treat the error as fatal at startup.
    pub fn add_routes<G>(&mut self, group: &G, prefix: &str) -> Result<()>
    where
        G: RouteGroup + ?Sized,
    {
        let mut routes = Routes::default();
        group.add_routes(&mut routes);
        let count = routes.len();

        for route in routes.routes {
            let pattern = format!("{prefix}{}", route.path);
            let handler = Chain::new(route.middleware).then(route.handler);
            self.table.insert(route.method.clone(), &pattern, handler)?;
            tracing::debug!(method = %route.method, route = %pattern, "Registered route");
        }

        tracing::info!(prefix = %prefix, routes = count, "Registered route group");
        Ok(())
    }

    /// Handles requests that match no route. Defaults to an empty 404.
    pub fn not_found(&mut self, handler: Handler) -> &mut Self {
        self.not_found = Some(handler);
        self
    }

    /// Handles requests whose path is registered for other methods only.
    /// The `Allow` header is added to its response unless already set.
    /// Defaults to an empty 405.
    pub fn method_not_allowed(&mut self, handler: Handler) -> &mut Self {
        self.method_not_allowed = Some(handler);
        self
    }

    /// Registered `(method, pattern)` pairs in registration order. Patterns
    /// include their prefix and use `{name}` syntax.
    pub fn routes(&self) -> impl Iterator<Item = (&Method, &str)> {
        self.table
            .registered()
            .iter()
            .map(|(method, pattern)| (method, &**pattern))
    }

    /// Freezes the route table and returns the router as a single handler:
    /// the global middleware chain around dispatch.
    pub fn into_handler(self) -> Handler {
        let dispatcher = Dispatcher::new(DispatchState {
            table: self.table,
            config: self.config,
            not_found: self.not_found,
            method_not_allowed: self.method_not_allowed,
        });
        self.global.then(Handler::new(dispatcher))
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("global", &self.global.len())
            .field("routes", &self.table.registered().len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

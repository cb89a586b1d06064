//! Request dispatch over the route table.

use {
    super::table::RouteTable,
    crate::{Handler, RoutingConfig, params},
    axum::{
        extract::Request,
        response::{IntoResponse, Response},
    },
    http::{HeaderValue, Method, StatusCode, header},
    std::{
        convert::Infallible,
        future::Future,
        pin::Pin,
        sync::Arc,
        task::{Context, Poll},
    },
    tower::Service,
};

/// Everything dispatch needs, frozen once the router is turned into a handler.
pub(crate) struct DispatchState {
    pub(crate) table: RouteTable,
    pub(crate) config: RoutingConfig,
    pub(crate) not_found: Option<Handler>,
    pub(crate) method_not_allowed: Option<Handler>,
}

/// What a request resolved to.
enum Outcome {
    /// Run a handler. When `allow` is set it is added to the response.
    Run {
        handler: Handler,
        request: Request,
        allow: Option<HeaderValue>,
    },
    Respond(Response),
}

/// The innermost service of a router: matches the path and hands the request
/// to the route's composed handler.
#[derive(Clone)]
pub(crate) struct Dispatcher(Arc<DispatchState>);

impl Dispatcher {
    pub(crate) fn new(state: DispatchState) -> Self {
        Self(Arc::new(state))
    }

    fn resolve(&self, mut request: Request) -> Outcome {
        let state = &*self.0;
        let method = request.method().clone();
        let path = request.uri().path().to_owned();

        if let Some((route, matched)) = state.table.find(&method, &path) {
            tracing::Span::current().record("route", &*route.pattern);
            tracing::trace!(%method, route = %route.pattern, "Dispatching to route");
            params::inject(&mut request, &route.pattern, matched.iter());
            return Outcome::Run {
                handler: route.handler.clone(),
                request,
                allow: None,
            };
        }

        if state.config.redirect_trailing_slash
            && method != Method::CONNECT
            && let Some(response) = self.trailing_slash_redirect(&method, &path, &request)
        {
            return Outcome::Respond(response);
        }

        if method == Method::OPTIONS
            && state.config.handle_options
            && let Some(allow) = state.table.allow(&path, true)
        {
            tracing::trace!(path = %path, "Answering OPTIONS");
            return Outcome::Respond((StatusCode::OK, [(header::ALLOW, allow)]).into_response());
        }

        if state.config.handle_method_not_allowed
            && let Some(allow) = state.table.allow(&path, state.config.handle_options)
        {
            tracing::trace!(%method, path = %path, "Method not allowed");
            return match &state.method_not_allowed {
                Some(handler) => Outcome::Run {
                    handler: handler.clone(),
                    request,
                    allow: Some(allow),
                },
                None => Outcome::Respond(
                    (StatusCode::METHOD_NOT_ALLOWED, [(header::ALLOW, allow)]).into_response(),
                ),
            };
        }

        tracing::trace!(%method, path = %path, "No route matched");
        match &state.not_found {
            Some(handler) => Outcome::Run {
                handler: handler.clone(),
                request,
                allow: None,
            },
            None => Outcome::Respond(StatusCode::NOT_FOUND.into_response()),
        }
    }

    /// Redirects when the path with its trailing slash toggled is registered
    /// for the request's method.
    fn trailing_slash_redirect(
        &self,
        method: &Method,
        path: &str,
        request: &Request,
    ) -> Option<Response> {
        if path == "/" {
            return None;
        }
        let toggled = match path.strip_suffix('/') {
            Some(trimmed) => trimmed.to_owned(),
            None => format!("{path}/"),
        };
        self.0.table.find(method, &toggled)?;

        let location = match request.uri().query() {
            Some(query) => format!("{toggled}?{query}"),
            None => toggled,
        };
        let location = HeaderValue::try_from(location).ok()?;
        let status = if method == Method::GET {
            StatusCode::MOVED_PERMANENTLY
        } else {
            StatusCode::PERMANENT_REDIRECT
        };
        tracing::trace!(%method, path = %path, status = status.as_u16(), "Redirecting trailing slash");
        Some((status, [(header::LOCATION, location)]).into_response())
    }
}

impl Service<Request> for Dispatcher {
    type Response = Response;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Response, Infallible>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request) -> Self::Future {
        match self.resolve(request) {
            Outcome::Respond(response) => Box::pin(std::future::ready(Ok(response))),
            Outcome::Run {
                handler,
                request,
                allow,
            } => Box::pin(async move {
                let mut response = handler.handle(request).await;
                if let Some(allow) = allow {
                    response.headers_mut().entry(header::ALLOW).or_insert(allow);
                }
                Ok(response)
            }),
        }
    }
}

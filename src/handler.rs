//! Type-erased handlers and the middleware that wraps them.
//!
//! Every route ends in a [`Handler`]: a cloneable `tower` service taking an
//! axum [`Request`] and never failing. Middleware are plain `Handler -> Handler`
//! functions, and a [`Chain`] folds an ordered list of them around a final
//! handler. The first middleware in the list is the outermost one: it sees the
//! request first and the response last.

use {
    axum::{
        body::Body,
        extract::Request,
        response::{IntoResponse, Response},
    },
    std::{
        convert::Infallible,
        fmt,
        sync::Arc,
        task::{Context, Poll},
    },
    tower::{Layer, Service, ServiceExt, util::BoxCloneSyncService},
    tower_http::trace::TraceLayer,
};

/// A request handler with its concrete type erased.
///
/// Cloning a `Handler` clones the underlying service, which is how the router
/// hands an independent copy to every request.
#[derive(Clone)]
pub struct Handler(BoxCloneSyncService<Request, Response, Infallible>);

impl Handler {
    /// Erases any infallible `tower` service whose response converts into an
    /// HTTP response. This covers `axum::Router`, `MethodRouter`, `service_fn`
    /// closures and services produced by `tower` layers.
    pub fn new<S>(service: S) -> Self
    where
        S: Service<Request, Error = Infallible> + Clone + Send + Sync + 'static,
        S::Response: IntoResponse + 'static,
        S::Future: Send + 'static,
    {
        Self(BoxCloneSyncService::new(
            service.map_response(IntoResponse::into_response),
        ))
    }

    /// Adapts an axum handler (an async function taking extractors).
    ///
    /// ```rust
    /// use axum_routegroup::{Handler, PathParams};
    ///
    /// async fn show(params: PathParams) -> String {
    ///     format!("user {}", params.value("id"))
    /// }
    ///
    /// let handler = Handler::from_handler(show);
    /// ```
    pub fn from_handler<H, T>(handler: H) -> Self
    where
        H: axum::handler::Handler<T, ()>,
        T: 'static,
    {
        Self::new(handler.with_state(()))
    }

    /// Runs the handler once on `request`.
    pub async fn handle(self, request: Request) -> Response {
        match self.0.oneshot(request).await {
            Ok(response) => response,
            Err(never) => match never {},
        }
    }
}

impl Service<Request> for Handler {
    type Response = Response;
    type Error = Infallible;
    type Future =
        <BoxCloneSyncService<Request, Response, Infallible> as Service<Request>>::Future;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.0.poll_ready(cx)
    }

    fn call(&mut self, request: Request) -> Self::Future {
        self.0.call(request)
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler").finish_non_exhaustive()
    }
}

/// A function wrapping a handler to add cross-cutting behavior.
///
/// ```rust
/// use axum_routegroup::{Handler, Middleware};
/// use axum::{extract::Request, middleware::Next, response::Response};
///
/// async fn audit(request: Request, next: Next) -> Response {
///     tracing::info!(uri = %request.uri(), "audited");
///     next.run(request).await
/// }
///
/// // Any tower layer, including axum's `from_fn` middleware.
/// let from_layer = Middleware::layer(axum::middleware::from_fn(audit));
///
/// // Or a plain function over handlers.
/// let passthrough = Middleware::new(|next: Handler| next);
/// ```
#[derive(Clone)]
pub struct Middleware(Arc<dyn Fn(Handler) -> Handler + Send + Sync>);

impl Middleware {
    /// Builds middleware from a function receiving the next handler in the
    /// chain and returning the wrapped one.
    pub fn new<F>(wrap: F) -> Self
    where
        F: Fn(Handler) -> Handler + Send + Sync + 'static,
    {
        Self(Arc::new(wrap))
    }

    /// Builds middleware from a `tower` layer.
    pub fn layer<L>(layer: L) -> Self
    where
        L: Layer<Handler> + Send + Sync + 'static,
        L::Service: Service<Request, Error = Infallible> + Clone + Send + Sync + 'static,
        <L::Service as Service<Request>>::Response: IntoResponse + 'static,
        <L::Service as Service<Request>>::Future: Send + 'static,
    {
        Self::new(move |next| Handler::new(layer.layer(next)))
    }

    /// Request tracing: opens an `http_request` span per request carrying the
    /// method, the URI and, once dispatch has matched it, the route pattern.
    pub fn trace() -> Self {
        Self::layer(TraceLayer::new_for_http().make_span_with(request_span))
    }

    /// Wraps `next` with this middleware.
    pub fn wrap(&self, next: Handler) -> Handler {
        (self.0)(next)
    }
}

impl fmt::Debug for Middleware {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Middleware").finish_non_exhaustive()
    }
}

fn request_span(request: &Request<Body>) -> tracing::Span {
    tracing::info_span!(
        "http_request",
        method = %request.method(),
        uri = %request.uri(),
        route = tracing::field::Empty,
    )
}

/// An ordered middleware sequence, outermost first.
#[derive(Clone, Debug, Default)]
pub struct Chain {
    middleware: Vec<Middleware>,
}

impl Chain {
    pub fn new(middleware: impl IntoIterator<Item = Middleware>) -> Self {
        Self {
            middleware: middleware.into_iter().collect(),
        }
    }

    /// Inserts `middleware` as the new outermost element.
    pub fn prepend(&mut self, middleware: Middleware) {
        self.middleware.insert(0, middleware);
    }

    pub fn len(&self) -> usize {
        self.middleware.len()
    }

    pub fn is_empty(&self) -> bool {
        self.middleware.is_empty()
    }

    /// Composes the chain around `handler`. With `[a, b]` the result behaves
    /// like `a(b(handler))`.
    pub fn then(&self, handler: Handler) -> Handler {
        self.middleware
            .iter()
            .rev()
            .fold(handler, |next, middleware| middleware.wrap(next))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tower::service_fn;

    fn request() -> Request {
        Request::builder().uri("/").body(Body::empty()).unwrap()
    }

    /// Middleware that records its name on the way in and on the way out.
    fn recording(name: &'static str, log: Arc<Mutex<Vec<String>>>) -> Middleware {
        Middleware::new(move |next: Handler| {
            let log = log.clone();
            Handler::new(service_fn(move |request: Request| {
                let log = log.clone();
                let next = next.clone();
                async move {
                    log.lock().unwrap().push(format!("{name}:in"));
                    let response = next.handle(request).await;
                    log.lock().unwrap().push(format!("{name}:out"));
                    Ok::<_, Infallible>(response)
                }
            }))
        })
    }

    #[tokio::test]
    async fn test_chain_runs_outermost_first() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let chain = Chain::new([
            recording("a", log.clone()),
            recording("b", log.clone()),
        ]);

        let inner_log = log.clone();
        let handler = chain.then(Handler::from_handler(move || {
            let inner_log = inner_log.clone();
            async move {
                inner_log.lock().unwrap().push("handler".to_string());
                "ok"
            }
        }));

        let response = handler.handle(request()).await;
        assert_eq!(response.status(), 200);
        assert_eq!(
            *log.lock().unwrap(),
            vec!["a:in", "b:in", "handler", "b:out", "a:out"]
        );
    }

    #[tokio::test]
    async fn test_empty_chain_is_identity() {
        let chain = Chain::default();
        assert!(chain.is_empty());
        let response = chain
            .then(Handler::from_handler(|| async { "plain" }))
            .handle(request())
            .await;
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"plain");
    }

    #[tokio::test]
    async fn test_prepend_becomes_outermost() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut chain = Chain::new([recording("inner", log.clone())]);
        chain.prepend(recording("outer", log.clone()));
        assert_eq!(chain.len(), 2);

        chain
            .then(Handler::from_handler(|| async {}))
            .handle(request())
            .await;
        assert_eq!(log.lock().unwrap()[0], "outer:in");
        assert_eq!(log.lock().unwrap()[1], "inner:in");
    }

    #[tokio::test]
    async fn test_layer_middleware_from_fn() {
        async fn stamp(request: Request, next: axum::middleware::Next) -> Response {
            let mut response = next.run(request).await;
            response
                .headers_mut()
                .insert("x-stamped", http::HeaderValue::from_static("yes"));
            response
        }

        let handler = Middleware::layer(axum::middleware::from_fn(stamp))
            .wrap(Handler::from_handler(|| async { "ok" }));
        let response = handler.handle(request()).await;
        assert_eq!(response.headers()["x-stamped"], "yes");
    }

    #[tokio::test]
    async fn test_trace_middleware_passes_response_through() {
        let handler = Middleware::trace().wrap(Handler::from_handler(|| async {
            (http::StatusCode::ACCEPTED, "traced")
        }));
        let response = handler.handle(request()).await;
        assert_eq!(response.status(), http::StatusCode::ACCEPTED);
    }
}

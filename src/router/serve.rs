//! Serving a router with graceful shutdown.

use {
    super::Router,
    crate::{Handler, HttpConfig, Result},
    axum::ServiceExt as _,
    std::{
        future::{Future, IntoFuture},
        time::Duration,
    },
    tokio::{net::TcpListener, signal},
    tokio_util::sync::CancellationToken,
};

impl Router {
    /// Binds `config.bind_addr:config.bind_port` and serves the router until
    /// SIGINT or SIGTERM.
    ///
    /// After the signal, in-flight requests get `config.shutdown_timeout` to
    /// finish before the server is dropped.
    ///
    /// ```rust,no_run
    /// use axum_routegroup::{Config, Handler, Router, Routes};
    /// use http::Method;
    ///
    /// #[tokio::main]
    /// async fn main() -> axum_routegroup::Result<()> {
    ///     let config = Config::default();
    ///     config.setup_tracing();
    ///
    ///     let mut router = Router::with_config(config.routing.clone(), []);
    ///     router.add_routes(
    ///         &|routes: &mut Routes| {
    ///             routes.route(Method::GET, "/ping", Handler::from_handler(|| async { "pong" }));
    ///         },
    ///         "",
    ///     )?;
    ///     router.serve(&config.http).await
    /// }
    /// ```
    pub async fn serve(self, config: &HttpConfig) -> Result<()> {
        config.validate()?;
        let bind_addr = config.full_bind_addr();
        let listener = TcpListener::bind(&bind_addr).await?;

        tracing::info!("Bound to {}", &bind_addr);
        for (method, pattern) in self.routes() {
            tracing::debug!(method = %method, route = %pattern, "Serving route");
        }

        serve_until(
            listener,
            self.into_handler(),
            config.shutdown_timeout,
            shutdown_signal(),
        )
        .await
    }
}

/// Serves `handler` on `listener` until `signal` resolves, then drains for at
/// most `grace`.
pub(crate) async fn serve_until<F>(
    listener: TcpListener,
    handler: Handler,
    grace: Duration,
    signal: F,
) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        signal.await;
        tracing::info!(
            "Shutdown signal received, draining connections (timeout: {})",
            humantime::format_duration(grace)
        );
        trigger.cancel();
    });

    let graceful = token.clone();
    let serve_future = axum::serve(listener, handler.into_make_service())
        .with_graceful_shutdown(async move { graceful.cancelled().await })
        .into_future();

    tracing::info!("Waiting for connections");

    // The grace period only starts once the signal has been received.
    tokio::select! {
        result = serve_future => {
            result?;
            tracing::info!("Graceful shutdown completed");
        }
        _ = async {
            token.cancelled().await;
            tokio::time::sleep(grace).await;
        } => {
            tracing::warn!("Graceful shutdown timeout expired, forcing shutdown");
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => tracing::debug!("Ctrl+C signal received"),
            Err(err) => {
                tracing::warn!("Failed to install Ctrl+C handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut handler) => {
                handler.recv().await;
                tracing::debug!("SIGTERM signal received");
            }
            Err(err) => {
                tracing::warn!("Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Routes;
    use http::Method;
    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::TcpStream,
        sync::oneshot,
    };

    async fn raw_get(addr: std::net::SocketAddr, path: &str) -> String {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        let request = format!("GET {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n");
        stream.write_all(request.as_bytes()).await.unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        response
    }

    #[tokio::test]
    async fn test_serves_routes_and_stops_on_signal() {
        let mut router = Router::default();
        router
            .add_routes(
                &|routes: &mut Routes| {
                    routes.route(
                        Method::GET,
                        "/ping/:who",
                        Handler::from_handler(|params: crate::PathParams| async move {
                            format!("pong {}", params.value("who"))
                        }),
                    );
                },
                "/v1",
            )
            .unwrap();

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (stop_tx, stop_rx) = oneshot::channel::<()>();

        let server = tokio::spawn(serve_until(
            listener,
            router.into_handler(),
            Duration::from_secs(5),
            async move {
                let _ = stop_rx.await;
            },
        ));

        let response = raw_get(addr, "/v1/ping/alice").await;
        assert!(response.starts_with("HTTP/1.1 200 OK"), "{response}");
        assert!(response.ends_with("pong alice"), "{response}");

        let response = raw_get(addr, "/ping/alice").await;
        assert!(response.starts_with("HTTP/1.1 404"), "{response}");

        stop_tx.send(()).unwrap();
        let result = tokio::time::timeout(Duration::from_secs(10), server)
            .await
            .expect("server did not stop")
            .unwrap();
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_serve_rejects_invalid_config() {
        let config = HttpConfig {
            bind_port: 0,
            ..HttpConfig::default()
        };
        let err = Router::default().serve(&config).await.unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Configuration);
    }
}

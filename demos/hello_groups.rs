//! Route Groups Example
//!
//! Mounts two route groups under different prefixes, with an API-key check
//! on the admin routes only. `config/dev.toml` turns on request tracing.
//!
//! Run with:
//! ```bash
//! RUST_ENV=dev cargo run --example hello_groups
//! ```
//!
//! Then test:
//! ```bash
//! curl http://localhost:3000/api/v1/users/42
//! curl -i -X DELETE http://localhost:3000/api/v1/users      # 405 with Allow
//! curl -i http://localhost:3000/api/v1/users/               # 301 to /api/v1/users
//! curl -i -X POST http://localhost:3000/admin/reindex       # 401
//! curl -i -X POST -H "x-api-key: demo" http://localhost:3000/admin/reindex
//! ```

use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_routegroup::{
    Config, Handler, Middleware, PathParamExt, PathParams, Result, RouteGroup, Router, Routes,
};
use http::Method;

struct Users;

impl RouteGroup for Users {
    fn add_routes(&self, routes: &mut Routes) {
        routes
            .route(Method::GET, "/users", Handler::from_handler(list_users))
            .route(Method::POST, "/users", Handler::from_handler(create_user))
            .route(Method::GET, "/users/:id", Handler::from_handler(show_user))
            .route(Method::GET, "/files/*path", Handler::from_handler(show_file));
    }
}

async fn list_users() -> &'static str {
    "alice, bob"
}

async fn create_user() -> StatusCode {
    StatusCode::CREATED
}

async fn show_user(params: PathParams) -> String {
    format!("user {}", params.value("id"))
}

async fn show_file(request: Request) -> String {
    format!("file {}", request.path_param("path"))
}

async fn require_api_key(request: Request, next: Next) -> Response {
    match request.headers().get("x-api-key") {
        Some(key) if key == "demo" => next.run(request).await,
        _ => StatusCode::UNAUTHORIZED.into_response(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_rust_env().unwrap_or_default();
    config.setup_tracing();

    let mut router = Router::with_config(config.routing.clone(), []);
    router.add_routes(&Users, "/api/v1")?;

    let api_key = Middleware::layer(axum::middleware::from_fn(require_api_key));
    router.add_routes(
        &move |routes: &mut Routes| {
            routes.route_with(
                Method::POST,
                "/reindex",
                Handler::from_handler(|| async { "reindexing" }),
                [api_key.clone()],
            );
        },
        "/admin",
    )?;

    router.not_found(Handler::from_handler(|| async {
        (StatusCode::NOT_FOUND, "no such route")
    }));

    router.serve(&config.http).await
}

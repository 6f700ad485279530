//! Minimal switchboard demo — the three collaborators plus a few routes.
//!
//! Run with:
//!   RUST_LOG=info cargo run --example basic
//!
//! Try:
//!   curl http://localhost:3000/ping
//!   curl http://localhost:3000/routes
//!   curl http://localhost:3000/boom
//!   curl http://localhost:3000/nope

use std::sync::Arc;

use switchboard::{Failure, Request, Response, Router, StatusCode};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let router = Router::new(not_found, server_error, |failure: Failure| {
        // No request context here — bind/socket errors and double failures.
        tracing::error!("fatal: {failure}");
    });

    router.add_handler("/ping", ping).expect("fresh registry");
    router.add_handler("/boom", boom).expect("fresh registry");
    router.add_handler("/routes", routes).expect("fresh registry");

    let addr = router
        .listen("127.0.0.1", 3000)
        .await
        .expect("bind failed");
    println!("listening on http://{addr}");

    tokio::signal::ctrl_c().await.expect("signal handler");
    router.stop();
}

// GET /ping → 200 "pong"
async fn ping(_router: Arc<Router>, _req: Request) -> Response {
    Response::text("pong")
}

// GET /boom → handler raises; the error-response handler answers instead.
async fn boom(_router: Arc<Router>, _req: Request) -> Result<Response, Failure> {
    Err("the demo handler always fails".into())
}

// GET /routes → handlers get the router, so they can introspect it.
async fn routes(router: Arc<Router>, _req: Request) -> Response {
    let known = ["/ping", "/boom", "/routes", "/nope"]
        .iter()
        .map(|p| format!("{p}: {}\n", router.has_handler_for_url(p)))
        .collect::<String>();
    Response::text(known)
}

// Any unregistered path lands here.
async fn not_found(_router: Arc<Router>, req: Request) -> Response {
    Response::builder()
        .status(StatusCode::NOT_FOUND)
        .text(format!("nothing at {}", req.path()))
}

// Any raised failure lands here, request attached.
async fn server_error(_router: Arc<Router>, failure: Failure, req: Request) -> Response {
    Response::builder()
        .status(StatusCode::INTERNAL_SERVER_ERROR)
        .text(format!("{} {} failed: {failure}", req.method(), req.path()))
}

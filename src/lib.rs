//! # switchboard
//!
//! A minimal exact-path HTTP router. Nothing more. Nothing less.
//!
//! ## The contract
//!
//! hyper parses HTTP, tokio moves the bytes. switchboard owns the one part
//! that changes between applications: which handler answers which path, and
//! what happens when no handler matches or a handler fails.
//!
//! - **Exact-path registry** — one flat map from path key to handler; the
//!   path component of the URL is the key, query and fragment never are
//! - **Fixed fallbacks** — a not-found handler, an error-response handler,
//!   and a top-level error callback, all supplied once at construction
//! - **Multi-listener lifecycle** — bind any number of hostname/port pairs
//!   against one shared registry; [`Router::stop`] tears them all down hard
//!
//! What switchboard deliberately skips: pattern routing, middleware, body
//! parsing, TLS, graceful drain. If you need those, you want a framework,
//! not a switchboard.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use switchboard::{Failure, Request, Response, Router, StatusCode};
//!
//! #[tokio::main]
//! async fn main() {
//!     let router = Router::new(not_found, server_error, |failure: Failure| {
//!         tracing::error!("fatal: {failure}");
//!     });
//!
//!     router.add_handler("/ping", ping).unwrap();
//!     router.listen("127.0.0.1", 3000).await.unwrap();
//! }
//!
//! async fn ping(_router: Arc<Router>, _req: Request) -> Response {
//!     Response::text("pong")
//! }
//!
//! async fn not_found(_router: Arc<Router>, req: Request) -> Response {
//!     Response::builder()
//!         .status(StatusCode::NOT_FOUND)
//!         .text(format!("nothing at {}", req.path()))
//! }
//!
//! async fn server_error(_router: Arc<Router>, failure: Failure, _req: Request) -> Response {
//!     Response::builder()
//!         .status(StatusCode::INTERNAL_SERVER_ERROR)
//!         .text(failure.to_string())
//! }
//! ```
//!
//! Handlers may also return `Result<Response, Failure>`; an `Err` routes the
//! request to the error-response handler with the failure attached.

mod error;
mod handler;
mod request;
mod response;
mod router;
mod server;

pub mod path;

pub use error::{Error, Failure};
pub use handler::{BoxedHandler, ErrorHandler, Handler};
#[doc(hidden)]
pub use handler::{BoxedErrorHandler, ErasedErrorHandler, ErasedHandler};
pub use http::{Method, StatusCode, Uri};
pub use request::Request;
pub use response::{IntoOutcome, IntoResponse, Response, ResponseBuilder};
pub use router::Router;

//! Accept loop and per-request dispatch.
//!
//! One accept loop runs per active listener, spawned by
//! [`Router::listen`](crate::Router::listen) and kept in the router's
//! binding table. [`Router::stop`](crate::Router::stop) aborts the loop,
//! which closes the socket and takes every in-flight connection down with
//! it — that is the contract, not an accident.

use std::convert::Infallible;
use std::sync::Arc;

use bytes::Bytes;
use http::StatusCode;
use http_body_util::{BodyExt, Full};
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use tokio::net::TcpListener;
use tracing::error;

use crate::handler::{ErasedErrorHandler, ErasedHandler};
use crate::request::Request;
use crate::response::Response;
use crate::router::Router;

/// Accepts connections on `listener` until the owning task is aborted.
///
/// Accept failures and connection-serve failures have no request context, so
/// both are logged and forwarded to the router's top-level error callback.
pub(crate) async fn accept_loop(router: Arc<Router>, listener: TcpListener) {
    // JoinSet owns every connection task spawned from this listener. When
    // stop() aborts this loop the set is dropped, which aborts the
    // connections as well — the hard teardown the lifecycle promises.
    let mut conns = tokio::task::JoinSet::new();

    loop {
        tokio::select! {
            res = listener.accept() => {
                let (stream, remote_addr) = match res {
                    Ok(v) => v,
                    Err(e) => {
                        error!("accept error: {e}");
                        router.fatal(e.into());
                        continue;
                    }
                };

                let router = Arc::clone(&router);
                // TokioIo adapts tokio's AsyncRead/AsyncWrite to the hyper
                // IO traits.
                let io = TokioIo::new(stream);

                conns.spawn(async move {
                    // `service_fn` turns a plain async function into a hyper
                    // `Service`. The closure runs once per request on the
                    // connection, not once per connection.
                    let svc_router = Arc::clone(&router);
                    let svc = service_fn(move |req| {
                        let router = Arc::clone(&svc_router);
                        async move { dispatch(router, req).await }
                    });

                    // `auto::Builder` transparently handles both HTTP/1.1
                    // and HTTP/2 — whatever the client negotiates.
                    if let Err(e) = ConnBuilder::new(TokioExecutor::new())
                        .serve_connection(io, svc)
                        .await
                    {
                        error!(peer = %remote_addr, "connection error: {e}");
                        router.fatal(e);
                    }
                });
            }

            // Reap finished connection tasks so the JoinSet does not grow
            // without bound on long-running listeners.
            Some(_) = conns.join_next(), if !conns.is_empty() => {}
        }
    }
}

// ── Request dispatch ──────────────────────────────────────────────────────────

/// Core hot path: routes one request and produces one response.
///
/// The error type is [`Infallible`] — every failure is handled internally
/// (not-found handler, error-response handler, top-level callback) so hyper
/// never sees an error from us.
async fn dispatch(
    router: Arc<Router>,
    req: hyper::Request<hyper::body::Incoming>,
) -> Result<http::Response<Full<Bytes>>, Infallible> {
    let (parts, body) = req.into_parts();

    let target = parts.uri.to_string();
    let path = parts.uri.path().to_owned();
    let headers: Vec<(String, String)> = parts
        .headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_owned(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect();

    // Buffer the whole body up front so the Request can be cloned for the
    // error-response handler. A body that cannot be read never reaches the
    // handler; it is treated like any other failure inside the request.
    let (body, read_failure) = match body.collect().await {
        Ok(collected) => (collected.to_bytes().to_vec(), None),
        Err(e) => (Vec::new(), Some(e)),
    };

    let request = Request::new(parts.method, path, target, headers, body);

    let outcome = match read_failure {
        Some(e) => Err(e.into()),
        None => {
            let handler = router.dispatch_handler(request.path());
            handler.call(Arc::clone(&router), request.clone()).await
        }
    };

    let response = match outcome {
        Ok(response) => response,
        Err(failure) => {
            let error_handler = router.error_handler();
            match error_handler.call(Arc::clone(&router), failure, request).await {
                Ok(response) => response,
                Err(second) => {
                    // The error-response handler raised too. No recovery
                    // left: hand the failure to the top-level callback and
                    // close the connection under a bare 500 rather than
                    // leave the client hanging.
                    router.fatal(second);
                    Response::builder()
                        .status(StatusCode::INTERNAL_SERVER_ERROR)
                        .header("connection", "close")
                        .no_body()
                }
            }
        }
    };

    Ok(response.into_hyper())
}

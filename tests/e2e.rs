//! End-to-end tests: a real router bound to real sockets, exercised with
//! raw TCP clients.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use switchboard::{Failure, Request, Response, Router, StatusCode};

/// Sends one GET request and returns the full raw response.
async fn send_request(addr: SocketAddr, path: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.expect("connect");
    let request = format!("GET {path} HTTP/1.1\r\nhost: test\r\nconnection: close\r\n\r\n");
    stream.write_all(request.as_bytes()).await.expect("write");

    let mut response = String::new();
    stream.read_to_string(&mut response).await.expect("read");
    response
}

/// Extracts the body from a raw HTTP response.
fn body_of(response: &str) -> &str {
    response.split_once("\r\n\r\n").map_or("", |(_, body)| body)
}

/// A router with recognizable fallback output and a recording fatal sink.
fn test_router(fatal: Arc<Mutex<Vec<String>>>) -> Arc<Router> {
    Router::new(
        |_: Arc<Router>, req: Request| async move {
            Response::builder()
                .status(StatusCode::NOT_FOUND)
                .text(format!("nothing at {}", req.path()))
        },
        |_: Arc<Router>, failure: Failure, req: Request| async move {
            Response::builder()
                .status(StatusCode::INTERNAL_SERVER_ERROR)
                .text(format!("{} failed: {failure}", req.path()))
        },
        move |failure: Failure| fatal.lock().unwrap().push(failure.to_string()),
    )
}

#[tokio::test]
async fn registered_handler_answers() {
    let router = test_router(Arc::default());
    router
        .add_handler("/ping", |_: Arc<Router>, _: Request| async { Response::text("pong") })
        .unwrap();
    let addr = router.listen("127.0.0.1", 0).await.unwrap();

    let response = send_request(addr, "/ping").await;
    assert!(response.starts_with("HTTP/1.1 200"), "got: {response}");
    assert_eq!(body_of(&response), "pong");

    router.stop();
}

#[tokio::test]
async fn unregistered_path_gets_the_not_found_handler() {
    let router = test_router(Arc::default());
    let addr = router.listen("127.0.0.1", 0).await.unwrap();

    let response = send_request(addr, "/missing").await;
    assert!(response.starts_with("HTTP/1.1 404"), "got: {response}");
    assert_eq!(body_of(&response), "nothing at /missing");

    router.stop();
}

#[tokio::test]
async fn raised_failure_reaches_the_error_handler_verbatim() {
    let router = test_router(Arc::default());
    router
        .add_handler("/boom", |_: Arc<Router>, _: Request| async {
            Err::<Response, Failure>("kaboom".into())
        })
        .unwrap();
    let addr = router.listen("127.0.0.1", 0).await.unwrap();

    let response = send_request(addr, "/boom").await;
    assert!(response.starts_with("HTTP/1.1 500"), "got: {response}");
    assert_eq!(body_of(&response), "/boom failed: kaboom");

    router.stop();
}

#[tokio::test]
async fn query_string_does_not_affect_dispatch() {
    let router = test_router(Arc::default());
    router
        .add_handler("/alpha/beta", |_: Arc<Router>, _: Request| async { Response::text("ab") })
        .unwrap();
    let addr = router.listen("127.0.0.1", 0).await.unwrap();

    let response = send_request(addr, "/alpha/beta?x=1").await;
    assert!(response.starts_with("HTTP/1.1 200"), "got: {response}");
    assert_eq!(body_of(&response), "ab");

    router.stop();
}

#[tokio::test]
async fn failing_error_handler_hits_the_top_level_callback() {
    let fatal = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&fatal);
    let router = Router::new(
        |_: Arc<Router>, _: Request| async { Response::status(StatusCode::NOT_FOUND) },
        |_: Arc<Router>, _: Failure, _: Request| async {
            Err::<Response, Failure>("error handler is broken too".into())
        },
        move |failure: Failure| sink.lock().unwrap().push(failure.to_string()),
    );
    router
        .add_handler("/boom", |_: Arc<Router>, _: Request| async {
            Err::<Response, Failure>("original failure".into())
        })
        .unwrap();
    let addr = router.listen("127.0.0.1", 0).await.unwrap();

    // The client still gets a response: a bare 500, connection closed.
    let response = send_request(addr, "/boom").await;
    assert!(response.starts_with("HTTP/1.1 500"), "got: {response}");
    assert_eq!(body_of(&response), "");

    let recorded = fatal.lock().unwrap();
    assert_eq!(recorded.as_slice(), ["error handler is broken too"]);

    router.stop();
}

#[tokio::test]
async fn stop_refuses_new_connections_but_keeps_the_registry() {
    let router = test_router(Arc::default());
    router
        .add_handler("/ping", |_: Arc<Router>, _: Request| async { Response::text("pong") })
        .unwrap();
    let addr = router.listen("127.0.0.1", 0).await.unwrap();
    assert!(response_ok(send_request(addr, "/ping").await));

    router.stop();
    // The abort lands at the accept loop's next scheduling point.
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert!(TcpStream::connect(addr).await.is_err(), "socket should be closed");
    assert!(router.has_handler_for_url("/ping"));

    // A stopped router restarts against the same registry.
    let addr = router.listen("127.0.0.1", 0).await.unwrap();
    let response = send_request(addr, "/ping").await;
    assert_eq!(body_of(&response), "pong");

    router.stop();
}

fn response_ok(response: String) -> bool {
    response.starts_with("HTTP/1.1 200")
}

#[tokio::test]
async fn listeners_share_one_registry() {
    let router = test_router(Arc::default());
    router
        .add_handler("/ping", |_: Arc<Router>, _: Request| async { Response::text("pong") })
        .unwrap();
    let a = router.listen("127.0.0.1", 0).await.unwrap();
    let b = router.listen("127.0.0.1", 0).await.unwrap();

    assert_eq!(body_of(&send_request(a, "/ping").await), "pong");
    assert_eq!(body_of(&send_request(b, "/ping").await), "pong");

    router.stop();
}

#[tokio::test]
async fn concurrent_requests_do_not_cross_contaminate() {
    let router = test_router(Arc::default());
    router
        .add_handler("/slow/alpha", |_: Arc<Router>, _: Request| async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            Response::text("alpha")
        })
        .unwrap();
    router
        .add_handler("/slow/beta", |_: Arc<Router>, _: Request| async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            Response::text("beta")
        })
        .unwrap();
    let addr = router.listen("127.0.0.1", 0).await.unwrap();

    let (alpha, beta) = tokio::join!(
        send_request(addr, "/slow/alpha"),
        send_request(addr, "/slow/beta"),
    );
    assert_eq!(body_of(&alpha), "alpha");
    assert_eq!(body_of(&beta), "beta");

    router.stop();
}

#[tokio::test]
async fn handlers_can_introspect_the_router() {
    let router = test_router(Arc::default());
    router
        .add_handler("/introspect", |router: Arc<Router>, _: Request| async move {
            Response::text(format!("self-aware: {}", router.has_handler_for_url("/introspect")))
        })
        .unwrap();
    let addr = router.listen("127.0.0.1", 0).await.unwrap();

    let response = send_request(addr, "/introspect").await;
    assert_eq!(body_of(&response), "self-aware: true");

    router.stop();
}

//! Exact-path request router and listener lifecycle.
//!
//! One flat map from path key to handler. O(1) lookup. No patterns, no
//! middleware stack, no reflection. You register a path, you get a handler —
//! or one of the two fallbacks fixed at construction time. That is all.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, RwLock};

use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::info;

use crate::error::{Error, Failure};
use crate::handler::{BoxedErrorHandler, BoxedHandler, ErrorHandler, Handler};
use crate::path;
use crate::server;

/// The router.
///
/// Owns the handler registry, the set of active listeners, and the three
/// collaborators supplied at construction: the not-found handler, the
/// error-response handler, and the top-level error callback. All of them
/// live for the router's whole lifetime.
///
/// Registry and listener lifecycle are independent: [`stop`](Router::stop)
/// tears down sockets but keeps every registered handler, so a later
/// [`listen`](Router::listen) serves the same routes again.
pub struct Router {
    registry: RwLock<HashMap<String, BoxedHandler>>,
    bindings: Mutex<Vec<Binding>>,
    not_found: BoxedHandler,
    error_handler: BoxedErrorHandler,
    on_fatal: Arc<dyn Fn(Failure) + Send + Sync + 'static>,
}

/// One active listener: the hostname it was asked to bind, the address the
/// OS actually gave us, and the accept-loop task keeping it alive.
struct Binding {
    hostname: String,
    addr: SocketAddr,
    accept_task: JoinHandle<()>,
}

impl Router {
    /// Creates a router with no listeners and an empty registry.
    ///
    /// - `not_found` answers requests whose path has no registered handler.
    /// - `error_handler` answers requests whose handler raised; it receives
    ///   the raised [`Failure`] alongside the request.
    /// - `on_fatal` receives failures with no request context: bind and
    ///   socket errors, and failures raised by `error_handler` itself. It
    ///   cannot produce an HTTP response — log or alert, don't recover.
    ///
    /// Returned in an `Arc` because every accept loop and every handler
    /// invocation shares the instance.
    pub fn new(
        not_found: impl Handler,
        error_handler: impl ErrorHandler,
        on_fatal: impl Fn(Failure) + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            registry: RwLock::new(HashMap::new()),
            bindings: Mutex::new(Vec::new()),
            not_found: not_found.into_boxed_handler(),
            error_handler: error_handler.into_boxed_error_handler(),
            on_fatal: Arc::new(on_fatal),
        })
    }

    // ── Registry ─────────────────────────────────────────────────────────────

    /// Registers `handler` for the exact path of `url`.
    ///
    /// The URL is normalized first, so `/a?x=1` and `/a` register the same
    /// key. Fails with [`Error::DuplicateHandler`] if the key is taken; the
    /// existing registration is untouched in that case.
    pub fn add_handler(&self, url: &str, handler: impl Handler) -> Result<(), Error> {
        let key = path::key(url);
        let mut registry = self.registry.write().expect("registry lock poisoned");
        if registry.contains_key(&key) {
            return Err(Error::DuplicateHandler(key));
        }
        registry.insert(key, handler.into_boxed_handler());
        Ok(())
    }

    /// Unregisters the handler for the exact path of `url`.
    ///
    /// Fails with [`Error::HandlerNotFound`] if nothing is registered there.
    pub fn remove_handler_for_url(&self, url: &str) -> Result<(), Error> {
        let key = path::key(url);
        match self.registry.write().expect("registry lock poisoned").remove(&key) {
            Some(_) => Ok(()),
            None => Err(Error::HandlerNotFound(key)),
        }
    }

    /// Whether a handler is registered for the exact path of `url`.
    ///
    /// The not-found fallback does not count: this answers "truly
    /// registered", never "would fall back to 404".
    pub fn has_handler_for_url(&self, url: &str) -> bool {
        let key = path::key(url);
        self.registry.read().expect("registry lock poisoned").contains_key(&key)
    }

    /// Looks up the handler for `url`.
    ///
    /// With `fallback_to_404` set this always yields a usable handler —
    /// the registered one or the configured not-found handler — which is
    /// what dispatch wants. Without it, an unregistered path yields `None`,
    /// which is what introspection wants.
    pub fn get_handler_for_url(&self, url: &str, fallback_to_404: bool) -> Option<BoxedHandler> {
        let key = path::key(url);
        if let Some(handler) = self.registry.read().expect("registry lock poisoned").get(&key) {
            return Some(Arc::clone(handler));
        }
        fallback_to_404.then(|| Arc::clone(&self.not_found))
    }

    /// Infallible lookup for the dispatch path.
    pub(crate) fn dispatch_handler(&self, url: &str) -> BoxedHandler {
        self.get_handler_for_url(url, true)
            .unwrap_or_else(|| Arc::clone(&self.not_found))
    }

    pub(crate) fn error_handler(&self) -> BoxedErrorHandler {
        Arc::clone(&self.error_handler)
    }

    /// Forwards a failure with no request context to the top-level callback.
    pub(crate) fn fatal(&self, failure: Failure) {
        (self.on_fatal)(failure);
    }

    // ── Listener lifecycle ───────────────────────────────────────────────────

    /// Binds a new listener to `hostname:port` and starts serving on it.
    ///
    /// Suspends until the bind completes; a bind failure surfaces here and
    /// nothing is recorded — retry policy is the caller's business. On
    /// success the listener joins the active set and the bound address is
    /// returned, so `port` 0 reveals the port the OS picked.
    ///
    /// Concurrent calls with different address pairs are independent; every
    /// listener dispatches against the same shared registry.
    pub async fn listen(self: &Arc<Self>, hostname: &str, port: u16) -> Result<SocketAddr, Error> {
        let hostname = hostname.trim();
        let listener = TcpListener::bind((hostname, port)).await?;
        let addr = listener.local_addr()?;

        let accept_task = tokio::spawn(server::accept_loop(Arc::clone(self), listener));
        self.bindings.lock().expect("bindings lock poisoned").push(Binding {
            hostname: hostname.to_owned(),
            addr,
            accept_task,
        });

        info!(%addr, "listening");
        Ok(addr)
    }

    /// Forcibly tears down every active listener. Not a graceful drain:
    /// in-flight requests are aborted along with their connections.
    ///
    /// The registry is untouched. Stopping with no active listeners is a
    /// no-op, so calling this twice is harmless.
    pub fn stop(&self) {
        let mut bindings = self.bindings.lock().expect("bindings lock poisoned");
        for binding in bindings.drain(..) {
            // Aborting the accept loop drops its TcpListener (closing the
            // socket) and its JoinSet of connection tasks (aborting them).
            binding.accept_task.abort();
            info!(addr = %binding.addr, "listener stopped");
        }
    }

    /// Whether any active listener is bound to `hostname:port`.
    ///
    /// The hostname is trimmed of surrounding whitespace before comparison.
    /// `localhost` and `127.0.0.1` match each other in either direction;
    /// any other hostname must match exactly.
    pub fn is_listening_to(&self, hostname: &str, port: u16) -> bool {
        let hostname = hostname.trim();
        self.bindings
            .lock()
            .expect("bindings lock poisoned")
            .iter()
            .any(|b| b.addr.port() == port && hostnames_match(&b.hostname, hostname))
    }
}

fn hostnames_match(bound: &str, asked: &str) -> bool {
    bound == asked || (is_loopback_name(bound) && is_loopback_name(asked))
}

fn is_loopback_name(hostname: &str) -> bool {
    hostname == "localhost" || hostname == "127.0.0.1"
}

//! Handler traits and type erasure.
//!
//! # How async handlers are stored
//!
//! The registry needs to hold handlers of *different* types in a single
//! `HashMap<String, _>`. Rust collections can only hold one concrete type,
//! so we use **trait objects** (`dyn ErasedHandler`) to hide the concrete
//! handler type behind a common interface and store everything uniformly.
//!
//! The chain from user code to vtable call is:
//!
//! ```text
//! async fn ping(router, req) -> Response { … }     ← user writes this
//!        ↓ router.add_handler("/ping", ping)
//! ping.into_boxed_handler()                        ← Handler blanket impl
//!        ↓
//! Arc::new(FnHandler(ping))                        ← heap-allocated wrapper
//!        ↓  stored as BoxedHandler = Arc<dyn ErasedHandler>
//! handler.call(router, req)  at request time       ← one vtable dispatch
//!        ↓
//! Box::pin(async { ping(router, req).await.into_outcome() })
//! ```
//!
//! The only runtime cost per request is **one Arc clone** (atomic inc) +
//! **one virtual call** — negligible compared to network I/O.
//!
//! The error-response handler gets the same treatment with one extra
//! argument: the [`Failure`] raised by the handler it replaces.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::error::Failure;
use crate::request::Request;
use crate::response::{IntoOutcome, Response};
use crate::router::Router;

// ── Internal types ────────────────────────────────────────────────────────────

/// A heap-allocated, type-erased future resolving to a handler outcome.
///
/// `Pin<Box<…>>` is required because the async runtime must be able to poll
/// the future in-place — it cannot move it in memory after the first poll.
/// `Send + 'static` let tokio move the future across threads safely.
pub(crate) type BoxFuture = Pin<Box<dyn Future<Output = Result<Response, Failure>> + Send + 'static>>;

/// Internal dispatch interface for request handlers.
///
/// `#[doc(hidden)] pub` rather than `pub(crate)` because it appears in the
/// definition of the public [`BoxedHandler`] alias. External crates cannot
/// usefully interact with this trait.
#[doc(hidden)]
pub trait ErasedHandler {
    fn call(&self, router: Arc<Router>, req: Request) -> BoxFuture;
}

/// Internal dispatch interface for error-response handlers.
#[doc(hidden)]
pub trait ErasedErrorHandler {
    fn call(&self, router: Arc<Router>, failure: Failure, req: Request) -> BoxFuture;
}

/// A heap-allocated, type-erased handler shared across concurrent requests.
///
/// This is what [`get_handler_for_url`](Router::get_handler_for_url) returns.
/// `Arc` gives cheap, thread-safe shared ownership (one atomic reference
/// count increment per request) without copying the handler.
pub type BoxedHandler = Arc<dyn ErasedHandler + Send + Sync + 'static>;

/// The erased form of the error-response handler.
pub type BoxedErrorHandler = Arc<dyn ErasedErrorHandler + Send + Sync + 'static>;

// ── Public traits ─────────────────────────────────────────────────────────────

/// Implemented for every valid request handler.
///
/// You never implement this yourself. It is automatically satisfied for any
/// `async fn` with the signature:
///
/// ```text
/// async fn name(router: Arc<Router>, req: Request) -> impl IntoOutcome
/// ```
///
/// The router instance is passed explicitly so handlers can introspect the
/// registry or the active bindings without global state.
///
/// The trait is **sealed** (via the private `Sealed` supertrait): only the
/// blanket impl below can satisfy it. This prevents accidental misuse and
/// keeps the API surface stable across versions.
pub trait Handler: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler;
}

/// Implemented for every valid error-response handler.
///
/// Automatically satisfied for any `async fn` with the signature:
///
/// ```text
/// async fn name(router: Arc<Router>, failure: Failure, req: Request) -> impl IntoOutcome
/// ```
///
/// Invoked in place of the normal handler when that handler raised; the
/// second argument is the raised failure. Sealed like [`Handler`].
pub trait ErrorHandler: private::SealedError + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_error_handler(self) -> BoxedErrorHandler;
}

/// The sealing module. Because these traits are private, external crates
/// cannot name them and therefore cannot implement [`Handler`] or
/// [`ErrorHandler`] on their own types.
mod private {
    pub trait Sealed {}
    pub trait SealedError {}
}

// ── Blanket implementations ───────────────────────────────────────────────────

/// `Fn(Arc<Router>, Request) -> Fut` covers:
///   - named `async fn` items
///   - closures returning `async move` blocks
///   - any struct that implements `Fn`
impl<F, Fut, R> private::Sealed for F
where
    F: Fn(Arc<Router>, Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoOutcome + Send + 'static,
{
}

impl<F, Fut, R> Handler for F
where
    F: Fn(Arc<Router>, Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoOutcome + Send + 'static,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(FnHandler(self))
    }
}

impl<F, Fut, R> private::SealedError for F
where
    F: Fn(Arc<Router>, Failure, Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoOutcome + Send + 'static,
{
}

impl<F, Fut, R> ErrorHandler for F
where
    F: Fn(Arc<Router>, Failure, Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoOutcome + Send + 'static,
{
    fn into_boxed_error_handler(self) -> BoxedErrorHandler {
        Arc::new(FnErrorHandler(self))
    }
}

// ── Concrete wrappers ─────────────────────────────────────────────────────────

/// Newtype wrapper that holds a concrete handler `F` and implements
/// [`ErasedHandler`], bridging the typed world to the trait-object world.
struct FnHandler<F>(F);

impl<F, Fut, R> ErasedHandler for FnHandler<F>
where
    F: Fn(Arc<Router>, Request) -> Fut + Send + Sync,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoOutcome + Send + 'static,
{
    fn call(&self, router: Arc<Router>, req: Request) -> BoxFuture {
        // Call the wrapped function — this returns the concrete `Fut`.
        // We then map it through `IntoOutcome` and box the whole thing so
        // the return type matches the trait signature.
        let fut = (self.0)(router, req);
        Box::pin(async move { fut.await.into_outcome() })
    }
}

/// Same bridge for the error-response handler's three-argument shape.
struct FnErrorHandler<F>(F);

impl<F, Fut, R> ErasedErrorHandler for FnErrorHandler<F>
where
    F: Fn(Arc<Router>, Failure, Request) -> Fut + Send + Sync,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoOutcome + Send + 'static,
{
    fn call(&self, router: Arc<Router>, failure: Failure, req: Request) -> BoxFuture {
        let fut = (self.0)(router, failure, req);
        Box::pin(async move { fut.await.into_outcome() })
    }
}

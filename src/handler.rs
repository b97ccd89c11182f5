//! Handler traits and type erasure.
//!
//! # How handlers are stored
//!
//! The router holds handlers of *different* concrete types in a single
//! tree per method. Rust collections hold one type, so handlers are erased
//! behind a trait object (`dyn ErasedHandler<S>`) and stored uniformly as
//! `Arc`s. The only per-request cost is one `Arc` clone and one virtual
//! call.
//!
//! # The two handler shapes
//!
//! Routes without a request type take context and state:
//!
//! ```text
//! async fn hello(cx: RequestContext, state: Arc<S>) -> Result<Reply, Error>
//! ```
//!
//! Routes with a declared request type additionally take the bound value:
//!
//! ```text
//! async fn greet(cx: RequestContext, state: Arc<S>, req: T) -> Result<Reply, Error>
//! ```
//!
//! where `T: Bind`. For the second shape the erasure wrapper decodes and
//! validates the body *before* invoking the function — a request that fails
//! a rule never reaches the handler body. Which shape a function has is
//! picked up from its signature at registration; the marker parameter on
//! [`Handler`] exists only to keep the two blanket impls apart.

use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;
use std::sync::Arc;

use crate::bind::{self, Bind};
use crate::context::RequestContext;
use crate::envelope::Envelope;
use crate::error::Error;
use crate::reply::Reply;

// ── Internal types ────────────────────────────────────────────────────────────

/// A heap-allocated, type-erased future resolving to the uniform handler
/// result. `Pin<Box<…>>` because the runtime polls it in place; `Send` so
/// tokio may move it across threads.
pub(crate) type BoxFuture = Pin<Box<dyn Future<Output = Result<Reply, Error>> + Send + 'static>>;

/// Internal dispatch interface.
///
/// `#[doc(hidden)] pub` rather than `pub(crate)` because it appears in the
/// return type of the public `Handler` trait's `into_boxed_handler` method.
#[doc(hidden)]
pub trait ErasedHandler<S> {
    fn call(&self, cx: RequestContext, state: Arc<S>, envelope: Envelope) -> BoxFuture;
}

/// A type-erased handler shared across concurrent requests.
#[doc(hidden)]
pub type BoxedHandler<S> = Arc<dyn ErasedHandler<S> + Send + Sync + 'static>;

// ── Public Handler trait ──────────────────────────────────────────────────────

/// Implemented for every valid route handler.
///
/// You never implement this yourself; it is automatically satisfied for
/// `async fn`s of either shape described in the [module docs](self). The
/// trait is **sealed** (via the private `Sealed` supertrait): only the
/// blanket impls below can satisfy it.
pub trait Handler<S, X>: private::Sealed<S, X> + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler<S>;
}

/// The sealing module. `Sealed` is unnameable outside the crate, so external
/// crates cannot add handler shapes of their own.
mod private {
    pub trait Sealed<S, X> {}
}

/// Marker for the shape without a request type.
#[doc(hidden)]
pub struct Plain(());

/// Marker for the shape with a declared request type `T`.
#[doc(hidden)]
pub struct Typed<T>(PhantomData<T>);

// ── Blanket implementations ───────────────────────────────────────────────────

impl<S, F, Fut> private::Sealed<S, Plain> for F
where
    F: Fn(RequestContext, Arc<S>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Reply, Error>> + Send + 'static,
{
}

impl<S, F, Fut> Handler<S, Plain> for F
where
    S: Send + Sync + 'static,
    F: Fn(RequestContext, Arc<S>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Reply, Error>> + Send + 'static,
{
    fn into_boxed_handler(self) -> BoxedHandler<S> {
        Arc::new(PlainFn(self))
    }
}

impl<S, F, Fut, T> private::Sealed<S, Typed<T>> for F
where
    T: Bind,
    F: Fn(RequestContext, Arc<S>, T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Reply, Error>> + Send + 'static,
{
}

impl<S, F, Fut, T> Handler<S, Typed<T>> for F
where
    S: Send + Sync + 'static,
    T: Bind,
    F: Fn(RequestContext, Arc<S>, T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Reply, Error>> + Send + 'static,
{
    fn into_boxed_handler(self) -> BoxedHandler<S> {
        Arc::new(TypedFn { f: self, _marker: PhantomData })
    }
}

// ── Concrete wrappers ─────────────────────────────────────────────────────────

/// Erasure wrapper for the shape without a request type. The envelope body
/// is ignored — the route declared no interest in it.
struct PlainFn<F>(F);

impl<S, F, Fut> ErasedHandler<S> for PlainFn<F>
where
    F: Fn(RequestContext, Arc<S>) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Reply, Error>> + Send + 'static,
{
    fn call(&self, cx: RequestContext, state: Arc<S>, _envelope: Envelope) -> BoxFuture {
        Box::pin((self.0)(cx, state))
    }
}

/// Erasure wrapper for the typed shape: binds, then calls.
struct TypedFn<F, T> {
    f: F,
    _marker: PhantomData<fn(T)>,
}

impl<S, F, Fut, T> ErasedHandler<S> for TypedFn<F, T>
where
    T: Bind,
    F: Fn(RequestContext, Arc<S>, T) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Reply, Error>> + Send + 'static,
{
    fn call(&self, cx: RequestContext, state: Arc<S>, envelope: Envelope) -> BoxFuture {
        // Bind before the body runs: a request that fails decoding or a
        // declared rule never reaches the handler.
        match bind::bind::<T>(envelope.body()) {
            Ok(value) => Box::pin((self.f)(cx, state, value)) as BoxFuture,
            Err(err) => Box::pin(std::future::ready(Err(err))),
        }
    }
}

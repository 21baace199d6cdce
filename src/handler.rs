//! Handler conventions, role tagging, and the continuation.
//!
//! # Two calling conventions, one stack
//!
//! Every handler in a dispatch is one of two shapes, declared once at
//! construction and never sniffed at runtime:
//!
//! ```text
//! Callable::sync(|req, res, next| { …; next.advance() })     ← explicit-continuation
//! Callable::future(|req, res, _next| async move { …; Ok(()) })  ← implicit-advance
//! ```
//!
//! A synchronous handler advances the pipeline only by invoking its
//! [`Next`] continuation; the engine suspends until it fires. An
//! asynchronous handler advances when its future settles — it still
//! *receives* a `Next`, but firing it is a contract violation the engine
//! turns into a fatal error.
//!
//! # Role tagging
//!
//! The stack classifies handlers by a tag string carried in an explicit
//! side record — [`Handler`] is `{name, func}`, never a mutated function
//! identity. `middleware`, `route:<action>`, `resource:<action>` and
//! `fallback` are the recognized tags; anything else is dropped on
//! [`add`](crate::DispatchStack::add).

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::oneshot;

use crate::error::Rejection;
use crate::request::Request;
use crate::response::Response;

/// A heap-allocated, type-erased future returned by implicit-advance
/// handlers. `Send + 'static` let the hosting runtime move an in-flight
/// dispatch across its worker threads.
pub type HandlerFuture = Pin<Box<dyn Future<Output = Result<(), Rejection>> + Send + 'static>>;

type SyncFn = dyn Fn(Request, Response, Next) + Send + Sync;
type AsyncFn = dyn Fn(Request, Response, Next) -> HandlerFuture + Send + Sync;

/// A handler callable with its calling convention fixed at construction.
#[derive(Clone)]
pub enum Callable {
    /// Explicit-continuation: the engine suspends until [`Next::advance`]
    /// fires.
    Sync(Arc<SyncFn>),
    /// Implicit-advance: the engine awaits the returned future.
    Async(Arc<AsyncFn>),
}

impl Callable {
    /// Wraps an explicit-continuation handler.
    pub fn sync<F>(func: F) -> Self
    where
        F: Fn(Request, Response, Next) + Send + Sync + 'static,
    {
        Self::Sync(Arc::new(func))
    }

    /// Wraps an implicit-advance handler. Accepts any `async` closure or
    /// function of the `(req, res, next)` shape.
    pub fn future<F, Fut>(func: F) -> Self
    where
        F: Fn(Request, Response, Next) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), Rejection>> + Send + 'static,
    {
        let wrapped = move |req: Request, res: Response, next: Next| -> HandlerFuture {
            Box::pin(func(req, res, next))
        };
        Self::Async(Arc::new(wrapped))
    }

    fn convention(&self) -> &'static str {
        match self {
            Self::Sync(_) => "sync",
            Self::Async(_) => "async",
        }
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.convention())
    }
}

/// A callable tagged with its dispatch role — the side record the stack
/// classifies on.
#[derive(Clone)]
pub struct Handler {
    name: String,
    func: Callable,
}

impl Handler {
    /// Tags `func` for dispatch classification.
    pub fn new(name: impl Into<String>, func: Callable) -> Self {
        Self { name: name.into(), func }
    }

    /// The tag, e.g. `route:index`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The tagged callable.
    pub fn func(&self) -> &Callable {
        &self.func
    }

    /// The dispatch role the tag names, if it names one.
    pub fn role(&self) -> Option<Role> {
        Role::parse(&self.name)
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler")
            .field("name", &self.name)
            .field("convention", &self.func.convention())
            .finish()
    }
}

/// Dispatch phase a handler belongs to, parsed from its tag.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Role {
    Middleware,
    Route(String),
    Resource(String),
    Fallback,
}

impl Role {
    /// Parses a handler tag. `route:` and `resource:` prefixes carry the
    /// action name; anything unrecognized is `None`.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "middleware" => Some(Self::Middleware),
            "fallback" => Some(Self::Fallback),
            _ => name
                .strip_prefix("route:")
                .map(|action| Self::Route(action.to_owned()))
                .or_else(|| {
                    name.strip_prefix("resource:")
                        .map(|action| Self::Resource(action.to_owned()))
                }),
        }
    }
}

/// The explicit signal a synchronous handler invokes to advance the
/// pipeline.
///
/// Consumed on use — a handler advances at most once. Dropping it without
/// firing leaves the dispatch parked at the current step: that is the
/// caller contract, not an engine-detected condition.
pub struct Next {
    tx: oneshot::Sender<()>,
}

impl Next {
    pub(crate) fn channel() -> (Self, oneshot::Receiver<()>) {
        let (tx, rx) = oneshot::channel();
        (Self { tx }, rx)
    }

    /// Advances the dispatch to the next handler in the sequence.
    pub fn advance(self) {
        let _ = self.tx.send(());
    }
}

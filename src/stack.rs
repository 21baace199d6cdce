//! The dispatch stack: ordered execution over four handler partitions.
//!
//! # Execution model
//!
//! `exec` concatenates middleware ++ routes ++ resources ++ fallback and
//! runs the sequence strictly one handler at a time — each fully settles
//! before the next begins. One logical thread of control per dispatch; the
//! only suspension points are awaiting an asynchronous handler's future
//! and waiting on a synchronous handler's continuation. There is no
//! timeout on the latter and no cancellation once `exec` starts.
//!
//! # Failure policy
//!
//! Deliberately asymmetric, and decided by how an asynchronous handler
//! rejects — see [`Rejection`]. An Error-kind rejection aborts the
//! dispatch; a plain reason goes to the informational [`Logger`] and the
//! dispatch continues; a reasonless rejection continues silently. A
//! continuation fired from an asynchronous handler aborts with
//! [`Error::NextUnsupported`] no matter what the handler returns.
//!
//! The engine never looks at the response to decide whether to continue:
//! a handler that finalizes the response and still signals continue does
//! not stop later handlers from overwriting it.

use std::sync::Arc;

use crate::error::{Error, Rejection};
use crate::handler::{Callable, Handler, Next, Role};
use crate::matching::{run_sequence, step, SeqFn};
use crate::request::Request;
use crate::response::Response;

/// Informational sink for soft handler rejections.
///
/// Injected so hosting glue and tests can capture what would otherwise go
/// to the process-wide subscriber; the default forwards to
/// `tracing::info!`.
pub trait Logger: Send + Sync {
    fn info(&self, message: &str);
}

struct TracingLogger;

impl Logger for TracingLogger {
    fn info(&self, message: &str) {
        tracing::info!("{}", message);
    }
}

/// The per-request handler stack.
///
/// Built fresh for every inbound request and discarded once
/// [`exec`](Self::exec) settles; the engine retains no cross-request
/// state. Holds four ordered partitions — middleware, routes, resources,
/// and at most one fallback, where the last registration wins.
pub struct DispatchStack {
    middleware: Vec<Handler>,
    routes: Vec<Handler>,
    resources: Vec<Handler>,
    fallback: Option<Handler>,
    logger: Arc<dyn Logger>,
}

impl DispatchStack {
    /// An empty stack logging soft rejections through `tracing`.
    pub fn new() -> Self {
        Self::with_logger(Arc::new(TracingLogger))
    }

    /// An empty stack with an injected informational logger.
    pub fn with_logger(logger: Arc<dyn Logger>) -> Self {
        Self {
            middleware: Vec::new(),
            routes: Vec::new(),
            resources: Vec::new(),
            fallback: None,
            logger,
        }
    }

    /// Files `handler` under the partition its tag names. An unrecognized
    /// tag is a silent no-op — `add` never fails.
    pub fn add(&mut self, handler: Handler) {
        match handler.role() {
            Some(Role::Middleware) => self.middleware.push(handler),
            Some(Role::Route(_)) => self.routes.push(handler),
            Some(Role::Resource(_)) => self.resources.push(handler),
            Some(Role::Fallback) => self.fallback = Some(handler),
            None => {}
        }
    }

    /// Registered middleware, in registration order.
    pub fn middleware(&self) -> &[Handler] {
        &self.middleware
    }

    /// Registered route handlers, in registration order.
    pub fn routes(&self) -> &[Handler] {
        &self.routes
    }

    /// Registered resource handlers, in registration order.
    pub fn resources(&self) -> &[Handler] {
        &self.resources
    }

    /// The stored fallback, if any.
    pub fn fallback(&self) -> Option<&Handler> {
        self.fallback.as_ref()
    }

    /// Runs middleware ++ routes ++ resources ++ fallback against one
    /// request/response pair, strictly in sequence.
    pub async fn exec(&self, req: &Request, res: &Response) -> Result<(), Error> {
        let steps: Vec<SeqFn<()>> = self
            .middleware
            .iter()
            .chain(&self.routes)
            .chain(&self.resources)
            .chain(&self.fallback)
            .map(|handler| {
                let func = handler.func().clone();
                let logger = Arc::clone(&self.logger);
                let req = req.clone();
                let res = res.clone();
                step(move |_| run_handler(func, logger, req, res))
            })
            .collect();

        run_sequence(steps).await.map(|_| ())
    }
}

impl Default for DispatchStack {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs one handler to settlement under its declared convention.
async fn run_handler(
    func: Callable,
    logger: Arc<dyn Logger>,
    req: Request,
    res: Response,
) -> Result<(), Error> {
    match func {
        Callable::Sync(func) => {
            let (next, rx) = Next::channel();
            func(req, res, next);

            if rx.await.is_err() {
                // Continuation dropped without firing: the dispatch stalls
                // at this step. Caller contract, never auto-advanced.
                std::future::pending::<()>().await;
            }
            Ok(())
        }
        Callable::Async(func) => {
            let (next, mut rx) = Next::channel();
            let mut fut = func(req, res, next);
            let mut continuation_open = true;

            let outcome = loop {
                tokio::select! {
                    biased;

                    fired = &mut rx, if continuation_open => match fired {
                        // An implicit-advance handler has no continuation to
                        // fire; doing so fails the whole dispatch.
                        Ok(()) => return Err(Error::NextUnsupported),
                        Err(_) => continuation_open = false,
                    },
                    outcome = &mut fut => break outcome,
                }
            };

            // The future can settle in the same poll that fired the
            // continuation; the violation still wins.
            if continuation_open && rx.try_recv().is_ok() {
                return Err(Error::NextUnsupported);
            }

            match outcome {
                Ok(()) => Ok(()),
                Err(Rejection::Error(err)) => Err(Error::Handler(err)),
                Err(Rejection::Reason(reason)) => {
                    logger.info(&reason);
                    Ok(())
                }
                Err(Rejection::Silent) => Ok(()),
            }
        }
    }
}

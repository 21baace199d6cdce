//! Per-request registration surface.
//!
//! One router per inbound request. Registrations are conditional on that
//! request: a verb method only lands its handler on the stack when the
//! request method matches and the URI is aligned with the registered path.
//! By the time [`dispatch`](Router::dispatch) runs, the stack holds exactly
//! the handlers this request addresses — nothing is matched again later.

use std::sync::Arc;

use http::Method;

use crate::error::Error;
use crate::handler::{Callable, Handler};
use crate::matching::{is_valid_path, is_valid_route};
use crate::request::Request;
use crate::response::Response;
use crate::route::{self, Route};
use crate::stack::{DispatchStack, Logger};

/// Assembles and runs the dispatch stack for one inbound request.
pub struct Router {
    req: Request,
    stack: DispatchStack,
    prefix: String,
}

impl Router {
    /// A router over `req` with an empty stack and no prefix.
    pub fn new(req: Request) -> Self {
        Self {
            req,
            stack: DispatchStack::new(),
            prefix: String::new(),
        }
    }

    /// Same, with an injected informational logger.
    pub fn with_logger(req: Request, logger: Arc<dyn Logger>) -> Self {
        Self {
            req,
            stack: DispatchStack::with_logger(logger),
            prefix: String::new(),
        }
    }

    /// Sets the mount prefix applied ahead of every registered path.
    pub fn set_prefix(&mut self, prefix: impl Into<String>) {
        self.prefix = prefix.into();
    }

    /// The mount prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub(crate) fn req(&self) -> &Request {
        &self.req
    }

    /// Unconditional middleware, ahead of every route handler.
    pub fn middleware(&mut self, func: Callable) {
        self.stack.add(Handler::new("middleware", func));
    }

    /// Middleware scoped to paths at or under `prefix + path`.
    pub fn mount(&mut self, path: &str, func: Callable) {
        let base = format!("{}{}", self.prefix, path);

        if is_valid_path(path) && is_valid_route(self.req.uri(), &base) {
            self.stack.add(Handler::new("middleware", func));
        }
    }

    /// Registers a GET handler at `path`.
    pub fn get(&mut self, path: &str, func: Callable) {
        self.register(Method::GET, path, Handler::new("route:get", func));
    }

    /// Registers a PUT handler at `path`.
    pub fn put(&mut self, path: &str, func: Callable) {
        self.register(Method::PUT, path, Handler::new("route:put", func));
    }

    /// Registers a PATCH handler at `path`.
    pub fn patch(&mut self, path: &str, func: Callable) {
        self.register(Method::PATCH, path, Handler::new("route:patch", func));
    }

    /// Registers a POST handler at `path`.
    pub fn post(&mut self, path: &str, func: Callable) {
        self.register(Method::POST, path, Handler::new("route:post", func));
    }

    /// Registers a DELETE handler at `path`.
    pub fn delete(&mut self, path: &str, func: Callable) {
        self.register(Method::DELETE, path, Handler::new("route:delete", func));
    }

    /// Answers everything nothing else did; the last registration wins.
    pub fn fallback(&mut self, func: Callable) {
        self.stack.add(Handler::new("fallback", func));
    }

    /// Applies one declarative route definition against this request.
    pub fn bind(&mut self, route: &Route) {
        route::bind(self, route);
    }

    /// Lands `handler` on the stack when this request matches `verb` and is
    /// aligned with `prefix + path`.
    pub(crate) fn register(&mut self, verb: Method, path: &str, handler: Handler) {
        let base = format!("{}{}", self.prefix, path);
        let method = Method::from_bytes(self.req.method().as_bytes()).ok();

        if method == Some(verb) && is_valid_path(path) && is_valid_route(self.req.uri(), &base) {
            self.stack.add(handler);
        }
    }

    /// The assembled stack.
    pub fn stack(&self) -> &DispatchStack {
        &self.stack
    }

    /// Runs the assembled stack against `res`. The hosting glue reads
    /// `res.data()` afterwards for the platform reply.
    pub async fn dispatch(&self, res: &Response) -> Result<(), Error> {
        self.stack.exec(&self.req, res).await
    }
}

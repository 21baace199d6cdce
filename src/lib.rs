//! # verge
//!
//! A per-request dispatch engine for serverless edge functions.
//! Nothing more. Nothing less.
//!
//! ## The contract
//!
//! The platform owns the sockets. It terminates TLS, parses HTTP, and hands
//! your function one event record per invocation. verge does not open a
//! port, pool a connection, or bake a cookie — it takes that record and
//! runs an ordered handler pipeline over it. Every feature verge skips is
//! one the edge platform already ships.
//!
//! What's left for verge — the only part that changes between applications:
//!
//! - **Matching** — exact and whole-segment prefix paths, with
//!   trailing-identifier extraction for resource routes
//! - **Dispatch** — middleware, then routes, then resources, then one
//!   fallback, strictly one handler at a time
//! - **Two handler shapes** — explicit-continuation sync handlers and
//!   awaited async handlers, mixed freely in one sequence
//!
//! ## Quick start
//!
//! ```rust
//! use verge::{Callable, Request, RequestRecord, Response, ResponseRecord, Router};
//!
//! async fn handle(record: RequestRecord) -> ResponseRecord {
//!     let req = Request::new(record);
//!     let res = Response::new();
//!
//!     let mut router = Router::new(req);
//!     router.set_prefix("/api");
//!
//!     router.middleware(Callable::future(|req, res, _next| async move {
//!         req.set_plugin("client", req.client_ip());
//!         res.set_header("X-Powered-By", "verge");
//!         Ok(())
//!     }));
//!
//!     router.get("/status", Callable::future(|_req, res, _next| async move {
//!         res.status(200).text("ok");
//!         Ok(())
//!     }));
//!
//!     router.fallback(Callable::sync(|_req, res, next| {
//!         res.status(404).send(());
//!         next.advance();
//!     }));
//!
//!     if let Err(err) = router.dispatch(&res).await {
//!         res.status(500).text(err.to_string());
//!     }
//!
//!     res.data()
//! }
//! ```
//!
//! ## The two handler shapes
//!
//! A **sync** handler advances the pipeline only by firing its
//! continuation — the engine waits as long as it takes:
//!
//! ```rust
//! # use verge::Callable;
//! Callable::sync(|req, _res, next| {
//!     req.set_plugin("seen", true);
//!     next.advance();
//! });
//! ```
//!
//! An **async** handler advances when its future settles. It still receives
//! the continuation, but firing it is a contract violation that fails the
//! whole dispatch. How it rejects decides what happens next: an error
//! aborts, a plain reason is logged and swallowed, silence is swallowed
//! unlogged:
//!
//! ```rust
//! # use verge::{Callable, Rejection};
//! Callable::future(|req, _res, _next| async move {
//!     let quota = req.plugin("quota")?;          // missing plugin: aborts
//!     if quota.as_u64() == Some(0) {
//!         return Err(Rejection::from("quota exhausted")); // logged, continues
//!     }
//!     Ok(())
//! });
//! ```

mod error;
mod event;
mod handler;
pub mod matching;
mod request;
mod response;
mod route;
mod router;
mod stack;

pub use error::{BoxError, Error, Rejection};
pub use event::{BodyEncoding, HeaderEntry, Headers, RequestBody, RequestRecord, ResponseRecord};
pub use handler::{Callable, Handler, HandlerFuture, Next, Role};
pub use request::Request;
pub use response::{Body, Response};
pub use route::{Action, ActionHandler, ResourceCallable, ResourceMode, Route};
pub use router::Router;
pub use stack::{DispatchStack, Logger};

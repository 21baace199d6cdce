//! Declarative route definitions and their binding onto the dispatch stack.
//!
//! A [`Route`] is what an application declares once: a path, optional
//! route-bound middleware, a resource mode, and action handlers. Binding
//! happens per request — the binder compares the declaration against the
//! inbound URI and enqueues zero or more tagged handlers on the stack.
//!
//! # Actions and verbs
//!
//! Outside a resource set, action names resolve through the alias table —
//! `index` answers GET, `create` PUT, `update` PATCH, `delete` DELETE,
//! `submit` POST — and verb-named actions pass through verbatim. Inside a
//! resource set only the verb-named actions resolve; the handler receives
//! the trailing path segment as its identifier:
//!
//! ```text
//! declared            GET /api/user            GET /api/user/abc123
//! ─────────────────────────────────────────────────────────────────
//! index (plain)       runs                     —
//! get   (resource)    404 responder            runs with id "abc123"
//! ```

use std::future::Future;
use std::sync::Arc;

use http::Method;

use crate::error::Rejection;
use crate::handler::{Callable, Handler, HandlerFuture, Next};
use crate::matching::{is_valid_route, resource_id};
use crate::request::Request;
use crate::response::Response;
use crate::router::Router;

/// Action keys a route definition may declare.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Action {
    Index,
    Create,
    Update,
    Delete,
    Submit,
    Get,
    Put,
    Patch,
    Post,
}

impl Action {
    /// The tag fragment used in handler role names.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Index => "index",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Submit => "submit",
            Self::Get => "get",
            Self::Put => "put",
            Self::Patch => "patch",
            Self::Post => "post",
        }
    }

    /// Dispatch verb outside a resource set: the alias table, with
    /// verb-named keys passing through.
    fn aliased(self) -> Method {
        match self {
            Self::Index | Self::Get => Method::GET,
            Self::Create | Self::Put => Method::PUT,
            Self::Update | Self::Patch => Method::PATCH,
            Self::Delete => Method::DELETE,
            Self::Submit | Self::Post => Method::POST,
        }
    }

    /// Dispatch verb inside a resource set: the key, verbatim. Alias keys
    /// resolve to no verb there.
    fn verbatim(self) -> Option<Method> {
        match self {
            Self::Get => Some(Method::GET),
            Self::Put => Some(Method::PUT),
            Self::Patch => Some(Method::PATCH),
            Self::Delete => Some(Method::DELETE),
            Self::Post => Some(Method::POST),
            Self::Index | Self::Create | Self::Update | Self::Submit => None,
        }
    }
}

/// Which declared actions receive the extracted identifier.
#[derive(Clone, Debug, Default)]
pub enum ResourceMode {
    /// Plain route: the request path must equal the route path exactly.
    #[default]
    Off,
    /// Every declared action is a resource action.
    All,
    /// Only the listed actions are resource actions.
    Only(Vec<Action>),
}

impl ResourceMode {
    fn enabled(&self) -> bool {
        !matches!(self, Self::Off)
    }

    fn includes(&self, action: Action) -> bool {
        match self {
            Self::Off => false,
            Self::All => true,
            Self::Only(actions) => actions.contains(&action),
        }
    }
}

type SyncIdFn = dyn Fn(Request, Response, String, Next) + Send + Sync;
type AsyncIdFn = dyn Fn(Request, Response, String, Next) -> HandlerFuture + Send + Sync;

/// A resource action callable: the declared `(req, res, id)` shape, with
/// the continuation carried the same way ordinary handlers carry it.
#[derive(Clone)]
pub enum ResourceCallable {
    Sync(Arc<SyncIdFn>),
    Async(Arc<AsyncIdFn>),
}

impl ResourceCallable {
    /// Wraps an explicit-continuation resource handler.
    pub fn sync<F>(func: F) -> Self
    where
        F: Fn(Request, Response, String, Next) + Send + Sync + 'static,
    {
        Self::Sync(Arc::new(func))
    }

    /// Wraps an implicit-advance resource handler.
    pub fn future<F, Fut>(func: F) -> Self
    where
        F: Fn(Request, Response, String, Next) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), Rejection>> + Send + 'static,
    {
        let wrapped =
            move |req: Request, res: Response, id: String, next: Next| -> HandlerFuture {
                Box::pin(func(req, res, id, next))
            };
        Self::Async(Arc::new(wrapped))
    }

    /// Currying the identifier yields an ordinary callable; the wrapper
    /// keeps the target's calling convention.
    fn bind_id(&self, id: &str) -> Callable {
        match self {
            Self::Sync(func) => {
                let func = Arc::clone(func);
                let id = id.to_owned();
                Callable::Sync(Arc::new(move |req, res, next| {
                    func(req, res, id.clone(), next)
                }))
            }
            Self::Async(func) => {
                let func = Arc::clone(func);
                let id = id.to_owned();
                Callable::Async(Arc::new(move |req, res, next| {
                    func(req, res, id.clone(), next)
                }))
            }
        }
    }
}

/// An action handler as the route declares it.
#[derive(Clone)]
pub enum ActionHandler {
    /// The ordinary `(req, res)` shape.
    Plain(Callable),
    /// The `(req, res, id)` shape; resource binding supplies the id.
    WithId(ResourceCallable),
}

/// One declarative route.
///
/// ```rust
/// use verge::{Action, Callable, ResourceCallable, ResourceMode, Route};
///
/// let route = Route::new("/user")
///     .middleware(Callable::future(|_req, _res, _next| async move { Ok(()) }))
///     .resource(ResourceMode::All)
///     .resource_action(
///         Action::Get,
///         ResourceCallable::future(|_req, res, id, _next| async move {
///             res.status(200).text(id);
///             Ok(())
///         }),
///     );
/// ```
pub struct Route {
    path: String,
    middleware: Vec<Callable>,
    resource: ResourceMode,
    actions: Vec<(Action, ActionHandler)>,
}

impl Route {
    /// A route at `path` (relative to the router prefix), initially with no
    /// middleware, no resource set, and no actions.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            middleware: Vec::new(),
            resource: ResourceMode::Off,
            actions: Vec::new(),
        }
    }

    /// Appends route-bound middleware, run ahead of this route's actions in
    /// declaration order.
    pub fn middleware(mut self, func: Callable) -> Self {
        self.middleware.push(func);
        self
    }

    /// Sets the resource mode.
    pub fn resource(mut self, mode: ResourceMode) -> Self {
        self.resource = mode;
        self
    }

    /// Declares an action with the ordinary `(req, res)` shape.
    pub fn action(mut self, action: Action, func: Callable) -> Self {
        self.actions.push((action, ActionHandler::Plain(func)));
        self
    }

    /// Declares an action with the `(req, res, id)` resource shape.
    pub fn resource_action(mut self, action: Action, func: ResourceCallable) -> Self {
        self.actions.push((action, ActionHandler::WithId(func)));
        self
    }

    /// The declared path.
    pub fn path(&self) -> &str {
        &self.path
    }
}

/// Binds one route definition against the router's request, enqueuing the
/// handlers the request addresses.
pub(crate) fn bind(router: &mut Router, route: &Route) {
    let uri_base = format!("{}{}", router.prefix(), route.path());
    let req_uri = router.req().uri().to_owned();

    let resource = route.resource.enabled();
    let id = resource_id(&req_uri, &uri_base).map(str::to_owned);

    // A plain route answers its exact path only. A resource route answers
    // anything segment-aligned under its base — including the bare base,
    // which must still reach the substituted 404 responder below.
    let addressed = if resource {
        is_valid_route(&req_uri, &uri_base)
    } else {
        req_uri == uri_base
    };
    if !addressed {
        return;
    }

    for func in &route.middleware {
        router.mount(route.path(), func.clone());
    }

    for (action, handler) in &route.actions {
        let participates = route.resource.includes(*action);

        let verb = if participates {
            action.verbatim()
        } else {
            Some(action.aliased())
        };
        let Some(verb) = verb else { continue };

        let (tag, func) = if participates {
            let func = match (&id, handler) {
                // No identifier in the path: the user handler never runs.
                (None, _) => missing_resource_responder(),
                (Some(id), ActionHandler::WithId(func)) => func.bind_id(id),
                (Some(_), ActionHandler::Plain(func)) => func.clone(),
            };
            (format!("resource:{}", action.as_str()), func)
        } else {
            let func = match handler {
                ActionHandler::Plain(func) => func.clone(),
                // Declared with an id this mode never supplies.
                ActionHandler::WithId(_) => continue,
            };
            (format!("route:{}", action.as_str()), func)
        };

        router.register(verb, route.path(), Handler::new(tag, func));
    }
}

/// The fixed responder substituted when a resource route is addressed
/// without an identifier.
fn missing_resource_responder() -> Callable {
    Callable::future(|_req, res, _next| async move {
        res.set_header("Cache-Control", "max-age=0");
        res.status(404).send(());
        Ok(())
    })
}

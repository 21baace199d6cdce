//! Binder semantics: method aliasing, address checks, resource identifier
//! injection, and the substituted 404 responder.

mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use common::request;
use verge::{
    Action, Callable, Request, ResourceCallable, ResourceMode, Response, Route, Router,
};

fn respond(label: &'static str) -> Callable {
    Callable::future(move |_req, res, _next| async move {
        res.status(200).text(label);
        Ok(())
    })
}

fn aliased_route() -> Route {
    Route::new("/user")
        .action(Action::Index, respond("index"))
        .action(Action::Create, respond("create"))
        .action(Action::Update, respond("update"))
        .action(Action::Delete, respond("delete"))
        .action(Action::Submit, respond("submit"))
}

async fn dispatch(router: &Router) -> Response {
    let res = Response::new();
    router.dispatch(&res).await.unwrap();
    res
}

#[tokio::test]
async fn alias_table_binds_one_action_per_verb() {
    let table = [
        ("GET", "index"),
        ("PUT", "create"),
        ("PATCH", "update"),
        ("DELETE", "delete"),
        ("POST", "submit"),
    ];

    for (method, expected) in table {
        let mut router = Router::new(request(method, "/api/user"));
        router.set_prefix("/api");
        router.bind(&aliased_route());

        assert_eq!(router.stack().routes().len(), 1, "{method} binds one handler");
        assert_eq!(
            router.stack().routes()[0].name(),
            format!("route:{expected}")
        );

        let res = dispatch(&router).await;
        assert_eq!(res.data().body.as_deref(), Some(expected));
    }
}

#[tokio::test]
async fn plain_routes_require_exact_path_equality() {
    for uri in ["/api/user/abc123", "/api/users", "/api", "/other"] {
        let mut router = Router::new(request("GET", uri));
        router.set_prefix("/api");
        router.bind(&aliased_route());

        assert!(router.stack().routes().is_empty(), "{uri} must not bind");
        assert!(router.stack().middleware().is_empty());
    }
}

#[tokio::test]
async fn resource_actions_receive_the_extracted_identifier() {
    let route = Route::new("/user").resource(ResourceMode::All).resource_action(
        Action::Get,
        ResourceCallable::future(|_req, res, id, _next| async move {
            res.set_header("X-Request-ID", &id);
            res.status(200).json(serde_json::json!({"get": true}));
            Ok(())
        }),
    );

    let mut router = Router::new(request("GET", "/api/user/abc123"));
    router.set_prefix("/api");
    router.bind(&route);

    assert_eq!(router.stack().resources().len(), 1);
    assert_eq!(router.stack().resources()[0].name(), "resource:get");

    let res = dispatch(&router).await;
    let data = res.data();
    assert_eq!(data.status, Some(200));
    assert_eq!(data.body.as_deref(), Some(r#"{"get":true}"#));
    assert_eq!(data.headers["x-request-id"][0].value, "abc123");
}

#[tokio::test]
async fn sync_resource_actions_carry_the_continuation() {
    let route = Route::new("/item").resource(ResourceMode::All).resource_action(
        Action::Delete,
        ResourceCallable::sync(|_req, res, id, next| {
            res.status(410).text(id);
            next.advance();
        }),
    );

    let mut router = Router::new(request("DELETE", "/api/item/42"));
    router.set_prefix("/api");
    router.bind(&route);

    let res = dispatch(&router).await;
    assert_eq!(res.data().status, Some(410));
    assert_eq!(res.data().body.as_deref(), Some("42"));
}

#[tokio::test]
async fn a_resource_route_without_an_identifier_substitutes_the_404_responder() {
    let invoked = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&invoked);

    let route = Route::new("/qux").resource(ResourceMode::All).resource_action(
        Action::Get,
        ResourceCallable::future(move |_req, res, _id, _next| {
            let flag = Arc::clone(&flag);
            async move {
                flag.store(true, Ordering::SeqCst);
                res.status(200).text("user handler");
                Ok(())
            }
        }),
    );

    let mut router = Router::new(request("GET", "/api/qux"));
    router.set_prefix("/api");
    router.bind(&route);

    assert_eq!(router.stack().resources().len(), 1);
    assert_eq!(router.stack().resources()[0].name(), "resource:get");

    let res = dispatch(&router).await;
    let data = res.data();

    assert!(!invoked.load(Ordering::SeqCst));
    assert_eq!(data.status, Some(404));
    assert_eq!(data.body, None);
    assert_eq!(data.headers["cache-control"][0].value, "max-age=0");
    assert_eq!(data.headers["cache-control"][0].key, "Cache-Control");
}

#[tokio::test]
async fn multi_segment_extensions_also_reach_the_404_responder() {
    let route = Route::new("/qux")
        .resource(ResourceMode::All)
        .resource_action(
            Action::Get,
            ResourceCallable::future(|_req, res, _id, _next| async move {
                res.status(200).text("user handler");
                Ok(())
            }),
        );

    let mut router = Router::new(request("GET", "/api/qux/a/b"));
    router.set_prefix("/api");
    router.bind(&route);

    let res = dispatch(&router).await;
    assert_eq!(res.data().status, Some(404));
}

#[tokio::test]
async fn alias_keys_resolve_to_no_verb_inside_a_resource_set() {
    let route = Route::new("/user")
        .resource(ResourceMode::All)
        .action(Action::Index, respond("index"))
        .resource_action(
            Action::Get,
            ResourceCallable::future(|_req, res, id, _next| async move {
                res.status(200).text(id);
                Ok(())
            }),
        );

    let mut router = Router::new(request("GET", "/api/user/abc123"));
    router.set_prefix("/api");
    router.bind(&route);

    // `index` participates in the set, so it has no verbatim verb and is
    // skipped; only the resource `get` lands.
    assert!(router.stack().routes().is_empty());
    assert_eq!(router.stack().resources().len(), 1);

    let res = dispatch(&router).await;
    assert_eq!(res.data().body.as_deref(), Some("abc123"));
}

#[tokio::test]
async fn actions_outside_a_partial_resource_set_still_alias() {
    let route = Route::new("/user")
        .resource(ResourceMode::Only(vec![Action::Get]))
        .action(Action::Index, respond("index"))
        .resource_action(
            Action::Get,
            ResourceCallable::future(|_req, res, id, _next| async move {
                res.status(200).text(format!("get:{id}"));
                Ok(())
            }),
        );

    let mut router = Router::new(request("GET", "/api/user/abc123"));
    router.set_prefix("/api");
    router.bind(&route);

    // Both land: `index` through the alias table under the route partition,
    // `get` under the resource partition. Resources run after routes, so
    // the resource answer is the one that sticks.
    assert_eq!(router.stack().routes().len(), 1);
    assert_eq!(router.stack().routes()[0].name(), "route:index");
    assert_eq!(router.stack().resources().len(), 1);

    let res = dispatch(&router).await;
    assert_eq!(res.data().body.as_deref(), Some("get:abc123"));
}

#[tokio::test]
async fn id_shaped_handlers_outside_the_resource_set_are_skipped() {
    let route = Route::new("/user").resource_action(
        Action::Get,
        ResourceCallable::future(|_req, res, id, _next| async move {
            res.status(200).text(id);
            Ok(())
        }),
    );

    let mut router = Router::new(request("GET", "/api/user"));
    router.set_prefix("/api");
    router.bind(&route);

    assert!(router.stack().routes().is_empty());
    assert!(router.stack().resources().is_empty());
}

#[tokio::test]
async fn route_middleware_runs_ahead_of_the_action() {
    let route = Route::new("/user")
        .middleware(Callable::future(|req, _res, _next| async move {
            req.set_plugin("order", "middleware");
            Ok(())
        }))
        .action(
            Action::Index,
            Callable::future(|req, res, _next| async move {
                let seen = req.plugin("order")?;
                res.status(200).text(format!("after {}", seen.as_str().unwrap_or("?")));
                Ok(())
            }),
        );

    let mut router = Router::new(request("GET", "/api/user"));
    router.set_prefix("/api");
    router.bind(&route);

    assert_eq!(router.stack().middleware().len(), 1);

    let res = dispatch(&router).await;
    assert_eq!(res.data().body.as_deref(), Some("after middleware"));
}

#[tokio::test]
async fn direct_registrations_and_mounts_are_verb_and_path_gated() {
    let mut router = Router::new(request("GET", "/api/status"));
    router.set_prefix("/api");

    router.mount("/status", Callable::future(|req, _res, _next| async move {
        req.set_plugin("mounted", true);
        Ok(())
    }));
    router.mount("/st", respond("misaligned"));
    router.mount("status", respond("relative"));
    router.get("/status", respond("status"));
    router.post("/status", respond("posted"));
    router.get("/other", respond("other"));

    assert_eq!(router.stack().middleware().len(), 1);
    assert_eq!(router.stack().routes().len(), 1);
    assert_eq!(router.stack().routes()[0].name(), "route:get");

    let res = dispatch(&router).await;
    assert_eq!(res.data().body.as_deref(), Some("status"));
}

#[tokio::test]
async fn the_fallback_answers_what_nothing_else_did() {
    let req = request("GET", "/api/nowhere");
    let mut router = Router::new(req);
    router.set_prefix("/api");
    router.bind(&aliased_route());
    router.fallback(Callable::sync(|_req, res, next| {
        res.status(404).send(());
        next.advance();
    }));

    let res = dispatch(&router).await;
    assert_eq!(res.data().status, Some(404));
}

#[tokio::test]
async fn an_unprefixed_router_binds_at_the_bare_path() {
    let mut router = Router::new(Request::new(common::record("GET", "/user")));
    router.bind(&aliased_route());

    let res = dispatch(&router).await;
    assert_eq!(res.data().body.as_deref(), Some("index"));
}

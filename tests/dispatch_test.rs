//! End-to-end dispatch behaviour, without a network.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use script_router::dispatch::{DispatchState, HandlerResult, Outcome, RequestContext};
use script_router::http::{Body, Status};
use script_router::routing::{Matcher, PathTemplate};
use script_router::{HandlerError, RouteSpec, WebApp, WebResponse};

mod common;

#[test]
fn test_first_registered_route_wins() {
    let app = WebApp::default();
    app.get("/a/{x}", common::text("R1")).unwrap();
    app.get("/a/b", common::text("R2")).unwrap();

    for _ in 0..10 {
        match app.dispatch("GET", "/a/b") {
            Outcome::Ready(r) => assert_eq!(r.body(), &Body::Text("R1".into())),
            other => panic!("unexpected: {:?}", other),
        }
    }
}

#[test]
fn test_variable_extraction_and_arity() {
    let app = WebApp::default();
    app.get("/users/{id}", |ctx: &mut RequestContext| {
        HandlerResult::Response(WebResponse::ok().json(ctx.path_params()))
    })
    .unwrap();

    match app.dispatch("GET", "/users/42") {
        Outcome::Ready(r) => assert_eq!(r.body(), &Body::Json(serde_json::json!({"id": "42"}))),
        other => panic!("unexpected: {:?}", other),
    }
    assert_eq!(app.dispatch("GET", "/users").state(), DispatchState::NotFound);
}

#[test]
fn test_method_defaulting() {
    let app = WebApp::default();
    app.route(RouteSpec::new("/default"), common::text("d")).unwrap();
    app.route(RouteSpec::new("/lower").method("post"), common::text("p")).unwrap();

    assert_eq!(app.dispatch("GET", "/default").state(), DispatchState::ResponseReady);
    assert_eq!(app.dispatch("POST", "/default").state(), DispatchState::NotFound);
    assert_eq!(app.dispatch("POST", "/lower").state(), DispatchState::ResponseReady);
    assert_eq!(app.dispatch("GET", "/lower").state(), DispatchState::NotFound);
}

#[test]
fn test_filter_short_circuit_skips_handler() {
    let app = WebApp::default();
    let calls = Arc::new(AtomicUsize::new(0));

    let counter = calls.clone();
    app.get("/guarded", move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        HandlerResult::Response(WebResponse::ok())
    })
    .unwrap();
    app.filter("/guarded", |_| HandlerResult::block()).unwrap();

    assert_eq!(app.dispatch("GET", "/guarded"), Outcome::ShortCircuited(None));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_filter_pass_through_keeps_response() {
    let app = WebApp::default();
    let expected = WebResponse::new(Status::CREATED).text("made").header("X-Id", "9");
    let response = expected.clone();
    app.post("/things", move |_| HandlerResult::Response(response.clone())).unwrap();
    app.filter("/*", |_| HandlerResult::proceed()).unwrap();

    assert_eq!(app.dispatch("POST", "/things"), Outcome::Ready(expected));
}

#[test]
fn test_empty_registry_is_not_found() {
    let app = WebApp::default();
    for (method, path) in [("GET", "/"), ("POST", "/x/y"), ("DELETE", ""), ("PATCH", "/a//b")] {
        let outcome = app.dispatch(method, path);
        assert_eq!(outcome.state(), DispatchState::NotFound);
        assert_eq!(outcome.status(), Some(Status::NOT_FOUND));
    }
}

#[test]
fn test_errors_always_end_in_error_status() {
    let app = WebApp::default();
    app.get("/error", |_| HandlerResult::error("bad input")).unwrap();
    app.get("/panic", |_| panic!("handler bug")).unwrap();
    app.get("/value", |_| HandlerResult::Value(serde_json::json!({"not": "a response"}))).unwrap();

    for path in ["/error", "/panic", "/value"] {
        let outcome = app.dispatch("GET", path);
        assert_eq!(outcome.state(), DispatchState::ErrorDelegated, "{}", path);
        assert!(outcome.status().unwrap().is_error(), "{}", path);
    }
}

#[test]
fn test_custom_error_handler_sees_error() {
    let app = WebApp::default().error_handler(|ctx: &mut RequestContext, error: &HandlerError| {
        let body = serde_json::json!({"path": ctx.path(), "error": error.to_string()});
        HandlerResult::Response(WebResponse::new(Status::BAD_REQUEST).json(&body))
    });
    app.get("/fail", |_| HandlerResult::error("missing field")).unwrap();

    match app.dispatch("GET", "/fail") {
        Outcome::ErrorDelegated(r) => {
            assert_eq!(r.status(), Status::BAD_REQUEST);
            assert_eq!(
                r.body(),
                &Body::Json(serde_json::json!({"path": "/fail", "error": "missing field"}))
            );
        }
        other => panic!("unexpected: {:?}", other),
    }
}

#[test]
fn test_not_found_handler() {
    let app = WebApp::default().not_found_handler(|ctx: &mut RequestContext| {
        HandlerResult::Response(WebResponse::new(Status::NOT_FOUND).text(format!("no {}", ctx.path())))
    });

    match app.dispatch("GET", "/ghost") {
        Outcome::NotFound(r) => assert_eq!(r.body(), &Body::Text("no /ghost".into())),
        other => panic!("unexpected: {:?}", other),
    }

    let failing = WebApp::default().not_found_handler(|_: &mut RequestContext| HandlerResult::error("lost"));
    let outcome = failing.dispatch("GET", "/ghost");
    assert_eq!(outcome.state(), DispatchState::NotFound);
    assert_eq!(outcome.status(), Some(Status::INTERNAL_SERVER_ERROR));
}

#[test]
fn test_single_context_per_request() {
    let hook_calls = Arc::new(AtomicUsize::new(0));
    let calls = hook_calls.clone();
    let app = WebApp::default().context_handler(move |ctx: &mut RequestContext| {
        calls.fetch_add(1, Ordering::SeqCst);
        ctx.set("hooked", true);
    });

    app.filter("/*", |ctx| {
        ctx.set("user", "ada");
        HandlerResult::proceed()
    })
    .unwrap();
    app.filter("/*", |_| HandlerResult::proceed()).unwrap();
    app.get("/me", |ctx| {
        let body = serde_json::json!({
            "user": ctx.get("user"),
            "hooked": ctx.get("hooked"),
        });
        HandlerResult::Response(WebResponse::ok().json(&body))
    })
    .unwrap();

    match app.dispatch("GET", "/me") {
        Outcome::Ready(r) => {
            assert_eq!(r.body(), &Body::Json(serde_json::json!({"user": "ada", "hooked": true})))
        }
        other => panic!("unexpected: {:?}", other),
    }
    assert_eq!(hook_calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_filters_run_without_matching_route() {
    let app = WebApp::default();
    app.filter("/admin/*", |_| {
        HandlerResult::Response(WebResponse::new(Status::UNAUTHORIZED))
    })
    .unwrap();

    let outcome = app.dispatch("GET", "/admin/unknown");
    assert_eq!(outcome.state(), DispatchState::ShortCircuited);
    assert_eq!(outcome.status(), Some(Status::UNAUTHORIZED));
}

#[test]
fn test_filter_error_goes_to_error_handler() {
    let app = WebApp::default().error_handler(|_: &mut RequestContext, error: &HandlerError| {
        HandlerResult::Response(WebResponse::new(Status::FORBIDDEN).text(error.to_string()))
    });
    app.filter("*.secret", |_| HandlerResult::error("no secrets")).unwrap();
    app.get("/file.secret", common::text("leaked")).unwrap();

    match app.dispatch("GET", "/file.secret") {
        Outcome::ShortCircuited(Some(r)) => {
            assert_eq!(r.status(), Status::FORBIDDEN);
            assert_eq!(r.body(), &Body::Text("no secrets".into()));
        }
        other => panic!("unexpected: {:?}", other),
    }
}

#[test]
fn test_idempotent_compilation() {
    let a = PathTemplate::compile("/shop/{category}/items/{item}").unwrap();
    let b = PathTemplate::compile("/shop/{category}/items/{item}").unwrap();

    for path in [
        "/shop/books/items/42",
        "/shop/books/items",
        "/shop//items/",
        "/Shop/books/items/42",
        "/shop/books/items/42/extra",
    ] {
        assert_eq!(a.matches(path), b.matches(path), "{}", path);
        assert_eq!(a.extract(path), b.extract(path), "{}", path);
    }
}

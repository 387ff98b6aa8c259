//! HTTP front end tests over a real socket.

use std::time::Duration;

use script_router::config::{parse_config, AppConfig};
use script_router::dispatch::{HandlerResult, RequestContext};
use script_router::http::Status;
use script_router::{WebApp, WebResponse};

mod common;

#[tokio::test]
async fn test_routes_params_and_query() {
    let app = WebApp::default();
    app.get("/greet/{name}", |ctx: &mut RequestContext| {
        let name = ctx.path_param("name").unwrap_or("").to_string();
        let greeting = ctx
            .request()
            .and_then(|r| r.param("greeting"))
            .unwrap_or_else(|| "hello".to_string());
        HandlerResult::Response(WebResponse::ok().text(format!("{} {}", greeting, name)))
    })
    .unwrap();

    let (addr, shutdown, handle) = common::start_server(app, AppConfig::default()).await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("http://{}/greet/ada?greeting=hi%20there", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    assert!(res.headers().contains_key("x-request-id"));
    assert_eq!(res.text().await.unwrap(), "hi there ada");

    let res = client.get(format!("http://{}/nowhere", addr)).send().await.unwrap();
    assert_eq!(res.status(), 404);
    assert!(res.text().await.unwrap().contains("404 Not found"));

    shutdown.trigger();
    tokio::time::timeout(Duration::from_secs(5), handle).await.unwrap().unwrap();
}

#[tokio::test]
async fn test_json_body_and_request_id() {
    let app = WebApp::default();
    app.post("/echo", |ctx: &mut RequestContext| {
        let Some(request) = ctx.request() else {
            return HandlerResult::error("no request");
        };
        match request.json::<serde_json::Value>() {
            Ok(value) => {
                let body = serde_json::json!({"got": value, "request_id": ctx.request_id()});
                HandlerResult::Response(WebResponse::new(Status::CREATED).json(&body))
            }
            Err(e) => HandlerResult::Response(WebResponse::new(Status::BAD_REQUEST).text(e.to_string())),
        }
    })
    .unwrap();

    let (addr, shutdown, handle) = common::start_server(app, AppConfig::default()).await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("http://{}/echo", addr))
        .header("x-request-id", "trace-1")
        .json(&serde_json::json!({"n": 1}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 201);
    assert_eq!(res.headers()["x-request-id"], "trace-1");
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body, serde_json::json!({"got": {"n": 1}, "request_id": "trace-1"}));

    let res = client
        .post(format!("http://{}/echo", addr))
        .body("{broken")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 400);

    shutdown.trigger();
    tokio::time::timeout(Duration::from_secs(5), handle).await.unwrap().unwrap();
}

#[tokio::test]
async fn test_filters_cookies_and_redirects() {
    let mut config = AppConfig::default();
    config.dispatch.blocked_status = 403;

    let app = WebApp::new(config.dispatch.clone());
    app.filter("/private/*", |ctx: &mut RequestContext| {
        let authorised = ctx
            .request()
            .and_then(|r| r.header("cookie"))
            .map(|c| c.contains("session=ok"))
            .unwrap_or(false);
        HandlerResult::Boolean(authorised)
    })
    .unwrap();
    app.get("/private/data", common::text("secret")).unwrap();
    app.get("/login", |_: &mut RequestContext| {
        HandlerResult::Response(WebResponse::see("/private/data").cookie("session", "ok"))
    })
    .unwrap();

    let (addr, shutdown, handle) = common::start_server(app, config).await;
    let client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();

    let res = client.get(format!("http://{}/private/data", addr)).send().await.unwrap();
    assert_eq!(res.status(), 403);
    assert!(res.text().await.unwrap().is_empty());

    let res = client.get(format!("http://{}/login", addr)).send().await.unwrap();
    assert_eq!(res.status(), 302);
    assert_eq!(res.headers()["location"], "/private/data");
    assert_eq!(res.headers()["set-cookie"], "session=ok");

    let res = client
        .get(format!("http://{}/private/data", addr))
        .header("cookie", "session=ok")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(res.text().await.unwrap(), "secret");

    shutdown.trigger();
    tokio::time::timeout(Duration::from_secs(5), handle).await.unwrap().unwrap();
}

#[tokio::test]
async fn test_basic_auth_filter() {
    let config = AppConfig::default();
    let app = WebApp::new(config.dispatch.clone());
    app.filter("/admin/*", |ctx: &mut RequestContext| match ctx.basic_auth() {
        Some(creds) if creds.username == "root" && creds.password == "hunter2" => HandlerResult::proceed(),
        _ => HandlerResult::Response(
            WebResponse::new(Status::UNAUTHORIZED).header("WWW-Authenticate", "Basic realm=\"admin\""),
        ),
    })
    .unwrap();
    app.get("/admin/panel", |ctx: &mut RequestContext| {
        let user = ctx.basic_auth().map(|c| c.username).unwrap_or_default();
        HandlerResult::Response(WebResponse::ok().text(format!("welcome {}", user)))
    })
    .unwrap();

    let (addr, shutdown, handle) = common::start_server(app, config).await;
    let client = reqwest::Client::new();
    let url = format!("http://{}/admin/panel", addr);

    let res = client.get(&url).send().await.unwrap();
    assert_eq!(res.status(), 401);
    assert_eq!(res.headers()["www-authenticate"], "Basic realm=\"admin\"");

    let res = client.get(&url).basic_auth("root", Some("wrong")).send().await.unwrap();
    assert_eq!(res.status(), 401);

    let res = client.get(&url).basic_auth("root", Some("hunter2")).send().await.unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(res.text().await.unwrap(), "welcome root");

    shutdown.trigger();
    tokio::time::timeout(Duration::from_secs(5), handle).await.unwrap().unwrap();
}

#[tokio::test]
async fn test_config_declared_routes_and_shutdown_hook() {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    let config = parse_config(
        r#"
        [[routes]]
        path = "/status/{service}"
        methods = ["GET"]
        response = { status = 200, body = "{service} is up", content_type = "text/plain" }

        [[filters]]
        path = "*.php"
        action = "respond"
        status = 410
        body = "gone"
        "#,
    )
    .unwrap();

    let stopped = Arc::new(AtomicBool::new(false));
    let flag = stopped.clone();
    let app = WebApp::from_config(&config)
        .unwrap()
        .shutdown_handler(move || flag.store(true, Ordering::SeqCst));

    let (addr, shutdown, handle) = common::start_server(app, config).await;
    let client = reqwest::Client::new();

    let res = client.get(format!("http://{}/status/db", addr)).send().await.unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(res.headers()["content-type"], "text/plain; charset=UTF-8");
    assert_eq!(res.text().await.unwrap(), "db is up");

    let res = client.get(format!("http://{}/index.php", addr)).send().await.unwrap();
    assert_eq!(res.status(), 410);
    assert_eq!(res.text().await.unwrap(), "gone");

    shutdown.trigger();
    tokio::time::timeout(Duration::from_secs(5), handle).await.unwrap().unwrap();
    assert!(stopped.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_body_limit() {
    let mut config = AppConfig::default();
    config.limits.max_body_size = 16;

    let app = WebApp::new(config.dispatch.clone());
    app.post("/upload", |_: &mut RequestContext| HandlerResult::Response(WebResponse::ok())).unwrap();

    let (addr, shutdown, handle) = common::start_server(app, config).await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("http://{}/upload", addr))
        .body("x".repeat(1024))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 413);

    let res = client
        .post(format!("http://{}/upload", addr))
        .body("small")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);

    shutdown.trigger();
    tokio::time::timeout(Duration::from_secs(5), handle).await.unwrap().unwrap();
}

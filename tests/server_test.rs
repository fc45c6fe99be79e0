//! Integration tests driving a real listener with reqwest.

use std::time::Duration;

use axum::http::StatusCode;
use serde_json::Value;

use domain_router::routing::Handlers;
use domain_router::RouterConfig;

mod common;

const SITE: &str = r#"
[observability]
metrics_enabled = false

[rate_limit]
requests_per_second = 1
burst_size = 2

[router]
default_action = "home"

[[actions]]
name = "home"
kind = "text"
body = "home"

[[actions]]
name = "echo"
kind = "echo"

[[actions]]
name = "login"
kind = "redirect"
location = "/login"

[[routes]]
method = "GET"
path = "/user/{id}"
action = "echo"

[[routes]]
method = "POST"
path = "/form"
action = "echo"
middleware = ["csrf"]

[[routes]]
method = "GET"
path = "/limited"
action = "home"
middleware = ["rate_limit"]

[[routes]]
method = "GET"
path = "/old"
action = "login"

[[domains]]
pattern = "{tenant}.app.example.com"

[[domains.routes]]
method = "GET"
path = "/settings"
action = "echo"

[[domains]]
pattern = "*.example.com"
default_action = "echo"
"#;

fn site() -> RouterConfig {
    toml::from_str(SITE).unwrap()
}

#[tokio::test]
async fn test_routes_over_http() {
    let server = common::start_server(site(), Handlers::new()).await;
    let client = common::client();

    let res = client
        .get(server.url("/"))
        .header("host", "example.com")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["x-content-type-options"], "nosniff");
    assert_eq!(res.text().await.unwrap(), "home");

    let res = client
        .get(server.url("/settings"))
        .header("host", "ACME.app.example.com:8443")
        .send()
        .await
        .unwrap();
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["params"]["domain"]["tenant"], "acme");

    let res = client
        .get(server.url("/"))
        .header("host", "shop.example.com")
        .send()
        .await
        .unwrap();
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["params"]["domain"]["subdomain"], "shop");

    let res = client
        .get(server.url("/user/123"))
        .header("host", "example.com")
        .send()
        .await
        .unwrap();
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["params"]["path"][0], "123");

    let res = client
        .get(server.url("/old"))
        .header("host", "example.com")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(res.headers()["location"], "/login");

    let res = client
        .get(server.url("/missing"))
        .header("host", "example.com")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(res.text().await.unwrap(), "Page Not Found");

    server.stop().await;
}

#[tokio::test]
async fn test_request_id_is_generated_or_propagated() {
    let server = common::start_server(site(), Handlers::new()).await;
    let client = common::client();

    let res = client.get(server.url("/user/1")).send().await.unwrap();
    let generated = res.headers()["x-request-id"].to_str().unwrap().to_string();
    assert_eq!(generated.len(), 36);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["request_id"], generated.as_str());

    let res = client
        .get(server.url("/user/1"))
        .header("x-request-id", "abc-123")
        .send()
        .await
        .unwrap();
    assert_eq!(res.headers()["x-request-id"], "abc-123");

    server.stop().await;
}

#[tokio::test]
async fn test_csrf_middleware() {
    let server = common::start_server(site(), Handlers::new()).await;
    let client = common::client();

    let res = client.post(server.url("/form")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = client
        .post(server.url("/form"))
        .header("cookie", "csrf_token=s3cret")
        .header("x-csrf-token", "s3cret")
        .body("payload")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    server.stop().await;
}

#[tokio::test]
async fn test_rate_limit_middleware() {
    let server = common::start_server(site(), Handlers::new()).await;
    let client = common::client();

    let mut statuses = Vec::new();
    for _ in 0..3 {
        let res = client.get(server.url("/limited")).send().await.unwrap();
        statuses.push(res.status());
    }
    assert_eq!(
        statuses,
        vec![StatusCode::OK, StatusCode::OK, StatusCode::TOO_MANY_REQUESTS]
    );

    let res = client.get(server.url("/user/1")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    server.stop().await;
}

#[tokio::test]
async fn test_application_handlers_override_config() {
    let mut handlers = Handlers::new();
    handlers.action("home", common::tagged("app"));

    let server = common::start_server(site(), handlers).await;
    let res = common::client().get(server.url("/")).send().await.unwrap();
    assert_eq!(res.text().await.unwrap(), "app:");

    server.stop().await;
}

#[tokio::test]
async fn test_reload_swaps_route_table() {
    let server = common::start_server(site(), Handlers::new()).await;
    let client = common::client();

    let res = client.get(server.url("/new")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let mut updated = site();
    updated.routes.push(toml::from_str(
        r#"
        method = "GET"
        path = "/new"
        action = "home"
        "#,
    ).unwrap());
    server.updates.send(updated).unwrap();

    let mut status = StatusCode::NOT_FOUND;
    for _ in 0..50 {
        status = client.get(server.url("/new")).send().await.unwrap().status();
        if status == StatusCode::OK {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(status, StatusCode::OK);

    let mut broken = site();
    broken.router.strict_handlers = true;
    broken.routes.push(toml::from_str(
        r#"
        method = "GET"
        path = "/ghost"
        action = "ghost"
        "#,
    ).unwrap());
    server.updates.send(broken).unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    let res = client.get(server.url("/new")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    server.stop().await;
}

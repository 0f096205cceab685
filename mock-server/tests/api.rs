use axum::http::{self, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use mock_server::{app, app_with, Envelope, Service, EMAIL_CODE};
use serde_json::json;
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: &str) -> Request<String> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(http::header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(body.to_string()).unwrap()
}

fn get_request(uri: &str, token: Option<&str>) -> Request<String> {
    let mut builder = Request::builder().uri(uri);
    if let Some(token) = token {
        builder = builder.header(http::header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(String::new()).unwrap()
}

/// Send through a clone of `app`; clones share state.
async fn call(app: &Router, req: Request<String>) -> Envelope {
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    body_json(resp).await
}

fn alice() -> Router {
    app_with(Service::default().with_account("alice", "alice@example.com", "p"))
}

async fn login(app: &Router) -> String {
    let env = call(
        app,
        json_request("POST", "/public/login", None, r#"{"username":"alice","password":"p","captchaToken":"tok"}"#),
    )
    .await;
    assert_eq!(env.code, 200);
    env.data.unwrap()["token"].as_str().unwrap().to_string()
}

// --- public ---

#[tokio::test]
async fn statistics_is_public() {
    let env = call(&app(), get_request("/public/statistics", None)).await;
    assert_eq!(env.code, 200);
    assert_eq!(env.data.unwrap()["nodes"], 2);
}

#[tokio::test]
async fn failures_still_answer_http_200() {
    let resp = app().oneshot(get_request("/auth/node/list", None)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let env: Envelope = body_json(resp).await;
    assert_eq!(env.code, 401);
    assert!(env.data.is_none());
}

#[tokio::test]
async fn malformed_body_is_envelope_400() {
    let env = call(&app(), json_request("POST", "/public/login", None, "{not json")).await;
    assert_eq!(env.code, 400);
}

#[tokio::test]
async fn html_route_is_not_an_envelope() {
    let resp = app().oneshot(get_request("/__mock/html", None)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    let body = body_bytes(resp).await;
    assert!(serde_json::from_slice::<serde_json::Value>(&body).is_err());
}

// --- auth ---

#[tokio::test]
async fn register_then_login() {
    let app = app();
    let env = call(
        &app,
        json_request("POST", "/public/register/emailCode", None, r#"{"email":"b@example.com","captchaToken":"tok"}"#),
    )
    .await;
    assert_eq!(env.code, 200);

    let register = json!({"username": "bob", "email": "b@example.com", "emailCode": EMAIL_CODE, "password": "pw"});
    let env = call(&app, json_request("POST", "/public/register", None, &register.to_string())).await;
    assert_eq!(env.code, 200);

    let env = call(&app, json_request("POST", "/public/register", None, &register.to_string())).await;
    assert_eq!(env.code, 400, "email code is single use");

    let env = call(
        &app,
        json_request("POST", "/public/login", None, r#"{"username":"bob","password":"pw","captchaToken":"tok"}"#),
    )
    .await;
    assert_eq!(env.code, 200);
    assert!(env.data.unwrap()["token"].as_str().is_some());
}

#[tokio::test]
async fn login_requires_captcha() {
    let env = call(
        &alice(),
        json_request("POST", "/public/login", None, r#"{"username":"alice","password":"p","captchaToken":""}"#),
    )
    .await;
    assert_eq!(env.code, 400);
    assert_eq!(env.message, "captcha required");
}

#[tokio::test]
async fn token_reset_revokes_old_session() {
    let app = alice();
    let old = login(&app).await;
    let env = call(&app, json_request("POST", "/auth/user/tokenReset", Some(&old), r#"{"captchaToken":"tok"}"#)).await;
    let new = env.data.unwrap()["newToken"].as_str().unwrap().to_string();

    assert_eq!(call(&app, get_request("/auth/user/info", Some(&old))).await.code, 401);
    assert_eq!(call(&app, get_request("/auth/user/info", Some(&new))).await.code, 200);
}

// --- node ---

#[tokio::test]
async fn node_secret_reads_body_on_get() {
    let app = alice();
    let token = login(&app).await;
    let env = call(&app, json_request("GET", "/auth/node/secret", Some(&token), r#"{"nodeId":2}"#)).await;
    assert_eq!(env.code, 200);
    assert_eq!(env.data.unwrap()["nodeId"], 2);

    let env = call(&app, json_request("GET", "/auth/node/secret", Some(&token), r#"{"nodeId":42}"#)).await;
    assert_eq!(env.code, 404);
}

// --- tunnel lifecycle ---

#[tokio::test]
async fn tunnel_lifecycle() {
    let app = alice();
    let token = login(&app).await;
    let token = Some(token.as_str());

    let create = r#"{"nodeId":1,"proxyName":"web","proxyType":"tcp","localIp":"127.0.0.1","localPort":8080}"#;
    let env = call(&app, json_request("POST", "/auth/proxy/create", token, create)).await;
    assert_eq!(env.code, 200);
    let id = env.data.unwrap()["proxyId"].as_i64().unwrap();

    let env = call(&app, json_request("POST", "/auth/proxy/create", token, create)).await;
    assert_eq!(env.code, 400, "duplicate name");

    let env = call(
        &app,
        json_request("POST", "/auth/proxy/toggle", token, &json!({"proxyId": id, "isDisabled": true}).to_string()),
    )
    .await;
    assert_eq!(env.code, 200);

    let env = call(&app, get_request("/auth/proxy/list", token)).await;
    let list = env.data.unwrap();
    assert_eq!(list[0]["proxyId"], id);
    assert_eq!(list[0]["isDisabled"], true);
    assert_eq!(list[0]["localPort"], 8080);

    let env = call(
        &app,
        json_request("POST", "/auth/proxy/config", token, &json!({"proxyId": id, "format": "toml"}).to_string()),
    )
    .await;
    assert!(env.data.unwrap()["config"].as_str().unwrap().contains("name = \"web\""));

    let env = call(&app, json_request("POST", "/auth/proxy/delete", token, &json!({"proxyId": id}).to_string())).await;
    assert_eq!(env.code, 200);

    let env = call(&app, json_request("POST", "/auth/proxy/delete", token, &json!({"proxyId": id}).to_string())).await;
    assert_eq!(env.code, 404);
}

#[tokio::test]
async fn other_users_tunnel_is_forbidden() {
    let app = app_with(
        Service::default()
            .with_account("alice", "alice@example.com", "p")
            .with_account("mallory", "m@example.com", "m"),
    );
    let alice = login(&app).await;
    let env = call(
        &app,
        json_request("POST", "/auth/proxy/create", Some(&alice), r#"{"nodeId":1,"proxyName":"web","localPort":80}"#),
    )
    .await;
    let id = env.data.unwrap()["proxyId"].as_i64().unwrap();

    let env = call(
        &app,
        json_request("POST", "/public/login", None, r#"{"username":"mallory","password":"m","captchaToken":"tok"}"#),
    )
    .await;
    let mallory = env.data.unwrap()["token"].as_str().unwrap().to_string();

    let env = call(
        &app,
        json_request("POST", "/auth/proxy/kick", Some(&mallory), &json!({"proxyId": id}).to_string()),
    )
    .await;
    assert_eq!(env.code, 403);
    assert_eq!(env.message, "forbidden");
}

// --- logs ---

#[tokio::test]
async fn operation_logs_paginate_and_nest_data() {
    let app = alice();
    let token = login(&app).await;
    call(&app, json_request("POST", "/auth/user/sign", Some(&token), r#"{"captchaToken":"tok"}"#)).await;

    let env = call(&app, get_request("/auth/operationLog/list?page=1&pageSize=1", Some(&token))).await;
    let page = &env.data.unwrap()["data"];
    assert_eq!(page["total"], 2);
    assert_eq!(page["list"].as_array().unwrap().len(), 1);
    assert_eq!(page["list"][0]["action"], "login");

    let env = call(&app, get_request("/auth/operationLog/stats", Some(&token))).await;
    assert_eq!(env.data.unwrap()["actions"]["sign"], 1);
}

#[tokio::test]
async fn bad_log_query_is_envelope_400() {
    let app = alice();
    let token = login(&app).await;

    let env = call(&app, get_request("/auth/operationLog/list?page=1", Some(&token))).await;
    assert_eq!(env.code, 400);
    assert!(env.data.is_none());

    let env = call(&app, get_request("/auth/operationLog/list?page=one&pageSize=10", Some(&token))).await;
    assert_eq!(env.code, 400);
}

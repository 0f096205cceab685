//! In-memory stand-in for the ME Frp API.
//!
//! Speaks the service's envelope contract: every answer is HTTP 200 with a
//! `{code, message, data}` body carrying the real outcome in `code`. The
//! routes under `/__mock/` break that contract on purpose so clients can be
//! tested against non-envelope bodies and misleading HTTP statuses.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

/// Email verification code the mock accepts for every address.
pub const EMAIL_CODE: &str = "000000";

/// The response envelope.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Envelope {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

type Reply = Result<Json<Envelope>, Json<Envelope>>;

fn ok(data: Value) -> Reply {
    Ok(Json(Envelope {
        code: 200,
        message: "ok".to_string(),
        data: Some(data),
    }))
}

fn ok_empty() -> Reply {
    Ok(Json(Envelope {
        code: 200,
        message: "ok".to_string(),
        data: None,
    }))
}

fn fail(code: i64, message: &str) -> Json<Envelope> {
    Json(Envelope {
        code,
        message: message.to_string(),
        data: None,
    })
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, Json<Envelope>> {
    payload.map(|Json(v)| v).map_err(|e| fail(400, &e.body_text()))
}

fn require_captcha(token: &str) -> Result<(), Json<Envelope>> {
    if token.trim().is_empty() {
        return Err(fail(400, "captcha required"));
    }
    Ok(())
}

fn new_token() -> String {
    Uuid::new_v4().simple().to_string()
}

#[derive(Clone, Debug)]
struct Account {
    email: String,
    password: String,
    frp_token: String,
    signed_today: bool,
}

#[derive(Clone, Debug)]
struct StoredTunnel {
    owner: String,
    node_id: i64,
    proxy_name: String,
    disabled: bool,
    definition: Map<String, Value>,
}

#[derive(Clone, Debug)]
struct LogEntry {
    username: String,
    action: &'static str,
}

/// Everything the mock service remembers.
#[derive(Debug, Default)]
pub struct Service {
    accounts: HashMap<String, Account>,
    email_codes: HashMap<String, String>,
    sessions: HashMap<String, String>,
    tunnels: BTreeMap<i64, StoredTunnel>,
    next_proxy_id: i64,
    logs: Vec<LogEntry>,
}

impl Service {
    /// Pre-register an account.
    pub fn with_account(mut self, username: &str, email: &str, password: &str) -> Self {
        self.accounts.insert(
            username.to_string(),
            Account {
                email: email.to_string(),
                password: password.to_string(),
                frp_token: new_token(),
                signed_today: false,
            },
        );
        self
    }

    fn log(&mut self, username: &str, action: &'static str) {
        self.logs.push(LogEntry {
            username: username.to_string(),
            action,
        });
    }

    fn session(&self, headers: &HeaderMap) -> Result<String, Json<Envelope>> {
        let token = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or_else(|| fail(401, "unauthorized"))?;
        self.sessions
            .get(token)
            .cloned()
            .ok_or_else(|| fail(401, "token invalid"))
    }

    fn owned_tunnel(&mut self, username: &str, proxy_id: i64) -> Result<&mut StoredTunnel, Json<Envelope>> {
        let tunnel = self
            .tunnels
            .get_mut(&proxy_id)
            .ok_or_else(|| fail(404, "tunnel not found"))?;
        if tunnel.owner != username {
            return Err(fail(403, "forbidden"));
        }
        Ok(tunnel)
    }
}

pub type Db = Arc<RwLock<Service>>;

const NODES: [(i64, &str, &str); 2] = [(1, "hk-1", "hk1.example.net"), (2, "sh-2", "sh2.example.net")];

pub fn app() -> Router {
    app_with(Service::default())
}

pub fn app_with(service: Service) -> Router {
    let db: Db = Arc::new(RwLock::new(service));
    Router::new()
        .route("/public/register/emailCode", post(register_email_code))
        .route("/public/register", post(register))
        .route("/public/login", post(login))
        .route("/public/iforgot", post(recover_account))
        .route("/public/statistics", get(statistics))
        .route("/public/store/products", get(store_products))
        .route("/auth/user/passwordReset", post(change_password))
        .route("/auth/user/info", get(user_info))
        .route("/auth/user/sign", post(sign))
        .route("/auth/user/frpToken", get(frp_token))
        .route("/auth/user/groups", get(user_groups))
        .route("/auth/user/tokenReset", post(reset_access_key))
        .route("/auth/node/list", get(node_list))
        .route("/auth/node/status", get(node_status))
        .route("/auth/node/secret", get(node_secret))
        .route("/auth/node/nameList", get(node_name_list))
        .route("/auth/proxy/list", get(tunnel_list))
        .route("/auth/proxy/create", post(create_tunnel))
        .route("/auth/proxy/update", post(update_tunnel))
        .route("/auth/proxy/delete", post(delete_tunnel))
        .route("/auth/proxy/kick", post(kick_tunnel))
        .route("/auth/proxy/toggle", post(toggle_tunnel))
        .route("/auth/proxy/config", post(tunnel_config))
        .route("/auth/proxy/config/multiple", post(tunnel_configs))
        .route("/auth/operationLog/list", get(operation_logs))
        .route("/auth/operationLog/stats", get(operation_log_stats))
        .route("/__mock/html", get(html_page))
        .route("/__mock/status-mismatch", get(status_mismatch))
        .route("/__mock/invalid-utf8", get(invalid_utf8))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

pub async fn run_with(listener: TcpListener, service: Service) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with(service)).await
}

// ---------------------------------------------------------------------------
// Public
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EmailCodeInput {
    email: String,
    captcha_token: String,
}

async fn register_email_code(State(db): State<Db>, payload: Result<Json<EmailCodeInput>, JsonRejection>) -> Reply {
    let input = body(payload)?;
    require_captcha(&input.captcha_token)?;
    if !input.email.contains('@') {
        return Err(fail(400, "invalid email"));
    }
    db.write()
        .await
        .email_codes
        .insert(input.email, EMAIL_CODE.to_string());
    ok_empty()
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegisterInput {
    username: String,
    email: String,
    email_code: String,
    password: String,
}

async fn register(State(db): State<Db>, payload: Result<Json<RegisterInput>, JsonRejection>) -> Reply {
    let input = body(payload)?;
    let mut svc = db.write().await;
    if svc.email_codes.get(&input.email) != Some(&input.email_code) {
        return Err(fail(400, "email code invalid"));
    }
    if svc.accounts.contains_key(&input.username) {
        return Err(fail(400, "username taken"));
    }
    svc.email_codes.remove(&input.email);
    svc.accounts.insert(
        input.username.clone(),
        Account {
            email: input.email,
            password: input.password,
            frp_token: new_token(),
            signed_today: false,
        },
    );
    svc.log(&input.username, "register");
    ok_empty()
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginInput {
    username: String,
    password: String,
    captcha_token: String,
}

async fn login(State(db): State<Db>, payload: Result<Json<LoginInput>, JsonRejection>) -> Reply {
    let input = body(payload)?;
    require_captcha(&input.captcha_token)?;
    let mut svc = db.write().await;
    match svc.accounts.get(&input.username) {
        Some(account) if account.password == input.password => {}
        _ => return Err(fail(401, "wrong username or password")),
    }
    let token = new_token();
    svc.sessions.insert(token.clone(), input.username.clone());
    svc.log(&input.username, "login");
    tracing::debug!(username = %input.username, "session issued");
    ok(json!({ "token": token }))
}

#[derive(Deserialize)]
struct RecoverInput {
    username: String,
    password: String,
}

async fn recover_account(State(db): State<Db>, payload: Result<Json<RecoverInput>, JsonRejection>) -> Reply {
    let input = body(payload)?;
    let mut svc = db.write().await;
    let account = svc
        .accounts
        .get_mut(&input.username)
        .ok_or_else(|| fail(404, "user not found"))?;
    account.password = input.password;
    svc.log(&input.username, "recover");
    ok_empty()
}

async fn statistics(State(db): State<Db>) -> Reply {
    let svc = db.read().await;
    ok(json!({
        "users": svc.accounts.len(),
        "tunnels": svc.tunnels.len(),
        "nodes": NODES.len(),
    }))
}

async fn store_products() -> Reply {
    ok(json!([
        { "productId": 1, "name": "traffic-10g", "price": 5 },
        { "productId": 2, "name": "tunnel-slot", "price": 3 },
    ]))
}

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChangePasswordInput {
    old_password: String,
    new_password: String,
}

/// Resets the frp token too. The calling session stays valid.
async fn change_password(
    State(db): State<Db>,
    headers: HeaderMap,
    payload: Result<Json<ChangePasswordInput>, JsonRejection>,
) -> Reply {
    let mut svc = db.write().await;
    let username = svc.session(&headers)?;
    let input = body(payload)?;
    let account = svc
        .accounts
        .get_mut(&username)
        .ok_or_else(|| fail(404, "user not found"))?;
    if account.password != input.old_password {
        return Err(fail(400, "old password incorrect"));
    }
    account.password = input.new_password;
    account.frp_token = new_token();
    svc.log(&username, "password_reset");
    ok_empty()
}

async fn user_info(State(db): State<Db>, headers: HeaderMap) -> Reply {
    let svc = db.read().await;
    let username = svc.session(&headers)?;
    let account = svc.accounts.get(&username).ok_or_else(|| fail(404, "user not found"))?;
    ok(json!({
        "username": username,
        "email": account.email,
        "group": "free",
        "signedToday": account.signed_today,
    }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CaptchaInput {
    captcha_token: String,
}

async fn sign(State(db): State<Db>, headers: HeaderMap, payload: Result<Json<CaptchaInput>, JsonRejection>) -> Reply {
    let mut svc = db.write().await;
    let username = svc.session(&headers)?;
    require_captcha(&body(payload)?.captcha_token)?;
    let account = svc
        .accounts
        .get_mut(&username)
        .ok_or_else(|| fail(404, "user not found"))?;
    if account.signed_today {
        return Err(fail(400, "already signed today"));
    }
    account.signed_today = true;
    svc.log(&username, "sign");
    ok(json!({ "traffic": 1024 }))
}

async fn frp_token(State(db): State<Db>, headers: HeaderMap) -> Reply {
    let svc = db.read().await;
    let username = svc.session(&headers)?;
    let account = svc.accounts.get(&username).ok_or_else(|| fail(404, "user not found"))?;
    ok(json!({ "token": account.frp_token }))
}

async fn user_groups(State(db): State<Db>, headers: HeaderMap) -> Reply {
    db.read().await.session(&headers)?;
    ok(json!({ "groups": [
        { "name": "free", "maxProxies": 5 },
        { "name": "vip", "maxProxies": 20 },
    ]}))
}

/// Issues a new session token and revokes the one used for the call.
async fn reset_access_key(
    State(db): State<Db>,
    headers: HeaderMap,
    payload: Result<Json<CaptchaInput>, JsonRejection>,
) -> Reply {
    let mut svc = db.write().await;
    let username = svc.session(&headers)?;
    require_captcha(&body(payload)?.captcha_token)?;
    svc.sessions.retain(|_, owner| owner != &username);
    let token = new_token();
    svc.sessions.insert(token.clone(), username.clone());
    svc.log(&username, "token_reset");
    ok(json!({ "newToken": token }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LogParams {
    page: usize,
    page_size: usize,
    start_time: Option<String>,
    end_time: Option<String>,
}

async fn operation_logs(
    State(db): State<Db>,
    headers: HeaderMap,
    query: Result<Query<LogParams>, QueryRejection>,
) -> Reply {
    let svc = db.read().await;
    let username = svc.session(&headers)?;
    let Query(params) = query.map_err(|e| fail(400, &e.body_text()))?;
    if params.page == 0 || params.page_size == 0 {
        return Err(fail(400, "page and pageSize must be positive"));
    }
    let mine: Vec<&LogEntry> = svc.logs.iter().filter(|e| e.username == username).collect();
    let list: Vec<Value> = mine
        .iter()
        .enumerate()
        .skip((params.page - 1) * params.page_size)
        .take(params.page_size)
        .map(|(seq, e)| json!({ "id": seq + 1, "action": e.action }))
        .collect();
    ok(json!({ "data": {
        "list": list,
        "total": mine.len(),
        "page": params.page,
        "pageSize": params.page_size,
        "startTime": params.start_time,
        "endTime": params.end_time,
    }}))
}

async fn operation_log_stats(State(db): State<Db>, headers: HeaderMap) -> Reply {
    let svc = db.read().await;
    let username = svc.session(&headers)?;
    let mut actions: BTreeMap<&str, usize> = BTreeMap::new();
    for entry in svc.logs.iter().filter(|e| e.username == username) {
        *actions.entry(entry.action).or_default() += 1;
    }
    let total: usize = actions.values().sum();
    ok(json!({ "total": total, "actions": actions }))
}

// ---------------------------------------------------------------------------
// Node
// ---------------------------------------------------------------------------

async fn node_list(State(db): State<Db>, headers: HeaderMap) -> Reply {
    db.read().await.session(&headers)?;
    let nodes: Vec<Value> = NODES
        .iter()
        .map(|(id, name, host)| json!({ "nodeId": id, "name": name, "hostname": host }))
        .collect();
    ok(Value::Array(nodes))
}

async fn node_status(State(db): State<Db>, headers: HeaderMap) -> Reply {
    let svc = db.read().await;
    svc.session(&headers)?;
    let status: Vec<Value> = NODES
        .iter()
        .map(|(id, name, _)| {
            let tunnels = svc.tunnels.values().filter(|t| t.node_id == *id).count();
            json!({ "nodeId": id, "name": name, "online": true, "tunnels": tunnels })
        })
        .collect();
    ok(Value::Array(status))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct NodeIdInput {
    node_id: i64,
}

/// Reads `nodeId` from a JSON body on GET, as the real service does.
async fn node_secret(
    State(db): State<Db>,
    headers: HeaderMap,
    payload: Result<Json<NodeIdInput>, JsonRejection>,
) -> Reply {
    let svc = db.read().await;
    let username = svc.session(&headers)?;
    let input = body(payload)?;
    let (id, _, host) = NODES
        .iter()
        .find(|(id, _, _)| *id == input.node_id)
        .ok_or_else(|| fail(404, "node not found"))?;
    let account = svc.accounts.get(&username).ok_or_else(|| fail(404, "user not found"))?;
    ok(json!({
        "nodeId": id,
        "hostname": host,
        "token": format!("node-{id}-{}", account.frp_token),
    }))
}

async fn node_name_list(State(db): State<Db>, headers: HeaderMap) -> Reply {
    let svc = db.read().await;
    let username = svc.session(&headers)?;
    let list: Vec<Value> = NODES
        .iter()
        .filter(|(id, _, _)| svc.tunnels.values().any(|t| t.owner == username && t.node_id == *id))
        .map(|(id, name, host)| json!({ "nodeId": id, "name": name, "address": host }))
        .collect();
    ok(Value::Array(list))
}

// ---------------------------------------------------------------------------
// Tunnel
// ---------------------------------------------------------------------------

fn tunnel_json(proxy_id: i64, tunnel: &StoredTunnel) -> Value {
    let mut obj = tunnel.definition.clone();
    obj.insert("proxyId".to_string(), json!(proxy_id));
    obj.insert("nodeId".to_string(), json!(tunnel.node_id));
    obj.insert("proxyName".to_string(), json!(tunnel.proxy_name));
    obj.insert("isDisabled".to_string(), json!(tunnel.disabled));
    Value::Object(obj)
}

fn validate_definition(definition: &Map<String, Value>) -> Result<(i64, String), Json<Envelope>> {
    let node_id = definition
        .get("nodeId")
        .and_then(Value::as_i64)
        .ok_or_else(|| fail(400, "nodeId required"))?;
    if !NODES.iter().any(|(id, _, _)| *id == node_id) {
        return Err(fail(404, "node not found"));
    }
    let proxy_name = definition
        .get("proxyName")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| fail(400, "proxyName required"))?;
    Ok((node_id, proxy_name.to_string()))
}

async fn tunnel_list(State(db): State<Db>, headers: HeaderMap) -> Reply {
    let svc = db.read().await;
    let username = svc.session(&headers)?;
    let list: Vec<Value> = svc
        .tunnels
        .iter()
        .filter(|(_, t)| t.owner == username)
        .map(|(id, t)| tunnel_json(*id, t))
        .collect();
    ok(Value::Array(list))
}

async fn create_tunnel(
    State(db): State<Db>,
    headers: HeaderMap,
    payload: Result<Json<Map<String, Value>>, JsonRejection>,
) -> Reply {
    let mut svc = db.write().await;
    let username = svc.session(&headers)?;
    let mut definition = body(payload)?;
    let (node_id, proxy_name) = validate_definition(&definition)?;
    if svc
        .tunnels
        .values()
        .any(|t| t.owner == username && t.proxy_name == proxy_name)
    {
        return Err(fail(400, "proxyName already exists"));
    }
    definition.remove("proxyId");
    svc.next_proxy_id += 1;
    let proxy_id = svc.next_proxy_id;
    svc.tunnels.insert(
        proxy_id,
        StoredTunnel {
            owner: username.clone(),
            node_id,
            proxy_name,
            disabled: false,
            definition,
        },
    );
    svc.log(&username, "proxy_create");
    ok(json!({ "proxyId": proxy_id }))
}

async fn update_tunnel(
    State(db): State<Db>,
    headers: HeaderMap,
    payload: Result<Json<Map<String, Value>>, JsonRejection>,
) -> Reply {
    let mut svc = db.write().await;
    let username = svc.session(&headers)?;
    let mut definition = body(payload)?;
    let proxy_id = definition
        .remove("proxyId")
        .and_then(|v| v.as_i64())
        .ok_or_else(|| fail(400, "proxyId required"))?;
    let (node_id, proxy_name) = validate_definition(&definition)?;
    let tunnel = svc.owned_tunnel(&username, proxy_id)?;
    tunnel.node_id = node_id;
    tunnel.proxy_name = proxy_name;
    tunnel.definition = definition;
    svc.log(&username, "proxy_update");
    ok_empty()
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProxyIdInput {
    proxy_id: i64,
}

async fn delete_tunnel(
    State(db): State<Db>,
    headers: HeaderMap,
    payload: Result<Json<ProxyIdInput>, JsonRejection>,
) -> Reply {
    let mut svc = db.write().await;
    let username = svc.session(&headers)?;
    let input = body(payload)?;
    svc.owned_tunnel(&username, input.proxy_id)?;
    svc.tunnels.remove(&input.proxy_id);
    svc.log(&username, "proxy_delete");
    ok_empty()
}

async fn kick_tunnel(
    State(db): State<Db>,
    headers: HeaderMap,
    payload: Result<Json<ProxyIdInput>, JsonRejection>,
) -> Reply {
    let mut svc = db.write().await;
    let username = svc.session(&headers)?;
    let input = body(payload)?;
    svc.owned_tunnel(&username, input.proxy_id)?;
    svc.log(&username, "proxy_kick");
    ok_empty()
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ToggleInput {
    proxy_id: i64,
    is_disabled: bool,
}

async fn toggle_tunnel(
    State(db): State<Db>,
    headers: HeaderMap,
    payload: Result<Json<ToggleInput>, JsonRejection>,
) -> Reply {
    let mut svc = db.write().await;
    let username = svc.session(&headers)?;
    let input = body(payload)?;
    svc.owned_tunnel(&username, input.proxy_id)?.disabled = input.is_disabled;
    svc.log(&username, "proxy_toggle");
    ok_empty()
}

fn render_config(format: &str, tunnels: &[(i64, &StoredTunnel)]) -> Result<String, Json<Envelope>> {
    let mut out = String::new();
    for (id, t) in tunnels {
        let local_port = t.definition.get("localPort").cloned().unwrap_or(Value::Null);
        match format {
            "toml" => out.push_str(&format!(
                "[[proxies]]\nname = \"{}\"\nlocalPort = {local_port}\n# proxyId {id}\n",
                t.proxy_name
            )),
            "ini" => out.push_str(&format!("[{}]\nlocal_port = {local_port}\n; proxyId {id}\n", t.proxy_name)),
            _ => return Err(fail(400, "unsupported format")),
        }
    }
    Ok(out)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigInput {
    proxy_id: i64,
    format: String,
}

async fn tunnel_config(
    State(db): State<Db>,
    headers: HeaderMap,
    payload: Result<Json<ConfigInput>, JsonRejection>,
) -> Reply {
    let mut svc = db.write().await;
    let username = svc.session(&headers)?;
    let input = body(payload)?;
    let tunnel = svc.owned_tunnel(&username, input.proxy_id)?.clone();
    let config = render_config(&input.format, &[(input.proxy_id, &tunnel)])?;
    ok(json!({ "config": config, "format": input.format }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigsInput {
    proxy_ids: Vec<i64>,
    format: String,
}

async fn tunnel_configs(
    State(db): State<Db>,
    headers: HeaderMap,
    payload: Result<Json<ConfigsInput>, JsonRejection>,
) -> Reply {
    let mut svc = db.write().await;
    let username = svc.session(&headers)?;
    let input = body(payload)?;
    let mut tunnels = Vec::with_capacity(input.proxy_ids.len());
    for id in &input.proxy_ids {
        tunnels.push((*id, svc.owned_tunnel(&username, *id)?.clone()));
    }
    let refs: Vec<(i64, &StoredTunnel)> = tunnels.iter().map(|(id, t)| (*id, t)).collect();
    let config = render_config(&input.format, &refs)?;
    ok(json!({ "config": config, "format": input.format }))
}

// ---------------------------------------------------------------------------
// Contract breakers
// ---------------------------------------------------------------------------

async fn html_page() -> impl IntoResponse {
    (
        StatusCode::BAD_GATEWAY,
        [(header::CONTENT_TYPE, "text/html")],
        "<html><body>502 Bad Gateway</body></html>",
    )
}

/// Envelope-shaped bytes whose message is not UTF-8.
async fn invalid_utf8() -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        &b"{\"code\":200,\"message\":\"\xff\xfe\"}"[..],
    )
}

async fn status_mismatch() -> impl IntoResponse {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "code": 200, "message": "ok", "data": { "users": 0 } })),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_omits_missing_data() {
        let env = fail(403, "forbidden").0;
        assert_eq!(serde_json::to_value(&env).unwrap(), json!({"code": 403, "message": "forbidden"}));
    }

    #[test]
    fn envelope_accepts_missing_data() {
        let env: Envelope = serde_json::from_str(r#"{"code":200,"message":"ok"}"#).unwrap();
        assert_eq!(env.data, None);
    }

    #[test]
    fn captcha_must_not_be_blank() {
        assert!(require_captcha(" ").is_err());
        assert!(require_captcha("tok").is_ok());
    }

    #[test]
    fn definition_requires_known_node_and_name() {
        let def: Map<String, Value> = serde_json::from_value(json!({"nodeId": 1, "proxyName": "web"})).unwrap();
        assert_eq!(validate_definition(&def).unwrap(), (1, "web".to_string()));

        let def: Map<String, Value> = serde_json::from_value(json!({"nodeId": 99, "proxyName": "web"})).unwrap();
        assert_eq!(validate_definition(&def).unwrap_err().0.code, 404);

        let def: Map<String, Value> = serde_json::from_value(json!({"nodeId": 1})).unwrap();
        assert_eq!(validate_definition(&def).unwrap_err().0.code, 400);
    }

    #[test]
    fn config_rejects_unknown_format() {
        let tunnel = StoredTunnel {
            owner: "alice".to_string(),
            node_id: 1,
            proxy_name: "web".to_string(),
            disabled: false,
            definition: Map::new(),
        };
        assert!(render_config("ini", &[(1, &tunnel)]).unwrap().starts_with("[web]"));
        assert_eq!(render_config("xml", &[(1, &tunnel)]).unwrap_err().0.code, 400);
    }
}

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::StatusCode;
use reqwest::header::SET_COOKIE;
use serde_json::json;

use posthub_infra::AppConfig;

// "posthub-test-secret-0123456789" base64-encoded.
const SECRET: &str = "cG9zdGh1Yi10ZXN0LXNlY3JldC0wMTIzNDU2Nzg5";

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same router as prod, in-memory storage, ephemeral port.
        let config = AppConfig {
            database_url: None,
            token_secret: SECRET.to_string(),
            token_validity: Duration::hours(1),
            bind_addr: "127.0.0.1:0".to_string(),
        };
        let app = posthub_api::app::build_app(config).await.expect("failed to build app");
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn cookie_value(res: &reqwest::Response, name: &str) -> Option<String> {
    res.headers().get_all(SET_COOKIE).iter().find_map(|header| {
        let raw = header.to_str().ok()?;
        let (pair, _) = raw.split_once(';')?;
        let (key, value) = pair.split_once('=')?;
        (key == name).then(|| value.to_string())
    })
}

async fn register(client: &reqwest::Client, base_url: &str, username: &str, email: &str) {
    let res = client
        .post(format!("{base_url}/auth/register"))
        .json(&json!({
            "username": username,
            "email": email,
            "password": "Strong/Pass9",
            "confirm_password": "Strong/Pass9",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    // Registration establishes a session straight away.
    assert!(cookie_value(&res, "ACCESS_TOKEN").is_some_and(|c| !c.is_empty()));
    assert!(cookie_value(&res, "REFRESH_TOKEN").is_some_and(|c| !c.is_empty()));
}

async fn login(
    client: &reqwest::Client,
    base_url: &str,
    email: &str,
    password: &str,
) -> reqwest::Response {
    client
        .post(format!("{base_url}/auth/login"))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn health_is_public() {
    let srv = TestServer::spawn().await;
    let res = reqwest::get(format!("{}/health", srv.base_url)).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn auth_required_for_protected_endpoints() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client.get(format!("{}/whoami", srv.base_url)).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn register_login_whoami_round_trip() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    register(&client, &srv.base_url, "alice", "alice@x.com").await;

    let res = login(&client, &srv.base_url, "alice@x.com", "Strong/Pass9").await;
    assert_eq!(res.status(), StatusCode::OK);

    let access = cookie_value(&res, "ACCESS_TOKEN").expect("access cookie missing");
    let refresh = cookie_value(&res, "REFRESH_TOKEN").expect("refresh cookie missing");
    assert_eq!(refresh.len(), 32);

    let profile: serde_json::Value = res.json().await.unwrap();
    assert_eq!(profile["username"], "alice");
    assert_eq!(profile["roles"], json!(["USER"]));
    // The body carries the same session pair for header-based clients.
    assert_eq!(profile["token"], json!(access));
    assert_eq!(profile["refresh_token"], json!(refresh));

    let res = client
        .get(format!("{}/whoami", srv.base_url))
        .bearer_auth(profile["token"].as_str().unwrap())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let who: serde_json::Value = res.json().await.unwrap();
    assert_eq!(who["email"], "alice@x.com");
}

#[tokio::test]
async fn access_cookie_also_authenticates() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    register(&client, &srv.base_url, "alice", "alice@x.com").await;
    let res = login(&client, &srv.base_url, "alice@x.com", "Strong/Pass9").await;
    let access = cookie_value(&res, "ACCESS_TOKEN").unwrap();

    let res = client
        .get(format!("{}/whoami", srv.base_url))
        .header("Cookie", format!("ACCESS_TOKEN={access}"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn duplicate_registration_conflicts() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    register(&client, &srv.base_url, "alice", "alice@x.com").await;

    let res = client
        .post(format!("{}/auth/register", srv.base_url))
        .json(&json!({
            "username": "alice",
            "email": "other@x.com",
            "password": "Strong/Pass9",
            "confirm_password": "Strong/Pass9",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["message"], "Username: alice already exists");
}

#[tokio::test]
async fn weak_password_is_a_bad_request() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/auth/register", srv.base_url))
        .json(&json!({
            "username": "bob",
            "email": "bob@x.com",
            "password": "weak",
            "confirm_password": "weak",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn login_failures_share_status_and_message() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    register(&client, &srv.base_url, "alice", "alice@x.com").await;

    let unknown = login(&client, &srv.base_url, "ghost@x.com", "Strong/Pass9").await;
    let wrong = login(&client, &srv.base_url, "alice@x.com", "Wrong/Pass99").await;
    assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);

    let unknown_body: serde_json::Value = unknown.json().await.unwrap();
    let wrong_body: serde_json::Value = wrong.json().await.unwrap();
    assert_eq!(unknown_body, wrong_body);
}

#[tokio::test]
async fn forged_token_is_rejected() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let forged = jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &json!({
            "sub": "alice@x.com",
            "user_id": 1,
            "username": "alice",
            "email": "alice@x.com",
            "registration_status": "ACTIVE",
            "roles": ["SUPER_ADMIN"],
            "last_update": Utc::now().to_rfc3339(),
            "iat": Utc::now().timestamp(),
            "exp": (Utc::now() + Duration::hours(1)).timestamp(),
        }),
        &EncodingKey::from_secret(b"wrong-secret"),
    )
    .unwrap();

    let res = client
        .get(format!("{}/whoami", srv.base_url))
        .bearer_auth(forged)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn refresh_rotates_cookies_and_burns_the_old_handle() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    register(&client, &srv.base_url, "alice", "alice@x.com").await;
    let res = login(&client, &srv.base_url, "alice@x.com", "Strong/Pass9").await;
    let refresh = cookie_value(&res, "REFRESH_TOKEN").unwrap();

    // The refresh cookie alone redeems the session; a garbage access cookie
    // is simply ignored.
    let res = client
        .post(format!("{}/auth/refresh/token", srv.base_url))
        .header("Cookie", format!("ACCESS_TOKEN=not-a-jwt; REFRESH_TOKEN={refresh}"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(cookie_value(&res, "ACCESS_TOKEN").is_some_and(|c| !c.is_empty()));
    let new_refresh = cookie_value(&res, "REFRESH_TOKEN").unwrap();
    assert_ne!(new_refresh, refresh);

    // Replaying the consumed handle fails.
    let res = client
        .post(format!("{}/auth/refresh/token", srv.base_url))
        .header("Cookie", format!("REFRESH_TOKEN={refresh}"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    // The replacement works without any access token at all.
    let res = client
        .post(format!("{}/auth/refresh/token", srv.base_url))
        .header("Cookie", format!("REFRESH_TOKEN={new_refresh}"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn refresh_without_cookies_is_unauthorized() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res =
        client.post(format!("{}/auth/refresh/token", srv.base_url)).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn owner_changes_password_but_not_a_strangers() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    register(&client, &srv.base_url, "alice", "alice@x.com").await;
    register(&client, &srv.base_url, "bob", "bob@x.com").await;

    let res = login(&client, &srv.base_url, "alice@x.com", "Strong/Pass9").await;
    let access = cookie_value(&res, "ACCESS_TOKEN").unwrap();
    let profile: serde_json::Value = res.json().await.unwrap();
    let alice_id = profile["user_id"].as_i64().unwrap();
    let change_body = json!({
        "new_password": "Fresh/Pass77",
        "confirm_password": "Fresh/Pass77",
    });

    // Changing a foreign password is forbidden for a plain user.
    let res = client
        .put(format!("{}/users/{}/password", srv.base_url, alice_id + 1))
        .bearer_auth(&access)
        .json(&change_body)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // Changing one's own succeeds.
    let res = client
        .put(format!("{}/users/{}/password", srv.base_url, alice_id))
        .bearer_auth(&access)
        .json(&change_body)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    assert_eq!(
        login(&client, &srv.base_url, "alice@x.com", "Strong/Pass9").await.status(),
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(
        login(&client, &srv.base_url, "alice@x.com", "Fresh/Pass77").await.status(),
        StatusCode::OK
    );
}

#[tokio::test]
async fn logout_clears_cookies_and_revokes_refresh() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    register(&client, &srv.base_url, "alice", "alice@x.com").await;
    let res = login(&client, &srv.base_url, "alice@x.com", "Strong/Pass9").await;
    let access = cookie_value(&res, "ACCESS_TOKEN").unwrap();
    let refresh = cookie_value(&res, "REFRESH_TOKEN").unwrap();

    let res = client
        .post(format!("{}/auth/logout", srv.base_url))
        .bearer_auth(&access)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    assert_eq!(cookie_value(&res, "ACCESS_TOKEN").as_deref(), Some(""));
    assert_eq!(cookie_value(&res, "REFRESH_TOKEN").as_deref(), Some(""));

    let res = client
        .post(format!("{}/auth/refresh/token", srv.base_url))
        .header("Cookie", format!("REFRESH_TOKEN={refresh}"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

use std::sync::Arc;

use gradebook_api::adapter;
use gradebook_api::state::AppState;
use gradebook_core::AppConfig;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::StatusCode;
use serde_json::json;

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same app wiring as prod, bound to an ephemeral port. No database
        // is running; every endpoint below fails before touching one.
        let mut config = AppConfig::from_env();
        config.web_domain = "http://frontend.test".to_string();
        config.oauth_authority = "https://idp.test/tenant".to_string();
        let state = Arc::new(AppState::new(config));

        let app = adapter::build_app(state);
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

fn client() -> reqwest::Client {
    // Redirects stay visible so 302s can be asserted on.
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}

fn mint_token(expires_in_secs: i64) -> String {
    let exp = chrono::Utc::now().timestamp() + expires_in_secs;
    let claims = json!({
        "oid": "subject-1",
        "email": "student@example.com",
        "preferred_username": "student",
        "exp": exp,
    });
    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(b"test-secret"),
    )
    .expect("failed to encode jwt")
}

#[tokio::test]
async fn root_answers_hello_on_get_and_echoes_on_post() {
    let srv = TestServer::spawn().await;
    let client = client();

    let res = client.get(&srv.base_url).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["message"], "Hello, from GET");

    let res = client
        .post(&srv.base_url)
        .json(&json!({"ping": "pong"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["message"], "Hello, from POST");
    assert_eq!(body["POSTED"]["ping"], "pong");
}

#[tokio::test]
async fn unknown_routes_are_not_found_with_an_error_key() {
    let srv = TestServer::spawn().await;

    let res = client()
        .get(format!("{}/nothing-here", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Route not found");
}

#[tokio::test]
async fn paths_deeper_than_two_segments_are_not_found() {
    let srv = TestServer::spawn().await;

    let res = client()
        .get(format!("{}/course/get-course/extra", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn course_endpoints_require_the_token_cookie() {
    let srv = TestServer::spawn().await;

    let res = client()
        .get(format!("{}/course/get-all-courses", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "No access token given, not logged in");
}

#[tokio::test]
async fn user_data_without_cookie_is_ok_with_a_message() {
    let srv = TestServer::spawn().await;

    let res = client()
        .get(format!("{}/user/get-user-data", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["message"], "Not logged in");
    assert!(body.get("error").is_none());
}

#[tokio::test]
async fn expired_tokens_are_unauthorized() {
    let srv = TestServer::spawn().await;

    let res = client()
        .get(format!("{}/course/get-all-courses", srv.base_url))
        .header("Cookie", format!("accessToken={}", mint_token(-300)))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_redirects_to_the_identity_provider() {
    let srv = TestServer::spawn().await;

    let res = client()
        .get(format!("{}/auth/login", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FOUND);
    let location = res.headers().get("location").unwrap().to_str().unwrap();
    assert!(location.starts_with("https://idp.test/tenant/oauth2/v2.0/authorize?"));
    assert!(location.contains("response_type=code"));
}

#[tokio::test]
async fn logout_clears_the_cookie_and_redirects_home() {
    let srv = TestServer::spawn().await;

    let res = client()
        .get(format!("{}/auth/logout", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(
        res.headers().get("location").unwrap().to_str().unwrap(),
        "http://frontend.test"
    );
    let set_cookie = res.headers().get("set-cookie").unwrap().to_str().unwrap();
    assert_eq!(set_cookie, "accessToken=; Max-Age=0; Path=/; HttpOnly");
}

#[tokio::test]
async fn login_callback_without_code_is_bad_request() {
    let srv = TestServer::spawn().await;

    let res = client()
        .get(format!("{}/auth/loginCallback", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Missing code parameter");
}

#[tokio::test]
async fn body_validation_runs_before_persistence() {
    let srv = TestServer::spawn().await;

    let res = client()
        .post(format!("{}/course/add-course", srv.base_url))
        .header("Cookie", format!("accessToken={}", mint_token(3600)))
        .json(&json!({"creditHours": 4}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Missing courseName parameter");
}

#[tokio::test]
async fn text_bodies_fall_back_to_a_message_field() {
    let srv = TestServer::spawn().await;

    let res = client()
        .post(&srv.base_url)
        .body("plain text, not json")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["POSTED"]["message"], "plain text, not json");
}

use std::sync::Arc;

use axum::{middleware, routing::get, Extension, Json, Router};
use serde_json::json;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::{
    handler::{
        applications::applications_handler, auth::auth_handler, escrow::escrow_handler,
        gigs::gigs_handler, mining::mining_handler, users::users_handler,
        wallet::wallet_handler,
    },
    middleware::auth,
    AppState,
};

async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "message": "Server is running"
    }))
}

pub fn create_router(app_state: Arc<AppState>) -> Router {
    let api_route = Router::new()
        .nest("/auth", auth_handler())
        .nest("/users", users_handler().layer(middleware::from_fn(auth)))
        .nest("/gigs", gigs_handler())
        .nest(
            "/applications",
            applications_handler().layer(middleware::from_fn(auth)),
        )
        .nest("/escrow", escrow_handler().layer(middleware::from_fn(auth)))
        .nest("/wallet", wallet_handler().layer(middleware::from_fn(auth)))
        .nest("/mining", mining_handler().layer(middleware::from_fn(auth)))
        .layer(TraceLayer::new_for_http())
        .layer(Extension(app_state.clone()));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_route)
        .nest_service("/storage", ServeDir::new(&app_state.env.storage_dir))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        response::Response,
    };
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde_json::Value;
    use tower::ServiceExt;
    use uuid::Uuid;
    use web3::signing::{Key, SecretKey, SecretKeyRef};

    use crate::{
        config::Config,
        db::{memdb::MemStore, ProfileExt, Store},
        models::profilemodel::Profile,
        utils::{token, wallet::hash_message},
    };

    struct TestApp {
        router: Router,
        store: Arc<MemStore>,
        storage_dir: std::path::PathBuf,
    }

    impl TestApp {
        fn new() -> Self {
            let storage_dir = std::env::temp_dir().join(format!("gigmine-http-{}", Uuid::new_v4()));
            let store = Arc::new(MemStore::new());
            let db: Arc<dyn Store> = store.clone();
            let config = Config::for_tests(&storage_dir.to_string_lossy());
            let router = create_router(Arc::new(AppState::new(db, config)));
            Self {
                router,
                store,
                storage_dir,
            }
        }

        async fn user(&self, name: &str) -> (Profile, String) {
            let profile = self.store.create_profile(None, name, 100).await.unwrap();
            let token = token::create_token(&profile.id.to_string(), b"test-secret", 60).unwrap();
            (profile, token)
        }

        async fn call(
            &self,
            method: &str,
            uri: &str,
            token: Option<&str>,
            body: Option<Value>,
        ) -> (StatusCode, Value) {
            let response = self.send(method, uri, token, body).await;
            let status = response.status();
            let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            let json = if bytes.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&bytes).unwrap_or(Value::Null)
            };
            (status, json)
        }

        async fn send(
            &self,
            method: &str,
            uri: &str,
            token: Option<&str>,
            body: Option<Value>,
        ) -> Response {
            let mut builder = Request::builder().method(method).uri(uri);
            if let Some(token) = token {
                builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
            }
            let request = match body {
                Some(body) => builder
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
                None => builder.body(Body::empty()).unwrap(),
            };
            self.router.clone().oneshot(request).await.unwrap()
        }
    }

    impl Drop for TestApp {
        fn drop(&mut self) {
            let _ = std::fs::remove_dir_all(&self.storage_dir);
        }
    }

    fn landing_page() -> Value {
        json!({
            "title": "Build a landing page",
            "description": "One responsive page",
            "category": "Web Development",
            "credits": 100
        })
    }

    #[tokio::test]
    async fn health_and_public_listing() {
        let app = TestApp::new();

        let (status, body) = app.call("GET", "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");

        let (status, body) = app.call("GET", "/api/gigs", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["results"], 0);
    }

    #[tokio::test]
    async fn protected_routes_need_a_valid_token() {
        let app = TestApp::new();

        let (status, body) = app.call("POST", "/api/gigs", None, Some(landing_page())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["status"], "fail");

        let (status, _) = app.call("GET", "/api/users/me", Some("garbage"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        // a well-signed token for a profile that does not exist
        let ghost = token::create_token(&Uuid::new_v4().to_string(), b"test-secret", 60).unwrap();
        let (status, _) = app.call("GET", "/api/users/me", Some(&ghost), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn gig_validation_is_a_bad_request() {
        let app = TestApp::new();
        let (_alice, token) = app.user("alice").await;

        let mut cheap = landing_page();
        cheap["credits"] = json!(10);
        let (status, _) = app.call("POST", "/api/gigs", Some(&token), Some(cheap)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let mut unknown = landing_page();
        unknown["category"] = json!("Plumbing");
        let (status, _) = app.call("POST", "/api/gigs", Some(&token), Some(unknown)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, body) = app.call("GET", "/api/gigs", None, None).await;
        assert_eq!(body["data"]["results"], 0);
    }

    #[tokio::test]
    async fn blank_listing_filters_are_ignored() {
        let app = TestApp::new();
        let (_alice, token) = app.user("alice").await;
        app.call("POST", "/api/gigs", Some(&token), Some(landing_page()))
            .await;

        let (status, body) = app
            .call("GET", "/api/gigs?search=&category=", None, None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["results"], 1);

        let (status, body) = app
            .call("GET", "/api/gigs?category=Plumbing", None, None)
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], "fail");

        let (status, body) = app.call("GET", "/api/auth/nonce", None, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], "fail");
    }

    #[tokio::test]
    async fn full_gig_workflow_over_http() {
        let app = TestApp::new();
        let (alice, alice_token) = app.user("alice").await;
        let (bob, bob_token) = app.user("bob").await;
        let (_carol, carol_token) = app.user("carol").await;

        let (status, body) = app
            .call("POST", "/api/gigs", Some(&alice_token), Some(landing_page()))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "open");
        assert_eq!(body["data"]["category"], "Web Development");
        let gig_id = body["data"]["id"].as_str().unwrap().to_string();

        let (_, body) = app
            .call("GET", "/api/gigs?search=LANDING&category=Web%20Development", None, None)
            .await;
        assert_eq!(body["data"]["results"], 1);
        assert_eq!(body["data"]["gigs"][0]["creator_username"], "alice");

        let (status, body) = app
            .call(
                "POST",
                &format!("/api/gigs/{}/apply", gig_id),
                Some(&bob_token),
                Some(json!({ "cover_letter": "I can do this" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "pending");
        let bob_application = body["data"]["id"].as_str().unwrap().to_string();

        let (status, _) = app
            .call("POST", &format!("/api/gigs/{}/quick-apply", gig_id), Some(&bob_token), None)
            .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, body) = app
            .call("POST", &format!("/api/gigs/{}/quick-apply", gig_id), Some(&carol_token), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        let carol_application = body["data"]["id"].as_str().unwrap().to_string();

        // only the owner sees the applications
        let (status, _) = app
            .call("GET", &format!("/api/gigs/{}/applications", gig_id), Some(&bob_token), None)
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        let (_, body) = app
            .call("GET", &format!("/api/gigs/{}/applications", gig_id), Some(&alice_token), None)
            .await;
        assert_eq!(body["data"]["results"], 2);

        let (_, body) = app
            .call("GET", &format!("/api/gigs/{}", gig_id), Some(&bob_token), None)
            .await;
        assert_eq!(body["data"]["is_owner"], false);
        assert_eq!(body["data"]["application_count"], 2);
        assert_eq!(body["data"]["my_application_status"], "pending");

        let accept_uri = format!(
            "/api/gigs/{}/applications/{}/accept",
            gig_id, bob_application
        );
        let (status, _) = app.call("PUT", &accept_uri, Some(&bob_token), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = app.call("PUT", &accept_uri, Some(&alice_token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["gig"]["status"], "assigned");
        assert_eq!(body["data"]["gig"]["assigned_to"], bob.id.to_string());
        assert_eq!(body["data"]["application"]["status"], "accepted");
        assert_eq!(body["data"]["rejected_application_ids"][0], carol_application);

        let second = format!(
            "/api/gigs/{}/applications/{}/accept",
            gig_id, carol_application
        );
        let (status, _) = app.call("PUT", &second, Some(&alice_token), None).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (_, body) = app
            .call("GET", &format!("/api/gigs/{}/application", gig_id), Some(&carol_token), None)
            .await;
        assert_eq!(body["data"]["status"], "rejected");

        // assigned gigs leave the public listing
        let (_, body) = app.call("GET", "/api/gigs", None, None).await;
        assert_eq!(body["data"]["results"], 0);

        let (_, body) = app.call("GET", "/api/gigs/mine", Some(&alice_token), None).await;
        assert_eq!(body["data"][0]["id"], gig_id);

        let (_, body) = app
            .call("GET", "/api/users/me/dashboard", Some(&alice_token), None)
            .await;
        assert_eq!(body["data"]["posted_gigs"].as_array().unwrap().len(), 1);
        assert_eq!(body["data"]["credits"], alice.credits);
    }

    #[tokio::test]
    async fn reject_over_http() {
        let app = TestApp::new();
        let (_alice, alice_token) = app.user("alice").await;
        let (_bob, bob_token) = app.user("bob").await;

        let (_, body) = app
            .call("POST", "/api/gigs", Some(&alice_token), Some(landing_page()))
            .await;
        let gig_id = body["data"]["id"].as_str().unwrap().to_string();
        let (_, body) = app
            .call("POST", &format!("/api/gigs/{}/quick-apply", gig_id), Some(&bob_token), None)
            .await;
        let application_id = body["data"]["id"].as_str().unwrap().to_string();

        let reject_uri = format!("/api/applications/{}/reject", application_id);
        let (status, _) = app.call("PUT", &reject_uri, Some(&bob_token), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = app.call("PUT", &reject_uri, Some(&alice_token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "rejected");

        let (status, _) = app.call("PUT", &reject_uri, Some(&alice_token), None).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (_, body) = app.call("GET", "/api/gigs", None, None).await;
        assert_eq!(body["data"]["gigs"][0]["status"], "open");

        let (_, body) = app.call("GET", "/api/applications/mine", Some(&bob_token), None).await;
        assert_eq!(body["data"][0]["status"], "rejected");
    }

    #[tokio::test]
    async fn escrow_over_http() {
        let app = TestApp::new();
        let (_alice, alice_token) = app.user("alice").await;
        let (_bob, bob_token) = app.user("bob").await;

        let (_, body) = app
            .call("POST", "/api/gigs", Some(&alice_token), Some(landing_page()))
            .await;
        let gig_id = body["data"]["id"].clone();

        let (status, _) = app
            .call(
                "POST",
                "/api/escrow",
                Some(&alice_token),
                Some(json!({ "gig_id": gig_id, "amount": 0 })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = app
            .call(
                "POST",
                "/api/escrow",
                Some(&alice_token),
                Some(json!({ "gig_id": gig_id, "amount": 100 })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "pending");
        let escrow_id = body["data"]["id"].as_str().unwrap().to_string();

        let release = format!("/api/escrow/{}/release", escrow_id);
        let (status, _) = app.call("PUT", &release, Some(&bob_token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = app.call("PUT", &release, Some(&alice_token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "released");

        let (status, _) = app.call("PUT", &release, Some(&alice_token), None).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (_, body) = app.call("GET", "/api/escrow/mine", Some(&alice_token), None).await;
        assert_eq!(body["data"]["results"], 1);
    }

    #[tokio::test]
    async fn wallet_sign_in_sets_the_session_cookie() {
        let app = TestApp::new();
        let key = SecretKey::from_slice(&[0x31; 32]).unwrap();
        let address = format!("0x{}", hex::encode(SecretKeyRef::new(&key).address().as_bytes()));

        let (status, _) = app.call("GET", "/api/auth/nonce?address=0x1234", None, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = app
            .call("GET", &format!("/api/auth/nonce?address={}", address), None, None)
            .await;
        assert_eq!(status, StatusCode::OK);
        let message = body["data"]["message"].as_str().unwrap().to_string();

        let signature = SecretKeyRef::new(&key)
            .sign_message(&hash_message(&message))
            .unwrap();
        let mut bytes = signature.r.as_bytes().to_vec();
        bytes.extend_from_slice(signature.s.as_bytes());
        bytes.push(signature.v as u8 + 27);
        let signature = format!("0x{}", hex::encode(bytes));

        let response = app
            .send(
                "POST",
                "/api/auth/wallet",
                None,
                Some(json!({ "address": address, "signature": signature })),
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(cookie.starts_with("token="));
        assert!(cookie.contains("HttpOnly"));
        let token = cookie
            .trim_start_matches("token=")
            .split(';')
            .next()
            .unwrap()
            .to_string();

        let request = Request::builder()
            .uri("/api/users/me")
            .header(header::COOKIE, format!("token={}", token))
            .body(Body::empty())
            .unwrap();
        let response = app.router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["data"]["address"], address);
        assert_eq!(body["data"]["credits"], 100);
        assert_eq!(body["data"]["username"], format!("user_{}", &address[2..8]));

        // replaying the same signature fails
        let (status, _) = app
            .call(
                "POST",
                "/api/auth/wallet",
                None,
                Some(json!({ "address": address, "signature": signature })),
            )
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = app.call("GET", "/api/wallet/balance", Some(&token), None).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

        let response = app.send("POST", "/api/auth/logout", None, None).await;
        let cleared = response.headers().get(header::SET_COOKIE).unwrap().to_str().unwrap();
        assert!(cleared.starts_with("token=;"));
    }

    #[tokio::test]
    async fn profile_edit_and_uploads() {
        let app = TestApp::new();
        let (alice, token) = app.user("alice").await;

        let (status, body) = app
            .call(
                "PUT",
                "/api/users/me",
                Some(&token),
                Some(json!({
                    "bio": "Full-stack",
                    "skills": ["Rust", "React", "Rust"],
                    "education": [{ "degree": "BSc", "institution": "UNILAG", "year": "2021" }],
                    "links": { "github": "https://github.com/alice" }
                })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["skills"], json!(["Rust", "React"]));
        assert_eq!(body["data"]["links"][0]["platform"], "github");

        let png = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];
        let (status, body) = app
            .call(
                "POST",
                "/api/users/me/avatar",
                Some(&token),
                Some(json!({ "data": format!("data:image/png;base64,{}", STANDARD.encode(png)) })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        let avatar_url = body["data"]["avatar_url"].as_str().unwrap().to_string();
        assert!(avatar_url.starts_with("http://localhost:8000/storage/avatars/"));

        // the stored file is served back
        let path = avatar_url.trim_start_matches("http://localhost:8000");
        let response = app.send("GET", path, None, None).await;
        assert_eq!(response.status(), StatusCode::OK);

        let (status, _) = app
            .call(
                "POST",
                "/api/users/me/resume",
                Some(&token),
                Some(json!({ "data": STANDARD.encode(png) })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = app
            .call("GET", &format!("/api/users/{}", alice.id), Some(&token), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["bio"], "Full-stack");
        assert_eq!(body["data"]["avatar_url"], avatar_url);
    }

    #[tokio::test]
    async fn mining_over_http() {
        let app = TestApp::new();
        let (_me, token) = app.user("miner").await;

        let (status, body) = app.call("POST", "/api/mining/start", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["active"], true);

        let (status, _) = app.call("POST", "/api/mining/start", Some(&token), None).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, _) = app.call("POST", "/api/mining/claim", Some(&token), None).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (_, body) = app.call("GET", "/api/mining/status", Some(&token), None).await;
        assert_eq!(body["data"]["reward_credits"], 25);

        let (status, _) = app.call("POST", "/api/mining/stop", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = app.call("POST", "/api/mining/stop", Some(&token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}

use std::sync::Arc;

use atelier_core::{CanvasService, Error, IdentityVerifier, VerifiedIdentity};
use atelier_store::SqliteStore;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use mockall::mock;
use serde_json::{json, Value};
use tower::ServiceExt;

mock! {
    pub Verifier {}

    #[async_trait::async_trait]
    impl IdentityVerifier for Verifier {
        async fn verify(&self, token: &str) -> atelier_core::Result<VerifiedIdentity>;
    }
}

const ALICE: &str = "alice-token";
const BOB: &str = "bob-token";

fn verifier() -> MockVerifier {
    let mut verifier = MockVerifier::new();
    verifier.expect_verify().returning(|token| match token {
        ALICE => Ok(VerifiedIdentity {
            subject: "sub-alice".to_string(),
            email: "alice@example.com".to_string(),
        }),
        BOB => Ok(VerifiedIdentity {
            subject: "sub-bob".to_string(),
            email: "bob@example.com".to_string(),
        }),
        _ => Err(Error::unauthenticated("Invalid or expired token")),
    });
    verifier
}

async fn test_app() -> Router {
    let store = SqliteStore::in_memory().await.expect("in-memory store");
    let service = Arc::new(CanvasService::new(Arc::new(store)));
    let verifier: Arc<dyn IdentityVerifier> = Arc::new(verifier());
    super::app(service, verifier)
}

async fn send_raw(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<String>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body)),
        None => builder.body(Body::empty()),
    }
    .expect("request");

    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, json)
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    send_raw(app, method, uri, token, body.map(|b| b.to_string())).await
}

/// Sync both test users and return the app
async fn synced_app() -> Router {
    let app = test_app().await;
    for token in [ALICE, BOB] {
        let (status, _) = send(&app, "POST", "/api/auth/sync", Some(token), None).await;
        assert_eq!(status, StatusCode::OK);
    }
    app
}

async fn create_file(app: &Router, token: &str, name: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/files",
        Some(token),
        Some(json!({"name": name, "file_type": "canvas"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["data"]["id"].as_str().unwrap().to_string()
}

mod envelope {
    use super::*;

    #[tokio::test]
    async fn test_health_needs_no_token() {
        let app = test_app().await;
        let (status, body) = send(&app, "GET", "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn test_unknown_route_is_enveloped_404() {
        let app = test_app().await;
        let (status, body) = send(&app, "GET", "/api/nowhere", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "not_found");
    }

    #[tokio::test]
    async fn test_malformed_json_is_validation() {
        let app = synced_app().await;
        let (status, body) = send_raw(
            &app,
            "POST",
            "/api/files",
            Some(ALICE),
            Some("{not json".to_string()),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "validation_failed");
    }

    #[tokio::test]
    async fn test_malformed_path_id_is_validation() {
        let app = synced_app().await;
        let (status, body) = send(&app, "GET", "/api/files/not-a-uuid", Some(ALICE), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "validation_failed");
    }

    #[tokio::test]
    async fn test_field_issues_are_reported() {
        let app = synced_app().await;
        let (status, body) = send(
            &app,
            "POST",
            "/api/files",
            Some(ALICE),
            Some(json!({"name": "   ", "file_type": "canvas"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["details"][0]["field"], "name");
    }
}

mod auth {
    use super::*;

    #[tokio::test]
    async fn test_missing_token_is_401() {
        let app = test_app().await;
        let (status, body) = send(&app, "GET", "/api/files", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "unauthenticated");
    }

    #[tokio::test]
    async fn test_bad_token_is_401() {
        let app = test_app().await;
        let (status, _) = send(&app, "GET", "/api/auth/me", Some("forged"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_unsynced_user_is_401() {
        let app = test_app().await;
        let (status, body) = send(&app, "GET", "/api/files", Some(ALICE), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "User not found. Please sync first");
    }

    #[tokio::test]
    async fn test_sync_with_profile_then_me() {
        let app = test_app().await;
        let (status, body) = send(
            &app,
            "POST",
            "/api/auth/sync",
            Some(ALICE),
            Some(json!({"displayName": "Alice"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["display_name"], "Alice");

        let (status, body) = send(&app, "GET", "/api/auth/me", Some(ALICE), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["email"], "alice@example.com");
        assert_eq!(body["data"]["display_name"], "Alice");
    }
}

mod files {
    use super::*;

    #[tokio::test]
    async fn test_create_get_update() {
        let app = synced_app().await;
        let id = create_file(&app, ALICE, "Moodboard").await;

        let uri = format!("/api/files/{id}");
        let (status, body) = send(&app, "GET", &uri, Some(ALICE), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["name"], "Moodboard");

        let (status, body) = send(
            &app,
            "PATCH",
            &uri,
            Some(ALICE),
            Some(json!({"name": "Board"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["name"], "Board");
        assert_eq!(body["data"]["file_type"], "canvas");

        let (status, _) = send(&app, "PATCH", &uri, Some(ALICE), Some(json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_strangers_see_not_found() {
        let app = synced_app().await;
        let id = create_file(&app, ALICE, "Private").await;
        let (status, _) = send(&app, "GET", &format!("/api/files/{id}"), Some(BOB), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_views_and_sorts() {
        let app = synced_app().await;
        create_file(&app, ALICE, "beta").await;
        create_file(&app, ALICE, "Alpha").await;

        let (status, body) = send(
            &app,
            "GET",
            "/api/files?view=bogus-value",
            Some(ALICE),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "validation_failed");

        let (status, body) = send(
            &app,
            "GET",
            "/api/files?sort=bogus-value",
            Some(ALICE),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"].as_array().unwrap().len(), 2);

        let (_, body) = send(
            &app,
            "GET",
            "/api/files?view=my-files&sort=name-asc",
            Some(ALICE),
            None,
        )
        .await;
        let names: Vec<&str> = body["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|f| f["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["Alpha", "beta"]);
    }

    #[tokio::test]
    async fn test_trash_restore_purge() {
        let app = synced_app().await;
        let id = create_file(&app, ALICE, "Doomed").await;
        let uri = format!("/api/files/{id}");

        let (status, _) = send(&app, "POST", &format!("{uri}/restore"), Some(ALICE), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = send(&app, "DELETE", &uri, Some(ALICE), None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["data"]["deleted_at"].is_string());

        let (status, _) = send(&app, "GET", &uri, Some(ALICE), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, body) = send(&app, "GET", "/api/files?view=trash", Some(ALICE), None).await;
        assert_eq!(body["data"][0]["id"], id.as_str());

        let (status, _) = send(&app, "POST", &format!("{uri}/restore"), Some(ALICE), None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = send(&app, "DELETE", &uri, Some(ALICE), None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(
            &app,
            "DELETE",
            &format!("{uri}/permanent"),
            Some(ALICE),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["id"], id.as_str());

        let (status, _) = send(&app, "POST", &format!("{uri}/restore"), Some(ALICE), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}

mod collaborators {
    use super::*;

    #[tokio::test]
    async fn test_share_by_email() {
        let app = synced_app().await;
        let id = create_file(&app, ALICE, "Shared board").await;
        let uri = format!("/api/files/{id}/collaborators");

        let (status, body) = send(
            &app,
            "POST",
            &uri,
            Some(ALICE),
            Some(json!({"email": "BOB@example.com"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let bob_id = body["data"]["id"].as_str().unwrap().to_string();

        let (status, _) = send(&app, "GET", &format!("/api/files/{id}"), Some(BOB), None).await;
        assert_eq!(status, StatusCode::OK);

        let (_, body) = send(&app, "GET", "/api/files?view=shared", Some(BOB), None).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
        let (_, body) = send(&app, "GET", "/api/files?view=shared", Some(ALICE), None).await;
        assert!(body["data"].as_array().unwrap().is_empty());

        let (status, _) = send(
            &app,
            "PATCH",
            &format!("/api/files/{id}"),
            Some(BOB),
            Some(json!({"name": "mine"})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&app, "DELETE", &format!("{uri}/{bob_id}"), Some(ALICE), None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = send(&app, "GET", &format!("/api/files/{id}"), Some(BOB), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_cannot_add_owner_or_unknown() {
        let app = synced_app().await;
        let id = create_file(&app, ALICE, "Solo").await;
        let uri = format!("/api/files/{id}/collaborators");

        let (status, _) = send(
            &app,
            "POST",
            &uri,
            Some(ALICE),
            Some(json!({"email": "alice@example.com"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(
            &app,
            "POST",
            &uri,
            Some(ALICE),
            Some(json!({"email": "nobody@example.com"})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}

mod assets_and_elements {
    use super::*;

    #[tokio::test]
    async fn test_asset_library() {
        let app = synced_app().await;
        let id = create_file(&app, ALICE, "Library").await;

        let (status, body) = send(
            &app,
            "POST",
            "/api/assets",
            Some(ALICE),
            Some(json!({
                "file_id": id,
                "name": "logo.png",
                "file_type": "image/png",
                "storage_url": "https://cdn.example.com/logo.png"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let asset_id = body["data"]["id"].as_str().unwrap().to_string();

        let (status, body) = send(
            &app,
            "GET",
            &format!("/api/assets?fileId={id}"),
            Some(ALICE),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"].as_array().unwrap().len(), 1);

        let (status, _) = send(&app, "GET", "/api/assets", Some(ALICE), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(
            &app,
            "GET",
            &format!("/api/assets/{asset_id}"),
            Some(BOB),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = send(
            &app,
            "DELETE",
            &format!("/api/assets/{asset_id}"),
            Some(ALICE),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["id"], asset_id.as_str());
    }

    #[tokio::test]
    async fn test_elements_in_render_order() {
        let app = synced_app().await;
        let id = create_file(&app, ALICE, "Sketch").await;

        for (index, x) in [(2, 20.0), (1, 10.0)] {
            let (status, body) = send(
                &app,
                "POST",
                "/api/elements",
                Some(ALICE),
                Some(json!({
                    "file_id": id,
                    "type": "rectangle",
                    "sort_index": index,
                    "props": {"x": x, "y": 0.0, "width": 5.0, "height": 5.0}
                })),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
            assert_eq!(body["data"]["type"], "rectangle");
        }

        let (status, body) = send(
            &app,
            "GET",
            &format!("/api/elements?fileId={id}"),
            Some(ALICE),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let order: Vec<i64> = body["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["sort_index"].as_i64().unwrap())
            .collect();
        assert_eq!(order, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_element_props_are_checked() {
        let app = synced_app().await;
        let id = create_file(&app, ALICE, "Sketch").await;

        let (status, body) = send(
            &app,
            "POST",
            "/api/elements",
            Some(ALICE),
            Some(json!({
                "file_id": id,
                "type": "line",
                "sort_index": 0,
                "props": {"points": [0.0, 1.0]}
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["details"][0]["field"], "props.points");
    }
}

mod jwt {
    use super::*;
    use atelier_core::{JwtSettings, JwtVerifier};
    use jsonwebtoken::{encode, EncodingKey, Header};

    const SECRET: &str = "integration-secret";

    async fn jwt_app() -> Router {
        let store = SqliteStore::in_memory().await.unwrap();
        let service = Arc::new(CanvasService::new(Arc::new(store)));
        let settings = JwtSettings {
            secret: Some(SECRET.to_string()),
            ..Default::default()
        };
        let verifier: Arc<dyn IdentityVerifier> =
            Arc::new(JwtVerifier::from_settings(&settings).unwrap());
        super::super::app(service, verifier)
    }

    fn token(secret: &str) -> String {
        let claims = json!({
            "sub": "firebase-uid-1",
            "email": "carol@example.com",
            "exp": chrono::Utc::now().timestamp() + 600,
        });
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_signed_token_syncs_user() {
        let app = jwt_app().await;
        let (status, body) = send(&app, "POST", "/api/auth/sync", Some(&token(SECRET)), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["subject"], "firebase-uid-1");
        assert_eq!(body["data"]["email"], "carol@example.com");
    }

    #[tokio::test]
    async fn test_foreign_signature_is_rejected() {
        let app = jwt_app().await;
        let (status, body) = send(
            &app,
            "POST",
            "/api/auth/sync",
            Some(&token("other")),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Invalid or expired token");
    }
}

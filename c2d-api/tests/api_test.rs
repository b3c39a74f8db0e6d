use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};
use rust_decimal::Decimal;
use tower::ServiceExt;
use uuid::Uuid;

use c2d_api::{
    app,
    middleware::auth::Claims,
    state::{AppState, AuthConfig},
};
use c2d_core::payment::PaymentGateway;
use c2d_core::profile::{Profile, ProfileRole};
use c2d_core::repository::OrderRepository;
use c2d_core::program::Program;
use c2d_payments::{MockGateway, PaymentOrchestrator};
use c2d_store::InMemoryStore;

const TEST_SECRET: &str = "test-jwt-secret";

struct TestApp {
    router: axum::Router,
    store: Arc<InMemoryStore>,
    program_id: Uuid,
}

async fn test_app() -> TestApp {
    let store = Arc::new(InMemoryStore::new());

    let program = Program {
        id: Uuid::new_v4(),
        slug: "rust-bootcamp".to_string(),
        title: "Rust Bootcamp".to_string(),
        description: Some("Twelve weeks of systems programming".to_string()),
        price: Decimal::new(4999, 2),
        currency: "USD".to_string(),
        instructor_name: Some("Ada".to_string()),
        created_at: Utc::now(),
    };
    let profile = Profile {
        id: Uuid::new_v4(),
        subject: "idp|learner-1".to_string(),
        email: "learner@example.com".to_string(),
        full_name: Some("Learner One".to_string()),
        role: ProfileRole::Student,
        created_at: Utc::now(),
    };
    store.seed_program(program.clone()).await;
    store.seed_profile(profile).await;

    let gateway: Arc<dyn PaymentGateway> = Arc::new(MockGateway::new());
    let orchestrator = Arc::new(PaymentOrchestrator::new(
        store.clone(),
        store.clone(),
        store.clone(),
        store.clone(),
        gateway.clone(),
        gateway,
    ));

    let state = AppState {
        programs: store.clone(),
        profiles: store.clone(),
        orders: store.clone(),
        enrollments: store.clone(),
        orchestrator,
        auth: AuthConfig {
            secret: TEST_SECRET.to_string(),
        },
    };

    TestApp {
        router: app(state),
        store,
        program_id: program.id,
    }
}

fn bearer_token(subject: &str) -> String {
    let claims = Claims {
        sub: subject.to_string(),
        email: Some("learner@example.com".to_string()),
        exp: (Utc::now().timestamp() + 3600) as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn intent_request(token: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/v1/payments/intents")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn webhook_request(reference: &str, outcome: &str) -> Request<Body> {
    let body = serde_json::json!({ "reference": reference, "outcome": outcome });
    Request::builder()
        .method("POST")
        .uri("/v1/payments/webhooks/stripe")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_programs_are_public() {
    let app = test_app().await;

    let response = app
        .router
        .oneshot(
            Request::builder()
                .uri("/v1/programs")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json.as_array().unwrap().len(), 1);
    assert_eq!(json[0]["title"], "Rust Bootcamp");
}

#[tokio::test]
async fn test_intent_requires_bearer_token() {
    let app = test_app().await;

    let response = app
        .router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/payments/intents")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    serde_json::json!({ "program_id": app.program_id, "gateway": "stripe" })
                        .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_intent_creates_order_and_returns_redirect() {
    let app = test_app().await;
    let token = bearer_token("idp|learner-1");

    let response = app
        .router
        .clone()
        .oneshot(intent_request(
            &token,
            serde_json::json!({ "program_id": app.program_id, "gateway": "stripe" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(json["redirect_url"].as_str().unwrap().starts_with("https://pay.mock/"));

    // The payer can see the pending order with the exact minor amount.
    let response = app
        .router
        .oneshot(
            Request::builder()
                .uri("/v1/orders")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let orders = body_json(response).await;
    assert_eq!(orders.as_array().unwrap().len(), 1);
    assert_eq!(orders[0]["status"], "PENDING");
    assert_eq!(orders[0]["amount_minor"], 4999);
}

#[tokio::test]
async fn test_intent_for_unknown_program_is_404_and_persists_nothing() {
    let app = test_app().await;
    let token = bearer_token("idp|learner-1");

    let response = app
        .router
        .oneshot(intent_request(
            &token,
            serde_json::json!({ "program_id": Uuid::new_v4(), "gateway": "paystack" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(app.store.order_count().await, 0);
}

#[tokio::test]
async fn test_intent_with_unsupported_gateway_is_rejected() {
    let app = test_app().await;
    let token = bearer_token("idp|learner-1");

    let response = app
        .router
        .oneshot(intent_request(
            &token,
            serde_json::json!({ "program_id": app.program_id, "gateway": "mpesa" }),
        ))
        .await
        .unwrap();

    assert!(response.status().is_client_error());
    assert_eq!(app.store.order_count().await, 0);
}

#[tokio::test]
async fn test_webhook_fulfills_order_and_activates_enrollment() {
    let app = test_app().await;
    let token = bearer_token("idp|learner-1");

    let response = app
        .router
        .clone()
        .oneshot(intent_request(
            &token,
            serde_json::json!({ "program_id": app.program_id, "gateway": "stripe" }),
        ))
        .await
        .unwrap();
    let order_id: Uuid = body_json(response).await["order_id"]
        .as_str()
        .unwrap()
        .parse()
        .unwrap();
    let reference = app
        .store
        .get_order(order_id)
        .await
        .unwrap()
        .unwrap()
        .reference;

    let response = app
        .router
        .clone()
        .oneshot(webhook_request(&reference, "success"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "fulfilled");

    // Replay is acknowledged without a second fulfillment.
    let response = app
        .router
        .clone()
        .oneshot(webhook_request(&reference, "success"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "already_processed");

    let response = app
        .router
        .oneshot(
            Request::builder()
                .uri("/v1/enrollments")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let enrollments = body_json(response).await;
    assert_eq!(enrollments.as_array().unwrap().len(), 1);
    assert_eq!(enrollments[0]["status"], "ACTIVE");
}

#[tokio::test]
async fn test_webhook_with_unknown_reference_is_404() {
    let app = test_app().await;

    let response = app
        .router
        .oneshot(webhook_request("c2d_never_issued", "success"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_order_of_another_payer_reads_as_not_found() {
    let app = test_app().await;
    let token = bearer_token("idp|learner-1");

    let response = app
        .router
        .clone()
        .oneshot(intent_request(
            &token,
            serde_json::json!({ "program_id": app.program_id, "gateway": "stripe" }),
        ))
        .await
        .unwrap();
    let order_id = body_json(response).await["order_id"]
        .as_str()
        .unwrap()
        .to_string();

    let stranger = Profile {
        id: Uuid::new_v4(),
        subject: "idp|stranger".to_string(),
        email: "stranger@example.com".to_string(),
        full_name: None,
        role: ProfileRole::Student,
        created_at: Utc::now(),
    };
    app.store.seed_profile(stranger).await;
    let stranger_token = bearer_token("idp|stranger");

    let response = app
        .router
        .oneshot(
            Request::builder()
                .uri(format!("/v1/orders/{}", order_id))
                .header(header::AUTHORIZATION, format!("Bearer {}", stranger_token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

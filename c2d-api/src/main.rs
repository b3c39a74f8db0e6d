use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use c2d_api::{
    app,
    state::{AppState, AuthConfig},
};
use c2d_core::payment::PaymentGateway;
use c2d_payments::{PaymentOrchestrator, PaystackGateway, StripeGateway};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "c2d_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = c2d_store::app_config::Config::load().expect("Failed to load config");
    tracing::info!("Starting C2D API on port {}", config.server.port);

    let db = c2d_store::DbClient::new(&config.database.url)
        .await
        .expect("Failed to connect to Postgres");
    db.migrate().await.expect("Failed to run migrations");

    let programs = Arc::new(c2d_store::PgProgramRepository::new(db.pool.clone()));
    let profiles = Arc::new(c2d_store::PgProfileRepository::new(db.pool.clone()));
    let orders = Arc::new(c2d_store::PgOrderRepository::new(db.pool.clone()));
    let enrollments = Arc::new(c2d_store::PgEnrollmentRepository::new(db.pool.clone()));

    // One HTTP client shared by both gateways; the timeout bounds every
    // outbound session-creation call.
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.payments.request_timeout_seconds))
        .build()
        .expect("Failed to build HTTP client");

    let stripe: Arc<dyn PaymentGateway> = Arc::new(StripeGateway::new(
        http.clone(),
        config.payments.stripe.secret_key.clone(),
        config.payments.stripe.webhook_secret.clone(),
        config.payments.success_url.clone(),
        config.payments.cancel_url.clone(),
    ));
    let paystack: Arc<dyn PaymentGateway> = Arc::new(PaystackGateway::new(
        http,
        config.payments.paystack.secret_key.clone(),
        config.payments.callback_url.clone(),
    ));

    let orchestrator = Arc::new(PaymentOrchestrator::new(
        programs.clone(),
        profiles.clone(),
        orders.clone(),
        enrollments.clone(),
        stripe,
        paystack,
    ));

    let app_state = AppState {
        programs,
        profiles,
        orders,
        enrollments,
        orchestrator,
        auth: AuthConfig {
            secret: config.auth.jwt_secret.clone(),
        },
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}

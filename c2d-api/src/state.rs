use std::sync::Arc;

use c2d_core::repository::{
    EnrollmentRepository, OrderRepository, ProfileRepository, ProgramRepository,
};
use c2d_payments::PaymentOrchestrator;

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
}

#[derive(Clone)]
pub struct AppState {
    pub programs: Arc<dyn ProgramRepository>,
    pub profiles: Arc<dyn ProfileRepository>,
    pub orders: Arc<dyn OrderRepository>,
    pub enrollments: Arc<dyn EnrollmentRepository>,
    pub orchestrator: Arc<PaymentOrchestrator>,
    pub auth: AuthConfig,
}

use async_trait::async_trait;
use uuid::Uuid;

use crate::enrollment::Enrollment;
use crate::order::{Gateway, Order, OrderStatus};
use crate::profile::Profile;
use crate::program::Program;
use crate::CoreResult;

/// Repository trait for program data access
#[async_trait]
pub trait ProgramRepository: Send + Sync {
    async fn get_program(&self, id: Uuid) -> CoreResult<Option<Program>>;

    async fn list_programs(&self) -> CoreResult<Vec<Program>>;
}

/// Repository trait for profile data access
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn get_profile(&self, id: Uuid) -> CoreResult<Option<Profile>>;

    async fn find_by_subject(&self, subject: &str) -> CoreResult<Option<Profile>>;
}

/// Repository trait for order data access
#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn create_order(&self, order: &Order) -> CoreResult<()>;

    async fn get_order(&self, id: Uuid) -> CoreResult<Option<Order>>;

    async fn find_by_reference(&self, reference: &str) -> CoreResult<Option<Order>>;

    /// Attach the gateway-assigned session id once the session exists.
    async fn record_session(&self, id: Uuid, session_id: &str) -> CoreResult<()>;

    /// Atomic compare-and-set: move the order matching `reference` and
    /// `gateway` from PENDING to `to`, setting `fulfilled_at` when `to` is
    /// FULFILLED. Returns the updated order iff the transition applied;
    /// `None` means no PENDING order carries that reference on that gateway
    /// (missing or already terminal, the caller disambiguates).
    async fn transition_from_pending(
        &self,
        reference: &str,
        gateway: Gateway,
        to: OrderStatus,
    ) -> CoreResult<Option<Order>>;

    /// Move a PENDING order to EXPIRED by id. No-op when the order is
    /// already terminal.
    async fn expire_pending(&self, id: Uuid) -> CoreResult<()>;

    async fn list_orders(&self, profile_id: Uuid) -> CoreResult<Vec<Order>>;
}

/// Repository trait for enrollment data access
#[async_trait]
pub trait EnrollmentRepository: Send + Sync {
    /// Create or activate the enrollment for this payer/program pair.
    /// Upsert keyed on (profile_id, program_id): replays cannot create a
    /// second row.
    async fn activate(&self, profile_id: Uuid, program_id: Uuid) -> CoreResult<Enrollment>;

    async fn list_enrollments(&self, profile_id: Uuid) -> CoreResult<Vec<Enrollment>>;
}

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use c2d_core::enrollment::{Enrollment, EnrollmentStatus};
use c2d_core::order::{Gateway, Order, OrderStatus};
use c2d_core::profile::Profile;
use c2d_core::program::Program;
use c2d_core::repository::{
    EnrollmentRepository, OrderRepository, ProfileRepository, ProgramRepository,
};
use c2d_core::CoreResult;

/// All four repositories over process memory. Used by tests and by local
/// development without a Postgres instance. The single order mutex gives
/// the same at-most-one-transition guarantee the SQL conditional update
/// provides.
#[derive(Default)]
pub struct InMemoryStore {
    programs: RwLock<HashMap<Uuid, Program>>,
    profiles: RwLock<HashMap<Uuid, Profile>>,
    orders: Mutex<HashMap<Uuid, Order>>,
    enrollments: Mutex<HashMap<(Uuid, Uuid), Enrollment>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn seed_program(&self, program: Program) {
        self.programs.write().await.insert(program.id, program);
    }

    pub async fn seed_profile(&self, profile: Profile) {
        self.profiles.write().await.insert(profile.id, profile);
    }

    pub async fn order_count(&self) -> usize {
        self.orders.lock().await.len()
    }
}

#[async_trait]
impl ProgramRepository for InMemoryStore {
    async fn get_program(&self, id: Uuid) -> CoreResult<Option<Program>> {
        Ok(self.programs.read().await.get(&id).cloned())
    }

    async fn list_programs(&self) -> CoreResult<Vec<Program>> {
        let mut programs: Vec<Program> = self.programs.read().await.values().cloned().collect();
        programs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(programs)
    }
}

#[async_trait]
impl ProfileRepository for InMemoryStore {
    async fn get_profile(&self, id: Uuid) -> CoreResult<Option<Profile>> {
        Ok(self.profiles.read().await.get(&id).cloned())
    }

    async fn find_by_subject(&self, subject: &str) -> CoreResult<Option<Profile>> {
        Ok(self
            .profiles
            .read()
            .await
            .values()
            .find(|p| p.subject == subject)
            .cloned())
    }
}

#[async_trait]
impl OrderRepository for InMemoryStore {
    async fn create_order(&self, order: &Order) -> CoreResult<()> {
        self.orders.lock().await.insert(order.id, order.clone());
        Ok(())
    }

    async fn get_order(&self, id: Uuid) -> CoreResult<Option<Order>> {
        Ok(self.orders.lock().await.get(&id).cloned())
    }

    async fn find_by_reference(&self, reference: &str) -> CoreResult<Option<Order>> {
        Ok(self
            .orders
            .lock()
            .await
            .values()
            .find(|o| o.reference == reference)
            .cloned())
    }

    async fn record_session(&self, id: Uuid, session_id: &str) -> CoreResult<()> {
        if let Some(order) = self.orders.lock().await.get_mut(&id) {
            order.session_id = Some(session_id.to_string());
        }
        Ok(())
    }

    async fn transition_from_pending(
        &self,
        reference: &str,
        gateway: Gateway,
        to: OrderStatus,
    ) -> CoreResult<Option<Order>> {
        let mut orders = self.orders.lock().await;
        let order = orders.values_mut().find(|o| {
            o.reference == reference && o.gateway == gateway && o.status == OrderStatus::Pending
        });
        Ok(order.map(|order| {
            order.status = to;
            if to == OrderStatus::Fulfilled {
                order.fulfilled_at = Some(Utc::now());
            }
            order.clone()
        }))
    }

    async fn expire_pending(&self, id: Uuid) -> CoreResult<()> {
        if let Some(order) = self.orders.lock().await.get_mut(&id) {
            if order.status == OrderStatus::Pending {
                order.status = OrderStatus::Expired;
            }
        }
        Ok(())
    }

    async fn list_orders(&self, profile_id: Uuid) -> CoreResult<Vec<Order>> {
        let mut orders: Vec<Order> = self
            .orders
            .lock()
            .await
            .values()
            .filter(|o| o.profile_id == profile_id)
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }
}

#[async_trait]
impl EnrollmentRepository for InMemoryStore {
    async fn activate(&self, profile_id: Uuid, program_id: Uuid) -> CoreResult<Enrollment> {
        let mut enrollments = self.enrollments.lock().await;
        let entry = enrollments
            .entry((profile_id, program_id))
            .or_insert_with(|| Enrollment {
                id: Uuid::new_v4(),
                profile_id,
                program_id,
                status: EnrollmentStatus::Pending,
                activated_at: None,
                created_at: Utc::now(),
            });
        entry.status = EnrollmentStatus::Active;
        if entry.activated_at.is_none() {
            entry.activated_at = Some(Utc::now());
        }
        Ok(entry.clone())
    }

    async fn list_enrollments(&self, profile_id: Uuid) -> CoreResult<Vec<Enrollment>> {
        let mut enrollments: Vec<Enrollment> = self
            .enrollments
            .lock()
            .await
            .values()
            .filter(|e| e.profile_id == profile_id)
            .cloned()
            .collect();
        enrollments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(enrollments)
    }
}

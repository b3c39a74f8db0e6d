use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use c2d_core::order::{Gateway, Order, OrderStatus};
use c2d_core::repository::OrderRepository;
use c2d_core::{CoreError, CoreResult};

use crate::program_repo::storage_err;

pub struct PgOrderRepository {
    pool: PgPool,
}

impl PgOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    program_id: Uuid,
    profile_id: Uuid,
    gateway: String,
    reference: String,
    session_id: Option<String>,
    amount_minor: i64,
    currency: String,
    status: String,
    created_at: DateTime<Utc>,
    fulfilled_at: Option<DateTime<Utc>>,
}

impl TryFrom<OrderRow> for Order {
    type Error = CoreError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        Ok(Order {
            id: row.id,
            program_id: row.program_id,
            profile_id: row.profile_id,
            gateway: row
                .gateway
                .parse()
                .map_err(|_| CoreError::Storage(format!("Unknown gateway in storage: {}", row.gateway)))?,
            reference: row.reference,
            session_id: row.session_id,
            amount_minor: row.amount_minor,
            currency: row.currency,
            status: row.status.parse()?,
            created_at: row.created_at,
            fulfilled_at: row.fulfilled_at,
        })
    }
}

const COLUMNS: &str = "id, program_id, profile_id, gateway, reference, session_id, \
                       amount_minor, currency, status, created_at, fulfilled_at";

#[async_trait]
impl OrderRepository for PgOrderRepository {
    async fn create_order(&self, order: &Order) -> CoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO orders (id, program_id, profile_id, gateway, reference, session_id,
                                amount_minor, currency, status, created_at, fulfilled_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(order.id)
        .bind(order.program_id)
        .bind(order.profile_id)
        .bind(order.gateway.as_str())
        .bind(&order.reference)
        .bind(&order.session_id)
        .bind(order.amount_minor)
        .bind(&order.currency)
        .bind(order.status.as_str())
        .bind(order.created_at)
        .bind(order.fulfilled_at)
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;
        Ok(())
    }

    async fn get_order(&self, id: Uuid) -> CoreResult<Option<Order>> {
        let row: Option<OrderRow> =
            sqlx::query_as(&format!("SELECT {} FROM orders WHERE id = $1", COLUMNS))
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(storage_err)?;

        row.map(Order::try_from).transpose()
    }

    async fn find_by_reference(&self, reference: &str) -> CoreResult<Option<Order>> {
        let row: Option<OrderRow> = sqlx::query_as(&format!(
            "SELECT {} FROM orders WHERE reference = $1",
            COLUMNS
        ))
        .bind(reference)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_err)?;

        row.map(Order::try_from).transpose()
    }

    async fn record_session(&self, id: Uuid, session_id: &str) -> CoreResult<()> {
        sqlx::query("UPDATE orders SET session_id = $2 WHERE id = $1")
            .bind(id)
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(storage_err)?;
        Ok(())
    }

    async fn transition_from_pending(
        &self,
        reference: &str,
        gateway: Gateway,
        to: OrderStatus,
    ) -> CoreResult<Option<Order>> {
        // The WHERE clause is the whole concurrency story: only one
        // delivery can move the row out of PENDING, and only the gateway
        // the order was opened with can do it.
        let row: Option<OrderRow> = sqlx::query_as(&format!(
            r#"
            UPDATE orders
            SET status = $2,
                fulfilled_at = CASE WHEN $2 = 'FULFILLED' THEN NOW() ELSE fulfilled_at END
            WHERE reference = $1 AND gateway = $3 AND status = 'PENDING'
            RETURNING {}
            "#,
            COLUMNS
        ))
        .bind(reference)
        .bind(to.as_str())
        .bind(gateway.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_err)?;

        row.map(Order::try_from).transpose()
    }

    async fn expire_pending(&self, id: Uuid) -> CoreResult<()> {
        sqlx::query("UPDATE orders SET status = 'EXPIRED' WHERE id = $1 AND status = 'PENDING'")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(storage_err)?;
        Ok(())
    }

    async fn list_orders(&self, profile_id: Uuid) -> CoreResult<Vec<Order>> {
        let rows: Vec<OrderRow> = sqlx::query_as(&format!(
            "SELECT {} FROM orders WHERE profile_id = $1 ORDER BY created_at DESC",
            COLUMNS
        ))
        .bind(profile_id)
        .fetch_all(&self.pool)
        .await
        .map_err(storage_err)?;

        rows.into_iter().map(Order::try_from).collect()
    }
}

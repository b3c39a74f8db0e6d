use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use c2d_core::enrollment::Enrollment;
use c2d_core::repository::EnrollmentRepository;
use c2d_core::{CoreError, CoreResult};

use crate::program_repo::storage_err;

pub struct PgEnrollmentRepository {
    pool: PgPool,
}

impl PgEnrollmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct EnrollmentRow {
    id: Uuid,
    profile_id: Uuid,
    program_id: Uuid,
    status: String,
    activated_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl TryFrom<EnrollmentRow> for Enrollment {
    type Error = CoreError;

    fn try_from(row: EnrollmentRow) -> Result<Self, Self::Error> {
        Ok(Enrollment {
            id: row.id,
            profile_id: row.profile_id,
            program_id: row.program_id,
            status: row.status.parse()?,
            activated_at: row.activated_at,
            created_at: row.created_at,
        })
    }
}

const COLUMNS: &str = "id, profile_id, program_id, status, activated_at, created_at";

#[async_trait]
impl EnrollmentRepository for PgEnrollmentRepository {
    async fn activate(&self, profile_id: Uuid, program_id: Uuid) -> CoreResult<Enrollment> {
        // Upsert keyed on the (profile, program) pair: a replayed
        // fulfillment re-activates instead of inserting a second row.
        let row: EnrollmentRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO enrollments (id, profile_id, program_id, status, activated_at)
            VALUES ($1, $2, $3, 'ACTIVE', NOW())
            ON CONFLICT (profile_id, program_id)
            DO UPDATE SET status = 'ACTIVE',
                          activated_at = COALESCE(enrollments.activated_at, NOW())
            RETURNING {}
            "#,
            COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(profile_id)
        .bind(program_id)
        .fetch_one(&self.pool)
        .await
        .map_err(storage_err)?;

        Enrollment::try_from(row)
    }

    async fn list_enrollments(&self, profile_id: Uuid) -> CoreResult<Vec<Enrollment>> {
        let rows: Vec<EnrollmentRow> = sqlx::query_as(&format!(
            "SELECT {} FROM enrollments WHERE profile_id = $1 ORDER BY created_at DESC",
            COLUMNS
        ))
        .bind(profile_id)
        .fetch_all(&self.pool)
        .await
        .map_err(storage_err)?;

        rows.into_iter().map(Enrollment::try_from).collect()
    }
}

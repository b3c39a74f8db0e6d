use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use c2d_core::profile::{Profile, ProfileRole};
use c2d_core::repository::ProfileRepository;
use c2d_core::{CoreError, CoreResult};

use crate::program_repo::storage_err;

pub struct PgProfileRepository {
    pool: PgPool,
}

impl PgProfileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ProfileRow {
    id: Uuid,
    subject: String,
    email: String,
    full_name: Option<String>,
    role: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<ProfileRow> for Profile {
    type Error = CoreError;

    fn try_from(row: ProfileRow) -> Result<Self, Self::Error> {
        let role = match row.role.as_str() {
            "STUDENT" => ProfileRole::Student,
            "MENTOR" => ProfileRole::Mentor,
            "ADMIN" => ProfileRole::Admin,
            other => {
                return Err(CoreError::Storage(format!(
                    "Unknown profile role in storage: {}",
                    other
                )))
            }
        };
        Ok(Profile {
            id: row.id,
            subject: row.subject,
            email: row.email,
            full_name: row.full_name,
            role,
            created_at: row.created_at,
        })
    }
}

const COLUMNS: &str = "id, subject, email, full_name, role, created_at";

#[async_trait]
impl ProfileRepository for PgProfileRepository {
    async fn get_profile(&self, id: Uuid) -> CoreResult<Option<Profile>> {
        let row: Option<ProfileRow> = sqlx::query_as(&format!(
            "SELECT {} FROM profiles WHERE id = $1",
            COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_err)?;

        row.map(Profile::try_from).transpose()
    }

    async fn find_by_subject(&self, subject: &str) -> CoreResult<Option<Profile>> {
        let row: Option<ProfileRow> = sqlx::query_as(&format!(
            "SELECT {} FROM profiles WHERE subject = $1",
            COLUMNS
        ))
        .bind(subject)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_err)?;

        row.map(Profile::try_from).transpose()
    }
}

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use c2d_core::program::Program;
use c2d_core::repository::ProgramRepository;
use c2d_core::{CoreError, CoreResult};

pub struct PgProgramRepository {
    pool: PgPool,
}

impl PgProgramRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ProgramRow {
    id: Uuid,
    slug: String,
    title: String,
    description: Option<String>,
    price: Decimal,
    currency: String,
    instructor_name: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<ProgramRow> for Program {
    fn from(row: ProgramRow) -> Self {
        Program {
            id: row.id,
            slug: row.slug,
            title: row.title,
            description: row.description,
            price: row.price,
            currency: row.currency,
            instructor_name: row.instructor_name,
            created_at: row.created_at,
        }
    }
}

const COLUMNS: &str = "id, slug, title, description, price, currency, instructor_name, created_at";

#[async_trait]
impl ProgramRepository for PgProgramRepository {
    async fn get_program(&self, id: Uuid) -> CoreResult<Option<Program>> {
        let row: Option<ProgramRow> = sqlx::query_as(&format!(
            "SELECT {} FROM programs WHERE id = $1",
            COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_err)?;

        Ok(row.map(Program::from))
    }

    async fn list_programs(&self) -> CoreResult<Vec<Program>> {
        let rows: Vec<ProgramRow> = sqlx::query_as(&format!(
            "SELECT {} FROM programs ORDER BY created_at DESC",
            COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(storage_err)?;

        Ok(rows.into_iter().map(Program::from).collect())
    }
}

pub(crate) fn storage_err(e: sqlx::Error) -> CoreError {
    CoreError::Storage(e.to_string())
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EnrollmentStatus {
    Pending,
    Active,
    Completed,
}

impl EnrollmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnrollmentStatus::Pending => "PENDING",
            EnrollmentStatus::Active => "ACTIVE",
            EnrollmentStatus::Completed => "COMPLETED",
        }
    }
}

impl std::str::FromStr for EnrollmentStatus {
    type Err = crate::CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(EnrollmentStatus::Pending),
            "ACTIVE" => Ok(EnrollmentStatus::Active),
            "COMPLETED" => Ok(EnrollmentStatus::Completed),
            other => Err(crate::CoreError::Storage(format!(
                "Unknown enrollment status in storage: {}",
                other
            ))),
        }
    }
}

/// A payer's membership in a program. Activated as a side effect of order
/// fulfillment; unique per (profile, program) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enrollment {
    pub id: Uuid,
    pub profile_id: Uuid,
    pub program_id: Uuid,
    pub status: EnrollmentStatus,
    pub activated_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

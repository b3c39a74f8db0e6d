use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProfileRole {
    Student,
    Mentor,
    Admin,
}

/// The payer identity. The identity provider owns authentication; this row
/// mirrors its stable subject id plus the contact details the gateways need.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    /// Stable external id assigned by the identity provider.
    pub subject: String,
    pub email: String,
    pub full_name: Option<String>,
    pub role: ProfileRole,
    pub created_at: DateTime<Utc>,
}

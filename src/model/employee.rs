use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const DEFAULT_REFERENCE_TIME: &str = "09:00";

/// Roster entry as persisted under the `employees` key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(
    example = json!({
        "id": "5f1c8d0e-3a7b-4b1e-9a55-0d8e2c6f4a11",
        "firstName": "Ana",
        "lastName": "Li",
        "position": "Cashier",
        "passwordHash": "03ac674216f3e15c761ee1a5e255f067953623c8b388b4459e13f978d7c846f4",
        "referenceTime": "09:00",
        "photo": null,
        "createdAt": "2024-01-10T07:58:12Z"
    })
)]
pub struct Employee {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub position: String,
    pub password_hash: String,

    /// Zero-padded `HH:MM`, compared as a string against clock-in times.
    #[schema(example = "09:00")]
    pub reference_time: String,

    #[serde(rename = "photo", default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,

    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTime<Utc>,
}

impl Employee {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Fallback label when no photo is set.
    pub fn initials(&self) -> String {
        self.first_name
            .chars()
            .take(1)
            .chain(self.last_name.chars().take(1))
            .collect()
    }
}

/// Employee as shown on the clock-in picker: no credential material.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PublicEmployee {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub position: String,
    pub reference_time: String,
    pub photo_url: Option<String>,
    #[schema(example = "AL")]
    pub initials: String,
}

impl From<&Employee> for PublicEmployee {
    fn from(e: &Employee) -> Self {
        PublicEmployee {
            id: e.id.clone(),
            first_name: e.first_name.clone(),
            last_name: e.last_name.clone(),
            position: e.position.clone(),
            reference_time: e.reference_time.clone(),
            photo_url: e.photo_url.clone(),
            initials: e.initials(),
        }
    }
}

/// Admin form payload for a new roster entry.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct NewEmployee {
    #[schema(example = "Ana")]
    pub first_name: String,
    #[schema(example = "Li")]
    pub last_name: String,
    #[schema(example = "Cashier")]
    pub position: String,
    #[schema(example = "1234")]
    pub password: String,
    #[schema(example = "09:00", nullable = true)]
    pub reference_time: Option<String>,
    #[schema(nullable = true)]
    pub photo_url: Option<String>,
}

/// Admin edit payload. A missing `password` keeps the stored hash.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct EmployeeUpdate {
    pub first_name: String,
    pub last_name: String,
    pub position: String,
    #[schema(nullable = true)]
    pub password: Option<String>,
    #[schema(example = "08:30", nullable = true)]
    pub reference_time: Option<String>,
    #[schema(nullable = true)]
    pub photo_url: Option<String>,
}

use crate::model::role::Role;
use crate::store::{Collection, Record};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

/// Presence state of a user. `In` exactly when `last_check_in` is set.
#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Default, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PresenceStatus {
    #[default]
    Out,
    In,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Location {
    #[schema(example = 9.9312)]
    pub lat: f64,
    #[schema(example = 76.2673)]
    pub lng: f64,
    #[schema(example = "Head Office")]
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[schema(example = "staff01")]
    pub id: String,
    #[schema(example = "Jomit")]
    pub username: String,
    pub name: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub dept: Option<String>,
    #[serde(default)]
    #[schema(example = "2024-01-01", format = "date", value_type = String)]
    pub join_date: Option<NaiveDate>,

    #[serde(default)]
    pub status: PresenceStatus,
    #[serde(default)]
    #[schema(format = "date-time", value_type = String)]
    pub last_check_in: Option<DateTime<Utc>>,
    #[serde(default)]
    pub current_location: Option<Location>,
}

impl User {
    /// A fresh, checked-out user.
    pub fn new(id: impl Into<String>, username: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            name: name.into(),
            role: Role::Staff,
            email: None,
            phone: None,
            dept: None,
            join_date: None,
            status: PresenceStatus::Out,
            last_check_in: None,
            current_location: None,
        }
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    pub fn is_checked_in(&self) -> bool {
        self.status == PresenceStatus::In
    }
}

impl Record for User {
    const COLLECTION: Collection = Collection::Users;

    fn key(&self) -> String {
        self.id.clone()
    }
}

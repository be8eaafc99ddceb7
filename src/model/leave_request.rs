use crate::model::attendance::AttendanceType;
use crate::store::{Collection, Record};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, ToSchema)]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
}

impl LeaveStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, LeaveStatus::Pending)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeaveRequest {
    #[schema(example = "l1717228800000")]
    pub id: String,
    #[schema(example = "staff01")]
    pub user_id: String,
    #[schema(example = "2024-06-01", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2024-06-03", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    #[serde(rename = "type")]
    #[schema(example = "Sick Leave", value_type = String)]
    pub kind: AttendanceType,
    #[serde(default)]
    pub reason: String,
    pub status: LeaveStatus,
    #[schema(example = "2024-05-20T10:00:00Z", format = "date-time", value_type = String)]
    pub applied_on: DateTime<Utc>,
    #[serde(default)]
    pub action_by: Option<String>,
    #[serde(default)]
    #[schema(format = "date-time", value_type = String)]
    pub action_date: Option<DateTime<Utc>>,
}

impl LeaveRequest {
    /// Every calendar day from start to end, inclusive. Empty when the range
    /// is inverted.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.start_date
            .iter_days()
            .take_while(move |d| *d <= self.end_date)
    }
}

impl Record for LeaveRequest {
    const COLLECTION: Collection = Collection::Leaves;

    fn key(&self) -> String {
        self.id.clone()
    }
}

/// Payload of a new leave request.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewLeave {
    #[schema(example = "staff01")]
    pub user_id: String,
    #[schema(example = "2024-06-01", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2024-06-03", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    #[serde(rename = "type")]
    #[schema(example = "Casual Leave", value_type = String)]
    pub kind: AttendanceType,
    #[serde(default)]
    pub reason: String,
}

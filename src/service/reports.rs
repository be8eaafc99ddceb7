use crate::error::AppResult;
use crate::model::attendance::AttendanceRecord;
use crate::model::user::User;
use crate::store::Store;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;
use utoipa::ToSchema;

const MISSING: &str = "--";

/// One attendance record joined with its user, ready for an exporter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportRow {
    #[schema(example = "2024-06-01", format = "date", value_type = String)]
    pub date: NaiveDate,
    pub name: String,
    pub role: String,
    pub check_in: String,
    pub check_out: String,
    pub duration: String,
    pub location: String,
    #[serde(rename = "type")]
    pub kind: String,
}

pub fn build_report(users: &[User], logs: &[AttendanceRecord]) -> Vec<ReportRow> {
    let by_id: HashMap<&str, &User> = users.iter().map(|u| (u.id.as_str(), u)).collect();

    let mut rows: Vec<ReportRow> = logs
        .iter()
        .map(|log| {
            let (name, role) = match by_id.get(log.user_id.as_str()) {
                Some(u) => (u.name.clone(), u.role.to_string()),
                None => ("Unknown".to_string(), "N/A".to_string()),
            };
            let hhmm = |t: Option<chrono::NaiveTime>| {
                t.map(|t| t.format("%H:%M").to_string())
            };

            ReportRow {
                date: log.date,
                name,
                role,
                check_in: hhmm(log.check_in).unwrap_or_default(),
                check_out: hhmm(log.check_out).unwrap_or_else(|| MISSING.to_string()),
                duration: log.duration.clone().unwrap_or_else(|| MISSING.to_string()),
                location: if log.location.is_empty() {
                    "N/A".to_string()
                } else {
                    log.location.clone()
                },
                kind: log.kind.label(),
            }
        })
        .collect();

    rows.sort_by(|a, b| b.date.cmp(&a.date));
    rows
}

#[derive(Clone)]
pub struct Reports {
    store: Store,
}

impl Reports {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub async fn attendance_report(&self) -> AppResult<Vec<ReportRow>> {
        let users: Vec<User> = self.store.get_all().await?;
        let logs: Vec<AttendanceRecord> = self.store.get_all().await?;
        Ok(build_report(&users, &logs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::attendance::{AttendanceId, AttendanceType, PresenceMarker};

    fn log(user: &str, date: NaiveDate) -> AttendanceRecord {
        AttendanceRecord {
            id: AttendanceId::leave(user, date),
            user_id: user.into(),
            date,
            check_in: chrono::NaiveTime::from_hms_opt(9, 30, 0),
            check_out: None,
            duration: None,
            kind: AttendanceType::Office,
            location: "Head Office".into(),
            presence_marker: PresenceMarker::In,
            synced: false,
        }
    }

    #[test]
    fn rows_join_users_and_sort_newest_first() {
        let users = vec![User::new("staff01", "Jomit", "Jomit")];
        let older = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let newer = NaiveDate::from_ymd_opt(2024, 6, 2).unwrap();
        let rows = build_report(&users, &[log("staff01", older), log("ghost", newer)]);

        assert_eq!(rows[0].date, newer);
        assert_eq!(rows[0].name, "Unknown");
        assert_eq!(rows[0].role, "N/A");
        assert_eq!(rows[1].name, "Jomit");
        assert_eq!(rows[1].role, "Staff");
        assert_eq!(rows[1].check_in, "09:30");
        assert_eq!(rows[1].check_out, "--");
        assert_eq!(rows[1].kind, "Office");
    }
}

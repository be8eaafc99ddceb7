use crate::store::{Collection, Record};
use chrono::{NaiveDate, NaiveTime, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use strum_macros::{Display, EnumIter, EnumString};
use utoipa::ToSchema;

/// Day types with a dedicated statistics bucket.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Display, EnumString, EnumIter)]
pub enum ListedType {
    #[strum(serialize = "Work - Home")]
    WorkFromHome,
    Training,
    #[strum(serialize = "Sick Leave")]
    SickLeave,
    #[strum(serialize = "Casual Leave")]
    CasualLeave,
    #[strum(serialize = "Earned Leave")]
    EarnedLeave,
    #[strum(serialize = "Paid Leave")]
    PaidLeave,
    #[strum(serialize = "Maternity Leave")]
    MaternityLeave,
    Absent,
    #[strum(serialize = "National Holiday")]
    NationalHoliday,
    #[strum(serialize = "Regional Holidays")]
    RegionalHolidays,
}

/// `type` of an attendance record or leave request. Anything that is not
/// `Office` or a listed type is kept verbatim.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AttendanceType {
    Office,
    Listed(ListedType),
    Other(String),
}

impl AttendanceType {
    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for AttendanceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttendanceType::Office => f.write_str("Office"),
            AttendanceType::Listed(t) => write!(f, "{}", t),
            AttendanceType::Other(s) => f.write_str(s),
        }
    }
}

impl From<&str> for AttendanceType {
    fn from(s: &str) -> Self {
        if s == "Office" {
            AttendanceType::Office
        } else if let Ok(listed) = ListedType::from_str(s) {
            AttendanceType::Listed(listed)
        } else {
            AttendanceType::Other(s.to_string())
        }
    }
}

impl From<String> for AttendanceType {
    fn from(s: String) -> Self {
        AttendanceType::from(s.as_str())
    }
}

impl From<AttendanceType> for String {
    fn from(t: AttendanceType) -> Self {
        t.to_string()
    }
}

impl From<ListedType> for AttendanceType {
    fn from(t: ListedType) -> Self {
        AttendanceType::Listed(t)
    }
}

/// Key of a leave-derived record. One user-day maps to exactly one id, so a
/// second approval covering the same day replaces the first record.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct LeaveDayKey {
    pub user_id: String,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum AttendanceId {
    /// Work-derived: creation time in epoch milliseconds
    Work(i64),
    /// Leave-derived: `att_{user}_{YYYY-MM-DD}`
    Leave(LeaveDayKey),
}

impl AttendanceId {
    pub fn leave(user_id: impl Into<String>, date: NaiveDate) -> Self {
        AttendanceId::Leave(LeaveDayKey {
            user_id: user_id.into(),
            date,
        })
    }

    pub fn is_leave_derived(&self) -> bool {
        matches!(self, AttendanceId::Leave(_))
    }

    /// Millisecond timestamp used for "most recent first" ordering. Leave
    /// ids sort at midnight UTC of their day.
    pub fn recency(&self) -> i64 {
        match self {
            AttendanceId::Work(ms) => *ms,
            AttendanceId::Leave(k) => Utc
                .from_utc_datetime(&k.date.and_time(NaiveTime::MIN))
                .timestamp_millis(),
        }
    }
}

impl fmt::Display for AttendanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttendanceId::Work(ms) => write!(f, "{}", ms),
            AttendanceId::Leave(k) => write!(f, "att_{}_{}", k.user_id, k.date.format("%Y-%m-%d")),
        }
    }
}

impl FromStr for AttendanceId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(rest) = s.strip_prefix("att_") {
            let (user_id, date) = rest
                .rsplit_once('_')
                .ok_or_else(|| format!("malformed leave record id: {}", s))?;
            let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
                .map_err(|e| format!("malformed leave record id {}: {}", s, e))?;
            return Ok(AttendanceId::leave(user_id, date));
        }

        s.parse::<i64>()
            .map(AttendanceId::Work)
            .map_err(|_| format!("malformed attendance id: {}", s))
    }
}

impl TryFrom<String> for AttendanceId {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<AttendanceId> for String {
    fn from(id: AttendanceId) -> Self {
        id.to_string()
    }
}

/// Whether the day is accounted as present. Distinct from the user's own
/// check-in status.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PresenceMarker {
    #[default]
    In,
    Out,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    #[schema(example = "1717228800000", value_type = String)]
    pub id: AttendanceId,
    #[schema(example = "staff01")]
    pub user_id: String,
    #[schema(example = "2024-06-01", format = "date", value_type = String)]
    pub date: NaiveDate,
    #[serde(default, with = "hhmm")]
    #[schema(example = "09:00", value_type = String)]
    pub check_in: Option<NaiveTime>,
    #[serde(default, with = "hhmm")]
    #[schema(example = "17:00", value_type = String)]
    pub check_out: Option<NaiveTime>,
    #[serde(default)]
    #[schema(example = "8h 0m")]
    pub duration: Option<String>,
    #[serde(rename = "type")]
    #[schema(example = "Office", value_type = String)]
    pub kind: AttendanceType,
    #[schema(example = "Head Office")]
    pub location: String,
    #[serde(default)]
    pub presence_marker: PresenceMarker,
    #[serde(default)]
    pub synced: bool,
}

impl Record for AttendanceRecord {
    const COLLECTION: Collection = Collection::Attendance;

    fn key(&self) -> String {
        self.id.to_string()
    }
}

/// A time entry logged by hand, independent of check-in state.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ManualLog {
    #[schema(example = "2024-06-01", format = "date", value_type = String)]
    pub date: NaiveDate,
    #[serde(default, with = "hhmm")]
    #[schema(example = "09:30", value_type = String)]
    pub check_in: Option<NaiveTime>,
    #[serde(default, with = "hhmm")]
    #[schema(example = "13:45", value_type = String)]
    pub check_out: Option<NaiveTime>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default, rename = "type")]
    #[schema(example = "Manual/WFH", value_type = String)]
    pub kind: Option<AttendanceType>,
    #[serde(default)]
    #[schema(example = "Work - Home")]
    pub location: Option<String>,
}

pub const MANUAL_LOG_TYPE: &str = "Manual/WFH";

/// Records keep wall-clock times at minute precision.
pub fn to_minute(t: NaiveTime) -> NaiveTime {
    NaiveTime::from_hms_opt(t.hour(), t.minute(), 0).unwrap_or(t)
}

/// `"{hours}h {minutes}m"`. Negative spans render as zero.
pub fn format_duration(span: chrono::Duration) -> String {
    let minutes = span.num_minutes().max(0);
    format!("{}h {}m", minutes / 60, minutes % 60)
}

/// `HH:MM` (zero-padded, 24h) for optional times; also accepts `HH:MM:SS`.
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%H:%M";

    pub fn serialize<S: Serializer>(t: &Option<NaiveTime>, s: S) -> Result<S::Ok, S::Error> {
        match t {
            Some(t) => s.serialize_str(&t.format(FORMAT).to_string()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveTime>, D::Error> {
        let raw: Option<String> = Option::deserialize(d)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => NaiveTime::parse_from_str(s, FORMAT)
                .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
                .map(Some)
                .map_err(serde::de::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listed_types_parse_from_their_labels() {
        assert_eq!(
            AttendanceType::from("Work - Home"),
            AttendanceType::Listed(ListedType::WorkFromHome)
        );
        assert_eq!(
            AttendanceType::from("Regional Holidays"),
            AttendanceType::Listed(ListedType::RegionalHolidays)
        );
        assert_eq!(AttendanceType::from("Office"), AttendanceType::Office);
        assert_eq!(
            AttendanceType::from("Holiday"),
            AttendanceType::Other("Holiday".into())
        );
    }

    #[test]
    fn leave_ids_keep_underscored_user_ids() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        let id = AttendanceId::leave("staff_01", date);
        assert_eq!(id.to_string(), "att_staff_01_2024-06-03");
        assert_eq!("att_staff_01_2024-06-03".parse::<AttendanceId>().unwrap(), id);
    }

    #[test]
    fn work_ids_are_millis() {
        let id: AttendanceId = "1717228800000".parse().unwrap();
        assert_eq!(id, AttendanceId::Work(1_717_228_800_000));
        assert!("att_nodate".parse::<AttendanceId>().is_err());
    }

    #[test]
    fn duration_formats_hours_and_minutes() {
        assert_eq!(format_duration(chrono::Duration::minutes(135)), "2h 15m");
        assert_eq!(format_duration(chrono::Duration::seconds(59)), "0h 0m");
        assert_eq!(format_duration(chrono::Duration::hours(26)), "26h 0m");
        assert_eq!(format_duration(chrono::Duration::minutes(-5)), "0h 0m");
    }

    #[test]
    fn record_wire_shape() {
        let record = AttendanceRecord {
            id: AttendanceId::leave("staff01", NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()),
            user_id: "staff01".into(),
            date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            check_in: NaiveTime::from_hms_opt(9, 0, 0),
            check_out: None,
            duration: None,
            kind: ListedType::SickLeave.into(),
            location: "On Leave".into(),
            presence_marker: PresenceMarker::In,
            synced: false,
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["id"], "att_staff01_2024-06-01");
        assert_eq!(json["userId"], "staff01");
        assert_eq!(json["checkIn"], "09:00");
        assert_eq!(json["checkOut"], serde_json::Value::Null);
        assert_eq!(json["type"], "Sick Leave");
        assert_eq!(json["presenceMarker"], "in");
    }
}

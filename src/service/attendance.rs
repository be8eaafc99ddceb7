//! Check-in/check-out state machine and time-entry logging.
//!
//! Presence lives on the user record (`status`, `lastCheckIn`,
//! `currentLocation`). Check-out writes the attendance record first and
//! resets the user second; the two writes are separate store operations, so a
//! failure in between leaves the user IN with the record already present.

use crate::clock::TimeSource;
use crate::error::{AppError, AppResult};
use crate::model::attendance::{
    AttendanceId, AttendanceRecord, AttendanceType, MANUAL_LOG_TYPE, ManualLog, PresenceMarker,
    format_duration, to_minute,
};
use crate::model::user::{Location, PresenceStatus, User};
use crate::session::Session;
use crate::store::Store;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};
use utoipa::ToSchema;

const DEFAULT_CHECK_IN_ADDRESS: &str = "Unknown Location";
const FALLBACK_LOCATION: &str = "Detected Location";

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusView {
    pub status: PresenceStatus,
    #[schema(format = "date-time", value_type = String)]
    pub last_check_in: Option<DateTime<Utc>>,
}

#[derive(Clone)]
pub struct AttendanceLedger {
    store: Store,
    time: TimeSource,
}

impl AttendanceLedger {
    pub fn new(store: Store, time: TimeSource) -> Self {
        Self { store, time }
    }

    async fn session_user(&self, session: &Session) -> AppResult<User> {
        let who = session.require_user()?;
        self.store
            .get::<User>(&who.user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {}", who.user_id)))
    }

    /// Pure read. An anonymous session reads as checked out.
    pub async fn get_status(&self, session: &Session) -> AppResult<StatusView> {
        if session.user().is_none() {
            return Ok(StatusView {
                status: PresenceStatus::Out,
                last_check_in: None,
            });
        }

        let user = self.session_user(session).await?;
        Ok(StatusView {
            status: user.status,
            last_check_in: user.last_check_in,
        })
    }

    /// Marks the user IN. A second check-in while already IN replaces the
    /// session start.
    pub async fn check_in(
        &self,
        session: &Session,
        lat: f64,
        lng: f64,
        address: Option<String>,
    ) -> AppResult<User> {
        let mut user = self.session_user(session).await?;

        if user.is_checked_in() {
            warn!(
                user_id = %user.id,
                previous = ?user.last_check_in,
                "Check-in while already checked in; previous session start is replaced"
            );
        }

        user.status = PresenceStatus::In;
        user.last_check_in = Some(self.time.now());
        user.current_location = Some(Location {
            lat,
            lng,
            address: address.unwrap_or_else(|| DEFAULT_CHECK_IN_ADDRESS.to_string()),
        });

        self.store.put(&user).await?;

        info!(user_id = %user.id, "Checked in");
        Ok(user)
    }

    pub async fn check_out(&self, session: &Session) -> AppResult<AttendanceRecord> {
        let mut user = self.session_user(session).await?;

        let started = match (user.status, user.last_check_in) {
            (PresenceStatus::In, Some(started)) => started,
            _ => return Err(AppError::InvalidState("User is not checked in".into())),
        };

        let now = self.time.now();
        let local_in = self.time.to_local(started);
        let local_out = self.time.to_local(now);

        let record = AttendanceRecord {
            id: AttendanceId::Work(now.timestamp_millis()),
            user_id: user.id.clone(),
            date: local_out.date_naive(),
            check_in: Some(to_minute(local_in.time())),
            check_out: Some(to_minute(local_out.time())),
            duration: Some(format_duration(now - started)),
            kind: AttendanceType::Office,
            location: user
                .current_location
                .as_ref()
                .map(|l| l.address.clone())
                .unwrap_or_else(|| FALLBACK_LOCATION.to_string()),
            presence_marker: PresenceMarker::In,
            synced: false,
        };

        // a time-id collision surfaces here as ConstraintViolation
        self.store.add(&record).await?;

        user.status = PresenceStatus::Out;
        user.last_check_in = None;
        user.current_location = None;
        self.store.put(&user).await?;

        info!(
            user_id = %user.id,
            record_id = %record.id,
            duration = record.duration.as_deref().unwrap_or_default(),
            "Checked out"
        );
        Ok(record)
    }

    /// Records a time entry regardless of the check-in state. The user record
    /// is not touched.
    pub async fn add_manual_log(
        &self,
        session: &Session,
        log: ManualLog,
    ) -> AppResult<AttendanceRecord> {
        let who = session.require_user()?;

        let duration = log.duration.or_else(|| match (log.check_in, log.check_out) {
            (Some(start), Some(end)) if end >= start => Some(format_duration(end - start)),
            _ => None,
        });

        let record = AttendanceRecord {
            id: AttendanceId::Work(self.time.now().timestamp_millis()),
            user_id: who.user_id.clone(),
            date: log.date,
            check_in: log.check_in.map(to_minute),
            check_out: log.check_out.map(to_minute),
            duration,
            kind: log
                .kind
                .unwrap_or_else(|| AttendanceType::from(MANUAL_LOG_TYPE)),
            location: log
                .location
                .unwrap_or_else(|| FALLBACK_LOCATION.to_string()),
            presence_marker: PresenceMarker::In,
            synced: false,
        };

        self.store.add(&record).await?;

        info!(user_id = %who.user_id, record_id = %record.id, "Manual log added");
        Ok(record)
    }

    /// Logs of `user_id`, or of the session user when none is given, most
    /// recent first. Anonymous with no explicit user yields nothing.
    pub async fn get_logs(
        &self,
        session: &Session,
        user_id: Option<&str>,
    ) -> AppResult<Vec<AttendanceRecord>> {
        let target = match user_id.or(session.user().map(|u| u.user_id.as_str())) {
            Some(id) => id.to_string(),
            None => return Ok(Vec::new()),
        };

        let mut logs: Vec<AttendanceRecord> =
            self.store.get_all_by_index("user_id", target).await?;
        sort_most_recent_first(&mut logs);
        Ok(logs)
    }

    pub async fn get_all_logs(&self) -> AppResult<Vec<AttendanceRecord>> {
        self.store.get_all().await
    }

    pub async fn get_unsynced_logs(&self) -> AppResult<Vec<AttendanceRecord>> {
        self.store.get_all_by_index("synced", false).await
    }

    pub async fn mark_synced(&self, id: &AttendanceId) -> AppResult<AttendanceRecord> {
        let mut record = self
            .store
            .get::<AttendanceRecord>(&id.to_string())
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Attendance record {}", id)))?;

        record.synced = true;
        self.store.put(&record).await?;
        Ok(record)
    }
}

pub fn sort_most_recent_first(logs: &mut [AttendanceRecord]) {
    logs.sort_by(|a, b| {
        b.id.recency()
            .cmp(&a.id.recency())
            .then_with(|| b.id.to_string().cmp(&a.id.to_string()))
    });
}

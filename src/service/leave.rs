//! Leave request lifecycle and attendance materialization on approval.

use crate::clock::TimeSource;
use crate::error::{AppError, AppResult};
use crate::model::attendance::{AttendanceId, AttendanceRecord, PresenceMarker};
use crate::model::leave_request::{LeaveRequest, LeaveStatus, NewLeave};
use crate::store::{Collection, Store};
use chrono::NaiveTime;
use tracing::{debug, error, info};

pub const LEAVE_LOCATION: &str = "On Leave";
pub const LEAVE_DURATION: &str = "8h 0m";

fn leave_check_in() -> Option<NaiveTime> {
    NaiveTime::from_hms_opt(9, 0, 0)
}

fn leave_check_out() -> Option<NaiveTime> {
    NaiveTime::from_hms_opt(17, 0, 0)
}

#[derive(Clone)]
pub struct LeaveManager {
    store: Store,
    time: TimeSource,
}

impl LeaveManager {
    pub fn new(store: Store, time: TimeSource) -> Self {
        Self { store, time }
    }

    /// Files a new Pending request. Overlapping and back-dated requests are
    /// accepted as-is.
    pub async fn request_leave(&self, new: NewLeave) -> AppResult<LeaveRequest> {
        let now = self.time.now();

        let leave = LeaveRequest {
            id: format!("l{}", now.timestamp_millis()),
            user_id: new.user_id,
            start_date: new.start_date,
            end_date: new.end_date,
            kind: new.kind,
            reason: new.reason,
            status: LeaveStatus::Pending,
            applied_on: now,
            action_by: None,
            action_date: None,
        };

        self.store.add(&leave).await?;

        info!(leave_id = %leave.id, user_id = %leave.user_id, kind = %leave.kind, "Leave requested");
        Ok(leave)
    }

    pub async fn get_pending_leaves(&self) -> AppResult<Vec<LeaveRequest>> {
        let mut leaves: Vec<LeaveRequest> = self
            .store
            .get_all_by_index("status", LeaveStatus::Pending.to_string())
            .await?;
        sort_newest_applied_first(&mut leaves);
        Ok(leaves)
    }

    pub async fn get_user_leaves(&self, user_id: &str) -> AppResult<Vec<LeaveRequest>> {
        let mut leaves: Vec<LeaveRequest> =
            self.store.get_all_by_index("user_id", user_id).await?;
        sort_newest_applied_first(&mut leaves);
        Ok(leaves)
    }

    pub async fn get_leave(&self, leave_id: &str) -> AppResult<LeaveRequest> {
        self.store
            .get::<LeaveRequest>(leave_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Leave {}", leave_id)))
    }

    /// Approves or rejects a pending request.
    ///
    /// On approval one leave-derived record is `put` per day of the span and
    /// becomes the only record of that user-day: work-derived records of the
    /// same user and date are removed. The request is persisted as Approved
    /// before the first day is written and nothing is rolled back: if a write
    /// fails, earlier days stay written and the error is returned.
    pub async fn update_leave_status(
        &self,
        leave_id: &str,
        status: LeaveStatus,
        actor_id: &str,
    ) -> AppResult<LeaveRequest> {
        let mut leave = self.get_leave(leave_id).await?;

        if status == LeaveStatus::Pending {
            return Err(AppError::InvalidState(
                "Leave can only be approved or rejected".into(),
            ));
        }
        if leave.status.is_terminal() {
            return Err(AppError::InvalidState(format!(
                "Leave {} already {}",
                leave.id, leave.status
            )));
        }

        leave.status = status;
        leave.action_by = Some(actor_id.to_string());
        leave.action_date = Some(self.time.now());

        self.store.put(&leave).await?;

        info!(leave_id = %leave.id, status = %leave.status, actor_id, "Leave status updated");

        if leave.status == LeaveStatus::Approved {
            self.materialize(&leave).await?;
        }

        Ok(leave)
    }

    async fn materialize(&self, leave: &LeaveRequest) -> AppResult<()> {
        let mut written = 0usize;

        for date in leave.days() {
            let record = AttendanceRecord {
                id: AttendanceId::leave(leave.user_id.clone(), date),
                user_id: leave.user_id.clone(),
                date,
                check_in: leave_check_in(),
                check_out: leave_check_out(),
                duration: Some(LEAVE_DURATION.to_string()),
                kind: leave.kind.clone(),
                location: LEAVE_LOCATION.to_string(),
                presence_marker: PresenceMarker::In,
                synced: false,
            };

            if let Err(e) = self.replace_day(&record).await {
                error!(
                    error = %e,
                    leave_id = %leave.id,
                    %date,
                    written,
                    "Leave materialization stopped partway"
                );
                return Err(e);
            }

            debug!(leave_id = %leave.id, record_id = %record.id, "Leave day written");
            written += 1;
        }

        info!(leave_id = %leave.id, days = written, "Leave days materialized");
        Ok(())
    }

    /// Makes `record` the only record of its user-day: it is written at the
    /// user-day id, then every work-derived record of that user and date is
    /// removed.
    async fn replace_day(&self, record: &AttendanceRecord) -> AppResult<()> {
        self.store.put(record).await?;

        let same_day: Vec<AttendanceRecord> =
            self.store.get_all_by_index("date", record.date).await?;
        for worked in same_day
            .iter()
            .filter(|r| r.user_id == record.user_id && !r.id.is_leave_derived())
        {
            debug!(record_id = %worked.id, replaced_by = %record.id, "Work record replaced by leave");
            self.store
                .delete(Collection::Attendance, &worked.id.to_string())
                .await?;
        }
        Ok(())
    }
}

fn sort_newest_applied_first(leaves: &mut [LeaveRequest]) {
    leaves.sort_by(|a, b| b.applied_on.cmp(&a.applied_on));
}

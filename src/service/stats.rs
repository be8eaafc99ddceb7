//! Read-only attendance statistics.
//!
//! Every call scans the whole attendance collection; nothing is cached or
//! maintained incrementally.

use crate::clock::TimeSource;
use crate::error::AppResult;
use crate::model::attendance::{AttendanceRecord, AttendanceType, ListedType, PresenceMarker};
use crate::service::leave::LEAVE_LOCATION;
use crate::store::Store;
use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Weekday};
use serde::Serialize;
use std::collections::BTreeMap;
use strum_macros::Display;
use utoipa::ToSchema;

const LATE_THRESHOLD_PER_MONTH: u32 = 3;
const PENALTY_STEP: f64 = 0.5;

fn late_after() -> NaiveTime {
    NaiveTime::from_hms_opt(9, 0, 0).unwrap_or(NaiveTime::MIN)
}

/// Bucket a record is counted under.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Display)]
pub enum Category {
    Present,
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
    Holiday,
    #[strum(serialize = "National Holiday")]
    NationalHoliday,
    #[strum(serialize = "Regional Holidays")]
    RegionalHolidays,
}

impl From<ListedType> for Category {
    fn from(t: ListedType) -> Self {
        match t {
            ListedType::WorkFromHome => Category::WorkFromHome,
            ListedType::Training => Category::Training,
            ListedType::SickLeave => Category::SickLeave,
            ListedType::CasualLeave => Category::CasualLeave,
            ListedType::EarnedLeave => Category::EarnedLeave,
            ListedType::PaidLeave => Category::PaidLeave,
            ListedType::MaternityLeave => Category::MaternityLeave,
            ListedType::Absent => Category::Absent,
            ListedType::NationalHoliday => Category::NationalHoliday,
            ListedType::RegionalHolidays => Category::RegionalHolidays,
        }
    }
}

/// First matching rule wins: a listed type, then any label mentioning
/// "Holiday", then plain presence if there is a check-in. Records matching
/// none are left out of the breakdown.
pub fn classify(record: &AttendanceRecord) -> Option<Category> {
    match &record.kind {
        AttendanceType::Listed(t) => Some(Category::from(*t)),
        AttendanceType::Other(label) if label.contains("Holiday") => Some(Category::Holiday),
        AttendanceType::Office | AttendanceType::Other(_) => {
            record.check_in.map(|_| Category::Present)
        }
    }
}

/// `HH:MM` strings compare the same way the times do, so this is the
/// "checkIn > 09:00" rule.
pub fn is_late(record: &AttendanceRecord) -> bool {
    record.check_in.is_some_and(|t| t > late_after())
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct Breakdown {
    #[serde(rename = "Present")]
    pub present: u32,
    #[serde(rename = "Late")]
    pub late: u32,
    #[serde(rename = "Work - Home")]
    pub work_from_home: u32,
    #[serde(rename = "Training")]
    pub training: u32,
    #[serde(rename = "Sick Leave")]
    pub sick_leave: u32,
    #[serde(rename = "Casual Leave")]
    pub casual_leave: u32,
    #[serde(rename = "Earned Leave")]
    pub earned_leave: u32,
    #[serde(rename = "Paid Leave")]
    pub paid_leave: u32,
    #[serde(rename = "Maternity Leave")]
    pub maternity_leave: u32,
    #[serde(rename = "Absent")]
    pub absent: u32,
    #[serde(rename = "Holiday")]
    pub holiday: u32,
    #[serde(rename = "National Holiday")]
    pub national_holiday: u32,
    #[serde(rename = "Regional Holidays")]
    pub regional_holidays: u32,
}

impl Breakdown {
    fn slot(&mut self, category: Category) -> &mut u32 {
        match category {
            Category::Present => &mut self.present,
            Category::WorkFromHome => &mut self.work_from_home,
            Category::Training => &mut self.training,
            Category::SickLeave => &mut self.sick_leave,
            Category::CasualLeave => &mut self.casual_leave,
            Category::EarnedLeave => &mut self.earned_leave,
            Category::PaidLeave => &mut self.paid_leave,
            Category::MaternityLeave => &mut self.maternity_leave,
            Category::Absent => &mut self.absent,
            Category::Holiday => &mut self.holiday,
            Category::NationalHoliday => &mut self.national_holiday,
            Category::RegionalHolidays => &mut self.regional_holidays,
        }
    }

    pub fn count(&self, category: Category) -> u32 {
        match category {
            Category::Present => self.present,
            Category::WorkFromHome => self.work_from_home,
            Category::Training => self.training,
            Category::SickLeave => self.sick_leave,
            Category::CasualLeave => self.casual_leave,
            Category::EarnedLeave => self.earned_leave,
            Category::PaidLeave => self.paid_leave,
            Category::MaternityLeave => self.maternity_leave,
            Category::Absent => self.absent,
            Category::Holiday => self.holiday,
            Category::NationalHoliday => self.national_holiday,
            Category::RegionalHolidays => self.regional_holidays,
        }
    }

    /// Present + Work - Home + Training
    pub fn present_total(&self) -> u32 {
        self.present + self.work_from_home + self.training
    }

    /// Sick + Casual + Earned + Paid + Maternity + Absent
    pub fn leave_total(&self) -> u32 {
        self.sick_leave
            + self.casual_leave
            + self.earned_leave
            + self.paid_leave
            + self.maternity_leave
            + self.absent
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct MonthlyStats {
    pub present: u32,
    pub late: u32,
    pub leaves: u32,
    pub penalty: f64,
    #[schema(example = "June 2024")]
    pub label: String,
    pub breakdown: Breakdown,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct YearlyStats {
    pub present: u32,
    pub late: u32,
    pub leaves: u32,
    pub penalty_leaves: f64,
    #[schema(example = "FY 2024-2025")]
    pub label: String,
    pub breakdown: Breakdown,
}

/// Inclusive date window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Window {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Calendar month containing `today`.
pub fn month_window(today: NaiveDate) -> Window {
    let start = today.with_day(1).unwrap_or(today);
    let next_month = if start.month() == 12 {
        NaiveDate::from_ymd_opt(start.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(start.year(), start.month() + 1, 1)
    };
    let end = next_month
        .and_then(|d| d.pred_opt())
        .unwrap_or(today);
    Window { start, end }
}

/// April 1 through March 31. January to March belong to the year that
/// started the previous April.
pub fn financial_year(today: NaiveDate) -> (Window, String) {
    let start_year = if today.month() <= 3 {
        today.year() - 1
    } else {
        today.year()
    };
    let start = NaiveDate::from_ymd_opt(start_year, 4, 1).unwrap_or(today);
    let end = NaiveDate::from_ymd_opt(start_year + 1, 3, 31).unwrap_or(today);
    (
        Window { start, end },
        format!("FY {}-{}", start_year, start_year + 1),
    )
}

struct Tally {
    breakdown: Breakdown,
    late_by_month: BTreeMap<(i32, u32), u32>,
}

fn tally<'a>(records: impl Iterator<Item = &'a AttendanceRecord>) -> Tally {
    let mut breakdown = Breakdown::default();
    let mut late_by_month = BTreeMap::new();

    for record in records {
        if is_late(record) {
            breakdown.late += 1;
            *late_by_month
                .entry((record.date.year(), record.date.month()))
                .or_insert(0) += 1;
        }
        if let Some(category) = classify(record) {
            *breakdown.slot(category) += 1;
        }
    }

    Tally {
        breakdown,
        late_by_month,
    }
}

/// Flat: half a day once the month has more than three late arrivals.
pub fn monthly_stats(records: &[AttendanceRecord], user_id: &str, today: NaiveDate) -> MonthlyStats {
    let window = month_window(today);
    let Tally { breakdown, .. } = tally(
        records
            .iter()
            .filter(|r| r.user_id == user_id && window.contains(r.date)),
    );

    let penalty = if breakdown.late > LATE_THRESHOLD_PER_MONTH {
        PENALTY_STEP
    } else {
        0.0
    };

    MonthlyStats {
        present: breakdown.present_total(),
        late: breakdown.late,
        leaves: breakdown.leave_total(),
        penalty,
        label: window.start.format("%B %Y").to_string(),
        breakdown,
    }
}

/// Cumulative: half a day for every month of the financial year with more
/// than three late arrivals.
pub fn yearly_stats(records: &[AttendanceRecord], user_id: &str, today: NaiveDate) -> YearlyStats {
    let (window, label) = financial_year(today);
    let Tally {
        breakdown,
        late_by_month,
    } = tally(
        records
            .iter()
            .filter(|r| r.user_id == user_id && window.contains(r.date)),
    );

    let penalty_leaves = late_by_month
        .values()
        .filter(|&&count| count > LATE_THRESHOLD_PER_MONTH)
        .count() as f64
        * PENALTY_STEP;

    YearlyStats {
        present: breakdown.present_total(),
        late: breakdown.late,
        leaves: breakdown.leave_total(),
        penalty_leaves,
        label,
        breakdown,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DayOverview {
    #[schema(example = "2024-06-01", format = "date", value_type = String)]
    pub date: NaiveDate,
    #[schema(example = "Sat 1")]
    pub label: String,
    pub present: u32,
    pub on_leave: u32,
}

fn counts_as_present(record: &AttendanceRecord) -> bool {
    let leave_label = matches!(
        &record.kind,
        AttendanceType::Listed(ListedType::SickLeave | ListedType::CasualLeave)
    ) || matches!(&record.kind, AttendanceType::Other(l) if l == "Annual Leave");

    record.presence_marker == PresenceMarker::In
        && !leave_label
        && record.location != LEAVE_LOCATION
}

fn counts_as_on_leave(record: &AttendanceRecord) -> bool {
    record.location == LEAVE_LOCATION || record.kind.label().contains("Leave")
}

/// Present and on-leave head counts for the seven days ending `today`,
/// oldest first, across all users.
pub fn weekly_overview(records: &[AttendanceRecord], today: NaiveDate) -> Vec<DayOverview> {
    (0..7)
        .rev()
        .map(|back| {
            let date = today - Duration::days(back);
            let day: Vec<_> = records.iter().filter(|r| r.date == date).collect();
            DayOverview {
                date,
                label: date.format("%a %-d").to_string(),
                present: day.iter().filter(|r| counts_as_present(r)).count() as u32,
                on_leave: day.iter().filter(|r| counts_as_on_leave(r)).count() as u32,
            }
        })
        .collect()
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Display, ToSchema)]
pub enum DayKind {
    #[serde(rename = "Work Day")]
    #[strum(serialize = "Work Day")]
    WorkDay,
    #[serde(rename = "Half Day")]
    #[strum(serialize = "Half Day")]
    HalfDay,
    Holiday,
}

/// Sundays are off, as are the 2nd and 4th Saturdays; other Saturdays are
/// half days.
pub fn day_kind(date: NaiveDate) -> DayKind {
    match date.weekday() {
        Weekday::Sun => DayKind::Holiday,
        Weekday::Sat => match date.day().div_ceil(7) {
            2 | 4 => DayKind::Holiday,
            _ => DayKind::HalfDay,
        },
        _ => DayKind::WorkDay,
    }
}

/// Store-backed entry points; "today" comes from the injected clock.
#[derive(Clone)]
pub struct StatsEngine {
    store: Store,
    time: TimeSource,
}

impl StatsEngine {
    pub fn new(store: Store, time: TimeSource) -> Self {
        Self { store, time }
    }

    pub async fn get_user_monthly_stats(&self, user_id: &str) -> AppResult<MonthlyStats> {
        let records: Vec<AttendanceRecord> = self.store.get_all().await?;
        Ok(monthly_stats(&records, user_id, self.time.today()))
    }

    pub async fn get_user_yearly_stats(&self, user_id: &str) -> AppResult<YearlyStats> {
        let records: Vec<AttendanceRecord> = self.store.get_all().await?;
        Ok(yearly_stats(&records, user_id, self.time.today()))
    }

    pub async fn weekly_overview(&self) -> AppResult<Vec<DayOverview>> {
        let records: Vec<AttendanceRecord> = self.store.get_all().await?;
        Ok(weekly_overview(&records, self.time.today()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::attendance::AttendanceId;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn record(date: NaiveDate, check_in: Option<&str>, kind: &str) -> AttendanceRecord {
        AttendanceRecord {
            id: AttendanceId::Work(date.and_hms_opt(12, 0, 0).unwrap().and_utc().timestamp_millis()),
            user_id: "staff01".into(),
            date,
            check_in: check_in.map(|t| NaiveTime::parse_from_str(t, "%H:%M").unwrap()),
            check_out: None,
            duration: None,
            kind: AttendanceType::from(kind),
            location: "Head Office".into(),
            presence_marker: PresenceMarker::In,
            synced: false,
        }
    }

    #[test]
    fn month_window_handles_december_and_leap_february() {
        assert_eq!(
            month_window(d(2024, 12, 15)),
            Window {
                start: d(2024, 12, 1),
                end: d(2024, 12, 31)
            }
        );
        assert_eq!(month_window(d(2024, 2, 10)).end, d(2024, 2, 29));
    }

    #[test]
    fn financial_year_rolls_over_in_april() {
        let (w, label) = financial_year(d(2025, 3, 31));
        assert_eq!(label, "FY 2024-2025");
        assert_eq!(w.start, d(2024, 4, 1));
        assert_eq!(w.end, d(2025, 3, 31));

        let (w, label) = financial_year(d(2025, 4, 1));
        assert_eq!(label, "FY 2025-2026");
        assert_eq!(w.start, d(2025, 4, 1));
    }

    #[test]
    fn classification_order() {
        let day = d(2024, 6, 3);
        assert_eq!(
            classify(&record(day, Some("09:00"), "Work - Home")),
            Some(Category::WorkFromHome)
        );
        assert_eq!(
            classify(&record(day, Some("09:00"), "National Holiday")),
            Some(Category::NationalHoliday)
        );
        assert_eq!(
            classify(&record(day, Some("09:00"), "Festival Holiday")),
            Some(Category::Holiday)
        );
        assert_eq!(
            classify(&record(day, Some("08:45"), "Office")),
            Some(Category::Present)
        );
        assert_eq!(classify(&record(day, None, "Office")), None);
        assert_eq!(classify(&record(day, None, "Unlisted")), None);
    }

    #[test]
    fn nine_sharp_is_not_late() {
        let day = d(2024, 6, 3);
        assert!(!is_late(&record(day, Some("09:00"), "Office")));
        assert!(is_late(&record(day, Some("09:01"), "Office")));
        assert!(!is_late(&record(day, None, "Absent")));
    }

    #[test]
    fn monthly_penalty_is_capped() {
        let today = d(2024, 6, 20);
        let mut records: Vec<_> = ["09:05", "09:10", "09:20", "09:30"]
            .iter()
            .enumerate()
            .map(|(i, t)| record(d(2024, 6, 3 + i as u32), Some(t), "Office"))
            .collect();

        let stats = monthly_stats(&records, "staff01", today);
        assert_eq!(stats.breakdown.late, 4);
        assert_eq!(stats.penalty, 0.5);
        assert_eq!(stats.label, "June 2024");

        records.push(record(d(2024, 6, 10), Some("09:45"), "Office"));
        let stats = monthly_stats(&records, "staff01", today);
        assert_eq!(stats.breakdown.late, 5);
        assert_eq!(stats.penalty, 0.5);
    }

    #[test]
    fn monthly_ignores_other_users_and_months() {
        let today = d(2024, 6, 20);
        let mut other = record(d(2024, 6, 4), Some("10:00"), "Office");
        other.user_id = "staff02".into();
        let records = vec![
            other,
            record(d(2024, 5, 31), Some("10:00"), "Office"),
            record(d(2024, 7, 1), Some("10:00"), "Office"),
            record(d(2024, 6, 5), Some("08:30"), "Office"),
        ];

        let stats = monthly_stats(&records, "staff01", today);
        assert_eq!(stats.late, 0);
        assert_eq!(stats.present, 1);
    }

    #[test]
    fn totals_combine_buckets() {
        let today = d(2024, 6, 20);
        let records = vec![
            record(d(2024, 6, 3), Some("08:50"), "Office"),
            record(d(2024, 6, 4), Some("08:50"), "Work - Home"),
            record(d(2024, 6, 5), Some("08:50"), "Training"),
            record(d(2024, 6, 6), None, "Sick Leave"),
            record(d(2024, 6, 7), None, "Absent"),
            record(d(2024, 6, 8), None, "Regional Holidays"),
            record(d(2024, 6, 9), None, "Unlisted"),
        ];

        let stats = monthly_stats(&records, "staff01", today);
        assert_eq!(stats.present, 3);
        assert_eq!(stats.leaves, 2);
        assert_eq!(stats.breakdown.regional_holidays, 1);
        assert_eq!(stats.breakdown.count(Category::Holiday), 0);
    }

    #[test]
    fn yearly_penalty_counts_offending_months() {
        let today = d(2025, 3, 20);
        let mut records = Vec::new();
        for day in 6..10 {
            records.push(record(d(2025, 1, day), Some("09:15"), "Office"));
        }
        for day in 3..5 {
            records.push(record(d(2025, 3, day), Some("09:15"), "Office"));
        }

        let stats = yearly_stats(&records, "staff01", today);
        assert_eq!(stats.late, 6);
        assert_eq!(stats.penalty_leaves, 0.5);
        assert_eq!(stats.label, "FY 2024-2025");

        for day in 10..14 {
            records.push(record(d(2024, 11, day), Some("09:15"), "Office"));
        }
        let stats = yearly_stats(&records, "staff01", today);
        assert_eq!(stats.penalty_leaves, 1.0);
    }

    #[test]
    fn weekly_overview_spans_seven_days_oldest_first() {
        let today = d(2024, 6, 7);
        let mut leave = record(d(2024, 6, 7), Some("09:00"), "Sick Leave");
        leave.location = LEAVE_LOCATION.into();
        let records = vec![record(d(2024, 6, 7), Some("09:00"), "Office"), leave];

        let week = weekly_overview(&records, today);
        assert_eq!(week.len(), 7);
        assert_eq!(week[0].date, d(2024, 6, 1));
        assert_eq!(week[6].label, "Fri 7");
        assert_eq!(week[6].present, 1);
        assert_eq!(week[6].on_leave, 1);
    }

    #[test]
    fn saturdays_alternate() {
        // June 2024: Saturdays on 1, 8, 15, 22, 29
        assert_eq!(day_kind(d(2024, 6, 1)), DayKind::HalfDay);
        assert_eq!(day_kind(d(2024, 6, 8)), DayKind::Holiday);
        assert_eq!(day_kind(d(2024, 6, 15)), DayKind::HalfDay);
        assert_eq!(day_kind(d(2024, 6, 22)), DayKind::Holiday);
        assert_eq!(day_kind(d(2024, 6, 29)), DayKind::HalfDay);
        assert_eq!(day_kind(d(2024, 6, 2)), DayKind::Holiday);
        assert_eq!(day_kind(d(2024, 6, 3)), DayKind::WorkDay);
    }
}

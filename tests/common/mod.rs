#![allow(dead_code)]

use attendance_tracker::clock::{FixedClock, TimeSource};
use attendance_tracker::model::role::Role;
use attendance_tracker::service::Services;
use attendance_tracker::session::Session;
use attendance_tracker::store::Store;
use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone, Utc};
use std::sync::Arc;

pub struct Harness {
    pub clock: Arc<FixedClock>,
    pub services: Services,
}

impl Harness {
    /// Fresh in-memory store with the default users, clock pinned at `now`
    /// and wall-clock offset of UTC.
    pub async fn at(now: DateTime<Utc>) -> Self {
        let store = Store::in_memory().await.unwrap();
        store.initialize().await.unwrap();

        let clock = Arc::new(FixedClock::new(now));
        let time = TimeSource::new(clock.clone(), FixedOffset::east_opt(0).unwrap());
        let services = Services::new(store, time);
        services.directory.seed_default_users().await.unwrap();

        Self { clock, services }
    }

    pub fn store(&self) -> &Store {
        &self.services.store
    }
}

pub fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn staff() -> Session {
    Session::for_user("staff01", "Jomit", Role::Staff)
}

pub fn admin() -> Session {
    Session::for_user("admin01", "Admin", Role::Admin)
}

pub mod attendance;
pub mod directory;
pub mod leave;
pub mod reports;
pub mod stats;

use crate::clock::TimeSource;
use crate::store::Store;

/// Every service wired to one store and one clock.
#[derive(Clone)]
pub struct Services {
    pub store: Store,
    pub ledger: attendance::AttendanceLedger,
    pub leaves: leave::LeaveManager,
    pub stats: stats::StatsEngine,
    pub directory: directory::Directory,
    pub reports: reports::Reports,
}

impl Services {
    pub fn new(store: Store, time: TimeSource) -> Self {
        Self {
            ledger: attendance::AttendanceLedger::new(store.clone(), time.clone()),
            leaves: leave::LeaveManager::new(store.clone(), time.clone()),
            stats: stats::StatsEngine::new(store.clone(), time),
            directory: directory::Directory::new(store.clone()),
            reports: reports::Reports::new(store.clone()),
            store,
        }
    }
}

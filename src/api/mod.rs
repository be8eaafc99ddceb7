pub mod attendance;
pub mod leave_request;
pub mod reports;
pub mod stats;
pub mod users;

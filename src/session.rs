use crate::error::{AppError, AppResult};
use crate::model::role::Role;

/// The identity a call is made on behalf of.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUser {
    pub user_id: String,
    pub username: String,
    pub role: Role,
}

/// Explicit per-call context handed to every ledger and leave operation.
/// An anonymous session is a valid value; operations that need a user
/// reject it with `NotAuthenticated`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    user: Option<SessionUser>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self { user: None }
    }

    pub fn for_user(user_id: impl Into<String>, username: impl Into<String>, role: Role) -> Self {
        Self {
            user: Some(SessionUser {
                user_id: user_id.into(),
                username: username.into(),
                role,
            }),
        }
    }

    pub fn user(&self) -> Option<&SessionUser> {
        self.user.as_ref()
    }

    pub fn require_user(&self) -> AppResult<&SessionUser> {
        self.user.as_ref().ok_or(AppError::NotAuthenticated)
    }

    pub fn is_admin(&self) -> bool {
        self.user.as_ref().is_some_and(|u| u.role.is_admin())
    }
}

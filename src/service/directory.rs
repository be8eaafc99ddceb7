//! User directory: the in-process side of the identity provider.
//!
//! Credentials are not stored here; identity is asserted by whoever issues
//! the session.

use crate::error::{AppError, AppResult};
use crate::model::role::Role;
use crate::model::user::{PresenceStatus, User};
use crate::store::{Collection, Store};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{info, warn};
use utoipa::ToSchema;

/// Profile fields a user or admin may change. Presence fields are owned by
/// the ledger and cannot be set through here.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub dept: Option<String>,
}

#[derive(Clone)]
pub struct Directory {
    store: Store,
}

impl Directory {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub async fn get_user(&self, user_id: &str) -> AppResult<User> {
        self.store
            .get::<User>(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {}", user_id)))
    }

    pub async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let mut found: Vec<User> = self.store.get_all_by_index("username", username).await?;
        Ok(found.pop())
    }

    pub async fn list_users(&self) -> AppResult<Vec<User>> {
        self.store.get_all().await
    }

    /// Adds a new user in the checked-out state. Duplicate ids or usernames
    /// fail with `ConstraintViolation`.
    pub async fn register_user(&self, mut user: User) -> AppResult<User> {
        user.status = PresenceStatus::Out;
        user.last_check_in = None;
        user.current_location = None;

        self.store.add(&user).await?;

        info!(user_id = %user.id, username = %user.username, "User registered");
        Ok(user)
    }

    pub async fn update_profile(&self, user_id: &str, update: ProfileUpdate) -> AppResult<User> {
        let mut user = self.get_user(user_id).await?;

        if let Some(name) = update.name {
            user.name = name;
        }
        if update.email.is_some() {
            user.email = update.email;
        }
        if update.phone.is_some() {
            user.phone = update.phone;
        }
        if update.dept.is_some() {
            user.dept = update.dept;
        }

        self.store.put(&user).await?;
        Ok(user)
    }

    /// First-run seeding: only when the users collection is empty.
    /// Returns how many users were written.
    pub async fn seed_default_users(&self) -> AppResult<usize> {
        if self.store.count(Collection::Users).await? > 0 {
            return Ok(0);
        }

        let defaults = default_users();
        for user in &defaults {
            self.store.put(user).await?;
        }

        info!(count = defaults.len(), "Store seeded with default users");
        Ok(defaults.len())
    }

    /// Wipes users and attendance. Leave requests are kept.
    pub async fn reset_data(&self) -> AppResult<()> {
        warn!("Resetting users and attendance");
        self.store.clear(Collection::Users).await?;
        self.store.clear(Collection::Attendance).await?;
        Ok(())
    }
}

fn default_users() -> Vec<User> {
    let mut admin = User::new("admin01", "Admin", "Sr. Mary (Admin)").with_role(Role::Admin);
    admin.email = Some("admin@crwi.org".into());
    admin.phone = Some("+91 98765 00000".into());
    admin.dept = Some("Administration".into());
    admin.join_date = NaiveDate::from_ymd_opt(2023, 1, 1);

    let mut staff = User::new("staff01", "Jomit", "Jomit");
    staff.email = Some("jomit@crwi.org".into());
    staff.phone = Some("+91 98765 43210".into());
    staff.dept = Some("IT Department".into());
    staff.join_date = NaiveDate::from_ymd_opt(2024, 1, 1);

    vec![admin, staff]
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn directory() -> Directory {
        let store = Store::in_memory().await.unwrap();
        store.initialize().await.unwrap();
        Directory::new(store)
    }

    #[actix_web::test]
    async fn seeding_happens_once() {
        let dir = directory().await;
        assert_eq!(dir.seed_default_users().await.unwrap(), 2);
        assert_eq!(dir.seed_default_users().await.unwrap(), 0);

        let admin = dir.find_by_username("Admin").await.unwrap().unwrap();
        assert!(admin.role.is_admin());
    }

    #[actix_web::test]
    async fn usernames_are_unique() {
        let dir = directory().await;
        dir.register_user(User::new("u1", "ann", "Ann")).await.unwrap();

        let err = dir
            .register_user(User::new("u2", "ann", "Another Ann"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ConstraintViolation(_)));
        assert!(dir.store.get::<User>("u2").await.unwrap().is_none());
    }

    #[actix_web::test]
    async fn profile_update_merges_fields() {
        let dir = directory().await;
        let mut user = User::new("u1", "ann", "Ann");
        user.dept = Some("Finance".into());
        dir.register_user(user).await.unwrap();

        let updated = dir
            .update_profile(
                "u1",
                ProfileUpdate {
                    phone: Some("+91 1".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.dept.as_deref(), Some("Finance"));
        assert_eq!(updated.phone.as_deref(), Some("+91 1"));

        let err = dir
            .update_profile("ghost", ProfileUpdate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[actix_web::test]
    async fn reset_clears_users() {
        let dir = directory().await;
        dir.seed_default_users().await.unwrap();
        dir.reset_data().await.unwrap();
        assert!(dir.list_users().await.unwrap().is_empty());
    }
}

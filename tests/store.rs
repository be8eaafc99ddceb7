mod common;

use attendance_tracker::error::AppError;
use attendance_tracker::model::user::{PresenceStatus, User};
use attendance_tracker::store::{Collection, SCHEMA_VERSION, Store};
use common::utc;

#[actix_web::test]
async fn data_survives_reopening_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}", dir.path().join("attendance.db").display());

    {
        let store = Store::connect(&url).await.unwrap();
        store.initialize().await.unwrap();

        let mut user = User::new("staff01", "Jomit", "Jomit");
        user.status = PresenceStatus::In;
        user.last_check_in = Some(utc(2024, 6, 3, 8, 45));
        store.put(&user).await.unwrap();
    }

    let store = Store::connect(&url).await.unwrap();
    // opening an existing store must not wipe it
    store.initialize().await.unwrap();
    assert_eq!(store.schema_version().await.unwrap(), SCHEMA_VERSION);

    let user: User = store.get("staff01").await.unwrap().unwrap();
    assert_eq!(user.status, PresenceStatus::In);
    assert_eq!(user.last_check_in, Some(utc(2024, 6, 3, 8, 45)));
    assert_eq!(store.count(Collection::Users).await.unwrap(), 1);
}

#[actix_web::test]
async fn put_replaces_and_add_refuses_duplicates() {
    let store = Store::in_memory().await.unwrap();
    store.initialize().await.unwrap();

    let original = User::new("staff01", "Jomit", "Jomit");
    store.add(&original).await.unwrap();

    let mut renamed = original.clone();
    renamed.name = "Jomit K".into();

    let err = store.add(&renamed).await.unwrap_err();
    assert!(matches!(err, AppError::ConstraintViolation(_)));
    let kept: User = store.get("staff01").await.unwrap().unwrap();
    assert_eq!(kept, original);

    store.put(&renamed).await.unwrap();
    let replaced: User = store.get("staff01").await.unwrap().unwrap();
    assert_eq!(replaced, renamed);
}

//! Repository tests against a real database. Run with
//! `DATABASE_URL=... cargo test -- --ignored`.

use chrono::{Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use schoolhub::modules::auth::{PgUserRepository, UserRepository};
use schoolhub::modules::schools::{PgSchoolRepository, SchoolRepository};
use schoolhub::schoolhub_models::{
    NewSchool, PendingUser, SchoolChanges, SchoolDetails, SchoolDetailsPatch, SchoolId,
    StoredImage, UserId,
};

fn pending_user(email: &str, otp: &str) -> PendingUser {
    PendingUser {
        name: "Ann".to_string(),
        email: email.to_string(),
        password_hash: "$2b$10$abcdefghijklmnopqrstuv".to_string(),
        otp: otp.to_string(),
        otp_expiry: Utc::now() + Duration::minutes(10),
    }
}

fn new_school(name: &str, creator_id: UserId) -> NewSchool {
    let id = SchoolId::new();
    NewSchool {
        id,
        details: SchoolDetails {
            name: name.to_string(),
            address: "12 Hill Road".to_string(),
            city: "Pune".to_string(),
            state: "Maharashtra".to_string(),
            contact: "9876543210".to_string(),
            email: "office@school.edu".to_string(),
        },
        image: format!("http://localhost:3000/files/schools/{}.png", id),
        image_key: format!("schools/{}.png", id),
        creator_id,
    }
}

async fn verified_user(users: &PgUserRepository) -> UserId {
    let email = format!("test-{}@test.com", Uuid::new_v4());
    let id = users
        .upsert_pending(&pending_user(&email, "123456"))
        .await
        .unwrap()
        .unwrap();
    assert!(users.mark_verified(id, "123456").await.unwrap());
    id
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_upsert_pending_overwrites_unverified_user(pool: PgPool) {
    let users = PgUserRepository::new(pool);

    let first = users
        .upsert_pending(&pending_user("ann@example.com", "111111"))
        .await
        .unwrap()
        .unwrap();
    let second = users
        .upsert_pending(&pending_user("ann@example.com", "222222"))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(first, second);
    let stored = users.find_by_email("ann@example.com").await.unwrap().unwrap();
    assert_eq!(stored.otp.as_deref(), Some("222222"));
    assert!(!stored.verified);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_upsert_pending_leaves_verified_user_untouched(pool: PgPool) {
    let users = PgUserRepository::new(pool);
    let id = users
        .upsert_pending(&pending_user("ann@example.com", "111111"))
        .await
        .unwrap()
        .unwrap();
    assert!(users.mark_verified(id, "111111").await.unwrap());

    let result = users
        .upsert_pending(&pending_user("ann@example.com", "222222"))
        .await
        .unwrap();

    assert!(result.is_none());
    let stored = users.find_by_email("ann@example.com").await.unwrap().unwrap();
    assert!(stored.verified);
    assert!(stored.otp.is_none());
    assert!(stored.otp_expiry.is_none());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_mark_verified_only_once(pool: PgPool) {
    let users = PgUserRepository::new(pool);
    let id = users
        .upsert_pending(&pending_user("ann@example.com", "111111"))
        .await
        .unwrap()
        .unwrap();

    assert!(users.mark_verified(id, "111111").await.unwrap());
    assert!(!users.mark_verified(id, "111111").await.unwrap());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_mark_verified_requires_current_otp(pool: PgPool) {
    let users = PgUserRepository::new(pool);
    let id = users
        .upsert_pending(&pending_user("ann@example.com", "111111"))
        .await
        .unwrap()
        .unwrap();
    users
        .upsert_pending(&pending_user("ann@example.com", "222222"))
        .await
        .unwrap();

    assert!(!users.mark_verified(id, "111111").await.unwrap());

    let stored = users.find_by_email("ann@example.com").await.unwrap().unwrap();
    assert!(!stored.verified);
    assert_eq!(stored.otp.as_deref(), Some("222222"));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_mark_verified_rejects_expired_otp(pool: PgPool) {
    let users = PgUserRepository::new(pool);
    let mut pending = pending_user("ann@example.com", "111111");
    pending.otp_expiry = Utc::now() - Duration::seconds(1);
    let id = users.upsert_pending(&pending).await.unwrap().unwrap();

    assert!(!users.mark_verified(id, "111111").await.unwrap());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_find_by_email_unknown(pool: PgPool) {
    let users = PgUserRepository::new(pool);

    assert!(users.find_by_email("nobody@example.com").await.unwrap().is_none());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_school_insert_and_list_newest_first(pool: PgPool) {
    let users = PgUserRepository::new(pool.clone());
    let schools = PgSchoolRepository::new(pool);
    let owner = verified_user(&users).await;

    let first = schools.insert(&new_school("First", owner)).await.unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    let second = schools.insert(&new_school("Second", owner)).await.unwrap();

    assert_eq!(first.creator_id, owner);
    let listed = schools.list().await.unwrap();
    let ids: Vec<SchoolId> = listed.iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![second.id, first.id]);

    let found = schools.find_by_id(first.id).await.unwrap().unwrap();
    assert_eq!(found.name, "First");
    assert_eq!(found.image_key, format!("schools/{}.png", first.id));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_school_writes_require_owner(pool: PgPool) {
    let users = PgUserRepository::new(pool.clone());
    let schools = PgSchoolRepository::new(pool);
    let owner = verified_user(&users).await;
    let other = verified_user(&users).await;
    let school = schools.insert(&new_school("Hill", owner)).await.unwrap();

    let changes = SchoolChanges {
        details: SchoolDetailsPatch {
            name: Some("Taken".to_string()),
            ..Default::default()
        },
        image: None,
    };

    assert!(schools.find_owned(school.id, other).await.unwrap().is_none());
    assert!(
        schools
            .update_owned(school.id, other, &changes)
            .await
            .unwrap()
            .is_none()
    );
    assert!(schools.delete_owned(school.id, other).await.unwrap().is_none());
    assert_eq!(
        schools.find_by_id(school.id).await.unwrap().unwrap().name,
        "Hill"
    );
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_school_update_keeps_absent_fields(pool: PgPool) {
    let users = PgUserRepository::new(pool.clone());
    let schools = PgSchoolRepository::new(pool);
    let owner = verified_user(&users).await;
    let school = schools.insert(&new_school("Hill", owner)).await.unwrap();

    let changes = SchoolChanges {
        details: SchoolDetailsPatch {
            city: Some("Mumbai".to_string()),
            ..Default::default()
        },
        image: Some(StoredImage {
            url: "http://localhost:3000/files/schools/new.webp".to_string(),
            key: "schools/new.webp".to_string(),
        }),
    };

    let updated = schools
        .update_owned(school.id, owner, &changes)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(updated.city, "Mumbai");
    assert_eq!(updated.name, "Hill");
    assert_eq!(updated.address, school.address);
    assert_eq!(updated.image_key, "schools/new.webp");
    assert!(updated.updated_at >= school.updated_at);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_school_delete_returns_removed_row(pool: PgPool) {
    let users = PgUserRepository::new(pool.clone());
    let schools = PgSchoolRepository::new(pool);
    let owner = verified_user(&users).await;
    let school = schools.insert(&new_school("Hill", owner)).await.unwrap();

    let deleted = schools
        .delete_owned(school.id, owner)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(deleted.id, school.id);
    assert_eq!(deleted.image_key, school.image_key);
    assert!(schools.find_by_id(school.id).await.unwrap().is_none());
}

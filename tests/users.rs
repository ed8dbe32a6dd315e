mod common;

use wall::auth::{hash_password, verify_password};
use wall::model::entity::UserUpdate;

use crate::common::setup_test_db;

#[tokio::test]
async fn create_user_test() {
    let Some(test_db) = setup_test_db(2).await else {
        return;
    };
    let db = &test_db.db;

    let hash = hash_password("foobaz").unwrap();
    let user = db.create_user("foobar", &hash).await.unwrap();
    assert_eq!(user.username(), "foobar");
    assert_eq!(user.role(), "user");
    assert_eq!(user.status(), "active");
    assert!(user.last_login().is_none());
    assert!(verify_password(user.hash(), "foobaz").unwrap());

    let by_name = db.get_user_by_username("foobar").await.unwrap().unwrap();
    assert_eq!(by_name.id(), user.id());
    let by_id = db.get_user_by_id(user.id()).await.unwrap().unwrap();
    assert_eq!(by_id.username(), "foobar");

    assert!(db.get_user_by_username("nobody").await.unwrap().is_none());
    assert!(db.get_user_by_id(uuid::Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_username_test() {
    let Some(test_db) = setup_test_db(2).await else {
        return;
    };
    let db = &test_db.db;

    db.create_user("twice", "hash").await.unwrap();
    let err = db.create_user("twice", "hash").await.unwrap_err();
    assert!(err.is_unique_violation());
    assert!(!err.is_retryable());
    assert_eq!(db.pool().idle_count(), 2);
}

#[tokio::test]
async fn update_user_test() {
    let Some(test_db) = setup_test_db(2).await else {
        return;
    };
    let db = &test_db.db;
    let user = db.create_user("before", "hash").await.unwrap();

    let updated = db
        .update_user(
            user.id(),
            UserUpdate {
                username: "after".to_string(),
                profile_avatar_uri: Some("https://cdn.example/avatar.png".to_string()),
                profile_banner_uri: None,
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.id(), user.id());
    assert_eq!(updated.username(), "after");
    assert_eq!(updated.profile_avatar_uri(), Some("https://cdn.example/avatar.png"));
    assert!(db.get_user_by_username("before").await.unwrap().is_none());

    let missing = db
        .update_user(
            uuid::Uuid::new_v4(),
            UserUpdate {
                username: "ghost".to_string(),
                profile_avatar_uri: None,
                profile_banner_uri: None,
            },
        )
        .await
        .unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
async fn last_login_test() {
    let Some(test_db) = setup_test_db(2).await else {
        return;
    };
    let db = &test_db.db;
    let user = db.create_user("sleepy", "hash").await.unwrap();

    assert!(db.update_last_login(user.id()).await.unwrap());
    let user = db.get_user_by_id(user.id()).await.unwrap().unwrap();
    assert!(user.last_login().is_some());

    assert!(!db.update_last_login(uuid::Uuid::new_v4()).await.unwrap());
}

#[tokio::test]
async fn delete_user_cascades_test() {
    let Some(test_db) = setup_test_db(2).await else {
        return;
    };
    let db = &test_db.db;
    let user = db.create_user("leaving", "hash").await.unwrap();
    let post = db
        .create_post(wall::model::entity::PostCreate {
            author_id: user.id(),
            text: Some("bye".to_string()),
            image_uri: None,
        })
        .await
        .unwrap();

    assert!(db.delete_user(user.id()).await.unwrap());
    assert!(!db.delete_user(user.id()).await.unwrap());
    assert!(db.get_post_by_id(post.id()).await.unwrap().is_none());
}

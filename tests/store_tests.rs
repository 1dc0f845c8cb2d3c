//! Durable-store behavior against a real libsql database file.

use chrono::Utc;
use tempfile::TempDir;

use aegis::store::{CredentialStore, LibsqlStore, NewCredential, ProfileFields};
use aegis::types::{AuthError, Role};

fn new_credential(email: &str, username: &str) -> NewCredential {
    NewCredential {
        email: email.to_string(),
        username: username.to_string(),
        password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdHNhbHQ$aGFzaGhhc2g".to_string(),
        role: Role::User,
        is_active: true,
        subject: None,
        profile: ProfileFields {
            first_name: Some("Alice".to_string()),
            last_name: None,
            display_name: Some("alice".to_string()),
        },
    }
}

async fn open_store(dir: &TempDir) -> LibsqlStore {
    let path = dir.path().join("store.db");
    LibsqlStore::new_local(path.to_str().unwrap()).await.unwrap()
}

#[tokio::test]
async fn create_and_find_by_every_key() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;

    let created = store.create(new_credential("alice@x.com", "alice")).await.unwrap();
    assert!(!created.id.is_empty());
    assert!(created.last_login_at.is_none());

    let by_id = store.find_by_id(&created.id).await.unwrap().unwrap();
    assert_eq!(by_id.email, "alice@x.com");

    let by_email = store.find_by_email("alice@x.com").await.unwrap().unwrap();
    assert_eq!(by_email.id, created.id);

    let by_username = store.find_by_username("alice").await.unwrap().unwrap();
    assert_eq!(by_username.id, created.id);

    assert!(store.find_by_email("ghost@x.com").await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_email_and_username_are_conflicts() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;

    store.create(new_credential("alice@x.com", "alice")).await.unwrap();

    let same_email = store
        .create(new_credential("alice@x.com", "alice2"))
        .await
        .unwrap_err();
    assert!(matches!(same_email, AuthError::AlreadyExists));

    let same_username = store
        .create(new_credential("alice2@x.com", "alice"))
        .await
        .unwrap_err();
    assert!(matches!(same_username, AuthError::AlreadyExists));
}

#[tokio::test]
async fn update_persists_mutable_fields() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;

    let mut credential = store.create(new_credential("alice@x.com", "alice")).await.unwrap();

    credential.is_active = false;
    credential.subject = Some("ext-subject-1".to_string());
    credential.last_login_at = Some(Utc::now());
    store.update(&credential).await.unwrap();

    let reloaded = store.find_by_id(&credential.id).await.unwrap().unwrap();
    assert!(!reloaded.is_active);
    assert_eq!(reloaded.subject.as_deref(), Some("ext-subject-1"));
    assert!(reloaded.last_login_at.is_some());

    let by_subject = store.find_by_subject("ext-subject-1").await.unwrap().unwrap();
    assert_eq!(by_subject.id, credential.id);
}

#[tokio::test]
async fn update_of_unknown_id_is_not_found() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;

    let mut credential = store.create(new_credential("alice@x.com", "alice")).await.unwrap();
    credential.id = "no-such-id".to_string();

    let err = store.update(&credential).await.unwrap_err();
    assert!(matches!(err, AuthError::NotFound));
}

#[tokio::test]
async fn list_all_returns_records_in_creation_order() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;

    store.create(new_credential("a@x.com", "a")).await.unwrap();
    store.create(new_credential("b@x.com", "b")).await.unwrap();
    store.create(new_credential("c@x.com", "c")).await.unwrap();

    let all = store.list_all().await.unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(all[0].email, "a@x.com");
    assert_eq!(all[2].email, "c@x.com");
}

#[tokio::test]
async fn records_survive_reopen() {
    let dir = TempDir::new().unwrap();

    let id = {
        let store = open_store(&dir).await;
        store
            .create(new_credential("alice@x.com", "alice"))
            .await
            .unwrap()
            .id
    };

    // A second handle on the same file sees the committed record.
    let store = open_store(&dir).await;
    let reloaded = store.find_by_id(&id).await.unwrap().unwrap();
    assert_eq!(reloaded.email, "alice@x.com");
    assert_eq!(reloaded.role, Role::User);
}

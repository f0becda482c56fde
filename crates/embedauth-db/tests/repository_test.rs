//! Integration tests for the SurrealDB repositories, run against an
//! in-memory engine.

use chrono::{Duration, Utc};
use embedauth_core::error::CoreError;
use embedauth_core::models::project::{CreateProject, UpdateProject};
use embedauth_core::models::session::CreateSession;
use embedauth_core::models::user::CreateUser;
use embedauth_core::repository::{ProjectRepository, SessionRepository, UserRepository};
use embedauth_db::repository::{
    SurrealProjectRepository, SurrealSessionRepository, SurrealUserRepository,
};
use embedauth_db::run_migrations;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

async fn setup() -> Surreal<Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    run_migrations(&db).await.unwrap();
    db
}

fn project_input(name: &str, api_key: &str) -> CreateProject {
    CreateProject {
        name: name.into(),
        api_key: api_key.into(),
        allowed_origins: vec![],
        theme: "dark".into(),
        redirect_url: String::new(),
    }
}

fn user_input(project_id: Uuid, email: &str) -> CreateUser {
    CreateUser {
        project_id,
        email: email.into(),
        password_hash: "$argon2id$fake".into(),
        display_name: None,
    }
}

fn session_input(project_id: Uuid, user_id: Uuid, token: &str) -> CreateSession {
    let created_at = Utc::now();
    CreateSession {
        user_id,
        project_id,
        token: token.into(),
        expires_at: created_at + Duration::days(7),
        created_at,
    }
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let db = setup().await;
    run_migrations(&db).await.unwrap();
    run_migrations(&db).await.unwrap();
}

#[tokio::test]
async fn project_create_and_lookup() {
    let db = setup().await;
    let repo = SurrealProjectRepository::new(db);

    let created = repo
        .create(CreateProject {
            name: "Acme".into(),
            api_key: "ea_acme".into(),
            allowed_origins: vec!["https://acme.test".into()],
            theme: "light".into(),
            redirect_url: "https://acme.test/welcome".into(),
        })
        .await
        .unwrap();
    assert_eq!(created.name, "Acme");
    assert_eq!(created.theme, "light");
    assert_eq!(created.allowed_origins, vec!["https://acme.test"]);

    let by_id = repo.get_by_id(created.id).await.unwrap();
    assert_eq!(by_id.api_key, "ea_acme");

    let by_key = repo.get_by_api_key("ea_acme").await.unwrap();
    assert_eq!(by_key.id, created.id);

    let err = repo.get_by_api_key("ea_nope").await.unwrap_err();
    assert!(matches!(err, CoreError::NotFound { .. }));
}

#[tokio::test]
async fn project_api_key_is_unique() {
    let db = setup().await;
    let repo = SurrealProjectRepository::new(db);

    repo.create(project_input("One", "ea_same")).await.unwrap();
    let err = repo
        .create(project_input("Two", "ea_same"))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::AlreadyExists { .. }));
}

#[tokio::test]
async fn project_partial_update() {
    let db = setup().await;
    let repo = SurrealProjectRepository::new(db);

    let created = repo.create(project_input("Before", "ea_upd")).await.unwrap();

    let updated = repo
        .update(
            created.id,
            UpdateProject {
                name: Some("After".into()),
                theme: Some("light".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.name, "After");
    assert_eq!(updated.theme, "light");
    // Untouched fields survive.
    assert_eq!(updated.api_key, "ea_upd");

    // No fields set behaves as a read.
    let unchanged = repo
        .update(created.id, UpdateProject::default())
        .await
        .unwrap();
    assert_eq!(unchanged.name, "After");
}

#[tokio::test]
async fn project_delete_cascades_users_and_sessions() {
    let db = setup().await;
    let projects = SurrealProjectRepository::new(db.clone());
    let users = SurrealUserRepository::new(db.clone());
    let sessions = SurrealSessionRepository::new(db);

    let project = projects.create(project_input("Doomed", "ea_doom")).await.unwrap();
    let user = users
        .create(user_input(project.id, "a@b.test"))
        .await
        .unwrap();
    sessions
        .create(session_input(project.id, user.id, &"a".repeat(64)))
        .await
        .unwrap();

    projects.delete(project.id).await.unwrap();

    assert!(matches!(
        projects.get_by_id(project.id).await.unwrap_err(),
        CoreError::NotFound { .. }
    ));
    assert!(matches!(
        users.get_by_email(project.id, "a@b.test").await.unwrap_err(),
        CoreError::NotFound { .. }
    ));
    assert!(matches!(
        sessions.get_valid_by_token(&"a".repeat(64)).await.unwrap_err(),
        CoreError::NotFound { .. }
    ));
}

#[tokio::test]
async fn project_listing_aggregates_counts() {
    let db = setup().await;
    let projects = SurrealProjectRepository::new(db.clone());
    let users = SurrealUserRepository::new(db.clone());
    let sessions = SurrealSessionRepository::new(db);

    let project = projects.create(project_input("Counted", "ea_cnt")).await.unwrap();
    let empty = projects.create(project_input("Empty", "ea_empty")).await.unwrap();

    let user = users
        .create(user_input(project.id, "c@d.test"))
        .await
        .unwrap();
    sessions
        .create(session_input(project.id, user.id, &"b".repeat(64)))
        .await
        .unwrap();

    // Expired session, excluded from the active count.
    let created_at = Utc::now() - Duration::days(8);
    sessions
        .create(CreateSession {
            user_id: user.id,
            project_id: project.id,
            token: "c".repeat(64),
            expires_at: created_at + Duration::days(7),
            created_at,
        })
        .await
        .unwrap();

    let listing = projects.list().await.unwrap();
    assert_eq!(listing.len(), 2);

    let counted = listing.iter().find(|s| s.project.id == project.id).unwrap();
    assert_eq!(counted.user_count, 1);
    assert_eq!(counted.active_session_count, 1);

    let empty = listing.iter().find(|s| s.project.id == empty.id).unwrap();
    assert_eq!(empty.user_count, 0);
    assert_eq!(empty.active_session_count, 0);
}

#[tokio::test]
async fn user_duplicate_email_is_rejected_by_index() {
    let db = setup().await;
    let projects = SurrealProjectRepository::new(db.clone());
    let users = SurrealUserRepository::new(db);

    let project = projects.create(project_input("Dup", "ea_dup")).await.unwrap();

    users.create(user_input(project.id, "dup@x.test")).await.unwrap();
    let err = users
        .create(user_input(project.id, "dup@x.test"))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::AlreadyExists { .. }));
}

#[tokio::test]
async fn same_email_allowed_across_projects() {
    let db = setup().await;
    let projects = SurrealProjectRepository::new(db.clone());
    let users = SurrealUserRepository::new(db);

    let p1 = projects.create(project_input("P1", "ea_p1")).await.unwrap();
    let p2 = projects.create(project_input("P2", "ea_p2")).await.unwrap();

    users.create(user_input(p1.id, "same@x.test")).await.unwrap();
    users.create(user_input(p2.id, "same@x.test")).await.unwrap();

    let u1 = users.get_by_email(p1.id, "same@x.test").await.unwrap();
    let u2 = users.get_by_email(p2.id, "same@x.test").await.unwrap();
    assert_ne!(u1.id, u2.id);
}

#[tokio::test]
async fn user_lookup_is_tenant_scoped() {
    let db = setup().await;
    let projects = SurrealProjectRepository::new(db.clone());
    let users = SurrealUserRepository::new(db);

    let p1 = projects.create(project_input("P1", "ea_s1")).await.unwrap();
    let p2 = projects.create(project_input("P2", "ea_s2")).await.unwrap();

    let user = users.create(user_input(p1.id, "only@p1.test")).await.unwrap();

    assert!(users.get_by_id(p1.id, user.id).await.is_ok());
    assert!(matches!(
        users.get_by_id(p2.id, user.id).await.unwrap_err(),
        CoreError::NotFound { .. }
    ));
    assert!(matches!(
        users.get_by_email(p2.id, "only@p1.test").await.unwrap_err(),
        CoreError::NotFound { .. }
    ));
}

#[tokio::test]
async fn set_last_login_round_trips() {
    let db = setup().await;
    let projects = SurrealProjectRepository::new(db.clone());
    let users = SurrealUserRepository::new(db);

    let project = projects.create(project_input("LL", "ea_ll")).await.unwrap();
    let user = users.create(user_input(project.id, "ll@x.test")).await.unwrap();
    assert!(user.last_login.is_none());

    let at = Utc::now();
    users.set_last_login(project.id, user.id, at).await.unwrap();

    let reread = users.get_by_id(project.id, user.id).await.unwrap();
    assert_eq!(reread.last_login, Some(at));
}

#[tokio::test]
async fn user_delete_cascades_sessions() {
    let db = setup().await;
    let projects = SurrealProjectRepository::new(db.clone());
    let users = SurrealUserRepository::new(db.clone());
    let sessions = SurrealSessionRepository::new(db);

    let project = projects.create(project_input("UD", "ea_ud")).await.unwrap();
    let user = users.create(user_input(project.id, "ud@x.test")).await.unwrap();
    sessions
        .create(session_input(project.id, user.id, &"d".repeat(64)))
        .await
        .unwrap();

    users.delete(project.id, user.id).await.unwrap();

    assert!(users.get_by_id(project.id, user.id).await.is_err());
    assert!(sessions.get_valid_by_token(&"d".repeat(64)).await.is_err());
}

#[tokio::test]
async fn session_token_is_unique() {
    let db = setup().await;
    let projects = SurrealProjectRepository::new(db.clone());
    let users = SurrealUserRepository::new(db.clone());
    let sessions = SurrealSessionRepository::new(db);

    let project = projects.create(project_input("ST", "ea_st")).await.unwrap();
    let user = users.create(user_input(project.id, "st@x.test")).await.unwrap();

    sessions
        .create(session_input(project.id, user.id, &"e".repeat(64)))
        .await
        .unwrap();
    let err = sessions
        .create(session_input(project.id, user.id, &"e".repeat(64)))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::AlreadyExists { .. }));
}

#[tokio::test]
async fn expired_sessions_are_invisible_to_token_lookup() {
    let db = setup().await;
    let projects = SurrealProjectRepository::new(db.clone());
    let users = SurrealUserRepository::new(db.clone());
    let sessions = SurrealSessionRepository::new(db);

    let project = projects.create(project_input("EX", "ea_ex")).await.unwrap();
    let user = users.create(user_input(project.id, "ex@x.test")).await.unwrap();

    let created_at = Utc::now() - Duration::days(8);
    sessions
        .create(CreateSession {
            user_id: user.id,
            project_id: project.id,
            token: "f".repeat(64),
            expires_at: created_at + Duration::days(7),
            created_at,
        })
        .await
        .unwrap();

    let err = sessions.get_valid_by_token(&"f".repeat(64)).await.unwrap_err();
    assert!(matches!(err, CoreError::NotFound { .. }));
}

#[tokio::test]
async fn cleanup_expired_deletes_only_stale_sessions() {
    let db = setup().await;
    let projects = SurrealProjectRepository::new(db.clone());
    let users = SurrealUserRepository::new(db.clone());
    let sessions = SurrealSessionRepository::new(db);

    let project = projects.create(project_input("CL", "ea_cl")).await.unwrap();
    let user = users.create(user_input(project.id, "cl@x.test")).await.unwrap();

    sessions
        .create(session_input(project.id, user.id, &"1".repeat(64)))
        .await
        .unwrap();

    for token in ["2", "3"] {
        let created_at = Utc::now() - Duration::days(9);
        sessions
            .create(CreateSession {
                user_id: user.id,
                project_id: project.id,
                token: token.repeat(64),
                expires_at: created_at + Duration::days(7),
                created_at,
            })
            .await
            .unwrap();
    }

    let removed = sessions.cleanup_expired(project.id).await.unwrap();
    assert_eq!(removed, 2);

    // The live session is untouched.
    assert!(sessions.get_valid_by_token(&"1".repeat(64)).await.is_ok());

    let removed_again = sessions.cleanup_expired(project.id).await.unwrap();
    assert_eq!(removed_again, 0);
}

//! # Access Commands
//!
//! First-run setup, login, logout and the session guard.
//!
//! ## Startup Routing
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Startup Route                                        │
//! │                                                                         │
//! │  users (strict read) ── error? ──► ApiError (never "no users")         │
//! │       │                                                                 │
//! │       ├── empty ───────────────► Setup   → setup_admin()               │
//! │       │                                                                 │
//! │       └── not empty                                                     │
//! │             │                                                           │
//! │             ├── no session ────► Login   → login()                      │
//! │             └── session ───────► Home(user)                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Passwords
//! Stored as argon2id PHC strings with a random salt. There is no lockout
//! and no distinction between "unknown login" and "wrong password".

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use construflow_core::validation::{validate_login, validate_name, validate_password};
use construflow_core::{SessionUser, User, UserProfile};

use crate::error::{ApiError, ApiResult, ErrorCode};
use crate::state::DbState;

/// Where the front end should go at startup.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "route", content = "user", rename_all = "camelCase")]
pub enum StartupRoute {
    /// No users exist: show the administrator setup form.
    Setup,
    /// Users exist but nobody is logged in.
    Login,
    /// A session is stored.
    Home(SessionUser),
}

/// Decides the startup route from the users collection and the session.
pub async fn startup_route(db: &DbState) -> ApiResult<StartupRoute> {
    debug!("startup_route command");

    let users = db.inner().users().list().await?;
    if users.is_empty() {
        return Ok(StartupRoute::Setup);
    }

    match db.inner().session().get().await? {
        Some(user) => Ok(StartupRoute::Home(user)),
        None => Ok(StartupRoute::Login),
    }
}

/// Creates the first administrator account and logs it in.
///
/// ## Errors
/// - `ALREADY_INITIALIZED` when any user exists
/// - `VALIDATION_ERROR` for an empty name, bad login or short password
pub async fn setup_admin(
    db: &DbState,
    name: &str,
    login: &str,
    password: &str,
) -> ApiResult<SessionUser> {
    debug!(login = %login, "setup_admin command");

    let name = name.trim();
    let login = login.trim();
    validate_name("name", name)?;
    validate_login(login)?;
    validate_password(password)?;

    let users_repo = db.inner().users();
    let users = users_repo.list().await?;
    if !users.is_empty() {
        return Err(ApiError::new(
            ErrorCode::AlreadyInitialized,
            "Setup has already been completed",
        ));
    }

    let admin = User {
        id: Uuid::now_v7().to_string(),
        name: name.to_string(),
        login: login.to_string(),
        profile: UserProfile::Admin,
        active: true,
        password_hash: hash_password(password)?,
    };
    let session = SessionUser::from(&admin);

    // the account and its session land together or not at all
    let mut uow = db.inner().unit_of_work();
    uow.stage(&users_repo, std::slice::from_ref(&admin))?
        .stage_session(&session)?;
    uow.commit().await?;

    info!(user_id = %admin.id, login = %admin.login, "Administrator created");
    Ok(session)
}

/// Checks credentials and stores the session.
///
/// ## Errors
/// - `SETUP_REQUIRED` when no users exist
/// - `AUTH_FAILED` for an unknown login or wrong password
/// - `ACCOUNT_DISABLED` when the password matches a deactivated account
pub async fn login(db: &DbState, login: &str, password: &str) -> ApiResult<SessionUser> {
    debug!(login = %login, "login command");

    let users = db.inner().users().list().await?;
    if users.is_empty() {
        return Err(ApiError::setup_required());
    }

    let login = login.trim();
    let user = users
        .iter()
        .find(|u| u.login == login)
        .ok_or_else(ApiError::invalid_credentials)?;

    if !verify_password(password, &user.password_hash) {
        warn!(login = %login, "Failed login attempt");
        return Err(ApiError::invalid_credentials());
    }

    if !user.active {
        warn!(login = %login, "Login to disabled account");
        return Err(ApiError::account_disabled());
    }

    let session = SessionUser::from(user);
    db.inner().session().set(&session).await?;

    info!(user_id = %user.id, "User logged in");
    Ok(session)
}

/// Removes the stored session.
pub async fn logout(db: &DbState) -> ApiResult<()> {
    debug!("logout command");
    db.inner().session().clear().await?;
    info!("User logged out");
    Ok(())
}

/// The logged-in user, if any.
pub async fn current_user(db: &DbState) -> ApiResult<Option<SessionUser>> {
    debug!("current_user command");
    Ok(db.inner().session().get().await?)
}

/// Guard for every command behind the login screen.
pub async fn require_session(db: &DbState) -> ApiResult<SessionUser> {
    current_user(db).await?.ok_or_else(ApiError::not_authenticated)
}

// =============================================================================
// Password Hashing
// =============================================================================

fn hash_password(password: &str) -> ApiResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| {
            tracing::error!("Password hashing failed: {}", e);
            ApiError::internal("Could not hash password")
        })
}

fn verify_password(password: &str, stored: &str) -> bool {
    match PasswordHash::new(stored) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            warn!("Stored password hash is unreadable: {}", e);
            false
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use construflow_db::{Database, MemoryStore};

    fn db() -> DbState {
        DbState::new(Database::in_memory())
    }

    #[tokio::test]
    async fn test_first_run_routes_to_setup() {
        let db = db();
        assert_eq!(startup_route(&db).await.unwrap(), StartupRoute::Setup);

        let err = login(&db, "admin", "secret1").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::SetupRequired);
    }

    #[tokio::test]
    async fn test_setup_creates_one_admin_and_logs_in() {
        let db = db();
        let session = setup_admin(&db, "Admin System", "admin", "secret1").await.unwrap();

        let users = db.inner().users().list().await.unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].profile, UserProfile::Admin);
        assert!(users[0].active);
        assert_ne!(users[0].password_hash, "secret1");

        assert_eq!(startup_route(&db).await.unwrap(), StartupRoute::Home(session));

        let err = setup_admin(&db, "Other", "other", "secret2").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::AlreadyInitialized);
        assert_eq!(db.inner().users().list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_setup_leaves_no_user_behind() {
        let memory = Arc::new(MemoryStore::new());
        let db = DbState::new(Database::with_store(memory.clone()));

        memory.fail_writes(true);
        let err = setup_admin(&db, "Admin System", "admin", "secret1").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::StorageError);
        memory.fail_writes(false);

        assert!(db.inner().users().list().await.unwrap().is_empty());
        assert_eq!(db.inner().session().get().await.unwrap(), None);
        assert_eq!(startup_route(&db).await.unwrap(), StartupRoute::Setup);

        // retry succeeds
        setup_admin(&db, "Admin System", "admin", "secret1").await.unwrap();
        assert!(matches!(startup_route(&db).await.unwrap(), StartupRoute::Home(_)));
    }

    #[tokio::test]
    async fn test_setup_validates_input() {
        let db = db();
        let err = setup_admin(&db, "Admin", "admin", "123").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(db.inner().users().list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_login_requires_matching_credentials() {
        let db = db();
        setup_admin(&db, "Admin", "admin", "secret1").await.unwrap();
        logout(&db).await.unwrap();
        assert_eq!(startup_route(&db).await.unwrap(), StartupRoute::Login);

        let err = login(&db, "admin", "wrong-password").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::AuthFailed);
        let err = login(&db, "nobody", "secret1").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::AuthFailed);
        assert!(current_user(&db).await.unwrap().is_none());

        let session = login(&db, "admin", "secret1").await.unwrap();
        assert_eq!(session.login, "admin");
        assert_eq!(require_session(&db).await.unwrap(), session);
    }

    #[tokio::test]
    async fn test_login_rejects_disabled_account() {
        let db = db();
        setup_admin(&db, "Admin", "admin", "secret1").await.unwrap();
        logout(&db).await.unwrap();

        let users_repo = db.inner().users();
        let mut users = users_repo.list().await.unwrap();
        users[0].active = false;
        users_repo.replace_all(&users).await.unwrap();

        let err = login(&db, "admin", "secret1").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::AccountDisabled);
        assert_eq!(
            require_session(&db).await.unwrap_err().code,
            ErrorCode::NotAuthenticated
        );
    }

    #[test]
    fn test_password_hash_roundtrip() {
        let hash = hash_password("secret1").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("secret1", &hash));
        assert!(!verify_password("secret2", &hash));
        assert!(!verify_password("secret1", "not-a-hash"));
    }
}

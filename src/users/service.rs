use lazy_static::lazy_static;
use regex::Regex;
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::password::{hash_password, verify_password};
use crate::error::ApiError;

use super::dto::{CreateUserRequest, ReplaceUserRequest, UpdateUserRequest};
use super::model::{PublicUser, User};
use super::repo::{is_unique_violation, UserChanges, UserReplacement};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Argon2 is CPU-bound; run it on the blocking pool so concurrent
/// requests keep making progress.
async fn hash_blocking(plain: String) -> Result<String, ApiError> {
    tokio::task::spawn_blocking(move || hash_password(&plain))
        .await
        .map_err(|e| ApiError::Internal(anyhow::anyhow!(e)))?
        .map_err(ApiError::Hashing)
}

async fn verify_blocking(plain: String, hash: String) -> Result<bool, ApiError> {
    tokio::task::spawn_blocking(move || verify_password(&plain, &hash))
        .await
        .map_err(|e| ApiError::Internal(anyhow::anyhow!(e)))?
        .map_err(ApiError::Hashing)
}

fn check_email(email: &str) -> Result<(), ApiError> {
    if !is_valid_email(email) {
        warn!(email = %email, "invalid email");
        return Err(ApiError::Validation("invalid email".into()));
    }
    Ok(())
}

pub async fn create_user(db: &PgPool, req: CreateUserRequest) -> Result<PublicUser, ApiError> {
    check_email(&req.email)?;

    // Fast path only; the unique index covers the race window.
    if User::find_by_email(db, &req.email).await?.is_some() {
        warn!(email = %req.email, "email already registered");
        return Err(ApiError::Conflict);
    }

    let hash = hash_blocking(req.password).await?;
    let user = match User::insert(db, &req.name, &req.email, req.age, &hash).await {
        Ok(u) => u,
        Err(e) if is_unique_violation(&e) => {
            warn!(email = %req.email, "lost uniqueness race on insert");
            return Err(ApiError::Conflict);
        }
        Err(e) => return Err(e.into()),
    };

    info!(user_id = %user.id, email = %user.email, "user created");
    Ok(user)
}

pub async fn get_users(db: &PgPool) -> Result<Vec<PublicUser>, ApiError> {
    Ok(PublicUser::find_all(db).await?)
}

pub async fn get_user_by_id(db: &PgPool, id: Uuid) -> Result<PublicUser, ApiError> {
    PublicUser::find_by_id(db, id)
        .await?
        .ok_or(ApiError::NotFound(id))
}

pub async fn update_user(
    db: &PgPool,
    id: Uuid,
    req: UpdateUserRequest,
) -> Result<PublicUser, ApiError> {
    if let Some(email) = &req.email {
        check_email(email)?;
    }

    let password_hash = match req.password {
        Some(plain) => Some(hash_blocking(plain).await?),
        None => None,
    };

    let changes = UserChanges {
        name: req.name,
        email: req.email,
        age: req.age,
        password_hash,
    };

    let updated = match PublicUser::update_by_id(db, id, changes).await {
        Ok(u) => u,
        Err(e) if is_unique_violation(&e) => return Err(ApiError::Conflict),
        Err(e) => return Err(e.into()),
    };

    let user = updated.ok_or(ApiError::NotFound(id))?;
    info!(user_id = %user.id, "user updated");
    Ok(user)
}

pub async fn replace_user(
    db: &PgPool,
    id: Uuid,
    req: ReplaceUserRequest,
) -> Result<PublicUser, ApiError> {
    check_email(&req.email)?;

    let replacement = UserReplacement {
        name: req.name,
        email: req.email,
        age: req.age,
        password_hash: hash_blocking(req.password).await?,
    };

    let replaced = match PublicUser::replace_by_id(db, id, replacement).await {
        Ok(u) => u,
        Err(e) if is_unique_violation(&e) => return Err(ApiError::Conflict),
        Err(e) => return Err(e.into()),
    };

    let user = replaced.ok_or(ApiError::NotFound(id))?;
    info!(user_id = %user.id, "user replaced");
    Ok(user)
}

pub async fn delete_user(db: &PgPool, id: Uuid) -> Result<(), ApiError> {
    if !User::delete_by_id(db, id).await? {
        return Err(ApiError::NotFound(id));
    }
    info!(user_id = %id, "user deleted");
    Ok(())
}

/// Look up by email and check the password. Unknown email and wrong
/// password are indistinguishable to the caller.
pub async fn validate_credentials(
    db: &PgPool,
    email: &str,
    password: &str,
) -> Result<User, ApiError> {
    let user = match User::find_by_email(db, email).await? {
        Some(u) => u,
        None => {
            warn!(email = %email, "sign-in with unknown email");
            return Err(ApiError::Unauthorized("invalid credentials"));
        }
    };

    let ok = verify_blocking(password.to_string(), user.password_hash.clone()).await?;
    if !ok {
        warn!(user_id = %user.id, "sign-in with wrong password");
        return Err(ApiError::Unauthorized("invalid credentials"));
    }

    Ok(user)
}

//! Startup provisioning.

use sentry_core::roles::ROLE_ADMIN;
use sentry_db::models::user::NewUser;
use sentry_db::Store;

use crate::auth::password::{hash_password, validate_password_strength, MIN_PASSWORD_LENGTH};
use crate::config::AdminBootstrap;
use crate::error::{AppError, AppResult};

/// Create the initial admin unless a user with that email already exists.
///
/// Returns whether a user was created.
pub async fn ensure_admin(store: &dyn Store, admin: &AdminBootstrap) -> AppResult<bool> {
    if store.find_user_by_email(&admin.email).await?.is_some() {
        tracing::debug!(email = %admin.email, "Admin user already present");
        return Ok(false);
    }

    validate_password_strength(&admin.password, MIN_PASSWORD_LENGTH)
        .map_err(AppError::BadRequest)?;
    let password_hash = hash_password(&admin.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = store
        .create_user(&NewUser {
            email: admin.email.trim().to_string(),
            display_name: "Administrator".to_string(),
            password_hash,
            role: ROLE_ADMIN.to_string(),
        })
        .await?;

    tracing::info!(user_id = user.id, email = %user.email, "Admin user created");
    Ok(true)
}

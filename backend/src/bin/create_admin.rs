//! Idempotent admin account seeding.
//!
//! Registration over HTTP only ever creates standard accounts, so the first
//! admin is provisioned out of band with this binary. Re-running against an
//! existing admin email is a no-op.
//!
//! Required environment: `DATABASE_URL`, `ADMIN_USERNAME`, `ADMIN_EMAIL`,
//! `ADMIN_PASSWORD`.

use std::env;

use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};
use zeroize::Zeroizing;

use hometrix_backend::domain::password::hash_password;
use hometrix_backend::domain::ports::UserRepository;
use hometrix_backend::domain::{EmailAddress, NewUser, Role, Username};
use hometrix_backend::outbound::persistence::{DbPool, DieselUserRepository, PoolConfig};

fn required_var(name: &str) -> std::io::Result<String> {
    env::var(name).map_err(|_| std::io::Error::other(format!("{name} must be set")))
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let database_url = required_var("DATABASE_URL")?;
    let username = Username::new(required_var("ADMIN_USERNAME")?)
        .map_err(|err| std::io::Error::other(format!("invalid ADMIN_USERNAME: {err}")))?;
    let email = EmailAddress::new(required_var("ADMIN_EMAIL")?)
        .map_err(|err| std::io::Error::other(format!("invalid ADMIN_EMAIL: {err}")))?;
    let password = Zeroizing::new(required_var("ADMIN_PASSWORD")?);

    let pool = DbPool::new(PoolConfig::new(database_url))
        .await
        .map_err(|err| std::io::Error::other(err.into_message()))?;
    let users = DieselUserRepository::new(pool);

    if let Some(existing) = users
        .find_by_email(&email)
        .await
        .map_err(|err| std::io::Error::other(err.to_string()))?
    {
        info!(user_id = %existing.id(), role = %existing.role(), "admin email already registered, nothing to do");
        return Ok(());
    }

    let password_hash = hash_password(&password)
        .map_err(|err| std::io::Error::other(format!("password hashing failed: {err}")))?;
    let user = users
        .create(NewUser {
            username,
            email,
            password_hash,
            role: Role::Admin,
        })
        .await
        .map_err(|err| std::io::Error::other(err.to_string()))?;

    info!(user_id = %user.id(), "admin account created");
    Ok(())
}

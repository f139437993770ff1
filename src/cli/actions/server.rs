use crate::api::{self, AppState};
use crate::auth::{
    AuthenticationEngine, CredentialValidator, MemoryCredentialValidator, PgCredentialValidator,
};
use crate::cli::actions::{Action, StoreKind};
use crate::cli::telemetry;
use crate::roles::{RoleResolver, StaticRoleResolver};
use crate::sso::filters::CookieInformation;
use crate::sso::{FileSsoStorage, SharedMapSsoStorage, SsoStorage};
use anyhow::{anyhow, Context, Result};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// Handle the server action
pub async fn handle(action: Action) -> Result<()> {
    let Action::Server {
        port,
        context_path,
        cookie_name,
        cookie_domain,
        store,
        sso_file,
        role_mappings,
        users,
        dsn,
        logout_path,
    } = action;

    let storage: Arc<dyn SsoStorage> = match store {
        StoreKind::Memory => Arc::new(SharedMapSsoStorage::new()),
        StoreKind::File => {
            warn!("file-backed sso storage is single-writer; meant for development");
            match sso_file {
                Some(path) => Arc::new(FileSsoStorage::new(path)),
                None => Arc::new(FileSsoStorage::default()),
            }
        }
    };

    let resolver: Arc<dyn RoleResolver> = match role_mappings {
        Some(path) => Arc::new(
            StaticRoleResolver::from_file(&path)
                .with_context(|| format!("failed to load role mappings from {}", path.display()))?,
        ),
        None => {
            warn!("no role mappings configured; every scope resolves to the empty role set");
            Arc::new(StaticRoleResolver::new())
        }
    };

    let validator: Arc<dyn CredentialValidator> = if let Some(path) = users {
        Arc::new(
            MemoryCredentialValidator::from_file(&path)
                .with_context(|| format!("failed to load users from {}", path.display()))?,
        )
    } else {
        let dsn = dsn.ok_or_else(|| anyhow!("either --users or --dsn is required"))?;

        // Connect to database
        let pool = PgPoolOptions::new()
            .min_connections(1)
            .max_connections(5)
            .max_lifetime(Duration::from_secs(60 * 2))
            .test_before_acquire(true)
            .connect(&dsn)
            .await
            .context("Failed to connect to database")?;

        Arc::new(PgCredentialValidator::new(pool))
    };

    let engine = AuthenticationEngine::new(validator, resolver.clone());
    let cookie = CookieInformation::new(cookie_name, cookie_domain);
    let state = AppState::new(engine, storage, resolver, cookie, context_path, logout_path)?;

    api::serve(port, state).await?;

    telemetry::shutdown_tracer();

    Ok(())
}

//! Postgres-backed credential source.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use sqlx::{PgPool, Row};
use std::collections::BTreeSet;
use tracing::{error, info_span, warn, Instrument};

use super::CredentialValidator;
use crate::hash::HashedCredential;
use crate::principal::Principal;
use crate::scope::HostScope;

/// Every account implicitly belongs to this group; role mappings rely on it
/// for roles granted to all authenticated users.
const CATCH_ALL_GROUP: &str = "*";

/// Credential source backed by the deployment's user database.
///
/// Any internal failure is logged and reported as a validation failure;
/// callers only ever see `None`.
pub struct PgCredentialValidator {
    pool: PgPool,
}

impl PgCredentialValidator {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Check the stored credential for `username`, returning the user id on
    /// a match.
    async fn check_credentials(
        &self,
        username: &str,
        password: &SecretString,
    ) -> anyhow::Result<Option<i64>> {
        let query = "SELECT user_id, password_hash FROM passwords \
                     WHERE lower(login_name) = lower($1) AND active";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let rows = sqlx::query(query)
            .bind(username)
            .fetch_all(&self.pool)
            .instrument(span)
            .await?;

        if rows.is_empty() {
            return Ok(None);
        }
        if rows.len() > 1 {
            warn!("{} credential rows match one login name", rows.len());
            return Ok(None);
        }

        let row = &rows[0];
        let stored: String = row.get("password_hash");
        let Some(credential) = HashedCredential::parse(&stored) else {
            warn!("unparseable stored credential for this login name");
            return Ok(None);
        };
        if !credential.verify(password.expose_secret()) {
            return Ok(None);
        }
        Ok(Some(row.get("user_id")))
    }

    /// Load profile fields and group memberships for a validated user.
    async fn load_principal(&self, username: &str, user_id: i64) -> anyhow::Result<Principal> {
        let query = "SELECT first_name, middle_name, last_name, email \
                     FROM users WHERE user_id = $1";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(user_id)
            .fetch_one(&self.pool)
            .instrument(span)
            .await?;

        let first: Option<String> = row.get("first_name");
        let middle: Option<String> = row.get("middle_name");
        let last: Option<String> = row.get("last_name");
        let email: Option<String> = row.get("email");

        let query = "SELECT g.group_name FROM groups_members gm \
                     JOIN groups g ON gm.group_id = g.id \
                     WHERE gm.user_id = $1";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let group_rows = sqlx::query(query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .instrument(span)
            .await?;

        let mut groups: BTreeSet<String> = group_rows
            .iter()
            .map(|row| row.get("group_name"))
            .collect();
        groups.insert(CATCH_ALL_GROUP.to_string());

        Ok(Principal::new(user_id, username)
            .with_names(
                first.unwrap_or_default(),
                middle.unwrap_or_default(),
                last.unwrap_or_default(),
            )
            .with_email(email.unwrap_or_default())
            .with_groups(groups))
    }
}

#[async_trait]
impl CredentialValidator for PgCredentialValidator {
    async fn validate(
        &self,
        username: &str,
        password: &SecretString,
        _scope: &HostScope,
    ) -> Option<Principal> {
        let user_id = match self.check_credentials(username, password).await {
            Ok(found) => found?,
            Err(err) => {
                error!("credential lookup failed: {err}");
                return None;
            }
        };
        match self.load_principal(username, user_id).await {
            Ok(principal) => Some(principal),
            Err(err) => {
                error!("failed to load principal data: {err}");
                None
            }
        }
    }
}

//! User lookups needed by the login flow and the token middleware

use async_trait::async_trait;
use storefront_db::{Database, User};

use crate::error::AuthError;

/// Read-only access to user identity records
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Find the user that logs in under `name`
    async fn find_by_name(&self, name: &str) -> Result<Option<User>, AuthError>;

    /// Find the user a token subject refers to
    async fn find_by_external_id(&self, external_id: &str) -> Result<Option<User>, AuthError>;
}

#[async_trait]
impl CredentialStore for Database {
    async fn find_by_name(&self, name: &str) -> Result<Option<User>, AuthError> {
        Ok(self.get_user_by_name(name).await?)
    }

    async fn find_by_external_id(&self, external_id: &str) -> Result<Option<User>, AuthError> {
        Ok(self.get_user_by_uuid(external_id).await?)
    }
}

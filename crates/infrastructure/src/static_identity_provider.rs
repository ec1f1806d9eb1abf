use async_trait::async_trait;
use gatedeck_application::IdentityProvider;
use gatedeck_core::{AppResult, UserIdentity};

/// Identity provider for a session configured up front.
#[derive(Debug, Clone)]
pub struct StaticIdentityProvider {
    identity: UserIdentity,
}

impl StaticIdentityProvider {
    /// Creates a provider that always returns `identity`.
    #[must_use]
    pub fn new(identity: UserIdentity) -> Self {
        Self { identity }
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentityProvider {
    async fn current_identity(&self) -> AppResult<UserIdentity> {
        Ok(self.identity.clone())
    }
}

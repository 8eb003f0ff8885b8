//! Application context built once at startup and passed down explicitly.

use std::time::Duration;

use crate::api::ApiClient;
use crate::credentials::{AuthVault, CredentialStore, KeyringStore};
use crate::error::Result;
use crate::models::User;
use crate::session::SessionController;
use crate::storage::Config;

/// Configuration, HTTP client, credential store and the resolved user.
pub struct AppContext {
    config: Config,
    credentials: Box<dyn CredentialStore>,
    user: Option<User>,
    api: ApiClient,
}

impl AppContext {
    /// Build from an explicit config and credential store.
    ///
    /// An unreadable credential store is logged and treated as signed out.
    pub fn new(config: Config, credentials: Box<dyn CredentialStore>) -> Result<Self> {
        let vault = AuthVault::new(credentials.as_ref());
        let (token, user) = match (vault.token(), vault.signed_in_user()) {
            (Ok(token), Ok(user)) => (token, user),
            (Err(e), _) | (_, Err(e)) => {
                tracing::warn!(error = %e, "credential store unavailable; continuing signed out");
                (None, None)
            }
        };
        let token = token.filter(|_| user.is_some());

        let api = ApiClient::new(
            &config.base_url(),
            Duration::from_secs(config.api.timeout_secs),
        )?
        .with_token(token);
        tracing::debug!(base_url = %api.base_url(), signed_in = user.is_some(), "context ready");

        Ok(Self {
            config,
            credentials,
            user,
            api,
        })
    }

    /// Config from disk and credentials from the OS keyring.
    pub fn load() -> Result<Self> {
        Self::new(Config::load()?, Box::new(KeyringStore::new()))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// The signed-in user's id, else the configured default.
    pub fn user_id(&self) -> &str {
        self.user
            .as_ref()
            .map_or(self.config.api.user_id.as_str(), |u| u.id.as_str())
    }

    pub fn vault(&self) -> AuthVault<'_> {
        AuthVault::new(self.credentials.as_ref())
    }

    /// A fresh controller for the resolved user.
    pub fn controller(&self) -> SessionController<ApiClient> {
        SessionController::new(
            self.api.clone(),
            self.user_id(),
            self.config.rest.default_secs,
        )
    }

    pub async fn sign_in(&mut self, email: &str, password: &str) -> Result<&User> {
        let auth = self.api.login(email.trim(), password).await?;
        self.remember(auth.token, auth.user)
    }

    pub async fn sign_up(&mut self, full_name: &str, email: &str, password: &str) -> Result<&User> {
        let auth = self
            .api
            .register(full_name.trim(), email.trim(), password)
            .await?;
        self.remember(auth.token, auth.user)
    }

    pub fn sign_out(&mut self) -> Result<()> {
        self.vault().clear()?;
        self.user = None;
        self.api = self.api.clone().with_token(None);
        tracing::info!("signed out");
        Ok(())
    }

    fn remember(&mut self, token: String, user: User) -> Result<&User> {
        self.vault().save(&token, &user)?;
        tracing::info!(user_id = %user.id, "signed in");
        self.api = self.api.clone().with_token(Some(token));
        Ok(self.user.insert(user))
    }
}

// src/session/store.rs
use tokio::sync::watch;
use tracing::{info, warn};

use crate::core::local_store::{
    LocalStore, SELECTED_PLAN_KEY, SESSION_KEY, TOKEN_KEY, USER_KEY, VERIFICATION_KEY,
};
use crate::core::{token, ApiClient};
use crate::error::{AutomationError, AutomationResult};
use crate::gates::CredentialGate;
use crate::types::{JobConfig, Plan, Session};

/// Single owner of the session. Readers subscribe instead of polling.
pub struct SessionStore {
    store: LocalStore,
    tx: watch::Sender<Session>,
}

impl SessionStore {
    /// Rebuild the session from local storage. An expired or missing token
    /// wipes whatever else was cached.
    pub async fn restore(store: LocalStore) -> AutomationResult<Self> {
        let session = Self::load(&store).await?;
        if !session.is_logged_in {
            store.clear_session().await?;
        }

        let (tx, _rx) = watch::channel(session);
        Ok(Self { store, tx })
    }

    async fn load(store: &LocalStore) -> AutomationResult<Session> {
        let Some(token) = store.get(TOKEN_KEY).await? else {
            return Ok(Session::default());
        };
        if !token::is_token_usable(&token) {
            warn!("Cached auth token is expired or malformed, discarding session");
            return Ok(Session::default());
        }

        let cached: Session = store.get_json(SESSION_KEY).await?.unwrap_or_default();
        let session = Session {
            user: store.get_json(USER_KEY).await?,
            is_logged_in: true,
            plan: store.get_json(SELECTED_PLAN_KEY).await?,
            config: cached.config,
            onboarding_completed: cached.onboarding_completed,
            token: Some(token),
        };

        info!(
            "Restored session for {}",
            session.email().unwrap_or("unknown user")
        );
        Ok(session)
    }

    pub fn current(&self) -> Session {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.tx.subscribe()
    }

    pub fn local_store(&self) -> &LocalStore {
        &self.store
    }

    /// `base` authenticated with the current session token
    pub fn authorized_api(&self, base: &ApiClient) -> AutomationResult<ApiClient> {
        let session = self.tx.borrow();
        match session.bearer_token() {
            Some(token) if token::is_token_usable(token) => Ok(base.with_token(token)),
            _ => Err(AutomationError::AuthRequired),
        }
    }

    pub async fn login(
        &self,
        api: &ApiClient,
        email: &str,
        password: &str,
    ) -> AutomationResult<Session> {
        let response = api.login(email, password).await?;

        self.store.set(TOKEN_KEY, &response.token).await?;
        self.store.set_json(USER_KEY, &response.user).await?;

        let previous = Self::load(&self.store).await?;
        let session = Session {
            user: Some(response.user),
            is_logged_in: true,
            token: Some(response.token),
            ..previous
        };
        self.tx.send_replace(session.clone());

        info!("Logged in as {}", email);
        Ok(session)
    }

    /// Drop the session in memory and every persisted session key
    pub async fn logout(&self) -> AutomationResult<()> {
        self.tx.send_replace(Session::default());
        self.store.clear_session().await?;
        info!("Logged out");
        Ok(())
    }

    pub async fn select_plan(&self, plan: Option<Plan>) -> AutomationResult<()> {
        self.require_login()?;
        match &plan {
            Some(plan) => self.store.set_json(SELECTED_PLAN_KEY, plan).await?,
            None => self.store.remove(SELECTED_PLAN_KEY).await?,
        }
        self.tx.send_modify(|session| session.plan = plan);
        Ok(())
    }

    pub async fn update_config(&self, config: JobConfig) -> AutomationResult<()> {
        self.require_login()?;
        self.tx.send_modify(|session| session.config = Some(config));
        self.persist_session_blob().await
    }

    pub async fn complete_onboarding(&self) -> AutomationResult<()> {
        self.require_login()?;
        self.tx
            .send_modify(|session| session.onboarding_completed = true);
        self.persist_session_blob().await
    }

    pub async fn load_verification(&self) -> AutomationResult<CredentialGate> {
        Ok(self
            .store
            .get_json(VERIFICATION_KEY)
            .await?
            .unwrap_or_default())
    }

    pub async fn save_verification(&self, gate: &CredentialGate) -> AutomationResult<()> {
        self.require_login()?;
        self.store.set_json(VERIFICATION_KEY, gate).await
    }

    fn require_login(&self) -> AutomationResult<()> {
        if self.tx.borrow().is_logged_in {
            Ok(())
        } else {
            Err(AutomationError::AuthRequired)
        }
    }

    async fn persist_session_blob(&self) -> AutomationResult<()> {
        let session = self.current();
        self.store.set_json(SESSION_KEY, &session).await
    }
}

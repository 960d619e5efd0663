use std::collections::HashSet;
use std::sync::Arc;

use crate::auth::{AuthError, AuthGateway, Identity};
use crate::entities::{Role, User};
use crate::repositories::{RepositoryError, UserRepository};
use crate::store::{AppStore, Profile, Session};

/// Bridges the auth collaborator and the user collection: reacts to identity
/// changes by loading the user document and publishing the derived session.
#[derive(Clone)]
pub struct SessionManager {
    auth: Arc<dyn AuthGateway + Send + Sync>,
    users: Arc<dyn UserRepository + Send + Sync>,
    store: Arc<AppStore>,
}

impl SessionManager {
    pub fn new(
        auth: Arc<dyn AuthGateway + Send + Sync>,
        users: Arc<dyn UserRepository + Send + Sync>,
        store: Arc<AppStore>,
    ) -> Self {
        Self { auth, users, store }
    }

    /// Registers with the auth service and provisions the user document
    /// (role taken from the form, empty membership sets).
    #[tracing::instrument(skip(self, password))]
    pub async fn sign_up(
        &self,
        name: &str,
        email: &str,
        password: &str,
        role: Role,
    ) -> Result<Session, AuthError> {
        let identity = self.auth.sign_up(email, password).await?;

        let user = User {
            id: identity.uid.clone(),
            role,
            name: name.to_string(),
            email: identity.email.clone(),
            favorites: HashSet::new(),
            joined: HashSet::new(),
        };
        let inserted = self
            .users
            .insert(user.clone())
            .await
            .map_err(|e| AuthError::Internal(e.into()))?;
        if !inserted {
            tracing::warn!("user document already provisioned for {}", identity.uid);
        }

        let session = Session::Known(Profile { user });
        self.store.set_session(session.clone());

        Ok(session)
    }

    #[tracing::instrument(skip(self, password))]
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let identity = self.auth.sign_in(email, password).await?;

        let session = self.load_session(&identity).await?;
        self.store.set_session(session.clone());

        Ok(session)
    }

    #[tracing::instrument(skip(self))]
    pub async fn sign_out(&self) -> Result<(), AuthError> {
        self.auth.sign_out().await?;
        self.store.set_session(Session::Anonymous);

        Ok(())
    }

    /// Re-derives the session from whatever identity the auth service
    /// currently holds; used at startup and on identity-change events.
    pub async fn resume(&self) -> Result<Session, AuthError> {
        let session = match self.auth.current() {
            None => Session::Anonymous,
            Some(identity) => self.load_session(&identity).await?,
        };
        self.store.set_session(session.clone());

        Ok(session)
    }

    /// Follows the auth collaborator's identity stream, re-deriving the
    /// session on every change.  Changes coalesce; only the latest identity
    /// matters.
    pub fn spawn_watcher(&self) -> tokio::task::JoinHandle<()> {
        let manager = self.clone();
        let mut rx = manager.auth.subscribe();

        tokio::spawn(async move {
            while rx.changed().await.is_ok() {
                if let Err(e) = manager.resume().await {
                    tracing::warn!("cannot derive session from identity change: {}", e);
                }
            }
        })
    }

    async fn load_session(&self, identity: &Identity) -> Result<Session, AuthError> {
        match self.users.find(&identity.uid).await {
            Ok(user) => Ok(Session::Known(Profile { user })),
            // identity without a document renders as anonymous instead of failing
            Err(RepositoryError::NotFound) => {
                tracing::warn!("no user document for identity {}", identity.uid);
                Ok(Session::Anonymous)
            },
            Err(e) => Err(AuthError::Internal(e.into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::InMemoryAuth;
    use crate::entities::User;
    use crate::prefs::InMemoryPreferences;
    use crate::repositories::mock::InMemoryRepository;

    fn manager() -> (SessionManager, Arc<AppStore>) {
        let store = Arc::new(AppStore::new(Arc::new(InMemoryPreferences::new())));
        let manager = SessionManager::new(
            Arc::new(InMemoryAuth::new()),
            Arc::new(InMemoryRepository::<User>::new()),
            store.clone(),
        );

        (manager, store)
    }

    #[tokio::test]
    async fn sign_up_provisions_user_document() {
        let (manager, store) = manager();

        let session = manager
            .sign_up("someone", "a@example.com", "hunter2", Role::User)
            .await
            .unwrap();

        let profile = session.profile().unwrap();
        assert_eq!(profile.user.email, "a@example.com");
        assert!(profile.user.favorites.is_empty());
        assert!(store.session().profile().is_some());
    }

    #[tokio::test]
    async fn sign_out_resets_to_anonymous() {
        let (manager, store) = manager();

        manager
            .sign_up("someone", "a@example.com", "hunter2", Role::Admin)
            .await
            .unwrap();
        assert!(store.session().is_admin());

        manager.sign_out().await.unwrap();
        assert!(store.session().profile().is_none());
    }

    #[tokio::test]
    async fn identity_changes_rederive_the_session() {
        use std::collections::HashSet;

        use crate::auth::AuthGateway;

        let auth = Arc::new(InMemoryAuth::new());
        let users = Arc::new(InMemoryRepository::<User>::new());
        let store = Arc::new(AppStore::new(Arc::new(InMemoryPreferences::new())));
        let manager = SessionManager::new(auth.clone(), users.clone(), store.clone());

        let watcher = manager.spawn_watcher();
        let mut session_rx = store.subscribe_session();

        // register and provision directly against the collaborators, so the
        // only session writer is the watcher
        let identity = auth.sign_up("a@example.com", "hunter2").await.unwrap();
        users
            .insert(User {
                id: identity.uid.clone(),
                role: Role::User,
                name: "someone".to_string(),
                email: identity.email.clone(),
                favorites: HashSet::new(),
                joined: HashSet::new(),
            })
            .await
            .unwrap();
        auth.sign_out().await.unwrap();
        auth.sign_in("a@example.com", "hunter2").await.unwrap();

        loop {
            session_rx.changed().await.unwrap();
            if store.session().profile().is_some() {
                break;
            }
        }

        assert_eq!(
            store.session().user_id().cloned(),
            Some(identity.uid.clone())
        );
        watcher.abort();
    }

    #[tokio::test]
    async fn resume_with_no_identity_is_anonymous() {
        let (manager, store) = manager();

        let session = manager.resume().await.unwrap();
        assert!(session.profile().is_none());
        assert!(store.session().profile().is_none());
    }
}

use async_trait::async_trait;
use tokio::sync::{watch, Mutex};
use uuid::Uuid;

use crate::entities::UserId;

/// The identity the auth collaborator vouches for.  Zero or one of these is
/// active at a time; changes fan out to every subscriber.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub uid: UserId,
    pub email: String,
}

#[derive(Debug)]
pub enum AuthError {
    InvalidCredentials,
    UnknownAccount,
    EmailTaken,
    Internal(anyhow::Error),
}

impl ::std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
        match self {
            AuthError::InvalidCredentials => write!(f, "wrong credentials."),
            AuthError::UnknownAccount => write!(f, "no account for this email."),
            AuthError::EmailTaken => write!(f, "email already registered."),
            AuthError::Internal(e) => write!(f, "internal error: {}", e),
        }
    }
}

impl ::std::error::Error for AuthError {}

pub type Result<T> = ::std::result::Result<T, AuthError>;

/// Session-based auth, consumed as an interface only; the hosted backend's
/// protocol internals are out of scope.
#[async_trait]
pub trait AuthGateway {
    async fn sign_up(&self, email: &str, password: &str) -> Result<Identity>;
    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity>;
    async fn sign_out(&self) -> Result<()>;

    /// Current identity plus change notifications.
    fn subscribe(&self) -> watch::Receiver<Option<Identity>>;

    fn current(&self) -> Option<Identity>;
}

struct Account {
    uid: UserId,
    email: String,
    password: String,
}

/// Stand-in for the hosted auth service, same role the in-memory repository
/// plays for the document store.
pub struct InMemoryAuth {
    accounts: Mutex<Vec<Account>>,
    current: watch::Sender<Option<Identity>>,
}

impl InMemoryAuth {
    pub fn new() -> Self {
        let (current, _) = watch::channel(None);

        Self {
            accounts: Mutex::new(vec![]),
            current,
        }
    }
}

impl Default for InMemoryAuth {
    fn default() -> Self { Self::new() }
}

#[async_trait]
impl AuthGateway for InMemoryAuth {
    async fn sign_up(&self, email: &str, password: &str) -> Result<Identity> {
        let mut guard = self.accounts.lock().await;

        if guard.iter().any(|a| a.email == email) {
            return Err(AuthError::EmailTaken);
        }

        let account = Account {
            uid: UserId(Uuid::new_v4().to_string()),
            email: email.to_string(),
            password: password.to_string(),
        };
        let identity = Identity {
            uid: account.uid.clone(),
            email: account.email.clone(),
        };
        guard.push(account);

        self.current.send_replace(Some(identity.clone()));

        Ok(identity)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity> {
        let guard = self.accounts.lock().await;

        let account = match guard.iter().find(|a| a.email == email) {
            Some(a) => a,
            None => return Err(AuthError::UnknownAccount),
        };
        if account.password != password {
            return Err(AuthError::InvalidCredentials);
        }

        let identity = Identity {
            uid: account.uid.clone(),
            email: account.email.clone(),
        };
        self.current.send_replace(Some(identity.clone()));

        Ok(identity)
    }

    async fn sign_out(&self) -> Result<()> {
        self.current.send_replace(None);

        Ok(())
    }

    fn subscribe(&self) -> watch::Receiver<Option<Identity>> { self.current.subscribe() }

    fn current(&self) -> Option<Identity> { self.current.borrow().clone() }
}

use std::sync::Arc;

use tokio::sync::watch;

use crate::entities::{Lang, Role, User, UserId};
use crate::prefs::{Preferences, LANGUAGE_KEY};

/// Capability-tagged session state, derived once per identity-change event.
#[derive(Debug, Clone)]
pub enum Session {
    Anonymous,
    Known(Profile),
}

/// The signed-in user's loaded document.  Its membership sets are the local
/// cache every view reads; the membership controller is the only writer.
#[derive(Debug, Clone)]
pub struct Profile {
    pub user: User,
}

impl Session {
    pub fn is_admin(&self) -> bool {
        matches!(self, Session::Known(p) if p.user.role == Role::Admin)
    }

    pub fn user_id(&self) -> Option<&UserId> {
        match self {
            Session::Anonymous => None,
            Session::Known(p) => Some(&p.user.id),
        }
    }

    pub fn profile(&self) -> Option<&Profile> {
        match self {
            Session::Anonymous => None,
            Session::Known(p) => Some(p),
        }
    }
}

/// Explicit application-state container shared by every view: language,
/// session, and (through the session profile) the membership cache.  Readers
/// subscribe to change notifications instead of polling.
pub struct AppStore {
    lang: watch::Sender<Lang>,
    session: watch::Sender<Session>,
    prefs: Arc<dyn Preferences + Send + Sync>,
}

impl AppStore {
    pub fn new(prefs: Arc<dyn Preferences + Send + Sync>) -> Self {
        let initial = prefs
            .get(LANGUAGE_KEY)
            .map(|code| Lang::parse_or_default(&code))
            .unwrap_or_default();

        let (lang, _) = watch::channel(initial);
        let (session, _) = watch::channel(Session::Anonymous);

        Self {
            lang,
            session,
            prefs,
        }
    }

    pub fn lang(&self) -> Lang { *self.lang.borrow() }

    /// Pure state change, persisted for the next session start.
    pub fn set_lang(&self, lang: Lang) {
        self.prefs.set(LANGUAGE_KEY, lang.code());
        self.lang.send_replace(lang);
    }

    pub fn subscribe_lang(&self) -> watch::Receiver<Lang> { self.lang.subscribe() }

    pub fn session(&self) -> Session { self.session.borrow().clone() }

    pub fn set_session(&self, session: Session) { self.session.send_replace(session); }

    pub fn subscribe_session(&self) -> watch::Receiver<Session> { self.session.subscribe() }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::prefs::InMemoryPreferences;

    fn known(role: Role) -> Session {
        Session::Known(Profile {
            user: User {
                id: UserId("u1".to_string()),
                role,
                name: "someone".to_string(),
                email: "a@example.com".to_string(),
                favorites: HashSet::new(),
                joined: HashSet::new(),
            },
        })
    }

    #[test]
    fn language_is_restored_from_preferences() {
        let prefs = Arc::new(InMemoryPreferences::new());
        prefs.set(LANGUAGE_KEY, "ar");

        let store = AppStore::new(prefs.clone());
        assert_eq!(store.lang(), Lang::Ar);

        // unrecognized value falls back to the default
        prefs.set(LANGUAGE_KEY, "xx");
        let store = AppStore::new(prefs);
        assert_eq!(store.lang(), Lang::En);
    }

    #[test]
    fn set_lang_persists() {
        let prefs = Arc::new(InMemoryPreferences::new());
        let store = AppStore::new(prefs.clone());

        store.set_lang(Lang::Ar);

        assert_eq!(prefs.get(LANGUAGE_KEY), Some("ar".to_string()));
        assert_eq!(store.lang(), Lang::Ar);
    }

    #[test]
    fn session_capabilities() {
        assert!(!Session::Anonymous.is_admin());
        assert!(!known(Role::User).is_admin());
        assert!(known(Role::Admin).is_admin());
    }
}

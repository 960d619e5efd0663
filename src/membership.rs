use std::sync::Arc;

use async_trait::async_trait;

use crate::entities::{CourseId, Relation};
use crate::i18n;
use crate::repositories::UserRepository;
use crate::store::{AppStore, Profile, Session};

/// Per (user, course, relation) machine.  It cycles for the lifetime of the
/// session; there is no terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleState {
    NotMember,
    Member,
    PendingRemoveConfirm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleAction {
    Toggle,
    Confirm,
    Cancel,
}

impl ToggleState {
    pub fn next(self, action: ToggleAction) -> ToggleState {
        use ToggleAction::*;
        use ToggleState::*;

        match (self, action) {
            (NotMember, Toggle) => Member,
            (Member, Toggle) => PendingRemoveConfirm,
            (PendingRemoveConfirm, Confirm) => NotMember,
            (PendingRemoveConfirm, Cancel) => Member,
            (state, _) => state,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Added,
    Removed,
    Cancelled,
    /// No session identity; the caller should redirect to sign-in.  No local
    /// or remote mutation happened.
    AuthRequired,
    /// Remote update failed; local state is unchanged.
    Failed,
}

#[async_trait]
pub trait Notifier {
    async fn notify(&self, message: String);
    /// Informational dialog (policy gates), distinct from a toast.
    async fn inform(&self, message: String);
}

#[async_trait]
pub trait ConfirmGate {
    async fn confirm(&self, message: String) -> bool;
}

/// Reconciles a user's favorite/joined sets between the session cache and
/// the remote store.  Removal is confirm-gated; additions go through
/// directly.  The remote write always comes first; the cache is refreshed by
/// re-reading the user document, never by trusting local deltas.
pub struct MembershipController {
    users: Arc<dyn UserRepository + Send + Sync>,
    store: Arc<AppStore>,
    notifier: Arc<dyn Notifier + Send + Sync>,
    confirm: Arc<dyn ConfirmGate + Send + Sync>,
}

impl MembershipController {
    pub fn new(
        users: Arc<dyn UserRepository + Send + Sync>,
        store: Arc<AppStore>,
        notifier: Arc<dyn Notifier + Send + Sync>,
        confirm: Arc<dyn ConfirmGate + Send + Sync>,
    ) -> Self {
        Self {
            users,
            store,
            notifier,
            confirm,
        }
    }

    #[tracing::instrument(skip(self, title))]
    pub async fn toggle(
        &self,
        course_id: CourseId,
        title: &str,
        relation: Relation,
    ) -> ToggleOutcome {
        let session = self.store.session();
        let profile = match session.profile() {
            Some(p) => p,
            None => return ToggleOutcome::AuthRequired,
        };

        let lang = self.store.lang();

        let mut state = match profile.user.membership(relation).contains(&course_id) {
            true => ToggleState::Member,
            false => ToggleState::NotMember,
        };
        state = state.next(ToggleAction::Toggle);

        if state == ToggleState::PendingRemoveConfirm {
            let prompt_key = match relation {
                Relation::Favorite => "remove_favorite",
                Relation::Joined => "unjoin_course",
            };
            let prompt = i18n::tr_with(lang, "confirm", prompt_key, &[("title", title)]);
            state = match self.confirm.confirm(prompt).await {
                true => state.next(ToggleAction::Confirm),
                false => state.next(ToggleAction::Cancel),
            };
            if state == ToggleState::Member {
                return ToggleOutcome::Cancelled;
            }
        }

        match state {
            // confirmed removal
            ToggleState::NotMember => {
                let res = self
                    .users
                    .delete_member(&profile.user.id, relation, course_id)
                    .await;
                if let Err(e) = res {
                    tracing::error!("membership remove failed: {}", e);
                    self.notifier
                        .notify(i18n::tr(lang, "snackbar", "operation_failed"))
                        .await;
                    return ToggleOutcome::Failed;
                }

                self.refresh_cache().await;

                let msg_key = match relation {
                    Relation::Favorite => "favorite_removed",
                    Relation::Joined => "course_unjoined",
                };
                self.notifier
                    .notify(i18n::tr_with(lang, "snackbar", msg_key, &[("title", title)]))
                    .await;

                ToggleOutcome::Removed
            },
            ToggleState::Member => {
                let res = self
                    .users
                    .insert_member(&profile.user.id, relation, course_id)
                    .await;
                if let Err(e) = res {
                    tracing::error!("membership add failed: {}", e);
                    self.notifier
                        .notify(i18n::tr(lang, "snackbar", "operation_failed"))
                        .await;
                    return ToggleOutcome::Failed;
                }

                self.refresh_cache().await;

                let msg_key = match relation {
                    Relation::Favorite => "favorite_added",
                    Relation::Joined => "course_joined",
                };
                self.notifier
                    .notify(i18n::tr_with(lang, "snackbar", msg_key, &[("title", title)]))
                    .await;

                ToggleOutcome::Added
            },
            ToggleState::PendingRemoveConfirm => unreachable!("confirm gate already resolved"),
        }
    }

    /// Re-reads the user document so every surface converges on the remote
    /// state.  A failed refresh keeps the previous (possibly stale) cache.
    async fn refresh_cache(&self) {
        let id = match self.store.session().user_id().cloned() {
            Some(id) => id,
            None => return,
        };

        match self.users.find(&id).await {
            Ok(user) => self.store.set_session(Session::Known(Profile { user })),
            Err(e) => tracing::warn!("cannot refresh membership cache: {}", e),
        }
    }
}

use std::sync::Arc;

use lazy_static::lazy_static;
use regex::Regex;

use crate::entities::{Course, CourseId, LocalizedText, Role, UserId};
use crate::i18n;
use crate::membership::{ConfirmGate, Notifier};
use crate::repositories::{CourseRepository, UserMutation, UserRepository};
use crate::store::AppStore;

lazy_static! {
    static ref IMAGE_URL: Regex = Regex::new(r"^https?://.+").unwrap();
}

/// What an admin types into the course form; both language variants are
/// required fields here even though stored documents may omit the alternate.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CourseForm {
    pub title: String,
    pub title_ar: String,
    pub description: String,
    pub description_ar: String,
    pub creator: String,
    pub creator_ar: String,
    pub image: String,
    pub price: f64,
    pub category: String,
    pub category_ar: String,
    pub popular: bool,
    pub rating: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Title,
    Description,
    Creator,
    Image,
    Price,
    Category,
}

impl Field {
    pub fn name(&self) -> &'static str {
        match self {
            Field::Title => "title",
            Field::Description => "description",
            Field::Creator => "creator",
            Field::Image => "image",
            Field::Price => "price",
            Field::Category => "category",
        }
    }
}

/// Field-scoped validation failures, keyed into the `validation` namespace of
/// the translation table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors(pub Vec<(Field, &'static str)>);

impl CourseForm {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = vec![];

        if self.title.is_empty() || self.title_ar.is_empty() {
            errors.push((Field::Title, "title_required"));
        }
        if self.description.is_empty() || self.description_ar.is_empty() {
            errors.push((Field::Description, "description_required"));
        }
        if self.creator.is_empty() || self.creator_ar.is_empty() {
            errors.push((Field::Creator, "creator_required"));
        }
        if !IMAGE_URL.is_match(&self.image) {
            errors.push((Field::Image, "image_url_invalid"));
        }
        if !(self.price > 0.0) {
            errors.push((Field::Price, "price_invalid"));
        }
        if self.category.is_empty() || self.category_ar.is_empty() {
            errors.push((Field::Category, "category_required"));
        }

        match errors.is_empty() {
            true => Ok(()),
            false => Err(ValidationErrors(errors)),
        }
    }

    pub fn into_course(self, id: CourseId) -> Course {
        Course {
            id,
            title: LocalizedText::with_ar(self.title, self.title_ar),
            description: LocalizedText::with_ar(self.description, self.description_ar),
            creator: LocalizedText::with_ar(self.creator, self.creator_ar),
            price: self.price,
            categories: vec![LocalizedText::with_ar(self.category, self.category_ar)],
            image: self.image,
            popular: self.popular,
            rating: self.rating,
        }
    }

    pub fn from_course(course: &Course) -> Self {
        let tag = course.categories.first();

        Self {
            title: course.title.en.clone(),
            title_ar: course.title.ar.clone().unwrap_or_default(),
            description: course.description.en.clone(),
            description_ar: course.description.ar.clone().unwrap_or_default(),
            creator: course.creator.en.clone(),
            creator_ar: course.creator.ar.clone().unwrap_or_default(),
            image: course.image.clone(),
            price: course.price,
            category: tag.map(|t| t.en.clone()).unwrap_or_default(),
            category_ar: tag.and_then(|t| t.ar.clone()).unwrap_or_default(),
            popular: course.popular,
            rating: course.rating,
        }
    }

    /// Full shallow comparison against the loaded document; equal forms make
    /// the update a no-op.
    pub fn differs_from(&self, course: &Course) -> bool { *self != Self::from_course(course) }
}

#[derive(Debug, PartialEq)]
pub enum AuthoringOutcome {
    Created(CourseId),
    Updated,
    /// Update suppressed: nothing differed from the loaded document.
    NoChanges,
    Deleted,
    Cancelled,
    /// Client-side policy gate (admin delete / admin demotion).
    Blocked,
    /// Caller's session lacks the admin capability.
    Forbidden,
    Invalid(ValidationErrors),
    NotFound,
    Failed,
}

/// Admin create/update/delete for courses and role/delete for users.  Every
/// failure degrades to a notification; nothing here is fatal.
pub struct AuthoringController {
    courses: Arc<dyn CourseRepository + Send + Sync>,
    users: Arc<dyn UserRepository + Send + Sync>,
    store: Arc<AppStore>,
    notifier: Arc<dyn Notifier + Send + Sync>,
    confirm: Arc<dyn ConfirmGate + Send + Sync>,
}

impl AuthoringController {
    pub fn new(
        courses: Arc<dyn CourseRepository + Send + Sync>,
        users: Arc<dyn UserRepository + Send + Sync>,
        store: Arc<AppStore>,
        notifier: Arc<dyn Notifier + Send + Sync>,
        confirm: Arc<dyn ConfirmGate + Send + Sync>,
    ) -> Self {
        Self {
            courses,
            users,
            store,
            notifier,
            confirm,
        }
    }

    fn guard_admin(&self) -> Result<(), AuthoringOutcome> {
        match self.store.session().is_admin() {
            true => Ok(()),
            false => Err(AuthoringOutcome::Forbidden),
        }
    }

    #[tracing::instrument(skip(self, form))]
    pub async fn create_course(&self, form: CourseForm) -> AuthoringOutcome {
        if let Err(o) = self.guard_admin() {
            return o;
        }
        if let Err(errors) = form.validate() {
            return AuthoringOutcome::Invalid(errors);
        }

        let lang = self.store.lang();
        let id = CourseId::create();

        match self.courses.insert(form.into_course(id)).await {
            Ok(true) => {
                self.notifier
                    .notify(i18n::tr(lang, "snackbar", "course_created"))
                    .await;
                AuthoringOutcome::Created(id)
            },
            Ok(false) => unreachable!("freshly generated id collided"),
            Err(e) => {
                tracing::error!("course create failed: {}", e);
                self.notifier
                    .notify(i18n::tr(lang, "snackbar", "operation_failed"))
                    .await;
                AuthoringOutcome::Failed
            },
        }
    }

    #[tracing::instrument(skip(self, form))]
    pub async fn update_course(&self, id: CourseId, form: CourseForm) -> AuthoringOutcome {
        if let Err(o) = self.guard_admin() {
            return o;
        }
        if let Err(errors) = form.validate() {
            return AuthoringOutcome::Invalid(errors);
        }

        let lang = self.store.lang();

        let loaded = match self.courses.find(id).await {
            Ok(c) => c,
            Err(crate::repositories::RepositoryError::NotFound) =>
                return AuthoringOutcome::NotFound,
            Err(e) => {
                tracing::error!("course load failed: {}", e);
                self.notifier
                    .notify(i18n::tr(lang, "snackbar", "operation_failed"))
                    .await;
                return AuthoringOutcome::Failed;
            },
        };

        if !form.differs_from(&loaded) {
            self.notifier
                .notify(i18n::tr(lang, "snackbar", "no_changes"))
                .await;
            return AuthoringOutcome::NoChanges;
        }

        match self.courses.update(id, form.into_course(id)).await {
            Ok(_) => {
                self.notifier
                    .notify(i18n::tr(lang, "snackbar", "course_updated"))
                    .await;
                AuthoringOutcome::Updated
            },
            Err(e) => {
                tracing::error!("course update failed: {}", e);
                self.notifier
                    .notify(i18n::tr(lang, "snackbar", "operation_failed"))
                    .await;
                AuthoringOutcome::Failed
            },
        }
    }

    #[tracing::instrument(skip(self, title))]
    pub async fn delete_course(&self, id: CourseId, title: &str) -> AuthoringOutcome {
        if let Err(o) = self.guard_admin() {
            return o;
        }

        let lang = self.store.lang();
        let prompt = i18n::tr_with(lang, "confirm", "delete_course", &[("title", title)]);
        if !self.confirm.confirm(prompt).await {
            return AuthoringOutcome::Cancelled;
        }

        match self.courses.delete(id).await {
            Ok(_) => {
                self.notifier
                    .notify(i18n::tr(lang, "snackbar", "course_deleted"))
                    .await;
                AuthoringOutcome::Deleted
            },
            Err(crate::repositories::RepositoryError::NotFound) => AuthoringOutcome::NotFound,
            Err(e) => {
                tracing::error!("course delete failed: {}", e);
                self.notifier
                    .notify(i18n::tr(lang, "snackbar", "operation_failed"))
                    .await;
                AuthoringOutcome::Failed
            },
        }
    }

    /// Demoting an admin is blocked client-side with an informational dialog;
    /// the remote store is never consulted.
    #[tracing::instrument(skip(self))]
    pub async fn set_role(&self, id: &UserId, role: Role) -> AuthoringOutcome {
        if let Err(o) = self.guard_admin() {
            return o;
        }

        let lang = self.store.lang();

        let target = match self.users.find(id).await {
            Ok(u) => u,
            Err(crate::repositories::RepositoryError::NotFound) =>
                return AuthoringOutcome::NotFound,
            Err(e) => {
                tracing::error!("user load failed: {}", e);
                self.notifier
                    .notify(i18n::tr(lang, "snackbar", "operation_failed"))
                    .await;
                return AuthoringOutcome::Failed;
            },
        };

        if target.role == Role::Admin && role == Role::User {
            self.notifier
                .inform(i18n::tr(lang, "dialog", "admin_demote_blocked"))
                .await;
            return AuthoringOutcome::Blocked;
        }
        if target.role == role {
            self.notifier
                .notify(i18n::tr(lang, "snackbar", "no_changes"))
                .await;
            return AuthoringOutcome::NoChanges;
        }

        let mutation = UserMutation {
            role: Some(role),
            name: None,
        };
        match self.users.update(id, mutation).await {
            Ok(_) => {
                self.notifier
                    .notify(i18n::tr(lang, "snackbar", "role_updated"))
                    .await;
                AuthoringOutcome::Updated
            },
            Err(e) => {
                tracing::error!("role update failed: {}", e);
                self.notifier
                    .notify(i18n::tr(lang, "snackbar", "operation_failed"))
                    .await;
                AuthoringOutcome::Failed
            },
        }
    }

    /// Deleting an admin is blocked client-side, same policy as demotion.
    #[tracing::instrument(skip(self))]
    pub async fn delete_user(&self, id: &UserId) -> AuthoringOutcome {
        if let Err(o) = self.guard_admin() {
            return o;
        }

        let lang = self.store.lang();

        let target = match self.users.find(id).await {
            Ok(u) => u,
            Err(crate::repositories::RepositoryError::NotFound) =>
                return AuthoringOutcome::NotFound,
            Err(e) => {
                tracing::error!("user load failed: {}", e);
                self.notifier
                    .notify(i18n::tr(lang, "snackbar", "operation_failed"))
                    .await;
                return AuthoringOutcome::Failed;
            },
        };

        if target.role == Role::Admin {
            self.notifier
                .inform(i18n::tr(lang, "dialog", "admin_delete_blocked"))
                .await;
            return AuthoringOutcome::Blocked;
        }

        let prompt = i18n::tr(lang, "confirm", "delete_user");
        if !self.confirm.confirm(prompt).await {
            return AuthoringOutcome::Cancelled;
        }

        match self.users.delete(id).await {
            Ok(_) => {
                self.notifier
                    .notify(i18n::tr(lang, "snackbar", "user_deleted"))
                    .await;
                AuthoringOutcome::Deleted
            },
            Err(e) => {
                tracing::error!("user delete failed: {}", e);
                self.notifier
                    .notify(i18n::tr(lang, "snackbar", "operation_failed"))
                    .await;
                AuthoringOutcome::Failed
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use async_trait::async_trait;
    use tokio::sync::Mutex;

    use super::*;
    use crate::entities::User;
    use crate::prefs::InMemoryPreferences;
    use crate::repositories::mock::InMemoryRepository;
    use crate::store::{Profile, Session};

    #[derive(Default)]
    struct RecordingNotifier {
        messages: Mutex<Vec<String>>,
        dialogs: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn notify(&self, message: String) { self.messages.lock().await.push(message); }

        async fn inform(&self, message: String) { self.dialogs.lock().await.push(message); }
    }

    struct AlwaysConfirm;

    #[async_trait]
    impl ConfirmGate for AlwaysConfirm {
        async fn confirm(&self, _message: String) -> bool { true }
    }

    fn valid_form() -> CourseForm {
        CourseForm {
            title: "Intro to X".to_string(),
            title_ar: "مقدمة".to_string(),
            description: "basics".to_string(),
            description_ar: "أساسيات".to_string(),
            creator: "someone".to_string(),
            creator_ar: "شخص".to_string(),
            image: "https://example.com/x.png".to_string(),
            price: 25.0,
            category: "programming".to_string(),
            category_ar: "برمجة".to_string(),
            popular: false,
            rating: 4.5,
        }
    }

    fn user(id: &str, role: Role) -> User {
        User {
            id: UserId(id.to_string()),
            role,
            name: "someone".to_string(),
            email: format!("{}@example.com", id),
            favorites: HashSet::new(),
            joined: HashSet::new(),
        }
    }

    struct Fixture {
        controller: AuthoringController,
        courses: Arc<InMemoryRepository<Course>>,
        users: Arc<InMemoryRepository<User>>,
        notifier: Arc<RecordingNotifier>,
    }

    async fn fixture(session_role: Option<Role>) -> Fixture {
        let courses = Arc::new(InMemoryRepository::<Course>::new());
        let users = Arc::new(InMemoryRepository::<User>::new());
        let store = Arc::new(AppStore::new(Arc::new(InMemoryPreferences::new())));
        let notifier = Arc::new(RecordingNotifier::default());

        if let Some(role) = session_role {
            store.set_session(Session::Known(Profile {
                user: user("me", role),
            }));
        }

        let controller = AuthoringController::new(
            courses.clone(),
            users.clone(),
            store,
            notifier.clone(),
            Arc::new(AlwaysConfirm),
        );

        Fixture {
            controller,
            courses,
            users,
            notifier,
        }
    }

    #[test]
    fn validation_rules() {
        assert!(valid_form().validate().is_ok());

        let form = CourseForm {
            title_ar: String::new(),
            ..valid_form()
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.0, vec![(Field::Title, "title_required")]);

        let form = CourseForm {
            image: "ftp://example.com/x.png".to_string(),
            price: 0.0,
            ..valid_form()
        };
        let errors = form.validate().unwrap_err();
        assert!(errors.0.contains(&(Field::Image, "image_url_invalid")));
        assert!(errors.0.contains(&(Field::Price, "price_invalid")));
    }

    #[tokio::test]
    async fn create_then_noop_update() {
        let f = fixture(Some(Role::Admin)).await;

        let id = match f.controller.create_course(valid_form()).await {
            AuthoringOutcome::Created(id) => id,
            o => panic!("unexpected outcome: {:?}", o),
        };

        // an identical form suppresses the write
        let outcome = f.controller.update_course(id, valid_form()).await;
        assert_eq!(outcome, AuthoringOutcome::NoChanges);
        assert_eq!(
            f.notifier.messages.lock().await.last().unwrap(),
            "No changes were made"
        );

        let changed = CourseForm {
            price: 30.0,
            ..valid_form()
        };
        assert_eq!(
            f.controller.update_course(id, changed).await,
            AuthoringOutcome::Updated
        );
        assert_eq!(f.courses.find(id).await.unwrap().price, 30.0);
    }

    #[tokio::test]
    async fn non_admin_session_is_forbidden() {
        let f = fixture(Some(Role::User)).await;

        assert_eq!(
            f.controller.create_course(valid_form()).await,
            AuthoringOutcome::Forbidden
        );

        let f = fixture(None).await;
        assert_eq!(
            f.controller.create_course(valid_form()).await,
            AuthoringOutcome::Forbidden
        );
    }

    #[tokio::test]
    async fn admin_delete_is_blocked_without_remote_call() {
        let f = fixture(Some(Role::Admin)).await;
        f.users.insert(user("other", Role::Admin)).await.unwrap();

        let outcome = f
            .controller
            .delete_user(&UserId("other".to_string()))
            .await;

        assert_eq!(outcome, AuthoringOutcome::Blocked);
        // the document is still there
        assert!(f
            .users
            .is_exists(&UserId("other".to_string()))
            .await
            .unwrap());
        assert_eq!(
            f.notifier.dialogs.lock().await.last().unwrap(),
            "Admin accounts cannot be deleted"
        );
    }

    #[tokio::test]
    async fn admin_demotion_is_blocked() {
        let f = fixture(Some(Role::Admin)).await;
        f.users.insert(user("other", Role::Admin)).await.unwrap();

        let outcome = f
            .controller
            .set_role(&UserId("other".to_string()), Role::User)
            .await;

        assert_eq!(outcome, AuthoringOutcome::Blocked);
        assert_eq!(
            f.users.find(&UserId("other".to_string())).await.unwrap().role,
            Role::Admin
        );
    }

    #[tokio::test]
    async fn promotion_goes_through() {
        let f = fixture(Some(Role::Admin)).await;
        f.users.insert(user("other", Role::User)).await.unwrap();

        let outcome = f
            .controller
            .set_role(&UserId("other".to_string()), Role::Admin)
            .await;

        assert_eq!(outcome, AuthoringOutcome::Updated);
        assert_eq!(
            f.users.find(&UserId("other".to_string())).await.unwrap().role,
            Role::Admin
        );
    }

    #[tokio::test]
    async fn delete_course_is_confirm_gated() {
        struct NeverConfirm;

        #[async_trait]
        impl ConfirmGate for NeverConfirm {
            async fn confirm(&self, _message: String) -> bool { false }
        }

        let courses = Arc::new(InMemoryRepository::<Course>::new());
        let users = Arc::new(InMemoryRepository::<User>::new());
        let store = Arc::new(AppStore::new(Arc::new(InMemoryPreferences::new())));
        store.set_session(Session::Known(Profile {
            user: user("me", Role::Admin),
        }));
        let controller = AuthoringController::new(
            courses.clone(),
            users,
            store,
            Arc::new(RecordingNotifier::default()),
            Arc::new(NeverConfirm),
        );

        let id = CourseId::create();
        courses
            .insert(valid_form().into_course(id))
            .await
            .unwrap();

        let outcome = controller.delete_course(id, "Intro to X").await;

        assert_eq!(outcome, AuthoringOutcome::Cancelled);
        assert!(courses.is_exists(id).await.unwrap());
    }
}

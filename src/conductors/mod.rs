use std::io::Write as _;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use clap::ArgMatches;
use tokio::sync::Mutex;

use crate::authoring::{AuthoringController, AuthoringOutcome, CourseForm};
use crate::catalog::{self, CatalogView, CourseFilter, PriceOrder, ADMIN_PAGE_SIZE};
use crate::entities::{Course, CourseId, Lang, Relation, Role, UserId};
use crate::i18n;
use crate::membership::{ConfirmGate, MembershipController, Notifier, ToggleOutcome};
use crate::repositories::{
    CourseQuery, CourseRepository, RepositoryError, UserQuery, UserRepository,
};
use crate::session::SessionManager;
use crate::store::AppStore;

mod clapcmd;

use clapcmd::{create_cli, extract_arg};

#[derive(Debug, PartialEq, Eq)]
pub struct Response {
    pub title: String,
    pub description: String,
    pub fields: Vec<(String, String)>,
}

impl Response {
    fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            fields: vec![],
        }
    }

    fn error(description: impl Into<String>) -> Self { Self::new("error", description) }

    pub fn render(&self) -> String {
        let mut out = format!("== {} ==\n{}", self.title, self.description);
        for (name, value) in &self.fields {
            out.push_str(&format!("\n  {}: {}", name, value));
        }

        out
    }
}

/// Prints toasts and dialogs to the terminal.
pub struct TerminalNotifier;

#[async_trait]
impl Notifier for TerminalNotifier {
    async fn notify(&self, message: String) { println!("* {}", message); }

    async fn inform(&self, message: String) { println!("[!] {}", message); }
}

/// y/N prompt on the terminal, read off the blocking stdin.
pub struct TerminalConfirm;

#[async_trait]
impl ConfirmGate for TerminalConfirm {
    async fn confirm(&self, message: String) -> bool {
        print!("{} [y/N]: ", message);
        let _ = std::io::stdout().flush();

        let answer = tokio::task::spawn_blocking(|| {
            let mut buf = String::new();
            match std::io::stdin().read_line(&mut buf) {
                Ok(_) => buf,
                Err(_) => String::new(),
            }
        })
        .await
        .unwrap_or_default();

        let answer = answer.trim();
        answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes")
    }
}

/// Wires user intents to the controllers and renders their results.
pub struct Conductor {
    pub courses: Arc<dyn CourseRepository + Send + Sync>,
    pub users: Arc<dyn UserRepository + Send + Sync>,
    pub store: Arc<AppStore>,
    pub session: SessionManager,
    pub membership: MembershipController,
    pub authoring: AuthoringController,
    pub view: Mutex<CatalogView>,
}

impl Conductor {
    pub async fn conduct(&self, line: &str) -> Vec<Response> {
        let words = match shell_words::split(line) {
            Ok(w) => w,
            Err(e) => return vec![Response::error(e.to_string())],
        };
        if words.is_empty() {
            return vec![];
        }

        let matches = match create_cli().try_get_matches_from(words) {
            Ok(m) => m,
            Err(e) => return vec![Response::error(e.to_string())],
        };

        match self.dispatch(&matches).await {
            Ok(responses) => responses,
            Err(e) => vec![Response::error(e.to_string())],
        }
    }

    async fn dispatch(&self, matches: &ArgMatches) -> Result<Vec<Response>> {
        let res = match matches.subcommand() {
            Some(("courses", sub)) => self.course_grid(sub).await?,
            Some(("course", sub)) => self.course_detail(sub).await?,
            Some(("favorite", sub)) => self.toggle(sub, Relation::Favorite).await?,
            Some(("join", sub)) => self.toggle(sub, Relation::Joined).await?,
            Some(("favorites", _)) => self.membership_list(Relation::Favorite).await?,
            Some(("joined", _)) => self.membership_list(Relation::Joined).await?,
            Some(("signup", sub)) => self.sign_up(sub).await?,
            Some(("signin", sub)) => self.sign_in(sub).await?,
            Some(("signout", _)) => self.sign_out().await?,
            Some(("whoami", _)) => self.whoami(),
            Some(("lang", sub)) => self.switch_lang(sub)?,
            Some(("admin", sub)) => self.admin(sub).await?,
            _ => vec![Response::error("unknown command")],
        };

        Ok(res)
    }

    async fn course_grid(&self, sub: &ArgMatches) -> Result<Vec<Response>> {
        let lang = self.store.lang();

        let query = CourseQuery {
            popular: match sub.is_present("popular") {
                true => Some(true),
                false => None,
            },
            category: None,
        };
        let fetched = self
            .courses
            .finds(query)
            .await
            .map_err(|e| anyhow!("{}", e))?;

        let filter = CourseFilter {
            price: sub
                .value_of("price")
                .and_then(PriceOrder::parse)
                .unwrap_or_default(),
            category: sub.value_of("category").map(|s| s.to_string()),
            search: sub.value_of("search").map(|s| s.to_string()),
        };

        let mut view = self.view.lock().await;
        view.set_filter(filter);
        if let Some(raw) = sub.value_of("page") {
            view.set_page(raw.parse()?);
        }

        let filtered = catalog::apply(&fetched, view.filter(), lang);
        let page = catalog::paginate(&filtered, catalog::GRID_PAGE_SIZE, view.page());

        if page.is_empty() {
            return Ok(vec![Response::new(
                "courses",
                i18n::tr(lang, "catalog", "no_results"),
            )]);
        }

        let mut resp = Response::new(
            "courses",
            format!(
                "page {}/{}",
                view.page(),
                catalog::page_count(filtered.len(), catalog::GRID_PAGE_SIZE)
            ),
        );
        for course in &page {
            resp.fields.push(course_line(course, lang));
        }

        Ok(vec![resp])
    }

    async fn course_detail(&self, sub: &ArgMatches) -> Result<Vec<Response>> {
        let lang = self.store.lang();
        let id: CourseId = extract_arg(sub, "id")?.parse()?;

        let course = match self.courses.find(id).await {
            Ok(c) => c,
            Err(RepositoryError::NotFound) =>
                return Ok(vec![Response::new(
                    "course",
                    i18n::tr(lang, "catalog", "not_found"),
                )]),
            Err(e) => return Err(anyhow!("{}", e)),
        };

        let mut resp = Response::new(
            course.title.resolve(lang).to_string(),
            course.description.resolve(lang).to_string(),
        );
        resp.fields
            .push(("price".to_string(), format!("${}", course.price)));
        resp.fields.push((
            "created by".to_string(),
            course.creator.resolve(lang).to_string(),
        ));
        resp.fields
            .push(("rating".to_string(), course.rating.to_string()));
        resp.fields.push((
            "categories".to_string(),
            course
                .categories
                .iter()
                .map(|t| t.resolve(lang))
                .collect::<Vec<_>>()
                .join(", "),
        ));

        if let Some(profile) = self.store.session().profile() {
            let yes_no = |b: bool| if b { "yes" } else { "no" }.to_string();
            resp.fields.push((
                "favorite".to_string(),
                yes_no(profile.user.favorites.contains(&id)),
            ));
            resp.fields
                .push(("joined".to_string(), yes_no(profile.user.joined.contains(&id))));
        }

        Ok(vec![resp])
    }

    async fn toggle(&self, sub: &ArgMatches, relation: Relation) -> Result<Vec<Response>> {
        let lang = self.store.lang();
        let id: CourseId = extract_arg(sub, "id")?.parse()?;

        let course = match self.courses.find(id).await {
            Ok(c) => c,
            Err(RepositoryError::NotFound) =>
                return Ok(vec![Response::new(
                    "course",
                    i18n::tr(lang, "catalog", "not_found"),
                )]),
            Err(e) => return Err(anyhow!("{}", e)),
        };
        let title = course.title.resolve(lang).to_string();

        let name = match relation {
            Relation::Favorite => "favorite",
            Relation::Joined => "join",
        };
        let outcome = self.membership.toggle(id, &title, relation).await;

        let resp = match outcome {
            ToggleOutcome::Added | ToggleOutcome::Removed => Response::new(name, "done."),
            ToggleOutcome::Cancelled => Response::new(name, "cancelled."),
            ToggleOutcome::AuthRequired => {
                let mut r = Response::new(name, i18n::tr(lang, "auth", "required"));
                r.fields
                    .push(("redirect".to_string(), "/auth".to_string()));
                r
            },
            ToggleOutcome::Failed => Response::error("operation failed."),
        };

        Ok(vec![resp])
    }

    async fn membership_list(&self, relation: Relation) -> Result<Vec<Response>> {
        let lang = self.store.lang();
        let (name, empty_key) = match relation {
            Relation::Favorite => ("favorites", "no_favorites"),
            Relation::Joined => ("joined", "no_joined"),
        };

        let session = self.store.session();
        let profile = match session.profile() {
            Some(p) => p,
            None => {
                let mut r = Response::new(name, i18n::tr(lang, "auth", "required"));
                r.fields
                    .push(("redirect".to_string(), "/auth".to_string()));
                return Ok(vec![r]);
            },
        };

        // stale ids (deleted courses) are simply dropped from the view
        let mut resolved = vec![];
        for id in profile.user.membership(relation) {
            match self.courses.find(*id).await {
                Ok(c) => resolved.push(c),
                Err(RepositoryError::NotFound) => (),
                Err(e) => return Err(anyhow!("{}", e)),
            }
        }

        if resolved.is_empty() {
            return Ok(vec![Response::new(
                name,
                i18n::tr(lang, "catalog", empty_key),
            )]);
        }

        let mut resp = Response::new(name, format!("{} courses", resolved.len()));
        for course in &resolved {
            resp.fields.push(course_line(course, lang));
        }

        Ok(vec![resp])
    }

    async fn sign_up(&self, sub: &ArgMatches) -> Result<Vec<Response>> {
        let lang = self.store.lang();
        let role = sub
            .value_of("role")
            .and_then(Role::parse)
            .unwrap_or(Role::User);

        let res = self
            .session
            .sign_up(
                extract_arg(sub, "name")?,
                extract_arg(sub, "email")?,
                extract_arg(sub, "password")?,
                role,
            )
            .await;

        Ok(vec![auth_response("signup", res.map(|_| ()), lang)
            .unwrap_or_else(|| signed_in_response(&self.store, lang))])
    }

    async fn sign_in(&self, sub: &ArgMatches) -> Result<Vec<Response>> {
        let lang = self.store.lang();

        let res = self
            .session
            .sign_in(extract_arg(sub, "email")?, extract_arg(sub, "password")?)
            .await;

        Ok(vec![auth_response("signin", res.map(|_| ()), lang)
            .unwrap_or_else(|| signed_in_response(&self.store, lang))])
    }

    async fn sign_out(&self) -> Result<Vec<Response>> {
        let lang = self.store.lang();
        self.session
            .sign_out()
            .await
            .map_err(|e| anyhow!("{}", e))?;

        Ok(vec![Response::new(
            "signout",
            i18n::tr(lang, "auth", "signed_out"),
        )])
    }

    fn whoami(&self) -> Vec<Response> {
        let resp = match self.store.session().profile() {
            None => Response::new("whoami", "anonymous"),
            Some(p) => {
                let mut r = Response::new("whoami", p.user.name.clone());
                r.fields
                    .push(("email".to_string(), p.user.email.clone()));
                r.fields
                    .push(("role".to_string(), p.user.role.as_str().to_string()));
                r
            },
        };

        vec![resp]
    }

    fn switch_lang(&self, sub: &ArgMatches) -> Result<Vec<Response>> {
        let lang = Lang::parse_or_default(extract_arg(sub, "code")?);
        self.store.set_lang(lang);

        Ok(vec![Response::new("lang", lang.code())])
    }

    async fn admin(&self, sub: &ArgMatches) -> Result<Vec<Response>> {
        if !self.store.session().is_admin() {
            return Ok(vec![Response::error("admin only.")]);
        }

        let res = match sub.subcommand() {
            Some(("courses", sub)) => self.admin_courses(sub).await?,
            Some(("add-course", sub)) => {
                let form = build_form(sub, CourseForm::default())?;
                let outcome = self.authoring.create_course(form).await;
                vec![authoring_response("add-course", outcome, self.store.lang())]
            },
            Some(("edit-course", sub)) => self.admin_edit_course(sub).await?,
            Some(("delete-course", sub)) => {
                let lang = self.store.lang();
                let id: CourseId = extract_arg(sub, "id")?.parse()?;
                let title = match self.courses.find(id).await {
                    Ok(c) => c.title.resolve(lang).to_string(),
                    Err(RepositoryError::NotFound) =>
                        return Ok(vec![Response::new(
                            "delete-course",
                            i18n::tr(lang, "catalog", "not_found"),
                        )]),
                    Err(e) => return Err(anyhow!("{}", e)),
                };
                let outcome = self.authoring.delete_course(id, &title).await;
                vec![authoring_response("delete-course", outcome, lang)]
            },
            Some(("users", sub)) => self.admin_users(sub).await?,
            Some(("set-role", sub)) => {
                let id = UserId(extract_arg(sub, "id")?.to_string());
                let role = Role::parse(extract_arg(sub, "role")?)
                    .ok_or_else(|| anyhow!("unknown role"))?;
                let outcome = self.authoring.set_role(&id, role).await;
                vec![authoring_response("set-role", outcome, self.store.lang())]
            },
            Some(("delete-user", sub)) => {
                let id = UserId(extract_arg(sub, "id")?.to_string());
                let outcome = self.authoring.delete_user(&id).await;
                vec![authoring_response("delete-user", outcome, self.store.lang())]
            },
            _ => vec![Response::error("unknown admin command")],
        };

        Ok(res)
    }

    async fn admin_courses(&self, sub: &ArgMatches) -> Result<Vec<Response>> {
        let lang = self.store.lang();
        let page: usize = sub.value_of("page").map(|p| p.parse()).transpose()?.unwrap_or(1);

        let all = self
            .courses
            .finds(CourseQuery::default())
            .await
            .map_err(|e| anyhow!("{}", e))?;
        let slice = catalog::paginate(&all, ADMIN_PAGE_SIZE, page);

        if slice.is_empty() {
            return Ok(vec![Response::new(
                "admin courses",
                i18n::tr(lang, "catalog", "no_results"),
            )]);
        }

        let mut resp = Response::new(
            "admin courses",
            format!("page {}/{}", page, catalog::page_count(all.len(), ADMIN_PAGE_SIZE)),
        );
        for course in &slice {
            resp.fields.push((
                course.id.to_string(),
                format!(
                    "{} — created by: {} — ${}",
                    course.title.resolve(lang),
                    course.creator.resolve(lang),
                    course.price
                ),
            ));
        }

        Ok(vec![resp])
    }

    async fn admin_edit_course(&self, sub: &ArgMatches) -> Result<Vec<Response>> {
        let lang = self.store.lang();
        let id: CourseId = extract_arg(sub, "id")?.parse()?;

        let loaded = match self.courses.find(id).await {
            Ok(c) => c,
            Err(RepositoryError::NotFound) =>
                return Ok(vec![Response::new(
                    "edit-course",
                    i18n::tr(lang, "catalog", "not_found"),
                )]),
            Err(e) => return Err(anyhow!("{}", e)),
        };

        // the form starts from the loaded document; options override fields
        let form = build_form(sub, CourseForm::from_course(&loaded))?;
        let outcome = self.authoring.update_course(id, form).await;

        Ok(vec![authoring_response("edit-course", outcome, lang)])
    }

    async fn admin_users(&self, sub: &ArgMatches) -> Result<Vec<Response>> {
        let lang = self.store.lang();
        let page: usize = sub.value_of("page").map(|p| p.parse()).transpose()?.unwrap_or(1);

        let query = UserQuery {
            role: sub.value_of("role").and_then(Role::parse),
            email: None,
        };
        let all = self
            .users
            .finds(query)
            .await
            .map_err(|e| anyhow!("{}", e))?;
        let slice = catalog::paginate(&all, ADMIN_PAGE_SIZE, page);

        if slice.is_empty() {
            return Ok(vec![Response::new(
                "admin users",
                i18n::tr(lang, "catalog", "no_results"),
            )]);
        }

        let mut resp = Response::new(
            "admin users",
            format!("page {}/{}", page, catalog::page_count(all.len(), ADMIN_PAGE_SIZE)),
        );
        for user in &slice {
            resp.fields.push((
                user.id.to_string(),
                format!("{} <{}> — role: {}", user.name, user.email, user.role.as_str()),
            ));
        }

        Ok(vec![resp])
    }
}

fn course_line(course: &Course, lang: Lang) -> (String, String) {
    (
        course.id.to_string(),
        format!(
            "{} — ${} — {}",
            course.title.resolve(lang),
            course.price,
            course.creator.resolve(lang)
        ),
    )
}

/// `None` means success (the caller renders its own response).
fn auth_response(
    title: &str,
    res: ::std::result::Result<(), crate::auth::AuthError>,
    lang: Lang,
) -> Option<Response> {
    use crate::auth::AuthError::*;

    let key = match res {
        Ok(()) => return None,
        Err(InvalidCredentials) => "invalid_credentials",
        Err(UnknownAccount) => "unknown_account",
        Err(EmailTaken) => "email_taken",
        Err(Internal(e)) => {
            tracing::error!("auth failure: {}", e);
            return Some(Response::error("something went wrong."));
        },
    };

    Some(Response::new(title, i18n::tr(lang, "auth", key)))
}

fn signed_in_response(store: &AppStore, _lang: Lang) -> Response {
    match store.session().profile() {
        None => Response::new("auth", "signed in"),
        Some(p) => {
            let dashboard = match p.user.role {
                Role::Admin => "/admin-dashboard",
                Role::User => "/user-dashboard",
            };
            let mut r = Response::new("auth", format!("signed in as {}", p.user.name));
            r.fields
                .push(("redirect".to_string(), dashboard.to_string()));
            r
        },
    }
}

fn authoring_response(title: &str, outcome: AuthoringOutcome, lang: Lang) -> Response {
    match outcome {
        AuthoringOutcome::Created(id) => {
            let mut r = Response::new(title, "created.");
            r.fields.push(("id".to_string(), id.to_string()));
            r
        },
        AuthoringOutcome::Updated => Response::new(title, "updated."),
        AuthoringOutcome::NoChanges => Response::new(title, "no changes."),
        AuthoringOutcome::Deleted => Response::new(title, "deleted."),
        AuthoringOutcome::Cancelled => Response::new(title, "cancelled."),
        AuthoringOutcome::Blocked => Response::new(title, "blocked."),
        AuthoringOutcome::Forbidden => Response::error("admin only."),
        AuthoringOutcome::NotFound => Response::new(title, i18n::tr(lang, "catalog", "not_found")),
        AuthoringOutcome::Invalid(errors) => {
            let mut r = Response::new(title, "validation failed.");
            for (field, key) in errors.0 {
                r.fields
                    .push((field.name().to_string(), i18n::tr(lang, "validation", key)));
            }
            r
        },
        AuthoringOutcome::Failed => Response::error("operation failed."),
    }
}

fn build_form(sub: &ArgMatches, base: CourseForm) -> Result<CourseForm> {
    let mut form = base;

    let text = |name: &str, target: &mut String| {
        if let Some(v) = sub.value_of(name) {
            *target = v.to_string();
        }
    };

    text("title", &mut form.title);
    text("title-ar", &mut form.title_ar);
    text("description", &mut form.description);
    text("description-ar", &mut form.description_ar);
    text("creator", &mut form.creator);
    text("creator-ar", &mut form.creator_ar);
    text("image", &mut form.image);
    text("category", &mut form.category);
    text("category-ar", &mut form.category_ar);

    if let Some(raw) = sub.value_of("price") {
        form.price = raw.parse()?;
    }
    if let Some(raw) = sub.value_of("rating") {
        form.rating = raw.parse()?;
    }
    if sub.is_present("popular") {
        form.popular = true;
    }

    Ok(form)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::InMemoryAuth;
    use crate::entities::User;
    use crate::in_memory;
    use crate::prefs::InMemoryPreferences;
    use crate::repositories::mock::InMemoryRepository;

    async fn conductor() -> Conductor {
        in_memory(Arc::new(InMemoryPreferences::new()))
    }

    struct YesConfirm;

    #[async_trait]
    impl ConfirmGate for YesConfirm {
        async fn confirm(&self, _message: String) -> bool { true }
    }

    /// Like the in-memory wiring, but confirmation prompts resolve to yes
    /// instead of reading the terminal.
    fn confirming_conductor() -> Conductor {
        let users: Arc<dyn UserRepository + Send + Sync> =
            Arc::new(InMemoryRepository::<User>::new());
        let courses: Arc<dyn CourseRepository + Send + Sync> =
            Arc::new(InMemoryRepository::<Course>::new());
        let store = Arc::new(AppStore::new(Arc::new(InMemoryPreferences::new())));
        let auth = Arc::new(InMemoryAuth::new());
        let notifier = Arc::new(TerminalNotifier);
        let confirm = Arc::new(YesConfirm);

        Conductor {
            courses: courses.clone(),
            users: users.clone(),
            store: store.clone(),
            session: SessionManager::new(auth, users.clone(), store.clone()),
            membership: MembershipController::new(
                users.clone(),
                store.clone(),
                notifier.clone(),
                confirm.clone(),
            ),
            authoring: AuthoringController::new(courses, users, store, notifier, confirm),
            view: Mutex::new(CatalogView::new()),
        }
    }

    async fn sign_up_admin(c: &Conductor) {
        let res = c
            .conduct("signup --name root --email root@example.com --password secret --role admin")
            .await;
        assert_eq!(res[0].title, "auth");
    }

    #[tokio::test]
    async fn empty_line_is_silent() {
        let c = conductor().await;
        assert!(c.conduct("").await.is_empty());
    }

    #[tokio::test]
    async fn unknown_command_renders_error() {
        let c = conductor().await;
        let res = c.conduct("frobnicate").await;
        assert_eq!(res[0].title, "error");
    }

    #[tokio::test]
    async fn anonymous_admin_surface_is_hidden() {
        let c = conductor().await;
        let res = c.conduct("admin users").await;
        assert_eq!(res[0].title, "error");
        assert_eq!(res[0].description, "admin only.");
    }

    #[tokio::test]
    async fn full_admin_course_flow() {
        let c = conductor().await;
        sign_up_admin(&c).await;

        let res = c
            .conduct(
                "admin add-course --title 'Intro to X' --title-ar X --description d \
                 --description-ar d --creator c --creator-ar c \
                 --image https://example.com/x.png --price 10 --category prog --category-ar prog",
            )
            .await;
        assert_eq!(res[0].description, "created.");
        let id = res[0].fields[0].1.clone();

        // editing without changing anything is a detected no-op
        let res = c.conduct(&format!("admin edit-course {}", id)).await;
        assert_eq!(res[0].description, "no changes.");

        let res = c
            .conduct(&format!("admin edit-course {} --price 20", id))
            .await;
        assert_eq!(res[0].description, "updated.");

        let res = c.conduct(&format!("course {}", id)).await;
        assert_eq!(res[0].title, "Intro to X");
    }

    #[tokio::test]
    async fn invalid_form_reports_field_errors() {
        let c = conductor().await;
        sign_up_admin(&c).await;

        let res = c.conduct("admin add-course --title onlyenglish").await;
        assert_eq!(res[0].description, "validation failed.");
        assert!(res[0].fields.iter().any(|(f, _)| f == "title"));
        assert!(res[0].fields.iter().any(|(f, _)| f == "image"));
    }

    #[tokio::test]
    async fn course_not_found_renders_message() {
        let c = conductor().await;

        let res = c
            .conduct(&format!("course {}", CourseId::create()))
            .await;
        assert_eq!(res[0].description, "Course not found");
    }

    #[tokio::test]
    async fn anonymous_toggle_redirects_to_auth() {
        let c = conductor().await;
        sign_up_admin(&c).await;
        let res = c
            .conduct(
                "admin add-course --title t --title-ar t --description d --description-ar d \
                 --creator c --creator-ar c --image https://e.com/i.png --price 5 \
                 --category x --category-ar x",
            )
            .await;
        let id = res[0].fields[0].1.clone();
        c.conduct("signout").await;

        let res = c.conduct(&format!("favorite {}", id)).await;
        assert_eq!(res[0].description, "Please sign in to continue");
        assert_eq!(res[0].fields[0], ("redirect".to_string(), "/auth".to_string()));
    }

    #[tokio::test]
    async fn deleted_course_vanishes_from_membership_listings() {
        let c = confirming_conductor();
        sign_up_admin(&c).await;

        let res = c
            .conduct(
                "admin add-course --title t --title-ar t --description d --description-ar d \
                 --creator x --creator-ar x --image https://e.com/i.png --price 5 \
                 --category a --category-ar a",
            )
            .await;
        let id = res[0].fields[0].1.clone();

        c.conduct(&format!("favorite {}", id)).await;
        let res = c.conduct("favorites").await;
        assert_eq!(res[0].fields.len(), 1);

        let res = c.conduct(&format!("admin delete-course {}", id)).await;
        assert_eq!(res[0].description, "deleted.");

        // the set keeps the id, the listing just drops it
        let stale: CourseId = id.parse().unwrap();
        assert!(c
            .store
            .session()
            .profile()
            .unwrap()
            .user
            .favorites
            .contains(&stale));
        let res = c.conduct("favorites").await;
        assert_eq!(res[0].description, "No favorite courses yet.");
    }

    #[tokio::test]
    async fn language_switch_localizes_catalog_messages() {
        let c = conductor().await;

        c.conduct("lang ar").await;
        let res = c.conduct("courses --search nothing").await;
        assert_eq!(res[0].description, "لم يتم العثور على دورات");
    }
}

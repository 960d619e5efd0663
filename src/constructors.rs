use std::sync::Arc;

use tokio::sync::Mutex;

use crate::auth::InMemoryAuth;
use crate::authoring::AuthoringController;
use crate::catalog::CatalogView;
use crate::conductors::{Conductor, TerminalConfirm, TerminalNotifier};
use crate::entities::{Course, CourseId, LocalizedText, User};
use crate::membership::MembershipController;
use crate::prefs::Preferences;
use crate::repositories::mock::InMemoryRepository;
use crate::repositories::mongo::{MongoCourseRepository, MongoUserRepository};
use crate::repositories::{CourseRepository, UserRepository};
use crate::session::SessionManager;
use crate::store::AppStore;

pub fn in_memory(prefs: Arc<dyn Preferences + Send + Sync>) -> Conductor {
    assemble(
        Arc::new(InMemoryRepository::<User>::new()),
        Arc::new(InMemoryRepository::with(demo_courses())),
        prefs,
    )
}

pub async fn mongo(
    uri_str: impl AsRef<str>,
    db_name: impl AsRef<str>,
    prefs: Arc<dyn Preferences + Send + Sync>,
) -> ::anyhow::Result<Conductor> {
    let c = ::mongodb::Client::with_uri_str(uri_str).await?;
    let db = c.database(db_name.as_ref());

    let users = Arc::new(MongoUserRepository::new_with(c.clone(), db.clone()).await?);
    let courses = Arc::new(MongoCourseRepository::new_with(c, db).await?);

    Ok(assemble(users, courses, prefs))
}

fn assemble(
    users: Arc<dyn UserRepository + Send + Sync>,
    courses: Arc<dyn CourseRepository + Send + Sync>,
    prefs: Arc<dyn Preferences + Send + Sync>,
) -> Conductor {
    let store = Arc::new(AppStore::new(prefs));
    let auth = Arc::new(InMemoryAuth::new());
    let notifier = Arc::new(TerminalNotifier);
    let confirm = Arc::new(TerminalConfirm);

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

fn demo_courses() -> Vec<Course> {
    let course = |title: (&str, &str),
                  creator: (&str, &str),
                  price: f64,
                  category: (&str, &str),
                  popular: bool,
                  rating: f64| Course {
        id: CourseId::create(),
        title: LocalizedText::with_ar(title.0, title.1),
        description: LocalizedText::with_ar(
            format!("A hands-on course: {}.", title.0),
            format!("دورة عملية: {}.", title.1),
        ),
        creator: LocalizedText::with_ar(creator.0, creator.1),
        price,
        categories: vec![LocalizedText::with_ar(category.0, category.1)],
        image: "https://placehold.co/600x400".to_string(),
        popular,
        rating,
    };

    vec![
        course(
            ("Rust for Beginners", "رست للمبتدئين"),
            ("Lina Haddad", "لينا حداد"),
            29.0,
            ("programming", "برمجة"),
            true,
            4.7,
        ),
        course(
            ("UI Design Basics", "أساسيات تصميم الواجهات"),
            ("Omar Nassar", "عمر نصار"),
            19.0,
            ("design", "تصميم"),
            false,
            4.2,
        ),
        course(
            ("Digital Marketing 101", "التسويق الرقمي 101"),
            ("Sara Aziz", "سارة عزيز"),
            24.0,
            ("marketing", "تسويق"),
            true,
            4.5,
        ),
    ]
}

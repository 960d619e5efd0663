use async_trait::async_trait;
use regex::Regex;

use crate::entities::{Course, CourseId, Relation, Role, User, UserId};

pub mod mock;
pub mod mongo;

pub type Result<T> = ::std::result::Result<T, RepositoryError>;

#[derive(Debug)]
pub enum RepositoryError {
    NotFound,
    NoUnique { matched: u32 },
    Internal(anyhow::Error),
}

impl ::std::fmt::Display for RepositoryError {
    fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
        match self {
            RepositoryError::NotFound => write!(f, "cannot find object."),
            RepositoryError::NoUnique { matched } => write!(
                f,
                "expected unique object, found non-unique objects (matched: {})",
                matched
            ),
            RepositoryError::Internal(e) => write!(f, "internal error: {}", e),
        }
    }
}

impl ::std::error::Error for RepositoryError {}

#[async_trait]
pub trait UserRepository {
    async fn insert(&self, item: User) -> Result<bool>;
    async fn is_exists(&self, id: &UserId) -> Result<bool>;

    async fn find(&self, id: &UserId) -> Result<User>;
    async fn finds(&self, query: UserQuery) -> Result<Vec<User>>;

    async fn update(&self, id: &UserId, mutation: UserMutation) -> Result<User>;

    async fn is_member(&self, id: &UserId, relation: Relation, course_id: CourseId)
        -> Result<bool>;
    /// Atomic array-union on the membership set.  `false` means the value was
    /// already present.
    async fn insert_member(
        &self,
        id: &UserId,
        relation: Relation,
        course_id: CourseId,
    ) -> Result<bool>;
    /// Atomic array-remove on the membership set.  `false` means the value was
    /// not present.
    async fn delete_member(
        &self,
        id: &UserId,
        relation: Relation,
        course_id: CourseId,
    ) -> Result<bool>;

    async fn delete(&self, id: &UserId) -> Result<User>;
}

#[async_trait]
pub trait CourseRepository {
    async fn insert(&self, item: Course) -> Result<bool>;
    async fn is_exists(&self, id: CourseId) -> Result<bool>;

    async fn find(&self, id: CourseId) -> Result<Course>;
    async fn finds(&self, query: CourseQuery) -> Result<Vec<Course>>;

    /// Full-document replacement; there is no field-level course mutation.
    async fn update(&self, id: CourseId, replacement: Course) -> Result<Course>;

    async fn delete(&self, id: CourseId) -> Result<Course>;
}

#[derive(Debug, Clone, Default)]
pub struct UserQuery {
    pub role: Option<Role>,
    pub email: Option<Regex>,
}

#[derive(Debug, Clone, Default)]
pub struct CourseQuery {
    pub popular: Option<bool>,
    /// Exact tag match against either language variant of the category field.
    pub category: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UserMutation {
    pub role: Option<Role>,
    pub name: Option<String>,
}

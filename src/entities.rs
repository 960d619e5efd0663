use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CourseId(pub Uuid);

impl CourseId {
    pub fn create() -> Self { Self(Uuid::new_v4()) }
}

impl ::core::str::FromStr for CourseId {
    type Err = ::uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> { Ok(Self(Uuid::parse_str(s)?)) }
}

impl ::std::fmt::Display for CourseId {
    fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Bound to the auth collaborator's identity, not generated locally.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl ::std::fmt::Display for UserId {
    fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "user" => Some(Role::User),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lang {
    En,
    Ar,
}

impl Lang {
    pub fn code(&self) -> &'static str {
        match self {
            Lang::En => "en",
            Lang::Ar => "ar",
        }
    }

    /// Unrecognized codes fall back to `En`.
    pub fn parse_or_default(s: &str) -> Self {
        match s {
            "ar" => Lang::Ar,
            _ => Lang::En,
        }
    }
}

impl Default for Lang {
    fn default() -> Self { Lang::En }
}

/// Default-language text with an optional alternate variant.  Source documents
/// carry the alternate fields inconsistently, so resolution always falls back
/// to the default language instead of probing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalizedText {
    pub en: String,
    pub ar: Option<String>,
}

impl LocalizedText {
    pub fn new(en: impl Into<String>) -> Self {
        Self {
            en: en.into(),
            ar: None,
        }
    }

    pub fn with_ar(en: impl Into<String>, ar: impl Into<String>) -> Self {
        Self {
            en: en.into(),
            ar: Some(ar.into()),
        }
    }

    pub fn resolve(&self, lang: Lang) -> &str {
        match lang {
            Lang::En => &self.en,
            Lang::Ar => self.ar.as_deref().unwrap_or(&self.en),
        }
    }
}

/// Which membership set of a user a toggle operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Favorite,
    Joined,
}

impl Relation {
    pub fn field_name(&self) -> &'static str {
        match self {
            Relation::Favorite => "favorites",
            Relation::Joined => "joined",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Course {
    pub id: CourseId,
    pub title: LocalizedText,
    pub description: LocalizedText,
    pub creator: LocalizedText,
    pub price: f64,
    pub categories: Vec<LocalizedText>,
    pub image: String,
    pub popular: bool,
    pub rating: f64,
}

#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub role: Role,
    pub name: String,
    pub email: String,
    pub favorites: HashSet<CourseId>,
    pub joined: HashSet<CourseId>,
}

impl User {
    pub fn membership(&self, relation: Relation) -> &HashSet<CourseId> {
        match relation {
            Relation::Favorite => &self.favorites,
            Relation::Joined => &self.joined,
        }
    }

    pub fn membership_mut(&mut self, relation: Relation) -> &mut HashSet<CourseId> {
        match relation {
            Relation::Favorite => &mut self.favorites,
            Relation::Joined => &mut self.joined,
        }
    }
}

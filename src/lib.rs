pub mod auth;
pub mod authoring;
pub mod catalog;
pub mod conductors;
mod constructors;
pub mod entities;
pub mod i18n;
pub mod membership;
pub mod prefs;
pub mod repositories;
pub mod session;
pub mod store;

pub use constructors::*;

use mongodb::bson::{doc, Document};

use super::models::{MongoCourseModel, MongoLocalizedModel, MongoUserModel};
use super::{CourseQuery, UserMutation, UserQuery};
use crate::entities::{Course, LocalizedText, Role, User, UserId};

impl From<UserQuery> for Document {
    fn from(UserQuery { role, email }: UserQuery) -> Self {
        let mut query = doc! {};

        if let Some(val) = role {
            query.insert("role", val.as_str());
        }

        if let Some(re) = email {
            query.insert("email", doc! { "$regex": re.as_str() });
        }

        query
    }
}

impl From<CourseQuery> for Document {
    fn from(CourseQuery { popular, category }: CourseQuery) -> Self {
        let mut query = doc! {};

        if let Some(val) = popular {
            query.insert("popular", val);
        }

        if let Some(tag) = category {
            query.insert(
                "$or",
                vec![
                    doc! { "categories.en": &tag },
                    doc! { "categories.ar": &tag },
                ],
            );
        }

        query
    }
}

impl From<UserMutation> for Document {
    fn from(UserMutation { role, name }: UserMutation) -> Self {
        let mut mutation = doc! {};

        if let Some(val) = role {
            mutation.insert("role", val.as_str());
        }

        if let Some(val) = name {
            mutation.insert("name", val);
        }

        mutation
    }
}

impl From<LocalizedText> for MongoLocalizedModel {
    fn from(LocalizedText { en, ar }: LocalizedText) -> Self { Self { en, ar } }
}
impl From<MongoLocalizedModel> for LocalizedText {
    fn from(MongoLocalizedModel { en, ar }: MongoLocalizedModel) -> Self { Self { en, ar } }
}

impl From<User> for MongoUserModel {
    fn from(
        User {
            id,
            role,
            name,
            email,
            favorites,
            joined,
        }: User,
    ) -> Self {
        Self {
            id: id.0,
            role: role.as_str().to_string(),
            name,
            email,
            favorites_size: favorites.len() as i64,
            favorites: favorites.iter().map(|i| i.to_string()).collect(),
            joined_size: joined.len() as i64,
            joined: joined.iter().map(|i| i.to_string()).collect(),
        }
    }
}
impl From<MongoUserModel> for User {
    fn from(
        MongoUserModel {
            id,
            role,
            name,
            email,
            favorites,
            favorites_size: _,
            joined,
            joined_size: _,
        }: MongoUserModel,
    ) -> Self {
        Self {
            id: UserId(id),
            role: Role::parse(&role).unwrap_or(Role::User),
            name,
            email,
            favorites: favorites.iter().map(|s| s.parse().unwrap()).collect(),
            joined: joined.iter().map(|s| s.parse().unwrap()).collect(),
        }
    }
}

impl From<Course> for MongoCourseModel {
    fn from(
        Course {
            id,
            title,
            description,
            creator,
            price,
            categories,
            image,
            popular,
            rating,
        }: Course,
    ) -> Self {
        Self {
            id: id.to_string(),
            title: title.into(),
            description: description.into(),
            creator: creator.into(),
            price,
            categories: categories.into_iter().map(|c| c.into()).collect(),
            image,
            popular,
            rating,
        }
    }
}
impl From<MongoCourseModel> for Course {
    fn from(
        MongoCourseModel {
            id,
            title,
            description,
            creator,
            price,
            categories,
            image,
            popular,
            rating,
        }: MongoCourseModel,
    ) -> Self {
        Self {
            id: id.parse().unwrap(),
            title: title.into(),
            description: description.into(),
            creator: creator.into(),
            price,
            categories: categories.into_iter().map(|c| c.into()).collect(),
            image,
            popular,
            rating,
        }
    }
}

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{
    CourseQuery, CourseRepository, RepositoryError, Result, UserMutation, UserQuery,
    UserRepository,
};
use crate::entities::{Course, CourseId, Relation, User, UserId};

pub struct InMemoryRepository<T>(Mutex<Vec<T>>);

impl<T> InMemoryRepository<T> {
    pub fn new() -> Self { Self(Mutex::new(vec![])) }

    pub fn with(items: Vec<T>) -> Self { Self(Mutex::new(items)) }
}
impl<T> Default for InMemoryRepository<T> {
    fn default() -> Self { Self::new() }
}

#[inline]
fn find_mut<T, P>(v: &mut Vec<T>, predicate: P) -> Result<&mut T>
where P: FnMut(&&mut T) -> bool {
    let mut res = v.iter_mut().filter(predicate).collect::<Vec<_>>();

    match res.len() {
        0 => Err(RepositoryError::NotFound),
        1 => Ok(res.remove(0)),
        i => Err(RepositoryError::NoUnique { matched: i as u32 }),
    }
}

#[inline]
fn find_ref<T, P>(v: &[T], predicate: P) -> Result<&T>
where P: FnMut(&&T) -> bool {
    let mut res = v.iter().filter(predicate).collect::<Vec<_>>();

    match res.len() {
        0 => Err(RepositoryError::NotFound),
        1 => Ok(res.remove(0)),
        i => Err(RepositoryError::NoUnique { matched: i as u32 }),
    }
}

#[inline]
fn remove_unique<T, P>(v: &mut Vec<T>, predicate: P) -> Result<T>
where P: Fn(&T) -> bool {
    let mut indexes = v
        .iter()
        .enumerate()
        .filter(|(_, item)| predicate(item))
        .map(|(i, _)| i)
        .collect::<Vec<_>>();

    match indexes.len() {
        0 => Err(RepositoryError::NotFound),
        1 => Ok(v.remove(indexes.remove(0))),
        i => Err(RepositoryError::NoUnique { matched: i as u32 }),
    }
}

#[async_trait]
impl UserRepository for InMemoryRepository<User> {
    async fn insert(&self, item: User) -> Result<bool> {
        let mut guard = self.0.lock().await;

        match find_ref(&guard, |v| v.id == item.id) {
            Ok(_) => return Ok(false),
            Err(RepositoryError::NotFound) => (),
            Err(e) => return Err(e),
        }

        guard.push(item);
        Ok(true)
    }

    async fn is_exists(&self, id: &UserId) -> Result<bool> {
        let guard = self.0.lock().await;

        match find_ref(&guard, |v| v.id == *id) {
            Ok(_) => Ok(true),
            Err(RepositoryError::NotFound) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn find(&self, id: &UserId) -> Result<User> {
        let guard = self.0.lock().await;

        Ok(find_ref(&guard, |v| v.id == *id)?.clone())
    }

    async fn finds(&self, UserQuery { role, email }: UserQuery) -> Result<Vec<User>> {
        Ok(self
            .0
            .lock()
            .await
            .iter()
            .filter(|u| role.map(|r| u.role == r).unwrap_or(true))
            .filter(|u| email.as_ref().map(|r| r.is_match(&u.email)).unwrap_or(true))
            .cloned()
            .collect())
    }

    async fn update(&self, id: &UserId, mutation: UserMutation) -> Result<User> {
        let mut guard = self.0.lock().await;
        let item = find_mut(&mut guard, |v| v.id == *id)?;

        let UserMutation { role, name } = mutation;
        if let Some(val) = role {
            item.role = val;
        }
        if let Some(val) = name {
            item.name = val;
        }

        Ok(item.clone())
    }

    async fn is_member(
        &self,
        id: &UserId,
        relation: Relation,
        course_id: CourseId,
    ) -> Result<bool> {
        let guard = self.0.lock().await;
        let item = find_ref(&guard, |v| v.id == *id)?;

        Ok(item.membership(relation).contains(&course_id))
    }

    async fn insert_member(
        &self,
        id: &UserId,
        relation: Relation,
        course_id: CourseId,
    ) -> Result<bool> {
        let mut guard = self.0.lock().await;
        let item = find_mut(&mut guard, |v| v.id == *id)?;

        Ok(item.membership_mut(relation).insert(course_id))
    }

    async fn delete_member(
        &self,
        id: &UserId,
        relation: Relation,
        course_id: CourseId,
    ) -> Result<bool> {
        let mut guard = self.0.lock().await;
        let item = find_mut(&mut guard, |v| v.id == *id)?;

        Ok(item.membership_mut(relation).remove(&course_id))
    }

    async fn delete(&self, id: &UserId) -> Result<User> {
        let mut guard = self.0.lock().await;

        remove_unique(&mut guard, |v| v.id == *id)
    }
}

#[async_trait]
impl CourseRepository for InMemoryRepository<Course> {
    async fn insert(&self, item: Course) -> Result<bool> {
        let mut guard = self.0.lock().await;

        match find_ref(&guard, |v| v.id == item.id) {
            Ok(_) => return Ok(false),
            Err(RepositoryError::NotFound) => (),
            Err(e) => return Err(e),
        }

        guard.push(item);
        Ok(true)
    }

    async fn is_exists(&self, id: CourseId) -> Result<bool> {
        let guard = self.0.lock().await;

        match find_ref(&guard, |v| v.id == id) {
            Ok(_) => Ok(true),
            Err(RepositoryError::NotFound) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn find(&self, id: CourseId) -> Result<Course> {
        let guard = self.0.lock().await;

        Ok(find_ref(&guard, |v| v.id == id)?.clone())
    }

    async fn finds(&self, CourseQuery { popular, category }: CourseQuery) -> Result<Vec<Course>> {
        Ok(self
            .0
            .lock()
            .await
            .iter()
            .filter(|c| popular.map(|p| c.popular == p).unwrap_or(true))
            .filter(|c| {
                category
                    .as_ref()
                    .map(|tag| {
                        c.categories
                            .iter()
                            .any(|t| t.en == *tag || t.ar.as_deref() == Some(tag.as_str()))
                    })
                    .unwrap_or(true)
            })
            .cloned()
            .collect())
    }

    async fn update(&self, id: CourseId, replacement: Course) -> Result<Course> {
        let mut guard = self.0.lock().await;
        let item = find_mut(&mut guard, |v| v.id == id)?;

        *item = Course { id, ..replacement };

        Ok(item.clone())
    }

    async fn delete(&self, id: CourseId) -> Result<Course> {
        let mut guard = self.0.lock().await;

        remove_unique(&mut guard, |v| v.id == id)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::entities::{LocalizedText, Role};

    fn user(id: &str) -> User {
        User {
            id: UserId(id.to_string()),
            role: Role::User,
            name: "someone".to_string(),
            email: format!("{}@example.com", id),
            favorites: HashSet::new(),
            joined: HashSet::new(),
        }
    }

    #[tokio::test]
    async fn insert_is_unique() {
        let repo = InMemoryRepository::<User>::new();

        assert!(repo.insert(user("u1")).await.unwrap());
        assert!(!repo.insert(user("u1")).await.unwrap());
    }

    #[tokio::test]
    async fn membership_union_semantics() {
        let repo = InMemoryRepository::<User>::new();
        repo.insert(user("u1")).await.unwrap();

        let id = UserId("u1".to_string());
        let course = CourseId::create();

        assert!(repo
            .insert_member(&id, Relation::Favorite, course)
            .await
            .unwrap());
        // union of an existing value is a no-op, not a duplicate
        assert!(!repo
            .insert_member(&id, Relation::Favorite, course)
            .await
            .unwrap());
        assert!(repo.is_member(&id, Relation::Favorite, course).await.unwrap());

        assert!(repo
            .delete_member(&id, Relation::Favorite, course)
            .await
            .unwrap());
        assert!(!repo
            .delete_member(&id, Relation::Favorite, course)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn course_update_replaces_whole_document() {
        let repo = InMemoryRepository::<Course>::new();
        let id = CourseId::create();
        let course = Course {
            id,
            title: LocalizedText::new("Intro to X"),
            description: LocalizedText::new("basics"),
            creator: LocalizedText::new("someone"),
            price: 10.0,
            categories: vec![LocalizedText::new("programming")],
            image: "https://example.com/x.png".to_string(),
            popular: false,
            rating: 4.0,
        };
        repo.insert(course.clone()).await.unwrap();

        let replacement = Course {
            title: LocalizedText::new("Intro to Y"),
            ..course
        };
        let updated = repo.update(id, replacement).await.unwrap();

        assert_eq!(updated.title.en, "Intro to Y");
        assert_eq!(repo.find(id).await.unwrap().title.en, "Intro to Y");
    }
}

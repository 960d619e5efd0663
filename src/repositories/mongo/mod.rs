use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{doc, Document};
use mongodb::{Client, Collection, Database};
use tracing::Instrument;

use self::converters::{convert_404_or, convert_repo_err, to_bool, try_unique_check};
use self::helpers::{
    get_one, initialize_coll, is_contains, make_session, modify_set, process_transaction,
    ModifyOpTy,
};
use self::models::{MongoCourseModel, MongoUserModel};
use super::{
    CourseQuery, CourseRepository, RepositoryError, Result, UserMutation, UserQuery,
    UserRepository,
};
use crate::entities::{Course, CourseId, Relation, User, UserId};

mod converters;
mod helpers;
mod models;
mod type_convert;

pub struct MongoUserRepository {
    client: Client,
    coll: Collection<MongoUserModel>,
}

impl MongoUserRepository {
    pub async fn new_with(client: Client, db: Database) -> ::anyhow::Result<Self> {
        initialize_coll("users", &db).await?;

        let coll = db.collection("users");

        Ok(Self { client, coll })
    }
}

pub struct MongoCourseRepository {
    client: Client,
    coll: Collection<MongoCourseModel>,
}

impl MongoCourseRepository {
    pub async fn new_with(client: Client, db: Database) -> ::anyhow::Result<Self> {
        initialize_coll("courses", &db).await?;

        let coll = db.collection("courses");

        Ok(Self { client, coll })
    }
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    async fn insert(&self, user: User) -> Result<bool> {
        let model: MongoUserModel = user.into();

        let res = self
            .coll
            .insert_one(model, None)
            .instrument(tracing::trace_span!("insert_one"))
            .await;

        try_unique_check(res)
    }

    async fn is_exists(&self, id: &UserId) -> Result<bool> {
        let res = self
            .coll
            .count_documents(doc! { "id": &id.0 }, None)
            .instrument(tracing::trace_span!("count_documents"))
            .await;

        Ok(to_bool(convert_repo_err(res)? as i64))
    }

    async fn find(&self, id: &UserId) -> Result<User> {
        let user: User = get_one(&self.coll, &id.0).await?.into();
        assert_eq!(user.id, *id, "not matched id!");

        Ok(user)
    }

    async fn finds(&self, query: UserQuery) -> Result<Vec<User>> {
        let query_doc: Document = query.into();

        let res = self
            .coll
            .find(query_doc, None)
            .instrument(tracing::trace_span!("find"))
            .await;
        let models = convert_repo_err(
            convert_repo_err(res)?
                .try_collect::<Vec<_>>()
                .instrument(tracing::trace_span!("try_collect"))
                .await,
        )?;

        Ok(models.into_iter().map(|m| m.into()).collect())
    }

    async fn update(&self, id: &UserId, mutation: UserMutation) -> Result<User> {
        let mutation_doc: Document = mutation.into();

        async fn transaction(
            this: &MongoUserRepository,
            id: &str,
            mutation: Document,
        ) -> ::mongodb::error::Result<Option<User>> {
            let mut session = make_session(&this.client).await?;

            let matched = this
                .coll
                .update_one_with_session(
                    doc! { "id": id },
                    doc! { "$set": mutation },
                    None,
                    &mut session,
                )
                .instrument(tracing::trace_span!("update_one_with_session"))
                .await?
                .matched_count;
            if !to_bool(matched as i64) {
                return Ok(None);
            }

            let user: User = this
                .coll
                .find_one_with_session(doc! { "id": id }, None, &mut session)
                .instrument(tracing::trace_span!("find_one_with_session"))
                .await?
                .unwrap()
                .into();

            process_transaction(&mut session).await.map(|_| Some(user))
        }

        let res = loop {
            let r = transaction(self, &id.0, mutation_doc.clone()).await;
            if let Err(ref e) = r {
                if e.contains_label(::mongodb::error::TRANSIENT_TRANSACTION_ERROR) {
                    continue;
                }
            }

            break r;
        };

        convert_404_or(convert_repo_err(res)?)
    }

    async fn is_member(
        &self,
        id: &UserId,
        relation: Relation,
        course_id: CourseId,
    ) -> Result<bool> {
        is_contains(relation.field_name(), &self.coll, &id.0, course_id.to_string()).await
    }

    async fn insert_member(
        &self,
        id: &UserId,
        relation: Relation,
        course_id: CourseId,
    ) -> Result<bool> {
        modify_set(
            relation.field_name(),
            &self.coll,
            &self.client,
            &id.0,
            course_id.to_string(),
            ModifyOpTy::Push,
        )
        .await
    }

    async fn delete_member(
        &self,
        id: &UserId,
        relation: Relation,
        course_id: CourseId,
    ) -> Result<bool> {
        modify_set(
            relation.field_name(),
            &self.coll,
            &self.client,
            &id.0,
            course_id.to_string(),
            ModifyOpTy::Pull,
        )
        .await
    }

    async fn delete(&self, id: &UserId) -> Result<User> {
        async fn transaction(
            this: &MongoUserRepository,
            id: &str,
        ) -> ::mongodb::error::Result<Option<User>> {
            let mut session = make_session(&this.client).await?;

            let user: User = match this
                .coll
                .find_one_with_session(doc! { "id": id }, None, &mut session)
                .instrument(tracing::trace_span!("find_one_with_session"))
                .await?
                .map(|m| m.into())
            {
                Some(u) => u,
                None => return Ok(None),
            };

            let deleted = this
                .coll
                .delete_one_with_session(doc! { "id": id }, None, &mut session)
                .instrument(tracing::trace_span!("delete_one_with_session"))
                .await?
                .deleted_count;
            if !to_bool(deleted as i64) {
                unreachable!("couldn't delete value");
            }

            process_transaction(&mut session).await.map(|_| Some(user))
        }

        let res = loop {
            let r = transaction(self, &id.0).await;
            if let Err(ref e) = r {
                if e.contains_label(::mongodb::error::TRANSIENT_TRANSACTION_ERROR) {
                    continue;
                }
            }

            break r;
        };

        convert_404_or(convert_repo_err(res)?)
    }
}

#[async_trait]
impl CourseRepository for MongoCourseRepository {
    async fn insert(&self, course: Course) -> Result<bool> {
        let model: MongoCourseModel = course.into();

        let res = self
            .coll
            .insert_one(model, None)
            .instrument(tracing::trace_span!("insert_one"))
            .await;

        try_unique_check(res)
    }

    async fn is_exists(&self, id: CourseId) -> Result<bool> {
        let res = self
            .coll
            .count_documents(doc! { "id": id.to_string() }, None)
            .instrument(tracing::trace_span!("count_documents"))
            .await;

        Ok(to_bool(convert_repo_err(res)? as i64))
    }

    async fn find(&self, id: CourseId) -> Result<Course> {
        let course: Course = get_one(&self.coll, id.to_string()).await?.into();
        assert_eq!(course.id, id, "not matched id!");

        Ok(course)
    }

    async fn finds(&self, query: CourseQuery) -> Result<Vec<Course>> {
        let query_doc: Document = query.into();

        let res = self
            .coll
            .find(query_doc, None)
            .instrument(tracing::trace_span!("find"))
            .await;
        let models = convert_repo_err(
            convert_repo_err(res)?
                .try_collect::<Vec<_>>()
                .instrument(tracing::trace_span!("try_collect"))
                .await,
        )?;

        Ok(models.into_iter().map(|m| m.into()).collect())
    }

    async fn update(&self, id: CourseId, replacement: Course) -> Result<Course> {
        let model: MongoCourseModel = Course { id, ..replacement }.into();

        let res = self
            .coll
            .replace_one(doc! { "id": id.to_string() }, &model, None)
            .instrument(tracing::trace_span!("replace_one"))
            .await;
        if !to_bool(convert_repo_err(res)?.matched_count as i64) {
            return Err(RepositoryError::NotFound);
        }

        Ok(model.into())
    }

    async fn delete(&self, id: CourseId) -> Result<Course> {
        async fn transaction(
            this: &MongoCourseRepository,
            id: CourseId,
        ) -> ::mongodb::error::Result<Option<Course>> {
            let mut session = make_session(&this.client).await?;

            let course: Course = match this
                .coll
                .find_one_with_session(doc! { "id": id.to_string() }, None, &mut session)
                .instrument(tracing::trace_span!("find_one_with_session"))
                .await?
                .map(|m| m.into())
            {
                Some(c) => c,
                None => return Ok(None),
            };

            let deleted = this
                .coll
                .delete_one_with_session(doc! { "id": id.to_string() }, None, &mut session)
                .instrument(tracing::trace_span!("delete_one_with_session"))
                .await?
                .deleted_count;
            if !to_bool(deleted as i64) {
                unreachable!("couldn't delete value");
            }

            process_transaction(&mut session).await.map(|_| Some(course))
        }

        let res = loop {
            let r = transaction(self, id).await;
            if let Err(ref e) = r {
                if e.contains_label(::mongodb::error::TRANSIENT_TRANSACTION_ERROR) {
                    continue;
                }
            }

            break r;
        };

        convert_404_or(convert_repo_err(res)?)
    }
}

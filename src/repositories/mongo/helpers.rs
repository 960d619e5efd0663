use mongodb::bson::doc;
use mongodb::error::Result as MongoResult;
use mongodb::options::{Acknowledgment, ReadConcern, TransactionOptions, WriteConcern};
use mongodb::{Client, ClientSession, Collection, Database};
use tracing::Instrument;

use super::converters::{convert_404_or, convert_repo_err, to_bool};
use super::Result as RepoResult;

pub async fn initialize_coll(
    coll_name: impl Into<::mongodb::bson::Bson>,
    db: &Database,
) -> MongoResult<()> {
    db.run_command(
        doc! {
            "createIndexes": coll_name.into(),
            "indexes": [{
                "name": "unique_id",
                "key": {
                    "id": 1
                },
                "unique": true
            }],
        },
        None,
    )
    .instrument(tracing::trace_span!("run_command"))
    .await?;

    Ok(())
}

pub async fn make_session(c: &Client) -> MongoResult<ClientSession> {
    let mut s = c
        .start_session(None)
        .instrument(tracing::trace_span!("start_session"))
        .await?;

    let ta_opt = TransactionOptions::builder()
        .read_concern(ReadConcern::snapshot())
        .write_concern(WriteConcern::builder().w(Acknowledgment::Majority).build())
        .build();
    s.start_transaction(ta_opt)
        .instrument(tracing::trace_span!("start_transaction"))
        .await?;

    Ok(s)
}

pub async fn process_transaction(s: &mut ClientSession) -> MongoResult<()> {
    loop {
        let r = s
            .commit_transaction()
            .instrument(tracing::trace_span!("commit_transaction"))
            .await;
        if let Err(ref e) = r {
            if e.contains_label(::mongodb::error::UNKNOWN_TRANSACTION_COMMIT_RESULT) {
                continue;
            }
        }

        break r;
    }
}

pub async fn get_one<T>(coll: &Collection<T>, id: impl Into<::mongodb::bson::Bson>) -> RepoResult<T>
where T: Sync + Send + Unpin + ::serde::de::DeserializeOwned {
    let res = coll
        .find_one(doc! { "id": id.into() }, None)
        .instrument(tracing::trace_span!("find_one"))
        .await;

    convert_404_or(convert_repo_err(res)?)
}

pub async fn is_contains<T>(
    name: impl AsRef<str>,
    coll: &Collection<T>,
    id: impl Into<::mongodb::bson::Bson>,
    target: impl Into<::mongodb::bson::Bson>,
) -> RepoResult<bool> {
    let res = coll
        .count_documents(
            doc! {
                "id": id.into(),
                name.as_ref(): { "$in": [target.into()] }
            },
            None,
        )
        .instrument(tracing::trace_span!("count_documents"))
        .await;

    Ok(to_bool(convert_repo_err(res)? as i64))
}

#[derive(Clone, Copy)]
pub enum ModifyOpTy {
    Push,
    Pull,
}

/// `$addToSet`/`$pull` on a set field plus its `_size` counter, inside one
/// transaction.  `Ok(Some(false))` means the set already was in the target
/// state.
pub async fn modify_set<T>(
    name: impl AsRef<str>,
    coll: &Collection<T>,
    client: &Client,
    id: impl Into<::mongodb::bson::Bson>,
    target: impl Into<::mongodb::bson::Bson>,
    ty: ModifyOpTy,
) -> RepoResult<bool> {
    async fn transaction<T>(
        name: &str,
        coll: &Collection<T>,
        client: &Client,
        id: &::mongodb::bson::Bson,
        target: &::mongodb::bson::Bson,
        ty: ModifyOpTy,
    ) -> MongoResult<Option<bool>> {
        let mut session = make_session(client).await?;

        let operation = match ty {
            ModifyOpTy::Push => "$addToSet",
            ModifyOpTy::Pull => "$pull",
        };
        let res = coll
            .update_one_with_session(
                doc! { "id": id },
                doc! { operation: { name: target } },
                None,
                &mut session,
            )
            .instrument(tracing::trace_span!("update_one_with_session"))
            .await?;

        if !to_bool(res.matched_count as i64) {
            return Ok(None);
        }
        if !to_bool(res.modified_count as i64) {
            return Ok(Some(false));
        }

        let inc_name = format!("{}_size", name);
        let inc_value = match ty {
            ModifyOpTy::Push => 1,
            ModifyOpTy::Pull => -1,
        };
        let res = coll
            .update_one_with_session(
                doc! { "id": id },
                doc! { "$inc": { inc_name: inc_value } },
                None,
                &mut session,
            )
            .instrument(tracing::trace_span!("update_one_with_session"))
            .await?;

        if !to_bool(res.matched_count as i64) {
            unreachable!("not found value");
        }

        process_transaction(&mut session).await.map(|_| Some(true))
    }

    let id_bson = id.into();
    let target_bson = target.into();

    let res = loop {
        let r = transaction(name.as_ref(), coll, client, &id_bson, &target_bson, ty).await;
        if let Err(ref e) = r {
            if e.contains_label(::mongodb::error::TRANSIENT_TRANSACTION_ERROR) {
                continue;
            }
        }

        break r;
    };

    convert_404_or(convert_repo_err(res)?)
}

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{doc, to_bson};

use super::model::{Participant, PinnedNotice, Room};
use crate::{room, user};

const ROOMS_COLLECTION: &str = "chatRooms";

#[async_trait]
pub trait RoomRepository {
    async fn insert(&self, room: &Room) -> super::Result<()>;

    async fn find_by_id(&self, id: &room::Id) -> super::Result<Room>;

    /// All rooms, newest first.
    async fn find_all(&self) -> super::Result<Vec<Room>>;

    async fn delete(&self, id: &room::Id) -> super::Result<()>;

    /// Idempotent: inserting an already present participant overwrites the
    /// same entry and never produces a duplicate.
    async fn add_participant(&self, id: &room::Id, participant: &Participant)
        -> super::Result<()>;

    async fn remove_participant(&self, id: &room::Id, user_id: &user::Id) -> super::Result<()>;

    async fn set_pinned_notice(
        &self,
        id: &room::Id,
        notice: Option<&PinnedNotice>,
    ) -> super::Result<()>;

    async fn update_settings(
        &self,
        id: &room::Id,
        name: Option<&str>,
        password: Option<&str>,
    ) -> super::Result<()>;
}

#[derive(Clone)]
pub struct MongoRoomRepository {
    col: mongodb::Collection<Room>,
}

impl MongoRoomRepository {
    pub fn new(db: &mongodb::Database) -> Self {
        Self {
            col: db.collection(ROOMS_COLLECTION),
        }
    }
}

#[async_trait]
impl RoomRepository for MongoRoomRepository {
    async fn insert(&self, room: &Room) -> super::Result<()> {
        self.col.insert_one(room).await?;
        Ok(())
    }

    async fn find_by_id(&self, id: &room::Id) -> super::Result<Room> {
        self.col
            .find_one(doc! { "_id": id })
            .await?
            .ok_or(room::Error::NotFound(Some(id.to_owned())))
    }

    async fn find_all(&self) -> super::Result<Vec<Room>> {
        let cursor = self
            .col
            .find(doc! {})
            .sort(doc! { "created_at": -1 })
            .await?;

        let rooms: Vec<Room> = cursor.try_collect().await?;

        Ok(rooms)
    }

    async fn delete(&self, id: &room::Id) -> super::Result<()> {
        self.col.delete_one(doc! { "_id": id }).await?;
        Ok(())
    }

    async fn add_participant(
        &self,
        id: &room::Id,
        participant: &Participant,
    ) -> super::Result<()> {
        let key = format!("participants.{}", participant.id);
        self.col
            .update_one(
                doc! { "_id": id },
                doc! { "$set": { key: to_bson(participant)? } },
            )
            .await?;
        Ok(())
    }

    async fn remove_participant(&self, id: &room::Id, user_id: &user::Id) -> super::Result<()> {
        let key = format!("participants.{user_id}");
        self.col
            .update_one(doc! { "_id": id }, doc! { "$unset": { key: "" } })
            .await?;
        Ok(())
    }

    async fn set_pinned_notice(
        &self,
        id: &room::Id,
        notice: Option<&PinnedNotice>,
    ) -> super::Result<()> {
        let update = match notice {
            Some(notice) => doc! { "$set": { "pinned_notice": to_bson(notice)? } },
            None => doc! { "$unset": { "pinned_notice": "" } },
        };

        self.col.update_one(doc! { "_id": id }, update).await?;
        Ok(())
    }

    async fn update_settings(
        &self,
        id: &room::Id,
        name: Option<&str>,
        password: Option<&str>,
    ) -> super::Result<()> {
        let mut set = doc! {};
        let mut unset = doc! {};

        if let Some(name) = name {
            set.insert("name", name);
        }
        match password {
            Some("") => {
                unset.insert("password", "");
            }
            Some(password) => {
                set.insert("password", password);
            }
            None => {}
        }

        let mut update = doc! {};
        if !set.is_empty() {
            update.insert("$set", set);
        }
        if !unset.is_empty() {
            update.insert("$unset", unset);
        }
        if update.is_empty() {
            return Ok(());
        }

        self.col.update_one(doc! { "_id": id }, update).await?;
        Ok(())
    }
}

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::doc;

use super::model::Message;
use crate::{message, room};

const MESSAGES_COLLECTION: &str = "messages";

#[async_trait]
pub trait MessageRepository {
    async fn insert(&self, message: &Message) -> super::Result<()>;

    async fn find_by_id(&self, id: &message::Id) -> super::Result<Message>;

    /// Room history, timestamp ascending. Equal timestamps keep storage
    /// order; their relative order is undefined and tolerated.
    async fn find_by_room_id(&self, room_id: &room::Id) -> super::Result<Vec<Message>>;

    async fn delete(&self, id: &message::Id) -> super::Result<()>;

    async fn delete_by_room_id(&self, room_id: &room::Id) -> super::Result<()>;
}

#[derive(Clone)]
pub struct MongoMessageRepository {
    col: mongodb::Collection<Message>,
}

impl MongoMessageRepository {
    pub fn new(db: &mongodb::Database) -> Self {
        Self {
            col: db.collection(MESSAGES_COLLECTION),
        }
    }
}

#[async_trait]
impl MessageRepository for MongoMessageRepository {
    async fn insert(&self, message: &Message) -> super::Result<()> {
        self.col.insert_one(message).await?;
        Ok(())
    }

    async fn find_by_id(&self, id: &message::Id) -> super::Result<Message> {
        self.col
            .find_one(doc! { "_id": id })
            .await?
            .ok_or(message::Error::NotFound(Some(id.to_owned())))
    }

    async fn find_by_room_id(&self, room_id: &room::Id) -> super::Result<Vec<Message>> {
        let cursor = self
            .col
            .find(doc! { "room_id": room_id })
            .sort(doc! { "timestamp": 1 })
            .await?;

        let messages: Vec<Message> = cursor.try_collect().await?;

        Ok(messages)
    }

    async fn delete(&self, id: &message::Id) -> super::Result<()> {
        self.col.delete_one(doc! { "_id": id }).await?;
        Ok(())
    }

    async fn delete_by_room_id(&self, room_id: &room::Id) -> super::Result<()> {
        self.col.delete_many(doc! { "room_id": room_id }).await?;
        Ok(())
    }
}

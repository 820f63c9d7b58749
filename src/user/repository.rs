use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::doc;

use super::model::User;
use crate::user;

const USERS_COLLECTION: &str = "users";

#[async_trait]
pub trait UserRepository {
    async fn insert(&self, user: &User) -> super::Result<()>;

    async fn find_by_id(&self, id: &user::Id) -> super::Result<User>;

    /// All identities, newest first.
    async fn find_all(&self) -> super::Result<Vec<User>>;

    async fn update_nickname(&self, id: &user::Id, nickname: &str) -> super::Result<()>;

    async fn set_admin(&self, id: &user::Id) -> super::Result<()>;

    async fn delete(&self, id: &user::Id) -> super::Result<()>;
}

#[derive(Clone)]
pub struct MongoUserRepository {
    col: mongodb::Collection<User>,
}

impl MongoUserRepository {
    pub fn new(db: &mongodb::Database) -> Self {
        Self {
            col: db.collection(USERS_COLLECTION),
        }
    }
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    async fn insert(&self, user: &User) -> super::Result<()> {
        self.col.insert_one(user).await?;
        Ok(())
    }

    async fn find_by_id(&self, id: &user::Id) -> super::Result<User> {
        self.col
            .find_one(doc! { "_id": id })
            .await?
            .ok_or(user::Error::NotFound(id.to_owned()))
    }

    async fn find_all(&self) -> super::Result<Vec<User>> {
        let cursor = self
            .col
            .find(doc! {})
            .sort(doc! { "created_at": -1 })
            .await?;

        let users: Vec<User> = cursor.try_collect().await?;

        Ok(users)
    }

    async fn update_nickname(&self, id: &user::Id, nickname: &str) -> super::Result<()> {
        self.col
            .update_one(doc! { "_id": id }, doc! { "$set": { "nickname": nickname } })
            .await?;
        Ok(())
    }

    async fn set_admin(&self, id: &user::Id) -> super::Result<()> {
        self.col
            .update_one(doc! { "_id": id }, doc! { "$set": { "is_admin": true } })
            .await?;
        Ok(())
    }

    async fn delete(&self, id: &user::Id) -> super::Result<()> {
        self.col.delete_one(doc! { "_id": id }).await?;
        Ok(())
    }
}

use serde::{Deserialize, Serialize};

use super::Id;

/// Identity mirrored into the `users` collection on login.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: Id,
    pub nickname: String,
    pub is_admin: bool,
    pub created_at: i64,
}

impl User {
    pub fn new(nickname: &str) -> Self {
        Self {
            id: Id::random(),
            nickname: nickname.to_string(),
            is_admin: false,
            created_at: chrono::Utc::now().timestamp_millis(),
        }
    }
}

/// Resolved request identity, injected by [`super::middleware::identify`].
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct UserInfo {
    pub id: Id,
    pub nickname: String,
    pub is_admin: bool,
}

impl From<User> for UserInfo {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            nickname: user.nickname,
            is_admin: user.is_admin,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct UserDto {
    pub id: Id,
    pub nickname: String,
    pub is_admin: bool,
    pub created_at: i64,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            nickname: user.nickname,
            is_admin: user.is_admin,
            created_at: user.created_at,
        }
    }
}

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::user::{self, model::UserInfo};

use super::Id;

/// Room document as stored in the `chatRooms` collection.
///
/// The optional password is kept in plaintext and compared exactly. A known
/// weakness, kept for compatibility with existing room documents.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Room {
    #[serde(rename = "_id")]
    pub id: Id,
    pub name: String,
    pub created_at: i64,
    pub created_by: user::Id,
    pub creator_nickname: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pinned_notice: Option<PinnedNotice>,
    pub participants: HashMap<user::Id, Participant>,
}

impl Room {
    /// The creator is registered as the first participant.
    pub fn new(name: &str, creator: &UserInfo, password: Option<String>) -> Self {
        let participant = Participant::new(creator);

        Self {
            id: Id::random(),
            name: name.to_string(),
            created_at: chrono::Utc::now().timestamp_millis(),
            created_by: creator.id.clone(),
            creator_nickname: creator.nickname.clone(),
            password,
            pinned_notice: None,
            participants: HashMap::from([(creator.id.clone(), participant)]),
        }
    }

    pub fn is_participant(&self, id: &user::Id) -> bool {
        self.participants.contains_key(id)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Participant {
    pub id: user::Id,
    pub nickname: String,
    pub joined_at: i64,
    pub is_admin: bool,
}

impl Participant {
    pub fn new(user: &UserInfo) -> Self {
        Self {
            id: user.id.clone(),
            nickname: user.nickname.clone(),
            joined_at: chrono::Utc::now().timestamp_millis(),
            is_admin: user.is_admin,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct PinnedNotice {
    pub content: String,
    pub pinned_at: i64,
}

impl PinnedNotice {
    pub fn new(content: &str) -> Self {
        Self {
            content: content.to_string(),
            pinned_at: chrono::Utc::now().timestamp_millis(),
        }
    }
}

/// Directory/room view. Never carries the password itself.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct RoomDto {
    pub id: Id,
    pub name: String,
    pub created_at: i64,
    pub created_by: user::Id,
    pub creator_nickname: String,
    pub has_password: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pinned_notice: Option<PinnedNotice>,
    pub participants: Vec<Participant>,
}

impl From<Room> for RoomDto {
    fn from(room: Room) -> Self {
        let mut participants: Vec<Participant> = room.participants.into_values().collect();
        participants.sort_by(|a, b| a.joined_at.cmp(&b.joined_at));

        Self {
            id: room.id,
            name: room.name,
            created_at: room.created_at,
            created_by: room.created_by,
            creator_nickname: room.creator_nickname,
            has_password: room.password.is_some(),
            pinned_notice: room.pinned_notice,
            participants,
        }
    }
}

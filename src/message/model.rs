use serde::{Deserialize, Serialize};

use crate::room;
use crate::user::{self, model::UserInfo};

use super::Id;

/// Message document. Stored flat in the `messages` collection and keyed by
/// `room_id`, so one collection serves every room channel.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Message {
    #[serde(rename = "_id")]
    pub id: Id,
    pub room_id: room::Id,
    pub text: String,
    pub sender_id: user::Id,
    pub sender_nickname: String,
    pub timestamp: i64,
    pub is_system: bool,
}

impl Message {
    pub fn new(room_id: room::Id, sender: &UserInfo, text: &str) -> Self {
        Self {
            id: Id::random(),
            room_id,
            text: text.to_string(),
            sender_id: sender.id.clone(),
            sender_nickname: sender.nickname.clone(),
            timestamp: chrono::Utc::now().timestamp_millis(),
            is_system: false,
        }
    }

    /// Synthetic moderation entry. Stored and deleted like any other
    /// message, rendered distinctly by clients.
    pub fn system(room_id: room::Id, text: &str) -> Self {
        Self {
            id: Id::random(),
            room_id,
            text: text.to_string(),
            sender_id: user::Id::system(),
            sender_nickname: "시스템".to_string(),
            timestamp: chrono::Utc::now().timestamp_millis(),
            is_system: true,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct MessageDto {
    pub id: Id,
    pub room_id: room::Id,
    pub text: String,
    pub sender_id: user::Id,
    pub sender_nickname: String,
    pub timestamp: i64,
    pub is_system: bool,
}

impl From<Message> for MessageDto {
    fn from(message: Message) -> Self {
        Self {
            id: message.id,
            room_id: message.room_id,
            text: message.text,
            sender_id: message.sender_id,
            sender_nickname: message.sender_nickname,
            timestamp: message.timestamp,
            is_system: message.is_system,
        }
    }
}

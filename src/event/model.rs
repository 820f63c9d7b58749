use std::pin::Pin;

use futures::Stream;
use serde::{Deserialize, Serialize};

use crate::message::model::MessageDto;
use crate::room::model::PinnedNotice;
use crate::{message, room, user};

pub type NotificationStream = Pin<Box<dyn Stream<Item = Option<Notification>> + Send>>;

/// Wire format of everything pushed to ws clients. `History` is sent once
/// on connect and never published to the broker.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notification {
    NewMessage {
        message: MessageDto,
    },
    DeletedMessage {
        id: message::Id,
    },
    ParticipantKicked {
        user_id: user::Id,
        nickname: String,
    },
    NoticePinned {
        notice: PinnedNotice,
    },
    RoomUpdated {
        id: room::Id,
    },
    RoomDeleted {
        id: room::Id,
    },
    History {
        messages: Vec<MessageDto>,
    },
}

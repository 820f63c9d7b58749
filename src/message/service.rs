use crate::event;
use crate::message;
use crate::room::{self, service::RoomValidator};
use crate::user::model::UserInfo;

use super::model::{Message, MessageDto};
use super::Repository;

#[derive(Clone)]
pub struct MessageService {
    repo: Repository,
    validator: RoomValidator,
    event_service: event::Publisher,
}

impl MessageService {
    pub fn new(repo: Repository, validator: RoomValidator, event_service: event::Publisher) -> Self {
        Self {
            repo,
            validator,
            event_service,
        }
    }
}

impl MessageService {
    /// Appends a message to the room channel.
    ///
    /// Membership can change between sends, so the participants set is
    /// re-checked against storage on every call; a kicked sender is rejected
    /// even if their client still believes it is a participant.
    pub async fn send(
        &self,
        room_id: &room::Id,
        sender: &UserInfo,
        text: &str,
    ) -> super::Result<MessageDto> {
        let text = text.trim();
        if text.is_empty() {
            return Err(message::Error::EmptyText);
        }

        self.validator.check_participant(room_id, &sender.id).await?;

        let message = Message::new(room_id.clone(), sender, text);
        self.repo.insert(&message).await?;

        let dto = MessageDto::from(message);
        self.event_service
            .publish(
                &event::Subject::Messages(room_id),
                event::Notification::NewMessage {
                    message: dto.clone(),
                },
            )
            .await;

        Ok(dto)
    }

    pub async fn find_by_room_id(
        &self,
        room_id: &room::Id,
        reader: &UserInfo,
    ) -> super::Result<Vec<MessageDto>> {
        if !reader.is_admin {
            self.validator.check_participant(room_id, &reader.id).await?;
        }

        let messages = self.repo.find_by_room_id(room_id).await?;

        Ok(messages.into_iter().map(MessageDto::from).collect())
    }

    /// Admin-only hard delete. No tombstone; subscribers are told to drop
    /// the entry and a re-subscribe never sees it again.
    pub async fn delete(&self, id: &message::Id, caller: &UserInfo) -> super::Result<()> {
        if !caller.is_admin {
            return Err(message::Error::NotAdmin);
        }

        let message = self.repo.find_by_id(id).await?;
        self.repo.delete(id).await?;

        self.event_service
            .publish(
                &event::Subject::Messages(&message.room_id),
                event::Notification::DeletedMessage { id: id.to_owned() },
            )
            .await;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::event::Notification;
    use crate::room::repository::RoomRepository;
    use crate::room::service::tests::{
        admin, member, InMemoryMessages, InMemoryRooms, RecordingPublisher,
    };
    use crate::room::service::RoomService;
    use crate::room::CreationPolicy;

    struct Fixture {
        rooms: Arc<InMemoryRooms>,
        messages: Arc<InMemoryMessages>,
        events: Arc<RecordingPublisher>,
        room_service: RoomService,
        message_service: MessageService,
    }

    fn fixture() -> Fixture {
        let rooms = Arc::new(InMemoryRooms::default());
        let messages = Arc::new(InMemoryMessages::default());
        let events = Arc::new(RecordingPublisher::default());

        let room_service = RoomService::new(
            rooms.clone(),
            messages.clone(),
            events.clone(),
            CreationPolicy::Open,
        );
        let message_service = MessageService::new(
            messages.clone(),
            RoomValidator::new(rooms.clone()),
            events.clone(),
        );

        Fixture {
            rooms,
            messages,
            events,
            room_service,
            message_service,
        }
    }

    #[tokio::test]
    async fn send_rejects_whitespace_only_text() {
        let f = fixture();
        let creator = member("creator");
        let room = f.room_service.create(&creator, "방", None).await.unwrap();

        let result = f.message_service.send(&room.id, &creator, "   \t ").await;

        assert!(matches!(result, Err(message::Error::EmptyText)));
        assert!(f.messages.messages.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn send_rejects_non_participants() {
        let f = fixture();
        let room = f
            .room_service
            .create(&member("creator"), "방", None)
            .await
            .unwrap();
        let stranger = member("stranger");

        let result = f.message_service.send(&room.id, &stranger, "hi").await;

        assert!(matches!(
            result,
            Err(message::Error::_Room(crate::room::Error::NotParticipant))
        ));
    }

    #[tokio::test]
    async fn send_after_kick_is_rejected_despite_stale_client_state() {
        let f = fixture();
        let room = f
            .room_service
            .create(&member("creator"), "방", None)
            .await
            .unwrap();
        let guest = member("guest");
        f.room_service.join(&room.id, &guest, None).await.unwrap();
        f.message_service.send(&room.id, &guest, "hello").await.unwrap();

        f.room_service
            .kick(&room.id, &guest.id, &admin("운영자"))
            .await
            .unwrap();

        // the guest's own view still lists them as participant; the
        // authoritative re-check wins
        let result = f.message_service.send(&room.id, &guest, "still here?").await;

        assert!(matches!(
            result,
            Err(message::Error::_Room(crate::room::Error::NotParticipant))
        ));
    }

    #[tokio::test]
    async fn send_publishes_new_message_notification() {
        let f = fixture();
        let creator = member("creator");
        let room = f.room_service.create(&creator, "방", None).await.unwrap();

        let dto = f.message_service.send(&room.id, &creator, "hi").await.unwrap();

        let published = f.events.published.lock().unwrap();
        assert!(published
            .iter()
            .any(|(_, n)| matches!(n, Notification::NewMessage { message } if message.id == dto.id)));
    }

    #[tokio::test]
    async fn delete_is_admin_only() {
        let f = fixture();
        let creator = member("creator");
        let room = f.room_service.create(&creator, "방", None).await.unwrap();
        let dto = f.message_service.send(&room.id, &creator, "hi").await.unwrap();

        let denied = f.message_service.delete(&dto.id, &creator).await;
        assert!(matches!(denied, Err(message::Error::NotAdmin)));

        f.message_service.delete(&dto.id, &admin("운영자")).await.unwrap();

        assert!(f.messages.messages.lock().unwrap().is_empty());
        let published = f.events.published.lock().unwrap();
        assert!(published
            .iter()
            .any(|(_, n)| matches!(n, Notification::DeletedMessage { id } if *id == dto.id)));
    }

    #[tokio::test]
    async fn deleted_message_is_gone_from_history() {
        let f = fixture();
        let creator = member("creator");
        let room = f.room_service.create(&creator, "방", None).await.unwrap();
        let first = f.message_service.send(&room.id, &creator, "one").await.unwrap();
        let second = f.message_service.send(&room.id, &creator, "two").await.unwrap();

        f.message_service.delete(&first.id, &admin("운영자")).await.unwrap();

        let history = f
            .message_service
            .find_by_room_id(&room.id, &creator)
            .await
            .unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].id, second.id);
    }

    #[tokio::test]
    async fn system_messages_are_deletable_like_any_other() {
        let f = fixture();
        let room = f
            .room_service
            .create(&member("creator"), "방", None)
            .await
            .unwrap();
        let guest = member("guest");
        f.room_service.join(&room.id, &guest, None).await.unwrap();
        f.room_service
            .kick(&room.id, &guest.id, &admin("운영자"))
            .await
            .unwrap();

        let system_id = f.messages.messages.lock().unwrap()[0].id.clone();
        f.message_service
            .delete(&system_id, &admin("운영자"))
            .await
            .unwrap();

        assert!(f.messages.messages.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn history_is_ordered_by_timestamp_ascending() {
        let f = fixture();
        let creator = member("creator");
        let room = f.room_service.create(&creator, "방", None).await.unwrap();

        f.message_service.send(&room.id, &creator, "one").await.unwrap();
        f.message_service.send(&room.id, &creator, "two").await.unwrap();
        f.message_service.send(&room.id, &creator, "three").await.unwrap();

        // rewrite timestamps out of insertion order
        {
            let mut messages = f.messages.messages.lock().unwrap();
            messages[0].timestamp = 30;
            messages[1].timestamp = 10;
            messages[2].timestamp = 20;
        }

        let history = f
            .message_service
            .find_by_room_id(&room.id, &creator)
            .await
            .unwrap();

        let texts: Vec<&str> = history.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["two", "three", "one"]);
    }

    // Room created with password "1234"; A submits "0000" then "1234",
    // becomes a participant and sends the first message.
    #[tokio::test]
    async fn protected_room_join_and_first_message() {
        let f = fixture();
        let room = f
            .room_service
            .create(&member("creator"), "R", Some("1234"))
            .await
            .unwrap();
        let a = member("A");

        let rejected = f.room_service.join(&room.id, &a, Some("0000")).await;
        assert!(matches!(rejected, Err(crate::room::Error::WrongPassword)));
        assert!(!f
            .rooms
            .find_by_id(&room.id)
            .await
            .unwrap()
            .is_participant(&a.id));

        f.room_service.join(&room.id, &a, Some("1234")).await.unwrap();
        f.message_service.send(&room.id, &a, "hi").await.unwrap();

        let history = f.message_service.find_by_room_id(&room.id, &a).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].text, "hi");
        assert_eq!(history[0].sender_nickname, "A");
    }
}

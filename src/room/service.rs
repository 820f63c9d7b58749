use std::sync::Arc;

use log::error;

use crate::event;
use crate::message;
use crate::message::model::{Message, MessageDto};
use crate::room;
use crate::user::{self, model::UserInfo};

use super::model::{Participant, PinnedNotice, Room, RoomDto};
use super::{CreationPolicy, Repository};

/// Access controller and directory for chat rooms.
///
/// Decides, per (identity, room) pair, whether a caller may view and send:
/// an identity is `authorized` once the room has no password, the password
/// matched, or the identity is an admin; it becomes a `participant` through
/// an idempotent upsert into the room's participants map.
#[derive(Clone)]
pub struct RoomService {
    repo: Repository,
    message_repo: message::Repository,
    event_service: event::Publisher,
    creation_policy: CreationPolicy,
}

impl RoomService {
    pub fn new(
        repo: Repository,
        message_repo: message::Repository,
        event_service: event::Publisher,
        creation_policy: CreationPolicy,
    ) -> Self {
        Self {
            repo,
            message_repo,
            event_service,
            creation_policy,
        }
    }
}

impl RoomService {
    pub async fn create(
        &self,
        creator: &UserInfo,
        name: &str,
        password: Option<&str>,
    ) -> super::Result<RoomDto> {
        if self.creation_policy == CreationPolicy::AdminOnly && !creator.is_admin {
            return Err(room::Error::NotAdmin);
        }

        let name = name.trim();
        if name.is_empty() {
            return Err(room::Error::EmptyName);
        }

        let password = password
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(String::from);

        let room = Room::new(name, creator, password);
        self.repo.insert(&room).await?;

        self.event_service
            .publish(
                &event::Subject::Rooms,
                event::Notification::RoomUpdated {
                    id: room.id.clone(),
                },
            )
            .await;

        Ok(RoomDto::from(room))
    }

    pub async fn find_all(&self) -> super::Result<Vec<RoomDto>> {
        let rooms = self.repo.find_all().await?;

        Ok(rooms.into_iter().map(RoomDto::from).collect())
    }

    pub async fn find_by_id(&self, id: &room::Id) -> super::Result<RoomDto> {
        self.repo.find_by_id(id).await.map(RoomDto::from)
    }

    /// Admin-only deletion. Cascades to the room's messages so no dangling
    /// sub-collection is left behind.
    pub async fn delete(&self, id: &room::Id, caller: &UserInfo) -> super::Result<()> {
        if !caller.is_admin {
            return Err(room::Error::NotAdmin);
        }

        self.repo.find_by_id(id).await?;
        self.repo.delete(id).await?;

        if let Err(e) = self.message_repo.delete_by_room_id(id).await {
            error!("failed to cascade message deletion: {e:?}");
            return Err(room::Error::NotDeleted);
        }

        self.event_service
            .publish(
                &event::Subject::Messages(id),
                event::Notification::RoomDeleted { id: id.clone() },
            )
            .await;
        self.event_service
            .publish(
                &event::Subject::Rooms,
                event::Notification::RoomDeleted { id: id.clone() },
            )
            .await;

        Ok(())
    }
}

impl RoomService {
    /// unauthenticated -> authorized -> participant.
    ///
    /// A protected room requires the exact password unless the identity is
    /// an admin. The participant upsert is idempotent; re-entry is a no-op.
    pub async fn join(
        &self,
        id: &room::Id,
        user: &UserInfo,
        password: Option<&str>,
    ) -> super::Result<RoomDto> {
        let room = self.repo.find_by_id(id).await?;

        if room.is_participant(&user.id) {
            return Ok(RoomDto::from(room));
        }

        if !user.is_admin {
            if let Some(expected) = &room.password {
                match password {
                    Some(submitted) if submitted == expected => {}
                    _ => return Err(room::Error::WrongPassword),
                }
            }
        }

        let participant = Participant::new(user);
        self.repo.add_participant(id, &participant).await?;

        self.repo.find_by_id(id).await.map(RoomDto::from)
    }

    /// Admin removal of a participant. The creator is exempt; a successful
    /// kick appends exactly one system message and notifies subscribers so
    /// the kicked identity loses access without a reload.
    pub async fn kick(
        &self,
        id: &room::Id,
        target: &user::Id,
        caller: &UserInfo,
    ) -> super::Result<()> {
        if !caller.is_admin {
            return Err(room::Error::NotAdmin);
        }

        let room = self.repo.find_by_id(id).await?;
        if room.created_by == *target {
            return Err(room::Error::CreatorExempt);
        }

        let participant = room
            .participants
            .get(target)
            .ok_or(room::Error::NotParticipant)?;
        let nickname = participant.nickname.clone();

        self.repo.remove_participant(id, target).await?;

        let text = format!("{nickname}님이 관리자에 의해 퇴장되었습니다.");
        let dto = self.append_system_message(id, &text).await?;

        self.event_service
            .publish(
                &event::Subject::Messages(id),
                event::Notification::NewMessage { message: dto },
            )
            .await;
        self.event_service
            .publish(
                &event::Subject::Messages(id),
                event::Notification::ParticipantKicked {
                    user_id: target.clone(),
                    nickname,
                },
            )
            .await;

        Ok(())
    }
}

impl RoomService {
    pub async fn pin_notice(
        &self,
        id: &room::Id,
        caller: &UserInfo,
        content: &str,
    ) -> super::Result<()> {
        if !caller.is_admin {
            return Err(room::Error::NotAdmin);
        }

        let content = content.trim();
        if content.is_empty() {
            return Err(room::Error::EmptyNotice);
        }

        self.repo.find_by_id(id).await?;

        let notice = PinnedNotice::new(content);
        self.repo.set_pinned_notice(id, Some(&notice)).await?;

        let dto = self.append_system_message(id, "공지사항이 등록되었습니다.").await?;

        self.event_service
            .publish(
                &event::Subject::Messages(id),
                event::Notification::NewMessage { message: dto },
            )
            .await;
        self.event_service
            .publish(
                &event::Subject::Messages(id),
                event::Notification::NoticePinned { notice },
            )
            .await;
        self.event_service
            .publish(
                &event::Subject::Rooms,
                event::Notification::RoomUpdated { id: id.clone() },
            )
            .await;

        Ok(())
    }

    pub async fn clear_notice(&self, id: &room::Id, caller: &UserInfo) -> super::Result<()> {
        if !caller.is_admin {
            return Err(room::Error::NotAdmin);
        }

        self.repo.find_by_id(id).await?;
        self.repo.set_pinned_notice(id, None).await?;

        self.event_service
            .publish(
                &event::Subject::Messages(id),
                event::Notification::RoomUpdated { id: id.clone() },
            )
            .await;
        self.event_service
            .publish(
                &event::Subject::Rooms,
                event::Notification::RoomUpdated { id: id.clone() },
            )
            .await;

        Ok(())
    }

    pub async fn update_settings(
        &self,
        id: &room::Id,
        caller: &UserInfo,
        name: Option<&str>,
        password: Option<&str>,
    ) -> super::Result<()> {
        if !caller.is_admin {
            return Err(room::Error::NotAdmin);
        }

        let name = name.map(str::trim);
        if name.is_some_and(str::is_empty) {
            return Err(room::Error::EmptyName);
        }

        // nothing to change; don't fabricate a moderation entry
        if name.is_none() && password.is_none() {
            return Ok(());
        }

        self.repo.find_by_id(id).await?;
        self.repo.update_settings(id, name, password).await?;

        let dto = self
            .append_system_message(id, "채팅방 설정이 변경되었습니다.")
            .await?;

        self.event_service
            .publish(
                &event::Subject::Messages(id),
                event::Notification::NewMessage { message: dto },
            )
            .await;
        self.event_service
            .publish(
                &event::Subject::Messages(id),
                event::Notification::RoomUpdated { id: id.clone() },
            )
            .await;
        self.event_service
            .publish(
                &event::Subject::Rooms,
                event::Notification::RoomUpdated { id: id.clone() },
            )
            .await;

        Ok(())
    }
}

impl RoomService {
    async fn append_system_message(
        &self,
        id: &room::Id,
        text: &str,
    ) -> super::Result<MessageDto> {
        let message = Message::system(id.clone(), text);
        match self.message_repo.insert(&message).await {
            Ok(()) => Ok(MessageDto::from(message)),
            Err(e) => {
                error!("failed to append system message: {e:?}");
                Err(room::Error::NotUpdated)
            }
        }
    }
}

/// Authoritative participant check, re-fetched from storage on every call.
/// Cached client state never wins over this.
#[derive(Clone)]
pub struct RoomValidator {
    repo: Repository,
}

impl RoomValidator {
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    pub async fn check_participant(
        &self,
        room_id: &room::Id,
        user_id: &user::Id,
    ) -> super::Result<()> {
        let room = self.repo.find_by_id(room_id).await?;

        if !room.is_participant(user_id) {
            return Err(room::Error::NotParticipant);
        }

        Ok(())
    }
}

use std::sync::Arc;

use axum::extract::FromRef;

use crate::auth::service::AuthService;
use crate::event::service::EventService;
use crate::integration;
use crate::message::repository::MongoMessageRepository;
use crate::message::service::MessageService;
use crate::room::repository::MongoRoomRepository;
use crate::room::service::{RoomService, RoomValidator};
use crate::user::repository::MongoUserRepository;
use crate::user::service::UserService;
use crate::{event, message, room, user};

#[derive(Clone, FromRef)]
pub struct AppState {
    pub auth_service: AuthService,
    pub user_service: UserService,
    pub room_service: RoomService,
    pub room_validator: RoomValidator,
    pub message_service: MessageService,
    pub event_service: EventService,
}

impl AppState {
    pub async fn init(config: &integration::Config) -> Self {
        let db = integration::db::init(&config.mongo);
        let pubsub = config.pubsub.connect().await;

        let user_repo: user::Repository = Arc::new(MongoUserRepository::new(&db));
        let room_repo: room::Repository = Arc::new(MongoRoomRepository::new(&db));
        let message_repo: message::Repository = Arc::new(MongoMessageRepository::new(&db));

        let event_service = EventService::new(pubsub);
        let publisher: event::Publisher = Arc::new(event_service.clone());

        let auth_service = AuthService::new(&config.admin_secret);
        let user_service = UserService::new(user_repo, auth_service.clone());
        let room_service = RoomService::new(
            room_repo.clone(),
            message_repo.clone(),
            publisher.clone(),
            config.room_creation,
        );
        let room_validator = RoomValidator::new(room_repo);
        let message_service = MessageService::new(message_repo, room_validator.clone(), publisher);

        Self {
            auth_service,
            user_service,
            room_service,
            room_validator,
            message_service,
            event_service,
        }
    }
}

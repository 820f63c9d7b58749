use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use log::error;

use crate::state::AppState;
use crate::{room, user};

mod handler;
pub mod model;
pub mod service;

pub use model::{Notification, NotificationStream};
pub use service::{EventPublisher, Publisher};

type Result<T> = std::result::Result<T, Error>;

pub fn endpoints<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/ws/rooms/{room_id}", get(handler::ws))
        .with_state(state)
}

/// Pub/sub subject a notification is published on. Every room channel has
/// its own subject; directory-level changes go to a shared one.
#[derive(Clone)]
pub enum Subject<'a> {
    Messages(&'a room::Id),
    Rooms,
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    _User(#[from] user::Error),
    #[error(transparent)]
    _Room(#[from] room::Error),

    #[error(transparent)]
    _Nats(#[from] async_nats::SubscribeError),
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Self::_User(e) => e.into_response(),
            Self::_Room(e) => e.into_response(),

            Self::_Nats(e) => {
                error!("{e}");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}

use std::fmt::Display;
use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use axum::Router;
use log::error;
use repository::RoomRepository;
use serde::{Deserialize, Serialize};

use crate::state::AppState;

mod handler;
pub mod model;
pub mod repository;
pub mod service;

type Result<T> = std::result::Result<T, Error>;
pub type Repository = Arc<dyn RoomRepository + Send + Sync>;

pub fn api<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/rooms", get(handler::find_all))
        .route("/rooms", post(handler::create))
        .route("/rooms/{id}", get(handler::find_one))
        .route("/rooms/{id}", delete(handler::delete))
        .route("/rooms/{id}/join", post(handler::join))
        .route(
            "/rooms/{id}/participants/{user_id}",
            delete(handler::kick),
        )
        .route("/rooms/{id}/notice", put(handler::pin_notice))
        .route("/rooms/{id}/notice", delete(handler::clear_notice))
        .route("/rooms/{id}/settings", put(handler::update_settings))
        .with_state(state)
}

#[derive(Clone, Debug, Deserialize, Serialize, Hash, PartialEq, Eq)]
pub struct Id(pub String);

impl Id {
    pub fn random() -> Self {
        Self(mongodb::bson::oid::ObjectId::new().to_hex())
    }
}

impl Display for Id {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Who may create rooms. A deployment choice, set via `ROOM_CREATION`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CreationPolicy {
    Open,
    AdminOnly,
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("room not found: {0:?}")]
    NotFound(Option<Id>),
    #[error("wrong room password")]
    WrongPassword,
    #[error("user is not a participant of the room")]
    NotParticipant,
    #[error("admin privileges required")]
    NotAdmin,
    #[error("the room creator cannot be removed")]
    CreatorExempt,
    #[error("room name must not be empty")]
    EmptyName,
    #[error("notice content must not be empty")]
    EmptyNotice,
    #[error("could not delete room")]
    NotDeleted,
    #[error("could not update room")]
    NotUpdated,

    #[error(transparent)]
    _MongoDB(#[from] mongodb::error::Error),
    #[error(transparent)]
    _Bson(#[from] mongodb::bson::ser::Error),
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        error!("{self}");

        let (status, message) = match self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            Self::WrongPassword | Self::NotParticipant | Self::NotAdmin => {
                (StatusCode::FORBIDDEN, self.to_string())
            }
            Self::CreatorExempt | Self::EmptyName | Self::EmptyNotice => {
                (StatusCode::BAD_REQUEST, self.to_string())
            }
            Self::NotDeleted | Self::NotUpdated => {
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }

            Self::_MongoDB(_) | Self::_Bson(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_owned(),
            ),
        };

        (status, message).into_response()
    }
}

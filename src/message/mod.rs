use std::fmt::Display;
use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::Router;
use log::error;
use repository::MessageRepository;
use serde::{Deserialize, Serialize};

use crate::room;
use crate::state::AppState;

mod handler;
pub mod model;
pub mod repository;
pub mod service;

type Result<T> = std::result::Result<T, Error>;
pub type Repository = Arc<dyn MessageRepository + Send + Sync>;

pub fn api<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/messages", post(handler::create))
        .route("/messages", get(handler::find_all))
        .route("/messages/{id}", delete(handler::delete))
        .with_state(state)
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
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

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("message not found: {0:?}")]
    NotFound(Option<Id>),
    #[error("message text is empty")]
    EmptyText,
    #[error("admin privileges required")]
    NotAdmin,

    #[error(transparent)]
    _Room(#[from] room::Error),
    #[error(transparent)]
    _MongoDB(#[from] mongodb::error::Error),
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            Self::EmptyText => (StatusCode::BAD_REQUEST, self.to_string()),
            Self::NotAdmin => (StatusCode::FORBIDDEN, self.to_string()),

            Self::_Room(e) => return e.into_response(),
            Self::_MongoDB(e) => {
                error!("{e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_owned(),
                )
            }
        };

        error!("{message}");
        (status, message).into_response()
    }
}

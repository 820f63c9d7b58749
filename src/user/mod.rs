use std::fmt::Display;
use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use axum::Router;
use log::error;
use repository::UserRepository;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::state::AppState;

mod handler;
pub mod middleware;
pub mod model;
pub mod repository;
pub mod service;

type Result<T> = std::result::Result<T, Error>;
pub type Repository = Arc<dyn UserRepository + Send + Sync>;

pub fn public<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/login", post(handler::login))
        .with_state(state)
}

pub fn api<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/users", get(handler::find_all))
        .route("/users/{id}/nickname", put(handler::rename))
        .route("/users/{id}", delete(handler::delete))
        .with_state(state)
}

#[derive(Clone, Debug, Deserialize, Serialize, Hash, PartialEq, Eq)]
pub struct Id(pub String);

impl Id {
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Sender id carried by synthetic moderation messages.
    pub fn system() -> Self {
        Self("system".to_string())
    }
}

impl Display for Id {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("user not found: {0:?}")]
    NotFound(Id),
    #[error("unknown identity")]
    Unauthenticated,
    #[error("admin privileges required")]
    NotAdmin,
    #[error("nickname must not be empty")]
    EmptyNickname,
    #[error("admin password confirmation required")]
    ConfirmationRequired,

    #[error(transparent)]
    _MongoDB(#[from] mongodb::error::Error),
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        error!("{self}");

        let (status, message) = match self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            Self::Unauthenticated => (StatusCode::UNAUTHORIZED, self.to_string()),
            Self::NotAdmin | Self::ConfirmationRequired => (StatusCode::FORBIDDEN, self.to_string()),
            Self::EmptyNickname => (StatusCode::BAD_REQUEST, self.to_string()),

            Self::_MongoDB(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_owned(),
            ),
        };

        (status, message).into_response()
    }
}

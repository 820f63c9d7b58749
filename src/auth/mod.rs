use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use log::error;
use serde::Serialize;

use crate::state::AppState;
use crate::user;

mod handler;
pub mod service;

type Result<T> = std::result::Result<T, Error>;

pub fn api<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/admin/check-password", post(handler::check_password))
        .with_state(state)
}

#[derive(Serialize)]
pub struct CheckResponse {
    pub ok: bool,
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("invalid admin password")]
    InvalidPassword,

    #[error(transparent)]
    _User(#[from] user::Error),
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            // The response body never reveals more than the match result.
            Self::InvalidPassword => {
                (StatusCode::UNAUTHORIZED, Json(CheckResponse { ok: false })).into_response()
            }

            Self::_User(e) => {
                error!("{e}");
                e.into_response()
            }
        }
    }
}

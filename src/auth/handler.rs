use axum::extract::State;
use axum::{Extension, Json};
use serde::Deserialize;

use crate::auth;
use crate::user::model::UserInfo;
use crate::user::service::UserService;

use super::service::AuthService;
use super::CheckResponse;

#[derive(Deserialize)]
pub struct CheckRequest {
    password: String,
}

/// Verifies the shared admin secret. On match the calling identity is
/// promoted and stays admin for good; on mismatch nothing is mutated.
pub async fn check_password(
    user_info: Extension<UserInfo>,
    auth_service: State<AuthService>,
    user_service: State<UserService>,
    Json(req): Json<CheckRequest>,
) -> auth::Result<Json<CheckResponse>> {
    if !auth_service.check(&req.password) {
        return Err(auth::Error::InvalidPassword);
    }

    user_service.promote(&user_info.id).await?;

    Ok(Json(CheckResponse { ok: true }))
}

use axum::extract::{Path, State};
use axum::{Extension, Json};
use serde::Deserialize;

use crate::user;

use super::model::{UserDto, UserInfo};
use super::service::UserService;

#[derive(Deserialize)]
pub struct LoginRequest {
    nickname: String,
}

#[derive(Deserialize)]
pub struct RenameRequest {
    nickname: String,
}

#[derive(Deserialize, Default)]
pub struct DeleteRequest {
    password: Option<String>,
}

pub async fn login(
    user_service: State<UserService>,
    Json(req): Json<LoginRequest>,
) -> user::Result<Json<UserDto>> {
    let user = user_service.login(&req.nickname).await?;

    Ok(Json(user))
}

pub async fn find_all(
    user_info: Extension<UserInfo>,
    user_service: State<UserService>,
) -> user::Result<Json<Vec<UserDto>>> {
    let users = user_service.find_all(&user_info).await?;

    Ok(Json(users))
}

pub async fn rename(
    id: Path<user::Id>,
    user_info: Extension<UserInfo>,
    user_service: State<UserService>,
    Json(req): Json<RenameRequest>,
) -> user::Result<()> {
    user_service.rename(&user_info, &id, &req.nickname).await
}

pub async fn delete(
    id: Path<user::Id>,
    user_info: Extension<UserInfo>,
    user_service: State<UserService>,
    req: Option<Json<DeleteRequest>>,
) -> user::Result<()> {
    let password = req.as_ref().and_then(|r| r.password.as_deref());

    user_service.delete(&user_info, &id, password).await
}

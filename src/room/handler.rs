use axum::extract::{Path, State};
use axum::{Extension, Json};
use serde::Deserialize;

use crate::room;
use crate::user;
use crate::user::model::UserInfo;

use super::model::RoomDto;
use super::service::RoomService;

#[derive(Deserialize)]
pub struct CreateRequest {
    name: String,
    password: Option<String>,
}

#[derive(Deserialize, Default)]
pub struct JoinRequest {
    password: Option<String>,
}

#[derive(Deserialize)]
pub struct NoticeRequest {
    content: String,
}

#[derive(Deserialize)]
pub struct SettingsRequest {
    name: Option<String>,
    password: Option<String>,
}

pub async fn create(
    user_info: Extension<UserInfo>,
    room_service: State<RoomService>,
    Json(req): Json<CreateRequest>,
) -> room::Result<Json<RoomDto>> {
    let room = room_service
        .create(&user_info, &req.name, req.password.as_deref())
        .await?;

    Ok(Json(room))
}

pub async fn find_all(room_service: State<RoomService>) -> room::Result<Json<Vec<RoomDto>>> {
    let rooms = room_service.find_all().await?;

    Ok(Json(rooms))
}

pub async fn find_one(
    id: Path<room::Id>,
    room_service: State<RoomService>,
) -> room::Result<Json<RoomDto>> {
    let room = room_service.find_by_id(&id).await?;

    Ok(Json(room))
}

pub async fn delete(
    id: Path<room::Id>,
    user_info: Extension<UserInfo>,
    room_service: State<RoomService>,
) -> room::Result<()> {
    room_service.delete(&id, &user_info).await
}

pub async fn join(
    id: Path<room::Id>,
    user_info: Extension<UserInfo>,
    room_service: State<RoomService>,
    req: Option<Json<JoinRequest>>,
) -> room::Result<Json<RoomDto>> {
    let password = req.as_ref().and_then(|r| r.password.as_deref());

    let room = room_service.join(&id, &user_info, password).await?;

    Ok(Json(room))
}

pub async fn kick(
    Path((id, user_id)): Path<(room::Id, user::Id)>,
    user_info: Extension<UserInfo>,
    room_service: State<RoomService>,
) -> room::Result<()> {
    room_service.kick(&id, &user_id, &user_info).await
}

pub async fn pin_notice(
    id: Path<room::Id>,
    user_info: Extension<UserInfo>,
    room_service: State<RoomService>,
    Json(req): Json<NoticeRequest>,
) -> room::Result<()> {
    room_service.pin_notice(&id, &user_info, &req.content).await
}

pub async fn clear_notice(
    id: Path<room::Id>,
    user_info: Extension<UserInfo>,
    room_service: State<RoomService>,
) -> room::Result<()> {
    room_service.clear_notice(&id, &user_info).await
}

pub async fn update_settings(
    id: Path<room::Id>,
    user_info: Extension<UserInfo>,
    room_service: State<RoomService>,
    Json(req): Json<SettingsRequest>,
) -> room::Result<()> {
    room_service
        .update_settings(&id, &user_info, req.name.as_deref(), req.password.as_deref())
        .await
}

use axum::extract::{Path, Query, State};
use axum::{Extension, Json};
use serde::Deserialize;

use crate::message;
use crate::room;
use crate::user::model::UserInfo;

use super::model::MessageDto;
use super::service::MessageService;

#[derive(Deserialize)]
pub struct CreateRequest {
    room_id: room::Id,
    text: String,
}

#[derive(Deserialize)]
pub struct FindParams {
    room_id: room::Id,
}

pub async fn create(
    user_info: Extension<UserInfo>,
    message_service: State<MessageService>,
    Json(req): Json<CreateRequest>,
) -> message::Result<Json<MessageDto>> {
    let message = message_service
        .send(&req.room_id, &user_info, &req.text)
        .await?;

    Ok(Json(message))
}

pub async fn find_all(
    params: Query<FindParams>,
    user_info: Extension<UserInfo>,
    message_service: State<MessageService>,
) -> message::Result<Json<Vec<MessageDto>>> {
    let messages = message_service
        .find_by_room_id(&params.room_id, &user_info)
        .await?;

    Ok(Json(messages))
}

pub async fn delete(
    id: Path<message::Id>,
    user_info: Extension<UserInfo>,
    message_service: State<MessageService>,
) -> message::Result<()> {
    message_service.delete(&id, &user_info).await
}

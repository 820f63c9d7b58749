use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::user;

use super::service::UserService;

const USER_ID_HEADER: &str = "x-user-id";

/// Resolves the request identity from the `x-user-id` header and injects it
/// as an [`super::model::UserInfo`] extension. The header carries the locally
/// stored identity id; an unknown or missing id fails closed.
pub async fn identify(
    user_service: State<UserService>,
    mut request: Request,
    next: Next,
) -> user::Result<Response> {
    let id = request
        .headers()
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|v| user::Id(v.to_string()))
        .ok_or(user::Error::Unauthenticated)?;

    let user_info = user_service
        .find_user_info(&id)
        .await
        .map_err(|_| user::Error::Unauthenticated)?;

    request.extensions_mut().insert(user_info);

    let response = next.run(request).await;
    Ok(response)
}

use axum::{middleware, Router};
use log::info;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

mod auth;
mod event;
mod integration;
mod message;
mod room;
mod state;
mod user;

#[tokio::main]
async fn main() {
    let config = integration::Config::default();
    let state = AppState::init(&config).await;

    let cors = CorsLayer::new()
        .allow_origin(config.env.allow_origin())
        .allow_methods(config.env.allow_methods())
        .allow_headers(config.env.allow_headers());

    // everything except login requires a resolvable identity
    let protected = Router::new()
        .merge(user::api(state.clone()))
        .merge(auth::api(state.clone()))
        .merge(room::api(state.clone()))
        .merge(message::api(state.clone()))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            user::middleware::identify,
        ));

    let router = Router::new()
        .nest(
            "/api",
            Router::new().merge(user::public(state.clone())).merge(protected),
        )
        .merge(event::endpoints(state))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let addr = config.env.addr();
    info!("Starting chatroom service on {addr}");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind address");

    axum::serve(listener, router)
        .await
        .expect("Failed to start server");
}

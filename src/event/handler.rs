use std::sync::Arc;

use axum::extract::ws::Message::{Binary, Close, Text};
use axum::extract::ws::{self, WebSocket};
use axum::extract::{Path, Query, State, WebSocketUpgrade};
use axum::response::Response;
use futures::stream::SplitStream;
use futures::{Sink, SinkExt, StreamExt};
use log::{debug, error, warn};
use serde::Deserialize;
use tokio::sync::Notify;
use tokio::try_join;

use super::model::{Notification, NotificationStream};
use super::service::EventService;
use super::Subject;
use crate::message::service::MessageService;
use crate::room;
use crate::room::service::{RoomService, RoomValidator};
use crate::user;
use crate::user::model::UserInfo;
use crate::user::service::UserService;

#[derive(Deserialize)]
pub struct Params {
    user_id: user::Id,
}

/// Live subscription to a room channel. Browsers cannot set headers on a
/// ws handshake, so the identity arrives as a query param and is verified
/// against storage before the upgrade.
pub async fn ws(
    Path(room_id): Path<room::Id>,
    params: Query<Params>,
    ws: WebSocketUpgrade,
    State(user_service): State<UserService>,
    State(room_service): State<RoomService>,
    State(room_validator): State<RoomValidator>,
    State(message_service): State<MessageService>,
    State(event_service): State<EventService>,
) -> super::Result<Response> {
    let user_info = user_service.find_user_info(&params.user_id).await?;

    if user_info.is_admin {
        room_service.find_by_id(&room_id).await?;
    } else {
        room_validator
            .check_participant(&room_id, &user_info.id)
            .await?;
    }

    Ok(ws.on_upgrade(move |socket| {
        handle_socket(room_id, user_info, socket, event_service, message_service)
    }))
}

async fn handle_socket(
    room_id: room::Id,
    user_info: UserInfo,
    mut ws: WebSocket,
    event_service: EventService,
    message_service: MessageService,
) {
    // subscribe before reading history so nothing published in between is lost
    let noti_stream = match event_service.subscribe(&Subject::Messages(&room_id)).await {
        Ok(stream) => stream,
        Err(e) => {
            error!("failed to subscribe, aborting ws connection: {e:?}");
            if let Err(e) = ws.close().await {
                error!("failed to close ws connection: {e}");
            }
            return;
        }
    };

    let history = match message_service.find_by_room_id(&room_id, &user_info).await {
        Ok(messages) => Notification::History { messages },
        Err(e) => {
            error!("failed to read room history, aborting ws connection: {e:?}");
            if let Err(e) = ws.close().await {
                error!("failed to close ws connection: {e}");
            }
            return;
        }
    };

    let (sender, receiver) = ws.split();
    let close = Arc::new(Notify::new());

    let read_task = tokio::spawn(read(close.clone(), receiver));
    let write_task = tokio::spawn(write(close.clone(), sender, history, noti_stream, user_info.id));

    match try_join!(read_task, write_task) {
        Ok(_) => debug!("ws disconnected gracefully"),
        Err(e) => error!("ws disconnected with error: {e}"),
    }
}

async fn read(close: Arc<Notify>, mut receiver: SplitStream<WebSocket>) {
    loop {
        tokio::select! {
            // close is notified => stop 'read' task
            _ = close.notified() => break,

            // read next frame from ws connection
            frame = receiver.next() => {
                match frame {
                    None => {
                        close.notify_one(); // notify 'write' task to stop
                        break;
                    }
                    Some(Err(e)) => {
                        error!("failed to read ws frame: {e:?}");
                        close.notify_one(); // notify 'write' task to stop
                        break;
                    }
                    Some(Ok(Close(frame))) => {
                        debug!("ws connection closed by client: {frame:?}");
                        close.notify_one(); // notify 'write' task to stop
                        break;
                    }
                    // sends go through the http api; the ws channel is read-only
                    Some(Ok(Text(content))) => warn!("ignoring inbound text frame: {content}"),
                    Some(Ok(Binary(content))) => warn!("received binary ws frame: {content:?}"),
                    Some(Ok(_)) => {}
                }
            }
        }
    }
}

/// Pushes the full ordered history frame first, then every incremental
/// update, until the stream ends, the peer goes away, or the connected
/// identity itself is kicked out of the room.
async fn write<S>(
    close: Arc<Notify>,
    mut sender: S,
    history: Notification,
    mut noti_stream: NotificationStream,
    user_id: user::Id,
) where
    S: Sink<ws::Message> + Unpin,
    S::Error: std::fmt::Display,
{
    if !send_notification(&mut sender, &history).await {
        close.notify_one();
        return;
    }

    loop {
        tokio::select! {
            // close is notified => stop 'write' task
            _ = close.notified() => break,

            // new notification from the broker => push it to the client
            item = noti_stream.next() => {
                match item {
                    None => {
                        close.notify_one();
                        break;
                    }
                    // malformed payload, already logged
                    Some(None) => continue,
                    Some(Some(noti)) => {
                        let kicked_self = matches!(
                            &noti,
                            Notification::ParticipantKicked { user_id: target, .. } if *target == user_id
                        );

                        if !send_notification(&mut sender, &noti).await {
                            close.notify_one();
                            break;
                        }

                        // deliver the kick to its target, then drop the connection
                        if kicked_self {
                            debug!("closing ws connection of kicked participant");
                            close.notify_one();
                            break;
                        }
                    }
                }
            }
        }
    }

    if let Err(e) = sender.close().await {
        debug!("failed to close ws sender: {e}");
    }
}

async fn send_notification<S>(sender: &mut S, noti: &Notification) -> bool
where
    S: Sink<ws::Message> + Unpin,
    S::Error: std::fmt::Display,
{
    match serde_json::to_string(noti) {
        Ok(payload) => match sender.send(Text(payload.into())).await {
            Ok(()) => true,
            Err(e) => {
                error!("failed to send notification to client: {e}");
                false
            }
        },
        Err(e) => {
            error!("failed to serialize notification: {e:?}");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use std::pin::Pin;
    use std::task::{Context, Poll};

    use super::*;
    use crate::message::model::{Message, MessageDto};

    #[derive(Default)]
    struct RecordingSink {
        frames: Vec<ws::Message>,
    }

    impl Sink<ws::Message> for RecordingSink {
        type Error = std::convert::Infallible;

        fn poll_ready(self: Pin<&mut Self>, _: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
            Poll::Ready(Ok(()))
        }

        fn start_send(self: Pin<&mut Self>, item: ws::Message) -> Result<(), Self::Error> {
            self.get_mut().frames.push(item);
            Ok(())
        }

        fn poll_flush(self: Pin<&mut Self>, _: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
            Poll::Ready(Ok(()))
        }

        fn poll_close(self: Pin<&mut Self>, _: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
            Poll::Ready(Ok(()))
        }
    }

    fn stream_of(items: Vec<Option<Notification>>) -> NotificationStream {
        Box::pin(tokio_stream::iter(items))
    }

    fn member(nickname: &str) -> UserInfo {
        UserInfo {
            id: user::Id::random(),
            nickname: nickname.to_string(),
            is_admin: false,
        }
    }

    fn message_dto(room_id: &room::Id, sender: &UserInfo, text: &str) -> MessageDto {
        MessageDto::from(Message::new(room_id.clone(), sender, text))
    }

    fn decode(frame: &ws::Message) -> Notification {
        match frame {
            Text(payload) => serde_json::from_str(payload.as_str()).unwrap(),
            other => panic!("expected a text frame, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn history_is_sent_before_incremental_updates() {
        let room_id = room::Id::random();
        let viewer = member("viewer");
        let older = message_dto(&room_id, &viewer, "first");
        let live = message_dto(&room_id, &viewer, "second");

        let mut sink = RecordingSink::default();
        write(
            Arc::new(Notify::new()),
            &mut sink,
            Notification::History {
                messages: vec![older.clone()],
            },
            stream_of(vec![Some(Notification::NewMessage {
                message: live.clone(),
            })]),
            viewer.id,
        )
        .await;

        assert_eq!(sink.frames.len(), 2);
        assert!(matches!(
            decode(&sink.frames[0]),
            Notification::History { messages } if messages.len() == 1 && messages[0].id == older.id
        ));
        assert!(matches!(
            decode(&sink.frames[1]),
            Notification::NewMessage { message } if message.id == live.id
        ));
    }

    #[tokio::test]
    async fn own_kick_is_delivered_and_terminates_the_connection() {
        let room_id = room::Id::random();
        let viewer = member("viewer");
        let after = message_dto(&room_id, &viewer, "after");

        let mut sink = RecordingSink::default();
        write(
            Arc::new(Notify::new()),
            &mut sink,
            Notification::History {
                messages: Vec::new(),
            },
            stream_of(vec![
                Some(Notification::ParticipantKicked {
                    user_id: viewer.id.clone(),
                    nickname: viewer.nickname.clone(),
                }),
                Some(Notification::NewMessage { message: after }),
            ]),
            viewer.id.clone(),
        )
        .await;

        // the kick frame itself reaches its target, nothing after it does
        assert_eq!(sink.frames.len(), 2);
        assert!(matches!(
            decode(&sink.frames[1]),
            Notification::ParticipantKicked { user_id, .. } if user_id == viewer.id
        ));
    }

    #[tokio::test]
    async fn kicks_of_other_participants_do_not_terminate_the_connection() {
        let room_id = room::Id::random();
        let viewer = member("viewer");
        let other = member("other");
        let after = message_dto(&room_id, &viewer, "after");

        let mut sink = RecordingSink::default();
        write(
            Arc::new(Notify::new()),
            &mut sink,
            Notification::History {
                messages: Vec::new(),
            },
            stream_of(vec![
                Some(Notification::ParticipantKicked {
                    user_id: other.id.clone(),
                    nickname: other.nickname.clone(),
                }),
                Some(Notification::NewMessage {
                    message: after.clone(),
                }),
            ]),
            viewer.id,
        )
        .await;

        assert_eq!(sink.frames.len(), 3);
        assert!(matches!(
            decode(&sink.frames[2]),
            Notification::NewMessage { message } if message.id == after.id
        ));
    }
}

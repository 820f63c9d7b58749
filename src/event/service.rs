use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use log::error;
use tokio_stream::StreamExt;

use super::model::{Notification, NotificationStream};
use super::Subject;

/// Fan-out seam. Services publish through this trait so notification
/// delivery stays best effort: a broker hiccup is logged, never surfaced
/// to the operation that triggered it.
#[async_trait]
pub trait EventPublisher {
    async fn publish(&self, subject: &Subject<'_>, noti: Notification);
}

pub type Publisher = Arc<dyn EventPublisher + Send + Sync>;

#[derive(Clone)]
pub struct EventService {
    pubsub: async_nats::Client,
}

impl EventService {
    pub fn new(pubsub: async_nats::Client) -> Self {
        Self { pubsub }
    }
}

#[async_trait]
impl EventPublisher for EventService {
    async fn publish(&self, subject: &Subject<'_>, noti: Notification) {
        if let Err(e) = self.pubsub.publish(subject, Bytes::from(noti)).await {
            error!("failed to publish notification to {subject}: {e:?}");
        }
    }
}

impl EventService {
    pub async fn subscribe(&self, subject: &Subject<'_>) -> super::Result<NotificationStream> {
        let subscriber = self.pubsub.subscribe(subject).await?;

        let stream = subscriber.then(|msg| async move {
            match serde_json::from_slice::<Notification>(&msg.payload) {
                Ok(noti) => Some(noti),
                Err(e) => {
                    error!("failed to deserialize notification: {e:?}");
                    None
                }
            }
        });

        Ok(Box::pin(stream))
    }
}

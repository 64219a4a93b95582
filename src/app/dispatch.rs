use std::sync::Arc;

use anyhow::Result;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::app::broker::Broker;
use crate::domain::notification::{DeliveryMethod, NewNotification, Notification};
use crate::infra::directory::UserDirectory;
use crate::infra::mailer::{EmailMessage, Mailer};
use crate::infra::store::NotificationStore;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("user {0} not found")]
    MissingUser(String),
    #[error("user {0} has no email address")]
    MissingEmailAddress(String),
    #[error("directory lookup failed: {0}")]
    Directory(anyhow::Error),
    #[error("email delivery failed: {0}")]
    EmailDelivery(anyhow::Error),
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

/// Echo of a successfully relayed email, returned to the creator.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailReceipt {
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

/// Persists notifications and routes each one to its delivery channel.
#[derive(Clone)]
pub struct DispatchService {
    store: Arc<dyn NotificationStore>,
    directory: Arc<dyn UserDirectory>,
    mailer: Arc<dyn Mailer>,
    broker: Arc<Broker>,
}

impl DispatchService {
    pub fn new(
        store: Arc<dyn NotificationStore>,
        directory: Arc<dyn UserDirectory>,
        mailer: Arc<dyn Mailer>,
        broker: Arc<Broker>,
    ) -> Self {
        Self {
            store,
            directory,
            mailer,
            broker,
        }
    }

    /// Persists the notification, then delivers it. The stored record
    /// survives any delivery failure; there is no rollback.
    pub async fn create(
        &self,
        new: NewNotification,
    ) -> Result<(Notification, Option<EmailReceipt>), DispatchError> {
        let notification = self.store.insert(new).await?;

        let receipt = match notification.delivery_method {
            DeliveryMethod::InApp => {
                let delivered = self.broker.publish(&notification.user_id, &notification);
                debug!(
                    notification_id = %notification.id,
                    user_id = %notification.user_id,
                    delivered,
                    "published in-app notification"
                );
                None
            }
            DeliveryMethod::Email => Some(self.deliver_email(&notification).await?),
            DeliveryMethod::Text => {
                // No sms sink is wired up; the record is kept, the channel
                // does nothing.
                debug!(
                    notification_id = %notification.id,
                    "text delivery requested, no sms sink configured"
                );
                None
            }
        };

        Ok((notification, receipt))
    }

    async fn deliver_email(
        &self,
        notification: &Notification,
    ) -> Result<EmailReceipt, DispatchError> {
        let user = self
            .directory
            .find(&notification.user_id)
            .await
            .map_err(DispatchError::Directory)?
            .ok_or_else(|| DispatchError::MissingUser(notification.user_id.clone()))?;
        let recipient = user
            .email
            .ok_or_else(|| DispatchError::MissingEmailAddress(user.id.clone()))?;

        let message = EmailMessage {
            to: recipient,
            subject: notification.title.clone(),
            body: notification.message.clone(),
        };
        self.mailer
            .send(&message)
            .await
            .map_err(DispatchError::EmailDelivery)?;

        Ok(EmailReceipt {
            recipient: message.to,
            subject: message.subject,
            body: message.body,
        })
    }

    pub async fn list_all(&self) -> Result<Vec<Notification>> {
        self.store.list_all().await
    }

    pub async fn list_for_user(&self, user_id: &str) -> Result<Vec<Notification>> {
        self.store.list_for_user(user_id).await
    }

    pub async fn mark_read(&self, user_id: &str, id: Uuid) -> Result<bool> {
        self.store.mark_read(user_id, id).await
    }

    pub async fn mark_all_read(&self, user_id: &str) -> Result<u64> {
        self.store.mark_all_read(user_id).await
    }

    pub async fn delete(&self, user_id: &str, id: Uuid) -> Result<bool> {
        self.store.delete(user_id, id).await
    }
}

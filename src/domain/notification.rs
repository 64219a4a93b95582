use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use time::OffsetDateTime;
use uuid::Uuid;

/// Business category of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationType {
    System,
    Customer,
    Internal,
}

#[derive(Debug, thiserror::Error)]
#[error("unknown notification type")]
pub struct UnknownNotificationType;

impl NotificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::System => "System",
            NotificationType::Customer => "Customer",
            NotificationType::Internal => "Internal",
        }
    }
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationType {
    type Err = UnknownNotificationType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "System" => Ok(NotificationType::System),
            "Customer" => Ok(NotificationType::Customer),
            "Internal" => Ok(NotificationType::Internal),
            _ => Err(UnknownNotificationType),
        }
    }
}

/// Channel a notification is delivered through. Fixed at creation; it
/// records which sink was attempted, not what a client later sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeliveryMethod {
    InApp,
    Email,
    Text,
}

#[derive(Debug, thiserror::Error)]
#[error("unknown delivery method")]
pub struct UnknownDeliveryMethod;

impl DeliveryMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryMethod::InApp => "InApp",
            DeliveryMethod::Email => "Email",
            DeliveryMethod::Text => "Text",
        }
    }
}

impl fmt::Display for DeliveryMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeliveryMethod {
    type Err = UnknownDeliveryMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "InApp" => Ok(DeliveryMethod::InApp),
            "Email" => Ok(DeliveryMethod::Email),
            "Text" => Ok(DeliveryMethod::Text),
            _ => Err(UnknownDeliveryMethod),
        }
    }
}

/// A stored notification. `id`, `is_read` and `created_at` are assigned by
/// the store at insert time; everything else is immutable after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    pub user_id: String,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub delivery_method: DeliveryMethod,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Validated creation payload handed to the store.
#[derive(Debug, Clone)]
pub struct NewNotification {
    pub user_id: String,
    pub kind: NotificationType,
    pub delivery_method: DeliveryMethod,
    pub title: String,
    pub message: String,
}

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::app::dispatch::{DispatchError, DispatchService, EmailReceipt};
use crate::domain::notification::{
    DeliveryMethod, NewNotification, Notification, NotificationType,
};
use crate::domain::user::User;
use crate::http::AppError;
use crate::AppState;

#[derive(Serialize)]
pub(crate) struct HealthResponse {
    status: &'static str,
}

pub(crate) async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let store = state.store.ping().await.is_ok();
    let status = if store { "ok" } else { "degraded" };

    Json(HealthResponse { status })
}

pub async fn list_notifications(
    State(state): State<AppState>,
) -> Result<Json<Vec<Notification>>, AppError> {
    let service = DispatchService::new(
        state.store.clone(),
        state.directory.clone(),
        state.mailer.clone(),
        state.broker.clone(),
    );
    let notifications = service.list_all().await.map_err(|err| {
        tracing::error!(error = ?err, "failed to list notifications");
        AppError::internal("failed to list notifications")
    })?;

    Ok(Json(notifications))
}

pub async fn list_user_notifications(
    Path(user_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Vec<Notification>>, AppError> {
    let service = DispatchService::new(
        state.store.clone(),
        state.directory.clone(),
        state.mailer.clone(),
        state.broker.clone(),
    );
    let notifications = service.list_for_user(&user_id).await.map_err(|err| {
        tracing::error!(error = ?err, user_id = %user_id, "failed to list notifications");
        AppError::internal("failed to list notifications")
    })?;

    Ok(Json(notifications))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNotificationRequest {
    pub user_id: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub delivery_method: Option<String>,
    pub title: Option<String>,
    pub message: Option<String>,
}

#[derive(Serialize)]
pub struct CreatedNotificationResponse {
    #[serde(flatten)]
    pub notification: Notification,
    pub delivery: Option<EmailReceipt>,
}

pub async fn create_notification(
    State(state): State<AppState>,
    Json(payload): Json<CreateNotificationRequest>,
) -> Result<(StatusCode, Json<CreatedNotificationResponse>), AppError> {
    let user_id = payload.user_id.unwrap_or_default();
    if user_id.trim().is_empty() {
        return Err(AppError::bad_request("userId is required"));
    }
    let title = payload.title.unwrap_or_default();
    if title.trim().is_empty() {
        return Err(AppError::bad_request("title is required"));
    }
    let message = payload.message.unwrap_or_default();
    if message.trim().is_empty() {
        return Err(AppError::bad_request("message is required"));
    }
    let kind: NotificationType = payload
        .kind
        .as_deref()
        .unwrap_or_default()
        .parse()
        .map_err(|_| AppError::bad_request("invalid notification type"))?;
    let delivery_method: DeliveryMethod = payload
        .delivery_method
        .as_deref()
        .unwrap_or_default()
        .parse()
        .map_err(|_| AppError::bad_request("invalid delivery method"))?;

    let service = DispatchService::new(
        state.store.clone(),
        state.directory.clone(),
        state.mailer.clone(),
        state.broker.clone(),
    );
    let (notification, delivery) = service
        .create(NewNotification {
            user_id,
            kind,
            delivery_method,
            title,
            message,
        })
        .await
        .map_err(|err| match err {
            DispatchError::MissingUser(_) => AppError::not_found("user not found"),
            DispatchError::MissingEmailAddress(_) => {
                AppError::bad_request("user has no email address")
            }
            DispatchError::Directory(err) => {
                tracing::error!(error = ?err, "failed to look up email recipient");
                AppError::internal("failed to create notification")
            }
            DispatchError::EmailDelivery(err) => {
                tracing::error!(error = ?err, "failed to deliver notification email");
                AppError::internal("failed to deliver notification email")
            }
            DispatchError::Store(err) => {
                tracing::error!(error = ?err, "failed to create notification");
                AppError::internal("failed to create notification")
            }
        })?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedNotificationResponse {
            notification,
            delivery,
        }),
    ))
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

pub async fn mark_notification_read(
    Path((user_id, id)): Path<(String, Uuid)>,
    State(state): State<AppState>,
) -> Result<Json<MessageResponse>, AppError> {
    let service = DispatchService::new(
        state.store.clone(),
        state.directory.clone(),
        state.mailer.clone(),
        state.broker.clone(),
    );
    let updated = service.mark_read(&user_id, id).await.map_err(|err| {
        tracing::error!(error = ?err, notification_id = %id, user_id = %user_id, "failed to mark notification read");
        AppError::internal("failed to mark notification read")
    })?;

    if updated {
        Ok(Json(MessageResponse {
            message: "Notification marked as read",
        }))
    } else {
        Err(AppError::not_found("notification not found"))
    }
}

#[derive(Serialize)]
pub struct MarkAllReadResponse {
    pub message: &'static str,
    pub updated: u64,
}

pub async fn mark_all_notifications_read(
    Path(user_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<MarkAllReadResponse>, AppError> {
    let service = DispatchService::new(
        state.store.clone(),
        state.directory.clone(),
        state.mailer.clone(),
        state.broker.clone(),
    );
    let updated = service.mark_all_read(&user_id).await.map_err(|err| {
        tracing::error!(error = ?err, user_id = %user_id, "failed to mark notifications read");
        AppError::internal("failed to mark notifications read")
    })?;

    let message = if updated > 0 {
        "All notifications marked as read"
    } else {
        "No unread notifications found"
    };

    Ok(Json(MarkAllReadResponse { message, updated }))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedNotificationResponse {
    pub message: &'static str,
    pub notification_id: Uuid,
}

pub async fn delete_notification(
    Path((user_id, id)): Path<(String, Uuid)>,
    State(state): State<AppState>,
) -> Result<Json<DeletedNotificationResponse>, AppError> {
    let service = DispatchService::new(
        state.store.clone(),
        state.directory.clone(),
        state.mailer.clone(),
        state.broker.clone(),
    );
    let deleted = service.delete(&user_id, id).await.map_err(|err| {
        tracing::error!(error = ?err, notification_id = %id, user_id = %user_id, "failed to delete notification");
        AppError::internal("failed to delete notification")
    })?;

    if deleted {
        Ok(Json(DeletedNotificationResponse {
            message: "Notification deleted successfully",
            notification_id: id,
        }))
    } else {
        Err(AppError::not_found("notification not found"))
    }
}

pub async fn get_user(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<User>, AppError> {
    let user = state.directory.find(&id).await.map_err(|err| {
        tracing::error!(error = ?err, user_id = %id, "failed to fetch user");
        AppError::internal("failed to fetch user")
    })?;

    match user {
        Some(user) => Ok(Json(user)),
        None => Err(AppError::not_found("user not found")),
    }
}

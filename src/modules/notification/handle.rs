use actix_web::{get, post, web};
use uuid::Uuid;

use crate::{
    api::{error, success},
    modules::notification::{
        model::{MarkAllRead, NotificationListResponse, NotificationQuery, RECENT_WINDOW},
        repository_pg::NotificationRepositoryPg,
        service::NotificationService,
    },
};

pub type NotificationSvc = NotificationService<NotificationRepositoryPg>;

#[get("/")]
pub async fn get_notifications(
    notification_service: web::Data<NotificationSvc>,
    query: web::Query<NotificationQuery>,
) -> Result<success::Success<NotificationListResponse>, error::Error> {
    let query = query.into_inner();
    let notifications = notification_service.list(query.user_id, query.limit).await?;

    Ok(success::Success::ok(Some(notifications)).message("Successfully retrieved notifications"))
}

/// Bell dropdown feed: the most recent entries only, fixed window.
#[get("/recent")]
pub async fn get_recent_notifications(
    notification_service: web::Data<NotificationSvc>,
    query: web::Query<NotificationQuery>,
) -> Result<success::Success<NotificationListResponse>, error::Error> {
    let notifications = notification_service.list(query.user_id, Some(RECENT_WINDOW)).await?;

    Ok(success::Success::ok(Some(notifications)).message("Successfully retrieved notifications"))
}

#[post("/{notification_id}/read")]
pub async fn mark_notification_read(
    notification_service: web::Data<NotificationSvc>,
    notification_id: web::Path<Uuid>,
) -> Result<success::Success<()>, error::Error> {
    notification_service.mark_read(*notification_id).await?;

    Ok(success::Success::no_content())
}

#[post("/read-all")]
pub async fn mark_all_notifications_read(
    notification_service: web::Data<NotificationSvc>,
    body: web::Json<MarkAllRead>,
) -> Result<success::Success<()>, error::Error> {
    notification_service.mark_all_read(body.user_id).await?;

    Ok(success::Success::no_content())
}

use actix_web::{get, post, web};
use uuid::Uuid;

use crate::{
    api::{error, success},
    modules::{
        message::{
            model::{MarkAsRead, MessageListResponse, SendMessage},
            repository_pg::MessageRepositoryPg,
            schema::MessageEntity,
            service::MessageService,
        },
        room::repository_pg::RoomRepositoryPg,
    },
};

pub type MessageSvc = MessageService<MessageRepositoryPg, RoomRepositoryPg>;

#[get("/{room_id}/messages")]
pub async fn get_messages(
    message_service: web::Data<MessageSvc>,
    room_id: web::Path<Uuid>,
) -> Result<success::Success<MessageListResponse>, error::Error> {
    let messages = message_service.list(*room_id).await?;

    Ok(success::Success::ok(Some(messages)).message("Successfully retrieved messages"))
}

#[post("/{room_id}/messages")]
pub async fn send_message(
    message_service: web::Data<MessageSvc>,
    room_id: web::Path<Uuid>,
    body: web::Json<SendMessage>,
) -> Result<success::Success<MessageEntity>, error::Error> {
    let message = message_service.send(*room_id, body.into_inner()).await?;

    Ok(success::Success::created(Some(message)).message("Message sent successfully"))
}

#[post("/{room_id}/read")]
pub async fn mark_as_read(
    message_service: web::Data<MessageSvc>,
    room_id: web::Path<Uuid>,
    body: web::Json<MarkAsRead>,
) -> Result<success::Success<()>, error::Error> {
    message_service.mark_as_read(*room_id, body.reader_id).await?;

    Ok(success::Success::ok(None).message("Messages marked as read"))
}

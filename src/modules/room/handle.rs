use actix_web::{get, post, web};

use crate::{
    api::{error, success},
    modules::room::{
        model::{NewRoom, RoomListQuery, RoomListResponse},
        repository_pg::RoomRepositoryPg,
        schema::RoomEntity,
        service::RoomService,
    },
};

pub type RoomSvc = RoomService<RoomRepositoryPg>;

#[get("/")]
pub async fn list_rooms(
    room_service: web::Data<RoomSvc>,
    query: web::Query<RoomListQuery>,
) -> Result<success::Success<RoomListResponse>, error::Error> {
    let query = query.into_inner();
    let rooms = room_service.list_rooms(query.participant_id, query.role).await?;

    Ok(success::Success::ok(Some(rooms)).message("Successfully retrieved rooms"))
}

#[post("/")]
pub async fn create_room(
    room_service: web::Data<RoomSvc>,
    body: web::Json<NewRoom>,
) -> Result<success::Success<RoomEntity>, error::Error> {
    let (room, created) = room_service.create_room(body.into_inner()).await?;

    if created {
        Ok(success::Success::created(Some(room)).message("Successfully created room"))
    } else {
        Ok(success::Success::ok(Some(room)).message("Room already exists for this context"))
    }
}

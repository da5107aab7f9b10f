use actix_web::web::{scope, ServiceConfig};

use crate::modules::message::handle::*;
use crate::modules::room::handle::*;

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(
        scope("/rooms")
            .service(list_rooms)
            .service(create_room)
            .service(get_messages)
            .service(send_message)
            .service(mark_as_read),
    );
}

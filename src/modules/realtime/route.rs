use actix_web::web::{scope, ServiceConfig};

use crate::modules::realtime::handle::*;

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(scope("/events").service(publish_event));
}

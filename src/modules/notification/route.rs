use actix_web::web::{scope, ServiceConfig};

use crate::modules::notification::handle::*;

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(
        scope("/notifications")
            .service(get_notifications)
            .service(get_recent_notifications)
            .service(mark_all_notifications_read)
            .service(mark_notification_read),
    );
}

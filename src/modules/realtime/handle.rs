use actix_web::{post, web};

use crate::{
    api::{error, success},
    modules::realtime::feed::{ChangeFeed, RowEvent},
};

/// Intake for sibling subsystems (orders, bookings, CRM targets) that
/// write their own tables and announce the change here. Accepting the
/// event only means it entered the feed; delivery stays best-effort.
#[post("/")]
pub async fn publish_event(
    feed: web::Data<ChangeFeed>,
    body: web::Json<RowEvent>,
) -> Result<success::Success<()>, error::Error> {
    feed.publish(body.into_inner());

    Ok(success::Success::no_content())
}

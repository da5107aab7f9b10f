use actix::Actor;
use actix_cors::Cors;
use actix_web::{self, middleware::Logger, web, App, HttpServer};
use std::sync::{Arc, LazyLock};

use crate::{
    configs::connect_database,
    modules::{
        message::{repository_pg::MessageRepositoryPg, service::MessageService},
        notification::{
            fanout::spawn_fanout, repository_pg::NotificationRepositoryPg,
            service::NotificationService,
        },
        realtime::{
            feed::ChangeFeed,
            handler::websocket_handler,
            server::{spawn_feed_listener, RealtimeServer},
        },
        room::{repository_pg::RoomRepositoryPg, service::RoomService},
    },
};

mod api;
mod configs;
mod constants;
mod modules;
#[cfg(test)]
mod test;

pub static ENV: LazyLock<constants::Env> = LazyLock::new(|| {
    dotenvy::dotenv().ok();
    // fmt's log bridge also picks up the `log` records from the actix
    // Logger middleware and the error layer
    let _ = tracing_subscriber::fmt::try_init();
    tracing::info!("Environment variables loaded from .env file");
    constants::Env::default()
});

#[actix_web::get("/")]
async fn health_check() -> &'static str {
    "Server is running"
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let db_pool =
        connect_database().await.map_err(|_| std::io::Error::other("Database connection error"))?;

    let feed = ChangeFeed::default();

    let room_repo = Arc::new(RoomRepositoryPg::new(db_pool.clone()));
    let message_repo = Arc::new(MessageRepositoryPg::new(db_pool.clone()));
    let notification_repo = Arc::new(NotificationRepositoryPg::new(db_pool.clone()));

    let room_service = RoomService::with_dependencies(room_repo.clone(), feed.clone());
    let message_service =
        MessageService::with_dependencies(message_repo, room_repo.clone(), feed.clone());
    let notification_service =
        NotificationService::with_dependencies(notification_repo, feed.clone());

    let realtime_server = RealtimeServer::new().start();
    spawn_feed_listener(feed.clone(), realtime_server.clone());
    spawn_fanout(feed.clone(), notification_service.clone(), room_repo);

    println!("Starting server at http://{}:{}", ENV.ip.as_str(), ENV.port);
    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(ENV.frontend_url.as_str())
            .allow_any_method()
            .allow_any_header()
            .supports_credentials();

        App::new()
            .wrap(Logger::default())
            .wrap(cors)
            .app_data(web::Data::new(room_service.clone()))
            .app_data(web::Data::new(message_service.clone()))
            .app_data(web::Data::new(notification_service.clone()))
            .app_data(web::Data::new(realtime_server.clone()))
            .app_data(web::Data::new(feed.clone()))
            .app_data(web::Data::new(db_pool.clone()))
            .service(health_check)
            .route("/ws", web::get().to(websocket_handler))
            .service(
                web::scope("/api")
                    .configure(modules::room::route::configure)
                    .configure(modules::notification::route::configure)
                    .configure(modules::realtime::route::configure),
            )
    })
    .bind((ENV.ip.as_str(), ENV.port))?
    .workers(2)
    .run()
    .await
}

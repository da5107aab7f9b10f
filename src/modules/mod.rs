pub mod room {
    pub mod schema;
    pub mod model;
    pub mod repository;
    pub mod repository_pg;
    pub mod handle;
    pub mod service;
    pub mod route;
}

pub mod message {
    pub mod schema;
    pub mod model;
    pub mod repository;
    pub mod repository_pg;
    pub mod handle;
    pub mod service;
}

pub mod notification {
    pub mod schema;
    pub mod model;
    pub mod repository;
    pub mod repository_pg;
    pub mod handle;
    pub mod service;
    pub mod route;
    pub mod fanout;
}

pub mod realtime {
    pub mod feed;
    pub mod message;
    pub mod registry;
    pub mod events;
    pub mod server;
    pub mod session;
    pub mod handler;
    pub mod handle;
    pub mod route;
}

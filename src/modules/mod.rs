use actix_web::web::ServiceConfig;

pub mod friend {
    pub mod graph;
    pub mod handle;
    pub mod model;
    pub mod repository;
    pub mod repository_pg;
    pub mod route;
    pub mod schema;
    pub mod service;
}
pub mod memory_store;
pub mod user {
    pub mod schema;
    pub mod model;
    pub mod repository;
    pub mod repository_pg;
    pub mod handle;
    pub mod service;
    pub mod route;
}

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.configure(friend::route::configure).configure(user::route::configure);
}

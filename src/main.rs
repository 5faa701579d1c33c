use actix_cors::Cors;
use actix_web::{self, App, HttpServer, middleware::Logger, web};
use std::sync::{Arc, LazyLock};

use crate::modules::{
    friend::{repository::FriendRepo, repository_pg::FriendRepositoryPg, service::FriendService},
    memory_store::MemoryStore,
    user::{repository::UserRepository, repository_pg::UserRepositoryPg, service::UserService},
};

mod api;
mod configs;
mod constants;
mod modules;
mod utils;

pub static ENV: LazyLock<constants::Env> = LazyLock::new(|| {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Environment variables loaded from .env file");
    constants::Env::default()
});

#[actix_web::get("/")]
async fn health_check() -> &'static str {
    "Server is running"
}

type Repositories = (Arc<dyn UserRepository + Send + Sync>, Arc<dyn FriendRepo>);

async fn repositories() -> std::io::Result<Repositories> {
    let Some(database_url) = ENV.database_url.as_deref() else {
        log::warn!("DATABASE_URL is not set, using the in-memory store");
        let store = MemoryStore::new();
        let user_repo: Arc<dyn UserRepository + Send + Sync> = Arc::new(store.clone());
        let friend_repo: Arc<dyn FriendRepo> = Arc::new(store);
        return Ok((user_repo, friend_repo));
    };

    let db_pool = configs::connect_database(database_url).await.map_err(|e| {
        log::error!("Database connection error: {e}");
        std::io::Error::other("Database connection error")
    })?;
    configs::run_migrations(&db_pool).await.map_err(|e| {
        log::error!("Database migration error: {e}");
        std::io::Error::other("Database migration error")
    })?;

    let user_repo: Arc<dyn UserRepository + Send + Sync> =
        Arc::new(UserRepositoryPg::new(db_pool.clone()));
    let friend_repo: Arc<dyn FriendRepo> = Arc::new(FriendRepositoryPg::new(db_pool));
    Ok((user_repo, friend_repo))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let (user_repo, friend_repo) = repositories().await?;

    let user_service = UserService::with_dependencies(user_repo.clone());
    let friend_service = FriendService::with_dependencies(friend_repo, user_repo);

    log::info!("Starting server at http://{}:{}", ENV.ip.as_str(), ENV.port);
    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&ENV.frontend_url)
            .allow_any_method()
            .allow_any_header()
            .supports_credentials();

        App::new()
            .wrap(cors)
            .wrap(Logger::default())
            .app_data(utils::path_config())
            .app_data(web::Data::new(user_service.clone()))
            .app_data(web::Data::new(friend_service.clone()))
            .service(health_check)
            .service(web::scope("/api").configure(modules::configure))
    })
    .bind((ENV.ip.as_str(), ENV.port))?
    .workers(ENV.workers)
    .run()
    .await
}

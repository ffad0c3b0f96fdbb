mod config;
mod constants;
mod errors;
mod handlers;
mod middleware;
mod models;
mod openapi;
mod repositories;
mod routes;
mod services;
mod utils;
mod validators;

use std::io;
use std::sync::Arc;

use actix_web::{middleware::Logger, web, App, HttpServer};
use log::info;
use mongodb::{bson::doc, Client};

use crate::config::{Config, StorageBackend};
use crate::middleware::create_login_rate_limiter_config;
use crate::repositories::{
    CommunityRepository, InMemoryStore, MembershipRepository, MongoCommunityRepository,
    MongoMembershipRepository, MongoUserRepository, RepositoryError, UserRepository,
};
use crate::routes::RouteSettings;
use crate::services::{AuthService, CommunityService, JwtSettings, UserService};

struct Stores {
    users: Arc<dyn UserRepository>,
    communities: Arc<dyn CommunityRepository>,
    memberships: Arc<dyn MembershipRepository>,
}

async fn open_stores(config: &Config) -> Result<Stores, RepositoryError> {
    match config.storage_backend {
        StorageBackend::Memory => {
            info!("Using in-memory record store");
            let store = Arc::new(InMemoryStore::new());
            Ok(Stores {
                users: store.clone(),
                communities: store.clone(),
                memberships: store,
            })
        }
        StorageBackend::MongoDb => {
            info!("Connecting to MongoDB...");
            let client = Client::with_uri_str(&config.mongodb_uri).await?;
            let db = client.database(&config.database_name);
            db.run_command(doc! { "ping": 1 }).await?;
            info!("Connected to MongoDB successfully!");

            let users = MongoUserRepository::new(&db);
            let communities = MongoCommunityRepository::new(&db);
            let memberships = MongoMembershipRepository::new(&db);
            users.create_indexes().await?;
            communities.create_indexes().await?;
            memberships.create_indexes().await?;

            Ok(Stores {
                users: Arc::new(users),
                communities: Arc::new(communities),
                memberships: Arc::new(memberships),
            })
        }
    }
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config =
        Config::from_env().map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err))?;
    let stores = open_stores(&config).await.map_err(io::Error::other)?;

    let user_service = Arc::new(UserService::new(
        Arc::clone(&stores.users),
        Arc::clone(&stores.memberships),
        config.bcrypt_cost,
    ));
    let auth_service = AuthService::new(
        Arc::clone(&user_service),
        JwtSettings {
            secret: config.jwt_secret.clone(),
            expiration_hours: config.jwt_expiration_hours,
        },
    );
    let community_service =
        CommunityService::new(stores.users, stores.communities, stores.memberships);

    match &config.admin_seed {
        Some(seed) => {
            user_service
                .seed_admin(seed)
                .await
                .map_err(io::Error::other)?;
        }
        None => info!("Admin seeding is disabled (SEED_ADMIN=false)"),
    }

    let user_service = web::Data::from(user_service);
    let auth_service = web::Data::new(auth_service);
    let community_service = web::Data::new(community_service);

    let settings = RouteSettings {
        jwt_secret: Arc::from(config.jwt_secret.as_str()),
        login_limit: create_login_rate_limiter_config().ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "invalid login rate limit")
        })?,
    };

    let server_addr = format!("{}:{}", config.server_host, config.server_port);
    info!("Starting server at http://{}", server_addr);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(user_service.clone())
            .app_data(auth_service.clone())
            .app_data(community_service.clone())
            .configure(|cfg| routes::configure_routes(cfg, &settings))
    })
    .bind(&server_addr)?
    .run()
    .await
}

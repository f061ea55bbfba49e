use crate::application::auth_service::AuthService;
use crate::application::group_service::GroupService;
use crate::application::listing::ListingService;
use crate::application::pagination::PageSize;
use crate::application::post_service::PostService;
use crate::data::group_repository::{GroupRepository, PostgresGroupRepository};
use crate::data::post_repository::{PostRepository, PostgresPostRepository};
use crate::data::user_repository::{PostgresUserRepository, UserRepository};
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::security::JwtKeys;
use crate::presentation::handlers;
use crate::presentation::middleware::{IdentityMiddleware, RequestIdMiddleware, TimingMiddleware};
use actix_cors::Cors;
use actix_web::middleware::{DefaultHeaders, Logger};
use actix_web::{App, HttpResponse, HttpServer, Responder, web};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::info;

/// Everything the handlers pull out of app data.
#[derive(Clone)]
pub struct AppServices {
    pub auth: AuthService,
    pub posts: PostService,
    pub listing: ListingService,
    pub groups: GroupService,
}

impl AppServices {
    pub fn new(
        users: Arc<dyn UserRepository>,
        groups: Arc<dyn GroupRepository>,
        posts: Arc<dyn PostRepository>,
        keys: JwtKeys,
        page_size: PageSize,
    ) -> Self {
        Self {
            auth: AuthService::new(Arc::clone(&users), keys),
            posts: PostService::new(Arc::clone(&posts), Arc::clone(&groups)),
            listing: ListingService::new(users, Arc::clone(&groups), posts, page_size),
            groups: GroupService::new(groups),
        }
    }

    /// Wires one store that implements every repository.
    pub fn from_store<S>(store: Arc<S>, keys: JwtKeys, page_size: PageSize) -> Self
    where
        S: UserRepository + GroupRepository + PostRepository + 'static,
    {
        Self::new(store.clone(), store.clone(), store, keys, page_size)
    }

    pub fn postgres(pool: PgPool, keys: JwtKeys, page_size: PageSize) -> Self {
        Self::new(
            Arc::new(PostgresUserRepository::new(pool.clone())),
            Arc::new(PostgresGroupRepository::new(pool.clone())),
            Arc::new(PostgresPostRepository::new(pool)),
            keys,
            page_size,
        )
    }

    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(web::Data::new(self.auth.clone()))
            .app_data(web::Data::new(self.posts.clone()))
            .app_data(web::Data::new(self.listing.clone()))
            .route("/health", web::get().to(health));
        handlers::configure(cfg);
    }
}

pub async fn start_rest_server(config: AppConfig, services: AppServices) -> anyhow::Result<()> {
    let bind_address = (config.host.clone(), config.port);

    info!(
        host = %bind_address.0,
        port = bind_address.1,
        page_size = config.posts_per_page.get(),
        "HTTP server starting"
    );

    HttpServer::new(move || {
        let cors = build_cors(&config);
        let services = services.clone();

        App::new()
            .wrap(IdentityMiddleware)
            .wrap(Logger::default())
            .wrap(TimingMiddleware)
            .wrap(RequestIdMiddleware)
            .wrap(
                DefaultHeaders::new()
                    .add(("X-Content-Type-Options", "nosniff"))
                    .add(("Referrer-Policy", "same-origin"))
                    .add(("Permissions-Policy", "geolocation=()"))
                    .add(("Cross-Origin-Opener-Policy", "same-origin")),
            )
            .wrap(cors)
            .configure(move |cfg| services.configure(cfg))
    })
    .bind(bind_address)?
    .run()
    .await
    .map_err(anyhow::Error::new)?;

    Ok(())
}

fn build_cors(config: &AppConfig) -> Cors {
    let mut cors = Cors::default()
        .allowed_methods(vec!["GET", "POST"])
        .allowed_headers(vec![
            actix_web::http::header::CONTENT_TYPE,
            actix_web::http::header::AUTHORIZATION,
        ])
        .supports_credentials()
        .max_age(3600);

    for origin in &config.cors_origins {
        if origin == "*" {
            cors = cors.allow_any_origin();
        } else {
            cors = cors.allowed_origin(origin);
        }
    }

    cors
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
}

async fn health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok",
        timestamp: Utc::now(),
    })
}

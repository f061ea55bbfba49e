#![allow(dead_code)]

use std::sync::Arc;

use actix_web::dev::ServiceResponse;
use yatube::application::auth_service::Registration;
use yatube::application::group_service::NewGroup;
use yatube::application::pagination::PageSize;
use yatube::application::post_service::PostForm;
use yatube::data::memory::MemoryStore;
use yatube::domain::{group::Group, post::Post, user::User};
use yatube::infrastructure::security::JwtKeys;
use yatube::server::AppServices;

/// Builds the application under test around a `TestSite`.
macro_rules! init_app {
    ($site:expr) => {{
        let services = $site.services.clone();
        actix_web::test::init_service(
            actix_web::App::new()
                .wrap(yatube::presentation::middleware::IdentityMiddleware)
                .configure(move |cfg| services.configure(cfg)),
        )
        .await
    }};
}

pub const PAGE_SIZE: usize = 10;
pub const PASSWORD: &str = "correct-horse";

pub struct TestSite {
    pub services: AppServices,
    pub store: Arc<MemoryStore>,
}

impl TestSite {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let services = AppServices::from_store(
            store.clone(),
            JwtKeys::new("integration-secret-integration-secret".into()),
            PageSize::new(PAGE_SIZE).expect("non-zero"),
        );
        Self { services, store }
    }

    pub async fn user(&self, username: &str) -> User {
        self.services
            .auth
            .register(Registration {
                username: username.into(),
                email: format!("{username}@example.com"),
                password: PASSWORD.into(),
            })
            .await
            .expect("user registered")
    }

    pub async fn token(&self, username: &str) -> String {
        let (_, token) = self
            .services
            .auth
            .login(username, PASSWORD)
            .await
            .expect("login");
        token
    }

    pub async fn group(&self, slug: &str) -> Group {
        self.services
            .groups
            .create_group(NewGroup {
                slug: slug.into(),
                title: slug.to_uppercase(),
                description: format!("{slug} description"),
            })
            .await
            .expect("group created")
    }

    pub async fn post(&self, author: &User, text: &str, group: Option<&Group>) -> Post {
        self.services
            .posts
            .create_post(
                author.id,
                PostForm {
                    text: text.into(),
                    group: group.map(|g| g.id.to_string()),
                    image: None,
                },
            )
            .await
            .expect("post created")
    }
}

pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {token}"))
}

pub fn location<B>(res: &ServiceResponse<B>) -> String {
    res.headers()
        .get(actix_web::http::header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

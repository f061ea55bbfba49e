use actix_web::cookie::{Cookie, SameSite, time::Duration};
use actix_web::dev::Payload;
use actix_web::http::header;
use actix_web::{Error, FromRequest, HttpMessage, HttpRequest, HttpResponse, error::ErrorUnauthorized};
use futures_util::future::{Ready, ready};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use uuid::Uuid;

use crate::domain::user::User;
use crate::infrastructure::security::TOKEN_TTL_SECONDS;

pub const LOGIN_URL: &str = "/auth/login/";
pub const ACCESS_COOKIE: &str = "access_token";

/// Identity attached to a request by `IdentityMiddleware`.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub id: Uuid,
    pub username: String,
}

impl From<User> for AuthenticatedUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
        }
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        match req.extensions().get::<AuthenticatedUser>() {
            Some(user) => ready(Ok(user.clone())),
            None => ready(Err(ErrorUnauthorized("missing authenticated user"))),
        }
    }
}

pub fn redirect(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location))
        .finish()
}

/// Sends an anonymous visitor to the login page, remembering where they were going.
pub fn login_redirect(req: &HttpRequest) -> HttpResponse {
    let target = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| req.path());
    redirect(&format!("{}?next={}", LOGIN_URL, encode_next(target)))
}

/// Characters escaped in a `next` value. `/` stays readable.
const NEXT_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b'/');

pub fn encode_next(target: &str) -> String {
    utf8_percent_encode(target, NEXT_SET).to_string()
}

/// Only local paths are followed after login; anything else goes home.
pub fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(target)
            if target.starts_with('/') && !target.starts_with("//") && !target.contains('\\') =>
        {
            target
        }
        _ => "/",
    }
}

pub fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build(ACCESS_COOKIE, token)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(Duration::seconds(TOKEN_TTL_SECONDS))
        .finish()
}

pub fn expired_session_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::build(ACCESS_COOKIE, "").path("/").finish();
    cookie.make_removal();
    cookie
}

pub fn request_id(req: &HttpRequest) -> String {
    req.extensions()
        .get::<crate::presentation::middleware::RequestId>()
        .map(|rid| rid.0.clone())
        .unwrap_or_else(|| "unknown".into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn login_redirect_keeps_path() {
        let req = TestRequest::get().uri("/create/").to_http_request();
        let response = login_redirect(&req);
        assert_eq!(response.status(), actix_web::http::StatusCode::FOUND);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/auth/login/?next=/create/"
        );
    }

    #[test]
    fn next_query_characters_are_escaped() {
        assert_eq!(encode_next("/?page=2&x=1"), "/%3Fpage%3D2%26x%3D1");
        assert_eq!(encode_next("/profile/l.e-o_~/"), "/profile/l.e-o_~/");
        assert_eq!(encode_next("/group/кот/"), "/group/%D0%BA%D0%BE%D1%82/");
    }

    #[test]
    fn only_local_targets_are_followed() {
        assert_eq!(safe_next(Some("/posts/1/")), "/posts/1/");
        assert_eq!(safe_next(Some("//evil.example")), "/");
        assert_eq!(safe_next(Some("https://evil.example")), "/");
        assert_eq!(safe_next(Some("/\\evil.example")), "/");
        assert_eq!(safe_next(None), "/");
    }
}

use crate::application::auth_service::{AuthService, Registration};
use crate::domain::error::DomainError;
use crate::infrastructure::security::TOKEN_TTL_SECONDS;
use crate::presentation::dto::{AuthResponse, LoginPageResponse, LoginRequest, NextQuery};
use crate::presentation::utils::{expired_session_cookie, redirect, safe_next, session_cookie};
use actix_web::{HttpResponse, Responder, Scope, get, post, route, web};
use serde::Deserialize;
use tracing::info;

pub fn scope() -> Scope {
    web::scope("/auth")
        .service(login_page)
        .service(login)
        .service(signup)
        .service(logout)
        .service(token)
}

#[derive(Debug, Deserialize)]
struct SignupForm {
    #[serde(flatten)]
    registration: Registration,
    #[serde(default)]
    next: Option<String>,
}

#[get("/login/")]
async fn login_page(query: web::Query<NextQuery>) -> impl Responder {
    HttpResponse::Ok().json(LoginPageResponse {
        next: query.into_inner().next,
    })
}

#[post("/login/")]
async fn login(
    service: web::Data<AuthService>,
    form: web::Form<LoginRequest>,
) -> Result<HttpResponse, DomainError> {
    let form = form.into_inner();
    let (user, jwt) = service.login(&form.username, &form.password).await?;

    info!(username = %user.username, "user logged in");

    let mut response = redirect(safe_next(form.next.as_deref()));
    response
        .add_cookie(&session_cookie(jwt))
        .map_err(|err| DomainError::Internal(err.to_string()))?;
    Ok(response)
}

#[post("/signup/")]
async fn signup(
    service: web::Data<AuthService>,
    form: web::Form<SignupForm>,
) -> Result<HttpResponse, DomainError> {
    let SignupForm { registration, next } = form.into_inner();
    let password = registration.password.clone();
    let user = service.register(registration).await?;

    info!(user_id = %user.id, username = %user.username, "user registered");

    let (_, jwt) = service.login(&user.username, &password).await?;
    let mut response = redirect(safe_next(next.as_deref()));
    response
        .add_cookie(&session_cookie(jwt))
        .map_err(|err| DomainError::Internal(err.to_string()))?;
    Ok(response)
}

#[route("/logout/", method = "GET", method = "POST")]
async fn logout() -> Result<HttpResponse, DomainError> {
    let mut response = redirect("/");
    response
        .add_cookie(&expired_session_cookie())
        .map_err(|err| DomainError::Internal(err.to_string()))?;
    Ok(response)
}

#[post("/token/")]
async fn token(
    service: web::Data<AuthService>,
    payload: web::Json<LoginRequest>,
) -> Result<HttpResponse, DomainError> {
    let (user, jwt) = service.login(&payload.username, &payload.password).await?;

    info!(username = %user.username, "token issued");

    Ok(HttpResponse::Ok().json(AuthResponse {
        access_token: jwt,
        expires_in: TOKEN_TTL_SECONDS,
        token_type: "Bearer".to_string(),
    }))
}

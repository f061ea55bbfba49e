use crate::application::auth_service::AuthService;
use crate::application::ownership::{can_edit, ensure_owner};
use crate::application::post_service::{PostForm, PostService};
use crate::domain::error::DomainError;
use crate::presentation::dto::{AuthorResponse, PostDetailResponse, PostFormResponse};
use crate::presentation::utils::{AuthenticatedUser, login_redirect, redirect, request_id};
use actix_web::{HttpRequest, HttpResponse, get, post, web};
use tracing::{debug, warn};
use uuid::Uuid;
use validator::ValidationErrors;

fn detail_url(post_id: Uuid) -> String {
    format!("/posts/{}/", post_id)
}

/// The body is read only after login and ownership are settled; an unreadable
/// body counts as an empty submission.
fn submitted_form(form: Option<web::Form<PostForm>>) -> PostForm {
    form.map(web::Form::into_inner).unwrap_or_default()
}

async fn render_form(
    posts: &PostService,
    form: PostForm,
    post_id: Option<Uuid>,
    errors: Option<ValidationErrors>,
) -> Result<HttpResponse, DomainError> {
    let groups = posts.groups().await?;
    Ok(HttpResponse::Ok().json(PostFormResponse {
        form,
        groups,
        is_edit: post_id.is_some(),
        post_id,
        errors,
    }))
}

#[get("/posts/{id}/")]
async fn post_detail(
    user: Option<AuthenticatedUser>,
    posts: web::Data<PostService>,
    auth: web::Data<AuthService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, DomainError> {
    let post = posts.get_post(path.into_inner()).await?;
    let author = auth.get_user(post.author_id).await?;
    let group = match post.group_id {
        Some(group_id) => posts.find_group(group_id).await?,
        None => None,
    };
    let can_edit = user.is_some_and(|user| can_edit(user.id, &post));

    Ok(HttpResponse::Ok().json(PostDetailResponse {
        post,
        author: AuthorResponse::from(author),
        group,
        can_edit,
    }))
}

#[get("/create/")]
async fn post_create_form(
    req: HttpRequest,
    user: Option<AuthenticatedUser>,
    posts: web::Data<PostService>,
) -> Result<HttpResponse, DomainError> {
    if user.is_none() {
        return Ok(login_redirect(&req));
    }
    render_form(&posts, PostForm::default(), None, None).await
}

#[post("/create/")]
async fn post_create(
    req: HttpRequest,
    user: Option<AuthenticatedUser>,
    posts: web::Data<PostService>,
    form: Option<web::Form<PostForm>>,
) -> Result<HttpResponse, DomainError> {
    let Some(user) = user else {
        return Ok(login_redirect(&req));
    };

    let submitted = submitted_form(form);
    match posts.create_post(user.id, submitted.clone()).await {
        Ok(post) => {
            debug!(
                request_id = %request_id(&req),
                post_id = %post.id,
                "redirecting to author profile"
            );
            Ok(redirect(&format!("/profile/{}/", user.username)))
        }
        Err(DomainError::Validation(errors)) => {
            render_form(&posts, submitted, None, Some(errors)).await
        }
        Err(err) => Err(err),
    }
}

#[get("/posts/{id}/edit/")]
async fn post_edit_form(
    req: HttpRequest,
    user: Option<AuthenticatedUser>,
    posts: web::Data<PostService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, DomainError> {
    let Some(user) = user else {
        return Ok(login_redirect(&req));
    };

    let post = posts.get_post(path.into_inner()).await?;
    if ensure_owner(user.id, &post).is_err() {
        return Ok(redirect(&detail_url(post.id)));
    }

    render_form(&posts, PostForm::from_post(&post), Some(post.id), None).await
}

#[post("/posts/{id}/edit/")]
async fn post_edit(
    req: HttpRequest,
    user: Option<AuthenticatedUser>,
    posts: web::Data<PostService>,
    path: web::Path<Uuid>,
    form: Option<web::Form<PostForm>>,
) -> Result<HttpResponse, DomainError> {
    let Some(user) = user else {
        return Ok(login_redirect(&req));
    };

    let post = posts.get_post(path.into_inner()).await?;
    let post_id = post.id;
    if ensure_owner(user.id, &post).is_err() {
        warn!(
            request_id = %request_id(&req),
            username = %user.username,
            post_id = %post_id,
            "edit attempt by non-author"
        );
        return Ok(redirect(&detail_url(post_id)));
    }

    let submitted = submitted_form(form);
    match posts.update_post(post, submitted.clone()).await {
        Ok(updated) => Ok(redirect(&detail_url(updated.id))),
        Err(DomainError::Validation(errors)) => {
            render_form(&posts, submitted, Some(post_id), Some(errors)).await
        }
        Err(err) => Err(err),
    }
}

use crate::application::pagination::Page;
use crate::application::post_service::PostForm;
use crate::domain::{group::Group, post::Post, user::User};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::ValidationErrors;

// ======================= AUTH =======================

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub next: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NextQuery {
    #[serde(default)]
    pub next: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginPageResponse {
    pub next: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub expires_in: i64,
    #[serde(rename = "token_type")]
    pub token_type: String, // "Bearer"
}

// ======================= POSTS =======================

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    /// Kept raw so that a non-numeric value falls back to page one instead of a 400.
    #[serde(default)]
    pub page: Option<String>,
}

/// Public view of a user; email and password hash stay private.
#[derive(Debug, Clone, Serialize)]
pub struct AuthorResponse {
    pub id: Uuid,
    pub username: String,
}

impl From<User> for AuthorResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ListingResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<Group>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<AuthorResponse>,
    pub page_obj: Page<Post>,
}

#[derive(Debug, Serialize)]
pub struct PostDetailResponse {
    pub post: Post,
    pub author: AuthorResponse,
    pub group: Option<Group>,
    pub can_edit: bool,
}

#[derive(Debug, Serialize)]
pub struct PostFormResponse {
    pub form: PostForm,
    pub groups: Vec<Group>,
    pub is_edit: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<ValidationErrors>,
}

use std::borrow::Cow;
use std::path::{Component, Path};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::instrument;
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::data::group_repository::GroupRepository;
use crate::data::post_repository::PostRepository;
use crate::domain::{error::DomainError, group::Group, post::Post};

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "bmp"];

fn not_blank(text: &str) -> Result<(), ValidationError> {
    if text.trim().is_empty() {
        let mut error = ValidationError::new("required");
        error.message = Some(Cow::from("This field is required."));
        return Err(error);
    }
    Ok(())
}

fn image_path(path: &str) -> Result<(), ValidationError> {
    let candidate = Path::new(path);
    let relative = candidate
        .components()
        .all(|component| matches!(component, Component::Normal(_)));
    let is_image = candidate
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false);

    if !relative || !is_image {
        let mut error = ValidationError::new("invalid_image");
        error.message = Some(Cow::from("Upload a valid image."));
        return Err(error);
    }
    Ok(())
}

/// Submitted post fields. Empty strings are treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct PostForm {
    #[serde(default)]
    #[validate(custom(function = "not_blank"))]
    pub text: String,
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

impl PostForm {
    pub fn from_post(post: &Post) -> Self {
        Self {
            text: post.text.clone(),
            group: post.group_id.map(|id| id.to_string()),
            image: post.image.clone(),
        }
    }

    fn normalized(mut self) -> Self {
        fn blank_to_none(value: Option<String>) -> Option<String> {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        }
        self.group = blank_to_none(self.group);
        self.image = blank_to_none(self.image);
        self
    }
}

/// Field values that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedPost {
    pub text: String,
    pub group_id: Option<Uuid>,
    pub image: Option<String>,
}

#[derive(Clone)]
pub struct PostService {
    posts: Arc<dyn PostRepository>,
    groups: Arc<dyn GroupRepository>,
}

impl PostService {
    pub fn new(posts: Arc<dyn PostRepository>, groups: Arc<dyn GroupRepository>) -> Self {
        Self { posts, groups }
    }

    pub async fn get_post(&self, id: Uuid) -> Result<Post, DomainError> {
        self.posts
            .find_by_id(id)
            .await?
            .ok_or(DomainError::PostNotFound(id))
    }

    /// Choices offered by the post form.
    pub async fn groups(&self) -> Result<Vec<Group>, DomainError> {
        self.groups.list_all().await
    }

    pub async fn find_group(&self, id: Uuid) -> Result<Option<Group>, DomainError> {
        self.groups.find_by_id(id).await
    }

    /// Checks every field and reports all failures together.
    pub async fn validate(&self, form: PostForm) -> Result<ValidatedPost, DomainError> {
        let form = form.normalized();
        let mut errors = match form.validate() {
            Ok(()) => ValidationErrors::new(),
            Err(errors) => errors,
        };

        if let Some(image) = form.image.as_deref() {
            if let Err(error) = image_path(image) {
                errors.add("image", error);
            }
        }

        let group_id = match form.group.as_deref() {
            None => None,
            Some(raw) => match self.resolve_group(raw).await? {
                Some(id) => Some(id),
                None => {
                    let mut error = ValidationError::new("invalid_choice");
                    error.message = Some(Cow::from("Select a valid group."));
                    error.add_param(Cow::from("value"), &raw);
                    errors.add("group", error);
                    None
                }
            },
        };

        if !errors.is_empty() {
            return Err(DomainError::Validation(errors));
        }

        Ok(ValidatedPost {
            text: form.text.trim().to_string(),
            group_id,
            image: form.image,
        })
    }

    async fn resolve_group(&self, raw: &str) -> Result<Option<Uuid>, DomainError> {
        let Ok(id) = Uuid::parse_str(raw) else {
            return Ok(None);
        };
        Ok(self.groups.find_by_id(id).await?.map(|group| group.id))
    }

    #[instrument(skip(self, form))]
    pub async fn create_post(&self, author_id: Uuid, form: PostForm) -> Result<Post, DomainError> {
        let valid = self.validate(form).await?;
        let post = Post::new(author_id, valid.text, valid.group_id, valid.image);
        self.posts.create(post).await
    }

    /// Applies an edit. The author never changes; an absent image keeps the
    /// stored one.
    #[instrument(skip(self, post, form), fields(post_id = %post.id))]
    pub async fn update_post(&self, post: Post, form: PostForm) -> Result<Post, DomainError> {
        let valid = self.validate(form).await?;
        let post_id = post.id;
        let changed = Post {
            text: valid.text,
            group_id: valid.group_id,
            image: valid.image.or(post.image.clone()),
            ..post
        };

        self.posts
            .update(changed)
            .await?
            .ok_or(DomainError::PostNotFound(post_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::memory::MemoryStore;
    use crate::data::user_repository::UserRepository;
    use crate::domain::user::User;

    struct Fixture {
        service: PostService,
        store: Arc<MemoryStore>,
        author: User,
        group: Group,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let author = UserRepository::create(
            store.as_ref(),
            User::new("leo".into(), "leo@example.com".into(), "hash".into()),
        )
        .await
        .expect("user stored");
        let group = GroupRepository::create(
            store.as_ref(),
            Group::new("group1".into(), "Group1".into(), "Group1".into()),
        )
        .await
        .expect("group stored");
        let service = PostService::new(store.clone(), store.clone());
        Fixture {
            service,
            store,
            author,
            group,
        }
    }

    fn form(text: &str, group: Option<&Group>, image: Option<&str>) -> PostForm {
        PostForm {
            text: text.into(),
            group: group.map(|g| g.id.to_string()),
            image: image.map(str::to_string),
        }
    }

    fn field_codes(err: DomainError, field: &str) -> Vec<String> {
        let DomainError::Validation(errors) = err else {
            panic!("expected validation error, got {err:?}");
        };
        errors
            .field_errors()
            .into_iter()
            .filter(|(name, _)| name.to_string() == field)
            .flat_map(|(_, errs)| errs.iter().map(|e| e.code.to_string()).collect::<Vec<_>>())
            .collect()
    }

    #[tokio::test]
    async fn create_assigns_author_and_group() {
        let fx = fixture().await;
        let post = fx
            .service
            .create_post(fx.author.id, form("  Новый пост ", Some(&fx.group), None))
            .await
            .expect("created");

        assert_eq!(post.author_id, fx.author.id);
        assert_eq!(post.group_id, Some(fx.group.id));
        assert_eq!(post.text, "Новый пост");
        assert_eq!(fx.service.get_post(post.id).await.unwrap(), post);
    }

    #[tokio::test]
    async fn blank_text_fails_and_persists_nothing() {
        let fx = fixture().await;
        let err = fx
            .service
            .create_post(fx.author.id, form("   ", None, None))
            .await
            .unwrap_err();

        assert_eq!(field_codes(err, "text"), vec!["required"]);
        assert_eq!(
            PostRepository::count(fx.store.as_ref(), crate::domain::post::PostFilter::All)
                .await
                .unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn unknown_group_is_a_field_error() {
        let fx = fixture().await;
        let mut bad = form("text", None, None);
        bad.group = Some(Uuid::new_v4().to_string());
        let err = fx.service.create_post(fx.author.id, bad).await.unwrap_err();
        assert_eq!(field_codes(err, "group"), vec!["invalid_choice"]);

        let mut garbage = form("text", None, None);
        garbage.group = Some("not-an-id".into());
        let err = fx.service.create_post(fx.author.id, garbage).await.unwrap_err();
        assert_eq!(field_codes(err, "group"), vec!["invalid_choice"]);
    }

    #[tokio::test]
    async fn empty_group_and_image_count_as_absent() {
        let fx = fixture().await;
        let post = fx
            .service
            .create_post(
                fx.author.id,
                PostForm {
                    text: "text".into(),
                    group: Some(String::new()),
                    image: Some("  ".into()),
                },
            )
            .await
            .expect("created");
        assert_eq!(post.group_id, None);
        assert_eq!(post.image, None);
    }

    #[tokio::test]
    async fn image_must_be_relative_image_file() {
        let fx = fixture().await;
        for path in ["../secret.png", "/etc/passwd.jpg", "posts/notes.txt", "posts/noext"] {
            let err = fx
                .service
                .create_post(fx.author.id, form("text", None, Some(path)))
                .await
                .unwrap_err();
            assert_eq!(field_codes(err, "image"), vec!["invalid_image"], "{path}");
        }

        let post = fx
            .service
            .create_post(fx.author.id, form("text", None, Some("posts/cat.PNG")))
            .await
            .expect("created");
        assert_eq!(post.image.as_deref(), Some("posts/cat.PNG"));
    }

    #[tokio::test]
    async fn update_keeps_id_author_and_prior_image() {
        let fx = fixture().await;
        let post = fx
            .service
            .create_post(fx.author.id, form("Просто пост", None, Some("posts/a.jpg")))
            .await
            .expect("created");

        let updated = fx
            .service
            .update_post(post.clone(), form("Изменённый текст", Some(&fx.group), None))
            .await
            .expect("updated");

        assert_eq!(updated.id, post.id);
        assert_eq!(updated.author_id, fx.author.id);
        assert_eq!(updated.created_at, post.created_at);
        assert_eq!(updated.text, "Изменённый текст");
        assert_eq!(updated.group_id, Some(fx.group.id));
        assert_eq!(updated.image.as_deref(), Some("posts/a.jpg"));

        let fetched = fx.service.get_post(post.id).await.expect("fetched");
        assert_eq!(fetched.text, "Изменённый текст");
    }

    #[tokio::test]
    async fn update_replaces_image_and_clears_group() {
        let fx = fixture().await;
        let post = fx
            .service
            .create_post(fx.author.id, form("text", Some(&fx.group), Some("posts/a.jpg")))
            .await
            .expect("created");

        let updated = fx
            .service
            .update_post(post, form("text", None, Some("posts/b.gif")))
            .await
            .expect("updated");

        assert_eq!(updated.image.as_deref(), Some("posts/b.gif"));
        assert_eq!(updated.group_id, None);
    }

    #[tokio::test]
    async fn invalid_update_leaves_post_untouched() {
        let fx = fixture().await;
        let post = fx
            .service
            .create_post(fx.author.id, form("original", None, None))
            .await
            .expect("created");

        let err = fx
            .service
            .update_post(post.clone(), form("", None, None))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(fx.service.get_post(post.id).await.unwrap().text, "original");
    }

    #[tokio::test]
    async fn missing_post_is_not_found() {
        let fx = fixture().await;
        let id = Uuid::new_v4();
        let err = fx.service.get_post(id).await.unwrap_err();
        assert!(matches!(err, DomainError::PostNotFound(missing) if missing == id));
    }
}

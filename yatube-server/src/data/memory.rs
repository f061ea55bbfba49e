//! Process-local store used by `serve --in-memory` and by the HTTP tests.
//!
//! Posts are kept in insertion order so that posts sharing a timestamp still
//! list newest-first deterministically.

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use crate::data::group_repository::GroupRepository;
use crate::data::post_repository::PostRepository;
use crate::data::user_repository::UserRepository;
use crate::domain::error::DomainError;
use crate::domain::group::Group;
use crate::domain::post::{Post, PostFilter, PostOrder, PostQuery};
use crate::domain::user::User;

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    groups: Vec<Group>,
    posts: Vec<Post>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create(&self, user: User) -> Result<User, DomainError> {
        let mut tables = self.tables.write().await;
        if tables.users.iter().any(|u| u.username == user.username) {
            return Err(DomainError::UserAlreadyExists(user.username));
        }
        tables.users.push(user.clone());
        info!(user_id = %user.id, username = %user.username, "user created");
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.username == username).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }
}

#[async_trait]
impl GroupRepository for MemoryStore {
    async fn create(&self, group: Group) -> Result<Group, DomainError> {
        let mut tables = self.tables.write().await;
        if tables.groups.iter().any(|g| g.slug == group.slug) {
            return Err(DomainError::GroupAlreadyExists(group.slug));
        }
        tables.groups.push(group.clone());
        info!(group_id = %group.id, slug = %group.slug, "group created");
        Ok(group)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Group>, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables.groups.iter().find(|g| g.slug == slug).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Group>, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables.groups.iter().find(|g| g.id == id).cloned())
    }

    async fn list_all(&self) -> Result<Vec<Group>, DomainError> {
        let tables = self.tables.read().await;
        let mut groups = tables.groups.clone();
        groups.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(groups)
    }
}

#[async_trait]
impl PostRepository for MemoryStore {
    async fn create(&self, post: Post) -> Result<Post, DomainError> {
        let mut tables = self.tables.write().await;
        if !tables.users.iter().any(|u| u.id == post.author_id) {
            return Err(DomainError::UserNotFound(post.author_id.to_string()));
        }
        tables.posts.push(post.clone());
        info!(post_id = %post.id, author_id = %post.author_id, "post created");
        Ok(post)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables.posts.iter().find(|p| p.id == id).cloned())
    }

    async fn update(&self, post: Post) -> Result<Option<Post>, DomainError> {
        let mut tables = self.tables.write().await;
        let Some(stored) = tables.posts.iter_mut().find(|p| p.id == post.id) else {
            return Ok(None);
        };
        stored.text = post.text;
        stored.group_id = post.group_id;
        stored.image = post.image;
        info!(post_id = %stored.id, "post updated");
        Ok(Some(stored.clone()))
    }

    async fn count(&self, filter: PostFilter) -> Result<usize, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables.posts.iter().filter(|p| filter.matches(p)).count())
    }

    async fn list(&self, query: PostQuery) -> Result<Vec<Post>, DomainError> {
        let tables = self.tables.read().await;
        let mut posts: Vec<Post> = tables
            .posts
            .iter()
            .rev()
            .filter(|p| query.filter.matches(p))
            .cloned()
            .collect();
        match query.order {
            // stable sort keeps later insertions first among equal timestamps
            PostOrder::NewestFirst => posts.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        }
        Ok(posts
            .into_iter()
            .skip(query.offset)
            .take(query.limit)
            .collect())
    }
}

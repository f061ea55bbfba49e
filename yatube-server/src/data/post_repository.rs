use crate::domain::error::DomainError;
use crate::domain::post::{Post, PostFilter, PostOrder, PostQuery};
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::{error, info};
use uuid::Uuid;

#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn create(&self, post: Post) -> Result<Post, DomainError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, DomainError>;
    /// Writes the mutable fields (text, group, image). Author and timestamp stay as stored.
    async fn update(&self, post: Post) -> Result<Option<Post>, DomainError>;
    async fn count(&self, filter: PostFilter) -> Result<usize, DomainError>;
    async fn list(&self, query: PostQuery) -> Result<Vec<Post>, DomainError>;
}

#[derive(Clone)]
pub struct PostgresPostRepository {
    pool: PgPool,
}

impl PostgresPostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: PostFilter) {
    match filter {
        PostFilter::All => {}
        PostFilter::Group(group_id) => {
            builder.push(" WHERE group_id = ").push_bind(group_id);
        }
        PostFilter::Author(author_id) => {
            builder.push(" WHERE author_id = ").push_bind(author_id);
        }
    }
}

fn push_order(builder: &mut QueryBuilder<'_, Postgres>, order: PostOrder) {
    match order {
        PostOrder::NewestFirst => {
            builder.push(" ORDER BY created_at DESC, id DESC");
        }
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn create(&self, post: Post) -> Result<Post, DomainError> {
        sqlx::query(
            r#"
            INSERT INTO posts (id, text, created_at, image, author_id, group_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(post.id)
        .bind(&post.text)
        .bind(post.created_at)
        .bind(&post.image)
        .bind(post.author_id)
        .bind(post.group_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!("failed to create post: {}", e);
            DomainError::Internal(format!("database error: {}", e))
        })?;

        info!(post_id = %post.id, author_id = %post.author_id, "post created");
        Ok(post)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, DomainError> {
        sqlx::query_as::<_, Post>(
            r#"
            SELECT id, text, created_at, image, author_id, group_id
            FROM posts WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("db error find_by_id {}: {}", id, e);
            DomainError::Internal(e.to_string())
        })
    }

    async fn update(&self, post: Post) -> Result<Option<Post>, DomainError> {
        let updated = sqlx::query_as::<_, Post>(
            r#"
            UPDATE posts
            SET
                text = $1,
                group_id = $2,
                image = $3
            WHERE id = $4
            RETURNING id, text, created_at, image, author_id, group_id
            "#,
        )
        .bind(&post.text)
        .bind(post.group_id)
        .bind(&post.image)
        .bind(post.id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("failed to update post {}: {}", post.id, e);
            DomainError::Internal(e.to_string())
        })?;

        if updated.is_some() {
            info!(post_id = %post.id, "post updated");
        }

        Ok(updated)
    }

    async fn count(&self, filter: PostFilter) -> Result<usize, DomainError> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM posts");
        push_filter(&mut builder, filter);

        let total: i64 = builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!("db error while counting posts: {}", e);
                DomainError::Internal(e.to_string())
            })?;

        Ok(total.max(0) as usize)
    }

    async fn list(&self, query: PostQuery) -> Result<Vec<Post>, DomainError> {
        let mut builder = QueryBuilder::<Postgres>::new(
            "SELECT id, text, created_at, image, author_id, group_id FROM posts",
        );
        push_filter(&mut builder, query.filter);
        push_order(&mut builder, query.order);
        builder
            .push(" LIMIT ")
            .push_bind(query.limit as i64)
            .push(" OFFSET ")
            .push_bind(query.offset as i64);

        builder
            .build_query_as::<Post>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!("db error while fetching posts: {}", e);
                DomainError::Internal(e.to_string())
            })
    }
}

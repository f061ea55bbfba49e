use std::sync::Arc;

use tracing::{debug, instrument};

use crate::application::pagination::{Page, PageNumber, PageSize, PageWindow};
use crate::data::group_repository::GroupRepository;
use crate::data::post_repository::PostRepository;
use crate::data::user_repository::UserRepository;
use crate::domain::error::DomainError;
use crate::domain::group::Group;
use crate::domain::post::{Post, PostFilter, PostOrder, PostQuery};
use crate::domain::user::User;

/// Which posts a listing page shows, named the way routes name them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingScope {
    AllPosts,
    PostsInGroup(String),
    PostsByAuthor(String),
}

/// The record a scoped listing was resolved against.
#[derive(Debug, Clone)]
pub enum ListingContext {
    All,
    Group(Group),
    Author(User),
}

#[derive(Debug, Clone)]
pub struct Listing {
    pub context: ListingContext,
    pub page: Page<Post>,
}

pub fn build_query(filter: PostFilter, window: PageWindow) -> PostQuery {
    PostQuery {
        filter,
        order: PostOrder::NewestFirst,
        offset: window.offset(),
        limit: window.limit(),
    }
}

#[derive(Clone)]
pub struct ListingService {
    users: Arc<dyn UserRepository>,
    groups: Arc<dyn GroupRepository>,
    posts: Arc<dyn PostRepository>,
    page_size: PageSize,
}

impl ListingService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        groups: Arc<dyn GroupRepository>,
        posts: Arc<dyn PostRepository>,
        page_size: PageSize,
    ) -> Self {
        Self {
            users,
            groups,
            posts,
            page_size,
        }
    }

    pub fn page_size(&self) -> PageSize {
        self.page_size
    }

    pub async fn resolve(
        &self,
        scope: &ListingScope,
    ) -> Result<(ListingContext, PostFilter), DomainError> {
        match scope {
            ListingScope::AllPosts => Ok((ListingContext::All, PostFilter::All)),
            ListingScope::PostsInGroup(slug) => {
                let group = self
                    .groups
                    .find_by_slug(slug)
                    .await?
                    .ok_or_else(|| DomainError::GroupNotFound(slug.clone()))?;
                let filter = PostFilter::Group(group.id);
                Ok((ListingContext::Group(group), filter))
            }
            ListingScope::PostsByAuthor(username) => {
                let author = self
                    .users
                    .find_by_username(username)
                    .await?
                    .ok_or_else(|| DomainError::UserNotFound(username.clone()))?;
                let filter = PostFilter::Author(author.id);
                Ok((ListingContext::Author(author), filter))
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        scope: ListingScope,
        number: PageNumber,
    ) -> Result<Listing, DomainError> {
        let (context, filter) = self.resolve(&scope).await?;
        let window = PageWindow::new(self.page_size, number);

        let total = self.posts.count(filter).await?;
        let items = if window.offset() < total {
            self.posts.list(build_query(filter, window)).await?
        } else {
            Vec::new()
        };

        debug!(total, returned = items.len(), "listing resolved");

        Ok(Listing {
            context,
            page: Page::from_window(items, total, window),
        })
    }
}

use std::borrow::Cow;
use std::sync::Arc;

use serde::Deserialize;
use tracing::instrument;
use validator::{Validate, ValidationError};

use crate::data::group_repository::GroupRepository;
use crate::domain::{error::DomainError, group::Group};

fn slug_chars(slug: &str) -> Result<(), ValidationError> {
    let valid = slug
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_');
    if !valid {
        let mut error = ValidationError::new("invalid_slug");
        error.message = Some(Cow::from(
            "Use lowercase letters, digits, hyphens or underscores.",
        ));
        return Err(error);
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewGroup {
    #[validate(length(min = 1, max = 50), custom(function = "slug_chars"))]
    pub slug: String,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Clone)]
pub struct GroupService {
    repo: Arc<dyn GroupRepository>,
}

impl GroupService {
    pub fn new(repo: Arc<dyn GroupRepository>) -> Self {
        Self { repo }
    }

    #[instrument(skip(self))]
    pub async fn create_group(&self, input: NewGroup) -> Result<Group, DomainError> {
        input.validate()?;
        let group = Group::new(
            input.slug,
            input.title.trim().to_string(),
            input.description.trim().to_string(),
        );
        self.repo.create(group).await
    }
}

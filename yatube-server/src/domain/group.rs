use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A named category posts may belong to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Group {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub description: String,
}

impl Group {
    pub fn new(slug: String, title: String, description: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            slug,
            title,
            description,
        }
    }
}

use uuid::Uuid;

use crate::domain::error::DomainError;
use crate::domain::post::Post;

/// True iff the requesting identity authored the post. There is no override.
pub fn can_edit(identity: Uuid, post: &Post) -> bool {
    identity == post.author_id
}

pub fn ensure_owner(identity: Uuid, post: &Post) -> Result<(), DomainError> {
    if can_edit(identity, post) {
        Ok(())
    } else {
        Err(DomainError::Forbidden)
    }
}

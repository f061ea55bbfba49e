use std::borrow::Cow;
use std::sync::Arc;

use serde::Deserialize;
use tracing::{instrument, warn};
use validator::{Validate, ValidationError};

use crate::data::user_repository::UserRepository;
use crate::domain::{error::DomainError, user::User};
use crate::infrastructure::security::{JwtKeys, hash_password, verify_password};

fn username_chars(username: &str) -> Result<(), ValidationError> {
    let valid = username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'));
    if !valid {
        let mut error = ValidationError::new("invalid_username");
        error.message = Some(Cow::from(
            "Letters, digits and @/./+/-/_ only.",
        ));
        return Err(error);
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct Registration {
    #[validate(length(min = 3, max = 150), custom(function = "username_chars"))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
}

#[derive(Clone)]
pub struct AuthService {
    repo: Arc<dyn UserRepository>,
    keys: JwtKeys,
}

impl AuthService {
    pub fn new(repo: Arc<dyn UserRepository>, keys: JwtKeys) -> Self {
        Self { repo, keys }
    }

    pub async fn get_user(&self, id: uuid::Uuid) -> Result<User, DomainError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::UserNotFound(id.to_string()))
    }

    #[instrument(skip(self, registration), fields(username = %registration.username))]
    pub async fn register(&self, registration: Registration) -> Result<User, DomainError> {
        registration.validate()?;

        if self
            .repo
            .find_by_username(&registration.username)
            .await?
            .is_some()
        {
            return Err(DomainError::UserAlreadyExists(registration.username));
        }

        let hash = hash_password(&registration.password)
            .map_err(|err| DomainError::Internal(err.to_string()))?;
        let user = User::new(
            registration.username,
            registration.email.to_lowercase(),
            hash,
        );
        self.repo.create(user).await
    }

    /// Checks credentials and returns the user together with a fresh access token.
    #[instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> Result<(User, String), DomainError> {
        let user = self
            .repo
            .find_by_username(username)
            .await?
            .ok_or(DomainError::Unauthorized)?;

        let valid = verify_password(password, &user.password_hash)
            .map_err(|_| DomainError::Unauthorized)?;
        if !valid {
            warn!(username, "rejected login");
            return Err(DomainError::Unauthorized);
        }

        let token = self
            .keys
            .generate_token(user.id)
            .map_err(|err| DomainError::Internal(err.to_string()))?;
        Ok((user, token))
    }

    /// Resolves a bearer token to the user it names.
    pub async fn authenticate(&self, token: &str) -> Result<User, DomainError> {
        let claims = self
            .keys
            .verify_token(token)
            .map_err(|_| DomainError::Unauthorized)?;
        let user_id =
            uuid::Uuid::parse_str(&claims.sub).map_err(|_| DomainError::Unauthorized)?;
        self.get_user(user_id)
            .await
            .map_err(|_| DomainError::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::memory::MemoryStore;

    fn service() -> AuthService {
        AuthService::new(
            Arc::new(MemoryStore::new()),
            JwtKeys::new("test-secret-test-secret-test-secret".into()),
        )
    }

    fn registration(username: &str) -> Registration {
        Registration {
            username: username.into(),
            email: format!("{username}@Example.com"),
            password: "correct-horse".into(),
        }
    }

    #[tokio::test]
    async fn register_then_login_and_authenticate() {
        let service = service();
        let user = service.register(registration("leo")).await.expect("registered");
        assert_eq!(user.email, "leo@example.com");
        assert_ne!(user.password_hash, "correct-horse");

        let (logged_in, token) = service.login("leo", "correct-horse").await.expect("login");
        assert_eq!(logged_in.id, user.id);

        let resolved = service.authenticate(&token).await.expect("token resolves");
        assert_eq!(resolved.username, "leo");
    }

    #[tokio::test]
    async fn wrong_password_is_unauthorized() {
        let service = service();
        service.register(registration("leo")).await.expect("registered");
        let err = service.login("leo", "wrong-password").await.unwrap_err();
        assert!(matches!(err, DomainError::Unauthorized));
        let err = service.login("nobody", "correct-horse").await.unwrap_err();
        assert!(matches!(err, DomainError::Unauthorized));
    }

    #[tokio::test]
    async fn duplicate_username_conflicts() {
        let service = service();
        service.register(registration("leo")).await.expect("registered");
        let err = service.register(registration("leo")).await.unwrap_err();
        assert!(matches!(err, DomainError::UserAlreadyExists(_)));
    }

    #[tokio::test]
    async fn invalid_registration_fails_validation() {
        let service = service();
        let mut bad = registration("leo");
        bad.password = "short".into();
        assert!(matches!(
            service.register(bad).await.unwrap_err(),
            DomainError::Validation(_)
        ));
        assert!(matches!(
            service.register(registration("a b")).await.unwrap_err(),
            DomainError::Validation(_)
        ));
    }

    #[tokio::test]
    async fn garbage_token_is_unauthorized() {
        let err = service().authenticate("not.a.token").await.unwrap_err();
        assert!(matches!(err, DomainError::Unauthorized));
    }
}

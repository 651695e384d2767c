//! User service (accounts, credentials, profiles).

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use ripple_common::{AppError, AppResult, IdGenerator};
use ripple_db::{
    entities::{user, user_profile},
    repositories::{UserProfileRepository, UserRepository},
};
use sea_orm::{DatabaseConnection, Set, TransactionTrait};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

/// User service for business logic.
#[derive(Clone)]
pub struct UserService {
    db: Arc<DatabaseConnection>,
    user_repo: UserRepository,
    profile_repo: UserProfileRepository,
    id_gen: IdGenerator,
}

/// Input for registering a new account.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterInput {
    #[validate(length(min = 1, max = 64))]
    pub username: String,

    #[validate(email)]
    pub email: String,

    #[validate(length(min = 8, max = 128))]
    pub password: String,

    #[validate(length(max = 256))]
    pub name: Option<String>,

    #[validate(length(max = 500))]
    pub bio: Option<String>,
}

/// Input for logging in.
#[derive(Debug, Deserialize)]
pub struct LoginInput {
    pub username: String,
    pub password: String,
}

/// Input for updating the caller's profile.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileInput {
    #[validate(length(max = 256))]
    pub name: Option<String>,

    #[validate(length(max = 500))]
    pub bio: Option<String>,

    #[validate(length(max = 1024))]
    pub avatar_url: Option<String>,
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub fn new(
        db: Arc<DatabaseConnection>,
        user_repo: UserRepository,
        profile_repo: UserProfileRepository,
    ) -> Self {
        Self {
            db,
            user_repo,
            profile_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Register a new account.
    ///
    /// The user row and its profile row are created in one transaction, and
    /// an auth token is issued immediately.
    pub async fn register(&self, input: RegisterInput) -> AppResult<user::Model> {
        input.validate()?;

        if self
            .user_repo
            .find_by_username(&input.username)
            .await?
            .is_some()
        {
            return Err(AppError::Validation(
                "username: already taken".to_string(),
            ));
        }

        let password_hash = hash_password(&input.password)?;
        let user_id = self.id_gen.generate();
        let token = self.id_gen.generate_token();

        let user_model = user::ActiveModel {
            id: Set(user_id.clone()),
            username: Set(input.username.clone()),
            username_lower: Set(input.username.to_lowercase()),
            token: Set(Some(token)),
            name: Set(input.name),
            bio: Set(input.bio),
            created_at: Set(chrono::Utc::now().into()),
            ..Default::default()
        };

        let profile_model = user_profile::ActiveModel {
            user_id: Set(user_id.clone()),
            password: Set(Some(password_hash)),
            email: Set(Some(input.email)),
            ..Default::default()
        };

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let created = self.user_repo.create(&txn, user_model).await?;
        self.profile_repo.create(&txn, profile_model).await?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        tracing::info!(user_id = %created.id, username = %created.username, "Registered user");
        Ok(created)
    }

    /// Authenticate with username and password.
    ///
    /// Returns the user and their auth token, minting one if the account has
    /// none (a previous logout cleared it).
    pub async fn login(&self, input: LoginInput) -> AppResult<(user::Model, String)> {
        let user = self
            .user_repo
            .find_by_username(&input.username)
            .await?
            .ok_or(AppError::Unauthorized)?;

        let profile = self
            .profile_repo
            .find_by_user_id(&user.id)
            .await?
            .ok_or(AppError::Unauthorized)?;

        let password_hash = profile.password.ok_or(AppError::Unauthorized)?;
        if !verify_password(&input.password, &password_hash)? {
            return Err(AppError::Unauthorized);
        }

        if let Some(token) = user.token.clone() {
            return Ok((user, token));
        }

        let token = self.id_gen.generate_token();
        let mut active: user::ActiveModel = user.into();
        active.token = Set(Some(token.clone()));
        active.updated_at = Set(Some(chrono::Utc::now().into()));
        let user = self.user_repo.update(active).await?;

        Ok((user, token))
    }

    /// Invalidate the caller's auth token.
    pub async fn logout(&self, user: user::Model) -> AppResult<()> {
        let mut active: user::ActiveModel = user.into();
        active.token = Set(None);
        active.updated_at = Set(Some(chrono::Utc::now().into()));
        self.user_repo.update(active).await?;
        Ok(())
    }

    /// Authenticate a user by token.
    pub async fn authenticate_by_token(&self, token: &str) -> AppResult<user::Model> {
        self.user_repo
            .find_by_token(token)
            .await?
            .ok_or(AppError::Unauthorized)
    }

    /// Get a user by ID.
    pub async fn get(&self, id: &str) -> AppResult<user::Model> {
        self.user_repo.get_by_id(id).await
    }

    /// Update the caller's profile.
    pub async fn update_profile(
        &self,
        user: user::Model,
        input: UpdateProfileInput,
    ) -> AppResult<user::Model> {
        input.validate()?;

        let mut active: user::ActiveModel = user.into();

        if let Some(name) = input.name {
            active.name = Set(Some(name));
        }
        if let Some(bio) = input.bio {
            active.bio = Set(Some(bio));
        }
        if let Some(avatar_url) = input.avatar_url {
            active.avatar_url = Set(Some(avatar_url));
        }

        active.updated_at = Set(Some(chrono::Utc::now().into()));

        self.user_repo.update(active).await
    }

    /// Search users by username or display name (paginated).
    pub async fn search(
        &self,
        query: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<(Vec<user::Model>, u64)> {
        let users = self.user_repo.search(query, limit, offset).await?;
        let total = self.user_repo.count_search(query).await?;
        Ok((users, total))
    }
}

/// Hash a password using Argon2.
fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| AppError::Internal(format!("Invalid hash: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_user(id: &str, username: &str) -> user::Model {
        user::Model {
            id: id.to_string(),
            username: username.to_string(),
            username_lower: username.to_lowercase(),
            token: Some("test_token".to_string()),
            name: None,
            bio: None,
            avatar_url: None,
            followers_count: 0,
            following_count: 0,
            posts_count: 0,
            is_admin: false,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn create_test_service(db: Arc<DatabaseConnection>) -> UserService {
        let user_repo = UserRepository::new(Arc::clone(&db));
        let profile_repo = UserProfileRepository::new(Arc::clone(&db));
        UserService::new(db, user_repo, profile_repo)
    }

    #[test]
    fn test_hash_password_roundtrip() {
        let hash = hash_password("correct horse battery").unwrap();

        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("correct horse battery", &hash).unwrap());
        assert!(!verify_password("wrong password", &hash).unwrap());
    }

    #[test]
    fn test_hash_password_salts_differ() {
        let hash1 = hash_password("same_password").unwrap();
        let hash2 = hash_password("same_password").unwrap();

        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_verify_password_invalid_hash() {
        assert!(verify_password("test", "not_a_phc_string").is_err());
    }

    #[test]
    fn test_register_input_validation() {
        let input = RegisterInput {
            username: String::new(),
            email: "alice@example.com".to_string(),
            password: "password123".to_string(),
            name: None,
            bio: None,
        };
        assert!(input.validate().is_err());

        let input = RegisterInput {
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password: "short".to_string(),
            name: None,
            bio: None,
        };
        assert!(input.validate().is_err());

        let input = RegisterInput {
            username: "alice".to_string(),
            email: "not-an-email".to_string(),
            password: "password123".to_string(),
            name: None,
            bio: None,
        };
        assert!(input.validate().is_err());

        let input = RegisterInput {
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password: "password123".to_string(),
            name: Some("Alice".to_string()),
            bio: None,
        };
        assert!(input.validate().is_ok());
    }

    #[tokio::test]
    async fn test_register_rejects_taken_username() {
        let existing = create_test_user("u1", "alice");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[existing]])
                .into_connection(),
        );
        let service = create_test_service(db);

        let result = service
            .register(RegisterInput {
                username: "Alice".to_string(),
                email: "alice@example.com".to_string(),
                password: "password123".to_string(),
                name: None,
                bio: None,
            })
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_authenticate_by_token_found() {
        let user = create_test_user("u1", "alice");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[user]])
                .into_connection(),
        );
        let service = create_test_service(db);

        let found = service.authenticate_by_token("test_token").await.unwrap();
        assert_eq!(found.id, "u1");
    }

    #[tokio::test]
    async fn test_authenticate_by_token_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()])
                .into_connection(),
        );
        let service = create_test_service(db);

        let result = service.authenticate_by_token("invalid").await;
        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_login_unknown_username() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()])
                .into_connection(),
        );
        let service = create_test_service(db);

        let result = service
            .login(LoginInput {
                username: "ghost".to_string(),
                password: "password123".to_string(),
            })
            .await;

        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let user = create_test_user("u1", "alice");
        let profile = user_profile::Model {
            user_id: "u1".to_string(),
            password: Some(hash_password("password123").unwrap()),
            email: Some("alice@example.com".to_string()),
            updated_at: None,
        };

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[user]])
                .append_query_results([[profile]])
                .into_connection(),
        );
        let service = create_test_service(db);

        let result = service
            .login(LoginInput {
                username: "alice".to_string(),
                password: "hunter2hunter2".to_string(),
            })
            .await;

        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_login_returns_existing_token() {
        let user = create_test_user("u1", "alice");
        let profile = user_profile::Model {
            user_id: "u1".to_string(),
            password: Some(hash_password("password123").unwrap()),
            email: Some("alice@example.com".to_string()),
            updated_at: None,
        };

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[user]])
                .append_query_results([[profile]])
                .into_connection(),
        );
        let service = create_test_service(db);

        let (user, token) = service
            .login(LoginInput {
                username: "alice".to_string(),
                password: "password123".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(user.id, "u1");
        assert_eq!(token, "test_token");
    }
}

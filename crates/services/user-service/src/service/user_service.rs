//! User service - Handles user-related business logic.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

use common::{AppError, AppResult};
use domain::{
    is_valid_username, CreateUser, Password, UpdateUser, User, UserAttribute, EVENT_USER_CREATED,
    EVENT_USER_DELETED, EVENT_USER_HARD_DELETED, EVENT_USER_RESTORED, EVENT_USER_UPDATED,
    MIN_NAME_LENGTH,
};

use crate::client::AuditServiceClient;
use crate::repository::UserRepository;

/// User service trait for dependency injection.
///
/// By default, operations exclude soft-deleted users.
#[async_trait]
pub trait UserService: Send + Sync {
    /// Get active user by ID, with its attributes
    async fn get_user(&self, id: Uuid) -> AppResult<(User, Vec<UserAttribute>)>;

    /// Get active user by username, with its attributes
    async fn get_user_by_username(&self, username: &str)
        -> AppResult<(User, Vec<UserAttribute>)>;

    /// List all active users (excludes soft-deleted)
    async fn list_users(&self) -> AppResult<Vec<User>>;

    /// List only soft-deleted users
    async fn list_deleted_users(&self) -> AppResult<Vec<User>>;

    /// Create a new user with its attributes
    async fn create_user(&self, input: CreateUser) -> AppResult<(User, Vec<UserAttribute>)>;

    /// Update user details (only active users)
    async fn update_user(&self, id: Uuid, update: UpdateUser) -> AppResult<User>;

    /// Soft delete user (sets deleted_at timestamp)
    async fn delete_user(&self, id: Uuid) -> AppResult<()>;

    /// Permanently delete user from database (hard delete)
    async fn hard_delete_user(&self, id: Uuid) -> AppResult<()>;

    /// Restore a soft-deleted user
    async fn restore_user(&self, id: Uuid) -> AppResult<User>;
}

/// Concrete implementation of UserService using repository.
pub struct UserManager {
    repo: Arc<dyn UserRepository>,
    audit: Option<Arc<dyn AuditServiceClient>>,
}

impl UserManager {
    /// Create new user service instance with repository and optional audit client
    pub fn new(repo: Arc<dyn UserRepository>, audit: Option<Arc<dyn AuditServiceClient>>) -> Self {
        Self { repo, audit }
    }

    /// Record an audit event for a mutating operation.
    ///
    /// Best-effort by design: the buffered audit path must never fail a user
    /// operation, so failures are logged and swallowed here.
    async fn record_audit(&self, key: &'static str, payload: serde_json::Value) {
        let Some(audit) = &self.audit else {
            return;
        };
        if let Err(err) = audit.record_event(key, payload.to_string()).await {
            warn!(error = %err, key, "failed to record audit event");
        }
    }
}

#[async_trait]
impl UserService for UserManager {
    async fn get_user(&self, id: Uuid) -> AppResult<(User, Vec<UserAttribute>)> {
        let user = self.repo.find_by_id(id).await?.ok_or(AppError::NotFound)?;
        let attributes = self.repo.attributes_for_user(user.id).await?;
        Ok((user, attributes))
    }

    async fn get_user_by_username(
        &self,
        username: &str,
    ) -> AppResult<(User, Vec<UserAttribute>)> {
        if username.is_empty() {
            return Err(AppError::validation("Username cannot be empty"));
        }

        let user = self
            .repo
            .find_by_username(username)
            .await?
            .ok_or(AppError::NotFound)?;
        let attributes = self.repo.attributes_for_user(user.id).await?;
        Ok((user, attributes))
    }

    async fn list_users(&self) -> AppResult<Vec<User>> {
        self.repo.list().await
    }

    async fn list_deleted_users(&self) -> AppResult<Vec<User>> {
        self.repo.list_deleted().await
    }

    async fn create_user(&self, input: CreateUser) -> AppResult<(User, Vec<UserAttribute>)> {
        if !is_valid_username(&input.username) {
            return Err(AppError::validation(
                "Username must be 3-64 characters of letters, digits, '_', '-' or '.'",
            ));
        }
        if input.name.len() < MIN_NAME_LENGTH {
            return Err(AppError::validation("Name cannot be empty"));
        }

        let password_hash = Password::new(input.password)?.hash()?;

        // Usernames stay reserved while a user is soft-deleted
        if self
            .repo
            .find_by_username_with_deleted(&input.username)
            .await?
            .is_some()
        {
            return Err(AppError::conflict("Username"));
        }

        let (user, attributes) = self
            .repo
            .create_with_attributes(
                input.username,
                password_hash,
                input.name,
                input.email,
                input.attributes,
            )
            .await?;

        self.record_audit(
            EVENT_USER_CREATED,
            serde_json::json!({ "user_id": user.id, "username": user.username }),
        )
        .await;

        Ok((user, attributes))
    }

    async fn update_user(&self, id: Uuid, update: UpdateUser) -> AppResult<User> {
        if update.name.is_none() && update.email.is_none() {
            return Err(AppError::validation("Nothing to update"));
        }
        if let Some(name) = &update.name {
            if name.len() < MIN_NAME_LENGTH {
                return Err(AppError::validation("Name cannot be empty"));
            }
        }

        let user = self.repo.update(id, update.name, update.email).await?;

        self.record_audit(
            EVENT_USER_UPDATED,
            serde_json::json!({ "user_id": user.id, "username": user.username }),
        )
        .await;

        Ok(user)
    }

    async fn delete_user(&self, id: Uuid) -> AppResult<()> {
        self.repo.delete(id).await?;

        self.record_audit(EVENT_USER_DELETED, serde_json::json!({ "user_id": id }))
            .await;

        Ok(())
    }

    async fn hard_delete_user(&self, id: Uuid) -> AppResult<()> {
        self.repo.hard_delete(id).await?;

        self.record_audit(
            EVENT_USER_HARD_DELETED,
            serde_json::json!({ "user_id": id }),
        )
        .await;

        Ok(())
    }

    async fn restore_user(&self, id: Uuid) -> AppResult<User> {
        let user = self.repo.restore(id).await?;

        self.record_audit(
            EVENT_USER_RESTORED,
            serde_json::json!({ "user_id": user.id, "username": user.username }),
        )
        .await;

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use mockall::predicate::eq;

    use super::*;
    use crate::client::MockAuditServiceClient;
    use crate::repository::MockUserRepository;
    use domain::KeyValuePair;

    fn test_user(id: Uuid, username: &str) -> User {
        User {
            id,
            username: username.to_string(),
            password_hash: "$argon2id$stub".to_string(),
            name: "Test User".to_string(),
            email: Some("test@example.com".to_string()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            deleted_at: None,
        }
    }

    fn create_input(username: &str) -> CreateUser {
        CreateUser {
            username: username.to_string(),
            password: "correct horse battery".to_string(),
            name: "Test User".to_string(),
            email: None,
            attributes: vec![KeyValuePair {
                key: "team".to_string(),
                value: "platform".to_string(),
            }],
        }
    }

    fn manager(repo: MockUserRepository, audit: Option<MockAuditServiceClient>) -> UserManager {
        UserManager::new(
            Arc::new(repo),
            audit.map(|client| Arc::new(client) as Arc<dyn AuditServiceClient>),
        )
    }

    #[tokio::test]
    async fn create_user_hashes_password_and_records_audit() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_username_with_deleted()
            .withf(|username| username == "alice")
            .returning(|_| Ok(None));
        repo.expect_create_with_attributes()
            .withf(|username, hash, _, _, attributes| {
                username == "alice" && hash != "correct horse battery" && attributes.len() == 1
            })
            .returning(|username, hash, name, email, _| {
                let mut user = test_user(Uuid::new_v4(), &username);
                user.password_hash = hash;
                user.name = name;
                user.email = email;
                Ok((user, Vec::new()))
            });

        let mut audit = MockAuditServiceClient::new();
        audit
            .expect_record_event()
            .withf(|key, _| key == EVENT_USER_CREATED)
            .times(1)
            .returning(|_, _| Ok(()));

        let service = manager(repo, Some(audit));
        let (user, _) = service.create_user(create_input("alice")).await.unwrap();
        assert_eq!(user.username, "alice");
        assert_ne!(user.password_hash, "correct horse battery");
    }

    #[tokio::test]
    async fn create_user_rejects_duplicate_username() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_username_with_deleted()
            .returning(|username| Ok(Some(test_user(Uuid::new_v4(), username))));

        let service = manager(repo, None);
        let result = service.create_user(create_input("alice")).await;
        assert!(matches!(result.unwrap_err(), AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn create_user_rejects_short_password() {
        // Validation fails before any repository call
        let repo = MockUserRepository::new();

        let service = manager(repo, None);
        let mut input = create_input("alice");
        input.password = "short".to_string();

        let result = service.create_user(input).await;
        assert!(matches!(result.unwrap_err(), AppError::Validation(_)));
    }

    #[tokio::test]
    async fn get_user_returns_attributes() {
        let user_id = Uuid::new_v4();

        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id()
            .with(eq(user_id))
            .returning(|id| Ok(Some(test_user(id, "alice"))));
        repo.expect_attributes_for_user()
            .with(eq(user_id))
            .returning(|id| {
                Ok(vec![UserAttribute::new(
                    id,
                    KeyValuePair {
                        key: "team".to_string(),
                        value: "platform".to_string(),
                    },
                )])
            });

        let service = manager(repo, None);
        let (user, attributes) = service.get_user(user_id).await.unwrap();
        assert_eq!(user.id, user_id);
        assert_eq!(attributes.len(), 1);
        assert_eq!(attributes[0].key, "team");
    }

    #[tokio::test]
    async fn get_user_not_found() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id().returning(|_| Ok(None));

        let service = manager(repo, None);
        let result = service.get_user(Uuid::new_v4()).await;
        assert!(matches!(result.unwrap_err(), AppError::NotFound));
    }

    #[tokio::test]
    async fn delete_user_records_audit_event() {
        let mut repo = MockUserRepository::new();
        repo.expect_delete().returning(|_| Ok(()));

        let mut audit = MockAuditServiceClient::new();
        audit
            .expect_record_event()
            .withf(|key, _| key == EVENT_USER_DELETED)
            .times(1)
            .returning(|_, _| Ok(()));

        let service = manager(repo, Some(audit));
        service.delete_user(Uuid::new_v4()).await.unwrap();
    }

    #[tokio::test]
    async fn audit_failure_does_not_fail_operation() {
        let mut repo = MockUserRepository::new();
        repo.expect_delete().returning(|_| Ok(()));

        let mut audit = MockAuditServiceClient::new();
        audit
            .expect_record_event()
            .times(1)
            .returning(|_, _| Err(AppError::service_unavailable("audit-service")));

        let service = manager(repo, Some(audit));
        service
            .delete_user(Uuid::new_v4())
            .await
            .expect("audit failure is swallowed");
    }

    #[tokio::test]
    async fn update_user_requires_changes() {
        let repo = MockUserRepository::new();

        let service = manager(repo, None);
        let result = service
            .update_user(
                Uuid::new_v4(),
                UpdateUser {
                    name: None,
                    email: None,
                },
            )
            .await;
        assert!(matches!(result.unwrap_err(), AppError::Validation(_)));
    }

    #[tokio::test]
    async fn restore_user_success() {
        let user_id = Uuid::new_v4();

        let mut repo = MockUserRepository::new();
        repo.expect_restore()
            .with(eq(user_id))
            .returning(|id| Ok(test_user(id, "alice")));

        let service = manager(repo, None);
        let user = service.restore_user(user_id).await.unwrap();
        assert_eq!(user.id, user_id);
    }
}

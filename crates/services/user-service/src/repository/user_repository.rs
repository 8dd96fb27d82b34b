//! User repository implementation with soft delete support.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionError, TransactionTrait,
};
use uuid::Uuid;

use super::entities::user::{self, ActiveModel, Entity as UserEntity};
use super::entities::user_attribute::{self, Entity as UserAttributeEntity};
use common::{AppError, AppResult};
use domain::{KeyValuePair, User, UserAttribute};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// User repository trait for dependency injection.
///
/// By default, all query methods exclude soft-deleted records.
/// Use `*_with_deleted` variants to include them.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find active user by ID (excludes soft-deleted)
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Find active user by username (excludes soft-deleted)
    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>>;

    /// Find user by username including soft-deleted
    async fn find_by_username_with_deleted(&self, username: &str) -> AppResult<Option<User>>;

    /// Create a new user together with its attributes, in one transaction
    async fn create_with_attributes(
        &self,
        username: String,
        password_hash: String,
        name: String,
        email: Option<String>,
        attributes: Vec<KeyValuePair>,
    ) -> AppResult<(User, Vec<UserAttribute>)>;

    /// Attributes of a user, in insertion order
    async fn attributes_for_user(&self, user_id: Uuid) -> AppResult<Vec<UserAttribute>>;

    /// Update user fields (only active users)
    async fn update(
        &self,
        id: Uuid,
        name: Option<String>,
        email: Option<String>,
    ) -> AppResult<User>;

    /// Soft delete user by ID (sets deleted_at timestamp)
    async fn delete(&self, id: Uuid) -> AppResult<()>;

    /// Permanently delete user from database (hard delete)
    async fn hard_delete(&self, id: Uuid) -> AppResult<()>;

    /// Restore a soft-deleted user
    async fn restore(&self, id: Uuid) -> AppResult<User>;

    /// List all active users (excludes soft-deleted)
    async fn list(&self) -> AppResult<Vec<User>>;

    /// List only soft-deleted users
    async fn list_deleted(&self) -> AppResult<Vec<User>>;
}

/// Concrete implementation of UserRepository with soft delete
pub struct UserStore {
    db: DatabaseConnection,
}

impl UserStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for UserStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let result = UserEntity::find_by_id(id)
            .filter(user::Column::DeletedAt.is_null())
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(User::from))
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let result = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .filter(user::Column::DeletedAt.is_null())
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(User::from))
    }

    async fn find_by_username_with_deleted(&self, username: &str) -> AppResult<Option<User>> {
        let result = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(User::from))
    }

    async fn create_with_attributes(
        &self,
        username: String,
        password_hash: String,
        name: String,
        email: Option<String>,
        attributes: Vec<KeyValuePair>,
    ) -> AppResult<(User, Vec<UserAttribute>)> {
        let now = chrono::Utc::now();
        let user_id = Uuid::new_v4();

        let (user_model, attribute_models) = self
            .db
            .transaction::<_, (user::Model, Vec<user_attribute::Model>), sea_orm::DbErr>(
                move |txn| {
                    Box::pin(async move {
                        let user_model = ActiveModel {
                            id: Set(user_id),
                            username: Set(username),
                            password_hash: Set(password_hash),
                            name: Set(name),
                            email: Set(email),
                            created_at: Set(now),
                            updated_at: Set(now),
                            deleted_at: Set(None),
                        }
                        .insert(txn)
                        .await?;

                        if attributes.is_empty() {
                            return Ok((user_model, Vec::new()));
                        }

                        let models = attributes.into_iter().map(|pair| {
                            user_attribute::ActiveModel {
                                id: NotSet,
                                user_id: Set(user_id),
                                key: Set(pair.key),
                                value: Set(pair.value),
                                created_at: Set(now),
                                updated_at: Set(now),
                            }
                        });
                        let attribute_models = UserAttributeEntity::insert_many(models)
                            .exec_with_returning_many(txn)
                            .await?;

                        Ok((user_model, attribute_models))
                    })
                },
            )
            .await
            .map_err(|err| match err {
                TransactionError::Connection(e) => AppError::from(e),
                TransactionError::Transaction(e) => AppError::from(e),
            })?;

        Ok((
            User::from(user_model),
            attribute_models
                .into_iter()
                .map(UserAttribute::from)
                .collect(),
        ))
    }

    async fn attributes_for_user(&self, user_id: Uuid) -> AppResult<Vec<UserAttribute>> {
        let models = UserAttributeEntity::find()
            .filter(user_attribute::Column::UserId.eq(user_id))
            .order_by_asc(user_attribute::Column::Id)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(UserAttribute::from).collect())
    }

    async fn update(
        &self,
        id: Uuid,
        name: Option<String>,
        email: Option<String>,
    ) -> AppResult<User> {
        // Only allow updating active (non-deleted) users
        let user = UserEntity::find_by_id(id)
            .filter(user::Column::DeletedAt.is_null())
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        let mut active: ActiveModel = user.into();

        if let Some(name) = name {
            active.name = Set(name);
        }
        if let Some(email) = email {
            active.email = Set(Some(email));
        }
        active.updated_at = Set(chrono::Utc::now());

        let model = active.update(&self.db).await.map_err(AppError::from)?;
        Ok(User::from(model))
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        // Soft delete: set deleted_at timestamp
        let user = UserEntity::find_by_id(id)
            .filter(user::Column::DeletedAt.is_null())
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        let mut active: ActiveModel = user.into();
        let now = chrono::Utc::now();
        active.deleted_at = Set(Some(now));
        active.updated_at = Set(now);

        active.update(&self.db).await.map_err(AppError::from)?;
        Ok(())
    }

    async fn hard_delete(&self, id: Uuid) -> AppResult<()> {
        // Attribute rows go with the user via the FK cascade
        let result = UserEntity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(AppError::from)?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }

        Ok(())
    }

    async fn restore(&self, id: Uuid) -> AppResult<User> {
        // Find the soft-deleted user
        let user = UserEntity::find_by_id(id)
            .filter(user::Column::DeletedAt.is_not_null())
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::validation("User is not deleted or does not exist"))?;

        let mut active: ActiveModel = user.into();
        active.deleted_at = Set(None);
        active.updated_at = Set(chrono::Utc::now());

        let model = active.update(&self.db).await.map_err(AppError::from)?;
        Ok(User::from(model))
    }

    async fn list(&self) -> AppResult<Vec<User>> {
        let models = UserEntity::find()
            .filter(user::Column::DeletedAt.is_null())
            .order_by_asc(user::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(User::from).collect())
    }

    async fn list_deleted(&self) -> AppResult<Vec<User>> {
        let models = UserEntity::find()
            .filter(user::Column::DeletedAt.is_not_null())
            .order_by_asc(user::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(User::from).collect())
    }
}

//! gRPC client for user-service.

use tonic::transport::Channel;
use tracing::debug;

use common::{AppError, AppResult};
use domain::{KeyValuePair, User, UserAttribute};
use proto::user::{
    user_service_client::UserServiceClient as ProtoUserServiceClient, CreateUserRequest,
    DeleteUserRequest, GetUserByUsernameRequest, GetUserRequest, ListUsersRequest,
    RestoreUserRequest, UpdateUserRequest,
};

/// A user together with its attributes, as returned by user-service.
pub struct UserWithAttributes {
    pub user: User,
    pub attributes: Vec<UserAttribute>,
}

/// gRPC client wrapper for user-service.
pub struct UserClient {
    client: ProtoUserServiceClient<Channel>,
}

impl UserClient {
    /// Connect to user-service.
    pub async fn connect(endpoint: &str) -> Result<Self, tonic::transport::Error> {
        debug!("Connecting to user-service at {}", endpoint);
        let client = ProtoUserServiceClient::connect(endpoint.to_string()).await?;
        Ok(Self { client })
    }

    /// Get user by ID.
    pub async fn get_user(&self, id: uuid::Uuid) -> AppResult<UserWithAttributes> {
        let request = tonic::Request::new(GetUserRequest { id: id.to_string() });

        let mut client = self.client.clone();
        let response = client.get_user(request).await.map_err(AppError::from)?;
        proto_to_user(response.into_inner())
    }

    /// Get user by username.
    pub async fn get_user_by_username(&self, username: &str) -> AppResult<UserWithAttributes> {
        let request = tonic::Request::new(GetUserByUsernameRequest {
            username: username.to_string(),
        });

        let mut client = self.client.clone();
        let response = client
            .get_user_by_username(request)
            .await
            .map_err(AppError::from)?;
        proto_to_user(response.into_inner())
    }

    /// List all active users.
    pub async fn list_users(&self) -> AppResult<Vec<User>> {
        let request = tonic::Request::new(ListUsersRequest {
            limit: None,
            offset: None,
        });

        let mut client = self.client.clone();
        let response = client.list_users(request).await.map_err(AppError::from)?;

        response
            .into_inner()
            .users
            .into_iter()
            .map(|proto_user| proto_to_user(proto_user).map(|u| u.user))
            .collect()
    }

    /// List soft-deleted users.
    pub async fn list_deleted_users(&self) -> AppResult<Vec<User>> {
        let request = tonic::Request::new(ListUsersRequest {
            limit: None,
            offset: None,
        });

        let mut client = self.client.clone();
        let response = client
            .list_deleted_users(request)
            .await
            .map_err(AppError::from)?;

        response
            .into_inner()
            .users
            .into_iter()
            .map(|proto_user| proto_to_user(proto_user).map(|u| u.user))
            .collect()
    }

    /// Create a new user with attributes.
    pub async fn create_user(
        &self,
        username: String,
        password: String,
        name: String,
        email: Option<String>,
        attributes: Vec<KeyValuePair>,
    ) -> AppResult<UserWithAttributes> {
        let request = tonic::Request::new(CreateUserRequest {
            username,
            password,
            name,
            email,
            attributes: attributes
                .into_iter()
                .map(|pair| proto::user::KeyValuePair {
                    key: pair.key,
                    value: pair.value,
                })
                .collect(),
        });

        let mut client = self.client.clone();
        let response = client.create_user(request).await.map_err(AppError::from)?;
        proto_to_user(response.into_inner())
    }

    /// Update user.
    pub async fn update_user(
        &self,
        id: uuid::Uuid,
        name: Option<String>,
        email: Option<String>,
    ) -> AppResult<User> {
        let request = tonic::Request::new(UpdateUserRequest {
            id: id.to_string(),
            name,
            email,
        });

        let mut client = self.client.clone();
        let response = client.update_user(request).await.map_err(AppError::from)?;
        proto_to_user(response.into_inner()).map(|u| u.user)
    }

    /// Soft delete user.
    pub async fn delete_user(&self, id: uuid::Uuid) -> AppResult<()> {
        let request = tonic::Request::new(DeleteUserRequest { id: id.to_string() });

        let mut client = self.client.clone();
        client.delete_user(request).await.map_err(AppError::from)?;
        Ok(())
    }

    /// Permanently delete user.
    pub async fn hard_delete_user(&self, id: uuid::Uuid) -> AppResult<()> {
        let request = tonic::Request::new(DeleteUserRequest { id: id.to_string() });

        let mut client = self.client.clone();
        client
            .hard_delete_user(request)
            .await
            .map_err(AppError::from)?;
        Ok(())
    }

    /// Restore soft-deleted user.
    pub async fn restore_user(&self, id: uuid::Uuid) -> AppResult<User> {
        let request = tonic::Request::new(RestoreUserRequest { id: id.to_string() });

        let mut client = self.client.clone();
        let response = client.restore_user(request).await.map_err(AppError::from)?;
        proto_to_user(response.into_inner()).map(|u| u.user)
    }
}

/// Convert proto UserResponse to domain User with attributes.
fn proto_to_user(proto: proto::user::UserResponse) -> AppResult<UserWithAttributes> {
    let id = proto
        .id
        .parse()
        .map_err(|_| AppError::internal("Invalid UUID from user-service"))?;

    let created_at = parse_timestamp(&proto.created_at, "created_at")?;
    let updated_at = parse_timestamp(&proto.updated_at, "updated_at")?;
    let deleted_at = proto
        .deleted_at
        .as_deref()
        .map(|dt| parse_timestamp(dt, "deleted_at"))
        .transpose()?;

    let attributes = proto
        .attributes
        .into_iter()
        .map(|attribute| {
            Ok(UserAttribute {
                id: Some(attribute.id),
                user_id: attribute
                    .user_id
                    .parse()
                    .map_err(|_| AppError::internal("Invalid UUID from user-service"))?,
                key: attribute.key,
                value: attribute.value,
                created_at: parse_timestamp(&attribute.created_at, "created_at")?,
                updated_at: parse_timestamp(&attribute.updated_at, "updated_at")?,
            })
        })
        .collect::<AppResult<Vec<UserAttribute>>>()?;

    Ok(UserWithAttributes {
        user: User {
            id,
            username: proto.username,
            // Gateway never receives the password hash
            password_hash: String::new(),
            name: proto.name,
            email: proto.email,
            created_at,
            updated_at,
            deleted_at,
        },
        attributes,
    })
}

/// Parse an RFC 3339 timestamp from a service response.
fn parse_timestamp(value: &str, field: &str) -> AppResult<chrono::DateTime<chrono::Utc>> {
    chrono::DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&chrono::Utc))
        .map_err(|_| AppError::internal(format!("Invalid {} from user-service", field)))
}

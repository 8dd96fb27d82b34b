//! gRPC implementation for UserService.

use std::sync::Arc;

use tonic::{Request, Response, Status};
use uuid::Uuid;

use crate::service::UserService;
use domain::{CreateUser, UpdateUser};
use proto::user::{
    user_service_server::UserService as UserServiceProto, CreateUserRequest, DeleteUserRequest,
    DeleteUserResponse, GetUserByUsernameRequest, GetUserRequest, ListUsersRequest,
    ListUsersResponse, RestoreUserRequest, UpdateUserRequest, UserResponse,
};

/// gRPC service wrapper for UserService.
pub struct UserGrpcService {
    service: Arc<dyn UserService>,
}

impl UserGrpcService {
    /// Create a new gRPC service wrapper.
    pub fn new(service: Arc<dyn UserService>) -> Self {
        Self { service }
    }
}

#[tonic::async_trait]
impl UserServiceProto for UserGrpcService {
    async fn get_user(
        &self,
        request: Request<GetUserRequest>,
    ) -> Result<Response<UserResponse>, Status> {
        let req = request.into_inner();
        let id = parse_uuid(&req.id)?;

        let (user, attributes) = self.service.get_user(id).await.map_err(Status::from)?;
        Ok(Response::new(user_to_proto(&user, &attributes)))
    }

    async fn get_user_by_username(
        &self,
        request: Request<GetUserByUsernameRequest>,
    ) -> Result<Response<UserResponse>, Status> {
        let req = request.into_inner();

        let (user, attributes) = self
            .service
            .get_user_by_username(&req.username)
            .await
            .map_err(Status::from)?;
        Ok(Response::new(user_to_proto(&user, &attributes)))
    }

    async fn list_users(
        &self,
        _request: Request<ListUsersRequest>,
    ) -> Result<Response<ListUsersResponse>, Status> {
        let users = self.service.list_users().await.map_err(Status::from)?;
        let total = users.len() as i32;
        let users: Vec<UserResponse> = users.iter().map(|user| user_to_proto(user, &[])).collect();

        Ok(Response::new(ListUsersResponse { users, total }))
    }

    async fn list_deleted_users(
        &self,
        _request: Request<ListUsersRequest>,
    ) -> Result<Response<ListUsersResponse>, Status> {
        let users = self
            .service
            .list_deleted_users()
            .await
            .map_err(Status::from)?;
        let total = users.len() as i32;
        let users: Vec<UserResponse> = users.iter().map(|user| user_to_proto(user, &[])).collect();

        Ok(Response::new(ListUsersResponse { users, total }))
    }

    async fn create_user(
        &self,
        request: Request<CreateUserRequest>,
    ) -> Result<Response<UserResponse>, Status> {
        let req = request.into_inner();

        let input = CreateUser {
            username: req.username,
            password: req.password,
            name: req.name,
            email: req.email,
            attributes: req
                .attributes
                .into_iter()
                .map(|pair| domain::KeyValuePair {
                    key: pair.key,
                    value: pair.value,
                })
                .collect(),
        };

        let (user, attributes) = self
            .service
            .create_user(input)
            .await
            .map_err(Status::from)?;
        Ok(Response::new(user_to_proto(&user, &attributes)))
    }

    async fn update_user(
        &self,
        request: Request<UpdateUserRequest>,
    ) -> Result<Response<UserResponse>, Status> {
        let req = request.into_inner();
        let id = parse_uuid(&req.id)?;

        let user = self
            .service
            .update_user(
                id,
                UpdateUser {
                    name: req.name,
                    email: req.email,
                },
            )
            .await
            .map_err(Status::from)?;
        Ok(Response::new(user_to_proto(&user, &[])))
    }

    async fn delete_user(
        &self,
        request: Request<DeleteUserRequest>,
    ) -> Result<Response<DeleteUserResponse>, Status> {
        let req = request.into_inner();
        let id = parse_uuid(&req.id)?;

        self.service.delete_user(id).await.map_err(Status::from)?;
        Ok(Response::new(DeleteUserResponse { success: true }))
    }

    async fn hard_delete_user(
        &self,
        request: Request<DeleteUserRequest>,
    ) -> Result<Response<DeleteUserResponse>, Status> {
        let req = request.into_inner();
        let id = parse_uuid(&req.id)?;

        self.service
            .hard_delete_user(id)
            .await
            .map_err(Status::from)?;
        Ok(Response::new(DeleteUserResponse { success: true }))
    }

    async fn restore_user(
        &self,
        request: Request<RestoreUserRequest>,
    ) -> Result<Response<UserResponse>, Status> {
        let req = request.into_inner();
        let id = parse_uuid(&req.id)?;

        let user = self.service.restore_user(id).await.map_err(Status::from)?;
        Ok(Response::new(user_to_proto(&user, &[])))
    }
}

/// Parse UUID from string.
fn parse_uuid(s: &str) -> Result<Uuid, Status> {
    Uuid::parse_str(s).map_err(|_| Status::invalid_argument("Invalid UUID format"))
}

/// Convert domain User (and its attributes) to proto UserResponse.
/// The password hash never crosses the wire.
fn user_to_proto(user: &domain::User, attributes: &[domain::UserAttribute]) -> UserResponse {
    UserResponse {
        id: user.id.to_string(),
        username: user.username.clone(),
        name: user.name.clone(),
        email: user.email.clone(),
        created_at: user.created_at.to_rfc3339(),
        updated_at: user.updated_at.to_rfc3339(),
        deleted_at: user.deleted_at.map(|dt| dt.to_rfc3339()),
        attributes: attributes.iter().map(attribute_to_proto).collect(),
    }
}

/// Convert domain UserAttribute to proto.
fn attribute_to_proto(attribute: &domain::UserAttribute) -> proto::user::UserAttribute {
    proto::user::UserAttribute {
        id: attribute.id.unwrap_or_default(),
        user_id: attribute.user_id.to_string(),
        key: attribute.key.clone(),
        value: attribute.value.clone(),
        created_at: attribute.created_at.to_rfc3339(),
        updated_at: attribute.updated_at.to_rfc3339(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use domain::{KeyValuePair, User, UserAttribute};

    #[test]
    fn user_conversion_omits_password_hash() {
        let user = User::new(
            Uuid::new_v4(),
            "alice".to_string(),
            "secret-hash".to_string(),
            "Alice".to_string(),
            None,
        );
        let attributes = vec![UserAttribute::new(
            user.id,
            KeyValuePair {
                key: "team".to_string(),
                value: "platform".to_string(),
            },
        )];

        let proto_user = user_to_proto(&user, &attributes);
        assert_eq!(proto_user.username, "alice");
        assert_eq!(proto_user.attributes.len(), 1);
        assert_eq!(proto_user.attributes[0].key, "team");
        assert!(proto_user.deleted_at.is_none());
        // Serialized form carries no trace of the hash
        assert!(!format!("{:?}", proto_user).contains("secret-hash"));
    }

    #[test]
    fn deleted_user_conversion_carries_timestamp() {
        let mut user = User::new(
            Uuid::new_v4(),
            "bob".to_string(),
            "hash".to_string(),
            "Bob".to_string(),
            None,
        );
        user.deleted_at = Some(Utc::now());

        let proto_user = user_to_proto(&user, &[]);
        assert!(proto_user.deleted_at.is_some());
    }

    #[test]
    fn invalid_uuid_is_rejected() {
        assert!(parse_uuid("not-a-uuid").is_err());
        assert!(parse_uuid(&Uuid::new_v4().to_string()).is_ok());
    }
}

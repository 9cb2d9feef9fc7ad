//! Role service client
//!
//! REST endpoints under `/api/roles`. Inbound permissions may arrive in any
//! supported shape and are normalized with
//! [`PermissionConverter::process_permissions_from_api`]; outbound
//! permissions are always sent as the string-array wire format.

use retail_shared::ApiResponse;
use retail_shared::models::{Role, RoleCreate, RoleDto, RoleUpdate};
use retail_shared::permission::{PermissionConverter, Permissions, global_converter};

use crate::{ClientConfig, ClientError, ClientResult, HttpClient};

const ROLES_PATH: &str = "/api/roles";

/// Client for role CRUD
#[derive(Debug, Clone)]
pub struct RoleClient {
    http: HttpClient,
    converter: PermissionConverter,
}

impl RoleClient {
    pub fn new(http: HttpClient, converter: PermissionConverter) -> Self {
        Self { http, converter }
    }

    /// Client using the process-wide permission converter
    pub fn from_config(config: &ClientConfig) -> ClientResult<Self> {
        Ok(Self::new(
            HttpClient::new(config)?,
            global_converter().clone(),
        ))
    }

    pub fn converter(&self) -> &PermissionConverter {
        &self.converter
    }

    pub async fn list_roles(&self) -> ClientResult<Vec<Role>> {
        let dtos: Vec<RoleDto> = unwrap_data(self.http.get(ROLES_PATH).await?, "roles")?;
        Ok(dtos
            .into_iter()
            .map(|dto| Role::from_dto(dto, &self.converter))
            .collect())
    }

    pub async fn get_role(&self, id: i64) -> ClientResult<Role> {
        let dto = unwrap_data(self.http.get(&role_path(id)).await?, "role")?;
        Ok(Role::from_dto(dto, &self.converter))
    }

    pub async fn create_role(
        &self,
        name: &str,
        description: Option<String>,
        permissions: &Permissions,
    ) -> ClientResult<Role> {
        let payload = RoleCreate::new(name, description, permissions, &self.converter);
        tracing::debug!(role = %name, granted = payload.permissions.len(), "Creating role");
        let dto = unwrap_data(self.http.post(ROLES_PATH, &payload).await?, "role")?;
        Ok(Role::from_dto(dto, &self.converter))
    }

    pub async fn update_role(&self, id: i64, update: &RoleUpdate) -> ClientResult<Role> {
        let dto = unwrap_data(self.http.put(&role_path(id), update).await?, "role")?;
        Ok(Role::from_dto(dto, &self.converter))
    }

    /// Replace a role's permission set
    pub async fn update_role_permissions(
        &self,
        id: i64,
        permissions: &Permissions,
    ) -> ClientResult<Role> {
        let update = RoleUpdate::permissions(permissions, &self.converter);
        self.update_role(id, &update).await
    }

    pub async fn delete_role(&self, id: i64) -> ClientResult<()> {
        let response: ApiResponse<serde_json::Value> = self.http.delete(&role_path(id)).await?;
        check_code(&response)
    }
}

fn role_path(id: i64) -> String {
    format!("{}/{}", ROLES_PATH, id)
}

fn check_code<T>(response: &ApiResponse<T>) -> ClientResult<()> {
    if response.is_success() {
        Ok(())
    } else {
        Err(ClientError::Api {
            code: response.code.clone(),
            message: response.message.clone(),
        })
    }
}

fn unwrap_data<T>(response: ApiResponse<T>, what: &str) -> ClientResult<T> {
    check_code(&response)?;
    response
        .data
        .ok_or_else(|| ClientError::InvalidResponse(format!("Missing {} data", what)))
}

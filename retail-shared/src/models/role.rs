//! Role Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::permission::{PermissionConverter, Permissions};

/// Role entity with normalized permissions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub permissions: Permissions,
    pub is_active: bool,
    /// Number of employees holding this role
    pub staff_count: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Role {
    /// Build from an API payload, normalizing whatever permission shape it carries
    pub fn from_dto(dto: RoleDto, converter: &PermissionConverter) -> Self {
        Self {
            permissions: converter.process_permissions_from_api(&dto.permissions),
            id: dto.id,
            name: dto.name,
            description: dto.description,
            is_active: dto.is_active,
            staff_count: dto.staff_count,
            created_at: dto.created_at,
            updated_at: dto.updated_at,
        }
    }
}

/// Role as returned by the API
///
/// `permissions` may be a wire array, an API CRUD object, a canonical object
/// or a legacy shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleDto {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub permissions: Value,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub staff_count: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_active() -> bool {
    true
}

/// Create role payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleCreate {
    pub name: String,
    pub description: Option<String>,
    /// Wire-encoded permissions
    pub permissions: Vec<String>,
}

impl RoleCreate {
    pub fn new(
        name: impl Into<String>,
        description: Option<String>,
        permissions: &Permissions,
        converter: &PermissionConverter,
    ) -> Self {
        Self {
            name: name.into(),
            description,
            permissions: converter.prepare_permissions_for_api(permissions),
        }
    }
}

/// Update role payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Wire-encoded permissions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl RoleUpdate {
    /// Update that only replaces the permission set
    pub fn permissions(permissions: &Permissions, converter: &PermissionConverter) -> Self {
        Self {
            permissions: Some(converter.prepare_permissions_for_api(permissions)),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permission::AccessLevel;
    use serde_json::json;

    fn dto(permissions: Value) -> RoleDto {
        serde_json::from_value(json!({
            "id": 7,
            "name": "Cashier",
            "permissions": permissions,
            "staffCount": 3,
            "createdAt": "2024-05-01T08:00:00Z",
            "updatedAt": "2024-05-02T08:00:00Z"
        }))
        .unwrap()
    }

    #[test]
    fn test_role_from_array_payload() {
        let converter = PermissionConverter::default();
        let role = Role::from_dto(
            dto(json!(["sales", "sales.view.self", "sales.processRefunds"])),
            &converter,
        );
        assert_eq!(role.id, 7);
        assert!(role.is_active);
        assert_eq!(role.staff_count, 3);
        assert_eq!(role.description, None);
        assert_eq!(role.permissions.sales.view, AccessLevel::SelfOnly);
        assert!(role.permissions.sales.process_refunds);
    }

    #[test]
    fn test_role_without_permissions_denies_everything() {
        let converter = PermissionConverter::default();
        let raw: RoleDto = serde_json::from_value(json!({
            "id": 1,
            "name": "Empty",
            "createdAt": "2024-05-01T08:00:00Z",
            "updatedAt": "2024-05-01T08:00:00Z"
        }))
        .unwrap();
        let role = Role::from_dto(raw, &converter);
        assert!(role.permissions.is_empty());
    }

    #[test]
    fn test_create_payload_encodes_permissions() {
        let converter = PermissionConverter::default();
        let mut perms = Permissions::default();
        perms.inventory.view = AccessLevel::Department;
        let create = RoleCreate::new("Stock clerk", None, &perms, &converter);
        assert_eq!(create.permissions, vec!["inventory", "inventory.view.dept"]);
    }

    #[test]
    fn test_update_payload_skips_unset_fields() {
        let converter = PermissionConverter::default();
        let update = RoleUpdate::permissions(&Permissions::default(), &converter);
        assert_eq!(serde_json::to_value(&update).unwrap(), json!({ "permissions": [] }));
    }
}

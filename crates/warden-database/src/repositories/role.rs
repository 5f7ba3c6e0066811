//! Role graph repository: roles, permissions, capabilities, and their links.

use std::collections::HashMap;

use sqlx::{FromRow, PgPool, Postgres, Transaction};
use tracing::debug;
use uuid::Uuid;

use warden_core::result::AppResult;
use warden_core::types::{CapabilityId, IdentityId, PermissionId, RoleId};
use warden_entity::role::{Capability, Permission, Role};

use super::db_error;

/// A permission row joined with the role that links it.
#[derive(Debug, FromRow)]
struct LinkedPermission {
    role_id: RoleId,
    #[sqlx(flatten)]
    permission: Permission,
}

/// A capability row joined with the permission or role that links it.
#[derive(Debug, FromRow)]
struct LinkedCapability {
    owner_id: Uuid,
    #[sqlx(flatten)]
    capability: Capability,
}

/// Repository for the role → permission → capability graph.
///
/// Reads always return fully populated roles so callers never fetch
/// nested data themselves.
#[derive(Debug, Clone)]
pub struct RoleRepository {
    pool: PgPool,
}

impl RoleRepository {
    /// Create a new role repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a role together with its permissions and capabilities.
    ///
    /// Permissions and capabilities are shared nodes keyed by name: an
    /// existing node with the same name is linked rather than duplicated.
    pub async fn create(&self, role: &Role) -> AppResult<Role> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin transaction", e))?;

        sqlx::query(
            "INSERT INTO roles (id, name, active, metadata, created_at) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(role.id)
        .bind(&role.name)
        .bind(role.active)
        .bind(&role.metadata)
        .bind(role.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to create role", e))?;

        for (position, permission) in role.permissions.iter().enumerate() {
            let permission_id = upsert_permission(&mut tx, permission).await?;
            link_permission(&mut tx, role.id, permission_id, position as i32).await?;
        }

        for capability in &role.capabilities {
            let capability_id = upsert_capability(&mut tx, capability).await?;
            sqlx::query(
                "INSERT INTO role_capabilities (role_id, capability_id) VALUES ($1, $2) \
                 ON CONFLICT DO NOTHING",
            )
            .bind(role.id)
            .bind(capability_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("Failed to link role capability", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit role", e))?;

        self.find_by_name(&role.name)
            .await?
            .ok_or_else(|| warden_core::AppError::internal("Role vanished after insert"))
    }

    /// Link a permission (created on demand) to an existing role, after its current links.
    pub async fn grant_permission(&self, role_id: RoleId, permission: &Permission) -> AppResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin transaction", e))?;

        let permission_id = upsert_permission(&mut tx, permission).await?;
        let position: i32 = sqlx::query_scalar(
            "SELECT COALESCE(MAX(position) + 1, 0) FROM role_permissions WHERE role_id = $1",
        )
        .bind(role_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to compute permission position", e))?;
        link_permission(&mut tx, role_id, permission_id, position).await?;

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit permission grant", e))
    }

    /// Find a role by exact name, fully populated.
    pub async fn find_by_name(&self, name: &str) -> AppResult<Option<Role>> {
        let role = sqlx::query_as::<_, Role>(
            "SELECT id, name, active, metadata, created_at FROM roles WHERE name = $1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to find role", e))?;

        match role {
            Some(role) => {
                let mut roles = vec![role];
                self.populate(&mut roles).await?;
                Ok(roles.pop())
            }
            None => Ok(None),
        }
    }

    /// Load every role assigned to an identity, fully populated.
    pub async fn find_for_identity(&self, identity_id: IdentityId) -> AppResult<Vec<Role>> {
        let mut roles = sqlx::query_as::<_, Role>(
            "SELECT r.id, r.name, r.active, r.metadata, r.created_at FROM roles r \
             INNER JOIN identity_roles ir ON ir.role_id = r.id \
             WHERE ir.identity_id = $1 \
             ORDER BY ir.assigned_at ASC, r.name ASC",
        )
        .bind(identity_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to load roles for identity", e))?;

        self.populate(&mut roles).await?;
        debug!(identity_id = %identity_id, roles = roles.len(), "Loaded roles for identity");
        Ok(roles)
    }

    /// Assign a role to an identity. Assigning twice is a no-op.
    pub async fn assign(&self, identity_id: IdentityId, role_id: RoleId) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO identity_roles (identity_id, role_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(identity_id)
        .bind(role_id)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to assign role", e))?;
        Ok(())
    }

    /// Set the active flag of a role. Returns `true` if a row changed.
    pub async fn set_role_active(&self, name: &str, active: bool) -> AppResult<bool> {
        let result = sqlx::query("UPDATE roles SET active = $2 WHERE name = $1")
            .bind(name)
            .bind(active)
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("Failed to update role status", e))?;
        Ok(result.rows_affected() > 0)
    }

    /// Set the active flag of a permission node. Links are untouched.
    pub async fn set_permission_active(&self, name: &str, active: bool) -> AppResult<bool> {
        let result = sqlx::query("UPDATE permissions SET active = $2 WHERE name = $1")
            .bind(name)
            .bind(active)
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("Failed to update permission status", e))?;
        Ok(result.rows_affected() > 0)
    }

    /// Fill in the permission and capability collections of `roles`.
    async fn populate(&self, roles: &mut [Role]) -> AppResult<()> {
        if roles.is_empty() {
            return Ok(());
        }
        let role_ids: Vec<Uuid> = roles.iter().map(|r| r.id.into_uuid()).collect();

        let linked = sqlx::query_as::<_, LinkedPermission>(
            "SELECT rp.role_id, p.id, p.name, p.description, p.active \
             FROM role_permissions rp \
             INNER JOIN permissions p ON p.id = rp.permission_id \
             WHERE rp.role_id = ANY($1) \
             ORDER BY rp.position ASC",
        )
        .bind(&role_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to load role permissions", e))?;

        let permission_ids: Vec<Uuid> = linked
            .iter()
            .map(|l| l.permission.id.into_uuid())
            .collect();
        let permission_caps = self
            .linked_capabilities(
                "SELECT pc.permission_id AS owner_id, c.id, c.name, c.description, c.active \
                 FROM permission_capabilities pc \
                 INNER JOIN capabilities c ON c.id = pc.capability_id \
                 WHERE pc.permission_id = ANY($1) \
                 ORDER BY c.name ASC",
                &permission_ids,
            )
            .await?;
        let mut role_caps = self
            .linked_capabilities(
                "SELECT rc.role_id AS owner_id, c.id, c.name, c.description, c.active \
                 FROM role_capabilities rc \
                 INNER JOIN capabilities c ON c.id = rc.capability_id \
                 WHERE rc.role_id = ANY($1) \
                 ORDER BY c.name ASC",
                &role_ids,
            )
            .await?;

        let mut by_role: HashMap<RoleId, Vec<Permission>> = HashMap::new();
        for LinkedPermission {
            role_id,
            mut permission,
        } in linked
        {
            // Shared permission nodes appear once per linking role.
            permission.capabilities = permission_caps
                .get(permission.id.as_uuid())
                .cloned()
                .unwrap_or_default();
            by_role.entry(role_id).or_default().push(permission);
        }

        for role in roles.iter_mut() {
            role.permissions = by_role.remove(&role.id).unwrap_or_default();
            role.capabilities = role_caps.remove(role.id.as_uuid()).unwrap_or_default();
        }
        Ok(())
    }

    async fn linked_capabilities(
        &self,
        sql: &'static str,
        owner_ids: &[Uuid],
    ) -> AppResult<HashMap<Uuid, Vec<Capability>>> {
        if owner_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows = sqlx::query_as::<_, LinkedCapability>(sql)
            .bind(owner_ids)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_error("Failed to load capabilities", e))?;

        let mut grouped: HashMap<Uuid, Vec<Capability>> = HashMap::new();
        for row in rows {
            grouped.entry(row.owner_id).or_default().push(row.capability);
        }
        Ok(grouped)
    }
}

async fn upsert_permission(
    tx: &mut Transaction<'_, Postgres>,
    permission: &Permission,
) -> AppResult<PermissionId> {
    let permission_id: PermissionId = sqlx::query_scalar(
        "INSERT INTO permissions (id, name, description, active) VALUES ($1, $2, $3, $4) \
         ON CONFLICT (name) DO UPDATE SET \
         description = COALESCE(EXCLUDED.description, permissions.description) \
         RETURNING id",
    )
    .bind(permission.id)
    .bind(&permission.name)
    .bind(&permission.description)
    .bind(permission.active)
    .fetch_one(&mut **tx)
    .await
    .map_err(|e| db_error("Failed to save permission", e))?;

    for capability in &permission.capabilities {
        let capability_id = upsert_capability(tx, capability).await?;
        sqlx::query(
            "INSERT INTO permission_capabilities (permission_id, capability_id) VALUES ($1, $2) \
             ON CONFLICT DO NOTHING",
        )
        .bind(permission_id)
        .bind(capability_id)
        .execute(&mut **tx)
        .await
        .map_err(|e| db_error("Failed to link permission capability", e))?;
    }

    Ok(permission_id)
}

async fn upsert_capability(
    tx: &mut Transaction<'_, Postgres>,
    capability: &Capability,
) -> AppResult<CapabilityId> {
    sqlx::query_scalar(
        "INSERT INTO capabilities (id, name, description, active) VALUES ($1, $2, $3, $4) \
         ON CONFLICT (name) DO UPDATE SET \
         description = COALESCE(EXCLUDED.description, capabilities.description) \
         RETURNING id",
    )
    .bind(capability.id)
    .bind(&capability.name)
    .bind(&capability.description)
    .bind(capability.active)
    .fetch_one(&mut **tx)
    .await
    .map_err(|e| db_error("Failed to save capability", e))
}

async fn link_permission(
    tx: &mut Transaction<'_, Postgres>,
    role_id: RoleId,
    permission_id: PermissionId,
    position: i32,
) -> AppResult<()> {
    sqlx::query(
        "INSERT INTO role_permissions (role_id, permission_id, position) VALUES ($1, $2, $3) \
         ON CONFLICT DO NOTHING",
    )
    .bind(role_id)
    .bind(permission_id)
    .bind(position)
    .execute(&mut **tx)
    .await
    .map_err(|e| db_error("Failed to link role permission", e))?;
    Ok(())
}

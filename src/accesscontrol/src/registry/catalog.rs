//! Role catalog definition and the catalog shipped with the crate

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::Result;
use crate::evaluator::concat_permissions;
use crate::types::{BuiltinRole, Permission, Role, RoleName};

/// Namespace every catalog role name must start with
pub const ROLE_NAMESPACE: &str = "gatekeep:roles:";

// Actions
pub const ACTION_USERS_READ: &str = "users:read";
pub const ACTION_USERS_WRITE: &str = "users:write";
pub const ACTION_USERS_TEAM_READ: &str = "users.teams:read";
pub const ACTION_USERS_AUTH_TOKEN_LIST: &str = "users.authtoken:list";
pub const ACTION_USERS_AUTH_TOKEN_UPDATE: &str = "users.authtoken:update";
pub const ACTION_USERS_PASSWORD_UPDATE: &str = "users.password:update";
pub const ACTION_USERS_DELETE: &str = "users:delete";
pub const ACTION_USERS_CREATE: &str = "users:create";
pub const ACTION_USERS_ENABLE: &str = "users:enable";
pub const ACTION_USERS_DISABLE: &str = "users:disable";
pub const ACTION_USERS_PERMISSIONS_UPDATE: &str = "users.permissions:update";
pub const ACTION_USERS_LOGOUT: &str = "users:logout";
pub const ACTION_USERS_QUOTAS_LIST: &str = "users.quotas:list";
pub const ACTION_USERS_QUOTAS_UPDATE: &str = "users.quotas:update";

pub const ACTION_ORG_USERS_READ: &str = "org.users:read";
pub const ACTION_ORG_USERS_ADD: &str = "org.users:add";
pub const ACTION_ORG_USERS_REMOVE: &str = "org.users:remove";
pub const ACTION_ORG_USERS_ROLE_UPDATE: &str = "org.users.role:update";

pub const ACTION_LDAP_USERS_READ: &str = "ldap.user:read";
pub const ACTION_LDAP_USERS_SYNC: &str = "ldap.user:sync";
pub const ACTION_LDAP_STATUS_READ: &str = "ldap.status:read";
pub const ACTION_LDAP_CONFIG_RELOAD: &str = "ldap.config:reload";

pub const ACTION_DASHBOARDS_READ: &str = "dashboards:read";
pub const ACTION_DASHBOARDS_CREATE: &str = "dashboards:create";
pub const ACTION_DASHBOARDS_WRITE: &str = "dashboards:write";
pub const ACTION_DASHBOARDS_DELETE: &str = "dashboards:delete";

pub const ACTION_DATASOURCES_READ: &str = "datasources:read";
pub const ACTION_DATASOURCES_QUERY: &str = "datasources:query";
pub const ACTION_DATASOURCES_WRITE: &str = "datasources:write";

// Scopes
pub const SCOPE_ALL: &str = "*";
pub const SCOPE_GLOBAL_USERS_ALL: &str = "global:users:*";
pub const SCOPE_USERS_ALL: &str = "users:*";
pub const SCOPE_USERS_SELF: &str = "users:self";
pub const SCOPE_DASHBOARDS_ALL: &str = "dashboards:*";
pub const SCOPE_DATASOURCES_ALL: &str = "datasources:*";

// Roles
pub const USERS_ADMIN_READ: &str = "gatekeep:roles:users:admin:read";
pub const USERS_ADMIN_EDIT: &str = "gatekeep:roles:users:admin:edit";
pub const USERS_ORG_READ: &str = "gatekeep:roles:users:org:read";
pub const USERS_ORG_EDIT: &str = "gatekeep:roles:users:org:edit";
pub const LDAP_ADMIN_READ: &str = "gatekeep:roles:ldap:admin:read";
pub const LDAP_ADMIN_EDIT: &str = "gatekeep:roles:ldap:admin:edit";
pub const DASHBOARDS_READER: &str = "gatekeep:roles:dashboards:reader";
pub const DASHBOARDS_WRITER: &str = "gatekeep:roles:dashboards:writer";
pub const DATASOURCES_READER: &str = "gatekeep:roles:datasources:reader";
pub const DATASOURCES_WRITER: &str = "gatekeep:roles:datasources:writer";

/// Serializable role catalog: role definitions plus the built-in grant table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleCatalog {
    /// Role definitions
    #[serde(default)]
    pub roles: Vec<Role>,

    /// Built-in role to granted role names, each list sorted ascending
    #[serde(default)]
    pub grants: BTreeMap<BuiltinRole, Vec<RoleName>>,
}

impl RoleCatalog {
    /// Parse a catalog from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize the catalog to pretty JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Catalog shipped with the crate
    pub fn builtin() -> Self {
        let users_admin_read = perms(
            &[
                ACTION_USERS_READ,
                ACTION_USERS_TEAM_READ,
                ACTION_USERS_AUTH_TOKEN_LIST,
                ACTION_USERS_QUOTAS_LIST,
            ],
            SCOPE_GLOBAL_USERS_ALL,
        );
        let users_admin_edit = concat_permissions(&[
            users_admin_read.clone(),
            perms(
                &[
                    ACTION_USERS_PASSWORD_UPDATE,
                    ACTION_USERS_CREATE,
                    ACTION_USERS_WRITE,
                    ACTION_USERS_DELETE,
                    ACTION_USERS_ENABLE,
                    ACTION_USERS_DISABLE,
                    ACTION_USERS_PERMISSIONS_UPDATE,
                    ACTION_USERS_LOGOUT,
                    ACTION_USERS_AUTH_TOKEN_UPDATE,
                    ACTION_USERS_QUOTAS_UPDATE,
                ],
                SCOPE_GLOBAL_USERS_ALL,
            ),
        ]);

        let users_org_read = perms(&[ACTION_ORG_USERS_READ], SCOPE_USERS_ALL);
        let users_org_edit = concat_permissions(&[
            users_org_read.clone(),
            perms(
                &[
                    ACTION_ORG_USERS_ADD,
                    ACTION_ORG_USERS_REMOVE,
                    ACTION_ORG_USERS_ROLE_UPDATE,
                ],
                SCOPE_USERS_ALL,
            ),
        ]);

        let ldap_admin_read = perms(&[ACTION_LDAP_USERS_READ, ACTION_LDAP_STATUS_READ], SCOPE_ALL);
        let ldap_admin_edit = concat_permissions(&[
            ldap_admin_read.clone(),
            perms(&[ACTION_LDAP_USERS_SYNC, ACTION_LDAP_CONFIG_RELOAD], SCOPE_ALL),
        ]);

        let dashboards_reader = perms(&[ACTION_DASHBOARDS_READ], SCOPE_DASHBOARDS_ALL);
        let dashboards_writer = concat_permissions(&[
            dashboards_reader.clone(),
            perms(
                &[
                    ACTION_DASHBOARDS_CREATE,
                    ACTION_DASHBOARDS_WRITE,
                    ACTION_DASHBOARDS_DELETE,
                ],
                SCOPE_DASHBOARDS_ALL,
            ),
        ]);

        let datasources_reader = perms(
            &[ACTION_DATASOURCES_READ, ACTION_DATASOURCES_QUERY],
            SCOPE_DATASOURCES_ALL,
        );
        let datasources_writer = concat_permissions(&[
            datasources_reader.clone(),
            perms(&[ACTION_DATASOURCES_WRITE], SCOPE_DATASOURCES_ALL),
        ]);

        let roles = vec![
            Role::new(USERS_ADMIN_READ, 1, users_admin_read)
                .with_description("Read any user on the server"),
            Role::new(USERS_ADMIN_EDIT, 1, users_admin_edit)
                .with_description("Manage any user on the server"),
            Role::new(USERS_ORG_READ, 1, users_org_read)
                .with_description("Read users of the current organization"),
            Role::new(USERS_ORG_EDIT, 1, users_org_edit)
                .with_description("Manage users of the current organization"),
            Role::new(LDAP_ADMIN_READ, 1, ldap_admin_read)
                .with_description("Read LDAP users and status"),
            Role::new(LDAP_ADMIN_EDIT, 1, ldap_admin_edit)
                .with_description("Sync LDAP users and reload LDAP configuration"),
            Role::new(DASHBOARDS_READER, 1, dashboards_reader),
            Role::new(DASHBOARDS_WRITER, 1, dashboards_writer),
            Role::new(DATASOURCES_READER, 1, datasources_reader),
            Role::new(DATASOURCES_WRITER, 2, datasources_writer),
        ];

        let mut grants = BTreeMap::new();
        grants.insert(BuiltinRole::Viewer, names(&[DASHBOARDS_READER]));
        grants.insert(
            BuiltinRole::Editor,
            names(&[DASHBOARDS_WRITER, DATASOURCES_READER]),
        );
        grants.insert(
            BuiltinRole::Admin,
            names(&[DATASOURCES_WRITER, USERS_ORG_EDIT, USERS_ORG_READ]),
        );
        grants.insert(
            BuiltinRole::ServerAdmin,
            names(&[LDAP_ADMIN_EDIT, LDAP_ADMIN_READ, USERS_ADMIN_EDIT, USERS_ADMIN_READ]),
        );

        Self { roles, grants }
    }
}

fn perms(actions: &[&str], scope: &str) -> Vec<Permission> {
    actions.iter().map(|action| Permission::new(*action, scope)).collect()
}

fn names(roles: &[&str]) -> Vec<RoleName> {
    roles.iter().map(|name| name.to_string()).collect()
}

//! Core access control types

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Action identifier (e.g. "dashboards:read")
pub type ActionName = String;

/// Fully namespaced role name (e.g. "gatekeep:roles:users:org:read")
pub type RoleName = String;

/// A single grant: an action allowed on a scope or scope pattern
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Permission {
    /// Action being granted
    pub action: ActionName,

    /// Concrete scope (`dashboards:uid:abc`) or granting pattern (`dashboards:*`, `*`)
    pub scope: String,
}

impl Permission {
    /// Create a new permission
    pub fn new(action: impl Into<String>, scope: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            scope: scope.into(),
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} on {}", self.action, self.scope)
    }
}

/// Named, versioned bundle of permissions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    /// Globally unique, namespaced role name
    pub name: RoleName,

    /// Monotonic version, bumped whenever the permission list changes
    pub version: u32,

    /// Human readable summary
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Granted permissions, duplicates allowed
    #[serde(default)]
    pub permissions: Vec<Permission>,
}

impl Role {
    /// Create a new role
    pub fn new(name: impl Into<String>, version: u32, permissions: Vec<Permission>) -> Self {
        Self {
            name: name.into(),
            version,
            description: None,
            permissions,
        }
    }

    /// Attach a description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Organization role assigned directly to a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OrgRole {
    Viewer,
    Editor,
    Admin,
}

impl OrgRole {
    /// Roles whose capabilities this role includes, highest first
    pub fn children(self) -> &'static [OrgRole] {
        match self {
            OrgRole::Admin => &[OrgRole::Editor, OrgRole::Viewer],
            OrgRole::Editor => &[OrgRole::Viewer],
            OrgRole::Viewer => &[],
        }
    }

    /// Canonical name
    pub fn as_str(self) -> &'static str {
        match self {
            OrgRole::Viewer => "Viewer",
            OrgRole::Editor => "Editor",
            OrgRole::Admin => "Admin",
        }
    }
}

impl fmt::Display for OrgRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrgRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Viewer" => Ok(OrgRole::Viewer),
            "Editor" => Ok(OrgRole::Editor),
            "Admin" => Ok(OrgRole::Admin),
            other => Err(format!("unknown organization role '{}'", other)),
        }
    }
}

/// Built-in role identifier used as a key of the grant table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BuiltinRole {
    Viewer,
    Editor,
    Admin,
    #[serde(rename = "Server Admin")]
    ServerAdmin,
}

impl BuiltinRole {
    /// Canonical name, as used in catalogs
    pub fn as_str(self) -> &'static str {
        match self {
            BuiltinRole::Viewer => "Viewer",
            BuiltinRole::Editor => "Editor",
            BuiltinRole::Admin => "Admin",
            BuiltinRole::ServerAdmin => "Server Admin",
        }
    }
}

impl From<OrgRole> for BuiltinRole {
    fn from(role: OrgRole) -> Self {
        match role {
            OrgRole::Viewer => BuiltinRole::Viewer,
            OrgRole::Editor => BuiltinRole::Editor,
            OrgRole::Admin => BuiltinRole::Admin,
        }
    }
}

impl fmt::Display for BuiltinRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Authenticated user on whose behalf a request is evaluated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Numeric user id
    pub user_id: i64,

    /// Login name, used in audit output
    pub login: String,

    /// Organization the request is made in
    #[serde(default)]
    pub org_id: i64,

    /// Role within that organization
    pub org_role: OrgRole,

    /// Server-wide administrator flag
    #[serde(default)]
    pub is_server_admin: bool,
}

impl Principal {
    /// Create a principal in the default organization
    pub fn new(user_id: i64, login: impl Into<String>, org_role: OrgRole) -> Self {
        Self {
            user_id,
            login: login.into(),
            org_id: 1,
            org_role,
            is_server_admin: false,
        }
    }

    /// Mark the principal as server administrator
    pub fn with_server_admin(mut self) -> Self {
        self.is_server_admin = true;
        self
    }

    /// Move the principal to another organization
    pub fn with_org(mut self, org_id: i64) -> Self {
        self.org_id = org_id;
        self
    }
}

/// Request-scoped template bindings (path parameters and the like)
///
/// Built fresh for every request and never stored on the [`Principal`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestParams(HashMap<String, String>);

impl RequestParams {
    /// Empty parameter set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a binding
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// Builder-style [`RequestParams::insert`]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Look up a binding
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<HashMap<String, String>> for RequestParams {
    fn from(map: HashMap<String, String>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RequestParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_org_role_children() {
        assert_eq!(OrgRole::Admin.children(), &[OrgRole::Editor, OrgRole::Viewer]);
        assert_eq!(OrgRole::Editor.children(), &[OrgRole::Viewer]);
        assert!(OrgRole::Viewer.children().is_empty());
    }

    #[test]
    fn test_org_role_parsing() {
        assert_eq!("Editor".parse::<OrgRole>().unwrap(), OrgRole::Editor);
        assert!("editor".parse::<OrgRole>().is_err());
    }

    #[test]
    fn test_builtin_role_serde_names() {
        let json = serde_json::to_string(&BuiltinRole::ServerAdmin).unwrap();
        assert_eq!(json, "\"Server Admin\"");

        let role: BuiltinRole = serde_json::from_str("\"Admin\"").unwrap();
        assert_eq!(role, BuiltinRole::Admin);
        assert_eq!(BuiltinRole::from(OrgRole::Viewer), BuiltinRole::Viewer);
    }

    #[test]
    fn test_principal_creation() {
        let user = Principal::new(42, "alice", OrgRole::Editor)
            .with_org(3)
            .with_server_admin();

        assert_eq!(user.user_id, 42);
        assert_eq!(user.org_id, 3);
        assert!(user.is_server_admin);
    }

    #[test]
    fn test_request_params() {
        let params: RequestParams = [("uid", "abc123")].into_iter().collect();
        assert_eq!(params.get("uid"), Some("abc123"));
        assert_eq!(params.get("id"), None);
        assert_eq!(params.len(), 1);
    }
}

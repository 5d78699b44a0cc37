//! Role registry
//!
//! Immutable mapping of role name to [`Role`] plus the built-in role grant
//! table. A registry is built once from a [`RoleCatalog`] and then shared
//! read-only between request handlers; it needs no locking.
//!
//! # Example
//!
//! ```rust
//! use gatekeep_accesscontrol::registry::{RoleCatalog, RoleRegistry};
//! use gatekeep_accesscontrol::BuiltinRole;
//!
//! # fn example() -> gatekeep_accesscontrol::Result<()> {
//! let (registry, warnings) = RoleRegistry::load(RoleCatalog::builtin())?;
//! assert!(warnings.is_empty());
//!
//! for name in registry.granted_roles(BuiltinRole::Admin) {
//!     assert!(registry.lookup(name).is_some());
//! }
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod shared;

pub use catalog::{RoleCatalog, ROLE_NAMESPACE};
pub use shared::SharedRegistry;

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::{AccessControlError, Result};
use crate::scope::ScopePattern;
use crate::types::{BuiltinRole, Permission, Role, RoleName};

/// Source of roles and grants consulted during evaluation
///
/// The in-memory [`RoleRegistry`] never fails. Externally backed sources
/// report infrastructure failures as [`AccessControlError::RegistryLookup`].
pub trait RoleSource: Send + Sync {
    /// Look up a role by name
    fn role(&self, name: &str) -> Result<Option<Arc<Role>>>;

    /// Role names granted to a built-in role
    fn grants(&self, builtin: BuiltinRole) -> Result<Vec<RoleName>>;

    /// Permissions granted through `builtins`, in role then permission order
    ///
    /// Grants and roles must come from the same version of the data. Sources
    /// that can be replaced at runtime override this to answer from a single
    /// snapshot. Dangling grants are skipped.
    fn permissions_for(&self, builtins: &[BuiltinRole]) -> Result<Vec<Permission>> {
        let mut permissions = Vec::new();

        for &builtin in builtins {
            for name in self.grants(builtin)? {
                match self.role(&name)? {
                    Some(role) => permissions.extend(role.permissions.iter().cloned()),
                    None => debug!("Skipping unknown role '{}' granted to {}", name, builtin),
                }
            }
        }

        Ok(permissions)
    }
}

/// Non-fatal catalog problem reported by [`RoleRegistry::load`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogWarning {
    /// Grant table references a role that does not exist; skipped at evaluation
    DanglingGrant { builtin: BuiltinRole, role: RoleName },
    /// Grant list is not sorted ascending
    UnsortedGrants { builtin: BuiltinRole },
}

impl fmt::Display for CatalogWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DanglingGrant { builtin, role } => {
                write!(f, "built-in role '{}' grants unknown role '{}'", builtin, role)
            }
            Self::UnsortedGrants { builtin } => {
                write!(f, "grant list of built-in role '{}' is not sorted", builtin)
            }
        }
    }
}

/// Immutable role registry and grant table
#[derive(Debug, Clone, Default)]
pub struct RoleRegistry {
    roles: HashMap<RoleName, Arc<Role>>,
    grants: BTreeMap<BuiltinRole, Vec<RoleName>>,
}

impl RoleRegistry {
    /// Registry without roles or grants
    pub fn empty() -> Self {
        Self::default()
    }

    /// Registry loaded from the catalog shipped with the crate
    pub fn builtin() -> Result<Self> {
        Self::load(RoleCatalog::builtin()).map(|(registry, _)| registry)
    }

    /// Validate a catalog and build a registry from it
    ///
    /// Fatal problems (unnamespaced names, version 0, duplicate names, empty
    /// actions, malformed scopes) reject the whole catalog. Dangling and
    /// unsorted grants are returned as warnings; dangling names stay in the
    /// table and are skipped when permissions are collected.
    pub fn load(catalog: RoleCatalog) -> Result<(Self, Vec<CatalogWarning>)> {
        let mut roles = HashMap::with_capacity(catalog.roles.len());

        for role in catalog.roles {
            validate_role(&role)?;

            if roles.contains_key(&role.name) {
                return Err(AccessControlError::InvalidCatalog(format!(
                    "duplicate role '{}'",
                    role.name
                )));
            }
            roles.insert(role.name.clone(), Arc::new(role));
        }

        let mut warnings = Vec::new();
        for (builtin, granted) in &catalog.grants {
            if !granted.windows(2).all(|pair| pair[0] <= pair[1]) {
                warnings.push(CatalogWarning::UnsortedGrants { builtin: *builtin });
            }

            let mut seen = HashSet::new();
            for name in granted {
                if !roles.contains_key(name) && seen.insert(name) {
                    warnings.push(CatalogWarning::DanglingGrant {
                        builtin: *builtin,
                        role: name.clone(),
                    });
                }
            }
        }

        for warning in &warnings {
            warn!("Role catalog: {}", warning);
        }

        info!(
            "Role registry loaded: {} roles, {} grant entries, {} warnings",
            roles.len(),
            catalog.grants.len(),
            warnings.len()
        );

        Ok((
            Self {
                roles,
                grants: catalog.grants,
            },
            warnings,
        ))
    }

    /// Look up a role by name
    pub fn lookup(&self, name: &str) -> Option<&Arc<Role>> {
        self.roles.get(name)
    }

    /// Role names granted to a built-in role, as declared in the catalog
    pub fn granted_roles(&self, builtin: BuiltinRole) -> &[RoleName] {
        self.grants.get(&builtin).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The full grant table
    pub fn grant_table(&self) -> &BTreeMap<BuiltinRole, Vec<RoleName>> {
        &self.grants
    }

    /// All role names, sorted
    pub fn role_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.roles.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }
}

impl RoleSource for RoleRegistry {
    fn role(&self, name: &str) -> Result<Option<Arc<Role>>> {
        Ok(self.lookup(name).cloned())
    }

    fn grants(&self, builtin: BuiltinRole) -> Result<Vec<RoleName>> {
        Ok(self.granted_roles(builtin).to_vec())
    }
}

fn validate_role(role: &Role) -> Result<()> {
    if !role.name.starts_with(ROLE_NAMESPACE) || role.name.len() == ROLE_NAMESPACE.len() {
        return Err(AccessControlError::InvalidCatalog(format!(
            "role '{}' must be prefixed by '{}'",
            role.name, ROLE_NAMESPACE
        )));
    }

    if role.version == 0 {
        return Err(AccessControlError::InvalidCatalog(format!(
            "role '{}' must have a non-zero version",
            role.name
        )));
    }

    for permission in &role.permissions {
        if permission.action.is_empty() {
            return Err(AccessControlError::InvalidCatalog(format!(
                "role '{}' has a permission without action",
                role.name
            )));
        }

        ScopePattern::parse(&permission.scope).map_err(|e| {
            AccessControlError::InvalidCatalog(format!(
                "role '{}' grants '{}' on invalid scope '{}': {}",
                role.name, permission.action, permission.scope, e
            ))
        })?;
    }

    Ok(())
}

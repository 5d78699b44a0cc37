//! Copy-on-write registry handle
//!
//! Lets a host swap in a new role catalog at runtime. Readers take a
//! snapshot `Arc` and keep evaluating against it; a replacement becomes
//! visible to the next snapshot only, never half-way through a read.

use parking_lot::RwLock;
use std::sync::Arc;
use tracing::info;

use super::{CatalogWarning, RoleCatalog, RoleRegistry, RoleSource};
use crate::error::Result;
use crate::types::{BuiltinRole, Permission, Role, RoleName};

/// Shared, replaceable [`RoleRegistry`]
#[derive(Debug)]
pub struct SharedRegistry {
    current: RwLock<Arc<RoleRegistry>>,
}

impl SharedRegistry {
    pub fn new(registry: RoleRegistry) -> Self {
        Self {
            current: RwLock::new(Arc::new(registry)),
        }
    }

    /// Current registry snapshot
    pub fn snapshot(&self) -> Arc<RoleRegistry> {
        self.current.read().clone()
    }

    /// Swap the whole registry, returning the previous snapshot
    pub fn replace(&self, registry: RoleRegistry) -> Arc<RoleRegistry> {
        let roles = registry.len();
        let previous = std::mem::replace(&mut *self.current.write(), Arc::new(registry));
        info!("Role registry replaced ({} roles)", roles);
        previous
    }

    /// Validate a catalog and, if it loads, swap it in
    ///
    /// On error the current registry stays in place.
    pub fn reload(&self, catalog: RoleCatalog) -> Result<Vec<CatalogWarning>> {
        let (registry, warnings) = RoleRegistry::load(catalog)?;
        self.replace(registry);
        Ok(warnings)
    }
}

impl RoleSource for SharedRegistry {
    fn role(&self, name: &str) -> Result<Option<Arc<Role>>> {
        self.snapshot().role(name)
    }

    fn grants(&self, builtin: BuiltinRole) -> Result<Vec<RoleName>> {
        self.snapshot().grants(builtin)
    }

    fn permissions_for(&self, builtins: &[BuiltinRole]) -> Result<Vec<Permission>> {
        self.snapshot().permissions_for(builtins)
    }
}

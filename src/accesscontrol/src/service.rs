//! Role based access control service
//!
//! Ties the principal role resolver, the role source and the evaluator
//! together behind the [`AccessControl`] trait consumed by the request gate.
//!
//! ```text
//! Principal → roles_for → RoleSource::permissions_for (one snapshot) → permissions
//!                                                                           ↓
//!                                       (action, scopes) → evaluator::evaluate → bool
//! ```

use std::sync::Arc;
use tracing::debug;

use crate::config::AccessControlConfig;
use crate::error::Result;
use crate::evaluator;
use crate::registry::{RoleRegistry, RoleSource};
use crate::resolver;
use crate::scope::MissingParamPolicy;
use crate::types::{BuiltinRole, Permission, Principal};

/// Access control decision point
pub trait AccessControl: Send + Sync {
    /// When true the request gate bypasses evaluation and allows everything
    fn is_disabled(&self) -> bool;

    /// Whether `user` may perform `action` on any of the concrete `scopes`
    ///
    /// `Ok(false)` is a denial; `Err` is an internal failure.
    fn evaluate(&self, user: &Principal, action: &str, scopes: &[String]) -> Result<bool>;

    /// Every permission granted to `user`, in role then permission order
    fn user_permissions(&self, user: &Principal) -> Result<Vec<Permission>>;

    /// Effective built-in roles of `user`
    fn user_builtin_roles(&self, user: &Principal) -> Vec<BuiltinRole> {
        resolver::roles_for(user)
    }

    /// Template policy to apply when rendering requested scopes
    fn missing_param_policy(&self) -> MissingParamPolicy {
        MissingParamPolicy::Fail
    }
}

/// [`AccessControl`] backed by a [`RoleSource`]
pub struct RbacService {
    source: Arc<dyn RoleSource>,
    config: AccessControlConfig,
}

impl RbacService {
    pub fn new(source: Arc<dyn RoleSource>, config: AccessControlConfig) -> Self {
        Self { source, config }
    }

    /// Service over the catalog shipped with the crate
    pub fn builtin(config: AccessControlConfig) -> Result<Self> {
        Ok(Self::new(Arc::new(RoleRegistry::builtin()?), config))
    }

    pub fn config(&self) -> &AccessControlConfig {
        &self.config
    }
}

impl AccessControl for RbacService {
    fn is_disabled(&self) -> bool {
        !self.config.enabled
    }

    fn evaluate(&self, user: &Principal, action: &str, scopes: &[String]) -> Result<bool> {
        let permissions = self.user_permissions(user)?;
        let allowed = evaluator::evaluate(&permissions, action, scopes);

        debug!(
            "Evaluated user_id={} action={} scopes={:?}: {}",
            user.user_id,
            action,
            scopes,
            if allowed { "ALLOW" } else { "DENY" }
        );

        Ok(allowed)
    }

    fn user_permissions(&self, user: &Principal) -> Result<Vec<Permission>> {
        self.source.permissions_for(&self.user_builtin_roles(user))
    }

    fn missing_param_policy(&self) -> MissingParamPolicy {
        self.config.missing_param
    }
}

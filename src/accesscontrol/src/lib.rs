//! # Gatekeep Access Control
//!
//! Role based access control evaluation engine.
//!
//! ## Features
//!
//! - **Immutable role registry** built once from a versioned, validated catalog
//! - **Built-in role grants** with organization role inheritance
//! - **Scope templates** rendered per request from path parameters
//! - **Hierarchical wildcards** (`dashboards:*`, `*`) in granted scopes
//! - **Request gate** with an axum middleware binding and a fail-open switch
//!
//! ## Example
//!
//! ```rust
//! use gatekeep_accesscontrol::{
//!     AccessControl, AccessControlConfig, OrgRole, Principal, RbacService, RequestParams,
//! };
//! use gatekeep_accesscontrol::scope::{resolve, MissingParamPolicy};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let service = RbacService::builtin(AccessControlConfig::enabled())?;
//!     let user = Principal::new(1, "alice", OrgRole::Admin);
//!
//!     let params = RequestParams::new().with("uid", "abc123");
//!     let scope = resolve("dashboards:uid:{uid}", &params, MissingParamPolicy::Fail)?;
//!
//!     if service.evaluate(&user, "dashboards:read", &[scope])? {
//!         println!("Access granted!");
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod types;
pub mod error;
pub mod config;
pub mod registry;
pub mod resolver;
pub mod scope;
pub mod evaluator;
pub mod service;
pub mod middleware;

// Re-export commonly used types
pub use types::{BuiltinRole, OrgRole, Permission, Principal, RequestParams, Role};
pub use error::{AccessControlError, Result};
pub use config::AccessControlConfig;
pub use registry::{CatalogWarning, RoleCatalog, RoleRegistry, RoleSource, SharedRegistry};
pub use scope::{MissingParamPolicy, ScopePattern, ScopeTemplate, TemplateError};
pub use service::{AccessControl, RbacService};
pub use middleware::{enforce, Gate, GateOutcome, Guard, PermissionRule};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! Scope matching and scope templates
//!
//! Granted scopes are either concrete (`dashboards:uid:abc`), prefix
//! wildcards (`dashboards:*`) or the bare wildcard `*`. Requested scopes
//! are declared as templates (`dashboards:uid:{uid}`) and rendered per
//! request from the request parameters.
//!
//! # Examples
//!
//! ```
//! use gatekeep_accesscontrol::scope::{self, MissingParamPolicy, ScopeTemplate};
//! use gatekeep_accesscontrol::RequestParams;
//!
//! let template = ScopeTemplate::parse("dashboards:uid:{uid}").unwrap();
//! let params = RequestParams::new().with("uid", "abc123");
//! let requested = template.render(&params, MissingParamPolicy::Fail).unwrap();
//!
//! assert_eq!(requested, "dashboards:uid:abc123");
//! assert!(scope::matches("dashboards:*", &requested));
//! assert!(!scope::matches("datasources:*", &requested));
//! ```

mod types;
mod template;
mod cache;


pub use types::{matches, ScopeError, ScopePattern, ScopeResult, SCOPE_DELIMITER, WILDCARD};
pub use template::{resolve, MissingParamPolicy, ScopeTemplate, TemplateError};
pub use cache::{CacheStats, TemplateCache};

//! Principal role resolution
//!
//! The effective built-in roles of a principal are its organization role,
//! then the roles that organization role includes, then `ServerAdmin` when
//! the principal is a server administrator. Computed per evaluation.

use crate::types::{BuiltinRole, Principal};

/// Effective built-in roles of a principal, in evaluation order
pub fn roles_for(principal: &Principal) -> Vec<BuiltinRole> {
    let children = principal.org_role.children();
    let mut roles = Vec::with_capacity(children.len() + 2);

    roles.push(BuiltinRole::from(principal.org_role));
    roles.extend(children.iter().copied().map(BuiltinRole::from));

    if principal.is_server_admin {
        roles.push(BuiltinRole::ServerAdmin);
    }

    roles
}

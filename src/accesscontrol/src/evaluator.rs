//! Permission evaluation
//!
//! Pure functions over a permission list. The service layer collects the
//! principal's permissions and hands them here.

use std::collections::BTreeSet;

use crate::scope;
use crate::types::Permission;

/// Distinct scopes granted for `action`, sorted
pub fn granted_scopes<'a>(permissions: &'a [Permission], action: &str) -> BTreeSet<&'a str> {
    permissions
        .iter()
        .filter(|p| p.action == action)
        .map(|p| p.scope.as_str())
        .collect()
}

/// Decide whether `permissions` allow `action` on any of `scopes`
///
/// Without requested scopes, holding the action is enough. Otherwise one
/// granted scope covering one requested scope is sufficient.
pub fn evaluate<S: AsRef<str>>(permissions: &[Permission], action: &str, scopes: &[S]) -> bool {
    let granted = granted_scopes(permissions, action);
    if granted.is_empty() {
        return false;
    }

    if scopes.is_empty() {
        return true;
    }

    scopes.iter().any(|requested| {
        granted
            .iter()
            .any(|pattern| scope::matches(pattern, requested.as_ref()))
    })
}

/// Concatenate permission lists, keeping order and duplicates
pub fn concat_permissions(sets: &[Vec<Permission>]) -> Vec<Permission> {
    let total = sets.iter().map(Vec::len).sum();
    let mut out = Vec::with_capacity(total);
    for set in sets {
        out.extend(set.iter().cloned());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_concat_permissions() {
        let perms1 = vec![Permission::new("test", "test:*"), Permission::new("test1", "test1:*")];
        let perms2 = vec![Permission::new("test1", "*")];

        let perms = concat_permissions(&[perms1, perms2]);

        let expected = vec![
            Permission::new("test", "test:*"),
            Permission::new("test1", "test1:*"),
            Permission::new("test1", "*"),
        ];
        assert_eq!(perms.len(), expected.len());
        for permission in &expected {
            assert!(perms.contains(permission), "missing {}", permission);
        }
    }

    #[test]
    fn test_concat_keeps_duplicates() {
        let perms = vec![Permission::new("a", "x:*")];
        let all = concat_permissions(&[perms.clone(), perms]);
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn test_action_must_match() {
        let perms = vec![Permission::new("dashboards:read", "*")];
        assert!(evaluate(&perms, "dashboards:read", &["dashboards:uid:a"]));
        assert!(!evaluate(&perms, "dashboards:write", &["dashboards:uid:a"]));
    }

    #[test]
    fn test_any_scope_any_permission() {
        let perms = vec![
            Permission::new("dashboards:read", "dashboards:uid:one"),
            Permission::new("dashboards:read", "dashboards:uid:two"),
        ];

        assert!(evaluate(&perms, "dashboards:read", &["dashboards:uid:zero", "dashboards:uid:two"]));
        assert!(!evaluate(&perms, "dashboards:read", &["dashboards:uid:zero"]));
    }

    #[test]
    fn test_no_requested_scopes_is_action_only() {
        let perms = vec![Permission::new("ldap.status:read", "*")];
        let none: [&str; 0] = [];

        assert!(evaluate(&perms, "ldap.status:read", &none));
        assert!(!evaluate(&perms, "ldap.config:reload", &none));
    }

    #[test]
    fn test_duplicates_do_not_change_verdict() {
        let single = vec![Permission::new("users:read", "users:self")];
        let doubled = concat_permissions(&[single.clone(), single.clone()]);

        for requested in ["users:self", "users:2"] {
            assert_eq!(
                evaluate(&single, "users:read", &[requested]),
                evaluate(&doubled, "users:read", &[requested])
            );
        }
        assert_eq!(granted_scopes(&doubled, "users:read").len(), 1);
    }

    #[test]
    fn test_empty_permissions_deny() {
        assert!(!evaluate::<&str>(&[], "users:read", &[]));
    }
}

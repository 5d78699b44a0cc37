//! Request gate
//!
//! Runs once per inbound request: renders the route's declared scope
//! templates against the request parameters, asks the [`AccessControl`]
//! implementation for a verdict and maps it onto an outcome.
//!
//! # Example
//!
//! ```ignore
//! let gate = Arc::new(Gate::new(Arc::new(RbacService::builtin(config)?)));
//!
//! Router::new()
//!     .route("/api/dashboards/uid/:uid", get(get_dashboard))
//!     .route_layer(from_fn_with_state(
//!         gate.guard(PermissionRule::new("dashboards:read", ["dashboards:uid:{uid}"])),
//!         enforce,
//!     ));
//! ```

use axum::{
    extract::{rejection::PathRejection, Path, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::error::{AccessControlError, Result};
use crate::scope::{CacheStats, TemplateCache};
use crate::service::AccessControl;
use crate::types::{Principal, RequestParams};

/// Action plus scope templates declared for one route
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionRule {
    /// Action required
    pub action: String,

    /// Scope templates; any one rendered scope may satisfy the rule
    pub scopes: Vec<String>,
}

impl PermissionRule {
    pub fn new<I, S>(action: impl Into<String>, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            action: action.into(),
            scopes: scopes.into_iter().map(Into::into).collect(),
        }
    }

    /// Rule that only checks the action
    pub fn action(action: impl Into<String>) -> Self {
        Self::new(action, Vec::<String>::new())
    }
}

/// Result of running a request through the gate
#[derive(Debug)]
pub enum GateOutcome {
    /// Access control is disabled, nothing was evaluated
    Bypassed,
    /// The principal holds a sufficient permission
    Granted,
    /// No permission covers the request
    Denied { scopes: Vec<String> },
    /// Template or engine failure
    Failed(AccessControlError),
}

impl GateOutcome {
    /// Whether the underlying operation may proceed
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Bypassed | Self::Granted)
    }

    /// HTTP status the caller should answer with, `None` to proceed
    pub fn rejection_status(&self) -> Option<StatusCode> {
        match self {
            Self::Bypassed | Self::Granted => None,
            Self::Denied { .. } => Some(StatusCode::FORBIDDEN),
            Self::Failed(_) => Some(StatusCode::INTERNAL_SERVER_ERROR),
        }
    }
}

/// Access gate shared by every guarded route
pub struct Gate {
    ac: Arc<dyn AccessControl>,
    templates: TemplateCache,
}

impl Gate {
    pub fn new(ac: Arc<dyn AccessControl>) -> Self {
        Self {
            ac,
            templates: TemplateCache::new(),
        }
    }

    /// Whether requests pass through unevaluated
    pub fn is_disabled(&self) -> bool {
        self.ac.is_disabled()
    }

    /// Bind a rule to this gate for use as axum middleware state
    pub fn guard(self: &Arc<Self>, rule: PermissionRule) -> Guard {
        Guard {
            gate: Arc::clone(self),
            rule: Arc::new(rule),
        }
    }

    /// Render the rule's scope templates for one request
    pub fn resolve_scopes(&self, rule: &PermissionRule, params: &RequestParams) -> Result<Vec<String>> {
        let policy = self.ac.missing_param_policy();

        rule.scopes
            .iter()
            .map(|template| -> Result<String> {
                let compiled = self.templates.get_or_parse(template)?;
                Ok(compiled.render(params, policy)?)
            })
            .collect()
    }

    /// Decide one request
    pub fn check(&self, rule: &PermissionRule, user: &Principal, params: &RequestParams) -> GateOutcome {
        if self.ac.is_disabled() {
            return GateOutcome::Bypassed;
        }

        let scopes = match self.resolve_scopes(rule, params) {
            Ok(scopes) => scopes,
            Err(e) => {
                error!("Failed to resolve scopes for action {}: {}", rule.action, e);
                return GateOutcome::Failed(e);
            }
        };

        match self.ac.evaluate(user, &rule.action, &scopes) {
            Ok(true) => GateOutcome::Granted,
            Ok(false) => {
                info!(
                    user_id = user.user_id,
                    login = %user.login,
                    action = %rule.action,
                    scopes = ?scopes,
                    "Access denied"
                );
                GateOutcome::Denied { scopes }
            }
            Err(e) => {
                error!("Error from access control system: {}", e);
                GateOutcome::Failed(e)
            }
        }
    }

    /// Compiled template cache statistics
    pub fn template_stats(&self) -> CacheStats {
        self.templates.stats()
    }
}

/// Middleware state: a gate plus the rule of one route
#[derive(Clone)]
pub struct Guard {
    gate: Arc<Gate>,
    rule: Arc<PermissionRule>,
}

/// axum middleware enforcing a [`Guard`]
///
/// Use with `axum::middleware::from_fn_with_state` on `route_layer` so path
/// parameters are available. The [`Principal`] must be placed in request
/// extensions by the authentication layer. Path parameters that cannot be
/// extracted are a client error and answered with 400 before any template
/// is rendered.
pub async fn enforce(
    State(guard): State<Guard>,
    params: std::result::Result<Path<HashMap<String, String>>, PathRejection>,
    request: Request,
    next: Next,
) -> Response {
    if guard.gate.is_disabled() {
        return next.run(request).await;
    }

    let Some(user) = request.extensions().get::<Principal>().cloned() else {
        return reject(StatusCode::UNAUTHORIZED, "Unauthorized");
    };

    let params = match params {
        Ok(Path(params)) => RequestParams::from(params),
        Err(PathRejection::MissingPathParams(_)) => RequestParams::default(),
        Err(rejection) => {
            warn!(
                user_id = user.user_id,
                action = %guard.rule.action,
                "Rejecting request with malformed path parameters: {}",
                rejection.body_text()
            );
            return reject(StatusCode::BAD_REQUEST, "Bad request");
        }
    };

    let outcome = guard.gate.check(&guard.rule, &user, &params);
    match outcome.rejection_status() {
        None => next.run(request).await,
        Some(StatusCode::FORBIDDEN) => reject(StatusCode::FORBIDDEN, "Forbidden"),
        Some(status) => reject(status, "Internal server error"),
    }
}

fn reject(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AccessControlConfig;
    use crate::scope::TemplateError;
    use crate::service::RbacService;
    use crate::types::OrgRole;

    fn gate(config: AccessControlConfig) -> Gate {
        Gate::new(Arc::new(RbacService::builtin(config).unwrap()))
    }

    #[test]
    fn test_rule_construction() {
        let rule = PermissionRule::new("dashboards:read", ["dashboards:uid:{uid}"]);
        assert_eq!(rule.scopes, vec!["dashboards:uid:{uid}".to_string()]);
        assert!(PermissionRule::action("ldap.status:read").scopes.is_empty());
    }

    #[test]
    fn test_granted_and_denied() {
        let gate = gate(AccessControlConfig::enabled());
        let rule = PermissionRule::new("dashboards:write", ["dashboards:uid:{uid}"]);
        let params = RequestParams::new().with("uid", "abc");

        let editor = Principal::new(1, "editor", OrgRole::Editor);
        assert!(matches!(gate.check(&rule, &editor, &params), GateOutcome::Granted));

        let viewer = Principal::new(2, "viewer", OrgRole::Viewer);
        match gate.check(&rule, &viewer, &params) {
            GateOutcome::Denied { scopes } => assert_eq!(scopes, vec!["dashboards:uid:abc".to_string()]),
            other => panic!("expected denial, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_param_fails_instead_of_denying() {
        let gate = gate(AccessControlConfig::enabled());
        let rule = PermissionRule::new("dashboards:read", ["dashboards:uid:{uid}"]);
        let user = Principal::new(1, "viewer", OrgRole::Viewer);

        let outcome = gate.check(&rule, &user, &RequestParams::new());
        match outcome {
            GateOutcome::Failed(AccessControlError::Template(TemplateError::MissingParam { name })) => {
                assert_eq!(name, "uid")
            }
            other => panic!("expected template failure, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_template_fails() {
        let gate = gate(AccessControlConfig::enabled());
        let rule = PermissionRule::new("dashboards:read", ["dashboards:uid:{uid"]);
        let user = Principal::new(1, "viewer", OrgRole::Viewer);

        let outcome = gate.check(&rule, &user, &RequestParams::new().with("uid", "a"));
        assert_eq!(outcome.rejection_status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
    }

    #[test]
    fn test_disabled_gate_bypasses() {
        let gate = gate(AccessControlConfig::default());
        let rule = PermissionRule::new("users:delete", ["dashboards:uid:{broken"]);
        let user = Principal::new(1, "viewer", OrgRole::Viewer);

        let outcome = gate.check(&rule, &user, &RequestParams::new());
        assert!(matches!(outcome, GateOutcome::Bypassed));
        assert!(outcome.is_allowed());
        assert_eq!(gate.template_stats().misses, 0);
    }
}

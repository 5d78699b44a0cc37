/// Scope templates
///
/// A template is parsed once into an immutable [`ScopeTemplate`] and
/// rendered against fresh [`RequestParams`] on every request. Rendering is a
/// pure function of the compiled template and its inputs.
///
/// Syntax: `{name}` is replaced by the parameter `name`; `{{` and `}}`
/// produce literal braces.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::RequestParams;

/// Errors raised while parsing or rendering a scope template
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    /// `{` without a matching `}`
    #[error("unclosed placeholder starting at byte {position}")]
    Unclosed { position: usize },

    /// `}` outside a placeholder
    #[error("unexpected '}}' at byte {position}")]
    UnexpectedClose { position: usize },

    /// `{}` with no parameter name
    #[error("empty placeholder at byte {position}")]
    EmptyPlaceholder { position: usize },

    /// `{` inside a placeholder
    #[error("nested placeholder at byte {position}")]
    NestedPlaceholder { position: usize },

    /// Placeholder bound to a parameter the request does not carry
    #[error("missing template parameter '{name}'")]
    MissingParam { name: String },
}

impl TemplateError {
    /// Whether this is a syntax error (as opposed to a rendering error)
    pub fn is_parse_error(&self) -> bool {
        !matches!(self, Self::MissingParam { .. })
    }
}

/// What to do with a placeholder whose parameter is absent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingParamPolicy {
    /// Fail the resolution with [`TemplateError::MissingParam`]
    #[default]
    Fail,
    /// Substitute the empty string
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Part {
    Literal(String),
    Param(String),
}

/// Compiled scope template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeTemplate {
    raw: String,
    parts: Vec<Part>,
}

impl ScopeTemplate {
    /// Parses a template
    pub fn parse(template: &str) -> Result<Self, TemplateError> {
        let mut parts = Vec::new();
        let mut literal = String::new();
        let mut chars = template.char_indices().peekable();

        while let Some((pos, c)) = chars.next() {
            match c {
                '{' => {
                    if matches!(chars.peek(), Some((_, '{'))) {
                        chars.next();
                        literal.push('{');
                        continue;
                    }

                    let mut name = String::new();
                    let mut closed = false;
                    for (inner_pos, inner) in chars.by_ref() {
                        match inner {
                            '}' => {
                                closed = true;
                                break;
                            }
                            '{' => return Err(TemplateError::NestedPlaceholder { position: inner_pos }),
                            other => name.push(other),
                        }
                    }

                    if !closed {
                        return Err(TemplateError::Unclosed { position: pos });
                    }

                    let name = name.trim();
                    if name.is_empty() {
                        return Err(TemplateError::EmptyPlaceholder { position: pos });
                    }

                    if !literal.is_empty() {
                        parts.push(Part::Literal(std::mem::take(&mut literal)));
                    }
                    parts.push(Part::Param(name.to_string()));
                }
                '}' => {
                    if matches!(chars.peek(), Some((_, '}'))) {
                        chars.next();
                        literal.push('}');
                    } else {
                        return Err(TemplateError::UnexpectedClose { position: pos });
                    }
                }
                other => literal.push(other),
            }
        }

        if !literal.is_empty() {
            parts.push(Part::Literal(literal));
        }

        Ok(Self {
            raw: template.to_string(),
            parts,
        })
    }

    /// Renders the template against one request's parameters
    pub fn render(
        &self,
        params: &RequestParams,
        policy: MissingParamPolicy,
    ) -> Result<String, TemplateError> {
        let mut out = String::with_capacity(self.raw.len());

        for part in &self.parts {
            match part {
                Part::Literal(text) => out.push_str(text),
                Part::Param(name) => match (params.get(name), policy) {
                    (Some(value), _) => out.push_str(value),
                    (None, MissingParamPolicy::Empty) => {}
                    (None, MissingParamPolicy::Fail) => {
                        return Err(TemplateError::MissingParam { name: name.clone() });
                    }
                },
            }
        }

        Ok(out)
    }

    /// Parameter names referenced by the template, in order of appearance
    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().filter_map(|part| match part {
            Part::Param(name) => Some(name.as_str()),
            Part::Literal(_) => None,
        })
    }

    /// Whether the template contains no placeholders
    pub fn is_static(&self) -> bool {
        self.parts.iter().all(|part| matches!(part, Part::Literal(_)))
    }

    /// Source text of the template
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

/// Parses and renders a template in one step
pub fn resolve(
    template: &str,
    params: &RequestParams,
    policy: MissingParamPolicy,
) -> Result<String, TemplateError> {
    ScopeTemplate::parse(template)?.render(params, policy)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> RequestParams {
        RequestParams::new().with("uid", "abc123").with("id", "7")
    }

    #[test]
    fn test_static_template() {
        let template = ScopeTemplate::parse("users:self").unwrap();
        assert!(template.is_static());
        assert_eq!(template.render(&params(), MissingParamPolicy::Fail).unwrap(), "users:self");
    }

    #[test]
    fn test_single_placeholder() {
        let resolved = resolve("dashboards:uid:{uid}", &params(), MissingParamPolicy::Fail).unwrap();
        assert_eq!(resolved, "dashboards:uid:abc123");
    }

    #[test]
    fn test_multiple_placeholders() {
        let template = ScopeTemplate::parse("orgs:{id}:dashboards:{uid}").unwrap();
        assert_eq!(template.placeholders().collect::<Vec<_>>(), vec!["id", "uid"]);
        assert_eq!(
            template.render(&params(), MissingParamPolicy::Fail).unwrap(),
            "orgs:7:dashboards:abc123"
        );
    }

    #[test]
    fn test_escaped_braces() {
        let resolved = resolve("literal:{{uid}}:{uid}", &params(), MissingParamPolicy::Fail).unwrap();
        assert_eq!(resolved, "literal:{uid}:abc123");
    }

    #[test]
    fn test_placeholder_whitespace_is_trimmed() {
        let resolved = resolve("dashboards:uid:{ uid }", &params(), MissingParamPolicy::Fail).unwrap();
        assert_eq!(resolved, "dashboards:uid:abc123");
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            ScopeTemplate::parse("dashboards:{uid").unwrap_err(),
            TemplateError::Unclosed { position: 11 }
        );
        assert_eq!(
            ScopeTemplate::parse("dashboards:uid}").unwrap_err(),
            TemplateError::UnexpectedClose { position: 14 }
        );
        assert_eq!(
            ScopeTemplate::parse("dashboards:{}").unwrap_err(),
            TemplateError::EmptyPlaceholder { position: 11 }
        );
        assert_eq!(
            ScopeTemplate::parse("dashboards:{a{b}}").unwrap_err(),
            TemplateError::NestedPlaceholder { position: 13 }
        );
    }

    #[test]
    fn test_missing_param_fail_policy() {
        let err = resolve("dashboards:uid:{uid}", &RequestParams::new(), MissingParamPolicy::Fail)
            .unwrap_err();
        assert_eq!(err, TemplateError::MissingParam { name: "uid".to_string() });
        assert!(!err.is_parse_error());
    }

    #[test]
    fn test_missing_param_empty_policy() {
        let resolved = resolve("dashboards:uid:{uid}", &RequestParams::new(), MissingParamPolicy::Empty)
            .unwrap();
        assert_eq!(resolved, "dashboards:uid:");
    }

    #[test]
    fn test_policy_serde() {
        let policy: MissingParamPolicy = serde_json::from_str("\"empty\"").unwrap();
        assert_eq!(policy, MissingParamPolicy::Empty);
        assert_eq!(MissingParamPolicy::default(), MissingParamPolicy::Fail);
    }
}

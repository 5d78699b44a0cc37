/// Granted scope patterns and matching
///
/// A granted scope is parsed into a [`ScopePattern`] so that malformed
/// wildcards are caught when a catalog is loaded rather than silently
/// failing to match at request time.

use std::fmt;
use std::str::FromStr;

/// Separator between scope segments
pub const SCOPE_DELIMITER: char = ':';

/// Wildcard marker, only valid as the final standalone segment
pub const WILDCARD: &str = "*";

/// Result type for scope operations
pub type ScopeResult<T> = Result<T, ScopeError>;

/// Errors that can occur while parsing a granted scope
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeError {
    /// Empty scope string provided
    EmptyScope,
    /// Scope segment is empty
    EmptySegment,
    /// Wildcard used anywhere but as the final segment
    InvalidWildcard(String),
}

impl fmt::Display for ScopeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyScope => write!(f, "Scope cannot be empty"),
            Self::EmptySegment => write!(f, "Scope segment cannot be empty"),
            Self::InvalidWildcard(msg) => write!(f, "Invalid wildcard usage: {}", msg),
        }
    }
}

impl std::error::Error for ScopeError {}

/// Parsed granted scope
///
/// - `Any`: the bare wildcard, matches every requested scope
/// - `Prefix`: `dashboards:*`, stores `dashboards:` (delimiter included)
/// - `Exact`: a concrete scope, matches only itself
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ScopePattern {
    Any,
    Prefix(String),
    Exact(String),
}

impl ScopePattern {
    /// Parses a granted scope
    ///
    /// # Examples
    ///
    /// ```
    /// use gatekeep_accesscontrol::scope::ScopePattern;
    ///
    /// let pattern = ScopePattern::parse("dashboards:*").unwrap();
    /// assert!(pattern.matches("dashboards:uid:abc"));
    /// assert!(ScopePattern::parse("dash*").is_err());
    /// ```
    pub fn parse(s: &str) -> ScopeResult<Self> {
        if s.is_empty() {
            return Err(ScopeError::EmptyScope);
        }

        if s == WILDCARD {
            return Ok(Self::Any);
        }

        let segments: Vec<&str> = s.split(SCOPE_DELIMITER).collect();
        let last = segments.len() - 1;

        for (idx, segment) in segments.iter().enumerate() {
            if segment.is_empty() {
                return Err(ScopeError::EmptySegment);
            }

            if segment.contains('*') {
                if *segment != WILDCARD {
                    return Err(ScopeError::InvalidWildcard(format!(
                        "wildcards must be standalone: '{}'",
                        segment
                    )));
                }
                if idx != last {
                    return Err(ScopeError::InvalidWildcard(format!(
                        "wildcard can only appear as the last segment: '{}'",
                        s
                    )));
                }
            }
        }

        match s.strip_suffix(WILDCARD) {
            Some(prefix) => Ok(Self::Prefix(prefix.to_string())),
            None => Ok(Self::Exact(s.to_string())),
        }
    }

    /// Whether this granted pattern covers the requested concrete scope
    ///
    /// Case-sensitive; segments are compared as opaque strings.
    pub fn matches(&self, requested: &str) -> bool {
        match self {
            Self::Any => true,
            Self::Prefix(prefix) => requested.starts_with(prefix.as_str()),
            Self::Exact(scope) => scope == requested,
        }
    }
}

impl FromStr for ScopePattern {
    type Err = ScopeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ScopePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str(WILDCARD),
            Self::Prefix(prefix) => write!(f, "{}{}", prefix, WILDCARD),
            Self::Exact(scope) => f.write_str(scope),
        }
    }
}

/// Checks whether a granted scope covers a requested scope
///
/// Exact equality always matches. A granted scope that fails to parse as a
/// pattern is only ever compared literally.
pub fn matches(granted: &str, requested: &str) -> bool {
    if granted == requested {
        return true;
    }

    ScopePattern::parse(granted)
        .map(|pattern| pattern.matches(requested))
        .unwrap_or(false)
}

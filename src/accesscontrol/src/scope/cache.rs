/// Compiled template cache
///
/// Template text is static per route, so compiled templates are shared
/// across requests. Rendered scopes depend on request parameters and are
/// never cached.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use dashmap::DashMap;

use super::template::{ScopeTemplate, TemplateError};

/// Statistics about cache performance
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    /// Number of cache hits
    pub hits: usize,
    /// Number of cache misses
    pub misses: usize,
    /// Total number of entries in cache
    pub entries: usize,
}

impl CacheStats {
    /// Calculates the cache hit rate
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Thread-safe cache of compiled [`ScopeTemplate`]s keyed by template text
#[derive(Debug, Default)]
pub struct TemplateCache {
    templates: DashMap<String, Arc<ScopeTemplate>>,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl TemplateCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the compiled template, parsing it on first use
    ///
    /// Parse failures are returned every time and never cached.
    pub fn get_or_parse(&self, template: &str) -> Result<Arc<ScopeTemplate>, TemplateError> {
        if let Some(entry) = self.templates.get(template) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(Arc::clone(entry.value()));
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let compiled = Arc::new(ScopeTemplate::parse(template)?);

        let entry = self
            .templates
            .entry(template.to_string())
            .or_insert(compiled);
        Ok(Arc::clone(entry.value()))
    }

    /// Drops every compiled template
    pub fn clear(&self) {
        self.templates.clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Returns cache statistics
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.templates.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::MissingParamPolicy;
    use crate::types::RequestParams;

    #[test]
    fn test_compiled_template_is_reused() {
        let cache = TemplateCache::new();

        let first = cache.get_or_parse("dashboards:uid:{uid}").unwrap();
        let second = cache.get_or_parse("dashboards:uid:{uid}").unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        let stats = cache.stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.entries, 1);
        assert_eq!(stats.hit_rate(), 0.5);
    }

    #[test]
    fn test_cached_template_renders_fresh_bindings() {
        let cache = TemplateCache::new();

        let a = RequestParams::new().with("uid", "aaa");
        let b = RequestParams::new().with("uid", "bbb");

        let rendered_a = cache
            .get_or_parse("dashboards:uid:{uid}")
            .unwrap()
            .render(&a, MissingParamPolicy::Fail)
            .unwrap();
        let rendered_b = cache
            .get_or_parse("dashboards:uid:{uid}")
            .unwrap()
            .render(&b, MissingParamPolicy::Fail)
            .unwrap();

        assert_eq!(rendered_a, "dashboards:uid:aaa");
        assert_eq!(rendered_b, "dashboards:uid:bbb");
    }

    #[test]
    fn test_parse_failures_are_not_cached() {
        let cache = TemplateCache::new();

        assert!(cache.get_or_parse("dashboards:{uid").is_err());
        assert!(cache.get_or_parse("dashboards:{uid").is_err());

        assert!(cache.is_empty());
        assert_eq!(cache.stats().misses, 2);
    }

    #[test]
    fn test_clear() {
        let cache = TemplateCache::new();
        cache.get_or_parse("users:self").unwrap();
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.stats().hits + cache.stats().misses, 0);
    }
}

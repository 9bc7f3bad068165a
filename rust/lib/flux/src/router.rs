use std::collections::HashMap;

use crate::trie::Trie;

/// Data-driven route table: path pattern → handler value.
///
/// Patterns use `:name` for dynamic segments (`/admin/ont/edit/:id`).
/// The handler type is whatever the caller wants to resolve to; the
/// admin shell uses a page descriptor enum. The table knows nothing
/// about rendering.
///
/// # Examples
///
/// ```ignore
/// let table = RouteTable::new();
/// table.add("/admin/ont/edit/:id", Page::OntEdit);
///
/// let m = table.resolve("/admin/ont/edit/7?tab=1").unwrap();
/// assert_eq!(m.param("id"), Some("7"));
/// ```
pub struct RouteTable<T> {
    trie: Trie<T>,
    patterns: Vec<String>,
}

/// A resolved route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch<T> {
    pub handler: T,
    pub params: HashMap<String, String>,
}

impl<T> RouteMatch<T> {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }
}

impl<T: Clone> RouteTable<T> {
    pub fn new() -> Self {
        Self {
            trie: Trie::new(),
            patterns: Vec::new(),
        }
    }

    /// Register a handler for a pattern. Later registrations of the same
    /// pattern are shadowed by the first.
    pub fn add(&mut self, pattern: &str, handler: T) -> &mut Self {
        self.trie.insert(pattern, handler);
        self.patterns.push(pattern.to_string());
        self
    }

    /// Resolve a concrete path. The query string and fragment are ignored.
    pub fn resolve(&self, path: &str) -> Option<RouteMatch<T>> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let resolved = self.trie.resolve(path)?;
        Some(RouteMatch {
            handler: resolved.value,
            params: resolved.params.into_iter().collect(),
        })
    }

    /// Registered patterns in insertion order.
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }
}

impl<T: Clone> Default for RouteTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Substitute `:name` segments of `pattern` with values from `params`.
///
/// Returns `None` if a parameter is missing.
pub fn build_path(pattern: &str, params: &[(&str, &str)]) -> Option<String> {
    let mut out = String::new();
    for seg in pattern.split('/').filter(|s| !s.is_empty()) {
        out.push('/');
        match seg.strip_prefix(':') {
            Some(name) => {
                let (_, value) = params.iter().find(|(k, _)| *k == name)?;
                out.push_str(value);
            }
            None => out.push_str(seg),
        }
    }
    if out.is_empty() {
        out.push('/');
    }
    Some(out)
}

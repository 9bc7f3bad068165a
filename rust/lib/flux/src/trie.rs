use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// A thread-safe segment trie shared by state subscriptions and the
/// route table.
///
/// Pattern segments:
/// - literal: `admin`, `ont`
/// - `:name` captures exactly one segment under `name` (routing)
/// - `+` matches exactly one segment without capturing
/// - `#` matches any number of remaining segments (must be last)
///
/// Patterns and paths use `/` as the separator. Leading and trailing
/// separators are ignored, so `/admin/ont/` and `admin/ont` are the same.
///
/// Two lookups are offered:
/// - [`Trie::match_topic`] collects every value whose pattern matches
///   (fan-out to subscribers).
/// - [`Trie::resolve`] returns the single best match with its captured
///   parameters (routing). Precedence per segment is
///   literal > `:param` > `+` > `#`.
pub struct Trie<T> {
    root: RwLock<TrieNode<T>>,
}

struct TrieNode<T> {
    children: HashMap<String, TrieNode<T>>,
    /// `:name` child. Only one parameter name is kept per position; the
    /// first inserted pattern decides it.
    param: Option<(String, Box<TrieNode<T>>)>,
    single: Option<Box<TrieNode<T>>>,
    multi: Option<Box<TrieNode<T>>>,
    values: Vec<T>,
}

impl<T> Default for TrieNode<T> {
    fn default() -> Self {
        Self {
            children: HashMap::new(),
            param: None,
            single: None,
            multi: None,
            values: Vec::new(),
        }
    }
}

/// Result of [`Trie::resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved<T> {
    pub value: T,
    /// Captured `:name` segments in pattern order.
    pub params: Vec<(String, String)>,
}

impl<T: Clone> Trie<T> {
    pub fn new() -> Self {
        Self {
            root: RwLock::new(TrieNode::default()),
        }
    }

    /// Insert a value at the given pattern.
    pub fn insert(&self, pattern: &str, value: T) {
        let mut root = self.root.write().unwrap_or_else(PoisonError::into_inner);
        root.insert(&segments(pattern), value);
    }

    /// Return all values whose patterns match the concrete path.
    ///
    /// `:name` segments behave like `+` here.
    pub fn match_topic(&self, topic: &str) -> Vec<T> {
        let root = self.root.read().unwrap_or_else(PoisonError::into_inner);
        let mut results = Vec::new();
        root.collect_matches(&segments(topic), &mut results);
        results
    }

    /// Return the best match for a concrete path, with captured params.
    ///
    /// When several values share the winning pattern, the first inserted
    /// one is returned.
    pub fn resolve(&self, path: &str) -> Option<Resolved<T>> {
        let root = self.root.read().unwrap_or_else(PoisonError::into_inner);
        let mut params = Vec::new();
        let value = root.resolve(&segments(path), &mut params)?;
        Some(Resolved { value, params })
    }

    /// Remove values matching the predicate from the given pattern.
    ///
    /// Returns `true` if any values were removed.
    pub fn remove<F>(&self, pattern: &str, predicate: F) -> bool
    where
        F: Fn(&T) -> bool,
    {
        let mut root = self.root.write().unwrap_or_else(PoisonError::into_inner);
        root.remove(&segments(pattern), &predicate)
    }

    /// Check if any values exist at the exact pattern.
    pub fn has_pattern(&self, pattern: &str) -> bool {
        let root = self.root.read().unwrap_or_else(PoisonError::into_inner);
        root.node(&segments(pattern))
            .is_some_and(|node| !node.values.is_empty())
    }
}

impl<T: Clone> Default for Trie<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> TrieNode<T> {
    fn insert(&mut self, segs: &[&str], value: T) {
        let Some((first, rest)) = segs.split_first() else {
            self.values.push(value);
            return;
        };

        match *first {
            "+" => self
                .single
                .get_or_insert_with(Box::default)
                .insert(rest, value),
            // `#` swallows the remainder of the pattern.
            "#" => self.multi.get_or_insert_with(Box::default).values.push(value),
            seg if seg.starts_with(':') => {
                let (_, child) = self
                    .param
                    .get_or_insert_with(|| (seg[1..].to_string(), Box::default()));
                child.insert(rest, value);
            }
            seg => self
                .children
                .entry(seg.to_string())
                .or_default()
                .insert(rest, value),
        }
    }

    fn collect_matches(&self, segs: &[&str], results: &mut Vec<T>) {
        let Some((first, rest)) = segs.split_first() else {
            results.extend(self.values.iter().cloned());
            // `#` also matches zero remaining segments.
            if let Some(multi) = &self.multi {
                results.extend(multi.values.iter().cloned());
            }
            return;
        };

        if let Some(child) = self.children.get(*first) {
            child.collect_matches(rest, results);
        }
        if let Some((_, child)) = &self.param {
            child.collect_matches(rest, results);
        }
        if let Some(single) = &self.single {
            single.collect_matches(rest, results);
        }
        if let Some(multi) = &self.multi {
            results.extend(multi.values.iter().cloned());
        }
    }

    fn resolve(&self, segs: &[&str], params: &mut Vec<(String, String)>) -> Option<T> {
        let Some((first, rest)) = segs.split_first() else {
            return self
                .values
                .first()
                .or_else(|| self.multi.as_ref().and_then(|m| m.values.first()))
                .cloned();
        };

        if let Some(found) = self
            .children
            .get(*first)
            .and_then(|child| child.resolve(rest, params))
        {
            return Some(found);
        }

        if let Some((name, child)) = &self.param {
            let mark = params.len();
            params.push((name.clone(), (*first).to_string()));
            if let Some(found) = child.resolve(rest, params) {
                return Some(found);
            }
            params.truncate(mark);
        }

        if let Some(found) = self.single.as_ref().and_then(|s| s.resolve(rest, params)) {
            return Some(found);
        }

        self.multi.as_ref().and_then(|m| m.values.first().cloned())
    }

    fn remove<F>(&mut self, segs: &[&str], predicate: &F) -> bool
    where
        F: Fn(&T) -> bool,
    {
        let Some((first, rest)) = segs.split_first() else {
            let before = self.values.len();
            self.values.retain(|v| !predicate(v));
            return self.values.len() < before;
        };

        let child = match *first {
            "+" => self.single.as_deref_mut(),
            "#" => {
                return self.multi.as_mut().is_some_and(|multi| {
                    let before = multi.values.len();
                    multi.values.retain(|v| !predicate(v));
                    multi.values.len() < before
                });
            }
            seg if seg.starts_with(':') => self.param.as_mut().map(|(_, c)| c.as_mut()),
            seg => self.children.get_mut(seg),
        };
        child.is_some_and(|c| c.remove(rest, predicate))
    }

    fn node(&self, segs: &[&str]) -> Option<&TrieNode<T>> {
        let Some((first, rest)) = segs.split_first() else {
            return Some(self);
        };
        match *first {
            "+" => self.single.as_ref()?.node(rest),
            "#" => self.multi.as_deref(),
            seg if seg.starts_with(':') => self.param.as_ref()?.1.node(rest),
            seg => self.children.get(seg)?.node(rest),
        }
    }
}

/// Split a path into non-empty segments.
///
/// `"/admin/ont/"` -> `["admin", "ont"]`, `"/"` -> `[]`
fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========================================================================
    // match_topic
    // ========================================================================

    #[test]
    fn exact_match() {
        let trie = Trie::new();
        trie.insert("form/ont/draft", 1);
        trie.insert("form/ont/errors", 2);

        assert_eq!(trie.match_topic("form/ont/draft"), vec![1]);
        assert_eq!(trie.match_topic("form/ont/errors"), vec![2]);
        assert!(trie.match_topic("form/ont").is_empty());
        assert!(trie.match_topic("form/ont/draft/x").is_empty());
    }

    #[test]
    fn single_wildcard_matches_one_level() {
        let trie = Trie::new();
        trie.insert("form/+/busy", 10);

        assert_eq!(trie.match_topic("form/stb/busy"), vec![10]);
        assert!(trie.match_topic("form/busy").is_empty());
        assert!(trie.match_topic("form/a/b/busy").is_empty());
    }

    #[test]
    fn multi_wildcard_matches_zero_or_more_levels() {
        let trie = Trie::new();
        trie.insert("query/ont/#", 5);

        assert_eq!(trie.match_topic("query/ont"), vec![5]);
        assert_eq!(trie.match_topic("query/ont/list"), vec![5]);
        assert_eq!(trie.match_topic("query/ont/detail/7"), vec![5]);
        assert!(trie.match_topic("query/stb/list").is_empty());
    }

    #[test]
    fn all_matching_patterns_are_collected() {
        let trie = Trie::new();
        trie.insert("app/route", 1);
        trie.insert("app/+", 2);
        trie.insert("app/#", 3);
        trie.insert("#", 4);

        let mut results = trie.match_topic("app/route");
        results.sort();
        assert_eq!(results, vec![1, 2, 3, 4]);
    }

    #[test]
    fn param_segment_acts_as_single_wildcard_for_topics() {
        let trie = Trie::new();
        trie.insert("admin/ont/edit/:id", 1);
        assert_eq!(trie.match_topic("admin/ont/edit/7"), vec![1]);
    }

    #[test]
    fn separators_are_normalized() {
        let trie = Trie::new();
        trie.insert("/admin/location/", 1);
        assert_eq!(trie.match_topic("admin/location"), vec![1]);
        assert_eq!(trie.match_topic("/admin/location"), vec![1]);
    }

    // ========================================================================
    // resolve
    // ========================================================================

    #[test]
    fn resolve_captures_params() {
        let trie = Trie::new();
        trie.insert("/admin/ont/edit/:id", "edit");

        let r = trie.resolve("/admin/ont/edit/42").unwrap();
        assert_eq!(r.value, "edit");
        assert_eq!(r.params, vec![("id".to_string(), "42".to_string())]);
    }

    #[test]
    fn resolve_prefers_literal_over_param() {
        let trie = Trie::new();
        trie.insert("/admin/ont/:locationId", "by-location");
        trie.insert("/admin/ont/create", "create");

        assert_eq!(trie.resolve("/admin/ont/create").unwrap().value, "create");
        let r = trie.resolve("/admin/ont/3").unwrap();
        assert_eq!(r.value, "by-location");
        assert_eq!(r.params[0].1, "3");
    }

    #[test]
    fn resolve_backtracks_out_of_dead_literal_branch() {
        let trie = Trie::new();
        trie.insert("/admin/ont/edit/:id", "edit");
        trie.insert("/admin/ont/:locationId", "by-location");

        // "edit" literal exists but has no terminal value at this depth.
        let r = trie.resolve("/admin/ont/edit").unwrap();
        assert_eq!(r.value, "by-location");
        assert_eq!(r.params, vec![("locationId".to_string(), "edit".to_string())]);
    }

    #[test]
    fn resolve_discards_params_from_failed_branch() {
        let trie = Trie::new();
        trie.insert("/a/:x/b", 1);
        trie.insert("/a/+/c", 2);

        let r = trie.resolve("/a/v/c").unwrap();
        assert_eq!(r.value, 2);
        assert!(r.params.is_empty());
    }

    #[test]
    fn resolve_root_and_miss() {
        let trie = Trie::new();
        trie.insert("/", "dashboard");

        assert_eq!(trie.resolve("/").unwrap().value, "dashboard");
        assert!(trie.resolve("/nowhere").is_none());
    }

    #[test]
    fn resolve_falls_back_to_multi_wildcard() {
        let trie = Trie::new();
        trie.insert("/admin/#", "admin-shell");
        trie.insert("/admin/location", "location");

        assert_eq!(trie.resolve("/admin/location").unwrap().value, "location");
        assert_eq!(trie.resolve("/admin/unknown/page").unwrap().value, "admin-shell");
    }

    // ========================================================================
    // remove / has_pattern
    // ========================================================================

    #[test]
    fn remove_by_predicate() {
        let trie = Trie::new();
        trie.insert("query/#", 1);
        trie.insert("query/#", 2);
        trie.insert("admin/:id", 3);

        assert!(trie.remove("query/#", |v| *v == 1));
        assert_eq!(trie.match_topic("query/x"), vec![2]);
        assert!(trie.remove("admin/:id", |v| *v == 3));
        assert!(!trie.has_pattern("admin/:id"));
        assert!(!trie.remove("missing/path", |_| true));
    }

    #[test]
    fn has_pattern_is_exact() {
        let trie = Trie::new();
        trie.insert("form/+/draft", 1);

        assert!(trie.has_pattern("form/+/draft"));
        assert!(!trie.has_pattern("form/ont/draft"));
        assert!(!trie.has_pattern("form/+"));
    }

    #[test]
    fn concurrent_insert_and_match() {
        use std::sync::Arc;

        let trie = Arc::new(Trie::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let trie = Arc::clone(&trie);
                std::thread::spawn(move || {
                    trie.insert(&format!("query/e{}/#", i), i);
                    trie.match_topic(&format!("query/e{}/list", i)).len()
                })
            })
            .collect();

        for h in handles {
            assert!(h.join().unwrap() >= 1);
        }
        assert_eq!(trie.match_topic("query/e3/list"), vec![3]);
    }

    #[test]
    fn segments_skip_empty() {
        assert_eq!(segments("/admin//ont/"), vec!["admin", "ont"]);
        assert!(segments("/").is_empty());
    }
}

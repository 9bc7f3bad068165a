use std::fmt;

use netadmin_core::ListParams;

/// Identity of a cached query.
///
/// Keys are `/`-separated paths rooted at the entity name, so every key of
/// an entity sits under [`QueryKey::entity`] and one prefix invalidation
/// covers lists and details alike:
///
/// - `ont/list`
/// - `ont/list/location/3`
/// - `ont/detail/7`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKey(String);

impl QueryKey {
    /// Root key of an entity; the invalidation prefix after mutations.
    pub fn entity(name: &str) -> Self {
        Self(name.to_string())
    }

    pub fn list(name: &str, params: &ListParams) -> Self {
        match &params.location_id {
            Some(loc) => Self(format!("{}/list/location/{}", name, escape(loc))),
            None => Self(format!("{}/list", name)),
        }
    }

    pub fn detail(name: &str, id: &str) -> Self {
        Self(format!("{}/detail/{}", name, escape(id)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `true` if `self` equals `prefix` or lies below it.
    pub fn is_under(&self, prefix: &QueryKey) -> bool {
        self.0 == prefix.0
            || (self.0.starts_with(&prefix.0) && self.0.as_bytes().get(prefix.0.len()) == Some(&b'/'))
    }

    /// Store path the query state is published at.
    pub fn state_path(&self) -> String {
        format!("query/{}", self.0)
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifiers are backend-assigned; keep them to one key segment.
fn escape(segment: &str) -> String {
    segment.replace('/', "%2F")
}

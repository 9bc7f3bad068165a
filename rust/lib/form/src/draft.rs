use std::collections::BTreeMap;

use serde::Serialize;

/// Client-local editable copy of an entity record.
///
/// Field values are kept as the text the user typed; the schema turns them
/// into a JSON payload at submit time. The identifier is held apart from
/// the editable fields and cannot be changed through [`Draft::set`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Draft {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(flatten)]
    values: BTreeMap<String, String>,
}

impl Draft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draft targeting the existing record `id`.
    pub fn for_record(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            values: BTreeMap::new(),
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Value of `name`, empty when unset.
    pub fn get(&self, name: &str) -> &str {
        self.values.get(name).map(String::as_str).unwrap_or("")
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    /// Builder form of [`Draft::set`].
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    /// `true` if `name` is unset or only whitespace.
    pub fn is_blank(&self, name: &str) -> bool {
        self.get(name).trim().is_empty()
    }

    pub fn values(&self) -> &BTreeMap<String, String> {
        &self.values
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
